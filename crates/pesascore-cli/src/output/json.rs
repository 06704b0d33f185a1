use std::io;

use pesascore_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

const JSON_COMMANDS: [&str; 7] = [
    "sms parse",
    "sms import",
    "sms list",
    "account summary",
    "score compute",
    "score history",
    "funding analyze",
];

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    if !JSON_COMMANDS.contains(&success.command.as_str()) {
        return Err(io::Error::other(format!(
            "JSON output is not supported for command `{}`",
            success.command
        )));
    }

    let value = json!({
        "ok": true,
        "version": JSON_VERSION,
        "data": success.data.clone(),
    });
    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    if let Some(data) = &error.data
        && let Some(body) = payload.get_mut("error").and_then(Value::as_object_mut)
    {
        body.insert("data".to_string(), data.clone());
    }
    serialize_json_pretty(&payload)
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
