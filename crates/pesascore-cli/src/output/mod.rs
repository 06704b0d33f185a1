mod account_text;
mod error_text;
mod format;
mod funding_text;
mod json;
mod mode;
mod score_text;
mod sms_text;

use std::io;

use pesascore_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "sms parse" => sms_text::render_sms_parse(&success.data),
        "sms import" => sms_text::render_sms_import(&success.data),
        "sms list" => sms_text::render_sms_list(&success.data),
        "account summary" => account_text::render_account_summary(&success.data),
        "score compute" => score_text::render_score_compute(&success.data),
        "score history" => score_text::render_score_history(&success.data),
        "funding analyze" => funding_text::render_funding_analysis(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
