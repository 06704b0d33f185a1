use std::io;

use serde_json::Value;

use super::format::{self, format_ksh, format_timestamp, i64_field};

pub fn render_account_summary(data: &Value) -> io::Result<String> {
    let account_ref = data
        .get("account_ref")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("account summary output requires account_ref"))?;
    let money = |key: &str| format_ksh(data.get(key).unwrap_or(&Value::Null));
    let last_sync = data
        .get("last_sync_at")
        .and_then(Value::as_str)
        .map(format_timestamp)
        .unwrap_or_else(|| "never".to_string());
    let phone = data
        .get("phone_number")
        .and_then(Value::as_str)
        .unwrap_or("-");

    let mut lines = vec![
        format!(
            "Account `{account_ref}`, last {} days:",
            i64_field(data, "period_days")
        ),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Phone:", phone.to_string()),
            ("Last import:", last_sync),
            ("Current balance:", money("current_balance")),
            ("Money in:", money("total_credits")),
            ("Money out:", money("total_debits")),
            ("Net flow:", money("net_flow")),
            (
                "Transactions:",
                i64_field(data, "transaction_count").to_string(),
            ),
        ],
        2,
    ));

    if i64_field(data, "transaction_count") == 0 {
        lines.push(String::new());
        lines.push("No transactions fell inside this window. Try a larger --days value.".to_string());
    } else {
        lines.push(String::new());
        lines.push(format!(
            "Run `pesascore sms list --account {account_ref}` to see each transaction."
        ));
    }
    Ok(lines.join("\n"))
}
