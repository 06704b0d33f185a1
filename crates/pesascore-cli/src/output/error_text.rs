use pesascore_client::ClientError;
use serde_json::Value;

pub fn render_error(error: &ClientError) -> String {
    let headline = if error.is_internal() {
        "Something went wrong with your local ledger."
    } else {
        "Something went wrong, but it's easy to fix."
    };
    let mut lines = vec![
        headline.to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];
    if let Some(command) = data_str(error, "command_hint") {
        lines.push(format!("  Command:  pesascore {command}"));
    }
    if let Some(path) = data_str(error, "path") {
        lines.push(format!("  File:     {path}"));
    }
    lines.push(String::new());
    lines.push("What to do next:".to_string());

    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

fn data_str<'a>(error: &'a ClientError, key: &str) -> Option<&'a str> {
    error.data.as_ref()?.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use pesascore_client::ClientError;

    use super::render_error;

    #[test]
    fn renders_account_not_found_with_import_hint() {
        let error = ClientError::account_not_found("wallet");

        let rendered = render_error(&error);
        assert!(rendered.starts_with("Something went wrong, but it's easy to fix."));
        assert!(rendered.contains("  Error:    account_not_found"));
        assert!(rendered.contains("  Details:  Account `wallet` has no imported messages."));
        assert!(rendered.contains("  1. Import messages first with `pesascore sms import"));
    }

    #[test]
    fn document_errors_name_the_file() {
        let error = ClientError::invalid_document("funding application", "app.json", "missing");
        let rendered = render_error(&error);
        assert!(rendered.contains("  File:     app.json"));
    }

    #[test]
    fn ledger_errors_use_internal_headline() {
        let error = ClientError::ledger_locked(std::path::Path::new("/tmp/ledger.db"));
        let rendered = render_error(&error);
        assert!(rendered.starts_with("Something went wrong with your local ledger."));
    }

    #[test]
    fn empty_recovery_falls_back_to_retry() {
        let error = ClientError::invalid_argument_with_recovery("bad input", Vec::new());
        let rendered = render_error(&error);
        assert!(rendered.contains("  1. Retry the command."));
    }
}
