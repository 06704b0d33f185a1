use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const SMS_HELP_COMMAND: &str = "pesascore sms import --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `pesascore {cmd} --help` for usage."),
            None => "Run `pesascore --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_input_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide messages as a JSON array of strings, a CSV with a `message` column, or one message per line.".to_string(),
                format!("Run `{SMS_HELP_COMMAND}` to review accepted inputs."),
            ],
        )
        .with_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "json_batch", "csv", "lines"],
        }))
    }

    pub fn invalid_document(kind: &str, path: &str, detail: &str) -> Self {
        Self::invalid_argument_with_recovery(
            &format!("Could not read {kind} from `{path}`: {detail}"),
            vec![
                format!("Check that `{path}` exists and holds a JSON {kind}."),
                "Rerun the command once the file is fixed.".to_string(),
            ],
        )
        .with_data(json!({
            "document_kind": kind,
            "path": path,
        }))
    }

    pub fn account_not_found(account_ref: &str) -> Self {
        Self::new(
            "account_not_found",
            &format!("Account `{account_ref}` has no imported messages."),
            vec![
                format!("Import messages first with `pesascore sms import --account {account_ref} <path>`."),
                "Check the spelling of the account reference.".to_string(),
            ],
        )
        .with_data(json!({
            "account_ref": account_ref,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("Cannot initialize ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `PESASCORE_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Ledger database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid SQLite ledger file or restore from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Ledger migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Ledger initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }

    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_")
            || matches!(
                self.code.as_str(),
                "ledger_init_permission_denied"
                    | "ledger_locked"
                    | "ledger_corrupt"
                    | "migration_failed"
                    | "ledger_init_failed"
            )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ClientError;

    #[test]
    fn command_hint_is_attached_to_invalid_argument() {
        let error = ClientError::invalid_argument_for_command("bad flag", Some("score compute"));
        assert_eq!(error.code, "invalid_argument");
        assert_eq!(
            error.recovery_steps,
            vec!["Run `pesascore score compute --help` for usage.".to_string()]
        );
        assert!(error.data.is_some());
    }

    #[test]
    fn ledger_errors_are_internal_and_argument_errors_are_not() {
        assert!(ClientError::ledger_locked(Path::new("/tmp/ledger.db")).is_internal());
        assert!(ClientError::internal_serialization("boom").is_internal());
        assert!(!ClientError::invalid_argument("bad").is_internal());
        assert!(!ClientError::account_not_found("acct").is_internal());
    }
}
