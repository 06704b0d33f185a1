use std::fs;

use serde::de::DeserializeOwned;

use crate::contracts::types::LedgerContext;
use crate::setup::SetupContext;
use crate::{ClientError, ClientResult};

pub fn ledger_context(setup: SetupContext) -> LedgerContext {
    LedgerContext {
        db_path: setup.db_path,
        schema_version: setup.schema_version,
        data_range: setup.data_range,
    }
}

/// Trimmed, non-empty reference such as an account or subject name.
pub(crate) fn required_ref(value: &str, flag: &str, command: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{flag}` must not be empty."),
            Some(command),
        ));
    }
    Ok(trimmed.to_string())
}

/// Reads and deserializes a JSON document named on the command line.
pub(crate) fn read_json_document<T>(path: &str, kind: &str) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let body = fs::read_to_string(path)
        .map_err(|error| ClientError::invalid_document(kind, path, &error.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|error| ClientError::invalid_document(kind, path, &error.to_string()))
}
