use std::fs;
use std::io::{self, IsTerminal, Read};

use crate::import::invalid_input_error;
use crate::{ClientError, ClientResult};

/// A path argument of `-` asks for stdin explicitly.
const STDIN_PATH: &str = "-";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) content: String,
}

/// Picks exactly one message source: a file path, `-` for stdin, or piped
/// stdin when no path is given. Blank stdin counts as absent.
pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
) -> ClientResult<ResolvedSource> {
    let piped = read_stdin(stdin_override)?.filter(|body| !body.trim().is_empty());

    match (path.as_deref(), piped) {
        (Some(STDIN_PATH), Some(content)) | (None, Some(content)) => Ok(ResolvedSource {
            source_kind: SourceKind::Stdin,
            source_ref: None,
            content,
        }),
        (Some(STDIN_PATH), None) => Err(invalid_input_error(
            "`-` reads messages from stdin, but nothing was piped in.",
        )),
        (Some(_), Some(_)) => Err(invalid_input_error(
            "Messages arrived on stdin and as a file path. Pass one source per call.",
        )),
        (Some(file_path), None) => Ok(ResolvedSource {
            source_kind: SourceKind::File,
            source_ref: Some(file_path.to_string()),
            content: read_message_file(file_path)?,
        }),
        (None, None) => Err(invalid_input_error(
            "No messages to read. Pass a file path or pipe messages on stdin.",
        )),
    }
}

fn read_message_file(file_path: &str) -> ClientResult<String> {
    fs::read_to_string(file_path).map_err(|error| {
        ClientError::invalid_argument_with_recovery(
            &format!("Could not read message file `{file_path}`: {error}"),
            vec![
                "Check that the file exists and is a UTF-8 text export.".to_string(),
                "Rerun with the corrected path, or pipe the messages on stdin.".to_string(),
            ],
        )
    })
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<String>> {
    if stdin_override.is_some() {
        return Ok(stdin_override);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer).map_err(|error| {
        ClientError::invalid_argument_with_recovery(
            &format!("Could not read messages from stdin: {error}"),
            vec!["Save the messages to a file and pass its path instead.".to_string()],
        )
    })?;
    Ok(Some(buffer))
}
