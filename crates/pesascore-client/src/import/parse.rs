use std::collections::HashMap;

use serde_json::Value;

use crate::import::invalid_input_error;
use crate::{ClientError, ClientResult};

/// CSV header names accepted for the message column, in preference order.
pub(crate) const MESSAGE_COLUMNS: [&str; 4] = ["message", "text", "sms", "body"];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum MessageFormat {
    JsonArray,
    JsonBatch,
    Csv,
    Lines,
}

impl MessageFormat {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::JsonArray => "json_array",
            Self::JsonBatch => "json_batch",
            Self::Csv => "csv",
            Self::Lines => "lines",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ParsedMessages {
    pub(crate) format: MessageFormat,
    pub(crate) messages: Vec<String>,
}

/// Detects the message layout from content and extracts message bodies.
pub(crate) fn parse_messages(content: &str) -> ClientResult<ParsedMessages> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Message source is empty."));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if trimmed.starts_with('{') {
        return parse_json_batch(trimmed);
    }

    if let Some(column) = csv_message_column(trimmed) {
        return parse_csv(trimmed, &column);
    }

    Ok(ParsedMessages {
        format: MessageFormat::Lines,
        messages: trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn parse_json_array(content: &str) -> ClientResult<ParsedMessages> {
    let parsed = serde_json::from_str::<Value>(content).map_err(|_| {
        ClientError::invalid_input_format(
            "Invalid JSON input. Provide a JSON array of message strings.",
            "json_invalid",
        )
    })?;
    let Some(items) = parsed.as_array() else {
        return Err(ClientError::invalid_input_format(
            "JSON input must be an array of message strings.",
            "json_non_array",
        ));
    };
    Ok(ParsedMessages {
        format: MessageFormat::JsonArray,
        messages: string_items(items)?,
    })
}

fn parse_json_batch(content: &str) -> ClientResult<ParsedMessages> {
    let parsed = serde_json::from_str::<Value>(content).map_err(|_| {
        ClientError::invalid_input_format(
            "Invalid JSON input. Provide `{\"messages\": [...]}` or a JSON array.",
            "json_invalid",
        )
    })?;
    let Some(items) = parsed.get("messages").and_then(Value::as_array) else {
        return Err(ClientError::invalid_input_format(
            "JSON objects must carry a `messages` array of strings.",
            "json_object",
        ));
    };
    Ok(ParsedMessages {
        format: MessageFormat::JsonBatch,
        messages: string_items(items)?,
    })
}

fn string_items(items: &[Value]) -> ClientResult<Vec<String>> {
    let mut messages = Vec::with_capacity(items.len());
    for item in items {
        let Some(text) = item.as_str() else {
            return Err(ClientError::invalid_input_format(
                "Every JSON message entry must be a string.",
                "json_non_string",
            ));
        };
        let text = text.trim();
        if !text.is_empty() {
            messages.push(text.to_string());
        }
    }
    Ok(messages)
}

/// The header name to read when the first line is a CSV header naming a
/// message column. SMS bodies contain commas, so a comma alone is not enough.
fn csv_message_column(content: &str) -> Option<String> {
    let first_line = content.lines().find(|line| !line.trim().is_empty())?;
    let headers = first_line
        .split(',')
        .map(|value| value.trim().trim_matches('"').to_ascii_lowercase())
        .collect::<Vec<String>>();
    MESSAGE_COLUMNS
        .iter()
        .find(|candidate| headers.iter().any(|header| header == *candidate))
        .map(|candidate| (*candidate).to_string())
}

fn parse_csv(content: &str, column: &str) -> ClientResult<ParsedMessages> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let index_by_name = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_ascii_lowercase(), index))
        .collect::<HashMap<String, usize>>();
    let Some(index) = index_by_name.get(column).copied() else {
        return Err(invalid_input_error("CSV header row is missing a message column."));
    };

    let mut messages = Vec::new();
    for result_row in reader.records() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;
        if let Some(text) = record.get(index).map(str::trim)
            && !text.is_empty()
        {
            messages.push(text.to_string());
        }
    }

    Ok(ParsedMessages {
        format: MessageFormat::Csv,
        messages,
    })
}
