pub(crate) mod dedupe;
pub(crate) mod input;
pub(crate) mod parse;
pub(crate) mod persist;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use rusqlite::TransactionBehavior;
use tracing::info;

use crate::contracts::types::{ImportDuplicateRow, ImportDuplicateSummary, ImportSummary};
use crate::error::SMS_HELP_COMMAND;
use crate::ledger::now_timestamp;
use crate::setup::SetupContext;
use crate::sms::{ParseFailure, ParseStats, SmsPipeline};
use crate::state::{map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

/// Messages read from one source, ready for the parsing pipeline.
#[derive(Debug, Clone)]
pub(crate) struct MessageBatch {
    pub(crate) source_used: String,
    pub(crate) source_kind: input::SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) messages: Vec<String>,
}

pub(crate) fn read_messages(
    path: Option<String>,
    stdin_override: Option<String>,
) -> ClientResult<MessageBatch> {
    let resolved = input::resolve_source(path, stdin_override)?;
    let parsed = parse::parse_messages(&resolved.content)?;
    if parsed.messages.is_empty() {
        return Err(invalid_input_error("Message source contains no messages."));
    }
    Ok(MessageBatch {
        source_used: format!(
            "{}:{}",
            resolved.source_kind.as_str(),
            parsed.format.as_str()
        ),
        source_kind: resolved.source_kind,
        source_ref: resolved.source_ref,
        messages: parsed.messages,
    })
}

pub(crate) struct ImportRequest<'a> {
    pub(crate) account_ref: &'a str,
    pub(crate) phone_number: Option<&'a str>,
    pub(crate) batch: MessageBatch,
    pub(crate) processed_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct ImportExecutionResult {
    pub(crate) import_id: String,
    pub(crate) source_used: String,
    pub(crate) summary: ImportSummary,
    pub(crate) duplicate_summary: ImportDuplicateSummary,
    pub(crate) duplicate_rows: Vec<ImportDuplicateRow>,
    pub(crate) failures: Vec<ParseFailure>,
    pub(crate) stats: ParseStats,
}

/// Parses, dedupes and persists one batch for an account.
pub(crate) fn execute(
    setup: &SetupContext,
    request: ImportRequest<'_>,
) -> ClientResult<ImportExecutionResult> {
    let pipeline = SmsPipeline::new();
    let mut stats = ParseStats::default();
    let mut failures = Vec::new();
    let mut parsed_rows = Vec::new();

    for (index, message) in request.batch.messages.iter().enumerate() {
        match pipeline.parse_message(message, request.processed_at) {
            Ok(parsed) => {
                stats.record_success(parsed.record.processing_method);
                parsed_rows.push(dedupe::BatchRow {
                    record: parsed.record,
                    message_index: (index as i64) + 1,
                });
            }
            Err(failure) => {
                stats.record_failure();
                failures.push(failure);
            }
        }
    }

    let batch_deduped = dedupe::dedupe_batch(parsed_rows);

    let db_path = PathBuf::from(&setup.db_path);
    let mut connection = open_connection(&db_path)?;
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let ledger_deduped = dedupe::dedupe_against_existing(
        &transaction,
        &db_path,
        request.account_ref,
        batch_deduped.insertable_rows,
    )?;

    let mut duplicate_rows = batch_deduped.duplicate_rows;
    duplicate_rows.extend(ledger_deduped.duplicate_rows.iter().cloned());
    duplicate_rows.sort_by_key(|row| row.message_index);

    let batch_count = duplicate_rows
        .iter()
        .filter(|row| row.dedupe_reason == dedupe::DedupeReason::Batch)
        .count() as i64;
    let duplicate_summary = ImportDuplicateSummary {
        total: duplicate_rows.len() as i64,
        batch: batch_count,
        existing_ledger: duplicate_rows.len() as i64 - batch_count,
    };

    let timestamp = now_timestamp();
    let persisted = persist::persist_import(
        &transaction,
        &db_path,
        persist::PersistInput {
            account_ref: request.account_ref,
            phone_number: request.phone_number,
            rows: &ledger_deduped.insertable_rows,
            messages_read: request.batch.messages.len() as i64,
            parsed: stats.successful as i64,
            failed: stats.failed as i64,
            duplicates: duplicate_summary.total,
            source_kind: request.batch.source_kind.as_str(),
            source_ref: request.batch.source_ref.as_deref(),
            timestamp: &timestamp,
        },
    )?;

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    info!(
        account = request.account_ref,
        import_id = %persisted.import_id,
        inserted = persisted.inserted,
        duplicates = duplicate_summary.total,
        failed = stats.failed,
        "sms import committed"
    );

    Ok(ImportExecutionResult {
        import_id: persisted.import_id,
        source_used: request.batch.source_used,
        summary: ImportSummary {
            messages_read: request.batch.messages.len() as i64,
            parsed: stats.successful as i64,
            failed: stats.failed as i64,
            inserted: persisted.inserted,
            duplicates: duplicate_summary.total,
        },
        duplicate_summary,
        duplicate_rows: duplicate_rows
            .iter()
            .map(dedupe::DuplicateRecord::to_contract)
            .collect(),
        failures,
        stats,
    })
}

pub(crate) fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide messages via a file path or piped stdin.".to_string(),
            format!("Run `{SMS_HELP_COMMAND}` to review accepted inputs."),
        ],
    )
}
