use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;

use crate::ClientResult;
use crate::contracts::types::ImportDuplicateRow;
use crate::ledger::transactions::lookup_transaction_by_id;
use crate::sms::TransactionRecord;

#[derive(Debug, Clone)]
pub(crate) struct BatchRow {
    pub(crate) record: TransactionRecord,
    /// 1-based position of the source message.
    pub(crate) message_index: i64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum DedupeReason {
    Batch,
    ExistingLedger,
}

impl DedupeReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::ExistingLedger => "existing_ledger",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DuplicateRecord {
    pub(crate) transaction_id: String,
    pub(crate) message_index: i64,
    pub(crate) dedupe_reason: DedupeReason,
    pub(crate) matched_message_index: Option<i64>,
    pub(crate) matched_row_id: Option<String>,
    pub(crate) matched_import_id: Option<String>,
}

impl DuplicateRecord {
    pub(crate) fn to_contract(&self) -> ImportDuplicateRow {
        ImportDuplicateRow {
            message_index: self.message_index,
            dedupe_reason: self.dedupe_reason.as_str().to_string(),
            transaction_id: self.transaction_id.clone(),
            matched_message_index: self.matched_message_index,
            matched_row_id: self.matched_row_id.clone(),
            matched_import_id: self.matched_import_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DedupeResult {
    pub(crate) insertable_rows: Vec<BatchRow>,
    pub(crate) duplicate_rows: Vec<DuplicateRecord>,
}

/// First occurrence of a transaction id wins; later ones are batch duplicates.
pub(crate) fn dedupe_batch(rows: Vec<BatchRow>) -> DedupeResult {
    let mut seen: HashMap<String, i64> = HashMap::new();
    let mut result = DedupeResult::default();

    for row in rows {
        if let Some(first_index) = seen.get(&row.record.transaction_id) {
            result.duplicate_rows.push(DuplicateRecord {
                transaction_id: row.record.transaction_id.clone(),
                message_index: row.message_index,
                dedupe_reason: DedupeReason::Batch,
                matched_message_index: Some(*first_index),
                matched_row_id: None,
                matched_import_id: None,
            });
            continue;
        }
        seen.insert(row.record.transaction_id.clone(), row.message_index);
        result.insertable_rows.push(row);
    }

    result
}

/// Skips rows whose id is already stored for the account.
pub(crate) fn dedupe_against_existing(
    connection: &Connection,
    db_path: &Path,
    account_ref: &str,
    rows: Vec<BatchRow>,
) -> ClientResult<DedupeResult> {
    let mut result = DedupeResult::default();

    for row in rows {
        let existing = lookup_transaction_by_id(
            connection,
            db_path,
            account_ref,
            &row.record.transaction_id,
        )?;
        if let Some(existing) = existing {
            result.duplicate_rows.push(DuplicateRecord {
                transaction_id: row.record.transaction_id.clone(),
                message_index: row.message_index,
                dedupe_reason: DedupeReason::ExistingLedger,
                matched_message_index: None,
                matched_row_id: Some(existing.row_id),
                matched_import_id: Some(existing.import_id),
            });
            continue;
        }
        result.insertable_rows.push(row);
    }

    Ok(result)
}
