use std::path::Path;

use rusqlite::{Transaction, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::import::dedupe::BatchRow;
use crate::ledger::accounts::{mark_synced, upsert_account};
use crate::ledger::transactions::insert_transactions;
use crate::state::map_sqlite_error;

#[derive(Debug, Clone)]
pub(crate) struct PersistResult {
    pub(crate) import_id: String,
    pub(crate) inserted: i64,
}

pub(crate) struct PersistInput<'a> {
    pub(crate) account_ref: &'a str,
    pub(crate) phone_number: Option<&'a str>,
    pub(crate) rows: &'a [BatchRow],
    pub(crate) messages_read: i64,
    pub(crate) parsed: i64,
    pub(crate) failed: i64,
    pub(crate) duplicates: i64,
    pub(crate) source_kind: &'a str,
    pub(crate) source_ref: Option<&'a str>,
    pub(crate) timestamp: &'a str,
}

/// Writes the account, run record and rows inside the caller's transaction.
pub(crate) fn persist_import(
    transaction: &Transaction<'_>,
    db_path: &Path,
    input: PersistInput<'_>,
) -> ClientResult<PersistResult> {
    let import_id = format!("imp_{}", Ulid::new());

    upsert_account(
        transaction,
        db_path,
        input.account_ref,
        input.phone_number,
        input.timestamp,
    )?;

    transaction
        .execute(
            "INSERT INTO internal_import_runs (
                import_id,
                account_ref,
                created_at,
                messages_read,
                parsed,
                failed,
                inserted,
                duplicates,
                source_kind,
                source_ref
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &import_id,
                input.account_ref,
                input.timestamp,
                input.messages_read,
                input.parsed,
                input.failed,
                input.rows.len() as i64,
                input.duplicates,
                input.source_kind,
                input.source_ref
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let inserted = insert_transactions(
        transaction,
        db_path,
        &import_id,
        input.account_ref,
        input.rows.iter().map(|row| &row.record),
    )?;

    mark_synced(transaction, db_path, input.account_ref, input.timestamp)?;

    Ok(PersistResult {
        import_id,
        inserted,
    })
}
