use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::ClientResult;
use crate::state::map_sqlite_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub account_ref: String,
    pub phone_number: Option<String>,
    pub created_at: String,
    pub last_sync_at: Option<String>,
}

/// Creates the account on first import. A supplied phone number replaces the
/// stored one; an absent one leaves it untouched.
pub fn upsert_account(
    connection: &Connection,
    db_path: &Path,
    account_ref: &str,
    phone_number: Option<&str>,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "INSERT INTO internal_accounts (account_ref, phone_number, created_at, last_sync_at)
             VALUES (?1, ?2, ?3, NULL)
             ON CONFLICT (account_ref) DO UPDATE SET
                phone_number = COALESCE(excluded.phone_number, internal_accounts.phone_number)",
            params![account_ref, phone_number, timestamp],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn mark_synced(
    connection: &Connection,
    db_path: &Path,
    account_ref: &str,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "UPDATE internal_accounts SET last_sync_at = ?2 WHERE account_ref = ?1",
            params![account_ref, timestamp],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn find_account(
    connection: &Connection,
    db_path: &Path,
    account_ref: &str,
) -> ClientResult<Option<AccountRecord>> {
    connection
        .query_row(
            "SELECT account_ref, phone_number, created_at, last_sync_at
             FROM internal_accounts
             WHERE account_ref = ?1",
            [account_ref],
            |row| {
                Ok(AccountRecord {
                    account_ref: row.get(0)?,
                    phone_number: row.get(1)?,
                    created_at: row.get(2)?,
                    last_sync_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}
