//! Ledger bootstrap: migrate, repair what is safe to repair, and refuse to
//! run against anything that does not look like a pesascore ledger.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::contracts::types::DataRange;
use crate::migrations::{EXPECTED_USER_VERSION, REQUIRED_INDEX_NAMES, REQUIRED_META_KEYS, run_pending};
use crate::state::{
    ensure_ledger_directory, ledger_db_path, map_sqlite_error, open_connection, resolve_ledger_home,
};
use crate::{ClientError, ClientResult};

struct TableShape {
    name: &'static str,
    columns: &'static [&'static str],
}

const LEDGER_TABLES: [TableShape; 5] = [
    TableShape {
        name: "internal_meta",
        columns: &["key", "value"],
    },
    TableShape {
        name: "internal_accounts",
        columns: &["account_ref", "phone_number", "created_at", "last_sync_at"],
    },
    TableShape {
        name: "internal_import_runs",
        columns: &[
            "import_id",
            "account_ref",
            "created_at",
            "messages_read",
            "parsed",
            "failed",
            "inserted",
            "duplicates",
            "source_kind",
            "source_ref",
        ],
    },
    TableShape {
        name: "internal_transactions",
        columns: &[
            "row_id",
            "import_id",
            "account_ref",
            "transaction_id",
            "amount",
            "balance_after",
            "transaction_type",
            "category",
            "description",
            "counterparty",
            "occurred_at",
            "original_text",
            "confidence_score",
            "processing_method",
        ],
    },
    TableShape {
        name: "internal_credit_scores",
        columns: &[
            "score_id",
            "subject_ref",
            "sequence",
            "score",
            "rating",
            "factors_json",
            "tips_json",
            "created_at",
        ],
    },
];

#[derive(Debug, Clone)]
pub struct SetupContext {
    pub db_path: String,
    pub schema_version: String,
    pub data_range: DataRange,
}

/// Opens (creating if needed) the ledger under the default home.
pub fn ensure_initialized() -> ClientResult<SetupContext> {
    initialize(None)
}

pub fn ensure_initialized_at(home_override: &Path) -> ClientResult<SetupContext> {
    initialize(Some(home_override))
}

pub(crate) fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    initialize(home_override)
}

fn initialize(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    let ledger_home = resolve_ledger_home(home_override)?;
    ensure_ledger_directory(&ledger_home)?;
    let db_path = ledger_db_path(&ledger_home);
    let fresh = !db_path.exists();

    let mut connection = open_connection(&db_path)?;
    run_pending(&mut connection).map_err(|error| migration_error(&db_path, &error))?;

    let sql = |error: rusqlite::Error| map_sqlite_error(&db_path, &error);
    if !verify_tables(&connection).map_err(sql)? {
        return Err(ClientError::ledger_corrupt(&db_path));
    }
    insert_missing_meta(&connection).map_err(sql)?;
    let meta = read_meta(&connection).map_err(sql)?;
    if !verify_meta_and_indexes(&connection, &meta).map_err(sql)? {
        return Err(ClientError::ledger_corrupt(&db_path));
    }

    let data_range = read_data_range(&connection).map_err(sql)?;
    if fresh {
        info!(path = %db_path.display(), "created ledger");
    } else {
        debug!(path = %db_path.display(), "ledger verified");
    }

    Ok(SetupContext {
        db_path: db_path.display().to_string(),
        schema_version: meta
            .get("schema_version")
            .cloned()
            .unwrap_or_else(|| "v1".to_string()),
        data_range,
    })
}

/// Lock and corruption failures surface as themselves; anything else the
/// migrator reports is a failed migration.
fn migration_error(db_path: &Path, error: &rusqlite_migration::Error) -> ClientError {
    if let rusqlite_migration::Error::RusqliteError { err, .. } = error {
        let mapped = map_sqlite_error(db_path, err);
        if matches!(
            mapped.code.as_str(),
            "ledger_locked" | "ledger_corrupt" | "ledger_init_permission_denied"
        ) {
            return mapped;
        }
    }
    ClientError::migration_failed(db_path, &error.to_string())
}

fn verify_tables(connection: &Connection) -> rusqlite::Result<bool> {
    let mut statement = connection.prepare("SELECT name FROM pragma_table_info(?1)")?;
    for table in &LEDGER_TABLES {
        let present = statement
            .query_map([table.name], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        if !table.columns.iter().all(|column| present.contains(*column)) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn insert_missing_meta(connection: &Connection) -> rusqlite::Result<()> {
    // Insert-only: a drifted value is a corrupt ledger, not something to fix.
    let mut statement =
        connection.prepare("INSERT OR IGNORE INTO internal_meta (key, value) VALUES (?1, ?2)")?;
    for (key, value) in REQUIRED_META_KEYS {
        statement.execute(params![key, value])?;
    }
    Ok(())
}

fn read_meta(connection: &Connection) -> rusqlite::Result<HashMap<String, String>> {
    let mut statement = connection.prepare("SELECT key, value FROM internal_meta")?;
    let rows = statement.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

fn verify_meta_and_indexes(
    connection: &Connection,
    meta: &HashMap<String, String>,
) -> rusqlite::Result<bool> {
    let user_version: i64 = connection.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if user_version != EXPECTED_USER_VERSION {
        return Ok(false);
    }
    let meta_ok = REQUIRED_META_KEYS
        .iter()
        .all(|(key, expected)| meta.get(*key).is_some_and(|actual| actual == expected));
    if !meta_ok {
        return Ok(false);
    }

    let mut statement =
        connection.prepare("SELECT count(*) FROM sqlite_master WHERE type = 'index' AND name = ?1")?;
    for index_name in REQUIRED_INDEX_NAMES {
        let found: i64 = statement.query_row([index_name], |row| row.get(0))?;
        if found == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

fn read_data_range(connection: &Connection) -> rusqlite::Result<DataRange> {
    connection.query_row(
        "SELECT MIN(occurred_at), MAX(occurred_at) FROM internal_transactions",
        [],
        |row| {
            Ok(DataRange {
                earliest: row.get(0)?,
                latest: row.get(1)?,
            })
        },
    )
}
