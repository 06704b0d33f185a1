use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

pub const REQUIRED_META_KEYS: [(&str, &str); 2] = [
    ("schema_version", "v1"),
    ("ledger_contract_version", "v1"),
];

pub const REQUIRED_INDEX_NAMES: [&str; 1] = ["idx_internal_transactions_account_occurred_at"];

pub const EXPECTED_USER_VERSION: i64 = 1;

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL)]);
    migrations.to_latest(conn)
}
