//! SQLite-backed storage for accounts, parsed transactions and score history.
//!
//! Every function takes an open connection (or transaction) plus the ledger
//! path used for error mapping; callers own connection lifetime.

pub mod accounts;
pub mod scores;
pub mod transactions;

use chrono::{NaiveDateTime, Utc};

/// Layout of `occurred_at`; lexical order matches chronological order.
pub const OCCURRED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub(crate) fn format_occurred_at(value: &NaiveDateTime) -> String {
    value.format(OCCURRED_AT_FORMAT).to_string()
}

pub(crate) fn parse_occurred_at(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, OCCURRED_AT_FORMAT).ok()
}
