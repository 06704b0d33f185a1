use std::path::Path;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use ulid::Ulid;

use crate::contracts::types::{AccountSummary, StoredTransaction, TransactionFilter};
use crate::ledger::accounts::AccountRecord;
use crate::ledger::{format_occurred_at, parse_occurred_at};
use crate::sms::{Category, ProcessingMethod, TransactionRecord, TransactionType};
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

const SELECT_COLUMNS: &str = "SELECT
        row_id,
        import_id,
        account_ref,
        transaction_id,
        amount,
        balance_after,
        transaction_type,
        category,
        description,
        counterparty,
        occurred_at,
        original_text,
        confidence_score,
        processing_method
     FROM internal_transactions";

struct RawTransactionRow {
    row_id: String,
    import_id: String,
    account_ref: String,
    transaction_id: String,
    amount: String,
    balance_after: Option<String>,
    transaction_type: String,
    category: String,
    description: String,
    counterparty: Option<String>,
    occurred_at: String,
    original_text: String,
    confidence_score: f64,
    processing_method: String,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawTransactionRow> {
    Ok(RawTransactionRow {
        row_id: row.get(0)?,
        import_id: row.get(1)?,
        account_ref: row.get(2)?,
        transaction_id: row.get(3)?,
        amount: row.get(4)?,
        balance_after: row.get(5)?,
        transaction_type: row.get(6)?,
        category: row.get(7)?,
        description: row.get(8)?,
        counterparty: row.get(9)?,
        occurred_at: row.get(10)?,
        original_text: row.get(11)?,
        confidence_score: row.get(12)?,
        processing_method: row.get(13)?,
    })
}

/// Rows that fail to decode mean the ledger was edited outside this crate.
fn decode_row(raw: RawTransactionRow, db_path: &Path) -> ClientResult<StoredTransaction> {
    let corrupt = || ClientError::ledger_corrupt(db_path);
    let balance_after = match raw.balance_after.as_deref() {
        Some(value) => Some(Decimal::from_str(value).map_err(|_| corrupt())?),
        None => None,
    };
    Ok(StoredTransaction {
        row_id: raw.row_id,
        import_id: raw.import_id,
        account_ref: raw.account_ref,
        transaction_id: raw.transaction_id,
        amount: Decimal::from_str(&raw.amount).map_err(|_| corrupt())?,
        balance_after,
        transaction_type: TransactionType::parse(&raw.transaction_type).ok_or_else(corrupt)?,
        category: Category::parse(&raw.category).ok_or_else(corrupt)?,
        description: raw.description,
        counterparty: raw.counterparty,
        occurred_at: parse_occurred_at(&raw.occurred_at).ok_or_else(corrupt)?,
        original_text: raw.original_text,
        confidence_score: raw.confidence_score,
        processing_method: ProcessingMethod::parse(&raw.processing_method)
            .ok_or_else(corrupt)?,
    })
}

/// Inserts parsed records for one account under an existing import run.
///
/// Callers dedupe first; a repeated `(account_ref, transaction_id)` pair
/// violates the unique constraint and aborts the surrounding transaction.
pub fn insert_transactions<'a, I>(
    connection: &Connection,
    db_path: &Path,
    import_id: &str,
    account_ref: &str,
    records: I,
) -> ClientResult<i64>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut statement = connection
        .prepare(
            "INSERT INTO internal_transactions (
                row_id,
                import_id,
                account_ref,
                transaction_id,
                amount,
                balance_after,
                transaction_type,
                category,
                description,
                counterparty,
                occurred_at,
                original_text,
                confidence_score,
                processing_method
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut inserted = 0_i64;
    for record in records {
        let row_id = format!("txn_{}", Ulid::new());
        statement
            .execute(params![
                row_id,
                import_id,
                account_ref,
                &record.transaction_id,
                record.amount.to_string(),
                record.balance_after.map(|value| value.to_string()),
                record.transaction_type.as_str(),
                record.category.as_str(),
                &record.description,
                &record.counterparty,
                format_occurred_at(&record.date),
                &record.original_text,
                record.confidence_score,
                record.processing_method.as_str(),
            ])
            .map_err(|error| map_sqlite_error(db_path, &error))?;
        inserted += 1;
    }
    Ok(inserted)
}

pub fn lookup_transaction_by_id(
    connection: &Connection,
    db_path: &Path,
    account_ref: &str,
    transaction_id: &str,
) -> ClientResult<Option<StoredTransaction>> {
    let sql = format!("{SELECT_COLUMNS} WHERE account_ref = ?1 AND transaction_id = ?2 LIMIT 1");
    let raw = connection
        .query_row(&sql, params![account_ref, transaction_id], read_raw_row)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    raw.map(|row| decode_row(row, db_path)).transpose()
}

/// Transactions for one account matching every set filter, newest first.
pub fn filter_transactions(
    connection: &Connection,
    db_path: &Path,
    account_ref: &str,
    filter: &TransactionFilter,
) -> ClientResult<Vec<StoredTransaction>> {
    let sql = format!(
        "{SELECT_COLUMNS}
         WHERE account_ref = ?1
           AND (?2 IS NULL OR occurred_at >= ?2)
           AND (?3 IS NULL OR transaction_type = ?3)
           AND (?4 IS NULL OR category = ?4)
         ORDER BY occurred_at DESC, row_id DESC"
    );
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let since = filter.since.as_ref().map(format_occurred_at);
    let rows_iter = statement
        .query_map(
            params![
                account_ref,
                since,
                filter.transaction_type.map(TransactionType::as_str),
                filter.category.map(Category::as_str),
            ],
            read_raw_row,
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        let raw = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        rows.push(decode_row(raw, db_path)?);
    }
    Ok(rows)
}

/// Balance and flow totals over the `period_days` ending at `as_of`.
///
/// The current balance is the `balance_after` of the newest transaction in the
/// window, or zero when that transaction carried none.
pub fn account_summary(
    connection: &Connection,
    db_path: &Path,
    account: &AccountRecord,
    period_days: u32,
    as_of: NaiveDateTime,
) -> ClientResult<AccountSummary> {
    let since = Duration::try_days(i64::from(period_days))
        .and_then(|span| as_of.checked_sub_signed(span))
        .ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("`--days {period_days}` reaches back past the earliest supported date."),
                Some("account summary"),
            )
        })?;
    let filter = TransactionFilter {
        since: Some(since),
        ..TransactionFilter::default()
    };
    let window = filter_transactions(connection, db_path, &account.account_ref, &filter)?
        .into_iter()
        .filter(|transaction| transaction.occurred_at <= as_of)
        .collect::<Vec<_>>();

    let mut total_credits = Decimal::ZERO;
    let mut total_debits = Decimal::ZERO;
    for transaction in &window {
        match transaction.transaction_type {
            TransactionType::Credit => total_credits += transaction.amount,
            TransactionType::Debit => total_debits += transaction.amount,
        }
    }
    let current_balance = window
        .first()
        .and_then(|transaction| transaction.balance_after)
        .unwrap_or(Decimal::ZERO);

    Ok(AccountSummary {
        account_ref: account.account_ref.clone(),
        phone_number: account.phone_number.clone(),
        last_sync_at: account.last_sync_at.clone(),
        period_days,
        current_balance,
        total_credits,
        total_debits,
        net_flow: total_credits - total_debits,
        transaction_count: window.len() as i64,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::str::FromStr;

    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use super::{account_summary, filter_transactions, insert_transactions, lookup_transaction_by_id};
    use crate::contracts::types::TransactionFilter;
    use crate::ledger::accounts::{find_account, upsert_account};
    use crate::ledger::test_support::migrated_connection;
    use crate::sms::{Category, ProcessingMethod, TransactionRecord, TransactionType};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap_or_default()
    }

    fn record(
        id: &str,
        amount: &str,
        balance: Option<&str>,
        kind: TransactionType,
        category: Category,
        date: NaiveDateTime,
    ) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            amount: Decimal::from_str(amount).unwrap_or_default(),
            balance_after: balance.and_then(|value| Decimal::from_str(value).ok()),
            transaction_type: kind,
            category,
            description: format!("record {id}"),
            counterparty: None,
            date,
            original_text: format!("{id} Confirmed."),
            confidence_score: 0.9,
            processing_method: ProcessingMethod::HighConfidencePattern,
        }
    }

    fn seeded() -> Option<Connection> {
        let connection = migrated_connection()?;
        let db_path = Path::new(":memory:");
        upsert_account(&connection, db_path, "wallet", None, "t0").ok()?;
        connection
            .execute(
                "INSERT INTO internal_import_runs (import_id, account_ref, created_at, messages_read, parsed, failed, inserted, duplicates, source_kind)
                 VALUES ('imp_1', 'wallet', 't0', 3, 3, 0, 3, 0, 'file')",
                [],
            )
            .ok()?;
        let records = [
            record("QA1", "50000.00", Some("52500.00"), TransactionType::Credit, Category::Salary, at(1, 9)),
            record("QA2", "500.00", Some("52000.00"), TransactionType::Debit, Category::Transfer, at(15, 14)),
            record("QA3", "200.00", None, TransactionType::Debit, Category::Utilities, at(16, 10)),
        ];
        insert_transactions(&connection, db_path, "imp_1", "wallet", records.iter()).ok()?;
        Some(connection)
    }

    #[test]
    fn lookup_finds_only_the_owning_account() {
        let connection = seeded();
        assert!(connection.is_some());
        if let Some(connection) = connection {
            let db_path = Path::new(":memory:");
            let found = lookup_transaction_by_id(&connection, db_path, "wallet", "QA2");
            assert!(matches!(found, Ok(Some(_))));
            if let Ok(Some(found)) = found {
                assert_eq!(found.amount, Decimal::new(50000, 2));
                assert_eq!(found.occurred_at, at(15, 14));
            }
            let other = lookup_transaction_by_id(&connection, db_path, "other", "QA2");
            assert!(matches!(other, Ok(None)));
        }
    }

    #[test]
    fn filters_combine_and_results_are_newest_first() {
        let connection = seeded();
        assert!(connection.is_some());
        if let Some(connection) = connection {
            let db_path = Path::new(":memory:");
            let all = filter_transactions(&connection, db_path, "wallet", &TransactionFilter::default());
            assert!(all.is_ok());
            if let Ok(all) = all {
                let ids = all.iter().map(|row| row.transaction_id.as_str()).collect::<Vec<_>>();
                assert_eq!(ids, vec!["QA3", "QA2", "QA1"]);
            }

            let debits_since = TransactionFilter {
                since: Some(at(16, 0)),
                transaction_type: Some(TransactionType::Debit),
                category: None,
            };
            let filtered = filter_transactions(&connection, db_path, "wallet", &debits_since);
            assert!(filtered.is_ok());
            if let Ok(filtered) = filtered {
                assert_eq!(filtered.len(), 1);
                assert_eq!(filtered[0].category, Category::Utilities);
            }
        }
    }

    #[test]
    fn summary_uses_newest_balance_inside_window() {
        let connection = seeded();
        assert!(connection.is_some());
        if let Some(connection) = connection {
            let db_path = Path::new(":memory:");
            let account = find_account(&connection, db_path, "wallet");
            assert!(matches!(account, Ok(Some(_))));
            if let Ok(Some(account)) = account {
                let summary = account_summary(&connection, db_path, &account, 30, at(15, 23));
                assert!(summary.is_ok());
                if let Ok(summary) = summary {
                    assert_eq!(summary.transaction_count, 2);
                    assert_eq!(summary.current_balance, Decimal::new(5_200_000, 2));
                    assert_eq!(summary.total_credits, Decimal::new(5_000_000, 2));
                    assert_eq!(summary.total_debits, Decimal::new(50_000, 2));
                    assert_eq!(summary.net_flow, Decimal::new(4_950_000, 2));
                }

                let latest = account_summary(&connection, db_path, &account, 7, at(20, 0));
                assert!(latest.is_ok());
                if let Ok(latest) = latest {
                    assert_eq!(latest.transaction_count, 2);
                    assert_eq!(latest.current_balance, Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn window_past_the_calendar_range_is_rejected() {
        let connection = seeded();
        assert!(connection.is_some());
        if let Some(connection) = connection {
            let db_path = Path::new(":memory:");
            let account = find_account(&connection, db_path, "wallet");
            assert!(matches!(account, Ok(Some(_))));
            if let Ok(Some(account)) = account {
                let summary = account_summary(&connection, db_path, &account, 4_000_000_000, at(20, 12));
                assert!(summary.is_err());
                if let Err(error) = summary {
                    assert_eq!(error.code, "invalid_argument");
                    assert!(!error.is_internal());
                    assert!(error.message.contains("4000000000"));
                }

                let century = account_summary(&connection, db_path, &account, 36_500, at(20, 12));
                assert!(century.is_ok());
                if let Ok(century) = century {
                    assert_eq!(century.transaction_count, 3);
                }
            }
        }
    }
}
