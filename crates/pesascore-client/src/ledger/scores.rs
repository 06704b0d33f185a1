use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::info;
use ulid::Ulid;

use crate::contracts::types::StoredCreditScore;
use crate::ledger::now_timestamp;
use crate::scoring::{CreditRating, CreditScoreRecord};
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

const SELECT_COLUMNS: &str = "SELECT
        score_id,
        subject_ref,
        sequence,
        score,
        rating,
        factors_json,
        tips_json,
        created_at
     FROM internal_credit_scores";

struct RawScoreRow {
    score_id: String,
    subject_ref: String,
    sequence: i64,
    score: i64,
    rating: String,
    factors_json: String,
    tips_json: String,
    created_at: String,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawScoreRow> {
    Ok(RawScoreRow {
        score_id: row.get(0)?,
        subject_ref: row.get(1)?,
        sequence: row.get(2)?,
        score: row.get(3)?,
        rating: row.get(4)?,
        factors_json: row.get(5)?,
        tips_json: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn decode_row(raw: RawScoreRow, db_path: &Path) -> ClientResult<StoredCreditScore> {
    let corrupt = || ClientError::ledger_corrupt(db_path);
    Ok(StoredCreditScore {
        score_id: raw.score_id,
        subject_ref: raw.subject_ref,
        sequence: raw.sequence,
        score: raw.score,
        rating: CreditRating::parse(&raw.rating).ok_or_else(corrupt)?,
        factors: serde_json::from_str(&raw.factors_json).map_err(|_| corrupt())?,
        improvement_tips: serde_json::from_str(&raw.tips_json).map_err(|_| corrupt())?,
        created_at: raw.created_at,
    })
}

/// Appends a score to the subject's history; earlier rows are never touched.
pub fn record_credit_score(
    connection: &mut Connection,
    db_path: &Path,
    subject_ref: &str,
    record: &CreditScoreRecord,
) -> ClientResult<StoredCreditScore> {
    let factors_json = serde_json::to_string(&record.factors)
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
    let tips_json = serde_json::to_string(&record.improvement_tips)
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let sequence = transaction
        .query_row(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM internal_credit_scores WHERE subject_ref = ?1",
            [subject_ref],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let stored = StoredCreditScore {
        score_id: format!("scr_{}", Ulid::new()),
        subject_ref: subject_ref.to_string(),
        sequence,
        score: record.score,
        rating: record.rating,
        factors: record.factors,
        improvement_tips: record.improvement_tips.clone(),
        created_at: now_timestamp(),
    };

    transaction
        .execute(
            "INSERT INTO internal_credit_scores (
                score_id,
                subject_ref,
                sequence,
                score,
                rating,
                factors_json,
                tips_json,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &stored.score_id,
                &stored.subject_ref,
                stored.sequence,
                stored.score,
                stored.rating.as_str(),
                factors_json,
                tips_json,
                &stored.created_at
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    info!(
        subject = subject_ref,
        score = stored.score,
        sequence = stored.sequence,
        "credit score recorded"
    );
    Ok(stored)
}

pub fn latest_credit_score(
    connection: &Connection,
    db_path: &Path,
    subject_ref: &str,
) -> ClientResult<Option<StoredCreditScore>> {
    let sql = format!("{SELECT_COLUMNS} WHERE subject_ref = ?1 ORDER BY sequence DESC LIMIT 1");
    let raw = connection
        .query_row(&sql, [subject_ref], read_raw_row)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    raw.map(|row| decode_row(row, db_path)).transpose()
}

/// Full history for a subject, newest first.
pub fn credit_score_history(
    connection: &Connection,
    db_path: &Path,
    subject_ref: &str,
) -> ClientResult<Vec<StoredCreditScore>> {
    let sql = format!("{SELECT_COLUMNS} WHERE subject_ref = ?1 ORDER BY sequence DESC");
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows_iter = statement
        .query_map([subject_ref], read_raw_row)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        let raw = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        rows.push(decode_row(raw, db_path)?);
    }
    Ok(rows)
}
