use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::commands::common::{ledger_context, required_ref};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    SmsImportData, SmsListData, SmsParseData, TransactionFilter, TransactionInsightEntry,
};
use crate::import;
use crate::ledger::accounts::find_account;
use crate::ledger::transactions::filter_transactions;
use crate::setup::load_setup;
use crate::sms::{Category, SmsPipeline, TransactionType};
use crate::state::open_connection;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct SmsParseOptions {
    pub path: Option<String>,
    pub stdin_override: Option<String>,
    pub processed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
pub struct SmsImportOptions<'a> {
    pub account_ref: String,
    pub phone_number: Option<String>,
    pub path: Option<String>,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
    pub processed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
pub struct SmsListOptions<'a> {
    pub account_ref: String,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub since: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn parse(path: Option<String>) -> ClientResult<SuccessEnvelope> {
    parse_with_options(SmsParseOptions {
        path,
        ..SmsParseOptions::default()
    })
}

/// Runs the parsing pipeline without touching the ledger.
#[doc(hidden)]
pub fn parse_with_options(options: SmsParseOptions) -> ClientResult<SuccessEnvelope> {
    let batch = import::read_messages(options.path, options.stdin_override)?;
    let processed_at = options
        .processed_at
        .unwrap_or_else(|| Utc::now().naive_utc());
    let result = SmsPipeline::new().parse_batch(&batch.messages, processed_at);

    let rates = result.rates();
    let insights = result
        .transactions
        .iter()
        .map(|parsed| TransactionInsightEntry {
            transaction_id: parsed.record.transaction_id.clone(),
            insights: parsed.insights.clone(),
        })
        .collect();
    let data = SmsParseData {
        source_used: batch.source_used,
        transactions: result
            .transactions
            .into_iter()
            .map(|parsed| parsed.record)
            .collect(),
        insights,
        failures: result.failures,
        stats: result.stats,
        rates,
    };
    success("sms parse", data)
}

pub fn import(
    account_ref: String,
    phone_number: Option<String>,
    path: Option<String>,
) -> ClientResult<SuccessEnvelope> {
    import_with_options(SmsImportOptions {
        account_ref,
        phone_number,
        path,
        ..SmsImportOptions::default()
    })
}

#[doc(hidden)]
pub fn import_with_options(options: SmsImportOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let account_ref = required_ref(&options.account_ref, "--account", "sms import")?;
    let phone_number = options
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let setup = load_setup(options.home_override)?;
    let batch = import::read_messages(options.path, options.stdin_override)?;
    let execution = import::execute(
        &setup,
        import::ImportRequest {
            account_ref: &account_ref,
            phone_number,
            batch,
            processed_at: options
                .processed_at
                .unwrap_or_else(|| Utc::now().naive_utc()),
        },
    )?;

    let message = match (execution.summary.inserted, execution.summary.duplicates) {
        (0, 0) => "Import finished, but no messages could be parsed into transactions.".to_string(),
        (0, _) => "Import finished. Every parsed transaction was already stored.".to_string(),
        _ => "Import completed successfully.".to_string(),
    };
    let rates = execution.stats.rates();
    let context_setup = load_setup(options.home_override)?;

    let data = SmsImportData {
        account_ref,
        import_id: execution.import_id,
        message,
        source_used: execution.source_used,
        summary: execution.summary,
        duplicate_summary: execution.duplicate_summary,
        duplicate_rows: execution.duplicate_rows,
        failures: execution.failures,
        stats: execution.stats,
        rates,
        ledger: ledger_context(context_setup),
    };
    success("sms import", data)
}

pub fn list(account_ref: String) -> ClientResult<SuccessEnvelope> {
    list_with_options(SmsListOptions {
        account_ref,
        ..SmsListOptions::default()
    })
}

#[doc(hidden)]
pub fn list_with_options(options: SmsListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let account_ref = required_ref(&options.account_ref, "--account", "sms list")?;
    let filter = build_filter(&options)?;

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    if find_account(&connection, &db_path, &account_ref)?.is_none() {
        return Err(ClientError::account_not_found(&account_ref));
    }

    let transactions = filter_transactions(&connection, &db_path, &account_ref, &filter)?;
    let data = SmsListData {
        account_ref,
        filter,
        returned: transactions.len() as i64,
        transactions,
    };
    success("sms list", data)
}

fn build_filter(options: &SmsListOptions<'_>) -> ClientResult<TransactionFilter> {
    let transaction_type = match options.transaction_type.as_deref() {
        Some(value) => Some(TransactionType::parse(value.trim()).ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("Unknown transaction type `{value}`. Use `credit` or `debit`."),
                Some("sms list"),
            )
        })?),
        None => None,
    };
    let category = match options.category.as_deref() {
        Some(value) => Some(Category::parse(value.trim()).ok_or_else(|| {
            let known = Category::ALL
                .iter()
                .map(|category| category.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            ClientError::invalid_argument_for_command(
                &format!("Unknown category `{value}`. Known categories: {known}."),
                Some("sms list"),
            )
        })?),
        None => None,
    };
    let since = match options.since.as_deref() {
        Some(value) => Some(parse_since(value)?),
        None => None,
    };
    Ok(TransactionFilter {
        since,
        transaction_type,
        category,
    })
}

fn parse_since(value: &str) -> ClientResult<NaiveDateTime> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("`--since` must be a YYYY-MM-DD date, got `{value}`."),
                Some("sms list"),
            )
        })
}
