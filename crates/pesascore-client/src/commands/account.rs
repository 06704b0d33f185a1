use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};

use crate::commands::common::required_ref;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::ledger::accounts::find_account;
use crate::ledger::transactions::account_summary;
use crate::setup::load_setup;
use crate::state::open_connection;
use crate::{ClientError, ClientResult};

pub const DEFAULT_PERIOD_DAYS: u32 = 30;

#[derive(Debug, Default)]
pub struct AccountSummaryOptions<'a> {
    pub account_ref: String,
    pub days: Option<u32>,
    /// End of the summary window; defaults to now.
    pub as_of: Option<NaiveDateTime>,
    pub home_override: Option<&'a Path>,
}

pub fn summary(account_ref: String, days: Option<u32>) -> ClientResult<SuccessEnvelope> {
    summary_with_options(AccountSummaryOptions {
        account_ref,
        days,
        ..AccountSummaryOptions::default()
    })
}

#[doc(hidden)]
pub fn summary_with_options(options: AccountSummaryOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let account_ref = required_ref(&options.account_ref, "--account", "account summary")?;
    let period_days = options.days.unwrap_or(DEFAULT_PERIOD_DAYS);
    if period_days == 0 {
        return Err(ClientError::invalid_argument_for_command(
            "`--days` must be at least 1.",
            Some("account summary"),
        ));
    }

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    let Some(account) = find_account(&connection, &db_path, &account_ref)? else {
        return Err(ClientError::account_not_found(&account_ref));
    };

    let as_of = options.as_of.unwrap_or_else(|| Utc::now().naive_utc());
    let data = account_summary(&connection, &db_path, &account, period_days, as_of)?;
    success("account summary", data)
}
