use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::commands::common::{read_json_document, required_ref};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{ScoreComputeData, ScoreHistoryData};
use crate::ledger::scores::{credit_score_history, record_credit_score};
use crate::scoring::{FinancialProfile, score};
use crate::setup::load_setup;
use crate::state::open_connection;

#[derive(Debug, Default)]
pub struct ScoreComputeOptions<'a> {
    pub subject_ref: String,
    pub profile_path: String,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct ScoreHistoryOptions<'a> {
    pub subject_ref: String,
    pub home_override: Option<&'a Path>,
}

pub fn compute(subject_ref: String, profile_path: String) -> ClientResult<SuccessEnvelope> {
    compute_with_options(ScoreComputeOptions {
        subject_ref,
        profile_path,
        home_override: None,
    })
}

/// Scores a profile document and appends the result to the subject's history.
#[doc(hidden)]
pub fn compute_with_options(options: ScoreComputeOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let subject_ref = required_ref(&options.subject_ref, "--subject", "score compute")?;
    let profile =
        read_json_document::<FinancialProfile>(&options.profile_path, "financial profile")?;
    profile.validate()?;
    let record = score(&profile);

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let mut connection = open_connection(&db_path)?;
    let stored = record_credit_score(&mut connection, &db_path, &subject_ref, &record)?;

    let data = ScoreComputeData {
        subject_ref,
        profile_path: options.profile_path,
        stored,
    };
    success("score compute", data)
}

pub fn history(subject_ref: String) -> ClientResult<SuccessEnvelope> {
    history_with_options(ScoreHistoryOptions {
        subject_ref,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn history_with_options(options: ScoreHistoryOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let subject_ref = required_ref(&options.subject_ref, "--subject", "score history")?;
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    let history = credit_score_history(&connection, &db_path, &subject_ref)?;

    let data = ScoreHistoryData {
        subject_ref,
        current: history.first().cloned(),
        history,
    };
    success("score history", data)
}
