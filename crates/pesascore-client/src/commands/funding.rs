use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::commands::common::{read_json_document, required_ref};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CompletionStatus, FinancialProfileSnapshot, FundingAnalysisData};
use crate::funding::{
    FundingApplication, analyze, missing_elements, personalized_recommendations,
};
use crate::ledger::scores::latest_credit_score;
use crate::setup::load_setup;
use crate::state::open_connection;

#[derive(Debug, Default)]
pub struct FundingAnalyzeOptions<'a> {
    pub application_path: String,
    /// Score-history subject whose latest score personalizes the advice.
    pub subject_ref: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn analyze_application(
    application_path: String,
    subject_ref: Option<String>,
) -> ClientResult<SuccessEnvelope> {
    analyze_with_options(FundingAnalyzeOptions {
        application_path,
        subject_ref,
        home_override: None,
    })
}

/// Analyzes an application document. The ledger is only opened when a
/// subject is named.
#[doc(hidden)]
pub fn analyze_with_options(options: FundingAnalyzeOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let application =
        read_json_document::<FundingApplication>(&options.application_path, "funding application")?;
    let subject_ref = match options.subject_ref.as_deref() {
        Some(value) => Some(required_ref(value, "--subject", "funding analyze")?),
        None => None,
    };

    let latest = match subject_ref.as_deref() {
        Some(subject) => {
            let setup = load_setup(options.home_override)?;
            let db_path = PathBuf::from(&setup.db_path);
            let connection = open_connection(&db_path)?;
            latest_credit_score(&connection, &db_path, subject)?
        }
        None => None,
    };

    let analysis = analyze(&application);
    let recommendations =
        personalized_recommendations(&application, latest.as_ref().map(|stored| stored.score));
    let financial_profile = latest.map(|stored| FinancialProfileSnapshot {
        credit_score: stored.score,
        rating: stored.rating,
        factors: stored.factors,
        last_updated: stored.created_at,
    });

    let data = FundingAnalysisData {
        business_name: application.business_name.clone(),
        application_path: options.application_path,
        subject_ref,
        completion_status: CompletionStatus {
            percentage: application.completion_percentage,
            missing_elements: missing_elements(&application),
        },
        analysis,
        financial_profile,
        recommendations,
    };
    success("funding analyze", data)
}
