use serde::Serialize;

use crate::funding::policy::{
    DESCRIPTION_MIN_CHARS, FOUNDER_EXPERIENCE_MIN_CHARS, USE_OF_FUNDS_MIN_CHARS,
};
use crate::funding::types::{BusinessStage, FundingApplication, FundingStage};

/// Credit score below which applicants are nudged to improve it first.
pub const CREDIT_IMPROVEMENT_THRESHOLD: i64 = 600;
pub const LARGE_REQUEST_AMOUNT: f64 = 10_000_000.0;
pub const LOW_REVENUE_AMOUNT: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    CreditImprovement,
    FundingAmount,
    FundingStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvicePriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalizedRecommendation {
    #[serde(rename = "type")]
    pub kind: AdviceKind,
    pub message: String,
    pub priority: AdvicePriority,
}

fn too_short(text: &str, min_chars: usize) -> bool {
    text.chars().count() < min_chars
}

/// Application fields that still need work before review.
pub fn missing_elements(application: &FundingApplication) -> Vec<String> {
    let no_website = application
        .portfolio_website
        .as_deref()
        .is_none_or(|url| url.trim().is_empty());
    let checks = [
        (
            too_short(&application.business_description, DESCRIPTION_MIN_CHARS),
            "Detailed business description",
        ),
        (
            too_short(&application.founder_experience, FOUNDER_EXPERIENCE_MIN_CHARS),
            "Founder experience details",
        ),
        (
            too_short(&application.use_of_funds, USE_OF_FUNDS_MIN_CHARS),
            "Use of funds explanation",
        ),
        (no_website, "Portfolio/company website"),
        (
            application.monthly_revenue == 0.0 && application.business_stage.claims_revenue(),
            "Revenue information",
        ),
    ];
    checks
        .into_iter()
        .filter(|(missing, _)| *missing)
        .map(|(_, label)| label.to_string())
        .collect()
}

/// Advice that depends on the applicant's stored credit score.
///
/// Returns nothing when no score has been recorded for the subject.
pub fn personalized_recommendations(
    application: &FundingApplication,
    latest_score: Option<i64>,
) -> Vec<PersonalizedRecommendation> {
    let Some(score) = latest_score else {
        return Vec::new();
    };

    let mut advice = Vec::new();
    if score < CREDIT_IMPROVEMENT_THRESHOLD {
        advice.push(PersonalizedRecommendation {
            kind: AdviceKind::CreditImprovement,
            message: "Consider improving your credit score before applying for larger funding amounts"
                .to_string(),
            priority: AdvicePriority::High,
        });
    }
    if application.funding_amount_requested > LARGE_REQUEST_AMOUNT
        && application.monthly_revenue < LOW_REVENUE_AMOUNT
    {
        advice.push(PersonalizedRecommendation {
            kind: AdviceKind::FundingAmount,
            message:
                "Consider requesting a smaller amount initially and scaling up as revenue grows"
                    .to_string(),
            priority: AdvicePriority::Medium,
        });
    }
    if application.business_stage == BusinessStage::Idea
        && application.funding_stage != FundingStage::PreSeed
    {
        advice.push(PersonalizedRecommendation {
            kind: AdviceKind::FundingStage,
            message: "For idea-stage companies, pre-seed funding might be more appropriate"
                .to_string(),
            priority: AdvicePriority::Medium,
        });
    }
    advice
}
