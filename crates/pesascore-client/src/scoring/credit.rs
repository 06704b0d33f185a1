use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::policy::{CREDIT_POLICY_V1, CreditPolicy};
use crate::{ClientError, ClientResult};

const PROFILE_COMMAND: &str = "score compute";

/// Financial-behavior inputs for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub average_balance: f64,
    pub transaction_frequency: u32,
    pub overdraft_count: u32,
    /// 0-100.
    pub payment_history_score: f64,
    /// 0.0-1.0.
    pub income_consistency: f64,
}

impl FinancialProfile {
    /// Rejects profiles that cannot be scored meaningfully.
    pub fn validate(&self) -> ClientResult<()> {
        let checks = [
            ("monthly_income", self.monthly_income, 0.0..=f64::MAX),
            ("average_balance", self.average_balance, f64::MIN..=f64::MAX),
            ("payment_history_score", self.payment_history_score, 0.0..=100.0),
            ("income_consistency", self.income_consistency, 0.0..=1.0),
        ];
        for (field, value, range) in checks {
            if !value.is_finite() || !range.contains(&value) {
                return Err(out_of_range(field, value));
            }
        }
        Ok(())
    }
}

fn out_of_range(field: &str, value: f64) -> ClientError {
    let expected = match field {
        "payment_history_score" => "between 0 and 100",
        "income_consistency" => "between 0.0 and 1.0",
        "monthly_income" => "zero or more",
        _ => "a finite number",
    };
    ClientError::invalid_argument_for_command(
        &format!("`{field}` must be {expected}, got {value}."),
        Some(PROFILE_COMMAND),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditRating {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl CreditRating {
    pub fn from_score(score: i64) -> Self {
        match score {
            850.. => Self::Excellent,
            750..=849 => Self::VeryGood,
            650..=749 => Self::Good,
            550..=649 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::Excellent,
            Self::VeryGood,
            Self::Good,
            Self::Fair,
            Self::Poor,
        ]
        .into_iter()
        .find(|rating| rating.as_str() == value)
    }
}

/// Named point contributions behind a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub base_score: i64,
    pub transaction_frequency: i64,
    pub average_balance: i64,
    pub income_regularity: i64,
    pub payment_history: i64,
    /// Zero or negative.
    pub overdraft_penalty: i64,
}

impl FactorBreakdown {
    pub fn raw_total(&self) -> i64 {
        self.base_score
            + self.transaction_frequency
            + self.average_balance
            + self.income_regularity
            + self.payment_history
            + self.overdraft_penalty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScoreRecord {
    pub score: i64,
    pub rating: CreditRating,
    pub factors: FactorBreakdown,
    pub improvement_tips: Vec<String>,
}

pub fn score(profile: &FinancialProfile) -> CreditScoreRecord {
    score_with_policy(profile, CREDIT_POLICY_V1)
}

pub fn score_with_policy(profile: &FinancialProfile, policy: CreditPolicy) -> CreditScoreRecord {
    let factors = FactorBreakdown {
        base_score: policy.base_score,
        transaction_frequency: policy
            .frequency
            .points(f64::from(profile.transaction_frequency)),
        average_balance: policy.balance.points(profile.average_balance),
        income_regularity: policy.consistency.points(profile.income_consistency),
        payment_history: policy.payment_history.points(profile.payment_history_score),
        overdraft_penalty: -policy.overdraft_penalty(profile.overdraft_count),
    };
    let score = policy.clamp(factors.raw_total());
    let rating = CreditRating::from_score(score);
    let improvement_tips = improvement_tips(profile, &factors, policy);
    debug!(score, rating = rating.as_str(), "credit score computed");

    CreditScoreRecord {
        score,
        rating,
        factors,
        improvement_tips,
    }
}

fn improvement_tips(
    profile: &FinancialProfile,
    factors: &FactorBreakdown,
    policy: CreditPolicy,
) -> Vec<String> {
    let checks = [
        (
            factors.transaction_frequency < policy.frequency_tip_floor,
            "Increase your transaction frequency to show active account usage",
        ),
        (
            factors.average_balance < policy.balance_tip_floor,
            "Maintain a higher average account balance",
        ),
        (
            factors.income_regularity < policy.consistency_tip_floor,
            "Maintain consistent monthly income",
        ),
        (
            factors.payment_history < policy.payment_history_tip_floor,
            "Improve your payment history by making timely payments",
        ),
        (
            factors.overdraft_penalty < 0,
            "Avoid overdrafts to prevent score penalties",
        ),
        (
            profile.monthly_income < policy.income_tip_floor,
            "Consider ways to increase your monthly income",
        ),
    ];
    checks
        .into_iter()
        .filter(|(triggered, _)| *triggered)
        .map(|(_, tip)| tip.to_string())
        .collect()
}
