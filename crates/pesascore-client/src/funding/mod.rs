//! Startup funding-application analysis.
//!
//! [`analyzer::analyze`] runs five sub-analyses (business, financial, risk,
//! team, market) and folds them into creditworthiness and viability scores on
//! a 0-100 scale. Any fault inside a sub-analysis yields the fixed
//! manual-review result instead of an error.

pub mod advice;
pub mod analyzer;
pub mod policy;
pub mod text;
pub mod types;

pub use advice::{PersonalizedRecommendation, missing_elements, personalized_recommendations};
pub use analyzer::{AnalysisError, analyze};
pub use types::{
    AnalysisResult, BusinessStage, FundingApplication, FundingStage, Industry, RiskLevel,
};
