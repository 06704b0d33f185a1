//! Account-level creditworthiness scoring on the 300-900 scale.

pub mod credit;
pub mod policy;

pub use credit::{CreditRating, CreditScoreRecord, FactorBreakdown, FinancialProfile, score};
