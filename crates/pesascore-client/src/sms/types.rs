use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sms::insights::TransactionInsights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "credit" => Some(Self::Credit),
            "debit" => Some(Self::Debit),
            _ => None,
        }
    }
}

/// Closed category vocabulary for parsed transactions.
///
/// The classifier buckets (utilities, telecom, banking, ...) and the override
/// outcomes (withdraw, deposit, transfer, salary) are all members, so any
/// classifier result maps onto a variant without a string fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Salary,
    Business,
    Bills,
    Shopping,
    Transport,
    Food,
    Utilities,
    Transfer,
    Withdraw,
    Deposit,
    Airtime,
    Loan,
    Savings,
    Telecom,
    Banking,
    Entertainment,
    Healthcare,
    Education,
    Other,
}

impl Category {
    pub const ALL: [Self; 19] = [
        Self::Salary,
        Self::Business,
        Self::Bills,
        Self::Shopping,
        Self::Transport,
        Self::Food,
        Self::Utilities,
        Self::Transfer,
        Self::Withdraw,
        Self::Deposit,
        Self::Airtime,
        Self::Loan,
        Self::Savings,
        Self::Telecom,
        Self::Banking,
        Self::Entertainment,
        Self::Healthcare,
        Self::Education,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Business => "business",
            Self::Bills => "bills",
            Self::Shopping => "shopping",
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Utilities => "utilities",
            Self::Transfer => "transfer",
            Self::Withdraw => "withdraw",
            Self::Deposit => "deposit",
            Self::Airtime => "airtime",
            Self::Loan => "loan",
            Self::Savings => "savings",
            Self::Telecom => "telecom",
            Self::Banking => "banking",
            Self::Entertainment => "entertainment",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    HighConfidencePattern,
    SemanticAnalysis,
    LegacyFallback,
}

impl ProcessingMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighConfidencePattern => "high_confidence_pattern",
            Self::SemanticAnalysis => "semantic_analysis",
            Self::LegacyFallback => "legacy_fallback",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high_confidence_pattern" => Some(Self::HighConfidencePattern),
            "semantic_analysis" => Some(Self::SemanticAnalysis),
            "legacy_fallback" => Some(Self::LegacyFallback),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub amount: Decimal,
    pub balance_after: Option<Decimal>,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub description: String,
    pub counterparty: Option<String>,
    pub date: NaiveDateTime,
    pub original_text: String,
    pub confidence_score: f64,
    pub processing_method: ProcessingMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    pub record: TransactionRecord,
    pub insights: TransactionInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub original_text: String,
    pub error_reason: String,
    pub confidence: f64,
}
