use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::funding::{AnalysisResult, PersonalizedRecommendation};
use crate::scoring::{CreditRating, FactorBreakdown};
use crate::sms::insights::TransactionInsights;
use crate::sms::{
    Category, ParseFailure, ParseRates, ParseStats, ProcessingMethod, TransactionRecord,
    TransactionType,
};

#[derive(Debug, Clone, Serialize)]
pub struct DataRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerContext {
    pub db_path: String,
    pub schema_version: String,
    pub data_range: DataRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionInsightEntry {
    pub transaction_id: String,
    pub insights: TransactionInsights,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmsParseData {
    pub source_used: String,
    pub transactions: Vec<TransactionRecord>,
    pub insights: Vec<TransactionInsightEntry>,
    pub failures: Vec<ParseFailure>,
    pub stats: ParseStats,
    pub rates: ParseRates,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub messages_read: i64,
    pub parsed: i64,
    pub failed: i64,
    pub inserted: i64,
    pub duplicates: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDuplicateSummary {
    pub total: i64,
    pub batch: i64,
    pub existing_ledger: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDuplicateRow {
    pub message_index: i64,
    pub dedupe_reason: String,
    pub transaction_id: String,
    pub matched_message_index: Option<i64>,
    pub matched_row_id: Option<String>,
    pub matched_import_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmsImportData {
    pub account_ref: String,
    pub import_id: String,
    pub message: String,
    pub source_used: String,
    pub summary: ImportSummary,
    pub duplicate_summary: ImportDuplicateSummary,
    pub duplicate_rows: Vec<ImportDuplicateRow>,
    pub failures: Vec<ParseFailure>,
    pub stats: ParseStats,
    pub rates: ParseRates,
    pub ledger: LedgerContext,
}

/// A parsed record as persisted for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredTransaction {
    pub row_id: String,
    pub import_id: String,
    pub account_ref: String,
    pub transaction_id: String,
    pub amount: Decimal,
    pub balance_after: Option<Decimal>,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub description: String,
    pub counterparty: Option<String>,
    pub occurred_at: NaiveDateTime,
    pub original_text: String,
    pub confidence_score: f64,
    pub processing_method: ProcessingMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionFilter {
    pub since: Option<NaiveDateTime>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmsListData {
    pub account_ref: String,
    pub filter: TransactionFilter,
    pub returned: i64,
    pub transactions: Vec<StoredTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account_ref: String,
    pub phone_number: Option<String>,
    pub last_sync_at: Option<String>,
    pub period_days: u32,
    pub current_balance: Decimal,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub net_flow: Decimal,
    pub transaction_count: i64,
}

/// One appended row of a subject's score history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredCreditScore {
    pub score_id: String,
    pub subject_ref: String,
    pub sequence: i64,
    pub score: i64,
    pub rating: CreditRating,
    pub factors: FactorBreakdown,
    pub improvement_tips: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreComputeData {
    pub subject_ref: String,
    pub profile_path: String,
    pub stored: StoredCreditScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreHistoryData {
    pub subject_ref: String,
    pub current: Option<StoredCreditScore>,
    pub history: Vec<StoredCreditScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionStatus {
    pub percentage: f64,
    pub missing_elements: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialProfileSnapshot {
    pub credit_score: i64,
    pub rating: CreditRating,
    pub factors: FactorBreakdown,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FundingAnalysisData {
    pub business_name: String,
    pub application_path: String,
    pub subject_ref: Option<String>,
    pub analysis: AnalysisResult,
    pub completion_status: CompletionStatus,
    pub financial_profile: Option<FinancialProfileSnapshot>,
    pub recommendations: Vec<PersonalizedRecommendation>,
}
