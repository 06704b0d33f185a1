use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::sms::LazyRegex;
use crate::sms::classify::{classify_category, classify_direction, direction_cue_total};
use crate::sms::entities::{self, ExtractedEntities};
use crate::sms::insights;
use crate::sms::legacy;
use crate::sms::patterns::{self, HIGH_CONFIDENCE_THRESHOLD};
use crate::sms::stats::{ParseRates, ParseStats};
use crate::sms::types::{
    ParseFailure, ParsedTransaction, ProcessingMethod, TransactionRecord,
};

pub const SEMANTIC_CONFIDENCE: f64 = 0.75;
pub const NO_METHOD_MATCHED: &str = "no method matched";

/// Prefix of receipt codes synthesized for informal messages.
pub const SYNTHETIC_ID_PREFIX: &str = "SMS";
const SYNTHETIC_ID_HEX_LEN: usize = 10;

static RECEIPT_PREFIX: LazyRegex = LazyRegex::new(r"(?i)\b\w+\s+confirmed\b");
static ACTION_WORD: LazyRegex =
    LazyRegex::new(r"(?i)\b(sent|paid|received|withdrawn|deposited)\b");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Template,
    Semantic,
    Legacy,
}

impl ParseStage {
    pub const ORDER: [Self; 3] = [Self::Template, Self::Semantic, Self::Legacy];

    pub const fn method(self) -> ProcessingMethod {
        match self {
            Self::Template => ProcessingMethod::HighConfidencePattern,
            Self::Semantic => ProcessingMethod::SemanticAnalysis,
            Self::Legacy => ProcessingMethod::LegacyFallback,
        }
    }

    pub fn attempt(self, text: &str, processed_at: NaiveDateTime) -> Option<TransactionRecord> {
        match self {
            Self::Template => patterns::best_match(text)
                .filter(|matched| matched.confidence >= HIGH_CONFIDENCE_THRESHOLD)
                .and_then(|matched| matched.to_record(text, processed_at)),
            Self::Semantic => semantic_record(text, processed_at),
            Self::Legacy => legacy::parse(text, processed_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub transactions: Vec<ParsedTransaction>,
    pub failures: Vec<ParseFailure>,
    pub stats: ParseStats,
}

impl BatchResult {
    pub fn rates(&self) -> ParseRates {
        self.stats.rates()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().map(|parsed| &parsed.record)
    }
}

/// Drives each message through template, semantic and legacy stages.
#[derive(Debug, Clone)]
pub struct SmsPipeline {
    stages: Vec<ParseStage>,
}

impl Default for SmsPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SmsPipeline {
    pub fn new() -> Self {
        Self {
            stages: ParseStage::ORDER.to_vec(),
        }
    }

    pub fn stages(&self) -> &[ParseStage] {
        &self.stages
    }

    /// Parses one message. Never panics on malformed text; a message no stage
    /// accepts comes back as a failure record.
    pub fn parse_message(
        &self,
        text: &str,
        processed_at: NaiveDateTime,
    ) -> Result<ParsedTransaction, ParseFailure> {
        for stage in &self.stages {
            if let Some(record) = stage.attempt(text, processed_at) {
                debug!(
                    stage = ?stage,
                    confidence = record.confidence_score,
                    transaction_id = %record.transaction_id,
                    "message parsed"
                );
                let insights = insights::generate(&record);
                return Ok(ParsedTransaction { record, insights });
            }
        }
        debug!("no parsing stage accepted the message");
        Err(ParseFailure {
            original_text: text.to_string(),
            error_reason: NO_METHOD_MATCHED.to_string(),
            confidence: 0.0,
        })
    }

    /// Sequential batch parse. Counters start fresh for every call.
    pub fn parse_batch<I, S>(&self, messages: I, processed_at: NaiveDateTime) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = BatchResult::default();
        for message in messages {
            match self.parse_message(message.as_ref(), processed_at) {
                Ok(parsed) => {
                    result.stats.record_success(parsed.record.processing_method);
                    result.transactions.push(parsed);
                }
                Err(failure) => {
                    result.stats.record_failure();
                    result.failures.push(failure);
                }
            }
        }
        info!(
            total = result.stats.total_processed,
            successful = result.stats.successful,
            failed = result.stats.failed,
            "sms batch parsed"
        );
        result
    }

    pub fn parse_batch_now<I, S>(&self, messages: I) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parse_batch(messages, Utc::now().naive_utc())
    }
}

fn semantic_record(text: &str, processed_at: NaiveDateTime) -> Option<TransactionRecord> {
    let entities = entities::extract(text);
    let amount = entities.amount?;
    let transaction_id = entities
        .transaction_id
        .clone()
        .or_else(|| synthesized_id(text))?;

    // Semantic records carry one fixed confidence, above the 0.70 floor.
    Some(TransactionRecord {
        transaction_id,
        amount,
        balance_after: entities.balance,
        transaction_type: classify_direction(text, &entities),
        category: classify_category(text, &entities),
        description: smart_description(text, &entities),
        counterparty: entities.counterparty().map(str::to_string),
        date: entities.date.unwrap_or(processed_at),
        original_text: text.to_string(),
        confidence_score: SEMANTIC_CONFIDENCE,
        processing_method: ProcessingMethod::SemanticAnalysis,
    })
}

/// Stable receipt code for informal messages that carry none.
///
/// Only issued when the text has no `<code> Confirmed` prefix and mentions a
/// direction cue; confirmations with unreadable codes are left to the legacy
/// rules.
pub fn synthesized_id(text: &str) -> Option<String> {
    if RECEIPT_PREFIX.is_match(text) || direction_cue_total(text) == 0 {
        return None;
    }
    let digest = hex::encode_upper(Sha256::digest(text.trim().as_bytes()));
    let hex = digest.get(..SYNTHETIC_ID_HEX_LEN)?;
    Some(format!("{SYNTHETIC_ID_PREFIX}{hex}"))
}

pub fn smart_description(text: &str, entities: &ExtractedEntities) -> String {
    let lowered = text.to_lowercase();
    if let Some(recipient) = &entities.recipient {
        return format!("Payment to {recipient}");
    }
    if let Some(sender) = &entities.sender {
        return format!("Received from {sender}");
    }
    if lowered.contains("withdraw") {
        return "Cash withdrawal from ATM".to_string();
    }
    if lowered.contains("deposit") {
        return "Account deposit".to_string();
    }
    match ACTION_WORD.first_group(text) {
        Some(action) => format!("Transaction: {}", title_case(&action)),
        None => "Mobile money transaction".to_string(),
    }
}

fn title_case(word: &str) -> String {
    let lowered = word.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
