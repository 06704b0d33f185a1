use serde::Serialize;

use crate::sms::types::ProcessingMethod;

/// Running counters for one batch. Owned by the caller, never global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub total_processed: u64,
    pub successful: u64,
    pub high_confidence: u64,
    pub semantic_fallback: u64,
    pub legacy_fallback: u64,
    pub failed: u64,
}

/// Percentages of `total_processed`; all zero for an empty batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ParseRates {
    pub success_rate: f64,
    pub high_confidence_rate: f64,
    pub semantic_rate: f64,
    pub legacy_rate: f64,
    pub failure_rate: f64,
}

impl ParseStats {
    pub fn record_success(&mut self, method: ProcessingMethod) {
        self.total_processed += 1;
        self.successful += 1;
        match method {
            ProcessingMethod::HighConfidencePattern => self.high_confidence += 1,
            ProcessingMethod::SemanticAnalysis => self.semantic_fallback += 1,
            ProcessingMethod::LegacyFallback => self.legacy_fallback += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.total_processed += 1;
        self.failed += 1;
    }

    /// Folds counters from another worker's share of the batch.
    pub fn merge(&mut self, other: &ParseStats) {
        self.total_processed += other.total_processed;
        self.successful += other.successful;
        self.high_confidence += other.high_confidence;
        self.semantic_fallback += other.semantic_fallback;
        self.legacy_fallback += other.legacy_fallback;
        self.failed += other.failed;
    }

    pub fn rates(&self) -> ParseRates {
        if self.total_processed == 0 {
            return ParseRates::default();
        }
        let total = self.total_processed as f64;
        let percent = |count: u64| count as f64 / total * 100.0;
        ParseRates {
            success_rate: percent(self.successful),
            high_confidence_rate: percent(self.high_confidence),
            semantic_rate: percent(self.semantic_fallback),
            legacy_rate: percent(self.legacy_fallback),
            failure_rate: percent(self.failed),
        }
    }
}
