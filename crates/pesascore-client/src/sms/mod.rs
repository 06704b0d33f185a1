//! Text-to-transaction parsing for mobile-money SMS notifications.
//!
//! Every message runs through three stages in order: the structural
//! [`patterns`] library, the entity-based semantic pass, and the [`legacy`]
//! rule set. The first stage that produces a record wins. See
//! [`pipeline::SmsPipeline`] for the driver.

pub mod classify;
pub mod date;
pub mod entities;
pub mod insights;
pub mod legacy;
pub mod patterns;
pub mod pipeline;
pub mod stats;
pub mod types;

use std::sync::OnceLock;

use regex::{Captures, Regex};

pub use pipeline::{BatchResult, SmsPipeline};
pub use stats::{ParseRates, ParseStats};
pub use types::{
    Category, ParseFailure, ParsedTransaction, ProcessingMethod, TransactionRecord,
    TransactionType,
};

/// A regex compiled on first use.
///
/// Sources are compile-time literals; a source that fails to compile behaves
/// as a pattern that never matches, and each table has a test asserting that
/// every entry compiles.
pub(crate) struct LazyRegex {
    source: &'static str,
    cell: OnceLock<Option<Regex>>,
}

impl LazyRegex {
    pub(crate) const fn new(source: &'static str) -> Self {
        Self {
            source,
            cell: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> Option<&Regex> {
        self.cell
            .get_or_init(|| Regex::new(self.source).ok())
            .as_ref()
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.get().is_some_and(|regex| regex.is_match(text))
    }

    pub(crate) fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.get()?.captures(text)
    }

    pub(crate) fn first_group(&self, text: &str) -> Option<String> {
        self.captures(text)
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
