//! Structural templates for well-formed confirmation messages.
//!
//! Templates are tried in library order and the highest boosted confidence
//! wins; on a tie the earlier template is kept.

use chrono::NaiveDateTime;
use regex::Captures;
use serde::Serialize;

use crate::sms::LazyRegex;
use crate::sms::classify::classify_category;
use crate::sms::date::combine_date_time;
use crate::sms::entities::{ExtractedEntities, parse_amount};
use crate::sms::types::{ProcessingMethod, TransactionRecord, TransactionType};

/// Matches at or above this confidence are accepted without further stages.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.85;

pub const CONFIRMED_BOOST: f64 = 0.03;
pub const BALANCE_BOOST: f64 = 0.02;
pub const CURRENCY_BOOST: f64 = 0.02;

/// Counterparty names this short are treated as noise.
const MIN_COUNTERPARTY_LEN: usize = 3;
pub const UNKNOWN_COUNTERPARTY: &str = "Unknown";

static CURRENCY_DIGIT: LazyRegex = LazyRegex::new(r"(?i)ksh\.?\s*\d");

static COUNTERPARTY_FALLBACKS: [LazyRegex; 3] = [
    LazyRegex::new(r"(?i)(?:to|from)\s+([a-z][a-z\s]+?)(?:\s+\d{10,}|\s+on\s+|\.|$)"),
    LazyRegex::new(r"(?i)([a-z][a-z\s]+?)\s+\d{10,}"),
    LazyRegex::new(r"(?i)paid\s+to\s+([a-z][a-z\s]+?)(?:\s+on\s+|\.|$)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionKind {
    PaymentTo,
    ReceivedFrom,
    WithdrawalFrom,
    Deposit,
}

impl DescriptionKind {
    pub fn render(self, counterparty: &str) -> String {
        match self {
            Self::PaymentTo => format!("Payment to {counterparty}"),
            Self::ReceivedFrom => format!("Received from {counterparty}"),
            Self::WithdrawalFrom => format!("Cash withdrawal from {counterparty}"),
            Self::Deposit => "Deposit to account".to_string(),
        }
    }

    const fn names_counterparty(self) -> bool {
        !matches!(self, Self::Deposit)
    }
}

pub struct Template {
    pub id: &'static str,
    pub transaction_type: TransactionType,
    pub base_confidence: f64,
    pub description: DescriptionKind,
    pub(crate) pattern: LazyRegex,
}

// Shared fragments, spliced with concat! so every template stays a literal.
macro_rules! receipt {
    () => {
        r"(?is)\b(?P<id>[a-z0-9]{8,15})\s+confirmed\.\s*"
    };
}
macro_rules! amount {
    () => {
        r"(?:ksh\.?\s*)?(?P<amount>\d[\d,]*(?:\.\d+)?)"
    };
}
macro_rules! party {
    () => {
        r"(?P<party>[a-z][a-z '&-]*?)(?:\s+\d{10,}|\s+on\b|\s+at\b|\s*\.)"
    };
}
macro_rules! when {
    () => {
        r"(?:\s+(?:on\s+)?(?P<date>\d{1,2}/\d{1,2}/\d{2,4}))?(?:\s+(?:at\s+)?(?P<time>\d{1,2}:\d{2}\s*[ap]m))?"
    };
}
macro_rules! balance {
    () => {
        r".*?\bbal(?:ance)?\b.*?(?:ksh\.?\s*)?(?P<balance>\d[\d,]*(?:\.\d+)?)"
    };
}

pub static TEMPLATES: [Template; 6] = [
    Template {
        id: "mpesa_send_verb_first",
        transaction_type: TransactionType::Debit,
        base_confidence: 0.95,
        description: DescriptionKind::PaymentTo,
        pattern: LazyRegex::new(concat!(
            receipt!(),
            r"(?:you\s+have\s+)?(?:sent|paid)\s+",
            amount!(),
            r"\s+to\s+",
            party!(),
            when!(),
            balance!()
        )),
    },
    Template {
        id: "mpesa_send",
        transaction_type: TransactionType::Debit,
        base_confidence: 0.95,
        description: DescriptionKind::PaymentTo,
        pattern: LazyRegex::new(concat!(
            receipt!(),
            amount!(),
            r"\s+(?:sent|paid)\s+to\s+",
            party!(),
            when!(),
            balance!()
        )),
    },
    Template {
        id: "mpesa_receive_verb_first",
        transaction_type: TransactionType::Credit,
        base_confidence: 0.95,
        description: DescriptionKind::ReceivedFrom,
        pattern: LazyRegex::new(concat!(
            receipt!(),
            r"(?:you\s+have\s+)?received\s+",
            amount!(),
            r"\s+from\s+",
            party!(),
            when!(),
            balance!()
        )),
    },
    Template {
        id: "mpesa_receive",
        transaction_type: TransactionType::Credit,
        base_confidence: 0.95,
        description: DescriptionKind::ReceivedFrom,
        pattern: LazyRegex::new(concat!(
            receipt!(),
            amount!(),
            r"\s+received\s+from\s+",
            party!(),
            when!(),
            balance!()
        )),
    },
    Template {
        id: "mpesa_withdraw",
        transaction_type: TransactionType::Debit,
        base_confidence: 0.95,
        description: DescriptionKind::WithdrawalFrom,
        pattern: LazyRegex::new(concat!(
            receipt!(),
            r"(?:you\s+have\s+)?withdrawn\s+",
            amount!(),
            r"\s+from\s+",
            party!(),
            when!(),
            balance!()
        )),
    },
    Template {
        id: "mpesa_deposit",
        transaction_type: TransactionType::Credit,
        base_confidence: 0.90,
        description: DescriptionKind::Deposit,
        pattern: LazyRegex::new(concat!(
            receipt!(),
            amount!(),
            r"\s+deposited(?:.*?\bon\s+(?P<date>\d{1,2}/\d{1,2}/\d{2,4}))?",
            r"(?:\s+at\s+(?P<time>\d{1,2}:\d{2}\s*[ap]m))?",
            balance!()
        )),
    },
];

/// Named groups captured by a template; any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapturedGroups {
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
    pub party: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub balance: Option<String>,
}

impl CapturedGroups {
    fn from_captures(captures: &Captures<'_>) -> Self {
        let group = |name: &str| {
            captures
                .name(name)
                .map(|value| value.as_str().trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            transaction_id: group("id"),
            amount: group("amount"),
            party: group("party"),
            date: group("date"),
            time: group("time"),
            balance: group("balance"),
        }
    }
}

pub struct TemplateMatch {
    pub template: &'static Template,
    pub confidence: f64,
    pub groups: CapturedGroups,
}

/// Quality boosts shared by every template, capped at 1.0.
pub fn boosted_confidence(base: f64, text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let mut confidence = base;
    if lowered.contains("confirmed") {
        confidence += CONFIRMED_BOOST;
    }
    if lowered.contains("balance") {
        confidence += BALANCE_BOOST;
    }
    if CURRENCY_DIGIT.is_match(text) {
        confidence += CURRENCY_BOOST;
    }
    confidence.min(1.0)
}

pub fn best_match(text: &str) -> Option<TemplateMatch> {
    let mut best: Option<TemplateMatch> = None;
    for template in &TEMPLATES {
        let Some(captures) = template.pattern.captures(text) else {
            continue;
        };
        let confidence = boosted_confidence(template.base_confidence, text);
        let current = best.as_ref().map_or(0.0, |value| value.confidence);
        if confidence > current {
            best = Some(TemplateMatch {
                template,
                confidence,
                groups: CapturedGroups::from_captures(&captures),
            });
        }
    }
    best
}

/// Name-like text after to/from or before a phone number, else `Unknown`.
pub fn fallback_counterparty(text: &str) -> String {
    COUNTERPARTY_FALLBACKS
        .iter()
        .filter_map(|pattern| pattern.first_group(text))
        .find(|name| name.chars().count() >= MIN_COUNTERPARTY_LEN)
        .unwrap_or_else(|| UNKNOWN_COUNTERPARTY.to_string())
}

impl TemplateMatch {
    /// Builds the record for this match; `None` when the receipt code or
    /// amount could not be recovered from the captures.
    pub fn to_record(&self, text: &str, processed_at: NaiveDateTime) -> Option<TransactionRecord> {
        let transaction_id = self.groups.transaction_id.clone()?;
        let amount = parse_amount(self.groups.amount.as_deref()?);
        let template = self.template;

        let counterparty = if template.description.names_counterparty() {
            Some(
                self.groups
                    .party
                    .clone()
                    .unwrap_or_else(|| fallback_counterparty(text)),
            )
        } else {
            None
        };

        let mut entities = ExtractedEntities::default();
        match template.transaction_type {
            TransactionType::Debit => entities.recipient = counterparty.clone(),
            TransactionType::Credit => entities.sender = counterparty.clone(),
        }

        let date = self
            .groups
            .date
            .as_deref()
            .and_then(|date| combine_date_time(date, self.groups.time.as_deref()))
            .unwrap_or(processed_at);

        Some(TransactionRecord {
            transaction_id,
            amount,
            balance_after: self.groups.balance.as_deref().map(parse_amount),
            transaction_type: template.transaction_type,
            category: classify_category(text, &entities),
            description: template
                .description
                .render(counterparty.as_deref().unwrap_or(UNKNOWN_COUNTERPARTY)),
            counterparty,
            date,
            original_text: text.to_string(),
            confidence_score: self.confidence,
            processing_method: ProcessingMethod::HighConfidencePattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use super::{
        COUNTERPARTY_FALLBACKS, CURRENCY_DIGIT, HIGH_CONFIDENCE_THRESHOLD, TEMPLATES, best_match,
        boosted_confidence, fallback_counterparty,
    };
    use crate::sms::types::{Category, TransactionType};

    fn processed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 1)
            .and_then(|day| day.and_hms_opt(8, 0, 0))
            .unwrap_or_default()
    }

    #[test]
    fn every_template_compiles() {
        for template in &TEMPLATES {
            assert!(template.pattern.get().is_some(), "{}", template.id);
            assert!((0.90..=0.95).contains(&template.base_confidence));
        }
        assert!(CURRENCY_DIGIT.get().is_some());
        for pattern in &COUNTERPARTY_FALLBACKS {
            assert!(pattern.get().is_some());
        }
    }

    #[test]
    fn deposit_confirmation_matches_with_boosted_confidence() {
        let text = "MPK1234567890 Confirmed. Ksh50,000.00 deposited to your account on 15/7/25 at 9:00 AM New M-PESA balance is Ksh52,500.00";
        let matched = best_match(text);
        assert!(matched.is_some());
        let Some(matched) = matched else {
            return;
        };
        assert_eq!(matched.template.id, "mpesa_deposit");
        assert!((matched.confidence - 0.97).abs() < 1e-9);
        assert_eq!(matched.groups.amount.as_deref(), Some("50,000.00"));
        assert_eq!(matched.groups.balance.as_deref(), Some("52,500.00"));
        assert_eq!(matched.groups.date.as_deref(), Some("15/7/25"));
        assert_eq!(matched.groups.time.as_deref(), Some("9:00 AM"));

        let record = matched.to_record(text, processed_at());
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.transaction_type, TransactionType::Credit);
            assert_eq!(record.category, Category::Deposit);
            assert_eq!(record.amount, Decimal::new(5_000_000, 2));
            assert_eq!(record.balance_after, Some(Decimal::new(5_250_000, 2)));
            assert_eq!(record.description, "Deposit to account");
            assert_eq!(record.counterparty, None);
            assert_eq!(record.date.to_string(), "2025-07-15 09:00:00");
        }
    }

    #[test]
    fn send_confirmation_captures_recipient_before_phone_number() {
        let text = "MPK1234567891 Confirmed. Ksh500.00 sent to JOHN DOE 254712345678 on 15/7/25 at 2:30 PM New M-PESA balance is Ksh52,000.00";
        let record = best_match(text).and_then(|matched| {
            assert_eq!(matched.template.id, "mpesa_send");
            matched.to_record(text, processed_at())
        });
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.counterparty.as_deref(), Some("JOHN DOE"));
            assert_eq!(record.description, "Payment to JOHN DOE");
            assert_eq!(record.transaction_type, TransactionType::Debit);
            assert_eq!(record.category, Category::Transfer);
            assert_eq!(record.date.to_string(), "2025-07-15 14:30:00");
            assert!(record.confidence_score >= HIGH_CONFIDENCE_THRESHOLD);
        }
    }

    #[test]
    fn withdrawal_keeps_location_and_balance_after_transaction_cost() {
        let text = "MPK1234567893 Confirmed. You have withdrawn Ksh5,000.00 from EQUITY BANK ATM WESTLANDS on 17/7/25 at 11:00 AM Transaction cost Ksh33.00 New balance is Ksh46,762.00";
        let record = best_match(text).and_then(|matched| matched.to_record(text, processed_at()));
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.description, "Cash withdrawal from EQUITY BANK ATM WESTLANDS");
            assert_eq!(record.category, Category::Withdraw);
            assert_eq!(record.balance_after, Some(Decimal::new(4_676_200, 2)));
        }
    }

    #[test]
    fn receive_confirmation_is_credit_from_sender() {
        let text = "MPK1234567894 Confirmed. Ksh2,000.00 received from JANE DOE 254798765432 on 17/7/25 at 6:20 PM New M-PESA balance is Ksh48,762.00";
        let record = best_match(text).and_then(|matched| matched.to_record(text, processed_at()));
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.transaction_type, TransactionType::Credit);
            assert_eq!(record.description, "Received from JANE DOE");
        }
    }

    #[test]
    fn receipt_code_is_stored_as_written() {
        let text = "mpk1234567895 confirmed. Ksh750.00 sent to MARY WANJIRU 254711223344 on 18/7/25 at 8:05 AM New M-PESA balance is Ksh48,012.00";
        let record = best_match(text).and_then(|matched| matched.to_record(text, processed_at()));
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.transaction_id, "mpk1234567895");
            assert!(record.original_text.starts_with(&record.transaction_id));
        }
    }

    #[test]
    fn short_receipt_codes_and_informal_texts_do_not_match() {
        assert!(best_match("TX123 Confirmed. Ksh500.00 sent to JOHN DOE 254712345678 on 15/7/25 at 2:30 PM New M-PESA balance is Ksh2,500.00").is_none());
        assert!(best_match("M-Pesa: Sent 1000 to mama on 20/7/25. New balance 45137").is_none());
    }

    #[test]
    fn boosts_are_additive_and_capped() {
        assert!((boosted_confidence(0.90, "plain") - 0.90).abs() < 1e-9);
        assert!((boosted_confidence(0.90, "Confirmed balance Ksh 5") - 0.97).abs() < 1e-9);
        assert!((boosted_confidence(0.99, "confirmed balance ksh5") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn counterparty_fallback_requires_meaningful_names() {
        assert_eq!(fallback_counterparty("sent to JOHN on Monday"), "JOHN");
        assert_eq!(fallback_counterparty("to AB."), "Unknown");
        assert_eq!(fallback_counterparty("nothing"), "Unknown");
    }
}
