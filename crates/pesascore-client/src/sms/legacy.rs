//! The strict five-format rule set used as the last parsing stage.
//!
//! Each rule wants the canonical `<code> Confirmed. Ksh<amount>.<cents>`
//! prefix plus a `balance is Ksh` tail, and yields confidence 0.60.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::sms::LazyRegex;
use crate::sms::date::combine_date_time;
use crate::sms::entities::parse_amount;
use crate::sms::types::{Category, ProcessingMethod, TransactionRecord, TransactionType};

pub const LEGACY_CONFIDENCE: f64 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyKind {
    Sent,
    Received,
    Paid,
    Withdrawn,
    Deposited,
}

impl LegacyKind {
    fn describe(self, party: Option<&str>) -> String {
        let party = party.unwrap_or_default();
        match self {
            Self::Sent => format!("Money sent to {party}"),
            Self::Received => format!("Money received from {party}"),
            Self::Paid => format!("Payment to {party}"),
            Self::Withdrawn => format!("Cash withdrawal from {party}"),
            Self::Deposited => "Deposit to account".to_string(),
        }
    }
}

pub struct LegacyRule {
    pub kind: LegacyKind,
    pub transaction_type: TransactionType,
    pub default_category: Category,
    pub(crate) pattern: LazyRegex,
}

pub static LEGACY_RULES: [LegacyRule; 5] = [
    LegacyRule {
        kind: LegacyKind::Sent,
        transaction_type: TransactionType::Debit,
        default_category: Category::Transfer,
        pattern: LazyRegex::new(
            r"(?i)(?P<id>\w+)\s+Confirmed\.\s+Ksh(?P<amount>[\d,]+\.\d{2})\s+sent\s+to\s+(?P<party>.+?)\s+\d+\s+on\s+(?P<date>\d+/\d+/\d+)\s+at\s+(?P<time>[\d:]+\s+[AP]M).*?balance\s+is\s+Ksh(?P<balance>[\d,]+\.\d{2})",
        ),
    },
    LegacyRule {
        kind: LegacyKind::Received,
        transaction_type: TransactionType::Credit,
        default_category: Category::Transfer,
        pattern: LazyRegex::new(
            r"(?i)(?P<id>\w+)\s+Confirmed\.\s+Ksh(?P<amount>[\d,]+\.\d{2})\s+received\s+from\s+(?P<party>.+?)\s+\d+\s+on\s+(?P<date>\d+/\d+/\d+)\s+at\s+(?P<time>[\d:]+\s+[AP]M).*?balance\s+is\s+Ksh(?P<balance>[\d,]+\.\d{2})",
        ),
    },
    LegacyRule {
        kind: LegacyKind::Paid,
        transaction_type: TransactionType::Debit,
        default_category: Category::Bills,
        pattern: LazyRegex::new(
            r"(?i)(?P<id>\w+)\s+Confirmed\.\s+Ksh(?P<amount>[\d,]+\.\d{2})\s+paid\s+to\s+(?P<party>.+?)\s+on\s+(?P<date>\d+/\d+/\d+)\s+at\s+(?P<time>[\d:]+\s+[AP]M).*?balance\s+is\s+Ksh(?P<balance>[\d,]+\.\d{2})",
        ),
    },
    LegacyRule {
        kind: LegacyKind::Withdrawn,
        transaction_type: TransactionType::Debit,
        default_category: Category::Withdraw,
        pattern: LazyRegex::new(
            r"(?i)(?P<id>\w+)\s+Confirmed\.\s+You\s+have\s+withdrawn\s+Ksh(?P<amount>[\d,]+\.\d{2})\s+from\s+(?P<party>.+?)\s+on\s+(?P<date>\d+/\d+/\d+)\s+at\s+(?P<time>[\d:]+\s+[AP]M).*?balance\s+is\s+Ksh(?P<balance>[\d,]+\.\d{2})",
        ),
    },
    LegacyRule {
        kind: LegacyKind::Deposited,
        transaction_type: TransactionType::Credit,
        default_category: Category::Salary,
        pattern: LazyRegex::new(
            r"(?i)(?P<id>\w+)\s+Confirmed\.\s+Ksh(?P<amount>[\d,]+\.\d{2})\s+deposited\s+to\s+your\s+account\s+on\s+(?P<date>\d+/\d+/\d+)\s+at\s+(?P<time>[\d:]+\s+[AP]M).*?balance\s+is\s+Ksh(?P<balance>[\d,]+\.\d{2})",
        ),
    },
];

/// Merchant names checked against the upper-cased description, in order.
pub const MERCHANT_CATEGORIES: [(&str, Category); 11] = [
    ("SAFARICOM", Category::Bills),
    ("KPLC", Category::Bills),
    ("NAIROBI WATER", Category::Bills),
    ("NAIVAS", Category::Shopping),
    ("TUSKYS", Category::Shopping),
    ("EQUITY BANK", Category::Withdraw),
    ("KCB", Category::Withdraw),
    ("COOP BANK", Category::Withdraw),
    ("UBER", Category::Transport),
    ("BOLT", Category::Transport),
    ("JUMIA", Category::Shopping),
];

/// Whole-word cues tried when no merchant name matches.
pub const WORD_CATEGORIES: [(&[&str], Category); 5] = [
    (&["SUPERMARKET", "SHOP", "STORE"], Category::Shopping),
    (&["MATATU", "BUS", "TRANSPORT"], Category::Transport),
    (&["RESTAURANT", "CAFE", "FOOD"], Category::Food),
    (&["ATM", "AGENT", "WITHDRAW"], Category::Withdraw),
    (&["SALARY", "WAGE", "PAY"], Category::Salary),
];

pub fn refine_category(description: &str, default: Category) -> Category {
    let upper = description.to_uppercase();
    if let Some((_, category)) = MERCHANT_CATEGORIES
        .iter()
        .find(|(merchant, _)| upper.contains(merchant))
    {
        return *category;
    }

    let words: Vec<&str> = upper
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    WORD_CATEGORIES
        .iter()
        .find(|(cues, _)| cues.iter().any(|cue| words.contains(cue)))
        .map_or(default, |(_, category)| *category)
}

/// First rule that matches the trimmed text, as a legacy-stage record.
pub fn parse(text: &str, processed_at: NaiveDateTime) -> Option<TransactionRecord> {
    let trimmed = text.trim();
    LEGACY_RULES
        .iter()
        .find_map(|rule| rule.apply(trimmed, processed_at))
}

impl LegacyRule {
    fn apply(&self, text: &str, processed_at: NaiveDateTime) -> Option<TransactionRecord> {
        let captures = self.pattern.captures(text)?;
        let group = |name: &str| {
            captures
                .name(name)
                .map(|value| value.as_str().trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let transaction_id = group("id")?;
        let amount = parse_amount(&group("amount")?);
        let party = group("party");
        let description = self.kind.describe(party.as_deref());
        let date = group("date")
            .and_then(|date| combine_date_time(&date, group("time").as_deref()))
            .unwrap_or(processed_at);

        Some(TransactionRecord {
            transaction_id,
            amount,
            balance_after: group("balance").as_deref().map(parse_amount),
            transaction_type: self.transaction_type,
            category: refine_category(&description, self.default_category),
            description,
            counterparty: party,
            date,
            original_text: text.to_string(),
            confidence_score: LEGACY_CONFIDENCE,
            processing_method: ProcessingMethod::LegacyFallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use super::{LEGACY_CONFIDENCE, LEGACY_RULES, parse, refine_category};
    use crate::sms::types::{Category, ProcessingMethod, TransactionType};

    fn processed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 1)
            .and_then(|day| day.and_hms_opt(8, 0, 0))
            .unwrap_or_default()
    }

    #[test]
    fn every_rule_compiles() {
        for rule in &LEGACY_RULES {
            assert!(rule.pattern.get().is_some(), "{:?}", rule.kind);
        }
    }

    #[test]
    fn short_receipt_send_parses_as_transfer() {
        let record = parse(
            "TX123 Confirmed. Ksh500.00 sent to JOHN DOE 254712345678 on 15/7/25 at 2:30 PM New M-PESA balance is Ksh2,500.00",
            processed_at(),
        );
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.transaction_id, "TX123");
            assert_eq!(record.amount, Decimal::new(50_000, 2));
            assert_eq!(record.balance_after, Some(Decimal::new(250_000, 2)));
            assert_eq!(record.transaction_type, TransactionType::Debit);
            assert_eq!(record.category, Category::Transfer);
            assert_eq!(record.description, "Money sent to JOHN DOE");
            assert_eq!(record.date.to_string(), "2025-07-15 14:30:00");
            assert_eq!(record.confidence_score, LEGACY_CONFIDENCE);
            assert_eq!(record.processing_method, ProcessingMethod::LegacyFallback);
        }
    }

    #[test]
    fn payment_category_comes_from_merchant_table() {
        let record = parse(
            "QX1 Confirmed. Ksh200.00 paid to SAFARICOM on 15/7/25 at 2:30 PM New M-PESA balance is Ksh2,300.00",
            processed_at(),
        );
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.category, Category::Bills);
            assert_eq!(record.description, "Payment to SAFARICOM");
        }
    }

    #[test]
    fn deposit_defaults_to_salary() {
        let record = parse(
            "QX2 Confirmed. Ksh50,000.00 deposited to your account on 15/7/25 at 2:30 PM New balance is Ksh52,000.00",
            processed_at(),
        );
        assert!(record.is_some());
        if let Some(record) = record {
            assert_eq!(record.category, Category::Salary);
            assert_eq!(record.transaction_type, TransactionType::Credit);
            assert_eq!(record.counterparty, None);
        }
    }

    #[test]
    fn amounts_without_cents_are_rejected() {
        assert!(
            parse(
                "QX3 Confirmed. Ksh500 sent to JOHN 254712345678 on 15/7/25 at 2:30 PM balance is Ksh2,500.00",
                processed_at(),
            )
            .is_none()
        );
    }

    #[test]
    fn category_refinement_prefers_merchants_then_words() {
        assert_eq!(
            refine_category("Payment to NAIVAS KAREN", Category::Bills),
            Category::Shopping
        );
        assert_eq!(
            refine_category("Money sent to CITY BUS", Category::Transfer),
            Category::Transport
        );
        assert_eq!(
            refine_category("Payment to JOHN", Category::Bills),
            Category::Bills
        );
    }
}
