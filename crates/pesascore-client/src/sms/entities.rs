use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::sms::LazyRegex;
use crate::sms::date::combine_date_time;

static AMOUNT_TOKEN: LazyRegex = LazyRegex::new(
    r"(?i)(?:\bksh\.?\s*|\b)(\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)\b",
);
static TRANSACTION_ID: LazyRegex = LazyRegex::new(r"\b([A-Z]{2,3}\w{7,12})\b");
static DATE_TOKEN: LazyRegex = LazyRegex::new(r"(\d{1,2}/\d{1,2}/\d{2,4})");
static RECIPIENT: LazyRegex =
    LazyRegex::new(r"(?i)\bto\s+([a-z\s]+?)(?:\s+\d{10,}|\s+on\s+|\.|$)");
static SENDER: LazyRegex =
    LazyRegex::new(r"(?i)\bfrom\s+([a-z\s]+?)(?:\s+\d{10,}|\s+on\s+|\.|$)");
static NON_NUMERIC: LazyRegex = LazyRegex::new(r"[^\d.]");

/// Entities pulled out of free message text. Every field is optional;
/// callers decide which absences are fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedEntities {
    pub amount: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
}

impl ExtractedEntities {
    pub fn counterparty(&self) -> Option<&str> {
        self.recipient.as_deref().or(self.sender.as_deref())
    }
}

/// First monetary token is the amount; the last one, when there are at least
/// two, is the closing balance. Texts carrying three or more numbers (dates,
/// phone numbers, fee lines) can pick the wrong values.
pub fn extract(text: &str) -> ExtractedEntities {
    let amounts = amount_tokens(text);
    let amount = amounts.first().map(|token| parse_amount(token));
    let balance = if amounts.len() > 1 {
        amounts.last().map(|token| parse_amount(token))
    } else {
        None
    };

    let lowered = text.to_lowercase();
    let recipient = if lowered.contains("to ") {
        RECIPIENT.first_group(text)
    } else {
        None
    };
    let sender = if lowered.contains("from ") {
        SENDER.first_group(text)
    } else {
        None
    };

    ExtractedEntities {
        amount,
        balance,
        transaction_id: TRANSACTION_ID.first_group(text),
        date: DATE_TOKEN
            .first_group(text)
            .and_then(|token| combine_date_time(&token, None)),
        recipient,
        sender,
    }
}

pub fn amount_tokens(text: &str) -> Vec<String> {
    let Some(regex) = AMOUNT_TOKEN.get() else {
        return Vec::new();
    };
    regex
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Strips everything but digits and the decimal point; residue that still
/// fails to parse yields zero rather than an error.
pub fn parse_amount(raw: &str) -> Decimal {
    let cleaned = match NON_NUMERIC.get() {
        Some(regex) => regex.replace_all(raw, "").into_owned(),
        None => raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect(),
    };
    let mut value = Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO);
    value.rescale(2);
    value
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        AMOUNT_TOKEN, DATE_TOKEN, NON_NUMERIC, RECIPIENT, SENDER, TRANSACTION_ID, amount_tokens,
        extract, parse_amount,
    };

    #[test]
    fn all_entity_patterns_compile() {
        for pattern in [
            &AMOUNT_TOKEN,
            &TRANSACTION_ID,
            &DATE_TOKEN,
            &RECIPIENT,
            &SENDER,
            &NON_NUMERIC,
        ] {
            assert!(pattern.get().is_some());
        }
    }

    #[test]
    fn informal_send_message_yields_amount_balance_and_recipient() {
        let entities = extract("M-Pesa: Sent 1000 to mama on 20/7/25. New balance 45137");
        assert_eq!(entities.amount, Some(Decimal::new(100_000, 2)));
        assert_eq!(entities.balance, Some(Decimal::new(4_513_700, 2)));
        assert_eq!(entities.recipient.as_deref(), Some("mama"));
        assert_eq!(entities.sender, None);
        assert_eq!(entities.transaction_id, None);
        assert!(entities.date.is_some());
    }

    #[test]
    fn receipt_code_digits_are_not_read_as_amounts() {
        let text = "MPK1234567890 Confirmed. Ksh50,000.00 deposited to your account on 15/7/25 at 9:00 AM New M-PESA balance is Ksh52,500.00";
        let tokens = amount_tokens(text);
        assert_eq!(tokens.first().map(String::as_str), Some("50,000.00"));
        assert_eq!(tokens.last().map(String::as_str), Some("52,500.00"));

        let entities = extract(text);
        assert_eq!(entities.transaction_id.as_deref(), Some("MPK1234567890"));
        assert_eq!(entities.amount, Some(Decimal::new(5_000_000, 2)));
        assert_eq!(entities.balance, Some(Decimal::new(5_250_000, 2)));
    }

    #[test]
    fn sender_stops_before_phone_number() {
        let entities = extract("Ksh2,000.00 received from JANE DOE 254798765432 on 17/7/25");
        assert_eq!(entities.sender.as_deref(), Some("JANE DOE"));
    }

    #[test]
    fn single_number_sets_amount_without_balance() {
        let entities = extract("Paid 250 for lunch");
        assert_eq!(entities.amount, Some(Decimal::new(25_000, 2)));
        assert_eq!(entities.balance, None);
    }

    #[test]
    fn amount_parsing_never_fails() {
        assert_eq!(parse_amount("Ksh1,500.00"), Decimal::new(150_000, 2));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("1.2.3"), Decimal::ZERO);
        assert_eq!(parse_amount("1000").to_string(), "1000.00");
    }
}
