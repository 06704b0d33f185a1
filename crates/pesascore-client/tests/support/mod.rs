#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use pesascore_client::SuccessEnvelope;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

/// Receipts from one week of a salaried account, 15-17 July 2025.
pub const DEMO_MESSAGES: [&str; 5] = [
    "MPK1234567890 Confirmed. Ksh50,000.00 deposited to your account on 15/7/25 at 9:00 AM New M-PESA balance is Ksh52,500.00",
    "MPK1234567891 Confirmed. Ksh500.00 sent to JOHN DOE 254712345678 on 15/7/25 at 2:30 PM New M-PESA balance is Ksh52,000.00",
    "MPK1234567892 Confirmed. Ksh200.00 paid to SAFARICOM LIMITED on 16/7/25 at 10:15 AM Transaction cost Ksh5.00 New M-PESA balance is Ksh51,795.00",
    "MPK1234567893 Confirmed. You have withdrawn Ksh5,000.00 from EQUITY BANK ATM WESTLANDS on 17/7/25 at 11:00 AM Transaction cost Ksh33.00 New balance is Ksh46,762.00",
    "MPK1234567894 Confirmed. Ksh2,000.00 received from JANE DOE 254798765432 on 17/7/25 at 6:20 PM Transaction cost Ksh0.00 New M-PESA balance is Ksh48,762.00",
];

pub const CHATTER_MESSAGE: &str = "Hello, are we meeting today?";

pub fn temp_home() -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let home = dir.path().join("ledger-home");
    Ok((dir, home))
}

pub fn write_file(path: &Path, body: &str) {
    let result = fs::write(path, body);
    assert!(result.is_ok());
}

pub fn json_messages(messages: &[&str]) -> String {
    serde_json::to_string(messages).unwrap_or_default()
}

pub fn processed_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 1)
        .and_then(|day| day.and_hms_opt(8, 0, 0))
        .unwrap_or_default()
}

pub fn decimal_field(value: &Value) -> Option<Decimal> {
    value.as_str().and_then(|text| text.parse::<Decimal>().ok())
}

pub fn envelope_json(envelope: &SuccessEnvelope) -> Value {
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}
