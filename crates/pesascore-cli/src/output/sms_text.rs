use std::io;

use serde_json::Value;

use super::format::{
    self, Align, Column, array_field, f64_field, format_ksh, format_percent, format_timestamp,
    i64_field, str_field,
};

const TRANSACTION_COLUMNS: [Column<'static>; 6] = [
    Column {
        name: "Date",
        align: Align::Left,
    },
    Column {
        name: "Transaction ID",
        align: Align::Left,
    },
    Column {
        name: "Type",
        align: Align::Left,
    },
    Column {
        name: "Category",
        align: Align::Left,
    },
    Column {
        name: "Counterparty",
        align: Align::Left,
    },
    Column {
        name: "Amount",
        align: Align::Right,
    },
];

pub fn render_sms_parse(data: &Value) -> io::Result<String> {
    let stats = data
        .get("stats")
        .ok_or_else(|| io::Error::other("sms parse output requires stats"))?;
    let transactions = array_field(data, "transactions");

    let mut lines = vec![
        format!(
            "Parsed {} of {} messages.",
            i64_field(stats, "successful"),
            i64_field(stats, "total_processed")
        ),
        String::new(),
        "Summary:".to_string(),
    ];
    lines.extend(stats_rows(data, stats));

    if !transactions.is_empty() {
        lines.push(String::new());
        lines.push("Transactions:".to_string());
        lines.extend(transaction_table(transactions, "date"));
    }
    lines.extend(failure_section(data));

    lines.push(String::new());
    lines.push("Nothing was stored. To keep these transactions, run:".to_string());
    lines.push("  pesascore sms import --account <ref> <path>".to_string());
    Ok(lines.join("\n"))
}

pub fn render_sms_import(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("sms import output requires summary"))?;
    let account_ref = str_field(data, "account_ref");

    let mut lines = vec![
        str_field(data, "message").to_string(),
        String::new(),
        "Summary:".to_string(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Import ID:", str_field(data, "import_id").to_string()),
            ("Account:", account_ref.to_string()),
            ("Source:", str_field(data, "source_used").to_string()),
            ("Messages read:", i64_field(summary, "messages_read").to_string()),
            ("Parsed:", i64_field(summary, "parsed").to_string()),
            ("Failed:", i64_field(summary, "failed").to_string()),
            ("Inserted:", i64_field(summary, "inserted").to_string()),
            ("Duplicates:", i64_field(summary, "duplicates").to_string()),
        ],
        2,
    ));
    lines.extend(duplicate_section(data));
    lines.extend(failure_section(data));

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    lines.push(format!("  pesascore sms list --account {account_ref}"));
    lines.push(format!("  pesascore account summary --account {account_ref}"));
    Ok(lines.join("\n"))
}

pub fn render_sms_list(data: &Value) -> io::Result<String> {
    let transactions = data
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("sms list output requires transactions"))?;
    let account_ref = str_field(data, "account_ref");

    if transactions.is_empty() {
        return Ok(format!(
            "No transactions matched for account `{account_ref}`.\n\nTry removing --type, --category or --since."
        ));
    }

    let count_label = if transactions.len() == 1 {
        "1 transaction found.".to_string()
    } else {
        format!("{} transactions found.", transactions.len())
    };
    let mut lines = vec![count_label, String::new(), "Transactions:".to_string()];
    lines.extend(transaction_table(transactions, "occurred_at"));
    Ok(lines.join("\n"))
}

fn stats_rows(data: &Value, stats: &Value) -> Vec<String> {
    let rates = data.get("rates").unwrap_or(&Value::Null);
    format::key_value_rows(
        &[
            ("Source:", str_field(data, "source_used").to_string()),
            (
                "Template matches:",
                i64_field(stats, "high_confidence").to_string(),
            ),
            (
                "Semantic matches:",
                i64_field(stats, "semantic_fallback").to_string(),
            ),
            (
                "Fallback matches:",
                i64_field(stats, "legacy_fallback").to_string(),
            ),
            ("Failed:", i64_field(stats, "failed").to_string()),
            (
                "Success rate:",
                format_percent(f64_field(rates, "success_rate")),
            ),
        ],
        2,
    )
}

fn transaction_table(transactions: &[Value], date_key: &str) -> Vec<String> {
    let rows = transactions
        .iter()
        .map(|row| {
            let counterparty = row
                .get("counterparty")
                .and_then(Value::as_str)
                .unwrap_or("-");
            vec![
                format_timestamp(str_field(row, date_key)),
                str_field(row, "transaction_id").to_string(),
                str_field(row, "transaction_type").to_string(),
                str_field(row, "category").to_string(),
                counterparty.to_string(),
                format_ksh(row.get("amount").unwrap_or(&Value::Null)),
            ]
        })
        .collect::<Vec<_>>();
    format::render_table_or_blocks(
        &TRANSACTION_COLUMNS,
        &rows,
        format::terminal_width(),
        "Transaction",
    )
}

fn duplicate_section(data: &Value) -> Vec<String> {
    let duplicates = array_field(data, "duplicate_rows");
    if duplicates.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new(), "Skipped duplicates:".to_string()];
    for row in duplicates {
        let reason = match str_field(row, "dedupe_reason") {
            "batch" => "repeated in this input",
            _ => "already in the ledger",
        };
        lines.push(format!(
            "  Message {}: {} ({reason})",
            i64_field(row, "message_index"),
            str_field(row, "transaction_id")
        ));
    }
    lines
}

fn failure_section(data: &Value) -> Vec<String> {
    let failures = array_field(data, "failures");
    if failures.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new(), "Unrecognized messages:".to_string()];
    for failure in failures {
        let text = str_field(failure, "original_text");
        let preview = if text.chars().count() > 60 {
            format!("{}...", text.chars().take(57).collect::<String>())
        } else {
            text.to_string()
        };
        lines.push(format!(
            "  - {preview} ({})",
            str_field(failure, "error_reason")
        ));
    }
    lines
}
