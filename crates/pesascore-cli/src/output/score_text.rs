use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, array_field, format_timestamp, i64_field, str_field};

const FACTOR_LABELS: [(&str, &str); 6] = [
    ("base_score", "Base score:"),
    ("transaction_frequency", "Transaction frequency:"),
    ("average_balance", "Average balance:"),
    ("income_regularity", "Income regularity:"),
    ("payment_history", "Payment history:"),
    ("overdraft_penalty", "Overdraft penalty:"),
];

pub fn render_score_compute(data: &Value) -> io::Result<String> {
    let stored = data
        .get("stored")
        .ok_or_else(|| io::Error::other("score compute output requires stored score"))?;

    let mut lines = vec![
        format!(
            "Credit score for `{}`: {} ({})",
            str_field(data, "subject_ref"),
            i64_field(stored, "score"),
            str_field(stored, "rating")
        ),
        String::new(),
        "Factors:".to_string(),
    ];
    lines.extend(factor_rows(stored));

    let tips = array_field(stored, "improvement_tips");
    lines.push(String::new());
    if tips.is_empty() {
        lines.push("No improvement tips. Every factor is at its best band.".to_string());
    } else {
        lines.push("How to improve:".to_string());
        for (index, tip) in tips.iter().enumerate() {
            lines.push(format!("  {}. {}", index + 1, tip.as_str().unwrap_or("")));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Recorded as entry {} of this subject's history.",
        i64_field(stored, "sequence")
    ));
    Ok(lines.join("\n"))
}

pub fn render_score_history(data: &Value) -> io::Result<String> {
    let history = data
        .get("history")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("score history output requires history"))?;
    let subject_ref = str_field(data, "subject_ref");

    if history.is_empty() {
        return Ok([
            format!("No scores recorded for `{subject_ref}` yet."),
            String::new(),
            "Compute one first:".to_string(),
            format!("  pesascore score compute --subject {subject_ref} <profile.json>"),
        ]
        .join("\n"));
    }

    let columns = [
        Column {
            name: "#",
            align: Align::Right,
        },
        Column {
            name: "Recorded",
            align: Align::Left,
        },
        Column {
            name: "Score",
            align: Align::Right,
        },
        Column {
            name: "Rating",
            align: Align::Left,
        },
    ];
    let rows = history
        .iter()
        .map(|row| {
            vec![
                i64_field(row, "sequence").to_string(),
                format_timestamp(str_field(row, "created_at")),
                i64_field(row, "score").to_string(),
                str_field(row, "rating").to_string(),
            ]
        })
        .collect::<Vec<_>>();

    let current = &history[0];
    let mut lines = vec![
        format!(
            "Current score for `{subject_ref}`: {} ({})",
            i64_field(current, "score"),
            str_field(current, "rating")
        ),
        String::new(),
        "History (newest first):".to_string(),
    ];
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Score",
    ));
    Ok(lines.join("\n"))
}

fn factor_rows(stored: &Value) -> Vec<String> {
    let factors = stored.get("factors").unwrap_or(&Value::Null);
    let entries = FACTOR_LABELS
        .iter()
        .map(|(key, label)| (*label, format!("{:+}", i64_field(factors, key))))
        .collect::<Vec<_>>();
    format::key_value_rows(&entries, 2)
}
