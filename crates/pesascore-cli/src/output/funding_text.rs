use std::io;

use serde_json::Value;

use super::format::{self, array_field, f64_field, format_percent, i64_field, str_field};

pub fn render_funding_analysis(data: &Value) -> io::Result<String> {
    let analysis = data
        .get("analysis")
        .ok_or_else(|| io::Error::other("funding analyze output requires analysis"))?;
    let risk = analysis.get("risk_assessment").unwrap_or(&Value::Null);
    let completion = data.get("completion_status").unwrap_or(&Value::Null);

    let mut lines = vec![
        format!("Funding analysis for {}:", str_field(data, "business_name")),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            (
                "Creditworthiness:",
                format!("{:.1} / 100", f64_field(analysis, "creditworthiness_score")),
            ),
            (
                "Business viability:",
                format!("{:.1} / 100", f64_field(analysis, "business_viability_score")),
            ),
            (
                "Risk level:",
                format!(
                    "{} ({:.2})",
                    str_field(risk, "risk_level"),
                    f64_field(risk, "risk_score")
                ),
            ),
            (
                "Completion:",
                format_percent(f64_field(completion, "percentage")),
            ),
        ],
        2,
    ));
    let description = str_field(risk, "description");
    if !description.is_empty() {
        lines.push(String::new());
        lines.push(description.to_string());
    }

    lines.extend(bullet_section("Strengths:", array_field(analysis, "strengths")));
    lines.extend(bullet_section(
        "Areas for improvement:",
        array_field(analysis, "areas_for_improvement"),
    ));
    lines.extend(bullet_section("Risk flags:", array_field(risk, "risk_flags")));
    lines.extend(recommendation_section(array_field(analysis, "recommendations")));
    lines.extend(bullet_section(
        "Missing from the application:",
        array_field(completion, "missing_elements"),
    ));
    lines.extend(profile_section(data));
    Ok(lines.join("\n"))
}

fn bullet_section(title: &str, items: &[Value]) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), title.to_string()];
    lines.extend(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|item| format!("  - {item}")),
    );
    lines
}

fn recommendation_section(recommendations: &[Value]) -> Vec<String> {
    if recommendations.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Recommendations:".to_string()];
    for (index, item) in recommendations.iter().enumerate() {
        lines.push(format!(
            "  {}. [{} / {}] {}",
            index + 1,
            str_field(item, "priority"),
            str_field(item, "category"),
            str_field(item, "recommendation")
        ));
        for action in array_field(item, "action_items").iter().filter_map(Value::as_str) {
            lines.push(format!("       - {action}"));
        }
    }
    lines
}

fn profile_section(data: &Value) -> Vec<String> {
    let Some(profile) = data.get("financial_profile").filter(|value| !value.is_null()) else {
        return Vec::new();
    };
    let mut lines = vec![
        String::new(),
        format!(
            "Credit profile for `{}`: {} ({})",
            str_field(data, "subject_ref"),
            i64_field(profile, "credit_score"),
            str_field(profile, "rating")
        ),
    ];
    for advice in array_field(data, "recommendations") {
        lines.push(format!(
            "  - [{}] {}",
            str_field(advice, "priority"),
            str_field(advice, "message")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_funding_analysis;

    fn analysis_data() -> serde_json::Value {
        json!({
            "business_name": "Moonshot",
            "subject_ref": "founder",
            "analysis": {
                "creditworthiness_score": 31.25,
                "business_viability_score": 40.0,
                "risk_assessment": {
                    "risk_level": "High",
                    "risk_score": 1.14,
                    "description": "This application carries significant risks requiring careful evaluation.",
                    "risk_flags": ["High market risk in marketplace industry"]
                },
                "recommendations": [{
                    "category": "Funding Strategy",
                    "priority": "High",
                    "recommendation": "Consider staged funding approach",
                    "action_items": ["Break funding into smaller tranches tied to milestones"]
                }],
                "strengths": [],
                "areas_for_improvement": ["Application completeness and documentation"]
            },
            "completion_status": {"percentage": 40.0, "missing_elements": ["Portfolio/company website"]},
            "financial_profile": {"credit_score": 500, "rating": "Poor"},
            "recommendations": [{"type": "credit_improvement", "priority": "high", "message": "Consider improving your credit score before applying for larger funding amounts"}]
        })
    }

    #[test]
    fn analysis_output_covers_scores_risk_and_advice() {
        let rendered = render_funding_analysis(&analysis_data());
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Funding analysis for Moonshot:"));
            assert!(text.contains("31.2 / 100") || text.contains("31.3 / 100"));
            assert!(text.contains("High (1.14)"));
            assert!(text.contains("  1. [High / Funding Strategy] Consider staged funding approach"));
            assert!(text.contains("       - Break funding into smaller tranches"));
            assert!(text.contains("  - Portfolio/company website"));
            assert!(text.contains("Credit profile for `founder`: 500 (Poor)"));
            assert!(!text.contains("Strengths:"));
        }
    }

    #[test]
    fn analysis_without_profile_omits_credit_section() {
        let mut data = analysis_data();
        data["financial_profile"] = serde_json::Value::Null;
        let rendered = render_funding_analysis(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(!text.contains("Credit profile"));
        }
    }
}
