use crate::funding::types::FundingApplication;

const QUALITY_KEYWORDS: [&str; 4] = ["market", "customer", "revenue", "growth"];

pub const MARKET_KEYWORDS: [&str; 9] = [
    "market",
    "customer",
    "target audience",
    "competition",
    "competitive advantage",
    "market size",
    "market opportunity",
    "customer problem",
    "solution",
];

/// Completeness heuristic for free-text answers, in [0, 1].
///
/// Empty text scores 0. Short text, sparse wording, and fewer than three
/// period-separated segments step down to 0.3, 0.4 and 0.6. Otherwise the
/// base 0.7 gains 0.1 each for length over twice the minimum, a domain
/// keyword, and more than fifty words.
pub fn text_quality(text: &str, min_chars: usize) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let trimmed = text.trim();
    if trimmed.chars().count() < min_chars {
        return 0.3;
    }
    let word_count = trimmed.split_whitespace().count();
    if word_count < min_chars / 10 {
        return 0.4;
    }
    if trimmed.split('.').count() < 3 {
        return 0.6;
    }

    let lowered = trimmed.to_lowercase();
    let mut score: f64 = 0.7;
    if trimmed.chars().count() > min_chars * 2 {
        score += 0.1;
    }
    if QUALITY_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        score += 0.1;
    }
    if word_count > 50 {
        score += 0.1;
    }
    score.min(1.0)
}

/// Share of market-vocabulary phrases present in the description.
pub fn market_keyword_density(description: &str) -> f64 {
    if description.is_empty() {
        return 0.0;
    }
    let lowered = description.to_lowercase();
    let hits = MARKET_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count();
    (hits as f64 / MARKET_KEYWORDS.len() as f64).min(1.0)
}

/// Website 0.4, LinkedIn, Instagram and YouTube 0.2 each.
pub fn online_presence(application: &FundingApplication) -> f64 {
    let present = |value: &Option<String>| value.as_deref().is_some_and(|url| !url.trim().is_empty());
    let mut score = 0.0;
    if present(&application.portfolio_website) {
        score += 0.4;
    }
    for profile in [
        &application.linkedin_profile,
        &application.instagram_profile,
        &application.youtube_profile,
    ] {
        if present(profile) {
            score += 0.2;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::{market_keyword_density, text_quality};

    #[test]
    fn quality_steps_follow_length_words_and_sentences() {
        assert_eq!(text_quality("", 50), 0.0);
        assert_eq!(text_quality("   ", 50), 0.3);
        assert_eq!(text_quality("too short", 50), 0.3);
        assert_eq!(text_quality(&"x".repeat(60), 50), 0.4);
        assert_eq!(
            text_quality("We build irrigation sensors for smallholder farmers in Kenya today", 50),
            0.6
        );
    }

    #[test]
    fn quality_bonuses_are_capped_at_one() {
        let base = "We sell seeds. Farmers buy them. They plant them.";
        assert!((text_quality(base, 20) - 0.8).abs() < 1e-9);

        let rich = "Our market is large. Customers return monthly. Revenue grows steadily. "
            .repeat(6);
        assert!((text_quality(&rich, 20) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn keyword_density_counts_distinct_phrases() {
        assert_eq!(market_keyword_density(""), 0.0);
        let density = market_keyword_density("Our solution targets the customer problem of market access");
        // market, customer, customer problem, solution
        assert!((density - 4.0 / 9.0).abs() < 1e-9);
    }
}
