use serde::Serialize;

use crate::sms::LazyRegex;
use crate::sms::entities::ExtractedEntities;
use crate::sms::types::{Category, TransactionType};

pub const CREDIT_CUES: [&str; 6] = [
    "received",
    "deposited",
    "credited",
    "paid in",
    "income",
    "salary",
];
pub const DEBIT_CUES: [&str; 6] = ["sent", "paid", "withdrawn", "debited", "charged", "fee"];

/// Weight a resolved counterparty adds to its direction.
pub const COUNTERPARTY_CUE_WEIGHT: u32 = 2;

pub const KEYWORD_POINTS: f64 = 0.3;
pub const PATTERN_POINTS: f64 = 0.4;
pub const COUNTERPARTY_KEYWORD_POINTS: f64 = 0.5;
/// A bucket must score strictly above this to be used.
pub const MIN_BUCKET_SCORE: f64 = 0.5;

/// One merchant-category bucket of the keyword/pattern scorer.
pub struct CategoryBucket {
    pub category: Category,
    pub multiplier: f64,
    pub keywords: &'static [&'static str],
    pub(crate) patterns: [LazyRegex; 2],
}

pub static CATEGORY_BUCKETS: [CategoryBucket; 9] = [
    CategoryBucket {
        category: Category::Utilities,
        multiplier: 0.95,
        keywords: &[
            "kplc",
            "nairobi water",
            "electricity",
            "water",
            "sewer",
            "power",
            "utility",
        ],
        patterns: [
            LazyRegex::new(r"kplc|electricity|power|utility"),
            LazyRegex::new(r"water|sewer|county"),
        ],
    },
    CategoryBucket {
        category: Category::Telecom,
        multiplier: 0.95,
        keywords: &[
            "safaricom", "airtel", "telkom", "orange", "data", "airtime", "bundles",
        ],
        patterns: [
            LazyRegex::new(r"safaricom|airtel|telkom|orange"),
            LazyRegex::new(r"airtime|data|bundles?"),
        ],
    },
    CategoryBucket {
        category: Category::Shopping,
        multiplier: 0.90,
        keywords: &[
            "naivas",
            "tuskys",
            "carrefour",
            "quickmart",
            "supermarket",
            "shop",
            "store",
            "mall",
        ],
        patterns: [
            LazyRegex::new(r"naivas|tuskys|carrefour|quickmart"),
            LazyRegex::new(r"supermarket|shop|store|mall|retail"),
        ],
    },
    CategoryBucket {
        category: Category::Banking,
        multiplier: 0.95,
        keywords: &[
            "equity", "kcb", "coop", "bank", "atm", "agent", "loan", "savings",
        ],
        patterns: [
            LazyRegex::new(r"equity|kcb|coop|bank|atm"),
            LazyRegex::new(r"loan|savings|investment"),
        ],
    },
    CategoryBucket {
        category: Category::Transport,
        multiplier: 0.90,
        keywords: &[
            "uber",
            "bolt",
            "little",
            "matatu",
            "bus",
            "taxi",
            "transport",
            "travel",
        ],
        patterns: [
            LazyRegex::new(r"uber|bolt|little|taxi"),
            LazyRegex::new(r"matatu|bus|transport|travel"),
        ],
    },
    CategoryBucket {
        category: Category::Food,
        multiplier: 0.85,
        keywords: &[
            "kfc",
            "pizza",
            "restaurant",
            "cafe",
            "hotel",
            "food",
            "dining",
            "meal",
        ],
        patterns: [
            LazyRegex::new(r"kfc|pizza|restaurant|cafe|hotel"),
            LazyRegex::new(r"food|dining|meal|kitchen"),
        ],
    },
    CategoryBucket {
        category: Category::Entertainment,
        multiplier: 0.80,
        keywords: &[
            "cinema",
            "movie",
            "game",
            "sport",
            "club",
            "bar",
            "entertainment",
        ],
        patterns: [
            LazyRegex::new(r"cinema|movie|game|sport"),
            LazyRegex::new(r"club|bar|entertainment|fun"),
        ],
    },
    CategoryBucket {
        category: Category::Healthcare,
        multiplier: 0.90,
        keywords: &[
            "hospital", "clinic", "doctor", "pharmacy", "medical", "health",
        ],
        patterns: [
            LazyRegex::new(r"hospital|clinic|doctor|pharmacy"),
            LazyRegex::new(r"medical|health|medicine"),
        ],
    },
    CategoryBucket {
        category: Category::Education,
        multiplier: 0.90,
        keywords: &[
            "school",
            "university",
            "college",
            "fee",
            "tuition",
            "education",
            "learning",
        ],
        patterns: [
            LazyRegex::new(r"school|university|college"),
            LazyRegex::new(r"fee|tuition|education|learning"),
        ],
    },
];

impl CategoryBucket {
    /// Multiplied keyword and pattern score for lowercased text.
    pub fn score(&self, lowered_text: &str, counterparty: Option<&str>) -> f64 {
        let mut score = 0.0;
        for keyword in self.keywords {
            if lowered_text.contains(keyword) {
                score += KEYWORD_POINTS;
            }
        }
        for pattern in &self.patterns {
            if pattern.is_match(lowered_text) {
                score += PATTERN_POINTS;
            }
        }
        if let Some(name) = counterparty {
            let name = name.to_lowercase();
            for keyword in self.keywords {
                if name.contains(keyword) {
                    score += COUNTERPARTY_KEYWORD_POINTS;
                }
            }
        }
        score * self.multiplier
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketScore {
    pub category: Category,
    pub score: f64,
}

/// Highest-scoring bucket; earlier buckets win ties and zero never wins.
pub fn best_bucket(text: &str, counterparty: Option<&str>) -> Option<BucketScore> {
    let lowered = text.to_lowercase();
    let mut best: Option<BucketScore> = None;
    for bucket in &CATEGORY_BUCKETS {
        let score = bucket.score(&lowered, counterparty);
        let current = best.map_or(0.0, |value| value.score);
        if score > current {
            best = Some(BucketScore {
                category: bucket.category,
                score,
            });
        }
    }
    best
}

/// Credit only when credit cues strictly outweigh debit cues.
pub fn classify_direction(text: &str, entities: &ExtractedEntities) -> TransactionType {
    let lowered = text.to_lowercase();
    let mut credit = cue_count(&lowered, &CREDIT_CUES);
    let mut debit = cue_count(&lowered, &DEBIT_CUES);
    if entities.sender.is_some() {
        credit += COUNTERPARTY_CUE_WEIGHT;
    }
    if entities.recipient.is_some() {
        debit += COUNTERPARTY_CUE_WEIGHT;
    }
    if credit > debit {
        TransactionType::Credit
    } else {
        TransactionType::Debit
    }
}

/// Raw cue total with no counterparty weighting.
pub fn direction_cue_total(text: &str) -> u32 {
    let lowered = text.to_lowercase();
    cue_count(&lowered, &CREDIT_CUES) + cue_count(&lowered, &DEBIT_CUES)
}

fn cue_count(lowered: &str, cues: &[&str]) -> u32 {
    cues.iter().filter(|cue| lowered.contains(*cue)).count() as u32
}

/// Bucket scoring followed by the lexical overrides.
///
/// The overrides run after scoring and take precedence over it, so a strong
/// banking match still becomes `transfer` when a recipient was extracted and
/// the text mentions neither bills nor payment.
pub fn classify_category(text: &str, entities: &ExtractedEntities) -> Category {
    let lowered = text.to_lowercase();
    let best = best_bucket(text, entities.counterparty());

    if lowered.contains("withdraw") || lowered.contains("atm") {
        return Category::Withdraw;
    }
    if lowered.contains("deposit") || lowered.contains("salary") {
        return if lowered.contains("salary") {
            Category::Salary
        } else {
            Category::Deposit
        };
    }
    if entities.recipient.is_some() && !lowered.contains("bill") && !lowered.contains("pay") {
        return Category::Transfer;
    }

    match best {
        Some(bucket) if bucket.score > MIN_BUCKET_SCORE => bucket.category,
        _ => Category::Other,
    }
}
