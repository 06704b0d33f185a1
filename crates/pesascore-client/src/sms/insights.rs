use rust_decimal::Decimal;
use serde::Serialize;

use crate::sms::LazyRegex;
use crate::sms::classify::CATEGORY_BUCKETS;
use crate::sms::date::hour_24;
use crate::sms::types::{Category, TransactionRecord};

pub const LOW_TIER_CEILING: i64 = 1_000;
pub const MEDIUM_TIER_CEILING: i64 = 10_000;

pub const HIGH_AMOUNT_RISK_FLOOR: i64 = 50_000;
pub const HIGH_AMOUNT_RISK: f64 = 0.3;
pub const EMERGENCY_RISK: f64 = 0.4;
pub const UNKNOWN_MERCHANT_RISK: f64 = 0.2;

const LOCATION_MARKERS: [&str; 6] = ["ATM", "AGENT", "BRANCH", "SHOP", "STORE", "MALL"];

static CLOCK: LazyRegex = LazyRegex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)");

pub struct BehaviorGroup {
    pub flag: BehavioralFlag,
    pub(crate) patterns: [LazyRegex; 3],
}

pub static BEHAVIOR_GROUPS: [BehaviorGroup; 4] = [
    BehaviorGroup {
        flag: BehavioralFlag::Salary,
        patterns: [
            LazyRegex::new(r"salary|wage|pay|stipend|allowance"),
            LazyRegex::new(r"monthly.*deposit|recurring.*income"),
            LazyRegex::new(r"employer|company|organization"),
        ],
    },
    BehaviorGroup {
        flag: BehavioralFlag::Business,
        patterns: [
            LazyRegex::new(r"till|paybill|business|shop|store"),
            LazyRegex::new(r"goods|services|products|sales"),
            LazyRegex::new(r"customer|client|buyer"),
        ],
    },
    BehaviorGroup {
        flag: BehavioralFlag::Emergency,
        patterns: [
            LazyRegex::new(r"urgent|emergency|hospital|medical"),
            LazyRegex::new(r"loan|borrow|advance|credit"),
            LazyRegex::new(r"family|relative|help|assist"),
        ],
    },
    BehaviorGroup {
        flag: BehavioralFlag::Investment,
        patterns: [
            LazyRegex::new(r"investment|saving|deposit|fund"),
            LazyRegex::new(r"shares|stock|bond|portfolio"),
            LazyRegex::new(r"sacco|chama|group|cooperative"),
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountTier {
    Low,
    Medium,
    High,
}

impl AmountTier {
    pub fn for_amount(amount: Decimal) -> Self {
        if amount < Decimal::from(LOW_TIER_CEILING) {
            Self::Low
        } else if amount < Decimal::from(MEDIUM_TIER_CEILING) {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralFlag {
    Salary,
    Business,
    Emergency,
    Investment,
}

impl BehavioralFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Business => "business",
            Self::Emergency => "emergency",
            Self::Investment => "investment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighAmount,
    EmergencyTransaction,
    UnknownMerchant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    BusinessHours,
    Evening,
    OffHours,
    Unknown,
}

impl TimeOfDay {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            9..=17 => Self::BusinessHours,
            18..=22 => Self::Evening,
            _ => Self::OffHours,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BusinessHours => "business_hours",
            Self::Evening => "evening",
            Self::OffHours => "off_hours",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantType {
    Identified,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionInsights {
    pub amount_tier: AmountTier,
    pub behavioral_flags: Vec<BehavioralFlag>,
    pub risk_score: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendation: String,
    pub business_hours: TimeOfDay,
    pub merchant_type: MerchantType,
    pub location_context: String,
}

/// Secondary signals for a finished record, derived from its fields and text.
pub fn generate(record: &TransactionRecord) -> TransactionInsights {
    let text = record.original_text.as_str();
    let (risk_score, risk_factors) = assess_risk(record);
    TransactionInsights {
        amount_tier: AmountTier::for_amount(record.amount),
        behavioral_flags: behavioral_flags(text),
        risk_score,
        risk_factors,
        recommendation: recommendation(record.category, record.amount).to_string(),
        business_hours: time_of_day(text),
        merchant_type: merchant_type(&record.description),
        location_context: location_context(text),
    }
}

/// One flag per group with at least one matching pattern.
pub fn behavioral_flags(text: &str) -> Vec<BehavioralFlag> {
    let lowered = text.to_lowercase();
    BEHAVIOR_GROUPS
        .iter()
        .filter(|group| group.patterns.iter().any(|pattern| pattern.is_match(&lowered)))
        .map(|group| group.flag)
        .collect()
}

pub fn assess_risk(record: &TransactionRecord) -> (f64, Vec<RiskFactor>) {
    let lowered = record.original_text.to_lowercase();
    let mut score = 0.0;
    let mut factors = Vec::new();
    if record.amount > Decimal::from(HIGH_AMOUNT_RISK_FLOOR) {
        score += HIGH_AMOUNT_RISK;
        factors.push(RiskFactor::HighAmount);
    }
    if lowered.contains("emergency") || lowered.contains("urgent") {
        score += EMERGENCY_RISK;
        factors.push(RiskFactor::EmergencyTransaction);
    }
    if record.category == Category::Other {
        score += UNKNOWN_MERCHANT_RISK;
        factors.push(RiskFactor::UnknownMerchant);
    }
    (score, factors)
}

pub fn recommendation(category: Category, amount: Decimal) -> &'static str {
    match category {
        Category::Bills if amount > Decimal::from(5_000) => {
            "Consider setting up automatic bill payments to avoid late fees"
        }
        Category::Shopping if amount > Decimal::from(10_000) => {
            "Large shopping expense detected. Review if this aligns with your budget"
        }
        Category::Withdraw if amount > Decimal::from(20_000) => {
            "Large cash withdrawal. Consider mobile payments for better transaction tracking"
        }
        _ => "Transaction recorded successfully",
    }
}

pub fn time_of_day(text: &str) -> TimeOfDay {
    let Some(captures) = CLOCK.captures(text) else {
        return TimeOfDay::Unknown;
    };
    let hour = captures
        .get(1)
        .and_then(|value| value.as_str().parse::<u32>().ok());
    let meridiem = captures.get(3).map(|value| value.as_str());
    match (hour, meridiem) {
        (Some(hour), Some(meridiem)) => TimeOfDay::for_hour(hour_24(hour, meridiem)),
        _ => TimeOfDay::Unknown,
    }
}

pub fn merchant_type(description: &str) -> MerchantType {
    let lowered = description.to_lowercase();
    if CATEGORY_BUCKETS
        .iter()
        .any(|bucket| lowered.contains(bucket.category.as_str()))
    {
        MerchantType::Identified
    } else {
        MerchantType::Unknown
    }
}

pub fn location_context(text: &str) -> String {
    let upper = text.to_uppercase();
    LOCATION_MARKERS
        .iter()
        .find(|marker| upper.contains(*marker))
        .map_or_else(|| "unknown".to_string(), |marker| marker.to_lowercase())
}
