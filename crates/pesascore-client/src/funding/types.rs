use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Fintech,
    Healthtech,
    Edtech,
    Agritech,
    Logistics,
    Ecommerce,
    Saas,
    Marketplace,
    Social,
    CleanEnergy,
    Manufacturing,
    Retail,
    #[serde(other)]
    Other,
}

impl Industry {
    pub const ALL: [Self; 13] = [
        Self::Fintech,
        Self::Healthtech,
        Self::Edtech,
        Self::Agritech,
        Self::Logistics,
        Self::Ecommerce,
        Self::Saas,
        Self::Marketplace,
        Self::Social,
        Self::CleanEnergy,
        Self::Manufacturing,
        Self::Retail,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fintech => "fintech",
            Self::Healthtech => "healthtech",
            Self::Edtech => "edtech",
            Self::Agritech => "agritech",
            Self::Logistics => "logistics",
            Self::Ecommerce => "ecommerce",
            Self::Saas => "saas",
            Self::Marketplace => "marketplace",
            Self::Social => "social",
            Self::CleanEnergy => "clean_energy",
            Self::Manufacturing => "manufacturing",
            Self::Retail => "retail",
            Self::Other => "other",
        }
    }
}

/// Business maturity. Unrecognized stages score as `idea`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessStage {
    Idea,
    Prototype,
    Beta,
    EarlyRevenue,
    Growth,
    Expansion,
    Mature,
    #[serde(other)]
    Unknown,
}

impl BusinessStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Prototype => "prototype",
            Self::Beta => "beta",
            Self::EarlyRevenue => "early_revenue",
            Self::Growth => "growth",
            Self::Expansion => "expansion",
            Self::Mature => "mature",
            Self::Unknown => "unknown",
        }
    }

    /// Stages at which a zero revenue figure is contradictory.
    pub const fn claims_revenue(self) -> bool {
        matches!(self, Self::EarlyRevenue | Self::Growth)
    }
}

/// Funding round sought. `Unknown` aligns with no business stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingStage {
    PreSeed,
    Seed,
    SeriesA,
    SeriesB,
    SeriesC,
    Bridge,
    Other,
    #[serde(other)]
    Unknown,
}

impl FundingStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreSeed => "pre_seed",
            Self::Seed => "seed",
            Self::SeriesA => "series_a",
            Self::SeriesB => "series_b",
            Self::SeriesC => "series_c",
            Self::Bridge => "bridge",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

/// Field bag for one funding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingApplication {
    pub business_name: String,
    #[serde(default)]
    pub business_description: String,
    pub industry: Industry,
    pub business_stage: BusinessStage,
    pub funding_stage: FundingStage,
    pub funding_amount_requested: f64,
    #[serde(default)]
    pub monthly_revenue: f64,
    #[serde(default)]
    pub monthly_burn_rate: f64,
    #[serde(default)]
    pub runway_months: u32,
    #[serde(default = "default_team_size")]
    pub team_size: u32,
    #[serde(default)]
    pub founder_experience: String,
    #[serde(default)]
    pub use_of_funds: String,
    #[serde(default)]
    pub portfolio_website: Option<String>,
    #[serde(default)]
    pub linkedin_profile: Option<String>,
    #[serde(default)]
    pub instagram_profile: Option<String>,
    #[serde(default)]
    pub youtube_profile: Option<String>,
    #[serde(default)]
    pub completion_percentage: f64,
}

fn default_team_size() -> u32 {
    1
}

/// One scored sub-analysis with its factor map and commentary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubAnalysis {
    pub score: f64,
    pub factors: BTreeMap<String, f64>,
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub red_flags: Vec<String>,
}

impl SubAnalysis {
    pub(crate) fn factor(&mut self, name: &str, value: f64) {
        self.factors.insert(name.to_string(), value);
    }

    pub(crate) fn insight(&mut self, text: &str) {
        self.insights.push(text.to_string());
    }

    pub(crate) fn red_flag(&mut self, text: &str) {
        self.red_flags.push(text.to_string());
    }

    /// Weighted sum over named factors; a missing factor counts as zero.
    pub(crate) fn weighted(&self, weights: &[(&str, f64)]) -> f64 {
        weights
            .iter()
            .map(|(name, weight)| self.factors.get(*name).copied().unwrap_or(0.0) * weight)
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskAnalysis {
    pub overall_risk: f64,
    pub risk_categories: BTreeMap<String, f64>,
    pub risk_flags: Vec<String>,
    pub mitigation_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    pub fn from_risk(overall_risk: f64) -> Self {
        if overall_risk <= 0.7 {
            Self::Low
        } else if overall_risk <= 1.0 {
            Self::Medium
        } else if overall_risk <= 1.3 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => "This application shows strong fundamentals with manageable risks.",
            Self::Medium => "This application has moderate risks that should be monitored.",
            Self::High => {
                "This application carries significant risks requiring careful evaluation."
            }
            Self::VeryHigh => {
                "This application has substantial risks that may outweigh potential returns."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub description: String,
    pub risk_categories: BTreeMap<String, f64>,
    pub risk_flags: Vec<String>,
    pub mitigation_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationCategory {
    #[serde(rename = "Business Model")]
    BusinessModel,
    #[serde(rename = "Financial Health")]
    FinancialHealth,
    #[serde(rename = "Risk Management")]
    RiskManagement,
    #[serde(rename = "Funding Strategy")]
    FundingStrategy,
    System,
}

impl RecommendationCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BusinessModel => "Business Model",
            Self::FinancialHealth => "Financial Health",
            Self::RiskManagement => "Risk Management",
            Self::FundingStrategy => "Funding Strategy",
            Self::System => "System",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub recommendation: String,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub business_analysis: SubAnalysis,
    pub financial_analysis: SubAnalysis,
    pub risk_analysis: RiskAnalysis,
    pub team_analysis: SubAnalysis,
    pub market_analysis: SubAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub creditworthiness_score: f64,
    pub business_viability_score: f64,
    pub risk_assessment: RiskAssessment,
    pub recommendations: Vec<Recommendation>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    /// Absent when the manual-review fallback was returned.
    pub detailed_analysis: Option<DetailedAnalysis>,
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.detailed_analysis.is_none()
    }
}
