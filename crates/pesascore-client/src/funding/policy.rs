use crate::funding::types::{BusinessStage, FundingStage, Industry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryFactors {
    pub risk_multiplier: f64,
    pub growth_potential: f64,
    pub market_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageFactors {
    pub viability: f64,
    pub risk: f64,
    pub funding_readiness: f64,
}

pub fn industry_factors(industry: Industry) -> IndustryFactors {
    let (risk_multiplier, growth_potential, market_size) = match industry {
        Industry::Fintech => (1.2, 0.9, 0.8),
        Industry::Healthtech => (1.1, 0.8, 0.7),
        Industry::Edtech => (1.0, 0.7, 0.6),
        Industry::Agritech => (0.8, 0.8, 0.9),
        Industry::Logistics => (0.9, 0.7, 0.8),
        Industry::Ecommerce => (1.1, 0.8, 0.9),
        Industry::Saas => (1.0, 0.9, 0.7),
        Industry::Marketplace => (1.3, 0.9, 0.8),
        Industry::Social => (0.7, 0.6, 0.5),
        Industry::CleanEnergy => (0.9, 0.8, 0.7),
        Industry::Manufacturing => (0.8, 0.6, 0.8),
        Industry::Retail => (1.0, 0.6, 0.8),
        Industry::Other => (1.0, 0.5, 0.5),
    };
    IndustryFactors {
        risk_multiplier,
        growth_potential,
        market_size,
    }
}

pub fn stage_factors(stage: BusinessStage) -> StageFactors {
    let (viability, risk, funding_readiness) = match stage {
        BusinessStage::Idea | BusinessStage::Unknown => (0.3, 0.9, 0.2),
        BusinessStage::Prototype => (0.5, 0.8, 0.4),
        BusinessStage::Beta => (0.6, 0.7, 0.6),
        BusinessStage::EarlyRevenue => (0.7, 0.6, 0.7),
        BusinessStage::Growth => (0.8, 0.5, 0.8),
        BusinessStage::Expansion => (0.9, 0.4, 0.9),
        BusinessStage::Mature => (0.95, 0.3, 0.95),
    };
    StageFactors {
        viability,
        risk,
        funding_readiness,
    }
}

/// Business stages a funding round is normally raised at.
pub fn aligned_stages(funding_stage: FundingStage) -> &'static [BusinessStage] {
    use BusinessStage::{Beta, EarlyRevenue, Expansion, Growth, Idea, Mature, Prototype};
    match funding_stage {
        FundingStage::PreSeed => &[Idea, Prototype],
        FundingStage::Seed => &[Prototype, Beta, EarlyRevenue],
        FundingStage::SeriesA => &[EarlyRevenue, Growth],
        FundingStage::SeriesB => &[Growth, Expansion],
        FundingStage::SeriesC => &[Expansion, Mature],
        FundingStage::Bridge => &[EarlyRevenue, Growth, Expansion],
        FundingStage::Other => &[Idea, Prototype, Beta, EarlyRevenue, Growth],
        FundingStage::Unknown => &[],
    }
}

pub const ALIGNED_SCORE: f64 = 1.0;
pub const MISALIGNED_SCORE: f64 = 0.3;

pub fn funding_alignment(funding_stage: FundingStage, business_stage: BusinessStage) -> f64 {
    if aligned_stages(funding_stage).contains(&business_stage) {
        ALIGNED_SCORE
    } else {
        MISALIGNED_SCORE
    }
}

pub const BUSINESS_WEIGHTS: [(&str, f64); 5] = [
    ("description_quality", 0.2),
    ("industry_viability", 0.25),
    ("stage_maturity", 0.25),
    ("funding_alignment", 0.2),
    ("funds_clarity", 0.1),
];

pub const FINANCIAL_WEIGHTS: [(&str, f64); 4] = [
    ("revenue_strength", 0.3),
    ("burn_efficiency", 0.25),
    ("runway_adequacy", 0.25),
    ("funding_reasonableness", 0.2),
];

pub const RISK_WEIGHTS: [(&str, f64); 4] = [
    ("market_risk", 0.3),
    ("stage_risk", 0.25),
    ("financial_risk", 0.3),
    ("team_risk", 0.15),
];

pub const TEAM_WEIGHTS: [(&str, f64); 2] = [("team_size", 0.4), ("founder_experience", 0.6)];

pub const MARKET_WEIGHTS: [(&str, f64); 3] = [
    ("market_size", 0.3),
    ("growth_potential", 0.4),
    ("market_positioning", 0.3),
];

/// Monthly revenue that earns a full revenue-strength score.
pub const REVENUE_SCALE: f64 = 1_000_000.0;
/// Runway, in months, that earns full runway credit.
pub const RUNWAY_TARGET_MONTHS: f64 = 18.0;

pub const DESCRIPTION_MIN_CHARS: usize = 100;
pub const FOUNDER_EXPERIENCE_MIN_CHARS: usize = 50;
pub const USE_OF_FUNDS_MIN_CHARS: usize = 50;

pub fn runway_score(months: u32) -> f64 {
    match months {
        18.. => 1.0,
        12..=17 => 0.8,
        6..=11 => 0.6,
        1..=5 => 0.4,
        0 => 0.2,
    }
}

pub fn team_size_score(team_size: u32) -> f64 {
    match team_size {
        3.. => 1.0,
        2 => 0.8,
        _ => 0.5,
    }
}
