use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::funding::policy::{
    BUSINESS_WEIGHTS, DESCRIPTION_MIN_CHARS, FINANCIAL_WEIGHTS, FOUNDER_EXPERIENCE_MIN_CHARS,
    MARKET_WEIGHTS, REVENUE_SCALE, RISK_WEIGHTS, RUNWAY_TARGET_MONTHS, TEAM_WEIGHTS,
    USE_OF_FUNDS_MIN_CHARS, funding_alignment, industry_factors, runway_score, stage_factors,
    team_size_score,
};
use crate::funding::text::{market_keyword_density, online_presence, text_quality};
use crate::funding::types::{
    AnalysisResult, BusinessStage, DetailedAnalysis, FundingApplication, Priority,
    Recommendation, RecommendationCategory, RiskAnalysis, RiskAssessment, RiskLevel, SubAnalysis,
};

/// Faults that abort the automated analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("`{field}` is not a finite number")]
    NonFiniteField { field: &'static str },
    #[error("`{field}` must not be negative")]
    NegativeField { field: &'static str },
    #[error("completion percentage {value} is outside 0-100")]
    CompletionOutOfRange { value: f64 },
}

type AnalysisOutcome<T> = Result<T, AnalysisError>;

/// Analyzes an application, substituting the manual-review result when any
/// sub-analysis faults.
pub fn analyze(application: &FundingApplication) -> AnalysisResult {
    match try_analyze(application) {
        Ok(result) => result,
        Err(error) => {
            warn!(
                business = %application.business_name,
                error = %error,
                "funding analysis fell back to manual review"
            );
            fallback_result()
        }
    }
}

pub fn try_analyze(application: &FundingApplication) -> AnalysisOutcome<AnalysisResult> {
    let business = business_viability(application)?;
    let financial = financial_health(application)?;
    let risk = risk_factors(application)?;
    let team = team_strength(application)?;
    let market = market_opportunity(application)?;

    let creditworthiness_score = creditworthiness(application, &financial)?;
    let business_viability_score = viability(&business, &market, &team);
    let risk_assessment = risk_assessment(&risk);
    let recommendations = recommendations(application, &business, &financial, &risk)?;
    let strengths = strengths(application, &business, &financial, &team);
    let areas_for_improvement = improvement_areas(application, &business, &financial, &risk)?;

    debug!(
        creditworthiness = creditworthiness_score,
        viability = business_viability_score,
        risk = risk.overall_risk,
        "funding analysis computed"
    );

    Ok(AnalysisResult {
        creditworthiness_score,
        business_viability_score,
        risk_assessment,
        recommendations,
        strengths,
        areas_for_improvement,
        detailed_analysis: Some(DetailedAnalysis {
            business_analysis: business,
            financial_analysis: financial,
            risk_analysis: risk,
            team_analysis: team,
            market_analysis: market,
        }),
    })
}

/// Money field read with the finiteness and sign checks applied.
fn money(value: f64, field: &'static str) -> AnalysisOutcome<f64> {
    if !value.is_finite() {
        return Err(AnalysisError::NonFiniteField { field });
    }
    if value < 0.0 {
        return Err(AnalysisError::NegativeField { field });
    }
    Ok(value)
}

fn revenue(application: &FundingApplication) -> AnalysisOutcome<f64> {
    money(application.monthly_revenue, "monthly_revenue")
}

fn burn(application: &FundingApplication) -> AnalysisOutcome<f64> {
    money(application.monthly_burn_rate, "monthly_burn_rate")
}

fn requested(application: &FundingApplication) -> AnalysisOutcome<f64> {
    money(
        application.funding_amount_requested,
        "funding_amount_requested",
    )
}

fn completion(application: &FundingApplication) -> AnalysisOutcome<f64> {
    let value = application.completion_percentage;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AnalysisError::CompletionOutOfRange { value });
    }
    Ok(value)
}

fn finite(value: f64, field: &'static str) -> AnalysisOutcome<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NonFiniteField { field })
    }
}

pub fn business_viability(application: &FundingApplication) -> AnalysisOutcome<SubAnalysis> {
    let mut analysis = SubAnalysis::default();

    let description = text_quality(&application.business_description, DESCRIPTION_MIN_CHARS);
    analysis.factor("description_quality", description);
    if description > 0.8 {
        analysis.insight("Well-articulated business description shows clear vision");
    } else if description < 0.5 {
        analysis.insight("Business description needs more detail and clarity");
    }

    let industry = industry_factors(application.industry);
    analysis.factor(
        "industry_viability",
        (industry.growth_potential + industry.market_size) / 2.0,
    );
    analysis.factor(
        "stage_maturity",
        stage_factors(application.business_stage).viability,
    );

    let alignment = funding_alignment(application.funding_stage, application.business_stage);
    analysis.factor("funding_alignment", alignment);
    if alignment < 0.5 {
        analysis.insight("Funding stage may not align well with current business stage");
    }

    analysis.factor(
        "funds_clarity",
        text_quality(&application.use_of_funds, USE_OF_FUNDS_MIN_CHARS),
    );

    analysis.score = finite(analysis.weighted(&BUSINESS_WEIGHTS), "business_score")?;
    Ok(analysis)
}

pub fn financial_health(application: &FundingApplication) -> AnalysisOutcome<SubAnalysis> {
    let mut analysis = SubAnalysis::default();
    let revenue = revenue(application)?;
    let burn = burn(application)?;
    let requested = requested(application)?;

    analysis.factor("revenue_strength", (revenue / REVENUE_SCALE).min(1.0));
    if revenue > 500_000.0 {
        analysis.insight("Strong revenue generation indicates market validation");
    } else if revenue == 0.0 && application.business_stage.claims_revenue() {
        analysis.red_flag("No revenue despite claiming early revenue stage");
    }

    let burn_efficiency = if revenue > 0.0 && burn > 0.0 {
        let burn_multiple = burn / revenue;
        if burn_multiple > 2.0 {
            analysis.red_flag("High burn rate relative to revenue");
            0.3
        } else if burn_multiple > 1.0 {
            0.6
        } else {
            analysis.insight("Healthy burn rate relative to revenue");
            1.0
        }
    } else {
        0.5
    };
    analysis.factor("burn_efficiency", burn_efficiency);

    let runway = application.runway_months;
    match runway {
        18.. => analysis.insight("Excellent runway provides stability for growth"),
        1..=5 => analysis.red_flag("Limited runway may require urgent funding"),
        0 => analysis.red_flag("No clear runway information provided"),
        _ => {}
    }
    analysis.factor("runway_adequacy", runway_score(runway));

    let reasonableness = if burn > 0.0 {
        let months_funded = finite(requested / burn, "months_funded")?;
        if months_funded >= 18.0 {
            1.0
        } else if months_funded >= 12.0 {
            0.8
        } else {
            analysis.insight("Consider requesting funding for longer runway");
            0.6
        }
    } else if requested > 100_000_000.0 {
        analysis.red_flag("Funding request seems excessive for stage");
        0.3
    } else if requested > 10_000_000.0 {
        if matches!(
            application.business_stage,
            BusinessStage::Growth | BusinessStage::Expansion
        ) {
            0.7
        } else {
            0.4
        }
    } else {
        0.8
    };
    analysis.factor("funding_reasonableness", reasonableness);

    analysis.score = finite(analysis.weighted(&FINANCIAL_WEIGHTS), "financial_score")?;
    Ok(analysis)
}

pub fn risk_factors(application: &FundingApplication) -> AnalysisOutcome<RiskAnalysis> {
    let mut analysis = RiskAnalysis::default();
    let revenue = revenue(application)?;

    let market_risk = industry_factors(application.industry).risk_multiplier;
    if market_risk > 1.1 {
        analysis.risk_flags.push(format!(
            "High market risk in {} industry",
            application.industry.as_str()
        ));
        analysis
            .mitigation_suggestions
            .push("Develop strong competitive advantages and market differentiation".to_string());
    }

    let stage_risk = stage_factors(application.business_stage).risk;
    if stage_risk > 0.7 {
        analysis
            .risk_flags
            .push("High execution risk due to early business stage".to_string());
        analysis
            .mitigation_suggestions
            .push("Focus on achieving key milestones and product validation".to_string());
    }

    let mut financial_risk: f64 = 1.0;
    if revenue == 0.0 && application.business_stage.claims_revenue() {
        financial_risk = 1.3;
        analysis
            .risk_flags
            .push("Revenue claims don't match reported figures".to_string());
    }
    if application.runway_months < 6 {
        financial_risk = financial_risk.max(1.2);
        analysis
            .risk_flags
            .push("Short runway creates funding pressure".to_string());
        analysis
            .mitigation_suggestions
            .push("Secure bridge funding or reduce burn rate".to_string());
    }

    let mut team_risk: f64 = 1.0;
    if application.team_size < 2 {
        team_risk = 1.1;
        analysis
            .risk_flags
            .push("Single founder increases execution risk".to_string());
        analysis
            .mitigation_suggestions
            .push("Consider bringing on co-founders or key hires".to_string());
    }
    if text_quality(&application.founder_experience, FOUNDER_EXPERIENCE_MIN_CHARS) < 0.5 {
        team_risk = team_risk.max(1.1);
        analysis
            .risk_flags
            .push("Limited founder experience documentation".to_string());
    }

    if online_presence(application) < 0.3 {
        analysis
            .risk_flags
            .push("Weak online presence may indicate limited market traction".to_string());
        analysis
            .mitigation_suggestions
            .push("Strengthen digital presence and thought leadership".to_string());
    }

    analysis.risk_categories = BTreeMap::from([
        ("market_risk".to_string(), market_risk),
        ("stage_risk".to_string(), stage_risk),
        ("financial_risk".to_string(), financial_risk),
        ("team_risk".to_string(), team_risk),
    ]);
    analysis.overall_risk = RISK_WEIGHTS
        .iter()
        .map(|(name, weight)| analysis.risk_categories.get(*name).copied().unwrap_or(0.0) * weight)
        .sum();
    Ok(analysis)
}

pub fn team_strength(application: &FundingApplication) -> AnalysisOutcome<SubAnalysis> {
    let mut analysis = SubAnalysis::default();

    let size = team_size_score(application.team_size);
    if application.team_size >= 3 {
        analysis.insight("Good team size for execution and diverse skills");
    } else if application.team_size < 2 {
        analysis.insight("Consider expanding team for better execution capability");
    }
    analysis.factor("team_size", size);

    let experience = text_quality(&application.founder_experience, FOUNDER_EXPERIENCE_MIN_CHARS);
    if experience > 0.8 {
        analysis.insight("Strong founder experience increases execution probability");
    } else if experience < 0.5 {
        analysis.insight("More detailed founder experience would strengthen application");
    }
    analysis.factor("founder_experience", experience);

    analysis.score = finite(analysis.weighted(&TEAM_WEIGHTS), "team_score")?;
    Ok(analysis)
}

pub fn market_opportunity(application: &FundingApplication) -> AnalysisOutcome<SubAnalysis> {
    let mut analysis = SubAnalysis::default();
    let industry = industry_factors(application.industry);

    analysis.factor("market_size", industry.market_size);
    analysis.factor("growth_potential", industry.growth_potential);
    if industry.growth_potential > 0.8 {
        analysis.insight("Industry shows strong growth potential");
    } else if industry.growth_potential < 0.5 {
        analysis.insight("Consider market expansion or pivot opportunities");
    }

    let description = text_quality(&application.business_description, DESCRIPTION_MIN_CHARS);
    let understanding = market_keyword_density(&application.business_description);
    analysis.factor("market_positioning", (description + understanding) / 2.0);

    analysis.score = finite(analysis.weighted(&MARKET_WEIGHTS), "market_score")?;
    Ok(analysis)
}

pub fn creditworthiness(
    application: &FundingApplication,
    financial: &SubAnalysis,
) -> AnalysisOutcome<f64> {
    let revenue = revenue(application)?;
    let stage = stage_factors(application.business_stage);
    let industry = industry_factors(application.industry);

    let total = 50.0
        + financial.score * 30.0
        + stage.funding_readiness * 15.0
        + (revenue / REVENUE_SCALE).min(1.0) * 20.0
        + (f64::from(application.runway_months) / RUNWAY_TARGET_MONTHS).min(1.0) * 10.0
        + (2.0 - industry.risk_multiplier) * 5.0;
    Ok(finite(total, "creditworthiness_score")?.clamp(0.0, 100.0))
}

pub fn viability(business: &SubAnalysis, market: &SubAnalysis, team: &SubAnalysis) -> f64 {
    (30.0 + business.score * 35.0 + market.score * 25.0 + team.score * 10.0).clamp(0.0, 100.0)
}

pub fn risk_assessment(risk: &RiskAnalysis) -> RiskAssessment {
    let risk_level = RiskLevel::from_risk(risk.overall_risk);
    RiskAssessment {
        risk_level,
        risk_score: risk.overall_risk,
        description: risk_level.description().to_string(),
        risk_categories: risk.risk_categories.clone(),
        risk_flags: risk.risk_flags.clone(),
        mitigation_suggestions: risk.mitigation_suggestions.clone(),
    }
}

fn recommendation(
    category: RecommendationCategory,
    priority: Priority,
    text: &str,
    action_items: Vec<String>,
) -> Recommendation {
    Recommendation {
        category,
        priority,
        recommendation: text.to_string(),
        action_items,
    }
}

fn items(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

pub fn recommendations(
    application: &FundingApplication,
    business: &SubAnalysis,
    financial: &SubAnalysis,
    risk: &RiskAnalysis,
) -> AnalysisOutcome<Vec<Recommendation>> {
    let mut recommendations = Vec::new();

    if business.score < 0.6 {
        recommendations.push(recommendation(
            RecommendationCategory::BusinessModel,
            Priority::High,
            "Strengthen business model description and value proposition clarity",
            items(&[
                "Provide more detailed market analysis",
                "Clarify competitive advantages",
                "Define clear customer segments",
            ]),
        ));
    }

    if financial.score < 0.5 {
        recommendations.push(recommendation(
            RecommendationCategory::FinancialHealth,
            Priority::High,
            "Improve financial planning and metrics",
            items(&[
                "Extend runway through cost optimization",
                "Develop clear revenue projections",
                "Optimize burn rate efficiency",
            ]),
        ));
    }

    if risk.overall_risk > 1.2 {
        recommendations.push(recommendation(
            RecommendationCategory::RiskManagement,
            Priority::High,
            "Address key risk factors before funding",
            risk.mitigation_suggestions.iter().take(3).cloned().collect(),
        ));
    }

    if requested(application)? > 50_000_000.0
        && matches!(
            application.business_stage,
            BusinessStage::Idea | BusinessStage::Prototype
        )
    {
        recommendations.push(recommendation(
            RecommendationCategory::FundingStrategy,
            Priority::Medium,
            "Consider staged funding approach",
            items(&[
                "Request smaller initial amount for validation",
                "Define clear milestones for follow-on funding",
                "Focus on proving product-market fit first",
            ]),
        ));
    }

    Ok(recommendations)
}

pub fn strengths(
    application: &FundingApplication,
    business: &SubAnalysis,
    financial: &SubAnalysis,
    team: &SubAnalysis,
) -> Vec<String> {
    let checks = [
        (
            business.score > 0.7,
            "Strong business model and clear value proposition",
        ),
        (
            financial.score > 0.7,
            "Solid financial health and planning",
        ),
        (
            team.score > 0.7,
            "Experienced team with relevant background",
        ),
        (
            application.monthly_revenue > 100_000.0,
            "Proven revenue generation and market validation",
        ),
        (
            application.runway_months >= 18,
            "Adequate runway provides execution stability",
        ),
        (
            online_presence(application) > 0.6,
            "Strong online presence and digital footprint",
        ),
    ];
    checks
        .into_iter()
        .filter(|(holds, _)| *holds)
        .map(|(_, text)| text.to_string())
        .collect()
}

pub fn improvement_areas(
    application: &FundingApplication,
    business: &SubAnalysis,
    financial: &SubAnalysis,
    risk: &RiskAnalysis,
) -> AnalysisOutcome<Vec<String>> {
    let completion = completion(application)?;
    let checks = [
        (
            business.score < 0.5,
            "Business model clarity and market positioning",
        ),
        (
            financial.score < 0.5,
            "Financial planning and metrics transparency",
        ),
        (
            risk.risk_flags.len() > 2,
            "Risk mitigation and contingency planning",
        ),
        (
            completion < 80.0,
            "Application completeness and documentation",
        ),
        (
            online_presence(application) < 0.3,
            "Digital presence and thought leadership",
        ),
    ];
    Ok(checks
        .into_iter()
        .filter(|(holds, _)| *holds)
        .map(|(_, text)| text.to_string())
        .collect())
}

/// Neutral manual-review result returned when automated analysis faults.
pub fn fallback_result() -> AnalysisResult {
    AnalysisResult {
        creditworthiness_score: 50.0,
        business_viability_score: 50.0,
        risk_assessment: RiskAssessment {
            risk_level: RiskLevel::Medium,
            risk_score: 1.0,
            description: "Analysis could not be completed. Manual review recommended.".to_string(),
            risk_categories: BTreeMap::new(),
            risk_flags: vec!["Manual review required".to_string()],
            mitigation_suggestions: vec!["Conduct manual review".to_string()],
        },
        recommendations: vec![recommendation(
            RecommendationCategory::System,
            Priority::High,
            "Manual review required due to analysis system error",
            items(&["Contact support for detailed evaluation"]),
        )],
        strengths: vec!["Application submitted for review".to_string()],
        areas_for_improvement: vec!["Complete automated analysis pending".to_string()],
        detailed_analysis: None,
    }
}
