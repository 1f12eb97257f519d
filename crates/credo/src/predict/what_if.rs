use serde::Serialize;

use super::PredictionError;
use crate::finance::domain::{MAX_CREDIT_SCORE, MIN_CREDIT_SCORE};
use crate::finance::{
    derive_health_features, round_to, FinancialState, Profile, Scenario, ScenarioKind,
    WhatIfFeatures,
};
use crate::modeling::{ModelKind, ModelSource, RiskCategory, ScenarioInferencePolicy};

/// Simulated outcome of a scenario, with the cash-flow state on both sides of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIfPrediction {
    pub scenario: ScenarioKind,
    pub predicted_score: u16,
    pub score_change: i32,
    pub risk_category: RiskCategory,
    pub eligibility: f64,
    pub before: FinancialState,
    pub after: FinancialState,
}

pub fn predict_what_if<M>(
    models: &M,
    profile: &Profile,
    scenario: &Scenario,
) -> Result<WhatIfPrediction, PredictionError>
where
    M: ModelSource + ?Sized,
{
    profile.validate()?;
    let after = scenario.apply(profile)?;
    let features = WhatIfFeatures {
        before: derive_health_features(profile),
        after,
    };

    let model = models.get_or_train(ModelKind::WhatIfRegressor)?;
    let score = model
        .regress(&features.to_vector())?
        .clamp(f64::from(MIN_CREDIT_SCORE), f64::from(MAX_CREDIT_SCORE));
    let assessment = ScenarioInferencePolicy::default().assess(score, &after);
    let predicted_score = score.round() as u16;

    Ok(WhatIfPrediction {
        scenario: scenario.kind(),
        predicted_score,
        score_change: i32::from(predicted_score) - i32::from(profile.credit_score),
        risk_category: assessment.risk_category,
        eligibility: round_to(assessment.eligibility, 2),
        before: FinancialState::of(profile),
        after,
    })
}
