use serde::Serialize;

use super::credit_health::{predict_credit_health, CreditHealthPrediction};
use super::PredictionError;
use crate::finance::domain::MAX_CREDIT_SCORE;
use crate::finance::Profile;
use crate::modeling::{ModelSource, RiskCategory};

/// Current prediction next to the prediction for a profile with healthier habits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementOutlook {
    pub current_score: u16,
    pub potential_score: u16,
    pub current: CreditHealthPrediction,
    pub potential: CreditHealthPrediction,
    pub insights: Vec<String>,
}

/// Utilisation is capped at 30% and the score raised by 50 points (up to 900) for the
/// comparison profile. `history_average` adds a note when the score trails the recorded mean.
pub fn improvement_outlook<M>(
    models: &M,
    profile: &Profile,
    history_average: Option<f64>,
) -> Result<ImprovementOutlook, PredictionError>
where
    M: ModelSource + ?Sized,
{
    let mut improved = profile.clone();
    improved.credit_utilization = improved.credit_utilization.min(30.0);
    improved.credit_score = profile
        .credit_score
        .saturating_add(50)
        .min(MAX_CREDIT_SCORE);

    let current = predict_credit_health(models, profile)?;
    let potential = predict_credit_health(models, &improved)?;

    let mut insights = Vec::new();
    if history_average.is_some_and(|average| f64::from(profile.credit_score) < average) {
        insights.push(
            "Your current score is below your historical average. Focus on consistent bill payments."
                .to_string(),
        );
    }
    if profile.credit_utilization > 30.0 {
        insights.push(format!(
            "Reducing credit utilization from {}% to below 30% could improve your score significantly.",
            profile.credit_utilization
        ));
    }
    if potential.eligibility > current.eligibility {
        insights.push(format!(
            "Making better financial decisions could increase your loan eligibility by {:.1}%.",
            potential.eligibility - current.eligibility
        ));
    }
    if potential.risk_category != current.risk_category
        && potential.risk_category == RiskCategory::Low
    {
        insights.push("With better credit habits, you could achieve a Low risk profile.".to_string());
    }
    if insights.is_empty() {
        insights.push("You're on the right track! Maintain your good financial habits.".to_string());
    }

    Ok(ImprovementOutlook {
        current_score: profile.credit_score,
        potential_score: improved.credit_score,
        current,
        potential,
        insights,
    })
}
