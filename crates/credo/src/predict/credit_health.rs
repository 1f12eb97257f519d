use serde::Serialize;

use super::PredictionError;
use crate::finance::{derive_health_features, round_to, Profile};
use crate::modeling::{ModelKind, ModelSource, RiskCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityBand {
    High,
    Moderate,
    Low,
}

/// Risk category and loan-eligibility percentage for the profile as it stands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditHealthPrediction {
    pub eligibility: f64,
    pub risk_category: RiskCategory,
}

impl CreditHealthPrediction {
    pub fn eligibility_band(&self) -> EligibilityBand {
        if self.eligibility >= 70.0 {
            EligibilityBand::High
        } else if self.eligibility >= 40.0 {
            EligibilityBand::Moderate
        } else {
            EligibilityBand::Low
        }
    }

    pub fn recommendation(&self) -> &'static str {
        if self.eligibility < 40.0 {
            "Consider improving your credit score and reducing existing debt"
        } else if self.risk_category == RiskCategory::High {
            "Focus on reducing credit utilization and paying bills on time"
        } else {
            "Your credit health looks good! Maintain good financial habits."
        }
    }
}

pub fn predict_credit_health<M>(
    models: &M,
    profile: &Profile,
) -> Result<CreditHealthPrediction, PredictionError>
where
    M: ModelSource + ?Sized,
{
    profile.validate()?;
    let features = derive_health_features(profile).to_vector();

    let classifier = models.get_or_train(ModelKind::RiskClassifier)?;
    let regressor = models.get_or_train(ModelKind::EligibilityRegressor)?;

    let risk_category = classifier.classify(&features)?;
    let eligibility = regressor.regress(&features)?.clamp(0.0, 100.0);

    Ok(CreditHealthPrediction {
        eligibility: round_to(eligibility, 2),
        risk_category,
    })
}
