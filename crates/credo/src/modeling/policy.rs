//! Heuristic policies. The labelling policies author the synthetic training targets; the
//! inference policy turns a predicted score back into a category and an eligibility figure.
//!
//! Scenario labelling and scenario inference share [`ScenarioRiskBands`] so the category
//! boundaries the generator teaches are the ones applied to model output. Their eligibility
//! mappings differ on purpose and must be kept in step by hand if either changes.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::finance::{FinancialState, HealthFeatures};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk-point rubric and eligibility penalties behind the credit-health labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthLabelingPolicy;

impl HealthLabelingPolicy {
    pub fn risk_points(&self, features: &HealthFeatures) -> u8 {
        let mut points = if features.credit_score < 600.0 {
            3
        } else if features.credit_score < 700.0 {
            2
        } else {
            1
        };

        if features.credit_utilization > 60.0 {
            points += 2;
        } else if features.credit_utilization > 30.0 {
            points += 1;
        }

        if features.debt_to_income > 40.0 {
            points += 2;
        } else if features.debt_to_income > 30.0 {
            points += 1;
        }

        if features.savings_rate < 0.0 {
            points += 2;
        } else if features.savings_rate < 10.0 {
            points += 1;
        }

        points
    }

    pub fn risk_category(&self, features: &HealthFeatures) -> RiskCategory {
        match self.risk_points(features) {
            0..=3 => RiskCategory::Low,
            4..=5 => RiskCategory::Medium,
            _ => RiskCategory::High,
        }
    }

    /// Noise-free eligibility: the score scaled to roughly 0-100 times each penalty factor.
    pub fn base_eligibility(&self, features: &HealthFeatures) -> f64 {
        let mut eligibility = (features.credit_score / 9.0).min(100.0);

        if features.credit_utilization > 60.0 {
            eligibility *= 0.7;
        } else if features.credit_utilization > 30.0 {
            eligibility *= 0.85;
        }

        if features.debt_to_income > 40.0 {
            eligibility *= 0.6;
        } else if features.debt_to_income > 30.0 {
            eligibility *= 0.8;
        }

        if features.savings_rate < 0.0 {
            eligibility *= 0.5;
        } else if features.savings_rate < 10.0 {
            eligibility *= 0.9;
        }

        eligibility
    }

    pub fn eligibility(&self, features: &HealthFeatures, noise: f64) -> f64 {
        (self.base_eligibility(features) + noise).clamp(0.0, 100.0)
    }
}

/// Category boundaries over a post-scenario score and post-scenario ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRiskBands;

impl ScenarioRiskBands {
    pub fn categorize(&self, score: f64, after: &FinancialState) -> RiskCategory {
        let debt_to_income = after.debt_to_income();
        let utilization = after.credit_utilization;

        if score >= 750.0 && debt_to_income < 30.0 && utilization < 30.0 {
            RiskCategory::Low
        } else if score >= 650.0 && debt_to_income < 40.0 && utilization < 50.0 {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }
}

/// Score-change heuristic and categorical labels for the what-if training set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioLabelingPolicy {
    bands: ScenarioRiskBands,
}

impl ScenarioLabelingPolicy {
    /// Noise-free score movement. New debt is penalised harder than payoff is rewarded.
    pub fn score_change(&self, before: &FinancialState, after: &FinancialState) -> f64 {
        let mut change = 0.0;

        if after.total_emi > before.total_emi {
            change -= (after.total_emi - before.total_emi) / 1000.0 * 10.0;
        } else if after.total_emi < before.total_emi {
            change += (before.total_emi - after.total_emi) / 1000.0 * 15.0;
        }

        if after.monthly_income > before.monthly_income {
            change += (after.monthly_income - before.monthly_income) / 10_000.0 * 2.0;
        } else if after.monthly_income < before.monthly_income {
            change -= (before.monthly_income - after.monthly_income) / 10_000.0 * 3.0;
        }

        if after.monthly_expense > before.monthly_expense {
            change -= (after.monthly_expense - before.monthly_expense) / 10_000.0 * 2.0;
        } else if after.monthly_expense < before.monthly_expense {
            change += (before.monthly_expense - after.monthly_expense) / 10_000.0 * 3.0;
        }

        if after.credit_utilization > before.credit_utilization {
            change -= (after.credit_utilization - before.credit_utilization) * 0.5;
        } else if after.credit_utilization < before.credit_utilization {
            change += (before.credit_utilization - after.credit_utilization) * 0.8;
        }

        change
    }

    pub fn predicted_score(
        &self,
        credit_score: f64,
        before: &FinancialState,
        after: &FinancialState,
        noise: f64,
    ) -> f64 {
        (credit_score + self.score_change(before, after) + noise).clamp(300.0, 900.0)
    }

    pub fn categorize(&self, score: f64, after: &FinancialState) -> RiskCategory {
        self.bands.categorize(score, after)
    }

    /// Range the eligibility label is drawn from for each category.
    pub fn eligibility_range(&self, category: RiskCategory) -> Range<f64> {
        match category {
            RiskCategory::Low => 70.0..100.0,
            RiskCategory::Medium => 40.0..75.0,
            RiskCategory::High => 0.0..45.0,
        }
    }
}

/// Outcome of applying the inference thresholds to a predicted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioAssessment {
    pub risk_category: RiskCategory,
    pub eligibility: f64,
}

/// Fixed thresholds applied to the what-if regressor's output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioInferencePolicy {
    bands: ScenarioRiskBands,
}

impl ScenarioInferencePolicy {
    pub fn assess(&self, score: f64, after: &FinancialState) -> ScenarioAssessment {
        let risk_category = self.bands.categorize(score, after);
        let eligibility = match risk_category {
            RiskCategory::Low => 75.0 + (score - 750.0) / 15.0,
            RiskCategory::Medium => 40.0 + (score - 650.0) / 10.0,
            RiskCategory::High => ((score - 300.0) / 10.0).max(0.0),
        };

        ScenarioAssessment {
            risk_category,
            eligibility: eligibility.clamp(0.0, 100.0),
        }
    }
}
