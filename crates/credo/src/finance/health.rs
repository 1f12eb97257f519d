use serde::Serialize;

use super::domain::Profile;
use super::features::FinancialState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationBand {
    Good,
    Moderate,
    Poor,
}

impl UtilizationBand {
    pub fn of(credit_utilization: f64) -> Self {
        if credit_utilization <= 30.0 {
            Self::Good
        } else if credit_utilization <= 60.0 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl HealthBand {
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent financial health!",
            Self::Good => "Good financial health",
            Self::NeedsImprovement => "Room for improvement",
        }
    }
}

/// Dashboard health score out of 100 with the points each factor contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthScore {
    pub score: u8,
    pub band: HealthBand,
    pub credit_points: u8,
    pub utilization_points: u8,
    pub savings_points: u8,
    pub debt_points: u8,
}

pub fn financial_health_score(profile: &Profile) -> HealthScore {
    let state = FinancialState::of(profile);

    let credit_points = match profile.credit_score {
        score if score >= 750 => 30,
        score if score >= 650 => 20,
        score if score >= 550 => 10,
        _ => 0,
    };

    let utilization_points = match UtilizationBand::of(profile.credit_utilization) {
        UtilizationBand::Good => 25,
        UtilizationBand::Moderate => 15,
        UtilizationBand::Poor => 5,
    };

    // Savings only score when there is a surplus at all.
    let savings_points = if state.monthly_savings() > 0.0 {
        let rate = state.savings_rate();
        if rate >= 20.0 {
            25
        } else if rate >= 10.0 {
            15
        } else {
            10
        }
    } else {
        0
    };

    let debt_to_income = state.debt_to_income();
    let debt_points = if debt_to_income <= 30.0 {
        20
    } else if debt_to_income <= 40.0 {
        10
    } else {
        5
    };

    let score = credit_points + utilization_points + savings_points + debt_points;
    let band = if score >= 75 {
        HealthBand::Excellent
    } else if score >= 60 {
        HealthBand::Good
    } else {
        HealthBand::NeedsImprovement
    };

    HealthScore {
        score,
        band,
        credit_points,
        utilization_points,
        savings_points,
        debt_points,
    }
}
