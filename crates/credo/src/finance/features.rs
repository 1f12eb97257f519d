//! Feature derivation shared by the synthetic generators, the trainer, the predictors and the
//! alert rules. Ratios are computed here and nowhere else.

use serde::{Deserialize, Serialize};

use super::domain::{Loan, Profile};

/// Ordered, versioned list of the fields a model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub name: &'static str,
    pub version: u32,
    pub fields: &'static [&'static str],
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn stamp(&self) -> SchemaStamp {
        SchemaStamp {
            name: self.name.to_string(),
            version: self.version,
            fields: self.fields.iter().map(|field| field.to_string()).collect(),
        }
    }

    pub fn matches(&self, stamp: &SchemaStamp) -> bool {
        stamp.name == self.name
            && stamp.version == self.version
            && stamp.fields.len() == self.fields.len()
            && stamp
                .fields
                .iter()
                .zip(self.fields)
                .all(|(recorded, expected)| recorded == expected)
    }
}

/// Serialized copy of a [`FeatureSchema`] persisted alongside each model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStamp {
    pub name: String,
    pub version: u32,
    pub fields: Vec<String>,
}

impl std::fmt::Display for SchemaStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@v{} ({} fields)", self.name, self.version, self.fields.len())
    }
}

pub const HEALTH_SCHEMA: FeatureSchema = FeatureSchema {
    name: "credit_health",
    version: 1,
    fields: &[
        "monthly_income",
        "monthly_expense",
        "credit_score",
        "credit_utilization",
        "num_credit_cards",
        "total_emi",
        "debt_to_income",
        "savings_rate",
    ],
};

pub const WHAT_IF_SCHEMA: FeatureSchema = FeatureSchema {
    name: "what_if",
    version: 1,
    fields: &[
        "monthly_income",
        "monthly_expense",
        "credit_score",
        "credit_utilization",
        "num_credit_cards",
        "total_emi",
        "debt_to_income",
        "savings_rate",
        "new_total_emi",
        "new_monthly_income",
        "new_monthly_expense",
        "new_credit_utilization",
        "new_debt_to_income",
        "new_savings_rate",
    ],
};

pub fn total_emi(loans: &[Loan]) -> f64 {
    loans.iter().map(|loan| loan.emi).sum()
}

/// Debt service as a percentage of income; zero when there is no income.
pub fn debt_to_income(total_emi: f64, monthly_income: f64) -> f64 {
    if monthly_income > 0.0 {
        total_emi / monthly_income * 100.0
    } else {
        0.0
    }
}

/// Share of income left after expenses and debt service; zero when there is no income.
pub fn savings_rate(monthly_income: f64, monthly_expense: f64, total_emi: f64) -> f64 {
    if monthly_income > 0.0 {
        (monthly_income - monthly_expense - total_emi) / monthly_income * 100.0
    } else {
        0.0
    }
}

/// The cash-flow quantities a scenario can move, with their derived ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancialState {
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub total_emi: f64,
    pub credit_utilization: f64,
}

impl FinancialState {
    pub fn of(profile: &Profile) -> Self {
        Self {
            monthly_income: profile.monthly_income,
            monthly_expense: profile.monthly_expense,
            total_emi: total_emi(&profile.loans),
            credit_utilization: profile.credit_utilization,
        }
    }

    pub fn debt_to_income(&self) -> f64 {
        debt_to_income(self.total_emi, self.monthly_income)
    }

    pub fn savings_rate(&self) -> f64 {
        savings_rate(self.monthly_income, self.monthly_expense, self.total_emi)
    }

    pub fn monthly_savings(&self) -> f64 {
        self.monthly_income - self.monthly_expense - self.total_emi
    }
}

/// Named health-model inputs in [`HEALTH_SCHEMA`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthFeatures {
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub credit_score: f64,
    pub credit_utilization: f64,
    pub num_credit_cards: f64,
    pub total_emi: f64,
    pub debt_to_income: f64,
    pub savings_rate: f64,
}

impl HealthFeatures {
    pub fn from_parts(state: &FinancialState, credit_score: f64, num_credit_cards: f64) -> Self {
        Self {
            monthly_income: state.monthly_income,
            monthly_expense: state.monthly_expense,
            credit_score,
            credit_utilization: state.credit_utilization,
            num_credit_cards,
            total_emi: state.total_emi,
            debt_to_income: state.debt_to_income(),
            savings_rate: state.savings_rate(),
        }
    }

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.monthly_income,
            self.monthly_expense,
            self.credit_score,
            self.credit_utilization,
            self.num_credit_cards,
            self.total_emi,
            self.debt_to_income,
            self.savings_rate,
        ]
    }
}

pub fn derive_health_features(profile: &Profile) -> HealthFeatures {
    HealthFeatures::from_parts(
        &FinancialState::of(profile),
        f64::from(profile.credit_score),
        f64::from(profile.num_credit_cards),
    )
}

/// What-if model inputs: the full health block before the change plus the moved quantities after.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIfFeatures {
    pub before: HealthFeatures,
    pub after: FinancialState,
}

impl WhatIfFeatures {
    pub fn to_vector(&self) -> Vec<f64> {
        let mut vector = self.before.to_vector();
        vector.extend([
            self.after.total_emi,
            self.after.monthly_income,
            self.after.monthly_expense,
            self.after.credit_utilization,
            self.after.debt_to_income(),
            self.after.savings_rate(),
        ]);
        vector
    }
}
