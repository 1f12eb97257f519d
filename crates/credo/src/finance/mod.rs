//! Profile domain, calculators and the feature deriver.

pub mod domain;
pub mod emi;
pub mod features;
pub mod health;
pub mod history;
pub mod scenario;

pub use domain::{CreditHistoryEntry, Loan, LoanOffer, Profile, ProfileError};
pub use emi::{
    calculate_emi, check_affordability, compare_offers, Affordability, EmiBreakdown, OfferQuote,
};
pub use features::{
    debt_to_income, derive_health_features, savings_rate, total_emi, FeatureSchema,
    FinancialState, HealthFeatures, SchemaStamp, WhatIfFeatures, HEALTH_SCHEMA, WHAT_IF_SCHEMA,
};
pub use health::{financial_health_score, HealthBand, HealthScore, UtilizationBand};
pub use history::{analyze_history, HistoryAnalysis, TrendLabel, Volatility};
pub use scenario::{Scenario, ScenarioError, ScenarioKind};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
