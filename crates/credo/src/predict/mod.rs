//! Model-backed predictions over a profile: credit health, what-if scenarios and the
//! improvement outlook.

pub mod credit_health;
pub mod outlook;
pub mod what_if;

use thiserror::Error;

use crate::finance::{ProfileError, ScenarioError};
use crate::modeling::ModelError;

pub use credit_health::{predict_credit_health, CreditHealthPrediction, EligibilityBand};
pub use outlook::{improvement_outlook, ImprovementOutlook};
pub use what_if::{predict_what_if, WhatIfPrediction};

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("models are unavailable: {0}")]
    ModelUnavailable(#[source] ModelError),
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(#[source] ModelError),
    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] ScenarioError),
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

impl From<ModelError> for PredictionError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::SchemaMismatch { .. } => PredictionError::SchemaMismatch(err),
            other => PredictionError::ModelUnavailable(other),
        }
    }
}
