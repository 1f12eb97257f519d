use serde::{Deserialize, Serialize};
use tracing::info;

use super::forest::{ForestClassifier, ForestRegressor, ForestSettings};
use super::model::{Estimator, TrainedModel};
use super::policy::RiskCategory;
use super::synthetic::{generate_health_samples, generate_what_if_samples};
use super::{ModelError, ModelKind};

/// Dataset sizes and forest shape used whenever a model has to be (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSettings {
    pub seed: u64,
    pub health_samples: usize,
    pub what_if_samples: usize,
    pub n_trees: usize,
    pub health_max_depth: usize,
    pub what_if_max_depth: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            health_samples: 2_000,
            what_if_samples: 2_000,
            n_trees: 100,
            health_max_depth: 10,
            what_if_max_depth: 12,
        }
    }
}

impl TrainingSettings {
    fn health_forest(&self) -> ForestSettings {
        ForestSettings::new(self.n_trees, self.health_max_depth, self.seed)
    }

    fn what_if_forest(&self) -> ForestSettings {
        ForestSettings::new(self.n_trees, self.what_if_max_depth, self.seed)
    }
}

/// Both health estimators, fitted on the same dataset.
#[derive(Debug, Clone)]
pub struct HealthModels {
    pub risk: TrainedModel,
    pub eligibility: TrainedModel,
}

pub fn train_health_models(settings: &TrainingSettings) -> Result<HealthModels, ModelError> {
    let samples = generate_health_samples(settings.health_samples, settings.seed);
    let features: Vec<Vec<f64>> = samples.iter().map(|s| s.features.to_vector()).collect();
    let risk_labels: Vec<usize> = samples.iter().map(|s| s.risk_category.index()).collect();
    let eligibility: Vec<f64> = samples.iter().map(|s| s.eligibility).collect();

    let forest = settings.health_forest();
    let classifier =
        ForestClassifier::fit(&features, &risk_labels, RiskCategory::ALL.len(), &forest)?;
    let regressor = ForestRegressor::fit(&features, &eligibility, &forest)?;

    info!(
        samples = samples.len(),
        trees = forest.n_trees,
        max_depth = forest.max_depth,
        "trained credit health models"
    );

    Ok(HealthModels {
        risk: TrainedModel::new(
            ModelKind::RiskClassifier,
            samples.len(),
            Estimator::Classifier(classifier),
        ),
        eligibility: TrainedModel::new(
            ModelKind::EligibilityRegressor,
            samples.len(),
            Estimator::Regressor(regressor),
        ),
    })
}

pub fn train_what_if_model(settings: &TrainingSettings) -> Result<TrainedModel, ModelError> {
    let samples = generate_what_if_samples(settings.what_if_samples, settings.seed);
    let features: Vec<Vec<f64>> = samples.iter().map(|s| s.features.to_vector()).collect();
    let scores: Vec<f64> = samples.iter().map(|s| s.predicted_score).collect();

    let forest = settings.what_if_forest();
    let regressor = ForestRegressor::fit(&features, &scores, &forest)?;

    info!(
        samples = samples.len(),
        trees = forest.n_trees,
        max_depth = forest.max_depth,
        "trained what-if model"
    );

    Ok(TrainedModel::new(
        ModelKind::WhatIfRegressor,
        samples.len(),
        Estimator::Regressor(regressor),
    ))
}
