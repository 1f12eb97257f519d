//! Synthetic data, labelling policies, forests and the persisted model store.

pub mod forest;
pub mod model;
pub mod policy;
pub mod store;
pub mod synthetic;
pub mod trainer;

use std::path::PathBuf;

use thiserror::Error;

use crate::finance::{FeatureSchema, SchemaStamp, HEALTH_SCHEMA, WHAT_IF_SCHEMA};

pub use forest::{DecisionTree, ForestClassifier, ForestRegressor, ForestSettings, Node};
pub use model::{Estimator, TrainedModel};
pub use policy::{
    HealthLabelingPolicy, RiskCategory, ScenarioAssessment, ScenarioInferencePolicy,
    ScenarioLabelingPolicy, ScenarioRiskBands,
};
pub use store::{ModelSource, ModelStatus, ModelStore};
pub use synthetic::{
    generate_health_samples, generate_what_if_samples, write_health_csv, write_what_if_csv,
    HealthSample, WhatIfSample,
};
pub use trainer::{train_health_models, train_what_if_model, HealthModels, TrainingSettings};

/// The three estimators the engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RiskClassifier,
    EligibilityRegressor,
    WhatIfRegressor,
}

impl ModelKind {
    pub const ALL: [Self; 3] = [
        Self::RiskClassifier,
        Self::EligibilityRegressor,
        Self::WhatIfRegressor,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::RiskClassifier => "risk_classifier.json",
            Self::EligibilityRegressor => "eligibility_regressor.json",
            Self::WhatIfRegressor => "what_if_regressor.json",
        }
    }

    pub const fn schema(self) -> FeatureSchema {
        match self {
            Self::RiskClassifier | Self::EligibilityRegressor => HEALTH_SCHEMA,
            Self::WhatIfRegressor => WHAT_IF_SCHEMA,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RiskClassifier => "risk_classifier",
            Self::EligibilityRegressor => "eligibility_regressor",
            Self::WhatIfRegressor => "what_if_regressor",
        }
    }

    /// Models trained together from one dataset.
    pub const fn group(self) -> &'static [ModelKind] {
        match self {
            Self::RiskClassifier | Self::EligibilityRegressor => {
                &[Self::RiskClassifier, Self::EligibilityRegressor]
            }
            Self::WhatIfRegressor => &[Self::WhatIfRegressor],
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("expected {expected} features but received {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("class label {0} is outside the declared classes")]
    InvalidLabel(usize),
    #[error("model has no trees")]
    EmptyModel,
    #[error("{kind} is not a {expected}")]
    WrongEstimator {
        kind: ModelKind,
        expected: &'static str,
    },
    #[error("{kind} was trained on {found} but {expected} is required")]
    SchemaMismatch {
        kind: ModelKind,
        expected: SchemaStamp,
        found: SchemaStamp,
    },
    #[error("failed to persist model at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode model: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write training data: {0}")]
    Export(#[from] csv::Error),
}
