use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::forest::{ForestClassifier, ForestRegressor};
use super::policy::RiskCategory;
use super::{ModelError, ModelKind};
use crate::finance::SchemaStamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
pub enum Estimator {
    Classifier(ForestClassifier),
    Regressor(ForestRegressor),
}

/// A fitted estimator together with the schema stamp it was trained against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub kind: ModelKind,
    pub schema: SchemaStamp,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub estimator: Estimator,
}

impl TrainedModel {
    pub fn new(kind: ModelKind, samples: usize, estimator: Estimator) -> Self {
        Self {
            kind,
            schema: kind.schema().stamp(),
            trained_at: Utc::now(),
            samples,
            estimator,
        }
    }

    /// True when the recorded schema is the one this build derives features for.
    pub fn is_current(&self) -> bool {
        self.kind.schema().matches(&self.schema)
    }

    pub fn ensure_current(&self) -> Result<(), ModelError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(ModelError::SchemaMismatch {
                kind: self.kind,
                expected: self.kind.schema().stamp(),
                found: self.schema.clone(),
            })
        }
    }

    pub fn classify(&self, features: &[f64]) -> Result<RiskCategory, ModelError> {
        self.ensure_current()?;
        match &self.estimator {
            Estimator::Classifier(forest) => {
                let index = forest.predict(features)?;
                RiskCategory::from_index(index).ok_or(ModelError::InvalidLabel(index))
            }
            Estimator::Regressor(_) => Err(ModelError::WrongEstimator {
                kind: self.kind,
                expected: "classifier",
            }),
        }
    }

    pub fn regress(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.ensure_current()?;
        match &self.estimator {
            Estimator::Regressor(forest) => forest.predict(features),
            Estimator::Classifier(_) => Err(ModelError::WrongEstimator {
                kind: self.kind,
                expected: "regressor",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modeling::forest::{DecisionTree, Node};

    fn constant_regressor(kind: ModelKind, value: f64) -> TrainedModel {
        let tree = DecisionTree::from_nodes(vec![Node::Leaf(value)]);
        let forest = ForestRegressor::from_trees(kind.schema().len(), vec![tree]);
        TrainedModel::new(kind, 0, Estimator::Regressor(forest))
    }

    #[test]
    fn stale_schema_is_rejected_at_inference() {
        let mut model = constant_regressor(ModelKind::EligibilityRegressor, 55.0);
        assert_eq!(model.regress(&[0.0; 8]).expect("current schema"), 55.0);

        model.schema.version += 1;
        assert!(matches!(
            model.regress(&[0.0; 8]),
            Err(ModelError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn estimator_kind_is_checked() {
        let model = constant_regressor(ModelKind::EligibilityRegressor, 55.0);
        assert!(matches!(
            model.classify(&[0.0; 8]),
            Err(ModelError::WrongEstimator {
                expected: "classifier",
                ..
            })
        ));
    }
}
