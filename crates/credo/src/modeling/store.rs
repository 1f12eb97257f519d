use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::model::TrainedModel;
use super::trainer::{train_health_models, train_what_if_model, TrainingSettings};
use super::{ModelError, ModelKind};

/// Where a model source is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Warming,
    Ready,
    Failed(String),
}

/// Anything able to hand out a ready-to-use model.
pub trait ModelSource: Send + Sync {
    fn get_or_train(&self, kind: ModelKind) -> Result<Arc<TrainedModel>, ModelError>;

    fn status(&self) -> ModelStatus;

    fn is_ready(&self) -> bool {
        self.status() == ModelStatus::Ready
    }
}

/// Loads persisted models from a directory, training and persisting any that are missing,
/// unreadable or trained on a different feature schema.
pub struct ModelStore {
    dir: PathBuf,
    settings: TrainingSettings,
    cache: Mutex<HashMap<ModelKind, Arc<TrainedModel>>>,
    status: Mutex<ModelStatus>,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>, settings: TrainingSettings) -> Self {
        Self {
            dir: dir.into(),
            settings,
            cache: Mutex::new(HashMap::new()),
            status: Mutex::new(ModelStatus::Warming),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings(&self) -> &TrainingSettings {
        &self.settings
    }

    /// Brings every model into memory.
    pub fn warm_up(&self) -> Result<(), ModelError> {
        for kind in ModelKind::ALL {
            self.get_or_train(kind)?;
        }
        Ok(())
    }

    /// Trains every model from scratch and overwrites what is on disk.
    pub fn retrain_all(&self) -> Result<(), ModelError> {
        let mut cache = self.lock_cache();
        cache.clear();
        self.set_status(ModelStatus::Warming);
        for kind in [ModelKind::RiskClassifier, ModelKind::WhatIfRegressor] {
            if let Err(err) = self.train_group(kind, &mut cache) {
                self.set_status(ModelStatus::Failed(err.to_string()));
                return Err(err);
            }
        }
        self.refresh_ready(&cache);
        Ok(())
    }

    /// Runs [`ModelStore::warm_up`] on the blocking pool.
    pub fn spawn_warm_up(self: Arc<Self>) -> tokio::task::JoinHandle<Result<(), ModelError>> {
        tokio::task::spawn_blocking(move || {
            let outcome = self.warm_up();
            match &outcome {
                Ok(()) => info!(dir = %self.dir.display(), "models ready"),
                Err(err) => warn!(error = %err, "model warm-up failed"),
            }
            outcome
        })
    }

    pub fn path_for(&self, kind: ModelKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<ModelKind, Arc<TrainedModel>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: ModelStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    fn refresh_ready(&self, cache: &HashMap<ModelKind, Arc<TrainedModel>>) {
        if ModelKind::ALL.iter().all(|kind| cache.contains_key(kind)) {
            self.set_status(ModelStatus::Ready);
        }
    }

    fn load(&self, kind: ModelKind) -> Option<TrainedModel> {
        let path = self.path_for(kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(model = %kind, path = %path.display(), "no persisted model");
                return None;
            }
            Err(err) => {
                warn!(model = %kind, path = %path.display(), error = %err, "model unreadable");
                return None;
            }
        };

        let model: TrainedModel = match serde_json::from_slice(&bytes) {
            Ok(model) => model,
            Err(err) => {
                warn!(model = %kind, path = %path.display(), error = %err, "model corrupt");
                return None;
            }
        };

        if model.kind != kind || !model.is_current() {
            warn!(
                model = %kind,
                found = %model.schema,
                expected = %kind.schema().stamp(),
                "persisted model does not match the current feature schema"
            );
            return None;
        }

        Some(model)
    }

    fn persist(&self, model: &TrainedModel) -> Result<(), ModelError> {
        let path = self.path_for(model.kind);
        let persist_err = |source: io::Error| ModelError::Persist {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(persist_err)?;
        let payload = serde_json::to_vec(model)?;
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(persist_err)?;
        temp.write_all(&payload).map_err(persist_err)?;
        temp.flush().map_err(persist_err)?;
        temp.persist(&path)
            .map_err(|err| persist_err(err.error))?;

        debug!(model = %model.kind, path = %path.display(), "persisted model");
        Ok(())
    }

    fn train_group(
        &self,
        kind: ModelKind,
        cache: &mut HashMap<ModelKind, Arc<TrainedModel>>,
    ) -> Result<Arc<TrainedModel>, ModelError> {
        info!(model = %kind, "training model group");
        let (requested, siblings) = match kind {
            ModelKind::RiskClassifier => {
                let models = train_health_models(&self.settings)?;
                (models.risk, vec![models.eligibility])
            }
            ModelKind::EligibilityRegressor => {
                let models = train_health_models(&self.settings)?;
                (models.eligibility, vec![models.risk])
            }
            ModelKind::WhatIfRegressor => (train_what_if_model(&self.settings)?, Vec::new()),
        };

        for model in siblings {
            self.persist(&model)?;
            cache.insert(model.kind, Arc::new(model));
        }
        self.persist(&requested)?;
        let requested = Arc::new(requested);
        cache.insert(kind, Arc::clone(&requested));
        Ok(requested)
    }
}

impl ModelSource for ModelStore {
    fn get_or_train(&self, kind: ModelKind) -> Result<Arc<TrainedModel>, ModelError> {
        let mut cache = self.lock_cache();
        if let Some(model) = cache.get(&kind) {
            return Ok(Arc::clone(model));
        }

        let mut loaded = Vec::new();
        for member in kind.group() {
            if cache.contains_key(member) {
                continue;
            }
            match self.load(*member) {
                Some(model) => loaded.push(model),
                None => {
                    loaded.clear();
                    break;
                }
            }
        }
        for model in loaded {
            cache.insert(model.kind, Arc::new(model));
        }

        let model = match cache.get(&kind) {
            Some(model) => Arc::clone(model),
            // A partial group is retrained whole so its members share one dataset.
            None => match self.train_group(kind, &mut cache) {
                Ok(model) => model,
                Err(err) => {
                    self.set_status(ModelStatus::Failed(err.to_string()));
                    return Err(err);
                }
            },
        };
        self.refresh_ready(&cache);
        Ok(model)
    }

    fn status(&self) -> ModelStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
