use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{
    AlertRepository, CreditHistoryRepository, LoanOfferSource, ProfileRepository, StorageError,
    ALERTS_FILE, HISTORY_FILE, LOAN_OPTIONS_FILE, PROFILE_FILE,
};
use crate::alerts::Alert;
use crate::finance::{CreditHistoryEntry, LoanOffer, Profile};

/// One pretty-printed JSON document per concern under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn read<T: DeserializeOwned>(&self, file: &'static str) -> Option<T> {
        let path = self.path(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored document");
                return None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stored document unreadable");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stored document is not valid JSON");
                None
            }
        }
    }

    /// Writes through a temp file in the same directory, then renames over the target.
    fn write<T: Serialize + ?Sized>(&self, file: &'static str, value: &T) -> Result<(), StorageError> {
        let path = self.path(file);
        let write_err = |source: io::Error| StorageError::Write {
            path: path.clone(),
            source,
        };

        let payload = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Encode {
            document: file,
            source,
        })?;

        fs::create_dir_all(&self.data_dir).map_err(write_err)?;
        let mut temp = NamedTempFile::new_in(&self.data_dir).map_err(write_err)?;
        temp.write_all(&payload).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&path).map_err(|err| write_err(err.error))?;
        Ok(())
    }
}

impl ProfileRepository for JsonFileStore {
    fn load_profile(&self) -> Option<Profile> {
        self.read(PROFILE_FILE)
    }

    fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.write(PROFILE_FILE, profile)
    }
}

impl CreditHistoryRepository for JsonFileStore {
    fn load_credit_history(&self) -> Vec<CreditHistoryEntry> {
        self.read(HISTORY_FILE).unwrap_or_default()
    }

    fn append_credit_history_entry(
        &self,
        credit_score: u16,
        notes: &str,
    ) -> Result<CreditHistoryEntry, StorageError> {
        let entry = CreditHistoryEntry {
            date: Local::now().naive_local(),
            credit_score,
            notes: notes.to_string(),
        };
        let mut history = self.load_credit_history();
        history.push(entry.clone());
        self.write(HISTORY_FILE, &history)?;
        Ok(entry)
    }
}

impl AlertRepository for JsonFileStore {
    fn load_alerts(&self) -> Vec<Alert> {
        self.read(ALERTS_FILE).unwrap_or_default()
    }

    fn save_alerts(&self, alerts: &[Alert]) -> Result<(), StorageError> {
        self.write(ALERTS_FILE, alerts)
    }
}

impl LoanOfferSource for JsonFileStore {
    fn load_loan_offers(&self) -> Vec<LoanOffer> {
        self.read(LOAN_OPTIONS_FILE).unwrap_or_default()
    }
}
