//! Persistence seams for profile, credit history, alerts and loan offers.
//!
//! Reads never fail: missing or unreadable documents come back as `None`/empty and are logged.
//! Writes report failures through [`StorageError`].

mod json;
mod memory;

use std::path::PathBuf;

use crate::alerts::Alert;
use crate::finance::{CreditHistoryEntry, LoanOffer, Profile};

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

pub const PROFILE_FILE: &str = "user_profile.json";
pub const HISTORY_FILE: &str = "credit_history.json";
pub const ALERTS_FILE: &str = "alerts.json";
pub const LOAN_OPTIONS_FILE: &str = "loan_options.json";

pub trait ProfileRepository: Send + Sync {
    fn load_profile(&self) -> Option<Profile>;
    /// Replaces the stored profile atomically.
    fn save_profile(&self, profile: &Profile) -> Result<(), StorageError>;
}

pub trait CreditHistoryRepository: Send + Sync {
    fn load_credit_history(&self) -> Vec<CreditHistoryEntry>;
    /// Appends an entry stamped with the current local time.
    fn append_credit_history_entry(
        &self,
        credit_score: u16,
        notes: &str,
    ) -> Result<CreditHistoryEntry, StorageError>;
}

pub trait AlertRepository: Send + Sync {
    fn load_alerts(&self) -> Vec<Alert>;
    /// Overwrites the full list.
    fn save_alerts(&self, alerts: &[Alert]) -> Result<(), StorageError>;
}

pub trait LoanOfferSource: Send + Sync {
    fn load_loan_offers(&self) -> Vec<LoanOffer>;
}

/// Everything the dashboard persists, behind one bound.
pub trait Storage:
    ProfileRepository + CreditHistoryRepository + AlertRepository + LoanOfferSource
{
}

impl<T> Storage for T where
    T: ProfileRepository + CreditHistoryRepository + AlertRepository + LoanOfferSource
{
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {document}: {source}")]
    Encode {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
