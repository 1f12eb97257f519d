use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;

use super::{
    AlertRepository, CreditHistoryRepository, LoanOfferSource, ProfileRepository, StorageError,
};
use crate::alerts::Alert;
use crate::finance::{CreditHistoryEntry, LoanOffer, Profile};

/// Process-local store for tests and the demo walkthrough.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    profile: Mutex<Option<Profile>>,
    history: Mutex<Vec<CreditHistoryEntry>>,
    alerts: Mutex<Vec<Alert>>,
    offers: Vec<LoanOffer>,
    read_only: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offers(mut self, offers: Vec<LoanOffer>) -> Self {
        self.offers = offers;
        self
    }

    pub fn with_history(self, history: Vec<CreditHistoryEntry>) -> Self {
        *lock(&self.history) = history;
        self
    }

    /// Makes every subsequent write fail, as an unwritable data directory would.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self, document: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            Err(StorageError::Write {
                path: PathBuf::from(document),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
            })
        } else {
            Ok(())
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProfileRepository for InMemoryStore {
    fn load_profile(&self) -> Option<Profile> {
        lock(&self.profile).clone()
    }

    fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.check_writable(super::PROFILE_FILE)?;
        *lock(&self.profile) = Some(profile.clone());
        Ok(())
    }
}

impl CreditHistoryRepository for InMemoryStore {
    fn load_credit_history(&self) -> Vec<CreditHistoryEntry> {
        lock(&self.history).clone()
    }

    fn append_credit_history_entry(
        &self,
        credit_score: u16,
        notes: &str,
    ) -> Result<CreditHistoryEntry, StorageError> {
        self.check_writable(super::HISTORY_FILE)?;
        let entry = CreditHistoryEntry {
            date: Local::now().naive_local(),
            credit_score,
            notes: notes.to_string(),
        };
        lock(&self.history).push(entry.clone());
        Ok(entry)
    }
}

impl AlertRepository for InMemoryStore {
    fn load_alerts(&self) -> Vec<Alert> {
        lock(&self.alerts).clone()
    }

    fn save_alerts(&self, alerts: &[Alert]) -> Result<(), StorageError> {
        self.check_writable(super::ALERTS_FILE)?;
        *lock(&self.alerts) = alerts.to_vec();
        Ok(())
    }
}

impl LoanOfferSource for InMemoryStore {
    fn load_loan_offers(&self) -> Vec<LoanOffer> {
        self.offers.clone()
    }
}
