//! Threshold alerts over a profile, deduplicated by message text against the stored list.

mod domain;
mod rules;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::finance::Profile;
use crate::storage::{AlertRepository, StorageError};

pub use domain::{Alert, AlertKind, AlertPriority};
pub use rules::evaluate_profile;

/// Keeps every stored alert and appends fresh ones whose message is not stored yet.
pub fn merge(mut existing: Vec<Alert>, fresh: Vec<Alert>) -> (Vec<Alert>, usize) {
    let mut known: HashSet<String> = existing.iter().map(|alert| alert.message.clone()).collect();
    let before = existing.len();
    for alert in fresh {
        if known.insert(alert.message.clone()) {
            existing.push(alert);
        }
    }
    let added = existing.len() - before;
    (existing, added)
}

/// Alert lifecycle over a repository: generate-and-merge, counting and acknowledgement.
pub struct AlertCenter<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for AlertCenter<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> AlertCenter<R>
where
    R: AlertRepository + ?Sized,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Evaluates the profile now and returns the merged, persisted list.
    pub fn generate_alerts(&self, profile: &Profile) -> Result<Vec<Alert>, StorageError> {
        self.generate_alerts_at(profile, Local::now().naive_local())
    }

    pub fn generate_alerts_at(
        &self,
        profile: &Profile,
        now: NaiveDateTime,
    ) -> Result<Vec<Alert>, StorageError> {
        let fresh = evaluate_profile(profile, now);
        let (merged, added) = merge(self.repository.load_alerts(), fresh);
        self.repository.save_alerts(&merged)?;
        info!(added, total = merged.len(), "alerts merged");
        Ok(merged)
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.repository.load_alerts()
    }

    pub fn unseen_count(&self) -> usize {
        self.repository
            .load_alerts()
            .iter()
            .filter(|alert| !alert.seen)
            .count()
    }

    /// Marks the alert with this message as seen. Returns false when no such alert exists.
    pub fn mark_seen(&self, message: &str) -> Result<bool, StorageError> {
        let mut alerts = self.repository.load_alerts();
        let Some(alert) = alerts.iter_mut().find(|alert| alert.message == message) else {
            return Ok(false);
        };
        if !alert.seen {
            alert.seen = true;
            self.repository.save_alerts(&alerts)?;
        }
        Ok(true)
    }

    /// Returns how many alerts changed.
    pub fn mark_all_seen(&self) -> Result<usize, StorageError> {
        let mut alerts = self.repository.load_alerts();
        let mut changed = 0;
        for alert in alerts.iter_mut().filter(|alert| !alert.seen) {
            alert.seen = true;
            changed += 1;
        }
        if changed > 0 {
            self.repository.save_alerts(&alerts)?;
        }
        Ok(changed)
    }
}
