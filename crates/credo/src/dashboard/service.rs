use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::alerts::{Alert, AlertCenter};
use crate::finance::{
    analyze_history, calculate_emi, check_affordability, compare_offers, financial_health_score,
    Affordability, CreditHistoryEntry, EmiBreakdown, FinancialState, HealthScore,
    HistoryAnalysis, OfferQuote, Profile, ProfileError, Scenario, UtilizationBand,
};
use crate::modeling::{ModelSource, ModelStatus};
use crate::predict::{
    improvement_outlook, predict_credit_health, predict_what_if, CreditHealthPrediction,
    ImprovementOutlook, PredictionError, WhatIfPrediction,
};
use crate::storage::{Storage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("no profile has been saved yet")]
    MissingProfile,
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    InvalidInput(String),
}

/// Cash-flow summary shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub profile: Profile,
    pub total_emi: f64,
    pub monthly_savings: f64,
    pub debt_to_income: f64,
    pub savings_rate: f64,
    pub utilization_band: UtilizationBand,
    pub health: HealthScore,
    pub unseen_alerts: usize,
}

/// Facade composing storage, the model source and the alert center.
pub struct DashboardService<S: ?Sized, M: ?Sized> {
    storage: Arc<S>,
    models: Arc<M>,
    alerts: AlertCenter<S>,
}

impl<S, M> DashboardService<S, M>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    pub fn new(storage: Arc<S>, models: Arc<M>) -> Self {
        let alerts = AlertCenter::new(Arc::clone(&storage));
        Self {
            storage,
            models,
            alerts,
        }
    }

    pub fn model_status(&self) -> ModelStatus {
        self.models.status()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.storage.load_profile()
    }

    fn require_profile(&self) -> Result<Profile, DashboardError> {
        self.storage
            .load_profile()
            .ok_or(DashboardError::MissingProfile)
    }

    /// Validates, stamps and saves the profile. A history entry is appended when the credit
    /// score differs from the stored one, or when nothing was stored before.
    pub fn update_profile(&self, mut profile: Profile) -> Result<Profile, DashboardError> {
        profile.validate()?;
        let previous = self.storage.load_profile();
        profile.last_updated = Some(Local::now().naive_local());
        self.storage.save_profile(&profile)?;

        let score_changed = previous
            .as_ref()
            .map_or(true, |stored| stored.credit_score != profile.credit_score);
        if score_changed {
            let note = format!("Profile updated - Score: {}", profile.credit_score);
            if let Err(err) = self
                .storage
                .append_credit_history_entry(profile.credit_score, &note)
            {
                warn!(error = %err, "profile saved but credit history was not updated");
            }
        }

        info!(credit_score = profile.credit_score, score_changed, "profile updated");
        Ok(profile)
    }

    pub fn overview(&self) -> Result<Overview, DashboardError> {
        let profile = self.require_profile()?;
        let state = FinancialState::of(&profile);
        Ok(Overview {
            total_emi: state.total_emi,
            monthly_savings: state.monthly_savings(),
            debt_to_income: state.debt_to_income(),
            savings_rate: state.savings_rate(),
            utilization_band: UtilizationBand::of(profile.credit_utilization),
            health: financial_health_score(&profile),
            unseen_alerts: self.alerts.unseen_count(),
            profile,
        })
    }

    pub fn health_score(&self) -> Result<HealthScore, DashboardError> {
        Ok(financial_health_score(&self.require_profile()?))
    }

    pub fn credit_health(&self) -> Result<CreditHealthPrediction, DashboardError> {
        let profile = self.require_profile()?;
        Ok(predict_credit_health(self.models.as_ref(), &profile)?)
    }

    pub fn what_if(&self, scenario: &Scenario) -> Result<WhatIfPrediction, DashboardError> {
        let profile = self.require_profile()?;
        Ok(predict_what_if(self.models.as_ref(), &profile, scenario)?)
    }

    pub fn outlook(&self) -> Result<ImprovementOutlook, DashboardError> {
        let profile = self.require_profile()?;
        let average = self.history_analysis().map(|analysis| analysis.average);
        Ok(improvement_outlook(self.models.as_ref(), &profile, average)?)
    }

    pub fn refresh_alerts(&self) -> Result<Vec<Alert>, DashboardError> {
        let profile = self.require_profile()?;
        Ok(self.alerts.generate_alerts(&profile)?)
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.alerts()
    }

    pub fn unseen_count(&self) -> usize {
        self.alerts.unseen_count()
    }

    pub fn mark_seen(&self, message: &str) -> Result<bool, DashboardError> {
        Ok(self.alerts.mark_seen(message)?)
    }

    pub fn mark_all_seen(&self) -> Result<usize, DashboardError> {
        Ok(self.alerts.mark_all_seen()?)
    }

    pub fn history(&self) -> Vec<CreditHistoryEntry> {
        let mut history = self.storage.load_credit_history();
        history.sort_by_key(|entry| entry.date);
        history
    }

    pub fn history_analysis(&self) -> Option<HistoryAnalysis> {
        analyze_history(&self.storage.load_credit_history())
    }

    pub fn affordability(&self, new_emi: f64) -> Result<Affordability, DashboardError> {
        if !new_emi.is_finite() || new_emi < 0.0 {
            return Err(DashboardError::InvalidInput(format!(
                "new_emi must be a non-negative amount (found {new_emi})"
            )));
        }
        Ok(check_affordability(&self.require_profile()?, new_emi))
    }

    pub fn compare_offers(
        &self,
        amount: f64,
        tenure_years: u32,
        loan_type: Option<&str>,
    ) -> Result<Vec<OfferQuote>, DashboardError> {
        validate_loan_terms(amount, 0.0, tenure_years.saturating_mul(12))?;
        Ok(compare_offers(
            &self.storage.load_loan_offers(),
            amount,
            tenure_years,
            loan_type,
        ))
    }
}

/// EMI for explicit loan terms, rejecting negative amounts and zero tenure.
pub fn emi_for(
    principal: f64,
    annual_rate: f64,
    tenure_months: u32,
) -> Result<EmiBreakdown, DashboardError> {
    validate_loan_terms(principal, annual_rate, tenure_months)?;
    Ok(calculate_emi(principal, annual_rate, tenure_months))
}

fn validate_loan_terms(
    principal: f64,
    annual_rate: f64,
    tenure_months: u32,
) -> Result<(), DashboardError> {
    if !principal.is_finite() || principal < 0.0 {
        return Err(DashboardError::InvalidInput(format!(
            "principal must be a non-negative amount (found {principal})"
        )));
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(DashboardError::InvalidInput(format!(
            "interest rate must be non-negative (found {annual_rate})"
        )));
    }
    if tenure_months == 0 {
        return Err(DashboardError::InvalidInput(
            "tenure must be at least one month".to_string(),
        ));
    }
    Ok(())
}
