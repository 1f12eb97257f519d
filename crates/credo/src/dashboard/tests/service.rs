use std::sync::Arc;

use super::common::*;
use crate::dashboard::{emi_for, DashboardError, DashboardService};
use crate::finance::{financial_health_score, Scenario, ScenarioKind};
use crate::modeling::{ModelStatus, RiskCategory};
use crate::predict::PredictionError;
use crate::storage::{CreditHistoryRepository, InMemoryStore, ProfileRepository};

#[test]
fn reads_without_a_profile_report_it_missing() {
    let (service, _) = build_service();

    assert!(service.profile().is_none());
    assert!(matches!(service.overview(), Err(DashboardError::MissingProfile)));
    assert!(matches!(service.credit_health(), Err(DashboardError::MissingProfile)));
    assert!(matches!(
        service.what_if(&Scenario::IncomeIncrease { delta: 1_000.0 }),
        Err(DashboardError::MissingProfile)
    ));
    assert!(service.history().is_empty());
    assert!(service.history_analysis().is_none());
}

#[test]
fn invalid_profiles_are_rejected_before_saving() {
    let (service, store) = build_service();
    let mut profile = profile();
    profile.credit_score = 120;

    let err = service.update_profile(profile).expect_err("score below range");
    assert!(matches!(err, DashboardError::InvalidProfile(_)));
    assert!(store.load_profile().is_none());
    assert!(store.load_credit_history().is_empty());
}

#[test]
fn history_grows_only_when_the_score_changes() {
    let (service, store) = build_service();

    let saved = service.update_profile(profile()).expect("first save");
    assert!(saved.last_updated.is_some());
    assert_eq!(store.load_credit_history().len(), 1);

    service.update_profile(profile()).expect("same score");
    assert_eq!(store.load_credit_history().len(), 1);

    let mut improved = profile();
    improved.credit_score = 700;
    service.update_profile(improved).expect("new score");

    let history = service.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].credit_score, 700);
    assert_eq!(history[1].notes, "Profile updated - Score: 700");

    let analysis = service.history_analysis().expect("two entries");
    assert_eq!(analysis.entries, 2);
    assert_eq!(analysis.current, 700);
}

#[test]
fn write_failures_surface_as_storage_errors() {
    let (service, store) = build_service();
    store.set_read_only(true);

    let err = service.update_profile(profile()).expect_err("store is read-only");
    assert!(matches!(err, DashboardError::Storage(_)));
}

#[test]
fn overview_summarizes_cash_flow() {
    let (service, _) = build_service_with_profile();
    let overview = service.overview().expect("profile saved");

    assert_eq!(overview.total_emi, 5_000.0);
    assert_eq!(overview.monthly_savings, 15_000.0);
    assert_eq!(overview.debt_to_income, 10.0);
    assert_eq!(overview.savings_rate, 30.0);
    assert_eq!(overview.health, financial_health_score(&profile()));
    assert_eq!(overview.unseen_alerts, 0);
}

#[test]
fn predictions_use_the_stored_profile() {
    let (service, _) = build_service_with_profile();

    let health = service.credit_health().expect("models available");
    assert_eq!(health.risk_category, RiskCategory::Low);
    assert_eq!(health.eligibility, 72.0);

    let what_if = service
        .what_if(&Scenario::ExpenseIncrease { delta: 5_000.0 })
        .expect("valid scenario");
    assert_eq!(what_if.scenario, ScenarioKind::ExpenseIncrease);
    assert_eq!(what_if.predicted_score, 700);
    assert_eq!(what_if.score_change, 50);
    assert_eq!(what_if.after.monthly_expense, 35_000.0);
}

#[test]
fn invalid_scenarios_are_reported_as_such() {
    let (service, _) = build_service_with_profile();

    let err = service
        .what_if(&Scenario::PayOffLoan { loan_index: 3 })
        .expect_err("only one loan");
    assert!(matches!(
        err,
        DashboardError::Prediction(PredictionError::InvalidScenario(_))
    ));
}

#[test]
fn unavailable_models_surface_as_prediction_errors() {
    let store = Arc::new(InMemoryStore::new());
    let service = DashboardService::new(Arc::clone(&store), Arc::new(WarmingModels));
    service.update_profile(profile()).expect("profile is valid");

    assert_eq!(service.model_status(), ModelStatus::Warming);
    assert!(matches!(
        service.credit_health(),
        Err(DashboardError::Prediction(PredictionError::ModelUnavailable(_)))
    ));
    assert!(service.overview().is_ok());
}

#[test]
fn alerts_can_be_refreshed_and_acknowledged() {
    let (service, _) = build_service_with_profile();

    let alerts = service.refresh_alerts().expect("alerts stored");
    assert!(!alerts.is_empty());
    assert_eq!(service.unseen_count(), alerts.len());

    assert!(service.mark_seen(&alerts[0].message).expect("marked"));
    assert_eq!(service.unseen_count(), alerts.len() - 1);

    let refreshed = service.refresh_alerts().expect("alerts stored");
    assert_eq!(refreshed.len(), alerts.len());

    service.mark_all_seen().expect("marked");
    assert_eq!(service.unseen_count(), 0);
    assert_eq!(service.overview().expect("profile saved").unseen_alerts, 0);
}

#[test]
fn affordability_requires_a_non_negative_installment() {
    let (service, _) = build_service_with_profile();

    let check = service.affordability(10_000.0).expect("valid installment");
    assert!(check.affordable);
    assert_eq!(check.available_income, 15_000.0);

    assert!(matches!(
        service.affordability(-1.0),
        Err(DashboardError::InvalidInput(_))
    ));
}

#[test]
fn offers_are_filtered_by_loan_type() {
    let (service, _) = build_service();

    let all = service.compare_offers(500_000.0, 5, None).expect("valid terms");
    assert_eq!(all.len(), 2);

    let personal = service
        .compare_offers(500_000.0, 5, Some("Personal"))
        .expect("valid terms");
    assert_eq!(personal.len(), 1);
    assert_eq!(personal[0].bank, "North Bank");

    assert!(matches!(
        service.compare_offers(500_000.0, 0, None),
        Err(DashboardError::InvalidInput(_))
    ));
}

#[test]
fn emi_calculator_validates_terms() {
    let flat = emi_for(120_000.0, 0.0, 12).expect("valid terms");
    assert_eq!(flat.installment, 10_000.0);
    assert_eq!(flat.total_interest, 0.0);

    assert!(matches!(emi_for(120_000.0, 9.0, 0), Err(DashboardError::InvalidInput(_))));
    assert!(matches!(emi_for(-5.0, 9.0, 12), Err(DashboardError::InvalidInput(_))));
    assert!(matches!(emi_for(1_000.0, -1.0, 12), Err(DashboardError::InvalidInput(_))));
}
