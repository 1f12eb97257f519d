//! The dashboard facade and router over the JSON file store, exercising persistence across
//! store instances the way consecutive dashboard sessions would.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use credo::dashboard::{dashboard_router, DashboardService};
use credo::finance::{Loan, Profile};
use credo::modeling::{ModelSource, ModelStatus, ModelStore, TrainingSettings};
use credo::storage::{
    AlertRepository, CreditHistoryRepository, JsonFileStore, ProfileRepository, ALERTS_FILE,
    LOAN_OPTIONS_FILE, PROFILE_FILE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

type FileDashboard = DashboardService<JsonFileStore, ModelStore>;

fn settings() -> TrainingSettings {
    TrainingSettings {
        health_samples: 200,
        what_if_samples: 200,
        n_trees: 5,
        ..TrainingSettings::default()
    }
}

fn open(root: &TempDir) -> Arc<FileDashboard> {
    let store = Arc::new(JsonFileStore::new(root.path().join("data")));
    let models = Arc::new(ModelStore::new(root.path().join("models"), settings()));
    Arc::new(DashboardService::new(store, models))
}

fn profile() -> Profile {
    Profile::new(60_000.0, 52_000.0, 580, 72.0)
        .with_cards(3)
        .with_loan(Loan::new(300_000.0, 12_000.0, 36))
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

#[test]
fn profile_and_history_survive_a_new_session() {
    let root = TempDir::new().expect("temp dir");
    let first = open(&root);
    first.update_profile(profile()).expect("saved");

    let data_dir = root.path().join("data");
    assert!(data_dir.join(PROFILE_FILE).exists());
    let leftovers: Vec<_> = std::fs::read_dir(&data_dir)
        .expect("data dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let second = open(&root);
    let reloaded = second.profile().expect("profile persisted");
    assert_eq!(reloaded.credit_score, 580);
    assert_eq!(reloaded.loans.len(), 1);
    assert_eq!(second.history().len(), 1);

    let store = JsonFileStore::new(&data_dir);
    assert_eq!(store.load_profile(), Some(reloaded));
    assert_eq!(store.load_credit_history().len(), 1);
}

fn random_profile(rng: &mut StdRng) -> Profile {
    let income: f64 = rng.random_range(0.0..500_000.0);
    let mut profile = Profile::new(
        income,
        rng.random_range(0.0..income.max(1.0)),
        rng.random_range(300..=900),
        rng.random_range(0.0..100.0),
    )
    .with_cards(rng.random_range(0..8));
    for _ in 0..rng.random_range(0..=3) {
        let amount: f64 = rng.random_range(1_000.0..2_000_000.0);
        let months: f64 = rng.random_range(6.0..240.0);
        profile = profile.with_loan(Loan::new(
            amount,
            amount / months,
            rng.random_range(1..=360),
        ));
    }
    profile
}

#[test]
fn profiles_survive_a_save_and_reload_exactly() {
    let root = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(root.path().join("data"));
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..500 {
        let profile = random_profile(&mut rng);
        store.save_profile(&profile).expect("saved");
        assert_eq!(store.load_profile(), Some(profile));
    }
}

#[test]
fn alerts_deduplicate_and_keep_acknowledgements_on_disk() {
    let root = TempDir::new().expect("temp dir");
    let first = open(&root);
    first.update_profile(profile()).expect("saved");

    let alerts = first.refresh_alerts().expect("alerts stored");
    assert!(alerts.iter().any(|alert| alert.message.contains("below 600")));
    assert!(first.mark_seen(&alerts[0].message).expect("marked"));

    let second = open(&root);
    let again = second.refresh_alerts().expect("alerts stored");
    assert_eq!(again.len(), alerts.len());
    assert!(again[0].seen);
    assert_eq!(second.unseen_count(), alerts.len() - 1);

    let on_disk = JsonFileStore::new(root.path().join("data")).load_alerts();
    assert_eq!(on_disk, again);
    assert!(root.path().join("data").join(ALERTS_FILE).exists());
}

#[test]
fn loan_options_document_feeds_the_comparison() {
    let root = TempDir::new().expect("temp dir");
    let data_dir = root.path().join("data");
    std::fs::create_dir_all(&data_dir).expect("data dir");
    std::fs::write(
        data_dir.join(LOAN_OPTIONS_FILE),
        json!([
            { "bank": "North Bank", "type": "Personal", "interest_rate": 10.5 },
            { "bank": "Harbor Credit", "type": "Personal", "interest_rate": 0.0 },
            { "bank": "Harbor Credit", "type": "Home", "interest_rate": 8.4 }
        ])
        .to_string(),
    )
    .expect("offers written");

    let quotes = open(&root)
        .compare_offers(120_000.0, 1, Some("Personal"))
        .expect("valid terms");
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[1].emi.installment, 10_000.0);
    assert!(quotes[0].emi.total_interest > 0.0);
}

#[tokio::test]
async fn router_serves_predictions_once_models_are_warm() {
    let root = TempDir::new().expect("temp dir");
    let store = Arc::new(JsonFileStore::new(root.path().join("data")));
    let models = Arc::new(ModelStore::new(root.path().join("models"), settings()));
    let service = Arc::new(DashboardService::new(store, Arc::clone(&models)));
    let router = dashboard_router(service);

    let (status, _) = send(
        &router,
        Request::put("/api/v1/profile")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&profile()).expect("profile serializes"),
            ))
            .expect("valid request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let scenario = json!({ "type": "income_increase", "delta": 20000.0 });
    let (status, body) = send(&router, post("/api/v1/what-if", &scenario)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "warming_up");

    Arc::clone(&models)
        .spawn_warm_up()
        .await
        .expect("warm-up task joins")
        .expect("models train");
    assert!(models.is_ready());

    let (status, body) = send(&router, post("/api/v1/what-if", &scenario)).await;
    assert_eq!(status, StatusCode::OK);
    let score = body["predicted_score"].as_u64().expect("score");
    assert!((300..=900).contains(&score));
    assert_eq!(body["scenario"], "income_increase");

    let (status, body) = send(
        &router,
        Request::get("/api/v1/credit-health")
            .body(Body::empty())
            .expect("valid request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let eligibility = body["eligibility"].as_f64().expect("eligibility");
    assert!((0.0..=100.0).contains(&eligibility));
}

#[tokio::test]
async fn router_reports_models_that_cannot_be_trained() {
    let root = TempDir::new().expect("temp dir");
    let blocked = root.path().join("models");
    std::fs::write(&blocked, b"not a directory").expect("blocking file");

    let store = Arc::new(JsonFileStore::new(root.path().join("data")));
    let models = Arc::new(ModelStore::new(&blocked, settings()));
    let service = Arc::new(DashboardService::new(store, Arc::clone(&models)));
    service.update_profile(profile()).expect("saved");
    let router = dashboard_router(service);

    let outcome = Arc::clone(&models)
        .spawn_warm_up()
        .await
        .expect("warm-up task joins");
    assert!(outcome.is_err());
    assert!(matches!(models.status(), ModelStatus::Failed(_)));

    let (status, body) = send(
        &router,
        Request::get("/api/v1/credit-health")
            .body(Body::empty())
            .expect("valid request"),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
    let error = body["error"].as_str().expect("error message");
    assert!(error.starts_with("models are unavailable"));
    assert!(error.contains("failed to persist model"));
}
