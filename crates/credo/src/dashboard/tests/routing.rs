use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::dashboard::{dashboard_router, router, DashboardService};
use crate::storage::InMemoryStore;

#[tokio::test]
async fn profile_route_is_not_found_before_first_save() {
    let (service, _) = build_service();

    let response = dashboard_router(service)
        .oneshot(get("/api/v1/profile"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "profile not found");
}

#[tokio::test]
async fn profile_put_validates_and_saves() {
    let (service, _) = build_service();
    let router = dashboard_router(Arc::clone(&service));

    let invalid = json!({
        "monthly_income": 50000.0,
        "monthly_expense": 30000.0,
        "credit_score": 950,
        "credit_utilization": 40.0,
    });
    let response = router
        .clone()
        .oneshot(json_request("PUT", "/api/v1/profile", &invalid))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let payload = serde_json::to_value(profile()).expect("profile serializes");
    let response = router
        .clone()
        .oneshot(json_request("PUT", "/api/v1/profile", &payload))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get("/api/v1/profile"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["credit_score"], 650);
    assert_eq!(body["current_loans"][0]["emi"], 5000.0);
}

#[tokio::test]
async fn prediction_routes_wait_for_models() {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(DashboardService::new(store, Arc::new(WarmingModels)));
    service.update_profile(profile()).expect("profile is valid");
    let router = dashboard_router(service);

    for request in [
        get("/api/v1/credit-health"),
        get("/api/v1/outlook"),
        json_request(
            "POST",
            "/api/v1/what-if",
            &json!({ "type": "income_increase", "delta": 10000.0 }),
        ),
    ] {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "warming_up");
    }

    let response = router
        .oneshot(get("/api/v1/overview"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn prediction_routes_report_failed_training() {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(DashboardService::new(store, Arc::new(FailedModels)));
    service.update_profile(profile()).expect("profile is valid");
    let router = dashboard_router(service);

    for uri in ["/api/v1/credit-health", "/api/v1/outlook"] {
        let response = router
            .clone()
            .oneshot(get(uri))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["status"], "unavailable");
        assert_eq!(
            body["error"],
            "models are unavailable: model directory is read-only"
        );
    }
}

#[tokio::test]
async fn credit_health_handler_reports_band_and_advice() {
    let (service, _) = build_service_with_profile();

    let response = router::credit_health_handler::<InMemoryStore, _>(State(service))
        .await
        .expect("prediction succeeds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["eligibility"], 72.0);
    assert_eq!(body["eligibility_band"], "high");
    assert_eq!(
        body["recommendation"],
        "Your credit health looks good! Maintain good financial habits."
    );
}

#[tokio::test]
async fn what_if_route_simulates_and_rejects_bad_scenarios() {
    let (service, _) = build_service_with_profile();
    let router = dashboard_router(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/what-if",
            &json!({ "type": "pay_off_loan", "loan_index": 0 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["predicted_score"], 700);
    assert_eq!(body["score_change"], 50);
    assert_eq!(body["after"]["total_emi"], 0.0);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/what-if",
            &json!({ "type": "pay_off_loan", "loan_index": 4 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn alert_routes_refresh_and_acknowledge() {
    let (service, _) = build_service_with_profile();
    let router = dashboard_router(service);

    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/alerts/refresh", &json!({})))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let total = body["unseen"].as_u64().expect("count");
    assert!(total > 0);
    let first = body["alerts"][0]["message"].clone();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/alerts/seen",
            &json!({ "message": first }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["unseen"], total - 1);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/alerts/seen",
            &json!({ "message": "not an alert" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/alerts/seen-all", &json!({})))
        .await
        .expect("router responds");
    assert_eq!(json_body(response).await["marked"], total - 1);

    let response = router
        .oneshot(get("/api/v1/alerts"))
        .await
        .expect("router responds");
    assert_eq!(json_body(response).await["unseen"], 0);
}

#[tokio::test]
async fn calculator_routes_validate_terms() {
    let (service, _) = build_service_with_profile();
    let router = dashboard_router(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/emi",
            &json!({ "principal": 120000.0, "annual_rate": 0.0, "tenure_months": 12 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["installment"], 10000.0);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/emi",
            &json!({ "principal": 120000.0, "annual_rate": 9.0, "tenure_months": 0 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .clone()
        .oneshot(get("/api/v1/affordability?new_emi=20000"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["affordable"], false);

    let response = router
        .oneshot(get("/api/v1/loan-offers?amount=500000&tenure_years=5&loan_type=Home"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["bank"], "Harbor Credit");
}

#[tokio::test]
async fn history_route_includes_analysis() {
    let (service, _) = build_service_with_profile();

    let response = dashboard_router(service)
        .oneshot(get("/api/v1/history"))
        .await
        .expect("router responds");
    let body = json_body(response).await;
    assert_eq!(body["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["analysis"]["current"], 650);
}
