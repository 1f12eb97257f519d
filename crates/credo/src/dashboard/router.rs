use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{emi_for, DashboardService};
use crate::error::AppError;
use crate::finance::{Profile, Scenario};
use crate::modeling::{ModelSource, ModelStatus};
use crate::storage::Storage;

type Shared<S, M> = State<Arc<DashboardService<S, M>>>;

/// Local JSON API the dashboard UI drives.
pub fn dashboard_router<S, M>(service: Arc<DashboardService<S, M>>) -> Router
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/profile",
            get(profile_handler::<S, M>).put(update_profile_handler::<S, M>),
        )
        .route("/api/v1/overview", get(overview_handler::<S, M>))
        .route("/api/v1/credit-health", get(credit_health_handler::<S, M>))
        .route("/api/v1/outlook", get(outlook_handler::<S, M>))
        .route("/api/v1/what-if", post(what_if_handler::<S, M>))
        .route("/api/v1/alerts", get(alerts_handler::<S, M>))
        .route("/api/v1/alerts/refresh", post(refresh_alerts_handler::<S, M>))
        .route("/api/v1/alerts/seen", post(mark_seen_handler::<S, M>))
        .route("/api/v1/alerts/seen-all", post(mark_all_seen_handler::<S, M>))
        .route("/api/v1/history", get(history_handler::<S, M>))
        .route("/api/v1/emi", post(emi_handler))
        .route("/api/v1/affordability", get(affordability_handler::<S, M>))
        .route("/api/v1/loan-offers", get(loan_offers_handler::<S, M>))
        .with_state(service)
}

/// The 503 to send while models are not ready, if any.
fn models_pending(status: ModelStatus) -> Option<Response> {
    let body = match status {
        ModelStatus::Ready => return None,
        ModelStatus::Warming => json!({ "status": "warming_up" }),
        ModelStatus::Failed(reason) => json!({
            "status": "unavailable",
            "error": format!("models are unavailable: {reason}"),
        }),
    };
    Some((StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response())
}

pub(crate) async fn profile_handler<S, M>(State(service): Shared<S, M>) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    let profile = service.profile().ok_or(AppError::NotFound("profile"))?;
    Ok(Json(profile).into_response())
}

pub(crate) async fn update_profile_handler<S, M>(
    State(service): Shared<S, M>,
    Json(profile): Json<Profile>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    let saved = service.update_profile(profile)?;
    Ok(Json(saved).into_response())
}

pub(crate) async fn overview_handler<S, M>(State(service): Shared<S, M>) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    Ok(Json(service.overview()?).into_response())
}

pub(crate) async fn credit_health_handler<S, M>(
    State(service): Shared<S, M>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    if let Some(pending) = models_pending(service.model_status()) {
        return Ok(pending);
    }
    let prediction = service.credit_health()?;
    Ok(Json(json!({
        "eligibility": prediction.eligibility,
        "risk_category": prediction.risk_category,
        "eligibility_band": prediction.eligibility_band(),
        "recommendation": prediction.recommendation(),
    }))
    .into_response())
}

pub(crate) async fn outlook_handler<S, M>(State(service): Shared<S, M>) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    if let Some(pending) = models_pending(service.model_status()) {
        return Ok(pending);
    }
    Ok(Json(service.outlook()?).into_response())
}

pub(crate) async fn what_if_handler<S, M>(
    State(service): Shared<S, M>,
    Json(scenario): Json<Scenario>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    if let Some(pending) = models_pending(service.model_status()) {
        return Ok(pending);
    }
    Ok(Json(service.what_if(&scenario)?).into_response())
}

pub(crate) async fn alerts_handler<S, M>(State(service): Shared<S, M>) -> Response
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    let alerts = service.alerts();
    let unseen = alerts.iter().filter(|alert| !alert.seen).count();
    Json(json!({ "alerts": alerts, "unseen": unseen })).into_response()
}

pub(crate) async fn refresh_alerts_handler<S, M>(
    State(service): Shared<S, M>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    let alerts = service.refresh_alerts()?;
    let unseen = alerts.iter().filter(|alert| !alert.seen).count();
    Ok(Json(json!({ "alerts": alerts, "unseen": unseen })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct MarkSeenRequest {
    pub message: String,
}

pub(crate) async fn mark_seen_handler<S, M>(
    State(service): Shared<S, M>,
    Json(request): Json<MarkSeenRequest>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    if service.mark_seen(&request.message)? {
        Ok(Json(json!({ "seen": true, "unseen": service.unseen_count() })).into_response())
    } else {
        Err(AppError::NotFound("alert"))
    }
}

pub(crate) async fn mark_all_seen_handler<S, M>(
    State(service): Shared<S, M>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    let changed = service.mark_all_seen()?;
    Ok(Json(json!({ "marked": changed, "unseen": 0 })).into_response())
}

pub(crate) async fn history_handler<S, M>(State(service): Shared<S, M>) -> Response
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    Json(json!({
        "entries": service.history(),
        "analysis": service.history_analysis(),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct EmiRequest {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
}

pub(crate) async fn emi_handler(Json(request): Json<EmiRequest>) -> Result<Response, AppError> {
    let breakdown = emi_for(request.principal, request.annual_rate, request.tenure_months)?;
    Ok(Json(breakdown).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AffordabilityQuery {
    pub new_emi: f64,
}

pub(crate) async fn affordability_handler<S, M>(
    State(service): Shared<S, M>,
    Query(query): Query<AffordabilityQuery>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    Ok(Json(service.affordability(query.new_emi)?).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LoanOffersQuery {
    pub amount: f64,
    pub tenure_years: u32,
    #[serde(default)]
    pub loan_type: Option<String>,
}

pub(crate) async fn loan_offers_handler<S, M>(
    State(service): Shared<S, M>,
    Query(query): Query<LoanOffersQuery>,
) -> Result<Response, AppError>
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    let quotes = service.compare_offers(
        query.amount,
        query.tenure_years,
        query.loan_type.as_deref(),
    )?;
    Ok(Json(quotes).into_response())
}
