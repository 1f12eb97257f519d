use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use credo::dashboard::{dashboard_router, DashboardService};
use credo::modeling::{ModelSource, ModelStatus};
use credo::storage::Storage;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_dashboard_routes<S, M>(service: Arc<DashboardService<S, M>>) -> axum::Router
where
    S: Storage + ?Sized + 'static,
    M: ModelSource + ?Sized + 'static,
{
    dashboard_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once every model is loaded or trained.
pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    match state.models.status() {
        ModelStatus::Ready => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        ModelStatus::Warming => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "warming_up" })),
        ),
        ModelStatus::Failed(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "failed", "error": reason })),
        ),
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo::modeling::{ModelError, ModelKind, TrainedModel};
    use credo::storage::InMemoryStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct Toggle {
        status: Mutex<ModelStatus>,
    }

    impl Default for Toggle {
        fn default() -> Self {
            Self {
                status: Mutex::new(ModelStatus::Warming),
            }
        }
    }

    impl Toggle {
        fn set(&self, status: ModelStatus) {
            *self.status.lock().expect("status lock") = status;
        }
    }

    impl ModelSource for Toggle {
        fn get_or_train(&self, _kind: ModelKind) -> Result<Arc<TrainedModel>, ModelError> {
            Err(ModelError::EmptyModel)
        }

        fn status(&self) -> ModelStatus {
            self.status.lock().expect("status lock").clone()
        }
    }

    fn app(models: Arc<Toggle>) -> axum::Router {
        let state = AppState {
            models: models.clone(),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let service = Arc::new(DashboardService::new(Arc::new(InMemoryStore::new()), models));
        with_dashboard_routes(service).layer(Extension(state))
    }

    fn get(uri: &str) -> axum::http::Request<axum::body::Body> {
        axum::http::Request::get(uri)
            .body(axum::body::Body::empty())
            .expect("valid request")
    }

    #[tokio::test]
    async fn healthcheck_is_always_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_model_warm_up() {
        let models = Arc::new(Toggle::default());
        let router = app(models.clone());

        let response = router
            .clone()
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        models.set(ModelStatus::Ready);
        let response = router.oneshot(get("/ready")).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_reports_a_failed_warm_up() {
        let models = Arc::new(Toggle::default());
        models.set(ModelStatus::Failed("failed to persist model".to_string()));

        let response = app(models)
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"], "failed to persist model");
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(Arc::new(Toggle::default()))
            .oneshot(get("/metrics"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
