use crate::cli::ServeArgs;
use crate::infra::{open_dashboard, AppState};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credo::config::AppConfig;
use credo::error::AppError;
use credo::telemetry;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let (service, models) = open_dashboard(&config);
    let app_state = AppState {
        models: models.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let warm_up = models.spawn_warm_up();
    tokio::spawn(async move {
        if let Err(err) = warm_up.await {
            warn!(error = %err, "model warm-up task did not complete");
        }
    });

    let app = with_dashboard_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.storage.data_dir.display(),
        model_dir = %config.storage.model_dir.display(),
        "credit health dashboard listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
