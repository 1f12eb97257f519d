use crate::config::ConfigError;
use crate::dashboard::DashboardError;
use crate::finance::ProfileError;
use crate::modeling::ModelError;
use crate::predict::PredictionError;
use crate::storage::StorageError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Storage(StorageError),
    Model(ModelError),
    Prediction(PredictionError),
    Profile(ProfileError),
    InvalidInput(String),
    NotFound(&'static str),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Model(err) => write!(f, "model error: {}", err),
            AppError::Prediction(err) => write!(f, "prediction error: {}", err),
            AppError::Profile(err) => write!(f, "invalid profile: {}", err),
            AppError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            AppError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Model(err) => Some(err),
            AppError::Prediction(err) => Some(err),
            AppError::Profile(err) => Some(err),
            AppError::InvalidInput(_) | AppError::NotFound(_) => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Profile(_)
            | AppError::InvalidInput(_)
            | AppError::Prediction(PredictionError::InvalidProfile(_))
            | AppError::Prediction(PredictionError::InvalidScenario(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Model(_) | AppError::Prediction(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<ModelError> for AppError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<PredictionError> for AppError {
    fn from(value: PredictionError) -> Self {
        Self::Prediction(value)
    }
}

impl From<ProfileError> for AppError {
    fn from(value: ProfileError) -> Self {
        Self::Profile(value)
    }
}

impl From<DashboardError> for AppError {
    fn from(value: DashboardError) -> Self {
        match value {
            DashboardError::MissingProfile => Self::NotFound("profile"),
            DashboardError::InvalidProfile(err) => Self::Profile(err),
            DashboardError::Prediction(err) => Self::Prediction(err),
            DashboardError::Storage(err) => Self::Storage(err),
            DashboardError::InvalidInput(message) => Self::InvalidInput(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::ScenarioError;

    #[test]
    fn statuses_follow_error_class() {
        let invalid = AppError::from(PredictionError::InvalidScenario(ScenarioError::ZeroTenure));
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let unavailable = AppError::from(PredictionError::ModelUnavailable(ModelError::EmptyModel));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let missing = AppError::NotFound("profile");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "profile not found");

        let no_profile = AppError::from(DashboardError::MissingProfile);
        assert_eq!(no_profile.status(), StatusCode::NOT_FOUND);

        let bad_terms = AppError::from(DashboardError::InvalidInput("tenure".to_string()));
        assert_eq!(bad_terms.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
