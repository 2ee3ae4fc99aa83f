use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::inspection::DeficiencyImportError;
use crate::workflows::relay::RelayError;
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
    Import(DeficiencyImportError),
    Relay(RelayError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Relay(err) => write!(f, "relay error: {}", err),
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
            AppError::Import(err) => Some(err),
            AppError::Relay(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Relay(RelayError::UnknownWorkflow(_)) => StatusCode::NOT_FOUND,
            AppError::Relay(RelayError::Http(_)) => StatusCode::BAD_GATEWAY,
            AppError::Relay(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

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

impl From<DeficiencyImportError> for AppError {
    fn from(value: DeficiencyImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RelayError> for AppError {
    fn from(value: RelayError) -> Self {
        Self::Relay(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_errors_map_to_gateway_statuses() {
        let unknown = AppError::from(RelayError::UnknownWorkflow("notify".to_string()));
        assert_eq!(unknown.into_response().status(), StatusCode::NOT_FOUND);

        let missing = AppError::from(RelayError::MissingSecret);
        assert_eq!(missing.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn import_errors_are_client_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err = AppError::from(DeficiencyImportError::from(io));
        assert!(err.to_string().starts_with("import error: failed to read deficiency export"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
