use crate::config::ConfigError;
use crate::selection::SelectionServiceError;
use crate::tables::TableImportError;
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
    Tables(TableImportError),
    Selection(SelectionServiceError),
    Request(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Tables(err) => write!(f, "reference table error: {}", err),
            AppError::Selection(err) => write!(f, "currency selection error: {}", err),
            AppError::Request(err) => write!(f, "invalid request payload: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Tables(err) => Some(err),
            AppError::Selection(err) => Some(err),
            AppError::Request(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Tables(_) | AppError::Request(_) => StatusCode::BAD_REQUEST,
            AppError::Selection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
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

impl From<TableImportError> for AppError {
    fn from(value: TableImportError) -> Self {
        Self::Tables(value)
    }
}

impl From<SelectionServiceError> for AppError {
    fn from(value: SelectionServiceError) -> Self {
        Self::Selection(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Request(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{CurrencyCode, SelectionError};

    #[test]
    fn responses_carry_status_by_error_kind() {
        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken"));
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let payload = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json");
        assert_eq!(AppError::from(payload).into_response().status(), StatusCode::BAD_REQUEST);

        let rejected = AppError::from(SelectionServiceError::from(
            SelectionError::FareCurrencyOverrideNotValid {
                currency: CurrencyCode::new("JPY"),
                market: "SAOLON".to_string(),
            },
        ));
        assert_eq!(rejected.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
