use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::error::SelectionError;
use super::request::CurrencySelectionRequest;
use super::service::{CurrencySelectionService, SelectionServiceError};
use crate::tables::ReferenceData;

/// Router builder exposing the currency selection endpoint.
pub fn selection_router<R>(service: Arc<CurrencySelectionService<R>>) -> Router
where
    R: ReferenceData + 'static,
{
    Router::new()
        .route("/api/v1/currency/selection", post(select_handler::<R>))
        .with_state(service)
}

pub(crate) async fn select_handler<R>(
    State(service): State<Arc<CurrencySelectionService<R>>>,
    axum::Json(request): axum::Json<CurrencySelectionRequest>,
) -> Response
where
    R: ReferenceData + 'static,
{
    match service.select(request) {
        Ok(selection) => (StatusCode::OK, axum::Json(selection)).into_response(),
        Err(
            error @ (SelectionServiceError::InvalidRequest(_)
            | SelectionServiceError::Selection(SelectionError::UnknownLocation(_))),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SelectionServiceError::Selection(
            error @ SelectionError::FareCurrencyOverrideNotValid { .. },
        )) => {
            let payload = json!({
                "error": error.to_string(),
                "code": "FARE_CURRENCY_OVERRIDE_NOT_VALID",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
