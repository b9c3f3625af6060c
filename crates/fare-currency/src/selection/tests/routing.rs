use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;
use tower::ServiceExt;

use super::common::*;

use crate::selection::domain::{CurrencyCode, DiagnosticRequest, LocCode};
use crate::selection::request::CurrencySelectionRequest;
use crate::selection::{selection_router, CurrencySelectionService, SelectionServiceError};
use crate::tables::InMemoryReferenceData;

fn service() -> Arc<CurrencySelectionService<InMemoryReferenceData>> {
    Arc::new(CurrencySelectionService::new(Arc::new(
        international_tables(),
    )))
}

async fn post(request: &CurrencySelectionRequest) -> (StatusCode, Value) {
    let response = selection_router(service())
        .oneshot(
            axum::http::Request::post("/api/v1/currency/selection")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(request).expect("serialize request"),
                ))
                .expect("request"),
        )
        .await
        .expect("route executes");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[test]
fn service_reports_currencies_and_messages() {
    let response = service()
        .select(selection_request())
        .expect("selection succeeds");

    assert!(response.selected);
    assert_eq!(response.fare_markets.len(), 1);
    let market = &response.fare_markets[0];
    assert_eq!(market.market, "SAOLON");
    assert_eq!(market.indirect_equiv_amount_currency, Some(CurrencyCode::new("BRL")));
    assert_eq!(market.buckets[0].outbound_currency, Some(CurrencyCode::new("USD")));
    assert_eq!(market.buckets[0].inbound_currency, Some(CurrencyCode::new("GBP")));
    assert_eq!(
        response.text_messages,
        vec!["FARES IN USD FOR TRAVEL FROM BRAZIL".to_string()]
    );
    assert_eq!(response.diagnostic, None);
}

#[test]
fn service_rejects_unknown_locations() {
    let mut request = selection_request();
    request.fare_markets[0].destination = LocCode::new("XXX");

    match service().select(request) {
        Err(SelectionServiceError::Selection(error)) => {
            assert!(error.to_string().contains("XXX"));
        }
        other => panic!("expected unknown location, got {other:?}"),
    }
}

#[test]
fn service_returns_diagnostic_when_requested() {
    let mut request = selection_request();
    request.diagnostic = Some(DiagnosticRequest::default());

    let response = service().select(request).expect("selection succeeds");

    let text = response.diagnostic.expect("diagnostic text");
    assert!(text.contains("START DIAG 212"));
    assert!(text.contains("END DIAG 212"));
}

#[tokio::test]
async fn handler_returns_selection() {
    let response = crate::selection::router::select_handler::<InMemoryReferenceData>(
        State(service()),
        axum::Json(selection_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("selected"), Some(&Value::Bool(true)));
    assert!(payload.get("diagnostic").is_none());
}

#[tokio::test]
async fn route_rejects_invalid_override() {
    let mut request = selection_request();
    request.alternate_currency = Some(CurrencyCode::new("EUR"));

    let (status, payload) = post(&request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        payload.get("code").and_then(Value::as_str),
        Some("FARE_CURRENCY_OVERRIDE_NOT_VALID")
    );
}

#[tokio::test]
async fn route_rejects_requests_without_markets() {
    let mut request = selection_request();
    request.fare_markets.clear();

    let (status, payload) = post(&request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("fare market"));
}

#[tokio::test]
async fn route_accepts_valid_payloads() {
    let (status, payload) = post(&selection_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payload["fare_markets"][0]["buckets"][0]["inbound_currency"],
        Value::String("GBP".to_string())
    );
}
