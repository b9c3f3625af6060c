use rust_decimal_macros::dec;

use super::common::*;

use crate::selection::domain::{CurrencyCode, DiagnosticRequest, Directionality, GeoTravelType};
use crate::selection::error::SelectionError;
use crate::selection::fare_currency::FareCurrencySelection;
use crate::selection::SelectionContext;
use crate::tables::{ExceptionIndicator, ScopeRestriction};

fn gbp() -> CurrencyCode {
    CurrencyCode::new("GBP")
}

#[test]
fn published_alternate_prices_both_directions() {
    let tables = international_tables();
    let request = pricing_request();
    let mut selection = FareCurrencySelection::new(SelectionContext::new(&tables, &request));
    let mut market = sao_lon_market();
    let itin = itinerary(GeoTravelType::International, "BR");

    let selected = selection
        .select_alternate_currency(&mut market, &itin, &gbp())
        .expect("alternate accepted");

    assert!(selected);
    assert_eq!(market.buckets[0].outbound_currency, Some(gbp()));
    assert_eq!(market.buckets[0].inbound_currency, Some(gbp()));
}

#[test]
fn unpublished_alternate_is_rejected() {
    let tables = international_tables();
    let mut request = pricing_request();
    request.diagnostic = Some(DiagnosticRequest::default());
    let mut selection = FareCurrencySelection::new(SelectionContext::new(&tables, &request));
    let mut market = sao_lon_market();
    let itin = itinerary(GeoTravelType::International, "BR");

    let error = selection
        .select_alternate_currency(&mut market, &itin, &CurrencyCode::new("EUR"))
        .expect_err("EUR is not published");

    match error {
        SelectionError::FareCurrencyOverrideNotValid { currency, market } => {
            assert_eq!(currency, "EUR");
            assert_eq!(market, "SAOLON");
        }
        other => panic!("expected override error, got {other:?}"),
    }
    let text = selection.into_diagnostic().expect("diagnostic text");
    assert!(text.contains("ALTERNATE CURRENCY IS NOT PUBLISHED"));
    assert!(text.contains("SELECT-ALTERNATE-CURRENCY RETURN: FALSE"));
}

#[test]
fn fare_display_alternate_respects_restricted_list() {
    let mut brazil = record(Some("BR"), 10, ScopeRestriction::International, "USD");
    brazil.restricted_currency_exception = ExceptionIndicator::Yes;
    brazil.restricted_currencies = vec![CurrencyCode::new("USD"), CurrencyCode::new("BRL")];
    let tables = base_tables().with_record(brazil);
    let mut request = pricing_request();
    request.fare_display = true;
    let itin = itinerary(GeoTravelType::International, "BR");

    let mut selection = FareCurrencySelection::new(SelectionContext::new(&tables, &request));
    let mut market = sao_lon_market();
    let result = selection.select_alternate_currency(&mut market, &itin, &gbp());
    assert!(matches!(
        result,
        Err(SelectionError::FareCurrencyOverrideNotValid { .. })
    ));

    let mut selection = FareCurrencySelection::new(SelectionContext::new(&tables, &request));
    let mut market = sao_lon_market();
    let result = selection.select_alternate_currency(&mut market, &itin, &CurrencyCode::new("BRL"));
    assert_eq!(result, Ok(true));
    assert_eq!(market.buckets[0].outbound_currency, Some(CurrencyCode::new("BRL")));
}

#[test]
fn alternate_requests_are_routed_to_alternate_selection() {
    let tables = international_tables();
    let mut request = pricing_request();
    request.alternate_currency = Some(gbp());
    let mut selection = FareCurrencySelection::new(SelectionContext::new(&tables, &request));
    let mut market = sao_lon_market();
    market.buckets.push(bucket(
        "CNN",
        vec![fare("USD", Directionality::Both, dec!(640))],
    ));
    let mut itin = itinerary(GeoTravelType::International, "BR");

    assert_eq!(selection.select_currency(&mut market, &mut itin), Ok(true));
    for bucket in &market.buckets {
        assert_eq!(bucket.outbound_currency, Some(gbp()));
        assert_eq!(bucket.inbound_currency, Some(gbp()));
    }
}

#[test]
fn transborder_ignores_alternate_currency() {
    let tables = base_tables();
    let mut request = pricing_request();
    request.alternate_currency = Some(gbp());
    let mut selection = FareCurrencySelection::new(SelectionContext::new(&tables, &request));
    let mut market = market(
        nyc(),
        yto(),
        GeoTravelType::Transborder,
        vec![bucket("ADT", vec![fare("USD", Directionality::Both, dec!(320))])],
    );
    let mut itin = itinerary(GeoTravelType::Transborder, "US");

    assert_eq!(selection.select_currency(&mut market, &mut itin), Ok(true));
    assert_eq!(
        market.buckets[0].outbound_currency,
        Some(CurrencyCode::new("USD"))
    );
}
