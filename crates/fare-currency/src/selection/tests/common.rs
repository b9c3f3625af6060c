use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::selection::domain::{
    CarrierCode, CurrencyCode, Directionality, FareMarket, GeoTravelType, Itinerary, LocCode,
    NationCode, PaxTypeBucket, PaxTypeCode, PaxTypeFare, PricingRequest, TariffCategory,
};
use crate::selection::request::{
    BucketInput, CurrencySelectionRequest, FareMarketInput, ItineraryInput,
};
use crate::tables::{
    CurrencySelectionRecord, ExceptionIndicator, InMemoryReferenceData, Location, Nation,
    PublishedFare, ScopeRestriction,
};

pub(super) fn ticketing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn sao() -> Location {
    Location::city("SAO", "BR").in_zone("1", "13")
}

pub(super) fn rio() -> Location {
    Location::city("RIO", "BR").in_zone("1", "13")
}

pub(super) fn lon() -> Location {
    Location::city("LON", "GB").in_zone("2", "21")
}

pub(super) fn bkk() -> Location {
    Location::city("BKK", "TH").in_zone("3", "32")
}

pub(super) fn nyc() -> Location {
    Location::city("NYC", "US").in_zone("1", "11").in_state("NY")
}

pub(super) fn yto() -> Location {
    Location::city("YTO", "CA").in_zone("1", "11").in_state("ON")
}

pub(super) fn yvr() -> Location {
    Location::city("YVR", "CA").in_zone("1", "11").in_state("BC")
}

/// Currency selection record that passes carrier and passenger checks for anyone.
pub(super) fn record(
    nation: Option<&str>,
    seq_no: u32,
    journey: ScopeRestriction,
    prime: &str,
) -> CurrencySelectionRecord {
    let mut record = CurrencySelectionRecord::new(nation.map(NationCode::new), seq_no);
    record.journey_restriction = journey;
    record.gov_carrier_exception = ExceptionIndicator::No;
    record.pax_type_exception = ExceptionIndicator::No;
    if !prime.is_empty() {
        record.fare_comp_prime_currency = Some(CurrencyCode::new(prime));
    }
    record
}

pub(super) fn nations() -> Vec<Nation> {
    vec![
        Nation::new("BR").with_prime("BRL"),
        Nation::new("GB").with_prime("GBP"),
        Nation::new("TH").with_prime("THB"),
        Nation::new("US").with_prime("USD"),
        Nation::new("CA").with_prime("CAD"),
    ]
}

/// Locations and nations only; tests add the records they need.
pub(super) fn base_tables() -> InMemoryReferenceData {
    let mut tables = InMemoryReferenceData::new();
    for location in [sao(), rio(), lon(), bkk(), nyc(), yto(), yvr()] {
        tables = tables.with_location(location);
    }
    tables = tables.with_location(Location::airport("GRU", "SAO", "BR").in_zone("1", "13"));
    for nation in nations() {
        tables = tables.with_nation(nation);
    }
    tables
}

/// Brazil prices international fares in USD, Britain in GBP; the London market publishes
/// GBP and USD for JJ.
pub(super) fn international_tables() -> InMemoryReferenceData {
    let mut brazil = record(Some("BR"), 100, ScopeRestriction::International, "USD");
    brazil.equiv_override_currency = Some(CurrencyCode::new("BRL"));
    brazil.text_messages = vec!["FARES IN USD FOR TRAVEL FROM BRAZIL".to_string()];

    base_tables()
        .with_record(brazil)
        .with_record(record(Some("GB"), 100, ScopeRestriction::International, "GBP"))
        .with_published_fare(PublishedFare::new("SAO", "LON", "JJ", "USD"))
        .with_published_fare(PublishedFare::new("LON", "SAO", "JJ", "GBP"))
}

pub(super) fn fare(currency: &str, directionality: Directionality, amount: Decimal) -> PaxTypeFare {
    PaxTypeFare {
        carrier: CarrierCode::new("JJ"),
        fare_class: "Y".to_string(),
        market1: LocCode::new("SAO"),
        market2: LocCode::new("LON"),
        currency: CurrencyCode::new(currency),
        directionality,
        amount,
        nuc_amount: None,
        fcas_pax_type: None,
        valid: true,
        specified_fare_by_rule: false,
        tariff_category: TariffCategory::Public,
    }
}

pub(super) fn bucket(pax_type: &str, fares: Vec<PaxTypeFare>) -> PaxTypeBucket {
    let mut bucket = PaxTypeBucket::new(PaxTypeCode::new(pax_type));
    bucket.fares = fares;
    bucket
}

pub(super) fn market(
    origin: Location,
    destination: Location,
    geo_travel_type: GeoTravelType,
    buckets: Vec<PaxTypeBucket>,
) -> FareMarket {
    let mut market = FareMarket::new(origin, destination, CarrierCode::new("JJ"));
    market.geo_travel_type = geo_travel_type;
    market.buckets = buckets;
    market
}

/// SAO-LON adult fares in three currencies.
pub(super) fn sao_lon_market() -> FareMarket {
    market(
        sao(),
        lon(),
        GeoTravelType::International,
        vec![bucket(
            "ADT",
            vec![
                fare("BRL", Directionality::From, dec!(4200)),
                fare("USD", Directionality::Both, dec!(850)),
                fare("GBP", Directionality::To, dec!(640)),
            ],
        )],
    )
}

pub(super) fn itinerary(geo_travel_type: GeoTravelType, origin_nation: &str) -> Itinerary {
    Itinerary {
        geo_travel_type,
        origin_nation: NationCode::new(origin_nation),
        segment_count: 2,
        ..Itinerary::default()
    }
}

pub(super) fn pricing_request() -> PricingRequest {
    PricingRequest::new(ticketing_date(), sao())
}

pub(super) fn selection_request() -> CurrencySelectionRequest {
    CurrencySelectionRequest {
        ticketing_date: ticketing_date(),
        agent_location: LocCode::new("SAO"),
        cruise_pfa_currency: None,
        sale_point_override: None,
        ticket_point_override: None,
        alternate_currency: None,
        fare_display: false,
        diagnostic: None,
        itinerary: ItineraryInput {
            geo_travel_type: GeoTravelType::International,
            origin_nation: None,
            one_way: false,
            segment_count: 2,
            origination_currency: None,
            calculation_currency: None,
        },
        fare_markets: vec![FareMarketInput {
            origin: LocCode::new("SAO"),
            destination: LocCode::new("LON"),
            board_multi_city: None,
            off_multi_city: None,
            governing_carrier: CarrierCode::new("JJ"),
            geo_travel_type: GeoTravelType::International,
            direction: Default::default(),
            buckets: vec![BucketInput {
                requested_pax_type: PaxTypeCode::new("ADT"),
                actual_pax_types: Vec::new(),
                fares: sao_lon_market()
                    .buckets
                    .into_iter()
                    .flat_map(|bucket| bucket.fares)
                    .collect(),
            }],
        }],
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
