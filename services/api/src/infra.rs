use chrono::NaiveDate;
use fare_currency::selection::{CarrierCode, CurrencyCode, NationCode, PaxTypeCode};
use fare_currency::tables::{
    CurrencySelectionRecord, ExceptionIndicator, GeoLocation, InMemoryReferenceData, LocType,
    Location, Nation, PublishedFare, ScopeRestriction, TableImportError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CSV tables from `directory`, or the built-in demo tables when none is configured.
pub(crate) fn load_tables(
    directory: Option<&Path>,
) -> Result<InMemoryReferenceData, TableImportError> {
    match directory {
        Some(directory) => InMemoryReferenceData::from_dir(directory),
        None => {
            let tables = demo_tables();
            info!(
                records = tables.record_count(),
                "no table directory configured, serving demo tables"
            );
            Ok(tables)
        }
    }
}

fn selection_record(
    nation: &str,
    seq_no: u32,
    journey: ScopeRestriction,
    prime: &str,
) -> CurrencySelectionRecord {
    let mut record = CurrencySelectionRecord::new(Some(NationCode::new(nation)), seq_no);
    record.journey_restriction = journey;
    record.gov_carrier_exception = ExceptionIndicator::No;
    record.pax_type_exception = ExceptionIndicator::No;
    record.fare_comp_prime_currency = Some(CurrencyCode::new(prime));
    record
}

/// São Paulo / London reference tables used by `demo` and by a service started without
/// `APP_TABLES_DIR`.
pub(crate) fn demo_tables() -> InMemoryReferenceData {
    let mut foreign_agents = selection_record("BR", 100, ScopeRestriction::International, "USD");
    foreign_agents.point_of_sale = Some(GeoLocation::new(LocType::Nation, "BR"));
    foreign_agents.point_of_sale_exception = ExceptionIndicator::Yes;
    foreign_agents.equiv_override_currency = Some(CurrencyCode::new("BRL"));

    let mut brazilian_agents = selection_record("BR", 200, ScopeRestriction::International, "USD");
    brazilian_agents.equiv_override_currency = Some(CurrencyCode::new("BRL"));
    brazilian_agents.text_messages = vec![
        "FARES FROM BRAZIL PUBLISHED IN USD".to_string(),
        "EQUIVALENT AMOUNT IN BRL".to_string(),
    ];

    let mut brazil_domestic = selection_record("BR", 300, ScopeRestriction::Domestic, "BRL");
    brazil_domestic.fare_component_restriction = ScopeRestriction::Domestic;

    let mut britain = selection_record("GB", 100, ScopeRestriction::International, "GBP");
    britain.gov_carrier_exception = ExceptionIndicator::Yes;
    britain.gov_carriers = vec![CarrierCode::new("XX")];

    let mut children = selection_record("GB", 150, ScopeRestriction::International, "GBP");
    children.pax_types = vec![PaxTypeCode::new("CNN")];
    children.fare_quote_override_currency = Some(CurrencyCode::new("EUR"));

    let mut thailand = selection_record("TH", 100, ScopeRestriction::International, "THB");
    thailand.asean_currencies = ["SGD", "MYR", "IDR"]
        .into_iter()
        .map(CurrencyCode::new)
        .collect();

    let mut tables = InMemoryReferenceData::new()
        .with_record(foreign_agents)
        .with_record(brazilian_agents)
        .with_record(brazil_domestic)
        .with_record(britain)
        .with_record(children)
        .with_record(thailand)
        .with_record(selection_record("", 900, ScopeRestriction::International, "USD"));

    for nation in [
        Nation::new("BR").with_prime("BRL"),
        Nation::new("GB").with_prime("GBP"),
        Nation::new("US").with_prime("USD"),
        Nation::new("CA").with_prime("CAD"),
        Nation::new("TH").with_prime("THB"),
        Nation::new("AR").with_prime("ARS").with_conversion("USD"),
    ] {
        tables = tables.with_nation(nation);
    }

    for location in [
        Location::city("SAO", "BR").in_zone("1", "13"),
        Location::airport("GRU", "SAO", "BR").in_zone("1", "13"),
        Location::city("RIO", "BR").in_zone("1", "13"),
        Location::city("BUE", "AR").in_zone("1", "13"),
        Location::city("LON", "GB").in_zone("2", "21"),
        Location::airport("LHR", "LON", "GB").in_zone("2", "21"),
        Location::city("NYC", "US").in_zone("1", "11").in_state("NY"),
        Location::city("YTO", "CA").in_zone("1", "11").in_state("ON"),
        Location::city("YVR", "CA").in_zone("1", "11").in_state("BC"),
        Location::city("BKK", "TH").in_zone("3", "32"),
    ] {
        tables = tables.with_location(location);
    }

    tables
        .with_published_fare(PublishedFare::new("SAO", "LON", "JJ", "USD"))
        .with_published_fare(PublishedFare::new("LON", "SAO", "JJ", "GBP"))
        .with_published_fare(PublishedFare::new("BKK", "LON", "TG", "THB"))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fare_currency::tables::ReferenceData;

    #[test]
    fn demo_tables_cover_the_demo_markets() {
        let tables = demo_tables();
        let date = parse_date("2025-06-01").expect("valid date");

        assert_eq!(tables.record_count(), 7);
        assert_eq!(
            tables
                .currency_selection(Some(&NationCode::new("BR")), date)
                .len(),
            3
        );
        assert_eq!(tables.currency_selection(None, date).len(), 1);
        for code in ["SAO", "LON", "YTO", "NYC"] {
            assert!(tables.location(&code.into()).is_some(), "{code} missing");
        }
    }

    #[test]
    fn missing_directory_is_reported() {
        let error = load_tables(Some(Path::new("/definitely/not/here")))
            .expect_err("missing directory");
        assert!(matches!(error, TableImportError::Io(_)));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("01/06/2025").is_err());
    }
}
