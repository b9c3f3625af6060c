pub mod domain;
mod normalizer;
mod parser;

pub use domain::{
    CurrencySelectionRecord, ExceptionIndicator, GeoLocation, LocType, Location, Nation,
    PublishedFare, ScopeRestriction,
};

use crate::selection::domain::{CarrierCode, LocCode, NationCode};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const CURRENCY_SELECTION_FILE: &str = "currency_selection.csv";
pub const NATIONS_FILE: &str = "nations.csv";
pub const LOCATIONS_FILE: &str = "locations.csv";
pub const PUBLISHED_FARES_FILE: &str = "published_fares.csv";

/// Read access to the rule and reference tables consulted during currency selection.
pub trait ReferenceData: Send + Sync {
    /// Records for `nation` (`None` is the blank nation) effective on `date`, in sequence order.
    fn currency_selection(
        &self,
        nation: Option<&NationCode>,
        date: NaiveDate,
    ) -> Vec<&CurrencySelectionRecord>;
    fn nation(&self, code: &NationCode, date: NaiveDate) -> Option<&Nation>;
    fn location(&self, code: &LocCode) -> Option<&Location>;
    /// Published fares between two markets in either order.
    fn fares_by_market_carrier(
        &self,
        market1: &LocCode,
        market2: &LocCode,
        carrier: &CarrierCode,
        date: NaiveDate,
    ) -> Vec<&PublishedFare>;
}

#[derive(Debug)]
pub enum TableImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidField {
        table: &'static str,
        column: &'static str,
        value: String,
    },
}

impl std::fmt::Display for TableImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableImportError::Io(err) => write!(f, "failed to read reference table: {}", err),
            TableImportError::Csv(err) => write!(f, "invalid reference table CSV data: {}", err),
            TableImportError::InvalidField {
                table,
                column,
                value,
            } => write!(f, "{table}.{column} has invalid value '{value}'"),
        }
    }
}

impl std::error::Error for TableImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableImportError::Io(err) => Some(err),
            TableImportError::Csv(err) => Some(err),
            TableImportError::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for TableImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TableImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Table set held in memory; built in code or imported from CSV.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceData {
    currency_selection: Vec<CurrencySelectionRecord>,
    nations: Vec<Nation>,
    locations: Vec<Location>,
    published_fares: Vec<PublishedFare>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import the four tables from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, TableImportError> {
        let dir = dir.as_ref();
        let tables = Self::from_readers(
            File::open(dir.join(CURRENCY_SELECTION_FILE))?,
            File::open(dir.join(NATIONS_FILE))?,
            File::open(dir.join(LOCATIONS_FILE))?,
            File::open(dir.join(PUBLISHED_FARES_FILE))?,
        )?;
        info!(
            directory = %dir.display(),
            records = tables.currency_selection.len(),
            nations = tables.nations.len(),
            locations = tables.locations.len(),
            fares = tables.published_fares.len(),
            "reference tables loaded"
        );
        Ok(tables)
    }

    pub fn from_readers<C: Read, N: Read, L: Read, F: Read>(
        currency_selection: C,
        nations: N,
        locations: L,
        published_fares: F,
    ) -> Result<Self, TableImportError> {
        let mut tables = Self::new();
        for record in parser::parse_currency_selection(currency_selection)? {
            tables.insert_record(record);
        }
        tables.nations = parser::parse_nations(nations)?;
        tables.locations = parser::parse_locations(locations)?;
        tables.published_fares = parser::parse_published_fares(published_fares)?;
        Ok(tables)
    }

    /// Records with an empty nation code are stored under the blank nation.
    pub fn insert_record(&mut self, mut record: CurrencySelectionRecord) {
        record.nation = record.nation.filter(|code| !code.is_empty());
        let position = self
            .currency_selection
            .partition_point(|existing| sort_key(existing) <= sort_key(&record));
        self.currency_selection.insert(position, record);
    }

    pub fn with_record(mut self, record: CurrencySelectionRecord) -> Self {
        self.insert_record(record);
        self
    }

    pub fn with_nation(mut self, nation: Nation) -> Self {
        self.nations.push(nation);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_published_fare(mut self, fare: PublishedFare) -> Self {
        self.published_fares.push(fare);
        self
    }

    pub fn record_count(&self) -> usize {
        self.currency_selection.len()
    }
}

fn sort_key(record: &CurrencySelectionRecord) -> (Option<&NationCode>, u32, Option<NaiveDate>) {
    (record.nation.as_ref(), record.seq_no, record.effective)
}

impl ReferenceData for InMemoryReferenceData {
    fn currency_selection(
        &self,
        nation: Option<&NationCode>,
        date: NaiveDate,
    ) -> Vec<&CurrencySelectionRecord> {
        let nation = nation.filter(|code| !code.is_empty());
        let records: Vec<_> = self
            .currency_selection
            .iter()
            .filter(|record| record.nation.as_ref() == nation && record.is_effective(date))
            .collect();
        debug!(
            nation = nation.map(NationCode::as_str).unwrap_or(""),
            count = records.len(),
            "currency selection records"
        );
        records
    }

    fn nation(&self, code: &NationCode, date: NaiveDate) -> Option<&Nation> {
        self.nations
            .iter()
            .find(|nation| nation.code == *code && nation.is_effective(date))
    }

    fn location(&self, code: &LocCode) -> Option<&Location> {
        self.locations.iter().find(|location| location.code == *code)
    }

    fn fares_by_market_carrier(
        &self,
        market1: &LocCode,
        market2: &LocCode,
        carrier: &CarrierCode,
        date: NaiveDate,
    ) -> Vec<&PublishedFare> {
        self.published_fares
            .iter()
            .filter(|fare| {
                fare.carrier == *carrier && fare.serves(market1, market2) && fare.is_effective(date)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::domain::CurrencyCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn record(nation: Option<&str>, seq_no: u32, currency: &str) -> CurrencySelectionRecord {
        CurrencySelectionRecord {
            fare_comp_prime_currency: Some(CurrencyCode::new(currency)),
            ..CurrencySelectionRecord::new(nation.map(NationCode::new), seq_no)
        }
    }

    #[test]
    fn records_are_ordered_by_sequence() {
        let tables = InMemoryReferenceData::new()
            .with_record(record(Some("BR"), 30, "EUR"))
            .with_record(record(Some("BR"), 10, "USD"))
            .with_record(record(None, 5, "GBP"))
            .with_record(record(Some("BR"), 20, "BRL"));

        let seqs: Vec<u32> = tables
            .currency_selection(Some(&NationCode::new("BR")), date(2025, 1, 1))
            .iter()
            .map(|record| record.seq_no)
            .collect();
        assert_eq!(seqs, vec![10, 20, 30]);

        let blank = tables.currency_selection(None, date(2025, 1, 1));
        assert_eq!(blank.len(), 1);
        assert_eq!(blank[0].seq_no, 5);

        let empty_code = tables.currency_selection(Some(&NationCode::new("")), date(2025, 1, 1));
        assert_eq!(empty_code.len(), 1);
    }

    #[test]
    fn empty_nation_code_is_stored_as_blank() {
        let mut empty_code = record(None, 7, "USD");
        empty_code.nation = Some(NationCode::new(""));
        let mut tables = InMemoryReferenceData::new();
        tables.insert_record(empty_code);

        let blank = tables.currency_selection(None, date(2025, 1, 1));
        assert_eq!(blank.len(), 1);
        assert_eq!(blank[0].nation, None);
        assert_eq!(
            CurrencySelectionRecord::new(Some(NationCode::new(" ")), 1).nation,
            None
        );
    }

    #[test]
    fn records_outside_effective_window_are_hidden() {
        let mut expired = record(Some("BR"), 10, "USD");
        expired.discontinue = Some(date(2024, 12, 31));
        let mut future = record(Some("BR"), 20, "BRL");
        future.effective = Some(date(2026, 1, 1));
        let tables = InMemoryReferenceData::new()
            .with_record(expired)
            .with_record(future);

        let br = NationCode::new("BR");
        assert!(tables.currency_selection(Some(&br), date(2025, 6, 1)).is_empty());
        assert_eq!(tables.currency_selection(Some(&br), date(2024, 6, 1)).len(), 1);
        assert_eq!(tables.currency_selection(Some(&br), date(2026, 6, 1)).len(), 1);
    }

    #[test]
    fn published_fares_match_either_market_order() {
        let tables = InMemoryReferenceData::new()
            .with_published_fare(PublishedFare::new("SAO", "LON", "BA", "USD"))
            .with_published_fare(PublishedFare::new("SAO", "LON", "JJ", "BRL"));

        let fares = tables.fares_by_market_carrier(
            &LocCode::new("LON"),
            &LocCode::new("SAO"),
            &CarrierCode::new("BA"),
            date(2025, 1, 1),
        );
        assert_eq!(fares.len(), 1);
        assert_eq!(fares[0].currency, CurrencyCode::new("USD"));
    }

    #[test]
    fn missing_directory_reports_io_error() {
        match InMemoryReferenceData::from_dir("/definitely/not/a/fare/table/dir") {
            Err(TableImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
