use super::domain::{
    CurrencySelectionRecord, ExceptionIndicator, GeoLocation, LocType, Location, Nation,
    PublishedFare, ScopeRestriction,
};
use super::normalizer::{normalize_code, split_codes, split_messages};
use super::TableImportError;
use crate::selection::domain::{CarrierCode, CurrencyCode, LocCode, NationCode, PaxTypeCode};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;

const CURRENCY_SELECTION: &str = "currency_selection";
const NATIONS: &str = "nations";
const LOCATIONS: &str = "locations";
const PUBLISHED_FARES: &str = "published_fares";

pub(crate) fn parse_currency_selection<R: Read>(
    reader: R,
) -> Result<Vec<CurrencySelectionRecord>, TableImportError> {
    read_rows::<_, CurrencySelectionRow>(reader)?
        .into_iter()
        .map(CurrencySelectionRow::into_record)
        .collect()
}

pub(crate) fn parse_nations<R: Read>(reader: R) -> Result<Vec<Nation>, TableImportError> {
    read_rows::<_, NationRow>(reader)?
        .into_iter()
        .map(|row| {
            Ok(Nation {
                code: NationCode::new(&row.code),
                prime_currency: currency(row.prime_currency.as_deref()),
                alternate_currency: currency(row.alternate_currency.as_deref()),
                conversion_currency: currency(row.conversion_currency.as_deref()),
                effective: parse_date(NATIONS, "effective", row.effective.as_deref())?,
                discontinue: parse_date(NATIONS, "discontinue", row.discontinue.as_deref())?,
            })
        })
        .collect()
}

pub(crate) fn parse_locations<R: Read>(reader: R) -> Result<Vec<Location>, TableImportError> {
    read_rows::<_, LocationRow>(reader)?
        .into_iter()
        .map(|row| {
            if row.nation.trim().is_empty() {
                return Err(invalid(LOCATIONS, "nation", &row.nation));
            }
            let code = LocCode::new(&row.code);
            Ok(Location {
                city: row
                    .city
                    .as_deref()
                    .map(LocCode::new)
                    .unwrap_or_else(|| code.clone()),
                code,
                nation: NationCode::new(&row.nation),
                state: row.state.as_deref().map(normalize_code),
                sub_area: row.sub_area.unwrap_or_default(),
                area: row.area.unwrap_or_default(),
            })
        })
        .collect()
}

pub(crate) fn parse_published_fares<R: Read>(
    reader: R,
) -> Result<Vec<PublishedFare>, TableImportError> {
    read_rows::<_, PublishedFareRow>(reader)?
        .into_iter()
        .map(|row| {
            if row.currency.trim().is_empty() {
                return Err(invalid(PUBLISHED_FARES, "currency", &row.currency));
            }
            Ok(PublishedFare {
                market1: LocCode::new(&row.market1),
                market2: LocCode::new(&row.market2),
                carrier: CarrierCode::new(&row.carrier),
                currency: CurrencyCode::new(&row.currency),
                effective: parse_date(PUBLISHED_FARES, "effective", row.effective.as_deref())?,
                discontinue: parse_date(
                    PUBLISHED_FARES,
                    "discontinue",
                    row.discontinue.as_deref(),
                )?,
            })
        })
        .collect()
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, TableImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<T>() {
        rows.push(record?);
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CurrencySelectionRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    nation: Option<String>,
    seq_no: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    effective: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    discontinue: Option<String>,
    #[serde(default)]
    journey_restriction: String,
    #[serde(default)]
    fare_component_restriction: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pos_loc_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pos_loc: Option<String>,
    #[serde(default)]
    pos_exception: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    poi_loc_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    poi_loc: Option<String>,
    #[serde(default)]
    poi_exception: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    prime_currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    equiv_override_currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fare_quote_override_currency: Option<String>,
    #[serde(default)]
    gov_carrier_exception: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gov_carriers: Option<String>,
    #[serde(default)]
    pax_type_exception: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pax_types: Option<String>,
    #[serde(default)]
    restricted_currency_exception: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    restricted_currencies: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    asean_currencies: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    text_messages: Option<String>,
}

impl CurrencySelectionRow {
    fn into_record(self) -> Result<CurrencySelectionRecord, TableImportError> {
        let seq_no = self
            .seq_no
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(CURRENCY_SELECTION, "seq_no", &self.seq_no))?;

        Ok(CurrencySelectionRecord {
            nation: self.nation.as_deref().map(NationCode::new),
            seq_no,
            effective: parse_date(CURRENCY_SELECTION, "effective", self.effective.as_deref())?,
            discontinue: parse_date(
                CURRENCY_SELECTION,
                "discontinue",
                self.discontinue.as_deref(),
            )?,
            journey_restriction: scope("journey_restriction", &self.journey_restriction)?,
            fare_component_restriction: scope(
                "fare_component_restriction",
                &self.fare_component_restriction,
            )?,
            point_of_sale: geo_location(
                "pos_loc_type",
                self.pos_loc_type.as_deref(),
                self.pos_loc.as_deref(),
            )?,
            point_of_sale_exception: indicator("pos_exception", &self.pos_exception)?,
            point_of_issue: geo_location(
                "poi_loc_type",
                self.poi_loc_type.as_deref(),
                self.poi_loc.as_deref(),
            )?,
            point_of_issue_exception: indicator("poi_exception", &self.poi_exception)?,
            fare_comp_prime_currency: currency(self.prime_currency.as_deref()),
            equiv_override_currency: currency(self.equiv_override_currency.as_deref()),
            fare_quote_override_currency: currency(self.fare_quote_override_currency.as_deref()),
            gov_carrier_exception: indicator("gov_carrier_exception", &self.gov_carrier_exception)?,
            gov_carriers: split_codes(self.gov_carriers.as_deref())
                .into_iter()
                .map(CarrierCode::from)
                .collect(),
            pax_type_exception: indicator("pax_type_exception", &self.pax_type_exception)?,
            pax_types: split_codes(self.pax_types.as_deref())
                .into_iter()
                .map(PaxTypeCode::from)
                .collect(),
            restricted_currency_exception: indicator(
                "restricted_currency_exception",
                &self.restricted_currency_exception,
            )?,
            restricted_currencies: split_codes(self.restricted_currencies.as_deref())
                .into_iter()
                .map(CurrencyCode::from)
                .collect(),
            asean_currencies: split_codes(self.asean_currencies.as_deref())
                .into_iter()
                .map(CurrencyCode::from)
                .collect(),
            text_messages: split_messages(self.text_messages.as_deref()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct NationRow {
    code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    prime_currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    alternate_currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    conversion_currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    effective: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    discontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    nation: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sub_area: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    area: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublishedFareRow {
    market1: String,
    market2: String,
    carrier: String,
    currency: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    effective: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    discontinue: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn invalid(table: &'static str, column: &'static str, value: &str) -> TableImportError {
    TableImportError::InvalidField {
        table,
        column,
        value: value.to_string(),
    }
}

fn currency(value: Option<&str>) -> Option<CurrencyCode> {
    value
        .map(CurrencyCode::new)
        .filter(|currency| !currency.is_empty())
}

fn parse_date(
    table: &'static str,
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, TableImportError> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(table, column, raw)),
    }
}

fn scope(column: &'static str, value: &str) -> Result<ScopeRestriction, TableImportError> {
    ScopeRestriction::parse(value).ok_or_else(|| invalid(CURRENCY_SELECTION, column, value))
}

fn indicator(column: &'static str, value: &str) -> Result<ExceptionIndicator, TableImportError> {
    ExceptionIndicator::parse(value).ok_or_else(|| invalid(CURRENCY_SELECTION, column, value))
}

fn geo_location(
    column: &'static str,
    loc_type: Option<&str>,
    code: Option<&str>,
) -> Result<Option<GeoLocation>, TableImportError> {
    match (loc_type, code) {
        (None, None) => Ok(None),
        (Some(raw_type), Some(code)) => LocType::parse(raw_type)
            .map(|loc_type| Some(GeoLocation::new(loc_type, code)))
            .ok_or_else(|| invalid(CURRENCY_SELECTION, column, raw_type)),
        (Some(raw_type), None) => Err(invalid(CURRENCY_SELECTION, column, raw_type)),
        (None, Some(code)) => Err(invalid(CURRENCY_SELECTION, column, code)),
    }
}
