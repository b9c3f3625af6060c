use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::selection::domain::{CarrierCode, CurrencyCode, LocCode, NationCode, PaxTypeCode};

/// Yes/No/blank flag that flips an allow list into an except list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceptionIndicator {
    Yes,
    No,
    #[default]
    Blank,
}

impl ExceptionIndicator {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "Y" => Some(Self::Yes),
            "N" => Some(Self::No),
            "" => Some(Self::Blank),
            _ => None,
        }
    }

    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }

    pub const fn code(self) -> char {
        match self {
            Self::Yes => 'Y',
            Self::No => 'N',
            Self::Blank => ' ',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeRestriction {
    International,
    Domestic,
    #[default]
    Blank,
}

impl ScopeRestriction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "I" => Some(Self::International),
            "D" => Some(Self::Domestic),
            "" => Some(Self::Blank),
            _ => None,
        }
    }

    pub const fn code(self) -> char {
        match self {
            Self::International => 'I',
            Self::Domestic => 'D',
            Self::Blank => ' ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocType {
    Area,
    SubArea,
    Nation,
    State,
    City,
}

impl LocType {
    /// Single letter location type used by the rule tables.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::Area),
            "*" | "S" => Some(Self::SubArea),
            "N" => Some(Self::Nation),
            "P" => Some(Self::State),
            "C" => Some(Self::City),
            _ => None,
        }
    }

    pub const fn code(self) -> char {
        match self {
            Self::Area => 'A',
            Self::SubArea => '*',
            Self::Nation => 'N',
            Self::State => 'P',
            Self::City => 'C',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub loc_type: LocType,
    pub code: String,
}

impl GeoLocation {
    pub fn new(loc_type: LocType, code: impl AsRef<str>) -> Self {
        Self {
            loc_type,
            code: code.as_ref().trim().to_ascii_uppercase(),
        }
    }
}

/// One row of the currency selection rule table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrencySelectionRecord {
    /// `None` is the blank nation whose rows apply when no nation row matches.
    pub nation: Option<NationCode>,
    pub seq_no: u32,
    pub effective: Option<NaiveDate>,
    pub discontinue: Option<NaiveDate>,
    pub journey_restriction: ScopeRestriction,
    pub fare_component_restriction: ScopeRestriction,
    pub point_of_sale: Option<GeoLocation>,
    pub point_of_sale_exception: ExceptionIndicator,
    pub point_of_issue: Option<GeoLocation>,
    pub point_of_issue_exception: ExceptionIndicator,
    pub fare_comp_prime_currency: Option<CurrencyCode>,
    pub equiv_override_currency: Option<CurrencyCode>,
    pub fare_quote_override_currency: Option<CurrencyCode>,
    pub gov_carrier_exception: ExceptionIndicator,
    pub gov_carriers: Vec<CarrierCode>,
    pub pax_type_exception: ExceptionIndicator,
    pub pax_types: Vec<PaxTypeCode>,
    pub restricted_currency_exception: ExceptionIndicator,
    pub restricted_currencies: Vec<CurrencyCode>,
    pub asean_currencies: Vec<CurrencyCode>,
    pub text_messages: Vec<String>,
}

impl CurrencySelectionRecord {
    pub fn new(nation: Option<NationCode>, seq_no: u32) -> Self {
        Self {
            nation: nation.filter(|code| !code.is_empty()),
            seq_no,
            ..Self::default()
        }
    }

    pub fn is_effective(&self, date: NaiveDate) -> bool {
        is_effective(self.effective, self.discontinue, date)
    }
}

/// Nation table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nation {
    pub code: NationCode,
    pub prime_currency: Option<CurrencyCode>,
    /// Pricing currency.
    pub alternate_currency: Option<CurrencyCode>,
    /// Bank rate currency used for international conversion.
    pub conversion_currency: Option<CurrencyCode>,
    pub effective: Option<NaiveDate>,
    pub discontinue: Option<NaiveDate>,
}

impl Nation {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self {
            code: NationCode::new(code),
            prime_currency: None,
            alternate_currency: None,
            conversion_currency: None,
            effective: None,
            discontinue: None,
        }
    }

    pub fn with_prime(mut self, currency: &str) -> Self {
        self.prime_currency = Some(CurrencyCode::new(currency));
        self
    }

    pub fn with_alternate(mut self, currency: &str) -> Self {
        self.alternate_currency = Some(CurrencyCode::new(currency));
        self
    }

    pub fn with_conversion(mut self, currency: &str) -> Self {
        self.conversion_currency = Some(CurrencyCode::new(currency));
        self
    }

    pub fn is_effective(&self, date: NaiveDate) -> bool {
        is_effective(self.effective, self.discontinue, date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub code: LocCode,
    pub city: LocCode,
    pub nation: NationCode,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sub_area: String,
    #[serde(default)]
    pub area: String,
}

impl Location {
    /// City whose airport code equals the city code.
    pub fn city(code: impl AsRef<str>, nation: impl AsRef<str>) -> Self {
        let code = LocCode::new(code);
        Self {
            city: code.clone(),
            code,
            nation: NationCode::new(nation),
            state: None,
            sub_area: String::new(),
            area: String::new(),
        }
    }

    pub fn airport(code: impl AsRef<str>, city: impl AsRef<str>, nation: impl AsRef<str>) -> Self {
        Self {
            city: LocCode::new(city),
            ..Self::city(code, nation)
        }
    }

    pub fn in_zone(mut self, area: &str, sub_area: &str) -> Self {
        self.area = area.trim().to_string();
        self.sub_area = sub_area.trim().to_string();
        self
    }

    pub fn in_state(mut self, state: &str) -> Self {
        self.state = Some(state.trim().to_ascii_uppercase());
        self
    }
}

/// Published fare row; only the currency matters for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFare {
    pub market1: LocCode,
    pub market2: LocCode,
    pub carrier: CarrierCode,
    pub currency: CurrencyCode,
    pub effective: Option<NaiveDate>,
    pub discontinue: Option<NaiveDate>,
}

impl PublishedFare {
    pub fn new(market1: &str, market2: &str, carrier: &str, currency: &str) -> Self {
        Self {
            market1: LocCode::new(market1),
            market2: LocCode::new(market2),
            carrier: CarrierCode::new(carrier),
            currency: CurrencyCode::new(currency),
            effective: None,
            discontinue: None,
        }
    }

    pub fn serves(&self, market1: &LocCode, market2: &LocCode) -> bool {
        (self.market1 == *market1 && self.market2 == *market2)
            || (self.market1 == *market2 && self.market2 == *market1)
    }

    pub fn is_effective(&self, date: NaiveDate) -> bool {
        is_effective(self.effective, self.discontinue, date)
    }
}

pub(crate) fn is_effective(
    effective: Option<NaiveDate>,
    discontinue: Option<NaiveDate>,
    date: NaiveDate,
) -> bool {
    effective.map_or(true, |start| start <= date) && discontinue.map_or(true, |end| date <= end)
}
