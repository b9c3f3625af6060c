use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tables::Location;

macro_rules! code_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(value.as_ref().trim().to_ascii_uppercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

code_type!(
    /// ISO currency code such as `USD` or `BRL`.
    CurrencyCode
);
code_type!(
    /// Two letter nation code. The empty code is the "blank" default nation.
    NationCode
);
code_type!(
    /// Airline designator.
    CarrierCode
);
code_type!(
    /// Passenger type code such as `ADT`.
    PaxTypeCode
);
code_type!(
    /// City or airport code.
    LocCode
);

pub const USD: &str = "USD";
pub const CAD: &str = "CAD";
pub const NUC: &str = "NUC";
pub const UNITED_STATES: &str = "US";
pub const CANADA: &str = "CA";
pub const ADULT: &str = "ADT";
pub const INDUSTRY_CARRIER: &str = "YY";

/// Passenger types priced in the cruise-line agency currency.
pub const CRUISE_PAX_TYPES: [&str; 4] = ["JCB", "PFA", "CBC", "CBI"];
/// Cruise passenger types honored on US/Canada markets.
pub const USCA_CRUISE_PAX_TYPES: [&str; 3] = ["PFA", "CBC", "CBI"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directionality {
    From,
    To,
    Both,
}

impl Directionality {
    pub const fn label(self) -> &'static str {
        match self {
            Self::From => "FROM",
            Self::To => "TO",
            Self::Both => "BOTH",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTravelType {
    #[default]
    Unknown,
    Domestic,
    International,
    Transborder,
    ForeignDomestic,
}

impl GeoTravelType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Domestic => "DOMESTIC",
            Self::International => "INTERNATIONAL",
            Self::Transborder => "TRANSBORDER",
            Self::ForeignDomestic => "FOREIGN DOMESTIC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareMarketDirection {
    #[default]
    Unknown,
    Outbound,
    Inbound,
}

impl FareMarketDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Outbound => "OUTBOUND",
            Self::Inbound => "INBOUND",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffCategory {
    #[default]
    Public,
    Private,
}

/// Candidate fare for a requested passenger type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaxTypeFare {
    pub carrier: CarrierCode,
    pub fare_class: String,
    pub market1: LocCode,
    pub market2: LocCode,
    pub currency: CurrencyCode,
    pub directionality: Directionality,
    pub amount: Decimal,
    #[serde(default)]
    pub nuc_amount: Option<Decimal>,
    #[serde(default)]
    pub fcas_pax_type: Option<PaxTypeCode>,
    #[serde(default = "default_valid")]
    pub valid: bool,
    /// Fare-by-rule fare whose amount is specified rather than calculated from a base fare.
    #[serde(default)]
    pub specified_fare_by_rule: bool,
    #[serde(default)]
    pub tariff_category: TariffCategory,
}

fn default_valid() -> bool {
    true
}

impl PaxTypeFare {
    pub fn is_industry(&self) -> bool {
        self.carrier == INDUSTRY_CARRIER
    }
}

/// Fares grouped by requested passenger type, plus the currencies chosen for them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaxTypeBucket {
    pub requested_pax_type: PaxTypeCode,
    pub actual_pax_types: Vec<PaxTypeCode>,
    pub fares: Vec<PaxTypeFare>,
    pub outbound_currency: Option<CurrencyCode>,
    pub inbound_currency: Option<CurrencyCode>,
    pub equiv_amount_override_currency: Option<CurrencyCode>,
    pub fare_quote_override_currency: Option<CurrencyCode>,
}

impl PaxTypeBucket {
    pub fn new(requested_pax_type: PaxTypeCode) -> Self {
        Self {
            actual_pax_types: vec![requested_pax_type.clone()],
            requested_pax_type,
            ..Self::default()
        }
    }

    pub fn is_cruise_agency_pax(&self) -> bool {
        CRUISE_PAX_TYPES.contains(&self.requested_pax_type.as_str())
    }

    pub fn currency_for(&self, direction: Directionality) -> Option<&CurrencyCode> {
        match direction {
            Directionality::From => self.outbound_currency.as_ref(),
            Directionality::To => self.inbound_currency.as_ref(),
            Directionality::Both => None,
        }
    }
}

/// Entry of the per-market currency cache.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FareMarketCurrencyKey {
    pub pax_type: PaxTypeCode,
    pub directionality: Directionality,
    pub currency: CurrencyCode,
}

impl FareMarketCurrencyKey {
    pub fn new(
        pax_type: PaxTypeCode,
        directionality: Directionality,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            pax_type,
            directionality,
            currency,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FareMarket {
    pub origin: Location,
    pub destination: Location,
    pub board_multi_city: LocCode,
    pub off_multi_city: LocCode,
    pub governing_carrier: CarrierCode,
    pub geo_travel_type: GeoTravelType,
    pub direction: FareMarketDirection,
    pub buckets: Vec<PaxTypeBucket>,
    pub currencies: BTreeSet<FareMarketCurrencyKey>,
    pub indirect_equiv_amount_currency: Option<CurrencyCode>,
    pub outbound_asean_currencies: Vec<CurrencyCode>,
    pub inbound_asean_currencies: Vec<CurrencyCode>,
}

impl FareMarket {
    pub fn new(origin: Location, destination: Location, governing_carrier: CarrierCode) -> Self {
        Self {
            board_multi_city: origin.city.clone(),
            off_multi_city: destination.city.clone(),
            origin,
            destination,
            governing_carrier,
            geo_travel_type: GeoTravelType::Unknown,
            direction: FareMarketDirection::Unknown,
            buckets: Vec::new(),
            currencies: BTreeSet::new(),
            indirect_equiv_amount_currency: None,
            outbound_asean_currencies: Vec::new(),
            inbound_asean_currencies: Vec::new(),
        }
    }

    /// Label used by the diagnostic fare market filter, e.g. `SAOSJP`.
    pub fn board_off_key(&self) -> String {
        format!("{}{}", self.board_multi_city, self.off_multi_city)
    }

    /// Number of distinct cached currencies for a passenger type and direction.
    pub fn currency_count(&self, pax_type: &PaxTypeCode, direction: Directionality) -> usize {
        self.currencies
            .iter()
            .filter(|key| {
                key.pax_type == *pax_type
                    && (direction == Directionality::Both || key.directionality == direction)
            })
            .map(|key| &key.currency)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn cached_currency(
        &self,
        pax_type: &PaxTypeCode,
        direction: Directionality,
    ) -> Option<&CurrencyCode> {
        self.currencies
            .iter()
            .find(|key| key.pax_type == *pax_type && key.directionality == direction)
            .map(|key| &key.currency)
    }

    pub fn total_fares(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.fares.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Itinerary {
    pub geo_travel_type: GeoTravelType,
    pub origin_nation: NationCode,
    pub one_way: bool,
    pub segment_count: usize,
    pub origination_currency: Option<CurrencyCode>,
    pub calculation_currency: Option<CurrencyCode>,
    pub text_messages: Vec<String>,
}

impl Itinerary {
    pub fn is_single_segment_one_way(&self) -> bool {
        self.one_way && self.segment_count == 1
    }

    /// Append a currency selection message once.
    pub fn add_text_message(&mut self, message: &str) {
        if !self.text_messages.iter().any(|existing| existing == message) {
            self.text_messages.push(message.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagnosticRequest {
    /// Restricts tracing to one market, given as board and off city, e.g. `SAOSJP`.
    #[serde(default)]
    pub fare_market: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub location: Location,
    pub cruise_pfa_currency: Option<CurrencyCode>,
}

/// Request-level inputs shared by every fare market of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRequest {
    pub ticketing_date: NaiveDate,
    pub agent: Agent,
    pub sale_point_override: Option<LocCode>,
    pub ticket_point_override: Option<LocCode>,
    pub alternate_currency: Option<CurrencyCode>,
    pub fare_display: bool,
    pub diagnostic: Option<DiagnosticRequest>,
}

impl PricingRequest {
    pub fn new(ticketing_date: NaiveDate, agent_location: Location) -> Self {
        Self {
            ticketing_date,
            agent: Agent {
                location: agent_location,
                cruise_pfa_currency: None,
            },
            sale_point_override: None,
            ticket_point_override: None,
            alternate_currency: None,
            fare_display: false,
            diagnostic: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Location;

    fn location(city: &str, nation: &str) -> Location {
        Location::city(city, nation)
    }

    #[test]
    fn codes_are_normalized() {
        assert_eq!(CurrencyCode::new(" brl "), "BRL");
        assert!(NationCode::new("  ").is_empty());
    }

    #[test]
    fn currency_count_is_per_pax_and_direction() {
        let mut market = FareMarket::new(
            location("SAO", "BR"),
            location("SJP", "BR"),
            CarrierCode::new("JJ"),
        );
        let adt = PaxTypeCode::new("ADT");
        for (direction, currency) in [
            (Directionality::From, "BRL"),
            (Directionality::From, "USD"),
            (Directionality::To, "BRL"),
        ] {
            market.currencies.insert(FareMarketCurrencyKey::new(
                adt.clone(),
                direction,
                CurrencyCode::new(currency),
            ));
        }

        assert_eq!(market.currency_count(&adt, Directionality::From), 2);
        assert_eq!(market.currency_count(&adt, Directionality::To), 1);
        assert_eq!(market.currency_count(&adt, Directionality::Both), 2);
        assert_eq!(
            market.currency_count(&PaxTypeCode::new("CNN"), Directionality::From),
            0
        );
        assert_eq!(market.board_off_key(), "SAOSJP");
    }

    #[test]
    fn text_messages_are_unique() {
        let mut itin = Itinerary::default();
        itin.add_text_message("FARES IN BRL");
        itin.add_text_message("FARES IN BRL");
        itin.add_text_message("SEE RULE");
        assert_eq!(itin.text_messages, vec!["FARES IN BRL", "SEE RULE"]);
    }
}
