//! Wire format of the currency selection endpoint and CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    CarrierCode, CurrencyCode, DiagnosticRequest, FareMarket, FareMarketDirection, GeoTravelType,
    LocCode, NationCode, PaxTypeBucket, PaxTypeCode, PaxTypeFare,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySelectionRequest {
    pub ticketing_date: NaiveDate,
    pub agent_location: LocCode,
    #[serde(default)]
    pub cruise_pfa_currency: Option<CurrencyCode>,
    #[serde(default)]
    pub sale_point_override: Option<LocCode>,
    #[serde(default)]
    pub ticket_point_override: Option<LocCode>,
    #[serde(default)]
    pub alternate_currency: Option<CurrencyCode>,
    #[serde(default)]
    pub fare_display: bool,
    #[serde(default)]
    pub diagnostic: Option<DiagnosticRequest>,
    pub itinerary: ItineraryInput,
    pub fare_markets: Vec<FareMarketInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryInput {
    pub geo_travel_type: GeoTravelType,
    /// Defaults to the nation of the first fare market's origin.
    #[serde(default)]
    pub origin_nation: Option<NationCode>,
    #[serde(default)]
    pub one_way: bool,
    #[serde(default = "default_segment_count")]
    pub segment_count: usize,
    #[serde(default)]
    pub origination_currency: Option<CurrencyCode>,
    #[serde(default)]
    pub calculation_currency: Option<CurrencyCode>,
}

fn default_segment_count() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareMarketInput {
    pub origin: LocCode,
    pub destination: LocCode,
    #[serde(default)]
    pub board_multi_city: Option<LocCode>,
    #[serde(default)]
    pub off_multi_city: Option<LocCode>,
    pub governing_carrier: CarrierCode,
    pub geo_travel_type: GeoTravelType,
    #[serde(default)]
    pub direction: FareMarketDirection,
    pub buckets: Vec<BucketInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketInput {
    pub requested_pax_type: PaxTypeCode,
    /// Defaults to the requested type alone.
    #[serde(default)]
    pub actual_pax_types: Vec<PaxTypeCode>,
    #[serde(default)]
    pub fares: Vec<PaxTypeFare>,
}

impl BucketInput {
    pub(crate) fn into_bucket(self) -> PaxTypeBucket {
        let mut bucket = PaxTypeBucket::new(self.requested_pax_type);
        if !self.actual_pax_types.is_empty() {
            bucket.actual_pax_types = self.actual_pax_types;
        }
        bucket.fares = self.fares;
        bucket
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySelectionResponse {
    /// True when every fare market resolved its currencies.
    pub selected: bool,
    pub fare_markets: Vec<FareMarketSelection>,
    pub text_messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareMarketSelection {
    pub market: String,
    pub selected: bool,
    pub indirect_equiv_amount_currency: Option<CurrencyCode>,
    pub outbound_asean_currencies: Vec<CurrencyCode>,
    pub inbound_asean_currencies: Vec<CurrencyCode>,
    pub buckets: Vec<BucketSelection>,
}

impl FareMarketSelection {
    pub(crate) fn from_market(market: &FareMarket, selected: bool) -> Self {
        Self {
            market: market.board_off_key(),
            selected,
            indirect_equiv_amount_currency: market.indirect_equiv_amount_currency.clone(),
            outbound_asean_currencies: market.outbound_asean_currencies.clone(),
            inbound_asean_currencies: market.inbound_asean_currencies.clone(),
            buckets: market.buckets.iter().map(BucketSelection::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSelection {
    pub pax_type: PaxTypeCode,
    pub outbound_currency: Option<CurrencyCode>,
    pub inbound_currency: Option<CurrencyCode>,
    pub equiv_amount_override_currency: Option<CurrencyCode>,
    pub fare_quote_override_currency: Option<CurrencyCode>,
}

impl From<&PaxTypeBucket> for BucketSelection {
    fn from(bucket: &PaxTypeBucket) -> Self {
        Self {
            pax_type: bucket.requested_pax_type.clone(),
            outbound_currency: bucket.outbound_currency.clone(),
            inbound_currency: bucket.inbound_currency.clone(),
            equiv_amount_override_currency: bucket.equiv_amount_override_currency.clone(),
            fare_quote_override_currency: bucket.fare_quote_override_currency.clone(),
        }
    }
}
