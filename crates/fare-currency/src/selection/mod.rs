//! Fare currency selection: which currency each passenger type's fares are priced in, per
//! fare market and direction.

pub mod diagnostic;
pub mod domain;
pub mod error;
pub mod fare_currency;
pub(crate) mod geo;
pub mod request;
pub mod router;
pub mod service;
pub mod validator;

#[cfg(test)]
mod tests;

use crate::tables::ReferenceData;

pub use diagnostic::DiagCollector;
pub use domain::{
    Agent, CarrierCode, CurrencyCode, DiagnosticRequest, Directionality, FareMarket,
    FareMarketCurrencyKey, FareMarketDirection, GeoTravelType, Itinerary, LocCode, NationCode,
    PaxTypeBucket, PaxTypeCode, PaxTypeFare, PricingRequest, TariffCategory,
};
pub use error::SelectionError;
pub use fare_currency::{
    add_currency_to_fare_market, determine_currencies_in_fare_market, find_matching_usd_fare,
    CurrencyScanOptions, FareCurrencySelection,
};
pub use request::{
    BucketInput, BucketSelection, CurrencySelectionRequest, CurrencySelectionResponse,
    FareMarketInput, FareMarketSelection, ItineraryInput,
};
pub use router::selection_router;
pub use service::{CurrencySelectionService, SelectionServiceError};
pub use validator::{
    AlternateValidation, CurrencySelectionValidator, PrimeValidation, RecordFailure, RecordScope,
};

/// Reference tables and request inputs shared by every step of a selection.
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    pub tables: &'a dyn ReferenceData,
    pub request: &'a PricingRequest,
}

impl<'a> SelectionContext<'a> {
    pub fn new(tables: &'a dyn ReferenceData, request: &'a PricingRequest) -> Self {
        Self { tables, request }
    }
}
