use super::domain::{CurrencyCode, LocCode};

/// Failure raised while selecting fare currencies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("fare currency override {currency} is not valid for market {market}")]
    FareCurrencyOverrideNotValid {
        currency: CurrencyCode,
        market: String,
    },
    #[error("unknown location {0}")]
    UnknownLocation(LocCode),
}
