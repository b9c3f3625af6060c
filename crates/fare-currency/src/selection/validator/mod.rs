mod published;
mod rules;

pub use published::RecordScope;
pub use rules::RecordFailure;

use tracing::{debug, warn};

use super::diagnostic::{DiagCollector, ValidatorNote};
use super::domain::{CurrencyCode, FareMarket, FareMarketDirection, Itinerary, NationCode};
use super::SelectionContext;

/// Result of walking the currency selection records of one nation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimeValidation {
    pub currency: Option<CurrencyCode>,
    pub fare_quote_override: Option<CurrencyCode>,
    /// Prime currency of the first record, used later by the nation fallback chain.
    pub first_currency: Option<CurrencyCode>,
    pub pax_type_search_failed: bool,
    pub nation_not_found: bool,
}

impl PrimeValidation {
    pub fn is_valid(&self) -> bool {
        self.currency.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlternateValidation {
    pub currency: Option<CurrencyCode>,
    pub valid_override: bool,
    pub nation_not_found: bool,
}

/// Stateless evaluator of currency selection records against one fare market.
#[derive(Clone, Copy)]
pub struct CurrencySelectionValidator<'a> {
    ctx: SelectionContext<'a>,
}

impl<'a> CurrencySelectionValidator<'a> {
    pub fn new(ctx: SelectionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Find the prime currency for a bucket from the records of `nation` (`None` for blank).
    ///
    /// The winning record also sets the equivalent-amount override currency on the market
    /// and the bucket, and appends its text messages to the itinerary.
    pub fn validate_prime(
        &self,
        market: &mut FareMarket,
        bucket_index: usize,
        itin: &mut Itinerary,
        nation: Option<&NationCode>,
        is_international: bool,
        diag: &mut DiagCollector,
    ) -> PrimeValidation {
        let records = self
            .ctx
            .tables
            .currency_selection(nation, self.ctx.request.ticketing_date);
        diag.validator_start(nation, records.len());

        let mut outcome = PrimeValidation::default();
        if records.is_empty() {
            outcome.nation_not_found = true;
            diag.validator_end(false);
            return outcome;
        }

        outcome.first_currency = records[0].fare_comp_prime_currency.clone();

        let Some(pax_type) = market
            .buckets
            .get(bucket_index)
            .map(|bucket| bucket.requested_pax_type.clone())
        else {
            diag.validator_end(false);
            return outcome;
        };

        for record in records {
            diag.record(record);

            if let Err(failure) =
                rules::check_record(&self.ctx, record, market, &pax_type, is_international)
            {
                if failure == RecordFailure::PassengerType {
                    outcome.pax_type_search_failed = true;
                }
                debug!(seq_no = record.seq_no, ?failure, "currency selection record rejected");
                diag.record_failure(failure);
                continue;
            }

            let Some(prime) = record.fare_comp_prime_currency.clone() else {
                diag.note(ValidatorNote::PrimeCurrencyEmpty);
                continue;
            };

            debug!(seq_no = record.seq_no, %prime, "currency selection record applied");
            if let Some(equiv) = &record.equiv_override_currency {
                market.indirect_equiv_amount_currency = Some(equiv.clone());
                if let Some(bucket) = market.buckets.get_mut(bucket_index) {
                    bucket.equiv_amount_override_currency = Some(equiv.clone());
                }
            }
            if record.fare_quote_override_currency.is_some() {
                outcome.fare_quote_override = record.fare_quote_override_currency.clone();
            }
            diag.text_messages(&record.text_messages);
            for message in &record.text_messages {
                itin.add_text_message(message);
            }

            outcome.currency = Some(prime);
            outcome.pax_type_search_failed = false;
            outcome.nation_not_found = false;
            diag.note(ValidatorNote::RecordPassed);
            break;
        }

        diag.validator_end(outcome.is_valid());
        outcome
    }

    /// Check that an alternate (override) currency may be used for the market.
    ///
    /// Pricing requests need the currency to be published in the market. Fare display
    /// requests check the restricted currency list of every record instead.
    pub fn validate_alternate(
        &self,
        market: &FareMarket,
        nation: Option<&NationCode>,
        alternate: &CurrencyCode,
        is_international: bool,
        diag: &mut DiagCollector,
    ) -> AlternateValidation {
        diag.validator_start_alternate(nation, alternate);
        let mut outcome = AlternateValidation::default();

        if !self.ctx.request.fare_display {
            let scope = RecordScope::for_journey(is_international);
            if !self.is_currency_published(scope, market, alternate) {
                warn!(
                    %alternate,
                    market = %market.board_off_key(),
                    "alternate currency not published"
                );
                diag.note(ValidatorNote::AlternateNotPublished);
                diag.validator_end(false);
                return outcome;
            }
        } else {
            let records = self
                .ctx
                .tables
                .currency_selection(nation, self.ctx.request.ticketing_date);
            diag.alternate_records(records.len());

            if records.is_empty() {
                outcome.nation_not_found = true;
            }
            for record in records {
                diag.alternate_record(record);
                if rules::is_restricted(record, alternate) {
                    warn!(%alternate, seq_no = record.seq_no, "alternate currency is restricted");
                    diag.note(ValidatorNote::RestrictedFailed);
                    diag.validator_end(false);
                    return outcome;
                }
            }
        }

        outcome.valid_override = true;
        outcome.currency = Some(alternate.clone());
        diag.validator_end(true);
        outcome
    }

    pub fn is_currency_published(
        &self,
        scope: RecordScope,
        market: &FareMarket,
        currency: &CurrencyCode,
    ) -> bool {
        published::is_currency_published(&self.ctx, scope, market, currency)
    }

    /// Gather the ASEAN currencies of `nation` onto the market, by market direction.
    pub fn collect_asean_currencies(&self, nation: &NationCode, market: &mut FareMarket) {
        let records = self
            .ctx
            .tables
            .currency_selection(Some(nation), self.ctx.request.ticketing_date);

        let outbound = matches!(
            market.direction,
            FareMarketDirection::Outbound | FareMarketDirection::Unknown
        );
        let inbound = matches!(
            market.direction,
            FareMarketDirection::Inbound | FareMarketDirection::Unknown
        );

        for record in records {
            for currency in &record.asean_currencies {
                if outbound && !market.outbound_asean_currencies.contains(currency) {
                    market.outbound_asean_currencies.push(currency.clone());
                }
                if inbound && !market.inbound_asean_currencies.contains(currency) {
                    market.inbound_asean_currencies.push(currency.clone());
                }
            }
        }
    }
}
