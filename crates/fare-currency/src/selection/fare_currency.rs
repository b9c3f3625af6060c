use tracing::{debug, info, warn};

use super::diagnostic::{DiagCollector, NationStep, SelectFunction};
use super::domain::{
    CurrencyCode, Directionality, FareMarket, FareMarketCurrencyKey, FareMarketDirection,
    GeoTravelType, Itinerary, NationCode, PaxTypeBucket, PaxTypeFare, TariffCategory,
    ADULT, CAD, CANADA, UNITED_STATES, USCA_CRUISE_PAX_TYPES, USD,
};
use super::error::SelectionError;
use super::geo::is_canada;
use super::validator::{CurrencySelectionValidator, RecordScope};
use super::SelectionContext;

/// Filters applied while building the fare market currency cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrencyScanOptions {
    pub skip_industry_fares: bool,
    /// Only honored together with `skip_industry_fares`.
    pub private_fares_requested: bool,
}

/// Build the per passenger type, per direction currency cache of `market`.
pub fn determine_currencies_in_fare_market(
    market: &mut FareMarket,
    cruise_pfa_currency: Option<&CurrencyCode>,
    options: CurrencyScanOptions,
) {
    let mut keys = Vec::new();

    for bucket in &mut market.buckets {
        let pax_type = bucket.requested_pax_type.clone();

        if let Some(cruise) = cruise_pfa_currency.filter(|_| bucket.is_cruise_agency_pax()) {
            keys.push(FareMarketCurrencyKey::new(
                pax_type.clone(),
                Directionality::From,
                cruise.clone(),
            ));
            keys.push(FareMarketCurrencyKey::new(
                pax_type,
                Directionality::To,
                cruise.clone(),
            ));
            bucket.outbound_currency = Some(cruise.clone());
            bucket.inbound_currency = Some(cruise.clone());
            continue;
        }

        for fare in &bucket.fares {
            if !fare.valid || (options.skip_industry_fares && fare.is_industry()) {
                continue;
            }

            let mut contributes = !fare.specified_fare_by_rule && fare_applies_to(bucket, fare);
            if options.skip_industry_fares
                && options.private_fares_requested
                && fare.tariff_category != TariffCategory::Private
            {
                contributes = false;
            }
            if !contributes {
                continue;
            }

            match fare.directionality {
                Directionality::Both => {
                    keys.push(FareMarketCurrencyKey::new(
                        pax_type.clone(),
                        Directionality::From,
                        fare.currency.clone(),
                    ));
                    keys.push(FareMarketCurrencyKey::new(
                        pax_type.clone(),
                        Directionality::To,
                        fare.currency.clone(),
                    ));
                }
                direction => keys.push(FareMarketCurrencyKey::new(
                    pax_type.clone(),
                    direction,
                    fare.currency.clone(),
                )),
            }
        }
    }

    market.currencies.extend(keys);
}

fn fare_applies_to(bucket: &PaxTypeBucket, fare: &PaxTypeFare) -> bool {
    match &fare.fcas_pax_type {
        Some(fcas) => bucket.actual_pax_types.contains(fcas),
        None => {
            bucket.requested_pax_type == ADULT
                || bucket.actual_pax_types.iter().any(|pax| *pax == ADULT)
        }
    }
}

/// Record `currency` on the bucket for `direction`; transborder and `Both` set both sides.
pub fn add_currency_to_fare_market(
    direction: Directionality,
    bucket: &mut PaxTypeBucket,
    currency: CurrencyCode,
    transborder: bool,
) {
    match (transborder, direction) {
        (true, _) | (false, Directionality::Both) => {
            bucket.outbound_currency = Some(currency.clone());
            bucket.inbound_currency = Some(currency);
        }
        (false, Directionality::From) => bucket.outbound_currency = Some(currency),
        (false, Directionality::To) => bucket.inbound_currency = Some(currency),
    }
}

/// Whether any cached currency of the market is USD.
pub fn find_matching_usd_fare(market: &FareMarket) -> bool {
    market.currencies.iter().any(|key| key.currency == USD)
}

/// Selects the currency of every bucket of a fare market for both directions.
pub struct FareCurrencySelection<'a> {
    ctx: SelectionContext<'a>,
    validator: CurrencySelectionValidator<'a>,
    diag: DiagCollector,
}

impl<'a> FareCurrencySelection<'a> {
    pub fn new(ctx: SelectionContext<'a>) -> Self {
        Self {
            ctx,
            validator: CurrencySelectionValidator::new(ctx),
            diag: DiagCollector::new(ctx.request.diagnostic.as_ref()),
        }
    }

    #[cfg(test)]
    pub(crate) fn diagnostic(&self) -> &DiagCollector {
        &self.diag
    }

    pub fn into_diagnostic(self) -> Option<String> {
        self.diag.into_text()
    }

    /// Route a market to the selection its itinerary calls for.
    ///
    /// Returns whether every bucket found its currencies. US domestic markets need no
    /// selection and always succeed.
    pub fn select_currency(
        &mut self,
        market: &mut FareMarket,
        itin: &mut Itinerary,
    ) -> Result<bool, SelectionError> {
        let itin_type = itin.geo_travel_type;

        if let Some(alternate) = self.ctx.request.alternate_currency.clone() {
            if itin_type != GeoTravelType::Transborder {
                info!(%alternate, market = %market.board_off_key(), "alternate currency selection");
                return self.select_alternate_currency(market, itin, &alternate);
            }
        }

        let origin_nation = itin.origin_nation.clone();
        match itin_type {
            GeoTravelType::Domestic if origin_nation == CANADA => {
                info!(market = %market.board_off_key(), "canadian domestic currency selection");
                self.select_usca_currency(market, itin, &origin_nation);
                Ok(true)
            }
            GeoTravelType::Transborder => {
                info!(market = %market.board_off_key(), "transborder currency selection");
                self.select_usca_currency(market, itin, &origin_nation);
                Ok(true)
            }
            GeoTravelType::International | GeoTravelType::ForeignDomestic => {
                info!(market = %market.board_off_key(), "prime currency selection");
                Ok(self.select_prime_currency(market, itin))
            }
            GeoTravelType::Domestic | GeoTravelType::Unknown => Ok(true),
        }
    }

    /// Prime currency selection for international and foreign domestic itineraries.
    pub fn select_prime_currency(
        &mut self,
        market: &mut FareMarket,
        itin: &mut Itinerary,
    ) -> bool {
        let itin_type = itin.geo_travel_type;
        let is_international = itin_type == GeoTravelType::International;
        let cruise = self.ctx.request.agent.cruise_pfa_currency.clone();

        determine_currencies_in_fare_market(
            market,
            cruise.as_ref(),
            CurrencyScanOptions::default(),
        );
        self.diag.begin(SelectFunction::Prime, market, itin);

        let nations = [
            (Directionality::From, market.origin.nation.clone()),
            (Directionality::To, market.destination.nation.clone()),
        ];
        let mut all_resolved = true;

        for index in 0..market.buckets.len() {
            let pax_type = market.buckets[index].requested_pax_type.clone();
            self.diag.bucket(&pax_type, cruise.as_ref());

            if cruise.is_some() && market.buckets[index].is_cruise_agency_pax() {
                self.diag.bucket_result(&market.buckets[index]);
                continue;
            }

            let mut found_outbound = false;
            let mut found_inbound = false;

            for (direction, nation) in &nations {
                let direction = *direction;
                self.diag.nation_code(nation);
                let count = market.currency_count(&pax_type, direction);
                self.diag.unique_currencies(count);

                let mut validated = None;
                if count > 1
                    && matches!(
                        itin_type,
                        GeoTravelType::ForeignDomestic | GeoTravelType::International
                    )
                {
                    validated = self.validate_prime_with_fallback(
                        market,
                        index,
                        itin,
                        nation,
                        direction,
                        is_international,
                    );
                    if itin_type == GeoTravelType::ForeignDomestic && index > 0 {
                        let agrees = validated.as_ref().is_some_and(|currency| {
                            self.is_currency_same_as_previous(direction, currency, &market.buckets)
                        });
                        if !agrees {
                            validated = None;
                        }
                    }
                }

                let found = if let Some(currency) = validated {
                    debug!(%pax_type, ?direction, %currency, "validated currency");
                    add_currency_to_fare_market(
                        direction,
                        &mut market.buckets[index],
                        currency,
                        false,
                    );
                    true
                } else if count == 1 {
                    match market.cached_currency(&pax_type, direction).cloned() {
                        Some(currency) => {
                            add_currency_to_fare_market(
                                direction,
                                &mut market.buckets[index],
                                currency,
                                false,
                            );
                            true
                        }
                        None => false,
                    }
                } else {
                    let matching = self
                        .find_matching_pax_type_fare(market, direction, nation, is_international)
                        .map(|fare| (fare.directionality, fare.currency.clone()));
                    match matching {
                        Some((fare_direction, currency)) => {
                            add_currency_to_fare_market(
                                fare_direction,
                                &mut market.buckets[index],
                                currency,
                                false,
                            );
                            true
                        }
                        None => false,
                    }
                };
                if found {
                    self.diag.bucket_result(&market.buckets[index]);
                }

                match direction {
                    Directionality::From => found_outbound |= found,
                    Directionality::To => found_inbound |= found,
                    Directionality::Both => {}
                }

                self.diag.found(found_outbound, found_inbound);
                self.diag
                    .nuc_rates(&market.buckets[index], itin, found_outbound, found_inbound);

                if found_outbound && found_inbound {
                    break;
                }
                if itin.is_single_segment_one_way() {
                    found_inbound = found_outbound;
                    break;
                }
            }

            if !(found_outbound && found_inbound) {
                warn!(
                    %pax_type,
                    market = %market.board_off_key(),
                    "currency not resolved for both directions"
                );
                all_resolved = false;
            }
        }

        if is_international {
            let nation = match market.direction {
                FareMarketDirection::Outbound | FareMarketDirection::Unknown => {
                    market.origin.nation.clone()
                }
                FareMarketDirection::Inbound => market.destination.nation.clone(),
            };
            if !nation.is_empty() {
                self.validator.collect_asean_currencies(&nation, market);
                self.diag.asean(market);
            }
        }

        self.diag.end(SelectFunction::Prime, Some(all_resolved));
        all_resolved
    }

    fn validate_prime_with_fallback(
        &mut self,
        market: &mut FareMarket,
        index: usize,
        itin: &mut Itinerary,
        nation: &NationCode,
        direction: Directionality,
        is_international: bool,
    ) -> Option<CurrencyCode> {
        let mut outcome = self.validator.validate_prime(
            market,
            index,
            itin,
            Some(nation),
            is_international,
            &mut self.diag,
        );
        let mut first_currency = outcome.first_currency.clone();

        if outcome.pax_type_search_failed || outcome.nation_not_found {
            let retry = self.validator.validate_prime(
                market,
                index,
                itin,
                None,
                is_international,
                &mut self.diag,
            );
            if !retry.nation_not_found {
                first_currency = retry.first_currency.clone();
            }
            outcome = retry;
        }

        if let Some(currency) = outcome.currency {
            if let Some(fare_quote) = outcome.fare_quote_override {
                market.buckets[index].fare_quote_override_currency = Some(fare_quote);
            }
            return Some(currency);
        }

        self.nation_validations(
            market,
            direction,
            nation,
            first_currency.as_ref(),
            is_international,
        )
    }

    /// Alternate currency selection. An alternate currency the market does not allow is an error.
    pub fn select_alternate_currency(
        &mut self,
        market: &mut FareMarket,
        itin: &Itinerary,
        alternate: &CurrencyCode,
    ) -> Result<bool, SelectionError> {
        self.diag.begin(SelectFunction::Alternate, market, itin);
        let is_international = itin.geo_travel_type == GeoTravelType::International;

        let nations = [
            (Directionality::From, market.origin.nation.clone()),
            (Directionality::To, market.destination.nation.clone()),
        ];
        let mut all_resolved = true;

        for index in 0..market.buckets.len() {
            let pax_type = market.buckets[index].requested_pax_type.clone();
            self.diag.bucket(&pax_type, None);
            let mut found_outbound = false;
            let mut found_inbound = false;

            for (direction, nation) in &nations {
                let direction = *direction;
                let mut outcome = self.validator.validate_alternate(
                    market,
                    Some(nation),
                    alternate,
                    is_international,
                    &mut self.diag,
                );
                if outcome.nation_not_found {
                    outcome = self.validator.validate_alternate(
                        market,
                        None,
                        alternate,
                        is_international,
                        &mut self.diag,
                    );
                }

                let currency = match outcome.currency {
                    Some(currency) if outcome.valid_override => currency,
                    _ => {
                        self.diag.end(SelectFunction::Alternate, Some(false));
                        return Err(SelectionError::FareCurrencyOverrideNotValid {
                            currency: alternate.clone(),
                            market: market.board_off_key(),
                        });
                    }
                };

                let agrees = index == 0
                    || self.is_currency_same_as_previous(direction, &currency, &market.buckets);

                let found = if agrees {
                    add_currency_to_fare_market(
                        direction,
                        &mut market.buckets[index],
                        alternate.clone(),
                        false,
                    );
                    true
                } else {
                    let matching = self
                        .find_matching_pax_type_fare(market, direction, nation, is_international)
                        .map(|fare| fare.currency.clone());
                    match matching {
                        Some(currency) => {
                            add_currency_to_fare_market(
                                direction,
                                &mut market.buckets[index],
                                currency,
                                false,
                            );
                            true
                        }
                        None => false,
                    }
                };
                if found {
                    self.diag.bucket_result(&market.buckets[index]);
                }

                match direction {
                    Directionality::From => found_outbound |= found,
                    Directionality::To => found_inbound |= found,
                    Directionality::Both => {}
                }

                self.diag.found(found_outbound, found_inbound);
                self.diag
                    .nuc_rates(&market.buckets[index], itin, found_outbound, found_inbound);

                if found_outbound && found_inbound {
                    break;
                }
            }

            if !(found_outbound && found_inbound) {
                all_resolved = false;
            }
        }

        self.diag.end(SelectFunction::Alternate, Some(all_resolved));
        Ok(all_resolved)
    }

    /// US/Canada selection: local currency of the origin for transborder markets, CAD
    /// inside Canada. Cruise agency passengers keep the agency currency.
    pub fn select_usca_currency(
        &mut self,
        market: &mut FareMarket,
        itin: &Itinerary,
        origin_nation: &NationCode,
    ) {
        self.diag.begin(SelectFunction::Usca, market, itin);

        let origin_currency = if *origin_nation == UNITED_STATES {
            Some(CurrencyCode::new(USD))
        } else if *origin_nation == CANADA {
            Some(CurrencyCode::new(CAD))
        } else {
            None
        };
        let transborder = market.geo_travel_type == GeoTravelType::Transborder;
        let within_canada = is_canada(&market.origin) && is_canada(&market.destination);
        let cruise = self.ctx.request.agent.cruise_pfa_currency.clone();

        for index in 0..market.buckets.len() {
            let pax_type = market.buckets[index].requested_pax_type.clone();
            self.diag.bucket(&pax_type, cruise.as_ref());

            if let Some(cruise) = cruise
                .as_ref()
                .filter(|_| USCA_CRUISE_PAX_TYPES.contains(&pax_type.as_str()))
            {
                let bucket = &mut market.buckets[index];
                bucket.outbound_currency = Some(cruise.clone());
                bucket.inbound_currency = Some(cruise.clone());
                market.currencies.insert(FareMarketCurrencyKey::new(
                    pax_type.clone(),
                    Directionality::From,
                    cruise.clone(),
                ));
                market.currencies.insert(FareMarketCurrencyKey::new(
                    pax_type.clone(),
                    Directionality::To,
                    cruise.clone(),
                ));
                self.diag.bucket_result(&market.buckets[index]);
                continue;
            }

            let mut decided = None;
            for fare in market.buckets[index].fares.iter().filter(|fare| fare.valid) {
                self.diag.fare(&pax_type, fare);
                self.diag.nation_code(origin_nation);
                self.diag.unique_currencies(market.currency_count(&pax_type, Directionality::Both));
                if fare.specified_fare_by_rule {
                    continue;
                }
                if transborder {
                    decided = Some((fare.directionality, origin_currency.clone()));
                    break;
                }
                if within_canada {
                    decided = Some((fare.directionality, Some(CurrencyCode::new(CAD))));
                    break;
                }
            }

            if let Some((direction, Some(currency))) = decided {
                debug!(%pax_type, %currency, "us/canada currency");
                add_currency_to_fare_market(direction, &mut market.buckets[index], currency, true);
                self.diag.bucket_result(&market.buckets[index]);
            }
        }

        self.diag.end(SelectFunction::Usca, None);
    }

    /// Fallback chain once no currency selection record applies.
    pub fn nation_validations(
        &mut self,
        market: &FareMarket,
        direction: Directionality,
        nation_code: &NationCode,
        first_currency: Option<&CurrencyCode>,
        is_international: bool,
    ) -> Option<CurrencyCode> {
        self.diag.nation_enter(first_currency);

        let Some(nation) = self.ctx.tables.nation(nation_code, self.ctx.request.ticketing_date)
        else {
            self.diag.nation_step(NationStep::NotFound);
            return None;
        };
        self.diag.nation_record(nation);

        if is_international {
            if let Some(conversion) = &nation.conversion_currency {
                self.diag.nation_step(NationStep::Conversion);
                return Some(conversion.clone());
            }
            self.diag.nation_step(NationStep::ConversionNoMatch);
        }

        if let Some(alternate) = &nation.alternate_currency {
            self.diag.nation_step(NationStep::Alternate);
            return Some(alternate.clone());
        }

        if let Some(prime) = &nation.prime_currency {
            self.diag.nation_step(NationStep::Prime);
            return Some(prime.clone());
        }

        if find_matching_usd_fare(market) {
            self.diag.nation_step(NationStep::Usd);
            return Some(CurrencyCode::new(USD));
        }

        self.find_matching_pax_type_fare(market, direction, nation_code, is_international)?;

        let first = first_currency?;
        let scope = RecordScope::for_journey(is_international);
        if self.validator.is_currency_published(scope, market, first) {
            self.diag.nation_step(NationStep::FirstCurrency);
            return Some(first.clone());
        }

        self.diag.nation_step(NationStep::Exhausted);
        None
    }

    /// First valid, non specified fare of the market priced in the nation currency that
    /// travels in `direction` or both ways.
    pub fn find_matching_pax_type_fare<'m>(
        &self,
        market: &'m FareMarket,
        direction: Directionality,
        nation: &NationCode,
        is_international: bool,
    ) -> Option<&'m PaxTypeFare> {
        let currency = self.nation_currency(nation, is_international)?;

        market
            .buckets
            .iter()
            .flat_map(|bucket| bucket.fares.iter())
            .filter(|fare| fare.valid && !fare.specified_fare_by_rule)
            .find(|fare| {
                fare.currency == currency
                    && (fare.directionality == Directionality::Both
                        || fare.directionality == direction)
            })
    }

    /// Currency fares of `nation` are expected in: conversion currency for international
    /// journeys, else prime, else alternate.
    pub fn nation_currency(
        &self,
        nation: &NationCode,
        is_international: bool,
    ) -> Option<CurrencyCode> {
        let nation = self.ctx.tables.nation(nation, self.ctx.request.ticketing_date)?;

        let conversion = nation
            .conversion_currency
            .as_ref()
            .filter(|_| is_international);

        conversion
            .or(nation.prime_currency.as_ref())
            .or(nation.alternate_currency.as_ref())
            .cloned()
    }

    /// Buckets after the first must agree with the first bucket's currency.
    pub fn is_currency_same_as_previous(
        &mut self,
        direction: Directionality,
        currency: &CurrencyCode,
        buckets: &[PaxTypeBucket],
    ) -> bool {
        let Some(first) = buckets.first() else {
            return true;
        };

        match direction {
            Directionality::From | Directionality::To => {
                if first.currency_for(direction) == Some(currency) {
                    true
                } else {
                    self.diag.currency_differs(direction);
                    false
                }
            }
            Directionality::Both => true,
        }
    }
}

