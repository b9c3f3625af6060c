use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Agent, FareMarket, Itinerary, LocCode, PricingRequest};
use super::error::SelectionError;
use super::fare_currency::FareCurrencySelection;
use super::request::{
    CurrencySelectionRequest, CurrencySelectionResponse, FareMarketInput, FareMarketSelection,
};
use super::SelectionContext;
use crate::tables::{Location, ReferenceData};

/// Service running currency selection for every fare market of a request.
pub struct CurrencySelectionService<R> {
    tables: Arc<R>,
}

impl<R> CurrencySelectionService<R>
where
    R: ReferenceData + 'static,
{
    pub fn new(tables: Arc<R>) -> Self {
        Self { tables }
    }

    /// Select currencies for each fare market in request order.
    pub fn select(
        &self,
        request: CurrencySelectionRequest,
    ) -> Result<CurrencySelectionResponse, SelectionServiceError> {
        if request.fare_markets.is_empty() {
            return Err(SelectionServiceError::InvalidRequest(
                "at least one fare market is required".to_string(),
            ));
        }

        let tables: &dyn ReferenceData = self.tables.as_ref();
        let agent_location = self.resolve(&request.agent_location)?.clone();

        let pricing = PricingRequest {
            ticketing_date: request.ticketing_date,
            agent: Agent {
                location: agent_location,
                cruise_pfa_currency: request.cruise_pfa_currency,
            },
            sale_point_override: request.sale_point_override,
            ticket_point_override: request.ticket_point_override,
            alternate_currency: request.alternate_currency,
            fare_display: request.fare_display,
            diagnostic: request.diagnostic,
        };

        let mut markets = request
            .fare_markets
            .into_iter()
            .map(|input| self.build_market(input))
            .collect::<Result<Vec<_>, _>>()?;

        let input = request.itinerary;
        let origin_nation = input
            .origin_nation
            .or_else(|| markets.first().map(|market| market.origin.nation.clone()))
            .unwrap_or_default();
        let mut itin = Itinerary {
            geo_travel_type: input.geo_travel_type,
            origin_nation,
            one_way: input.one_way,
            segment_count: input.segment_count,
            origination_currency: input.origination_currency,
            calculation_currency: input.calculation_currency,
            text_messages: Vec::new(),
        };

        let mut selection = FareCurrencySelection::new(SelectionContext::new(tables, &pricing));
        let mut results = Vec::with_capacity(markets.len());
        for market in &mut markets {
            let selected = selection.select_currency(market, &mut itin)?;
            if !selected {
                warn!(market = %market.board_off_key(), "fare market currency not selected");
            }
            results.push(FareMarketSelection::from_market(market, selected));
        }

        let selected = results.iter().all(|market| market.selected);
        info!(
            markets = results.len(),
            selected,
            geo_travel_type = itin.geo_travel_type.label(),
            "currency selection completed"
        );

        Ok(CurrencySelectionResponse {
            selected,
            fare_markets: results,
            text_messages: itin.text_messages,
            diagnostic: selection.into_diagnostic(),
        })
    }

    fn build_market(&self, input: FareMarketInput) -> Result<FareMarket, SelectionServiceError> {
        if input.buckets.is_empty() {
            return Err(SelectionServiceError::InvalidRequest(format!(
                "fare market {}{} has no passenger types",
                input.origin, input.destination
            )));
        }

        let origin = self.resolve(&input.origin)?.clone();
        let destination = self.resolve(&input.destination)?.clone();

        let mut market = FareMarket::new(origin, destination, input.governing_carrier);
        if let Some(board) = input.board_multi_city {
            market.board_multi_city = board;
        }
        if let Some(off) = input.off_multi_city {
            market.off_multi_city = off;
        }
        market.geo_travel_type = input.geo_travel_type;
        market.direction = input.direction;
        market.buckets = input
            .buckets
            .into_iter()
            .map(|bucket| bucket.into_bucket())
            .collect();
        Ok(market)
    }

    fn resolve(&self, code: &LocCode) -> Result<&Location, SelectionError> {
        self.tables
            .location(code)
            .ok_or_else(|| SelectionError::UnknownLocation(code.clone()))
    }
}

/// Error raised by the currency selection service.
#[derive(Debug, thiserror::Error)]
pub enum SelectionServiceError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("invalid currency selection request: {0}")]
    InvalidRequest(String),
}
