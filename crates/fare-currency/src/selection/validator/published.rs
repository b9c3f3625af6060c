use tracing::debug;

use super::super::domain::{CarrierCode, CurrencyCode, FareMarket, LocCode};
use super::super::SelectionContext;

/// Record scope handed to the published fare lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    Domestic,
    International,
}

impl RecordScope {
    pub fn for_journey(is_international: bool) -> Self {
        if is_international {
            Self::International
        } else {
            Self::Domestic
        }
    }
}

/// Whether `currency` is published for the market's governing carrier.
///
/// The city pair is tried first, then the board/off multi-city pair when both differ
/// from the cities, then each multi-city paired with the opposite city.
pub(crate) fn is_currency_published(
    ctx: &SelectionContext<'_>,
    scope: RecordScope,
    market: &FareMarket,
    currency: &CurrencyCode,
) -> bool {
    let origin = &market.origin.city;
    let destination = &market.destination.city;
    let board = &market.board_multi_city;
    let off = &market.off_multi_city;
    let carrier = &market.governing_carrier;

    let diff_board = !board.is_empty() && board != origin;
    let diff_off = !off.is_empty() && off != destination;

    let mut pairs: Vec<(&LocCode, &LocCode)> = vec![(origin, destination)];
    if diff_board && diff_off {
        pairs.push((board, off));
    }
    if diff_board {
        pairs.push((board, destination));
    }
    if diff_off {
        pairs.push((origin, off));
    }

    pairs
        .into_iter()
        .any(|(market1, market2)| published_in(ctx, scope, market1, market2, carrier, currency))
}

fn published_in(
    ctx: &SelectionContext<'_>,
    scope: RecordScope,
    market1: &LocCode,
    market2: &LocCode,
    carrier: &CarrierCode,
    currency: &CurrencyCode,
) -> bool {
    let published = ctx
        .tables
        .fares_by_market_carrier(market1, market2, carrier, ctx.request.ticketing_date)
        .iter()
        .any(|fare| fare.currency == *currency);
    if published {
        debug!(
            %currency,
            %market1,
            %market2,
            %carrier,
            ?scope,
            "currency is published"
        );
    }
    published
}
