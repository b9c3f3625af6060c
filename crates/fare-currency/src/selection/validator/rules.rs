use super::super::domain::{CurrencyCode, FareMarket, GeoTravelType, LocCode, PaxTypeCode};
use super::super::geo::{is_code_in_loc, is_in_loc};
use super::super::SelectionContext;
use crate::tables::{CurrencySelectionRecord, ExceptionIndicator, GeoLocation, ScopeRestriction};

/// First record check that rejected a currency selection row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFailure {
    JourneyRestriction,
    FareComponentRestriction,
    GoverningCarrier,
    PassengerType,
    PointOfSale,
    PointOfIssue,
}

pub(crate) fn check_record(
    ctx: &SelectionContext<'_>,
    record: &CurrencySelectionRecord,
    market: &FareMarket,
    pax_type: &PaxTypeCode,
    is_international: bool,
) -> Result<(), RecordFailure> {
    let journey = if is_international {
        ScopeRestriction::International
    } else {
        ScopeRestriction::Domestic
    };
    if record.journey_restriction != journey {
        return Err(RecordFailure::JourneyRestriction);
    }

    let fare_component_ok = match record.fare_component_restriction {
        ScopeRestriction::International => market.geo_travel_type == GeoTravelType::International,
        ScopeRestriction::Domestic => matches!(
            market.geo_travel_type,
            GeoTravelType::Domestic | GeoTravelType::ForeignDomestic
        ),
        ScopeRestriction::Blank => true,
    };
    if !fare_component_ok {
        return Err(RecordFailure::FareComponentRestriction);
    }

    if !list_allows(
        record.gov_carrier_exception,
        &record.gov_carriers,
        &market.governing_carrier,
    ) {
        return Err(RecordFailure::GoverningCarrier);
    }

    if !list_allows(record.pax_type_exception, &record.pax_types, pax_type) {
        return Err(RecordFailure::PassengerType);
    }

    if !geo_allows(
        ctx,
        record.point_of_sale.as_ref(),
        record.point_of_sale_exception,
        ctx.request.sale_point_override.as_ref(),
    ) {
        return Err(RecordFailure::PointOfSale);
    }

    if !geo_allows(
        ctx,
        record.point_of_issue.as_ref(),
        record.point_of_issue_exception,
        ctx.request.ticket_point_override.as_ref(),
    ) {
        return Err(RecordFailure::PointOfIssue);
    }

    Ok(())
}

/// Exception `Y` needs a non-empty list and rejects listed codes. A blank indicator rejects
/// every code.
pub(crate) fn list_allows<T: PartialEq>(
    indicator: ExceptionIndicator,
    list: &[T],
    code: &T,
) -> bool {
    match indicator {
        ExceptionIndicator::Yes => !list.is_empty() && !list.contains(code),
        ExceptionIndicator::No => list.is_empty() || list.contains(code),
        ExceptionIndicator::Blank => false,
    }
}

fn geo_allows(
    ctx: &SelectionContext<'_>,
    geo: Option<&GeoLocation>,
    exception: ExceptionIndicator,
    override_point: Option<&LocCode>,
) -> bool {
    let Some(geo) = geo.filter(|geo| !geo.code.is_empty()) else {
        return true;
    };

    let matched = match override_point {
        Some(code) => is_code_in_loc(ctx.tables, code, geo),
        None => is_in_loc(&ctx.request.agent.location, geo),
    };

    !((matched && exception.is_yes()) || (!matched && !exception.is_yes()))
}

/// Whether an alternate currency is barred by the record's restricted currency list.
pub(crate) fn is_restricted(record: &CurrencySelectionRecord, alternate: &CurrencyCode) -> bool {
    let listed = record.restricted_currencies.contains(alternate);
    match record.restricted_currency_exception {
        ExceptionIndicator::Yes => !listed,
        ExceptionIndicator::No => listed,
        ExceptionIndicator::Blank => false,
    }
}
