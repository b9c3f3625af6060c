use crate::infra::{demo_tables, load_tables};
use chrono::{Local, NaiveDate};
use clap::Args;
use fare_currency::config::AppConfig;
use fare_currency::error::AppError;
use fare_currency::selection::{
    BucketInput, CarrierCode, CurrencyCode, CurrencySelectionRequest, CurrencySelectionResponse,
    CurrencySelectionService, DiagnosticRequest, Directionality, FareMarketDirection,
    FareMarketInput, GeoTravelType, ItineraryInput, LocCode, PaxTypeCode, PaxTypeFare,
    TariffCategory,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SelectArgs {
    /// JSON file holding a currency selection request
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Directory of CSV tables (defaults to APP_TABLES_DIR, then the demo tables)
    #[arg(long)]
    pub(crate) tables: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Ticketing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) ticketing_date: Option<NaiveDate>,
    /// Print the diagnostic 212 trace of every scenario.
    #[arg(long)]
    pub(crate) diagnostic: bool,
}

pub(crate) fn run_select(args: SelectArgs) -> Result<(), AppError> {
    let SelectArgs { request, tables } = args;

    let directory = match tables {
        Some(directory) => Some(directory),
        None => AppConfig::load()?.tables.directory,
    };
    let tables = load_tables(directory.as_deref())?;

    let raw = std::fs::read_to_string(&request)?;
    let request: CurrencySelectionRequest = serde_json::from_str(&raw)?;

    let service = CurrencySelectionService::new(Arc::new(tables));
    let response = service.select(request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

struct Scenario {
    title: &'static str,
    agent: &'static str,
    origin: &'static str,
    destination: &'static str,
    geo_travel_type: GeoTravelType,
    alternate_currency: Option<&'static str>,
    fares: Vec<PaxTypeFare>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        ticketing_date,
        diagnostic,
    } = args;
    let ticketing_date = ticketing_date.unwrap_or_else(|| Local::now().date_naive());

    let service = CurrencySelectionService::new(Arc::new(demo_tables()));
    println!("Fare currency selection demo ({ticketing_date})");

    for scenario in scenarios() {
        println!("\n{}", scenario.title);
        let request = scenario_request(&scenario, ticketing_date, diagnostic);
        match service.select(request) {
            Ok(response) => render_response(&response, diagnostic),
            Err(err) => println!("  Selection rejected: {err}"),
        }
    }

    Ok(())
}

fn scenarios() -> Vec<Scenario> {
    let sao_lon = || {
        vec![
            demo_fare("JJ", "SAO", "LON", "BRL", Directionality::From, 420_000),
            demo_fare("JJ", "SAO", "LON", "USD", Directionality::Both, 85_000),
            demo_fare("JJ", "LON", "SAO", "GBP", Directionality::To, 64_000),
        ]
    };

    vec![
        Scenario {
            title: "São Paulo agent, SAO-LON round trip",
            agent: "SAO",
            origin: "SAO",
            destination: "LON",
            geo_travel_type: GeoTravelType::International,
            alternate_currency: None,
            fares: sao_lon(),
        },
        Scenario {
            title: "London agent, SAO-LON round trip",
            agent: "LON",
            origin: "SAO",
            destination: "LON",
            geo_travel_type: GeoTravelType::International,
            alternate_currency: None,
            fares: sao_lon(),
        },
        Scenario {
            title: "São Paulo agent asking for GBP",
            agent: "SAO",
            origin: "SAO",
            destination: "LON",
            geo_travel_type: GeoTravelType::International,
            alternate_currency: Some("GBP"),
            fares: sao_lon(),
        },
        Scenario {
            title: "São Paulo agent asking for JPY",
            agent: "SAO",
            origin: "SAO",
            destination: "LON",
            geo_travel_type: GeoTravelType::International,
            alternate_currency: Some("JPY"),
            fares: sao_lon(),
        },
        Scenario {
            title: "Toronto-New York transborder",
            agent: "YTO",
            origin: "YTO",
            destination: "NYC",
            geo_travel_type: GeoTravelType::Transborder,
            alternate_currency: None,
            fares: vec![
                demo_fare("AC", "YTO", "NYC", "CAD", Directionality::From, 33_000),
                demo_fare("AC", "YTO", "NYC", "USD", Directionality::To, 25_000),
            ],
        },
    ]
}

fn demo_fare(
    carrier: &str,
    market1: &str,
    market2: &str,
    currency: &str,
    directionality: Directionality,
    cents: i64,
) -> PaxTypeFare {
    PaxTypeFare {
        carrier: CarrierCode::new(carrier),
        fare_class: "Y".to_string(),
        market1: LocCode::new(market1),
        market2: LocCode::new(market2),
        currency: CurrencyCode::new(currency),
        directionality,
        amount: Decimal::new(cents, 2),
        nuc_amount: None,
        fcas_pax_type: None,
        valid: true,
        specified_fare_by_rule: false,
        tariff_category: TariffCategory::Public,
    }
}

fn scenario_request(
    scenario: &Scenario,
    ticketing_date: NaiveDate,
    diagnostic: bool,
) -> CurrencySelectionRequest {
    let carrier = scenario
        .fares
        .first()
        .map(|fare| fare.carrier.clone())
        .unwrap_or_default();

    CurrencySelectionRequest {
        ticketing_date,
        agent_location: LocCode::new(scenario.agent),
        cruise_pfa_currency: None,
        sale_point_override: None,
        ticket_point_override: None,
        alternate_currency: scenario.alternate_currency.map(CurrencyCode::new),
        fare_display: false,
        diagnostic: diagnostic.then(DiagnosticRequest::default),
        itinerary: ItineraryInput {
            geo_travel_type: scenario.geo_travel_type,
            origin_nation: None,
            one_way: false,
            segment_count: 2,
            origination_currency: None,
            calculation_currency: None,
        },
        fare_markets: vec![FareMarketInput {
            origin: LocCode::new(scenario.origin),
            destination: LocCode::new(scenario.destination),
            board_multi_city: None,
            off_multi_city: None,
            governing_carrier: carrier,
            geo_travel_type: scenario.geo_travel_type,
            direction: FareMarketDirection::Outbound,
            buckets: vec![BucketInput {
                requested_pax_type: PaxTypeCode::new("ADT"),
                actual_pax_types: Vec::new(),
                fares: scenario.fares.clone(),
            }],
        }],
    }
}

fn render_response(response: &CurrencySelectionResponse, diagnostic: bool) {
    for market in &response.fare_markets {
        println!(
            "- {} selected: {}",
            market.market,
            if market.selected { "yes" } else { "no" }
        );
        for bucket in &market.buckets {
            println!(
                "  {}: outbound {} | inbound {}",
                bucket.pax_type,
                display_currency(bucket.outbound_currency.as_ref()),
                display_currency(bucket.inbound_currency.as_ref())
            );
            if let Some(equiv) = &bucket.equiv_amount_override_currency {
                println!("  equivalent amount override: {equiv}");
            }
        }
    }
    for message in &response.text_messages {
        println!("  message: {message}");
    }
    if diagnostic {
        if let Some(text) = &response.diagnostic {
            println!("{text}");
        }
    }
}

fn display_currency(currency: Option<&CurrencyCode>) -> &str {
    currency.map(CurrencyCode::as_str).unwrap_or("-")
}
