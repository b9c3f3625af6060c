//! Diagnostic 212: a line oriented trace of currency selection for one fare market.
//!
//! The collector only records text. Every method is a no-op while the collector is
//! inactive, so callers never branch on it.

use rust_decimal::Decimal;

use super::domain::{
    CurrencyCode, DiagnosticRequest, Directionality, FareMarket, Itinerary, NationCode,
    PaxTypeBucket, PaxTypeCode, PaxTypeFare, NUC,
};
use super::validator::RecordFailure;
use crate::tables::{CurrencySelectionRecord, Nation};

const SEPARATOR: &str = " ----------------------------------------------------------- ";
const FOOTER: &str = "************** END DIAG 212 PER FARE MARKET **************** ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectFunction {
    Prime,
    Alternate,
    Usca,
}

impl SelectFunction {
    fn header(self) -> &'static str {
        match self {
            Self::Prime => "***** START DIAG 212 FUNCTION::SELECT-PRIME-CURRENCY ****** ",
            Self::Alternate => "**** START DIAG 212 FUNCTION::SELECT-ALTERNATE-CURRENCY *** ",
            Self::Usca => "****** START DIAG 212 FUNCTION::SELECT-USCA-CURRENCY ****** ",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Prime => "SELECT-PRIME-CURRENCY",
            Self::Alternate => "SELECT-ALTERNATE-CURRENCY",
            Self::Usca => "SELECT-USCA-CURRENCY",
        }
    }
}

/// Outcome lines printed while walking the nation fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NationStep {
    NotFound,
    Conversion,
    ConversionNoMatch,
    Alternate,
    Prime,
    Usd,
    FirstCurrency,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorNote {
    PrimeCurrencyEmpty,
    RecordPassed,
    AlternateNotPublished,
    RestrictedFailed,
}

#[derive(Debug, Clone, Default)]
pub struct DiagCollector {
    request: Option<DiagnosticRequest>,
    active: bool,
    buffer: String,
}

impl DiagCollector {
    pub fn new(request: Option<&DiagnosticRequest>) -> Self {
        Self {
            request: request.cloned(),
            active: false,
            buffer: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> &str {
        &self.buffer
    }

    pub fn into_text(self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }

    fn wants(&self, market: &FareMarket) -> bool {
        match &self.request {
            None => false,
            Some(request) => match request.fare_market.as_deref() {
                None => true,
                Some(filter) => {
                    let filter = filter.trim();
                    !filter.is_empty() && filter.eq_ignore_ascii_case(&market.board_off_key())
                }
            },
        }
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Start tracing `market`; stays inactive unless a diagnostic was requested for it.
    pub fn begin(&mut self, function: SelectFunction, market: &FareMarket, itin: &Itinerary) {
        self.active = self.wants(market);
        if !self.active {
            return;
        }

        self.line(function.header());
        self.line(&format!(
            "{}-{}   GOV CXR: {}   DIR: {} ",
            market.board_multi_city,
            market.off_multi_city,
            market.governing_carrier,
            market.direction.label()
        ));
        self.line(&format!(
            "FARE MARKET GEO TRAVEL TYPE: {} ",
            market.geo_travel_type.label()
        ));
        self.line(&format!(
            "ITINERARY GEO TRAVEL TYPE  : {} ",
            itin.geo_travel_type.label()
        ));
        self.line(&format!(
            "ITINERARY ORIGINATION CURR : {} ",
            code_or_blank(itin.origination_currency.as_ref())
        ));
        self.line(&format!(
            "ITINERARY CALCULATION CURR : {} ",
            code_or_blank(itin.calculation_currency.as_ref())
        ));

        let mut cache = String::from("CACHE CURRENCIES: ");
        let mut width = 0;
        for key in &market.currencies {
            let direction = key.directionality.label();
            width += 9 + direction.len();
            cache.push_str(&format!(
                "{}-{}-{} ",
                key.pax_type, direction, key.currency
            ));
            if width > 34 {
                cache.push_str(" \n                  ");
                width = 0;
            }
        }
        cache.push(' ');
        self.line(&cache);

        self.line(&format!(
            "NUMBER OF PAXTYPECORTEGES  : {}   TOTAL PAXTYPEFARES: {} ",
            market.buckets.len(),
            market.total_fares()
        ));
    }

    pub fn bucket(&mut self, pax_type: &PaxTypeCode, cruise_currency: Option<&CurrencyCode>) {
        if !self.active {
            return;
        }
        self.line(SEPARATOR);
        self.line(&format!(
            " PAXTYPECORTEGE REQUESTED PAXTYPE: {} CUR: {}",
            pax_type,
            code_or_blank(cruise_currency)
        ));
    }

    /// Printed on the same line as the unique currency count that follows it.
    pub fn nation_code(&mut self, nation: &NationCode) {
        if !self.active {
            return;
        }
        if nation.is_empty() {
            self.buffer.push_str(" NATION CODE:  *ERROR* ");
        } else {
            self.buffer.push_str(&format!(" NATION CODE: {nation}"));
        }
    }

    pub fn unique_currencies(&mut self, count: usize) {
        if !self.active {
            return;
        }
        self.line(&format!(" NUM OF UNIQUE CURR: {count} "));
    }

    pub fn fare(&mut self, pax_type: &PaxTypeCode, fare: &PaxTypeFare) {
        if !self.active {
            return;
        }
        self.line(SEPARATOR);
        self.line(&format!(
            " FARE PAXTYPE: {}   CXR: {}   FARECLASS: {} ",
            fare.fcas_pax_type.as_ref().unwrap_or(pax_type),
            fare.carrier,
            fare.fare_class
        ));
        self.line(&format!(
            " FARE CURR: {}   MARKET1-2: {}-{}   DIRECTIONALITY: {} ",
            fare.currency,
            fare.market1,
            fare.market2,
            fare.directionality.label()
        ));
        if fare.currency.is_empty() {
            self.line(" CURRENCY CODE BLANK - CONTINUE TO NEXT FARE ");
        }
        self.line(SEPARATOR);
    }

    pub fn validator_start(&mut self, nation: Option<&NationCode>, records: usize) {
        if !self.active {
            return;
        }
        self.line(" ");
        self.line(&format!(
            "   ENTER CURRENCY SELECTION VALIDATOR-NATION CODE: {} ",
            nation_label(nation)
        ));
        self.line(&format!("    CURRENCY SELECTION VECTOR SIZE: {records} "));
    }

    pub fn validator_start_alternate(
        &mut self,
        nation: Option<&NationCode>,
        alternate: &CurrencyCode,
    ) {
        if !self.active {
            return;
        }
        self.line(" ");
        self.line(&format!(
            "   ENTER CURRENCY SELECTION VALIDATOR-NATION CODE: {} ",
            nation_label(nation)
        ));
        self.line(&format!("   ALTERNATE CURRENCY: {alternate} "));
    }

    pub fn alternate_records(&mut self, records: usize) {
        if !self.active {
            return;
        }
        self.line(&format!("    CURRENCY SELECTION VECTOR SIZE: {records} "));
    }

    pub fn record(&mut self, record: &CurrencySelectionRecord) {
        if !self.active {
            return;
        }
        let (pos_type, pos_code) = record
            .point_of_sale
            .as_ref()
            .map(|geo| (geo.loc_type.code(), geo.code.as_str()))
            .unwrap_or((' ', ""));
        self.line(" ");
        self.line(&format!(
            "    SEQ:{} JRNY:{} FC:{} POS/EX:{}-{}/{} CURR:{} PAX EX:{} ",
            record.seq_no,
            record.journey_restriction.code(),
            record.fare_component_restriction.code(),
            pos_type,
            pos_code,
            record.point_of_sale_exception.code(),
            code_or_blank(record.fare_comp_prime_currency.as_ref()),
            record.pax_type_exception.code()
        ));

        let carriers = wrapped(
            record.gov_carriers.iter().map(|code| code.as_str()),
            11,
            22,
        );
        self.line(&format!(
            "    GOV CXR EX:{}  CXRS:{carriers} ",
            record.gov_carrier_exception.code()
        ));
        let pax_types = wrapped(record.pax_types.iter().map(|code| code.as_str()), 12, 13);
        self.line(&format!("    PAXTYPES:{pax_types} "));
    }

    pub fn alternate_record(&mut self, record: &CurrencySelectionRecord) {
        if !self.active {
            return;
        }
        self.line(" ");
        self.line(&format!(
            "    SEQ:{} RESTRICTED CURR EXEMPT:{} SIZE:{} ",
            record.seq_no,
            record.restricted_currency_exception.code(),
            record.restricted_currencies.len()
        ));
        let currencies = wrapped(
            record.restricted_currencies.iter().map(|code| code.as_str()),
            9,
            27,
        );
        self.line(&format!("    RESTRICTED CURRENCIES: {currencies} "));
    }

    pub fn record_failure(&mut self, failure: RecordFailure) {
        if !self.active {
            return;
        }
        let text = match failure {
            RecordFailure::JourneyRestriction => "JOURNEY RESTRICTION",
            RecordFailure::FareComponentRestriction => "FARE COMPONENT RESTRICTION",
            RecordFailure::GoverningCarrier => "GOVERNING CARRIER CHECK",
            RecordFailure::PassengerType => "PAX TYPE CHECK",
            RecordFailure::PointOfSale => "POINT OF SALE CHECK",
            RecordFailure::PointOfIssue => "POINT OF ISSUE CHECK",
        };
        self.line(&format!("    {text} FAILED-CONTINUE TO NEXT SEQUENCE "));
    }

    pub fn note(&mut self, note: ValidatorNote) {
        if !self.active {
            return;
        }
        self.line(match note {
            ValidatorNote::PrimeCurrencyEmpty => {
                "    PRIMARY CURRENCY EMPTY-CONTINUE TO NEXT SEQUENCE "
            }
            ValidatorNote::RecordPassed => "    ITEM PASS-APPLY DATA ",
            ValidatorNote::AlternateNotPublished => {
                "    ALTERNATE CURRENCY IS NOT PUBLISHED IN THIS MARKET "
            }
            ValidatorNote::RestrictedFailed => "    RESTRICTED CHECK FAIL-CONTINUE TO NEXT SEQUENCE ",
        });
    }

    pub fn text_messages(&mut self, messages: &[String]) {
        if !self.active || messages.is_empty() {
            return;
        }
        self.line("TEXT MESSAGES: ");
        for message in messages {
            self.line(message);
        }
    }

    pub fn validator_end(&mut self, determined: bool) {
        if !self.active {
            return;
        }
        self.line(&format!(
            "   EXIT  CURRENCY SELECTION VALIDATOR: {} ",
            bool_label(determined)
        ));
    }

    pub fn nation_enter(&mut self, first_currency: Option<&CurrencyCode>) {
        if !self.active {
            return;
        }
        self.line(&format!(
            "   ENTER NATION VALIDATION-FIRSTCURRENCY: {} ",
            code_or_blank(first_currency)
        ));
    }

    pub fn nation_step(&mut self, step: NationStep) {
        if !self.active {
            return;
        }
        let lines: &[&str] = match step {
            NationStep::NotFound => &[
                "    NATION NOT FOUND ",
                "   EXIT NATION VALIDATION-RETURN FALSE ",
            ],
            NationStep::Conversion => &[
                "    NATION CONVERSION CURRENCY MATCH ",
                "   EXIT NATION VALIDATION-RETURN TRUE ",
            ],
            NationStep::ConversionNoMatch => &["    NATION CONVERSION CURRENCY NOMATCH "],
            NationStep::Alternate => &[
                "    NATION ALTERNATE CURRENCY MATCH ",
                "   EXIT NATION VALIDATION-RETURN TRUE ",
            ],
            NationStep::Prime => &[
                "    NATION ALTERNATE CURRENCY NOMATCH ",
                "    NATION PRIME CURRENCY MATCH ",
                "   EXIT NATION VALIDATION-RETURN TRUE ",
            ],
            NationStep::Usd => &[
                "    NATION ALTERNATE CURRENCY NOMATCH ",
                "    NATION PRIME CURRENCY NOMATCH ",
                "    USD MATCH WITH FARE CURRENCY ",
                "   EXIT NATION VALIDATION-RETURN TRUE ",
            ],
            NationStep::FirstCurrency => &[
                "    NATION ALTERNATE CURRENCY NOMATCH ",
                "    NATION PRIME CURRENCY NOMATCH ",
                "    USD NOMATCH WITH FARE CURRENCY ",
                "    USE FIRSTCURRENCY-PUBLISHED CURRENCY ",
                "   EXIT NATION VALIDATION-RETURN TRUE ",
            ],
            NationStep::Exhausted => &[
                "    NATION ALTERNATE CURRENCY NOMATCH ",
                "    NATION PRIME CURRENCY NOMATCH ",
                "    USD NOMATCH WITH FARE CURRENCY ",
                "    FIRSTCURRENCY IS NOT PUBLISHED CURRENCY ",
                "   EXIT NATION VALIDATION-RETURN FALSE ",
            ],
        };
        for line in lines {
            self.line(line);
        }
    }

    pub fn nation_record(&mut self, nation: &Nation) {
        if !self.active {
            return;
        }
        self.line(&format!(
            "    NATION {} PRIME:{} ALTERNATE:{} CONVERSION:{} ",
            nation.code,
            code_or_blank(nation.prime_currency.as_ref()),
            code_or_blank(nation.alternate_currency.as_ref()),
            code_or_blank(nation.conversion_currency.as_ref())
        ));
    }

    pub fn currency_differs(&mut self, direction: Directionality) {
        if !self.active {
            return;
        }
        let side = match direction {
            Directionality::From => "OUTBOUND",
            Directionality::To => "INBOUND",
            Directionality::Both => return,
        };
        self.line(&format!(
            " *{side} CURRENCY DIFFER FROM PREVIOUS PAXTYPECORTEGE* "
        ));
    }

    pub fn found(&mut self, outbound: bool, inbound: bool) {
        if !self.active {
            return;
        }
        self.line(&format!(" FOUND OUTBOUND CURRENCY: {} ", bool_label(outbound)));
        self.line(&format!(" FOUND INBOUND  CURRENCY: {} ", bool_label(inbound)));
    }

    /// Fare to NUC rates for the chosen currencies, then the continuation line.
    pub fn nuc_rates(
        &mut self,
        bucket: &PaxTypeBucket,
        itin: &Itinerary,
        outbound: bool,
        inbound: bool,
    ) {
        if !self.active {
            return;
        }
        let calculates_in_nuc = itin
            .calculation_currency
            .as_ref()
            .is_some_and(|currency| *currency == NUC);

        if calculates_in_nuc {
            if outbound {
                if let Some((currency, rate)) =
                    nuc_rate(bucket, Directionality::From, bucket.outbound_currency.as_ref())
                {
                    self.line(&format!(
                        " OUTBOUND CURRENCY {currency} TO NUC CONVERSION RATE: {rate:.6} "
                    ));
                }
            }
            if inbound {
                if let Some((currency, rate)) =
                    nuc_rate(bucket, Directionality::To, bucket.inbound_currency.as_ref())
                {
                    self.line(&format!(
                        " INBOUND CURRENCY {currency} TO NUC CONVERSION RATE: {rate:.6} "
                    ));
                }
            }
        }

        if outbound && inbound {
            self.line(" CONTINUE TO NEXT NATION ");
        } else {
            self.line(" CONTINUE TO NEXT PAXTYPEFARECORTEGE ");
        }
    }

    pub fn bucket_result(&mut self, bucket: &PaxTypeBucket) {
        if !self.active {
            return;
        }
        self.line(" ");
        self.line(&format!(
            " PAXTYPECORTEGE OUTBOUND CURRENCY: {} ",
            code_or_blank(bucket.outbound_currency.as_ref())
        ));
        self.line(&format!(
            " PAXTYPECORTEGE INBOUND  CURRENCY: {} ",
            code_or_blank(bucket.inbound_currency.as_ref())
        ));
    }

    pub fn asean(&mut self, market: &FareMarket) {
        if !self.active {
            return;
        }
        let outbound = joined(&market.outbound_asean_currencies);
        let inbound = joined(&market.inbound_asean_currencies);
        self.line(&format!(" OUTBOUND ASEAN CURR: {outbound} "));
        self.line(&format!(" INBOUND  ASEAN CURR: {inbound} "));
    }

    /// Close the market trace. `None` reports a function without a result.
    pub fn end(&mut self, function: SelectFunction, result: Option<bool>) {
        if !self.active {
            return;
        }
        let label = result.map(bool_label).unwrap_or("VOID");
        self.line(&format!("{} RETURN: {label} ", function.label()));
        self.line(FOOTER);
        self.line(" ");
        self.active = false;
    }
}

fn nuc_rate<'a>(
    bucket: &'a PaxTypeBucket,
    direction: Directionality,
    currency: Option<&CurrencyCode>,
) -> Option<(&'a CurrencyCode, Decimal)> {
    let currency = currency?;
    bucket.fares.iter().find_map(|fare| {
        let nuc = fare.nuc_amount.filter(|nuc| !nuc.is_zero())?;
        let travels =
            fare.directionality == direction || fare.directionality == Directionality::Both;
        if !travels || fare.currency != *currency {
            return None;
        }
        nuc.checked_div(fare.amount).map(|rate| (&fare.currency, rate))
    })
}

fn code_or_blank<T: AsRef<str>>(code: Option<&T>) -> &str {
    code.map(|value| value.as_ref()).unwrap_or("")
}

fn nation_label(nation: Option<&NationCode>) -> &str {
    match nation {
        Some(code) if !code.is_empty() => code.as_str(),
        _ => "BLANK",
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn joined(codes: &[CurrencyCode]) -> String {
    codes.iter().map(|code| format!("{code} ")).collect()
}

fn wrapped<'a>(codes: impl Iterator<Item = &'a str>, per_line: usize, indent: usize) -> String {
    let mut text = String::new();
    for (index, code) in codes.enumerate() {
        if index > 0 && index % per_line == 0 {
            text.push_str(" \n");
            text.push_str(&" ".repeat(indent));
        }
        text.push_str(code);
        text.push(' ');
    }
    text
}
