//! Versioned tariff schedules: the production [`RateTable`].

mod parser;

pub use parser::FreightRates;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::engine::{
    CountryCode, DutyRate, DutyRateSource, HsCode, MpfParams, RateTable, ShippingMode,
    TradeRemedy, MAX_AMOUNT, MAX_RATE,
};
use parser::{hs_key_digits, parse_document, parse_duty_csv, ScheduleDocument};

#[derive(Debug)]
pub enum TariffLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    Invalid { detail: String },
}

impl std::fmt::Display for TariffLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TariffLoadError::Io(err) => write!(f, "failed to read tariff schedule: {}", err),
            TariffLoadError::Json(err) => write!(f, "invalid tariff schedule JSON: {}", err),
            TariffLoadError::Csv(err) => write!(f, "invalid duty rate CSV: {}", err),
            TariffLoadError::Invalid { detail } => {
                write!(f, "tariff schedule rejected: {}", detail)
            }
        }
    }
}

impl std::error::Error for TariffLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TariffLoadError::Io(err) => Some(err),
            TariffLoadError::Json(err) => Some(err),
            TariffLoadError::Csv(err) => Some(err),
            TariffLoadError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for TariffLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for TariffLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for TariffLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn invalid(detail: impl Into<String>) -> TariffLoadError {
    TariffLoadError::Invalid {
        detail: detail.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DutyLine {
    rate: Decimal,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TradeRemedyEntry {
    prefix: String,
    origin: CountryCode,
    destination: Option<CountryCode>,
    remedy: TradeRemedy,
}

/// Immutable, validated rate data. Share it behind an `Arc` and swap the `Arc` to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffSchedule {
    version: String,
    effective_date: NaiveDate,
    duty_lines: BTreeMap<String, DutyLine>,
    chapter_defaults: BTreeMap<String, Decimal>,
    trade_remedies: Vec<TradeRemedyEntry>,
    mpf: MpfParams,
    hmf_rate: Decimal,
    freight_rates: FreightRates,
    insurance_rate: Decimal,
}

impl TariffSchedule {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TariffLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TariffLoadError> {
        Self::from_document(parse_document(reader)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TariffLoadError> {
        Self::from_reader(raw.as_bytes())
    }

    /// Merges duty lines from a CSV export; CSV rows override lines already present.
    pub fn with_duty_csv<R: Read>(mut self, reader: R) -> Result<Self, TariffLoadError> {
        for (index, row) in parse_duty_csv(reader)?.into_iter().enumerate() {
            let rate = Decimal::from_str(&row.rate).map_err(|err| {
                invalid(format!(
                    "duty CSV row {}: rate '{}' is not a decimal ({err})",
                    index + 1,
                    row.rate
                ))
            })?;
            let digits = duty_key(&row.hs_code)?;
            check_rate(&format!("duty rate for {}", row.hs_code), rate)?;
            self.duty_lines.insert(
                digits,
                DutyLine {
                    rate,
                    description: row.description,
                },
            );
        }
        Ok(self)
    }

    pub fn with_duty_csv_path<P: AsRef<Path>>(self, path: P) -> Result<Self, TariffLoadError> {
        let file = std::fs::File::open(path)?;
        self.with_duty_csv(file)
    }

    fn from_document(document: ScheduleDocument) -> Result<Self, TariffLoadError> {
        let ScheduleDocument {
            version,
            effective_date,
            duty_rates,
            chapter_defaults,
            trade_remedies,
            mpf,
            hmf_rate,
            freight_rates,
            insurance_rate,
        } = document;

        let version = version.trim().to_string();
        if version.is_empty() {
            return Err(invalid("version must not be empty"));
        }

        let mut duty_lines = BTreeMap::new();
        for row in duty_rates {
            let digits = duty_key(&row.hs_code)?;
            check_rate(&format!("duty rate for {}", row.hs_code), row.rate)?;
            let line = DutyLine {
                rate: row.rate,
                description: row.description,
            };
            if duty_lines.insert(digits, line).is_some() {
                return Err(invalid(format!("duplicate duty line {}", row.hs_code)));
            }
        }

        let mut chapters = BTreeMap::new();
        for row in chapter_defaults {
            let digits = hs_key_digits(&row.chapter)
                .filter(|digits| digits.len() == 2)
                .ok_or_else(|| invalid(format!("chapter '{}' must be 2 digits", row.chapter)))?;
            check_rate(&format!("chapter {} default", row.chapter), row.rate)?;
            if chapters.insert(digits, row.rate).is_some() {
                return Err(invalid(format!("duplicate chapter default {}", row.chapter)));
            }
        }

        let mut remedies = Vec::with_capacity(trade_remedies.len());
        for row in trade_remedies {
            let prefix = hs_key_digits(&row.hs_prefix)
                .filter(|digits| (2..=HsCode::MAX_DIGITS).contains(&digits.len()))
                .ok_or_else(|| {
                    invalid(format!(
                        "trade remedy prefix '{}' must have 2 to 10 digits",
                        row.hs_prefix
                    ))
                })?;
            let origin = CountryCode::parse("origin", &row.origin)
                .map_err(|err| invalid(format!("trade remedy {}: {err}", row.hs_prefix)))?;
            let destination = row
                .destination
                .as_deref()
                .map(|raw| CountryCode::parse("destination", raw))
                .transpose()
                .map_err(|err| invalid(format!("trade remedy {}: {err}", row.hs_prefix)))?;
            check_rate(&format!("trade remedy {} from {}", row.hs_prefix, origin), row.rate)?;

            let entry = TradeRemedyEntry {
                prefix,
                origin,
                destination,
                remedy: TradeRemedy {
                    rate: row.rate,
                    program: row.program.filter(|program| !program.trim().is_empty()),
                },
            };
            if remedies.iter().any(|existing: &TradeRemedyEntry| {
                existing.prefix == entry.prefix
                    && existing.origin == entry.origin
                    && existing.destination == entry.destination
            }) {
                return Err(invalid(format!(
                    "duplicate trade remedy {} from {}",
                    row.hs_prefix, entry.origin
                )));
            }
            remedies.push(entry);
        }

        check_rate("mpf rate", mpf.rate)?;
        if mpf.min_fee < Decimal::ZERO || mpf.max_fee > MAX_AMOUNT {
            return Err(invalid("mpf bounds must be non-negative and within range"));
        }
        if mpf.min_fee > mpf.max_fee {
            return Err(invalid(format!(
                "mpf min_fee {} exceeds max_fee {}",
                mpf.min_fee, mpf.max_fee
            )));
        }
        check_rate("hmf rate", hmf_rate)?;
        check_rate("ocean freight rate", freight_rates.ocean)?;
        check_rate("air freight rate", freight_rates.air)?;
        check_rate("rail freight rate", freight_rates.rail)?;
        check_rate("insurance rate", insurance_rate)?;

        Ok(Self {
            version,
            effective_date,
            duty_lines,
            chapter_defaults: chapters,
            trade_remedies: remedies,
            mpf,
            hmf_rate,
            freight_rates,
            insurance_rate,
        })
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    pub fn duty_line_count(&self) -> usize {
        self.duty_lines.len()
    }

    pub fn chapter_default_count(&self) -> usize {
        self.chapter_defaults.len()
    }

    pub fn trade_remedy_count(&self) -> usize {
        self.trade_remedies.len()
    }

    pub fn freight_rates(&self) -> FreightRates {
        self.freight_rates
    }

    /// Description of the tariff line that priced the code, if the line carries one.
    pub fn describe(&self, hs_code: &HsCode) -> Option<&str> {
        self.matching_line(hs_code)
            .and_then(|(_, line)| line.description.as_deref())
    }

    fn matching_line(&self, hs_code: &HsCode) -> Option<(usize, &DutyLine)> {
        let digits = hs_code.digits();
        (HsCode::MIN_DIGITS..=digits.len())
            .rev()
            .find_map(|len| self.duty_lines.get(&digits[..len]).map(|line| (len, line)))
    }
}

impl RateTable for TariffSchedule {
    fn version(&self) -> &str {
        &self.version
    }

    fn base_duty_rate(&self, hs_code: &HsCode) -> Option<DutyRate> {
        if let Some((len, line)) = self.matching_line(hs_code) {
            let source = if len == hs_code.digits().len() {
                DutyRateSource::Exact
            } else {
                DutyRateSource::Subheading
            };
            return Some(DutyRate {
                rate: line.rate,
                source,
            });
        }

        self.chapter_defaults
            .get(hs_code.chapter())
            .map(|rate| DutyRate {
                rate: *rate,
                source: DutyRateSource::ChapterDefault,
            })
    }

    fn trade_remedy_rate(
        &self,
        hs_code: &HsCode,
        origin: &CountryCode,
        destination: &CountryCode,
    ) -> Option<TradeRemedy> {
        self.trade_remedies
            .iter()
            .filter(|entry| {
                hs_code.digits().starts_with(&entry.prefix)
                    && &entry.origin == origin
                    && entry
                        .destination
                        .as_ref()
                        .map_or(true, |scoped| scoped == destination)
            })
            .max_by_key(|entry| (entry.prefix.len(), entry.destination.is_some()))
            .map(|entry| entry.remedy.clone())
    }

    fn mpf_params(&self) -> MpfParams {
        self.mpf
    }

    fn hmf_rate(&self) -> Decimal {
        self.hmf_rate
    }

    fn freight_rate(&self, mode: ShippingMode) -> Decimal {
        match mode {
            ShippingMode::Ocean => self.freight_rates.ocean,
            ShippingMode::Air => self.freight_rates.air,
            ShippingMode::Rail => self.freight_rates.rail,
        }
    }

    fn insurance_rate(&self) -> Decimal {
        self.insurance_rate
    }
}

fn duty_key(raw: &str) -> Result<String, TariffLoadError> {
    hs_key_digits(raw)
        .filter(|digits| (HsCode::MIN_DIGITS..=HsCode::MAX_DIGITS).contains(&digits.len()))
        .ok_or_else(|| invalid(format!("duty line '{raw}' must have 4 to 10 digits")))
}

fn check_rate(label: &str, rate: Decimal) -> Result<(), TariffLoadError> {
    if rate < Decimal::ZERO || rate > MAX_RATE {
        return Err(invalid(format!("{label} {rate} is outside 0..={MAX_RATE}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SCHEDULE: &str = r#"{
        "version": "2025.2",
        "effective_date": "2025-07-01",
        "duty_rates": [
            { "hs_code": "8504.40", "rate": "0", "description": "Static converters" },
            { "hs_code": "8504.40.95", "rate": "0.015" }
        ],
        "chapter_defaults": [{ "chapter": "85", "rate": "0.026" }],
        "trade_remedies": [
            { "hs_prefix": "85", "origin": "CN", "rate": "0.25", "program": "Section 301" },
            { "hs_prefix": "8504", "origin": "CN", "destination": "US", "rate": "0.5" },
            { "hs_prefix": "85", "origin": "VN", "destination": "CA", "rate": "0.1" }
        ],
        "mpf": { "rate": "0.003464", "min_fee": "31.67", "max_fee": "614.35" },
        "hmf_rate": "0.00125",
        "freight_rates": { "ocean": "0.05", "air": "0.18", "rail": "0.07" },
        "insurance_rate": "0.005"
    }"#;

    fn schedule() -> TariffSchedule {
        TariffSchedule::from_json_str(SCHEDULE).expect("schedule loads")
    }

    fn code(raw: &str) -> HsCode {
        HsCode::parse(raw).expect("valid code")
    }

    fn country(raw: &str) -> CountryCode {
        CountryCode::parse("country", raw).expect("valid country")
    }

    #[test]
    fn longest_duty_line_wins() {
        let schedule = schedule();

        let exact = schedule.base_duty_rate(&code("8504.40.95")).expect("rate");
        assert_eq!(exact.rate, dec!(0.015));
        assert_eq!(exact.source, DutyRateSource::Exact);

        let sub = schedule.base_duty_rate(&code("8504.40.10")).expect("rate");
        assert_eq!(sub.rate, dec!(0));
        assert_eq!(sub.source, DutyRateSource::Subheading);
        assert_eq!(schedule.describe(&code("8504.40.10")), Some("Static converters"));

        let chapter = schedule.base_duty_rate(&code("8517.62")).expect("rate");
        assert_eq!(chapter.source, DutyRateSource::ChapterDefault);

        assert!(schedule.base_duty_rate(&code("0101.21")).is_none());
    }

    #[test]
    fn trade_remedy_prefers_specific_scoped_entries() {
        let schedule = schedule();

        let us = schedule
            .trade_remedy_rate(&code("8504.40.95"), &country("CN"), &country("US"))
            .expect("remedy");
        assert_eq!(us.rate, dec!(0.5));

        let ca = schedule
            .trade_remedy_rate(&code("8504.40.95"), &country("CN"), &country("CA"))
            .expect("remedy");
        assert_eq!(ca.rate, dec!(0.25));
        assert_eq!(ca.program.as_deref(), Some("Section 301"));

        assert!(schedule
            .trade_remedy_rate(&code("8504.40.95"), &country("DE"), &country("US"))
            .is_none());
        assert!(schedule
            .trade_remedy_rate(&code("8517.62"), &country("VN"), &country("US"))
            .is_none());
    }

    #[test]
    fn csv_lines_merge_into_schedule() {
        let csv = "hs_code,rate\n0101.21,0\n8517.62,0.01\n";

        let schedule = schedule().with_duty_csv(csv.as_bytes()).expect("csv merges");

        assert_eq!(schedule.duty_line_count(), 4);
        let horse = schedule.base_duty_rate(&code("0101.21.0010")).expect("rate");
        assert_eq!(horse.source, DutyRateSource::Subheading);
        let phone = schedule.base_duty_rate(&code("8517.62")).expect("rate");
        assert_eq!(phone.rate, dec!(0.01));
        assert_eq!(phone.source, DutyRateSource::Exact);
    }

    #[test]
    fn csv_rejects_bad_rates() {
        let error = schedule()
            .with_duty_csv("hs_code,rate\n8517.62,abc\n".as_bytes())
            .expect_err("bad rate");
        assert!(matches!(error, TariffLoadError::Invalid { .. }));
        assert!(error.to_string().contains("row 1"));
    }

    #[test]
    fn rejects_inverted_mpf_bounds() {
        let raw = SCHEDULE.replace("\"min_fee\": \"31.67\"", "\"min_fee\": \"700\"");
        let error = TariffSchedule::from_json_str(&raw).expect_err("inverted bounds");
        assert!(error.to_string().contains("exceeds max_fee"));
    }

    #[test]
    fn rejects_negative_rates_and_bad_keys() {
        let negative = SCHEDULE.replace("\"insurance_rate\": \"0.005\"", "\"insurance_rate\": \"-0.005\"");
        assert!(matches!(
            TariffSchedule::from_json_str(&negative),
            Err(TariffLoadError::Invalid { .. })
        ));

        let short_line = SCHEDULE.replace("\"hs_code\": \"8504.40\"", "\"hs_code\": \"850\"");
        assert!(TariffSchedule::from_json_str(&short_line).is_err());

        let bad_country = SCHEDULE.replace("\"origin\": \"VN\"", "\"origin\": \"ZZ\"");
        assert!(TariffSchedule::from_json_str(&bad_country).is_err());
    }

    #[test]
    fn rejects_unknown_fields_and_bad_dates() {
        let extra = SCHEDULE.replace("\"hmf_rate\"", "\"mock_mode\": true, \"hmf_rate\"");
        assert!(matches!(
            TariffSchedule::from_json_str(&extra),
            Err(TariffLoadError::Json(_))
        ));

        let date = SCHEDULE.replace("2025-07-01", "07/01/2025");
        assert!(matches!(
            TariffSchedule::from_json_str(&date),
            Err(TariffLoadError::Json(_))
        ));
    }
}
