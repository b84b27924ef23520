use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::engine::MpfParams;

/// On-disk shape of a tariff schedule.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScheduleDocument {
    pub(crate) version: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) effective_date: NaiveDate,
    #[serde(default)]
    pub(crate) duty_rates: Vec<DutyRateRow>,
    #[serde(default)]
    pub(crate) chapter_defaults: Vec<ChapterDefaultRow>,
    #[serde(default)]
    pub(crate) trade_remedies: Vec<TradeRemedyRow>,
    pub(crate) mpf: MpfParams,
    pub(crate) hmf_rate: Decimal,
    pub(crate) freight_rates: FreightRates,
    pub(crate) insurance_rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DutyRateRow {
    pub(crate) hs_code: String,
    pub(crate) rate: Decimal,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ChapterDefaultRow {
    pub(crate) chapter: String,
    pub(crate) rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TradeRemedyRow {
    pub(crate) hs_prefix: String,
    pub(crate) origin: String,
    #[serde(default)]
    pub(crate) destination: Option<String>,
    pub(crate) rate: Decimal,
    #[serde(default)]
    pub(crate) program: Option<String>,
}

/// Ad valorem freight estimate per shipping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct FreightRates {
    pub ocean: Decimal,
    pub air: Decimal,
    pub rail: Decimal,
}

pub(crate) fn parse_document<R: Read>(reader: R) -> Result<ScheduleDocument, serde_json::Error> {
    serde_json::from_reader(reader)
}

/// Reads `hs_code,rate[,description]` rows. Rates are parsed from text so they stay exact.
pub(crate) fn parse_duty_csv<R: Read>(reader: R) -> Result<Vec<DutyCsvRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<DutyCsvRow>().collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct DutyCsvRow {
    pub(crate) hs_code: String,
    pub(crate) rate: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) description: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
        serde::de::Error::custom(format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
    })
}

/// Digits of an HS key, or `None` when it contains anything but digits and dots.
pub(crate) fn hs_key_digits(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    Some(trimmed.chars().filter(char::is_ascii_digit).collect())
}
