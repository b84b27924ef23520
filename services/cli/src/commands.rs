use crate::infra::{load_schedule, parse_decimal, read_input, OutputFormat, RateSourceArgs};
use crate::render::{render_json, render_text};
use clap::Args;
use landed_cost::config::AppConfig;
use landed_cost::engine::{
    calculate, percent, CalculationError, DutyRateSource, HsCode, LandedCostRequest, RateTable,
};
use landed_cost::error::AppError;
use landed_cost::tariff::TariffSchedule;
use landed_cost::wire::{CalculateRequest, ErrorBody};
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// JSON request body path, or '-' to read stdin
    #[arg(long, default_value = "-")]
    pub(crate) request: String,
    #[command(flatten)]
    pub(crate) source: RateSourceArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// HS classification code (4-10 digits, dots optional)
    #[arg(long)]
    pub(crate) hs_code: String,
    /// Declared value of the whole shipment
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) value: Decimal,
    #[arg(long)]
    pub(crate) quantity: i64,
    /// ISO-3166 alpha-2 origin country
    #[arg(long)]
    pub(crate) origin: String,
    /// ISO-3166 alpha-2 destination country
    #[arg(long)]
    pub(crate) destination: String,
    /// ocean, air, or rail
    #[arg(long, default_value = "ocean")]
    pub(crate) mode: String,
    #[arg(long, default_value = "FOB")]
    pub(crate) incoterm: String,
    /// Carrier-quoted freight; replaces the ad valorem estimate
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) freight_quote: Option<Decimal>,
    #[command(flatten)]
    pub(crate) source: RateSourceArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct RatesArgs {
    #[command(flatten)]
    pub(crate) source: RateSourceArgs,
    /// Also show the duty line that would price this HS code
    #[arg(long)]
    pub(crate) hs_code: Option<String>,
}

pub(crate) fn run_calculate(args: CalculateArgs, config: &AppConfig) -> Result<(), AppError> {
    let schedule = load_schedule(&args.source, config)?;
    let raw = read_input(&args.request)?;
    let output = price_body(&raw, &schedule, args.format)?;
    println!("{output}");
    Ok(())
}

pub(crate) fn run_quote(args: QuoteArgs, config: &AppConfig) -> Result<(), AppError> {
    let schedule = load_schedule(&args.source, config)?;
    let request = LandedCostRequest {
        hs_code: args.hs_code,
        product_value: args.value,
        quantity: args.quantity,
        origin_country: args.origin,
        destination_country: args.destination,
        shipping_mode: args.mode,
        incoterm: args.incoterm,
        freight_quote: args.freight_quote,
    };
    let output = price(&request, &schedule, args.format)?;
    println!("{output}");
    Ok(())
}

pub(crate) fn run_rates_check(args: RatesArgs, config: &AppConfig) -> Result<(), AppError> {
    let schedule = load_schedule(&args.source, config)?;
    println!("{}", summarize_schedule(&schedule));
    if let Some(raw) = &args.hs_code {
        println!("{}", lookup_line(&schedule, raw)?);
    }
    Ok(())
}

/// Parses a wire body and prices it.
pub(crate) fn price_body<T: RateTable + ?Sized>(
    raw: &str,
    table: &T,
    format: OutputFormat,
) -> Result<String, AppError> {
    let body: CalculateRequest = serde_json::from_str(raw)?;
    let request = LandedCostRequest::try_from(body).map_err(|err| report(err, format))?;
    price(&request, table, format)
}

fn price<T: RateTable + ?Sized>(
    request: &LandedCostRequest,
    table: &T,
    format: OutputFormat,
) -> Result<String, AppError> {
    let breakdown = calculate(request, table).map_err(|err| report(err, format))?;
    match format {
        OutputFormat::Json => Ok(render_json(&breakdown)?),
        OutputFormat::Text => Ok(render_text(&breakdown)),
    }
}

/// Echoes the machine-readable error body on stdout for JSON callers before failing.
fn report(err: CalculationError, format: OutputFormat) -> AppError {
    if format == OutputFormat::Json {
        if let Ok(body) = serde_json::to_string(&ErrorBody::from(&err)) {
            println!("{body}");
        }
    }
    AppError::from(err)
}

pub(crate) fn summarize_schedule(schedule: &TariffSchedule) -> String {
    let freight = schedule.freight_rates();
    let mpf = schedule.mpf_params();
    format!(
        "Tariff schedule {} (effective {})\n\
         - duty lines: {}\n\
         - chapter defaults: {}\n\
         - trade remedies: {}\n\
         - mpf: rate {}, bounds {:.2}..{:.2}\n\
         - hmf rate: {}\n\
         - freight rates: ocean {}, air {}, rail {}\n\
         - insurance rate: {}",
        schedule.version(),
        schedule.effective_date(),
        schedule.duty_line_count(),
        schedule.chapter_default_count(),
        schedule.trade_remedy_count(),
        mpf.rate,
        mpf.min_fee,
        mpf.max_fee,
        schedule.hmf_rate(),
        freight.ocean,
        freight.air,
        freight.rail,
        schedule.insurance_rate(),
    )
}

/// Shows which duty line prices `raw`, with its description when the schedule has one.
pub(crate) fn lookup_line(schedule: &TariffSchedule, raw: &str) -> Result<String, AppError> {
    let hs_code = HsCode::parse(raw)?;
    let duty = schedule.base_duty_rate(&hs_code).ok_or_else(|| {
        CalculationError::UnknownHsCode {
            hs_code: hs_code.to_string(),
            version: schedule.version().to_string(),
        }
    })?;
    let basis = match duty.source {
        DutyRateSource::Exact => "exact line",
        DutyRateSource::Subheading => "subheading",
        DutyRateSource::ChapterDefault => "chapter default",
    };
    let description = schedule.describe(&hs_code).unwrap_or("no description");
    Ok(format!(
        "HS {hs_code}: base duty {}% ({basis}) - {description}",
        percent(duty.rate)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::reference_schedule;

    #[test]
    fn prices_wire_body_as_json() {
        let raw = r#"{
            "hs_code": "8504.40.95",
            "product_value": 10000,
            "quantity": 100,
            "origin_country": "CN",
            "destination_country": "US"
        }"#;

        let output = price_body(raw, &reference_schedule(), OutputFormat::Json).expect("priced");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json output");

        assert_eq!(value["total_landed_cost"].as_f64(), Some(13097.14));
        assert_eq!(value["incoterm"], "FOB");
    }

    #[test]
    fn fractional_quantity_surfaces_calculation_error() {
        let raw = r#"{
            "hs_code": "8504.40.95",
            "product_value": 10,
            "quantity": 1.5,
            "origin_country": "CN",
            "destination_country": "US"
        }"#;

        let error = price_body(raw, &reference_schedule(), OutputFormat::Text)
            .expect_err("rejected");

        assert_eq!(
            error.calculation().map(|err| err.kind()),
            Some("invalid_quantity")
        );
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let error = price_body("{", &reference_schedule(), OutputFormat::Text).expect_err("bad");
        assert!(matches!(error, AppError::Json(_)));
    }

    #[test]
    fn summary_reports_counts() {
        let summary = summarize_schedule(&reference_schedule());

        assert!(summary.starts_with("Tariff schedule reference-2025.1 (effective 2025-01-01)"));
        assert!(summary.contains("- trade remedies: 4"));
        assert!(summary.contains("bounds 27.23..528.33"));
    }

    #[test]
    fn lookup_names_the_matching_line() {
        let schedule = reference_schedule();

        let line = lookup_line(&schedule, "6110.20.20").expect("line found");
        assert_eq!(
            line,
            "HS 6110.20.20: base duty 16.5% (subheading) - Cotton sweaters and pullovers"
        );

        let fallback = lookup_line(&schedule, "9403.60").expect("chapter default");
        assert_eq!(
            fallback,
            "HS 9403.60: base duty 3.3% (chapter default) - no description"
        );
    }

    #[test]
    fn lookup_rejects_unknown_and_malformed_codes() {
        let schedule = reference_schedule();

        let unknown = lookup_line(&schedule, "0101.21").expect_err("no chapter 01");
        assert_eq!(unknown.calculation().map(|err| err.kind()), Some("unknown_hs_code"));

        let malformed = lookup_line(&schedule, " 8504").expect_err("whitespace rejected");
        assert_eq!(malformed.calculation().map(|err| err.kind()), Some("invalid_hs_code"));
    }
}
