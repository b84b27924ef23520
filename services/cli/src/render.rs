use landed_cost::engine::{percent, CostBreakdown, DutyRateSource, FreightBasis};
use landed_cost::wire::CalculateResponse;
use rust_decimal::RoundingStrategy;
use std::fmt::{self, Write};

/// Fraction digits shown for the effective duty rate.
const EFFECTIVE_RATE_DP: u32 = 6;

pub(crate) fn render_json(breakdown: &CostBreakdown) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&CalculateResponse::from(breakdown))
}

pub(crate) fn render_text(breakdown: &CostBreakdown) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    write_report(&mut out, breakdown).ok();
    out
}

fn write_report(out: &mut impl Write, breakdown: &CostBreakdown) -> fmt::Result {
    let duty_basis = match breakdown.duty_rate_source {
        DutyRateSource::Exact => "exact line",
        DutyRateSource::Subheading => "subheading",
        DutyRateSource::ChapterDefault => "chapter default",
    };
    let freight_basis = match breakdown.freight_basis {
        FreightBasis::Estimate => "estimate",
        FreightBasis::CarrierQuote => "carrier quote",
    };
    let remedy_label = breakdown
        .trade_remedy_program
        .as_deref()
        .unwrap_or("trade remedy");
    let effective_rate = breakdown
        .effective_duty_rate
        .round_dp_with_strategy(EFFECTIVE_RATE_DP, RoundingStrategy::MidpointAwayFromZero);

    writeln!(
        out,
        "Landed cost ({} {}, rate table {})",
        breakdown.shipping_mode, breakdown.incoterm, breakdown.rate_table_version
    )?;
    writeln!(out, "- Product value:      {:>14.2}", breakdown.product_value)?;
    writeln!(
        out,
        "- Base duty:          {:>14.2}  ({}%, {})",
        breakdown.base_duty,
        percent(breakdown.base_duty_rate),
        duty_basis
    )?;
    writeln!(
        out,
        "- Trade remedy:       {:>14.2}  ({}%, {})",
        breakdown.trade_remedy_duty,
        percent(breakdown.trade_remedy_rate),
        remedy_label
    )?;
    writeln!(out, "- MPF:                {:>14.2}", breakdown.mpf)?;
    writeln!(out, "- HMF:                {:>14.2}", breakdown.hmf)?;
    writeln!(
        out,
        "- Freight:            {:>14.2}  ({})",
        breakdown.freight, freight_basis
    )?;
    writeln!(out, "- Insurance:          {:>14.2}", breakdown.insurance)?;
    writeln!(out, "Total duties & fees:  {:>14.2}", breakdown.total_duties)?;
    writeln!(out, "Total landed cost:    {:>14.2}", breakdown.total_landed_cost)?;
    writeln!(
        out,
        "Cost per unit:        {:>14.2}  ({} units)",
        breakdown.cost_per_unit, breakdown.quantity
    )?;
    writeln!(out, "Effective duty rate:  {:>13}%", percent(effective_rate))?;

    if breakdown.warnings.is_empty() {
        writeln!(out, "\nWarnings: none")?;
    } else {
        writeln!(out, "\nWarnings")?;
        for warning in &breakdown.warnings {
            writeln!(out, "- {warning}")?;
        }
    }
    Ok(())
}
