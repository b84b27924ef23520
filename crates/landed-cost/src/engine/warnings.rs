use rust_decimal::Decimal;

use super::domain::ShippingMode;
use super::fees::{FeeLines, FreightBasis, MpfBound};
use super::rates::{DutyRateSource, ResolvedRates};

/// Builds advisory notes from already computed lines, in a fixed order.
pub(crate) fn collect_warnings(
    mode: ShippingMode,
    chapter: &str,
    rates: &ResolvedRates,
    fees: &FeeLines,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if fees.trade_remedy_duty > Decimal::ZERO {
        let rate = percent(rates.trade_remedy_rate());
        let program = rates
            .trade_remedy
            .as_ref()
            .and_then(|remedy| remedy.program.as_deref());
        warnings.push(match program {
            Some(program) => format!("Trade remedy tariff applies: {rate}% ({program})"),
            None => format!("Trade remedy tariff applies: {rate}%"),
        });
    }

    match fees.mpf_bound {
        Some(MpfBound::Floor) => warnings.push(format!(
            "Merchandise processing fee clamped to the minimum of {:.2}",
            rates.mpf.min_fee
        )),
        Some(MpfBound::Ceiling) => warnings.push(format!(
            "Merchandise processing fee clamped to the maximum of {:.2}",
            rates.mpf.max_fee
        )),
        None => {}
    }

    if mode == ShippingMode::Air && fees.freight_basis == FreightBasis::Estimate {
        warnings.push(format!(
            "Air freight is a flat-rate estimate ({}% of product value), not a carrier quote",
            percent(rates.freight_rate)
        ));
    }

    if rates.base_duty.source == DutyRateSource::ChapterDefault {
        warnings.push(format!(
            "Base duty rate uses the chapter {chapter} default; classification confidence is low"
        ));
    }

    warnings
}

/// Formats a fraction as a percentage without trailing zeros (0.25 -> "25").
pub fn percent(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED).normalize().to_string()
}
