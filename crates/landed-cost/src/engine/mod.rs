//! Landed-cost calculation: validation, rate resolution, fee formulas, aggregation, warnings.

mod countries;
mod domain;
mod error;
mod fees;
mod rates;
mod warnings;

#[cfg(test)]
mod tests;

pub use domain::{
    CountryCode, HsCode, Incoterm, LandedCostRequest, Shipment, ShippingMode, MAX_AMOUNT,
};
pub use error::CalculationError;
pub use fees::{round2, FreightBasis};
pub use rates::{DutyRate, DutyRateSource, MpfParams, RateTable, TradeRemedy, MAX_RATE};
pub use warnings::percent;

use fees::{compute_fees, FeeLines};
use rates::{resolve_rates, ResolvedRates};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use warnings::collect_warnings;

/// Itemized landed cost for one request. Recomputed on every call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub product_value: Decimal,
    pub base_duty: Decimal,
    pub base_duty_rate: Decimal,
    pub duty_rate_source: DutyRateSource,
    pub trade_remedy_duty: Decimal,
    pub trade_remedy_rate: Decimal,
    pub trade_remedy_program: Option<String>,
    pub mpf: Decimal,
    pub hmf: Decimal,
    pub freight: Decimal,
    pub freight_basis: FreightBasis,
    pub insurance: Decimal,
    /// Base duty, trade remedy, MPF and HMF.
    pub total_duties: Decimal,
    /// Freight and insurance.
    pub total_freight: Decimal,
    pub total_landed_cost: Decimal,
    pub cost_per_unit: Decimal,
    /// `(base_duty + trade_remedy_duty) / product_value` as a fraction; zero for zero value.
    pub effective_duty_rate: Decimal,
    pub quantity: u32,
    pub shipping_mode: ShippingMode,
    pub incoterm: Incoterm,
    pub rate_table_version: String,
    pub warnings: Vec<String>,
}

/// Prices a shipment against a rate table.
///
/// Fails before any arithmetic when the request is invalid, and before building a breakdown
/// when the table has no rate for the HS code.
pub fn calculate<T: RateTable + ?Sized>(
    request: &LandedCostRequest,
    table: &T,
) -> Result<CostBreakdown, CalculationError> {
    let shipment = Shipment::from_request(request)?;
    let rates = resolve_rates(&shipment, table)?;
    let fees = compute_fees(&shipment, &rates);
    let breakdown = assemble(&shipment, rates, fees);

    debug!(
        hs_code = %shipment.hs_code,
        origin = %shipment.origin,
        destination = %shipment.destination,
        mode = %shipment.mode,
        version = %breakdown.rate_table_version,
        total = %breakdown.total_landed_cost,
        warnings = breakdown.warnings.len(),
        "landed cost calculated"
    );

    Ok(breakdown)
}

fn assemble(shipment: &Shipment, rates: ResolvedRates, fees: FeeLines) -> CostBreakdown {
    let warnings = collect_warnings(shipment.mode, shipment.hs_code.chapter(), &rates, &fees);
    let value = shipment.product_value;

    let total_duties = fees.base_duty + fees.trade_remedy_duty + fees.mpf + fees.hmf;
    let total_freight = fees.freight + fees.insurance;
    let total_landed_cost = value
        + fees.base_duty
        + fees.trade_remedy_duty
        + fees.mpf
        + fees.hmf
        + fees.freight
        + fees.insurance;

    let cost_per_unit = round2(total_landed_cost / Decimal::from(shipment.quantity));
    let effective_duty_rate = if value > Decimal::ZERO {
        (fees.base_duty + fees.trade_remedy_duty) / value
    } else {
        Decimal::ZERO
    };

    let trade_remedy_rate = rates.trade_remedy_rate();
    let ResolvedRates {
        version,
        base_duty,
        trade_remedy,
        ..
    } = rates;

    CostBreakdown {
        product_value: value,
        base_duty: fees.base_duty,
        base_duty_rate: base_duty.rate,
        duty_rate_source: base_duty.source,
        trade_remedy_duty: fees.trade_remedy_duty,
        trade_remedy_rate,
        trade_remedy_program: trade_remedy.and_then(|remedy| remedy.program),
        mpf: fees.mpf,
        hmf: fees.hmf,
        freight: fees.freight,
        freight_basis: fees.freight_basis,
        insurance: fees.insurance,
        total_duties,
        total_freight,
        total_landed_cost,
        cost_per_unit,
        effective_duty_rate,
        quantity: shipment.quantity,
        shipping_mode: shipment.mode,
        incoterm: shipment.incoterm,
        rate_table_version: version,
        warnings,
    }
}
