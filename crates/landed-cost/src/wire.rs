//! Snake_case JSON contract shared with transport adapters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::{CalculationError, CostBreakdown, Incoterm, LandedCostRequest};

fn default_shipping_mode() -> String {
    "ocean".to_string()
}

fn default_incoterm() -> String {
    "FOB".to_string()
}

/// Request body as it arrives on the wire.
///
/// `quantity` stays a raw JSON number so a fractional value surfaces as `InvalidQuantity`
/// instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CalculateRequest {
    pub hs_code: String,
    pub product_value: Decimal,
    pub quantity: serde_json::Number,
    pub origin_country: String,
    pub destination_country: String,
    #[serde(default = "default_shipping_mode")]
    pub shipping_mode: String,
    #[serde(default = "default_incoterm")]
    pub incoterm: String,
    #[serde(default)]
    pub freight_quote: Option<Decimal>,
}

impl TryFrom<CalculateRequest> for LandedCostRequest {
    type Error = CalculationError;

    fn try_from(body: CalculateRequest) -> Result<Self, Self::Error> {
        let quantity = whole_number(&body.quantity).ok_or_else(|| {
            CalculationError::InvalidQuantity {
                value: body.quantity.to_string(),
            }
        })?;

        Ok(LandedCostRequest {
            hs_code: body.hs_code,
            product_value: body.product_value,
            quantity,
            origin_country: body.origin_country,
            destination_country: body.destination_country,
            shipping_mode: body.shipping_mode,
            incoterm: body.incoterm,
            freight_quote: body.freight_quote,
        })
    }
}

fn whole_number(number: &serde_json::Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    let value = number.as_f64()?;
    let in_range = value >= i64::MIN as f64 && value <= i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownBody {
    #[serde(with = "rust_decimal::serde::float")]
    pub product_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_duty: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_duty_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub section_301: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub section_301_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub mpf: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub hmf: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub freight: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub insurance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_duties: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_freight: Decimal,
}

/// Response body; monetary values serialize as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculateResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_landed_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost_per_unit: Decimal,
    pub breakdown: BreakdownBody,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_duty_rate: Decimal,
    pub warnings: Vec<String>,
    pub incoterm: Incoterm,
    pub rate_table_version: String,
}

impl From<&CostBreakdown> for CalculateResponse {
    fn from(breakdown: &CostBreakdown) -> Self {
        Self {
            total_landed_cost: breakdown.total_landed_cost,
            cost_per_unit: breakdown.cost_per_unit,
            breakdown: BreakdownBody {
                product_value: breakdown.product_value,
                base_duty: breakdown.base_duty,
                base_duty_rate: breakdown.base_duty_rate,
                section_301: breakdown.trade_remedy_duty,
                section_301_rate: breakdown.trade_remedy_rate,
                mpf: breakdown.mpf,
                hmf: breakdown.hmf,
                freight: breakdown.freight,
                insurance: breakdown.insurance,
                total_duties: breakdown.total_duties,
                total_freight: breakdown.total_freight,
            },
            effective_duty_rate: breakdown.effective_duty_rate,
            warnings: breakdown.warnings.clone(),
            incoterm: breakdown.incoterm,
            rate_table_version: breakdown.rate_table_version.clone(),
        }
    }
}

/// Error payload: `{ "error", "kind", "field" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub field: &'static str,
}

impl From<&CalculationError> for ErrorBody {
    fn from(error: &CalculationError) -> Self {
        Self {
            error: error.to_string(),
            kind: error.kind(),
            field: error.field(),
        }
    }
}
