use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::domain::Shipment;
use super::rates::ResolvedRates;

/// Rounds a monetary amount to cents, half-up.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Where the freight figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightBasis {
    Estimate,
    CarrierQuote,
}

/// Which MPF bound, if any, the computed fee landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MpfBound {
    Floor,
    Ceiling,
}

/// Individually rounded fee lines. Each depends only on the product value and its own rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeeLines {
    pub(crate) base_duty: Decimal,
    pub(crate) trade_remedy_duty: Decimal,
    pub(crate) mpf: Decimal,
    pub(crate) mpf_bound: Option<MpfBound>,
    pub(crate) hmf: Decimal,
    pub(crate) freight: Decimal,
    pub(crate) freight_basis: FreightBasis,
    pub(crate) insurance: Decimal,
}

pub(crate) fn compute_fees(shipment: &Shipment, rates: &ResolvedRates) -> FeeLines {
    let value = shipment.product_value;
    let ad_valorem = |rate: Decimal| round2(value * rate);

    let mpf = ad_valorem(rates.mpf.rate).clamp(rates.mpf.min_fee, rates.mpf.max_fee);
    let mpf_bound = if mpf == rates.mpf.min_fee {
        Some(MpfBound::Floor)
    } else if mpf == rates.mpf.max_fee {
        Some(MpfBound::Ceiling)
    } else {
        None
    };

    let (freight, freight_basis) = match shipment.freight_quote {
        Some(quote) => (round2(quote), FreightBasis::CarrierQuote),
        None => (ad_valorem(rates.freight_rate), FreightBasis::Estimate),
    };

    FeeLines {
        base_duty: ad_valorem(rates.base_duty.rate),
        trade_remedy_duty: ad_valorem(rates.trade_remedy_rate()),
        mpf,
        mpf_bound,
        hmf: rates.hmf_rate.map(ad_valorem).unwrap_or(Decimal::ZERO),
        freight,
        freight_basis,
        insurance: ad_valorem(rates.insurance_rate),
    }
}
