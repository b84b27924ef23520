use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{CountryCode, HsCode, Shipment, ShippingMode};
use super::error::CalculationError;

/// Upper bound for any ad valorem rate (10,000%).
pub const MAX_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Read-only lookup data the engine prices against.
///
/// Implementations are snapshots: the engine never caches across calls, so handing it a new
/// table is all it takes to apply a refresh.
pub trait RateTable: Send + Sync {
    /// Version label echoed in every breakdown.
    fn version(&self) -> &str;

    /// Ad valorem base duty for the code, or `None` when neither a line nor a chapter default
    /// covers it.
    fn base_duty_rate(&self, hs_code: &HsCode) -> Option<DutyRate>;

    /// Origin-conditional surcharge. `None` means no remedy applies.
    fn trade_remedy_rate(
        &self,
        hs_code: &HsCode,
        origin: &CountryCode,
        destination: &CountryCode,
    ) -> Option<TradeRemedy>;

    fn mpf_params(&self) -> MpfParams;

    /// Harbor maintenance fee rate; only charged on ocean shipments.
    fn hmf_rate(&self) -> Decimal;

    /// Freight estimate as a fraction of product value.
    fn freight_rate(&self, mode: ShippingMode) -> Decimal;

    fn insurance_rate(&self) -> Decimal;
}

/// Resolved base duty and how specific the match was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyRate {
    pub rate: Decimal,
    pub source: DutyRateSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyRateSource {
    /// A tariff line matching every digit of the code.
    Exact,
    /// A shorter tariff line (heading or subheading) that prefixes the code.
    Subheading,
    /// The chapter-wide default rate.
    ChapterDefault,
}

/// Trade-remedy surcharge and the program that imposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRemedy {
    pub rate: Decimal,
    #[serde(default)]
    pub program: Option<String>,
}

/// Merchandise processing fee: ad valorem, clamped to `[min_fee, max_fee]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpfParams {
    pub rate: Decimal,
    pub min_fee: Decimal,
    pub max_fee: Decimal,
}

/// Everything the fee formulas need, pulled from the table once per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedRates {
    pub(crate) version: String,
    pub(crate) base_duty: DutyRate,
    pub(crate) trade_remedy: Option<TradeRemedy>,
    pub(crate) mpf: MpfParams,
    /// `None` for modes that do not pay HMF.
    pub(crate) hmf_rate: Option<Decimal>,
    pub(crate) freight_rate: Decimal,
    pub(crate) insurance_rate: Decimal,
}

impl ResolvedRates {
    pub(crate) fn trade_remedy_rate(&self) -> Decimal {
        self.trade_remedy
            .as_ref()
            .map(|remedy| remedy.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

pub(crate) fn resolve_rates<T: RateTable + ?Sized>(
    shipment: &Shipment,
    table: &T,
) -> Result<ResolvedRates, CalculationError> {
    let version = table.version().to_string();

    let base_duty =
        table
            .base_duty_rate(&shipment.hs_code)
            .ok_or_else(|| CalculationError::UnknownHsCode {
                hs_code: shipment.hs_code.to_string(),
                version: version.clone(),
            })?;

    let trade_remedy = table
        .trade_remedy_rate(&shipment.hs_code, &shipment.origin, &shipment.destination)
        .filter(|remedy| !remedy.rate.is_zero());

    let mpf = table.mpf_params();
    let hmf_rate = match shipment.mode {
        ShippingMode::Ocean => Some(table.hmf_rate()),
        ShippingMode::Air | ShippingMode::Rail => None,
    };

    let resolved = ResolvedRates {
        base_duty,
        trade_remedy,
        mpf,
        hmf_rate,
        freight_rate: table.freight_rate(shipment.mode),
        insurance_rate: table.insurance_rate(),
        version,
    };
    resolved.check()?;
    Ok(resolved)
}

impl ResolvedRates {
    fn check(&self) -> Result<(), CalculationError> {
        let mut rates = vec![
            ("base duty rate", self.base_duty.rate),
            ("trade remedy rate", self.trade_remedy_rate()),
            ("mpf rate", self.mpf.rate),
            ("freight rate", self.freight_rate),
            ("insurance rate", self.insurance_rate),
        ];
        if let Some(hmf) = self.hmf_rate {
            rates.push(("hmf rate", hmf));
        }

        for (label, rate) in rates {
            if rate < Decimal::ZERO || rate > MAX_RATE {
                return Err(self.invalid(format!("{label} {rate} is outside 0..={MAX_RATE}")));
            }
        }

        let MpfParams {
            min_fee, max_fee, ..
        } = self.mpf;
        if min_fee < Decimal::ZERO || max_fee > super::domain::MAX_AMOUNT {
            return Err(self.invalid(format!(
                "mpf bounds {min_fee}..{max_fee} must be non-negative and within range"
            )));
        }
        if min_fee > max_fee {
            return Err(self.invalid(format!(
                "mpf minimum {min_fee} exceeds maximum {max_fee}"
            )));
        }
        Ok(())
    }

    fn invalid(&self, detail: String) -> CalculationError {
        CalculationError::InvalidRateTable {
            version: self.version.clone(),
            detail,
        }
    }
}
