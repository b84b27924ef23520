use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::countries::is_iso_alpha2;
use super::error::CalculationError;

/// Largest declared value or freight quote the engine accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Shipment as submitted by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedCostRequest {
    pub hs_code: String,
    /// Declared value of the whole shipment (already multiplied by quantity).
    pub product_value: Decimal,
    pub quantity: i64,
    pub origin_country: String,
    pub destination_country: String,
    pub shipping_mode: String,
    pub incoterm: String,
    /// Carrier-quoted freight; replaces the ad valorem estimate when present.
    #[serde(default)]
    pub freight_quote: Option<Decimal>,
}

/// Harmonized System classification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HsCode {
    code: String,
    #[serde(skip)]
    digits: String,
}

impl HsCode {
    pub const MIN_DIGITS: usize = 4;
    pub const MAX_DIGITS: usize = 10;

    pub fn parse(raw: &str) -> Result<Self, CalculationError> {
        let invalid = |reason| CalculationError::InvalidHsCode {
            value: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if !raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid("may only contain digits and dots"));
        }

        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < Self::MIN_DIGITS {
            return Err(invalid("needs at least 4 digits"));
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(invalid("has more than 10 digits"));
        }

        Ok(Self {
            code: raw.to_string(),
            digits,
        })
    }

    /// Code as supplied, dots preserved.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Significant digits with separators removed; rate tables key on this form.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Two-digit HS chapter.
    pub fn chapter(&self) -> &str {
        &self.digits[..2]
    }
}

impl fmt::Display for HsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Upper-case ISO-3166-1 alpha-2 country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, CalculationError> {
        let code = raw.trim().to_ascii_uppercase();
        if is_iso_alpha2(&code) {
            Ok(Self(code))
        } else {
            Err(CalculationError::InvalidCountry {
                field,
                value: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMode {
    Ocean,
    Air,
    Rail,
}

impl ShippingMode {
    pub const ALL: [ShippingMode; 3] = [ShippingMode::Ocean, ShippingMode::Air, ShippingMode::Rail];

    pub fn label(&self) -> &'static str {
        match self {
            ShippingMode::Ocean => "ocean",
            ShippingMode::Air => "air",
            ShippingMode::Rail => "rail",
        }
    }
}

impl FromStr for ShippingMode {
    type Err = CalculationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ocean" => Ok(ShippingMode::Ocean),
            "air" => Ok(ShippingMode::Air),
            "rail" => Ok(ShippingMode::Rail),
            _ => Err(CalculationError::InvalidShippingMode {
                value: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for ShippingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Incoterms 2020 trade terms. Accepted and echoed; they do not alter the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Incoterm {
    Exw,
    Fca,
    Cpt,
    Cip,
    Dap,
    Dpu,
    Ddp,
    Fas,
    Fob,
    Cfr,
    Cif,
}

impl Incoterm {
    pub fn code(&self) -> &'static str {
        match self {
            Incoterm::Exw => "EXW",
            Incoterm::Fca => "FCA",
            Incoterm::Cpt => "CPT",
            Incoterm::Cip => "CIP",
            Incoterm::Dap => "DAP",
            Incoterm::Dpu => "DPU",
            Incoterm::Ddp => "DDP",
            Incoterm::Fas => "FAS",
            Incoterm::Fob => "FOB",
            Incoterm::Cfr => "CFR",
            Incoterm::Cif => "CIF",
        }
    }
}

impl FromStr for Incoterm {
    type Err = CalculationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let term = match raw.trim().to_ascii_uppercase().as_str() {
            "EXW" => Incoterm::Exw,
            "FCA" => Incoterm::Fca,
            "CPT" => Incoterm::Cpt,
            "CIP" => Incoterm::Cip,
            "DAP" => Incoterm::Dap,
            "DPU" => Incoterm::Dpu,
            "DDP" => Incoterm::Ddp,
            "FAS" => Incoterm::Fas,
            "FOB" => Incoterm::Fob,
            "CFR" => Incoterm::Cfr,
            "CIF" => Incoterm::Cif,
            _ => {
                return Err(CalculationError::InvalidIncoterm {
                    value: raw.to_string(),
                })
            }
        };
        Ok(term)
    }
}

impl fmt::Display for Incoterm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A request that passed validation, built by [`Shipment::from_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    pub hs_code: HsCode,
    pub product_value: Decimal,
    pub quantity: u32,
    pub origin: CountryCode,
    pub destination: CountryCode,
    pub mode: ShippingMode,
    pub incoterm: Incoterm,
    pub freight_quote: Option<Decimal>,
}

impl Shipment {
    /// Validates every field in a fixed order, so a given request always fails the same way.
    pub fn from_request(request: &LandedCostRequest) -> Result<Self, CalculationError> {
        let hs_code = HsCode::parse(&request.hs_code)?;
        let product_value = check_amount("product_value", request.product_value)?;
        let freight_quote = request
            .freight_quote
            .map(|quote| check_amount("freight_quote", quote))
            .transpose()?;

        let quantity = u32::try_from(request.quantity)
            .ok()
            .filter(|quantity| *quantity >= 1)
            .ok_or_else(|| CalculationError::InvalidQuantity {
                value: request.quantity.to_string(),
            })?;

        let origin = CountryCode::parse("origin_country", &request.origin_country)?;
        let destination = CountryCode::parse("destination_country", &request.destination_country)?;
        let mode = request.shipping_mode.parse::<ShippingMode>()?;
        let incoterm = request.incoterm.parse::<Incoterm>()?;

        Ok(Self {
            hs_code,
            product_value,
            quantity,
            origin,
            destination,
            mode,
            incoterm,
            freight_quote,
        })
    }
}

fn check_amount(field: &'static str, value: Decimal) -> Result<Decimal, CalculationError> {
    if value < Decimal::ZERO {
        return Err(CalculationError::InvalidValue {
            field,
            value,
            reason: "must be zero or greater",
        });
    }
    if value > MAX_AMOUNT {
        return Err(CalculationError::InvalidValue {
            field,
            value,
            reason: "exceeds the supported maximum of 1000000000000000",
        });
    }
    Ok(value)
}
