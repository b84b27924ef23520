use rust_decimal::Decimal;

/// Error raised when a request cannot be priced.
///
/// Every variant carries the offending field and value so callers can render an actionable
/// message. Nothing here is transient; the engine performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("invalid hs_code '{value}': {reason}")]
    InvalidHsCode { value: String, reason: &'static str },
    #[error("invalid {field} '{value}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: Decimal,
        reason: &'static str,
    },
    #[error("invalid quantity '{value}': must be a whole number of at least 1")]
    InvalidQuantity { value: String },
    #[error("invalid {field} '{value}': not a recognized ISO-3166 alpha-2 country code")]
    InvalidCountry { field: &'static str, value: String },
    #[error("invalid shipping_mode '{value}': expected one of ocean, air, rail")]
    InvalidShippingMode { value: String },
    #[error("invalid incoterm '{value}': expected an Incoterms 2020 code such as FOB or CIF")]
    InvalidIncoterm { value: String },
    #[error("no duty rate for HS code {hs_code} in rate table {version}")]
    UnknownHsCode { hs_code: String, version: String },
    #[error("rate table {version} is invalid: {detail}")]
    InvalidRateTable { version: String, detail: String },
}

impl CalculationError {
    /// Stable snake_case identifier used in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationError::InvalidHsCode { .. } => "invalid_hs_code",
            CalculationError::InvalidValue { .. } => "invalid_value",
            CalculationError::InvalidQuantity { .. } => "invalid_quantity",
            CalculationError::InvalidCountry { .. } => "invalid_country",
            CalculationError::InvalidShippingMode { .. } => "invalid_shipping_mode",
            CalculationError::InvalidIncoterm { .. } => "invalid_incoterm",
            CalculationError::UnknownHsCode { .. } => "unknown_hs_code",
            CalculationError::InvalidRateTable { .. } => "invalid_rate_table",
        }
    }

    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            CalculationError::InvalidHsCode { .. } | CalculationError::UnknownHsCode { .. } => {
                "hs_code"
            }
            CalculationError::InvalidValue { field, .. }
            | CalculationError::InvalidCountry { field, .. } => *field,
            CalculationError::InvalidQuantity { .. } => "quantity",
            CalculationError::InvalidShippingMode { .. } => "shipping_mode",
            CalculationError::InvalidIncoterm { .. } => "incoterm",
            CalculationError::InvalidRateTable { .. } => "rate_table",
        }
    }

    /// Whether the caller can fix the error by correcting the request.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            CalculationError::UnknownHsCode { .. } | CalculationError::InvalidRateTable { .. }
        )
    }
}
