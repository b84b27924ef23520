use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::engine::{
    CountryCode, DutyRate, DutyRateSource, HsCode, LandedCostRequest, MpfParams, RateTable,
    ShippingMode, TradeRemedy,
};

/// In-memory rate table standing in for a loaded schedule.
#[derive(Debug, Clone)]
pub(super) struct FixedRates {
    pub(super) version: String,
    pub(super) lines: BTreeMap<String, Decimal>,
    pub(super) chapters: BTreeMap<String, Decimal>,
    pub(super) remedies: Vec<(String, String, TradeRemedy)>,
    pub(super) mpf: MpfParams,
    pub(super) hmf_rate: Decimal,
    pub(super) freight: [Decimal; 3],
    pub(super) insurance_rate: Decimal,
}

impl RateTable for FixedRates {
    fn version(&self) -> &str {
        &self.version
    }

    fn base_duty_rate(&self, hs_code: &HsCode) -> Option<DutyRate> {
        let digits = hs_code.digits();
        for len in (HsCode::MIN_DIGITS..=digits.len()).rev() {
            if let Some(rate) = self.lines.get(&digits[..len]) {
                let source = if len == digits.len() {
                    DutyRateSource::Exact
                } else {
                    DutyRateSource::Subheading
                };
                return Some(DutyRate {
                    rate: *rate,
                    source,
                });
            }
        }
        self.chapters.get(hs_code.chapter()).map(|rate| DutyRate {
            rate: *rate,
            source: DutyRateSource::ChapterDefault,
        })
    }

    fn trade_remedy_rate(
        &self,
        hs_code: &HsCode,
        origin: &CountryCode,
        _destination: &CountryCode,
    ) -> Option<TradeRemedy> {
        self.remedies
            .iter()
            .find(|(chapter, country, _)| {
                chapter == hs_code.chapter() && country == origin.as_str()
            })
            .map(|(_, _, remedy)| remedy.clone())
    }

    fn mpf_params(&self) -> MpfParams {
        self.mpf
    }

    fn hmf_rate(&self) -> Decimal {
        self.hmf_rate
    }

    fn freight_rate(&self, mode: ShippingMode) -> Decimal {
        match mode {
            ShippingMode::Ocean => self.freight[0],
            ShippingMode::Air => self.freight[1],
            ShippingMode::Rail => self.freight[2],
        }
    }

    fn insurance_rate(&self) -> Decimal {
        self.insurance_rate
    }
}

pub(super) fn rates() -> FixedRates {
    let mut lines = BTreeMap::new();
    lines.insert("850440".to_string(), dec!(0));
    lines.insert("6110200000".to_string(), dec!(0.165));
    lines.insert("7323".to_string(), dec!(0.034));

    let mut chapters = BTreeMap::new();
    chapters.insert("85".to_string(), dec!(0.026));
    chapters.insert("61".to_string(), dec!(0.12));

    FixedRates {
        version: "test-2025.1".to_string(),
        lines,
        chapters,
        remedies: vec![(
            "85".to_string(),
            "CN".to_string(),
            TradeRemedy {
                rate: dec!(0.25),
                program: Some("Section 301".to_string()),
            },
        )],
        mpf: MpfParams {
            rate: dec!(0.003464),
            min_fee: dec!(27.23),
            max_fee: dec!(528.33),
        },
        hmf_rate: dec!(0.00125),
        freight: [dec!(0.05), dec!(0.18), dec!(0.07)],
        insurance_rate: dec!(0.005),
    }
}

pub(super) fn request(hs_code: &str, product_value: Decimal, origin: &str) -> LandedCostRequest {
    LandedCostRequest {
        hs_code: hs_code.to_string(),
        product_value,
        quantity: 100,
        origin_country: origin.to_string(),
        destination_country: "US".to_string(),
        shipping_mode: "ocean".to_string(),
        incoterm: "FOB".to_string(),
        freight_quote: None,
    }
}

pub(super) fn air_request(product_value: Decimal) -> LandedCostRequest {
    LandedCostRequest {
        quantity: 1,
        shipping_mode: "air".to_string(),
        ..request("8504.40.95", product_value, "DE")
    }
}
