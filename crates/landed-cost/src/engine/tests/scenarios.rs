use super::common::*;
use crate::engine::{calculate, CalculationError, FreightBasis, Incoterm};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn china_origin_pays_trade_remedy() {
    let breakdown = calculate(&request("8504.40.95", dec!(10000), "CN"), &rates()).expect("priced");

    assert_eq!(breakdown.trade_remedy_duty, dec!(2500.00));
    assert_eq!(breakdown.trade_remedy_rate, dec!(0.25));
    assert_eq!(breakdown.base_duty, Decimal::ZERO);
    assert_eq!(breakdown.mpf, dec!(34.64));
    assert_eq!(breakdown.hmf, dec!(12.50));
    assert_eq!(breakdown.freight, dec!(500.00));
    assert_eq!(breakdown.insurance, dec!(50.00));
    assert_eq!(breakdown.total_landed_cost, dec!(13097.14));
    assert_eq!(breakdown.cost_per_unit, dec!(130.97));
    assert_eq!(breakdown.effective_duty_rate, dec!(0.25));
    assert_eq!(breakdown.total_duties, dec!(2547.14));
    assert_eq!(breakdown.total_freight, dec!(550.00));
    assert_eq!(breakdown.incoterm, Incoterm::Fob);
    assert_eq!(breakdown.rate_table_version, "test-2025.1");
    assert_eq!(
        breakdown.warnings,
        vec!["Trade remedy tariff applies: 25% (Section 301)".to_string()]
    );
}

#[test]
fn german_origin_pays_no_trade_remedy() {
    let breakdown = calculate(&request("8504.40.95", dec!(10000), "DE"), &rates()).expect("priced");

    assert_eq!(breakdown.trade_remedy_duty, Decimal::ZERO);
    assert_eq!(breakdown.trade_remedy_program, None);
    assert!(breakdown.hmf > Decimal::ZERO);
    assert!(breakdown.warnings.is_empty());
}

#[test]
fn small_air_shipment_hits_mpf_floor() {
    let breakdown = calculate(&air_request(dec!(100)), &rates()).expect("priced");

    assert_eq!(breakdown.mpf, dec!(27.23));
    assert_eq!(breakdown.hmf, Decimal::ZERO);
    assert_eq!(breakdown.freight, dec!(18.00));
    assert_eq!(breakdown.freight_basis, FreightBasis::Estimate);
    assert_eq!(
        breakdown.warnings,
        vec![
            "Merchandise processing fee clamped to the minimum of 27.23".to_string(),
            "Air freight is a flat-rate estimate (18% of product value), not a carrier quote"
                .to_string(),
        ]
    );
}

#[test]
fn zero_quantity_is_rejected() {
    let mut request = request("8504.40.95", dec!(10000), "CN");
    request.quantity = 0;

    assert!(matches!(
        calculate(&request, &rates()),
        Err(CalculationError::InvalidQuantity { .. })
    ));
}

#[test]
fn trade_remedy_without_program_uses_plain_note() {
    let mut table = rates();
    table.remedies[0].2.program = None;

    let breakdown = calculate(&request("8504.40.95", dec!(100), "CN"), &table).expect("priced");

    assert_eq!(breakdown.warnings[0], "Trade remedy tariff applies: 25%");
}
