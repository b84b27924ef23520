//! Landed-cost engine for import shipments.
//!
//! [`engine::calculate`] turns a shipment request and a [`engine::RateTable`] into an itemized
//! [`engine::CostBreakdown`]. [`tariff::TariffSchedule`] is the versioned table loaded from
//! configuration data, and [`wire`] carries the snake_case JSON contract used by adapters.

pub mod config;
pub mod engine;
pub mod error;
pub mod tariff;
pub mod telemetry;
pub mod wire;
