use crate::infra::{load_schedule, RateSourceArgs};
use crate::render::render_text;
use clap::Args;
use landed_cost::config::AppConfig;
use landed_cost::engine::{calculate, LandedCostRequest, RateTable};
use landed_cost::error::AppError;
use rust_decimal::Decimal;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) source: RateSourceArgs,
}

struct Scenario {
    title: &'static str,
    request: LandedCostRequest,
}

fn shipment(
    value: i64,
    quantity: i64,
    origin: &str,
    mode: &str,
) -> LandedCostRequest {
    LandedCostRequest {
        hs_code: "8504.40.95".to_string(),
        product_value: Decimal::from(value),
        quantity,
        origin_country: origin.to_string(),
        destination_country: "US".to_string(),
        shipping_mode: mode.to_string(),
        incoterm: "FOB".to_string(),
        freight_quote: None,
    }
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Static converters from China by ocean",
            request: shipment(10000, 100, "CN", "ocean"),
        },
        Scenario {
            title: "Static converters from Germany by ocean",
            request: shipment(10000, 100, "DE", "ocean"),
        },
        Scenario {
            title: "Single low-value converter by air",
            request: shipment(100, 1, "DE", "air"),
        },
        Scenario {
            title: "Shipment declared with zero units",
            request: shipment(10000, 0, "CN", "ocean"),
        },
    ]
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let schedule = load_schedule(&args.source, config)?;
    print!("{}", demo_report(&schedule));
    Ok(())
}

/// Renders every scenario; rejected requests are reported inline rather than aborting.
fn demo_report<T: RateTable + ?Sized>(table: &T) -> String {
    let mut out = format!("Landed cost demo (rate table {})\n", table.version());
    for (index, scenario) in scenarios().iter().enumerate() {
        out.push_str(&format!("\n[{}] {}\n", index + 1, scenario.title));
        match calculate(&scenario.request, table) {
            Ok(breakdown) => out.push_str(&render_text(&breakdown)),
            Err(err) => out.push_str(&format!("Rejected ({}): {}\n", err.kind(), err)),
        }
    }
    out
}
