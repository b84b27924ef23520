use crate::commands::{
    run_calculate, run_quote, run_rates_check, CalculateArgs, QuoteArgs, RatesArgs,
};
use crate::demo::{run_demo, DemoArgs};
use clap::{Parser, Subcommand};
use landed_cost::config::AppConfig;
use landed_cost::error::AppError;
use landed_cost::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "landed-cost",
    about = "Estimate itemized landed cost for import shipments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a JSON request body (file path or '-' for stdin)
    Calculate(CalculateArgs),
    /// Price a shipment described with flags
    Quote(QuoteArgs),
    /// Inspect tariff schedules
    Rates {
        #[command(subcommand)]
        command: RatesCommand,
    },
    /// Walk through reference shipments against the configured schedule
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RatesCommand {
    /// Load and validate a schedule, then print its summary
    Check(RatesArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Calculate(args) => run_calculate(args, &config),
        Command::Quote(args) => run_quote(args, &config),
        Command::Rates {
            command: RatesCommand::Check(args),
        } => run_rates_check(args, &config),
        Command::Demo(args) => run_demo(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_flags() {
        let cli = Cli::try_parse_from([
            "landed-cost",
            "quote",
            "--hs-code",
            "8504.40.95",
            "--value",
            "10000",
            "--quantity",
            "100",
            "--origin",
            "CN",
            "--destination",
            "US",
            "--mode",
            "air",
            "--format",
            "json",
        ])
        .expect("quote parses");

        match cli.command {
            Command::Quote(args) => {
                assert_eq!(args.hs_code, "8504.40.95");
                assert_eq!(args.quantity, 100);
                assert_eq!(args.mode, "air");
                assert_eq!(args.incoterm, "FOB");
            }
            other => panic!("expected quote, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_value() {
        let result = Cli::try_parse_from([
            "landed-cost",
            "quote",
            "--hs-code",
            "8504",
            "--value",
            "ten",
            "--quantity",
            "1",
            "--origin",
            "CN",
            "--destination",
            "US",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rates_check_accepts_hs_code_lookup() {
        let cli = Cli::try_parse_from(["landed-cost", "rates", "check", "--hs-code", "6110.20.20"])
            .expect("rates check parses");

        match cli.command {
            Command::Rates {
                command: RatesCommand::Check(args),
            } => assert_eq!(args.hs_code.as_deref(), Some("6110.20.20")),
            other => panic!("expected rates check, got {other:?}"),
        }
    }
}
