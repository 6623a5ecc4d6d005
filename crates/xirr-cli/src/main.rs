mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

use commands::xirr::{CalcArgs, SolveArgs};
use output::OutputFormat;

/// Money-weighted annualised return (XIRR) calculator
#[derive(Parser)]
#[command(
    name = "xirr",
    version,
    about = "Money-weighted annualised return (XIRR) calculator",
    long_about = "Computes the annualised rate of return implied by dated contributions, \
                  withdrawals and a final valuation, using Newton-Raphson on the net \
                  present value with an actual/365 day count."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate contributions, withdrawals and a final value, then compute XIRR
    Calc(CalcArgs),
    /// Solve XIRR for an already-signed list of dated cash flows
    Solve(SolveArgs),
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calc(args) => commands::xirr::run_calc(args),
        Commands::Solve(args) => commands::xirr::run_solve(args),
        Commands::Version => {
            println!("xirr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            cli.output.render(&value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
