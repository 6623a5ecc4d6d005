use clap::Args;
use serde_json::{json, Value};

use xirr_core::solver::{
    self, SolverConfig, DEFAULT_GUESS, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use xirr_core::xirr::{self, format_percent, XirrInput};
use xirr_core::{Cashflow, Direction, RawEntry};

use crate::input;

/// Solver parameters shared by `calc` and `solve`
#[derive(Args)]
pub struct SolverArgs {
    /// Initial rate guess (0.1 = 10%)
    #[arg(long, default_value_t = DEFAULT_GUESS, allow_hyphen_values = true)]
    pub guess: f64,

    /// Maximum Newton-Raphson iterations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,

    /// Convergence tolerance on the rate step
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

impl SolverArgs {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            guess: self.guess,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }
}

/// Arguments for an XIRR calculation from contributions, withdrawals and a
/// final valuation
#[derive(Args)]
pub struct CalcArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// CSV file of entries with a label,direction,amount,date header
    #[arg(long)]
    pub entries_csv: Option<String>,

    /// Money paid in, as AMOUNT@DATE (repeatable, e.g. "100000@2023-01-01")
    #[arg(long = "contribution", value_name = "AMOUNT@DATE")]
    pub contributions: Vec<String>,

    /// Money taken out before the final date, as AMOUNT@DATE (repeatable)
    #[arg(long = "withdrawal", value_name = "AMOUNT@DATE")]
    pub withdrawals: Vec<String>,

    /// Value of the remaining position on the final date
    #[arg(long)]
    pub final_amount: Option<String>,

    /// Valuation date (YYYY-MM-DD)
    #[arg(long)]
    pub final_date: Option<String>,

    #[command(flatten)]
    pub solver: SolverArgs,
}

pub fn run_calc(args: CalcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let calc_input: XirrInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let final_amount = args
            .final_amount
            .ok_or("--final-amount is required (or provide --input)")?;
        let final_date = args
            .final_date
            .ok_or("--final-date is required (or provide --input)")?;

        let mut entries = match args.entries_csv {
            Some(ref path) => input::file::read_entries_csv(path)?,
            None => Vec::new(),
        };
        for pair in &args.contributions {
            entries.push(parse_entry(Direction::Contribution, pair)?);
        }
        for pair in &args.withdrawals {
            entries.push(parse_entry(Direction::Withdrawal, pair)?);
        }

        XirrInput {
            entries,
            final_amount,
            final_date,
            solver: args.solver.config(),
        }
    };

    let result = xirr::calculate_xirr(&calc_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for solving a signed cash-flow series directly
#[derive(Args)]
pub struct SolveArgs {
    /// Path to JSON file holding an array of {"date", "amount"} flows
    #[arg(long)]
    pub input: Option<String>,

    /// Signed flow as AMOUNT@DATE (repeatable, e.g. "-1000@2023-01-01")
    #[arg(long = "flow", value_name = "AMOUNT@DATE", allow_hyphen_values = true)]
    pub flows: Vec<String>,

    #[command(flatten)]
    pub solver: SolverArgs,
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flows: Vec<Cashflow> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else if !args.flows.is_empty() {
        args.flows
            .iter()
            .map(|pair| parse_flow(pair))
            .collect::<Result<_, _>>()?
    } else {
        return Err("--flow AMOUNT@DATE, --input <file.json> or stdin required".into());
    };

    Ok(solve_output(&flows, &args.solver.config()))
}

fn solve_output(flows: &[Cashflow], config: &SolverConfig) -> Value {
    let rate = solver::solve(flows, config.guess, config.max_iterations, config.tolerance);
    if rate.is_none() {
        log::warn!("no rate found for {} flows", flows.len());
    }

    json!({
        "result": {
            "xirr": rate,
            "xirr_pct": rate.map(format_percent),
            "npv_at_rate": rate.and_then(|r| solver::npv(flows, r)),
            "flow_count": flows.len(),
        }
    })
}

fn split_pair(pair: &str) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    let parts = pair
        .rsplit_once('@')
        .ok_or_else(|| format!("'{pair}' is not AMOUNT@DATE"))?;
    Ok(parts)
}

fn parse_entry(direction: Direction, pair: &str) -> Result<RawEntry, Box<dyn std::error::Error>> {
    let (amount, date) = split_pair(pair)?;
    Ok(RawEntry::new(direction, amount.trim(), date.trim()))
}

fn parse_flow(pair: &str) -> Result<Cashflow, Box<dyn std::error::Error>> {
    let (amount, date) = split_pair(pair)?;
    let amount = xirr_core::parse::parse_amount(amount)?
        .ok_or_else(|| format!("'{pair}' has no amount"))?;
    let date = xirr_core::parse::parse_date(date)?
        .ok_or_else(|| format!("'{pair}' has no date"))?;
    Ok(Cashflow::new(date, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_flow() {
        let flow = parse_flow("-1,000@2023-01-01").unwrap();
        assert_eq!(flow.amount, dec!(-1000));
        assert_eq!(flow.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert!(parse_flow("1000 2023-01-01").is_err());
        assert!(parse_flow("@2023-01-01").is_err());
    }

    #[test]
    fn test_parse_entry_keeps_raw_text() {
        let entry = parse_entry(Direction::Withdrawal, "20,000 @ 2023-07-01").unwrap();
        assert_eq!(entry.direction, Direction::Withdrawal);
        assert_eq!(entry.amount, "20,000");
        assert_eq!(entry.date, "2023-07-01");
    }

    #[test]
    fn test_solve_output_shape() {
        let flows = vec![
            parse_flow("-100000@2023-01-01").unwrap(),
            parse_flow("158000@2024-01-01").unwrap(),
        ];
        let out = solve_output(&flows, &SolverConfig::default());
        assert_eq!(out["result"]["xirr_pct"], "58.00%");
        assert_eq!(out["result"]["flow_count"], 2);
        assert!((out["result"]["xirr"].as_f64().unwrap() - 0.58).abs() < 1e-7);

        let same_sign = vec![flows[0], parse_flow("-1@2024-01-01").unwrap()];
        let out = solve_output(&same_sign, &SolverConfig::default());
        assert!(out["result"]["xirr"].is_null());
        assert!(out["result"]["npv_at_rate"].is_null());
    }
}
