use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::builder::build_cashflows;
use crate::error::XirrError;
use crate::parse::{parse_amount, parse_date};
use crate::solver::{solve_detailed, SolverConfig};
use crate::summary::{summarize, CashflowSummary};
use crate::types::*;
use crate::XirrResult;

/// Horizons shorter than this many days get a warning: annualising a few
/// days of return produces extreme rates.
const SHORT_HORIZON_DAYS: i64 = 30;
const RATE_WARN_LOW: Rate = -0.99;
const RATE_WARN_HIGH: Rate = 10.0;

/// Input for an XIRR calculation, shaped like the entry form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XirrInput {
    /// Contributions and withdrawals in any order; blank rows allowed
    pub entries: Vec<RawEntry>,
    /// Value of the remaining position on `final_date`
    #[serde(default, deserialize_with = "crate::types::text_or_number")]
    pub final_amount: String,
    #[serde(default, deserialize_with = "crate::types::text_or_number")]
    pub final_date: String,
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Output of an XIRR calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XirrOutput {
    /// Annualised money-weighted return (0.58 = 58%)
    pub xirr: Rate,
    /// `xirr` as a percentage with two decimals
    pub xirr_pct: String,
    pub iterations: u32,
    /// NPV at `xirr`; close to zero
    pub npv_at_rate: f64,
    /// The validated, signed, date-ordered flows the rate was solved on
    pub cashflows: Vec<Cashflow>,
    pub summary: CashflowSummary,
}

/// Validate the form input, build the cash-flow series and solve for XIRR.
pub fn calculate_xirr(input: &XirrInput) -> XirrResult<ComputationOutput<XirrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.solver.validate()?;

    let cashflows = build_cashflows(&input.entries, &input.final_amount, &input.final_date)?;

    let skipped = input.entries.iter().filter(|e| e.is_blank()).count();
    if skipped > 0 {
        warnings.push(format!("{skipped} blank entries were ignored"));
    }

    // Both already validated by the builder
    let final_value = parse_amount(&input.final_amount)
        .ok()
        .flatten()
        .unwrap_or(Decimal::ZERO);
    let final_date = parse_date(&input.final_date)
        .ok()
        .flatten()
        .ok_or_else(|| XirrError::InvalidFinalDate(input.final_date.clone()))?;

    if final_value.is_zero() {
        warnings.push(
            "Final value is zero: treated as a total loss with no terminal cash flow".into(),
        );
    }

    let summary = summarize(&cashflows, final_value, final_date);
    let holding_days = (summary.final_date - summary.first_date).num_days();
    if holding_days < SHORT_HORIZON_DAYS {
        warnings.push(format!(
            "Holding period of {holding_days} days is under {SHORT_HORIZON_DAYS} days; the annualised rate is highly sensitive"
        ));
    }

    let solved = solve_detailed(&cashflows, &input.solver)?;

    if solved.rate < RATE_WARN_LOW || solved.rate > RATE_WARN_HIGH {
        warnings.push(format!(
            "XIRR of {} is outside the usual -99%..1000% range; check amounts and dates",
            format_percent(solved.rate)
        ));
    }

    let output = XirrOutput {
        xirr: solved.rate,
        xirr_pct: format_percent(solved.rate),
        iterations: solved.iterations,
        npv_at_rate: solved.npv,
        cashflows,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "XIRR: Newton-Raphson on NPV, actual/365 day count",
        &serde_json::json!({
            "day_count": "actual/365",
            "guess": input.solver.guess,
            "max_iterations": input.solver.max_iterations,
            "tolerance": input.solver.tolerance,
            "final_amount": final_value.to_string(),
            "final_date": final_date.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// `0.58` -> `"58.00%"`
pub fn format_percent(rate: Rate) -> String {
    format!("{:.2}%", rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(entries: Vec<RawEntry>, final_amount: &str, final_date: &str) -> XirrInput {
        XirrInput {
            entries,
            final_amount: final_amount.into(),
            final_date: final_date.into(),
            solver: SolverConfig::default(),
        }
    }

    #[test]
    fn test_basic_xirr() {
        let result = calculate_xirr(&input(
            vec![RawEntry::new(Direction::Contribution, "100000", "2023-01-01")],
            "158000",
            "2024-01-01",
        ))
        .unwrap();
        assert!((result.result.xirr - 0.58).abs() < 1e-6);
        assert_eq!(result.result.xirr_pct, "58.00%");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.11088851), "11.09%");
        assert_eq!(format_percent(-0.5), "-50.00%");
    }

    #[test]
    fn test_blank_rows_and_total_loss_warn() {
        let result = calculate_xirr(&input(
            vec![
                RawEntry::new(Direction::Contribution, "1000", "2023-01-01"),
                RawEntry::new(Direction::Withdrawal, "1200", "2024-01-01"),
                RawEntry::default(),
            ],
            "0",
            "2024-06-01",
        ))
        .unwrap();
        assert_eq!(result.warnings.len(), 2);
        assert!((result.result.xirr - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_short_horizon_warns() {
        let result = calculate_xirr(&input(
            vec![RawEntry::new(Direction::Contribution, "1000", "2023-01-01")],
            "1001",
            "2023-01-11",
        ))
        .unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("10 days is under 30 days")));
    }

    #[test]
    fn test_thirty_day_horizon_does_not_warn() {
        let result = calculate_xirr(&input(
            vec![RawEntry::new(Direction::Contribution, "1000", "2023-01-01")],
            "1001",
            "2023-01-31",
        ))
        .unwrap();
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);

        let result = calculate_xirr(&input(
            vec![RawEntry::new(Direction::Contribution, "1000", "2023-01-01")],
            "1001",
            "2023-01-30",
        ))
        .unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_solver_config_is_reported_first() {
        let mut bad = input(vec![], "", "");
        bad.solver.max_iterations = 0;
        assert!(matches!(
            calculate_xirr(&bad),
            Err(XirrError::InvalidSolverConfig { .. })
        ));
    }
}
