//! Newton-Raphson solver for the annualised rate that zeroes the NPV of a
//! dated cash-flow series.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::builder::has_mixed_signs;
use crate::daycount::year_fraction;
use crate::error::{ConvergenceFailure, XirrError};
use crate::types::{Cashflow, Rate};
use crate::XirrResult;

pub const DEFAULT_GUESS: Rate = 0.1;
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Below this |f'(r)| a Newton step is not trusted.
const FLAT_DERIVATIVE: f64 = 1e-12;

/// Solver parameters. Every field has a serde default so callers can omit
/// the block entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_guess")]
    pub guess: Rate,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Convergence threshold on the step |r_next - r|.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_guess() -> Rate {
    DEFAULT_GUESS
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            guess: DEFAULT_GUESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> XirrResult<()> {
        if !self.guess.is_finite() || self.guess <= -1.0 {
            return Err(XirrError::InvalidSolverConfig {
                field: "guess".into(),
                reason: "Initial guess must be a finite rate above -100%".into(),
            });
        }
        if self.max_iterations == 0 {
            return Err(XirrError::InvalidSolverConfig {
                field: "max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(XirrError::InvalidSolverConfig {
                field: "tolerance".into(),
                reason: "Tolerance must be finite and > 0".into(),
            });
        }
        Ok(())
    }
}

/// A converged rate with its iteration statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub rate: Rate,
    pub iterations: u32,
    /// NPV of the input at `rate`.
    pub npv: f64,
}

/// Annualised rate `r` with `Σ amount_i / (1 + r)^t_i = 0`, or `None` when
/// no rate could be determined.
///
/// `t_i` is measured in 365-day years from the earliest date in
/// `cashflows`, whatever its position in the slice.
pub fn solve(
    cashflows: &[Cashflow],
    guess: Rate,
    max_iterations: u32,
    tolerance: f64,
) -> Option<Rate> {
    let config = SolverConfig {
        guess,
        max_iterations,
        tolerance,
    };
    solve_detailed(cashflows, &config).ok().map(|r| r.rate)
}

/// [`solve`] with the default guess (10%), 100 iterations and 1e-7 tolerance.
pub fn solve_default(cashflows: &[Cashflow]) -> Option<Rate> {
    solve(
        cashflows,
        DEFAULT_GUESS,
        DEFAULT_MAX_ITERATIONS,
        DEFAULT_TOLERANCE,
    )
}

/// Newton-Raphson on the NPV, reporting why it stopped when it fails.
pub fn solve_detailed(cashflows: &[Cashflow], config: &SolverConfig) -> XirrResult<SolverResult> {
    config.validate()?;

    let fail = |reason: ConvergenceFailure, iterations: u32| XirrError::NoConvergence {
        reason,
        iterations,
    };

    if cashflows.len() < 2 {
        return Err(fail(ConvergenceFailure::InsufficientFlows, 0));
    }
    if !has_mixed_signs(cashflows) {
        return Err(fail(ConvergenceFailure::SameSignFlows, 0));
    }

    let flows = timed_amounts(cashflows).ok_or(fail(ConvergenceFailure::NonFiniteIterate, 0))?;
    let mut rate = config.guess;

    for i in 0..config.max_iterations {
        let (f, df) = match npv_and_derivative(&flows, rate) {
            Ok(v) => v,
            Err(reason) => return Err(fail(reason, i)),
        };

        if df.abs() < FLAT_DERIVATIVE {
            log::debug!("xirr: derivative {df:e} too flat at r={rate} (iteration {i})");
            return Err(fail(ConvergenceFailure::FlatDerivative, i));
        }

        let next = rate - f / df;
        if !next.is_finite() {
            return Err(fail(ConvergenceFailure::NonFiniteIterate, i + 1));
        }
        if next <= -1.0 {
            log::debug!("xirr: iterate {next} left the (-1, inf) domain (iteration {i})");
            return Err(fail(ConvergenceFailure::RateOutOfDomain, i + 1));
        }

        log::trace!("xirr: iteration {i} r={rate} npv={f} next={next}");

        if (next - rate).abs() < config.tolerance {
            let (npv, _) = npv_and_derivative(&flows, next)
                .map_err(|reason| fail(reason, i + 1))?;
            log::debug!("xirr: converged to {next} in {} iterations", i + 1);
            return Ok(SolverResult {
                rate: next,
                iterations: i + 1,
                npv,
            });
        }

        rate = next;
    }

    log::warn!(
        "xirr: no convergence after {} iterations (last r={rate})",
        config.max_iterations
    );
    Err(fail(
        ConvergenceFailure::IterationsExhausted,
        config.max_iterations,
    ))
}

/// NPV of `cashflows` at `rate`, discounted to the earliest date.
///
/// `None` for an empty slice, a rate at or below -100%, or a non-finite
/// result.
pub fn npv(cashflows: &[Cashflow], rate: Rate) -> Option<f64> {
    let flows = timed_amounts(cashflows)?;
    npv_and_derivative(&flows, rate).ok().map(|(f, _)| f)
}

/// (year fraction from the earliest date, amount) pairs.
fn timed_amounts(cashflows: &[Cashflow]) -> Option<Vec<(f64, f64)>> {
    let origin = cashflows.iter().map(|cf| cf.date).min()?;
    cashflows
        .iter()
        .map(|cf| Some((year_fraction(origin, cf.date), cf.amount.to_f64()?)))
        .collect()
}

fn npv_and_derivative(flows: &[(f64, f64)], rate: Rate) -> Result<(f64, f64), ConvergenceFailure> {
    let base = 1.0 + rate;
    if !rate.is_finite() {
        return Err(ConvergenceFailure::NonFiniteIterate);
    }
    // (1 + r)^t has no real value for fractional t once the base is <= 0
    if base <= 0.0 {
        return Err(ConvergenceFailure::RateOutOfDomain);
    }

    let mut f = 0.0;
    let mut df = 0.0;
    for &(t, amount) in flows {
        let denom = base.powf(t);
        f += amount / denom;
        df -= t * amount / (denom * base);
    }

    if !f.is_finite() || !df.is_finite() {
        return Err(ConvergenceFailure::NonFiniteIterate);
    }
    Ok((f, df))
}
