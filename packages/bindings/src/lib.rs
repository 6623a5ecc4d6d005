use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use xirr_core::solver::{self, SolverConfig};
use xirr_core::xirr::{self, XirrInput};
use xirr_core::{Cashflow, Rate};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Form pipeline
// ---------------------------------------------------------------------------

/// Full calculation: entries + final valuation in, rate, flows and summary
/// out. Validation failures reject with the error message.
#[napi]
pub fn calculate_xirr(input_json: String) -> NapiResult<String> {
    let input: XirrInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = xirr::calculate_xirr(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Validation only: the signed, date-ordered cash flows the solver would see.
#[napi]
pub fn build_cashflows(input_json: String) -> NapiResult<String> {
    let input: XirrInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let flows = xirr_core::builder::build_cashflows(
        &input.entries,
        &input.final_amount,
        &input.final_date,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&flows).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SolveResponse {
    xirr: Option<Rate>,
}

fn solver_config(solver_json: Option<String>) -> NapiResult<SolverConfig> {
    match solver_json {
        Some(json) if !json.trim().is_empty() => {
            let config: SolverConfig = serde_json::from_str(&json).map_err(to_napi_error)?;
            Ok(config)
        }
        _ => Ok(SolverConfig::default()),
    }
}

/// Solve a JSON array of signed `{date, amount}` flows directly. The
/// optional second argument overrides guess, iterations and tolerance. A
/// missing rate is `{"xirr": null}`, not an error.
#[napi]
pub fn solve_xirr(cashflows_json: String, solver_json: Option<String>) -> NapiResult<String> {
    let cashflows: Vec<Cashflow> = serde_json::from_str(&cashflows_json).map_err(to_napi_error)?;
    let config = solver_config(solver_json)?;
    let rate = solver::solve(
        &cashflows,
        config.guess,
        config.max_iterations,
        config.tolerance,
    );
    serde_json::to_string(&SolveResponse { xirr: rate }).map_err(to_napi_error)
}
