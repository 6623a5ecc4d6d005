use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which field of a raw entry failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryField {
    Amount,
    Date,
}

impl std::fmt::Display for EntryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryField::Amount => write!(f, "amount"),
            EntryField::Date => write!(f, "date"),
        }
    }
}

/// Why the rate solver stopped without a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceFailure {
    /// Fewer than two cash flows.
    InsufficientFlows,
    /// No positive or no negative flow.
    SameSignFlows,
    /// |f'(r)| fell below the flatness threshold.
    FlatDerivative,
    /// An iterate reached r <= -1, where (1 + r)^t has no real value.
    RateOutOfDomain,
    /// NPV, its derivative or the next iterate was NaN or infinite.
    NonFiniteIterate,
    IterationsExhausted,
}

impl std::fmt::Display for ConvergenceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConvergenceFailure::InsufficientFlows => "fewer than two cash flows",
            ConvergenceFailure::SameSignFlows => "cash flows all share one sign",
            ConvergenceFailure::FlatDerivative => "NPV derivative too flat",
            ConvergenceFailure::RateOutOfDomain => "rate fell to -100% or below",
            ConvergenceFailure::NonFiniteIterate => "non-finite iterate",
            ConvergenceFailure::IterationsExhausted => "iteration limit reached",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
pub enum XirrError {
    #[error("Invalid entry #{index} {field}: {reason}")]
    InvalidEntry {
        /// 1-based position in the caller's entry list, blank rows included.
        index: usize,
        field: EntryField,
        reason: String,
    },

    #[error("No valid entries: enter at least one record")]
    NoValidEntries,

    #[error("Invalid final amount: enter a valid final value ({0})")]
    InvalidFinalAmount(String),

    #[error("Invalid final date: enter a valid final date ({0})")]
    InvalidFinalDate(String),

    #[error("Final date {final_date} must be after the first record ({first_date})")]
    FinalDateTooEarly {
        final_date: NaiveDate,
        first_date: NaiveDate,
    },

    #[error("Degenerate cash flows: need both contributions and returns")]
    DegenerateCashflows,

    #[error("No convergence: could not compute a rate, check inputs ({reason} after {iterations} iterations)")]
    NoConvergence {
        reason: ConvergenceFailure,
        iterations: u32,
    },

    #[error("Invalid solver config: {field}: {reason}")]
    InvalidSolverConfig { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for XirrError {
    fn from(e: serde_json::Error) -> Self {
        XirrError::SerializationError(e.to_string())
    }
}

/// Failure of the typed parse step that runs before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is not a calendar date (expected YYYY-MM-DD)")]
    InvalidDate(String),
}
