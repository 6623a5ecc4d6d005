use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annualised rates as decimals (0.05 = 5%). The solver raises (1 + r) to
/// fractional powers, so rates live in f64.
pub type Rate = f64;

/// Multiples and ratios (e.g. 0.58 total return)
pub type Multiple = Decimal;

/// Year fractions on a 365-day year
pub type Years = Decimal;

/// Days in the fixed day-count year. No leap-year adjustment.
pub const DAYS_PER_YEAR: i64 = 365;

/// Whether money went into the investment or came back out of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money paid in by the investor. Becomes a negative cash flow.
    #[default]
    #[serde(alias = "out")]
    Contribution,
    /// Money taken back by the investor. Becomes a positive cash flow.
    #[serde(alias = "in")]
    Withdrawal,
}

impl Direction {
    /// Apply the sign convention to a positive amount.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Direction::Contribution => -amount,
            Direction::Withdrawal => amount,
        }
    }
}

/// One user-entered transaction, exactly as the form holds it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, deserialize_with = "text_or_number")]
    pub amount: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub date: String,
}

impl RawEntry {
    pub fn new(direction: Direction, amount: impl Into<String>, date: impl Into<String>) -> Self {
        RawEntry {
            label: String::new(),
            direction,
            amount: amount.into(),
            date: date.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// An unused form row: no amount and no date.
    pub fn is_blank(&self) -> bool {
        self.amount.trim().is_empty() && self.date.trim().is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Form fields arrive as strings, numbers or null; keep them as text until
/// the parse step.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<TextOrNumber> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(TextOrNumber::Text(s)) => s,
        Some(TextOrNumber::Number(n)) => n.to_string(),
    })
}

/// A validated, signed cash flow. `amount` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashflow {
    pub date: NaiveDate,
    pub amount: Money,
}

impl Cashflow {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Cashflow { date, amount }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit money, f64 solver".to_string(),
        },
    }
}
