pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

/// How a calculation result is rendered on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The full envelope, pretty-printed
    #[default]
    Json,
    /// Headline rate, cash-flow schedule and summary as tables
    Table,
    /// `date,amount` rows followed by `field,value` rows
    Csv,
    /// The rate alone, for scripts
    Minimal,
}

impl OutputFormat {
    pub fn render(self, value: &Value) {
        match self {
            OutputFormat::Json => json::print_json(value),
            OutputFormat::Table => table::print_table(value),
            OutputFormat::Csv => csv_out::print_csv(value),
            OutputFormat::Minimal => minimal::print_minimal(value),
        }
    }
}
