use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::daycount::years_between;
use crate::types::{Cashflow, Money, Multiple, Years};

/// Plain-arithmetic figures shown next to the annualised rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSummary {
    /// Sum of all contributions, as a positive number
    pub total_contributed: Money,
    /// Interim withdrawals, excluding the final valuation
    pub total_withdrawn: Money,
    pub final_value: Money,
    /// final_value + total_withdrawn - total_contributed
    pub net_profit: Money,
    /// net_profit / total_contributed; None when nothing was contributed
    pub total_return: Option<Multiple>,
    pub holding_period_years: Years,
    pub first_date: NaiveDate,
    pub final_date: NaiveDate,
    pub flow_count: usize,
}

/// Summarise a validated cash-flow list.
///
/// `cashflows` is the builder output, which already contains the final
/// valuation as a positive flow on `final_date` when `final_value > 0`. That
/// flow is counted as `final_value` and not as a withdrawal.
pub fn summarize(
    cashflows: &[Cashflow],
    final_value: Money,
    final_date: NaiveDate,
) -> CashflowSummary {
    let mut total_contributed = Decimal::ZERO;
    let mut total_positive = Decimal::ZERO;
    for cf in cashflows {
        if cf.amount.is_sign_negative() {
            total_contributed += cf.amount.abs();
        } else {
            total_positive += cf.amount;
        }
    }

    let terminal_in_list = final_value > Decimal::ZERO
        && cashflows
            .iter()
            .any(|cf| cf.date == final_date && cf.amount == final_value);
    let total_withdrawn = if terminal_in_list {
        total_positive - final_value
    } else {
        total_positive
    };

    let net_profit = final_value + total_withdrawn - total_contributed;
    let total_return = if total_contributed.is_zero() {
        None
    } else {
        Some(net_profit / total_contributed)
    };

    let first_date = cashflows
        .iter()
        .map(|cf| cf.date)
        .min()
        .unwrap_or(final_date);

    CashflowSummary {
        total_contributed,
        total_withdrawn,
        final_value,
        net_profit,
        total_return,
        holding_period_years: years_between(first_date, final_date),
        first_date,
        final_date,
        flow_count: cashflows.len(),
    }
}
