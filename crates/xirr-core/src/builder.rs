//! Cash-flow builder: raw form rows plus a final valuation in, a validated
//! ascending list of signed cash flows out.

use rust_decimal::Decimal;

use crate::error::{EntryField, XirrError};
use crate::parse::{parse_amount, parse_date};
use crate::types::{Cashflow, RawEntry};
use crate::XirrResult;

/// Validate `entries` and the terminal valuation and assemble the solver
/// input.
///
/// Contributions become negative flows, withdrawals positive. The final
/// valuation is added as a positive flow dated `final_date` when it is
/// above zero. The result is sorted ascending by date (stable), holds at
/// least one positive and one negative amount, and ends no earlier than its
/// first flow.
pub fn build_cashflows(
    entries: &[RawEntry],
    final_amount: &str,
    final_date: &str,
) -> XirrResult<Vec<Cashflow>> {
    let mut flows = Vec::with_capacity(entries.len() + 1);

    for (i, entry) in entries.iter().enumerate() {
        if entry.is_blank() {
            log::debug!("skipping blank entry #{}", i + 1);
            continue;
        }
        flows.push(validate_entry(i + 1, entry)?);
    }

    if flows.is_empty() {
        return Err(XirrError::NoValidEntries);
    }

    let final_value = match parse_amount(final_amount) {
        Ok(Some(v)) if v >= Decimal::ZERO => v,
        Ok(Some(v)) => {
            return Err(XirrError::InvalidFinalAmount(format!(
                "{v} is negative"
            )))
        }
        Ok(None) => return Err(XirrError::InvalidFinalAmount("missing".into())),
        Err(e) => return Err(XirrError::InvalidFinalAmount(e.to_string())),
    };

    let final_date = match parse_date(final_date) {
        Ok(Some(d)) => d,
        Ok(None) => return Err(XirrError::InvalidFinalDate("missing".into())),
        Err(e) => return Err(XirrError::InvalidFinalDate(e.to_string())),
    };

    // sort_by_key is stable: same-day flows keep their entry order
    flows.sort_by_key(|cf| cf.date);

    let first_date = flows[0].date;
    if final_date <= first_date {
        return Err(XirrError::FinalDateTooEarly {
            final_date,
            first_date,
        });
    }

    if final_value > Decimal::ZERO {
        // entries may post-date the valuation; keep the list ascending
        let at = flows.partition_point(|cf| cf.date <= final_date);
        flows.insert(at, Cashflow::new(final_date, final_value));
    }

    if !has_mixed_signs(&flows) {
        return Err(XirrError::DegenerateCashflows);
    }

    log::debug!(
        "built {} cash flows from {} to {}",
        flows.len(),
        first_date,
        final_date
    );
    Ok(flows)
}

/// At least one strictly positive and one strictly negative amount.
pub fn has_mixed_signs(flows: &[Cashflow]) -> bool {
    let has_positive = flows.iter().any(|cf| cf.amount > Decimal::ZERO);
    let has_negative = flows.iter().any(|cf| cf.amount < Decimal::ZERO);
    has_positive && has_negative
}

fn validate_entry(index: usize, entry: &RawEntry) -> XirrResult<Cashflow> {
    let invalid = |field: EntryField, reason: String| XirrError::InvalidEntry {
        index,
        field,
        reason,
    };

    let amount = match parse_amount(&entry.amount) {
        Ok(Some(a)) if a > Decimal::ZERO => a,
        Ok(Some(a)) => {
            return Err(invalid(
                EntryField::Amount,
                format!("{a} must be greater than 0"),
            ))
        }
        Ok(None) => return Err(invalid(EntryField::Amount, "missing".into())),
        Err(e) => return Err(invalid(EntryField::Amount, e.to_string())),
    };

    let date = match parse_date(&entry.date) {
        Ok(Some(d)) => d,
        Ok(None) => return Err(invalid(EntryField::Date, "missing".into())),
        Err(e) => return Err(invalid(EntryField::Date, e.to_string())),
    };

    Ok(Cashflow::new(date, entry.direction.signed(amount)))
}
