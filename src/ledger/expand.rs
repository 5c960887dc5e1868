//! Expansion of cash-flow definitions into a dated ledger

use chrono::NaiveDate;

use super::LedgerEntry;
use crate::annuity::CashFlowDefinition;
use crate::dates::add_months;
use crate::error::EngineResult;

/// Expanded ledger plus the as-of date derived from it
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Entries sorted by date, ties by definition order
    pub ledger: Vec<LedgerEntry>,

    /// First occurrence of the first `Invest` definition, if any
    pub as_of: Option<NaiveDate>,
}

/// Expand every definition into its individual occurrences
pub fn expand(flows: &[CashFlowDefinition], compounding_periods: u32) -> EngineResult<Expansion> {
    let capacity = flows.iter().map(|cf| cf.number as usize).sum();
    let mut ledger = Vec::with_capacity(capacity);
    let mut as_of = None;

    for (row, cf) in flows.iter().enumerate() {
        let first = cf.first_payment_date()?;
        if cf.kind.is_invest() && as_of.is_none() {
            as_of = Some(first);
        }

        let step = cf.months_per_period(compounding_periods) as i32;
        let amounts = cf.amounts_from(cf.amount, compounding_periods);

        for (occurrence, amount) in amounts.into_iter().enumerate() {
            ledger.push(LedgerEntry {
                row,
                occurrence,
                date: add_months(first, occurrence as i32 * step)?,
                amount,
                kind: cf.kind,
                frequency: cf.frequency,
                escrow: cf.escrow,
                case_code: cf.case_code.clone(),
                owner: cf.buyer.clone(),
                stub_days: 0,
                stub_periods: 0.0,
                dcf_stub_days: 0,
                dcf_stub_periods: 0.0,
                discount_factor: 0.0,
                discounted: 0.0,
            });
        }
        log::debug!("Expanded row {} into {} {} occurrences", row, cf.number, cf.frequency);
    }

    // Stable: occurrences of one row keep their order on equal dates
    ledger.sort_by(|a, b| a.date.cmp(&b.date).then(a.row.cmp(&b.row)));

    Ok(Expansion { ledger, as_of })
}
