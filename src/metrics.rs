//! Valuation and summary metrics over a solved ledger
//!
//! Present value at the as-of date, discounted value at the effective rate,
//! weighted average life, term and per-row summaries.

use chrono::NaiveDate;
use serde::Serialize;

use crate::annuity::{CashFlowDefinition, FlowKind};
use crate::dates::{diff_days, format_date};
use crate::error::EngineResult;
use crate::ledger::LedgerEntry;

/// Round half up to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

/// Effective annual rate of a nominal rate compounded `periods` times a year
pub fn effective_from_nominal(nominal: f64, periods: u32) -> f64 {
    let m = periods.max(1) as f64;
    (1.0 + nominal / m).powf(m) - 1.0
}

/// Inverse of [`effective_from_nominal`]
pub fn nominal_from_effective(effective: f64, periods: u32) -> f64 {
    let m = periods.max(1) as f64;
    m * ((1.0 + effective).powf(1.0 / m) - 1.0)
}

/// Sum of the investments dated on the as-of date
pub fn pv_at_as_of(ledger: &[LedgerEntry], as_of: NaiveDate) -> f64 {
    ledger
        .iter()
        .filter(|e| e.kind.is_invest() && e.date == as_of)
        .map(|e| e.amount)
        .sum()
}

/// Discount every entry to the as-of date at the effective rate
///
/// Each entry's signed discount factor and cent-rounded discounted amount are
/// stored on the entry. Investments dated on the as-of date are the value being
/// estimated and are skipped. Returns the sum of the discounted amounts.
pub fn estimate_discounted_pv(ledger: &mut [LedgerEntry], as_of: NaiveDate, effective: f64) -> f64 {
    let mut total = 0.0;
    for entry in ledger.iter_mut() {
        if entry.kind.is_invest() && entry.date == as_of {
            entry.discount_factor = 0.0;
            entry.discounted = 0.0;
            continue;
        }
        let factor = entry.sign() * (1.0 + effective).powf(-entry.dcf_months() / 12.0);
        entry.discount_factor = factor;
        entry.discounted = round_to(factor * entry.amount, 2);
        total += entry.discounted;
    }
    round_to(total, 2)
}

/// Total of all payouts
pub fn aggregate(ledger: &[LedgerEntry]) -> f64 {
    round_to(ledger.iter().filter(|e| e.is_payout()).map(|e| e.amount).sum(), 2)
}

/// Amount-weighted mean time to payout in years, measured from the as-of date
///
/// Payouts dated before the as-of date are ignored. Zero when nothing is paid.
pub fn weighted_average_life(ledger: &[LedgerEntry], as_of: NaiveDate, aggregate: f64) -> f64 {
    if aggregate == 0.0 {
        return 0.0;
    }
    let weighted: f64 = ledger
        .iter()
        .filter(|e| e.is_payout() && e.date >= as_of)
        .map(|e| diff_days(e.date, as_of) as f64 * e.amount)
        .sum();
    round_to(weighted / (aggregate * 365.0), 1)
}

/// Years from the as-of date to the final entry
pub fn term_years(ledger: &[LedgerEntry], as_of: NaiveDate) -> f64 {
    ledger
        .last()
        .map(|last| round_to(diff_days(last.date, as_of) as f64 / 365.0, 1))
        .unwrap_or(0.0)
}

/// Dates, count and total of one cash-flow row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlowSummary {
    pub row: usize,
    #[serde(rename = "CfType")]
    pub kind: FlowKind,
    pub first: String,
    pub last: String,
    pub number: u32,
    pub amount: f64,
    pub aggregate: f64,
}

/// One summary per cash-flow definition, in definition order
pub fn flow_summaries(flows: &[CashFlowDefinition], compounding_periods: u32) -> EngineResult<Vec<FlowSummary>> {
    flows
        .iter()
        .enumerate()
        .map(|(row, cf)| {
            Ok(FlowSummary {
                row,
                kind: cf.kind,
                first: format_date(cf.first_payment_date()?),
                last: format_date(cf.last_payment_date(compounding_periods)?),
                number: cf.number,
                amount: cf.amount,
                aggregate: cf.aggregate(compounding_periods),
            })
        })
        .collect()
}
