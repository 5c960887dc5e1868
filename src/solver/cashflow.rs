//! Solve for the amount of the one cash-flow row flagged unknown

use super::amortize::{amortize, Rates};
use super::bisection::{Bisection, BisectionError, Convergence, Steer};
use crate::annuity::CashFlowDefinition;
use crate::config::SolverConfig;
use crate::error::{EngineError, EngineResult};
use crate::ledger::LedgerEntry;
use crate::metrics::round_to;

/// Write the escalated amounts of `flow` starting at `base` onto its ledger entries
pub fn apply_amount(
    ledger: &mut [LedgerEntry],
    flow: &CashFlowDefinition,
    row: usize,
    base: f64,
    compounding_periods: u32,
) {
    let amounts = flow.amounts_from(base, compounding_periods);
    for entry in ledger.iter_mut().filter(|e| e.row == row) {
        if let Some(&amount) = amounts.get(entry.occurrence) {
            entry.amount = amount;
        }
    }
}

/// Find the first-occurrence amount of `row` that amortizes the ledger to zero
///
/// When the unknown row is an investment and `estimate` (its discounted value)
/// is positive, the search starts in a narrow band around the estimate and
/// falls back to the full range if the answer lands on a band edge. The
/// rounded answer is written back onto the ledger before returning.
pub fn solve_cash_flow(
    ledger: &mut [LedgerEntry],
    flows: &[CashFlowDefinition],
    row: usize,
    rates: &Rates,
    estimate: Option<f64>,
    config: &SolverConfig,
) -> EngineResult<f64> {
    let flow = flows.get(row).ok_or(EngineError::MissingUnknown)?;
    let wide = (config.cash_flow_floor, config.cash_flow_ceiling);

    let banded = match estimate {
        Some(pv) if flow.kind.is_invest() && pv > 0.0 => {
            Some((pv * (1.0 - config.invest_band), pv * (1.0 + config.invest_band)))
        }
        _ => None,
    };

    let convergence = match banded {
        Some(band) => {
            let first = bisect_amount(ledger, flow, row, rates, band, config)
                .map_err(|e| search_error(e, row))?;
            if pinned(first.value, band, config.cash_flow_tolerance) {
                log::warn!(
                    "Row {} answer {:.2} sits on the estimate band [{:.2}, {:.2}], widening search",
                    row,
                    first.value,
                    band.0,
                    band.1
                );
                bisect_amount(ledger, flow, row, rates, wide, config).map_err(|e| search_error(e, row))?
            } else {
                first
            }
        }
        None => bisect_amount(ledger, flow, row, rates, wide, config).map_err(|e| search_error(e, row))?,
    };

    log::debug!("Number of iterations: {}", convergence.iterations);

    let answer = round_to(convergence.value, 2);
    apply_amount(ledger, flow, row, answer, rates.compounding_periods);
    Ok(answer)
}

fn bisect_amount(
    ledger: &mut [LedgerEntry],
    flow: &CashFlowDefinition,
    row: usize,
    rates: &Rates,
    (min, max): (f64, f64),
    config: &SolverConfig,
) -> Result<Convergence, BisectionError> {
    let search = Bisection::new(min, max, config.cash_flow_tolerance)
        .with_max_iterations(config.max_iterations);

    let floor = config.cash_flow_floor + config.cash_flow_edge;
    let ceiling = config.cash_flow_ceiling - config.cash_flow_edge;
    let invest = flow.kind.is_invest();

    search.solve(
        |guess| {
            apply_amount(ledger, flow, row, guess, rates.compounding_periods);
            let balance = amortize(ledger, rates);
            // A larger investment raises the balance; a larger payout lowers it
            let too_low = if invest { balance < 0.0 } else { balance > 0.0 };
            if too_low {
                Steer::Raise
            } else {
                Steer::Lower
            }
        },
        |lo, hi| hi < floor || lo > ceiling,
    )
}

fn pinned(value: f64, (min, max): (f64, f64), tolerance: f64) -> bool {
    value - min <= tolerance || max - value <= tolerance
}

fn search_error(err: BisectionError, row: usize) -> EngineError {
    match err {
        BisectionError::Diverged { .. } => EngineError::CashFlowDiverged { row },
        BisectionError::Exhausted { iterations } => EngineError::ConvergenceFailed {
            solver: format!("cash flow row {row}"),
            iterations,
        },
    }
}
