//! Year-end valuations of the remaining payments

use chrono::Datelike;
use serde::Serialize;

use super::schedule::{RowType, ScheduleRow};
use crate::config::SolverConfig;
use crate::dates::year_end;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{create_stubs, LedgerEntry};
use crate::metrics::round_to;
use crate::solver::{amortize, Bisection, BisectionError, Rates, Steer};

/// Value of the outstanding payments at the close of one calendar year
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearEndValuation {
    /// Calendar year
    pub date: String,

    /// Amount that, invested on December 31, exactly funds the remaining payments
    pub value: f64,

    /// Payouts dated in this year
    pub aggregate: f64,

    /// Interest booked in this year's totals row
    pub yearly_interest: f64,

    /// Payouts dated up to and including this year
    pub yearly_cumulative: f64,
}

/// Value the remaining payments at each December 31 before the final year
///
/// The final year carries a value of 0. `use_am_schedule` selects nominal
/// interest over DCF interest for `yearly_interest`.
pub fn year_end_summary(
    ledger: &[LedgerEntry],
    rates: &Rates,
    rows: &[ScheduleRow],
    use_am_schedule: bool,
    config: &SolverConfig,
) -> EngineResult<Vec<YearEndValuation>> {
    let (Some(first), Some(last)) = (ledger.first(), ledger.last()) else {
        return Ok(Vec::new());
    };
    let start_year = first.date.year();
    let final_date = last.date;
    let final_year = final_date.year();
    let compounding_months = 12 / rates.compounding_periods.max(1);

    let interest_for = |year: i32| {
        rows.iter()
            .find(|r| r.row_type == RowType::YearTotals(year))
            .map(|r| if use_am_schedule { r.interest } else { r.dcf_interest })
            .unwrap_or(0.0)
    };

    let mut valuations = Vec::with_capacity((final_year - start_year + 1) as usize);
    let mut cursor = 0;
    let mut cumulative = 0.0;

    for year in start_year..final_year {
        let close = year_end(year)?;

        let mut aggregate = 0.0;
        while cursor < ledger.len() && ledger[cursor].date < close {
            if ledger[cursor].is_payout() {
                aggregate += ledger[cursor].amount;
            }
            cursor += 1;
        }
        cumulative += aggregate;

        let mut remaining = Vec::with_capacity(ledger.len() - cursor + 1);
        remaining.push(LedgerEntry::synthetic(close, 0.0));
        remaining.extend(ledger[cursor..].iter().cloned());

        // The next entry now accrues from December 31
        if let Some(next) = remaining.get_mut(1) {
            let stub = create_stubs(close, next.date, compounding_months)?;
            next.stub_days = stub.days;
            next.stub_periods = stub.periods;
        }

        let value = value_remaining(&mut remaining, rates, config, year)?;
        log::debug!("Year end {} valued at {:.2}", year, value);

        valuations.push(YearEndValuation {
            date: year.to_string(),
            value: round_to(value, 2),
            aggregate: round_to(aggregate, 2),
            yearly_interest: interest_for(year),
            yearly_cumulative: round_to(cumulative, 2),
        });
    }

    let aggregate: f64 = ledger[cursor..]
        .iter()
        .filter(|e| e.is_payout())
        .map(|e| e.amount)
        .sum();
    cumulative += aggregate;

    valuations.push(YearEndValuation {
        date: final_year.to_string(),
        value: 0.0,
        aggregate: round_to(aggregate, 2),
        yearly_interest: interest_for(final_year),
        yearly_cumulative: round_to(cumulative, 2),
    });

    Ok(valuations)
}

/// Solve for the synthetic investment at the head of `remaining`
fn value_remaining(remaining: &mut [LedgerEntry], rates: &Rates, config: &SolverConfig, year: i32) -> EngineResult<f64> {
    let search = Bisection::new(-config.year_end_bound, config.year_end_bound, config.year_end_tolerance)
        .with_max_iterations(config.max_iterations);

    let result = search.solve(
        |guess| {
            remaining[0].amount = guess;
            if amortize(remaining, rates) > 0.0 {
                Steer::Lower
            } else {
                Steer::Raise
            }
        },
        |_, _| false,
    );

    let iterations = match result {
        Ok(convergence) => return Ok(convergence.value),
        Err(BisectionError::Exhausted { iterations }) => iterations,
        Err(BisectionError::Diverged { .. }) => config.max_iterations,
    };
    Err(EngineError::ConvergenceFailed {
        solver: format!("year-end valuation {year}"),
        iterations,
    })
}
