//! Top-level solve: expand, stub, solve, measure and report

use chrono::NaiveDate;

use super::result::{SolveResult, SolvedAnnuity};
use crate::annuity::AnnuityDefinition;
use crate::config::{AsOfPolicy, SolverConfig};
use crate::error::{EngineError, EngineResult};
use crate::ledger::{expand, set_stubs, LedgerEntry};
use crate::metrics::{
    aggregate, effective_from_nominal, estimate_discounted_pv, flow_summaries, nominal_from_effective,
    pv_at_as_of, round_to, term_years, weighted_average_life,
};
use crate::report::{build_schedule, year_end_summary};
use crate::solver::{solve_cash_flow, solve_rate, Rates};

/// Annuity solver
pub struct AnnuityEngine {
    config: SolverConfig,
}

impl Default for AnnuityEngine {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl AnnuityEngine {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the annuity's unknown and measure the solved ledger
    ///
    /// With `include_schedule` the amortization schedule and year-end
    /// valuations are built as well.
    pub fn solve(&self, annuity: &AnnuityDefinition, include_schedule: bool) -> EngineResult<SolveResult> {
        annuity.validate()?;
        let compounding_periods = annuity.compounding_periods()?;
        let flows = &annuity.cash_flows;

        let expansion = expand(flows, compounding_periods)?;
        let mut ledger = expansion.ledger;
        let as_of = self.resolve_as_of(expansion.as_of, &ledger)?;
        set_stubs(&mut ledger, flows, compounding_periods, as_of)?;

        let (rates, effective, unknown_row, answer, estimate_dcf) = if annuity.unknown {
            let pv_amount = flows.first().map(|cf| cf.amount).unwrap_or(0.0);
            let convergence = solve_rate(&ledger, compounding_periods, &self.config, pv_amount)?;
            let rates = Rates::new(convergence.value, compounding_periods);
            let effective = effective_from_nominal(rates.nominal, compounding_periods);
            (rates, effective, None, convergence.value, None)
        } else {
            let row = annuity.unknown_row()?;
            let (nominal, effective) = input_rates(annuity.nominal, annuity.effective, compounding_periods);
            let rates = Rates::new(nominal, compounding_periods);

            let estimate = if flows[row].kind.is_invest() {
                Some(estimate_discounted_pv(&mut ledger, as_of, effective))
            } else {
                None
            };

            let answer = solve_cash_flow(&mut ledger, flows, row, &rates, estimate, &self.config)?;
            (rates, effective, Some(row), answer, estimate)
        };

        let pv = pv_at_as_of(&ledger, as_of);
        let dcf_pv = estimate_discounted_pv(&mut ledger, as_of, effective);
        let total_payout = aggregate(&ledger);
        let wal = weighted_average_life(&ledger, as_of, total_payout);
        let term = term_years(&ledger, as_of);

        let (schedule, year_end, rounding, dcf_rounding, hw_mark, hw_mark_date) = if include_schedule {
            let schedule = build_schedule(&ledger, &rates, as_of, pv, dcf_pv);
            let year_end = year_end_summary(&ledger, &rates, &schedule.rows, annuity.use_am_schedule, &self.config)?;
            (
                Some(schedule.rows),
                Some(year_end),
                schedule.rounding,
                schedule.dcf_rounding,
                schedule.hw_mark,
                schedule.hw_mark_date,
            )
        } else {
            (None, None, 0.0, round_to(pv - dcf_pv, 2), 0.0, None)
        };

        log::info!(
            "Solved {} over {} entries: answer {} (nominal {:.6}, effective {:.6})",
            if annuity.unknown { "rate".to_string() } else { format!("row {}", unknown_row.unwrap_or(0)) },
            ledger.len(),
            answer,
            rates.nominal,
            effective
        );

        Ok(SolveResult {
            unknown_row,
            answer,
            pv,
            dcf_pv,
            dcf_rounding,
            rounding,
            wal,
            term,
            hw_mark,
            hw_mark_date,
            total_payout,
            solved: SolvedAnnuity {
                nominal: rates.nominal,
                daily_rate: rates.daily,
                effective,
                compounding_periods,
                as_of,
                aggregate: total_payout,
                estimate_dcf,
            },
            flows: flow_summaries(flows, compounding_periods)?,
            schedule,
            year_end,
        })
    }

    fn resolve_as_of(&self, as_of: Option<NaiveDate>, ledger: &[LedgerEntry]) -> EngineResult<NaiveDate> {
        if let Some(date) = as_of {
            return Ok(date);
        }
        match self.config.as_of_policy {
            AsOfPolicy::Require => Err(EngineError::MissingAsOf),
            AsOfPolicy::FirstEntry => {
                let first = ledger.first().map(|e| e.date).ok_or(EngineError::MissingAsOf)?;
                log::warn!("No investment cash flow; using first entry date {} as the as-of date", first);
                Ok(first)
            }
        }
    }
}

/// Fill in whichever of the nominal and effective rates was not supplied
fn input_rates(nominal: f64, effective: f64, compounding_periods: u32) -> (f64, f64) {
    if nominal == 0.0 && effective != 0.0 {
        (nominal_from_effective(effective, compounding_periods), effective)
    } else if effective == 0.0 {
        (nominal, effective_from_nominal(nominal, compounding_periods))
    } else {
        (nominal, effective)
    }
}

/// Solve with the default configuration
pub fn solve(annuity: &AnnuityDefinition, include_schedule: bool) -> EngineResult<SolveResult> {
    AnnuityEngine::default().solve(annuity, include_schedule)
}
