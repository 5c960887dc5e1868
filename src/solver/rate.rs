//! Nominal rate solve

use super::amortize::{amortize, Rates};
use super::bisection::{Bisection, BisectionError, Convergence, Steer};
use crate::config::SolverConfig;
use crate::error::{EngineError, EngineResult};
use crate::ledger::LedgerEntry;

/// Find the nominal rate at which the ledger amortizes to zero
///
/// A positive terminal balance means the rate is too high. `pv_amount` is
/// reported back in the out-of-range error.
pub fn solve_rate(
    ledger: &[LedgerEntry],
    compounding_periods: u32,
    config: &SolverConfig,
    pv_amount: f64,
) -> EngineResult<Convergence> {
    let search = Bisection::new(config.rate_min, config.rate_max, config.rate_tolerance)
        .with_max_iterations(config.max_iterations);

    let low_edge = config.rate_min + config.rate_edge;
    let high_edge = config.rate_max - config.rate_edge;

    let result = search.solve(
        |guess| {
            let balance = amortize(ledger, &Rates::new(guess, compounding_periods));
            if balance > 0.0 {
                Steer::Lower
            } else {
                Steer::Raise
            }
        },
        |min, max| min > high_edge || max < low_edge,
    );

    match result {
        Ok(convergence) => {
            log::debug!("Number of iterations: {}", convergence.iterations);
            Ok(convergence)
        }
        Err(BisectionError::Diverged { guess }) => Err(EngineError::RateOutOfRange {
            guess,
            amount: pv_amount,
        }),
        Err(BisectionError::Exhausted { iterations }) => Err(EngineError::ConvergenceFailed {
            solver: "rate".to_string(),
            iterations,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annuity::{CashFlowDefinition, FlowKind, Frequency};
    use crate::ledger::{expand, set_stubs};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn ledger(flows: &[CashFlowDefinition], periods: u32) -> Vec<LedgerEntry> {
        let mut ledger = expand(flows, periods).unwrap().ledger;
        set_stubs(&mut ledger, flows, periods, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()).unwrap();
        ledger
    }

    fn single(kind: FlowKind, first: &str, amount: f64) -> CashFlowDefinition {
        CashFlowDefinition {
            kind,
            first: first.to_string(),
            number: 1,
            amount,
            frequency: Frequency::Annual,
            ..Default::default()
        }
    }

    #[test]
    fn test_one_year_ten_percent() {
        let flows = vec![
            single(FlowKind::Invest, "2023-01-01", 1000.0),
            single(FlowKind::Return, "2024-01-01", 1100.0),
        ];
        let result = solve_rate(&ledger(&flows, 1), 1, &SolverConfig::default(), 1000.0).unwrap();
        assert_abs_diff_eq!(result.value, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_root_is_zero_balance() {
        let flows = vec![
            single(FlowKind::Invest, "2023-01-01", 1000.0),
            CashFlowDefinition {
                kind: FlowKind::Return,
                first: "2023-02-01".to_string(),
                number: 12,
                amount: 88.85,
                frequency: Frequency::Monthly,
                ..Default::default()
            },
        ];
        let ledger = ledger(&flows, 12);
        let result = solve_rate(&ledger, 12, &SolverConfig::default(), 1000.0).unwrap();
        assert_abs_diff_eq!(result.value, 0.12, epsilon = 1e-4);
        assert!(amortize(&ledger, &Rates::new(result.value, 12)).abs() < 1e-3);
    }

    #[test]
    fn test_payouts_too_large_for_any_rate() {
        // Doubling in a day needs a rate far beyond 100%
        let flows = vec![
            single(FlowKind::Invest, "2023-01-01", 1000.0),
            single(FlowKind::Return, "2023-01-02", 2000.0),
        ];
        let err = solve_rate(&ledger(&flows, 1), 1, &SolverConfig::default(), 1000.0).unwrap_err();
        match err {
            EngineError::RateOutOfRange { guess, amount } => {
                assert!(guess > 0.99);
                assert_eq!(amount, 1000.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
