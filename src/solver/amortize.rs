//! Terminal balance of a stubbed ledger at a candidate rate

use serde::Serialize;

use crate::ledger::LedgerEntry;

/// Nominal and daily rates under a compounding frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    pub nominal: f64,
    pub daily: f64,
    pub compounding_periods: u32,
}

impl Rates {
    /// Daily rate on a 365-day year
    pub fn new(nominal: f64, compounding_periods: u32) -> Self {
        Self {
            nominal,
            daily: nominal / 365.0,
            compounding_periods,
        }
    }

    /// Growth of one compounding period
    pub fn period_growth(&self) -> f64 {
        1.0 + self.nominal / self.compounding_periods.max(1) as f64
    }

    /// Roll a balance forward over simple-interest stub days, then whole periods
    pub fn accrue(&self, balance: f64, stub_days: i64, stub_periods: f64) -> f64 {
        let with_stub = balance + stub_days as f64 * self.daily * balance;
        with_stub * self.period_growth().powf(stub_periods)
    }
}

/// Balance left after applying every entry in order, starting from zero
///
/// Investments increase the balance and payouts reduce it. A positive result
/// means the payouts were not enough to retire the capital at this rate.
pub fn amortize(ledger: &[LedgerEntry], rates: &Rates) -> f64 {
    ledger.iter().fold(0.0, |balance, entry| {
        rates.accrue(balance, entry.stub_days, entry.stub_periods) - entry.signed_amount()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annuity::{CashFlowDefinition, FlowKind, Frequency};
    use crate::ledger::{expand, set_stubs};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn loan_ledger() -> Vec<LedgerEntry> {
        let flows = vec![
            CashFlowDefinition {
                kind: FlowKind::Invest,
                first: "2023-01-01".to_string(),
                number: 1,
                amount: 1000.0,
                frequency: Frequency::Monthly,
                ..Default::default()
            },
            CashFlowDefinition {
                kind: FlowKind::Return,
                first: "2023-02-01".to_string(),
                number: 12,
                amount: 88.85,
                frequency: Frequency::Monthly,
                ..Default::default()
            },
        ];
        let mut ledger = expand(&flows, 12).unwrap().ledger;
        set_stubs(&mut ledger, &flows, 12, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()).unwrap();
        ledger
    }

    #[test]
    fn test_balance_is_pure() {
        let ledger = loan_ledger();
        let rates = Rates::new(0.12, 12);
        let first = amortize(&ledger, &rates);
        let second = amortize(&ledger, &rates);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_rate_zero_stubs_is_negated_sum() {
        let mut ledger = loan_ledger();
        for entry in ledger.iter_mut() {
            entry.stub_days = 0;
            entry.stub_periods = 0.0;
        }
        let expected: f64 = -ledger.iter().map(|e| e.signed_amount()).sum::<f64>();
        assert_abs_diff_eq!(amortize(&ledger, &Rates::new(0.0, 12)), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_standard_loan_retires_near_zero() {
        // 1000 at 12% monthly for 12 months pays 88.85
        let balance = amortize(&loan_ledger(), &Rates::new(0.12, 12));
        assert!(balance.abs() < 0.05, "residual balance {}", balance);
    }

    #[test]
    fn test_accrue_applies_stub_days_then_periods() {
        let rates = Rates::new(0.0365, 1);
        let rolled = rates.accrue(1000.0, 10, 1.0);
        assert_abs_diff_eq!(rolled, 1000.0 * 1.001 * 1.0365, epsilon = 1e-9);
    }
}
