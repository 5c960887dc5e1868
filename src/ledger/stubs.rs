//! Stub-period annotation of an expanded ledger
//!
//! Each entry carries two stubs: one against the previous entry, which drives
//! nominal accrual during amortization, and one against the as-of date, which
//! drives DCF valuation.

use chrono::NaiveDate;

use super::LedgerEntry;
use crate::annuity::CashFlowDefinition;
use crate::dates::{add_months, diff_days, months_between};
use crate::error::EngineResult;

/// Whole periods plus residual days between two dates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stub {
    pub days: i64,
    pub periods: f64,
}

/// Split the span `from..to` into whole `step_months` periods and leftover days
///
/// The periods are counted back from `to`, so the leftover days sit at the
/// start of the span.
pub fn create_stubs(from: NaiveDate, to: NaiveDate, step_months: u32) -> EngineResult<Stub> {
    let step = step_months.max(1) as i32;
    let periods = months_between(to, from).div_euclid(step);
    let anchor = add_months(to, -periods * step)?;

    Ok(Stub {
        days: diff_days(anchor, from),
        periods: periods as f64,
    })
}

/// Annotate every entry with its accrual and DCF stubs
///
/// `pv_date` is the as-of date DCF stubs are measured from. DCF stubs count
/// whole months so that discounting can convert them to years.
pub fn set_stubs(
    ledger: &mut [LedgerEntry],
    flows: &[CashFlowDefinition],
    compounding_periods: u32,
    pv_date: NaiveDate,
) -> EngineResult<()> {
    let compounding_months = 12 / compounding_periods.max(1);

    for i in 0..ledger.len() {
        if i == 0 {
            let first = &mut ledger[0];
            first.stub_days = 0;
            first.stub_periods = 0.0;
            first.dcf_stub_days = 0;
            first.dcf_stub_periods = 0.0;
            continue;
        }

        let (prev_row, prev_date) = (ledger[i - 1].row, ledger[i - 1].date);
        let entry = &mut ledger[i];

        let accrual = if entry.row == prev_row {
            // Consecutive occurrences of one flow are already frequency aligned
            let flow_months = flows
                .get(entry.row)
                .map(|cf| cf.months_per_period(compounding_periods))
                .unwrap_or(compounding_months);
            Stub {
                days: 0,
                periods: flow_months as f64 / compounding_months as f64,
            }
        } else {
            create_stubs(prev_date, entry.date, compounding_months)?
        };
        entry.stub_days = accrual.days;
        entry.stub_periods = accrual.periods;

        let dcf = create_stubs(pv_date, entry.date, 1)?;
        entry.dcf_stub_days = dcf.days;
        entry.dcf_stub_periods = dcf.periods;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annuity::{FlowKind, Frequency};
    use crate::ledger::expand;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn flow(kind: FlowKind, first: &str, number: u32, frequency: Frequency) -> CashFlowDefinition {
        CashFlowDefinition {
            kind,
            first: first.to_string(),
            number,
            amount: 100.0,
            frequency,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_stubs_whole_periods() {
        let stub = create_stubs(d(2023, 1, 1), d(2024, 1, 1), 12).unwrap();
        assert_eq!(stub, Stub { days: 0, periods: 1.0 });

        let stub = create_stubs(d(2023, 1, 1), d(2023, 4, 1), 1).unwrap();
        assert_eq!(stub, Stub { days: 0, periods: 3.0 });
    }

    #[test]
    fn test_create_stubs_residual_days() {
        // Jan 1 -> Mar 16 monthly: two whole months back from Mar 16 lands on Jan 16
        let stub = create_stubs(d(2023, 1, 1), d(2023, 3, 16), 1).unwrap();
        assert_eq!(stub, Stub { days: 15, periods: 2.0 });

        // Less than one quarter: no whole period, every day is stub
        let stub = create_stubs(d(2023, 1, 1), d(2023, 2, 15), 3).unwrap();
        assert_eq!(stub, Stub { days: 45, periods: 0.0 });
    }

    #[test]
    fn test_first_entry_has_zero_stubs() {
        let flows = vec![
            flow(FlowKind::Invest, "2023-01-01", 1, Frequency::Monthly),
            flow(FlowKind::Return, "2023-02-16", 3, Frequency::Monthly),
        ];
        let mut ledger = expand(&flows, 12).unwrap().ledger;
        set_stubs(&mut ledger, &flows, 12, d(2023, 1, 1)).unwrap();

        let first = &ledger[0];
        assert_eq!((first.stub_days, first.stub_periods), (0, 0.0));
        assert_eq!((first.dcf_stub_days, first.dcf_stub_periods), (0, 0.0));

        // Row change: calendar stub from Jan 1 to Feb 16
        assert_eq!((ledger[1].stub_days, ledger[1].stub_periods), (15, 1.0));
        // Same row: aligned periods, no days
        assert_eq!((ledger[2].stub_days, ledger[2].stub_periods), (0, 1.0));
        // DCF stub measured from the as-of date
        assert_eq!((ledger[3].dcf_stub_days, ledger[3].dcf_stub_periods), (15, 3.0));
    }

    #[test]
    fn test_monthly_payments_under_annual_compounding() {
        let flows = vec![
            flow(FlowKind::Invest, "2023-01-01", 1, Frequency::Annual),
            flow(FlowKind::Return, "2023-02-01", 3, Frequency::Monthly),
        ];
        let mut ledger = expand(&flows, 1).unwrap().ledger;
        set_stubs(&mut ledger, &flows, 1, d(2023, 1, 1)).unwrap();

        // One month is not a whole annual period: 31 stub days
        assert_eq!((ledger[1].stub_days, ledger[1].stub_periods), (31, 0.0));
        assert!((ledger[2].stub_periods - 1.0 / 12.0).abs() < 1e-12);
        assert_eq!(ledger[2].stub_days, 0);
    }
}
