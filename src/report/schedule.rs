//! Amortization schedule with yearly and grand totals

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::dates::format_date;
use crate::ledger::LedgerEntry;
use crate::metrics::round_to;
use crate::solver::Rates;

/// Kind of schedule row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowType {
    Return,
    Invest,
    /// Totals of the payout rows dated in the given year
    YearTotals(i32),
    GrandTotals,
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowType::Return => write!(f, "Return"),
            RowType::Invest => write!(f, "Invest"),
            RowType::YearTotals(year) => write!(f, "{year} Totals"),
            RowType::GrandTotals => write!(f, "Grand Totals"),
        }
    }
}

impl Serialize for RowType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One line of the amortization schedule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleRow {
    #[serde(rename = "Type")]
    pub row_type: RowType,

    /// MM/DD/YYYY, empty on totals rows
    pub date: String,

    pub payment: f64,
    pub principal: f64,
    pub interest: f64,

    #[serde(rename = "DCFPrincipal")]
    pub dcf_principal: f64,

    #[serde(rename = "DCFInterest")]
    pub dcf_interest: f64,

    pub balance: f64,
}

impl ScheduleRow {
    pub fn is_totals(&self) -> bool {
        matches!(self.row_type, RowType::YearTotals(_) | RowType::GrandTotals)
    }
}

/// Schedule rows plus the adjustments made while building them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,

    /// Residual balance folded into the final row
    pub rounding: f64,

    /// Difference between the as-of value and the discounted value, folded
    /// into the first payout after the as-of date
    #[serde(rename = "DCFRounding")]
    pub dcf_rounding: f64,

    /// Largest balance reached before a payment
    #[serde(rename = "HWMark")]
    pub hw_mark: f64,

    #[serde(rename = "HWMarkDate")]
    pub hw_mark_date: Option<String>,
}

/// Build the schedule for a solved ledger
///
/// `pv` is the value at the as-of date and `dcf_pv` the sum of discounted
/// amounts; their difference is booked as the DCF rounding.
pub fn build_schedule(ledger: &[LedgerEntry], rates: &Rates, as_of: NaiveDate, pv: f64, dcf_pv: f64) -> Schedule {
    let mut rows = Vec::with_capacity(ledger.len());
    let mut prev = 0.0;
    let mut hw_mark = 0.0;
    let mut hw_mark_date = None;

    for entry in ledger {
        let accrued = rates.accrue(prev, entry.stub_days, entry.stub_periods);
        if accrued > hw_mark {
            hw_mark = accrued;
            hw_mark_date = Some(entry.date);
        }

        let payment = entry.amount;
        let signed = entry.signed_amount();
        let interest = round_to(accrued - prev, 2);
        let balance = round_to(prev + interest - signed, 2);
        let principal = round_to(signed - interest, 2);

        let (row_type, dcf_principal, dcf_interest) = if entry.is_payout() {
            (RowType::Return, entry.discounted, round_to(payment - entry.discounted, 2))
        } else {
            (RowType::Invest, entry.discounted, 0.0)
        };

        rows.push(ScheduleRow {
            row_type,
            date: format_date(entry.date),
            payment,
            principal,
            interest,
            dcf_principal,
            dcf_interest,
            balance,
        });
        prev = balance;
    }

    let rounding = fold_final_rounding(&mut rows);

    let dcf_rounding = round_to(pv - dcf_pv, 2);
    if let Some(i) = ledger.iter().position(|e| e.is_payout() && e.date != as_of) {
        let row = &mut rows[i];
        row.dcf_principal = round_to(row.dcf_principal + dcf_rounding, 2);
        row.dcf_interest = round_to(row.dcf_interest - dcf_rounding, 2);
    }

    Schedule {
        rows: with_totals(rows),
        rounding,
        dcf_rounding,
        hw_mark: round_to(hw_mark, 2),
        hw_mark_date: hw_mark_date.map(format_date),
    }
}

/// Move the final residual balance into interest and principal; returns the residual
fn fold_final_rounding(rows: &mut [ScheduleRow]) -> f64 {
    let Some(last) = rows.last_mut() else {
        return 0.0;
    };
    let rounding = last.balance;
    last.interest = round_to(last.interest - rounding, 2);
    last.principal = round_to(last.principal + rounding, 2);
    last.balance = 0.0;
    rounding
}

#[derive(Debug, Default)]
struct Totals {
    payment: f64,
    interest: f64,
    dcf_interest: f64,
}

impl Totals {
    fn add(&mut self, row: &ScheduleRow) {
        self.payment += row.payment;
        self.interest += row.interest;
        self.dcf_interest += row.dcf_interest;
    }

    fn row(&self, row_type: RowType) -> ScheduleRow {
        let payment = round_to(self.payment, 2);
        let interest = round_to(self.interest, 2);
        let dcf_interest = round_to(self.dcf_interest, 2);
        ScheduleRow {
            row_type,
            date: String::new(),
            payment,
            principal: round_to(payment - interest, 2),
            interest,
            dcf_principal: round_to(payment - dcf_interest, 2),
            dcf_interest,
            balance: 0.0,
        }
    }
}

/// Insert a totals row after each calendar year and a grand total at the end
///
/// Only payout rows count towards the totals.
fn with_totals(rows: Vec<ScheduleRow>) -> Vec<ScheduleRow> {
    let Some(first) = rows.first() else {
        return rows;
    };

    let mut year = row_year(&first.date);
    let mut out = Vec::with_capacity(rows.len() + rows.len() / 12 + 2);
    let mut year_totals = Totals::default();
    let mut grand_totals = Totals::default();

    for row in rows {
        let this_year = row_year(&row.date);
        if this_year != year {
            out.push(year_totals.row(RowType::YearTotals(year)));
            year_totals = Totals::default();
            year = this_year;
        }
        if row.row_type == RowType::Return {
            year_totals.add(&row);
            grand_totals.add(&row);
        }
        out.push(row);
    }

    out.push(year_totals.row(RowType::YearTotals(year)));
    out.push(grand_totals.row(RowType::GrandTotals));
    out
}

/// Year from the trailing four characters of an MM/DD/YYYY date
fn row_year(date: &str) -> i32 {
    date.get(date.len().saturating_sub(4)..)
        .and_then(|y| y.parse().ok())
        .unwrap_or(0)
}
