//! A single expanded payment or investment event

use chrono::NaiveDate;
use serde::Serialize;

use crate::annuity::{FlowKind, Frequency};

/// One occurrence of a cash-flow definition on the ledger
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Index of the originating cash-flow definition
    pub row: usize,

    /// Occurrence index within the originating definition (0-based)
    pub occurrence: usize,

    pub date: NaiveDate,
    pub amount: f64,
    pub kind: FlowKind,
    pub frequency: Frequency,

    // Metadata carried through from the definition
    pub escrow: bool,
    pub case_code: String,
    pub owner: String,

    /// Residual days of nominal accrual since the previous entry
    pub stub_days: i64,

    /// Compounding periods since the previous entry (fractional when
    /// payments are more frequent than compounding)
    pub stub_periods: f64,

    /// Residual days since the as-of date
    pub dcf_stub_days: i64,

    /// Whole months since the as-of date
    pub dcf_stub_periods: f64,

    /// Signed discount factor at the effective rate
    pub discount_factor: f64,

    /// Discounted amount, rounded to cents
    pub discounted: f64,
}

impl LedgerEntry {
    /// -1 for investments, +1 for payouts
    pub fn sign(&self) -> f64 {
        self.kind.sign()
    }

    pub fn signed_amount(&self) -> f64 {
        self.amount * self.sign()
    }

    pub fn is_payout(&self) -> bool {
        !self.kind.is_invest()
    }

    /// Fractional months since the as-of date
    pub fn dcf_months(&self) -> f64 {
        self.dcf_stub_periods + self.dcf_stub_days as f64 / 365.0 * 12.0
    }

    /// Synthetic investment used to value the remaining ledger at a date
    pub(crate) fn synthetic(date: NaiveDate, amount: f64) -> Self {
        Self {
            row: usize::MAX,
            occurrence: 0,
            date,
            amount,
            kind: FlowKind::Invest,
            frequency: Frequency::Payment,
            escrow: false,
            case_code: String::new(),
            owner: String::new(),
            stub_days: 0,
            stub_periods: 0.0,
            dcf_stub_days: 0,
            dcf_stub_periods: 0.0,
            discount_factor: 0.0,
            discounted: 0.0,
        }
    }
}
