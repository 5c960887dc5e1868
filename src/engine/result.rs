//! Output structures for a solve

use chrono::NaiveDate;
use serde::Serialize;

use crate::metrics::FlowSummary;
use crate::report::{ScheduleRow, YearEndValuation};

/// Derived state of a solved annuity; the input definition is left untouched
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SolvedAnnuity {
    pub nominal: f64,
    pub daily_rate: f64,
    pub effective: f64,
    pub compounding_periods: u32,
    pub as_of: NaiveDate,
    pub aggregate: f64,

    /// Discounted value used to narrow an unknown-investment search
    #[serde(rename = "EstimateDCF")]
    pub estimate_dcf: Option<f64>,
}

/// Complete answer for one annuity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SolveResult {
    /// Row solved for, `None` when solving for the rate
    pub unknown_row: Option<usize>,

    /// Solved nominal rate or cash-flow amount
    pub answer: f64,

    #[serde(rename = "PV")]
    pub pv: f64,

    #[serde(rename = "DCFpv")]
    pub dcf_pv: f64,

    #[serde(rename = "DCFRounding")]
    pub dcf_rounding: f64,

    pub rounding: f64,

    #[serde(rename = "WAL")]
    pub wal: f64,

    pub term: f64,

    #[serde(rename = "HWMark")]
    pub hw_mark: f64,

    #[serde(rename = "HWMarkDate")]
    pub hw_mark_date: Option<String>,

    pub total_payout: f64,
    pub solved: SolvedAnnuity,
    pub flows: Vec<FlowSummary>,

    #[serde(rename = "AmSchedule", skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleRow>>,

    #[serde(rename = "YEValuations", skip_serializing_if = "Option::is_none")]
    pub year_end: Option<Vec<YearEndValuation>>,
}

impl SolveResult {
    /// Schedule rows, empty when the schedule was not requested
    pub fn schedule_rows(&self) -> &[ScheduleRow] {
        self.schedule.as_deref().unwrap_or(&[])
    }

    pub fn is_rate_solve(&self) -> bool {
        self.unknown_row.is_none()
    }

    /// Human-readable description of the answer
    pub fn answer_label(&self) -> String {
        match self.unknown_row {
            None => format!(
                "Nominal rate {:.6}% (effective {:.6}%)",
                self.solved.nominal * 100.0,
                self.solved.effective * 100.0
            ),
            Some(row) => format!("Cash flow row {} amount {:.2}", row, self.answer),
        }
    }
}
