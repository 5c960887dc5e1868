//! Amortization schedule and year-end valuation reports

mod schedule;
mod year_end;

pub use schedule::{build_schedule, RowType, Schedule, ScheduleRow};
pub use year_end::{year_end_summary, YearEndValuation};
