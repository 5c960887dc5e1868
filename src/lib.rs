//! Annuity Solver - amortization and root-finding engine for structured annuities
//!
//! This library provides:
//! - Expansion of multi-row cash-flow definitions into a dated ledger
//! - Stub-period accrual between irregular payment dates
//! - Bisection solves for the interest rate or a single unknown cash flow
//! - Present value, DCF, WAL and aggregate metrics
//! - Amortization schedules with yearly totals and year-end valuations

pub mod annuity;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod report;
pub mod solver;

// Re-export commonly used types
pub use annuity::{load_annuity, parse_annuity, AnnuityDefinition, CashFlowDefinition, FlowKind, Frequency};
pub use config::{AsOfPolicy, SolverConfig};
pub use engine::{solve, AnnuityEngine, SolveResult, SolvedAnnuity};
pub use error::{EngineError, EngineResult};
pub use report::{RowType, ScheduleRow, YearEndValuation};
