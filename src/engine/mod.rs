//! Annuity solve engine
//!
//! Drives a definition through expansion, stubbing, the rate or cash-flow
//! solve, metrics and optional reporting.

mod result;
mod solve;

pub use result::{SolveResult, SolvedAnnuity};
pub use solve::{solve, AnnuityEngine};
