//! Error types for annuity solving
//!
//! Every failure is a modeling or convergence failure local to one solve.
//! Retrying with identical input fails identically.

use thiserror::Error;

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while loading, validating or solving an annuity
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Empty request body or input file
    #[error("Please send a request body")]
    EmptyInput,

    /// A field of the annuity definition failed validation
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A date could not be parsed or fell outside the supported range
    #[error("Invalid date: {value}")]
    InvalidDate { value: String },

    /// A cash-flow solve was requested but no row is flagged unknown
    #[error("No unknown cash flow: flag exactly one cash flow row as Unknown, or set Unknown on the annuity to solve for the rate")]
    MissingUnknown,

    /// No `Invest` flow exists and the configuration requires one
    #[error("No investment cash flow found to establish the as-of date")]
    MissingAsOf,

    /// Rate bisection pinned against the (-1, 1) boundary
    #[error("interest rate out of range error with guessed rate = {guess} and annuity pv = {amount}")]
    RateOutOfRange { guess: f64, amount: f64 },

    /// Cash-flow bisection walked out to its floor or ceiling
    #[error("the cash flow in row {row} has iterated beyond the max/min range - check that your variables are correct")]
    CashFlowDiverged { row: usize },

    /// A bisection exceeded its iteration cap
    #[error("{solver} did not converge after {iterations} iterations")]
    ConvergenceFailed { solver: String, iterations: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_date(value: impl Into<String>) -> Self {
        EngineError::InvalidDate { value: value.into() }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}
