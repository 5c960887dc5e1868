//! Root solvers over the amortization balance

mod amortize;
mod bisection;
mod cashflow;
mod rate;

pub use amortize::{amortize, Rates};
pub use bisection::{Bisection, BisectionError, Convergence, Steer};
pub use cashflow::{apply_amount, solve_cash_flow};
pub use rate::solve_rate;
