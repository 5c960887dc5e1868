//! Solver configuration
//!
//! Defaults reproduce the calculator's fixed search bounds. Any field can be
//! overridden from `ANNUITY_*` environment variables.

use std::env;
use std::str::FromStr;

/// What to do when no `Invest` flow establishes an as-of date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsOfPolicy {
    /// Use the first ledger date and log a warning
    #[default]
    FirstEntry,
    /// Fail the solve with `EngineError::MissingAsOf`
    Require,
}

/// Bounds, tolerances and policies for the bisection searches
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Nominal rate search interval
    pub rate_min: f64,
    pub rate_max: f64,

    /// Width at which the rate search stops
    pub rate_tolerance: f64,

    /// Distance from the rate interval ends that counts as pinned
    pub rate_edge: f64,

    /// Absolute floor/ceiling of the cash-flow search
    pub cash_flow_floor: f64,
    pub cash_flow_ceiling: f64,

    pub cash_flow_tolerance: f64,

    /// Distance from the floor/ceiling that counts as diverged
    pub cash_flow_edge: f64,

    /// Relative half-width of the search band around an estimated investment
    pub invest_band: f64,

    /// Symmetric bound of the year-end valuation search
    pub year_end_bound: f64,

    pub year_end_tolerance: f64,

    /// Iteration cap shared by every bisection
    pub max_iterations: u32,

    pub as_of_policy: AsOfPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rate_min: -1.0,
            rate_max: 1.0,
            rate_tolerance: 1e-7,
            rate_edge: 1e-5,
            cash_flow_floor: -10_000_000.0,
            cash_flow_ceiling: 10_000_000.0,
            cash_flow_tolerance: 0.001,
            cash_flow_edge: 0.01,
            invest_band: 0.009,
            year_end_bound: 100_000_000.0,
            year_end_tolerance: 0.0001,
            max_iterations: 200,
            as_of_policy: AsOfPolicy::FirstEntry,
        }
    }
}

impl SolverConfig {
    /// Defaults overridden by any `ANNUITY_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &str, default: f64| parse_or(lookup(name), default);

        let cash_flow_bound = read("ANNUITY_CASH_FLOW_BOUND", defaults.cash_flow_ceiling).abs();

        Self {
            rate_tolerance: read("ANNUITY_RATE_TOLERANCE", defaults.rate_tolerance),
            cash_flow_floor: -cash_flow_bound,
            cash_flow_ceiling: cash_flow_bound,
            cash_flow_tolerance: read("ANNUITY_CASH_FLOW_TOLERANCE", defaults.cash_flow_tolerance),
            invest_band: read("ANNUITY_INVEST_BAND", defaults.invest_band),
            year_end_bound: read("ANNUITY_YEAR_END_BOUND", defaults.year_end_bound).abs(),
            year_end_tolerance: read("ANNUITY_YEAR_END_TOLERANCE", defaults.year_end_tolerance),
            max_iterations: parse_or(lookup("ANNUITY_MAX_ITERATIONS"), defaults.max_iterations),
            as_of_policy: if lookup("ANNUITY_REQUIRE_AS_OF").is_some() {
                AsOfPolicy::Require
            } else {
                defaults.as_of_policy
            },
            ..defaults
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
