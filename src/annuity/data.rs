//! Annuity definition structures matching the calculator's JSON request format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::{add_months, parse_date};
use crate::error::{EngineError, EngineResult};
use crate::metrics::round_to;

/// Payment or compounding frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
    #[serde(alias = "Semi-Annual", alias = "Semiannual")]
    SemiAnnual,
    Annual,
    /// Payment-aligned: follows the annuity's compounding frequency
    Payment,
    /// Any label the calculator does not recognize
    #[serde(other)]
    Other,
}

impl Frequency {
    /// Periods per year, or `None` when the frequency must fall back to compounding
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::SemiAnnual => Some(2),
            Frequency::Annual => Some(1),
            Frequency::Payment | Frequency::Other => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::SemiAnnual => "SemiAnnual",
            Frequency::Annual => "Annual",
            Frequency::Payment => "Payment",
            Frequency::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Direction of a cash flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FlowKind {
    /// Capital paid in
    Invest,
    /// Payout; any label other than `Invest`
    #[default]
    #[serde(other)]
    Return,
}

impl FlowKind {
    /// Ledger sign: -1 for capital in, +1 for payouts
    pub fn sign(&self) -> f64 {
        match self {
            FlowKind::Invest => -1.0,
            FlowKind::Return => 1.0,
        }
    }

    pub fn is_invest(&self) -> bool {
        matches!(self, FlowKind::Invest)
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Invest => write!(f, "Invest"),
            FlowKind::Return => write!(f, "Return"),
        }
    }
}

/// One payment stream of an annuity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct CashFlowDefinition {
    pub case_code: String,
    pub parent_child: String,
    pub buyer: String,

    #[serde(rename = "CfType")]
    pub kind: FlowKind,

    /// First payment date as supplied
    pub first: String,

    /// Last payment date as supplied (informational only)
    pub last: String,

    /// Number of occurrences
    pub number: u32,

    pub amount: f64,
    pub frequency: Frequency,

    /// Escalation rate applied after each COLA cycle
    #[serde(rename = "COLA")]
    pub cola: f64,

    /// Occurrences per escalation cycle (0 = one year of payments)
    pub cola_periods: u32,

    /// The amount the cash-flow solver determines
    pub unknown: bool,

    pub escrow: bool,
}

impl CashFlowDefinition {
    /// Payments per year, falling back to the compounding frequency
    pub fn payments_per_year(&self, compounding_periods: u32) -> u32 {
        self.frequency
            .periods_per_year()
            .unwrap_or(compounding_periods)
    }

    /// Calendar months between consecutive occurrences
    pub fn months_per_period(&self, compounding_periods: u32) -> u32 {
        12 / self.payments_per_year(compounding_periods)
    }

    /// Occurrences per escalation cycle
    pub fn cola_cycle(&self, compounding_periods: u32) -> u32 {
        if self.cola_periods > 0 {
            self.cola_periods
        } else {
            self.payments_per_year(compounding_periods)
        }
    }

    pub fn first_payment_date(&self) -> EngineResult<NaiveDate> {
        parse_date(&self.first)
    }

    /// Date of the final occurrence
    pub fn last_payment_date(&self, compounding_periods: u32) -> EngineResult<NaiveDate> {
        let first = self.first_payment_date()?;
        let months = self.number.saturating_sub(1) * self.months_per_period(compounding_periods);
        add_months(first, months as i32)
    }

    /// Amount of every occurrence when the first one pays `base`
    ///
    /// After each completed COLA cycle, except after the final occurrence,
    /// the running amount grows by `1 + cola` and the paid amount is that
    /// running amount rounded to cents.
    pub fn amounts_from(&self, base: f64, compounding_periods: u32) -> Vec<f64> {
        let cycle = self.cola_cycle(compounding_periods).max(1);
        let number = self.number as usize;
        let mut amounts = Vec::with_capacity(number);
        let mut tracker = base;
        let mut amount = base;

        for j in 0..number {
            amounts.push(amount);
            if self.cola != 0.0 && (j + 1) % cycle as usize == 0 && j + 1 < number {
                tracker *= 1.0 + self.cola;
                amount = round_to(tracker, 2);
            }
        }

        amounts
    }

    /// Total paid by this stream, including escalation
    pub fn aggregate(&self, compounding_periods: u32) -> f64 {
        round_to(self.amounts_from(self.amount, compounding_periods).iter().sum(), 2)
    }
}

/// A complete annuity problem
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnnuityDefinition {
    #[serde(rename = "DCFCode")]
    pub dcf_code: String,
    pub label: String,
    pub desc: String,
    #[serde(rename = "Type")]
    pub annuity_type: String,
    pub carrier: String,
    pub document_recipient: String,
    #[serde(rename = "CustomCF")]
    pub custom_cf: bool,

    /// Compounding frequency of the nominal rate
    pub compounding: Frequency,

    /// True to solve for the rate, false to solve for one cash flow
    pub unknown: bool,

    /// Nominal annual rate (input when solving for a cash flow)
    pub nominal: f64,

    /// Effective annual rate (input when solving for a cash flow)
    pub effective: f64,

    /// Report nominal interest instead of DCF interest in year-end valuations
    pub use_am_schedule: bool,

    pub cash_flows: Vec<CashFlowDefinition>,
}

impl AnnuityDefinition {
    /// Compounding periods per year
    pub fn compounding_periods(&self) -> EngineResult<u32> {
        self.compounding.periods_per_year().ok_or_else(|| {
            EngineError::invalid_input(
                "Compounding",
                format!("{} does not define periods per year", self.compounding),
            )
        })
    }

    /// Total number of ledger entries the definition expands to
    pub fn payment_count(&self) -> usize {
        self.cash_flows.iter().map(|cf| cf.number as usize).sum()
    }

    /// Amount of the first `Invest` flow, or 0
    pub fn investment_value(&self) -> f64 {
        self.cash_flows
            .iter()
            .find(|cf| cf.kind.is_invest())
            .map(|cf| cf.amount)
            .unwrap_or(0.0)
    }

    /// Index of the single row flagged unknown
    pub fn unknown_row(&self) -> EngineResult<usize> {
        let mut flagged = self
            .cash_flows
            .iter()
            .enumerate()
            .filter(|(_, cf)| cf.unknown)
            .map(|(row, _)| row);

        let row = flagged.next().ok_or(EngineError::MissingUnknown)?;
        if flagged.next().is_some() {
            return Err(EngineError::invalid_input(
                "CashFlows",
                "at most one cash flow may be flagged Unknown",
            ));
        }
        Ok(row)
    }

    /// Check structural invariants before solving
    pub fn validate(&self) -> EngineResult<()> {
        self.compounding_periods()?;

        if self.cash_flows.is_empty() {
            return Err(EngineError::invalid_input("CashFlows", "at least one cash flow is required"));
        }

        for (row, cf) in self.cash_flows.iter().enumerate() {
            if cf.number == 0 {
                return Err(EngineError::invalid_input(
                    format!("CashFlows[{row}].Number"),
                    "must be at least 1",
                ));
            }
            cf.first_payment_date()?;
        }

        if self.cash_flows.iter().filter(|cf| cf.unknown).count() > 1 {
            return Err(EngineError::invalid_input(
                "CashFlows",
                "at most one cash flow may be flagged Unknown",
            ));
        }

        Ok(())
    }
}
