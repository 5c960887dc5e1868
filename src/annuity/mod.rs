//! Annuity definitions and JSON loading

mod data;
pub mod loader;

pub use data::{AnnuityDefinition, CashFlowDefinition, FlowKind, Frequency};
pub use loader::{load_annuity, load_annuity_from_reader, parse_annuity};
