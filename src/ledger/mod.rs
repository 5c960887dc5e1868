//! Expanded, dated ledger of individual cash-flow occurrences

mod entry;
mod expand;
mod stubs;

pub use entry::LedgerEntry;
pub use expand::{expand, Expansion};
pub use stubs::{create_stubs, set_stubs, Stub};
