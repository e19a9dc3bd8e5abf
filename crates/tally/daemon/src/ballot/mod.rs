//! Ballot services: the vote ledger (write path) and the aggregation view
//! (read path). Both hold an injected storage handle; neither owns any
//! other mutable state.

mod ledger;
mod view;

pub use ledger::VoteLedger;
pub use view::{ResultsView, Snapshot};
