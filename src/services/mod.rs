// src/services/mod.rs

pub mod catalog;
pub mod ledger;
pub mod recorder;
pub mod review;

pub use catalog::Catalog;
pub use ledger::AttemptLedger;
pub use recorder::ResponseRecorder;
pub use review::ReviewAggregator;
