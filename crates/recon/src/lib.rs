//! `rulemerge-recon`: two-dataset report reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded CSV text, returns a merged report.
//! No CLI or filesystem dependencies.

pub mod aggregate;
pub mod config;
pub mod derive;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use config::ReportConfig;
pub use engine::{load_dataset, run};
pub use error::ReportError;
pub use model::{Dataset, MergedRow, Record, ReportInput, ReportResult};
pub use normalize::CompiledRules;
