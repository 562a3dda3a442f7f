//! Resolution pipeline for lineup.
//!
//! Orchestrates, for each staged source record: mapping lookup, slug
//! lookup, fuzzy candidate search, and the create/merge/flag decision,
//! plus the paged migration runner and the per-source payload adapters
//! at the ingestion boundary.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod runner;
pub mod sources;
pub mod validate;

pub use config::Config;
pub use engine::{Resolution, ResolutionEngine, ResolveOutcome};
pub use error::{Error, Result};
pub use report::{MigrationReport, MigrationStats};
pub use runner::MigrationRunner;
pub use validate::Finding;
