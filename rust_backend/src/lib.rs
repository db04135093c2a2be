//! Visitor-log analytics engine.
//!
//! Turns a flat list of visit records (date, time of day, free-text
//! description) into time-bucketed counts and revenue, statistical summaries
//! and ranked views. The pipeline is:
//!
//! 1. [`io`] / [`parsing`]: load the exported JSON
//! 2. [`preprocessing`]: normalize dates, times, category and price
//! 3. [`transformations`]: apply date, category and hour filters
//! 4. [`algorithms`]: aggregate and derive metrics
//!
//! Every stage after loading is pure computation over in-memory records.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod time;
pub mod transformations;

pub use algorithms::{build_report, VisitReport, VisitSnapshot};
pub use config::EngineConfig;
pub use core::{CategoryFilter, FilterCriteria, NormalizedRecord, RawRecord};
pub use error::{VisitError, VisitResult};
pub use preprocessing::{PreprocessPipeline, RecordNormalizer};
