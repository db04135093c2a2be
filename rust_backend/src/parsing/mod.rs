//! Parsers for visitor-log data formats.
//!
//! # Parsers
//!
//! - [`json_parser`]: Parse the exported JSON array of visits
//!
//! # Example
//!
//! ```no_run
//! use visitlog::parsing::json_parser::parse_visits_json;
//! use std::path::Path;
//!
//! let records = parse_visits_json(Path::new("clienti.json"))
//!     .expect("Failed to parse visits");
//! ```

pub mod json_parser;


pub use json_parser::{parse_visits_json, parse_visits_json_str};
