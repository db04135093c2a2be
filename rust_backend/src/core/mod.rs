//! Core domain models for visitor logs.
//!
//! This module defines the fundamental data structures used throughout the
//! engine: raw and normalized visit records, pricing, and filter criteria.

pub mod domain;

pub use domain::{
    Category, CategoryFilter, FilterCriteria, HourRange, NormalizedRecord, PriceTable, RawRecord,
};
