//! Record filtering.
//!
//! Filters narrow the normalized record set to the active date range,
//! visitor category and operating hours before aggregation runs.
//!
//! # Example
//!
//! ```
//! use visitlog::core::domain::{CategoryFilter, FilterCriteria, RawRecord};
//! use visitlog::preprocessing::RecordNormalizer;
//! use visitlog::transformations::apply_filters;
//!
//! let records = RecordNormalizer::default()
//!     .normalize(&[
//!         RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
//!         RawRecord::new("2024-06-01", Some("09:40"), "Bambino"),
//!     ])
//!     .records;
//!
//! let criteria = FilterCriteria {
//!     category: CategoryFilter::ChildrenOnly,
//!     ..FilterCriteria::default()
//! };
//! let children = apply_filters(&records, &criteria).unwrap();
//! assert_eq!(children.len(), 1);
//! ```

pub mod filtering;

pub use filtering::{
    apply_filters, date_bounds, distinct_dates, filter_by_category, filter_by_date_range,
    filter_by_hour_range, sort_by_time,
};
