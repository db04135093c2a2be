//! Normalization of raw visits into typed records.
//!
//! Each [`RawRecord`] is parsed into a [`NormalizedRecord`] with its
//! timestamp, hour, half-hour bucket, weekday, category and unit price
//! precomputed. Records whose date cannot be parsed are dropped here and
//! reported back to the caller, so downstream stages never see a record
//! without a date.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::core::domain::{Category, NormalizedRecord, PriceTable, RawRecord};
use crate::time::{self, WeekStart};

/// Maximum number of drop reasons echoed in warnings
const MAX_REPORTED_DROPS: usize = 5;

/// A raw record rejected during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRecord {
    pub sequence_index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Summary counts gathered while normalizing.
///
/// # Fields
///
/// * `total_records` - Raw records received
/// * `kept_records` - Records that made it through
/// * `dropped_records` - Records rejected for an unparseable date
/// * `child_records` - Kept records classified as children
/// * `adult_records` - Kept records classified as adults
/// * `defaulted_times` - Kept records whose time was missing or unparseable
/// * `fallback_ids` - Kept records that received a sequential identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub total_records: usize,
    pub kept_records: usize,
    pub dropped_records: usize,
    pub child_records: usize,
    pub adult_records: usize,
    pub defaulted_times: usize,
    pub fallback_ids: usize,
}

/// Diagnostics for one normalization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub dropped: Vec<DroppedRecord>,
    pub warnings: Vec<String>,
    pub stats: NormalizeStats,
}

impl NormalizeReport {
    /// True when every raw record was kept.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Output of [`RecordNormalizer::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeResult {
    pub records: Vec<NormalizedRecord>,
    pub report: NormalizeReport,
}

/// Converts raw visits into normalized records.
///
/// # Examples
///
/// ```
/// use visitlog::core::domain::{PriceTable, RawRecord};
/// use visitlog::preprocessing::RecordNormalizer;
///
/// let normalizer = RecordNormalizer::new(PriceTable::new(2, 3), "bamb");
/// let result = normalizer.normalize(&[
///     RawRecord::new("2024-06-01", Some("09:40"), "Bambino"),
///     RawRecord::new("not a date", None, "Adulto"),
/// ]);
///
/// assert_eq!(result.records.len(), 1);
/// assert!(result.records[0].is_child);
/// assert_eq!(result.records[0].unit_price, 2);
/// assert_eq!(result.report.stats.dropped_records, 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    prices: PriceTable,
    child_marker: String,
}

impl RecordNormalizer {
    /// Create a normalizer with explicit prices and child marker.
    ///
    /// The marker is matched case-insensitively as a substring of the
    /// description.
    pub fn new(prices: PriceTable, child_marker: &str) -> Self {
        Self {
            prices,
            child_marker: child_marker.trim().to_lowercase(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.price_table(), &config.pricing.child_marker)
    }

    pub fn prices(&self) -> PriceTable {
        self.prices
    }

    /// Whether a description denotes a child visit.
    pub fn is_child(&self, description: &str) -> bool {
        !self.child_marker.is_empty() && description.to_lowercase().contains(&self.child_marker)
    }

    /// Normalize a batch, preserving input order.
    pub fn normalize(&self, raw_records: &[RawRecord]) -> NormalizeResult {
        let mut records = Vec::with_capacity(raw_records.len());
        let mut report = NormalizeReport::default();
        report.stats.total_records = raw_records.len();

        for (sequence_index, raw) in raw_records.iter().enumerate() {
            match self.normalize_one(sequence_index, raw, &mut report.stats) {
                Ok(record) => records.push(record),
                Err(reason) => report.dropped.push(DroppedRecord {
                    sequence_index,
                    id: raw.id.clone(),
                    reason,
                }),
            }
        }

        report.stats.kept_records = records.len();
        report.stats.dropped_records = report.dropped.len();
        report.stats.child_records = records.iter().filter(|r| r.is_child).count();
        report.stats.adult_records = report.stats.kept_records - report.stats.child_records;

        if !report.dropped.is_empty() {
            let samples: Vec<String> = report
                .dropped
                .iter()
                .take(MAX_REPORTED_DROPS)
                .map(|d| format!("#{}: {}", d.sequence_index, d.reason))
                .collect();
            let warning = format!(
                "Dropped {} of {} records with unparseable dates ({})",
                report.dropped.len(),
                raw_records.len(),
                samples.join("; ")
            );
            log::warn!("{}", warning);
            report.warnings.push(warning);
        }
        if report.stats.defaulted_times > 0 {
            report.warnings.push(format!(
                "{} records had no usable time and were placed at 00:00",
                report.stats.defaulted_times
            ));
        }

        log::debug!(
            "Normalized {} records ({} kept, {} dropped)",
            report.stats.total_records,
            report.stats.kept_records,
            report.stats.dropped_records
        );

        NormalizeResult { records, report }
    }

    fn normalize_one(
        &self,
        sequence_index: usize,
        raw: &RawRecord,
        stats: &mut NormalizeStats,
    ) -> Result<NormalizedRecord, String> {
        let date_str = raw.date.as_deref().unwrap_or("");
        let date = time::parse_date(date_str).ok_or_else(|| {
            if date_str.trim().is_empty() {
                "missing date".to_string()
            } else {
                format!("unparseable date '{}'", date_str)
            }
        })?;

        let time_of_day = match raw.time.as_deref().and_then(time::parse_time) {
            Some(t) => t,
            None => {
                stats.defaulted_times += 1;
                NaiveTime::MIN
            }
        };

        let id = match raw.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                stats.fallback_ids += 1;
                (sequence_index + 1).to_string()
            }
        };

        let description = raw.description.clone().unwrap_or_default();
        let is_child = self.is_child(&description);
        let category = if is_child {
            Category::Child
        } else {
            Category::Adult
        };

        Ok(NormalizedRecord {
            sequence_index,
            id,
            date_key: time::date_key(date),
            date,
            timestamp: date.and_time(time_of_day),
            hour: time_of_day.hour(),
            half_hour_bucket: time::half_hour_bucket(time_of_day),
            weekday: time::weekday_index(date, WeekStart::Sunday),
            is_child,
            unit_price: self.prices.price_for(category),
            description,
        })
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
