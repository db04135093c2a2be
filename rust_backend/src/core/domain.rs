//! Domain models for visitor-log records and the criteria applied to them.
//!
//! A [`RawRecord`] is one visit as delivered by the data source. The
//! normalizer turns it into a fully typed [`NormalizedRecord`], which the
//! filtering, aggregation and metrics stages consume read-only.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{VisitError, VisitResult};

/// Accepts either a string or an integer for a record identifier.
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
    }

    Ok(Option::<StringOrInt>::deserialize(deserializer)?.map(|id| match id {
        StringOrInt::String(s) => s,
        StringOrInt::Int(i) => i.to_string(),
    }))
}

/// One visit as delivered by the data source.
///
/// Field names from exported visitor logs (`data`, `orario`, `descrizione`)
/// are accepted as aliases of the canonical names.
///
/// # Examples
///
/// ```
/// use visitlog::core::domain::RawRecord;
///
/// let record: RawRecord = serde_json::from_str(
///     r#"{"id": 7, "data": "2024-06-01", "orario": "09:15", "descrizione": "Adulto"}"#,
/// ).unwrap();
/// assert_eq!(record.id.as_deref(), Some("7"));
/// assert_eq!(record.date.as_deref(), Some("2024-06-01"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "deserialize_record_id")]
    pub id: Option<String>,
    #[serde(default, alias = "data")]
    pub date: Option<String>,
    #[serde(default, alias = "orario")]
    pub time: Option<String>,
    #[serde(default, alias = "descrizione")]
    pub description: Option<String>,
}

impl RawRecord {
    /// Convenience constructor for a record without an identifier.
    pub fn new(date: &str, time: Option<&str>, description: &str) -> Self {
        Self {
            id: None,
            date: Some(date.to_string()),
            time: time.map(str::to_string),
            description: Some(description.to_string()),
        }
    }
}

/// Visitor category inferred from the record description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Adult,
    Child,
}

/// Unit prices per category, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    pub child_price: u32,
    pub adult_price: u32,
}

impl PriceTable {
    pub fn new(child_price: u32, adult_price: u32) -> Self {
        Self {
            child_price,
            adult_price,
        }
    }

    /// Price charged for one visit of the given category.
    pub fn price_for(&self, category: Category) -> u32 {
        match category {
            Category::Child => self.child_price,
            Category::Adult => self.adult_price,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(2, 3)
    }
}

/// A validated visit with every derived field precomputed.
///
/// Built once per load by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Position in the original input; used as the stable tie-break.
    pub sequence_index: usize,
    pub id: String,
    pub date_key: String,
    pub date: NaiveDate,
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub half_hour_bucket: String,
    /// Sunday=0 .. Saturday=6.
    pub weekday: u32,
    pub is_child: bool,
    pub unit_price: u32,
    pub description: String,
}

impl NormalizedRecord {
    pub fn category(&self) -> Category {
        if self.is_child {
            Category::Child
        } else {
            Category::Adult
        }
    }
}

/// Category selection applied by the filter stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    AdultsOnly,
    ChildrenOnly,
}

impl CategoryFilter {
    pub fn matches(&self, is_child: bool) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::AdultsOnly => !is_child,
            CategoryFilter::ChildrenOnly => is_child,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = VisitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "adults-only" | "adults" | "adulti" => Ok(CategoryFilter::AdultsOnly),
            "children-only" | "children" | "bambini" => Ok(CategoryFilter::ChildrenOnly),
            other => Err(VisitError::InvalidInput(format!(
                "Invalid category filter: {}. Must be 'all', 'adults-only', or 'children-only'",
                other
            ))),
        }
    }
}

/// Inclusive range of hours of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub floor: u32,
    pub ceiling: u32,
}

impl HourRange {
    /// Build a range, rejecting hours past 23 and inverted bounds.
    pub fn new(floor: u32, ceiling: u32) -> VisitResult<Self> {
        if floor > 23 || ceiling > 23 {
            return Err(VisitError::ConfigurationError(format!(
                "Hour range bounds must be within 0-23, got {}-{}",
                floor, ceiling
            )));
        }
        if floor > ceiling {
            return Err(VisitError::ConfigurationError(format!(
                "Hour range floor {} is after ceiling {}",
                floor, ceiling
            )));
        }
        Ok(Self { floor, ceiling })
    }

    pub fn contains(&self, hour: u32) -> bool {
        (self.floor..=self.ceiling).contains(&hour)
    }

    pub fn hours(&self) -> std::ops::RangeInclusive<u32> {
        self.floor..=self.ceiling
    }
}

impl Default for HourRange {
    fn default() -> Self {
        Self {
            floor: 0,
            ceiling: 23,
        }
    }
}

/// Filter selection for one aggregation run.
///
/// Held by the caller and passed explicitly; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive lower date bound (`YYYY-MM-DD`).
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive upper date bound (`YYYY-MM-DD`).
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default = "default_rolling_window_size")]
    pub rolling_window_size: usize,
    #[serde(default)]
    pub hour_range_floor: Option<u32>,
    #[serde(default)]
    pub hour_range_ceiling: Option<u32>,
}

fn default_rolling_window_size() -> usize {
    7
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            category: CategoryFilter::All,
            rolling_window_size: default_rolling_window_size(),
            hour_range_floor: None,
            hour_range_ceiling: None,
        }
    }
}

impl FilterCriteria {
    /// Hour restriction, present only when both bounds are supplied.
    pub fn hour_range(&self) -> VisitResult<Option<HourRange>> {
        match (self.hour_range_floor, self.hour_range_ceiling) {
            (Some(floor), Some(ceiling)) => HourRange::new(floor, ceiling).map(Some),
            _ => Ok(None),
        }
    }

    /// Fail fast on settings that cannot produce a meaningful run.
    pub fn validate(&self) -> VisitResult<()> {
        if self.rolling_window_size == 0 {
            return Err(VisitError::ConfigurationError(
                "rolling_window_size must be positive".to_string(),
            ));
        }
        self.hour_range()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_accepts_canonical_names() {
        let record: RawRecord = serde_json::from_str(
            r#"{"id": "abc", "date": "2024-06-01", "time": "10:00", "description": "Adult"}"#,
        )
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("abc"));
        assert_eq!(record.time.as_deref(), Some("10:00"));
        assert_eq!(record.description.as_deref(), Some("Adult"));
    }

    #[test]
    fn test_raw_record_optional_fields() {
        let record: RawRecord = serde_json::from_str(r#"{"data": "2024-06-01"}"#).unwrap();
        assert!(record.id.is_none());
        assert!(record.time.is_none());
        assert!(record.description.is_none());
    }

    #[test]
    fn test_price_table_lookup() {
        let prices = PriceTable::new(2, 3);
        assert_eq!(prices.price_for(Category::Child), 2);
        assert_eq!(prices.price_for(Category::Adult), 3);
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Adults-Only".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::AdultsOnly
        );
        assert_eq!(
            "bambini".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::ChildrenOnly
        );
        assert!("seniors".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_hour_range_validation() {
        assert!(HourRange::new(9, 17).is_ok());
        assert!(HourRange::new(17, 9).is_err());
        assert!(HourRange::new(0, 24).is_err());
    }

    #[test]
    fn test_criteria_hour_range_requires_both_bounds() {
        let criteria = FilterCriteria {
            hour_range_floor: Some(9),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.hour_range().unwrap(), None);
    }

    #[test]
    fn test_criteria_rejects_zero_window() {
        let criteria = FilterCriteria {
            rolling_window_size: 0,
            ..FilterCriteria::default()
        };
        assert!(matches!(
            criteria.validate(),
            Err(VisitError::ConfigurationError(_))
        ));
    }
}
