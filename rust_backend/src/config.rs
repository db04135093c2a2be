//! Engine configuration file support.
//!
//! Every business constant (prices, category marker, dwell time, capacity,
//! bucket width, operating hours, rolling window) is supplied here rather
//! than hardcoded. Configuration can be read from a TOML file:
//!
//! ```toml
//! [pricing]
//! child_price = 2
//! adult_price = 3
//! child_marker = "bamb"
//!
//! [occupancy]
//! dwell_minutes = 75
//! bucket_minutes = 5
//! capacity = 60
//!
//! [view]
//! hour_range_floor = 9
//! hour_range_ceiling = 17
//! rolling_window_size = 7
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::{FilterCriteria, HourRange, PriceTable};
use crate::error::{VisitError, VisitResult};

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub occupancy: OccupancySettings,
    #[serde(default)]
    pub view: ViewSettings,
}

/// Category pricing and detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_child_price")]
    pub child_price: u32,
    #[serde(default = "default_adult_price")]
    pub adult_price: u32,
    /// Case-insensitive substring of the description marking a child visit.
    #[serde(default = "default_child_marker")]
    pub child_marker: String,
}

/// Occupancy simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySettings {
    #[serde(default = "default_dwell_minutes")]
    pub dwell_minutes: u32,
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: u32,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

/// Presentation-oriented defaults for a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub hour_range_floor: Option<u32>,
    #[serde(default)]
    pub hour_range_ceiling: Option<u32>,
    #[serde(default = "default_rolling_window_size")]
    pub rolling_window_size: usize,
    /// Absolute z-score at which a daily total is reported as an anomaly.
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
    #[serde(default = "default_top_hotspots")]
    pub top_hotspots: usize,
}

fn default_child_price() -> u32 {
    2
}

fn default_adult_price() -> u32 {
    3
}

fn default_child_marker() -> String {
    "bamb".to_string()
}

fn default_dwell_minutes() -> u32 {
    75
}

fn default_bucket_minutes() -> u32 {
    5
}

fn default_capacity() -> u32 {
    60
}

fn default_rolling_window_size() -> usize {
    7
}

fn default_anomaly_threshold() -> f64 {
    2.0
}

fn default_top_hotspots() -> usize {
    15
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            child_price: default_child_price(),
            adult_price: default_adult_price(),
            child_marker: default_child_marker(),
        }
    }
}

impl Default for OccupancySettings {
    fn default() -> Self {
        Self {
            dwell_minutes: default_dwell_minutes(),
            bucket_minutes: default_bucket_minutes(),
            capacity: default_capacity(),
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            hour_range_floor: None,
            hour_range_ceiling: None,
            rolling_window_size: default_rolling_window_size(),
            anomaly_threshold: default_anomaly_threshold(),
            top_hotspots: default_top_hotspots(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> VisitResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            VisitError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> VisitResult<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            VisitError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `visitlog.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> VisitResult<Self> {
        let search_paths = [
            PathBuf::from("visitlog.toml"),
            PathBuf::from("rust_backend/visitlog.toml"),
            PathBuf::from("../visitlog.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(VisitError::ConfigurationError(
            "No visitlog.toml found in standard locations".to_string(),
        ))
    }

    /// Reject values that would make the engine loop forever or divide by zero.
    pub fn validate(&self) -> VisitResult<()> {
        if self.pricing.child_marker.trim().is_empty() {
            return Err(VisitError::ConfigurationError(
                "child_marker must not be empty".to_string(),
            ));
        }
        if self.occupancy.dwell_minutes == 0 {
            return Err(VisitError::ConfigurationError(
                "dwell_minutes must be positive".to_string(),
            ));
        }
        if self.occupancy.bucket_minutes == 0 {
            return Err(VisitError::ConfigurationError(
                "bucket_minutes must be positive".to_string(),
            ));
        }
        if self.occupancy.capacity == 0 {
            return Err(VisitError::ConfigurationError(
                "capacity must be positive".to_string(),
            ));
        }
        if self.view.rolling_window_size == 0 {
            return Err(VisitError::ConfigurationError(
                "rolling_window_size must be positive".to_string(),
            ));
        }
        if !(self.view.anomaly_threshold.is_finite() && self.view.anomaly_threshold > 0.0) {
            return Err(VisitError::ConfigurationError(format!(
                "anomaly_threshold must be a positive number, got {}",
                self.view.anomaly_threshold
            )));
        }
        self.hour_range()?;
        Ok(())
    }

    pub fn price_table(&self) -> PriceTable {
        PriceTable::new(self.pricing.child_price, self.pricing.adult_price)
    }

    /// Operating-hours restriction, present only when both bounds are set.
    pub fn hour_range(&self) -> VisitResult<Option<HourRange>> {
        match (self.view.hour_range_floor, self.view.hour_range_ceiling) {
            (Some(floor), Some(ceiling)) => HourRange::new(floor, ceiling).map(Some),
            _ => Ok(None),
        }
    }

    /// Filter criteria seeded from the view settings, covering all dates.
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            rolling_window_size: self.view.rolling_window_size,
            hour_range_floor: self.view.hour_range_floor,
            hour_range_ceiling: self.view.hour_range_ceiling,
            ..FilterCriteria::default()
        }
    }
}
