use anyhow::{Context, Result};
use std::path::Path;

use crate::config::EngineConfig;
use crate::core::domain::{NormalizedRecord, RawRecord};
use crate::io::VisitLoader;
use crate::preprocessing::normalizer::{NormalizeReport, RecordNormalizer};

/// Result of preprocessing operation
#[derive(Debug)]
pub struct PreprocessResult {
    pub records: Vec<NormalizedRecord>,
    pub report: NormalizeReport,
    pub total_records: usize,
    pub child_records: usize,
}

/// Main preprocessing pipeline: load, then normalize
pub struct PreprocessPipeline {
    normalizer: RecordNormalizer,
}

impl PreprocessPipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            normalizer: RecordNormalizer::from_config(config),
        }
    }

    /// Process a visitor-log file into normalized records
    ///
    /// # Arguments
    /// * `path` - Path to the exported JSON file
    ///
    /// # Returns
    /// PreprocessResult with records and the normalization report
    pub fn process(&self, path: &Path) -> Result<PreprocessResult> {
        let loaded = VisitLoader::load_from_file(path)
            .with_context(|| format!("Failed to load visits from {}", path.display()))?;

        Ok(self.process_records(&loaded.records))
    }

    /// Process from JSON string (useful for testing or API usage)
    pub fn process_json_str(&self, json_str: &str) -> Result<PreprocessResult> {
        let loaded =
            VisitLoader::load_from_json_str(json_str).context("Failed to parse visits JSON")?;

        Ok(self.process_records(&loaded.records))
    }

    /// Normalize records that are already in memory
    pub fn process_records(&self, raw: &[RawRecord]) -> PreprocessResult {
        let result = self.normalizer.normalize(raw);

        log::info!(
            "Preprocessed {} visits: {} kept, {} dropped",
            result.report.stats.total_records,
            result.report.stats.kept_records,
            result.report.stats.dropped_records
        );

        PreprocessResult {
            total_records: result.report.stats.total_records,
            child_records: result.report.stats.child_records,
            records: result.records,
            report: result.report,
        }
    }
}

impl Default for PreprocessPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to preprocess a visitor-log file
pub fn preprocess_visits(path: &Path, config: &EngineConfig) -> Result<PreprocessResult> {
    PreprocessPipeline::with_config(config).process(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_json_str_basic() {
        let json = r#"[
            {"data": "2024-06-01", "orario": "09:15", "descrizione": "Adulto"},
            {"data": "2024-06-01", "orario": "09:40", "descrizione": "Bambino"},
            {"data": "2024-06-02", "orario": "10:00", "descrizione": "Adulto"}
        ]"#;

        let pipeline = PreprocessPipeline::new();
        let result = pipeline.process_json_str(json).unwrap();

        assert_eq!(result.total_records, 3);
        assert_eq!(result.child_records, 1);
        assert_eq!(result.records.len(), 3);
        assert!(result.report.is_clean());
    }

    #[test]
    fn test_process_with_dropped_records() {
        let json = r#"[
            {"data": "2024-06-01", "orario": "09:15", "descrizione": "Adulto"},
            {"orario": "09:40", "descrizione": "Bambino"}
        ]"#;

        let pipeline = PreprocessPipeline::new();
        let result = pipeline.process_json_str(json).unwrap();

        assert_eq!(result.total_records, 2);
        assert_eq!(result.records.len(), 1);
        assert!(!result.report.warnings.is_empty());
    }

    #[test]
    fn test_process_uses_configured_prices() {
        let config = EngineConfig::from_toml_str(
            "[pricing]\nchild_price = 5\nadult_price = 10\n",
        )
        .unwrap();
        let pipeline = PreprocessPipeline::with_config(&config);
        let result = pipeline
            .process_json_str(r#"[{"date": "2024-06-01", "description": "Adulto"}]"#)
            .unwrap();

        assert_eq!(result.records[0].unit_price, 10);
    }

    #[test]
    fn test_process_invalid_json() {
        let pipeline = PreprocessPipeline::new();
        assert!(pipeline.process_json_str("{").is_err());
    }
}
