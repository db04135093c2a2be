use anyhow::{Context, Result};
use std::path::Path;

use crate::core::domain::RawRecord;
use crate::parsing::json_parser;

/// Result of loading visit data
#[derive(Debug)]
pub struct VisitLoadResult {
    pub records: Vec<RawRecord>,
    pub num_records: usize,
}

impl VisitLoadResult {
    pub fn new(records: Vec<RawRecord>) -> Self {
        let num_records = records.len();
        Self {
            records,
            num_records,
        }
    }
}

/// Unified interface for loading visitor logs
pub struct VisitLoader;

impl VisitLoader {
    /// Load visit data from a file (only JSON exports are supported)
    pub fn load_from_file(path: &Path) -> Result<VisitLoadResult> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "json" => Self::load_from_json(path),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }

    /// Load visit data from a JSON file
    pub fn load_from_json(json_path: &Path) -> Result<VisitLoadResult> {
        let records =
            json_parser::parse_visits_json(json_path).context("Failed to parse JSON file")?;
        log::debug!(
            "Loaded {} raw visits from {}",
            records.len(),
            json_path.display()
        );

        Ok(VisitLoadResult::new(records))
    }

    /// Load visit data from a JSON string
    pub fn load_from_json_str(json_str: &str) -> Result<VisitLoadResult> {
        let records =
            json_parser::parse_visits_json_str(json_str).context("Failed to parse JSON string")?;

        Ok(VisitLoadResult::new(records))
    }

    /// Count the visits in a JSON export without normalizing them
    pub fn count_records(path: &Path) -> Result<usize> {
        Ok(Self::load_from_file(path)?.num_records)
    }
}
