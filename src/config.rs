// ⚙️ Analysis configuration
// Defaults work out of the box; an optional JSON file overrides them

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "attrition.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// CSV with one employee per row
    pub input_path: PathBuf,

    /// Folder receiving charts, summary.json and the CSV export
    pub output_dir: PathBuf,

    /// Chart size in pixels
    pub chart_width: u32,
    pub chart_height: u32,

    /// Rows shown in "top risk" tables
    pub top_n: usize,

    /// Bins of the income histogram
    pub income_bins: usize,

    /// Write employee_attrition_export.csv next to the charts
    pub export_dataset: bool,

    /// Listen address of the dashboard server
    pub server_addr: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            input_path: PathBuf::from("data/employee_attrition.csv"),
            output_dir: PathBuf::from("figures"),
            chart_width: 1000,
            chart_height: 600,
            top_n: 6,
            income_bins: 12,
            export_dataset: true,
            server_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load config from a JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AnalysisConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// `attrition.json` from the working directory, or defaults
    pub fn discover() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            tracing::info!(path = DEFAULT_CONFIG_FILE, "loading config file");
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn export_path(&self) -> PathBuf {
        self.output_dir.join("employee_attrition_export.csv")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("summary.json")
    }
}
