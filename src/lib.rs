// Employee Attrition EDA - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod dataset;
pub mod stats;
pub mod charts;
pub mod report;
pub mod assistant;
pub mod predictor;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Only compile API module when server feature is enabled
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{AnalysisConfig, DEFAULT_CONFIG_FILE};
pub use dataset::{columns, AgeBucket, AttritionSource, Column, Dataset, DatasetError};
pub use stats::{
    CorrelationMatrix, CrossTab, GroupMean, GroupRate, Kpis, NumericSummary, RoleStats,
};
pub use charts::{ChartKind, ChartOutcome, ChartRenderer, RenderedChart};
pub use report::{export_csv, run, AnalysisReport, RiskFocus};
pub use assistant::{answer, Answer, Query};
pub use predictor::{parse_assignment, AttritionModel, Evaluation, FeatureValue, ModelInput};

use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
