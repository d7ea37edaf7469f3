// 📂 Dataset - Employee attrition table
// Loads the CSV once into a column-oriented, read-only table

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Well-known column names of the attrition dataset
pub mod columns {
    pub const AGE: &str = "Age";
    pub const ATTRITION: &str = "Attrition";
    pub const ATTRITION_BOOL: &str = "Attrition_bool";
    pub const AGE_BUCKET: &str = "AgeBucket";
    pub const DEPARTMENT: &str = "Department";
    pub const DISTANCE_FROM_HOME: &str = "DistanceFromHome";
    pub const JOB_ROLE: &str = "JobRole";
    pub const JOB_SATISFACTION: &str = "JobSatisfaction";
    pub const MONTHLY_INCOME: &str = "MonthlyIncome";
    pub const OVERTIME: &str = "OverTime";
    pub const WORK_LIFE_BALANCE: &str = "WorkLifeBalance";
    pub const YEARS_AT_COMPANY: &str = "YearsAtCompany";
}

/// Cell values treated as missing (compared case-insensitively)
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

/// Values of the `Attrition` column that mean "left the company"
const ATTRITION_YES: &[&str] = &["yes", "y", "true", "1"];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("column missing: {0}")]
    MissingColumn(String),

    #[error("column is not numeric: {0}")]
    NotNumeric(String),

    #[error("dataset has no rows")]
    Empty,
}

// ============================================================================
// AGE BUCKETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "18-25")]
    Age18To25,
    #[serde(rename = "26-35")]
    Age26To35,
    #[serde(rename = "36-45")]
    Age36To45,
    #[serde(rename = "46-55")]
    Age46To55,
    #[serde(rename = "55+")]
    Age55Plus,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Age18To25,
        AgeBucket::Age26To35,
        AgeBucket::Age36To45,
        AgeBucket::Age46To55,
        AgeBucket::Age55Plus,
    ];

    /// Bucket for an age; bins are [17,25] (25,35] (35,45] (45,55] (55,100]
    pub fn from_age(age: f64) -> Option<AgeBucket> {
        if !(17.0..=100.0).contains(&age) {
            return None;
        }
        let bucket = if age <= 25.0 {
            AgeBucket::Age18To25
        } else if age <= 35.0 {
            AgeBucket::Age26To35
        } else if age <= 45.0 {
            AgeBucket::Age36To45
        } else if age <= 55.0 {
            AgeBucket::Age46To55
        } else {
            AgeBucket::Age55Plus
        };
        Some(bucket)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Age18To25 => "18-25",
            AgeBucket::Age26To35 => "26-35",
            AgeBucket::Age36To45 => "36-45",
            AgeBucket::Age46To55 => "46-55",
            AgeBucket::Age55Plus => "55+",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// COLUMN
// ============================================================================

/// One column of the table
///
/// `raw` keeps the trimmed text of every cell (`None` = missing).
/// `numeric` is present only when every non-missing cell parses as a number.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub raw: Vec<Option<String>>,
    pub numeric: Option<Vec<Option<f64>>>,
}

impl Column {
    fn from_cells(name: String, raw: Vec<Option<String>>) -> Self {
        let numeric = infer_numeric(&raw);
        Column { name, raw, numeric }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric.is_some()
    }

    /// Number of non-missing cells
    pub fn present_count(&self) -> usize {
        self.raw.iter().filter(|v| v.is_some()).count()
    }
}

fn is_missing(cell: &str) -> bool {
    let lowered = cell.trim().to_lowercase();
    MISSING_MARKERS.contains(&lowered.as_str())
}

fn infer_numeric(raw: &[Option<String>]) -> Option<Vec<Option<f64>>> {
    let mut values = Vec::with_capacity(raw.len());
    let mut seen_value = false;

    for cell in raw {
        match cell {
            Some(text) => {
                let value: f64 = text.parse().ok()?;
                seen_value = true;
                values.push(Some(value));
            }
            None => values.push(None),
        }
    }

    if seen_value {
        Some(values)
    } else {
        None
    }
}

/// Where the attrition flag came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttritionSource {
    /// An explicit `Attrition_bool` column
    FlagColumn,
    /// Derived from the Yes/No `Attrition` column
    Derived,
    /// No attrition information, every flag is false
    Absent,
}

// ============================================================================
// DATASET
// ============================================================================

/// The employee record table.
///
/// Built once by the loader and only read afterwards: every accessor borrows
/// `&self`, so the same value can be shared by reports, charts and the server.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    columns: Vec<Column>,
    rows: usize,
    attrition: Vec<bool>,
    attrition_series: Vec<Option<f64>>,
    attrition_source: AttritionSource,
    age_buckets: Vec<Option<AgeBucket>>,
}

impl Dataset {
    /// Load a CSV file with a header row
    pub fn load_csv(csv_path: &Path) -> Result<Dataset> {
        let file = std::fs::File::open(csv_path)
            .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

        let dataset = Dataset::from_reader(file, &csv_path.display().to_string())?;

        tracing::info!(
            path = %csv_path.display(),
            rows = dataset.len(),
            columns = dataset.column_count(),
            "dataset loaded"
        );

        Ok(dataset)
    }

    /// Parse CSV data from any reader
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Dataset> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut rows = 0;

        for (line, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Failed to parse CSV row {}", line + 2))?;

            for (idx, column) in cells.iter_mut().enumerate() {
                let value = record
                    .get(idx)
                    .filter(|v| !is_missing(v))
                    .map(|v| v.to_string());
                column.push(value);
            }
            rows += 1;
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column::from_cells(name, raw))
            .collect();

        Ok(Dataset::from_columns(source, columns, rows))
    }

    fn from_columns(source: &str, columns: Vec<Column>, rows: usize) -> Dataset {
        let (attrition, attrition_source) = derive_attrition(&columns, rows);
        let attrition_series = attrition
            .iter()
            .map(|&left| Some(if left { 1.0 } else { 0.0 }))
            .collect();

        let age_buckets = match columns.iter().find(|c| c.name == columns::AGE) {
            Some(Column { numeric: Some(ages), .. }) => ages
                .iter()
                .map(|age| age.and_then(AgeBucket::from_age))
                .collect(),
            _ => vec![None; rows],
        };

        Dataset {
            source: source.to_string(),
            columns,
            rows,
            attrition,
            attrition_series,
            attrition_source,
            age_buckets,
        }
    }

    // ========================================================================
    // SHAPE
    // ========================================================================

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    // ========================================================================
    // COLUMN ACCESS
    // ========================================================================

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column lookup that fails with `DatasetError::MissingColumn`
    pub fn require(&self, name: &str) -> Result<&Column, DatasetError> {
        self.column(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// Numeric values of a column (None if absent or not numeric)
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(|c| c.numeric.as_deref())
    }

    /// Numeric column or a typed error
    pub fn require_numeric(&self, name: &str) -> Result<&[Option<f64>], DatasetError> {
        self.require(name)?
            .numeric
            .as_deref()
            .ok_or_else(|| DatasetError::NotNumeric(name.to_string()))
    }

    /// Text values of a column; numeric columns keep their original text
    pub fn categorical(&self, name: &str) -> Option<&[Option<String>]> {
        self.column(name).map(|c| c.raw.as_slice())
    }

    pub fn require_categorical(&self, name: &str) -> Result<&[Option<String>], DatasetError> {
        Ok(self.require(name)?.raw.as_slice())
    }

    /// All numeric source columns, in header order
    pub fn numeric_columns(&self) -> Vec<(&str, &[Option<f64>])> {
        self.columns
            .iter()
            .filter_map(|c| c.numeric.as_deref().map(|v| (c.name.as_str(), v)))
            .collect()
    }

    /// Numeric columns used for analysis: source columns plus the derived
    /// `Attrition_bool` flag when it came from the Yes/No column
    pub fn analysis_numeric_columns(&self) -> Vec<(&str, &[Option<f64>])> {
        let mut numeric = self.numeric_columns();
        if self.attrition_source == AttritionSource::Derived
            && !self.has_column(columns::ATTRITION_BOOL)
        {
            numeric.push((columns::ATTRITION_BOOL, self.attrition_series.as_slice()));
        }
        numeric
    }

    // ========================================================================
    // DERIVED COLUMNS
    // ========================================================================

    /// Per-row attrition flag
    pub fn attrition_flags(&self) -> &[bool] {
        &self.attrition
    }

    /// Attrition flag as a 0/1 numeric series
    pub fn attrition_series(&self) -> &[Option<f64>] {
        &self.attrition_series
    }

    pub fn attrition_source(&self) -> &AttritionSource {
        &self.attrition_source
    }

    pub fn has_attrition(&self) -> bool {
        self.attrition_source != AttritionSource::Absent
    }

    pub fn age_buckets(&self) -> &[Option<AgeBucket>] {
        &self.age_buckets
    }

    /// Number of employees flagged as left
    pub fn attrition_count(&self) -> usize {
        self.attrition.iter().filter(|&&left| left).count()
    }
}

fn derive_attrition(columns: &[Column], rows: usize) -> (Vec<bool>, AttritionSource) {
    if let Some(flag) = columns.iter().find(|c| c.name == columns::ATTRITION_BOOL) {
        let flags = match &flag.numeric {
            Some(values) => values
                .iter()
                .map(|v| v.map(|x| x != 0.0).unwrap_or(false))
                .collect(),
            None => flag.raw.iter().map(|v| is_yes(v.as_deref())).collect(),
        };
        return (flags, AttritionSource::FlagColumn);
    }

    if let Some(label) = columns.iter().find(|c| c.name == columns::ATTRITION) {
        let flags = label.raw.iter().map(|v| is_yes(v.as_deref())).collect();
        return (flags, AttritionSource::Derived);
    }

    (vec![false; rows], AttritionSource::Absent)
}

fn is_yes(value: Option<&str>) -> bool {
    value
        .map(|v| ATTRITION_YES.contains(&v.trim().to_lowercase().as_str()))
        .unwrap_or(false)
}

// ============================================================================
// TESTS
// ============================================================================
