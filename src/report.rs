// 📝 Analysis report - KPIs, risk tables, narrative, exports
// Ties the dataset, statistics and charts into one run

use crate::charts::{ChartRenderer, RenderedChart};
use crate::config::AnalysisConfig;
use crate::dataset::{columns, Dataset, DatasetError};
use crate::stats::{self, CorrelationMatrix, CrossTab, GroupRate, Kpis, NumericSummary, RoleStats};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Department and job role with the highest attrition rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFocus {
    pub department: Option<GroupRate>,
    pub job_role: Option<GroupRate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub kpis: Kpis,
    pub departments: Vec<GroupRate>,
    pub job_roles: Vec<GroupRate>,
    pub risk_focus: RiskFocus,
    pub top_job_roles: Vec<GroupRate>,
    pub role_compensation: Vec<RoleStats>,
    pub overtime: Option<CrossTab>,
    pub correlation: Option<CorrelationMatrix>,
    pub numeric_summary: Vec<NumericSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<RenderedChart>,
}

/// Missing columns degrade to an empty table
fn or_empty<T>(result: Result<Vec<T>, DatasetError>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::debug!(reason = %e, "table not available");
            Vec::new()
        }
    }
}

impl AnalysisReport {
    pub fn build(ds: &Dataset, config: &AnalysisConfig) -> Result<AnalysisReport, DatasetError> {
        if ds.is_empty() {
            return Err(DatasetError::Empty);
        }

        let (departments, job_roles) = if ds.has_attrition() {
            (
                or_empty(stats::attrition_by(ds, columns::DEPARTMENT)),
                or_empty(stats::attrition_by(ds, columns::JOB_ROLE)),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let risk_focus = RiskFocus {
            department: stats::highest_risk(&departments).cloned(),
            job_role: stats::highest_risk(&job_roles).cloned(),
        };

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            source: ds.source().to_string(),
            kpis: Kpis::compute(ds),
            top_job_roles: stats::top_by_rate(&job_roles, config.top_n),
            departments,
            job_roles,
            risk_focus,
            role_compensation: or_empty(stats::role_compensation(ds)),
            overtime: stats::crosstab(ds, columns::OVERTIME, columns::ATTRITION).ok(),
            correlation: stats::correlation(ds),
            numeric_summary: stats::describe(ds),
            charts: Vec::new(),
        })
    }

    /// Bullet narrative of the workforce
    pub fn story(&self) -> Vec<String> {
        let k = &self.kpis;
        let na = || "N/A".to_string();
        let one_decimal = |v: f64| format!("{:.1}", v);

        let mut lines = vec![
            format!("{} active employee records in this dataset.", k.total_employees),
            format!(
                "{} profiles marked as attrited, yielding a {:.1}% attrition rate.",
                k.attrition_count, k.attrition_rate
            ),
            format!(
                "Typical employee age hovers around {} years, staying for roughly {} years on average.",
                k.avg_age.map(one_decimal).unwrap_or_else(na),
                k.avg_years_at_company.map(one_decimal).unwrap_or_else(na)
            ),
            format!(
                "Approximate average monthly compensation is {}, with overtime incidence near {}.",
                k.avg_income.map(|v| v.to_string()).unwrap_or_else(na),
                k.overtime_pct.map(|v| format!("{:.1}%", v)).unwrap_or_else(na)
            ),
        ];

        if let Some(dept) = &self.risk_focus.department {
            lines.push(format!(
                "Highest stress department: {} ({:.1}% of {} left).",
                dept.group, dept.rate, dept.total
            ));
        }
        if let Some(role) = &self.risk_focus.job_role {
            lines.push(format!(
                "Critical role cluster: {} ({:.1}% of {} left).",
                role.group, role.rate, role.total
            ));
        }
        if let Some((a, b, r)) = self
            .correlation
            .as_ref()
            .and_then(|c| c.strongest_pairs(1).into_iter().next())
        {
            lines.push(format!("Strongest numeric relationship: {} vs {} (r = {:.2}).", a, b, r));
        }

        lines
    }

    /// Write `summary.json`
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write summary: {}", path.display()))?;
        tracing::info!(path = %path.display(), "summary written");
        Ok(())
    }
}

/// Write the table plus derived `Attrition_bool` and `AgeBucket` columns
pub fn export_csv(ds: &Dataset, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_export(ds, file)?;
    tracing::info!(path = %path.display(), rows = ds.len(), "dataset exported");
    Ok(())
}

/// Same rows as [`export_csv`], into any writer
pub fn write_export<W: Write>(ds: &Dataset, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = ds.column_names();
    let add_flag = !ds.has_column(columns::ATTRITION_BOOL);
    let add_bucket = !ds.has_column(columns::AGE_BUCKET);
    if add_flag {
        header.push(columns::ATTRITION_BOOL);
    }
    if add_bucket {
        header.push(columns::AGE_BUCKET);
    }
    wtr.write_record(&header)?;

    for row in 0..ds.len() {
        let mut record: Vec<&str> = ds
            .columns()
            .iter()
            .map(|c| c.raw[row].as_deref().unwrap_or(""))
            .collect();
        if add_flag {
            record.push(if ds.attrition_flags()[row] { "1" } else { "0" });
        }
        if add_bucket {
            record.push(ds.age_buckets()[row].map(|b| b.label()).unwrap_or(""));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Full pipeline: load, summarize, render, export
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let ds = Dataset::load_csv(&config.input_path)?;
    let mut report = AnalysisReport::build(&ds, config)
        .with_context(|| format!("Cannot analyze {}", config.input_path.display()))?;

    report.charts = ChartRenderer::new(&ds, config).render_all(&config.output_dir)?;
    report.write_json(&config.summary_path())?;

    if config.export_dataset {
        export_csv(&ds, &config.export_path())?;
    }

    Ok(report)
}
