// 💬 Keyword assistant
// Answers a few canned questions about attrition hot spots

use crate::dataset::{columns, Dataset};
use crate::stats::{self, CrossTab};
use serde::Serialize;
use std::fmt;

pub const HINT: &str = "Try: 'high risk job', 'high risk dept', 'overtime'";

/// Rows shown for "high risk" questions
const TOP_GROUPS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    HighRiskJobs,
    HighRiskDepartments,
    Overtime,
    Unknown,
}

impl Query {
    /// Case-insensitive substring match, first hit wins
    pub fn parse(text: &str) -> Query {
        let text = text.to_lowercase();
        if text.contains("high risk job") {
            Query::HighRiskJobs
        } else if text.contains("high risk dept") {
            Query::HighRiskDepartments
        } else if text.contains("overtime") {
            Query::Overtime
        } else {
            Query::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// (group, rate rounded to one decimal) highest first
    Rates { rows: Vec<(String, f64)> },
    Counts { table: CrossTab },
    Info { message: String },
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Rates { rows } => {
                let width = rows.iter().map(|(g, _)| g.len()).max().unwrap_or(0);
                for (group, rate) in rows {
                    writeln!(f, "{:<width$}  {:.1}%", group, rate, width = width)?;
                }
                Ok(())
            }
            Answer::Counts { table } => {
                for (row, col, count) in table.cells() {
                    writeln!(f, "{}={}  {}={}  {}", table.row_column, row, table.col_column, col, count)?;
                }
                Ok(())
            }
            Answer::Info { message } => writeln!(f, "{}", message),
        }
    }
}

fn info(message: &str) -> Answer {
    Answer::Info { message: message.to_string() }
}

fn top_rates(ds: &Dataset, column: &str, missing: &str) -> Answer {
    if !ds.has_attrition() {
        return info(missing);
    }
    match stats::attrition_by(ds, column) {
        Ok(groups) if !groups.is_empty() => Answer::Rates {
            rows: stats::top_by_rate(&groups, TOP_GROUPS)
                .into_iter()
                .map(|g| (g.group, stats::round_to(g.rate, 1)))
                .collect(),
        },
        _ => info(missing),
    }
}

pub fn answer(ds: &Dataset, question: &str) -> Answer {
    match Query::parse(question) {
        Query::HighRiskJobs => top_rates(ds, columns::JOB_ROLE, "JobRole data missing"),
        Query::HighRiskDepartments => top_rates(ds, columns::DEPARTMENT, "Department data missing"),
        Query::Overtime => match stats::crosstab(ds, columns::OVERTIME, columns::ATTRITION) {
            Ok(table) => Answer::Counts { table },
            Err(_) => info("OverTime missing"),
        },
        Query::Unknown => info(HINT),
    }
}
