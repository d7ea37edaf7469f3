// 📊 Descriptive statistics over the employee table
// Counts by category, means by group, attrition rates, correlation

use crate::dataset::{columns, AgeBucket, Dataset, DatasetError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// PRIMITIVES (missing values are skipped)
// ============================================================================

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().filter(|v| !v.is_nan()).collect()
}

pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let xs = present(values);
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[Option<f64>]) -> Option<f64> {
    let xs = present(values);
    if xs.len() < 2 {
        return None;
    }
    let m = xs.iter().sum::<f64>() / xs.len() as f64;
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut xs = present(values);
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (xs.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(xs[lower] + (xs[upper] - xs[lower]) * frac)
}

pub fn median(values: &[Option<f64>]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Pearson correlation over rows where both values are present.
/// NaN when fewer than two pairs or either side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in &pairs {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }

    if vx == 0.0 || vy == 0.0 {
        return f64::NAN;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

// ============================================================================
// KPIs
// ============================================================================

/// Headline numbers of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_employees: usize,
    pub column_count: usize,
    pub attrition_count: usize,
    /// Percent, one decimal
    pub attrition_rate: f64,
    pub avg_age: Option<f64>,
    /// Truncated to whole currency units
    pub avg_income: Option<i64>,
    pub avg_years_at_company: Option<f64>,
    /// Share of employees working overtime, percent
    pub overtime_pct: Option<f64>,
}

impl Kpis {
    pub fn compute(ds: &Dataset) -> Kpis {
        let total = ds.len();
        let attrition_count = ds.attrition_count();

        let overtime_pct = ds.categorical(columns::OVERTIME).map(|values| {
            let yes = values
                .iter()
                .filter(|v| v.as_deref() == Some("Yes"))
                .count();
            round_to(percent(yes, total), 1)
        });

        Kpis {
            total_employees: total,
            column_count: ds.column_count(),
            attrition_count,
            attrition_rate: round_to(percent(attrition_count, total), 1),
            avg_age: ds.numeric(columns::AGE).and_then(mean).map(|v| round_to(v, 1)),
            avg_income: ds
                .numeric(columns::MONTHLY_INCOME)
                .and_then(mean)
                .map(|v| v.trunc() as i64),
            avg_years_at_company: ds
                .numeric(columns::YEARS_AT_COMPANY)
                .and_then(mean)
                .map(|v| round_to(v, 1)),
            overtime_pct,
        }
    }
}

// ============================================================================
// GROUP KEYS
// ============================================================================

/// Numeric columns group by parsed value (so `1` and `1.0` meet and 10 sorts
/// after 2), other columns by their text
#[derive(Debug, Clone, Copy, PartialEq)]
enum GroupKey<'a> {
    Number(f64),
    Text(&'a str),
}

impl Eq for GroupKey<'_> {}

impl PartialOrd for GroupKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Number(a), GroupKey::Number(b)) => a.total_cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            (GroupKey::Number(_), GroupKey::Text(_)) => Ordering::Less,
            (GroupKey::Text(_), GroupKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl GroupKey<'_> {
    fn label(&self) -> String {
        match self {
            GroupKey::Number(v) => v.to_string(),
            GroupKey::Text(t) => t.to_string(),
        }
    }
}

fn group_keys<'a>(ds: &'a Dataset, column: &str) -> Result<Vec<Option<GroupKey<'a>>>, DatasetError> {
    let column = ds.require(column)?;
    Ok(match &column.numeric {
        // `+ 0.0` folds -0.0 into 0.0
        Some(values) => values
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()).map(|x| GroupKey::Number(x + 0.0)))
            .collect(),
        None => column.raw.iter().map(|v| v.as_deref().map(GroupKey::Text)).collect(),
    })
}

// ============================================================================
// GROUPED ATTRITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRate {
    pub group: String,
    pub total: usize,
    pub left: usize,
    /// Percent of the group flagged as left
    pub rate: f64,
}

/// Attrition count and rate per distinct value of `column`, ordered by value
pub fn attrition_by(ds: &Dataset, column: &str) -> Result<Vec<GroupRate>, DatasetError> {
    let keys = group_keys(ds, column)?;
    let flags = ds.attrition_flags();

    let mut groups: BTreeMap<GroupKey, (usize, usize)> = BTreeMap::new();
    for (key, &left) in keys.into_iter().zip(flags) {
        if let Some(key) = key {
            let entry = groups.entry(key).or_insert((0, 0));
            entry.0 += 1;
            if left {
                entry.1 += 1;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(group, (total, left))| GroupRate {
            group: group.label(),
            total,
            left,
            rate: percent(left, total),
        })
        .collect())
}

/// First group with the highest attrition rate
pub fn highest_risk(groups: &[GroupRate]) -> Option<&GroupRate> {
    groups.iter().fold(None, |best: Option<&GroupRate>, g| match best {
        Some(b) if b.rate >= g.rate => Some(b),
        _ => Some(g),
    })
}

/// Groups sorted by rate, highest first (ties keep key order)
pub fn top_by_rate(groups: &[GroupRate], n: usize) -> Vec<GroupRate> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    sorted.truncate(n);
    sorted
}

// ============================================================================
// ROLE COMPENSATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleStats {
    pub role: String,
    pub avg_income: Option<f64>,
    pub attrition_rate_pct: f64,
    pub count: usize,
}

/// Average income and attrition per job role, riskiest role first
pub fn role_compensation(ds: &Dataset) -> Result<Vec<RoleStats>, DatasetError> {
    let roles = ds.require_categorical(columns::JOB_ROLE)?;
    let income = ds.require_numeric(columns::MONTHLY_INCOME)?;
    let flags = ds.attrition_flags();

    let mut by_role: BTreeMap<&str, (Vec<Option<f64>>, usize)> = BTreeMap::new();
    for ((role, value), &left) in roles.iter().zip(income).zip(flags) {
        if let Some(role) = role {
            let entry = by_role.entry(role.as_str()).or_default();
            entry.0.push(*value);
            if left {
                entry.1 += 1;
            }
        }
    }

    let mut stats: Vec<RoleStats> = by_role
        .into_iter()
        .map(|(role, (incomes, left))| RoleStats {
            role: role.to_string(),
            avg_income: mean(&incomes),
            attrition_rate_pct: percent(left, incomes.len()),
            count: incomes.len(),
        })
        .collect();

    stats.sort_by(|a, b| b.attrition_rate_pct.total_cmp(&a.attrition_rate_pct));
    Ok(stats)
}

// ============================================================================
// MEANS, COUNTS, CROSS-TABS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: Option<f64>,
    pub count: usize,
}

pub fn mean_by_group(ds: &Dataset, group: &str, value: &str) -> Result<Vec<GroupMean>, DatasetError> {
    let keys = group_keys(ds, group)?;
    let values = ds.require_numeric(value)?;

    let mut groups: BTreeMap<GroupKey, Vec<Option<f64>>> = BTreeMap::new();
    for (key, v) in keys.into_iter().zip(values) {
        if let Some(key) = key {
            groups.entry(key).or_default().push(*v);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(group, vals)| GroupMean {
            group: group.label(),
            mean: mean(&vals),
            count: vals.len(),
        })
        .collect())
}

/// Occurrences of each non-missing value, ordered by value
pub fn value_counts(ds: &Dataset, column: &str) -> Result<Vec<(String, usize)>, DatasetError> {
    let keys = group_keys(ds, column)?;
    let mut counts: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for key in keys.into_iter().flatten() {
        *counts.entry(key).or_insert(0) += 1;
    }
    Ok(counts.into_iter().map(|(k, v)| (k.label(), v)).collect())
}

/// Contingency table of two categorical columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_column: String,
    pub col_column: String,
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    /// counts[row][col]
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, row: &str, col: &str) -> usize {
        let r = self.rows.iter().position(|v| v == row);
        let c = self.cols.iter().position(|v| v == col);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Non-zero cells as (row, col, count), the long form of the table
    pub fn cells(&self) -> Vec<(&str, &str, usize)> {
        let mut cells = Vec::new();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, col) in self.cols.iter().enumerate() {
                if self.counts[r][c] > 0 {
                    cells.push((row.as_str(), col.as_str(), self.counts[r][c]));
                }
            }
        }
        cells
    }
}

/// Count rows per pair of values; rows with either value missing are dropped
pub fn crosstab(ds: &Dataset, row: &str, col: &str) -> Result<CrossTab, DatasetError> {
    let row_keys = group_keys(ds, row)?;
    let col_keys = group_keys(ds, col)?;

    let mut pairs: BTreeMap<(GroupKey, GroupKey), usize> = BTreeMap::new();
    for (r, c) in row_keys.into_iter().zip(col_keys) {
        if let (Some(r), Some(c)) = (r, c) {
            *pairs.entry((r, c)).or_insert(0) += 1;
        }
    }

    let row_set: Vec<GroupKey> = pairs.keys().map(|(r, _)| *r).collect::<BTreeSet<_>>().into_iter().collect();
    let col_set: Vec<GroupKey> = pairs.keys().map(|(_, c)| *c).collect::<BTreeSet<_>>().into_iter().collect();

    let mut counts = vec![vec![0; col_set.len()]; row_set.len()];
    for ((r, c), n) in pairs {
        let ri = row_set.binary_search(&r).unwrap_or_default();
        let ci = col_set.binary_search(&c).unwrap_or_default();
        counts[ri][ci] = n;
    }

    let rows = row_set.iter().map(GroupKey::label).collect();
    let cols = col_set.iter().map(GroupKey::label).collect();

    Ok(CrossTab {
        row_column: row.to_string(),
        col_column: col.to_string(),
        rows,
        cols,
        counts,
    })
}

/// Employees per age bucket as (bucket, stayed, left)
pub fn age_bucket_counts(ds: &Dataset) -> Vec<(AgeBucket, usize, usize)> {
    let mut counts: BTreeMap<AgeBucket, (usize, usize)> =
        AgeBucket::ALL.iter().map(|b| (*b, (0, 0))).collect();

    for (bucket, &left) in ds.age_buckets().iter().zip(ds.attrition_flags()) {
        if let Some(bucket) = bucket {
            let entry = counts.entry(*bucket).or_insert((0, 0));
            if left {
                entry.1 += 1;
            } else {
                entry.0 += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(bucket, (stayed, left))| (bucket, stayed, left))
        .collect()
}

// ============================================================================
// HISTOGRAM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins over the observed range; the maximum falls in the last bin
pub fn histogram(values: &[Option<f64>], bins: usize) -> Vec<Bin> {
    let xs = present(values);
    if xs.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Single distinct value: widen so the bin has a width
    let (min, max) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (max - min) / bins as f64;

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for x in xs {
        let idx = (((x - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ============================================================================
// CORRELATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// values[i][j] = pearson(columns[i], columns[j]); NaN serializes as null
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Off-diagonal pairs ordered by absolute correlation, strongest first
    pub fn strongest_pairs(&self, n: usize) -> Vec<(String, String, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                let r = self.values[i][j];
                if !r.is_nan() {
                    pairs.push((self.columns[i].clone(), self.columns[j].clone(), r));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs.truncate(n);
        pairs
    }
}

/// Pearson matrix over every numeric column; None with fewer than two
pub fn correlation(ds: &Dataset) -> Option<CorrelationMatrix> {
    let numeric = ds.analysis_numeric_columns();
    if numeric.len() < 2 {
        return None;
    }

    let values = numeric
        .iter()
        .map(|(_, x)| {
            numeric
                .iter()
                .map(|(_, y)| {
                    // Diagonal is 1 whenever the column varies at all
                    pearson(x, y)
                })
                .collect()
        })
        .collect();

    Some(CorrelationMatrix {
        columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}

// ============================================================================
// DESCRIBE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn of(column: &str, values: &[Option<f64>]) -> NumericSummary {
        NumericSummary {
            column: column.to_string(),
            count: present(values).len(),
            mean: mean(values),
            std: sample_std(values),
            min: quantile(values, 0.0),
            q25: quantile(values, 0.25),
            median: quantile(values, 0.5),
            q75: quantile(values, 0.75),
            max: quantile(values, 1.0),
        }
    }
}

pub fn describe(ds: &Dataset) -> Vec<NumericSummary> {
    ds.numeric_columns()
        .into_iter()
        .map(|(name, values)| NumericSummary::of(name, values))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Age,Attrition,Department,JobRole,MonthlyIncome,OverTime,YearsAtCompany
20,Yes,Sales,Sales Representative,2000,Yes,1
30,No,Sales,Sales Executive,5000,No,5
40,No,Research & Development,Research Scientist,4000,No,10
50,Yes,Research & Development,Research Scientist,6000,Yes,4
60,No,Human Resources,Manager,10000,No,20
";

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes(), "sample").unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_primitives_skip_missing() {
        let values = [Some(1.0), None, Some(3.0), Some(2.0)];
        assert_eq!(mean(&values), Some(2.0));
        assert_eq!(median(&values), Some(2.0));
        assert_eq!(sample_std(&values), Some(1.0));
        assert_eq!(quantile(&values, 0.25), Some(1.5));
        assert_eq!(mean(&[None, None]), None);
        assert_eq!(sample_std(&[Some(1.0)]), None);
    }

    #[test]
    fn test_pearson() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!(approx(pearson(&x, &y), 1.0));

        let neg = [Some(3.0), Some(2.0), Some(1.0), None];
        assert!(approx(pearson(&x, &neg), -1.0));

        let flat = [Some(5.0), Some(5.0), Some(5.0), None];
        assert!(pearson(&x, &flat).is_nan());
        assert!(pearson(&[Some(1.0)], &[Some(1.0)]).is_nan());
    }

    #[test]
    fn test_kpis() {
        let kpis = Kpis::compute(&sample());
        assert_eq!(kpis.total_employees, 5);
        assert_eq!(kpis.column_count, 7);
        assert_eq!(kpis.attrition_count, 2);
        assert_eq!(kpis.attrition_rate, 40.0);
        assert_eq!(kpis.avg_age, Some(40.0));
        assert_eq!(kpis.avg_income, Some(5400));
        assert_eq!(kpis.avg_years_at_company, Some(8.0));
        assert_eq!(kpis.overtime_pct, Some(40.0));
    }

    #[test]
    fn test_kpis_missing_columns() {
        let ds = Dataset::from_reader("Department\nSales\n".as_bytes(), "x").unwrap();
        let kpis = Kpis::compute(&ds);
        assert_eq!(kpis.attrition_rate, 0.0);
        assert_eq!(kpis.avg_age, None);
        assert_eq!(kpis.avg_income, None);
        assert_eq!(kpis.overtime_pct, None);
    }

    #[test]
    fn test_attrition_by_department() {
        let groups = attrition_by(&sample(), "Department").unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["Human Resources", "Research & Development", "Sales"]);
        assert_eq!(groups[1].total, 2);
        assert_eq!(groups[1].left, 1);
        assert_eq!(groups[1].rate, 50.0);
        assert_eq!(groups[0].rate, 0.0);

        // Tie between R&D and Sales: first in key order wins
        assert_eq!(highest_risk(&groups).unwrap().group, "Research & Development");
        assert!(highest_risk(&[]).is_none());
    }

    #[test]
    fn test_attrition_by_missing_column() {
        assert_eq!(
            attrition_by(&sample(), "Gender").unwrap_err(),
            DatasetError::MissingColumn("Gender".to_string())
        );
    }

    #[test]
    fn test_top_by_rate() {
        let groups = attrition_by(&sample(), "JobRole").unwrap();
        let top = top_by_rate(&groups, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].group, "Sales Representative");
        assert_eq!(top[0].rate, 100.0);
        assert_eq!(top[1].group, "Research Scientist");
    }

    #[test]
    fn test_role_compensation() {
        let roles = role_compensation(&sample()).unwrap();
        assert_eq!(roles[0].role, "Sales Representative");
        assert_eq!(roles[0].attrition_rate_pct, 100.0);
        let scientist = roles.iter().find(|r| r.role == "Research Scientist").unwrap();
        assert_eq!(scientist.avg_income, Some(5000.0));
        assert_eq!(scientist.count, 2);
    }

    #[test]
    fn test_mean_by_group() {
        let means = mean_by_group(&sample(), "Attrition", "MonthlyIncome").unwrap();
        assert_eq!(means[0].group, "No");
        assert!(approx(means[0].mean.unwrap(), 19000.0 / 3.0));
        assert_eq!(means[1].group, "Yes");
        assert_eq!(means[1].mean, Some(4000.0));
    }

    #[test]
    fn test_crosstab() {
        let tab = crosstab(&sample(), "OverTime", "Attrition").unwrap();
        assert_eq!(tab.rows, vec!["No", "Yes"]);
        assert_eq!(tab.cols, vec!["No", "Yes"]);
        assert_eq!(tab.get("No", "No"), 3);
        assert_eq!(tab.get("Yes", "Yes"), 2);
        assert_eq!(tab.get("Yes", "No"), 0);
        assert_eq!(tab.total(), 5);
        assert_eq!(tab.cells().len(), 2);
    }

    #[test]
    fn test_numeric_columns_group_by_value() {
        let csv = "YearsAtCompany,Attrition\n2,Yes\n10,No\n1,Yes\n1.0,No\n10,No\n";
        let ds = Dataset::from_reader(csv.as_bytes(), "tenure").unwrap();

        let groups = attrition_by(&ds, "YearsAtCompany").unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "10"]);
        assert_eq!(groups[0].total, 2);
        assert_eq!(groups[0].rate, 50.0);
        assert_eq!(groups[2].total, 2);

        let tab = crosstab(&ds, "YearsAtCompany", "Attrition").unwrap();
        assert_eq!(tab.rows, vec!["1", "2", "10"]);
        assert_eq!(tab.get("1", "Yes"), 1);
        assert_eq!(tab.get("1", "No"), 1);
        assert_eq!(tab.get("10", "No"), 2);

        let counts = value_counts(&ds, "YearsAtCompany").unwrap();
        assert_eq!(
            counts,
            vec![("1".to_string(), 2), ("2".to_string(), 1), ("10".to_string(), 2)]
        );

        let means = mean_by_group(&ds, "YearsAtCompany", "YearsAtCompany").unwrap();
        assert_eq!(means[1].group, "2");
        assert_eq!(means[1].mean, Some(2.0));
    }

    #[test]
    fn test_value_counts() {
        let counts = value_counts(&sample(), "Department").unwrap();
        assert_eq!(
            counts,
            vec![
                ("Human Resources".to_string(), 1),
                ("Research & Development".to_string(), 2),
                ("Sales".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_age_bucket_counts() {
        let counts = age_bucket_counts(&sample());
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[0], (AgeBucket::Age18To25, 0, 1));
        assert_eq!(counts[3], (AgeBucket::Age46To55, 0, 1));
        assert_eq!(counts[4], (AgeBucket::Age55Plus, 1, 0));
    }

    #[test]
    fn test_histogram() {
        let values = [Some(0.0), Some(1.0), Some(2.0), Some(10.0), None];
        let bins = histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);

        let single = histogram(&[Some(3.0)], 3);
        assert_eq!(single.iter().map(|b| b.count).sum::<usize>(), 1);
        assert!(histogram(&[], 3).is_empty());
    }

    #[test]
    fn test_correlation_includes_attrition_flag() {
        let corr = correlation(&sample()).unwrap();
        assert_eq!(
            corr.columns,
            vec!["Age", "MonthlyIncome", "YearsAtCompany", "Attrition_bool"]
        );
        assert!(approx(corr.get("Age", "Age").unwrap(), 1.0));
        // Hand computed: cov sum 170000, squared deviations 1000 and 35.2M
        let r = corr.get("Age", "MonthlyIncome").unwrap();
        assert!(approx(r, 170_000.0 / (1_000.0f64 * 35_200_000.0).sqrt()));
        assert!((r - 0.906103).abs() < 1e-6);
        // Leavers are 20 and 50: r = -sqrt(3) / 6
        assert!(approx(corr.get("Age", "Attrition_bool").unwrap(), -(3f64.sqrt()) / 6.0));
        assert!(approx(
            corr.get("Age", "YearsAtCompany").unwrap(),
            corr.get("YearsAtCompany", "Age").unwrap()
        ));

        let strongest = corr.strongest_pairs(1);
        assert_eq!(strongest.len(), 1);
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let ds = Dataset::from_reader("Age,Department\n30,Sales\n".as_bytes(), "x").unwrap();
        assert!(correlation(&ds).is_none());
    }

    #[test]
    fn test_describe() {
        let summary = describe(&sample());
        let age = summary.iter().find(|s| s.column == "Age").unwrap();
        assert_eq!(age.count, 5);
        assert_eq!(age.mean, Some(40.0));
        assert_eq!(age.min, Some(20.0));
        assert_eq!(age.q25, Some(30.0));
        assert_eq!(age.median, Some(40.0));
        assert_eq!(age.max, Some(60.0));
        assert!(approx(age.std.unwrap(), 250f64.sqrt()));
    }
}
