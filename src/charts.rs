// 🎨 Chart rendering - one SVG per visualization
// Data preparation is separated from drawing so it can be tested on its own

use crate::config::AnalysisConfig;
use crate::dataset::{columns, AgeBucket, Dataset, DatasetError};
use crate::stats::{self, CorrelationMatrix};
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// THEME
// ============================================================================

const FONT: &str = "sans-serif";
const BACKGROUND: RGBColor = RGBColor(0x00, 0x10, 0x18);
const FOREGROUND: RGBColor = RGBColor(0xbf, 0xef, 0xff);
const GRID: RGBColor = RGBColor(0x00, 0xff, 0xff);
const STAYED: RGBColor = RGBColor(0x00, 0xea, 0xff);
const LEFT: RGBColor = RGBColor(0xff, 0x6b, 0xcb);
const MISSING: RGBColor = RGBColor(0x40, 0x40, 0x40);

/// Bar colour scale for attrition %, low to high
const RISK_SCALE: [RGBColor; 3] = [
    RGBColor(0x00, 0xea, 0xff),
    RGBColor(0xff, 0xb3, 0x47),
    RGBColor(0xff, 0x5c, 0x8a),
];

/// Heatmap scale for correlation -1..1
const CORRELATION_SCALE: [RGBColor; 3] = [
    RGBColor(0x00, 0x12, 0x19),
    RGBColor(0x00, 0x77, 0xb6),
    RGBColor(0x00, 0xea, 0xff),
];

const SERIES_PALETTE: [RGBColor; 4] = [
    STAYED,
    LEFT,
    RGBColor(0xff, 0xdd, 0x6a),
    RGBColor(0x7d, 0xff, 0xb5),
];

/// Linear interpolation across evenly spaced colour stops, `t` in 0..=1
pub fn interpolate(stops: &[RGBColor], t: f64) -> RGBColor {
    if stops.is_empty() {
        return MISSING;
    }
    if stops.len() == 1 || t.is_nan() {
        return stops[0];
    }

    let t = t.clamp(0.0, 1.0);
    let scaled = t * (stops.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - idx as f64;

    let (a, b) = (stops[idx], stops[idx + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn correlation_color(r: f64) -> RGBColor {
    if r.is_nan() {
        MISSING
    } else {
        interpolate(&CORRELATION_SCALE, (r + 1.0) / 2.0)
    }
}

// ============================================================================
// CHART CATALOGUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    AttritionDistribution,
    AgeDistribution,
    IncomeHistogram,
    AttritionByDepartment,
    AttritionByJobRole,
    RoleCompensation,
    OvertimeVsAttrition,
    JobSatisfactionVsAttrition,
    WorkLifeBalanceVsAttrition,
    CorrelationHeatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 10] = [
        ChartKind::AttritionDistribution,
        ChartKind::AgeDistribution,
        ChartKind::IncomeHistogram,
        ChartKind::AttritionByDepartment,
        ChartKind::AttritionByJobRole,
        ChartKind::RoleCompensation,
        ChartKind::OvertimeVsAttrition,
        ChartKind::JobSatisfactionVsAttrition,
        ChartKind::WorkLifeBalanceVsAttrition,
        ChartKind::CorrelationHeatmap,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::AttritionDistribution => "attrition_distribution.svg",
            ChartKind::AgeDistribution => "age_distribution.svg",
            ChartKind::IncomeHistogram => "monthly_income_histogram.svg",
            ChartKind::AttritionByDepartment => "attrition_by_department.svg",
            ChartKind::AttritionByJobRole => "attrition_by_job_role.svg",
            ChartKind::RoleCompensation => "role_compensation.svg",
            ChartKind::OvertimeVsAttrition => "overtime_vs_attrition.svg",
            ChartKind::JobSatisfactionVsAttrition => "job_satisfaction_vs_attrition.svg",
            ChartKind::WorkLifeBalanceVsAttrition => "work_life_balance_vs_attrition.svg",
            ChartKind::CorrelationHeatmap => "correlation_heatmap.svg",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::AttritionDistribution => "Attrition distribution",
            ChartKind::AgeDistribution => "Employees by age band",
            ChartKind::IncomeHistogram => "Monthly income distribution",
            ChartKind::AttritionByDepartment => "Attrition rate by department",
            ChartKind::AttritionByJobRole => "Attrition rate by job role",
            ChartKind::RoleCompensation => "Role band vs compensation & attrition",
            ChartKind::OvertimeVsAttrition => "Overtime vs attrition",
            ChartKind::JobSatisfactionVsAttrition => "Job satisfaction vs attrition",
            ChartKind::WorkLifeBalanceVsAttrition => "Work-life balance vs attrition",
            ChartKind::CorrelationHeatmap => "Correlation heatmap",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartOutcome {
    Written { path: PathBuf },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub outcome: ChartOutcome,
}

impl RenderedChart {
    pub fn is_written(&self) -> bool {
        matches!(self.outcome, ChartOutcome::Written { .. })
    }
}

// ============================================================================
// CHART DATA
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub label: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
    /// Per-bar colours overriding `color`
    pub bar_colors: Option<Vec<RGBColor>>,
}

impl BarSeries {
    fn new(label: &str, color: RGBColor, values: Vec<f64>) -> Self {
        BarSeries {
            label: label.to_string(),
            color,
            values,
            bar_colors: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bars(BarChart),
    Heatmap(CorrelationMatrix),
}

// ============================================================================
// RENDERER
// ============================================================================

pub struct ChartRenderer<'a> {
    ds: &'a Dataset,
    size: (u32, u32),
    income_bins: usize,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(ds: &'a Dataset, config: &AnalysisConfig) -> Self {
        ChartRenderer {
            ds,
            size: (config.chart_width, config.chart_height),
            income_bins: config.income_bins,
        }
    }

    /// Render every chart into `out_dir`, creating it if needed.
    /// Charts lacking their columns are skipped, not fatal.
    pub fn render_all(&self, out_dir: &Path) -> Result<Vec<RenderedChart>> {
        fs::create_dir_all(out_dir).with_context(|| {
            format!("Failed to create output directory: {}", out_dir.display())
        })?;

        let mut rendered = Vec::with_capacity(ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            let outcome = self.render(kind, out_dir)?;
            rendered.push(RenderedChart { kind, outcome });
        }

        let written = rendered.iter().filter(|c| c.is_written()).count();
        tracing::info!(written, skipped = rendered.len() - written, dir = %out_dir.display(), "charts rendered");

        Ok(rendered)
    }

    pub fn render(&self, kind: ChartKind, out_dir: &Path) -> Result<ChartOutcome> {
        let spec = match self.prepare(kind) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(chart = kind.file_name(), reason = %e, "chart skipped");
                return Ok(ChartOutcome::Skipped { reason: e.to_string() });
            }
        };

        let path = out_dir.join(kind.file_name());
        match &spec {
            ChartSpec::Bars(chart) => draw_bars(&path, self.size, chart),
            ChartSpec::Heatmap(matrix) => draw_heatmap(&path, self.size, kind.title(), matrix),
        }
        .with_context(|| format!("Failed to render chart: {}", path.display()))?;

        tracing::debug!(chart = kind.file_name(), "chart written");
        Ok(ChartOutcome::Written { path })
    }

    /// Compute the data behind a chart
    pub fn prepare(&self, kind: ChartKind) -> Result<ChartSpec, DatasetError> {
        let ds = self.ds;
        let title = kind.title().to_string();

        let spec = match kind {
            ChartKind::AttritionDistribution => {
                self.require_attrition()?;
                let left = ds.attrition_count() as f64;
                let stayed = ds.len() as f64 - left;
                ChartSpec::Bars(BarChart {
                    title,
                    x_desc: "Attrition".to_string(),
                    y_desc: "Employees".to_string(),
                    categories: vec!["Stayed".to_string(), "Left".to_string()],
                    series: vec![BarSeries {
                        bar_colors: Some(vec![STAYED, LEFT]),
                        ..BarSeries::new("Employees", STAYED, vec![stayed, left])
                    }],
                })
            }
            ChartKind::AgeDistribution => {
                ds.require_numeric(columns::AGE)?;
                let counts = stats::age_bucket_counts(ds);
                ChartSpec::Bars(BarChart {
                    title,
                    x_desc: "Age band".to_string(),
                    y_desc: "Employees".to_string(),
                    categories: AgeBucket::ALL.iter().map(|b| b.label().to_string()).collect(),
                    series: vec![
                        BarSeries::new("Stayed", STAYED, counts.iter().map(|c| c.1 as f64).collect()),
                        BarSeries::new("Left", LEFT, counts.iter().map(|c| c.2 as f64).collect()),
                    ],
                })
            }
            ChartKind::IncomeHistogram => {
                let income = ds.require_numeric(columns::MONTHLY_INCOME)?;
                let bins = stats::histogram(income, self.income_bins);
                ChartSpec::Bars(BarChart {
                    title,
                    x_desc: "Monthly income (bin start)".to_string(),
                    y_desc: "Employees".to_string(),
                    categories: bins.iter().map(|b| format!("{:.0}", b.lower)).collect(),
                    series: vec![BarSeries::new(
                        "Employees",
                        STAYED,
                        bins.iter().map(|b| b.count as f64).collect(),
                    )],
                })
            }
            ChartKind::AttritionByDepartment | ChartKind::AttritionByJobRole => {
                self.require_attrition()?;
                let column = if kind == ChartKind::AttritionByDepartment {
                    columns::DEPARTMENT
                } else {
                    columns::JOB_ROLE
                };
                let groups = stats::attrition_by(ds, column)?;
                let max_rate = groups.iter().map(|g| g.rate).fold(0.0, f64::max);
                ChartSpec::Bars(BarChart {
                    title,
                    x_desc: column.to_string(),
                    y_desc: "Attrition %".to_string(),
                    categories: groups.iter().map(|g| g.group.clone()).collect(),
                    series: vec![BarSeries {
                        bar_colors: Some(
                            groups.iter().map(|g| risk_color(g.rate, max_rate)).collect(),
                        ),
                        ..BarSeries::new("Attrition %", LEFT, groups.iter().map(|g| g.rate).collect())
                    }],
                })
            }
            ChartKind::RoleCompensation => {
                self.require_attrition()?;
                let roles = stats::role_compensation(ds)?;
                let max_rate = roles.iter().map(|r| r.attrition_rate_pct).fold(0.0, f64::max);
                ChartSpec::Bars(BarChart {
                    title,
                    x_desc: "Job role (riskiest first)".to_string(),
                    y_desc: "Average monthly income".to_string(),
                    categories: roles.iter().map(|r| r.role.clone()).collect(),
                    series: vec![BarSeries {
                        bar_colors: Some(
                            roles
                                .iter()
                                .map(|r| risk_color(r.attrition_rate_pct, max_rate))
                                .collect(),
                        ),
                        ..BarSeries::new(
                            "Average income",
                            STAYED,
                            roles.iter().map(|r| r.avg_income.unwrap_or(0.0)).collect(),
                        )
                    }],
                })
            }
            ChartKind::OvertimeVsAttrition => self.grouped_counts(title, columns::OVERTIME)?,
            ChartKind::JobSatisfactionVsAttrition => {
                self.grouped_counts(title, columns::JOB_SATISFACTION)?
            }
            ChartKind::WorkLifeBalanceVsAttrition => {
                self.grouped_counts(title, columns::WORK_LIFE_BALANCE)?
            }
            ChartKind::CorrelationHeatmap => match stats::correlation(ds) {
                Some(matrix) => ChartSpec::Heatmap(matrix),
                None => {
                    return Err(DatasetError::NotNumeric(
                        "fewer than two numeric columns".to_string(),
                    ))
                }
            },
        };

        Ok(spec)
    }

    fn require_attrition(&self) -> Result<(), DatasetError> {
        if self.ds.has_attrition() {
            Ok(())
        } else {
            Err(DatasetError::MissingColumn(columns::ATTRITION.to_string()))
        }
    }

    /// Grouped bars: one group per value of `column`, one bar per Attrition value
    fn grouped_counts(&self, title: String, column: &str) -> Result<ChartSpec, DatasetError> {
        let tab = stats::crosstab(self.ds, column, columns::ATTRITION)?;

        let series = tab
            .cols
            .iter()
            .enumerate()
            .map(|(c, label)| {
                BarSeries::new(
                    &format!("Attrition = {}", label),
                    SERIES_PALETTE[c % SERIES_PALETTE.len()],
                    tab.counts.iter().map(|row| row[c] as f64).collect(),
                )
            })
            .collect();

        Ok(ChartSpec::Bars(BarChart {
            title,
            x_desc: column.to_string(),
            y_desc: "Employees".to_string(),
            categories: tab.rows.clone(),
            series,
        }))
    }
}

fn risk_color(rate: f64, max_rate: f64) -> RGBColor {
    if max_rate <= 0.0 {
        RISK_SCALE[0]
    } else {
        interpolate(&RISK_SCALE, rate / max_rate)
    }
}

/// Label for a category centre (`i + 0.5`); other tick positions stay blank
fn category_label(categories: &[String], position: f64) -> String {
    if position < 0.0 || (position.fract() - 0.5).abs() > 1e-6 {
        return String::new();
    }
    categories
        .get(position.floor() as usize)
        .cloned()
        .unwrap_or_default()
}

/// Tick count that makes plotters step by 0.5 over `0..n`, so every
/// category centre gets a tick
fn category_ticks(n: usize) -> usize {
    2 * n + 1
}

// ============================================================================
// DRAWING
// ============================================================================

fn draw_bars(path: &Path, size: (u32, u32), chart: &BarChart) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let n = chart.categories.len().max(1);
    let y_max = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 24).into_font().color(&FOREGROUND))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..n as f64, 0f64..y_max)?;

    let categories = &chart.categories;
    let x_formatter = |x: &f64| category_label(categories, *x);
    let mut mesh = ctx.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(category_ticks(n))
        .bold_line_style(GRID.mix(0.15))
        .light_line_style(TRANSPARENT)
        .axis_style(FOREGROUND)
        .label_style((FONT, 12).into_font().color(&FOREGROUND))
        .axis_desc_style((FONT, 15).into_font().color(&FOREGROUND))
        .x_label_formatter(&x_formatter)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str());
    mesh.draw()?;

    let slot = 0.8 / chart.series.len().max(1) as f64;
    for (s, series) in chart.series.iter().enumerate() {
        let color = series.color;
        let bar_colors = &series.bar_colors;

        ctx.draw_series(series.values.iter().enumerate().map(|(i, &value)| {
            let x0 = i as f64 + 0.1 + slot * s as f64;
            let fill = bar_colors
                .as_ref()
                .and_then(|colors| colors.get(i).copied())
                .unwrap_or(color);
            Rectangle::new([(x0, 0.0), (x0 + slot, value)], fill.filled())
        }))?
        .label(series.label.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if chart.series.len() > 1 {
        ctx.configure_series_labels()
            .background_style(BACKGROUND.mix(0.8))
            .border_style(FOREGROUND)
            .label_font((FONT, 13).into_font().color(&FOREGROUND))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_heatmap(path: &Path, size: (u32, u32), title: &str, matrix: &CorrelationMatrix) -> Result<()> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let n = matrix.columns.len();
    let extent = n as f64;

    let mut ctx = ChartBuilder::on(&root)
        .caption(title, (FONT, 24).into_font().color(&FOREGROUND))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(140)
        .build_cartesian_2d(0f64..extent, 0f64..extent)?;

    // Row i is drawn at the top when i == 0
    let names = &matrix.columns;
    let x_formatter = |x: &f64| category_label(names, *x);
    let y_formatter = |y: &f64| category_label(names, extent - *y);
    let mut mesh = ctx.configure_mesh();
    mesh.disable_mesh()
        .x_labels(category_ticks(n))
        .y_labels(category_ticks(n))
        .axis_style(FOREGROUND)
        .label_style((FONT, 11).into_font().color(&FOREGROUND))
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter);
    mesh.draw()?;

    ctx.draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
        row.iter().enumerate().map(move |(j, &r)| {
            let y0 = (n - 1 - i) as f64;
            Rectangle::new(
                [(j as f64, y0), (j as f64 + 1.0, y0 + 1.0)],
                correlation_color(r).filled(),
            )
        })
    }))?;

    let annotation = (FONT, 12)
        .into_font()
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));
    ctx.draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
        let style = annotation.clone();
        row.iter().enumerate().map(move |(j, &r)| {
            let y0 = (n - 1 - i) as f64;
            let label = if r.is_nan() { "n/a".to_string() } else { format!("{:.2}", r) };
            Text::new(label, (j as f64 + 0.5, y0 + 0.5), style.clone())
        })
    }))?;

    root.present()?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Age,Attrition,Department,JobRole,JobSatisfaction,MonthlyIncome,OverTime,WorkLifeBalance,YearsAtCompany
22,Yes,Sales,Sales Representative,1,2100,Yes,2,1
34,No,Sales,Sales Executive,3,5200,No,3,6
41,No,Research & Development,Research Scientist,4,4300,No,3,9
47,Yes,Research & Development,Laboratory Technician,2,3100,Yes,1,3
58,No,Human Resources,Manager,4,15000,No,4,22
29,No,Research & Development,Research Scientist,3,3900,Yes,3,4
";

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes(), "sample").unwrap()
    }

    fn bars(spec: ChartSpec) -> BarChart {
        match spec {
            ChartSpec::Bars(chart) => chart,
            ChartSpec::Heatmap(_) => panic!("expected bar chart"),
        }
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate(&RISK_SCALE, 0.0), RISK_SCALE[0]);
        assert_eq!(interpolate(&RISK_SCALE, 0.5), RISK_SCALE[1]);
        assert_eq!(interpolate(&RISK_SCALE, 1.0), RISK_SCALE[2]);
        assert_eq!(interpolate(&RISK_SCALE, 7.0), RISK_SCALE[2]);
        assert_eq!(
            interpolate(&[RGBColor(0, 0, 0), RGBColor(200, 100, 50)], 0.5),
            RGBColor(100, 50, 25)
        );
        assert_eq!(correlation_color(f64::NAN), MISSING);
    }

    #[test]
    fn test_category_label() {
        let cats = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_label(&cats, 0.5), "a");
        assert_eq!(category_label(&cats, 1.5), "b");
        assert_eq!(category_label(&cats, 0.0), "");
        assert_eq!(category_label(&cats, 1.0), "");
        assert_eq!(category_label(&cats, 2.5), "");
        assert_eq!(category_label(&cats, -0.5), "");
    }

    #[test]
    fn test_prepare_attrition_distribution() {
        let ds = sample();
        let renderer = ChartRenderer::new(&ds, &AnalysisConfig::default());
        let chart = bars(renderer.prepare(ChartKind::AttritionDistribution).unwrap());
        assert_eq!(chart.categories, vec!["Stayed", "Left"]);
        assert_eq!(chart.series[0].values, vec![4.0, 2.0]);
    }

    #[test]
    fn test_prepare_overtime_grouped_counts() {
        let ds = sample();
        let renderer = ChartRenderer::new(&ds, &AnalysisConfig::default());
        let chart = bars(renderer.prepare(ChartKind::OvertimeVsAttrition).unwrap());
        assert_eq!(chart.categories, vec!["No", "Yes"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].label, "Attrition = No");
        assert_eq!(chart.series[0].values, vec![3.0, 1.0]);
        assert_eq!(chart.series[1].values, vec![0.0, 2.0]);
    }

    #[test]
    fn test_prepare_role_compensation_orders_by_risk() {
        let ds = sample();
        let renderer = ChartRenderer::new(&ds, &AnalysisConfig::default());
        let chart = bars(renderer.prepare(ChartKind::RoleCompensation).unwrap());
        assert_eq!(chart.categories[0], "Laboratory Technician");
        let colors = chart.series[0].bar_colors.as_ref().unwrap();
        assert_eq!(colors[0], RISK_SCALE[2]);
        assert_eq!(*colors.last().unwrap(), RISK_SCALE[0]);
    }

    #[test]
    fn test_prepare_heatmap() {
        let ds = sample();
        let renderer = ChartRenderer::new(&ds, &AnalysisConfig::default());
        match renderer.prepare(ChartKind::CorrelationHeatmap).unwrap() {
            ChartSpec::Heatmap(matrix) => {
                assert!(matrix.columns.contains(&"Attrition_bool".to_string()));
            }
            ChartSpec::Bars(_) => panic!("expected heatmap"),
        }
    }

    #[test]
    fn test_render_all_writes_every_chart() {
        let ds = sample();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figures");

        let rendered = ChartRenderer::new(&ds, &AnalysisConfig::default())
            .render_all(&out)
            .unwrap();

        assert_eq!(rendered.len(), ChartKind::ALL.len());
        assert!(rendered.iter().all(|c| c.is_written()));
        for kind in ChartKind::ALL {
            let content = fs::read_to_string(out.join(kind.file_name())).unwrap();
            assert!(content.contains("<svg"));
        }

        // Every category centre carries its tick label
        let departments = fs::read_to_string(out.join(ChartKind::AttritionByDepartment.file_name())).unwrap();
        assert!(departments.contains("Human Resources"));
        assert!(departments.contains("Sales"));
        let roles = fs::read_to_string(out.join(ChartKind::AttritionByJobRole.file_name())).unwrap();
        assert!(roles.contains("Laboratory Technician"));
        assert!(roles.contains("Manager"));
        let heatmap = fs::read_to_string(out.join(ChartKind::CorrelationHeatmap.file_name())).unwrap();
        assert!(heatmap.contains("YearsAtCompany"));
        assert!(heatmap.contains("MonthlyIncome"));
    }

    #[test]
    fn test_missing_columns_skip_only_dependent_charts() {
        let csv = "Age,Attrition,MonthlyIncome\n30,Yes,3000\n40,No,5000\n50,No,4000\n";
        let ds = Dataset::from_reader(csv.as_bytes(), "narrow").unwrap();
        let dir = tempfile::tempdir().unwrap();

        let rendered = ChartRenderer::new(&ds, &AnalysisConfig::default())
            .render_all(dir.path())
            .unwrap();

        let written: Vec<ChartKind> = rendered
            .iter()
            .filter(|c| c.is_written())
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            written,
            vec![
                ChartKind::AttritionDistribution,
                ChartKind::AgeDistribution,
                ChartKind::IncomeHistogram,
                ChartKind::CorrelationHeatmap,
            ]
        );

        let skipped = rendered
            .iter()
            .find(|c| c.kind == ChartKind::OvertimeVsAttrition)
            .unwrap();
        assert_eq!(
            skipped.outcome,
            ChartOutcome::Skipped { reason: "column missing: OverTime".to_string() }
        );
        assert!(!dir.path().join("overtime_vs_attrition.svg").exists());
    }

    #[test]
    fn test_unwritable_output_dir() {
        let ds = sample();
        let file = tempfile::NamedTempFile::new().unwrap();
        // A regular file cannot become a directory
        let err = ChartRenderer::new(&ds, &AnalysisConfig::default())
            .render_all(&file.path().join("figures"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create output directory"));
    }
}
