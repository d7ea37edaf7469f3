// End-to-end run of the report pipeline against the bundled sample dataset

use attrition_eda::{run, AnalysisConfig, ChartKind, Dataset};
use std::fs;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/employee_attrition.csv")
}

fn config_for(input: PathBuf, output: PathBuf) -> AnalysisConfig {
    AnalysisConfig {
        input_path: input,
        output_dir: output,
        ..AnalysisConfig::default()
    }
}

#[test]
fn test_full_pipeline_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("figures");
    let config = config_for(sample_path(), out.clone());

    let report = run(&config).unwrap();

    assert_eq!(report.kpis.total_employees, 60);
    assert_eq!(report.charts.len(), 10);
    assert!(report.charts.iter().all(|c| c.is_written()));

    let svgs = fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "svg").unwrap_or(false))
        .count();
    assert_eq!(svgs, 10);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["kpis"]["total_employees"], 60);
    assert_eq!(summary["charts"].as_array().unwrap().len(), 10);

    let export = Dataset::load_csv(&out.join("employee_attrition_export.csv")).unwrap();
    assert_eq!(export.len(), 60);
    assert!(export.has_column("Attrition_bool"));
    assert!(export.has_column("AgeBucket"));
}

#[test]
fn test_missing_column_skips_only_dependent_charts() {
    let dir = tempfile::tempdir().unwrap();

    // Drop the OverTime column (8th field)
    let original = fs::read_to_string(sample_path()).unwrap();
    let trimmed: String = original
        .lines()
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            let kept: Vec<&str> = fields
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != 7)
                .map(|(_, f)| *f)
                .collect();
            kept.join(",") + "\n"
        })
        .collect();
    let input = dir.path().join("no_overtime.csv");
    fs::write(&input, trimmed).unwrap();

    let out = dir.path().join("figures");
    let report = run(&config_for(input, out.clone())).unwrap();

    let skipped: Vec<ChartKind> = report
        .charts
        .iter()
        .filter(|c| !c.is_written())
        .map(|c| c.kind)
        .collect();
    assert_eq!(skipped, vec![ChartKind::OvertimeVsAttrition]);
    assert!(!out.join(ChartKind::OvertimeVsAttrition.file_name()).exists());
    assert!(report.kpis.overtime_pct.is_none());
}

#[test]
fn test_missing_input_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path().join("nope.csv"), dir.path().join("figures"));

    let err = run(&config).unwrap_err();
    assert!(err.to_string().contains("Failed to open CSV file"));
}

#[test]
fn test_unwritable_output_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("figures");
    fs::write(&blocker, "not a directory").unwrap();

    let config = config_for(sample_path(), blocker);
    assert!(run(&config).is_err());
}
