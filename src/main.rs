use anyhow::{bail, Result};
use attrition_eda::{
    answer, init_tracing, parse_assignment, run, AnalysisConfig, AttritionModel, ChartOutcome,
    Dataset,
};
use std::env;

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let config = AnalysisConfig::discover()?;

    match args.get(1).map(|s| s.as_str()) {
        None | Some("report") => run_report(&config)?,
        Some("ask") => run_ask(&config, &args[2..])?,
        Some("predict") => run_predict(&config, &args[2..])?,
        Some("ui") => run_ui_mode(&config)?,
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: attrition-eda [report|ask <question>|predict [Feature=value ...]|ui]");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn run_report(config: &AnalysisConfig) -> Result<()> {
    println!("📊 Employee Attrition EDA");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading {}...", config.input_path.display());
    let report = run(config)?;
    let kpis = &report.kpis;
    println!(
        "✓ Loaded {} employees across {} columns",
        kpis.total_employees, kpis.column_count
    );

    println!("\n📝 Workforce story");
    for line in report.story() {
        println!("   • {}", line);
    }

    if !report.top_job_roles.is_empty() {
        println!("\n🔥 Top attrition job roles");
        for role in &report.top_job_roles {
            println!("   {:<28} {:>5.1}%  ({} of {})", role.group, role.rate, role.left, role.total);
        }
    }

    println!("\n🎨 Charts");
    for chart in &report.charts {
        match &chart.outcome {
            ChartOutcome::Written { path } => println!("   ✓ {}", path.display()),
            ChartOutcome::Skipped { reason } => {
                println!("   ⚠️  {} skipped ({})", chart.kind.file_name(), reason)
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Summary: {}", config.summary_path().display());
    if config.export_dataset {
        println!("✅ Export:  {}", config.export_path().display());
    }

    Ok(())
}

fn run_ask(config: &AnalysisConfig, words: &[String]) -> Result<()> {
    let ds = Dataset::load_csv(&config.input_path)?;
    let question = words.join(" ");

    println!("💬 {}", question);
    print!("{}", answer(&ds, &question));

    Ok(())
}

fn run_predict(config: &AnalysisConfig, assignments: &[String]) -> Result<()> {
    let ds = Dataset::load_csv(&config.input_path)?;

    println!("🔮 Training attrition predictor...");
    let model = AttritionModel::train(&ds)?;
    let eval = &model.evaluation;
    println!(
        "✓ Trained on {} rows, accuracy {:.1}% on {} held-out rows",
        eval.train_rows,
        eval.accuracy * 100.0,
        eval.test_rows
    );

    let mut input = model.default_input();
    for text in assignments {
        let (name, value) = parse_assignment(text)?;
        if !model.features().contains(&name.as_str()) {
            bail!("Unknown feature: {} (known: {})", name, model.features().join(", "));
        }
        input.insert(name, value);
    }

    println!("\n👤 Profile");
    for (name, value) in &input {
        println!("   {:<20} {}", name, value);
    }

    let probability = model.predict_proba(&input);
    println!("\n📈 Attrition probability: {:.1}%", probability * 100.0);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AnalysisConfig) -> Result<()> {
    use attrition_eda::ui;
    use attrition_eda::AnalysisReport;

    println!("🖥️  Loading Employee Attrition dashboard...\n");

    if !config.input_path.exists() {
        eprintln!("❌ Dataset not found at {:?}", config.input_path);
        eprintln!("   Set input_path in attrition.json");
        std::process::exit(1);
    }

    let ds = Dataset::load_csv(&config.input_path)?;
    let report = AnalysisReport::build(&ds, config)?;

    println!("✓ Loaded {} employees\n", ds.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    // Create and run app
    let mut app = ui::App::new(ds, report);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AnalysisConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin attrition-server --features server");
    std::process::exit(1);
}
