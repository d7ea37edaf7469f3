// Employee Attrition EDA - Web Server
// Dashboard page + REST API with Axum

use anyhow::{Context, Result};
use attrition_eda::api::{router, AppState};
use attrition_eda::{init_tracing, AnalysisConfig, ChartRenderer, Dataset};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    println!("🌐 Employee Attrition EDA - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AnalysisConfig::discover()?;

    if !config.input_path.exists() {
        eprintln!("❌ Dataset not found at {:?}", config.input_path);
        eprintln!("   Set input_path in attrition.json");
        std::process::exit(1);
    }

    let dataset = Dataset::load_csv(&config.input_path)?;
    println!("✓ Dataset loaded: {} rows, {} columns", dataset.len(), dataset.column_count());

    // Charts are served from the output folder
    let charts = ChartRenderer::new(&dataset, &config).render_all(&config.output_dir)?;
    let written = charts.iter().filter(|c| c.is_written()).count();
    println!("✓ {} charts rendered to {:?}", written, config.output_dir);

    let addr = config.server_addr.clone();
    let state = AppState::new(dataset, config)?;
    if state.model.is_some() {
        println!("✓ Attrition predictor trained");
    }

    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API:     http://{}/api/overview", addr);
    println!("   Figures: http://{}/figures/", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
