// 🌐 REST API for the attrition dashboard
// Read-only JSON views over one loaded dataset

use crate::assistant::{self, Answer};
use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, DatasetError};
use crate::predictor::{AttritionModel, Evaluation, ModelInput};
use crate::report::{self, AnalysisReport, RiskFocus};
use crate::stats::{self, Kpis};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub report: Arc<AnalysisReport>,
    pub model: Option<Arc<AttritionModel>>,
    pub config: Arc<AnalysisConfig>,
}

impl AppState {
    /// Summarize the dataset and train the predictor once, up front
    pub fn new(dataset: Dataset, config: AnalysisConfig) -> anyhow::Result<Self> {
        let report = AnalysisReport::build(&dataset, &config)?;

        let model = match AttritionModel::train(&dataset) {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                tracing::warn!(error = %e, "predictor disabled");
                None
            }
        };

        Ok(Self {
            dataset: Arc::new(dataset),
            report: Arc::new(report),
            model,
            config: Arc::new(config),
        })
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}

fn dataset_error(e: DatasetError) -> Response {
    let status = match e {
        DatasetError::MissingColumn(_) => StatusCode::NOT_FOUND,
        DatasetError::NotNumeric(_) => StatusCode::BAD_REQUEST,
        DatasetError::Empty => StatusCode::UNPROCESSABLE_ENTITY,
    };
    fail(status, e.to_string())
}

#[derive(Serialize)]
struct OverviewResponse<'a> {
    source: &'a str,
    kpis: &'a Kpis,
    risk_focus: &'a RiskFocus,
    story: Vec<String>,
}

#[derive(Serialize)]
struct PredictResponse<'a> {
    probability: f64,
    input: ModelInput,
    features: Vec<&'a str>,
    evaluation: &'a Evaluation,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/overview - KPIs, risk focus and narrative
async fn get_overview(State(state): State<AppState>) -> Response {
    let report = &state.report;
    ok(OverviewResponse {
        source: &report.source,
        kpis: &report.kpis,
        risk_focus: &report.risk_focus,
        story: report.story(),
    })
}

/// GET /api/groups/:column - Attrition rate per value of a column
async fn get_groups(State(state): State<AppState>, Path(column): Path<String>) -> Response {
    if !state.dataset.has_attrition() {
        return dataset_error(DatasetError::MissingColumn(
            crate::dataset::columns::ATTRITION.to_string(),
        ));
    }
    match stats::attrition_by(&state.dataset, &column) {
        Ok(groups) => ok(groups),
        Err(e) => dataset_error(e),
    }
}

/// GET /api/roles - Income and tenure per job role
async fn get_roles(State(state): State<AppState>) -> Response {
    match stats::role_compensation(&state.dataset) {
        Ok(roles) => ok(roles),
        Err(e) => dataset_error(e),
    }
}

/// GET /api/crosstab/:row/:col - Contingency table of two columns
async fn get_crosstab(
    State(state): State<AppState>,
    Path((row, col)): Path<(String, String)>,
) -> Response {
    match stats::crosstab(&state.dataset, &row, &col) {
        Ok(table) => ok(table),
        Err(e) => dataset_error(e),
    }
}

/// GET /api/correlation - Pearson matrix of the numeric columns
async fn get_correlation(State(state): State<AppState>) -> Response {
    match &state.report.correlation {
        Some(matrix) => ok(matrix),
        None => fail(StatusCode::NOT_FOUND, "fewer than two numeric columns"),
    }
}

/// GET /api/describe - count/mean/std/quartiles per numeric column
async fn get_describe(State(state): State<AppState>) -> Response {
    ok(&state.report.numeric_summary)
}

/// GET /api/ask/:question - Keyword assistant
async fn ask(State(state): State<AppState>, Path(question): Path<String>) -> Response {
    let decoded = urlencoding::decode(&question)
        .unwrap_or_else(|_| question.clone().into())
        .into_owned();

    let answer: Answer = assistant::answer(&state.dataset, &decoded);
    ok(answer)
}

/// POST /api/predict - Attrition probability for a partial profile
async fn predict(State(state): State<AppState>, Json(overrides): Json<ModelInput>) -> Response {
    let Some(model) = &state.model else {
        return fail(StatusCode::SERVICE_UNAVAILABLE, "Predictor not available for this dataset");
    };

    let mut input = model.default_input();
    let features = model.features();
    for (name, value) in overrides {
        if !features.contains(&name.as_str()) {
            return fail(StatusCode::BAD_REQUEST, format!("Unknown feature: {}", name));
        }
        input.insert(name, value);
    }

    ok(PredictResponse {
        probability: model.predict_proba(&input),
        input,
        features,
        evaluation: &model.evaluation,
    })
}

/// GET /api/export - Dataset with derived columns as CSV
async fn export(State(state): State<AppState>) -> Response {
    let mut buffer = Vec::new();
    match report::write_export(&state.dataset, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"employee_attrition_export.csv\"",
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET / - Dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let figures = ServeDir::new(&state.config.output_dir);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/overview", get(get_overview))
        .route("/groups/:column", get(get_groups))
        .route("/roles", get(get_roles))
        .route("/crosstab/:row/:col", get(get_crosstab))
        .route("/correlation", get(get_correlation))
        .route("/describe", get(get_describe))
        .route("/ask/:question", get(ask))
        .route("/predict", post(predict))
        .route("/export", get(export))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/figures", figures)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn sample_csv() -> String {
        let mut csv = String::from("Age,Attrition,Department,JobRole,MonthlyIncome,OverTime,YearsAtCompany\n");
        for i in 0..10 {
            csv.push_str(&format!(
                "{},Yes,Sales,Sales Representative,{},Yes,{}\n",
                22 + i,
                2000 + i * 100,
                1 + i % 3
            ));
            csv.push_str(&format!(
                "{},No,Research & Development,Research Scientist,{},No,{}\n",
                38 + i,
                6500 + i * 250,
                6 + i
            ));
        }
        csv
    }

    fn app(output_dir: &std::path::Path) -> Router {
        let ds = Dataset::from_reader(sample_csv().as_bytes(), "api-test").unwrap();
        let config = AnalysisConfig {
            output_dir: output_dir.to_path_buf(),
            ..AnalysisConfig::default()
        };
        router(AppState::new(ds, config).unwrap())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": "OK"}));
    }

    #[tokio::test]
    async fn test_overview() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()), "/api/overview").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["kpis"]["total_employees"], 20);
        assert_eq!(body["data"]["kpis"]["attrition_rate"], 50.0);
        assert_eq!(body["data"]["risk_focus"]["department"]["group"], "Sales");
        assert_eq!(
            body["data"]["story"][0],
            "20 active employee records in this dataset."
        );
    }

    #[tokio::test]
    async fn test_groups_and_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()), "/api/groups/Department").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][1]["group"], "Sales");
        assert_eq!(body["data"][1]["rate"], 100.0);

        let (status, body) = get_json(app(dir.path()), "/api/groups/Gender").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "column missing: Gender");
    }

    #[tokio::test]
    async fn test_crosstab() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()), "/api/crosstab/OverTime/Attrition").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rows"], json!(["No", "Yes"]));
        assert_eq!(body["data"]["counts"], json!([[10, 0], [0, 10]]));
    }

    #[tokio::test]
    async fn test_ask_decodes_question() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()), "/api/ask/high%20risk%20dept").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["kind"], "rates");
        assert_eq!(body["data"]["rows"][0], json!(["Sales", 100.0]));
    }

    #[tokio::test]
    async fn test_predict() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"Age": 23, "OverTime": "Yes", "MonthlyIncome": 2100}"#))
            .unwrap();
        let (status, body) = send(app(dir.path()), request).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).unwrap();
        let p = body["data"]["probability"].as_f64().unwrap();
        assert!(p > 0.5, "probability was {}", p);
        assert_eq!(body["data"]["input"]["OverTime"], "Yes");

        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"Salary": 1}"#))
            .unwrap();
        let (status, _) = send(app(dir.path()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder().uri("/api/export").body(Body::empty()).unwrap();
        let (status, body) = send(app(dir.path()), request).await;
        assert_eq!(status, StatusCode::OK);

        let text = String::from_utf8(body).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.ends_with("Attrition_bool,AgeBucket"));
        assert_eq!(text.lines().count(), 21);
    }

    #[tokio::test]
    async fn test_figures_are_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.svg"), "<svg/>").unwrap();

        let request = Request::builder().uri("/figures/chart.svg").body(Body::empty()).unwrap();
        let (status, body) = send(app(dir.path()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<svg/>");
    }
}
