/// HTTP front end.
///
/// Endpoints:
///   GET  /              - empty prediction form
///   POST /predict       - form submission, re-renders the page with the result
///   GET  /report        - plain-text report download (`?label=potable|not_potable`)
///   POST /api/predict   - JSON prediction
///   GET  /api/averages  - JSON dataset averages
///   GET  /health        - liveness
///
/// The server runs on a current-thread runtime: one user, one request at a
/// time, shared state read-only.

use axum::{
    extract::{Form, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::dataset::{self, FeatureAverages, DatasetError};
use crate::inference::Predictor;
use crate::logging::{self, Component};
use crate::model::{FeatureSet, FeatureVector, ModelError, Potability, RawMeasurements};
use crate::page::{self, PageContext};
use crate::report;

/// Read-only state shared by all handlers.
pub struct AppState {
    pub config: Config,
    pub predictor: Predictor,
}

impl AppState {
    pub fn new(config: Config, predictor: Predictor) -> Self {
        Self { config, predictor }
    }

    fn feature_set(&self) -> FeatureSet {
        self.config.model.feature_set
    }

    /// Assembles, scales and classifies one sample.
    pub fn predict(&self, raw: &RawMeasurements) -> Result<(FeatureVector, Potability), ModelError> {
        let features = FeatureVector::assemble(raw, self.feature_set());
        let label = self.predictor.predict(&features)?;
        logging::info(
            Component::Model,
            None,
            &format!("Predicted {} from {} values", label, features.values.len()),
        );
        Ok((features, label))
    }

    /// Reads the dataset CSV, logging (not propagating) any failure.
    fn averages(&self) -> Result<FeatureAverages, DatasetError> {
        let path = &self.config.dataset.path;
        let result = dataset::load_averages(path);
        if let Err(e) = &result {
            logging::log_dataset_failure(&path.display().to_string(), e);
        }
        result
    }

    fn render(&self, inputs: RawMeasurements, outcome: Option<Potability>) -> String {
        page::render_page(&PageContext {
            model: &self.config.model,
            date: report::today(),
            inputs,
            outcome,
            averages: self.averages(),
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Builds the router over the shared state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/report", get(download_report))
        .route("/api/predict", post(predict_json))
        .route("/api/averages", get(averages_json))
        .route("/health", get(health))
        .with_state(state)
}

fn model_failure(err: ModelError) -> Response {
    logging::error(Component::Model, None, &err.to_string());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(page::render_error_page(&err.to_string())),
    )
        .into_response()
}

async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(state.render(RawMeasurements::default(), None))
}

async fn predict_form(
    State(state): State<SharedState>,
    Form(raw): Form<RawMeasurements>,
) -> Response {
    match state.predict(&raw) {
        Ok((_, label)) => Html(state.render(raw, Some(label))).into_response(),
        Err(e) => model_failure(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub label: Potability,
}

async fn download_report(Query(query): Query<ReportQuery>) -> Response {
    let filename = report::report_filename(report::today());
    logging::debug(Component::Report, Some(&filename), "Report downloaded");
    (
        [
            (header::CONTENT_TYPE, report::REPORT_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report::report_text(query.label),
    )
        .into_response()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub label: Potability,
    pub feature_set: FeatureSet,
    pub features: Vec<NamedValue>,
    pub report: String,
}

async fn predict_json(
    State(state): State<SharedState>,
    Json(raw): Json<RawMeasurements>,
) -> Response {
    match state.predict(&raw) {
        Ok((features, label)) => Json(PredictionResponse {
            label,
            feature_set: features.feature_set,
            features: features
                .names
                .iter()
                .zip(&features.values)
                .map(|(name, value)| NamedValue {
                    name: name.to_string(),
                    value: *value,
                })
                .collect(),
            report: report::report_text(label).to_string(),
        })
        .into_response(),
        Err(e) => {
            logging::error(Component::Model, None, &e.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn averages_json(State(state): State<SharedState>) -> Json<serde_json::Value> {
    match state.averages() {
        Ok(averages) => Json(serde_json::json!({
            "rows": averages.rows,
            "averages": averages.to_json_object(),
        })),
        Err(_) => Json(serde_json::json!({ "warning": page::DATASET_WARNING })),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logging::error(
            Component::System,
            None,
            &format!("Failed to install Ctrl+C handler: {}", e),
        );
        std::future::pending::<()>().await;
    }
}

/// Serves on an already-bound listener until Ctrl+C.
pub fn serve_on(
    listener: std::net::TcpListener,
    state: SharedState,
) -> Result<(), Box<dyn std::error::Error>> {
    listener.set_nonblocking(true)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::from_std(listener)?;
        let addr = listener.local_addr()?;
        logging::info(
            Component::Server,
            None,
            &format!("Server listening on http://{}", addr),
        );

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        logging::info(Component::Server, None, "Server stopped");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Binds the configured address and serves.
pub fn run(state: SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = std::net::TcpListener::bind(&state.config.server.bind_addr)?;
    serve_on(listener, state)
}
