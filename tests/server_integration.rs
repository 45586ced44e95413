//! HTTP Integration Tests
//!
//! Starts the server on an ephemeral port with the shipped model artifacts
//! and drives it the way a browser would: load the form, submit
//! measurements, download the report, open the averages panel.
//!
//! Run with: cargo test --test server_integration

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use potability_service::config::{Config, ModelConfig};
use potability_service::inference::Predictor;
use potability_service::model::FeatureSet;
use potability_service::server::{self, AppState, PredictionResponse};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn artifact(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn model_config(feature_set: FeatureSet) -> ModelConfig {
    let dir = match feature_set {
        FeatureSet::Raw => "models",
        FeatureSet::Derived => "models/derived",
    };
    ModelConfig {
        feature_set,
        scaler_path: artifact(&format!("{}/scaler.json", dir)),
        classifier_path: artifact(&format!("{}/water_quality_model.json", dir)),
        ..ModelConfig::default()
    }
}

/// Starts a server in the background and returns its base URL.
fn start_server(model: ModelConfig, dataset: &Path) -> String {
    let mut config = Config::default();
    config.model = model;
    config.dataset.path = dataset.to_path_buf();

    let predictor = Predictor::load(&config.model).expect("artifacts should load");
    let state = Arc::new(AppState::new(config, predictor));

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Err(e) = server::serve_on(listener, state) {
            eprintln!("test server exited: {}", e);
        }
    });

    format!("http://{}", addr)
}

fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap()
}

fn clean_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("NH4", "0.10"),
        ("BSK5", "2.00"),
        ("Suspended", "5.00"),
        ("O2", "9.00"),
        ("NO3", "2.00"),
        ("NO2", "0.02"),
        ("SO4", "30.00"),
        ("PO4", "0.10"),
        ("CL", "20.00"),
    ]
}

fn polluted_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("NH4", "5"),
        ("BSK5", "12"),
        ("Suspended", "40"),
        ("O2", "2"),
        ("NO3", "25"),
        ("NO2", "0.5"),
        ("SO4", "300"),
        ("PO4", "3"),
        ("CL", "400"),
    ]
}

// ---------------------------------------------------------------------------
// Form flow
// ---------------------------------------------------------------------------

#[test]
fn test_index_renders_empty_form_and_dataset_warning() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));

    let response = client().get(format!("{}/", base)).send().unwrap();
    assert!(response.status().is_success());
    let html = response.text().unwrap();

    assert!(html.contains("💧 Water Quality Predictor"));
    assert!(html.contains(r#"name="NH4" step="any" value="0.00""#));
    assert!(html.contains("⚠️ Dataset file not found on Desktop."));
    assert!(!html.contains("Prediction Result"));
}

#[test]
fn test_predict_form_shows_safe_result_with_chart() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));

    let html = client()
        .post(format!("{}/predict", base))
        .form(&clean_form())
        .send()
        .unwrap()
        .text()
        .unwrap();

    assert!(html.contains("✅ Water is Safe to Drink"));
    assert!(html.contains("<svg"));
    assert!(html.contains(r#"href="/report?label=potable""#));
    // Submitted values are kept in the form.
    assert!(html.contains(r#"name="SO4" step="any" value="30.00""#));
}

#[test]
fn test_predict_form_shows_unsafe_result_for_derived_model() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Derived), &dir.path().join("missing.csv"));

    let html = client()
        .post(format!("{}/predict", base))
        .form(&polluted_form())
        .send()
        .unwrap()
        .text()
        .unwrap();

    assert!(html.contains("❌ Water is NOT Safe to Drink"));
    assert!(html.contains("⚠️ Consider treatment for pollutants."));
}

#[test]
fn test_non_numeric_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));

    let mut form = clean_form();
    form[0] = ("NH4", "lots");
    let response = client()
        .post(format!("{}/predict", base))
        .form(&form)
        .send()
        .unwrap();
    assert!(
        response.status().is_client_error(),
        "non-numeric input should be rejected, got {}",
        response.status()
    );
}

#[test]
fn test_feature_count_mismatch_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let mismatched = ModelConfig {
        feature_set: FeatureSet::Raw,
        ..model_config(FeatureSet::Derived)
    };
    let base = start_server(mismatched, &dir.path().join("missing.csv"));

    let response = client()
        .post(format!("{}/predict", base))
        .form(&clean_form())
        .send()
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert!(response.text().unwrap().contains("Feature count mismatch"));
}

// ---------------------------------------------------------------------------
// Report download
// ---------------------------------------------------------------------------

#[test]
fn test_report_download_headers_and_body() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));

    let response = client()
        .get(format!("{}/report?label=not_potable", base))
        .send()
        .unwrap();
    assert!(response.status().is_success());

    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"water_quality_report_"));
    assert!(disposition.ends_with(".txt\""));

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    assert_eq!(
        response.text().unwrap(),
        "❌ Water is NOT safe.\n\nTake appropriate water treatment measures."
    );
}

#[test]
fn test_report_with_unknown_label_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));

    let response = client()
        .get(format!("{}/report?label=maybe", base))
        .send()
        .unwrap();
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[test]
fn test_api_predict_returns_derived_features() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Derived), &dir.path().join("missing.csv"));

    let body = serde_json::json!({
        "NH4": 0.5, "BSK5": 2.0, "Suspended": 10, "O2": 8.0, "NO3": 5.0,
        "NO2": 0.0, "SO4": 20, "PO4": 0.3, "CL": 15
    });
    let response: PredictionResponse = client()
        .post(format!("{}/api/predict", base))
        .json(&body)
        .send()
        .unwrap()
        .json()
        .expect("prediction response should deserialize");

    assert_eq!(response.feature_set, FeatureSet::Derived);
    let values: Vec<f64> = response.features.iter().map(|f| f.value).collect();
    assert_eq!(
        values,
        vec![0.5, 2.0, 10.0, 8.0, 5.0, 0.0, 20.0, 0.3, 15.0, 0.0, 0.5, 0.8]
    );
    assert_eq!(response.features[9].name, "NO3_NO2");
    assert_eq!(
        response.report,
        potability_service::report::report_text(response.label)
    );
}

#[test]
fn test_api_averages_with_and_without_dataset() {
    let dir = tempfile::tempdir().unwrap();

    let missing = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));
    let json: serde_json::Value = client()
        .get(format!("{}/api/averages", missing))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(json["warning"], "⚠️ Dataset file not found on Desktop.");

    let csv_path = dir.path().join("PB_All_2000_2021.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "id;date;NH4;BSK5;Suspended;O2;NO3;NO2;SO4;PO4;CL").unwrap();
    writeln!(file, "1;17.02.2000;0.33;2.77;12;12.3;9.5;0.057;154;0.454;289.5").unwrap();
    writeln!(file, "1;11.05.2000;0.044;3;51.6;14.61;17.75;0.034;352;0.09;1792").unwrap();
    drop(file);

    let present = start_server(model_config(FeatureSet::Raw), &csv_path);
    let json: serde_json::Value = client()
        .get(format!("{}/api/averages", present))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(json["rows"], 2);
    assert_eq!(json["averages"]["Suspended"], 31.8);

    let html = client().get(format!("{}/", present)).send().unwrap().text().unwrap();
    assert!(html.contains("🧪 Average Values in Dataset:"));
    assert!(!html.contains("Dataset file not found"));
}

#[test]
fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(model_config(FeatureSet::Raw), &dir.path().join("missing.csv"));
    let json: serde_json::Value = client()
        .get(format!("{}/health", base))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(json["status"], "healthy");
}
