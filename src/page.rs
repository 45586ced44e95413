/// Server-side rendering of the single-screen prediction page.
///
/// The page is rebuilt from scratch on every interaction: sidebar with model
/// metadata, one numeric input per raw feature, the feature glossary, the
/// prediction result (radar chart and report link included) when there is
/// one, and the dataset averages panel.

use chrono::NaiveDate;
use std::fmt::Write;

use crate::catalog::{self, FEATURE_CATALOG};
use crate::chart;
use crate::config::ModelConfig;
use crate::dataset::{DatasetError, FeatureAverages};
use crate::model::{Potability, RawMeasurements};

pub const PAGE_TITLE: &str = "💧 Water Quality Predictor";
pub const DATASET_WARNING: &str = "⚠️ Dataset file not found on Desktop.";

/// Everything the page needs for one render.
pub struct PageContext<'a> {
    pub model: &'a ModelConfig,
    pub date: NaiveDate,
    /// Values shown in the input fields.
    pub inputs: RawMeasurements,
    /// Set once the user has pressed Predict.
    pub outcome: Option<Potability>,
    pub averages: Result<FeatureAverages, DatasetError>,
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body{font-family:sans-serif;margin:0;display:flex;color:#262730}\
aside{width:16rem;min-height:100vh;background:#f0f2f6;padding:1.5rem}\
main{max-width:44rem;padding:1.5rem 3rem}\
label{display:block;margin-top:.75rem}\
input[type=number]{width:100%;padding:.4rem}\
button{margin-top:1rem;padding:.5rem 1rem}\
.success{background:#dff5e3;padding:.75rem;border-radius:.4rem}\
.error{background:#fde4e4;padding:.75rem;border-radius:.4rem}\
.warning{background:#fff6d6;padding:.75rem;border-radius:.4rem}\
details{margin-top:1rem;border:1px solid #e6e9ef;border-radius:.4rem;padding:.5rem}";

fn render_sidebar(out: &mut String, model: &ModelConfig, date: NaiveDate) {
    let _ = write!(
        out,
        "<aside><h2>🔧 Model Info</h2>\
         <p><strong>Model:</strong> {}</p>\
         <p><strong>Trained on:</strong> {}</p>\
         <p><strong>Accuracy:</strong> {}</p>\
         <p><strong>Date:</strong> {}</p></aside>",
        escape_html(&model.name),
        escape_html(&model.trained_on),
        escape_html(&model.accuracy),
        date.format("%Y-%m-%d")
    );
}

fn render_form(out: &mut String, inputs: &RawMeasurements) {
    out.push_str(r#"<form method="post" action="/predict">"#);
    for (code, value) in inputs.labelled() {
        let _ = write!(
            out,
            r#"<label for="{code}">{code}:</label><input type="number" id="{code}" name="{code}" step="any" value="{value:.2}" required>"#,
            code = code,
            value = value
        );
    }

    out.push_str("<details><summary>ℹ️ About the Features</summary><ul>");
    for feature in FEATURE_CATALOG {
        let _ = write!(
            out,
            "<li><strong>{}</strong> &mdash; {}</li>",
            escape_html(&catalog::summary_line(feature)),
            escape_html(feature.description)
        );
    }
    out.push_str("</ul></details>");

    out.push_str(r#"<button type="submit">🔍 Predict</button></form>"#);
}

fn render_outcome(out: &mut String, label: Potability, inputs: &RawMeasurements) {
    out.push_str("<section id=\"result\"><h3>📊 Prediction Result:</h3>");
    if label.is_potable() {
        out.push_str(r#"<p class="success">✅ Water is Safe to Drink</p>"#);
    } else {
        out.push_str(r#"<p class="error">❌ Water is NOT Safe to Drink</p>"#);
        out.push_str(r#"<p class="warning">⚠️ Consider treatment for pollutants.</p>"#);
    }

    out.push_str(&chart::render_radar_svg(&inputs.labelled()));

    let query = if label.is_potable() { "potable" } else { "not_potable" };
    let _ = write!(
        out,
        r#"<p><a class="download" href="/report?label={}" download>📄 Download Report</a></p></section>"#,
        query
    );
}

fn render_averages(out: &mut String, averages: &Result<FeatureAverages, DatasetError>) {
    out.push_str("<details><summary>📊 Compare with Average from Dataset</summary>");
    match averages {
        Ok(averages) => {
            let json = serde_json::to_string_pretty(&averages.to_json_object())
                .unwrap_or_else(|_| "{}".to_string());
            let _ = write!(
                out,
                "<p>🧪 Average Values in Dataset:</p><pre>{}</pre>",
                escape_html(&json)
            );
        }
        Err(_) => {
            let _ = write!(out, r#"<p class="warning">{}</p>"#, DATASET_WARNING);
        }
    }
    out.push_str("</details>");
}

/// Renders the full page.
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Water Quality Predictor</title><style>{}</style></head><body>",
        STYLE
    );
    render_sidebar(&mut out, ctx.model, ctx.date);

    let _ = write!(
        out,
        "<main><h1>{}</h1><p>Enter water test parameters to predict potability.</p>",
        PAGE_TITLE
    );
    render_form(&mut out, &ctx.inputs);
    if let Some(label) = ctx.outcome {
        render_outcome(&mut out, label, &ctx.inputs);
    }
    render_averages(&mut out, &ctx.averages);
    out.push_str("</main></body></html>");
    out
}

/// Minimal page for an interaction that failed outright.
pub fn render_error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Water Quality Predictor</title></head><body><main><h1>{}</h1>\
         <p class=\"error\">{}</p><p><a href=\"/\">Back</a></p></main></body></html>",
        PAGE_TITLE,
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(model: &ModelConfig, outcome: Option<Potability>) -> PageContext<'_> {
        PageContext {
            model,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            inputs: RawMeasurements { nh4: 0.5, suspended: 10.0, ..Default::default() },
            outcome,
            averages: Err(DatasetError::NotFound("PB_All_2000_2021.csv".to_string())),
        }
    }

    #[test]
    fn test_form_has_one_input_per_feature_with_two_decimals() {
        let model = ModelConfig::default();
        let html = render_page(&context(&model, None));
        for feature in FEATURE_CATALOG {
            assert!(
                html.contains(&format!(r#"name="{}""#, feature.code)),
                "missing input for {}",
                feature.code
            );
        }
        assert!(html.contains(r#"name="NH4" step="any" value="0.50""#));
        assert!(html.contains(r#"name="BSK5" step="any" value="0.00""#));
    }

    #[test]
    fn test_inputs_accept_arbitrary_precision() {
        // A fixed step would make the browser refuse readings like 0.057.
        let model = ModelConfig::default();
        let mut ctx = context(&model, None);
        ctx.inputs.no2 = 0.057;
        ctx.inputs.po4 = 0.454;
        let html = render_page(&ctx);
        for feature in FEATURE_CATALOG {
            let tag = format!(r#"name="{}" step="any""#, feature.code);
            assert!(html.contains(&tag), "input {} should allow any precision", feature.code);
        }
        assert!(!html.contains(r#"step="0.1""#), "no input should constrain the step");
        assert!(html.contains(r#"name="NO2" step="any" value="0.06""#));
    }

    #[test]
    fn test_sidebar_shows_model_info_and_date() {
        let model = ModelConfig::default();
        let html = render_page(&context(&model, None));
        assert!(html.contains("Random Forest Classifier"));
        assert!(html.contains("91.2%"));
        assert!(html.contains("2024-06-01"));
    }

    #[test]
    fn test_no_result_section_before_prediction() {
        let model = ModelConfig::default();
        let html = render_page(&context(&model, None));
        assert!(!html.contains("Prediction Result"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_potable_result_renders_success_chart_and_download() {
        let model = ModelConfig::default();
        let html = render_page(&context(&model, Some(Potability::Potable)));
        assert!(html.contains("✅ Water is Safe to Drink"));
        assert!(!html.contains("Consider treatment"));
        assert!(html.contains("<svg"));
        assert!(html.contains(r#"href="/report?label=potable""#));
    }

    #[test]
    fn test_not_potable_result_adds_treatment_warning() {
        let model = ModelConfig::default();
        let html = render_page(&context(&model, Some(Potability::NotPotable)));
        assert!(html.contains("❌ Water is NOT Safe to Drink"));
        assert!(html.contains("⚠️ Consider treatment for pollutants."));
        assert!(html.contains(r#"href="/report?label=not_potable""#));
    }

    #[test]
    fn test_missing_dataset_degrades_to_warning() {
        let model = ModelConfig::default();
        let html = render_page(&context(&model, None));
        assert!(html.contains(DATASET_WARNING));
        assert!(!html.contains("Average Values in Dataset"));
    }

    #[test]
    fn test_model_metadata_is_escaped() {
        let model = ModelConfig {
            name: "<script>alert(1)</script>".to_string(),
            ..ModelConfig::default()
        };
        let html = render_page(&context(&model, None));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = render_error_page("bad <input>");
        assert!(html.contains("bad &lt;input&gt;"));
    }
}
