/// Downloadable plain-text report.
///
/// The report carries no measurements: its text is one of two fixed
/// templates chosen solely by the predicted label.

use chrono::NaiveDate;

use crate::model::Potability;

pub const POTABLE_REPORT: &str = "✅ Water is safe to drink.\n\nKeep monitoring regularly!";
pub const NOT_POTABLE_REPORT: &str =
    "❌ Water is NOT safe.\n\nTake appropriate water treatment measures.";

pub const REPORT_MIME: &str = "text/plain; charset=utf-8";

pub fn report_text(label: Potability) -> &'static str {
    match label {
        Potability::Potable => POTABLE_REPORT,
        Potability::NotPotable => NOT_POTABLE_REPORT,
    }
}

/// `water_quality_report_2026-10-19.txt`
pub fn report_filename(date: NaiveDate) -> String {
    format!("water_quality_report_{}.txt", date.format("%Y-%m-%d"))
}

/// Today's date in the server's local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
