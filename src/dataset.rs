/// Historical dataset averages.
///
/// Backs the "Compare with Average from Dataset" panel. The CSV is read on
/// every request rather than cached, so replacing the file takes effect
/// without a restart. The panel is optional: every failure here is returned
/// as a `DatasetError` and the page degrades to a warning.

use serde::Serialize;
use std::path::Path;

use crate::catalog::FEATURE_CATALOG;
use crate::logging;

/// Mean of one feature column, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureAverage {
    pub feature: &'static str,
    pub average: f64,
}

/// Per-feature averages in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureAverages {
    pub averages: Vec<FeatureAverage>,
    /// Data rows read from the file.
    pub rows: usize,
}

impl FeatureAverages {
    /// `{"NH4": 0.76, "BSK5": 4.32, ...}` in catalog order.
    pub fn to_json_object(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .averages
            .iter()
            .map(|a| (a.feature.to_string(), serde_json::json!(a.average)))
            .collect();
        serde_json::Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum DatasetError {
    /// The CSV file does not exist.
    NotFound(String),
    /// The file exists but could not be read or parsed as CSV.
    Unreadable { path: String, reason: String },
    /// A required feature column is absent from the header.
    MissingColumn { path: String, column: String },
    /// The file has a header but no data rows.
    NoRows(String),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::NotFound(path) => write!(f, "Dataset file not found: {}", path),
            DatasetError::Unreadable { path, reason } => {
                write!(f, "Dataset file {} could not be read: {}", path, reason)
            }
            DatasetError::MissingColumn { path, column } => {
                write!(f, "Dataset file {} has no '{}' column", path, column)
            }
            DatasetError::NoRows(path) => write!(f, "Dataset file {} has no data rows", path),
        }
    }
}

impl std::error::Error for DatasetError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Picks `;` when the header line uses it, otherwise `,`.
pub fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') { b';' } else { b',' }
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the rounded mean of every catalog feature column.
///
/// Empty and non-numeric cells are skipped per column, so one bad cell does
/// not discard the rest of its row. A column with no usable cells at all
/// averages to NaN and is reported as such.
pub fn load_averages(path: &Path) -> Result<FeatureAverages, DatasetError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(DatasetError::NotFound(display));
    }

    let text = std::fs::read_to_string(path).map_err(|e| DatasetError::Unreadable {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    let header_line = text.lines().next().unwrap_or_default();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::Unreadable {
            path: display.clone(),
            reason: format!("Failed to read headers: {}", e),
        })?
        .clone();

    let mut columns = Vec::with_capacity(FEATURE_CATALOG.len());
    for feature in FEATURE_CATALOG {
        let index = headers
            .iter()
            .position(|h| h == feature.code)
            .ok_or_else(|| DatasetError::MissingColumn {
                path: display.clone(),
                column: feature.code.to_string(),
            })?;
        columns.push(index);
    }

    let mut sums = vec![0.0; columns.len()];
    let mut counts = vec![0usize; columns.len()];
    let mut rows = 0usize;
    let mut skipped_cells = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| DatasetError::Unreadable {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        rows += 1;

        for (i, &column) in columns.iter().enumerate() {
            match record.get(column).and_then(|cell| cell.parse::<f64>().ok()) {
                Some(value) if value.is_finite() => {
                    sums[i] += value;
                    counts[i] += 1;
                }
                _ => skipped_cells += 1,
            }
        }
    }

    if rows == 0 {
        return Err(DatasetError::NoRows(display));
    }

    let used_rows = counts.iter().copied().min().unwrap_or(0);
    logging::log_dataset_summary(&display, rows, used_rows, skipped_cells);

    let averages = FEATURE_CATALOG
        .iter()
        .zip(sums.iter().zip(counts.iter()))
        .map(|(feature, (sum, count))| FeatureAverage {
            feature: feature.code,
            average: if *count == 0 {
                f64::NAN
            } else {
                round2(sum / *count as f64)
            },
        })
        .collect();

    Ok(FeatureAverages { averages, rows })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
