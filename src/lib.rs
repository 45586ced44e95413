//! Water potability predictor.
//!
//! Collects nine water-chemistry measurements, optionally extends them with
//! three derived ratios, scales them with a pre-fitted scaler and classifies
//! them with a pre-trained model. Results are served as a single HTML page
//! with a radar chart, a downloadable report and historical averages.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod features;
pub mod inference;
pub mod logging;
pub mod model;
pub mod page;
pub mod report;
pub mod server;
