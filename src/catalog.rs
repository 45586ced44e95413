/// Feature catalog for the water potability predictor.
///
/// Defines the canonical list of raw water-chemistry measurements collected
/// by the form, along with their display metadata. This is the single source
/// of truth for feature codes: the form, the radar chart, the "About the
/// Features" panel and the dataset averages all read from here rather than
/// hardcoding codes.

// ---------------------------------------------------------------------------
// Feature metadata
// ---------------------------------------------------------------------------

/// Metadata for a single raw measurement.
pub struct Feature {
    /// Short code, also the form field name and the CSV column header.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Measurement unit.
    pub unit: &'static str,
    /// What the measurement indicates about the water sample.
    pub description: &'static str,
}

/// All raw measurements, in the order the model was fitted on.
pub static FEATURE_CATALOG: &[Feature] = &[
    Feature {
        code: "NH4",
        name: "Ammonium",
        unit: "mg/L",
        description: "Indicator of recent sewage or agricultural runoff.",
    },
    Feature {
        code: "BSK5",
        name: "Biochemical Oxygen Demand",
        unit: "mg/L",
        description: "Oxygen consumed by microbes over five days; \
                      high values mean heavy organic load.",
    },
    Feature {
        code: "Suspended",
        name: "Suspended Solids",
        unit: "mg/L",
        description: "Particles held in the water column.",
    },
    Feature {
        code: "O2",
        name: "Dissolved Oxygen",
        unit: "mg/L",
        description: "Oxygen available to aquatic life.",
    },
    Feature {
        code: "NO3",
        name: "Nitrate",
        unit: "mg/L",
        description: "Fully oxidised nitrogen, typically from fertiliser.",
    },
    Feature {
        code: "NO2",
        name: "Nitrite",
        unit: "mg/L",
        description: "Intermediate nitrogen form; toxic at low concentrations.",
    },
    Feature {
        code: "SO4",
        name: "Sulfate",
        unit: "mg/L",
        description: "Dissolved sulfate from minerals or industrial discharge.",
    },
    Feature {
        code: "PO4",
        name: "Phosphate",
        unit: "mg/L",
        description: "Nutrient driving algal growth.",
    },
    Feature {
        code: "CL",
        name: "Chloride",
        unit: "mg/L",
        description: "Salinity marker; road salt and wastewater raise it.",
    },
];

/// `"NH4: Ammonium (mg/L)"`, as listed in the info panel.
pub fn summary_line(feature: &Feature) -> String {
    format!("{}: {} ({})", feature.code, feature.name, feature.unit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
