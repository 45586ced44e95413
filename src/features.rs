/// Derived features and fixed-order feature vector assembly.
///
/// The 12-feature model was fitted on three extra columns computed from the
/// raw measurements. Division by zero yields 0 rather than NaN or an error;
/// the scaler statistics were fit on that convention, so it must not change.

use crate::model::{FeatureSet, FeatureVector, RawMeasurements};

/// The three ratios/sums appended in the derived feature set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    /// NO3 / NO2, or 0 when NO2 is zero.
    pub no3_no2: f64,
    /// NH4 + NO2.
    pub nh4_no2: f64,
    /// O2 / Suspended, or 0 when Suspended is zero.
    pub o2_per_suspended: f64,
}

impl DerivedFeatures {
    pub fn from_raw(raw: &RawMeasurements) -> Self {
        Self {
            no3_no2: guarded_ratio(raw.no3, raw.no2),
            nh4_no2: raw.nh4 + raw.no2,
            o2_per_suspended: guarded_ratio(raw.o2, raw.suspended),
        }
    }

    /// Values in `DERIVED_FEATURES` order.
    pub fn to_array(&self) -> [f64; 3] {
        [self.no3_no2, self.nh4_no2, self.o2_per_suspended]
    }
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
///
/// `-0.0 == 0.0`, so a negative zero is guarded too.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl FeatureVector {
    /// Builds the vector the scaler expects for the given feature set.
    pub fn assemble(raw: &RawMeasurements, feature_set: FeatureSet) -> Self {
        let mut values: Vec<f64> = raw.to_array().to_vec();
        if feature_set == FeatureSet::Derived {
            values.extend(DerivedFeatures::from_raw(raw).to_array());
        }

        FeatureVector {
            feature_set,
            names: feature_set.names(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawMeasurements {
        RawMeasurements {
            nh4: 0.5,
            bsk5: 2.0,
            suspended: 10.0,
            o2: 8.0,
            no3: 5.0,
            no2: 0.0,
            so4: 20.0,
            po4: 0.3,
            cl: 15.0,
        }
    }

    // --- Guarded division ---------------------------------------------------

    #[test]
    fn test_no3_no2_is_zero_when_nitrite_is_zero() {
        for no3 in [0.0, 5.0, -3.0, 1e9] {
            let raw = RawMeasurements { no3, no2: 0.0, ..sample() };
            assert_eq!(
                DerivedFeatures::from_raw(&raw).no3_no2,
                0.0,
                "NO3_NO2 must be 0 when NO2 is 0 (NO3 = {})",
                no3
            );
        }
    }

    #[test]
    fn test_o2_per_suspended_is_zero_when_suspended_is_zero() {
        for o2 in [0.0, 8.0, 12.5] {
            let raw = RawMeasurements { o2, suspended: 0.0, ..sample() };
            assert_eq!(DerivedFeatures::from_raw(&raw).o2_per_suspended, 0.0);
        }
    }

    #[test]
    fn test_negative_zero_denominator_is_guarded() {
        assert_eq!(guarded_ratio(4.0, -0.0), 0.0);
    }

    #[test]
    fn test_ratio_with_nonzero_denominator() {
        assert_eq!(guarded_ratio(5.0, 2.0), 2.5);
        let raw = RawMeasurements { no2: 0.25, ..sample() };
        assert_eq!(DerivedFeatures::from_raw(&raw).no3_no2, 20.0);
    }

    #[test]
    fn test_nh4_no2_is_exact_sum() {
        let raw = RawMeasurements { nh4: 0.1, no2: 0.2, ..sample() };
        // No rounding: must equal the IEEE sum exactly, 0.30000000000000004.
        assert_eq!(DerivedFeatures::from_raw(&raw).nh4_no2, 0.1 + 0.2);
    }

    // --- Vector assembly ----------------------------------------------------

    #[test]
    fn test_derived_vector_matches_reference_example() {
        let vector = FeatureVector::assemble(&sample(), FeatureSet::Derived);
        assert_eq!(
            vector.values,
            vec![0.5, 2.0, 10.0, 8.0, 5.0, 0.0, 20.0, 0.3, 15.0, 0.0, 0.5, 0.8]
        );
        assert_eq!(vector.names.len(), vector.values.len());
        assert_eq!(vector.names[11], "O2_per_Suspended");
    }

    #[test]
    fn test_raw_vector_has_nine_values_in_order() {
        let vector = FeatureVector::assemble(&sample(), FeatureSet::Raw);
        assert_eq!(vector.values.len(), 9);
        assert_eq!(vector.values, sample().to_array().to_vec());
        assert!(!vector.names.contains(&"NO3_NO2"));
    }
}
