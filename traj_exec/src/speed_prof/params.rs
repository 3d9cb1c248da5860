//! Speed profile corrector parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::CorrectError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the speed profile corrector
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Points whose curvature magnitude is strictly above this value are in a curve.
    ///
    /// Units: 1/meters
    pub curvature_threshold: f64,

    /// Number of points after a curve's exit over which the vehicle accelerates back up.
    pub lookahead_points: usize,

    /// Number of points before a curve's entry over which the vehicle slows down.
    pub lookback_points: usize,

    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum speed decrease from one point to the next.
    ///
    /// Units: meters/second
    pub max_decel_ms: f64,

    /// Maximum speed increase from one point to the next.
    ///
    /// Units: meters/second
    pub max_accel_ms: f64,

    /// Gain mapping curvature onto the target speed in a curve, `v = gain / |k|`.
    ///
    /// Units: meters^2/second
    pub curve_speed_gain: f64,
}

impl Params {
    /// Check the parameters are usable by the corrector.
    pub fn validate(&self) -> Result<(), CorrectError> {
        let invalid = |reason: &str| Err(CorrectError::InvalidParams(reason.to_string()));

        let all_finite = [
            self.curvature_threshold,
            self.min_speed_ms,
            self.max_speed_ms,
            self.max_decel_ms,
            self.max_accel_ms,
            self.curve_speed_gain,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !all_finite {
            return invalid("all values must be finite");
        }
        if self.curvature_threshold < 0.0 {
            return invalid("curvature_threshold must not be negative");
        }
        if self.min_speed_ms < 0.0 || self.min_speed_ms > self.max_speed_ms {
            return invalid("expected 0 <= min_speed_ms <= max_speed_ms");
        }
        if self.max_decel_ms <= 0.0 || self.max_accel_ms <= 0.0 {
            return invalid("max_decel_ms and max_accel_ms must be positive");
        }
        if self.curve_speed_gain < 0.0 {
            return invalid("curve_speed_gain must not be negative");
        }

        Ok(())
    }
}
