//! Curvature estimator parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the curvature estimator
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Side length below which a triangle of points is considered degenerate, in which case the
    /// curvature at its middle point is 0.
    ///
    /// Units: meters
    pub degenerate_eps_m: f64,

    /// If true the trajectory is a closed loop, the last point being followed by the first.
    pub closed_loop: bool,

    /// If true curvature is signed by the turn direction, positive for left (anticlockwise)
    /// turns.
    pub signed: bool,
}
