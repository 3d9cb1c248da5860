//! Editor parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the editing session
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Maximum distance from a click to the point it selects.
    ///
    /// Units: meters
    pub pick_radius_m: f64,

    /// Lowest speed an edit can set.
    ///
    /// Units: kilometers/hour
    pub min_speed_kph: f64,

    /// Highest speed an edit can set.
    ///
    /// Units: kilometers/hour
    pub max_speed_kph: f64,

    /// Speed change of the console's `[` and `]` shortcuts.
    ///
    /// Units: kilometers/hour
    pub speed_step_kph: f64,

    /// Speed change of the console's `{` and `}` shortcuts.
    ///
    /// Units: kilometers/hour
    pub speed_big_step_kph: f64,

    /// Where a save without a path writes to, relative to the working directory.
    pub default_save_path: PathBuf,
}
