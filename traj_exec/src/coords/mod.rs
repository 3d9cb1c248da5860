//! # Coordinate normaliser
//!
//! Trajectory and boundary files carry their positions in one of several column sets. The
//! normaliser picks the first usable set, in priority order:
//!
//! 1. `local_x`/`local_y` - projected local map coordinates, used directly,
//! 2. `x`/`y` - planar coordinates, used directly,
//! 3. `latitude`/`longitude` - projected into the local frame with an equirectangular
//!    approximation about a fixed reference origin.
//!
//! A column set is usable when both of its columns exist and every record has a value in them.
//! All tools load positions through this module so that data from different sources lands in
//! the same frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;

// Internal
use crate::traj::{CsvTable, MalformedRowError};
pub use params::Params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const LOCAL_X_COLUMN: &str = "local_x";
pub const LOCAL_Y_COLUMN: &str = "local_y";

/// Column sets in order of priority, with the source they correspond to.
const COLUMN_SETS: [(CoordSource, &str, &str); 3] = [
    (CoordSource::Local, LOCAL_X_COLUMN, LOCAL_Y_COLUMN),
    (CoordSource::Planar, "x", "y"),
    (CoordSource::Geographic, "longitude", "latitude"),
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reference origin of the local frame for geographic positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoOrigin {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// Positions of a record set in the local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalised {
    /// Which column set the positions came from.
    pub source: CoordSource,

    /// The origin used for the projection, if the positions were geographic.
    pub origin: Option<GeoOrigin>,

    /// One position per record, in record order.
    ///
    /// Units: meters
    pub positions_m: Vec<Vector2<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The column set positions were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSource {
    Local,
    Planar,
    Geographic,
}

/// Errors which can occur while normalising coordinates.
#[derive(Debug, thiserror::Error)]
pub enum CoordError {
    #[error(
        "No usable coordinate columns (need local_x/local_y, x/y or latitude/longitude), \
         found {0:?}"
    )]
    MissingCoordinates(Vec<String>),

    #[error(transparent)]
    MalformedRow(#[from] MalformedRowError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve the positions of every record in the table into the local frame.
///
/// An empty table with usable headers resolves to an empty set of positions.
pub fn normalise(table: &CsvTable, params: &Params) -> Result<Normalised, CoordError> {
    let (source, x_col, y_col) = select_columns(table)
        .ok_or_else(|| CoordError::MissingCoordinates(table.headers().to_vec()))?;

    debug!("Resolving positions from the {}/{} columns", x_col, y_col);

    let xs = table.float_column(x_col)?;
    let ys = table.float_column(y_col)?;

    match source {
        CoordSource::Local | CoordSource::Planar => Ok(Normalised {
            source,
            origin: None,
            positions_m: xs
                .into_iter()
                .zip(ys.into_iter())
                .map(|(x, y)| Vector2::new(x, y))
                .collect(),
        }),
        CoordSource::Geographic => {
            // Geographic columns are stored as (longitude, latitude) in COLUMN_SETS so xs is
            // the longitude.
            let origin = params.origin().or_else(|| {
                xs.first().zip(ys.first()).map(|(lon, lat)| GeoOrigin {
                    lat_deg: *lat,
                    lon_deg: *lon,
                })
            });

            let positions_m = match origin {
                Some(o) => xs
                    .into_iter()
                    .zip(ys.into_iter())
                    .map(|(lon, lat)| project(lat, lon, &o, params.earth_radius_m))
                    .collect(),
                None => Vec::new(),
            };

            Ok(Normalised {
                source,
                origin,
                positions_m,
            })
        }
    }
}

/// Project a geographic position into the local frame about the given origin.
///
/// Uses the equirectangular approximation, with longitude differences scaled by the cosine of
/// the origin's latitude.
pub fn project(lat_deg: f64, lon_deg: f64, origin: &GeoOrigin, earth_radius_m: f64) -> Vector2<f64> {
    let d_lat_rad = (lat_deg - origin.lat_deg).to_radians();
    let d_lon_rad = (lon_deg - origin.lon_deg).to_radians();

    Vector2::new(
        earth_radius_m * origin.lat_deg.to_radians().cos() * d_lon_rad,
        earth_radius_m * d_lat_rad,
    )
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the highest priority usable column set.
fn select_columns(table: &CsvTable) -> Option<(CoordSource, &'static str, &'static str)> {
    COLUMN_SETS
        .iter()
        .find(|(_, x, y)| usable(table, x) && usable(table, y))
        .copied()
}

fn usable(table: &CsvTable, column: &str) -> bool {
    // An empty table has no values to check, the headers are enough.
    if table.is_empty() {
        table.column_index(column).is_some()
    } else {
        table.has_values(column)
    }
}
