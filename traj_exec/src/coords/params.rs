//! Coordinate normaliser parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::GeoOrigin;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the coordinate normaliser
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Radius of the earth used by the equirectangular projection.
    ///
    /// Units: meters
    pub earth_radius_m: f64,

    /// Latitude of the local frame's origin. If either part of the origin is missing the first
    /// record of each file is used as the origin.
    ///
    /// Units: degrees
    #[serde(default)]
    pub origin_lat_deg: Option<f64>,

    /// Longitude of the local frame's origin.
    ///
    /// Units: degrees
    #[serde(default)]
    pub origin_lon_deg: Option<f64>,
}

impl Params {
    /// The configured origin, if both latitude and longitude are set.
    pub fn origin(&self) -> Option<GeoOrigin> {
        match (self.origin_lat_deg, self.origin_lon_deg) {
            (Some(lat_deg), Some(lon_deg)) => Some(GeoOrigin { lat_deg, lon_deg }),
            _ => None,
        }
    }

    /// Copy of these parameters with the origin fixed, so that several files can share the
    /// frame of the first one loaded.
    pub fn with_origin(&self, origin: GeoOrigin) -> Self {
        Self {
            earth_radius_m: self.earth_radius_m,
            origin_lat_deg: Some(origin.lat_deg),
            origin_lon_deg: Some(origin.lon_deg),
        }
    }
}
