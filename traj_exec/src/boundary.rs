//! # Track boundaries
//!
//! The left and right limits of the track and its centerline, as read-only polylines in the
//! local frame. Boundaries are only used as a reference while editing, they are never modified.
//!
//! Boundaries can be loaded from a directory holding any of `left.csv`, `right.csv` and
//! `centerline.csv`, or from a single file with a `role` column naming the polyline each row
//! belongs to. If there is no centerline but both limits are present the centerline is made
//! from the midpoints of the limits.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::Vector2;
use std::fmt;
use std::path::{Path, PathBuf};

// Internal
use crate::coords::{self, CoordError, GeoOrigin};
use crate::nearest;
use crate::traj::{CsvTable, TableError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the column holding the role in a combined boundary file.
pub const ROLE_COLUMN: &str = "role";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The boundaries of a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundaries {
    pub left_m: Vec<Vector2<f64>>,
    pub right_m: Vec<Vector2<f64>>,
    pub centerline_m: Vec<Vector2<f64>>,

    /// Origin of the local frame, if the boundaries were projected from geographic positions.
    pub origin: Option<GeoOrigin>,
}

/// The boundary point nearest to a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryMatch {
    pub role: BoundaryRole,
    pub index: usize,

    /// Units: meters
    pub dist_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRole {
    Left,
    Right,
    Centerline,
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsError {
    #[error("No boundary files (left.csv, right.csv, centerline.csv) found in {0:?}")]
    NoBoundaries(PathBuf),

    #[error("Cannot read the boundary file {0:?}: {1}")]
    TableError(PathBuf, TableError),

    #[error("Cannot resolve the positions in boundary file {0:?}: {1}")]
    CoordError(PathBuf, CoordError),

    #[error("The boundary file {0:?} has no `role` column")]
    NoRoleColumn(PathBuf),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BoundaryRole {
    pub const ALL: [BoundaryRole; 3] = [
        BoundaryRole::Left,
        BoundaryRole::Right,
        BoundaryRole::Centerline,
    ];

    /// Name of the role, as used in file names and the `role` column.
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryRole::Left => "left",
            BoundaryRole::Right => "right",
            BoundaryRole::Centerline => "centerline",
        }
    }

    /// Parse a role name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.iter().find(|r| r.name() == name).copied()
    }
}

impl fmt::Display for BoundaryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Boundaries {
    /// Load the boundaries from the `<role>.csv` files in a directory.
    ///
    /// Each file is optional but at least one must exist. If the first file loaded is
    /// geographic its origin is used for the others so they all share one frame.
    pub fn load_dir<P: AsRef<Path>>(dir: P, coord_params: &coords::Params) -> Result<Self, BoundsError> {
        let dir = dir.as_ref();
        let mut params = coord_params.clone();
        let mut bounds = Self::default();
        let mut found = false;

        for role in BoundaryRole::ALL.iter() {
            let path = dir.join(format!("{}.csv", role.name()));
            if !path.exists() {
                debug!("No {} boundary at {:?}", role, path);
                continue;
            }
            found = true;

            let table =
                CsvTable::read(&path).map_err(|e| BoundsError::TableError(path.clone(), e))?;
            let normalised = coords::normalise(&table, &params)
                .map_err(|e| BoundsError::CoordError(path.clone(), e))?;

            if let Some(origin) = normalised.origin {
                if bounds.origin.is_none() {
                    bounds.origin = Some(origin);
                    params = params.with_origin(origin);
                }
            }

            *bounds.role_mut(*role) = normalised.positions_m;
        }

        if !found {
            return Err(BoundsError::NoBoundaries(dir.to_path_buf()));
        }

        bounds.synthesise_centerline();
        bounds.log_summary(dir);

        Ok(bounds)
    }

    /// Load the boundaries from a single file with a `role` column.
    ///
    /// Rows keep their file order within each role. Rows with an unknown role are skipped.
    pub fn load_csv<P: AsRef<Path>>(path: P, coord_params: &coords::Params) -> Result<Self, BoundsError> {
        let path = path.as_ref();

        let table =
            CsvTable::read(path).map_err(|e| BoundsError::TableError(path.to_path_buf(), e))?;

        let mut bounds = Self::from_table(&table, coord_params)
            .map_err(|e| e.with_path(path))?;

        bounds.synthesise_centerline();
        bounds.log_summary(path);

        Ok(bounds)
    }

    /// Build boundaries from a combined table, without synthesising the centerline.
    fn from_table(table: &CsvTable, coord_params: &coords::Params) -> Result<Self, BoundsError> {
        if table.column_index(ROLE_COLUMN).is_none() {
            return Err(BoundsError::NoRoleColumn(PathBuf::new()));
        }

        let normalised = coords::normalise(table, coord_params)
            .map_err(|e| BoundsError::CoordError(PathBuf::new(), e))?;

        let mut bounds = Self {
            origin: normalised.origin,
            ..Self::default()
        };
        let mut num_skipped = 0;

        for (row, position_m) in normalised.positions_m.into_iter().enumerate() {
            let name = table.cell(row, ROLE_COLUMN).unwrap_or("");

            match BoundaryRole::from_name(name) {
                Some(role) => bounds.role_mut(role).push(position_m),
                None => {
                    num_skipped += 1;
                    debug!("Skipping boundary row {} with role \"{}\"", row, name);
                }
            }
        }

        if num_skipped > 0 {
            warn!("Skipped {} boundary row(s) with an unknown role", num_skipped);
        }

        Ok(bounds)
    }

    /// Get the polyline of a role.
    pub fn role(&self, role: BoundaryRole) -> &[Vector2<f64>] {
        match role {
            BoundaryRole::Left => &self.left_m,
            BoundaryRole::Right => &self.right_m,
            BoundaryRole::Centerline => &self.centerline_m,
        }
    }

    fn role_mut(&mut self, role: BoundaryRole) -> &mut Vec<Vector2<f64>> {
        match role {
            BoundaryRole::Left => &mut self.left_m,
            BoundaryRole::Right => &mut self.right_m,
            BoundaryRole::Centerline => &mut self.centerline_m,
        }
    }

    pub fn is_empty(&self) -> bool {
        BoundaryRole::ALL.iter().all(|r| self.role(*r).is_empty())
    }

    /// Find the boundary point nearest to the position, over all roles.
    ///
    /// Equidistant points resolve to the first role in left, right, centerline order, then to
    /// the smallest index.
    pub fn nearest(&self, position_m: &Vector2<f64>) -> Option<BoundaryMatch> {
        let mut best: Option<BoundaryMatch> = None;

        for role in BoundaryRole::ALL.iter() {
            if let Some((index, dist_m)) =
                nearest::nearest_point_dist(self.role(*role), position_m, None)
            {
                if best.map(|b| dist_m < b.dist_m).unwrap_or(true) {
                    best = Some(BoundaryMatch {
                        role: *role,
                        index,
                        dist_m,
                    });
                }
            }
        }

        best
    }

    /// Build the centerline from the left and right limits if it's missing.
    ///
    /// Points are paired by index, the longer limit's extra points are ignored.
    fn synthesise_centerline(&mut self) {
        if !self.centerline_m.is_empty() || self.left_m.is_empty() || self.right_m.is_empty() {
            return;
        }

        if self.left_m.len() != self.right_m.len() {
            warn!(
                "Left and right boundaries have different lengths ({} and {}), the centerline \
                 is truncated to the shorter",
                self.left_m.len(),
                self.right_m.len()
            );
        }

        self.centerline_m = self
            .left_m
            .iter()
            .zip(self.right_m.iter())
            .map(|(l, r)| (l + r) * 0.5)
            .collect();

        debug!(
            "Synthesised a centerline of {} points",
            self.centerline_m.len()
        );
    }

    fn log_summary(&self, source: &Path) {
        info!(
            "Loaded boundaries from {:?}: {} left, {} right, {} centerline points",
            source,
            self.left_m.len(),
            self.right_m.len(),
            self.centerline_m.len()
        );
    }
}

impl BoundsError {
    /// Fill in the path of a file-less error.
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            BoundsError::CoordError(_, e) => BoundsError::CoordError(path, e),
            BoundsError::TableError(_, e) => BoundsError::TableError(path, e),
            BoundsError::NoRoleColumn(_) => BoundsError::NoRoleColumn(path),
            BoundsError::NoBoundaries(_) => BoundsError::NoBoundaries(path),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn params() -> coords::Params {
        coords::Params {
            earth_radius_m: 6_371_000.0,
            origin_lat_deg: None,
            origin_lon_deg: None,
        }
    }

    const COMBINED: &str = "\
lanelet_or_way_id,role,index,latitude,longitude,x,y,local_x,local_y
12,left,0,35.0,139.0,0,2,,
12,left,1,35.0,139.0,4,2,,
12,right,0,35.0,139.0,0,-2,,
12,right,1,35.0,139.0,4,-2,,
12,stop_line,0,35.0,139.0,9,9,,
";

    #[test]
    fn test_from_table() {
        let table = CsvTable::from_reader(COMBINED.as_bytes()).unwrap();
        let mut b = Boundaries::from_table(&table, &params()).unwrap();

        // Blank local columns fall back to x/y
        assert_eq!(b.left_m, vec![Vector2::new(0.0, 2.0), Vector2::new(4.0, 2.0)]);
        assert_eq!(b.right_m.len(), 2);
        assert!(b.centerline_m.is_empty());
        assert_eq!(b.origin, None);

        b.synthesise_centerline();
        assert_eq!(
            b.centerline_m,
            vec![Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0)]
        );
    }

    #[test]
    fn test_no_role() {
        let table = CsvTable::from_reader("x,y\n0,0\n".as_bytes()).unwrap();
        assert!(matches!(
            Boundaries::from_table(&table, &params()),
            Err(BoundsError::NoRoleColumn(_))
        ));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("left.csv"), "x,y\n0,1\n1,1\n2,1\n").unwrap();
        fs::write(dir.path().join("right.csv"), "x,y\n0,-1\n1,-1\n").unwrap();

        let b = Boundaries::load_dir(dir.path(), &params()).unwrap();
        assert_eq!(b.left_m.len(), 3);

        // Truncated to the shorter limit
        assert_eq!(
            b.centerline_m,
            vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)]
        );

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(
            Boundaries::load_dir(empty.path(), &params()),
            Err(BoundsError::NoBoundaries(_))
        ));
    }

    #[test]
    fn test_load_dir_shared_origin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("left.csv"), "latitude,longitude\n35.0,139.0\n").unwrap();
        fs::write(dir.path().join("right.csv"), "latitude,longitude\n35.001,139.0\n").unwrap();

        let b = Boundaries::load_dir(dir.path(), &params()).unwrap();

        // Right is projected about left's first point rather than its own
        assert_eq!(b.left_m[0], Vector2::new(0.0, 0.0));
        assert!(b.right_m[0].y > 111.0);
    }

    #[test]
    fn test_nearest() {
        let b = Boundaries {
            left_m: vec![Vector2::new(0.0, 2.0), Vector2::new(4.0, 2.0)],
            right_m: vec![Vector2::new(0.0, -2.0), Vector2::new(4.0, -2.0)],
            centerline_m: vec![],
            origin: None,
        };

        let m = b.nearest(&Vector2::new(3.5, -1.5)).unwrap();
        assert_eq!(m.role, BoundaryRole::Right);
        assert_eq!(m.index, 1);

        // Equidistant from left and right
        let m = b.nearest(&Vector2::new(0.0, 0.0)).unwrap();
        assert_eq!(m.role, BoundaryRole::Left);
        assert_eq!(m.dist_m, 2.0);

        assert!(Boundaries::default().nearest(&Vector2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_role_names() {
        assert_eq!(BoundaryRole::from_name(" Left "), Some(BoundaryRole::Left));
        assert_eq!(
            BoundaryRole::from_name("centerline"),
            Some(BoundaryRole::Centerline)
        );
        assert_eq!(BoundaryRole::from_name("stop_line"), None);
    }
}
