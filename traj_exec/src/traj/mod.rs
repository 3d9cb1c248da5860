//! # Trajectory module
//!
//! A trajectory is the ordered sequence of points the vehicle drives through, each carrying a
//! target speed. Point order is the order of traversal.
//!
//! Trajectories are loaded from CSV files with at least a position (see [`crate::coords`]) and
//! a `speed` column, in meters/second. Every other column is passed through untouched, so a
//! file saved after editing differs from the one loaded only in the position and `speed` cells
//! of edited points and in the rows which were inserted or deleted.
//!
//! The points of a trajectory can only be changed in two ways: by replacing the whole speed
//! profile ([`Trajectory::with_speeds`], used by batch correction), or through the edit
//! commands of an editing session.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod table;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Vector2;
use std::path::Path;

// Internal
use crate::coords::{self, CoordError, CoordSource, GeoOrigin};
pub use table::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the x position column written on save.
pub const X_COLUMN: &str = "x";

/// Name of the y position column written on save.
pub const Y_COLUMN: &str = "y";

/// Name of the speed column.
pub const SPEED_COLUMN: &str = "speed";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajPoint {
    /// Position of the point in the local frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Target speed at this point.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// The row of the loaded file this point came from, or `None` for inserted points.
    pub source_row: Option<usize>,
}

/// An ordered sequence of trajectory points, along with the table it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<TrajPoint>,

    /// The loaded table, holding the pass-through columns.
    table: CsvTable,

    /// The column set the positions were read from.
    coord_source: CoordSource,

    /// Positions as loaded, indexed by source row.
    ///
    /// Units: meters
    loaded_m: Vec<Vector2<f64>>,

    /// The geographic origin, if positions were projected from latitude/longitude.
    origin: Option<GeoOrigin>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when loading, replacing or saving trajectories.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("Cannot access the trajectory file: {0}")]
    TableError(#[from] TableError),

    #[error("Cannot resolve the trajectory positions: {0}")]
    CoordError(#[from] CoordError),

    #[error(transparent)]
    MalformedRow(#[from] MalformedRowError),

    #[error("Expected {expected} speeds but got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Speed {speed_ms} at index {index} is not a valid speed")]
    InvalidSpeed { index: usize, speed_ms: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajPoint {
    /// Create a new point which doesn't come from a file.
    pub fn new(x_m: f64, y_m: f64, speed_ms: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            speed_ms,
            source_row: None,
        }
    }
}

impl Trajectory {
    /// Load a trajectory from a CSV file.
    ///
    /// Either the whole trajectory loads or an error is returned, a row with a missing or
    /// unusable position or speed fails the load.
    pub fn load<P: AsRef<Path>>(path: P, coord_params: &coords::Params) -> Result<Self, TrajError> {
        let table = CsvTable::read(path.as_ref())?;

        let traj = Self::from_table(table, coord_params)?;

        debug!(
            "Loaded {} trajectory points from {:?} ({:?} positions)",
            traj.len(),
            path.as_ref(),
            traj.coord_source
        );

        Ok(traj)
    }

    /// Build a trajectory from a loaded table.
    pub fn from_table(table: CsvTable, coord_params: &coords::Params) -> Result<Self, TrajError> {
        let normalised = coords::normalise(&table, coord_params)?;

        // Speed is required, if the column is missing it's reported against the first row
        if table.column_index(SPEED_COLUMN).is_none() {
            return Err(TrajError::MalformedRow(MalformedRowError {
                row: 0,
                column: SPEED_COLUMN.to_string(),
                reason: String::from("is missing"),
            }));
        }

        let mut points = Vec::with_capacity(table.num_rows());
        for (row, position_m) in normalised.positions_m.iter().copied().enumerate() {
            let speed_ms = table.float(row, SPEED_COLUMN)?;

            if speed_ms < 0.0 {
                return Err(TrajError::MalformedRow(MalformedRowError {
                    row,
                    column: SPEED_COLUMN.to_string(),
                    reason: format!("has a negative speed ({})", speed_ms),
                }));
            }

            points.push(TrajPoint {
                position_m,
                speed_ms,
                source_row: Some(row),
            });
        }

        let traj = Self {
            points,
            table,
            coord_source: normalised.source,
            loaded_m: normalised.positions_m,
            origin: normalised.origin,
        };

        let num_coincident = traj.num_coincident_pairs();
        if num_coincident > 0 {
            warn!(
                "Trajectory contains {} pair(s) of coincident consecutive points",
                num_coincident
            );
        }

        Ok(traj)
    }

    /// Build a trajectory from points which don't come from a file.
    pub fn from_points(points: Vec<TrajPoint>) -> Self {
        Self {
            points,
            table: CsvTable::new(vec![
                X_COLUMN.to_string(),
                Y_COLUMN.to_string(),
                SPEED_COLUMN.to_string(),
            ]),
            coord_source: CoordSource::Planar,
            loaded_m: Vec::new(),
            origin: None,
        }
    }

    /// Replace the whole speed profile, keeping positions and order.
    pub fn with_speeds(mut self, speeds_ms: Vec<f64>) -> Result<Self, TrajError> {
        if speeds_ms.len() != self.points.len() {
            return Err(TrajError::LengthMismatch {
                expected: self.points.len(),
                found: speeds_ms.len(),
            });
        }

        for (index, (point, speed_ms)) in self.points.iter_mut().zip(speeds_ms).enumerate() {
            if !speed_ms.is_finite() || speed_ms < 0.0 {
                return Err(TrajError::InvalidSpeed { index, speed_ms });
            }
            point.speed_ms = speed_ms;
        }

        Ok(self)
    }

    pub fn points(&self) -> &[TrajPoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&TrajPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions of all points, in order.
    pub fn positions_m(&self) -> Vec<Vector2<f64>> {
        self.points.iter().map(|p| p.position_m).collect()
    }

    /// Speeds of all points, in order.
    pub fn speeds_ms(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.speed_ms).collect()
    }

    /// The column set the positions were read from.
    pub fn coord_source(&self) -> CoordSource {
        self.coord_source
    }

    /// The geographic origin of the positions, if they were projected.
    pub fn origin(&self) -> Option<GeoOrigin> {
        self.origin
    }

    /// Number of consecutive point pairs which sit exactly on top of each other.
    pub fn num_coincident_pairs(&self) -> usize {
        self.points
            .windows(2)
            .filter(|w| w[0].position_m == w[1].position_m)
            .count()
    }

    /// Mutable access to the points, only for the edit commands.
    pub(crate) fn points_mut(&mut self) -> &mut Vec<TrajPoint> {
        &mut self.points
    }

    /// Build the table to save, in point order.
    ///
    /// Points from the loaded file keep every cell of their source row. `x` and `y` are only
    /// rewritten for points which moved (or filled in when the file had no value for them), and
    /// `speed` only when its value changed. Moved points read from `local_x`/`local_y` get those
    /// cells rewritten too so the saved file loads back to the edited position. Inserted points
    /// get empty pass-through cells.
    pub fn to_table(&self) -> CsvTable {
        let mut base = self.table.clone();
        let x_col = base.ensure_column(X_COLUMN);
        let y_col = base.ensure_column(Y_COLUMN);
        let speed_col = base.ensure_column(SPEED_COLUMN);

        let local_cols = match self.coord_source {
            CoordSource::Local => base
                .column_index(coords::LOCAL_X_COLUMN)
                .zip(base.column_index(coords::LOCAL_Y_COLUMN)),
            _ => None,
        };

        let mut out = CsvTable::new(base.headers().to_vec());

        for point in self.points.iter() {
            let source = point.source_row.and_then(|r| base.row(r));

            let mut row: Vec<String> = match source {
                Some(r) => r.to_vec(),
                None => vec![String::new(); base.headers().len()],
            };

            let moved = match point.source_row {
                Some(r) => self.loaded_m.get(r) != Some(&point.position_m),
                None => true,
            };

            if moved {
                set_cell(&mut row, x_col, point.position_m.x);
                set_cell(&mut row, y_col, point.position_m.y);

                if let Some((lx_col, ly_col)) = local_cols {
                    set_cell(&mut row, lx_col, point.position_m.x);
                    set_cell(&mut row, ly_col, point.position_m.y);
                }
            } else {
                fill_cell(&mut row, x_col, point.position_m.x);
                fill_cell(&mut row, y_col, point.position_m.y);
            }

            set_cell(&mut row, speed_col, point.speed_ms);

            out.push_row(row);
        }

        out
    }

    /// Save the trajectory to a CSV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajError> {
        self.to_table().write(path.as_ref())?;

        debug!(
            "Saved {} trajectory points to {:?}",
            self.len(),
            path.as_ref()
        );

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Write a value into a cell, keeping the existing text if it already holds that value.
fn set_cell(row: &mut [String], col: usize, value: f64) {
    let unchanged = row[col]
        .trim()
        .parse::<f64>()
        .map(|v| v == value)
        .unwrap_or(false);

    if !unchanged {
        row[col] = format!("{}", value);
    }
}

/// Write a value into a cell only if the cell is empty.
fn fill_cell(row: &mut [String], col: usize, value: f64) {
    if row[col].trim().is_empty() {
        row[col] = format!("{}", value);
    }
}
