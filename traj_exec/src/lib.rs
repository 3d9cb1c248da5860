//! # Trajectory library.
//!
//! This library provides the trajectory tools' core: loading and saving trajectories and track
//! boundaries, the curvature driven speed profile correction, and the editing session with its
//! undo/redo history.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory module - the points and speeds to drive, and their CSV representation
pub mod traj;

/// Coordinate normaliser - brings position columns of any supported kind into the local frame
pub mod coords;

/// Track boundaries - read only left/right/centerline polylines
pub mod boundary;

/// Curvature estimator - per point curvature of a sequence of positions
pub mod curv;

/// Speed profile corrector - slows the trajectory down into curves and back up out of them
pub mod speed_prof;

/// Nearest point queries on trajectories and polylines
pub mod nearest;

/// Editing - reversible edit commands, the command stack and the editing session
pub mod edit;
