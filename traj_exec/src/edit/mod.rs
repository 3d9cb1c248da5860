//! # Editing
//!
//! Everything an operator can do to a trajectory goes through an [`EditCmd`], applied through a
//! [`CmdStack`] which records it for undo and redo. A [`TrajSession`] turns editor events into
//! commands.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod session;
mod stack;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use cmd::EditCmd;
pub use params::Params;
pub use session::{EventOutcome, SessionError, TrajSession};
pub use stack::CmdStack;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons an edit command can't be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Point index {index} is out of range for a trajectory of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("The edit at index {0} would leave two consecutive points on top of each other")]
    CoincidentPoints(usize),

    #[error("Speed {speed_ms} m/s at index {index} is not a valid speed")]
    InvalidSpeed { index: usize, speed_ms: f64 },

    #[error("Position ({x_m}, {y_m}) for index {index} is not finite")]
    NonFinitePosition { index: usize, x_m: f64, y_m: f64 },

    #[error("The edit at index {0} doesn't match the current state of the trajectory")]
    StaleCommand(usize),
}
