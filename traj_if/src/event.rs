//! # Editor events
//!
//! This module provides the closed set of input events accepted by the trajectory editor. Any
//! front end (an edit script, the console, a future GUI) produces these events, the editor
//! session consumes them one at a time.
//!
//! Events can be parsed from JSON, which is the format used in edit scripts, for example:
//!
//! ```json
//! {"type": "SELECT", "payload": {"x_m": 12.5, "y_m": -3.0}}
//! {"type": "ADJUST_SPEED", "payload": {"delta_kph": 5.0}}
//! {"type": "UNDO"}
//! ```
//!
//! or from a console line such as `select 12.5 -3.0` or `speed -5`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use structopt::{clap::AppSettings, StructOpt};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An input event for the trajectory editor.
///
/// Positions are given in the local metric frame of the loaded trajectory. Speed deltas are
/// given in kilometers/hour since that is the unit shown to the operator, the editor converts
/// them to meters/second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[structopt(name = "traj_edit", setting = AppSettings::NoBinaryName)]
pub enum EditEvent {
    /// Select the trajectory point nearest to the given position.
    #[structopt(name = "select", setting = AppSettings::AllowNegativeNumbers)]
    Select {
        /// X coordinate of the position.
        ///
        /// Units: meters
        x_m: f64,

        /// Y coordinate of the position.
        ///
        /// Units: meters
        y_m: f64,
    },

    /// Move the selected point to the given position.
    #[structopt(name = "drag", setting = AppSettings::AllowNegativeNumbers)]
    Drag {
        /// X coordinate of the new position.
        ///
        /// Units: meters
        x_m: f64,

        /// Y coordinate of the new position.
        ///
        /// Units: meters
        y_m: f64,
    },

    /// Insert a new point at the given position.
    #[structopt(name = "insert", setting = AppSettings::AllowNegativeNumbers)]
    InsertAt {
        /// X coordinate of the new point.
        ///
        /// Units: meters
        x_m: f64,

        /// Y coordinate of the new point.
        ///
        /// Units: meters
        y_m: f64,
    },

    /// Delete the selected point.
    #[structopt(name = "delete")]
    DeleteSelected,

    /// Change the speed of the selected point by the given amount.
    #[structopt(name = "speed", setting = AppSettings::AllowNegativeNumbers)]
    AdjustSpeed {
        /// The change in speed.
        ///
        /// Units: kilometers/hour
        delta_kph: f64,
    },

    /// Undo the last edit.
    #[structopt(name = "undo")]
    Undo,

    /// Redo the last undone edit.
    #[structopt(name = "redo")]
    Redo,

    /// Save the trajectory, to the default output path if none is given.
    #[structopt(name = "save")]
    Save {
        #[structopt(parse(from_os_str))]
        #[serde(default)]
        path: Option<PathBuf>,
    },

    /// Exit the editor.
    #[structopt(name = "quit")]
    Quit,
}

/// Possible event parsing errors.
#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Invalid console command: {0}")]
    InvalidCommand(String),

    #[error("The event is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EditEvent {
    /// Parse an event from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, EventParseError> {
        if json_str.trim().is_empty() {
            return Err(EventParseError::Empty);
        }

        serde_json::from_str(json_str).map_err(EventParseError::InvalidJson)
    }

    /// Parse an event from a line typed into the console.
    ///
    /// Lines starting with `{` are treated as JSON events, anything else is parsed as a command,
    /// e.g. `insert 1.0 2.5` or `save out.csv`.
    pub fn from_console(line: &str) -> Result<Self, EventParseError> {
        let line = line.trim();

        if line.is_empty() {
            return Err(EventParseError::Empty);
        }

        if line.starts_with('{') {
            return Self::from_json(line);
        }

        Self::from_iter_safe(line.split_whitespace())
            .map_err(|e| EventParseError::InvalidCommand(e.message))
    }

    /// Returns true if the event can change the trajectory.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            EditEvent::Drag { .. }
                | EditEvent::InsertAt { .. }
                | EditEvent::DeleteSelected
                | EditEvent::AdjustSpeed { .. }
                | EditEvent::Undo
                | EditEvent::Redo
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        assert_eq!(
            EditEvent::from_json(r#"{"type": "SELECT", "payload": {"x_m": 1.5, "y_m": -2.0}}"#)
                .unwrap(),
            EditEvent::Select { x_m: 1.5, y_m: -2.0 }
        );
        assert_eq!(
            EditEvent::from_json(r#"{"type": "ADJUST_SPEED", "payload": {"delta_kph": -5}}"#)
                .unwrap(),
            EditEvent::AdjustSpeed { delta_kph: -5.0 }
        );
        assert_eq!(
            EditEvent::from_json(r#"{"type": "DELETE_SELECTED"}"#).unwrap(),
            EditEvent::DeleteSelected
        );
        assert_eq!(
            EditEvent::from_json(r#"{"type": "SAVE", "payload": {}}"#).unwrap(),
            EditEvent::Save { path: None }
        );
        assert_eq!(
            EditEvent::from_json(r#"{"type": "SAVE", "payload": {"path": "out.csv"}}"#).unwrap(),
            EditEvent::Save {
                path: Some(PathBuf::from("out.csv"))
            }
        );

        assert!(matches!(
            EditEvent::from_json(r#"{"type": "JUMP"}"#),
            Err(EventParseError::InvalidJson(_))
        ));
        assert!(matches!(
            EditEvent::from_json("   "),
            Err(EventParseError::Empty)
        ));
    }

    #[test]
    fn test_from_console() {
        assert_eq!(
            EditEvent::from_console("insert 3 -4.25").unwrap(),
            EditEvent::InsertAt { x_m: 3.0, y_m: -4.25 }
        );
        assert_eq!(
            EditEvent::from_console("speed -5").unwrap(),
            EditEvent::AdjustSpeed { delta_kph: -5.0 }
        );
        assert_eq!(EditEvent::from_console("  undo ").unwrap(), EditEvent::Undo);
        assert_eq!(
            EditEvent::from_console("save").unwrap(),
            EditEvent::Save { path: None }
        );
        assert_eq!(
            EditEvent::from_console("save edited.csv").unwrap(),
            EditEvent::Save {
                path: Some(PathBuf::from("edited.csv"))
            }
        );
        assert_eq!(
            EditEvent::from_console(r#"{"type": "QUIT"}"#).unwrap(),
            EditEvent::Quit
        );

        assert!(matches!(
            EditEvent::from_console("select 1.0"),
            Err(EventParseError::InvalidCommand(_))
        ));
        assert!(matches!(
            EditEvent::from_console("fly 1 2"),
            Err(EventParseError::InvalidCommand(_))
        ));
        assert!(matches!(EditEvent::from_console(""), Err(EventParseError::Empty)));
    }

    #[test]
    fn test_is_edit() {
        assert!(EditEvent::Drag { x_m: 0.0, y_m: 0.0 }.is_edit());
        assert!(EditEvent::Undo.is_edit());
        assert!(!EditEvent::Select { x_m: 0.0, y_m: 0.0 }.is_edit());
        assert!(!EditEvent::Save { path: None }.is_edit());
        assert!(!EditEvent::Quit.is_edit());
    }
}
