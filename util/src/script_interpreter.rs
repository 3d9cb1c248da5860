//! # Edit script interpreter module
//!
//! This module provides an interpreter for edit scripts, allowing a sequence of editor events to
//! be replayed against a trajectory without an operator.
//!
//! A script is a list of JSON events, each terminated by a `;`. Lines starting with `#` are
//! comments:
//!
//! ```text
//! # Slow down the hairpin
//! {"type": "SELECT", "payload": {"x_m": 10.0, "y_m": 4.0}};
//! {"type": "ADJUST_SPEED", "payload": {"delta_kph": -5.0}};
//! {"type": "SAVE", "payload": {}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use traj_if::{EditEvent, EventParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.next_event` to
/// acquire the events in order.
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    events: VecDeque<EditEvent>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid event in statement {0}: {1}")]
    InvalidEvent(usize, EventParseError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        // Drop the comment lines before matching statements
        let script: String = script
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");

        // Each statement is everything up to the next `;`
        let re = RegexBuilder::new(r"([^;\s][^;]*);")
            .build()
            .map_err(|_| ScriptError::ScriptEmpty)?;

        let mut events = VecDeque::new();

        for (i, cap) in re.captures_iter(&script).enumerate() {
            let statement = match cap.get(1) {
                Some(s) => s.as_str(),
                None => continue,
            };

            let event =
                EditEvent::from_json(statement).map_err(|e| ScriptError::InvalidEvent(i, e))?;

            events.push_back(event);
        }

        if events.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: None,
            events,
        })
    }

    /// Return the next event in the script, or `None` if the end of the script was reached.
    pub fn next_event(&mut self) -> Option<EditEvent> {
        self.events.pop_front()
    }

    /// Get the number of events left in the script
    pub fn get_num_events(&self) -> usize {
        self.events.len()
    }

    /// Path of the loaded script, if it was loaded from a file.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}
