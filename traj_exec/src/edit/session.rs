//! # Trajectory editing session
//!
//! Holds the trajectory being edited, its history, the current selection and the reference
//! boundaries, and turns [`EditEvent`]s into edit commands.
//!
//! Problems with a single event (nothing selected, an edit that would be invalid, a failed
//! save) are returned as errors but leave the session usable, the caller is expected to report
//! them and carry on with the next event.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::Vector2;
use std::path::{Path, PathBuf};

// Internal
use super::{CmdStack, EditCmd, EditError, Params};
use crate::boundary::Boundaries;
use crate::nearest;
use crate::traj::{TrajError, TrajPoint, Trajectory};
use traj_if::EditEvent;
use util::maths::{clamp, kph_to_ms, ms_to_kph};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An editing session on a single trajectory.
///
/// The boundaries are borrowed, the session never modifies them.
pub struct TrajSession<'b> {
    traj: Trajectory,
    stack: CmdStack,
    bounds: &'b Boundaries,
    params: Params,

    /// Index of the selected point.
    selected: Option<usize>,

    /// True if there are edits which haven't been saved.
    dirty: bool,

    /// Human readable description of the result of the last event.
    status: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What the caller should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    Quit,
}

/// Reasons an event couldn't be handled. None of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No point is selected")]
    NoSelection,

    #[error("Cannot delete the last point of the trajectory")]
    LastPoint,

    #[error("Edit rejected: {0}")]
    EditRejected(#[from] EditError),

    #[error("Cannot save the trajectory to {0:?}: {1}")]
    SaveFailed(PathBuf, TrajError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'b> TrajSession<'b> {
    /// Start a new session on the given trajectory.
    pub fn new(traj: Trajectory, bounds: &'b Boundaries, params: Params) -> Self {
        let status = format!("Loaded {} points", traj.len());

        Self {
            traj,
            stack: CmdStack::new(),
            bounds,
            params,
            selected: None,
            dirty: false,
            status,
        }
    }

    /// Handle a single event.
    pub fn handle(&mut self, event: &EditEvent) -> Result<EventOutcome, SessionError> {
        debug!("Handling {:?}", event);

        let result = match event {
            EditEvent::Select { x_m, y_m } => {
                self.select(Vector2::new(*x_m, *y_m));
                Ok(())
            }
            EditEvent::Drag { x_m, y_m } => self.drag(Vector2::new(*x_m, *y_m)),
            EditEvent::InsertAt { x_m, y_m } => self.insert(Vector2::new(*x_m, *y_m)),
            EditEvent::DeleteSelected => self.delete(),
            EditEvent::AdjustSpeed { delta_kph } => self.adjust_speed(*delta_kph),
            EditEvent::Undo => self.undo(),
            EditEvent::Redo => self.redo(),
            EditEvent::Save { path } => {
                let path = path
                    .clone()
                    .unwrap_or_else(|| self.params.default_save_path.clone());
                self.save(&path)
            }
            EditEvent::Quit => {
                if self.dirty {
                    warn!("Quitting with unsaved edits");
                }
                self.status = String::from("Quit");
                return Ok(EventOutcome::Quit);
            }
        };

        match result {
            Ok(()) => {
                info!("{}", self.status);
                Ok(EventOutcome::Continue)
            }
            Err(e) => {
                self.status = format!("{}", e);
                Err(e)
            }
        }
    }

    pub fn traj(&self) -> &Trajectory {
        &self.traj
    }

    pub fn bounds(&self) -> &'b Boundaries {
        self.bounds
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// True if there are edits which haven't been saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Select the point nearest to the position, or clear the selection if no point is within
    /// the pick radius.
    fn select(&mut self, position_m: Vector2<f64>) {
        self.selected = nearest::nearest_point(
            &self.traj.positions_m(),
            &position_m,
            Some(self.params.pick_radius_m),
        );

        match self.selected {
            Some(_) => self.update_selected_status("Selected"),
            None => {
                debug!(
                    "No point within {} m of ({:.3}, {:.3})",
                    self.params.pick_radius_m, position_m.x, position_m.y
                );
                self.status = format!("No point within {} m", self.params.pick_radius_m);
            }
        }
    }

    fn drag(&mut self, to_m: Vector2<f64>) -> Result<(), SessionError> {
        let (index, point) = self.selected_point()?;

        self.apply(EditCmd::Move {
            index,
            from_m: point.position_m,
            to_m,
        })?;

        self.update_selected_status("Moved");
        Ok(())
    }

    /// Insert a new point into the segment nearest the position, the new point becomes the
    /// selection.
    fn insert(&mut self, position_m: Vector2<f64>) -> Result<(), SessionError> {
        let index = self.insert_index(&position_m);

        let points = self.traj.points();
        let neighbours: Vec<f64> = [index.checked_sub(1), Some(index)]
            .iter()
            .filter_map(|i| i.and_then(|i| points.get(i)))
            .map(|p| p.speed_ms)
            .collect();

        let speed_ms = if neighbours.is_empty() {
            0.0
        } else {
            neighbours.iter().sum::<f64>() / neighbours.len() as f64
        };

        self.apply(EditCmd::Insert {
            index,
            point: TrajPoint {
                position_m,
                speed_ms,
                source_row: None,
            },
        })?;

        self.selected = Some(index);
        self.update_selected_status("Inserted");
        Ok(())
    }

    fn delete(&mut self) -> Result<(), SessionError> {
        let (index, point) = self.selected_point()?;

        if self.traj.len() <= 1 {
            return Err(SessionError::LastPoint);
        }

        self.apply(EditCmd::Delete { index, point })?;

        self.selected = None;
        self.status = format!("Deleted idx={}", index);
        Ok(())
    }

    /// Change the selected point's speed, keeping the result within the configured range.
    fn adjust_speed(&mut self, delta_kph: f64) -> Result<(), SessionError> {
        let (index, point) = self.selected_point()?;

        let to_kph = clamp(
            ms_to_kph(point.speed_ms) + delta_kph,
            self.params.min_speed_kph,
            self.params.max_speed_kph,
        );
        let to_ms = kph_to_ms(to_kph);

        if to_ms == point.speed_ms {
            self.status = format!("Speed unchanged at {:.1} km/h", to_kph);
            return Ok(());
        }

        self.apply(EditCmd::SpeedChange {
            index,
            from_ms: point.speed_ms,
            to_ms,
        })?;

        self.update_selected_status("Speed set");
        Ok(())
    }

    fn undo(&mut self) -> Result<(), SessionError> {
        let undone = self
            .stack
            .undo(&mut self.traj)?
            .map(|cmd| format!("Undid {}", cmd));
        self.after_history_change(undone, "Nothing to undo");
        Ok(())
    }

    fn redo(&mut self) -> Result<(), SessionError> {
        let redone = self
            .stack
            .redo(&mut self.traj)?
            .map(|cmd| format!("Redid {}", cmd));
        self.after_history_change(redone, "Nothing to redo");
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), SessionError> {
        self.traj
            .save(path)
            .map_err(|e| SessionError::SaveFailed(path.to_path_buf(), e))?;

        self.dirty = false;
        self.status = format!("Saved {} points to {:?}", self.traj.len(), path);
        Ok(())
    }

    fn apply(&mut self, cmd: EditCmd) -> Result<(), SessionError> {
        self.stack.apply(cmd, &mut self.traj)?;
        self.dirty = true;
        Ok(())
    }

    fn selected_point(&self) -> Result<(usize, TrajPoint), SessionError> {
        self.selected
            .and_then(|i| self.traj.get(i).map(|p| (i, *p)))
            .ok_or(SessionError::NoSelection)
    }

    /// Index a point inserted at the position should take.
    ///
    /// Positions beyond either end of the trajectory extend it, anything else goes into the
    /// nearest segment.
    fn insert_index(&self, position_m: &Vector2<f64>) -> usize {
        let positions_m = self.traj.positions_m();
        let n = positions_m.len();

        match nearest::nearest_segment(&positions_m, position_m) {
            Some(m) if m.index == 0 && m.t < 0.0 => 0,
            Some(m) if m.index + 2 == n && m.t > 1.0 => n,
            Some(m) => m.index + 1,
            None => n,
        }
    }

    /// Update the state after an undo or redo, `done` is `None` if the history was empty.
    ///
    /// Drops a selection left out of range by the change.
    fn after_history_change(&mut self, done: Option<String>, nothing: &str) {
        match done {
            Some(status) => {
                self.status = status;
                self.dirty = true;
            }
            None => {
                self.status = String::from(nothing);
                return;
            }
        }

        if let Some(i) = self.selected {
            if i >= self.traj.len() {
                self.selected = None;
            }
        }
    }

    fn update_selected_status(&mut self, action: &str) {
        let (index, point) = match self.selected_point() {
            Ok(s) => s,
            Err(_) => return,
        };

        let mut status = format!(
            "{} idx={}, speed={:.1} km/h",
            action,
            index,
            ms_to_kph(point.speed_ms)
        );

        if let Some(m) = self.bounds.nearest(&point.position_m) {
            status.push_str(&format!(
                ", nearest boundary: {} #{} at {:.2} m",
                m.role, m.index, m.dist_m
            ));
        }

        self.status = status;
    }
}
