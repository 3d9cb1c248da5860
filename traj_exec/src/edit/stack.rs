//! Undo/redo command stack

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};

// Internal
use super::{EditCmd, EditError};
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The history of edits made to a trajectory.
///
/// Applying a new command clears the redo history. Undoing or redoing with an empty history
/// does nothing.
#[derive(Debug, Clone, Default)]
pub struct CmdStack {
    undo: Vec<EditCmd>,
    redo: Vec<EditCmd>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and apply a new command, recording it in the history.
    ///
    /// If the command is rejected neither the trajectory nor the history change.
    pub fn apply(&mut self, cmd: EditCmd, traj: &mut Trajectory) -> Result<(), EditError> {
        cmd.validate(traj)?;
        cmd.apply_to(traj)?;

        debug!("Applied {}", cmd);

        self.undo.push(cmd);
        self.redo.clear();

        Ok(())
    }

    /// Undo the last applied command.
    ///
    /// Returns the command that was undone, or `None` if there was nothing to undo.
    pub fn undo(&mut self, traj: &mut Trajectory) -> Result<Option<&EditCmd>, EditError> {
        Self::transfer(&mut self.undo, &mut self.redo, traj, true)
    }

    /// Redo the last undone command.
    ///
    /// Returns the command that was redone, or `None` if there was nothing to redo.
    pub fn redo(&mut self, traj: &mut Trajectory) -> Result<Option<&EditCmd>, EditError> {
        Self::transfer(&mut self.redo, &mut self.undo, traj, false)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of commands which can be undone.
    pub fn depth(&self) -> usize {
        self.undo.len()
    }

    /// Move the top command of `from` onto `to`, applying it (or its inverse) on the way.
    fn transfer<'a>(
        from: &mut Vec<EditCmd>,
        to: &'a mut Vec<EditCmd>,
        traj: &mut Trajectory,
        invert: bool,
    ) -> Result<Option<&'a EditCmd>, EditError> {
        let cmd = match from.pop() {
            Some(c) => c,
            None => {
                trace!("Nothing to {}", if invert { "undo" } else { "redo" });
                return Ok(None);
            }
        };

        let result = if invert {
            cmd.inverse().apply_to(traj)
        } else {
            cmd.apply_to(traj)
        };

        // Keep the history intact if the command can't be applied
        if let Err(e) = result {
            from.push(cmd);
            return Err(e);
        }

        debug!("{} {}", if invert { "Undid" } else { "Redid" }, cmd);

        to.push(cmd);
        Ok(to.last())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::TrajPoint;
    use nalgebra::Vector2;

    fn traj() -> Trajectory {
        Trajectory::from_points(vec![
            TrajPoint::new(0.0, 0.0, 10.0),
            TrajPoint::new(1.0, 0.0, 10.0),
            TrajPoint::new(2.0, 0.0, 10.0),
            TrajPoint::new(3.0, 0.0, 10.0),
        ])
    }

    fn cmds(t: &Trajectory) -> Vec<EditCmd> {
        vec![
            EditCmd::SpeedChange {
                index: 1,
                from_ms: 10.0,
                to_ms: 7.5,
            },
            EditCmd::Move {
                index: 2,
                from_m: Vector2::new(2.0, 0.0),
                to_m: Vector2::new(2.0, 1.0),
            },
            EditCmd::Insert {
                index: 4,
                point: TrajPoint::new(4.0, 0.0, 9.0),
            },
            EditCmd::Delete {
                index: 0,
                point: t.points()[0],
            },
        ]
    }

    #[test]
    fn test_undo_redo_exact() {
        let original = traj();
        let mut t = original.clone();
        let mut stack = CmdStack::new();

        let mut states = vec![t.clone()];
        for cmd in cmds(&original) {
            stack.apply(cmd, &mut t).unwrap();
            states.push(t.clone());
        }
        assert_eq!(stack.depth(), 4);

        // Undo everything, passing back through each state
        for expected in states.iter().rev().skip(1) {
            assert!(stack.undo(&mut t).unwrap().is_some());
            assert_eq!(&t, expected);
        }
        assert_eq!(t, original);

        // Redo everything
        for expected in states.iter().skip(1) {
            assert!(stack.redo(&mut t).unwrap().is_some());
            assert_eq!(&t, expected);
        }
    }

    #[test]
    fn test_empty_is_noop() {
        let mut t = traj();
        let mut stack = CmdStack::new();

        assert!(stack.undo(&mut t).unwrap().is_none());
        assert!(stack.redo(&mut t).unwrap().is_none());
        assert_eq!(t, traj());
    }

    #[test]
    fn test_apply_clears_redo() {
        let mut t = traj();
        let mut stack = CmdStack::new();
        let cmds = cmds(&t);

        stack.apply(cmds[0].clone(), &mut t).unwrap();
        stack.undo(&mut t).unwrap();
        assert!(stack.can_redo());

        stack.apply(cmds[1].clone(), &mut t).unwrap();
        assert!(!stack.can_redo());
        assert!(stack.redo(&mut t).unwrap().is_none());
    }

    #[test]
    fn test_rejected_not_recorded() {
        let mut t = traj();
        let mut stack = CmdStack::new();

        let onto_neighbour = EditCmd::Move {
            index: 1,
            from_m: Vector2::new(1.0, 0.0),
            to_m: Vector2::new(0.0, 0.0),
        };

        assert!(stack.apply(onto_neighbour, &mut t).is_err());
        assert!(!stack.can_undo());
        assert_eq!(t, traj());
    }

    #[test]
    fn test_stale_command_not_recorded() {
        let mut t = traj();
        let mut stack = CmdStack::new();

        let stale = EditCmd::SpeedChange {
            index: 1,
            from_ms: 99.0,
            to_ms: 5.0,
        };

        assert_eq!(stack.apply(stale, &mut t), Err(EditError::StaleCommand(1)));
        assert!(!stack.can_undo());
        assert_eq!(t.speeds_ms()[1], 10.0);

        // Undo restores the speed the point really had
        stack
            .apply(
                EditCmd::SpeedChange {
                    index: 1,
                    from_ms: 10.0,
                    to_ms: 5.0,
                },
                &mut t,
            )
            .unwrap();
        stack.undo(&mut t).unwrap();
        assert_eq!(t, traj());
    }
}
