//! Reversible edit commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use std::fmt;

// Internal
use super::EditError;
use crate::traj::{TrajPoint, Trajectory};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A single reversible change to a trajectory.
///
/// Every command carries enough state to build its exact inverse, so applying a command and
/// then its inverse leaves the trajectory as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCmd {
    /// Move the point at `index` from `from_m` to `to_m`.
    Move {
        index: usize,
        from_m: Vector2<f64>,
        to_m: Vector2<f64>,
    },

    /// Insert `point` so that it ends up at `index`.
    Insert { index: usize, point: TrajPoint },

    /// Remove the point at `index`, which must be `point`.
    Delete { index: usize, point: TrajPoint },

    /// Change the speed of the point at `index`.
    SpeedChange {
        index: usize,
        from_ms: f64,
        to_ms: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EditCmd {
    /// Build the command which undoes this one.
    pub fn inverse(&self) -> Self {
        match *self {
            EditCmd::Move {
                index,
                from_m,
                to_m,
            } => EditCmd::Move {
                index,
                from_m: to_m,
                to_m: from_m,
            },
            EditCmd::Insert { index, point } => EditCmd::Delete { index, point },
            EditCmd::Delete { index, point } => EditCmd::Insert { index, point },
            EditCmd::SpeedChange {
                index,
                from_ms,
                to_ms,
            } => EditCmd::SpeedChange {
                index,
                from_ms: to_ms,
                to_ms: from_ms,
            },
        }
    }

    /// Index of the point the command acts on.
    pub fn index(&self) -> usize {
        match *self {
            EditCmd::Move { index, .. }
            | EditCmd::Insert { index, .. }
            | EditCmd::Delete { index, .. }
            | EditCmd::SpeedChange { index, .. } => index,
        }
    }

    /// Check a fresh command against the trajectory before it is first applied.
    ///
    /// On top of the index checks done by [`EditCmd::apply_to`] this rejects commands whose
    /// recorded old state doesn't match the trajectory, since their inverse wouldn't restore
    /// it. It also rejects non-finite positions, unusable speeds, and edits which would leave
    /// two consecutive points on top of each other.
    pub fn validate(&self, traj: &Trajectory) -> Result<(), EditError> {
        let points = traj.points();
        self.check_index(traj.len())?;
        self.check_current(points)?;

        let coincident = |a: Option<&TrajPoint>, b: &Vector2<f64>| {
            a.map(|p| p.position_m == *b).unwrap_or(false)
        };

        match *self {
            EditCmd::Move { index, to_m, .. } => {
                check_position(index, &to_m)?;
                let prev = index.checked_sub(1).and_then(|i| points.get(i));
                if coincident(prev, &to_m) || coincident(points.get(index + 1), &to_m) {
                    return Err(EditError::CoincidentPoints(index));
                }
            }
            EditCmd::Insert { index, point } => {
                check_position(index, &point.position_m)?;
                let prev = index.checked_sub(1).and_then(|i| points.get(i));
                if coincident(prev, &point.position_m)
                    || coincident(points.get(index), &point.position_m)
                {
                    return Err(EditError::CoincidentPoints(index));
                }
                check_speed(index, point.speed_ms)?;
            }
            EditCmd::Delete { index, .. } => {
                // The neighbours become consecutive
                if let (Some(prev), Some(next)) = (
                    index.checked_sub(1).and_then(|i| points.get(i)),
                    points.get(index + 1),
                ) {
                    if prev.position_m == next.position_m {
                        return Err(EditError::CoincidentPoints(index));
                    }
                }
            }
            EditCmd::SpeedChange { index, to_ms, .. } => check_speed(index, to_ms)?,
        }

        Ok(())
    }

    /// Apply the command to the trajectory.
    ///
    /// Only the index is checked, the trajectory is unchanged if it's out of range.
    pub fn apply_to(&self, traj: &mut Trajectory) -> Result<(), EditError> {
        self.check_index(traj.len())?;
        let points = traj.points_mut();

        match *self {
            EditCmd::Move { index, to_m, .. } => points[index].position_m = to_m,
            EditCmd::Insert { index, point } => points.insert(index, point),
            EditCmd::Delete { index, .. } => {
                points.remove(index);
            }
            EditCmd::SpeedChange { index, to_ms, .. } => points[index].speed_ms = to_ms,
        }

        Ok(())
    }

    /// Check the old state carried by the command is what the trajectory holds now.
    fn check_current(&self, points: &[TrajPoint]) -> Result<(), EditError> {
        let current = match *self {
            EditCmd::Move { index, from_m, .. } => points[index].position_m == from_m,
            EditCmd::Delete { index, point } => points[index] == point,
            EditCmd::SpeedChange { index, from_ms, .. } => points[index].speed_ms == from_ms,
            EditCmd::Insert { .. } => true,
        };

        if current {
            Ok(())
        } else {
            Err(EditError::StaleCommand(self.index()))
        }
    }

    fn check_index(&self, len: usize) -> Result<(), EditError> {
        let index = self.index();

        // Inserting may append
        let valid = match self {
            EditCmd::Insert { .. } => index <= len,
            _ => index < len,
        };

        if valid {
            Ok(())
        } else {
            Err(EditError::IndexOutOfRange { index, len })
        }
    }
}

impl fmt::Display for EditCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditCmd::Move {
                index,
                from_m,
                to_m,
            } => write!(
                f,
                "move idx={} ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                index, from_m.x, from_m.y, to_m.x, to_m.y
            ),
            EditCmd::Insert { index, point } => write!(
                f,
                "insert idx={} at ({:.3}, {:.3})",
                index, point.position_m.x, point.position_m.y
            ),
            EditCmd::Delete { index, .. } => write!(f, "delete idx={}", index),
            EditCmd::SpeedChange {
                index,
                from_ms,
                to_ms,
            } => write!(
                f,
                "speed idx={} {:.3} -> {:.3} m/s",
                index, from_ms, to_ms
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_position(index: usize, position_m: &Vector2<f64>) -> Result<(), EditError> {
    if position_m.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EditError::NonFinitePosition {
            index,
            x_m: position_m.x,
            y_m: position_m.y,
        })
    }
}

fn check_speed(index: usize, speed_ms: f64) -> Result<(), EditError> {
    if speed_ms.is_finite() && speed_ms >= 0.0 {
        Ok(())
    } else {
        Err(EditError::InvalidSpeed { index, speed_ms })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn traj() -> Trajectory {
        Trajectory::from_points(vec![
            TrajPoint::new(0.0, 0.0, 10.0),
            TrajPoint::new(1.0, 0.0, 11.0),
            TrajPoint::new(2.0, 0.0, 12.0),
        ])
    }

    fn round_trip(cmd: EditCmd) {
        let before = traj();
        let mut t = before.clone();

        cmd.validate(&t).unwrap();
        cmd.apply_to(&mut t).unwrap();
        assert_ne!(t, before);

        cmd.inverse().apply_to(&mut t).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn test_inverse() {
        let t = traj();

        round_trip(EditCmd::Move {
            index: 1,
            from_m: Vector2::new(1.0, 0.0),
            to_m: Vector2::new(1.0, 3.0),
        });
        round_trip(EditCmd::Insert {
            index: 3,
            point: TrajPoint::new(3.0, 0.0, 1.0),
        });
        round_trip(EditCmd::Delete {
            index: 0,
            point: t.points()[0],
        });
        round_trip(EditCmd::SpeedChange {
            index: 2,
            from_ms: 12.0,
            to_ms: 5.0,
        });
    }

    #[test]
    fn test_out_of_range() {
        let mut t = traj();
        let cmd = EditCmd::SpeedChange {
            index: 3,
            from_ms: 0.0,
            to_ms: 1.0,
        };

        assert!(matches!(
            cmd.apply_to(&mut t),
            Err(EditError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(t, traj());
    }

    #[test]
    fn test_coincident_rejected() {
        let t = traj();

        let onto_neighbour = EditCmd::Move {
            index: 1,
            from_m: Vector2::new(1.0, 0.0),
            to_m: Vector2::new(2.0, 0.0),
        };
        assert!(matches!(
            onto_neighbour.validate(&t),
            Err(EditError::CoincidentPoints(1))
        ));

        let duplicate = EditCmd::Insert {
            index: 1,
            point: TrajPoint::new(0.0, 0.0, 1.0),
        };
        assert!(matches!(
            duplicate.validate(&t),
            Err(EditError::CoincidentPoints(1))
        ));

        let bad_speed = EditCmd::SpeedChange {
            index: 0,
            from_ms: 10.0,
            to_ms: f64::NAN,
        };
        assert!(matches!(
            bad_speed.validate(&t),
            Err(EditError::InvalidSpeed { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let t = traj();

        let drag = EditCmd::Move {
            index: 0,
            from_m: Vector2::new(0.0, 0.0),
            to_m: Vector2::new(f64::NAN, 0.0),
        };
        assert!(matches!(
            drag.validate(&t),
            Err(EditError::NonFinitePosition { index: 0, .. })
        ));

        let insert = EditCmd::Insert {
            index: 1,
            point: TrajPoint::new(0.5, f64::INFINITY, 1.0),
        };
        assert!(matches!(
            insert.validate(&t),
            Err(EditError::NonFinitePosition { index: 1, .. })
        ));
    }

    #[test]
    fn test_stale_old_state_rejected() {
        let t = traj();

        let speed = EditCmd::SpeedChange {
            index: 1,
            from_ms: 99.0,
            to_ms: 5.0,
        };
        assert_eq!(speed.validate(&t), Err(EditError::StaleCommand(1)));

        let moved = EditCmd::Move {
            index: 2,
            from_m: Vector2::new(7.0, 7.0),
            to_m: Vector2::new(2.0, 1.0),
        };
        assert_eq!(moved.validate(&t), Err(EditError::StaleCommand(2)));

        let delete = EditCmd::Delete {
            index: 0,
            point: TrajPoint::new(0.0, 0.0, 3.0),
        };
        assert_eq!(delete.validate(&t), Err(EditError::StaleCommand(0)));
    }

    #[test]
    fn test_delete_joining_coincident() {
        let t = Trajectory::from_points(vec![
            TrajPoint::new(0.0, 0.0, 1.0),
            TrajPoint::new(1.0, 0.0, 1.0),
            TrajPoint::new(0.0, 0.0, 1.0),
        ]);
        let cmd = EditCmd::Delete {
            index: 1,
            point: t.points()[1],
        };

        assert!(matches!(cmd.validate(&t), Err(EditError::CoincidentPoints(1))));
    }
}
