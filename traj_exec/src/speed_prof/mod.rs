//! # Speed profile corrector
//!
//! Rewrites a raw speed trace so that the vehicle slows down before entering a curve and
//! speeds back up after leaving it.
//!
//! 1. Every speed is clamped into `[min_speed_ms, max_speed_ms]`.
//! 2. Points with `|curvature| > curvature_threshold` are in a curve. Contiguous runs of such
//!    points form curve regions. In a region each point is limited to
//!    `curve_speed_gain / |curvature|`, clamped into the speed range.
//! 3. Over `lookback_points` before a region's entry the speed is blended linearly from the
//!    point's own speed down to the entry speed, and likewise over `lookahead_points` after the
//!    exit back up from the exit speed. Blending only ever lowers a speed.
//! 4. A backward pass limits each step's deceleration to `max_decel_ms` and a forward pass then
//!    limits each step's acceleration to `max_accel_ms`.
//!
//! Both rate passes only lower speeds, so the result stays within the speed range.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};

// Internal
pub use params::Params;
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a correction, for reporting to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionReport {
    /// Number of curve regions found.
    pub num_regions: usize,

    /// Number of points whose speed was changed.
    pub num_changed: usize,

    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Units: meters/second
    pub max_speed_ms: f64,
}

/// A contiguous run of in-curve points, both indices inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveRegion {
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CorrectError {
    #[error("Got {num_curv} curvature values for {num_speeds} speeds")]
    LengthMismatch { num_curv: usize, num_speeds: usize },

    #[error("Invalid speed profile parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Correct a speed trace using the curvature at each point.
///
/// `curvature` and `speeds_ms` must have the same length, the output has that length too.
pub fn correct(
    curvature: &[f64],
    speeds_ms: &[f64],
    params: &Params,
) -> Result<(Vec<f64>, CorrectionReport), CorrectError> {
    if curvature.len() != speeds_ms.len() {
        return Err(CorrectError::LengthMismatch {
            num_curv: curvature.len(),
            num_speeds: speeds_ms.len(),
        });
    }
    params.validate()?;

    let n = speeds_ms.len();

    let mut v: Vec<f64> = speeds_ms
        .iter()
        .map(|s| clamp(*s, params.min_speed_ms, params.max_speed_ms))
        .collect();

    let in_curve = classify(curvature, params.curvature_threshold);
    let regions = curve_regions(&in_curve);

    debug!("Found {} curve region(s) in {} points", regions.len(), n);

    // Limit the in-curve points first, so that windows blend towards the final curve speeds
    for r in regions.iter() {
        for i in r.start..=r.end {
            let target = clamp(
                params.curve_speed_gain / curvature[i].abs(),
                params.min_speed_ms,
                params.max_speed_ms,
            );
            v[i] = v[i].min(target);
        }
    }

    for r in regions.iter() {
        trace!("Curve region {}..={}", r.start, r.end);

        // Entry, slowing down towards the region
        let entry_ms = v[r.start];
        let window = params.lookback_points as f64 + 1.0;
        for k in 1..=params.lookback_points {
            let i = match r.start.checked_sub(k) {
                Some(i) if !in_curve[i] => i,
                _ => break,
            };
            let target = lin_map((0.0, window), (entry_ms, v[i]), k as f64);
            v[i] = v[i].min(target);
        }

        // Exit, speeding back up away from the region
        let exit_ms = v[r.end];
        let window = params.lookahead_points as f64 + 1.0;
        for k in 1..=params.lookahead_points {
            let i = r.end + k;
            if i >= n || in_curve[i] {
                break;
            }
            let target = lin_map((0.0, window), (exit_ms, v[i]), k as f64);
            v[i] = v[i].min(target);
        }
    }

    // Deceleration limit, v[i] - v[i + 1] <= max_decel
    for i in (0..n.saturating_sub(1)).rev() {
        v[i] = v[i].min(v[i + 1] + params.max_decel_ms);
    }

    // Acceleration limit, v[i] - v[i - 1] <= max_accel
    for i in 1..n {
        v[i] = v[i].min(v[i - 1] + params.max_accel_ms);
    }

    let report = CorrectionReport {
        num_regions: regions.len(),
        num_changed: v
            .iter()
            .zip(speeds_ms.iter())
            .filter(|(new, old)| new != old)
            .count(),
        min_speed_ms: v.iter().cloned().fold(f64::NAN, f64::min),
        max_speed_ms: v.iter().cloned().fold(f64::NAN, f64::max),
    };

    Ok((v, report))
}

/// Classify each point as in a curve or not.
pub fn classify(curvature: &[f64], threshold: f64) -> Vec<bool> {
    curvature.iter().map(|k| k.abs() > threshold).collect()
}

/// Find the contiguous runs of in-curve points.
pub fn curve_regions(in_curve: &[bool]) -> Vec<CurveRegion> {
    let mut regions = Vec::new();
    let mut start = None;

    for (i, c) in in_curve.iter().enumerate() {
        match (start, c) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                regions.push(CurveRegion { start: s, end: i - 1 });
                start = None;
            }
            _ => (),
        }
    }

    if let Some(s) = start {
        regions.push(CurveRegion {
            start: s,
            end: in_curve.len() - 1,
        });
    }

    regions
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn params() -> Params {
        Params {
            curvature_threshold: 0.05,
            lookahead_points: 3,
            lookback_points: 3,
            min_speed_ms: 3.0,
            max_speed_ms: 30.0,
            max_decel_ms: 2.0,
            max_accel_ms: 2.0,
            curve_speed_gain: 1.0,
        }
    }

    #[test]
    fn test_straight_unchanged() {
        let speeds = vec![10.0; 5];
        let (out, report) = correct(&[0.0; 5], &speeds, &params()).unwrap();

        assert_eq!(out, speeds);
        assert_eq!(report.num_regions, 0);
        assert_eq!(report.num_changed, 0);
    }

    #[test]
    fn test_single_curve() {
        let mut curv = vec![0.0; 20];
        for k in curv.iter_mut().take(7).skip(4) {
            *k = 1.0;
        }
        let speeds = vec![10.0; 20];

        let (v, report) = correct(&curv, &speeds, &params()).unwrap();

        assert_eq!(report.num_regions, 1);

        // Slowing into the curve
        assert!(v[0] > v[1]);
        assert!(v[1] > v[2] && v[2] > v[3] && v[3] > v[4]);

        // In the curve, no faster than anything around it
        for i in 4..=6 {
            assert_eq!(v[i], 3.0);
            assert!(v[i] <= v[3] && v[i] <= v[7]);
        }

        // Speeding up out of it
        assert!(v[7] > v[6] && v[8] > v[7] && v[9] > v[8]);
        assert_eq!(&v[10..], &speeds[10..]);
    }

    #[test]
    fn test_short_window_rate_limited() {
        // A one point lookback can't absorb a drop from 30 to 3 so the rate limit pass takes
        // over
        let mut p = params();
        p.lookback_points = 1;
        p.lookahead_points = 1;

        let mut curv = vec![0.0; 30];
        curv[15] = 1.0;
        let (v, _) = correct(&curv, &[30.0; 30], &p).unwrap();

        for w in v.windows(2) {
            assert!(w[0] - w[1] <= p.max_decel_ms + 1e-9);
            assert!(w[1] - w[0] <= p.max_accel_ms + 1e-9);
        }
        assert_eq!(v[15], 3.0);
    }

    #[test]
    fn test_clamped() {
        let (v, _) = correct(&[0.0; 3], &[0.0, 100.0, 10.0], &params()).unwrap();
        assert!(v.iter().all(|s| *s >= 3.0 && *s <= 30.0));
    }

    #[test]
    fn test_regions() {
        let regions = curve_regions(&[true, false, true, true, false, false, true]);
        assert_eq!(
            regions,
            vec![
                CurveRegion { start: 0, end: 0 },
                CurveRegion { start: 2, end: 3 },
                CurveRegion { start: 6, end: 6 },
            ]
        );
        assert!(curve_regions(&[]).is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            correct(&[0.0; 2], &[1.0; 3], &params()),
            Err(CorrectError::LengthMismatch { .. })
        ));

        let mut p = params();
        p.min_speed_ms = 40.0;
        assert!(matches!(
            correct(&[0.0], &[1.0], &p),
            Err(CorrectError::InvalidParams(_))
        ));

        let mut p = params();
        p.max_decel_ms = 0.0;
        assert!(matches!(
            correct(&[0.0], &[1.0], &p),
            Err(CorrectError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_empty() {
        let (v, report) = correct(&[], &[], &params()).unwrap();
        assert!(v.is_empty());
        assert_eq!(report.num_changed, 0);
    }

    proptest! {
        #[test]
        fn prop_range_and_rate(
            input in prop::collection::vec((-0.5f64..0.5, 0.0f64..60.0), 0..200),
            lookback in 0usize..8,
            lookahead in 0usize..8,
            decel in 0.1f64..5.0,
            accel in 0.1f64..5.0,
        ) {
            let mut p = params();
            p.lookback_points = lookback;
            p.lookahead_points = lookahead;
            p.max_decel_ms = decel;
            p.max_accel_ms = accel;

            let (curv, speeds): (Vec<f64>, Vec<f64>) = input.into_iter().unzip();
            let (v, _) = correct(&curv, &speeds, &p).unwrap();

            prop_assert_eq!(v.len(), speeds.len());
            for s in v.iter() {
                prop_assert!(*s >= p.min_speed_ms && *s <= p.max_speed_ms);
            }
            for w in v.windows(2) {
                prop_assert!(w[0] - w[1] <= decel + 1e-9);
                prop_assert!(w[1] - w[0] <= accel + 1e-9);
            }
        }
    }
}
