//! # Nearest point queries
//!
//! Linear scans over a sequence of positions. Ties are broken towards the smaller index so
//! that a query always gives the same answer for the same data.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The segment of a polyline nearest to a query position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMatch {
    /// Index of the segment's first point, the segment runs from `index` to `index + 1`.
    pub index: usize,

    /// Position of the query's projection along the infinite line through the segment, 0 at
    /// the first point and 1 at the second. Not clamped.
    pub t: f64,

    /// Distance from the query to the segment.
    ///
    /// Units: meters
    pub dist_m: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the index of the position nearest to the query.
///
/// If `tolerance_m` is given positions further away than it never match. Returns `None` for
/// an empty sequence, a non-finite query, or when nothing is within tolerance. Equidistant positions resolve to the
/// smallest index.
pub fn nearest_point(
    positions_m: &[Vector2<f64>],
    query_m: &Vector2<f64>,
    tolerance_m: Option<f64>,
) -> Option<usize> {
    nearest_point_dist(positions_m, query_m, tolerance_m).map(|(i, _)| i)
}

/// As [`nearest_point`] but also gives the distance to the match.
pub fn nearest_point_dist(
    positions_m: &[Vector2<f64>],
    query_m: &Vector2<f64>,
    tolerance_m: Option<f64>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, p) in positions_m.iter().enumerate() {
        let dist_m = (p - query_m).norm();
        if !dist_m.is_finite() {
            continue;
        }

        // Strictly less so the first of equal candidates is kept
        if best.map(|(_, d)| dist_m < d).unwrap_or(true) {
            best = Some((i, dist_m));
        }
    }

    match (best, tolerance_m) {
        (Some((_, d)), Some(tol)) if d > tol => None,
        _ => best,
    }
}

/// Find the segment of the polyline nearest to the query.
///
/// Returns `None` if the polyline has fewer than two points or the query isn't finite. Zero length segments are measured
/// to their point.
pub fn nearest_segment(positions_m: &[Vector2<f64>], query_m: &Vector2<f64>) -> Option<SegmentMatch> {
    let mut best: Option<SegmentMatch> = None;

    for (index, w) in positions_m.windows(2).enumerate() {
        let seg = w[1] - w[0];
        let len_sq = seg.norm_squared();

        let t = if len_sq > 0.0 {
            (query_m - w[0]).dot(&seg) / len_sq
        } else {
            0.0
        };

        let closest = w[0] + seg * t.max(0.0).min(1.0);
        let dist_m = (query_m - closest).norm();
        if !dist_m.is_finite() {
            continue;
        }

        if best.map(|b| dist_m < b.dist_m).unwrap_or(true) {
            best = Some(SegmentMatch { index, t, dist_m });
        }
    }

    best
}

#[cfg(test)]
mod test {
    use super::*;

    fn pts() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 2.0),
        ]
    }

    #[test]
    fn test_nearest_point() {
        let p = pts();

        assert_eq!(nearest_point(&p, &Vector2::new(2.2, 0.3), None), Some(1));
        assert_eq!(nearest_point(&p, &Vector2::new(4.1, 1.9), Some(0.5)), Some(3));
        assert_eq!(nearest_point(&p, &Vector2::new(10.0, 10.0), Some(0.5)), None);
        assert_eq!(nearest_point(&[], &Vector2::new(0.0, 0.0), None), None);
    }

    #[test]
    fn test_tie_smaller_index() {
        let p = pts();

        // Equidistant from 0 and 1, 2 and 3, then 1 and 2
        assert_eq!(nearest_point(&p, &Vector2::new(1.0, 0.0), None), Some(0));
        assert_eq!(nearest_point(&p, &Vector2::new(5.0, 1.0), None), Some(2));
        assert_eq!(nearest_point(&p, &Vector2::new(3.0, -1.0), None), Some(1));
    }

    #[test]
    fn test_tolerance_boundary() {
        let p = pts();
        assert_eq!(
            nearest_point_dist(&p, &Vector2::new(0.0, 1.0), Some(1.0)),
            Some((0, 1.0))
        );
    }

    #[test]
    fn test_non_finite_query() {
        let p = pts();
        let nan = Vector2::new(f64::NAN, f64::NAN);

        assert_eq!(nearest_point(&p, &nan, Some(2.0)), None);
        assert_eq!(nearest_point(&p, &nan, None), None);
        assert_eq!(
            nearest_point(&p, &Vector2::new(f64::INFINITY, 0.0), None),
            None
        );
        assert!(nearest_segment(&p, &nan).is_none());
    }

    #[test]
    fn test_nearest_segment() {
        let p = pts();

        let m = nearest_segment(&p, &Vector2::new(3.0, 0.5)).unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.t, 0.5);
        assert_eq!(m.dist_m, 0.5);

        // Beyond the first point
        let m = nearest_segment(&p, &Vector2::new(-1.0, 0.0)).unwrap();
        assert_eq!(m.index, 0);
        assert!(m.t < 0.0);

        assert!(nearest_segment(&p[..1], &Vector2::new(0.0, 0.0)).is_none());
    }
}
