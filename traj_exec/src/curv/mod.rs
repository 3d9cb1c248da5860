//! # Curvature estimator
//!
//! Estimates the curvature at every point of a sequence of positions as the reciprocal of the
//! radius of the circle through the point and its two neighbours:
//!
//! ```text
//! k = 4 * A / (|p0 p1| * |p1 p2| * |p2 p0|)
//! ```
//!
//! where `A` is the area of the triangle `p0 p1 p2`. Whether the sequence is a closed loop is
//! a parameter, never inferred from the data. On an open sequence the endpoints take the value
//! of their nearest interior point, on a closed loop the neighbours wrap around.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;

// Internal
pub use params::Params;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the curvature at every point of the sequence.
///
/// The output has the same length as the input. Sequences too short to define a triangle give
/// zero curvature everywhere.
///
/// Units: 1/meters
pub fn estimate(positions_m: &[Vector2<f64>], params: &Params) -> Vec<f64> {
    let n = positions_m.len();

    if n < 3 {
        if params.closed_loop && n > 0 {
            trace!("Closed loop of {} points treated as open", n);
        }
        return vec![0.0; n];
    }

    let mut curv = vec![0.0; n];

    for i in 1..(n - 1) {
        curv[i] = three_point(
            &positions_m[i - 1],
            &positions_m[i],
            &positions_m[i + 1],
            params,
        );
    }

    if params.closed_loop {
        curv[0] = three_point(&positions_m[n - 1], &positions_m[0], &positions_m[1], params);
        curv[n - 1] = three_point(
            &positions_m[n - 2],
            &positions_m[n - 1],
            &positions_m[0],
            params,
        );
    } else {
        curv[0] = curv[1];
        curv[n - 1] = curv[n - 2];
    }

    curv
}

/// Curvature of the circle through three points, at the middle one.
///
/// If any side of the triangle is shorter than `params.degenerate_eps_m` the curvature is 0.
pub fn three_point(
    p0: &Vector2<f64>,
    p1: &Vector2<f64>,
    p2: &Vector2<f64>,
    params: &Params,
) -> f64 {
    let a = (p1 - p0).norm();
    let b = (p2 - p1).norm();
    let c = (p0 - p2).norm();

    if a < params.degenerate_eps_m || b < params.degenerate_eps_m || c < params.degenerate_eps_m
    {
        return 0.0;
    }

    // Twice the signed area of the triangle
    let cross = cross_2d(&(p1 - p0), &(p2 - p1));

    // 4 * A / (abc) with A = |cross| / 2
    let k = 2.0 * cross.abs() / (a * b * c);

    if params.signed && cross < 0.0 {
        -k
    } else {
        k
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn cross_2d(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> Params {
        Params {
            degenerate_eps_m: 1e-6,
            closed_loop: false,
            signed: false,
        }
    }

    fn circle(radius_m: f64, num_points: usize, turns: f64) -> Vec<Vector2<f64>> {
        (0..num_points)
            .map(|i| {
                let theta = turns * std::f64::consts::TAU * (i as f64) / (num_points as f64);
                Vector2::new(radius_m * theta.cos(), radius_m * theta.sin())
            })
            .collect()
    }

    #[test]
    fn test_collinear() {
        let line: Vec<_> = (0..5).map(|i| Vector2::new(i as f64, 2.0 * i as f64)).collect();

        assert_eq!(estimate(&line, &params()), vec![0.0; 5]);
    }

    #[test]
    fn test_circle() {
        let radius_m = 25.0;

        // Open arc, endpoints copy their neighbours
        for k in estimate(&circle(radius_m, 40, 0.5), &params()) {
            assert_relative_eq!(k, 1.0 / radius_m, max_relative = 1e-9);
        }

        // Full closed loop
        let mut p = params();
        p.closed_loop = true;
        for k in estimate(&circle(radius_m, 64, 1.0), &p) {
            assert_relative_eq!(k, 1.0 / radius_m, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_signed() {
        let mut p = params();
        p.signed = true;

        // Anticlockwise circle turns left
        let pts = circle(10.0, 16, 0.5);
        assert!(estimate(&pts, &p).iter().all(|k| *k > 0.0));

        // Reversed it turns right
        let rev: Vec<_> = pts.into_iter().rev().collect();
        let curv = estimate(&rev, &p);
        assert!(curv.iter().all(|k| *k < 0.0));
        assert_relative_eq!(curv[5], -0.1, max_relative = 1e-9);
    }

    #[test]
    fn test_degenerate() {
        let pts = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
        ];

        let curv = estimate(&pts, &params());
        assert!(curv.iter().all(|k| k.is_finite()));
        assert_eq!(curv[1], 0.0);
        assert_eq!(curv[2], 0.0);
    }

    #[test]
    fn test_short() {
        let mut p = params();
        assert_eq!(estimate(&[], &p), Vec::<f64>::new());
        assert_eq!(estimate(&[Vector2::new(0.0, 0.0)], &p), vec![0.0]);

        p.closed_loop = true;
        assert_eq!(
            estimate(&[Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)], &p),
            vec![0.0, 0.0]
        );
    }

    #[test]
    fn test_closed_endpoints() {
        // Square, every corner is a right angle with sides 1, 1 and sqrt(2)
        let square = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];
        let mut p = params();
        p.closed_loop = true;

        let expected = 2.0 / 2f64.sqrt();
        for k in estimate(&square, &p) {
            assert_relative_eq!(k, expected, max_relative = 1e-12);
        }

        // Open, the endpoints copy the interior corners
        p.closed_loop = false;
        let curv = estimate(&square, &p);
        assert_relative_eq!(curv[0], curv[1]);
        assert_relative_eq!(curv[3], curv[2]);
    }
}
