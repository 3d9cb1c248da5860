//! # Speed Profile Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use traj_lib::{curv, nearest, speed_prof};

fn speed_prof_benchmark(c: &mut Criterion) {
    // ---- Build a dummy circuit ----

    // Oval of 5000 points, two straights joined by two hairpins
    let num_points = 5000;
    let positions_m: Vec<Vector2<f64>> = (0..num_points)
        .map(|i| {
            let theta = std::f64::consts::TAU * (i as f64) / (num_points as f64);
            Vector2::new(400.0 * theta.cos(), 60.0 * theta.sin())
        })
        .collect();
    let speeds_ms = vec![40.0; num_points];

    let curv_params = curv::Params {
        degenerate_eps_m: 0.01,
        closed_loop: true,
        signed: false,
    };

    let prof_params = speed_prof::Params {
        curvature_threshold: 0.005,
        lookahead_points: 40,
        lookback_points: 60,
        min_speed_ms: 2.0,
        max_speed_ms: 55.0,
        max_decel_ms: 0.2,
        max_accel_ms: 0.1,
        curve_speed_gain: 0.25,
    };

    c.bench_function("curv::estimate", |b| {
        b.iter(|| curv::estimate(&positions_m, &curv_params))
    });

    let curvature = curv::estimate(&positions_m, &curv_params);

    c.bench_function("speed_prof::correct", |b| {
        b.iter(|| speed_prof::correct(&curvature, &speeds_ms, &prof_params).unwrap())
    });

    c.bench_function("nearest::nearest_point", |b| {
        b.iter(|| nearest::nearest_point(&positions_m, &Vector2::new(-390.0, 5.0), Some(2.0)))
    });
}

criterion_group!(benches, speed_prof_benchmark);
criterion_main!(benches);
