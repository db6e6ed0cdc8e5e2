//! Shared fixtures for unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::Site;
use crate::kdtree::{KDTree, KDTreeBuilder};
use crate::store::{PointId, RawRecord};


/// Points spread uniformly over a 10 km square.
pub(crate) fn uniform_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(0.0..10_000.0), rng.gen_range(0.0..10_000.0)))
        .collect()
}

/// Points around a handful of hot spots, with exact duplicates mixed in.
pub(crate) fn clustered_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<(f64, f64)> = (0..5)
        .map(|_| (rng.gen_range(0.0..10_000.0), rng.gen_range(0.0..10_000.0)))
        .collect();
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(n);
    for i in 0..n {
        if i % 7 == 6 {
            // repeat an earlier incident location
            let j = rng.gen_range(0..points.len());
            points.push(points[j]);
            continue;
        }
        let (cx, cy) = centers[i % centers.len()];
        let r = rng.gen_range(0.0..300.0);
        let theta = rng.gen_range(0.0..std::f64::consts::TAU);
        points.push((cx + r * theta.cos(), cy + r * theta.sin()));
    }
    points
}

/// Points on a single line, snapped to a 1 m grid so ties are common.
pub(crate) fn collinear_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let t = rng.gen_range(0..2_000) as f64;
            (t, 2.0 * t + 5.0)
        })
        .collect()
}

pub(crate) fn tree_from_xy(points: &[(f64, f64)], node_size: u16) -> KDTree {
    let mut builder = KDTreeBuilder::new_with_node_size(points.len() as u32, node_size);
    for (i, (x, y)) in points.iter().enumerate() {
        builder.add(PointId(i as u32), *x, *y);
    }
    builder.finish()
}

pub(crate) fn sites_from_xy(points: &[(f64, f64)]) -> Vec<Site> {
    points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| Site::new(PointId(i as u32), *x, *y))
        .collect()
}

/// Records scattered around central São Paulo, all valid.
pub(crate) fn sao_paulo_records(n: usize) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n)
        .map(|i| {
            RawRecord::new(
                rng.gen_range(-23.65..-23.45),
                rng.gen_range(-46.75..-46.55),
            )
            .with_attribute("NUM_BO", i.to_string())
        })
        .collect()
}
