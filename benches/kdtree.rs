use criterion::{criterion_group, criterion_main, Criterion};
use geo_analysis::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
use geo_analysis::PointId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::GeomWithData;
use rstar::RTree;

const N: usize = 100_000;

fn load_data() -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..N)
        .map(|_| (rng.gen_range(0.0..30_000.0), rng.gen_range(0.0..30_000.0)))
        .collect()
}

fn construct_kdtree(points: &[(f64, f64)]) -> KDTree {
    let mut builder = KDTreeBuilder::new(points.len() as u32);
    for (i, (x, y)) in points.iter().enumerate() {
        builder.add(PointId(i as u32), *x, *y);
    }
    builder.finish()
}

fn construct_rstar(points: &[(f64, f64)]) -> RTree<GeomWithData<[f64; 2], u32>> {
    RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| GeomWithData::new([*x, *y], i as u32))
            .collect(),
    )
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let points = load_data();

    c.bench_function("construction (kdtree)", |b| {
        b.iter(|| construct_kdtree(&points))
    });

    c.bench_function("construction (rstar bulk)", |b| {
        b.iter(|| construct_rstar(&points))
    });

    let tree = construct_kdtree(&points);
    let rstar_tree = construct_rstar(&points);
    let (qx, qy, r) = (15_000.0, 15_000.0, 2_000.0);

    c.bench_function("within (kdtree)", |b| b.iter(|| tree.within(qx, qy, r)));

    c.bench_function("within (rstar)", |b| {
        b.iter(|| {
            rstar_tree
                .locate_within_distance([qx, qy], r * r)
                .collect::<Vec<_>>()
        })
    });

    c.bench_function("nearest 10 (kdtree)", |b| {
        b.iter(|| tree.nearest(qx, qy, 10))
    });

    c.bench_function("nearest 10 (rstar)", |b| {
        b.iter(|| {
            rstar_tree
                .nearest_neighbor_iter(&[qx, qy])
                .take(10)
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
