use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_analysis::geometry::{convex_hull, grid_density, triangulate, voronoi, Site};
use geo_analysis::{EngineConfig, PointId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn load_sites(n: usize) -> Vec<Site> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|i| {
            Site::new(
                PointId(i as u32),
                rng.gen_range(0.0..20_000.0),
                rng.gen_range(0.0..20_000.0),
            )
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let config = EngineConfig::default();

    let mut group = c.benchmark_group("delaunay");
    for n in [1_000, 10_000, 50_000] {
        let sites = load_sites(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sites, |b, sites| {
            b.iter(|| triangulate(sites, config.coincident_tolerance_m))
        });
    }
    group.finish();

    let sites = load_sites(5_000);

    c.bench_function("voronoi (5000)", |b| {
        b.iter(|| voronoi(&sites, None, &config))
    });

    c.bench_function("convex hull (5000)", |b| b.iter(|| convex_hull(&sites)));

    c.bench_function("grid density (5000)", |b| {
        b.iter(|| grid_density(&sites, config.density_cell_size_m))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
