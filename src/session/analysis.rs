use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{GeoAnalysisError, Result};
use crate::geometry::{
    self, BBox, ConvexHull, DensityGrid, Site, Triangulation, VoronoiDiagram,
};
use crate::kdtree::{KDTree, KDTreeIndex};
use crate::projection::{GeoBounds, LatLon};
use crate::session::report::{BenchmarkReport, DistributionAnalysis, SiteAssignment};
use crate::store::{sample_stride, IngestReport, Point, PointId, PointStore, RawRecord};

/// An analysis session: the point store, its projection and the published spatial index.
///
/// Ingestion takes `&mut self`, so it can never interleave with queries. Queries take `&self`
/// and may run from many threads at once. [`AnalysisSession::build_index`] builds a new tree
/// without holding any lock and then swaps it in, so readers see either the old tree or the new
/// one, never a partial build.
#[derive(Debug)]
pub struct AnalysisSession {
    config: EngineConfig,
    store: PointStore,
    index: RwLock<Option<Arc<KDTree>>>,
}

impl AnalysisSession {
    /// Create a session. The configuration's origin and region apply to every bulk insert.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let config = config.validate()?;
        let store = PointStore::with_options(config.origin, config.region)?;
        Ok(Self {
            config,
            store,
            index: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and append a batch of records to the store.
    ///
    /// A previously built index keeps answering over the points it was built from until
    /// [`AnalysisSession::build_index`] is called again.
    pub fn bulk_insert(&mut self, records: impl IntoIterator<Item = RawRecord>) -> IngestReport {
        let report = self.store.bulk_insert(records);
        if report.accepted > 0 && self.index.read().is_some() {
            debug!("index is stale until the next build");
        }
        report
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn point(&self, id: PointId) -> Result<&Point> {
        self.store.get(id)
    }

    /// Build a k-d tree over the current store and publish it, replacing any previous index.
    pub fn build_index(&self) -> Arc<KDTree> {
        let start = Instant::now();
        let tree = Arc::new(KDTree::from_points(
            self.store.points(),
            self.config.node_size,
        ));
        *self.index.write() = Some(Arc::clone(&tree));
        info!(
            "Built k-d tree over {} points in {:?}",
            tree.num_items(),
            start.elapsed()
        );
        tree
    }

    /// The published index.
    pub fn index(&self) -> Result<Arc<KDTree>> {
        self.index.read().clone().ok_or(GeoAnalysisError::IndexNotBuilt)
    }

    /// The published index and the projected query center, or `None` when queries have nothing
    /// to search.
    fn prepare(&self, center: LatLon) -> Result<Option<(Arc<KDTree>, (f64, f64))>> {
        let center = center.validate()?;
        let tree = match self.index() {
            Ok(tree) => tree,
            Err(GeoAnalysisError::IndexNotBuilt) => {
                debug!("query before the index was built, returning no results");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let Some(projector) = self.store.projector() else {
            return Ok(None);
        };
        Ok(Some((tree, projector.project_unchecked(center))))
    }

    /// All points within `radius_km` of `center` (inclusive), by ascending identifier.
    ///
    /// Equivalent to `ST_DWithin`. Returns an empty result before the index is built.
    pub fn radius_query(&self, center: LatLon, radius_km: f64) -> Result<Vec<PointId>> {
        check_radius(radius_km)?;
        let Some((tree, (x, y))) = self.prepare(center)? else {
            return Ok(vec![]);
        };
        // Search a hair wider in metres, then decide membership on the same kilometre value
        // `k_nearest` reports, so a neighbor's own distance always includes it.
        let search_m = radius_km * 1000.0 * (1.0 + 1e-9);
        let mut ids: Vec<PointId> = tree
            .within_neighbors(x, y, search_m)
            .into_iter()
            .filter(|n| n.distance / 1000.0 <= radius_km)
            .map(|n| n.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// The `k` points nearest to `center` with their distances in kilometres, nearest first.
    /// Equal distances are ordered by identifier.
    pub fn k_nearest(&self, center: LatLon, k: usize) -> Result<Vec<(PointId, f64)>> {
        check_k(k)?;
        let Some((tree, (x, y))) = self.prepare(center)? else {
            return Ok(vec![]);
        };
        Ok(to_km(tree.nearest(x, y, k)))
    }

    /// [`AnalysisSession::k_nearest`] for many centers at once, in input order.
    ///
    /// Every center is validated before any search runs.
    pub fn k_nearest_batch(
        &self,
        centers: &[LatLon],
        k: usize,
    ) -> Result<Vec<Vec<(PointId, f64)>>> {
        check_k(k)?;
        for center in centers {
            center.validate()?;
        }
        let (tree, projector) = match (self.index(), self.store.projector()) {
            (Ok(tree), Some(projector)) => (tree, *projector),
            _ => {
                debug!("batch query before the index was built, returning no results");
                return Ok(vec![vec![]; centers.len()]);
            }
        };

        let search = |center: &LatLon| {
            let (x, y) = projector.project_unchecked(*center);
            to_km(tree.nearest(x, y, k))
        };

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            Ok(centers.par_iter().map(search).collect())
        }

        #[cfg(not(feature = "rayon"))]
        {
            Ok(centers.iter().map(search).collect())
        }
    }

    /// Assign every location to its nearest stored point and summarise the distances per point.
    pub fn assign_to_sites(&self, locations: &[LatLon]) -> Result<SiteAssignment> {
        let nearest = self.k_nearest_batch(locations, 1)?;
        let assignments = nearest.into_iter().map(|n| n.first().copied()).collect();
        Ok(SiteAssignment::from_assignments(assignments))
    }

    /// Planar sites of the stored points, optionally restricted to a region.
    pub fn sites(&self, bounds: Option<GeoBounds>) -> Result<Vec<Site>> {
        match bounds {
            None => Ok(self.store.sites()),
            Some(bounds) => {
                let bounds = bounds.validate()?;
                Ok(self
                    .store
                    .filter_by_bounding_box(bounds)
                    .map(Point::site)
                    .collect())
            }
        }
    }

    /// Delaunay triangulation of the stored points (or those inside `bounds`).
    pub fn triangulate(&self, bounds: Option<GeoBounds>) -> Result<Triangulation> {
        geometry::triangulate(&self.sites(bounds)?, self.config.coincident_tolerance_m)
    }

    pub fn convex_hull(&self, bounds: Option<GeoBounds>) -> Result<ConvexHull> {
        Ok(geometry::convex_hull(&self.sites(bounds)?))
    }

    /// Voronoi diagram of the stored points, clipped to `clip` (in projected metres) or to the
    /// configured margin around the points.
    pub fn voronoi(&self, bounds: Option<GeoBounds>, clip: Option<BBox>) -> Result<VoronoiDiagram> {
        geometry::voronoi(&self.sites(bounds)?, clip, &self.config)
    }

    /// Grid density with `cell_size_m` cells, or the configured default cell size.
    pub fn density_grid(
        &self,
        bounds: Option<GeoBounds>,
        cell_size_m: Option<f64>,
    ) -> Result<DensityGrid> {
        let cell_size = cell_size_m.unwrap_or(self.config.density_cell_size_m);
        geometry::grid_density(&self.sites(bounds)?, cell_size)
    }

    /// For every point, the number of other points within `radius_km`.
    pub fn kernel_density(
        &self,
        bounds: Option<GeoBounds>,
        radius_km: f64,
    ) -> Result<Vec<(PointId, usize)>> {
        check_radius(radius_km)?;
        geometry::kernel_density(&self.sites(bounds)?, radius_km * 1000.0)
    }

    /// Triangulate, hull, Voronoi-partition and grid a deterministic sample of at most
    /// `analysis_sample_size` points, and time the whole pass.
    ///
    /// A sample that cannot be triangulated is reported through
    /// [`DistributionAnalysis::degeneracy`] rather than as an error.
    ///
    /// # Errors
    ///
    /// [`GeoAnalysisError::DegenerateInput`] when there are no points to analyse.
    pub fn analyze_distribution(&self, bounds: Option<GeoBounds>) -> Result<DistributionAnalysis> {
        let start = Instant::now();
        let eligible = self.sites(bounds)?;
        let sample: Vec<Site> = sample_stride(&eligible, self.config.analysis_sample_size)
            .into_iter()
            .copied()
            .collect();
        if sample.len() < eligible.len() {
            info!(
                "Using a sample of {} of {} points for analysis",
                sample.len(),
                eligible.len()
            );
        }

        let (triangles, degeneracy) =
            match geometry::triangulate(&sample, self.config.coincident_tolerance_m) {
                Ok(tri) => (tri.len(), None),
                Err(GeoAnalysisError::DegenerateInput { reason, .. }) => (0, Some(reason)),
                Err(err) => return Err(err),
            };
        let hull = geometry::convex_hull(&sample);
        let voronoi = geometry::voronoi(&sample, None, &self.config)?;
        let density = geometry::grid_density(&sample, self.config.density_cell_size_m)?;

        let voronoi_cells = voronoi.cells.len();
        let mean_cell_area_km2 = voronoi.cells.iter().map(|c| c.area()).sum::<f64>()
            / voronoi_cells.max(1) as f64
            / 1e6;

        let elapsed = start.elapsed();
        let secs = elapsed.as_secs_f64();
        let points_per_second = if secs > 0.0 {
            sample.len() as f64 / secs
        } else {
            f64::INFINITY
        };
        info!(
            "Analysed {} points in {:?}: {} triangles, {} hull vertices",
            sample.len(),
            elapsed,
            triangles,
            hull.len()
        );

        Ok(DistributionAnalysis {
            total_points: eligible.len(),
            points_analyzed: sample.len(),
            triangles,
            degeneracy,
            hull_area_km2: hull.area() / 1e6,
            hull,
            voronoi_cells,
            mean_cell_area_km2,
            density,
            elapsed,
            points_per_second,
        })
    }

    /// Rebuild the index, then time one radius query around `center` and a batch of `k`-nearest
    /// queries centered on the first `queries` stored points.
    pub fn benchmark(
        &self,
        center: LatLon,
        radius_km: f64,
        queries: usize,
        k: usize,
    ) -> Result<Vec<BenchmarkReport>> {
        check_radius(radius_km)?;
        check_k(k)?;
        center.validate()?;
        let point_count = self.store.len();

        let start = Instant::now();
        let tree = self.build_index();
        let build = BenchmarkReport::new(
            "build_index",
            point_count,
            point_count,
            tree.num_items(),
            start.elapsed(),
        );

        let start = Instant::now();
        let found = self.radius_query(center, radius_km)?;
        let radius = BenchmarkReport::new(
            "radius_query",
            point_count,
            1,
            found.len(),
            start.elapsed(),
        );

        let centers: Vec<LatLon> = self.store.iter().take(queries).map(Point::coord).collect();
        let start = Instant::now();
        let neighbours = self.k_nearest_batch(&centers, k)?;
        let nearest = BenchmarkReport::new(
            "k_nearest_batch",
            point_count,
            centers.len(),
            neighbours.iter().map(Vec::len).sum(),
            start.elapsed(),
        );

        Ok(vec![build, radius, nearest])
    }
}

fn check_radius(radius_km: f64) -> Result<()> {
    if radius_km.is_nan() || radius_km < 0.0 {
        return Err(GeoAnalysisError::InvalidArgument(format!(
            "radius must be a non-negative number of kilometres, got {}",
            radius_km
        )));
    }
    Ok(())
}

fn check_k(k: usize) -> Result<()> {
    if k < 1 {
        return Err(GeoAnalysisError::InvalidArgument(
            "k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Distances in kilometres. `radius_query` compares against this same quotient.
fn to_km(neighbors: Vec<crate::kdtree::Neighbor>) -> Vec<(PointId, f64)> {
    neighbors
        .into_iter()
        .map(|n| (n.id, n.distance / 1000.0))
        .collect()
}
