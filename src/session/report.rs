use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::error::Degeneracy;
use crate::geometry::{ConvexHull, DensityGrid};
use crate::store::PointId;

/// Timing of one measured operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub operation: String,
    /// Number of points in the store when the operation ran.
    pub point_count: usize,
    /// Units of work the operation performed (points indexed or queries answered).
    pub items: usize,
    /// Total number of results returned.
    pub results: usize,
    pub elapsed: Duration,
    /// `items` per second. Infinite if the clock did not advance.
    pub throughput: f64,
}

impl BenchmarkReport {
    pub(crate) fn new(
        operation: &str,
        point_count: usize,
        items: usize,
        results: usize,
        elapsed: Duration,
    ) -> Self {
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            items as f64 / secs
        } else {
            f64::INFINITY
        };
        tracing::info!(
            operation,
            point_count,
            items,
            results,
            elapsed_ms = secs * 1000.0,
            throughput,
            "benchmark"
        );
        Self {
            operation: operation.to_string(),
            point_count,
            items,
            results,
            elapsed,
            throughput,
        }
    }
}

/// Distance statistics for the locations assigned to one site.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SiteStats {
    pub count: usize,
    pub mean_distance_km: f64,
    pub max_distance_km: f64,
}

/// Result of assigning locations to their nearest stored point.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SiteAssignment {
    /// For each location, in input order, the nearest point and its distance in km. `None`
    /// when there was nothing to assign to.
    pub assignments: Vec<Option<(PointId, f64)>>,
    /// Statistics per point that received at least one location.
    pub per_site: BTreeMap<PointId, SiteStats>,
}

impl SiteAssignment {
    pub(crate) fn from_assignments(assignments: Vec<Option<(PointId, f64)>>) -> Self {
        let mut per_site: BTreeMap<PointId, SiteStats> = BTreeMap::new();
        for (id, distance) in assignments.iter().flatten() {
            let stats = per_site.entry(*id).or_default();
            stats.count += 1;
            // running sum, divided below
            stats.mean_distance_km += distance;
            stats.max_distance_km = stats.max_distance_km.max(*distance);
        }
        for stats in per_site.values_mut() {
            stats.mean_distance_km /= stats.count as f64;
        }
        Self {
            assignments,
            per_site,
        }
    }

    /// Number of locations that were assigned a site.
    pub fn assigned(&self) -> usize {
        self.assignments.iter().flatten().count()
    }

    /// The site that received the most locations, lowest identifier first on ties.
    pub fn busiest(&self) -> Option<(PointId, SiteStats)> {
        self.per_site
            .iter()
            .max_by(|a, b| a.1.count.cmp(&b.1.count).then(b.0.cmp(a.0)))
            .map(|(id, stats)| (*id, *stats))
    }
}

/// Combined triangulation, hull, Voronoi and density summary of a sample of points.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionAnalysis {
    /// Points eligible for analysis (the whole store or those inside the requested bounds).
    pub total_points: usize,
    /// Points actually analysed after sampling.
    pub points_analyzed: usize,
    /// Number of Delaunay triangles; zero when the sample is degenerate.
    pub triangles: usize,
    /// Why the sample could not be triangulated, if it could not.
    pub degeneracy: Option<Degeneracy>,
    pub hull: ConvexHull,
    pub hull_area_km2: f64,
    pub voronoi_cells: usize,
    /// Mean clipped Voronoi cell area.
    pub mean_cell_area_km2: f64,
    pub density: DensityGrid,
    pub elapsed: Duration,
    pub points_per_second: f64,
}
