//! Voronoi cells as the dual of the Delaunay triangulation.
//!
//! A site's cell is the intersection of the half-planes closer to it than to each of its
//! Delaunay neighbours, so each cell is computed by clipping the bounding box against the
//! perpendicular bisectors of the site's triangulation edges. The Voronoi vertices are the
//! circumcenters of the triangles.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Degeneracy, GeoAnalysisError, Result};
use crate::geometry::delaunay::{merge_coincident, triangulate};
use crate::geometry::polygon::{point_in_polygon, polygon_area};
use crate::geometry::{BBox, Site};
use crate::store::PointId;

/// The Voronoi cell of one site, clipped to the diagram bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    pub site: PointId,

    /// Counter-clockwise open ring of cell vertices. Empty when the site lies so far outside
    /// the bounds that none of its cell remains.
    pub polygon: Vec<(f64, f64)>,

    /// Whether the bounds cut this cell, which is always the case for unbounded cells.
    pub clipped: bool,
}

impl VoronoiCell {
    pub fn area(&self) -> f64 {
        polygon_area(&self.polygon)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        point_in_polygon(x, y, &self.polygon)
    }
}

/// A Voronoi diagram with every cell clipped to `bounds`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiDiagram {
    /// Circumcenters of the underlying Delaunay triangles. Empty when the sites do not span a
    /// triangle.
    pub vertices: Vec<(f64, f64)>,

    /// One cell per input site, in input order. Coincident sites share a cell.
    pub cells: Vec<VoronoiCell>,

    pub bounds: BBox,
}

impl VoronoiDiagram {
    pub fn cell(&self, site: PointId) -> Option<&VoronoiCell> {
        self.cells.iter().find(|c| c.site == site)
    }
}

/// The default clip box: the sites' bounding box grown on every side by `margin_ratio` of its
/// larger side, and by at least one metre.
pub(crate) fn default_bounds(sites: &[Site], margin_ratio: f64) -> Option<BBox> {
    let bbox = BBox::from_sites(sites)?;
    let margin = (bbox.width().max(bbox.height()) * margin_ratio).max(1.0);
    Some(bbox.expand(margin))
}

/// Compute the Voronoi diagram of `sites`, clipped to `clip` or to a box around the sites.
///
/// Sites within `config.coincident_tolerance_m` of each other share a cell. Collinear input
/// yields parallel strips.
///
/// # Errors
///
/// [`GeoAnalysisError::DegenerateInput`] for no sites, and
/// [`GeoAnalysisError::InvalidArgument`] for non-finite sites or a clip box without area.
pub fn voronoi(
    sites: &[Site],
    clip: Option<BBox>,
    config: &EngineConfig,
) -> Result<VoronoiDiagram> {
    if sites.is_empty() {
        return Err(GeoAnalysisError::DegenerateInput {
            reason: Degeneracy::TooFewPoints(0),
            points: vec![],
        });
    }
    if let Some(site) = sites.iter().find(|s| !s.x.is_finite() || !s.y.is_finite()) {
        return Err(GeoAnalysisError::InvalidArgument(format!(
            "site {} has non-finite coordinates",
            site.id
        )));
    }

    let bounds = match clip {
        Some(bounds) => bounds,
        None => default_bounds(sites, config.voronoi_margin_ratio).ok_or_else(|| {
            GeoAnalysisError::InvalidArgument("no sites to bound".to_string())
        })?,
    };
    bounds.validate()?;

    let (distinct, merged) = merge_coincident(sites, config.coincident_tolerance_m);
    let (neighbours, vertices) = dual_neighbours(&distinct)?;

    let cell = |i: usize| {
        let site = distinct[i];
        let polygon = clip_cell(&distinct, i, &neighbours[i], &bounds);
        let clipped = polygon.iter().any(|&(x, y)| {
            x == bounds.min_x || x == bounds.max_x || y == bounds.min_y || y == bounds.max_y
        });
        VoronoiCell {
            site: site.id,
            polygon,
            clipped,
        }
    };

    #[cfg(feature = "rayon")]
    let distinct_cells: Vec<VoronoiCell> = {
        use rayon::prelude::*;
        (0..distinct.len()).into_par_iter().map(cell).collect()
    };

    #[cfg(not(feature = "rayon"))]
    let distinct_cells: Vec<VoronoiCell> = (0..distinct.len()).map(cell).collect();

    // `distinct` is sorted by id; merged sites take their representative's polygon
    let lookup = |id: PointId| {
        let rep = merged
            .binary_search_by_key(&id, |&(m, _)| m)
            .map(|k| merged[k].1)
            .unwrap_or(id);
        distinct
            .binary_search_by_key(&rep, |s| s.id)
            .ok()
            .map(|k| &distinct_cells[k])
    };
    let cells = sites
        .iter()
        .filter_map(|s| {
            lookup(s.id).map(|c| VoronoiCell {
                site: s.id,
                ..c.clone()
            })
        })
        .collect::<Vec<_>>();

    debug!(
        sites = sites.len(),
        vertices = vertices.len(),
        "voronoi diagram complete"
    );

    Ok(VoronoiDiagram {
        vertices,
        cells,
        bounds,
    })
}

/// For every distinct site, the indices of the sites whose bisectors bound its cell, and the
/// Voronoi vertices.
#[allow(clippy::type_complexity)]
fn dual_neighbours(distinct: &[Site]) -> Result<(Vec<Vec<usize>>, Vec<(f64, f64)>)> {
    let n = distinct.len();
    let all_others = |i: usize| (0..n).filter(|&j| j != i).collect::<Vec<_>>();
    if n < 3 {
        return Ok(((0..n).map(all_others).collect(), vec![]));
    }

    match triangulate(distinct, 0.0) {
        Ok(tri) => {
            let mut neighbours = tri.local_neighbors();
            // sites the sweep could not place fall back to every other site
            for id in &tri.skipped {
                if let Ok(i) = distinct.binary_search_by_key(id, |s| s.id) {
                    neighbours[i] = all_others(i);
                }
            }
            Ok((neighbours, tri.circumcenters()))
        }
        Err(GeoAnalysisError::DegenerateInput {
            reason: Degeneracy::Collinear,
            points,
        }) => {
            // neighbours are the adjacent sites along the line
            let mut neighbours = vec![vec![]; n];
            let index: Vec<usize> = points
                .iter()
                .filter_map(|id| distinct.binary_search_by_key(id, |s| s.id).ok())
                .collect();
            for pair in index.windows(2) {
                neighbours[pair[0]].push(pair[1]);
                neighbours[pair[1]].push(pair[0]);
            }
            Ok((neighbours, vec![]))
        }
        Err(err) => Err(err),
    }
}

/// Clip `bounds` to the half-planes closer to `distinct[i]` than to each neighbour
/// (Sutherland-Hodgman).
fn clip_cell(
    distinct: &[Site],
    i: usize,
    neighbours: &[usize],
    bounds: &BBox,
) -> Vec<(f64, f64)> {
    let site = distinct[i];
    let mut polygon: Vec<(f64, f64)> = bounds.corners().to_vec();
    let mut next: Vec<(f64, f64)> = Vec::with_capacity(8);

    for &j in neighbours {
        if polygon.is_empty() {
            break;
        }
        let other = distinct[j];
        let dx = other.x - site.x;
        let dy = other.y - site.y;
        let half = (dx * dx + dy * dy) / 2.0;
        // signed excess over the bisector; inside where <= 0
        let side = |(x, y): (f64, f64)| dx * (x - site.x) + dy * (y - site.y) - half;

        next.clear();
        for k in 0..polygon.len() {
            let cur = polygon[k];
            let nxt = polygon[(k + 1) % polygon.len()];
            let (fc, fn_) = (side(cur), side(nxt));
            let cur_in = fc <= 0.0;
            let nxt_in = fn_ <= 0.0;
            if cur_in != nxt_in {
                let t = fc / (fc - fn_);
                next.push((cur.0 + t * (nxt.0 - cur.0), cur.1 + t * (nxt.1 - cur.1)));
            }
            if nxt_in {
                next.push(nxt);
            }
        }
        std::mem::swap(&mut polygon, &mut next);
    }
    polygon
}
