use tracing::debug;

use crate::geometry::predicates::orient2d;
use crate::geometry::Site;
use crate::store::PointId;

/// The convex hull of a set of sites.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    /// Hull vertices in counter-clockwise order, starting from the lowest-leftmost site. No
    /// three consecutive vertices are collinear.
    ///
    /// For a degenerate hull these are the distinct input sites: none, one, or the two ends of
    /// the segment the input lies on.
    pub vertices: Vec<Site>,

    /// `true` when the input does not enclose any area (fewer than three distinct sites, or
    /// every site on one line).
    pub degenerate: bool,
}

impl ConvexHull {
    /// Identifiers of the hull vertices, in hull order.
    pub fn ids(&self) -> Vec<PointId> {
        self.vertices.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Enclosed area in square metres. Zero for a degenerate hull.
    pub fn area(&self) -> f64 {
        if self.degenerate {
            return 0.0;
        }
        let n = self.vertices.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice * 0.5
    }

    /// Whether `(x, y)` lies inside the hull or on its boundary.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let p = (x, y);
        match self.vertices.as_slice() {
            [] => false,
            [a] => a.x == x && a.y == y,
            [a, b] if self.degenerate => {
                orient2d((a.x, a.y), (b.x, b.y), p) == 0.0
                    && x >= a.x.min(b.x)
                    && x <= a.x.max(b.x)
                    && y >= a.y.min(b.y)
                    && y <= a.y.max(b.y)
            }
            vertices => {
                let n = vertices.len();
                (0..n).all(|i| {
                    let a = vertices[i];
                    let b = vertices[(i + 1) % n];
                    orient2d((a.x, a.y), (b.x, b.y), p) >= 0.0
                })
            }
        }
    }
}

/// Compute the convex hull of `sites` with Andrew's monotone chain in `O(n log n)`.
///
/// Sites with identical coordinates are collapsed onto the lowest identifier. Fewer than three
/// distinct sites, or sites all on one line, give a hull flagged as
/// [`degenerate`][ConvexHull::degenerate] instead of an error.
pub fn convex_hull(sites: &[Site]) -> ConvexHull {
    let mut sorted = sites.to_vec();
    sorted.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a.id.cmp(&b.id))
    });
    sorted.dedup_by(|later, earlier| later.x == earlier.x && later.y == earlier.y);

    if sorted.len() < 3 {
        debug!(distinct = sorted.len(), "degenerate convex hull");
        return ConvexHull {
            vertices: sorted,
            degenerate: true,
        };
    }

    let xy = |s: &Site| (s.x, s.y);
    let mut hull: Vec<Site> = Vec::with_capacity(2 * sorted.len());

    // lower chain
    for site in &sorted {
        while hull.len() >= 2
            && orient2d(xy(&hull[hull.len() - 2]), xy(&hull[hull.len() - 1]), xy(site)) <= 0.0
        {
            hull.pop();
        }
        hull.push(*site);
    }

    // upper chain
    let lower_len = hull.len() + 1;
    for site in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && orient2d(xy(&hull[hull.len() - 2]), xy(&hull[hull.len() - 1]), xy(site)) <= 0.0
        {
            hull.pop();
        }
        hull.push(*site);
    }

    // the last point repeats the first
    hull.pop();

    let degenerate = hull.len() < 3;
    if degenerate {
        debug!(sites = sites.len(), "collinear input, convex hull is a segment");
    }
    ConvexHull {
        vertices: hull,
        degenerate,
    }
}
