//! Delaunay triangulation by sweep-hull insertion with edge flipping.
//!
//! Points are inserted in order of distance from the circumcenter of a seed triangle. Each new
//! point lies outside the current convex hull, so it is connected to every hull edge it can
//! see, and the new edges are then made locally Delaunay by flipping. Triangles are stored in a
//! half-edge structure: triangle `t` owns half-edges `3t`, `3t + 1`, `3t + 2`, and
//! `halfedges[e]` is the opposite half-edge in the adjacent triangle (or [`EMPTY`] on the
//! hull).

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{Degeneracy, GeoAnalysisError, Result};
use crate::geometry::predicates::{circumcenter, circumradius_sq, incircle, orient2d};
use crate::geometry::Site;
use crate::store::PointId;

const EMPTY: usize = usize::MAX;

/// A Delaunay triangulation of a set of sites.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    /// Triangles as counter-clockwise triples of site identifiers. No input site lies strictly
    /// inside the circumcircle of any triangle.
    pub triangles: Vec<[PointId; 3]>,

    /// Boundary vertices of the triangulation in counter-clockwise order. Unlike
    /// [`ConvexHull`][crate::geometry::ConvexHull] this may include sites lying on a straight
    /// stretch of the boundary.
    pub hull: Vec<PointId>,

    /// `(merged, representative)` pairs for sites that fell within the coincidence tolerance of
    /// a site with a lower identifier. Merged sites appear in no triangle.
    pub merged: Vec<(PointId, PointId)>,

    /// Sites that could not be inserted because their position relative to the hull could not
    /// be decided in floating point. This is empty for all but pathological input.
    pub skipped: Vec<PointId>,

    /// The distinct sites, indexed by the local vertex numbers in `corners`.
    sites: Vec<Site>,

    /// Flat local vertex triples, parallel to `triangles`.
    corners: Vec<usize>,
}

impl Triangulation {
    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The distinct sites the triangulation was built over (merged sites excluded).
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Planar coordinates of the corners of triangle `t`.
    pub fn triangle_coords(&self, t: usize) -> [(f64, f64); 3] {
        let xy = |k: usize| {
            let s = self.sites[self.corners[3 * t + k]];
            (s.x, s.y)
        };
        [xy(0), xy(1), xy(2)]
    }

    /// For every distinct site, the sites it shares a triangle edge with, ascending.
    pub fn neighbors(&self) -> BTreeMap<PointId, Vec<PointId>> {
        self.local_neighbors()
            .into_iter()
            .enumerate()
            .map(|(i, adjacent)| {
                let ids = adjacent.into_iter().map(|j| self.sites[j].id).collect();
                (self.sites[i].id, ids)
            })
            .collect()
    }

    /// Adjacency over local vertex numbers, each list sorted ascending.
    pub(crate) fn local_neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacent: Vec<Vec<usize>> = vec![vec![]; self.sites.len()];
        for tri in self.corners.chunks_exact(3) {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                adjacent[a].push(b);
                adjacent[b].push(a);
            }
        }
        for list in adjacent.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }
        adjacent
    }

    /// Circumcenter of every triangle, parallel to [`Triangulation::triangles`].
    pub fn circumcenters(&self) -> Vec<(f64, f64)> {
        let center = |t: usize| {
            let [a, b, c] = self.triangle_coords(t);
            // every stored triangle has a certain positive orientation
            circumcenter(a, b, c).unwrap_or(a)
        };

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            (0..self.len()).into_par_iter().map(center).collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            (0..self.len()).map(center).collect()
        }
    }
}

/// Compute the Delaunay triangulation of `sites`.
///
/// Sites closer than `tolerance` metres on both axes to a site with a lower identifier are
/// merged into it first and reported in [`Triangulation::merged`].
///
/// # Errors
///
/// - [`GeoAnalysisError::InvalidArgument`] for non-finite coordinates or a negative tolerance.
/// - [`GeoAnalysisError::DegenerateInput`] when there are fewer than three sites
///   ([`Degeneracy::TooFewPoints`]), fewer than three distinct positions
///   ([`Degeneracy::Coincident`]), or every site lies on one line ([`Degeneracy::Collinear`],
///   with the distinct sites in order along that line).
pub fn triangulate(sites: &[Site], tolerance: f64) -> Result<Triangulation> {
    if tolerance.is_nan() || tolerance < 0.0 {
        return Err(GeoAnalysisError::InvalidArgument(format!(
            "coincidence tolerance must be non-negative, got {}",
            tolerance
        )));
    }
    if let Some(site) = sites.iter().find(|s| !s.x.is_finite() || !s.y.is_finite()) {
        return Err(GeoAnalysisError::InvalidArgument(format!(
            "site {} has non-finite coordinates",
            site.id
        )));
    }

    if sites.len() < 3 {
        let mut ids: Vec<PointId> = sites.iter().map(|s| s.id).collect();
        ids.sort();
        warn!(sites = sites.len(), "too few sites to triangulate");
        return Err(GeoAnalysisError::DegenerateInput {
            reason: Degeneracy::TooFewPoints(sites.len()),
            points: ids,
        });
    }

    let (distinct, merged) = merge_coincident(sites, tolerance);
    if !merged.is_empty() {
        debug!(
            merged = merged.len(),
            tolerance, "merged coincident sites before triangulation"
        );
    }
    if distinct.len() < 3 {
        warn!(
            sites = sites.len(),
            distinct = distinct.len(),
            "too few distinct sites to triangulate"
        );
        return Err(GeoAnalysisError::DegenerateInput {
            reason: Degeneracy::Coincident,
            points: distinct.iter().map(|s| s.id).collect(),
        });
    }

    let coords: Vec<(f64, f64)> = distinct.iter().map(|s| (s.x, s.y)).collect();
    let Some((seed, center)) = find_seed(&coords) else {
        let mut along = distinct;
        along.sort_by(|a, b| {
            a.x.total_cmp(&b.x)
                .then(a.y.total_cmp(&b.y))
                .then(a.id.cmp(&b.id))
        });
        warn!(sites = sites.len(), "collinear sites, no triangulation");
        return Err(GeoAnalysisError::DegenerateInput {
            reason: Degeneracy::Collinear,
            points: along.iter().map(|s| s.id).collect(),
        });
    };

    let mut sweep = Sweep::new(&coords, seed, center);

    // insertion order: distance from the seed circumcenter, then index
    let dists: Vec<f64> = coords
        .iter()
        .map(|&(x, y)| (x - center.0).powi(2) + (y - center.1).powi(2))
        .collect();
    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by(|&a, &b| dists[a].total_cmp(&dists[b]).then(a.cmp(&b)));

    let skipped_local = sweep.insert_all(&order, seed);
    let skipped: Vec<PointId> = skipped_local.iter().map(|&i| distinct[i].id).collect();
    if !skipped.is_empty() {
        debug!(skipped = skipped.len(), "sites left out of the triangulation");
    }

    let hull = sweep.hull().into_iter().map(|i| distinct[i].id).collect();
    let triangles = sweep
        .triangles
        .chunks_exact(3)
        .map(|t| [distinct[t[0]].id, distinct[t[1]].id, distinct[t[2]].id])
        .collect::<Vec<_>>();

    debug!(
        sites = sites.len(),
        triangles = triangles.len(),
        "triangulation complete"
    );

    Ok(Triangulation {
        triangles,
        hull,
        merged,
        skipped,
        sites: distinct,
        corners: sweep.triangles,
    })
}

/// Collapse sites within `tolerance` of each other on both axes. Each group keeps its lowest
/// identifier; the result is sorted by identifier.
pub(crate) fn merge_coincident(sites: &[Site], tolerance: f64) -> (Vec<Site>, Vec<(PointId, PointId)>) {
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&sites[a], &sites[b]);
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a.id.cmp(&b.id))
    });

    // group leaders in ascending x, and the members of each group
    let mut leaders: Vec<usize> = vec![];
    let mut groups: Vec<Vec<usize>> = vec![];
    for &i in &order {
        let site = &sites[i];
        let mut found = None;
        for (g, &leader) in leaders.iter().enumerate().rev() {
            let leader = &sites[leader];
            if site.x - leader.x > tolerance {
                break;
            }
            if (site.y - leader.y).abs() <= tolerance {
                found = Some(g);
                break;
            }
        }
        match found {
            Some(g) => groups[g].push(i),
            None => {
                leaders.push(i);
                groups.push(vec![i]);
            }
        }
    }

    let mut distinct = Vec::with_capacity(groups.len());
    let mut merged = vec![];
    for group in groups {
        let Some(&keep) = group.iter().min_by_key(|&&i| sites[i].id) else {
            continue;
        };
        distinct.push(sites[keep]);
        for &i in &group {
            if i != keep {
                merged.push((sites[i].id, sites[keep].id));
            }
        }
    }
    distinct.sort_by_key(|s| s.id);
    merged.sort();
    (distinct, merged)
}

/// Pick a seed triangle with a small circumcircle near the middle of the input, oriented
/// counter-clockwise, together with its circumcenter. `None` if every point is collinear.
fn find_seed(coords: &[(f64, f64)]) -> Option<([usize; 3], (f64, f64))> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in coords {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let mid = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    let sq = |a: (f64, f64), b: (f64, f64)| (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2);
    let argmin = |skip: &[usize], key: &dyn Fn(usize) -> f64| {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..coords.len() {
            if skip.contains(&i) {
                continue;
            }
            let d = key(i);
            if best.map_or(true, |(_, b)| d < b) {
                best = Some((i, d));
            }
        }
        best
    };

    let (i0, _) = argmin(&[], &|i| sq(mid, coords[i]))?;
    let (i1, _) = argmin(&[i0], &|i| sq(coords[i0], coords[i]))?;
    let (mut i2, radius) = argmin(&[i0, i1], &|i| {
        circumradius_sq(coords[i0], coords[i1], coords[i])
    })?;
    if radius.is_infinite() {
        return None;
    }

    let mut i1 = i1;
    if orient2d(coords[i0], coords[i1], coords[i2]) < 0.0 {
        std::mem::swap(&mut i1, &mut i2);
    }
    let center = circumcenter(coords[i0], coords[i1], coords[i2])?;
    Some(([i0, i1, i2], center))
}

/// Monotone map from direction to `[0, 1)`, cheaper than `atan2`.
#[inline]
fn pseudo_angle(dx: f64, dy: f64) -> f64 {
    let p = dx / (dx.abs() + dy.abs());
    if dy > 0.0 {
        (3.0 - p) / 4.0
    } else {
        (1.0 + p) / 4.0
    }
}

/// Working state of the sweep.
struct Sweep<'a> {
    coords: &'a [(f64, f64)],
    triangles: Vec<usize>,
    halfedges: Vec<usize>,

    // the advancing convex hull, as a circular doubly linked list over point indices; a removed
    // vertex has `hull_next[i] == i`
    hull_prev: Vec<usize>,
    hull_next: Vec<usize>,
    // half-edge of the hull edge leaving each hull vertex
    hull_tri: Vec<usize>,
    hull_hash: Vec<usize>,
    hull_start: usize,

    center: (f64, f64),
    edge_stack: Vec<usize>,
}

impl<'a> Sweep<'a> {
    fn new(coords: &'a [(f64, f64)], seed: [usize; 3], center: (f64, f64)) -> Self {
        let n = coords.len();
        let max_triangles = 2 * n - 5;
        let hash_size = (n as f64).sqrt().ceil().max(1.0) as usize;
        let [i0, i1, i2] = seed;

        let mut sweep = Self {
            coords,
            triangles: Vec::with_capacity(3 * max_triangles),
            halfedges: Vec::with_capacity(3 * max_triangles),
            hull_prev: vec![EMPTY; n],
            hull_next: vec![EMPTY; n],
            hull_tri: vec![EMPTY; n],
            hull_hash: vec![EMPTY; hash_size],
            hull_start: i0,
            center,
            edge_stack: Vec::with_capacity(64),
        };

        sweep.hull_next[i0] = i1;
        sweep.hull_prev[i2] = i1;
        sweep.hull_next[i1] = i2;
        sweep.hull_prev[i0] = i2;
        sweep.hull_next[i2] = i0;
        sweep.hull_prev[i1] = i0;

        sweep.hull_tri[i0] = 0;
        sweep.hull_tri[i1] = 1;
        sweep.hull_tri[i2] = 2;

        for i in seed {
            let key = sweep.hash_key(coords[i]);
            sweep.hull_hash[key] = i;
        }

        sweep.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);
        sweep
    }

    fn hash_key(&self, p: (f64, f64)) -> usize {
        let len = self.hull_hash.len();
        let angle = pseudo_angle(p.0 - self.center.0, p.1 - self.center.1);
        // a NaN angle (p at the center) saturates to 0
        ((angle * len as f64).floor() as usize) % len
    }

    /// Whether the hull edge `a -> b` is visible from `p`, i.e. `p` is strictly to its right.
    #[inline]
    fn visible(&self, a: usize, b: usize, p: (f64, f64)) -> bool {
        orient2d(self.coords[a], self.coords[b], p) < 0.0
    }

    /// Insert every point of `order` except the seed; returns the points that were skipped.
    fn insert_all(&mut self, order: &[usize], seed: [usize; 3]) -> Vec<usize> {
        let mut skipped = vec![];
        for &i in order {
            if seed.contains(&i) {
                continue;
            }
            if !self.insert(i) {
                skipped.push(i);
            }
        }
        skipped
    }

    fn insert(&mut self, i: usize) -> bool {
        let p = self.coords[i];

        // find a visible edge on the hull, starting near p's direction
        let len = self.hull_hash.len();
        let key = self.hash_key(p);
        let mut start = EMPTY;
        for j in 0..len {
            let candidate = self.hull_hash[(key + j) % len];
            if candidate != EMPTY && candidate != self.hull_next[candidate] {
                start = candidate;
                break;
            }
        }
        if start == EMPTY {
            start = self.hull_start;
        }
        start = self.hull_prev[start];

        let mut e = start;
        while !self.visible(e, self.hull_next[e], p) {
            e = self.hull_next[e];
            if e == start {
                return false;
            }
        }

        // connect p to the first visible edge
        let t = self.add_triangle(e, i, self.hull_next[e], EMPTY, EMPTY, self.hull_tri[e]);
        self.hull_tri[i] = self.legalize(t + 2);
        self.hull_tri[e] = t;

        // walk forward through the hull
        let mut n = self.hull_next[e];
        loop {
            let q = self.hull_next[n];
            if !self.visible(n, q, p) {
                break;
            }
            let t = self.add_triangle(n, i, q, self.hull_tri[i], EMPTY, self.hull_tri[n]);
            self.hull_tri[i] = self.legalize(t + 2);
            self.hull_next[n] = n;
            n = q;
        }

        // walk backward from the other side
        if e == start {
            loop {
                let q = self.hull_prev[e];
                if !self.visible(q, e, p) {
                    break;
                }
                let t = self.add_triangle(q, i, e, EMPTY, self.hull_tri[e], self.hull_tri[q]);
                self.legalize(t + 2);
                self.hull_tri[q] = t;
                self.hull_next[e] = e;
                e = q;
            }
        }

        self.hull_start = e;
        self.hull_prev[i] = e;
        self.hull_next[e] = i;
        self.hull_prev[n] = i;
        self.hull_next[i] = n;

        let key = self.hash_key(p);
        self.hull_hash[key] = i;
        let key = self.hash_key(self.coords[e]);
        self.hull_hash[key] = e;
        true
    }

    fn add_triangle(
        &mut self,
        i0: usize,
        i1: usize,
        i2: usize,
        a: usize,
        b: usize,
        c: usize,
    ) -> usize {
        let t = self.triangles.len();
        self.triangles.extend([i0, i1, i2]);
        self.halfedges.extend([EMPTY; 3]);
        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);
        t
    }

    #[inline]
    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a] = b;
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// Flip edges until every edge reachable from `a` satisfies the empty-circle condition.
    /// Returns the half-edge that ends up opposite `a`'s starting corner.
    fn legalize(&mut self, mut a: usize) -> usize {
        let mut ar;
        loop {
            let b = self.halfedges[a];
            let a0 = a - a % 3;
            ar = a0 + (a + 2) % 3;

            if b == EMPTY {
                match self.edge_stack.pop() {
                    Some(next) => {
                        a = next;
                        continue;
                    }
                    None => break,
                }
            }

            let b0 = b - b % 3;
            let al = a0 + (a + 1) % 3;
            let bl = b0 + (b + 2) % 3;

            let p0 = self.triangles[ar];
            let pr = self.triangles[a];
            let pl = self.triangles[al];
            let p1 = self.triangles[bl];

            // only flip when p1 is certainly inside; cocircular quads keep their diagonal
            let illegal = incircle(
                self.coords[p0],
                self.coords[pr],
                self.coords[pl],
                self.coords[p1],
            ) > 0.0;

            if illegal {
                self.triangles[a] = p1;
                self.triangles[b] = p0;

                let hbl = self.halfedges[bl];

                // the flipped edge was on the hull: repoint the hull at its new half-edge
                if hbl == EMPTY {
                    let mut e = self.hull_start;
                    loop {
                        if self.hull_tri[e] == bl {
                            self.hull_tri[e] = a;
                            break;
                        }
                        e = self.hull_prev[e];
                        if e == self.hull_start {
                            break;
                        }
                    }
                }

                self.link(a, hbl);
                let har = self.halfedges[ar];
                self.link(b, har);
                self.link(ar, bl);

                let br = b0 + (b + 1) % 3;
                self.edge_stack.push(br);
            } else {
                match self.edge_stack.pop() {
                    Some(next) => a = next,
                    None => break,
                }
            }
        }
        ar
    }

    /// Hull vertices, counter-clockwise from the last insertion point.
    fn hull(&self) -> Vec<usize> {
        let mut hull = vec![];
        let mut e = self.hull_start;
        loop {
            hull.push(e);
            e = self.hull_next[e];
            if e == self.hull_start || hull.len() > self.coords.len() {
                break;
            }
        }
        hull
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::convex_hull;
    use crate::test::{clustered_points, collinear_points, sites_from_xy, uniform_points};

    fn assert_delaunay(tri: &Triangulation) {
        let sites = tri.sites();
        for t in 0..tri.len() {
            let [a, b, c] = tri.triangle_coords(t);
            assert!(orient2d(a, b, c) > 0.0, "triangle {} is not counter-clockwise", t);
            for s in sites {
                assert!(
                    incircle(a, b, c, (s.x, s.y)) <= 0.0,
                    "site {} inside circumcircle of triangle {}",
                    s.id,
                    t
                );
            }
        }
    }

    fn assert_covers_hull(tri: &Triangulation) {
        let area: f64 = (0..tri.len())
            .map(|t| signed_area(tri.triangle_coords(t)))
            .sum();
        let hull = convex_hull(tri.sites());
        assert!(
            (area - hull.area()).abs() <= 1e-9 * hull.area(),
            "triangles cover {} but hull area is {}",
            area,
            hull.area()
        );
    }

    fn signed_area([a, b, c]: [(f64, f64); 3]) -> f64 {
        ((b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)) / 2.0
    }

    #[test]
    fn single_triangle() {
        let sites = sites_from_xy(&[(0., 0.), (0., 1.), (1., 0.)]);
        let tri = triangulate(&sites, 0.0).unwrap();
        assert_eq!(tri.len(), 1);
        assert_delaunay(&tri);
        assert_eq!(tri.hull.len(), 3);
    }

    #[test]
    fn square_has_two_triangles() {
        // cocircular corners: either diagonal is valid, but the result must be consistent
        let sites = sites_from_xy(&[(0., 0.), (1., 0.), (1., 1.), (0., 1.)]);
        let tri = triangulate(&sites, 0.0).unwrap();
        assert_eq!(tri.len(), 2);
        assert_delaunay(&tri);
        assert_covers_hull(&tri);
        assert_eq!(triangulate(&sites, 0.0).unwrap(), tri);
    }

    #[test]
    fn random_inputs_are_delaunay() {
        for (points, n) in [
            (uniform_points(400, 3), 400),
            (clustered_points(400, 4), 400),
            (uniform_points(10, 5), 10),
        ] {
            let sites = sites_from_xy(&points);
            let tri = triangulate(&sites, 1e-6).unwrap();
            assert_delaunay(&tri);
            assert_covers_hull(&tri);
            assert!(tri.skipped.is_empty());

            // every input site is a vertex or was merged into one
            let distinct = tri.sites().len();
            assert_eq!(distinct + tri.merged.len(), n);

            // Euler: 2n - 2 - h triangles for n vertices with h on the boundary
            assert_eq!(tri.len(), 2 * distinct - 2 - tri.hull.len());
        }
    }

    #[test]
    fn grid_input() {
        // many cocircular quadruples and collinear boundary points
        let mut points = vec![];
        for i in 0..12 {
            for j in 0..9 {
                points.push((i as f64 * 10.0, j as f64 * 10.0));
            }
        }
        let tri = triangulate(&sites_from_xy(&points), 0.0).unwrap();
        assert_delaunay(&tri);
        assert_covers_hull(&tri);
        assert_eq!(tri.len(), 2 * 11 * 8);
        assert!(tri.skipped.is_empty());
    }

    #[test]
    fn coincident_sites_are_merged() {
        let sites = sites_from_xy(&[
            (0., 0.),
            (100., 0.),
            (0., 100.),
            (100., 0.),
            (100.0 + 1e-9, 1e-9),
            (50., 50.5),
        ]);
        let tri = triangulate(&sites, 1e-6).unwrap();
        assert_eq!(
            tri.merged,
            vec![(PointId(3), PointId(1)), (PointId(4), PointId(1))]
        );
        assert_eq!(tri.sites().len(), 4);
        assert_delaunay(&tri);
        for t in &tri.triangles {
            assert!(!t.contains(&PointId(3)) && !t.contains(&PointId(4)));
        }
    }

    #[test]
    fn degenerate_inputs() {
        let err = triangulate(&sites_from_xy(&[(0., 0.), (1., 1.)]), 0.0).unwrap_err();
        assert_eq!(
            err,
            GeoAnalysisError::DegenerateInput {
                reason: Degeneracy::TooFewPoints(2),
                points: vec![PointId(0), PointId(1)],
            }
        );

        let err = triangulate(&sites_from_xy(&[(5., 5.), (5., 5.), (0., 0.)]), 0.0).unwrap_err();
        assert_eq!(
            err,
            GeoAnalysisError::DegenerateInput {
                reason: Degeneracy::Coincident,
                points: vec![PointId(0), PointId(2)],
            }
        );

        let err = triangulate(&sites_from_xy(&[(2., 2.), (0., 0.), (1., 1.), (3., 3.)]), 0.0)
            .unwrap_err();
        assert_eq!(
            err,
            GeoAnalysisError::DegenerateInput {
                reason: Degeneracy::Collinear,
                points: vec![PointId(1), PointId(2), PointId(0), PointId(3)],
            }
        );

        let points = collinear_points(200, 6);
        match triangulate(&sites_from_xy(&points), 0.0) {
            Err(GeoAnalysisError::DegenerateInput {
                reason: Degeneracy::Collinear,
                ..
            }) => {}
            other => panic!("expected collinear input, got {:?}", other),
        }
    }

    #[test]
    fn invalid_arguments() {
        let sites = sites_from_xy(&[(0., 0.), (1., 0.), (f64::NAN, 1.)]);
        assert!(matches!(
            triangulate(&sites, 0.0),
            Err(GeoAnalysisError::InvalidArgument(_))
        ));
        let sites = sites_from_xy(&[(0., 0.), (1., 0.), (0., 1.)]);
        assert!(matches!(
            triangulate(&sites, -1.0),
            Err(GeoAnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn neighbors_are_symmetric() {
        let tri = triangulate(&sites_from_xy(&uniform_points(200, 8)), 0.0).unwrap();
        let neighbors = tri.neighbors();
        assert_eq!(neighbors.len(), 200);
        for (id, adjacent) in &neighbors {
            assert!(adjacent.len() >= 2);
            for other in adjacent {
                assert!(neighbors[other].contains(id));
            }
        }
    }

    #[test]
    fn circumcenters_are_equidistant() {
        let tri = triangulate(&sites_from_xy(&uniform_points(100, 10)), 0.0).unwrap();
        let centers = tri.circumcenters();
        assert_eq!(centers.len(), tri.len());
        for (t, (cx, cy)) in centers.iter().enumerate() {
            let [a, b, c] = tri.triangle_coords(t);
            let ra = (a.0 - cx).hypot(a.1 - cy);
            let rb = (b.0 - cx).hypot(b.1 - cy);
            let rc = (c.0 - cx).hypot(c.1 - cy);
            assert!((ra - rb).abs() <= 1e-6 * ra);
            assert!((ra - rc).abs() <= 1e-6 * ra);
        }
    }
}
