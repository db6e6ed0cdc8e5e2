use std::cmp::{self, Ordering};

use crate::kdtree::KDTree;
use crate::store::{Point, PointId};

/// Default maximum number of points in a leaf bucket.
pub const DEFAULT_NODE_SIZE: u16 = 16;

/// A builder to create a [`KDTree`].
///
/// ```
/// use geo_analysis::kdtree::{KDTreeBuilder, KDTreeIndex};
/// use geo_analysis::PointId;
///
/// let mut builder = KDTreeBuilder::new(3);
/// builder.add(PointId(0), 0., 0.);
/// builder.add(PointId(1), 1., 1.);
/// builder.add(PointId(2), 2., 2.);
/// let tree = builder.finish();
///
/// let nearest = tree.nearest(1.9, 1.9, 1);
/// assert_eq!(nearest[0].id, PointId(2));
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder {
    ids: Vec<u32>,
    coords: Vec<f64>,
    num_items: usize,
    node_size: u16,
}

impl KDTreeBuilder {
    /// Create a new builder with the provided number of items and the default node size.
    pub fn new(num_items: u32) -> Self {
        Self::new_with_node_size(num_items, DEFAULT_NODE_SIZE)
    }

    /// Create a new builder with the provided number of items and node size.
    pub fn new_with_node_size(num_items: u32, node_size: u16) -> Self {
        assert!(node_size >= 1, "node_size must be at least 1");
        let num_items = num_items as usize;
        Self {
            ids: Vec::with_capacity(num_items),
            coords: Vec::with_capacity(num_items * 2),
            num_items,
            node_size,
        }
    }

    /// Create a builder already filled with the projected coordinates of `points`.
    pub fn from_points(points: &[Point], node_size: u16) -> Self {
        let num_items = u32::try_from(points.len()).unwrap_or(u32::MAX);
        let mut builder = Self::new_with_node_size(num_items, node_size);
        for point in points.iter().take(num_items as usize) {
            builder.add(point.id(), point.x(), point.y());
        }
        builder
    }

    /// Add a point to the index. Returns its insertion position.
    pub fn add(&mut self, id: PointId, x: f64, y: f64) -> usize {
        let index = self.ids.len();
        self.ids.push(id.0);
        self.coords.push(x);
        self.coords.push(y);
        index
    }

    /// Consume this builder, performing the k-d sort and generating a KDTree ready for queries.
    pub fn finish(mut self) -> KDTree {
        assert_eq!(
            self.ids.len(),
            self.num_items,
            "Added {} items when expected {}.",
            self.ids.len(),
            self.num_items
        );

        if self.num_items > 0 {
            // kd-sort both arrays for efficient search
            sort(
                &mut self.ids,
                &mut self.coords,
                self.node_size as usize,
                0,
                self.num_items - 1,
                0,
            );
        }

        tracing::debug!(
            "Built k-d tree over {} points (node size {})",
            self.num_items,
            self.node_size
        );

        KDTree {
            coords: self.coords,
            ids: self.ids,
            node_size: self.node_size,
        }
    }
}

fn sort(
    ids: &mut [u32],
    coords: &mut [f64],
    node_size: usize,
    left: usize,
    right: usize,
    axis: usize,
) {
    if right - left <= node_size {
        return;
    }

    // middle index
    let m = (left + right) >> 1;

    // sort ids and coords around the middle index so that the halves lie either left/right or
    // top/bottom correspondingly (taking turns)
    select(ids, coords, m, left, right, axis);

    // recursively kd-sort first half and second half on the opposite axis
    sort(ids, coords, node_size, left, m - 1, 1 - axis);
    sort(ids, coords, node_size, m + 1, right, 1 - axis);
}

/// Order of item `i` against the pivot key `(t, tid)`.
///
/// Coordinates are compared first; equal coordinates fall back to the point identifier, so keys
/// are unique and the partition does not depend on how ties happen to be visited.
#[inline]
fn cmp_key(ids: &[u32], coords: &[f64], i: usize, axis: usize, t: f64, tid: u32) -> Ordering {
    coords[2 * i + axis]
        .total_cmp(&t)
        .then_with(|| ids[i].cmp(&tid))
}

/// Custom Floyd-Rivest selection algorithm: sort ids and coords so that [left..k-1] items are
/// smaller than k-th item (on either x or y axis)
#[inline]
fn select(
    ids: &mut [u32],
    coords: &mut [f64],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(ids, coords, k, new_left, new_right, axis);
        }

        let t = coords[2 * k + axis];
        let tid = ids[k];
        let mut i = left;
        let mut j = right;

        swap_item(ids, coords, left, k);
        if cmp_key(ids, coords, right, axis, t, tid) == Ordering::Greater {
            swap_item(ids, coords, left, right);
        }

        while i < j {
            swap_item(ids, coords, i, j);
            i += 1;
            j -= 1;
            while cmp_key(ids, coords, i, axis, t, tid) == Ordering::Less {
                i += 1;
            }
            while cmp_key(ids, coords, j, axis, t, tid) == Ordering::Greater {
                j -= 1;
            }
        }

        if cmp_key(ids, coords, left, axis, t, tid) == Ordering::Equal {
            swap_item(ids, coords, left, j);
        } else {
            j += 1;
            swap_item(ids, coords, j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

#[inline]
fn swap_item(ids: &mut [u32], coords: &mut [f64], i: usize, j: usize) {
    ids.swap(i, j);
    coords.swap(2 * i, 2 * j);
    coords.swap(2 * i + 1, 2 * j + 1);
}
