use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::kdtree::{KDTree, Node};
use crate::store::PointId;

/// A point returned by a nearest-neighbor search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// The matched point.
    pub id: PointId,
    /// Euclidean distance to the query location.
    pub distance: f64,
}

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex: Sized {
    /// The kd-sorted interleaved `x, y` coordinates of this tree
    fn coords(&self) -> &[f64];

    /// The point identifiers of this tree, in kd-sorted order
    fn ids(&self) -> &[u32];

    /// The node size of this KDTree
    fn node_size(&self) -> u16;

    /// The number of items in this KDTree
    fn num_items(&self) -> usize {
        self.ids().len()
    }

    /// Whether this KDTree holds no items
    fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    /// Search the index for items within a given bounding box (inclusive).
    ///
    /// Returns identifiers of found items, in no particular order.
    fn range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<PointId> {
        collect_matching(self, [min_x, min_y], [max_x, max_y], |id, x, y| {
            (x >= min_x && x <= max_x && y >= min_y && y <= max_y).then_some(id)
        })
    }

    /// Search the index for items within a given bounding box.
    fn range_rect(&self, rect: &impl RectTrait<T = f64>) -> Vec<PointId> {
        self.range(
            rect.min().x(),
            rect.min().y(),
            rect.max().x(),
            rect.max().y(),
        )
    }

    /// Search the index for items within a given radius (inclusive).
    ///
    /// - qx: x value of query point
    /// - qy: y value of query point
    /// - r: radius
    ///
    /// Returns identifiers of found items, in no particular order. A negative or NaN radius
    /// matches nothing.
    fn within(&self, qx: f64, qy: f64, r: f64) -> Vec<PointId> {
        if r.is_nan() || r < 0.0 {
            return vec![];
        }
        collect_matching(self, [qx - r, qy - r], [qx + r, qy + r], |id, x, y| {
            (distance(x, y, qx, qy) <= r).then_some(id)
        })
    }

    /// Like [`KDTreeIndex::within`], but also returns each item's distance to the query point,
    /// computed exactly as [`KDTreeIndex::nearest`] reports it.
    ///
    /// Returns items in no particular order.
    fn within_neighbors(&self, qx: f64, qy: f64, r: f64) -> Vec<Neighbor> {
        if r.is_nan() || r < 0.0 {
            return vec![];
        }
        collect_matching(self, [qx - r, qy - r], [qx + r, qy + r], |id, x, y| {
            let distance = distance(x, y, qx, qy);
            (distance <= r).then_some(Neighbor { id, distance })
        })
    }

    /// Search the index for items within a given radius of a coordinate.
    fn within_coord(&self, coord: &impl CoordTrait<T = f64>, r: f64) -> Vec<PointId> {
        self.within(coord.x(), coord.y(), r)
    }

    /// The `k` items closest to `(qx, qy)`, by ascending distance.
    ///
    /// Items at equal distance are ordered by ascending identifier. Returns `min(k, n)` items.
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
    /// let ids: Vec<PointId> = tree.nearest(5., 5., 3).iter().map(|n| n.id).collect();
    /// assert_eq!(ids, vec![PointId(2), PointId(1), PointId(0)]);
    /// ```
    fn nearest(&self, qx: f64, qy: f64, k: usize) -> Vec<Neighbor> {
        let ids = self.ids();
        let coords = self.coords();
        let node_size = self.node_size() as usize;
        if ids.is_empty() || k == 0 {
            return vec![];
        }

        // Max-heap of the best k candidates so far; its top is the current k-th best.
        let mut best: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(ids.len()) + 1);
        let candidate = |i: usize| Candidate {
            dist: distance(coords[2 * i], coords[2 * i + 1], qx, qy),
            id: ids[i],
        };

        let mut stack: TinyVec<[Pending; 32]> = TinyVec::new();
        stack.push(Pending {
            left: 0,
            right: ids.len() - 1,
            axis: 0,
            min_dist: 0.0,
        });

        while let Some(pending) = stack.pop() {
            // Prune with the current k-th best distance. Equal bounds are still visited so that
            // ties resolve to the lowest identifier.
            if best.len() == k && best.peek().is_some_and(|worst| pending.min_dist > worst.dist) {
                continue;
            }

            let Pending {
                left, right, axis, ..
            } = pending;

            if right - left <= node_size {
                for i in left..right + 1 {
                    offer(&mut best, k, candidate(i));
                }
                continue;
            }

            let m = (left + right) >> 1;
            offer(&mut best, k, candidate(m));

            let split = coords[2 * m + axis];
            let q = if axis == 0 { qx } else { qy };
            let plane_dist = (q - split).abs();

            let near_left = Pending {
                left,
                right: m - 1,
                axis: 1 - axis,
                min_dist: pending.min_dist,
            };
            let near_right = Pending {
                left: m + 1,
                right,
                axis: 1 - axis,
                min_dist: pending.min_dist,
            };

            // Push the far side first so the side containing the query is searched first
            if q <= split {
                stack.push(Pending {
                    min_dist: pending.min_dist.max(plane_dist),
                    ..near_right
                });
                stack.push(near_left);
            } else {
                stack.push(Pending {
                    min_dist: pending.min_dist.max(plane_dist),
                    ..near_left
                });
                stack.push(near_right);
            }
        }

        best.into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                id: PointId(c.id),
                distance: c.dist,
            })
            .collect()
    }

    /// The `k` items closest to a coordinate, by ascending distance.
    fn nearest_coord(&self, coord: &impl CoordTrait<T = f64>, k: usize) -> Vec<Neighbor> {
        self.nearest(coord.x(), coord.y(), k)
    }

    /// Access the root node of the KDTree for manual traversal.
    fn root(&self) -> Node<'_, Self> {
        Node::from_root(self)
    }

    /// Number of node levels from the root down to the deepest leaf bucket.
    fn depth(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(self.root(), 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(child) = node.left_child() {
                stack.push((child, level + 1));
            }
            if let Some(child) = node.right_child() {
                stack.push((child, level + 1));
            }
        }
        deepest
    }
}

impl KDTreeIndex for KDTree {
    fn coords(&self) -> &[f64] {
        &self.coords
    }

    fn ids(&self) -> &[u32] {
        &self.ids
    }

    fn node_size(&self) -> u16 {
        self.node_size
    }
}

/// Walk the kd-sorted arrays and collect whatever `keep` returns for each item, descending only
/// into halves whose side of the split overlaps the query box `[lo, hi]`.
fn collect_matching<T: KDTreeIndex, R>(
    tree: &T,
    lo: [f64; 2],
    hi: [f64; 2],
    keep: impl Fn(PointId, f64, f64) -> Option<R>,
) -> Vec<R> {
    let ids = tree.ids();
    let coords = tree.coords();
    let node_size = tree.node_size() as usize;
    if ids.is_empty() {
        return vec![];
    }

    let mut result = vec![];
    let mut visit = |i: usize| {
        if let Some(item) = keep(PointId(ids[i]), coords[2 * i], coords[2 * i + 1]) {
            result.push(item);
        }
    };

    // (left, right, axis) ranges still to search; TinyVec keeps shallow trees off the heap
    let mut stack: TinyVec<[(usize, usize, usize); 16]> = TinyVec::new();
    stack.push((0, ids.len() - 1, 0));

    while let Some((left, right, axis)) = stack.pop() {
        if right - left <= node_size {
            (left..=right).for_each(&mut visit);
            continue;
        }

        let m = (left + right) >> 1;
        visit(m);

        let split = coords[2 * m + axis];
        if lo[axis] <= split {
            stack.push((left, m - 1, 1 - axis));
        }
        if hi[axis] >= split {
            stack.push((m + 1, right, 1 - axis));
        }
    }

    result
}

/// Keep `candidate` if it is among the `k` best seen so far.
#[inline]
fn offer(best: &mut BinaryHeap<Candidate>, k: usize, candidate: Candidate) {
    if best.len() < k {
        best.push(candidate);
    } else if best.peek().is_some_and(|worst| candidate < *worst) {
        best.pop();
        best.push(candidate);
    }
}

/// A pending subtree of the nearest-neighbor search, with a lower bound on the distance from
/// the query to any point in it.
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    left: usize,
    right: usize,
    axis: usize,
    min_dist: f64,
}

/// A candidate in the bounded nearest-neighbor heap, ordered by `(dist, id)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f64,
    id: u32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
pub(crate) fn sq_dist(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

/// Euclidean distance. Every query compares this same value, so a radius equal to a reported
/// neighbor distance always includes that neighbor.
#[inline]
pub(crate) fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    sq_dist(ax, ay, bx, by).sqrt()
}
