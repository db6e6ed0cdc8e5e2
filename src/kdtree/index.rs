use crate::kdtree::builder::{KDTreeBuilder, DEFAULT_NODE_SIZE};
use crate::store::Point;

/// An immutable, balanced k-d tree over planar points.
///
/// The tree is implicit in two kd-sorted arrays: the root of a range `[left, right]` is the
/// median position `(left + right) / 2`, its left subtree is `[left, m - 1]` and its right
/// subtree `[m + 1, right]`, and the splitting axis alternates between x and y by depth. Ranges
/// of at most `node_size + 1` points are leaf buckets searched linearly.
///
/// Usually this will be created via [`KDTreeBuilder`] or [`KDTree::from_points`].
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree {
    pub(crate) coords: Vec<f64>,
    pub(crate) ids: Vec<u32>,
    pub(crate) node_size: u16,
}

impl KDTree {
    /// A tree with no points. Every query on it returns an empty result.
    pub fn empty() -> Self {
        Self {
            coords: vec![],
            ids: vec![],
            node_size: DEFAULT_NODE_SIZE,
        }
    }

    /// Bulk-build a tree over the projected coordinates of `points`.
    pub fn from_points(points: &[Point], node_size: u16) -> Self {
        KDTreeBuilder::from_points(points, node_size).finish()
    }
}

impl Default for KDTree {
    fn default() -> Self {
        Self::empty()
    }
}
