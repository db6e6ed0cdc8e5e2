//! Utilities to traverse the KDTree structure.

use crate::kdtree::KDTreeIndex;
use crate::store::PointId;

/// The coordinate a node splits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Split on the x (easting) coordinate.
    X,
    /// Split on the y (northing) coordinate.
    Y,
}

impl Axis {
    #[inline]
    fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    #[inline]
    fn pick(self, (x, y): (f64, f64)) -> f64 {
        match self {
            Axis::X => x,
            Axis::Y => y,
        }
    }
}

/// A node in the KDTree.
///
/// Internal nodes hold one point (the median of their range) and split the rest of the range
/// on [`Node::split_axis`]. Leaf nodes are buckets of at most `node_size + 1` points.
#[derive(Debug, Clone)]
pub struct Node<'a, T: KDTreeIndex> {
    tree: &'a T,
    /// Axis the children of this node are split over. Alternates with depth, starting at x.
    axis: Axis,
    /// Inclusive range of this node in the kd-sorted ids and coords.
    left: usize,
    right: usize,
    /// Known extent of the points in range: `[min_x, min_y, max_x, max_y]`.
    extent: [f64; 4],
}

impl<'a, T: KDTreeIndex> Node<'a, T> {
    /// The root of `tree`. The root of an empty tree is an empty leaf.
    pub(crate) fn from_root(tree: &'a T) -> Self {
        Self {
            tree,
            axis: Axis::X,
            left: 0,
            right: tree.ids().len().saturating_sub(1),
            extent: [
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::INFINITY,
            ],
        }
    }

    /// Position of this node's point in the kd-sorted arrays (not its point id).
    #[inline]
    pub(crate) fn middle_index(&self) -> usize {
        (self.left + self.right) >> 1
    }

    #[inline]
    fn middle_xy(&self) -> (f64, f64) {
        let m = self.middle_index();
        let coords = self.tree.coords();
        (coords[2 * m], coords[2 * m + 1])
    }

    /// Returns `true` if this is a leaf bucket without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.right - self.left <= self.tree.node_size() as usize
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The axis this node splits its children on.
    pub fn split_axis(&self) -> Axis {
        self.axis
    }

    /// The point stored at this node, or `None` for a leaf bucket.
    pub fn point_id(&self) -> Option<PointId> {
        self.is_parent()
            .then(|| PointId(self.tree.ids()[self.middle_index()]))
    }

    /// The splitting value (the coordinate of this node's point on the split axis), or `None`
    /// for a leaf bucket.
    pub fn split_value(&self) -> Option<f64> {
        self.is_parent()
            .then(|| self.axis.pick(self.middle_xy()))
    }

    /// All points in this node's range, including the node's own point.
    pub fn point_ids(&self) -> Vec<PointId> {
        self.tree
            .ids()
            .get(self.left..=self.right)
            .unwrap_or_default()
            .iter()
            .map(|id| PointId(*id))
            .collect()
    }

    /// The region this node's points are known to lie in, as `(min_x, min_y, max_x, max_y)`.
    /// Unbounded sides are infinite.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let [min_x, min_y, max_x, max_y] = self.extent;
        (min_x, min_y, max_x, max_y)
    }

    /// The child holding coordinates at most the split value, or `None` for a leaf.
    /// The node's own point belongs to neither child.
    pub fn left_child(&self) -> Option<Node<'a, T>> {
        self.child(false)
    }

    /// The child holding coordinates at least the split value, or `None` for a leaf.
    /// The node's own point belongs to neither child.
    pub fn right_child(&self) -> Option<Node<'a, T>> {
        self.child(true)
    }

    fn child(&self, upper: bool) -> Option<Node<'a, T>> {
        if self.is_leaf() {
            return None;
        }
        let m = self.middle_index();
        let split = self.axis.pick(self.middle_xy());
        let slot = match (self.axis, upper) {
            (Axis::X, false) => 2,
            (Axis::Y, false) => 3,
            (Axis::X, true) => 0,
            (Axis::Y, true) => 1,
        };
        let mut extent = self.extent;
        extent[slot] = split;
        let (left, right) = if upper {
            (m + 1, self.right)
        } else {
            (self.left, m - 1)
        };
        Some(Self {
            tree: self.tree,
            axis: self.axis.next(),
            left,
            right,
            extent,
        })
    }
}
