//! An implementation of an immutable, balanced K-D Tree over projected points.

#![warn(missing_docs)]

mod builder;
mod index;
mod r#trait;
mod traversal;

pub use builder::{KDTreeBuilder, DEFAULT_NODE_SIZE};
pub use index::KDTree;
pub use r#trait::{KDTreeIndex, Neighbor};
pub use traversal::{Axis, Node};
