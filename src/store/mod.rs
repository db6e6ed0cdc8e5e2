//! The canonical, append-only collection of ingested points.

mod point;
mod point_store;

pub use point::{Attributes, Point, PointId, RawRecord};
pub use point_store::{BoundingBoxIter, IngestReport, PointStore, Rejection, RejectionReason};

pub(crate) use point_store::sample_stride;

#[cfg(test)]
mod test;
