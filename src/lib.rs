#![doc = include_str!("../README.md")]

pub mod config;
mod error;
pub mod geometry;
pub mod kdtree;
pub mod projection;
pub mod session;
pub mod store;

pub use config::EngineConfig;
pub use error::{Degeneracy, GeoAnalysisError, Result};
pub use projection::{GeoBounds, LatLon, Projector};
pub use session::{AnalysisSession, BenchmarkReport, DistributionAnalysis, SiteAssignment};
pub use store::{Attributes, Point, PointId, PointStore, RawRecord};

#[cfg(test)]
pub(crate) mod test;
