use std::fmt::Debug;

use thiserror::Error;

use crate::store::PointId;

/// Why a geometric computation could not produce its full result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// Fewer distinct points than the computation needs.
    TooFewPoints(usize),
    /// Every distinct point lies on one line.
    Collinear,
    /// Every point collapses onto a single location.
    Coincident,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degeneracy::TooFewPoints(n) => write!(f, "too few distinct points ({})", n),
            Degeneracy::Collinear => write!(f, "all points are collinear"),
            Degeneracy::Coincident => write!(f, "all points are coincident"),
        }
    }
}

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoAnalysisError {
    /// A latitude/longitude pair outside [-90, 90] x [-180, 180], or not finite.
    #[error("Invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Malformed query parameters. The operation was not attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The geometry is not well defined for this input.
    ///
    /// `points` holds the part of the answer that is still well defined: the distinct input
    /// points, in hull order when they are collinear.
    #[error("Degenerate input: {reason}")]
    DegenerateInput {
        reason: Degeneracy,
        points: Vec<PointId>,
    },

    /// No point with this identifier exists in the store.
    #[error("Point {0} not found")]
    NotFound(PointId),

    /// The spatial index was queried before it was built.
    #[error("Spatial index has not been built")]
    IndexNotBuilt,

    /// An engine configuration value is out of range or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GeoAnalysisError>;
