use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Site;
use crate::projection::LatLon;

/// Non-geometric fields of a source record. Carried through, never interpreted.
pub type Attributes = BTreeMap<String, String>;

/// Identifier of a point in a [`PointStore`][crate::PointStore].
///
/// Identifiers are assigned in insertion order, starting at 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PointId(pub u32);

impl PointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PointId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A record as handed over by a loader, before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub attributes: Attributes,
}

impl RawRecord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            attributes: Attributes::new(),
        }
    }

    /// Add one attribute to this record.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// An indexed point. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub(crate) id: PointId,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) coord: LatLon,
    pub(crate) attributes: Attributes,
}

impl Point {
    pub fn id(&self) -> PointId {
        self.id
    }

    /// Projected planar coordinates, in metres from the projection origin.
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// The original geographic coordinate.
    pub fn coord(&self) -> LatLon {
        self.coord
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The planar site used by the geometry routines.
    pub fn site(&self) -> Site {
        Site::new(self.id, self.x, self.y)
    }
}
