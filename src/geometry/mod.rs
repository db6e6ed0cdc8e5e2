//! Computational geometry over projected points.
//!
//! Every operation here is a pure function of its input sites: nothing is cached and the
//! [`PointStore`][crate::PointStore] and spatial index are never mutated.

mod delaunay;
mod density;
mod hull;
mod polygon;
pub mod predicates;
mod voronoi;

pub use delaunay::{triangulate, Triangulation};
pub use density::{grid_density, kernel_density, DensityCell, DensityGrid};
pub use hull::{convex_hull, ConvexHull};
pub use polygon::{point_in_polygon, polygon_area};
pub use voronoi::{voronoi, VoronoiCell, VoronoiDiagram};

use geo_traits::{
    CoordTrait, Dimensions, GeometryTrait, GeometryType, RectTrait,
    UnimplementedGeometryCollection, UnimplementedLine, UnimplementedLineString,
    UnimplementedMultiLineString, UnimplementedMultiPoint, UnimplementedMultiPolygon,
    UnimplementedPoint, UnimplementedPolygon, UnimplementedTriangle,
};

use crate::error::{GeoAnalysisError, Result};
use crate::store::PointId;

/// A point taking part in a geometric computation: its identifier and projected position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
}

impl Site {
    pub fn new(id: PointId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

impl CoordTrait for Site {
    type T = f64;

    fn dim(&self) -> geo_traits::Dimensions {
        Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

/// An axis-aligned rectangle in the projected plane, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The smallest box containing every site, or `None` for no sites.
    pub fn from_sites(sites: &[Site]) -> Option<Self> {
        let first = sites.first()?;
        let mut bbox = Self::new(first.x, first.y, first.x, first.y);
        for site in &sites[1..] {
            bbox.min_x = bbox.min_x.min(site.x);
            bbox.min_y = bbox.min_y.min(site.y);
            bbox.max_x = bbox.max_x.max(site.x);
            bbox.max_y = bbox.max_y.max(site.y);
        }
        Some(bbox)
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// The four corners, counter-clockwise from `(min_x, min_y)`.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(GeoAnalysisError::InvalidArgument(format!(
                "clip box must be finite with positive area, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// A corner of a [`BBox`].
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    x: f64,
    y: f64,
}

impl CoordTrait for Corner {
    type T = f64;

    fn dim(&self) -> geo_traits::Dimensions {
        Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

impl GeometryTrait for BBox {
    type T = f64;
    type PointType<'b>
        = UnimplementedPoint<f64>
    where
        Self: 'b;
    type LineStringType<'b>
        = UnimplementedLineString<f64>
    where
        Self: 'b;
    type PolygonType<'b>
        = UnimplementedPolygon<f64>
    where
        Self: 'b;
    type MultiPointType<'b>
        = UnimplementedMultiPoint<f64>
    where
        Self: 'b;
    type MultiLineStringType<'b>
        = UnimplementedMultiLineString<f64>
    where
        Self: 'b;
    type MultiPolygonType<'b>
        = UnimplementedMultiPolygon<f64>
    where
        Self: 'b;
    type GeometryCollectionType<'b>
        = UnimplementedGeometryCollection<f64>
    where
        Self: 'b;
    type RectType<'b>
        = BBox
    where
        Self: 'b;
    type TriangleType<'b>
        = UnimplementedTriangle<f64>
    where
        Self: 'b;
    type LineType<'b>
        = UnimplementedLine<f64>
    where
        Self: 'b;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn as_type(
        &self,
    ) -> GeometryType<
        '_,
        Self::PointType<'_>,
        Self::LineStringType<'_>,
        Self::PolygonType<'_>,
        Self::MultiPointType<'_>,
        Self::MultiLineStringType<'_>,
        Self::MultiPolygonType<'_>,
        Self::GeometryCollectionType<'_>,
        Self::RectType<'_>,
        Self::TriangleType<'_>,
        Self::LineType<'_>,
    > {
        GeometryType::Rect(self)
    }
}

impl RectTrait for BBox {
    type CoordType<'a>
        = Corner
    where
        Self: 'a;

    fn min(&self) -> Self::CoordType<'_> {
        Corner {
            x: self.min_x,
            y: self.min_y,
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Corner {
            x: self.max_x,
            y: self.max_y,
        }
    }
}

#[cfg(test)]
mod test;
