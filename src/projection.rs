//! Geographic to planar coordinate conversion.
//!
//! Points are projected with an equirectangular projection centered on a fixed origin, giving
//! `(x, y)` in metres east and north of that origin. Within a few hundred kilometres of the
//! origin the Euclidean distance between projected points stays within ~1% of the great-circle
//! distance, which is what radius and nearest-neighbor queries need.

use serde::{Deserialize, Serialize};

use crate::error::{GeoAnalysisError, Result};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Wrap a longitude difference into `[-180, 180)`, so neighbours across the antimeridian stay
/// neighbours. Differences already in range are returned unchanged.
#[inline]
fn wrap_lon(delta: f64) -> f64 {
    if (-180.0..180.0).contains(&delta) {
        delta
    } else {
        (delta + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether this pair is finite and inside [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn validate(&self) -> Result<Self> {
        if self.is_valid() {
            Ok(*self)
        } else {
            Err(GeoAnalysisError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

impl From<(f64, f64)> for LatLon {
    /// Build from a `(lat, lon)` tuple.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// An inclusive latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Check both corners are valid coordinates and the box is not inverted.
    pub fn validate(&self) -> Result<Self> {
        LatLon::new(self.min_lat, self.min_lon).validate()?;
        LatLon::new(self.max_lat, self.max_lon).validate()?;
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(GeoAnalysisError::InvalidArgument(format!(
                "Bounding box min ({}, {}) exceeds max ({}, {}).",
                self.min_lat, self.min_lon, self.max_lat, self.max_lon
            )));
        }
        Ok(*self)
    }

    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Equirectangular projection around a fixed origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    origin: LatLon,
    /// Metres per degree of longitude at the origin latitude.
    m_per_deg_lon: f64,
    /// Metres per degree of latitude.
    m_per_deg_lat: f64,
}

impl Projector {
    /// Create a projector centered on `origin`.
    pub fn new(origin: LatLon) -> Result<Self> {
        let origin = origin.validate()?;
        let m_per_deg_lat = EARTH_RADIUS_M.to_radians();
        // Clamp so a polar origin still gives an invertible projection
        let cos_lat = origin.lat.to_radians().cos().max(1e-6);
        tracing::debug!(
            "Projector origin set to ({}, {})",
            origin.lat,
            origin.lon
        );
        Ok(Self {
            origin,
            m_per_deg_lon: m_per_deg_lat * cos_lat,
            m_per_deg_lat,
        })
    }

    /// Create a projector centered on the centroid of the given coordinates.
    ///
    /// Longitudes are averaged as offsets from the first coordinate, so a batch straddling the
    /// antimeridian is centered on it rather than on the prime meridian.
    ///
    /// Invalid coordinates are ignored. Returns `None` if no valid coordinate is given.
    pub fn from_centroid<'a>(coords: impl IntoIterator<Item = &'a LatLon>) -> Option<Self> {
        let mut valid = coords.into_iter().filter(|c| c.is_valid());
        let first = valid.next()?;
        let mut count = 1usize;
        let mut sum_lat = first.lat;
        let mut sum_dlon = 0.0;
        for c in valid {
            count += 1;
            sum_lat += c.lat;
            sum_dlon += wrap_lon(c.lon - first.lon);
        }
        let n = count as f64;
        let mut lon = first.lon + sum_dlon / n;
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }
        Self::new(LatLon::new(sum_lat / n, lon)).ok()
    }

    pub fn origin(&self) -> LatLon {
        self.origin
    }

    /// Project a coordinate to metres east (`x`) and north (`y`) of the origin.
    #[inline]
    pub fn project(&self, coord: LatLon) -> Result<(f64, f64)> {
        let coord = coord.validate()?;
        Ok(self.project_unchecked(coord))
    }

    #[inline]
    pub(crate) fn project_unchecked(&self, coord: LatLon) -> (f64, f64) {
        let x = wrap_lon(coord.lon - self.origin.lon) * self.m_per_deg_lon;
        let y = (coord.lat - self.origin.lat) * self.m_per_deg_lat;
        (x, y)
    }

    /// Inverse of [`Projector::project`].
    #[inline]
    pub fn unproject(&self, x: f64, y: f64) -> LatLon {
        LatLon {
            lat: self.origin.lat + y / self.m_per_deg_lat,
            lon: wrap_lon(self.origin.lon + x / self.m_per_deg_lon),
        }
    }
}
