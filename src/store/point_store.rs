use std::fmt;

use crate::error::{GeoAnalysisError, Result};
use crate::geometry::Site;
use crate::projection::{GeoBounds, LatLon, Projector};
use crate::store::point::{Point, PointId, RawRecord};

/// Why a record was not stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectionReason {
    /// A required field is absent.
    MissingField(&'static str),
    /// Latitude or longitude is NaN or infinite.
    NonFinite,
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    InvalidCoordinate { lat: f64, lon: f64 },
    /// Valid coordinate, but outside the configured ingestion region.
    OutsideRegion,
    /// The store already holds `u32::MAX` points.
    StoreFull,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field `{}`", field),
            Self::NonFinite => write!(f, "non-finite coordinate"),
            Self::InvalidCoordinate { lat, lon } => {
                write!(f, "coordinate out of range: lat {}, lon {}", lat, lon)
            }
            Self::OutsideRegion => write!(f, "outside ingestion region"),
            Self::StoreFull => write!(f, "point store is full"),
        }
    }
}

/// A rejected record: its position in the submitted batch and the reason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectionReason,
}

/// Outcome of one [`PointStore::bulk_insert`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Number of records stored.
    pub accepted: usize,
    /// Identifier of the first stored record of this batch, if any was stored. The batch
    /// occupies `first_id..first_id + accepted`.
    pub first_id: Option<PointId>,
    /// Every record that was not stored, in batch order.
    pub rejections: Vec<Rejection>,
}

impl IngestReport {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

/// Append-only collection of points, in insertion order.
///
/// The store owns the session's projection. Its origin is either supplied up front or fixed as
/// the centroid of the valid records of the first non-empty bulk insert.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Vec<Point>,
    projector: Option<Projector>,
    region: Option<GeoBounds>,
}

impl PointStore {
    /// Create an empty store whose origin will be taken from the first bulk insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with an explicit projection origin and/or ingestion region.
    pub fn with_options(origin: Option<LatLon>, region: Option<GeoBounds>) -> Result<Self> {
        let projector = origin.map(Projector::new).transpose()?;
        let region = region.map(|r| r.validate()).transpose()?;
        Ok(Self {
            points: vec![],
            projector,
            region,
        })
    }

    /// Validate and append a batch of records.
    ///
    /// Invalid records are reported and skipped; the rest of the batch is still stored.
    pub fn bulk_insert(&mut self, records: impl IntoIterator<Item = RawRecord>) -> IngestReport {
        let mut report = IngestReport::default();
        let mut valid = vec![];

        for (index, record) in records.into_iter().enumerate() {
            match self.check_record(&record) {
                Ok(coord) => valid.push((index, coord, record)),
                Err(reason) => report.rejections.push(Rejection { index, reason }),
            }
        }

        if self.projector.is_none() {
            self.projector = Projector::from_centroid(valid.iter().map(|(_, c, _)| c));
        }
        let Some(projector) = self.projector else {
            // Only reachable when nothing in this batch was valid
            debug_assert!(valid.is_empty());
            return report;
        };

        self.points.reserve(valid.len());
        for (index, coord, record) in valid {
            let Ok(id) = u32::try_from(self.points.len()) else {
                report.rejections.push(Rejection {
                    index,
                    reason: RejectionReason::StoreFull,
                });
                continue;
            };
            let (x, y) = projector.project_unchecked(coord);
            self.points.push(Point {
                id: PointId(id),
                x,
                y,
                coord,
                attributes: record.attributes,
            });
            report.first_id.get_or_insert(PointId(id));
            report.accepted += 1;
        }
        report.rejections.sort_by_key(|r| r.index);

        tracing::info!(
            "Bulk insert: {} accepted, {} rejected, {} total",
            report.accepted,
            report.rejected(),
            self.points.len()
        );
        if !report.rejections.is_empty() {
            tracing::warn!(
                "{} records rejected, first: #{} ({})",
                report.rejected(),
                report.rejections[0].index,
                report.rejections[0].reason
            );
        }

        report
    }

    fn check_record(&self, record: &RawRecord) -> std::result::Result<LatLon, RejectionReason> {
        let lat = record
            .latitude
            .ok_or(RejectionReason::MissingField("latitude"))?;
        let lon = record
            .longitude
            .ok_or(RejectionReason::MissingField("longitude"))?;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(RejectionReason::NonFinite);
        }
        let coord = LatLon::new(lat, lon);
        if !coord.is_valid() {
            return Err(RejectionReason::InvalidCoordinate { lat, lon });
        }
        if self.region.is_some_and(|region| !region.contains(lat, lon)) {
            return Err(RejectionReason::OutsideRegion);
        }
        Ok(coord)
    }

    /// Look up a point by identifier.
    pub fn get(&self, id: PointId) -> Result<&Point> {
        self.points
            .get(id.index())
            .ok_or(GeoAnalysisError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in insertion order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// The projection fixed for this store, once known.
    pub fn projector(&self) -> Option<&Projector> {
        self.projector.as_ref()
    }

    /// Lazily iterate over the points inside a latitude/longitude box (inclusive).
    ///
    /// Each call starts a fresh pass over the store.
    pub fn filter_by_bounding_box(&self, bounds: GeoBounds) -> BoundingBoxIter<'_> {
        BoundingBoxIter {
            inner: self.points.iter(),
            bounds,
        }
    }

    /// At most `max` points, picked with a fixed stride so the sample is spread over the whole
    /// insertion order and identical between calls.
    pub fn sample(&self, max: usize) -> Vec<&Point> {
        sample_stride(&self.points, max)
    }

    /// Planar sites of every point, for the geometry routines.
    pub fn sites(&self) -> Vec<Site> {
        self.points.iter().map(Point::site).collect()
    }
}

impl<'a> IntoIterator for &'a PointStore {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

pub(crate) fn sample_stride<T>(items: &[T], max: usize) -> Vec<&T> {
    if items.len() <= max {
        return items.iter().collect();
    }
    if max == 0 {
        return vec![];
    }
    let step = items.len() as f64 / max as f64;
    (0..max)
        .map(|i| &items[((i as f64 * step) as usize).min(items.len() - 1)])
        .collect()
}

/// Iterator returned by [`PointStore::filter_by_bounding_box`].
#[derive(Debug, Clone)]
pub struct BoundingBoxIter<'a> {
    inner: std::slice::Iter<'a, Point>,
    bounds: GeoBounds,
}

impl<'a> Iterator for BoundingBoxIter<'a> {
    type Item = &'a Point;

    fn next(&mut self) -> Option<Self::Item> {
        let bounds = self.bounds;
        self.inner
            .by_ref()
            .find(|p| bounds.contains(p.coord.lat, p.coord.lon))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
