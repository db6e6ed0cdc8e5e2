use crate::error::GeoAnalysisError;
use crate::projection::{GeoBounds, LatLon};
use crate::store::{PointId, PointStore, RawRecord, RejectionReason};
use crate::test::sao_paulo_records;

#[test]
fn accepts_valid_and_reports_invalid() {
    let mut store = PointStore::new();
    let records = vec![
        RawRecord::new(-23.55, -46.63).with_attribute("type", "ROUBO"),
        RawRecord::new(-95.0, -46.63),
        RawRecord {
            latitude: None,
            longitude: Some(-46.6),
            ..Default::default()
        },
        RawRecord::new(-23.56, -46.64),
        RawRecord::new(f64::NAN, -46.64),
        RawRecord::new(-23.54, 181.0),
        RawRecord::new(-23.54, -46.62),
    ];

    let report = store.bulk_insert(records);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected(), 4);
    assert_eq!(report.first_id, Some(PointId(0)));
    assert_eq!(store.len(), 3);

    let indices: Vec<usize> = report.rejections.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 4, 5]);
    assert_eq!(
        report.rejections[0].reason,
        RejectionReason::InvalidCoordinate {
            lat: -95.0,
            lon: -46.63
        }
    );
    assert_eq!(
        report.rejections[1].reason,
        RejectionReason::MissingField("latitude")
    );
    assert_eq!(report.rejections[2].reason, RejectionReason::NonFinite);

    let first = store.get(PointId(0)).unwrap();
    assert_eq!(first.attributes().get("type").map(String::as_str), Some("ROUBO"));
    assert_eq!(first.coord(), LatLon::new(-23.55, -46.63));
}

#[test]
fn identifiers_are_monotonic_across_batches() {
    let mut store = PointStore::new();
    let first = store.bulk_insert(sao_paulo_records(10));
    let second = store.bulk_insert(sao_paulo_records(5));
    assert_eq!(first.first_id, Some(PointId(0)));
    assert_eq!(second.first_id, Some(PointId(10)));
    for (i, point) in store.iter().enumerate() {
        assert_eq!(point.id(), PointId(i as u32));
    }
}

#[test]
fn origin_fixed_by_first_batch() {
    let mut store = PointStore::new();
    assert!(store.projector().is_none());

    // A fully invalid batch does not fix the origin
    store.bulk_insert(vec![RawRecord::new(100.0, 0.0)]);
    assert!(store.projector().is_none());

    store.bulk_insert(vec![RawRecord::new(10.0, 20.0), RawRecord::new(12.0, 22.0)]);
    let origin = store.projector().unwrap().origin();
    assert_eq!(origin, LatLon::new(11.0, 21.0));

    store.bulk_insert(vec![RawRecord::new(50.0, 50.0)]);
    assert_eq!(store.projector().unwrap().origin(), origin);

    let p = store.get(PointId(0)).unwrap();
    assert!(p.x() < 0.0 && p.y() < 0.0);
}

#[test]
fn explicit_origin_and_region() {
    let region = GeoBounds::new(-24.0, -47.0, -23.0, -46.0);
    let mut store =
        PointStore::with_options(Some(LatLon::new(-23.5, -46.5)), Some(region)).unwrap();
    let report = store.bulk_insert(vec![
        RawRecord::new(-23.5, -46.5),
        RawRecord::new(-22.0, -46.5),
    ]);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejections[0].reason, RejectionReason::OutsideRegion);
    assert_eq!(store.get(PointId(0)).unwrap().xy(), (0.0, 0.0));

    assert!(PointStore::with_options(Some(LatLon::new(0.0, 500.0)), None).is_err());
}

#[test]
fn get_missing_point() {
    let store = PointStore::new();
    assert_eq!(
        store.get(PointId(3)).unwrap_err(),
        GeoAnalysisError::NotFound(PointId(3))
    );
}

#[test]
fn bounding_box_filter_is_restartable() {
    let mut store = PointStore::new();
    store.bulk_insert(vec![
        RawRecord::new(-23.55, -46.63),
        RawRecord::new(-23.70, -46.80),
        RawRecord::new(-23.54, -46.62),
    ]);
    let bounds = GeoBounds::new(-23.6, -46.7, -23.5, -46.6);

    let ids: Vec<PointId> = store.filter_by_bounding_box(bounds).map(|p| p.id()).collect();
    assert_eq!(ids, vec![PointId(0), PointId(2)]);

    let again: Vec<PointId> = store.filter_by_bounding_box(bounds).map(|p| p.id()).collect();
    assert_eq!(ids, again);

    let empty = GeoBounds::new(0.0, 0.0, 1.0, 1.0);
    assert_eq!(store.filter_by_bounding_box(empty).count(), 0);
}

#[test]
fn sample_is_deterministic_and_bounded() {
    let mut store = PointStore::new();
    store.bulk_insert(sao_paulo_records(100));

    let sample = store.sample(10);
    assert_eq!(sample.len(), 10);
    assert_eq!(sample[0].id(), PointId(0));
    assert_eq!(sample[1].id(), PointId(10));

    let again: Vec<PointId> = store.sample(10).iter().map(|p| p.id()).collect();
    let first: Vec<PointId> = sample.iter().map(|p| p.id()).collect();
    assert_eq!(first, again);

    assert_eq!(store.sample(1000).len(), 100);
}
