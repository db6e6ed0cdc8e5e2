use geo_traits::{CoordTrait, Dimensions, GeometryTrait, GeometryType, RectTrait};

use crate::geometry::{BBox, Site};
use crate::kdtree::KDTreeIndex;
use crate::store::PointId;
use crate::test::{tree_from_xy, uniform_points};

#[test]
fn site_is_a_coord() {
    let site = Site::new(PointId(3), 1.5, -2.5);
    assert_eq!(site.x(), 1.5);
    assert_eq!(site.y(), -2.5);
    assert_eq!(site.nth_or_panic(0), 1.5);
    assert_eq!(site.nth_or_panic(1), -2.5);
}

#[test]
fn bbox_from_sites() {
    let sites = [
        Site::new(PointId(0), 3., 4.),
        Site::new(PointId(1), -1., 10.),
        Site::new(PointId(2), 7., -2.),
    ];
    let bbox = BBox::from_sites(&sites).unwrap();
    assert_eq!(bbox, BBox::new(-1., -2., 7., 10.));
    assert_eq!(bbox.width(), 8.);
    assert_eq!(bbox.height(), 12.);
    assert!(bbox.contains(7., 10.));
    assert!(!bbox.contains(7.1, 10.));
    assert_eq!(bbox.expand(1.), BBox::new(-2., -3., 8., 11.));
    assert!(BBox::from_sites(&[]).is_none());
}

#[test]
fn bbox_validation() {
    assert!(BBox::new(0., 0., 1., 1.).validate().is_ok());
    assert!(BBox::new(0., 0., 0., 1.).validate().is_err());
    assert!(BBox::new(2., 0., 1., 1.).validate().is_err());
    assert!(BBox::new(0., f64::NAN, 1., 1.).validate().is_err());
}

#[test]
fn bbox_as_rect_query() {
    let points = uniform_points(500, 17);
    let tree = tree_from_xy(&points, 8);
    let bbox = BBox::new(1_000., 2_000., 6_000., 4_000.);
    assert_eq!(bbox.min().x(), 1_000.);
    assert_eq!(bbox.max().y(), 4_000.);

    let mut by_rect = tree.range_rect(&bbox);
    let mut by_range = tree.range(1_000., 2_000., 6_000., 4_000.);
    by_rect.sort();
    by_range.sort();
    assert_eq!(by_rect, by_range);
    assert!(by_rect
        .iter()
        .all(|id| { bbox.contains(points[id.index()].0, points[id.index()].1) }));
}

#[test]
fn bbox_is_a_rect_geometry() {
    let bbox = BBox::new(-5., 0., 5., 2.);
    assert_eq!(bbox.dim(), Dimensions::Xy);
    match bbox.as_type() {
        GeometryType::Rect(rect) => {
            assert_eq!((rect.min().x(), rect.min().y()), (-5., 0.));
            assert_eq!((rect.max().x(), rect.max().y()), (5., 2.));
        }
        _ => panic!("expected a rect"),
    }
}
