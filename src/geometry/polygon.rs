/// Whether `(x, y)` lies inside `polygon`, by counting crossings of a ray cast towards +x.
///
/// The polygon is an open ring (the last vertex connects back to the first) of any
/// orientation; it need not be convex. Points exactly on the boundary may be reported either
/// way. Rings with fewer than three vertices contain nothing.
///
/// ```
/// use geo_analysis::geometry::point_in_polygon;
///
/// let square = [(0., 0.), (10., 0.), (10., 10.), (0., 10.)];
/// assert!(point_in_polygon(5., 5., &square));
/// assert!(!point_in_polygon(15., 5., &square));
/// ```
pub fn point_in_polygon(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, &(xi, yi)) in polygon.iter().enumerate() {
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Signed area of an open ring: positive when counter-clockwise.
pub fn polygon_area(polygon: &[(f64, f64)]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (ax, ay) = polygon[i];
            let (bx, by) = polygon[(i + 1) % n];
            ax * by - bx * ay
        })
        .sum();
    twice * 0.5
}
