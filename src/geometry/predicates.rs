//! Filtered geometric predicates.
//!
//! `orient2d` and `incircle` evaluate their determinant in plain floating point and compare it
//! against a static bound on the rounding error of that evaluation. A result whose magnitude
//! does not exceed the bound has an uncertain sign and is reported as exactly `0.0`, so callers
//! see near-collinear triples as collinear and near-cocircular quadruples as cocircular. Any
//! non-zero result has the sign of the exact determinant.

/// Half of the machine epsilon: the unit roundoff for `f64`.
const EPSILON: f64 = f64::EPSILON * 0.5;

const CCW_ERR_BOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const ICC_ERR_BOUND: f64 = (10.0 + 96.0 * EPSILON) * EPSILON;

/// Positive if `a`, `b`, `c` are in counter-clockwise order, negative if clockwise, and zero
/// if they are collinear or too close to collinear to tell.
///
/// The magnitude is twice the signed area of the triangle.
///
/// ```
/// use geo_analysis::geometry::predicates::orient2d;
///
/// assert!(orient2d((0., 0.), (1., 0.), (0., 1.)) > 0.);
/// assert!(orient2d((0., 0.), (0., 1.), (1., 0.)) < 0.);
/// assert_eq!(orient2d((0., 0.), (1., 1.), (2., 2.)), 0.);
/// ```
pub fn orient2d(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let det_left = (a.0 - c.0) * (b.1 - c.1);
    let det_right = (a.1 - c.1) * (b.0 - c.0);
    let det = det_left - det_right;

    // Opposite signs (or a zero term) cannot cancel, so the sign is exact.
    let det_sum = if det_left > 0.0 {
        if det_right <= 0.0 {
            return det;
        }
        det_left + det_right
    } else if det_left < 0.0 {
        if det_right >= 0.0 {
            return det;
        }
        -det_left - det_right
    } else {
        return det;
    };

    if det.abs() > CCW_ERR_BOUND * det_sum {
        det
    } else {
        0.0
    }
}

/// Positive if `d` lies inside the circle through `a`, `b`, `c` (given counter-clockwise),
/// negative if outside, and zero if on the circle or too close to tell.
///
/// For a clockwise `a`, `b`, `c` the sign is reversed.
pub fn incircle(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> f64 {
    let adx = a.0 - d.0;
    let bdx = b.0 - d.0;
    let cdx = c.0 - d.0;
    let ady = a.1 - d.1;
    let bdy = b.1 - d.1;
    let cdy = c.1 - d.1;

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let alift = adx * adx + ady * ady;

    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let blift = bdx * bdx + bdy * bdy;

    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);

    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;

    if det.abs() > ICC_ERR_BOUND * permanent {
        det
    } else {
        0.0
    }
}

/// Offset of the circumcenter of `a`, `b`, `c` from `a`, or `None` when the three points do
/// not span a triangle.
#[inline]
fn circumcenter_offset(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<(f64, f64)> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let ex = c.0 - a.0;
    let ey = c.1 - a.1;

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = 0.5 / (dx * ey - dy * ex);

    let x = (ey * bl - dy * cl) * d;
    let y = (dx * cl - ex * bl) * d;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// The center of the circle through `a`, `b` and `c`, or `None` for collinear points.
pub fn circumcenter(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<(f64, f64)> {
    if orient2d(a, b, c) == 0.0 {
        return None;
    }
    circumcenter_offset(a, b, c).map(|(x, y)| (a.0 + x, a.1 + y))
}

/// Squared circumradius of `a`, `b`, `c`; infinite for collinear points.
pub(crate) fn circumradius_sq(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    if orient2d(a, b, c) == 0.0 {
        return f64::INFINITY;
    }
    circumcenter_offset(a, b, c)
        .map(|(x, y)| x * x + y * y)
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn orientation_signs() {
        assert!(orient2d((0., 0.), (10., 0.), (5., 1.)) > 0.);
        assert!(orient2d((0., 0.), (10., 0.), (5., -1.)) < 0.);
        assert_eq!(orient2d((0., 0.), (10., 0.), (5., 0.)), 0.);
        assert_eq!(orient2d((1., 1.), (1., 1.), (3., 4.)), 0.);
    }

    #[test]
    fn near_collinear_is_zero() {
        // Points on y = x far from the origin, perturbed below the spacing of f64 there
        let base = 1.0e7;
        let a = (base, base);
        let b = (base + 1.0, base + 1.0);
        let c = (base + 2.0, base + 2.0 + 1.0e-12);
        assert_eq!(orient2d(a, b, c), 0.);

        // A perturbation far above the rounding error keeps its sign
        let c = (base + 2.0, base + 2.0 + 1.0e-3);
        assert!(orient2d(a, b, c) > 0.);
    }

    #[test]
    fn incircle_signs() {
        let a = (0., 0.);
        let b = (2., 0.);
        let c = (0., 2.);
        assert!(incircle(a, b, c, (1., 1.)) > 0.);
        assert!(incircle(a, b, c, (5., 5.)) < 0.);
        // (2, 2) is on the circle through the unit square's corners
        assert_eq!(incircle(a, b, c, (2., 2.)), 0.);
        // Reversed orientation reverses the sign
        assert!(incircle(a, c, b, (1., 1.)) < 0.);
    }

    #[test]
    fn cocircular_far_from_origin_is_zero() {
        // Integer points on a circle of radius 5, offset to projected-metre magnitudes
        let (ox, oy) = (3_300_000., -7_100_000.);
        let a = (ox + 5., oy);
        let b = (ox + 3., oy + 4.);
        let c = (ox - 4., oy + 3.);
        let d = (ox, oy - 5.);
        assert_eq!(incircle(a, b, c, d), 0.);
        assert!(incircle(a, b, c, (ox, oy)) > 0.);
    }

    #[test]
    fn circumcenter_of_right_triangle() {
        let center = circumcenter((0., 0.), (4., 0.), (0., 2.)).unwrap();
        assert!((center.0 - 2.).abs() < 1e-12);
        assert!((center.1 - 1.).abs() < 1e-12);
        assert!((circumradius_sq((0., 0.), (4., 0.), (0., 2.)) - 5.).abs() < 1e-12);

        assert!(circumcenter((0., 0.), (1., 1.), (2., 2.)).is_none());
        assert!(circumradius_sq((0., 0.), (1., 1.), (2., 2.)).is_infinite());
    }
}
