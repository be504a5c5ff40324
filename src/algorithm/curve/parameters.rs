use std::f64::consts::PI;

use crate::geometry::Coord;

/// Determinant below which three points are taken as collinear.
const COLLINEAR_THRESHOLD: f64 = 1e-8;

/// The circle through three points, and the angles of the points on it.
///
/// Angles are in radians and are continuous: `alpha1` lies between `alpha0` and `alpha2`, so
/// walking from `alpha0` to `alpha2` passes through the intermediate point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParameters {
    pub radius: f64,
    pub cx: f64,
    pub cy: f64,
    pub alpha0: f64,
    pub alpha1: f64,
    pub alpha2: f64,
}

impl ArcParameters {
    pub fn center(&self) -> Coord {
        Coord::new(self.cx, self.cy)
    }

    /// Whether the arc runs clockwise from its first to its last point.
    pub fn is_clockwise(&self) -> bool {
        self.alpha1 < self.alpha0
    }

    /// The point of the circle at angle `alpha`.
    pub(crate) fn point_at(&self, alpha: f64) -> (f64, f64) {
        (
            self.cx + self.radius * alpha.cos(),
            self.cy + self.radius * alpha.sin(),
        )
    }
}

pub(crate) fn distance(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    ((x1 - x0) * (x1 - x0) + (y1 - y0) * (y1 - y0)).sqrt()
}

/// Compute the circle passing through `p0`, `p1` and `p2`.
///
/// Returns `None` when the points are collinear, coincide, or hold NaN. When `p0 == p2` the
/// three points describe a full circle whose diameter is `p0`-`p1`, walked counter-clockwise.
///
/// ```
/// use std::f64::consts::PI;
/// use geofactory::algorithm::curve::curve_parameters;
/// use geofactory::geometry::Coord;
///
/// let arc = curve_parameters(&Coord::new(0., 0.), &Coord::new(1., 1.), &Coord::new(2., 0.))
///     .unwrap();
/// assert_eq!((arc.radius, arc.cx, arc.cy), (1., 1., 0.));
/// assert_eq!((arc.alpha0, arc.alpha1, arc.alpha2), (PI, PI / 2., 0.));
/// assert!(arc.is_clockwise());
/// ```
pub fn curve_parameters(p0: &Coord, p1: &Coord, p2: &Coord) -> Option<ArcParameters> {
    let (x0, y0, x1, y1, x2, y2) = (p0.x, p0.y, p1.x, p1.y, p2.x, p2.y);
    if [x0, y0, x1, y1, x2, y2].iter().any(|v| v.is_nan()) {
        return None;
    }

    if x0 == x2 && y0 == y2 {
        if x0 == x1 && y0 == y1 {
            return None;
        }
        let cx = (x0 + x1) / 2.;
        let cy = (y0 + y1) / 2.;
        let alpha0 = (y0 - cy).atan2(x0 - cx);
        return Some(ArcParameters {
            radius: distance(cx, cy, x0, y0),
            cx,
            cy,
            alpha0,
            alpha1: alpha0 + PI,
            alpha2: alpha0 + 2. * PI,
        });
    }

    // Work on deltas scaled to at most 1 so that large coordinates do not cancel out.
    let (mut dx01, mut dy01) = (x1 - x0, y1 - y0);
    let (mut dx12, mut dy12) = (x2 - x1, y2 - y1);
    let scale = dx01.abs().max(dy01.abs()).max(dx12.abs()).max(dy12.abs());
    let inv_scale = 1. / scale;
    dx01 *= inv_scale;
    dy01 *= inv_scale;
    dx12 *= inv_scale;
    dy12 *= inv_scale;

    let det = dx01 * dy12 - dx12 * dy01;
    if det.abs() < COLLINEAR_THRESHOLD || det.is_nan() {
        return None;
    }
    let x01_mid = (x0 + x1) * inv_scale;
    let x12_mid = (x1 + x2) * inv_scale;
    let y01_mid = (y0 + y1) * inv_scale;
    let y12_mid = (y1 + y2) * inv_scale;
    let c01 = dx01 * x01_mid + dy01 * y01_mid;
    let c12 = dx12 * x12_mid + dy12 * y12_mid;
    let cx = 0.5 * scale * (c01 * dy12 - c12 * dy01) / det;
    let cy = 0.5 * scale * (-c01 * dx12 + c12 * dx01) / det;

    let alpha0 = ((y0 - cy) * inv_scale).atan2((x0 - cx) * inv_scale);
    let mut alpha1 = ((y1 - cy) * inv_scale).atan2((x1 - cx) * inv_scale);
    let mut alpha2 = ((y2 - cy) * inv_scale).atan2((x2 - cx) * inv_scale);

    if det < 0. {
        if alpha1 > alpha0 {
            alpha1 -= 2. * PI;
        }
        if alpha2 > alpha1 {
            alpha2 -= 2. * PI;
        }
    } else {
        if alpha1 < alpha0 {
            alpha1 += 2. * PI;
        }
        if alpha2 < alpha1 {
            alpha2 += 2. * PI;
        }
    }
    debug_assert!(
        (alpha0 <= alpha1 && alpha1 <= alpha2) || (alpha0 >= alpha1 && alpha1 >= alpha2)
    );

    Some(ArcParameters {
        radius: distance(cx, cy, x0, y0),
        cx,
        cy,
        alpha0,
        alpha1,
        alpha2,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn counter_clockwise_arc() {
        let arc = curve_parameters(&Coord::new(2., 0.), &Coord::new(1., 1.), &Coord::new(0., 0.))
            .unwrap();
        assert!(!arc.is_clockwise());
        assert_relative_eq!(arc.alpha0, 0.);
        assert_relative_eq!(arc.alpha1, PI / 2.);
        assert_relative_eq!(arc.alpha2, PI);
    }

    #[test]
    fn collinear() {
        assert!(
            curve_parameters(&Coord::new(0., 0.), &Coord::new(1., 0.), &Coord::new(2., 0.))
                .is_none()
        );
        assert!(curve_parameters(
            &Coord::new(0., 0.),
            &Coord::new(0., 0.),
            &Coord::new(0., 0.)
        )
        .is_none());
        assert!(curve_parameters(
            &Coord::new(f64::NAN, 0.),
            &Coord::new(1., 1.),
            &Coord::new(2., 0.)
        )
        .is_none());
    }

    #[test]
    fn full_circle() {
        let arc = curve_parameters(&Coord::new(0., 0.), &Coord::new(2., 0.), &Coord::new(0., 0.))
            .unwrap();
        assert_eq!((arc.radius, arc.cx, arc.cy), (1., 1., 0.));
        assert_relative_eq!(arc.alpha2 - arc.alpha0, 2. * PI);
    }

    #[test]
    fn large_coordinates() {
        let offset = 1e7;
        let arc = curve_parameters(
            &Coord::new(offset, offset),
            &Coord::new(offset + 1., offset + 1.),
            &Coord::new(offset + 2., offset),
        )
        .unwrap();
        assert_relative_eq!(arc.radius, 1., epsilon = 1e-8);
        assert_relative_eq!(arc.cx, offset + 1., epsilon = 1e-8);
    }
}
