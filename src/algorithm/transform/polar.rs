//! Cutting geometries that contain or touch a pole of a polar projection.

use crate::algorithm::setops::SetOperations;
use crate::algorithm::transform::{overlay_unavailable, transform_xy, CoordinateTransform};
use crate::geometry::{Coord, Dimension, Geometry, SimpleCurve};

/// Distance in degrees between the cutting wedge and the antimeridian or the pole.
const EPS: f64 = 1e-9;

/// How far, in source units, a vertex sitting on the pole is moved along its segments.
const POLE_NUDGE: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Pole {
    North,
    South,
}

impl Pole {
    fn sign(&self) -> f64 {
        match self {
            Pole::North => 1.,
            Pole::South => -1.,
        }
    }

    fn latitude(&self) -> f64 {
        self.sign() * 90.
    }
}

/// Whether the pole at `latitude` is a regular point of the source projection: it maps back
/// and forth, and two points close to it on either side land half a turn apart in longitude.
fn is_polar(
    ct: &dyn CoordinateTransform,
    inverse: &dyn CoordinateTransform,
    latitude: f64,
) -> bool {
    let Some(pole) = transform_xy(inverse, 0., latitude) else {
        return false;
    };
    // Some projections send a pole they cannot represent to a huge finite value.
    if pole.x.abs() >= 1e10 || pole.y.abs() >= 1e10 {
        return false;
    }
    let mut probes = [
        pole,
        Coord::new(pole.x - 1e5, pole.y - 1e5),
        Coord::new(pole.x + 1e5, pole.y + 1e5),
    ];
    ct.transform(&mut probes)
        && (probes[0].y - latitude).abs() < 1e-10
        && (probes[2].x - probes[1].x).abs() > 170.
        && (probes[2].y - probes[1].y).abs() < 1e-10
}

/// The pole that `ct` maps continuously from its source projection, if exactly one.
pub(super) fn polar_to_geographic(
    ct: &dyn CoordinateTransform,
    inverse: &dyn CoordinateTransform,
) -> Option<Pole> {
    match (is_polar(ct, inverse, 90.), is_polar(ct, inverse, -90.)) {
        (true, false) => Some(Pole::North),
        (false, true) => Some(Pole::South),
        _ => None,
    }
}

/// Drop every vertex at `point`.
fn remove_point(geom: &mut Geometry, point: &Coord) {
    match geom {
        Geometry::Point(_) => {}
        _ => {
            if let Some(curve) = geom.as_curve_mut() {
                curve.coords.retain(|c| !c.equals_2d(point));
            } else if let Some(collection) = geom.as_collection_mut() {
                for member in collection.members.iter_mut() {
                    remove_point(member, point);
                }
            }
        }
    }
}

/// `from` moved towards `toward` by [`POLE_NUDGE`].
fn nudge(from: &Coord, toward: &Coord) -> Coord {
    let norm = (toward.x - from.x).hypot(toward.y - from.y);
    Coord {
        x: from.x + (toward.x - from.x) / norm * POLE_NUDGE,
        y: from.y + (toward.y - from.y) / norm * POLE_NUDGE,
        ..*from
    }
}

/// Replace every ring vertex at `pole` by two vertices just off it, one on each adjacent
/// segment.
fn alter_ring(ring: &mut SimpleCurve, pole: &Coord) {
    let n = ring.coords.len();
    if n < 4 {
        return;
    }
    let mut out = Vec::with_capacity(n + 2);
    let mut must_close = false;
    for i in 0..n {
        let coord = ring.coords[i];
        if !coord.equals_2d(pole) {
            out.push(coord);
            continue;
        }
        if i == 0 {
            must_close = true;
        }
        if i == n - 1 {
            continue;
        }
        let before = ring.coords[if i > 0 { i - 1 } else { n - 2 }];
        let after = ring.coords[i + 1];
        out.push(nudge(&coord, &before));
        out.push(nudge(&coord, &after));
    }
    if must_close {
        if let Some(first) = out.first().copied() {
            out.push(first);
        }
    }
    ring.coords = out;
}

fn alter_pole(geom: &mut Geometry, pole: &Coord) {
    match geom {
        Geometry::Polygon(polygon) => {
            for ring in polygon.members.iter_mut() {
                if let Some(ring) = ring.as_curve_mut() {
                    alter_ring(ring, pole);
                }
            }
        }
        Geometry::MultiLineString(collection)
        | Geometry::MultiPolygon(collection)
        | Geometry::GeometryCollection(collection) => {
            for member in collection.members.iter_mut() {
                alter_pole(member, pole);
            }
        }
        _ => {}
    }
}

/// Prepare `geom`, in the coordinates of a polar projection, for transformation to geographic
/// coordinates. `inverse` maps geographic coordinates back to the projection.
///
/// A geometry containing the pole loses a thin wedge along the antimeridian, so that its
/// image is bounded by ±180°. A geometry merely touching the pole has that vertex replaced by
/// two close neighbours. Returns whether the transformed result should be snapped to the
/// longitude and latitude bounds.
pub(super) fn cut_before_polar(
    mut geom: Geometry,
    inverse: &dyn CoordinateTransform,
    pole: Pole,
    set_operations: &dyn SetOperations,
) -> (Geometry, bool) {
    let sign = pole.sign();
    let Some(pole_coord) = transform_xy(inverse, 0., pole.latitude()) else {
        return (geom, false);
    };
    let pole_point = Geometry::point(pole_coord, Dimension::XY);
    let contains_pole = set_operations
        .contains(&geom, &pole_point)
        .unwrap_or(false);

    // Containing a point just next to the pole on the antimeridian means the geometry
    // touches the pole and crosses the antimeridian there.
    let contains_near_pole_antimeridian = transform_xy(inverse, 180., sign * (90. - EPS))
        .and_then(|near| {
            set_operations.contains(&geom, &Geometry::point(near, Dimension::XY))
        })
        .unwrap_or(false);

    let regular_touches_pole = !contains_pole
        && !contains_near_pole_antimeridian
        && set_operations.touches(&geom, &pole_point).unwrap_or(false);

    if !(contains_pole || contains_near_pole_antimeridian || regular_touches_pole) {
        return (geom, false);
    }

    // Nearly a full hemisphere in geographic terms, which projects to a thin wedge along the
    // antimeridian. It reaches the pole unless the geometry contains it.
    let mut wedge = vec![
        Coord::new(180. - EPS, 0.),
        Coord::new(180. - EPS, sign * (90. - EPS)),
    ];
    if !contains_pole {
        wedge.push(Coord::new(180., sign * 90.));
    }
    wedge.extend([
        Coord::new(-180. + EPS, sign * (90. - EPS)),
        Coord::new(-180. + EPS, 0.),
        Coord::new(180. - EPS, 0.),
    ]);
    if !inverse.transform(&mut wedge) {
        return (geom, false);
    }
    // ±180° must be continuous in the projection.
    if (wedge[0].x - wedge[wedge.len() - 2].x).abs() >= 1. {
        return (geom, false);
    }

    if contains_pole || contains_near_pole_antimeridian {
        let cutter =
            Geometry::polygon(vec![SimpleCurve::new(wedge, Dimension::XY)], Dimension::XY);
        match set_operations.difference(&geom, &cutter) {
            Some(mut cut) => {
                if contains_near_pole_antimeridian {
                    remove_point(&mut cut, &pole_coord);
                }
                geom = cut;
            }
            None => overlay_unavailable(),
        }
    }

    if regular_touches_pole {
        alter_pole(&mut geom, &pole_coord);
    }
    (geom, true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithm::setops::HeuristicSetOperations;
    use crate::algorithm::transform::test_transforms::NorthPolar;
    use crate::geometry::GeometryType;
    use crate::test::polygon::ring;

    #[test]
    fn pole_vertex_is_split() {
        let mut ring = ring(&[(0., 0.), (0., 10.), (10., 10.), (10., 0.)]);
        alter_ring(&mut ring, &Coord::new(0., 0.));
        assert_eq!(ring.coords.len(), 6);
        // Towards the previous vertex first, then towards the next one.
        assert_eq!(ring.coords[0], Coord::new(POLE_NUDGE, 0.));
        assert_eq!(ring.coords[1], Coord::new(0., POLE_NUDGE));
        assert_eq!(ring.coords[2], Coord::new(0., 10.));
        assert_eq!(ring.coords[5], ring.coords[0]);
        assert!(ring.is_closed());
    }

    #[test]
    fn removes_pole_vertices() {
        let mut line = Geometry::line_string(
            vec![Coord::new(0., 0.), Coord::new(1., 1.), Coord::new(0., 0.)],
            Dimension::XY,
        );
        remove_point(&mut line, &Coord::new(0., 0.));
        assert_eq!(line.num_points(), 1);
    }

    #[test]
    fn touching_polygon_is_nudged() {
        let ct = NorthPolar { inverse: false };
        let inverse = ct.inverse().unwrap();
        // A triangle with a corner on the pole.
        let triangle = Geometry::polygon(
            vec![ring(&[(0., 0.), (-1e5, -1e5), (1e5, -1e5)])],
            Dimension::XY,
        );
        let (out, snap) = cut_before_polar(
            triangle,
            inverse.as_ref(),
            Pole::North,
            &HeuristicSetOperations,
        );
        assert!(snap);
        assert_eq!(out.geometry_type(), GeometryType::Polygon);
        let exterior = out.exterior_ring().and_then(|r| r.as_curve()).unwrap();
        assert_eq!(exterior.coords.len(), 5);
        assert!(exterior.is_closed());
        assert!(!exterior.coords.iter().any(|c| c.x == 0. && c.y == 0.));
    }

    #[test]
    fn distant_geometry_is_untouched() {
        let ct = NorthPolar { inverse: false };
        let inverse = ct.inverse().unwrap();
        let square = Geometry::polygon(
            vec![ring(&[(1e6, 1e6), (1e6, 2e6), (2e6, 2e6), (2e6, 1e6)])],
            Dimension::XY,
        );
        let (out, snap) = cut_before_polar(
            square.clone(),
            inverse.as_ref(),
            Pole::North,
            &HeuristicSetOperations,
        );
        assert!(!snap);
        assert_eq!(out, square);
    }
}
