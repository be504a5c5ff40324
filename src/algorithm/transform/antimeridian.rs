//! Cutting geometries of a projection that is continuous across the antimeridian.

use crate::algorithm::setops::SetOperations;
use crate::algorithm::transform::{overlay_unavailable, transform_xy, CoordinateTransform};
use crate::geometry::{Coord, Dimension, Geometry, SimpleCurve};

/// Tolerance in degrees when probing the antimeridian and snapping onto it.
const EPS: f64 = 1e-8;

/// Half-width in degrees of the polygon cut out along the antimeridian.
const CUT_EPS: f64 = 1e-9;

const MAX_BISECTIONS: usize = 50;

/// A latitude representative of `geom`: that of the middle of the western edge of its
/// envelope.
fn mean_latitude(geom: &Geometry, ct: &dyn CoordinateTransform) -> Option<f64> {
    let envelope = geom.envelope();
    if envelope.is_empty() {
        return None;
    }
    transform_xy(ct, envelope.minx, (envelope.miny + envelope.maxy) / 2.).map(|c| c.y)
}

fn distance(a: &Coord, b: &Coord) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Whether the source projection of `ct` is continuous across the antimeridian near `geom`:
/// points just either side of ±180° project close to each other and map back to where they
/// started.
pub(super) fn crosses_antimeridian(
    ct: &dyn CoordinateTransform,
    inverse: &dyn CoordinateTransform,
    geom: &Geometry,
) -> bool {
    let Some(latitude) = mean_latitude(geom, ct) else {
        return false;
    };
    let east = Coord::new(180. - EPS, latitude);
    let west = Coord::new(-180. + EPS, latitude);
    let mut projected = [east, west];
    if !inverse.transform(&mut projected) || distance(&projected[0], &projected[1]) > 1. {
        return false;
    }
    ct.transform(&mut projected)
        && distance(&projected[0], &east) <= 2. * EPS
        && distance(&projected[1], &west) <= 2. * EPS
}

fn crosses_in_longitude(x: f64, x2: f64, lon: f64, lon2: f64) -> bool {
    (x2 - x) * (lon2 - lon) < 0.
}

/// Where the segment `start`-`end` (source coordinates) meets the antimeridian, as a latitude.
fn bisect_segment(ct: &dyn CoordinateTransform, start: Coord, end: Coord) -> Option<f64> {
    let off_antimeridian = |lon: f64| (lon.abs() - 180.).abs() > EPS;
    let (mut start, mut end) = (start, end);
    let mut start_lon = transform_xy(ct, start.x, start.y)?.x;
    let mut end_lon = transform_xy(ct, end.x, end.y)?.x;
    let mut iterations = 0;
    while iterations < MAX_BISECTIONS && (off_antimeridian(start_lon) || off_antimeridian(end_lon))
    {
        let mid = Coord::new((start.x + end.x) / 2., (start.y + end.y) / 2.);
        let mid_lon = transform_xy(ct, mid.x, mid.y)?.x;
        if crosses_in_longitude(start.x, mid.x, start_lon, mid_lon)
            || (mid.x == start.x && mid_lon * start_lon < 0.)
        {
            end = mid;
            end_lon = mid_lon;
        } else {
            start = mid;
            start_lon = mid_lon;
        }
        iterations += 1;
    }
    if iterations == MAX_BISECTIONS {
        return None;
    }
    transform_xy(ct, (start.x + end.x) / 2., (start.y + end.y) / 2.).map(|c| c.y)
}

/// Collect, as (180, latitude) pairs, every point where a line or ring of `geom` crosses the
/// antimeridian once transformed.
fn collect_points_on_antimeridian(
    geom: &Geometry,
    ct: &dyn CoordinateTransform,
    points: &mut Vec<Coord>,
) {
    if let Geometry::Point(_) = geom {
        return;
    }
    let Some(curve) = geom.as_curve() else {
        for member in geom.members() {
            collect_points_on_antimeridian(member, ct, points);
        }
        return;
    };
    for segment in curve.coords.windows(2) {
        let (p, q) = (segment[0], segment[1]);
        let (Some(tp), Some(tq)) = (transform_xy(ct, p.x, p.y), transform_xy(ct, q.x, q.y)) else {
            continue;
        };
        let near_antimeridian = |lon: f64| (lon.abs() - 180.).abs() < 10.;
        let crosses = crosses_in_longitude(p.x, q.x, tp.x, tq.x)
            || (p.x == q.x
                && tp.x * tq.x < 0.
                && near_antimeridian(tp.x)
                && near_antimeridian(tq.x));
        if !crosses {
            continue;
        }
        if let Some(latitude) = bisect_segment(ct, p, q) {
            points.push(Coord::new(180., latitude));
        }
    }
}

/// Prepare `geom`, in the coordinates of a projection continuous across the antimeridian, for
/// transformation to geographic coordinates.
///
/// A very thin polygon is cut out of the geometry through every point where it crosses the
/// antimeridian, so that each remaining part transforms to one side of it. Returns whether
/// the transformed result should be snapped to the longitude and latitude bounds.
pub(super) fn cut_before_antimeridian(
    geom: Geometry,
    ct: &dyn CoordinateTransform,
    inverse: &dyn CoordinateTransform,
    set_operations: &dyn SetOperations,
) -> (Geometry, bool) {
    let envelope = geom.envelope();
    let Some(latitude) = mean_latitude(&geom, ct) else {
        return (geom, false);
    };
    let Some(crossing) = transform_xy(inverse, 180., latitude) else {
        return (geom, false);
    };
    if !envelope.contains_coord(&crossing) {
        return (geom, false);
    }

    let mut points = vec![];
    collect_points_on_antimeridian(&geom, ct, &mut points);
    points.sort_by(|a, b| a.y.total_cmp(&b.y));
    let (Some(first), Some(last)) = (points.first().map(|p| p.y), points.last().map(|p| p.y))
    else {
        return (geom, false);
    };

    let mut ring = vec![Coord::new(180. - CUT_EPS, first - CUT_EPS)];
    ring.extend(points.iter().map(|p| Coord::new(180. - CUT_EPS, p.y)));
    ring.push(Coord::new(180. - CUT_EPS, last + CUT_EPS));
    ring.push(Coord::new(180. + CUT_EPS, last + CUT_EPS));
    ring.extend(points.iter().rev().map(|p| Coord::new(180. + CUT_EPS, p.y)));
    ring.push(Coord::new(180. + CUT_EPS, first - CUT_EPS));
    if !inverse.transform(&mut ring) {
        return (geom, false);
    }
    let mut ring = SimpleCurve::new(ring, Dimension::XY);
    ring.close();
    let cutter = Geometry::polygon(vec![ring], Dimension::XY);
    log::debug!("Cutting along the antimeridian at {} points", points.len());

    match set_operations.difference(&geom, &cutter) {
        Some(cut) => (cut, true),
        None => {
            overlay_unavailable();
            (geom, false)
        }
    }
}

/// Snap longitudes within 1e-8 of ±180 and latitudes within 1e-8 of ±90 onto those bounds.
pub(super) fn snap_coords_close_to_lat_long_bounds(geom: &mut Geometry) {
    let snap = |value: f64, bound: f64| {
        if (value - bound).abs() < EPS {
            bound
        } else if (value + bound).abs() < EPS {
            -bound
        } else {
            value
        }
    };
    geom.visit_coords_mut(&mut |c| {
        c.x = snap(c.x, 180.);
        c.y = snap(c.y, 90.);
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithm::setops::GeoSetOperations;
    use crate::algorithm::transform::test_transforms::PacificPlateCarree;
    use crate::geometry::GeometryType;
    use approx::assert_relative_eq;

    #[test]
    fn detection() {
        let ct = PacificPlateCarree { inverse: false };
        let inverse = ct.inverse().unwrap();
        let line = Geometry::line_string(
            vec![Coord::new(-5., 10.), Coord::new(5., 10.)],
            Dimension::XY,
        );
        assert!(crosses_antimeridian(&ct, inverse.as_ref(), &line));
    }

    #[test]
    fn crossing_points() {
        let ct = PacificPlateCarree { inverse: false };
        let line = Geometry::line_string(
            vec![Coord::new(-5., 10.), Coord::new(5., 20.), Coord::new(10., 20.)],
            Dimension::XY,
        );
        let mut points = vec![];
        collect_points_on_antimeridian(&line, &ct, &mut points);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 180.);
        assert_relative_eq!(points[0].y, 15., epsilon = 1e-6);
    }

    #[test]
    fn polygon_is_split() {
        let ct = PacificPlateCarree { inverse: false };
        let inverse = ct.inverse().unwrap();
        let square = crate::test::polygon::square(-5., 0., 10.);
        let (cut, snap) =
            cut_before_antimeridian(square, &ct, inverse.as_ref(), &GeoSetOperations);
        assert!(snap);
        assert_eq!(cut.geometry_type(), GeometryType::MultiPolygon);
        assert_eq!(cut.num_members(), 2);
    }

    #[test]
    fn snapping() {
        let mut line = Geometry::line_string(
            vec![Coord::new(180. - 1e-9, 90. - 1e-9), Coord::new(-180. + 1e-9, 45.)],
            Dimension::XY,
        );
        snap_coords_close_to_lat_long_bounds(&mut line);
        assert_eq!(line.start_point(), Some(Coord::new(180., 90.)));
        assert_eq!(line.end_point(), Some(Coord::new(-180., 45.)));
    }
}
