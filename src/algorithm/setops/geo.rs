use geo::relate::IntersectionMatrix;
use geo::{BooleanOps, Relate};

use crate::algorithm::setops::SetOperations;
use crate::geometry::Geometry;
use crate::io::geo::{geometry_to_geo, line_string_to_geo, polygon_to_geo};

/// Set operations backed by the [`geo`] crate.
///
/// Only X and Y take part. Curved geometries must be linearized beforehand; for them every
/// answer is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoSetOperations;

fn relate(a: &Geometry, b: &Geometry) -> Option<IntersectionMatrix> {
    let a = geometry_to_geo(a)
        .map_err(|err| log::debug!("geo relate: {err}"))
        .ok()?;
    let b = geometry_to_geo(b)
        .map_err(|err| log::debug!("geo relate: {err}"))
        .ok()?;
    Some(a.relate(&b))
}

fn multi_polygon(geom: &Geometry) -> Option<geo::MultiPolygon> {
    match geom {
        Geometry::Polygon(_) | Geometry::Triangle(_) => {
            Some(geo::MultiPolygon::new(vec![polygon_to_geo(geom).ok()?]))
        }
        Geometry::MultiPolygon(_) | Geometry::PolyhedralSurface(_) | Geometry::Tin(_) => {
            let polygons = geom
                .members()
                .iter()
                .map(polygon_to_geo)
                .collect::<crate::error::Result<Vec<_>>>()
                .ok()?;
            Some(geo::MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

fn multi_line_string(geom: &Geometry) -> Option<geo::MultiLineString> {
    match geom {
        Geometry::LineString(c) | Geometry::LinearRing(c) => {
            Some(geo::MultiLineString::new(vec![line_string_to_geo(c)]))
        }
        Geometry::MultiLineString(_) => Some(geo::MultiLineString::new(
            geom.members()
                .iter()
                .filter_map(|m| m.as_curve().map(line_string_to_geo))
                .collect(),
        )),
        _ => None,
    }
}

/// Overlay `a` with the polygonal `b`. Linear `a` is clipped by `b`, keeping the pieces
/// outside of it when `outside` is set.
fn overlay(
    a: &Geometry,
    b: &Geometry,
    op: impl Fn(&geo::MultiPolygon, &geo::MultiPolygon) -> geo::MultiPolygon,
    outside: bool,
) -> Option<Geometry> {
    let clip = multi_polygon(b)?;
    let mut out = match multi_polygon(a) {
        Some(polygons) => Geometry::from(op(&polygons, &clip)),
        None => Geometry::from(clip.clip(&multi_line_string(a)?, outside)),
    };
    if a.has_z() || a.has_m() {
        log::debug!("Z and M are dropped by the geo overlay");
    }
    out.assign_crs(a.crs().cloned());
    Some(out)
}

impl SetOperations for GeoSetOperations {
    fn contains(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        Some(relate(a, b)?.is_contains())
    }

    fn overlaps(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        relate(a, b)?.matches("T*T***T**").ok()
    }

    fn touches(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        let matrix = relate(a, b)?;
        let mut touches = false;
        for pattern in ["FT*******", "F**T*****", "F***T****"] {
            touches |= matrix.matches(pattern).ok()?;
        }
        Some(touches)
    }

    fn difference(&self, a: &Geometry, b: &Geometry) -> Option<Geometry> {
        overlay(a, b, |a, b| a.difference(b), true)
    }

    fn intersection(&self, a: &Geometry, b: &Geometry) -> Option<Geometry> {
        overlay(a, b, |a, b| a.intersection(b), false)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Coord, Dimension, GeometryType};
    use crate::test::polygon::square;
    use approx::assert_relative_eq;

    fn area(geom: &Geometry) -> f64 {
        geom.members()
            .iter()
            .map(|p| {
                let exterior = p.exterior_ring().and_then(|r| r.as_curve()).unwrap();
                exterior.signed_area().abs()
                    - p.interior_rings()
                        .iter()
                        .map(|r| r.as_curve().unwrap().signed_area().abs())
                        .sum::<f64>()
            })
            .sum()
    }

    #[test]
    fn predicates() {
        let ops = GeoSetOperations;
        assert_eq!(ops.contains(&square(0., 0., 10.), &square(2., 2., 2.)), Some(true));
        assert_eq!(ops.overlaps(&square(0., 0., 4.), &square(2., 2., 4.)), Some(true));
        assert_eq!(ops.touches(&square(0., 0., 4.), &square(4., 0., 4.)), Some(true));
        assert_eq!(ops.contains(&crate::test::curve::circular_arc(), &square(0., 0., 1.)), None);
    }

    #[test]
    fn overlays() {
        let ops = GeoSetOperations;
        let diff = ops.difference(&square(0., 0., 4.), &square(2., 2., 4.)).unwrap();
        assert_eq!(diff.geometry_type(), GeometryType::MultiPolygon);
        assert_relative_eq!(area(&diff), 12.);
        let inter = ops.intersection(&square(0., 0., 4.), &square(2., 2., 4.)).unwrap();
        assert_relative_eq!(area(&inter), 4.);
    }

    #[test]
    fn lines_are_clipped() {
        let ops = GeoSetOperations;
        let line = Geometry::line_string(
            vec![Coord::new(-2., 1.), Coord::new(6., 1.)],
            Dimension::XY,
        );
        let inside = ops.intersection(&line, &square(0., 0., 4.)).unwrap();
        assert_eq!(inside.geometry_type(), GeometryType::MultiLineString);
        assert_eq!(inside.num_members(), 1);
        assert_relative_eq!(inside.envelope().minx, 0.);
        assert_relative_eq!(inside.envelope().maxx, 4.);

        let outside = ops.difference(&line, &square(0., 0., 4.)).unwrap();
        assert_eq!(outside.num_members(), 2);
    }

    #[test]
    fn point_predicates() {
        let ops = GeoSetOperations;
        let inside = Geometry::point(Coord::new(1., 1.), Dimension::XY);
        let corner = Geometry::point(Coord::new(0., 0.), Dimension::XY);
        assert_eq!(ops.contains(&square(0., 0., 4.), &inside), Some(true));
        assert_eq!(ops.touches(&square(0., 0., 4.), &corner), Some(true));
        assert_eq!(ops.contains(&square(0., 0., 4.), &corner), Some(false));
    }
}
