//! Reduction of arbitrary geometries to one of the basic linear or areal kinds.

use std::sync::Arc;

use crate::algorithm::curve::{linearize_curve, Linearize};
use crate::geometry::{Dimension, Geometry, GeometryType, SpatialRef};
use crate::options::StrokeOptions;

/// A standalone LinearRing behaves as a LineString.
pub(crate) fn as_line_string(geom: Geometry) -> Geometry {
    match geom {
        Geometry::LinearRing(c) => Geometry::LineString(c),
        other => other,
    }
}

/// Wrap `geom` as the only member of a new `kind` geometry.
pub(crate) fn wrap(kind: GeometryType, geom: Geometry) -> Geometry {
    let crs = geom.crs().cloned();
    let dim = geom.dimension();
    Geometry::new_collection(kind, vec![geom], dim).with_crs(crs)
}

/// Rebuild `geom` as a `kind` geometry whose members are relabelled as `member_kind`.
pub(crate) fn recast_members(
    geom: Geometry,
    kind: GeometryType,
    member_kind: GeometryType,
) -> Geometry {
    let crs = geom.crs().cloned();
    let dim = geom.dimension();
    let members = geom
        .into_members()
        .into_iter()
        .map(|m| m.cast(member_kind))
        .collect();
    Geometry::new_collection(kind, members, dim).with_crs(crs)
}

fn linearize_if_curved(geom: Geometry, options: &StrokeOptions) -> Geometry {
    if geom.has_curve_geometry(false) {
        geom.linearize(options)
    } else {
        geom
    }
}

fn collect(
    kind: GeometryType,
    members: Vec<Geometry>,
    dim: Dimension,
    crs: Option<Arc<SpatialRef>>,
) -> Geometry {
    Geometry::new_collection(kind, members, dim).with_crs(crs)
}

/// Convert to a Polygon.
///
/// Curve polygons are linearized, closed curves of at least 3 points become the exterior of a
/// new polygon and single-patch surfaces are unwrapped. The rings of every polygon member of a
/// GeometryCollection, MultiPolygon or MultiSurface are gathered into one polygon: the first
/// exterior stays the exterior, every other ring becomes an interior ring. Other members are
/// dropped. Anything else is returned unchanged.
pub fn force_to_polygon(geom: Geometry, options: &StrokeOptions) -> Geometry {
    use GeometryType::*;
    let crs = geom.crs().cloned();
    let dim = geom.dimension();
    match geom.geometry_type() {
        CurvePolygon => return geom.linearize(options),
        Polygon | Triangle => return geom.cast(Polygon),
        t if t.is_curve() => {
            if geom.num_points() >= 3 && geom.is_closed() {
                let ring = linearize_curve(&geom, options);
                return Geometry::polygon(vec![ring], dim).with_crs(crs);
            }
        }
        PolyhedralSurface | Tin if geom.num_members() == 1 => {
            return match geom.into_members().pop() {
                Some(patch) => patch.cast(Polygon).with_crs(crs),
                None => Geometry::empty(Polygon, dim).with_crs(crs),
            };
        }
        _ => {}
    }

    if !matches!(
        geom.geometry_type(),
        GeometryCollection | MultiPolygon | MultiSurface
    ) {
        return geom;
    }

    let geom = linearize_if_curved(geom, options);
    let mut rings = vec![];
    for member in geom.into_members() {
        if member.geometry_type() != Polygon || member.num_members() == 0 {
            continue;
        }
        rings.extend(member.into_members());
    }
    collect(Polygon, rings, dim, crs)
}

/// Convert to a MultiPolygon.
///
/// Polygons are wrapped, surfaces are relabelled and curves are linearized. A
/// GeometryCollection is only converted when every member is polygonal.
pub fn force_to_multi_polygon(geom: Geometry, options: &StrokeOptions) -> Geometry {
    use GeometryType::*;
    let crs = geom.crs().cloned();
    let dim = geom.dimension();
    match geom.geometry_type() {
        MultiPolygon => geom,
        MultiSurface => geom.linearize(options),
        GeometryCollection => {
            let geom = linearize_if_curved(geom, options);
            let convertible = geom.members().iter().all(|m| {
                matches!(
                    m.geometry_type(),
                    Polygon | MultiPolygon | PolyhedralSurface | Tin
                )
            });
            if !convertible {
                return geom;
            }
            let mut polygons = vec![];
            for member in geom.into_members() {
                if member.geometry_type() == Polygon {
                    polygons.push(member);
                } else {
                    polygons.extend(force_to_multi_polygon(member, options).into_members());
                }
            }
            collect(MultiPolygon, polygons, dim, crs)
        }
        CurvePolygon => wrap(MultiPolygon, geom.linearize(options)),
        PolyhedralSurface | Tin => recast_members(geom, MultiPolygon, Polygon),
        Triangle => force_to_multi_polygon(force_to_polygon(geom, options), options),
        Polygon => wrap(MultiPolygon, geom),
        _ => geom,
    }
}

/// Convert to a MultiPoint.
///
/// Points are wrapped; a GeometryCollection made only of points is relabelled.
pub fn force_to_multi_point(geom: Geometry) -> Geometry {
    match geom.geometry_type() {
        GeometryType::GeometryCollection
            if geom
                .members()
                .iter()
                .all(|m| m.geometry_type() == GeometryType::Point) =>
        {
            geom.cast(GeometryType::MultiPoint)
        }
        GeometryType::Point => wrap(GeometryType::MultiPoint, geom),
        _ => geom,
    }
}

fn rings_as_lines(
    polygons: Vec<Geometry>,
    dim: Dimension,
    crs: Option<Arc<SpatialRef>>,
) -> Geometry {
    let lines = polygons
        .into_iter()
        .flat_map(|p| p.into_members())
        .filter(|ring| !ring.is_empty())
        .map(as_line_string)
        .collect();
    collect(GeometryType::MultiLineString, lines, dim, crs)
}

/// Convert to a MultiLineString.
///
/// Line strings are wrapped, curves are linearized and every ring of a polygonal geometry
/// becomes a member line string. A GeometryCollection is only converted when every member is
/// a line string.
pub fn force_to_multi_line_string(geom: Geometry, options: &StrokeOptions) -> Geometry {
    use GeometryType::*;
    let crs = geom.crs().cloned();
    let dim = geom.dimension();
    match geom.geometry_type() {
        MultiLineString => geom,
        GeometryCollection => {
            let geom = linearize_if_curved(geom, options);
            if geom
                .members()
                .iter()
                .all(|m| m.geometry_type() == LineString)
            {
                geom.cast(MultiLineString)
            } else {
                geom
            }
        }
        LineString | LinearRing => wrap(MultiLineString, as_line_string(geom)),
        Polygon | Triangle | CurvePolygon => {
            rings_as_lines(vec![geom.linearize(options)], dim, crs)
        }
        PolyhedralSurface | Tin | MultiPolygon | MultiSurface => {
            let multi_polygon = force_to_multi_polygon(geom, options);
            rings_as_lines(multi_polygon.into_members(), dim, crs)
        }
        CircularString | CompoundCurve => wrap(MultiLineString, geom.linearize(options)),
        MultiCurve => geom.linearize(options),
        _ => geom,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Coord;
    use crate::test::curve::{circular_arc, curve_polygon};
    use crate::test::linestring::{ls0, ls1};
    use crate::test::point::{p0, p1};
    use crate::test::polygon::{square, square_with_hole};

    #[test]
    fn collection_to_polygon_gathers_rings() {
        let gc = Geometry::new_collection(
            GeometryType::GeometryCollection,
            vec![square_with_hole(), p0(), square(20., 20., 1.)],
            Dimension::XY,
        );
        let polygon = force_to_polygon(gc, &StrokeOptions::default());
        assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
        assert_eq!(polygon.num_members(), 3);
        assert_eq!(polygon.exterior_ring(), square_with_hole().exterior_ring());
    }

    #[test]
    fn closed_curve_to_polygon() {
        let ring = Geometry::line_string(
            vec![
                Coord::new(0., 0.),
                Coord::new(0., 1.),
                Coord::new(1., 1.),
                Coord::new(0., 0.),
            ],
            Dimension::XY,
        );
        let polygon = force_to_polygon(ring, &StrokeOptions::default());
        assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
        assert_eq!(
            polygon.exterior_ring().map(|r| r.geometry_type()),
            Some(GeometryType::LinearRing)
        );

        // Open lines cannot bound a face.
        let open = force_to_polygon(ls0(), &StrokeOptions::default());
        assert_eq!(open, ls0());
    }

    #[test]
    fn curve_polygon_to_multi_polygon() {
        let mp = force_to_multi_polygon(curve_polygon(), &StrokeOptions::default());
        assert_eq!(mp.geometry_type(), GeometryType::MultiPolygon);
        assert_eq!(mp.num_members(), 1);
        assert!(!mp.has_curve_geometry(false));
    }

    #[test]
    fn mixed_collection_is_not_multi_polygon() {
        let gc = Geometry::new_collection(
            GeometryType::GeometryCollection,
            vec![square(0., 0., 1.), ls0()],
            Dimension::XY,
        );
        let out = force_to_multi_polygon(gc.clone(), &StrokeOptions::default());
        assert_eq!(out, gc);
    }

    #[test]
    fn points() {
        let gc = Geometry::new_collection(
            GeometryType::GeometryCollection,
            vec![p0(), p1()],
            Dimension::XY,
        );
        let mp = force_to_multi_point(gc);
        assert_eq!(mp.geometry_type(), GeometryType::MultiPoint);
        assert_eq!(mp.members(), &[p0(), p1()]);
        assert_eq!(
            force_to_multi_point(p0()).geometry_type(),
            GeometryType::MultiPoint
        );
        assert_eq!(force_to_multi_point(ls0()), ls0());
    }

    #[test]
    fn polygon_rings_to_lines() {
        let mls = force_to_multi_line_string(square_with_hole(), &StrokeOptions::default());
        assert_eq!(mls.geometry_type(), GeometryType::MultiLineString);
        assert_eq!(mls.num_members(), 2);
        assert!(mls
            .members()
            .iter()
            .all(|m| m.geometry_type() == GeometryType::LineString));
    }

    #[test]
    fn lines_to_multi_line_string() {
        let gc = Geometry::new_collection(
            GeometryType::GeometryCollection,
            vec![ls0(), ls1()],
            Dimension::XY,
        );
        let options = StrokeOptions::default();
        assert_eq!(
            force_to_multi_line_string(gc, &options).geometry_type(),
            GeometryType::MultiLineString
        );
        let arc = force_to_multi_line_string(circular_arc(), &options);
        assert_eq!(arc.geometry_type(), GeometryType::MultiLineString);
        assert!(arc.num_points() > 3);
    }
}
