//! Coercion of a geometry into another kind.
//!
//! [`force_to`] walks the kind lattice: single kinds are wrapped into their multi kind,
//! one-member collections are unwrapped, linear kinds are relabelled as their curved
//! counterparts and curves are linearized when a linear kind is requested. When no rule
//! applies, the input is handed back unchanged.

mod line_string;
mod primitive;
mod sub_geoms;

pub use line_string::force_to_line_string;
pub use primitive::{
    force_to_multi_line_string, force_to_multi_point, force_to_multi_polygon, force_to_polygon,
};
pub use sub_geoms::remove_lower_dimension_sub_geoms;

use std::ops::ControlFlow::{self, Break, Continue};

use self::primitive::{as_line_string, recast_members, wrap};
use crate::geometry::{Dimension, Geometry, GeometryType};
use crate::options::StrokeOptions;

fn with_dimension(mut geom: Geometry, dim: Option<Dimension>) -> Geometry {
    if let Some(dim) = dim {
        if geom.dimension() != dim {
            geom.set_dimension(dim);
        }
    }
    geom
}

/// A polygon made of a single ring of 4 points.
fn is_triangle(polygon: &Geometry) -> bool {
    polygon.num_members() == 1
        && polygon
            .exterior_ring()
            .is_some_and(|ring| ring.num_points() == 4)
}

fn into_curve_polygon(polygon: Geometry) -> Geometry {
    let crs = polygon.crs().cloned();
    let dim = polygon.dimension();
    let rings = polygon
        .into_members()
        .into_iter()
        .map(as_line_string)
        .collect();
    Geometry::new_collection(GeometryType::CurvePolygon, rings, dim).with_crs(crs)
}

/// Convert `geom` to the `target` kind.
///
/// `dim`, when given, is the coordinate dimension of the result; otherwise the dimension of
/// the input is kept. Arcs are stroked with `options` whenever a linear kind is requested.
///
/// The conversion never fails: when `geom` cannot be represented as `target` it is returned
/// as is, possibly with curves linearized. Converting the output a second time to the same
/// target is a no-op.
///
/// ```
/// use geofactory::algorithm::force::force_to;
/// use geofactory::geometry::GeometryType;
/// use geofactory::io::wkt::parse_wkt;
/// use geofactory::options::StrokeOptions;
///
/// let (polygon, _) = parse_wkt("POLYGON ((0 0,0 1,1 1,0 0))", None).unwrap();
/// let options = StrokeOptions::default();
///
/// let tin = force_to(polygon, GeometryType::Tin, None, &options);
/// assert_eq!(tin.geometry_type(), GeometryType::Tin);
///
/// let multi = force_to(tin, GeometryType::MultiPolygon, None, &options);
/// assert_eq!(multi.geometry_type(), GeometryType::MultiPolygon);
/// ```
pub fn force_to(
    geom: Geometry,
    target: GeometryType,
    dim: Option<Dimension>,
    options: &StrokeOptions,
) -> Geometry {
    if geom.is_empty() {
        let dim = dim.unwrap_or(geom.dimension());
        return Geometry::empty(target, dim).with_crs(geom.crs().cloned());
    }
    if geom.geometry_type() == target {
        return with_dimension(geom, dim);
    }

    let geom = as_line_string(geom);
    match lattice_rules(geom, target, dim, options) {
        Break(out) => out,
        Continue(geom) => reduce(geom, target, dim, options),
    }
}

/// Conversions that relabel, wrap or unwrap along the kind lattice.
///
/// `Continue` hands the geometry over to [`reduce`].
fn lattice_rules(
    geom: Geometry,
    target: GeometryType,
    dim: Option<Dimension>,
    options: &StrokeOptions,
) -> ControlFlow<Geometry, Geometry> {
    use GeometryType::*;
    let source = geom.geometry_type();
    let crs = geom.crs().cloned();
    let done = |g: Geometry| -> ControlFlow<Geometry, Geometry> { Break(with_dimension(g, dim)) };
    // Convert through `via`, then on to `target` if that conversion happened.
    let through = |g: Geometry, via: GeometryType| -> ControlFlow<Geometry, Geometry> {
        let step = force_to(g, via, dim, options);
        if step.geometry_type() == source {
            Continue(step)
        } else {
            Break(force_to(step, target, dim, options))
        }
    };

    if matches!(source, PolyhedralSurface | Tin)
        && matches!(target, MultiSurface | GeometryCollection)
    {
        return through(geom, MultiPolygon);
    }
    if source.is_subclass_of(GeometryCollection) && target == GeometryCollection {
        return done(geom.cast(GeometryCollection));
    }

    match (source, target) {
        (Triangle, PolyhedralSurface) => return done(wrap(PolyhedralSurface, geom.cast(Polygon))),
        (Polygon, PolyhedralSurface) => return done(wrap(PolyhedralSurface, geom)),
        (MultiPolygon, PolyhedralSurface) => return done(geom.cast(PolyhedralSurface)),
        (Tin, PolyhedralSurface) => return done(recast_members(geom, PolyhedralSurface, Polygon)),
        (CurvePolygon, PolyhedralSurface) => return through(geom, Polygon),
        (MultiSurface, PolyhedralSurface) => return through(geom, MultiPolygon),
        (Triangle, Tin) => return done(wrap(Tin, geom)),
        (Polygon, Tin) if is_triangle(&geom) => return done(wrap(Tin, geom.cast(Triangle))),
        (Polygon, Triangle) if is_triangle(&geom) => return done(geom.cast(Triangle)),
        (MultiPolygon | PolyhedralSurface, Tin) if geom.members().iter().all(is_triangle) => {
            return done(recast_members(geom, Tin, Triangle))
        }
        (Polygon | MultiPolygon | PolyhedralSurface, Tin) | (Polygon, Triangle) => {
            return done(geom)
        }
        _ => {}
    }

    if matches!(target, Triangle | Tin | PolyhedralSurface) {
        let polygon = force_to(geom, Polygon, dim, options);
        if polygon.geometry_type() != Polygon {
            return Break(polygon);
        }
        return Break(force_to(polygon, target, dim, options));
    }

    if source == Triangle && target == GeometryCollection {
        return done(wrap(GeometryCollection, geom));
    }
    if !source.is_subclass_of(GeometryCollection)
        && source
            .collection_of()
            .is_some_and(|multi| multi.is_subclass_of(target))
    {
        return done(wrap(target, geom));
    }

    if source.is_curve() {
        match target {
            CompoundCurve => return done(wrap(CompoundCurve, geom)),
            CurvePolygon if geom.num_points() >= 3 && geom.is_closed() => {
                return done(wrap(CurvePolygon, geom))
            }
            CurvePolygon => return Continue(geom),
            t if source == LineString && t.is_subclass_of(MultiSurface) => {
                return through(geom, Polygon)
            }
            MultiSurface => return through(geom, CurvePolygon),
            MultiPolygon => return through(geom, Polygon),
            _ => {}
        }
    }

    match (source, target) {
        (Triangle | Polygon, CurvePolygon) => return done(into_curve_polygon(geom)),
        (MultiPolygon, MultiSurface) => return done(geom.cast(MultiSurface)),
        (MultiLineString, MultiCurve) => return done(geom.cast(MultiCurve)),
        _ => {}
    }

    if source.is_subclass_of(CurvePolygon) && target == CompoundCurve {
        if geom.num_members() != 1 {
            return Continue(geom);
        }
        return match geom.into_members().pop() {
            Some(ring) => Break(force_to(as_line_string(ring).with_crs(crs), target, dim, options)),
            None => Break(Geometry::empty(target, dim.unwrap_or_default()).with_crs(crs)),
        };
    }

    if source.is_subclass_of(GeometryCollection) {
        if let [member] = geom.members() {
            let out = force_to(member.clone().with_crs(crs), target, dim, options);
            if out.geometry_type().is_subclass_of(target) {
                return Break(out);
            }
        }
        return Continue(geom);
    }

    if source.is_subclass_of(CurvePolygon)
        && (target.is_subclass_of(MultiSurface) || target.is_subclass_of(MultiCurve))
        && geom.num_members() == 1
    {
        if let Some(ring) = geom.exterior_ring() {
            let ring = as_line_string(ring.clone()).with_crs(crs);
            let ring_type = ring.geometry_type();
            let out = force_to(ring, target, dim, options);
            if out.geometry_type() != ring_type
                && !(source == Polygon && target == MultiLineString)
            {
                return Break(out);
            }
        }
    }

    Continue(geom)
}

/// Fall back to the basic kinds.
fn reduce(
    geom: Geometry,
    target: GeometryType,
    dim: Option<Dimension>,
    options: &StrokeOptions,
) -> Geometry {
    let out = match target {
        GeometryType::LineString => force_to_line_string(geom, true, options),
        GeometryType::Polygon => force_to_polygon(geom, options),
        GeometryType::MultiPolygon => force_to_multi_polygon(geom, options),
        GeometryType::MultiLineString => force_to_multi_line_string(geom, options),
        GeometryType::MultiPoint => force_to_multi_point(geom),
        _ => return geom,
    };
    with_dimension(out, dim)
}
