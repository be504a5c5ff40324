use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, SimpleCurve};

/// Convert a vertex sequence to a [`geo::LineString`].
///
/// Only the first two dimensions will be kept.
pub fn line_string_to_geo(curve: &SimpleCurve) -> geo::LineString {
    geo::LineString::new(curve.coords.iter().map(|c| (*c).into()).collect())
}

fn ring_to_geo(ring: &Geometry) -> Result<geo::LineString> {
    ring.as_curve().map(line_string_to_geo).ok_or_else(|| {
        GeoFactoryError::General(format!(
            "Cannot convert a {} ring to geo",
            ring.geometry_type()
        ))
    })
}

/// Convert a Polygon or Triangle to a [`geo::Polygon`].
///
/// Only the first two dimensions will be kept.
pub fn polygon_to_geo(polygon: &Geometry) -> Result<geo::Polygon> {
    let exterior = match polygon.exterior_ring() {
        Some(ring) => ring_to_geo(ring)?,
        None => geo::LineString::new(vec![]),
    };
    let interiors = polygon
        .interior_rings()
        .iter()
        .map(ring_to_geo)
        .collect::<Result<Vec<_>>>()?;
    Ok(geo::Polygon::new(exterior, interiors))
}

/// Convert any linear geometry to a [`geo::Geometry`].
///
/// Only the first two dimensions will be kept. Curved kinds must be linearized first.
pub fn geometry_to_geo(geom: &Geometry) -> Result<geo::Geometry> {
    let out = match geom {
        Geometry::Point(p) => match p.coord {
            Some(coord) => geo::Geometry::Point(geo::Point(coord.into())),
            None => geo::Geometry::MultiPoint(geo::MultiPoint::new(vec![])),
        },
        Geometry::LineString(c) | Geometry::LinearRing(c) => {
            geo::Geometry::LineString(line_string_to_geo(c))
        }
        Geometry::Polygon(_) | Geometry::Triangle(_) => {
            geo::Geometry::Polygon(polygon_to_geo(geom)?)
        }
        Geometry::MultiPoint(_) => geo::Geometry::MultiPoint(geo::MultiPoint::new(
            geom.members()
                .iter()
                .filter_map(|m| match m {
                    Geometry::Point(p) => p.coord.map(|c| geo::Point(c.into())),
                    _ => None,
                })
                .collect(),
        )),
        Geometry::MultiLineString(_) => geo::Geometry::MultiLineString(geo::MultiLineString::new(
            geom.members()
                .iter()
                .filter_map(|m| m.as_curve().map(line_string_to_geo))
                .collect(),
        )),
        Geometry::MultiPolygon(_) | Geometry::PolyhedralSurface(_) | Geometry::Tin(_) => {
            geo::Geometry::MultiPolygon(geo::MultiPolygon::new(
                geom.members()
                    .iter()
                    .map(polygon_to_geo)
                    .collect::<Result<Vec<_>>>()?,
            ))
        }
        Geometry::GeometryCollection(_) => {
            geo::Geometry::GeometryCollection(geo::GeometryCollection(
                geom.members()
                    .iter()
                    .map(geometry_to_geo)
                    .collect::<Result<Vec<_>>>()?,
            ))
        }
        Geometry::CircularString(_)
        | Geometry::CompoundCurve(_)
        | Geometry::CurvePolygon(_)
        | Geometry::MultiCurve(_)
        | Geometry::MultiSurface(_) => {
            return Err(GeoFactoryError::General(format!(
                "{} must be linearized before conversion to geo",
                geom.geometry_type()
            )))
        }
    };
    Ok(out)
}

fn curve_from_geo(line_string: &geo::LineString) -> SimpleCurve {
    SimpleCurve::new(
        line_string.coords().map(|c| Coord::from(*c)).collect(),
        Dimension::XY,
    )
}

impl From<geo::Point> for Geometry {
    fn from(value: geo::Point) -> Self {
        Geometry::point(value.0.into(), Dimension::XY)
    }
}

impl From<geo::LineString> for Geometry {
    fn from(value: geo::LineString) -> Self {
        Geometry::LineString(curve_from_geo(&value))
    }
}

impl From<geo::Polygon> for Geometry {
    fn from(value: geo::Polygon) -> Self {
        if value.exterior().0.is_empty() {
            return Geometry::empty(GeometryType::Polygon, Dimension::XY);
        }
        let rings = std::iter::once(value.exterior())
            .chain(value.interiors())
            .map(curve_from_geo)
            .collect();
        Geometry::polygon(rings, Dimension::XY)
    }
}

impl From<geo::MultiPoint> for Geometry {
    fn from(value: geo::MultiPoint) -> Self {
        Geometry::new_collection(
            GeometryType::MultiPoint,
            value.into_iter().map(Geometry::from).collect(),
            Dimension::XY,
        )
    }
}

impl From<geo::MultiLineString> for Geometry {
    fn from(value: geo::MultiLineString) -> Self {
        Geometry::new_collection(
            GeometryType::MultiLineString,
            value.into_iter().map(Geometry::from).collect(),
            Dimension::XY,
        )
    }
}

impl From<geo::MultiPolygon> for Geometry {
    fn from(value: geo::MultiPolygon) -> Self {
        Geometry::new_collection(
            GeometryType::MultiPolygon,
            value.into_iter().map(Geometry::from).collect(),
            Dimension::XY,
        )
    }
}

impl From<geo::Geometry> for Geometry {
    fn from(value: geo::Geometry) -> Self {
        match value {
            geo::Geometry::Point(g) => g.into(),
            geo::Geometry::Line(g) => geo::LineString::from(g).into(),
            geo::Geometry::LineString(g) => g.into(),
            geo::Geometry::Polygon(g) => g.into(),
            geo::Geometry::MultiPoint(g) => g.into(),
            geo::Geometry::MultiLineString(g) => g.into(),
            geo::Geometry::MultiPolygon(g) => g.into(),
            geo::Geometry::Rect(g) => g.to_polygon().into(),
            geo::Geometry::Triangle(g) => g.to_polygon().into(),
            geo::Geometry::GeometryCollection(g) => Geometry::new_collection(
                GeometryType::GeometryCollection,
                g.into_iter().map(Geometry::from).collect(),
                Dimension::XY,
            ),
        }
    }
}
