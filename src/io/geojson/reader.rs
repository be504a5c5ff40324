use std::sync::Arc;

use geojson::{GeoJson, Position, Value};

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, SimpleCurve, SpatialRef};

/// Parse a GeoJSON Geometry object, or the geometry of a Feature.
///
/// A Feature whose geometry is `null` yields `None`. Malformed JSON and objects that carry no
/// single geometry (such as a FeatureCollection) are errors.
///
/// ```
/// use geofactory::io::geojson::parse_geojson;
///
/// let geom = parse_geojson(r#"{"type": "Point", "coordinates": [1, 2]}"#, None).unwrap();
/// assert_eq!(geom.unwrap().to_string(), "POINT (1 2)");
/// ```
pub fn parse_geojson(text: &str, crs: Option<Arc<SpatialRef>>) -> Result<Option<Geometry>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = GeoJson::from_json_value(value)
        .map_err(|err| GeoFactoryError::CorruptData(format!("Invalid GeoJSON: {err}")))?;
    let geometry = match object {
        GeoJson::Geometry(geometry) => Some(geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(_) => {
            return Err(GeoFactoryError::UnsupportedGeometryType(
                "A FeatureCollection is not a single geometry".to_string(),
            ))
        }
    };
    geometry
        .map(|g| geometry_from_geojson(&g).map(|geom| geom.with_crs(crs)))
        .transpose()
}

fn coord_from_position(position: &Position) -> Result<(Coord, bool)> {
    match position.as_slice() {
        [x, y] => Ok((Coord::new(*x, *y), false)),
        [x, y, z, ..] => Ok((Coord::new_z(*x, *y, *z), true)),
        _ => Err(GeoFactoryError::CorruptData(format!(
            "GeoJSON position needs at least two ordinates, got {}",
            position.len()
        ))),
    }
}

fn curve_from_positions(positions: &[Position]) -> Result<SimpleCurve> {
    let mut has_z = false;
    let coords = positions
        .iter()
        .map(|p| {
            let (coord, z) = coord_from_position(p)?;
            has_z |= z;
            Ok(coord)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SimpleCurve::new(coords, Dimension::from_flags(has_z, false)))
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Geometry> {
    let rings = rings
        .iter()
        .map(|r| curve_from_positions(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(Geometry::new_collection(
        GeometryType::Polygon,
        rings.into_iter().map(Geometry::LinearRing).collect(),
        Dimension::XY,
    ))
}

fn point_from_position(position: &Position) -> Result<Geometry> {
    if position.is_empty() {
        return Ok(Geometry::empty(GeometryType::Point, Dimension::XY));
    }
    let (coord, has_z) = coord_from_position(position)?;
    Ok(Geometry::point(coord, Dimension::from_flags(has_z, false)))
}

/// Convert a parsed GeoJSON geometry.
///
/// Members are pushed into their parent, so a Z ordinate on any position gives the whole
/// geometry a Z dimension.
pub fn geometry_from_geojson(geometry: &geojson::Geometry) -> Result<Geometry> {
    let geom = match &geometry.value {
        Value::Point(position) => point_from_position(position)?,
        Value::MultiPoint(positions) => Geometry::new_collection(
            GeometryType::MultiPoint,
            positions
                .iter()
                .map(point_from_position)
                .collect::<Result<_>>()?,
            Dimension::XY,
        ),
        Value::LineString(positions) => Geometry::LineString(curve_from_positions(positions)?),
        Value::MultiLineString(lines) => Geometry::new_collection(
            GeometryType::MultiLineString,
            lines
                .iter()
                .map(|l| curve_from_positions(l).map(Geometry::LineString))
                .collect::<Result<_>>()?,
            Dimension::XY,
        ),
        Value::Polygon(rings) => polygon_from_rings(rings)?,
        Value::MultiPolygon(polygons) => Geometry::new_collection(
            GeometryType::MultiPolygon,
            polygons
                .iter()
                .map(|p| polygon_from_rings(p))
                .collect::<Result<_>>()?,
            Dimension::XY,
        ),
        Value::GeometryCollection(members) => Geometry::new_collection(
            GeometryType::GeometryCollection,
            members
                .iter()
                .map(geometry_from_geojson)
                .collect::<Result<_>>()?,
            Dimension::XY,
        ),
    };
    Ok(geom)
}
