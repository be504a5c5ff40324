use geojson::{Position, Value};

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Geometry};

fn position(coord: &Coord, has_z: bool) -> Position {
    if has_z {
        vec![coord.x, coord.y, coord.z]
    } else {
        vec![coord.x, coord.y]
    }
}

fn positions(geom: &Geometry, has_z: bool) -> Vec<Position> {
    geom.as_curve()
        .map(|c| c.coords.iter().map(|coord| position(coord, has_z)).collect())
        .unwrap_or_default()
}

fn polygon_rings(geom: &Geometry, has_z: bool) -> Vec<Vec<Position>> {
    geom.members().iter().map(|r| positions(r, has_z)).collect()
}

fn to_value(geom: &Geometry) -> Result<Value> {
    let has_z = geom.has_z();
    let value = match geom {
        Geometry::Point(p) => Value::Point(
            p.coord
                .map(|coord| position(&coord, has_z))
                .unwrap_or_default(),
        ),
        Geometry::LineString(_) | Geometry::LinearRing(_) => {
            Value::LineString(positions(geom, has_z))
        }
        Geometry::Polygon(_) | Geometry::Triangle(_) => Value::Polygon(polygon_rings(geom, has_z)),
        Geometry::MultiPoint(_) => Value::MultiPoint(
            geom.members()
                .iter()
                .filter_map(|m| match m {
                    Geometry::Point(p) => p.coord.map(|coord| position(&coord, has_z)),
                    _ => None,
                })
                .collect(),
        ),
        Geometry::MultiLineString(_) => Value::MultiLineString(
            geom.members().iter().map(|m| positions(m, has_z)).collect(),
        ),
        Geometry::MultiPolygon(_) | Geometry::PolyhedralSurface(_) | Geometry::Tin(_) => {
            Value::MultiPolygon(
                geom.members()
                    .iter()
                    .map(|m| polygon_rings(m, has_z))
                    .collect(),
            )
        }
        Geometry::GeometryCollection(_) => Value::GeometryCollection(
            geom.members()
                .iter()
                .map(to_geojson)
                .collect::<Result<_>>()?,
        ),
        _ => {
            return Err(GeoFactoryError::UnsupportedGeometryType(format!(
                "{} must be linearized before conversion to GeoJSON",
                geom.geometry_type()
            )))
        }
    };
    Ok(value)
}

/// Convert a linear geometry to a GeoJSON geometry object. M ordinates are dropped.
pub fn to_geojson(geom: &Geometry) -> Result<geojson::Geometry> {
    Ok(geojson::Geometry::new(to_value(geom)?))
}

/// Serialize a linear geometry as GeoJSON text.
pub fn to_geojson_string(geom: &Geometry) -> Result<String> {
    Ok(serde_json::to_string(&to_geojson(geom)?)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::geojson::parse_geojson;
    use crate::test::curve::compound_curve;
    use crate::test::polygon::square_with_hole;

    #[test]
    fn polygon_round_trip() {
        let text = to_geojson_string(&square_with_hole()).unwrap();
        let parsed = parse_geojson(&text, None).unwrap().unwrap();
        assert_eq!(parsed, square_with_hole());
    }

    #[test]
    fn point_value() {
        let geom = Geometry::point(Coord::new(1., 2.), crate::geometry::Dimension::XY);
        assert_eq!(to_geojson(&geom).unwrap().value, Value::Point(vec![1., 2.]));
    }

    #[test]
    fn curves_are_rejected() {
        assert!(to_geojson(&compound_curve()).is_err());
    }
}
