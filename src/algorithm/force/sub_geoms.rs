use crate::geometry::{Geometry, GeometryType};

/// Drop the members of a GeometryCollection whose topological dimension is lower than the
/// highest one found in it.
///
/// A single survivor is returned on its own. Otherwise the survivors are gathered into
/// the multi kind of that dimension (MultiPoint, MultiLineString or MultiCurve,
/// MultiPolygon or MultiSurface); nested collections are flattened one level. Other
/// geometries, and empty collections, are returned as a copy.
///
/// ```
/// use geofactory::algorithm::force::remove_lower_dimension_sub_geoms;
/// use geofactory::geometry::GeometryType;
/// use geofactory::io::wkt::parse_wkt;
///
/// let (gc, _) = parse_wkt(
///     "GEOMETRYCOLLECTION (POINT (0 0),LINESTRING (0 0,1 1),POLYGON ((0 0,0 1,1 1,0 0)))",
///     None,
/// )
/// .unwrap();
/// let cleaned = remove_lower_dimension_sub_geoms(&gc);
/// assert_eq!(cleaned.geometry_type(), GeometryType::Polygon);
/// ```
pub fn remove_lower_dimension_sub_geoms(geom: &Geometry) -> Geometry {
    if geom.geometry_type() != GeometryType::GeometryCollection || geom.is_empty() {
        return geom.clone();
    }

    let members = geom.members();
    let max_dim = members
        .iter()
        .map(|m| m.topological_dimension())
        .max()
        .unwrap_or(0);
    let has_curve = members.iter().any(|m| m.has_curve_geometry(false));

    let mut survivors = members
        .iter()
        .filter(|m| m.topological_dimension() == max_dim);
    if let (Some(only), None) = (survivors.next(), survivors.next()) {
        return only.clone();
    }

    let kind = match (max_dim, has_curve) {
        (0, _) => GeometryType::MultiPoint,
        (1, false) => GeometryType::MultiLineString,
        (1, true) => GeometryType::MultiCurve,
        (_, false) => GeometryType::MultiPolygon,
        (_, true) => GeometryType::MultiSurface,
    };

    let mut kept = vec![];
    for member in members
        .iter()
        .filter(|m| m.topological_dimension() == max_dim)
    {
        if member.geometry_type().is_subclass_of(GeometryType::GeometryCollection) {
            kept.extend(
                member
                    .members()
                    .iter()
                    .filter(|m| m.topological_dimension() == max_dim)
                    .cloned(),
            );
        } else {
            kept.push(member.clone());
        }
    }
    Geometry::new_collection(kind, kept, geom.dimension()).with_crs(geom.crs().cloned())
}
