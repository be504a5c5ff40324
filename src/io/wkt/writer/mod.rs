//! Encode a [`Geometry`] as ISO Well-Known Text.

use std::fmt::{self, Display, Write};

use crate::geometry::{Coord, Dimension, Geometry, GeometryType};

/// Write `geom` as ISO WKT, with `Z`, `M` or `ZM` qualifiers.
pub fn write_wkt<W: Write>(f: &mut W, geom: &Geometry) -> fmt::Result {
    write_tagged(f, geom, true)
}

/// Encode `geom` as an ISO WKT string.
pub fn to_wkt(geom: &Geometry) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_wkt(&mut out, geom);
    out
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_wkt(f, self)
    }
}

fn dimension_qualifier(dim: Dimension) -> &'static str {
    match dim {
        Dimension::XY => "",
        Dimension::XYZ => " Z",
        Dimension::XYM => " M",
        Dimension::XYZM => " ZM",
    }
}

fn write_tagged<W: Write>(f: &mut W, geom: &Geometry, qualify: bool) -> fmt::Result {
    f.write_str(geom.geometry_type().name())?;
    if qualify {
        f.write_str(dimension_qualifier(geom.dimension()))?;
    }
    f.write_char(' ')?;
    write_body(f, geom)
}

fn write_coord<W: Write>(f: &mut W, coord: &Coord, dim: Dimension) -> fmt::Result {
    write!(f, "{} {}", coord.x, coord.y)?;
    if dim.has_z() {
        write!(f, " {}", coord.z)?;
    }
    if dim.has_m() {
        write!(f, " {}", coord.m)?;
    }
    Ok(())
}

fn write_coords<W: Write>(f: &mut W, coords: &[Coord], dim: Dimension) -> fmt::Result {
    f.write_char('(')?;
    for (i, coord) in coords.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write_coord(f, coord, dim)?;
    }
    f.write_char(')')
}

/// Whether a member is written without its keyword inside `parent`.
fn is_implicit_member(parent: GeometryType, member: GeometryType) -> bool {
    use GeometryType::*;
    match parent {
        Polygon | Triangle | MultiPoint | MultiLineString | MultiPolygon | PolyhedralSurface
        | Tin => true,
        CompoundCurve | CurvePolygon | MultiCurve => matches!(member, LineString | LinearRing),
        MultiSurface => member == Polygon,
        _ => false,
    }
}

fn write_body<W: Write>(f: &mut W, geom: &Geometry) -> fmt::Result {
    if geom.is_empty() {
        return f.write_str("EMPTY");
    }
    let dim = geom.dimension();
    match geom {
        Geometry::Point(p) => match &p.coord {
            Some(coord) => {
                f.write_char('(')?;
                write_coord(f, coord, dim)?;
                f.write_char(')')
            }
            None => f.write_str("EMPTY"),
        },
        Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
            write_coords(f, &c.coords, dim)
        }
        _ => {
            let parent = geom.geometry_type();
            f.write_char('(')?;
            for (i, member) in geom.members().iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                if is_implicit_member(parent, member.geometry_type()) {
                    write_body(f, member)?;
                } else {
                    // Nested tagged members inherit the qualifier of the outer geometry,
                    // except inside a collection where each member stands alone.
                    write_tagged(f, member, parent == GeometryType::GeometryCollection)?;
                }
            }
            f.write_char(')')
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::wkt::parse_wkt;
    use crate::test::curve::{compound_curve, curve_polygon};
    use crate::test::polygon::square_with_hole;

    #[test]
    fn points() {
        let geom = Geometry::point(Coord::new(1., 2.5), Dimension::XY);
        assert_eq!(geom.to_string(), "POINT (1 2.5)");
        let geom = Geometry::point(Coord::new_zm(1., 2., 3., 4.), Dimension::XYZM);
        assert_eq!(geom.to_string(), "POINT ZM (1 2 3 4)");
        let geom = Geometry::empty(GeometryType::Point, Dimension::XYM);
        assert_eq!(geom.to_string(), "POINT M EMPTY");
    }

    #[test]
    fn polygon() {
        assert_eq!(
            to_wkt(&square_with_hole()),
            "POLYGON ((0 0,0 10,10 10,10 0,0 0),(2 2,4 2,4 4,2 4,2 2))"
        );
    }

    #[test]
    fn curves() {
        assert_eq!(
            to_wkt(&compound_curve()),
            "COMPOUNDCURVE (CIRCULARSTRING (0 0,1 1,2 0),(2 0,3 0))"
        );
    }

    #[test]
    fn text_round_trip() {
        for geom in [square_with_hole(), compound_curve(), curve_polygon()] {
            let text = to_wkt(&geom);
            let (parsed, rest) = parse_wkt(&text, None).unwrap();
            assert!(rest.is_empty());
            assert_eq!(parsed, geom);
        }
    }
}
