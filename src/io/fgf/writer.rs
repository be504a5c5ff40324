use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Dimension, Geometry};
use crate::io::fgf::{FGF_DIM_M, FGF_DIM_Z};

fn dimension_flag(dim: Dimension) -> i32 {
    let mut flag = 0;
    if dim.has_z() {
        flag |= FGF_DIM_Z;
    }
    if dim.has_m() {
        flag |= FGF_DIM_M;
    }
    flag as i32
}

fn unsupported(geom: &Geometry) -> GeoFactoryError {
    GeoFactoryError::UnsupportedGeometryType(format!(
        "{} has no FGF encoding",
        geom.geometry_type()
    ))
}

/// The number of bytes [`write_fgf`] produces for `geom`.
pub fn fgf_size(geom: &Geometry) -> Result<usize> {
    let coord_size = geom.dimension().size() * 8;
    let size = match geom {
        Geometry::Point(_) => 8 + coord_size,
        Geometry::LineString(c) | Geometry::LinearRing(c) => 12 + c.num_coords() * coord_size,
        Geometry::Polygon(_) => {
            12 + geom
                .members()
                .iter()
                .map(|ring| 4 + ring.num_points() * coord_size)
                .sum::<usize>()
        }
        Geometry::MultiPoint(_)
        | Geometry::MultiLineString(_)
        | Geometry::MultiPolygon(_)
        | Geometry::GeometryCollection(_) => {
            let mut size = 8;
            for member in geom.members() {
                size += fgf_size(member)?;
            }
            size
        }
        _ => return Err(unsupported(geom)),
    };
    Ok(size)
}

/// Write `geom` as FGF.
///
/// Only the kinds FGF knows about are accepted; an empty point has no FGF form either.
pub fn write_fgf<W: Write>(writer: &mut W, geom: &Geometry) -> Result<()> {
    let dim = geom.dimension();
    match geom {
        Geometry::Point(p) => {
            let coord = p.coord.ok_or_else(|| {
                GeoFactoryError::General("An empty point cannot be written as FGF".to_string())
            })?;
            writer.write_i32::<LittleEndian>(1)?;
            writer.write_i32::<LittleEndian>(dimension_flag(dim))?;
            write_coord(writer, &coord, dim)?;
        }
        Geometry::LineString(c) | Geometry::LinearRing(c) => {
            writer.write_i32::<LittleEndian>(2)?;
            writer.write_i32::<LittleEndian>(dimension_flag(dim))?;
            write_coords(writer, &c.coords, dim)?;
        }
        Geometry::Polygon(_) => {
            writer.write_i32::<LittleEndian>(3)?;
            writer.write_i32::<LittleEndian>(dimension_flag(dim))?;
            writer.write_i32::<LittleEndian>(geom.num_members() as i32)?;
            for ring in geom.members() {
                let coords = ring.as_curve().map(|c| c.coords.as_slice()).unwrap_or(&[]);
                write_coords(writer, coords, dim)?;
            }
        }
        Geometry::MultiPoint(_)
        | Geometry::MultiLineString(_)
        | Geometry::MultiPolygon(_)
        | Geometry::GeometryCollection(_) => {
            let code = match geom {
                Geometry::MultiPoint(_) => 4,
                Geometry::MultiLineString(_) => 5,
                Geometry::MultiPolygon(_) => 6,
                _ => 7,
            };
            writer.write_i32::<LittleEndian>(code)?;
            writer.write_i32::<LittleEndian>(geom.num_members() as i32)?;
            for member in geom.members() {
                write_fgf(writer, member)?;
            }
        }
        _ => return Err(unsupported(geom)),
    }
    Ok(())
}

/// Encode `geom` as an FGF buffer.
pub fn to_fgf(geom: &Geometry) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(fgf_size(geom)?);
    write_fgf(&mut buf, geom)?;
    Ok(buf)
}

fn write_coord<W: Write>(writer: &mut W, coord: &Coord, dim: Dimension) -> Result<()> {
    writer.write_f64::<LittleEndian>(coord.x)?;
    writer.write_f64::<LittleEndian>(coord.y)?;
    if dim.has_z() {
        writer.write_f64::<LittleEndian>(coord.z)?;
    }
    if dim.has_m() {
        writer.write_f64::<LittleEndian>(coord.m)?;
    }
    Ok(())
}

fn write_coords<W: Write>(writer: &mut W, coords: &[Coord], dim: Dimension) -> Result<()> {
    writer.write_i32::<LittleEndian>(coords.len() as i32)?;
    for coord in coords {
        write_coord(writer, coord, dim)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::curve::circular_arc;
    use crate::test::polygon::square_with_hole;

    #[test]
    fn size_matches_output() {
        let geom = square_with_hole();
        assert_eq!(to_fgf(&geom).unwrap().len(), fgf_size(&geom).unwrap());
    }

    #[test]
    fn curves_have_no_encoding() {
        assert!(matches!(
            to_fgf(&circular_arc()),
            Err(GeoFactoryError::UnsupportedGeometryType(_))
        ));
    }
}
