use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Collection, Coord, Dimension, Geometry, GeometryParts, GeometryType};
use crate::geometry::{SimpleCurve, SpatialRef};
use crate::io::fgf::{FGF_DIM_M, FGF_DIM_Z};
use crate::io::wkb::common::{is_compatible_sub_type, MAX_RECURSION_LEVEL};

/// Parse one FGF geometry from the front of `buf`.
///
/// Type code 0 is a valid encoding of "no geometry" and yields `None`. The number of bytes
/// consumed is returned alongside.
///
/// ```
/// use geofactory::io::fgf::parse_fgf;
///
/// let mut buf = vec![1, 0, 0, 0, 0, 0, 0, 0]; // XY point
/// buf.extend_from_slice(&1f64.to_le_bytes());
/// buf.extend_from_slice(&2f64.to_le_bytes());
/// let (geom, consumed) = parse_fgf(&buf, None).unwrap();
/// assert_eq!(consumed, 24);
/// assert_eq!(geom.unwrap().to_string(), "POINT (1 2)");
/// ```
pub fn parse_fgf(buf: &[u8], crs: Option<Arc<SpatialRef>>) -> Result<(Option<Geometry>, usize)> {
    parse_fgf_with_limit(buf, crs, MAX_RECURSION_LEVEL)
}

/// Like [`parse_fgf`], with an explicit bound on collection nesting.
pub fn parse_fgf_with_limit(
    buf: &[u8],
    crs: Option<Arc<SpatialRef>>,
    recursion_limit: usize,
) -> Result<(Option<Geometry>, usize)> {
    let mut reader = FgfReader {
        cursor: Cursor::new(buf),
        recursion_limit,
    };
    let geom = reader.read_geometry(0)?.map(|g| g.with_crs(crs));
    Ok((geom, reader.cursor.position() as usize))
}

struct FgfReader<'a> {
    cursor: Cursor<&'a [u8]>,
    recursion_limit: usize,
}

fn truncated(err: std::io::Error) -> GeoFactoryError {
    GeoFactoryError::NotEnoughData(format!("FGF ended prematurely: {err}"))
}

impl<'a> FgfReader<'a> {
    fn remaining(&self) -> usize {
        self.cursor
            .get_ref()
            .len()
            .saturating_sub(self.cursor.position() as usize)
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.cursor.read_i32::<LittleEndian>().map_err(truncated)
    }

    fn read_count(&mut self, min_element_size: usize) -> Result<usize> {
        let count = self.read_i32()?;
        if count < 0 || count as usize > i32::MAX as usize / min_element_size {
            return Err(GeoFactoryError::CorruptData(format!(
                "Invalid FGF element count {count}"
            )));
        }
        let count = count as usize;
        if count * min_element_size > self.remaining() {
            return Err(GeoFactoryError::NotEnoughData(format!(
                "FGF declares {count} elements but only {} bytes remain",
                self.remaining()
            )));
        }
        Ok(count)
    }

    fn read_dimension(&mut self) -> Result<Dimension> {
        let flag = self.read_i32()?;
        if !(0..=3).contains(&flag) {
            return Err(GeoFactoryError::CorruptData(format!(
                "Invalid FGF dimension flag {flag}"
            )));
        }
        let flag = flag as u32;
        Ok(Dimension::from_flags(
            flag & FGF_DIM_Z != 0,
            flag & FGF_DIM_M != 0,
        ))
    }

    fn read_coord(&mut self, dim: Dimension) -> Result<Coord> {
        let mut coord = Coord::new(
            self.cursor.read_f64::<LittleEndian>().map_err(truncated)?,
            self.cursor.read_f64::<LittleEndian>().map_err(truncated)?,
        );
        if dim.has_z() {
            coord.z = self.cursor.read_f64::<LittleEndian>().map_err(truncated)?;
        }
        if dim.has_m() {
            coord.m = self.cursor.read_f64::<LittleEndian>().map_err(truncated)?;
        }
        Ok(coord)
    }

    fn read_coords(&mut self, dim: Dimension) -> Result<Vec<Coord>> {
        let num_points = self.read_count(dim.size() * 8)?;
        (0..num_points).map(|_| self.read_coord(dim)).collect()
    }

    fn read_geometry(&mut self, level: usize) -> Result<Option<Geometry>> {
        if level >= self.recursion_limit {
            return Err(GeoFactoryError::CorruptData(format!(
                "Too many recursion levels ({level}) while parsing FGF geometry"
            )));
        }
        let code = self.read_i32()?;
        let geom = match code {
            0 => None,
            1 => {
                let dim = self.read_dimension()?;
                Some(Geometry::point(self.read_coord(dim)?, dim))
            }
            2 => {
                let dim = self.read_dimension()?;
                Some(Geometry::line_string(self.read_coords(dim)?, dim))
            }
            3 => {
                let dim = self.read_dimension()?;
                let num_rings = self.read_count(4)?;
                let mut rings = Collection::empty(dim);
                for _ in 0..num_rings {
                    let coords = self.read_coords(dim)?;
                    rings.push(Geometry::LinearRing(SimpleCurve::new(coords, dim)));
                }
                Some(Geometry::from_parts(
                    GeometryType::Polygon,
                    GeometryParts::Collection(rings),
                ))
            }
            4..=7 => {
                let geometry_type = match code {
                    4 => GeometryType::MultiPoint,
                    5 => GeometryType::MultiLineString,
                    6 => GeometryType::MultiPolygon,
                    _ => GeometryType::GeometryCollection,
                };
                Some(self.read_members(geometry_type, level)?)
            }
            8..=13 => {
                return Err(GeoFactoryError::UnsupportedGeometryType(format!(
                    "FGF geometry type {code} is not supported"
                )))
            }
            _ => {
                return Err(GeoFactoryError::UnsupportedGeometryType(format!(
                    "Unknown FGF geometry type {code}"
                )))
            }
        };
        Ok(geom)
    }

    fn read_members(&mut self, geometry_type: GeometryType, level: usize) -> Result<Geometry> {
        let num_members = self.read_count(4)?;
        let mut geom = Geometry::empty(geometry_type, Dimension::XY);
        for _ in 0..num_members {
            let Some(member) = self.read_geometry(level + 1)? else {
                continue;
            };
            if !is_compatible_sub_type(geometry_type, member.geometry_type()) {
                return Err(GeoFactoryError::UnsupportedGeometryType(format!(
                    "{} cannot be a member of {geometry_type}",
                    member.geometry_type()
                )));
            }
            if let Some(collection) = geom.as_collection_mut() {
                collection.push(member);
            }
        }
        Ok(geom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::fgf::to_fgf;
    use crate::test::polygon::square_with_hole;

    #[test]
    fn none_geometry() {
        let (geom, consumed) = parse_fgf(&[0, 0, 0, 0], None).unwrap();
        assert!(geom.is_none());
        assert_eq!(consumed, 4);
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            parse_fgf(&[1, 0], None),
            Err(GeoFactoryError::NotEnoughData(_))
        ));
        assert!(matches!(
            parse_fgf(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0], None),
            Err(GeoFactoryError::NotEnoughData(_))
        ));
    }

    #[test]
    fn unsupported_codes() {
        assert!(matches!(
            parse_fgf(&[10, 0, 0, 0], None),
            Err(GeoFactoryError::UnsupportedGeometryType(_))
        ));
        assert!(matches!(
            parse_fgf(&[0xff, 0xff, 0xff, 0xff], None),
            Err(GeoFactoryError::UnsupportedGeometryType(_))
        ));
    }

    #[test]
    fn bad_dimension_flag() {
        assert!(matches!(
            parse_fgf(&[1, 0, 0, 0, 4, 0, 0, 0], None),
            Err(GeoFactoryError::CorruptData(_))
        ));
    }

    #[test]
    fn nesting_limit() {
        // Three nested collections, each holding the next one.
        let mut buf = vec![];
        for _ in 0..3 {
            buf.extend_from_slice(&7i32.to_le_bytes());
            buf.extend_from_slice(&1i32.to_le_bytes());
        }
        buf.extend_from_slice(&0i32.to_le_bytes());
        assert!(parse_fgf_with_limit(&buf, None, 4).is_ok());
        assert!(matches!(
            parse_fgf_with_limit(&buf, None, 3),
            Err(GeoFactoryError::CorruptData(_))
        ));
    }

    #[test]
    fn keeps_m() {
        let geom = Geometry::line_string(
            vec![Coord::new_zm(0., 0., 0., 5.), Coord::new_zm(1., 1., 0., 6.)],
            Dimension::XYM,
        );
        let buf = to_fgf(&geom).unwrap();
        let (parsed, consumed) = parse_fgf(&buf, None).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(parsed.unwrap(), geom);
    }

    #[test]
    fn polygon_round_trip() {
        let geom = square_with_hole();
        let buf = to_fgf(&geom).unwrap();
        let (parsed, _) = parse_fgf(&buf, None).unwrap();
        assert_eq!(parsed.unwrap(), geom);
    }
}
