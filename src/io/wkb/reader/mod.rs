//! Parse Well-Known Binary into a [`Geometry`].

use std::io::Cursor;
use std::sync::Arc;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{
    Collection, Coord, Dimension, Geometry, GeometryParts, GeometryType, SimpleCurve, SpatialRef,
};
use crate::io::wkb::common::{
    decode_wkb_type, is_compatible_sub_type, Endianness, MAX_RECURSION_LEVEL,
};

/// The size of the byte order marker plus the type code.
const HEADER_SIZE: usize = 5;

/// Parse one WKB geometry from the front of `buf`.
///
/// Returns the geometry together with the number of bytes it occupied, so that several
/// geometries stored back to back can be read in sequence.
///
/// ```
/// use geofactory::io::wkb::parse_wkb;
///
/// let buf = [
///     1, 1, 0, 0, 0, // little endian point
///     0, 0, 0, 0, 0, 0, 0xf0, 0x3f, // 1.0
///     0, 0, 0, 0, 0, 0, 0, 0x40, // 2.0
/// ];
/// let (geom, consumed) = parse_wkb(&buf, None).unwrap();
/// assert_eq!(consumed, 21);
/// assert_eq!(geom.to_string(), "POINT (1 2)");
/// ```
pub fn parse_wkb(buf: &[u8], crs: Option<Arc<SpatialRef>>) -> Result<(Geometry, usize)> {
    let mut reader = WkbReader::new(buf);
    let mut geom = reader.read_geometry(0)?;
    geom.assign_crs(crs);
    Ok((geom, reader.position()))
}

struct WkbReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

fn truncated(err: std::io::Error) -> GeoFactoryError {
    GeoFactoryError::NotEnoughData(format!("WKB ended prematurely: {err}"))
}

impl<'a> WkbReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn read_u32(&mut self, byte_order: Endianness) -> Result<u32> {
        match byte_order {
            Endianness::BigEndian => self.cursor.read_u32::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_u32::<LittleEndian>(),
        }
        .map_err(truncated)
    }

    fn read_f64(&mut self, byte_order: Endianness) -> Result<f64> {
        match byte_order {
            Endianness::BigEndian => self.cursor.read_f64::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_f64::<LittleEndian>(),
        }
        .map_err(truncated)
    }

    /// Read a signed element count and check that `min_element_size` bytes per element remain.
    fn read_count(&mut self, byte_order: Endianness, min_element_size: usize) -> Result<usize> {
        let count = self.read_u32(byte_order)? as i32;
        if count < 0 || count as usize > i32::MAX as usize / min_element_size {
            return Err(GeoFactoryError::CorruptData(format!(
                "Invalid WKB element count {count}"
            )));
        }
        let count = count as usize;
        if count * min_element_size > self.remaining() {
            return Err(GeoFactoryError::NotEnoughData(format!(
                "WKB declares {count} elements but only {} bytes remain",
                self.remaining()
            )));
        }
        Ok(count)
    }

    /// Decode the header of the geometry at the cursor without consuming it.
    fn peek_header(&self) -> Result<(Endianness, GeometryType, Dimension)> {
        let buf = &self.cursor.get_ref()[self.position()..];
        if buf.len() < HEADER_SIZE + 4 {
            return Err(GeoFactoryError::NotEnoughData(format!(
                "WKB geometry needs at least 9 bytes, got {}",
                buf.len()
            )));
        }
        let byte_order = Endianness::try_from(buf[0])?;
        let mut cursor = Cursor::new(&buf[1..HEADER_SIZE]);
        let raw = match byte_order {
            Endianness::BigEndian => cursor.read_u32::<BigEndian>(),
            Endianness::LittleEndian => cursor.read_u32::<LittleEndian>(),
        }
        .map_err(truncated)?;
        let (geometry_type, dim) = decode_wkb_type(raw)?;
        Ok((byte_order, geometry_type, dim))
    }

    fn read_coord(&mut self, byte_order: Endianness, dim: Dimension) -> Result<Coord> {
        let mut coord = Coord::new(self.read_f64(byte_order)?, self.read_f64(byte_order)?);
        if dim.has_z() {
            coord.z = self.read_f64(byte_order)?;
        }
        if dim.has_m() {
            coord.m = self.read_f64(byte_order)?;
        }
        Ok(coord)
    }

    fn read_coords(&mut self, byte_order: Endianness, dim: Dimension) -> Result<Vec<Coord>> {
        let num_points = self.read_count(byte_order, dim.size() * 8)?;
        (0..num_points)
            .map(|_| self.read_coord(byte_order, dim))
            .collect()
    }

    fn read_geometry(&mut self, level: usize) -> Result<Geometry> {
        let (byte_order, geometry_type, dim) = self.peek_header()?;
        self.cursor.set_position((self.position() + HEADER_SIZE) as u64);

        let geom = match geometry_type {
            GeometryType::Point => {
                let coord = self.read_coord(byte_order, dim)?;
                if coord.x.is_nan() && coord.y.is_nan() {
                    Geometry::empty(GeometryType::Point, dim)
                } else {
                    Geometry::point(coord, dim)
                }
            }
            GeometryType::LineString | GeometryType::CircularString => {
                let coords = self.read_coords(byte_order, dim)?;
                Geometry::new_curve(geometry_type, coords, dim)
            }
            GeometryType::Polygon | GeometryType::Triangle => {
                let num_rings = self.read_count(byte_order, 4)?;
                let mut rings = Collection::empty(dim);
                for _ in 0..num_rings {
                    let coords = self.read_coords(byte_order, dim)?;
                    rings.push(Geometry::LinearRing(SimpleCurve::new(coords, dim)));
                }
                Geometry::from_parts(geometry_type, GeometryParts::Collection(rings))
            }
            GeometryType::LinearRing => {
                return Err(GeoFactoryError::UnsupportedGeometryType(
                    "LinearRing has no WKB encoding".to_string(),
                ))
            }
            _ => self.read_members(byte_order, geometry_type, dim, level)?,
        };
        Ok(geom)
    }

    fn read_members(
        &mut self,
        byte_order: Endianness,
        geometry_type: GeometryType,
        dim: Dimension,
        level: usize,
    ) -> Result<Geometry> {
        if level >= MAX_RECURSION_LEVEL {
            return Err(GeoFactoryError::CorruptData(format!(
                "Too many recursion levels ({level}) while parsing WKB geometry"
            )));
        }

        let num_members = self.read_count(byte_order, HEADER_SIZE + 4)?;
        let mut geom = Geometry::empty(geometry_type, dim);
        for _ in 0..num_members {
            let (_, member_type, _) = self.peek_header()?;
            if !is_compatible_sub_type(geometry_type, member_type) {
                return Err(GeoFactoryError::CorruptData(format!(
                    "{member_type} cannot be a member of {geometry_type}"
                )));
            }
            let member = self.read_geometry(level + 1)?;
            if let Some(collection) = geom.as_collection_mut() {
                if geometry_type == GeometryType::CompoundCurve {
                    collection.push_curve(member)?;
                } else {
                    collection.push(member);
                }
            }
        }
        Ok(geom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::wkb::writer::write_wkb;
    use crate::io::wkb::WkbVariant;

    #[test]
    fn too_short() {
        let buf = [1u8, 1, 0, 0, 0];
        assert!(matches!(
            parse_wkb(&buf, None),
            Err(GeoFactoryError::NotEnoughData(_))
        ));
    }

    #[test]
    fn bad_byte_order() {
        let buf = [5u8, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            parse_wkb(&buf, None),
            Err(GeoFactoryError::CorruptData(_))
        ));
    }

    #[test]
    fn unknown_type() {
        let buf = [1u8, 99, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            parse_wkb(&buf, None),
            Err(GeoFactoryError::UnsupportedGeometryType(_))
        ));
    }

    #[test]
    fn negative_count_is_corrupt() {
        let buf = [1u8, 2, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0, 0];
        assert!(matches!(
            parse_wkb(&buf, None),
            Err(GeoFactoryError::CorruptData(_))
        ));
    }

    #[test]
    fn count_beyond_buffer() {
        // LineString declaring 1000 points with none stored
        let buf = [0u8, 0, 0, 0, 2, 0, 0, 0x03, 0xe8];
        assert!(matches!(
            parse_wkb(&buf, None),
            Err(GeoFactoryError::NotEnoughData(_))
        ));
    }

    #[test]
    fn incompatible_member() {
        let point = Geometry::point(Coord::new(1., 2.), Dimension::XY);
        let mut member = vec![];
        write_wkb(&mut member, &point, Endianness::LittleEndian, WkbVariant::Iso).unwrap();
        // MultiLineString with a point member
        let mut buf = vec![1u8, 5, 0, 0, 0, 1, 0, 0, 0];
        buf.extend(member);
        assert!(matches!(
            parse_wkb(&buf, None),
            Err(GeoFactoryError::CorruptData(_))
        ));
    }

    #[test]
    fn chained_geometries() {
        let a = Geometry::point(Coord::new(1., 2.), Dimension::XY);
        let b = Geometry::line_string(
            vec![Coord::new_z(0., 0., 1.), Coord::new_z(1., 1., 2.)],
            Dimension::XYZ,
        );
        let mut buf = vec![];
        write_wkb(&mut buf, &a, Endianness::BigEndian, WkbVariant::Iso).unwrap();
        write_wkb(&mut buf, &b, Endianness::LittleEndian, WkbVariant::OldOgc).unwrap();

        let (first, consumed) = parse_wkb(&buf, None).unwrap();
        assert_eq!(first, a);
        let (second, rest) = parse_wkb(&buf[consumed..], None).unwrap();
        assert_eq!(second, b);
        assert_eq!(consumed + rest, buf.len());
    }

    #[test]
    fn empty_point_is_nan() {
        let empty = Geometry::empty(GeometryType::Point, Dimension::XY);
        let mut buf = vec![];
        write_wkb(&mut buf, &empty, Endianness::LittleEndian, WkbVariant::Iso).unwrap();
        assert_eq!(parse_wkb(&buf, None).unwrap().0, empty);
    }

    #[test]
    fn crs_is_assigned_to_members() {
        let crs = Arc::new(SpatialRef::geographic("WGS 84"));
        let geom = crate::test::polygon::square_with_hole();
        let mut buf = vec![];
        write_wkb(&mut buf, &geom, Endianness::LittleEndian, WkbVariant::Iso).unwrap();
        let (parsed, _) = parse_wkb(&buf, Some(crs.clone())).unwrap();
        assert_eq!(parsed.crs(), Some(&crs));
        assert_eq!(parsed.members()[1].crs(), Some(&crs));
    }
}
