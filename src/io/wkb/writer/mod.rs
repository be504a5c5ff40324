//! Encode a [`Geometry`] as Well-Known Binary.

use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Dimension, Geometry};
use crate::io::wkb::common::{encode_wkb_type, Endianness, WkbVariant};

/// The byte length of the WKB encoding of `geom`.
pub fn wkb_size(geom: &Geometry) -> usize {
    let coord_size = geom.dimension().size() * 8;
    let header = 1 + 4;
    match geom {
        Geometry::Point(_) => header + coord_size,
        Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
            header + 4 + c.num_coords() * coord_size
        }
        Geometry::Polygon(_) | Geometry::Triangle(_) => {
            header
                + 4
                + geom
                    .members()
                    .iter()
                    .map(|ring| 4 + ring.num_points() * coord_size)
                    .sum::<usize>()
        }
        _ => header + 4 + geom.members().iter().map(wkb_size).sum::<usize>(),
    }
}

/// Write a geometry to a Writer encoded as WKB
pub fn write_wkb<W: Write>(
    mut writer: W,
    geom: &Geometry,
    byte_order: Endianness,
    variant: WkbVariant,
) -> Result<()> {
    match byte_order {
        Endianness::BigEndian => write_geometry::<BigEndian, W>(&mut writer, geom, variant),
        Endianness::LittleEndian => write_geometry::<LittleEndian, W>(&mut writer, geom, variant),
    }
}

/// Encode a geometry as a fresh little endian ISO WKB buffer.
pub fn to_wkb(geom: &Geometry) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(wkb_size(geom));
    write_wkb(&mut buf, geom, Endianness::LittleEndian, WkbVariant::Iso)?;
    Ok(buf)
}

fn byte_order_marker<B: ByteOrder>() -> u8 {
    // ByteOrder has no runtime tag, so probe it with a known value.
    let mut buf = [0u8; 2];
    B::write_u16(&mut buf, 1);
    if buf[0] == 1 {
        Endianness::LittleEndian.into()
    } else {
        Endianness::BigEndian.into()
    }
}

fn write_count<B: ByteOrder, W: Write>(writer: &mut W, count: usize) -> Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| GeoFactoryError::General(format!("Too many elements for WKB: {count}")))?;
    writer.write_u32::<B>(count)?;
    Ok(())
}

fn write_coord<B: ByteOrder, W: Write>(writer: &mut W, coord: &Coord, dim: Dimension) -> Result<()> {
    writer.write_f64::<B>(coord.x)?;
    writer.write_f64::<B>(coord.y)?;
    if dim.has_z() {
        writer.write_f64::<B>(coord.z)?;
    }
    if dim.has_m() {
        writer.write_f64::<B>(coord.m)?;
    }
    Ok(())
}

fn write_coords<B: ByteOrder, W: Write>(
    writer: &mut W,
    coords: &[Coord],
    dim: Dimension,
) -> Result<()> {
    write_count::<B, W>(writer, coords.len())?;
    for coord in coords {
        write_coord::<B, W>(writer, coord, dim)?;
    }
    Ok(())
}

fn write_geometry<B: ByteOrder, W: Write>(
    writer: &mut W,
    geom: &Geometry,
    variant: WkbVariant,
) -> Result<()> {
    let dim = geom.dimension();

    // Byte order
    writer.write_u8(byte_order_marker::<B>())?;

    // wkbType
    writer.write_u32::<B>(encode_wkb_type(geom.geometry_type(), dim, variant))?;

    match geom {
        Geometry::Point(p) => {
            let coord = p
                .coord
                .unwrap_or(Coord::new_zm(f64::NAN, f64::NAN, f64::NAN, f64::NAN));
            write_coord::<B, W>(writer, &coord, dim)?;
        }
        Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
            write_coords::<B, W>(writer, &c.coords, dim)?;
        }
        Geometry::Polygon(_) | Geometry::Triangle(_) => {
            write_count::<B, W>(writer, geom.num_members())?;
            for ring in geom.members() {
                let coords = ring.as_curve().map(|c| c.coords.as_slice()).unwrap_or(&[]);
                write_coords::<B, W>(writer, coords, dim)?;
            }
        }
        _ => {
            write_count::<B, W>(writer, geom.num_members())?;
            for member in geom.members() {
                // Rings of a curve polygon are written as standalone line strings.
                write_geometry::<B, W>(writer, member, variant)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::GeometryType;
    use crate::io::wkb::parse_wkb;
    use crate::test::curve::{compound_curve, curve_polygon};
    use crate::test::polygon::square_with_hole;

    fn round_trip(geom: &Geometry) {
        for byte_order in [Endianness::BigEndian, Endianness::LittleEndian] {
            for variant in [WkbVariant::Iso, WkbVariant::OldOgc] {
                let mut buf = vec![];
                write_wkb(&mut buf, geom, byte_order, variant).unwrap();
                assert_eq!(buf.len(), wkb_size(geom));
                let (parsed, consumed) = parse_wkb(&buf, None).unwrap();
                assert_eq!(consumed, buf.len());
                assert_eq!(&parsed, geom);
            }
        }
    }

    #[test]
    fn polygon_round_trip() {
        round_trip(&square_with_hole());
    }

    #[test]
    fn curves_round_trip() {
        round_trip(&compound_curve());
        round_trip(&curve_polygon());
    }

    #[test]
    fn measured_collection_round_trip() {
        let geom = Geometry::new_collection(
            GeometryType::GeometryCollection,
            vec![
                Geometry::point(Coord::new_zm(1., 2., 3., 4.), Dimension::XYZM),
                Geometry::line_string(
                    vec![Coord::new_zm(0., 0., 0., 1.), Coord::new_zm(1., 0., 0., 2.)],
                    Dimension::XYZM,
                ),
            ],
            Dimension::XYZM,
        );
        round_trip(&geom);
    }

    #[test]
    fn iso_header() {
        let geom = Geometry::point(Coord::new_z(1., 2., 3.), Dimension::XYZ);
        let buf = to_wkb(&geom).unwrap();
        assert_eq!(&buf[..5], &[1, 0xe9, 0x03, 0, 0]);
    }
}
