use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Dimension, GeometryType};

/// Flag set on the type code of extended (pre-ISO) WKB when the geometry has Z.
pub(crate) const WKB_Z_FLAG: u32 = 0x8000_0000;

/// Flag set on the type code of extended (pre-ISO) WKB when the geometry has M.
pub(crate) const WKB_M_FLAG: u32 = 0x4000_0000;

/// Geometries nested deeper than this are rejected as corrupt.
pub(crate) const MAX_RECURSION_LEVEL: usize = 32;

/// Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    BigEndian,
    #[default]
    LittleEndian,
}

impl TryFrom<u8> for Endianness {
    type Error = GeoFactoryError;

    fn try_from(value: u8) -> Result<Self> {
        // Some writers store the order marker as an ASCII '0' or '1'.
        let value = if value & 0x31 == value {
            value & 0x01
        } else {
            value
        };
        match value {
            0 => Ok(Endianness::BigEndian),
            1 => Ok(Endianness::LittleEndian),
            _ => Err(GeoFactoryError::CorruptData(format!(
                "Unexpected WKB byte order marker {value:#04x}"
            ))),
        }
    }
}

impl From<Endianness> for u8 {
    fn from(value: Endianness) -> Self {
        use Endianness::*;
        match value {
            BigEndian => 0,
            LittleEndian => 1,
        }
    }
}

/// How Z and M are folded into the WKB type code on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WkbVariant {
    /// ISO SQL/MM: Z adds 1000, M adds 2000.
    #[default]
    Iso,
    /// Extended OGC: the high bits 0x80000000 (Z) and 0x40000000 (M).
    OldOgc,
}

/// Decode a raw WKB type code into a kind and a dimension.
///
/// Both the ISO and the extended flag conventions are accepted.
pub(crate) fn decode_wkb_type(raw: u32) -> Result<(GeometryType, Dimension)> {
    let mut has_z = raw & WKB_Z_FLAG != 0;
    let mut has_m = raw & WKB_M_FLAG != 0;
    let mut code = raw & 0x0FFF_FFFF;

    match code {
        1000..=1999 => {
            code -= 1000;
            has_z = true;
        }
        2000..=2999 => {
            code -= 2000;
            has_m = true;
        }
        3000..=3999 => {
            code -= 3000;
            has_z = true;
            has_m = true;
        }
        _ => {}
    }

    let geometry_type = match GeometryType::try_from(code) {
        Ok(GeometryType::LinearRing) | Err(_) => {
            return Err(GeoFactoryError::UnsupportedGeometryType(format!(
                "Unsupported WKB geometry type code {raw}"
            )))
        }
        Ok(t) => t,
    };
    Ok((geometry_type, Dimension::from_flags(has_z, has_m)))
}

/// Encode a kind and a dimension into a WKB type code.
pub(crate) fn encode_wkb_type(
    geometry_type: GeometryType,
    dim: Dimension,
    variant: WkbVariant,
) -> u32 {
    // A standalone ring is written as a line string.
    let code: u32 = match geometry_type {
        GeometryType::LinearRing => GeometryType::LineString.into(),
        t => t.into(),
    };
    match variant {
        WkbVariant::Iso => {
            code + if dim.has_z() { 1000 } else { 0 } + if dim.has_m() { 2000 } else { 0 }
        }
        WkbVariant::OldOgc => {
            let mut code = code;
            if dim.has_z() {
                code |= WKB_Z_FLAG;
            }
            if dim.has_m() {
                code |= WKB_M_FLAG;
            }
            code
        }
    }
}

/// Whether a member of kind `member` may be stored inside a `parent`.
pub(crate) fn is_compatible_sub_type(parent: GeometryType, member: GeometryType) -> bool {
    use GeometryType::*;
    match parent {
        MultiPoint => member == Point,
        MultiLineString => member == LineString,
        MultiPolygon => member == Polygon,
        MultiCurve => matches!(member, LineString | CircularString | CompoundCurve),
        MultiSurface => matches!(member, Polygon | CurvePolygon),
        CompoundCurve => matches!(member, LineString | CircularString),
        CurvePolygon => matches!(member, LineString | CircularString | CompoundCurve),
        PolyhedralSurface => member == Polygon,
        Tin => member == Triangle,
        GeometryCollection => member != LinearRing,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_iso_and_extended() {
        assert_eq!(
            decode_wkb_type(1002).unwrap(),
            (GeometryType::LineString, Dimension::XYZ)
        );
        assert_eq!(
            decode_wkb_type(3008).unwrap(),
            (GeometryType::CircularString, Dimension::XYZM)
        );
        assert_eq!(
            decode_wkb_type(0x8000_0003).unwrap(),
            (GeometryType::Polygon, Dimension::XYZ)
        );
        assert_eq!(
            decode_wkb_type(0x4000_0001).unwrap(),
            (GeometryType::Point, Dimension::XYM)
        );
    }

    #[test]
    fn decode_unsupported() {
        for raw in [0, 13, 14, 18, 101, 4001] {
            assert!(matches!(
                decode_wkb_type(raw),
                Err(GeoFactoryError::UnsupportedGeometryType(_))
            ));
        }
    }

    #[test]
    fn encode_variants() {
        assert_eq!(
            encode_wkb_type(GeometryType::Tin, Dimension::XYZM, WkbVariant::Iso),
            3016
        );
        assert_eq!(
            encode_wkb_type(GeometryType::Point, Dimension::XYZ, WkbVariant::OldOgc),
            0x8000_0001
        );
    }

    #[test]
    fn ascii_byte_order() {
        assert_eq!(Endianness::try_from(b'1').unwrap(), Endianness::LittleEndian);
        assert_eq!(Endianness::try_from(b'0').unwrap(), Endianness::BigEndian);
        assert!(Endianness::try_from(0x05).is_err());
    }
}
