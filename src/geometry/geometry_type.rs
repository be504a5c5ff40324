use std::fmt::Display;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The kind of a [`Geometry`][crate::geometry::Geometry].
///
/// The discriminants are the flat ISO 19125 / SQL-MM type codes, so a [`GeometryType`] converts
/// to and from the base code found in WKB headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 10,
    MultiCurve = 11,
    MultiSurface = 12,
    PolyhedralSurface = 15,
    Tin = 16,
    Triangle = 17,
    /// Only ever appears as a ring of a [`GeometryType::Polygon`]; it has no WKB code of its own.
    LinearRing = 101,
}

impl GeometryType {
    /// Whether this kind is a one-dimensional vertex or segment sequence.
    pub fn is_curve(&self) -> bool {
        matches!(
            self,
            GeometryType::LineString
                | GeometryType::CircularString
                | GeometryType::CompoundCurve
                | GeometryType::LinearRing
        )
    }

    /// Whether this kind is a two-dimensional face.
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            GeometryType::Polygon
                | GeometryType::CurvePolygon
                | GeometryType::Triangle
                | GeometryType::PolyhedralSurface
                | GeometryType::Tin
        )
    }

    /// Whether this kind owns a sequence of member geometries.
    ///
    /// PolyhedralSurface and TIN are included: they hold polygon patches.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint
                | GeometryType::MultiLineString
                | GeometryType::MultiCurve
                | GeometryType::MultiPolygon
                | GeometryType::MultiSurface
                | GeometryType::GeometryCollection
                | GeometryType::PolyhedralSurface
                | GeometryType::Tin
        )
    }

    /// Whether this kind is a specialization of `other` (or `other` itself).
    pub fn is_subclass_of(&self, other: GeometryType) -> bool {
        use GeometryType::*;
        if *self == other {
            return true;
        }
        match other {
            GeometryCollection => matches!(
                self,
                MultiPoint | MultiLineString | MultiPolygon | MultiCurve | MultiSurface
            ),
            CurvePolygon => matches!(self, Polygon | Triangle),
            MultiCurve => matches!(self, MultiLineString),
            MultiSurface => matches!(self, MultiPolygon),
            Polygon => matches!(self, Triangle),
            PolyhedralSurface => matches!(self, Tin),
            LineString => matches!(self, LinearRing),
            _ => false,
        }
    }

    /// The multi kind whose members are of this kind.
    pub fn collection_of(&self) -> Option<GeometryType> {
        use GeometryType::*;
        match self {
            Point => Some(MultiPoint),
            LineString => Some(MultiLineString),
            Polygon => Some(MultiPolygon),
            Triangle => Some(Tin),
            t if t.is_curve() => Some(MultiCurve),
            t if t.is_surface() => Some(MultiSurface),
            _ => None,
        }
    }

    /// The linear counterpart of a curved kind.
    pub fn linear_of(&self) -> GeometryType {
        use GeometryType::*;
        match self {
            CircularString | CompoundCurve => LineString,
            CurvePolygon => Polygon,
            MultiCurve => MultiLineString,
            MultiSurface => MultiPolygon,
            other => *other,
        }
    }

    /// The curved counterpart of a linear kind.
    pub fn curve_of(&self) -> GeometryType {
        use GeometryType::*;
        match self {
            LineString | LinearRing => CompoundCurve,
            Polygon | Triangle => CurvePolygon,
            MultiLineString => MultiCurve,
            MultiPolygon => MultiSurface,
            other => *other,
        }
    }

    /// Whether this kind stores arcs.
    pub fn is_non_linear(&self) -> bool {
        matches!(
            self,
            GeometryType::CircularString
                | GeometryType::CompoundCurve
                | GeometryType::CurvePolygon
                | GeometryType::MultiCurve
                | GeometryType::MultiSurface
        )
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces.
    ///
    /// Collections report `None`; their dimension depends on their members.
    pub fn topological_dimension(&self) -> Option<u8> {
        use GeometryType::*;
        match self {
            Point | MultiPoint => Some(0),
            LineString | LinearRing | CircularString | CompoundCurve | MultiLineString
            | MultiCurve => Some(1),
            Polygon | CurvePolygon | Triangle | PolyhedralSurface | Tin | MultiPolygon
            | MultiSurface => Some(2),
            GeometryCollection => None,
        }
    }

    /// The upper case WKT keyword of this kind.
    pub fn name(&self) -> &'static str {
        use GeometryType::*;
        match self {
            Point => "POINT",
            LineString => "LINESTRING",
            Polygon => "POLYGON",
            MultiPoint => "MULTIPOINT",
            MultiLineString => "MULTILINESTRING",
            MultiPolygon => "MULTIPOLYGON",
            GeometryCollection => "GEOMETRYCOLLECTION",
            CircularString => "CIRCULARSTRING",
            CompoundCurve => "COMPOUNDCURVE",
            CurvePolygon => "CURVEPOLYGON",
            MultiCurve => "MULTICURVE",
            MultiSurface => "MULTISURFACE",
            PolyhedralSurface => "POLYHEDRALSURFACE",
            Tin => "TIN",
            Triangle => "TRIANGLE",
            LinearRing => "LINEARRING",
        }
    }

    /// Look a kind up by its WKT keyword, ignoring case.
    pub fn from_name(name: &str) -> Option<GeometryType> {
        use GeometryType::*;
        [
            Point,
            LineString,
            Polygon,
            MultiPoint,
            MultiLineString,
            MultiPolygon,
            GeometryCollection,
            CircularString,
            CompoundCurve,
            CurvePolygon,
            MultiCurve,
            MultiSurface,
            PolyhedralSurface,
            Tin,
            Triangle,
            LinearRing,
        ]
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use GeometryType::*;

    #[test]
    fn subclass_lattice() {
        assert!(Triangle.is_subclass_of(Polygon));
        assert!(Polygon.is_subclass_of(CurvePolygon));
        assert!(MultiPolygon.is_subclass_of(MultiSurface));
        assert!(MultiSurface.is_subclass_of(GeometryCollection));
        assert!(Tin.is_subclass_of(PolyhedralSurface));
        assert!(!PolyhedralSurface.is_subclass_of(GeometryCollection));
        assert!(!Polygon.is_subclass_of(Triangle));
    }

    #[test]
    fn collections() {
        assert_eq!(Point.collection_of(), Some(MultiPoint));
        assert_eq!(Triangle.collection_of(), Some(Tin));
        assert_eq!(CircularString.collection_of(), Some(MultiCurve));
        assert_eq!(CurvePolygon.collection_of(), Some(MultiSurface));
        assert_eq!(GeometryCollection.collection_of(), None);
    }

    #[test]
    fn wkb_codes() {
        assert_eq!(u32::from(Tin), 16);
        assert_eq!(GeometryType::try_from(9).unwrap(), CompoundCurve);
        assert!(GeometryType::try_from(13).is_err());
    }

    #[test]
    fn names() {
        assert_eq!(GeometryType::from_name("multiSurface"), Some(MultiSurface));
        assert_eq!(GeometryType::from_name("banana"), None);
    }
}
