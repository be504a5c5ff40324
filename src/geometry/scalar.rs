use std::sync::Arc;

use crate::geometry::{
    Collection, Coord, Dimension, Envelope, GeometryType, Point, SimpleCurve, SpatialRef,
};

/// A geometry of any of the supported kinds.
///
/// Linear kinds own a vertex sequence ([`SimpleCurve`]); every other kind except Point owns an
/// ordered list of member geometries ([`Collection`]). For the polygon kinds the members are the
/// rings, exterior first.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(SimpleCurve),
    CircularString(SimpleCurve),
    LinearRing(SimpleCurve),
    CompoundCurve(Collection),
    Polygon(Collection),
    CurvePolygon(Collection),
    Triangle(Collection),
    PolyhedralSurface(Collection),
    Tin(Collection),
    MultiPoint(Collection),
    MultiLineString(Collection),
    MultiCurve(Collection),
    MultiPolygon(Collection),
    MultiSurface(Collection),
    GeometryCollection(Collection),
}

/// Run the same expression against the payload of any variant.
macro_rules! with_inner {
    ($geom:expr, $inner:ident => $body:expr) => {
        match $geom {
            Geometry::Point($inner) => $body,
            Geometry::LineString($inner)
            | Geometry::CircularString($inner)
            | Geometry::LinearRing($inner) => $body,
            Geometry::CompoundCurve($inner)
            | Geometry::Polygon($inner)
            | Geometry::CurvePolygon($inner)
            | Geometry::Triangle($inner)
            | Geometry::PolyhedralSurface($inner)
            | Geometry::Tin($inner)
            | Geometry::MultiPoint($inner)
            | Geometry::MultiLineString($inner)
            | Geometry::MultiCurve($inner)
            | Geometry::MultiPolygon($inner)
            | Geometry::MultiSurface($inner)
            | Geometry::GeometryCollection($inner) => $body,
        }
    };
}

/// The storage behind a [`Geometry`], independent of its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryParts {
    Point(Point),
    Curve(SimpleCurve),
    Collection(Collection),
}

impl Geometry {
    /// Create an empty geometry of the given kind.
    pub fn empty(geometry_type: GeometryType, dim: Dimension) -> Geometry {
        use GeometryType::*;
        match geometry_type {
            Point => Geometry::Point(crate::geometry::Point::empty(dim)),
            LineString | CircularString | LinearRing => {
                Geometry::from_parts(geometry_type, GeometryParts::Curve(SimpleCurve::empty(dim)))
            }
            _ => Geometry::from_parts(
                geometry_type,
                GeometryParts::Collection(Collection::empty(dim)),
            ),
        }
    }

    pub fn point(coord: Coord, dim: Dimension) -> Geometry {
        Geometry::Point(Point::new(coord, dim))
    }

    /// Create a vertex-sequence geometry. `geometry_type` must be a linear or circular string kind.
    pub fn new_curve(geometry_type: GeometryType, coords: Vec<Coord>, dim: Dimension) -> Geometry {
        let mut geom = Geometry::empty(geometry_type, dim);
        if let Some(curve) = geom.as_curve_mut() {
            curve.coords = coords;
        }
        geom
    }

    pub fn line_string(coords: Vec<Coord>, dim: Dimension) -> Geometry {
        Geometry::LineString(SimpleCurve::new(coords, dim))
    }

    pub fn linear_ring(coords: Vec<Coord>, dim: Dimension) -> Geometry {
        Geometry::LinearRing(SimpleCurve::new(coords, dim))
    }

    pub fn circular_string(coords: Vec<Coord>, dim: Dimension) -> Geometry {
        Geometry::CircularString(SimpleCurve::new(coords, dim))
    }

    /// Create a member-list geometry. `geometry_type` must not be a vertex-sequence kind.
    ///
    /// Members are appended through [`Collection::push`], so their dimensions are unified.
    pub fn new_collection(
        geometry_type: GeometryType,
        members: Vec<Geometry>,
        dim: Dimension,
    ) -> Geometry {
        let mut geom = Geometry::empty(geometry_type, dim);
        if let Some(collection) = geom.as_collection_mut() {
            members.into_iter().for_each(|m| collection.push(m));
        }
        geom
    }

    /// A polygon out of closed rings, exterior first.
    pub fn polygon(rings: Vec<SimpleCurve>, dim: Dimension) -> Geometry {
        Geometry::new_collection(
            GeometryType::Polygon,
            rings.into_iter().map(Geometry::LinearRing).collect(),
            dim,
        )
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::CircularString(_) => GeometryType::CircularString,
            Geometry::LinearRing(_) => GeometryType::LinearRing,
            Geometry::CompoundCurve(_) => GeometryType::CompoundCurve,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::CurvePolygon(_) => GeometryType::CurvePolygon,
            Geometry::Triangle(_) => GeometryType::Triangle,
            Geometry::PolyhedralSurface(_) => GeometryType::PolyhedralSurface,
            Geometry::Tin(_) => GeometryType::Tin,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiCurve(_) => GeometryType::MultiCurve,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::MultiSurface(_) => GeometryType::MultiSurface,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    /// Split a geometry into its kind and its storage.
    pub fn into_parts(self) -> (GeometryType, GeometryParts) {
        let geometry_type = self.geometry_type();
        let parts = match self {
            Geometry::Point(p) => GeometryParts::Point(p),
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                GeometryParts::Curve(c)
            }
            Geometry::CompoundCurve(c)
            | Geometry::Polygon(c)
            | Geometry::CurvePolygon(c)
            | Geometry::Triangle(c)
            | Geometry::PolyhedralSurface(c)
            | Geometry::Tin(c)
            | Geometry::MultiPoint(c)
            | Geometry::MultiLineString(c)
            | Geometry::MultiCurve(c)
            | Geometry::MultiPolygon(c)
            | Geometry::MultiSurface(c)
            | Geometry::GeometryCollection(c) => GeometryParts::Collection(c),
        };
        (geometry_type, parts)
    }

    /// Reassemble a geometry. Storage that does not fit `geometry_type` is kept under its own
    /// natural kind (Point, LineString or GeometryCollection).
    pub fn from_parts(geometry_type: GeometryType, parts: GeometryParts) -> Geometry {
        use GeometryType as T;
        match parts {
            GeometryParts::Point(p) => Geometry::Point(p),
            GeometryParts::Curve(c) => match geometry_type {
                T::CircularString => Geometry::CircularString(c),
                T::LinearRing => Geometry::LinearRing(c),
                _ => Geometry::LineString(c),
            },
            GeometryParts::Collection(c) => match geometry_type {
                T::CompoundCurve => Geometry::CompoundCurve(c),
                T::Polygon => Geometry::Polygon(c),
                T::CurvePolygon => Geometry::CurvePolygon(c),
                T::Triangle => Geometry::Triangle(c),
                T::PolyhedralSurface => Geometry::PolyhedralSurface(c),
                T::Tin => Geometry::Tin(c),
                T::MultiPoint => Geometry::MultiPoint(c),
                T::MultiLineString => Geometry::MultiLineString(c),
                T::MultiCurve => Geometry::MultiCurve(c),
                T::MultiPolygon => Geometry::MultiPolygon(c),
                T::MultiSurface => Geometry::MultiSurface(c),
                _ => Geometry::GeometryCollection(c),
            },
        }
    }

    /// Relabel this geometry as another kind sharing the same storage.
    ///
    /// This does not check member kinds; callers cast only along the kind lattice. Casting to a
    /// kind with a different storage shape returns the geometry unchanged.
    pub fn cast(self, geometry_type: GeometryType) -> Geometry {
        let same_storage = match (&self, geometry_type) {
            (Geometry::Point(_), t) => t == GeometryType::Point,
            (Geometry::LineString(_), t)
            | (Geometry::CircularString(_), t)
            | (Geometry::LinearRing(_), t) => matches!(
                t,
                GeometryType::LineString | GeometryType::CircularString | GeometryType::LinearRing
            ),
            (_, t) => !matches!(
                t,
                GeometryType::Point
                    | GeometryType::LineString
                    | GeometryType::CircularString
                    | GeometryType::LinearRing
            ),
        };
        if !same_storage {
            return self;
        }
        let (_, parts) = self.into_parts();
        Geometry::from_parts(geometry_type, parts)
    }

    pub fn dimension(&self) -> Dimension {
        with_inner!(self, inner => inner.dim)
    }

    pub fn has_z(&self) -> bool {
        self.dimension().has_z()
    }

    pub fn has_m(&self) -> bool {
        self.dimension().has_m()
    }

    /// Set the coordinate dimension of this geometry and all its members.
    ///
    /// Dropping Z or M zeroes the ordinate; adding one initializes it to zero.
    pub fn set_dimension(&mut self, dim: Dimension) {
        match self {
            Geometry::Point(p) => {
                if let Some(c) = p.coord.as_mut() {
                    if !dim.has_z() {
                        c.z = 0.;
                    }
                    if !dim.has_m() {
                        c.m = 0.;
                    }
                }
                p.dim = dim;
            }
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.set_dimension(dim)
            }
            _ => {
                if let Some(c) = self.as_collection_mut() {
                    c.set_dimension(dim)
                }
            }
        }
    }

    pub fn crs(&self) -> Option<&Arc<SpatialRef>> {
        with_inner!(self, inner => inner.crs.as_ref())
    }

    /// Attach a CRS to this geometry and all its members.
    pub fn assign_crs(&mut self, crs: Option<Arc<SpatialRef>>) {
        if let Some(c) = self.as_collection_mut() {
            c.members
                .iter_mut()
                .for_each(|m| m.assign_crs(crs.clone()));
        }
        with_inner!(self, inner => inner.crs = crs)
    }

    pub fn with_crs(mut self, crs: Option<Arc<SpatialRef>>) -> Self {
        self.assign_crs(crs);
        self
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(p) => p.coord.is_none(),
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.is_empty()
            }
            _ => self.members().iter().all(|m| m.is_empty()),
        }
    }

    pub fn as_curve(&self) -> Option<&SimpleCurve> {
        match self {
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn as_curve_mut(&mut self) -> Option<&mut SimpleCurve> {
        match self {
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Geometry::Point(_)
            | Geometry::LineString(_)
            | Geometry::CircularString(_)
            | Geometry::LinearRing(_) => None,
            Geometry::CompoundCurve(c)
            | Geometry::Polygon(c)
            | Geometry::CurvePolygon(c)
            | Geometry::Triangle(c)
            | Geometry::PolyhedralSurface(c)
            | Geometry::Tin(c)
            | Geometry::MultiPoint(c)
            | Geometry::MultiLineString(c)
            | Geometry::MultiCurve(c)
            | Geometry::MultiPolygon(c)
            | Geometry::MultiSurface(c)
            | Geometry::GeometryCollection(c) => Some(c),
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Geometry::Point(_)
            | Geometry::LineString(_)
            | Geometry::CircularString(_)
            | Geometry::LinearRing(_) => None,
            Geometry::CompoundCurve(c)
            | Geometry::Polygon(c)
            | Geometry::CurvePolygon(c)
            | Geometry::Triangle(c)
            | Geometry::PolyhedralSurface(c)
            | Geometry::Tin(c)
            | Geometry::MultiPoint(c)
            | Geometry::MultiLineString(c)
            | Geometry::MultiCurve(c)
            | Geometry::MultiPolygon(c)
            | Geometry::MultiSurface(c)
            | Geometry::GeometryCollection(c) => Some(c),
        }
    }

    /// Member geometries; empty for Point and vertex-sequence kinds.
    pub fn members(&self) -> &[Geometry] {
        self.as_collection()
            .map(|c| c.members.as_slice())
            .unwrap_or(&[])
    }

    /// Take the member geometries out, leaving none behind.
    pub fn into_members(self) -> Vec<Geometry> {
        match self.into_parts() {
            (_, GeometryParts::Collection(c)) => c.members,
            _ => vec![],
        }
    }

    pub fn num_members(&self) -> usize {
        self.members().len()
    }

    /// The first ring of a polygon kind.
    pub fn exterior_ring(&self) -> Option<&Geometry> {
        match self {
            Geometry::Polygon(c) | Geometry::CurvePolygon(c) | Geometry::Triangle(c) => {
                c.members.first()
            }
            _ => None,
        }
    }

    /// All but the first ring of a polygon kind.
    pub fn interior_rings(&self) -> &[Geometry] {
        match self {
            Geometry::Polygon(c) | Geometry::CurvePolygon(c) | Geometry::Triangle(c) => {
                c.members.get(1..).unwrap_or(&[])
            }
            _ => &[],
        }
    }

    /// The first vertex of a curve kind.
    pub fn start_point(&self) -> Option<Coord> {
        match self {
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.start()
            }
            Geometry::CompoundCurve(c) => c.members.first().and_then(|m| m.start_point()),
            _ => None,
        }
    }

    /// The last vertex of a curve kind.
    pub fn end_point(&self) -> Option<Coord> {
        match self {
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.end()
            }
            Geometry::CompoundCurve(c) => c.members.last().and_then(|m| m.end_point()),
            _ => None,
        }
    }

    /// Whether a curve kind ends where it starts.
    pub fn is_closed(&self) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) => start.equals_2d(&end),
            _ => false,
        }
    }

    /// Reverse the vertex order of a curve kind. Other kinds are left untouched.
    pub fn reverse(&mut self) {
        match self {
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.reverse()
            }
            Geometry::CompoundCurve(c) => {
                c.members.reverse();
                c.members.iter_mut().for_each(|m| m.reverse());
            }
            _ => {}
        }
    }

    /// Number of vertices, across all members.
    pub fn num_points(&self) -> usize {
        match self {
            Geometry::Point(p) => usize::from(p.coord.is_some()),
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.num_coords()
            }
            Geometry::CompoundCurve(c) => {
                // Shared vertices between consecutive components are counted once.
                let total: usize = c.members.iter().map(|m| m.num_points()).sum();
                total.saturating_sub(c.members.len().saturating_sub(1))
            }
            _ => self.members().iter().map(|m| m.num_points()).sum(),
        }
    }

    /// The 2D bounding box of all vertices.
    ///
    /// Not cached: it is recomputed in a single pass over the vertices on every call, so
    /// callers that need it repeatedly should keep the result.
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::new();
        self.visit_coords(&mut |c| env.update(c));
        env
    }

    /// Call `f` on every vertex, in storage order.
    pub fn visit_coords(&self, f: &mut impl FnMut(&Coord)) {
        match self {
            Geometry::Point(p) => {
                if let Some(c) = p.coord.as_ref() {
                    f(c)
                }
            }
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.coords.iter().for_each(f)
            }
            _ => {
                for member in self.members() {
                    member.visit_coords(f);
                }
            }
        }
    }

    /// Call `f` on every vertex, allowing it to be modified in place.
    pub fn visit_coords_mut(&mut self, f: &mut impl FnMut(&mut Coord)) {
        match self {
            Geometry::Point(p) => {
                if let Some(c) = p.coord.as_mut() {
                    f(c)
                }
            }
            Geometry::LineString(c) | Geometry::CircularString(c) | Geometry::LinearRing(c) => {
                c.coords.iter_mut().for_each(f)
            }
            _ => {
                if let Some(c) = self.as_collection_mut() {
                    for member in c.members.iter_mut() {
                        member.visit_coords_mut(f);
                    }
                }
            }
        }
    }

    /// Whether this geometry carries curves.
    ///
    /// With `look_for_non_linear` set, only actual arcs count: a compound curve made solely of
    /// line strings does not.
    pub fn has_curve_geometry(&self, look_for_non_linear: bool) -> bool {
        match self {
            Geometry::CircularString(_) => true,
            Geometry::CompoundCurve(_)
            | Geometry::CurvePolygon(_)
            | Geometry::MultiCurve(_)
            | Geometry::MultiSurface(_)
                if !look_for_non_linear =>
            {
                true
            }
            _ => self
                .members()
                .iter()
                .any(|m| m.has_curve_geometry(look_for_non_linear)),
        }
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces.
    ///
    /// A collection reports the highest dimension among its members (0 when it has none).
    pub fn topological_dimension(&self) -> u8 {
        match self.geometry_type().topological_dimension() {
            Some(d) => d,
            None => self
                .members()
                .iter()
                .map(|m| m.topological_dimension())
                .max()
                .unwrap_or(0),
        }
    }

    /// Close every ring of the polygon kinds found in this geometry.
    pub fn close_rings(&mut self) {
        match self {
            Geometry::LinearRing(c) => c.close(),
            _ => {
                if let Some(c) = self.as_collection_mut() {
                    c.members.iter_mut().for_each(|m| m.close_rings())
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::polygon::{square, square_with_hole};

    #[test]
    fn empty_geometries() {
        for t in [
            GeometryType::Point,
            GeometryType::CircularString,
            GeometryType::CurvePolygon,
            GeometryType::Tin,
        ] {
            let geom = Geometry::empty(t, Dimension::XYZ);
            assert_eq!(geom.geometry_type(), t);
            assert!(geom.is_empty());
            assert!(geom.has_z());
        }
    }

    #[test]
    fn cast_keeps_storage() {
        let geom = Geometry::new_collection(
            GeometryType::MultiPolygon,
            vec![square(0., 0., 1.)],
            Dimension::XY,
        );
        let cast = geom.clone().cast(GeometryType::MultiSurface);
        assert_eq!(cast.geometry_type(), GeometryType::MultiSurface);
        assert_eq!(cast.members(), geom.members());

        let point = Geometry::point(Coord::new(1., 2.), Dimension::XY);
        assert_eq!(point.clone().cast(GeometryType::Polygon), point);
    }

    #[test]
    fn push_widens_dimension() {
        let mut geom = Geometry::empty(GeometryType::MultiPoint, Dimension::XY);
        let collection = geom.as_collection_mut().unwrap();
        collection.push(Geometry::point(Coord::new(1., 2.), Dimension::XY));
        collection.push(Geometry::point(Coord::new_z(1., 2., 3.), Dimension::XYZ));
        assert!(geom.has_z());
        assert!(geom.members().iter().all(|m| m.has_z()));
    }

    #[test]
    fn set_dimension_zeroes_dropped_ordinates() {
        let mut geom = Geometry::line_string(
            vec![Coord::new_zm(0., 0., 1., 2.), Coord::new_zm(1., 1., 3., 4.)],
            Dimension::XYZM,
        );
        geom.set_dimension(Dimension::XYM);
        let coords = &geom.as_curve().unwrap().coords;
        assert_eq!(coords[0], Coord::new_zm(0., 0., 0., 2.));
        assert_eq!(geom.dimension(), Dimension::XYM);
    }

    #[test]
    fn compound_curve_snaps_components() {
        let mut geom = Geometry::empty(GeometryType::CompoundCurve, Dimension::XY);
        let cc = geom.as_collection_mut().unwrap();
        cc.push_curve(Geometry::circular_string(
            vec![Coord::new(0., 0.), Coord::new(1., 1.), Coord::new(2., 0.)],
            Dimension::XY,
        ))
        .unwrap();
        cc.push_curve(Geometry::line_string(
            vec![Coord::new(2. + 1e-16, 0.), Coord::new(3., 0.)],
            Dimension::XY,
        ))
        .unwrap();
        assert!(cc
            .push_curve(Geometry::line_string(
                vec![Coord::new(5., 0.), Coord::new(6., 0.)],
                Dimension::XY,
            ))
            .is_err());
        assert_eq!(geom.members()[1].start_point(), Some(Coord::new(2., 0.)));
        assert_eq!(geom.num_points(), 4);
        assert!(geom.has_curve_geometry(true));
    }

    #[test]
    fn rings_and_envelope() {
        let geom = square_with_hole();
        assert_eq!(geom.interior_rings().len(), 1);
        assert_eq!(geom.envelope(), Envelope::from_bounds(0., 0., 10., 10.));
        assert_eq!(geom.topological_dimension(), 2);
    }

    #[test]
    fn envelope_follows_edits() {
        let mut geom = Geometry::line_string(
            vec![Coord::new(0., 0.), Coord::new(1., 1.)],
            Dimension::XY,
        );
        assert_eq!(geom.envelope(), Envelope::from_bounds(0., 0., 1., 1.));
        geom.visit_coords_mut(&mut |c| c.x += 10.);
        assert_eq!(geom.envelope(), Envelope::from_bounds(10., 0., 11., 1.));
    }
}
