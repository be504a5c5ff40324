use crate::algorithm::curve::detect::curve_from_line_string;
use crate::algorithm::curve::stroke::curve_to_line_string;
use crate::geometry::{Coord, Geometry, GeometryType, SimpleCurve};
use crate::options::StrokeOptions;

/// Approximate every circular arc by line segments.
pub trait Linearize {
    /// The linear counterpart of this geometry: CircularString and CompoundCurve become
    /// LineString, CurvePolygon becomes Polygon, MultiCurve becomes MultiLineString and
    /// MultiSurface becomes MultiPolygon. Linear geometries are returned unchanged.
    ///
    /// ```
    /// use geofactory::algorithm::curve::Linearize;
    /// use geofactory::geometry::{Coord, Dimension, Geometry, GeometryType};
    /// use geofactory::options::StrokeOptions;
    ///
    /// let arc = Geometry::circular_string(
    ///     vec![Coord::new(0., 0.), Coord::new(1., 1.), Coord::new(2., 0.)],
    ///     Dimension::XY,
    /// );
    /// let line = arc.linearize(&StrokeOptions::default());
    /// assert_eq!(line.geometry_type(), GeometryType::LineString);
    /// ```
    fn linearize(&self, options: &StrokeOptions) -> Geometry;
}

/// Recover circular arcs from stroked line work.
pub trait CurveGeometry {
    /// The curved counterpart of this geometry, or a clone when no arc is found.
    fn curve_geometry(&self) -> Geometry;
}

fn append_skipping_joint(coords: &mut Vec<Coord>, part: Vec<Coord>) {
    let skip = usize::from(!coords.is_empty());
    coords.extend(part.into_iter().skip(skip));
}

/// The vertices of any curve kind, with arcs stroked.
pub(crate) fn linearize_curve(geom: &Geometry, options: &StrokeOptions) -> SimpleCurve {
    let dim = geom.dimension();
    match geom {
        Geometry::LineString(c) | Geometry::LinearRing(c) => c.clone(),
        Geometry::CircularString(c) if c.num_coords() < 3 => c.clone(),
        Geometry::CircularString(c) => {
            let mut coords = Vec::with_capacity(c.num_coords());
            for triple in c.coords.windows(3).step_by(2) {
                let arc = curve_to_line_string(&triple[0], &triple[1], &triple[2], dim, options);
                append_skipping_joint(&mut coords, arc.coords);
            }
            SimpleCurve::new(coords, dim)
        }
        Geometry::CompoundCurve(c) => {
            let mut coords = vec![];
            for member in &c.members {
                append_skipping_joint(&mut coords, linearize_curve(member, options).coords);
            }
            SimpleCurve::new(coords, dim)
        }
        _ => SimpleCurve::empty(dim),
    }
}

fn linearize_members(
    geom: &Geometry,
    geometry_type: GeometryType,
    options: &StrokeOptions,
) -> Geometry {
    Geometry::new_collection(
        geometry_type,
        geom.members()
            .iter()
            .map(|m| m.linearize(options))
            .collect(),
        geom.dimension(),
    )
}

impl Linearize for Geometry {
    fn linearize(&self, options: &StrokeOptions) -> Geometry {
        let out = match self {
            Geometry::CircularString(_) | Geometry::CompoundCurve(_) => {
                Geometry::LineString(linearize_curve(self, options))
            }
            Geometry::CurvePolygon(_) => Geometry::new_collection(
                GeometryType::Polygon,
                self.members()
                    .iter()
                    .map(|ring| Geometry::LinearRing(linearize_curve(ring, options)))
                    .collect(),
                self.dimension(),
            ),
            Geometry::MultiCurve(_) => {
                linearize_members(self, GeometryType::MultiLineString, options)
            }
            Geometry::MultiSurface(_) => {
                linearize_members(self, GeometryType::MultiPolygon, options)
            }
            Geometry::GeometryCollection(_) if self.has_curve_geometry(false) => {
                linearize_members(self, GeometryType::GeometryCollection, options)
            }
            _ => return self.clone(),
        };
        out.with_crs(self.crs().cloned())
    }
}

/// Recurse into members; `None` when no member changed kind.
fn curve_members(geom: &Geometry) -> Option<Vec<Geometry>> {
    let members: Vec<Geometry> = geom.members().iter().map(|m| m.curve_geometry()).collect();
    let changed = members
        .iter()
        .zip(geom.members())
        .any(|(new, old)| new.geometry_type() != old.geometry_type());
    changed.then_some(members)
}

impl CurveGeometry for Geometry {
    fn curve_geometry(&self) -> Geometry {
        let dim = self.dimension();
        let out = match self {
            Geometry::LineString(c) => curve_from_line_string(c, false),
            Geometry::LinearRing(c) => curve_from_line_string(c, true),
            Geometry::Polygon(_) => {
                let rings: Vec<Geometry> =
                    self.members().iter().map(|r| r.curve_geometry()).collect();
                if rings
                    .iter()
                    .all(|r| r.geometry_type() == GeometryType::LineString)
                {
                    return self.clone();
                }
                Geometry::new_collection(GeometryType::CurvePolygon, rings, dim)
            }
            Geometry::MultiLineString(_) => match curve_members(self) {
                Some(members) => Geometry::new_collection(GeometryType::MultiCurve, members, dim),
                None => return self.clone(),
            },
            Geometry::MultiPolygon(_) => match curve_members(self) {
                Some(members) => {
                    Geometry::new_collection(GeometryType::MultiSurface, members, dim)
                }
                None => return self.clone(),
            },
            Geometry::GeometryCollection(_) => match curve_members(self) {
                Some(members) => {
                    Geometry::new_collection(GeometryType::GeometryCollection, members, dim)
                }
                None => return self.clone(),
            },
            _ => return self.clone(),
        };
        out.with_crs(self.crs().cloned())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Dimension;
    use crate::options::IntermediatePoint;
    use crate::test::curve::{circular_arc, compound_curve, curve_polygon};
    use crate::test::polygon::square_with_hole;
    use approx::assert_abs_diff_eq;

    #[test]
    fn circular_string() {
        let line = circular_arc().linearize(&StrokeOptions::default());
        let coords = &line.as_curve().unwrap().coords;
        assert_eq!(coords.first(), Some(&Coord::new(0., 0.)));
        assert_eq!(coords.last(), Some(&Coord::new(2., 0.)));
        for c in coords {
            assert_abs_diff_eq!(((c.x - 1.).powi(2) + c.y.powi(2)).sqrt(), 1., epsilon = 1e-9);
        }
    }

    #[test]
    fn compound_curve_has_no_repeated_joint() {
        let line = compound_curve().linearize(&StrokeOptions::default());
        let coords = &line.as_curve().unwrap().coords;
        assert_eq!(coords.last(), Some(&Coord::new(3., 0.)));
        assert!(coords.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn curve_polygon_becomes_polygon() {
        let polygon = curve_polygon().linearize(&StrokeOptions::default());
        assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
        assert_eq!(polygon.num_members(), 2);
        assert!(polygon.members().iter().all(|r| r.is_closed()));
        assert!(!polygon.has_curve_geometry(false));
    }

    #[test]
    fn linear_geometry_is_unchanged() {
        let polygon = square_with_hole();
        assert_eq!(polygon.linearize(&StrokeOptions::default()), polygon);
        assert_eq!(polygon.curve_geometry(), polygon);
    }

    #[test]
    fn curve_round_trip() {
        let options = StrokeOptions {
            max_angle_step_degrees: 4.,
            add_intermediate_point: IntermediatePoint::Stealth,
        };
        let curve = circular_arc().linearize(&options).curve_geometry();
        assert_eq!(curve.geometry_type(), GeometryType::CircularString);
        let coords = &curve.as_curve().unwrap().coords;
        assert_abs_diff_eq!(coords[1].x, 1., epsilon = 1e-6);
        assert_abs_diff_eq!(coords[1].y, 1., epsilon = 1e-6);

        let polygon = curve_polygon().linearize(&options).curve_geometry();
        assert_eq!(polygon.geometry_type(), GeometryType::CurvePolygon);
        assert_eq!(polygon.members()[1].geometry_type(), GeometryType::LineString);
        assert_eq!(polygon.dimension(), Dimension::XY);
    }
}
