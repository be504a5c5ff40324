use std::sync::Arc;

use crate::algorithm::curve::{self, CurveGeometry, Linearize};
use crate::algorithm::force;
use crate::algorithm::organize;
use crate::algorithm::setops::SetOperations;
use crate::algorithm::transform::{self, CoordinateTransform};
use crate::error::Result;
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, SimpleCurve, SpatialRef};
use crate::io;
use crate::options::{FactoryOptions, OrganizeMethod, StrokeOptions, TransformOptions};

/// Geometry construction and conversion with a fixed set of [`FactoryOptions`].
///
/// ```
/// use geofactory::options::FactoryOptions;
/// use geofactory::GeometryFactory;
///
/// let factory = GeometryFactory::new(FactoryOptions {
///     stroke_curves: true,
///     ..Default::default()
/// });
/// let (geom, _) = factory.parse_wkt("CIRCULARSTRING (0 0,1 1,2 0)", None).unwrap();
/// assert_eq!(geom.geometry_type().name(), "LINESTRING");
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeometryFactory {
    options: FactoryOptions,
}

impl GeometryFactory {
    pub fn new(options: FactoryOptions) -> Self {
        Self { options }
    }

    /// A factory configured from the `GEOFACTORY_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(FactoryOptions::from_env())
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    fn stroke_options(&self) -> StrokeOptions {
        self.options.stroke_options()
    }

    fn finish(&self, geom: Geometry) -> Geometry {
        if self.options.stroke_curves && geom.has_curve_geometry(false) {
            geom.linearize(&self.stroke_options())
        } else {
            geom
        }
    }

    /// See [`io::wkt::parse_wkt`]. Returns the geometry and the unconsumed text.
    pub fn parse_wkt<'a>(
        &self,
        text: &'a str,
        crs: Option<Arc<SpatialRef>>,
    ) -> Result<(Geometry, &'a str)> {
        let (geom, rest) = io::wkt::parse_wkt(text, crs)?;
        Ok((self.finish(geom), rest))
    }

    /// See [`io::wkb::parse_wkb`]. Returns the geometry and the number of bytes consumed.
    pub fn parse_wkb(&self, buf: &[u8], crs: Option<Arc<SpatialRef>>) -> Result<(Geometry, usize)> {
        let (geom, consumed) = io::wkb::parse_wkb(buf, crs)?;
        Ok((self.finish(geom), consumed))
    }

    /// See [`io::fgf::parse_fgf`].
    pub fn parse_fgf(
        &self,
        buf: &[u8],
        crs: Option<Arc<SpatialRef>>,
    ) -> Result<(Option<Geometry>, usize)> {
        let (geom, consumed) = io::fgf::parse_fgf(buf, crs)?;
        Ok((geom.map(|g| self.finish(g)), consumed))
    }

    /// See [`io::geojson::parse_geojson`].
    pub fn parse_geojson(
        &self,
        text: &str,
        crs: Option<Arc<SpatialRef>>,
    ) -> Result<Option<Geometry>> {
        Ok(io::geojson::parse_geojson(text, crs)?.map(|g| self.finish(g)))
    }

    /// Assemble rings into polygons. `GEOFACTORY_ORGANIZE_POLYGONS`, when set, replaces
    /// `method`.
    pub fn organize_polygons(
        &self,
        polygons: Vec<Geometry>,
        method: OrganizeMethod,
        set_operations: Option<&dyn SetOperations>,
    ) -> (Geometry, bool) {
        let method = self.options.organize_method.unwrap_or(method);
        organize::organize_polygons(polygons, method, set_operations)
    }

    /// See [`force::force_to`].
    pub fn force_to(
        &self,
        geom: Geometry,
        target: GeometryType,
        dim: Option<Dimension>,
    ) -> Geometry {
        force::force_to(geom, target, dim, &self.stroke_options())
    }

    pub fn force_to_polygon(&self, geom: Geometry) -> Geometry {
        force::force_to_polygon(geom, &self.stroke_options())
    }

    pub fn force_to_multi_polygon(&self, geom: Geometry) -> Geometry {
        force::force_to_multi_polygon(geom, &self.stroke_options())
    }

    pub fn force_to_multi_line_string(&self, geom: Geometry) -> Geometry {
        force::force_to_multi_line_string(geom, &self.stroke_options())
    }

    pub fn force_to_multi_point(&self, geom: Geometry) -> Geometry {
        force::force_to_multi_point(geom)
    }

    /// Stroke the arc through `p0`, `p1` and `p2` with the configured step and intermediate
    /// point mode.
    pub fn curve_to_line_string(
        &self,
        p0: &Coord,
        p1: &Coord,
        p2: &Coord,
        dim: Dimension,
    ) -> SimpleCurve {
        curve::curve_to_line_string(p0, p1, p2, dim, &self.stroke_options())
    }

    /// See [`curve::curve_from_line_string`].
    pub fn curve_from_line_string(&self, line: &SimpleCurve, is_linear_ring: bool) -> Geometry {
        curve::curve_from_line_string(line, is_linear_ring)
    }

    /// Linearize every arc of `geom` with the configured step.
    pub fn linear_geometry(&self, geom: &Geometry) -> Geometry {
        geom.linearize(&self.stroke_options())
    }

    pub fn curve_geometry(&self, geom: &Geometry) -> Geometry {
        geom.curve_geometry()
    }

    /// Stroke an ellipse arc. `use_max_gap` applies the configured `arc_max_gap`.
    #[allow(clippy::too_many_arguments)]
    pub fn approximate_arc_angles(
        &self,
        center: &Coord,
        primary_radius: f64,
        secondary_radius: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        max_angle_step_degrees: f64,
        use_max_gap: bool,
    ) -> Geometry {
        let max_gap = if use_max_gap {
            self.options.arc_max_gap
        } else {
            0.
        };
        curve::approximate_arc_angles(
            center,
            primary_radius,
            secondary_radius,
            rotation,
            start_angle,
            end_angle,
            max_angle_step_degrees,
            max_gap,
        )
    }

    /// See [`transform::transform_with_options`].
    pub fn transform_with_options(
        &self,
        geom: &Geometry,
        ct: Option<&dyn CoordinateTransform>,
        options: &TransformOptions,
        set_operations: &dyn SetOperations,
    ) -> Result<Geometry> {
        transform::transform_with_options(geom, ct, options, set_operations)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithm::setops::HeuristicSetOperations;
    use crate::options::IntermediatePoint;
    use crate::test::polygon::{ring, square};

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn curves_are_kept_by_default() {
        let factory = GeometryFactory::default();
        let (geom, rest) = factory
            .parse_wkt("CIRCULARSTRING (0 0,1 1,2 0)", None)
            .unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::CircularString);
        assert_eq!(rest, "");
    }

    #[test]
    fn stroke_on_read() {
        let factory = GeometryFactory::new(FactoryOptions::from_lookup(lookup(&[
            ("GEOFACTORY_STROKE_CURVE", "YES"),
            ("GEOFACTORY_ADD_INTERMEDIATE_POINT", "NO"),
        ])));
        let arc = Geometry::circular_string(
            vec![Coord::new(0., 0.), Coord::new(1., 1.), Coord::new(2., 0.)],
            Dimension::XY,
        );
        let wkb = io::wkb::to_wkb(&arc).unwrap();
        let (geom, consumed) = factory.parse_wkb(&wkb, None).unwrap();
        assert_eq!(consumed, wkb.len());
        assert_eq!(geom.geometry_type(), GeometryType::LineString);
        assert!(geom.num_points() > 3);
        assert_eq!(geom.start_point(), Some(Coord::new(0., 0.)));
        assert_eq!(geom.end_point(), Some(Coord::new(2., 0.)));
    }

    #[test]
    fn organize_method_override() {
        let factory = GeometryFactory::new(FactoryOptions {
            organize_method: Some(OrganizeMethod::Skip),
            ..Default::default()
        });
        let rings = vec![square(0., 0., 10.), square(2., 2., 2.)];
        let (out, valid) = factory.organize_polygons(rings, OrganizeMethod::Default, None);
        assert!(!valid);
        assert_eq!(out.geometry_type(), GeometryType::MultiPolygon);
        assert_eq!(out.num_members(), 2);
    }

    #[test]
    fn forced_polygon() {
        let factory = GeometryFactory::default();
        let multi = Geometry::new_collection(
            GeometryType::MultiPolygon,
            vec![square(0., 0., 1.)],
            Dimension::XY,
        );
        let polygon = factory.force_to(multi, GeometryType::Polygon, None);
        assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
    }

    #[test]
    fn arc_round_trip() {
        let factory = GeometryFactory::new(FactoryOptions {
            add_intermediate_point: IntermediatePoint::Stealth,
            ..Default::default()
        });
        let (p0, p1, p2) = (Coord::new(0., 0.), Coord::new(1., 1.), Coord::new(2., 0.));
        let line = factory.curve_to_line_string(&p0, &p1, &p2, Dimension::XY);
        let curve = factory.curve_from_line_string(&line, false);
        assert_eq!(curve.geometry_type(), GeometryType::CircularString);
        let coords = &curve.as_curve().unwrap().coords;
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0], p0);
        assert_eq!(coords[2], p2);
    }

    #[test]
    fn max_gap_is_opt_in() {
        let factory = GeometryFactory::new(FactoryOptions {
            arc_max_gap: 0.01,
            ..Default::default()
        });
        let center = Coord::new(0., 0.);
        let coarse = factory.approximate_arc_angles(&center, 1., 1., 0., 0., 90., 45., false);
        let fine = factory.approximate_arc_angles(&center, 1., 1., 0., 0., 90., 45., true);
        assert_eq!(coarse.num_points(), 3);
        assert!(fine.num_points() > coarse.num_points());
    }

    #[test]
    fn wrap_without_transform() {
        let factory = GeometryFactory::default();
        let line = Geometry::line_string(
            vec![Coord::new(170., 0.), Coord::new(190., 10.)],
            Dimension::XY,
        );
        let options = TransformOptions::from_key_values(["WRAPDATELINE=YES"]);
        let out = factory
            .transform_with_options(&line, None, &options, &HeuristicSetOperations)
            .unwrap();
        assert_eq!(out.geometry_type(), GeometryType::MultiLineString);
        assert_eq!(out.num_members(), 2);
    }

    #[test]
    fn geojson_polygon() {
        let factory = GeometryFactory::default();
        let geom = factory
            .parse_geojson(
                r#"{"type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}"#,
                None,
            )
            .unwrap()
            .unwrap();
        assert_eq!(geom.exterior_ring().map(|r| r.num_points()), Some(4));
        let expected = Geometry::polygon(
            vec![ring(&[(0., 0.), (0., 1.), (1., 1.)])],
            Dimension::XY,
        );
        assert_eq!(geom, expected);
    }
}
