//! Reprojection of geometries, with repair of the discontinuities a projection can introduce
//! at the antimeridian and at the poles.
//!
//! The projection math itself is external: anything implementing [`CoordinateTransform`] can
//! drive a [`GeometryTransformer`]. Cutting geometries along the antimeridian needs polygon
//! overlays, which come from a [`SetOperations`] provider.

mod antimeridian;
mod dateline;
mod polar;

use std::cell::OnceCell;
use std::sync::{Arc, Once};

use crate::algorithm::setops::{GeoSetOperations, SetOperations};
use crate::error::{GeoFactoryError, Result};
use crate::geometry::{Coord, Geometry, GeometryType, SpatialRef};
use crate::options::TransformOptions;

use self::polar::Pole;

/// A coordinate operation between two reference systems.
pub trait CoordinateTransform {
    /// Transform `coords` in place. Returns `false` when any coordinate could not be
    /// transformed.
    fn transform(&self, coords: &mut [Coord]) -> bool;

    /// The reverse operation, when it exists.
    fn inverse(&self) -> Option<Box<dyn CoordinateTransform>>;

    fn source_crs(&self) -> Option<Arc<SpatialRef>>;

    fn target_crs(&self) -> Option<Arc<SpatialRef>>;
}

/// Transform a single position, ignoring Z and M.
pub(crate) fn transform_xy(ct: &dyn CoordinateTransform, x: f64, y: f64) -> Option<Coord> {
    let mut coord = [Coord::new(x, y)];
    ct.transform(&mut coord).then_some(coord[0])
}

fn transform_coords(geom: &mut Geometry, ct: &dyn CoordinateTransform) -> bool {
    if let Geometry::Point(point) = geom {
        return match point.coord.as_mut() {
            Some(coord) => ct.transform(std::slice::from_mut(coord)),
            None => true,
        };
    }
    if let Some(curve) = geom.as_curve_mut() {
        return curve.coords.is_empty() || ct.transform(&mut curve.coords);
    }
    geom.as_collection_mut().map_or(true, |collection| {
        collection
            .members
            .iter_mut()
            .all(|member| transform_coords(member, ct))
    })
}

/// Transform every vertex of `geom` and tag it with the target CRS.
///
/// No antimeridian or pole handling happens here; see [`transform_with_options`].
pub fn transform_geometry(geom: &mut Geometry, ct: &dyn CoordinateTransform) -> Result<()> {
    if !transform_coords(geom, ct) {
        return Err(GeoFactoryError::TransformFailed(format!(
            "Failed to transform {} from {} to {}",
            geom.geometry_type(),
            ct.source_crs().map_or("unknown CRS".to_string(), |crs| crs.name().to_string()),
            ct.target_crs().map_or("unknown CRS".to_string(), |crs| crs.name().to_string()),
        )));
    }
    geom.assign_crs(ct.target_crs());
    Ok(())
}

/// Whether a transform from `source` to `target` can run without antimeridian or pole
/// correction.
///
/// Only a projected CRS going to a geographic one can tear geometries apart, and only when
/// the area of use of the projected CRS reaches the poles or the antimeridian.
pub fn is_regular_transform(source: &SpatialRef, target: &SpatialRef) -> bool {
    if source.is_projected() && target.is_geographic() {
        return !source.has_global_area_of_use();
    }
    true
}

/// Log once that a correction step was skipped for lack of a polygon overlay.
pub(crate) fn overlay_unavailable() {
    static WARN: Once = Once::new();
    WARN.call_once(|| {
        log::warn!(
            "The set operation provider cannot compute overlays; geometries crossing the \
             antimeridian or a pole are transformed without correction"
        )
    });
}

/// What a transform does near the antimeridian and the poles, worked out once per
/// transformer.
struct Analysis {
    inverse: Box<dyn CoordinateTransform>,
    pole: Option<Pole>,
}

/// Applies one coordinate transform and one set of [`TransformOptions`] to many geometries.
///
/// Before transforming from a projected CRS to a geographic one, geometries that would cross
/// the antimeridian or contain a pole in the target are cut in source space so that every
/// part maps to a continuous ring or line. Afterwards vertices within 1e-8 of ±180° or ±90°
/// are snapped onto that bound. With `wrap_dateline`, the result is then split wherever it
/// jumps across the antimeridian.
///
/// ```
/// use geofactory::algorithm::transform::GeometryTransformer;
/// use geofactory::geometry::GeometryType;
/// use geofactory::io::wkt::parse_wkt;
/// use geofactory::options::TransformOptions;
///
/// let options = TransformOptions::from_key_values(["WRAPDATELINE=YES"]);
/// let transformer = GeometryTransformer::new(None, options);
/// let (line, _) = parse_wkt("LINESTRING (179 10,-179 10)", None).unwrap();
/// let wrapped = transformer.transform(&line).unwrap();
/// assert_eq!(wrapped.geometry_type(), GeometryType::MultiLineString);
/// ```
pub struct GeometryTransformer<'a> {
    transform: Option<&'a dyn CoordinateTransform>,
    options: TransformOptions,
    set_operations: &'a dyn SetOperations,
    analysis: OnceCell<Option<Analysis>>,
}

impl<'a> GeometryTransformer<'a> {
    /// A transformer that takes its overlays from [`GeoSetOperations`].
    pub fn new(transform: Option<&'a dyn CoordinateTransform>, options: TransformOptions) -> Self {
        Self::with_set_operations(transform, options, &GeoSetOperations)
    }

    pub fn with_set_operations(
        transform: Option<&'a dyn CoordinateTransform>,
        options: TransformOptions,
        set_operations: &'a dyn SetOperations,
    ) -> Self {
        Self {
            transform,
            options,
            set_operations,
            analysis: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn analysis(&self, ct: &dyn CoordinateTransform) -> Option<&Analysis> {
        self.analysis
            .get_or_init(|| {
                let (source, target) = (ct.source_crs()?, ct.target_crs()?);
                if is_regular_transform(&source, &target) {
                    return None;
                }
                let Some(inverse) = ct.inverse() else {
                    log::debug!(
                        "No inverse transform from {} to {}; skipping antimeridian checks",
                        target.name(),
                        source.name()
                    );
                    return None;
                };
                let pole = polar::polar_to_geographic(ct, inverse.as_ref());
                Some(Analysis { inverse, pole })
            })
            .as_ref()
    }

    /// Transform a copy of `geom`.
    pub fn transform(&self, geom: &Geometry) -> Result<Geometry> {
        let mut out = geom.clone();
        if let Some(ct) = self.transform {
            let mut needs_snapping = false;
            let analysis = match geom.geometry_type() {
                GeometryType::Point | GeometryType::MultiPoint => None,
                _ => self.analysis(ct),
            };
            if let Some(analysis) = analysis {
                let inverse = analysis.inverse.as_ref();
                (out, needs_snapping) = match analysis.pole {
                    Some(pole) => {
                        polar::cut_before_polar(out, inverse, pole, self.set_operations)
                    }
                    None if antimeridian::crosses_antimeridian(ct, inverse, &out) => {
                        antimeridian::cut_before_antimeridian(
                            out,
                            ct,
                            inverse,
                            self.set_operations,
                        )
                    }
                    None => (out, false),
                };
            }
            transform_geometry(&mut out, ct)?;
            if needs_snapping {
                antimeridian::snap_coords_close_to_lat_long_bounds(&mut out);
            }
        }

        if self.options.wrap_dateline {
            out = dateline::wrap_dateline(
                out,
                self.options.effective_dateline_offset(),
                self.set_operations,
            );
        }
        Ok(out)
    }
}

/// Transform `geom` with `transform` (if any) and apply `options`.
///
/// This is [`GeometryTransformer::transform`] without reuse of the per-transform analysis.
pub fn transform_with_options(
    geom: &Geometry,
    transform: Option<&dyn CoordinateTransform>,
    options: &TransformOptions,
    set_operations: &dyn SetOperations,
) -> Result<Geometry> {
    GeometryTransformer::with_set_operations(transform, options.clone(), set_operations)
        .transform(geom)
}

#[cfg(test)]
pub(crate) mod test_transforms {
    //! Simple analytic projections standing in for a real CRS catalog.

    use super::*;
    use crate::geometry::CrsKind;

    const RADIUS: f64 = 6_371_000.;

    fn wgs84() -> Arc<SpatialRef> {
        Arc::new(SpatialRef::geographic("WGS 84"))
    }

    /// A north polar azimuthal equidistant projection, in metres.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct NorthPolar {
        pub inverse: bool,
    }

    impl NorthPolar {
        fn crs() -> Arc<SpatialRef> {
            Arc::new(SpatialRef::projected("North polar equidistant"))
        }

        fn forward(c: &mut Coord) -> bool {
            if !(-90. ..=90.).contains(&c.y) {
                return false;
            }
            let rho = (90. - c.y).to_radians() * RADIUS;
            let lon = c.x.to_radians();
            c.x = rho * lon.sin();
            c.y = -rho * lon.cos();
            true
        }

        fn backward(c: &mut Coord) -> bool {
            let rho = c.x.hypot(c.y);
            let lat = 90. - (rho / RADIUS).to_degrees();
            if lat < -90. {
                return false;
            }
            c.x = if rho == 0. { 0. } else { c.x.atan2(-c.y).to_degrees() };
            c.y = lat;
            true
        }
    }

    impl CoordinateTransform for NorthPolar {
        fn transform(&self, coords: &mut [Coord]) -> bool {
            let mut ok = true;
            for c in coords {
                ok &= if self.inverse {
                    Self::forward(c)
                } else {
                    Self::backward(c)
                };
            }
            ok
        }

        fn inverse(&self) -> Option<Box<dyn CoordinateTransform>> {
            Some(Box::new(NorthPolar {
                inverse: !self.inverse,
            }))
        }

        fn source_crs(&self) -> Option<Arc<SpatialRef>> {
            Some(if self.inverse { wgs84() } else { Self::crs() })
        }

        fn target_crs(&self) -> Option<Arc<SpatialRef>> {
            Some(if self.inverse { Self::crs() } else { wgs84() })
        }
    }

    /// An equirectangular projection centred on the antimeridian, in degrees.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct PacificPlateCarree {
        pub inverse: bool,
    }

    impl PacificPlateCarree {
        fn crs() -> Arc<SpatialRef> {
            Arc::new(SpatialRef::new("Pacific plate carree", CrsKind::Projected))
        }
    }

    impl CoordinateTransform for PacificPlateCarree {
        fn transform(&self, coords: &mut [Coord]) -> bool {
            // Half a turn either way, so both directions are the same map.
            for c in coords {
                c.x = if c.x < 0. { c.x + 180. } else { c.x - 180. };
            }
            true
        }

        fn inverse(&self) -> Option<Box<dyn CoordinateTransform>> {
            Some(Box::new(PacificPlateCarree {
                inverse: !self.inverse,
            }))
        }

        fn source_crs(&self) -> Option<Arc<SpatialRef>> {
            Some(if self.inverse { wgs84() } else { Self::crs() })
        }

        fn target_crs(&self) -> Option<Arc<SpatialRef>> {
            Some(if self.inverse { Self::crs() } else { wgs84() })
        }
    }

    /// Adds a fixed offset, between two geographic CRSs.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct Shift(pub f64);

    impl CoordinateTransform for Shift {
        fn transform(&self, coords: &mut [Coord]) -> bool {
            for c in coords {
                c.x += self.0;
            }
            true
        }

        fn inverse(&self) -> Option<Box<dyn CoordinateTransform>> {
            Some(Box::new(Shift(-self.0)))
        }

        fn source_crs(&self) -> Option<Arc<SpatialRef>> {
            Some(wgs84())
        }

        fn target_crs(&self) -> Option<Arc<SpatialRef>> {
            Some(wgs84())
        }
    }
}

#[cfg(test)]
mod test {
    use super::test_transforms::*;
    use super::*;
    use crate::algorithm::setops::HeuristicSetOperations;
    use crate::geometry::{Dimension, SimpleCurve};
    use crate::test::polygon::ring;
    use approx::assert_relative_eq;

    fn wrap_options() -> TransformOptions {
        TransformOptions::from_key_values(["WRAPDATELINE=YES"])
    }

    #[test]
    fn regular_transforms() {
        let projected = SpatialRef::projected("UTM 31N").with_area_of_use(0., 0., 6., 84.);
        let world = SpatialRef::projected("World Mercator").with_area_of_use(-180., -80., 180., 84.);
        let geographic = SpatialRef::geographic("WGS 84");
        assert!(is_regular_transform(&projected, &geographic));
        assert!(!is_regular_transform(&world, &geographic));
        assert!(!is_regular_transform(&SpatialRef::projected("unknown"), &geographic));
        assert!(is_regular_transform(&geographic, &SpatialRef::projected("unknown")));
    }

    #[test]
    fn plain_transform() {
        let line = Geometry::line_string(
            vec![Coord::new(0., 0.), Coord::new(1., 1.)],
            Dimension::XY,
        );
        let out = transform_with_options(
            &line,
            Some(&Shift(10.)),
            &TransformOptions::default(),
            &HeuristicSetOperations,
        )
        .unwrap();
        assert_eq!(out.start_point(), Some(Coord::new(10., 0.)));
        assert_eq!(out.crs().map(|crs| crs.name()), Some("WGS 84"));
    }

    #[test]
    fn failed_transform_is_an_error() {
        let polar = NorthPolar { inverse: true };
        let point = Geometry::point(Coord::new(0., 95.), Dimension::XY);
        let err = transform_with_options(
            &point,
            Some(&polar),
            &TransformOptions::default(),
            &HeuristicSetOperations,
        );
        assert!(matches!(err, Err(GeoFactoryError::TransformFailed(_))));
    }

    #[test]
    fn dateline_wrap_without_transform() {
        let line = Geometry::line_string(
            vec![Coord::new(179., 10.), Coord::new(-179., 10.)],
            Dimension::XY,
        );
        let out = GeometryTransformer::new(None, wrap_options())
            .transform(&line)
            .unwrap();
        assert_eq!(out.geometry_type(), GeometryType::MultiLineString);
        assert_eq!(
            out.members(),
            &[
                Geometry::line_string(
                    vec![Coord::new(179., 10.), Coord::new(180., 10.)],
                    Dimension::XY
                ),
                Geometry::line_string(
                    vec![Coord::new(-180., 10.), Coord::new(-179., 10.)],
                    Dimension::XY
                ),
            ]
        );
    }

    #[test]
    fn wrap_after_shift() {
        // Shifted entirely past the antimeridian, the line is moved back by a full turn.
        let line = Geometry::line_string(
            vec![Coord::new(175., 0.), Coord::new(178., 1.)],
            Dimension::XY,
        );
        let out = GeometryTransformer::new(Some(&Shift(10.)), wrap_options())
            .transform(&line)
            .unwrap();
        assert_eq!(out.geometry_type(), GeometryType::LineString);
        assert_eq!(out.start_point(), Some(Coord::new(-175., 0.)));
        assert_eq!(out.end_point(), Some(Coord::new(-172., 1.)));
    }

    #[test]
    fn north_polar_is_detected() {
        let ct = NorthPolar { inverse: false };
        let inverse = ct.inverse().unwrap();
        assert_eq!(
            polar::polar_to_geographic(&ct, inverse.as_ref()),
            Some(Pole::North)
        );
        let pacific = PacificPlateCarree { inverse: false };
        let inverse = pacific.inverse().unwrap();
        assert_eq!(polar::polar_to_geographic(&pacific, inverse.as_ref()), None);
    }

    #[test]
    fn polygon_around_the_pole() {
        // A square centred on the north pole, 1000 km wide.
        let ct = NorthPolar { inverse: false };
        let square = Geometry::polygon(
            vec![ring(&[
                (-5e5, -5e5),
                (-5e5, 5e5),
                (5e5, 5e5),
                (5e5, -5e5),
            ])],
            Dimension::XY,
        )
        .with_crs(ct.source_crs());
        let out = GeometryTransformer::new(Some(&ct), TransformOptions::default())
            .transform(&square)
            .unwrap();

        assert_eq!(out.geometry_type(), GeometryType::MultiPolygon);
        let envelope = out.envelope();
        assert_relative_eq!(envelope.minx, -180.);
        assert_relative_eq!(envelope.maxx, 180.);
        assert_relative_eq!(envelope.maxy, 90.);
        // The corners of the square sit about 6.4 degrees from the pole.
        assert!(envelope.miny > 83. && envelope.miny < 84.);
        assert!(out.crs().unwrap().is_geographic());
    }

    #[test]
    fn line_across_the_antimeridian() {
        let ct = PacificPlateCarree { inverse: false };
        // Easting 0 is longitude 180.
        let line = Geometry::line_string(
            vec![Coord::new(-5., 10.), Coord::new(5., 10.)],
            Dimension::XY,
        )
        .with_crs(ct.source_crs());
        let out = GeometryTransformer::new(Some(&ct), TransformOptions::default())
            .transform(&line)
            .unwrap();

        assert_eq!(out.geometry_type(), GeometryType::MultiLineString);
        assert_eq!(out.num_members(), 2);
        let xs = out
            .members()
            .iter()
            .map(|m| {
                let curve: &SimpleCurve = m.as_curve().unwrap();
                (curve.coords[0].x, curve.coords[curve.coords.len() - 1].x)
            })
            .collect::<Vec<_>>();
        // Both pieces end on the antimeridian after snapping.
        assert!(xs.contains(&(175., 180.)) || xs.contains(&(180., 175.)));
        assert!(xs.contains(&(-180., -175.)) || xs.contains(&(-175., -180.)));
    }

    #[test]
    fn points_skip_the_analysis() {
        let ct = PacificPlateCarree { inverse: false };
        let point = Geometry::point(Coord::new(-5., 10.), Dimension::XY);
        let out = GeometryTransformer::new(Some(&ct), TransformOptions::default())
            .transform(&point)
            .unwrap();
        assert_eq!(out, Geometry::point(Coord::new(175., 10.), Dimension::XY).with_crs(ct.target_crs()));
    }
}
