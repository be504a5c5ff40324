//! Splitting geographic geometries that jump across the antimeridian (`WRAPDATELINE`).

use std::sync::Once;

use crate::algorithm::setops::SetOperations;
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, SimpleCurve};

/// Longitude bands used to tell a jump across the antimeridian from an ordinary long segment.
#[derive(Debug, Clone, Copy)]
struct Bands {
    offset: f64,
    /// Longitudes above this are close to +180.
    left: f64,
    /// Longitudes below this are close to -180.
    right: f64,
    /// Segments longer than this in longitude are jumps.
    jump: f64,
}

impl Bands {
    fn new(offset: f64) -> Self {
        Self {
            offset,
            left: 180. - offset,
            right: -180. + offset,
            jump: 360. - offset,
        }
    }
}

/// Bring a longitude beyond ±180 back into range.
fn wrap_longitude(x: f64) -> f64 {
    if x > 180. {
        (x + 180.) % 360. - 180.
    } else if x < -180. {
        -((-x + 180.) % 360. - 180.)
    } else {
        x
    }
}

fn wrap_point(geom: &mut Geometry) {
    if let Geometry::Point(point) = geom {
        if let Some(coord) = point.coord.as_mut() {
            coord.x = wrap_longitude(coord.x);
        }
    }
}

/// Add `offset` to the longitude of every vertex of the lines and rings of `geom`.
fn add_offset_to_lon(geom: &mut Geometry, offset: f64) {
    if let Some(curve) = geom.as_curve_mut() {
        curve.coords.iter_mut().for_each(|c| c.x += offset);
    } else if let Some(collection) = geom.as_collection_mut() {
        for member in collection.members.iter_mut() {
            add_offset_to_lon(member, offset);
        }
    }
}

fn interpolate(ratio: f64, a: f64, b: f64) -> f64 {
    ratio * b + (1. - ratio) * a
}

/// Split `line` wherever it jumps across the antimeridian, adding an end point on ±180 to
/// each side of the jump. `x_offset` is added to every longitude first.
fn split_line_string_at_dateline(
    parts: &mut Vec<Geometry>,
    line: &SimpleCurve,
    bands: Bands,
    x_offset: f64,
) {
    let dim = line.dimension();
    let coords = &line.coords;
    let shifted = |i: usize| Coord {
        x: coords[i].x + x_offset,
        ..coords[i]
    };
    let mut current: Vec<Coord> = vec![];
    let mut i = 0;
    while i < coords.len() {
        let here = shifted(i);
        if i > 0 && (here.x - shifted(i - 1).x).abs() > bands.jump {
            let prev = shifted(i - 1);
            let next_x = (i + 1 < coords.len()).then(|| shifted(i + 1).x);

            // A lone vertex on the antimeridian between two vertices on the other side of it
            // is moved to that side instead of splitting the line twice.
            let far_west = |x: f64| x > -180. && x < bands.right;
            let far_east = |x: f64| x > bands.left && x < 180.;
            if far_west(prev.x) && here.x == 180. && next_x.is_some_and(far_west) {
                current.push(Coord { x: -180., ..here });
                current.push(shifted(i + 1));
                i += 2;
                continue;
            }
            if far_east(prev.x) && here.x == -180. && next_x.is_some_and(far_east) {
                current.push(Coord { x: 180., ..here });
                current.push(shifted(i + 1));
                i += 2;
                continue;
            }

            let (mut p1, mut p2) = (prev, here);
            if p1.x < bands.right && p2.x > bands.left {
                std::mem::swap(&mut p1, &mut p2);
            }
            if p1.x > bands.left && p2.x < bands.right {
                p2.x += 360.;
            }
            let finished = std::mem::take(&mut current);
            parts.push(Geometry::line_string(finished, dim));
            let last = parts.last_mut().and_then(|g| g.as_curve_mut());

            if p1.x <= 180. && p2.x >= 180. && p1.x < p2.x {
                let ratio = (180. - p1.x) / (p2.x - p1.x);
                let side = if prev.x > bands.left { 180. } else { -180. };
                let crossing = Coord {
                    x: side,
                    y: interpolate(ratio, p1.y, p2.y),
                    z: interpolate(ratio, p1.z, p2.z),
                    m: interpolate(ratio, p1.m, p2.m),
                };
                if let Some(last) = last {
                    if last
                        .end()
                        .map_or(true, |end| end.x != crossing.x || end.y != crossing.y)
                    {
                        last.push(crossing);
                    }
                }
                current.push(Coord {
                    x: -side,
                    ..crossing
                });
            }
        }
        current.push(here);
        i += 1;
    }
    parts.push(Geometry::line_string(current, dim));
}

/// Make the rings of `polygon` continuous by moving the vertices past a jump across the
/// antimeridian a full turn east.
fn fix_polygon_coordinates_at_dateline(polygon: &mut Geometry, bands: Bands) {
    let Some(collection) = polygon.as_collection_mut() else {
        return;
    };
    for ring in collection.members.iter_mut() {
        let Some(ring) = ring.as_curve_mut() else {
            continue;
        };
        let mut go_east = false;
        for i in 1..ring.coords.len() {
            let x = ring.coords[i].x;
            let prev_x = ring.coords[i - 1].x;
            if (x - prev_x).abs() <= bands.jump {
                continue;
            }
            if (prev_x > bands.left && x < bands.right) || (x < 0. && go_east) {
                ring.coords[i].x += 360.;
                go_east = true;
            } else if prev_x < bands.right && x > bands.left {
                for c in ring.coords[..i].iter_mut().filter(|c| c.x < 0.) {
                    c.x += 360.;
                }
                go_east = false;
            } else {
                go_east = false;
            }
        }
    }
}

/// Add the polygons and line strings found in `geom` to `parts`.
fn add_simple_geom_to_multi(parts: &mut Vec<Geometry>, geom: Geometry) {
    match geom.geometry_type() {
        GeometryType::Polygon | GeometryType::LineString => parts.push(geom),
        GeometryType::MultiLineString
        | GeometryType::MultiPolygon
        | GeometryType::GeometryCollection => {
            for member in geom.into_members() {
                add_simple_geom_to_multi(parts, member);
            }
        }
        _ => {}
    }
}

/// The world rectangle, and its copy a full turn east (or west when `around_minus_180`).
fn world_rectangles(around_minus_180: bool) -> (Geometry, Geometry) {
    let rectangle = |x0: f64, x1: f64| {
        let mut ring = SimpleCurve::new(
            vec![
                Coord::new(x0, 90.),
                Coord::new(x1, 90.),
                Coord::new(x1, -90.),
                Coord::new(x0, -90.),
            ],
            Dimension::XY,
        );
        ring.close();
        Geometry::polygon(vec![ring], Dimension::XY)
    };
    if around_minus_180 {
        (rectangle(180., -180.), rectangle(-180., -360.))
    } else {
        (rectangle(-180., 180.), rectangle(180., 360.))
    }
}

/// Whether a line or polygon exterior jumps across the antimeridian while every other
/// segment stays shorter than the band width.
fn has_only_dateline_jumps(line: &SimpleCurve, bands: Bands, x_offset: f64) -> bool {
    let mut max_small_step = 0f64;
    let mut has_jump = false;
    for segment in line.coords.windows(2) {
        let prev_x = segment[0].x + x_offset;
        let x = segment[1].x + x_offset;
        let step = (x - prev_x).abs();
        let crosses = (x > bands.left && prev_x < bands.right)
            || (prev_x > bands.left && x < bands.right);
        if step > bands.jump && crosses {
            has_jump = true;
        } else {
            max_small_step = max_small_step.max(step);
        }
    }
    has_jump && max_small_step < bands.offset
}

/// Cut `geom` along the antimeridian and add the pieces to `parts`.
fn cut_geometry_on_dateline(
    parts: &mut Vec<Geometry>,
    geom: &Geometry,
    offset: f64,
    set_operations: &dyn SetOperations,
) {
    let bands = Bands::new(offset);
    match geom.geometry_type() {
        GeometryType::Point => {
            let mut point = geom.clone();
            wrap_point(&mut point);
            parts.push(point);
        }
        kind @ (GeometryType::Polygon | GeometryType::LineString) => {
            let envelope = geom.envelope();
            let around_minus_180 = envelope.minx < -180.;
            let x_offset = if around_minus_180 { 360. } else { 0. };

            let outline = match kind {
                GeometryType::Polygon => geom.exterior_ring().and_then(|r| r.as_curve()),
                _ => geom.as_curve(),
            };

            let mut fixed = None;
            let mut wrap = false;
            let mut split = false;
            if envelope.minx < -180.
                || envelope.maxx > 180.
                || (envelope.minx + x_offset > bands.left && envelope.maxx + x_offset > 180.)
            {
                wrap = true;
            } else if outline.is_some_and(|line| has_only_dateline_jumps(line, bands, x_offset)) {
                if kind == GeometryType::LineString {
                    split = true;
                } else {
                    let mut polygon = geom.clone();
                    fix_polygon_coordinates_at_dateline(&mut polygon, bands);
                    let envelope = polygon.envelope();
                    wrap = envelope.minx != envelope.maxx;
                    fixed = Some(polygon);
                }
            }

            if split {
                if let Some(line) = geom.as_curve() {
                    split_line_string_at_dateline(parts, line, bands, x_offset);
                }
            } else if wrap {
                let work = fixed.as_ref().unwrap_or(geom);
                let (world, beyond) = world_rectangles(around_minus_180);
                match (
                    set_operations.intersection(work, &world),
                    set_operations.intersection(work, &beyond),
                ) {
                    (Some(inside), Some(mut outside)) => {
                        let turn = if around_minus_180 { 360. } else { -360. };
                        add_offset_to_lon(&mut outside, turn);
                        add_simple_geom_to_multi(parts, inside);
                        add_simple_geom_to_multi(parts, outside);
                    }
                    _ => add_simple_geom_to_multi(parts, geom.clone()),
                }
            } else {
                parts.push(geom.clone());
            }
        }
        GeometryType::MultiLineString
        | GeometryType::MultiPolygon
        | GeometryType::GeometryCollection => {
            for member in geom.members() {
                cut_geometry_on_dateline(parts, member, offset, set_operations);
            }
        }
        _ => parts.push(geom.clone()),
    }
}

/// Move or split a geographic geometry so that it stays within [-180, 180] in longitude.
///
/// Points are wrapped. A geometry lying entirely a full turn east or west is shifted back.
/// Anything else is cut along the antimeridian into a MultiPolygon, MultiLineString or
/// GeometryCollection; a LineString or Polygon that needed no cut is returned as such.
pub(super) fn wrap_dateline(
    mut geom: Geometry,
    offset: f64,
    set_operations: &dyn SetOperations,
) -> Geometry {
    if geom.crs().is_some_and(|crs| !crs.is_geographic()) {
        static WARN: Once = Once::new();
        WARN.call_once(|| {
            log::warn!("WRAPDATELINE is without effect when reprojecting to a non-geographic CRS")
        });
        return geom;
    }

    let kind = geom.geometry_type();
    match kind {
        GeometryType::Point => wrap_point(&mut geom),
        GeometryType::MultiPoint => {
            if let Some(collection) = geom.as_collection_mut() {
                collection.members.iter_mut().for_each(wrap_point);
            }
        }
        _ => {
            let envelope = geom.envelope();
            if envelope.minx >= -360. && envelope.maxx <= -180. {
                add_offset_to_lon(&mut geom, 360.);
            } else if envelope.minx >= 180. && envelope.maxx <= 360. {
                add_offset_to_lon(&mut geom, -360.);
            } else {
                let multi_kind = match kind {
                    GeometryType::Polygon | GeometryType::MultiPolygon => {
                        GeometryType::MultiPolygon
                    }
                    GeometryType::LineString | GeometryType::MultiLineString => {
                        GeometryType::MultiLineString
                    }
                    _ => GeometryType::GeometryCollection,
                };
                let mut parts = vec![];
                cut_geometry_on_dateline(&mut parts, &geom, offset, set_operations);
                let single = matches!(kind, GeometryType::Polygon | GeometryType::LineString);
                geom = match parts.len() {
                    0 => geom,
                    1 if single => parts.pop().unwrap_or(geom),
                    _ => {
                        let crs = geom.crs().cloned();
                        Geometry::new_collection(multi_kind, parts, geom.dimension()).with_crs(crs)
                    }
                };
            }
        }
    }
    geom
}
