//! Assemble loose rings into polygons with holes.

use std::cmp::Ordering;
use std::sync::Once;

use crate::algorithm::curve::linearize_curve;
use crate::algorithm::setops::{HeuristicSetOperations, SetOperations};
use crate::geometry::{
    Collection, Coord, Dimension, Envelope, Geometry, GeometryParts, GeometryType, SimpleCurve,
};
use crate::options::{OrganizeMethod, StrokeOptions};

/// Above this many rings the nesting analysis gets slow enough to be worth a warning.
const CRITICAL_PART_NUMBER: usize = 100;

/// One input polygon, with what the nesting analysis needs to know about it.
struct Part {
    index: usize,
    polygon: Geometry,
    envelope: Envelope,
    area: f64,
    /// Linear exterior ring, present when the part is a usable single-ring polygon.
    ring: Option<SimpleCurve>,
    is_clockwise: bool,
    is_top_level: bool,
    /// Position of the enclosing part, in input order.
    enclosing: Option<usize>,
}

impl Part {
    fn new(index: usize, polygon: Geometry) -> (Self, bool) {
        let envelope = polygon.envelope();
        let usable = !polygon.is_empty()
            && polygon.num_members() == 1
            && polygon.exterior_ring().map_or(0, |r| r.num_points()) >= 4;
        let ring = if usable {
            polygon
                .exterior_ring()
                .map(|r| linearize_curve(r, &StrokeOptions::default()))
        } else {
            None
        };
        let (area, is_clockwise) = ring
            .as_ref()
            .map_or((0., false), |r| (r.signed_area().abs(), r.is_clockwise()));
        let part = Self {
            index,
            polygon,
            envelope,
            area,
            ring,
            is_clockwise,
            is_top_level: true,
            enclosing: None,
        };
        (part, usable)
    }

    fn start_point(&self) -> Option<Coord> {
        self.ring.as_ref().and_then(|r| r.start())
    }

    /// The part as a linear polygon, for the set operation provider.
    fn linear_polygon(&self) -> Geometry {
        match &self.ring {
            Some(ring) => Geometry::polygon(vec![ring.clone()], ring.dimension()),
            None => self.polygon.clone(),
        }
    }

    fn take_exterior_ring(self) -> Option<Geometry> {
        self.polygon.into_members().into_iter().next()
    }
}

/// Relabel a Polygon as a CurvePolygon, its rings becoming LineStrings.
fn into_curve_polygon(polygon: Geometry) -> Geometry {
    let crs = polygon.crs().cloned();
    let (_, parts) = polygon.into_parts();
    let out = match parts {
        GeometryParts::Collection(c) => {
            let dim = c.dimension();
            let members = c
                .members
                .into_iter()
                .map(|r| r.cast(GeometryType::LineString))
                .collect();
            GeometryParts::Collection(Collection::new(members, dim))
        }
        other => other,
    };
    Geometry::from_parts(GeometryType::CurvePolygon, out).with_crs(crs)
}

/// Append `ring` as a hole of `polygon`, widening a Polygon to a CurvePolygon for a curved
/// ring.
fn add_ring(polygon: Geometry, ring: Geometry) -> Geometry {
    let (mut polygon, ring) = match (polygon.geometry_type(), ring.geometry_type()) {
        (GeometryType::Polygon, GeometryType::LinearRing) => (polygon, ring),
        (GeometryType::Polygon, _) => (into_curve_polygon(polygon), ring),
        (GeometryType::CurvePolygon, GeometryType::LinearRing) => {
            (polygon, ring.cast(GeometryType::LineString))
        }
        _ => (polygon, ring),
    };
    if let Some(c) = polygon.as_collection_mut() {
        c.push(ring);
    }
    polygon
}

/// Whether the exterior ring `inner` lies inside `outer`, judged from its vertices.
///
/// The first vertex decides, unless it lies on the boundary of `outer`: then the following
/// vertices are walked, and if they all lie on the boundary, the midpoints of the edges.
fn ring_inside(inner: &SimpleCurve, outer: &SimpleCurve) -> bool {
    let Some(first) = inner.start() else {
        return false;
    };
    if !outer.is_point_on_ring_boundary(&first, false) {
        return outer.is_point_in_ring(&first, false);
    }

    let mut previous = first;
    for point in &inner.coords[1..] {
        if point.equals_2d(&previous) {
            continue;
        }
        if outer.is_point_on_ring_boundary(point, false) {
            previous = *point;
            continue;
        }
        return outer.is_point_in_ring(point, false);
    }

    if inner.num_coords() > 2 {
        let mut previous = first;
        for point in &inner.coords[1..] {
            if point.equals_2d(&previous) {
                continue;
            }
            let middle = Coord::new((point.x + previous.x) / 2., (point.y + previous.y) / 2.);
            if outer.is_point_on_ring_boundary(&middle, false) {
                previous = *point;
                continue;
            }
            return outer.is_point_in_ring(&middle, false);
        }
    }
    false
}

fn warn_many_parts(found_ccw: bool) {
    static WARN: Once = Once::new();
    WARN.call_once(|| {
        if found_ccw {
            log::warn!(
                "organize_polygons() received a polygon with more than {CRITICAL_PART_NUMBER} \
                 parts. The processing may be really slow. You can skip the processing with \
                 OrganizeMethod::Skip, or only analyze counter-clockwise parts with \
                 OrganizeMethod::OnlyCcw if holes are known to be counter-clockwise"
            )
        } else {
            log::warn!(
                "organize_polygons() received a polygon with more than {CRITICAL_PART_NUMBER} \
                 parts. The processing may be really slow. You can skip the processing with \
                 OrganizeMethod::Skip"
            )
        }
    });
}

fn collect_top_level(mut parts: Vec<Geometry>, has_curves: bool, dim: Dimension) -> Geometry {
    if parts.len() == 1 {
        if let Some(single) = parts.pop() {
            return single;
        }
    }
    let multi_type = if has_curves {
        GeometryType::MultiSurface
    } else {
        GeometryType::MultiPolygon
    };
    Geometry::new_collection(multi_type, parts, dim)
}

/// Organize single-ring polygons into polygons with holes.
///
/// Each input is expected to be a Polygon or CurvePolygon holding a single ring. Rings nested
/// in a top-level ring become its holes; rings nested in a hole are top-level again. The
/// result is a Polygon when a single top-level ring remains, and otherwise a MultiPolygon, or
/// a MultiSurface when curves are present.
///
/// The returned flag is `false` when the input could not be organized: crossing rings (only
/// detected when `set_operations` is given), polygons that already have holes, degenerate
/// rings, or [`OrganizeMethod::Skip`]. Every ring is then returned as its own polygon.
///
/// ```
/// use geofactory::algorithm::organize_polygons;
/// use geofactory::geometry::{Dimension, Geometry, GeometryType};
/// use geofactory::io::wkt::parse_wkt;
/// use geofactory::options::OrganizeMethod;
///
/// let rings = ["POLYGON ((0 0,0 10,10 10,10 0,0 0))", "POLYGON ((2 2,4 2,4 4,2 4,2 2))"]
///     .iter()
///     .map(|wkt| parse_wkt(wkt, None).unwrap().0)
///     .collect();
/// let (polygon, valid) = organize_polygons(rings, OrganizeMethod::Default, None);
/// assert!(valid);
/// assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
/// assert_eq!(polygon.interior_rings().len(), 1);
/// ```
pub fn organize_polygons(
    polygons: Vec<Geometry>,
    method: OrganizeMethod,
    set_operations: Option<&dyn SetOperations>,
) -> (Geometry, bool) {
    let count = polygons.len();
    if count == 0 {
        return (Geometry::empty(GeometryType::Polygon, Dimension::XY), true);
    }

    let is_polygon = |g: &Geometry| {
        matches!(
            g.geometry_type(),
            GeometryType::Polygon | GeometryType::CurvePolygon
        )
    };

    if count == 1 {
        let mut polygons = polygons;
        return match polygons.pop() {
            Some(polygon) if is_polygon(&polygon) => (polygon, true),
            _ => {
                log::warn!("organize_polygons() received a non-Polygon geometry");
                (Geometry::empty(GeometryType::Polygon, Dimension::XY), false)
            }
        };
    }

    let fast = set_operations.is_none();
    let mut method = method;
    let mut mixed_up = method == OrganizeMethod::Skip;
    let mut valid_topology = true;
    let mut has_curves = false;
    let mut found_ccw = false;
    let mut dim = Dimension::XY;

    let mut parts: Vec<Part> = Vec::with_capacity(count);
    for (index, polygon) in polygons.into_iter().enumerate() {
        if !is_polygon(&polygon) {
            log::warn!("organize_polygons() received a non-Polygon geometry");
            continue;
        }
        has_curves |= polygon.geometry_type() == GeometryType::CurvePolygon;
        dim = dim.union(polygon.dimension());
        let (part, usable) = Part::new(index, polygon);
        if usable {
            found_ccw |= !part.is_clockwise;
        } else if !mixed_up {
            log::warn!(
                "organize_polygons() received an unexpected geometry. Either a polygon with \
                 interior rings, or a polygon with less than 4 points. Return arguments as a \
                 collection"
            );
            mixed_up = true;
        }
        parts.push(part);
    }

    if parts.is_empty() {
        return (Geometry::empty(GeometryType::Polygon, dim), false);
    }

    let clockwise: Vec<usize> = (0..parts.len())
        .filter(|&i| parts[i].ring.is_some() && parts[i].is_clockwise)
        .collect();

    if matches!(
        method,
        OrganizeMethod::OnlyCcw | OrganizeMethod::CcwInnerJustAfterCwOuter
    ) && clockwise.len() == 1
        && fast
        && !mixed_up
    {
        // A single outer ring: everything else is one of its holes.
        let outer_pos = clockwise[0];
        let outer = parts.remove(outer_pos);
        let mut polygon = outer.polygon;
        for part in parts {
            if let Some(ring) = part.take_exterior_ring() {
                polygon = add_ring(polygon, ring);
            }
        }
        return (polygon, true);
    }

    if method == OrganizeMethod::CcwInnerJustAfterCwOuter && !mixed_up && parts[0].is_clockwise
    {
        let mut done: Vec<Geometry> = vec![];
        let mut parts = parts.into_iter();
        let Some(first) = parts.next() else {
            return (Geometry::empty(GeometryType::Polygon, dim), false);
        };
        let mut envelope = first.envelope;
        let mut current = first.polygon;
        for (i, part) in parts.enumerate() {
            if part.is_clockwise {
                envelope = part.envelope;
                done.push(std::mem::replace(&mut current, part.polygon));
            } else {
                if let Some(start) = part.start_point() {
                    if !envelope.contains_coord(&start) {
                        log::warn!(
                            "Part {} does not respect CCW_INNER_JUST_AFTER_CW_OUTER rule",
                            i + 1
                        );
                    }
                }
                if let Some(ring) = part.take_exterior_ring() {
                    current = add_ring(current, ring);
                }
            }
        }
        done.push(current);
        return (collect_top_level(done, has_curves, dim), true);
    } else if method == OrganizeMethod::CcwInnerJustAfterCwOuter {
        method = OrganizeMethod::OnlyCcw;
    }

    if count > CRITICAL_PART_NUMBER && method == OrganizeMethod::Default {
        warn_many_parts(found_ccw);
    }

    if !mixed_up {
        parts.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(Ordering::Equal));
    }

    let heuristic = HeuristicSetOperations;
    let only_ccw = method == OrganizeMethod::OnlyCcw;

    let mut i = 1;
    while !mixed_up && valid_topology && i < parts.len() {
        if only_ccw && parts[i].is_clockwise {
            parts[i].is_top_level = true;
            parts[i].enclosing = None;
            i += 1;
            continue;
        }

        let mut enclosing = None;
        for j in (0..i).rev() {
            if only_ccw && !parts[j].is_clockwise {
                continue;
            }

            let (inner, outer) = (&parts[i], &parts[j]);
            let mut inside = false;
            if outer.envelope.contains(&inner.envelope) {
                inside = match set_operations {
                    None if only_ccw && j == 0 => true,
                    None => match (&inner.ring, &outer.ring) {
                        (Some(inner), Some(outer)) => ring_inside(inner, outer),
                        _ => false,
                    },
                    Some(ops) => {
                        let (a, b) = (outer.linear_polygon(), inner.linear_polygon());
                        ops.contains(&a, &b)
                            .or_else(|| heuristic.contains(&a, &b))
                            .unwrap_or(false)
                    }
                };
            }

            if inside {
                enclosing = Some(j);
                break;
            }

            if let Some(ops) = set_operations {
                if inner.envelope.intersects(&outer.envelope) {
                    let (a, b) = (inner.linear_polygon(), outer.linear_polygon());
                    let overlaps = ops
                        .overlaps(&a, &b)
                        .or_else(|| heuristic.overlaps(&a, &b))
                        .unwrap_or(false);
                    if overlaps {
                        log::debug!(
                            "Bad intersection for polygons {} and {}",
                            inner.index,
                            outer.index
                        );
                        valid_topology = false;
                        break;
                    }
                }
            }
        }

        match enclosing {
            Some(j) if parts[j].is_top_level => {
                // A lake.
                parts[i].is_top_level = false;
                parts[i].enclosing = Some(parts[j].index);
            }
            _ => {
                parts[i].is_top_level = true;
                parts[i].enclosing = None;
            }
        }
        i += 1;
    }

    let valid = valid_topology && !mixed_up;
    if !valid {
        for part in parts.iter_mut() {
            part.is_top_level = true;
            part.enclosing = None;
        }
    }

    parts.sort_by_key(|p| p.index);

    let mut holes: Vec<(usize, Geometry)> = vec![];
    let mut top_level: Vec<(usize, Geometry)> = vec![];
    for part in parts {
        match part.enclosing {
            Some(enclosing) if !part.is_top_level => {
                if let Some(ring) = part.take_exterior_ring() {
                    holes.push((enclosing, ring));
                }
            }
            _ => top_level.push((part.index, part.polygon)),
        }
    }
    for (enclosing, ring) in holes {
        if let Some(pos) = top_level.iter().position(|(index, _)| *index == enclosing) {
            let (index, polygon) = top_level.swap_remove(pos);
            top_level.push((index, add_ring(polygon, ring)));
        }
    }
    top_level.sort_by_key(|(index, _)| *index);

    let out = collect_top_level(
        top_level.into_iter().map(|(_, p)| p).collect(),
        has_curves,
        dim,
    );
    (out, valid)
}
