use std::sync::Once;

use itertools::Itertools;

use crate::algorithm::setops::SetOperations;
use crate::geometry::{Coord, Geometry, SimpleCurve};

/// Self-contained predicates based on vertex location and segment crossing.
///
/// Exact for the simple, valid rings the ring organizer works with. Overlays are not
/// available.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSetOperations;

/// The rings of every polygon found in `geom`, exterior first. `None` for non-polygonal or
/// curved input.
fn polygon_rings(geom: &Geometry) -> Option<Vec<Vec<&SimpleCurve>>> {
    match geom {
        Geometry::Polygon(_) | Geometry::Triangle(_) => {
            Some(vec![geom.members().iter().filter_map(|r| r.as_curve()).collect()])
        }
        Geometry::MultiPolygon(_) | Geometry::PolyhedralSurface(_) | Geometry::Tin(_) => {
            let mut out = vec![];
            for member in geom.members() {
                out.extend(polygon_rings(member)?);
            }
            Some(out)
        }
        _ => None,
    }
}

fn curves(geom: &Geometry) -> Vec<&SimpleCurve> {
    match geom.as_curve() {
        Some(c) => vec![c],
        None => geom.members().iter().flat_map(curves).collect(),
    }
}

fn orientation(p: &Coord, q: &Coord, r: &Coord) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

/// Whether segments `a1 a2` and `b1 b2` cross at a single point interior to both.
fn segments_cross(a1: &Coord, a2: &Coord, b1: &Coord, b2: &Coord) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);
    o1 * o2 < 0. && o3 * o4 < 0.
}

fn boundaries_cross(a: &[&SimpleCurve], b: &[&SimpleCurve]) -> bool {
    a.iter().any(|ra| {
        b.iter().any(|rb| {
            if !ra.envelope().intersects(&rb.envelope()) {
                return false;
            }
            ra.coords.iter().tuple_windows().any(|(a1, a2)| {
                rb.coords
                    .iter()
                    .tuple_windows()
                    .any(|(b1, b2)| segments_cross(a1, a2, b1, b2))
            })
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Interior,
    Boundary,
    Exterior,
}

fn locate(rings: &[&SimpleCurve], point: &Coord) -> Location {
    let Some((exterior, holes)) = rings.split_first() else {
        return Location::Exterior;
    };
    if exterior.is_point_on_ring_boundary(point, true) {
        return Location::Boundary;
    }
    if !exterior.is_point_in_ring(point, true) {
        return Location::Exterior;
    }
    for hole in holes {
        if hole.is_point_on_ring_boundary(point, true) {
            return Location::Boundary;
        }
        if hole.is_point_in_ring(point, true) {
            return Location::Exterior;
        }
    }
    Location::Interior
}

/// Vertices and edge midpoints of `curves`, the latter to probe edges whose ends both lie on a
/// boundary.
fn probe_points(curves: &[&SimpleCurve]) -> Vec<Coord> {
    let mut points = vec![];
    for curve in curves {
        points.extend(curve.coords.iter().copied());
        points.extend(curve.coords.iter().tuple_windows().map(|(p, q)| {
            Coord::new((p.x + q.x) / 2., (p.y + q.y) / 2.)
        }));
    }
    points
}

fn polygon_contains(rings: &[&SimpleCurve], other: &[&SimpleCurve]) -> bool {
    if boundaries_cross(rings, other) {
        return false;
    }
    probe_points(other)
        .iter()
        .all(|p| locate(rings, p) != Location::Exterior)
}

impl SetOperations for HeuristicSetOperations {
    fn contains(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        let polygons = polygon_rings(a)?;
        if let Geometry::Point(point) = b {
            return Some(point.coord.is_some_and(|coord| {
                polygons
                    .iter()
                    .any(|rings| locate(rings, &coord) == Location::Interior)
            }));
        }
        let other = curves(b);
        if other.is_empty() || b.is_empty() {
            return Some(false);
        }
        // Every piece of `b` must sit in a single polygon of `a`.
        let pieces = polygon_rings(b).unwrap_or_else(|| other.iter().map(|c| vec![*c]).collect());
        Some(pieces.iter().all(|piece| {
            polygons
                .iter()
                .any(|rings| polygon_contains(rings, piece))
        }))
    }

    fn overlaps(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        let pa = polygon_rings(a)?;
        let pb = polygon_rings(b)?;
        if !a.envelope().intersects(&b.envelope()) {
            return Some(false);
        }
        for ra in &pa {
            for rb in &pb {
                if boundaries_cross(ra, rb) {
                    return Some(true);
                }
                let b_in_a = probe_points(rb).iter().map(|p| locate(ra, p)).collect_vec();
                let a_in_b = probe_points(ra).iter().map(|p| locate(rb, p)).collect_vec();
                let b_partly_in_a = b_in_a.contains(&Location::Interior)
                    && b_in_a.contains(&Location::Exterior);
                let a_partly_in_b = a_in_b.contains(&Location::Interior)
                    && a_in_b.contains(&Location::Exterior);
                if b_partly_in_a || a_partly_in_b {
                    return Some(true);
                }
            }
        }
        Some(false)
    }

    fn touches(&self, a: &Geometry, b: &Geometry) -> Option<bool> {
        let pa = polygon_rings(a)?;
        if let Geometry::Point(point) = b {
            let Some(coord) = point.coord else {
                return Some(false);
            };
            let locations = pa.iter().map(|rings| locate(rings, &coord)).collect_vec();
            return Some(
                locations.contains(&Location::Boundary)
                    && !locations.contains(&Location::Interior),
            );
        }
        let pb = polygon_rings(b)?;
        let mut meet = false;
        for ra in &pa {
            for rb in &pb {
                if boundaries_cross(ra, rb) {
                    return Some(false);
                }
                let b_in_a = probe_points(rb).iter().map(|p| locate(ra, p)).collect_vec();
                let a_in_b = probe_points(ra).iter().map(|p| locate(rb, p)).collect_vec();
                if b_in_a.contains(&Location::Interior) || a_in_b.contains(&Location::Interior) {
                    return Some(false);
                }
                meet |= b_in_a.contains(&Location::Boundary) || a_in_b.contains(&Location::Boundary);
            }
        }
        Some(meet)
    }

    fn difference(&self, _a: &Geometry, _b: &Geometry) -> Option<Geometry> {
        static WARN: Once = Once::new();
        WARN.call_once(|| log::warn!("Polygon difference is not available without a geometry engine"));
        None
    }

    fn intersection(&self, _a: &Geometry, _b: &Geometry) -> Option<Geometry> {
        static WARN: Once = Once::new();
        WARN.call_once(|| {
            log::warn!("Polygon intersection is not available without a geometry engine")
        });
        None
    }
}
