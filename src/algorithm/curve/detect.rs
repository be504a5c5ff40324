use std::f64::consts::PI;

use crate::algorithm::curve::hidden::{decode_alpha_ratio, unpack_ratio, unpack_ratio_reversed};
use crate::algorithm::curve::parameters::{curve_parameters, distance, ArcParameters};
use crate::algorithm::curve::stroke::need_switch_arc_order;
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, SimpleCurve};

/// Relative distance under which two consecutive vertices are merged.
const DEFAULT_TOLERANCE_EPSILON: f64 = 1e-14;

/// Relative difference of radius or center beyond which two triples are on different circles.
const CIRCLE_TOLERANCE: f64 = 1e-7;

const HIDDEN_PAIR_SENTINEL: u32 = 0xFFFF_FFFF;

/// Outcome of trying to grow an arc from a given vertex.
enum Detection {
    /// No arc starts at this vertex.
    NoArc,
    /// An arc was emitted; scanning resumes at the given vertex.
    Continue(usize),
    /// An arc reaching the last vertex was emitted.
    Finished,
}

/// Pieces of the curve being rebuilt.
struct CurveBuilder {
    dim: Dimension,
    compound: Vec<Geometry>,
    arc: Option<Vec<Coord>>,
    line: Option<Vec<Coord>>,
}

/// Move `angle` by whole turns so that it lies past `start` in the direction of `stop`.
fn fix_angle(start: f64, stop: f64, mut angle: f64) -> f64 {
    if start < stop {
        while angle <= start + 1e-8 {
            angle += 2. * PI;
        }
    } else {
        while angle >= start - 1e-8 {
            angle -= 2. * PI;
        }
    }
    angle
}

fn is_almost_integer(value: f64) -> bool {
    const THRESHOLD: f64 = 1e-3;
    (value - value.round()).abs() < THRESHOLD
}

fn differs(a: &Coord, b: &Coord, scale: f64) -> bool {
    (a.x - b.x).abs() > DEFAULT_TOLERANCE_EPSILON * scale
        || (a.y - b.y).abs() > DEFAULT_TOLERANCE_EPSILON * scale
}

fn vertex_scale(c: &Coord) -> f64 {
    1f64.max(c.x.abs()).max(c.y.abs())
}

/// Interpolate Z and M of the decoded intermediate vertex along the stroked vertices.
fn interpolate_zm(points: &[Coord], arc: &ArcParameters, last_valid_alpha: f64, alpha_mid: f64) -> (f64, f64) {
    let first = &points[0];
    let mut last_alpha = arc.alpha0;
    let (mut last_z, mut last_m) = (first.z, first.m);
    for p in &points[1..] {
        let alpha = fix_angle(arc.alpha0, last_valid_alpha, (p.y - arc.cy).atan2(p.x - arc.cx));
        let span = alpha - last_alpha;
        if span != 0. && (alpha_mid - last_alpha) * span >= 0. && (alpha_mid - last_alpha).abs() <= span.abs() {
            let ratio = (alpha_mid - last_alpha) / span;
            return (
                last_z + ratio * (p.z - last_z),
                last_m + ratio * (p.m - last_m),
            );
        }
        last_alpha = alpha;
        last_z = p.z;
        last_m = p.m;
    }
    (last_z, last_m)
}

/// Snap a decoded intermediate point whose neighbours sit on integer coordinates onto the
/// integer location that best fits the circle.
fn snap_intermediate(
    x_mid: f64,
    y_mid: f64,
    p0: &Coord,
    final_point: &Coord,
    arc: &ArcParameters,
    scale: f64,
) -> (f64, f64) {
    if arc.radius <= 1e-5 {
        return (
            (x_mid * 1e8).round() / 1e8,
            (y_mid * 1e8).round() / 1e8,
        );
    }

    let ends_are_integers = p0.x == p0.x.round()
        && p0.y == p0.y.round()
        && final_point.x == final_point.x.round()
        && final_point.y == final_point.y.round();
    let near_integer = (x_mid - x_mid.round()).abs() / scale < 1e-4
        && (y_mid - y_mid.round()).abs() / scale < 1e-4;
    if !(ends_are_integers && near_integer) {
        return (
            (x_mid * 1e8).round() / 1e8,
            (y_mid * 1e8).round() / 1e8,
        );
    }

    let (mut best_x, mut best_y) = (x_mid.round(), y_mid.round());
    let radius_error =
        |x: f64, y: f64| (arc.radius - distance(arc.cx, arc.cy, x, y)).abs();
    let mut best_error = radius_error(best_x, best_y);
    if best_error > 0.001 && arc.radius > 2. {
        let mut search_size = 1;
        let extent = x_mid.abs().max(y_mid.abs()).max(1.);
        if arc.radius > 100. * extent {
            search_size = 100;
        } else if arc.radius > 10. * extent {
            search_size = 10;
        }
        let (x_center, y_center) = (best_x, best_y);
        for dy in -search_size..=search_size {
            for dx in -search_size..=search_size {
                let x = x_center + f64::from(dx);
                let y = y_center + f64::from(dy);
                let error = radius_error(x, y);
                if error < best_error {
                    best_error = error;
                    best_x = x;
                    best_y = y;
                }
            }
        }
    }
    (best_x, best_y)
}

/// The circle through the ends of a run and one of its middle vertices, with the angle of the
/// end vertex on it.
///
/// Falls back to `arc`, fitted on the first three vertices, when the ends coincide or the new
/// circle strays from it.
fn refit_circle(
    arc: &ArcParameters,
    last_valid_alpha: f64,
    p0: &Coord,
    middle: &Coord,
    final_point: &Coord,
) -> (ArcParameters, f64) {
    let Some(fit) = curve_parameters(p0, middle, final_point) else {
        return (*arc, last_valid_alpha);
    };
    if p0.equals_2d(final_point)
        || (fit.radius - arc.radius).abs() > 1e-4 * arc.radius.max(1.)
    {
        return (*arc, last_valid_alpha);
    }
    let sweep = last_valid_alpha - arc.alpha0;
    let alpha0 = (p0.y - fit.cy).atan2(p0.x - fit.cx);
    let mut last = (final_point.y - fit.cy).atan2(final_point.x - fit.cx);
    while last - alpha0 - sweep > PI {
        last -= 2. * PI;
    }
    while last - alpha0 - sweep < -PI {
        last += 2. * PI;
    }
    let refined = ArcParameters {
        alpha0,
        alpha1: alpha0 + sweep / 2.,
        alpha2: last,
        ..fit
    };
    (refined, last)
}

/// Try to grow a run of vertices lying on a single circle, starting at vertex `i`.
fn detect_arc(points: &[Coord], i: usize, is_linear_ring: bool, builder: &mut CurveBuilder) -> Detection {
    let n = points.len();
    if i + 3 >= n {
        return Detection::NoArc;
    }

    let p0 = points[i];
    let arc1 = match curve_parameters(&p0, &points[i + 1], &points[i + 2]) {
        Some(arc) if (arc.alpha2 - arc.alpha0).abs() < 2. * 20. / 180. * PI => arc,
        _ => return Detection::NoArc,
    };

    let delta_alpha10 = arc1.alpha1 - arc1.alpha0;
    let delta_alpha21 = arc1.alpha2 - arc1.alpha1;
    let max_delta_alpha = delta_alpha10.abs().max(delta_alpha21.abs());

    let ratio_ref = unpack_ratio(&points[i + 1], &points[i + 2]);
    let mut found_sentinel = false;
    let mut found_reversed_ratio = false;
    let mut valid_alpha_ratio = ratio_ref > 0 && ratio_ref < HIDDEN_PAIR_SENTINEL;
    let mut valid_count = 1;

    let scale = 10f64.powf(
        1f64.max(arc1.radius)
            .max(arc1.cx.abs())
            .max(arc1.cy.abs())
            .log10()
            .ceil(),
    );
    let inv_scale = 1. / scale;

    let initial_constant_step = (delta_alpha10 - delta_alpha21).abs() / max_delta_alpha < 1e-4;
    let delta_epsilon = if initial_constant_step {
        max_delta_alpha * 1e-4
    } else {
        max_delta_alpha / 10.
    };

    let mut mid_point: Option<usize> = None;
    let mut last_valid_alpha = arc1.alpha2;
    let mut last_log_rel_diff = 0.;

    let mut j = i + 1;
    while j + 2 < n {
        let (p1, p2, p3) = (&points[j], &points[j + 1], &points[j + 2]);
        let Some(arc2) = curve_parameters(p1, p2, p3) else {
            break;
        };

        let rel_diff_r = (arc1.radius - arc2.radius).abs() * inv_scale;
        let rel_diff_cx = (arc1.cx - arc2.cx).abs() * inv_scale;
        let rel_diff_cy = (arc1.cy - arc2.cy).abs() * inv_scale;
        if rel_diff_r > CIRCLE_TOLERANCE
            || rel_diff_cx > CIRCLE_TOLERANCE
            || rel_diff_cy > CIRCLE_TOLERANCE
            || delta_alpha10 * (arc2.alpha1 - arc2.alpha0) < 0.
        {
            break;
        }

        if rel_diff_r > 0. && rel_diff_cx > 0. && rel_diff_cy > 0. {
            let log_rel_diff = rel_diff_r
                .log10()
                .abs()
                .min(rel_diff_cx.log10().abs())
                .min(rel_diff_cy.log10().abs());
            // A sudden loss of precision means the run left the circle.
            if log_rel_diff > 0.
                && last_log_rel_diff >= 8.
                && log_rel_diff <= 8.
                && log_rel_diff < last_log_rel_diff - 2.
            {
                break;
            }
            last_log_rel_diff = log_rel_diff;
        }

        let step10 = (arc2.alpha1 - arc2.alpha0).abs();
        let step21 = (arc2.alpha2 - arc2.alpha1).abs();
        if !(step10 < 2. * max_delta_alpha && step21 < 2. * max_delta_alpha) {
            break;
        }

        if valid_alpha_ratio && j > i + 1 && i % 2 != j % 2 {
            let reversed = unpack_ratio_reversed(p1, p2);
            if !found_sentinel && reversed == HIDDEN_PAIR_SENTINEL {
                found_sentinel = true;
                valid_count += 1;
            } else if found_sentinel && !found_reversed_ratio && reversed == HIDDEN_PAIR_SENTINEL {
                valid_count += 1;
            } else if found_sentinel && !found_reversed_ratio && reversed == ratio_ref {
                found_reversed_ratio = true;
                valid_count += 1;
            } else {
                if initial_constant_step
                    && (last_valid_alpha - arc1.alpha0).abs() >= PI
                    && valid_count > 10
                {
                    // Two stroked arcs glued together: stop the first one at its half turn.
                    if last_valid_alpha - arc1.alpha0 > 0. {
                        while last_valid_alpha - arc1.alpha0 - max_delta_alpha - PI
                            > -max_delta_alpha / 10.
                        {
                            last_valid_alpha -= max_delta_alpha;
                            j -= 1;
                        }
                    } else {
                        while last_valid_alpha - arc1.alpha0 + max_delta_alpha + PI
                            < max_delta_alpha / 10.
                        {
                            last_valid_alpha += max_delta_alpha;
                            j -= 1;
                        }
                    }
                    break;
                }
                valid_alpha_ratio = false;
            }
        }

        last_valid_alpha = fix_angle(arc1.alpha0, arc1.alpha1, arc2.alpha2);

        if j > i + 1 && mid_point.is_none() && delta_epsilon < 1. / 180. * PI {
            if (step10 - max_delta_alpha).abs() > delta_epsilon {
                mid_point = Some(j + if initial_constant_step { 0 } else { 1 });
            } else if (step21 - max_delta_alpha).abs() > delta_epsilon {
                mid_point = Some(j + if initial_constant_step { 1 } else { 2 });
            }
        }

        j += 1;
    }

    if j < i + 3 {
        return Detection::NoArc;
    }

    valid_alpha_ratio &= found_sentinel && found_reversed_ratio;

    if let Some(mut line) = builder.line.take() {
        if line
            .last()
            .map_or(true, |last| differs(last, &p0, vertex_scale(&p0)))
        {
            line.push(p0);
        }
        if line.len() >= 2 {
            builder
                .compound
                .push(Geometry::LineString(SimpleCurve::new(line, builder.dim)));
        }
    }

    let final_point = points[j + 1];

    let mid = if valid_alpha_ratio {
        let ratio = decode_alpha_ratio(ratio_ref);
        let (arc, last_valid_alpha) = refit_circle(
            &arc1,
            last_valid_alpha,
            &p0,
            &points[(i + j + 1) / 2],
            &final_point,
        );
        let alpha_mid = if need_switch_arc_order(&p0, &final_point) {
            fix_angle(
                arc.alpha0,
                last_valid_alpha,
                last_valid_alpha + ratio * (arc.alpha0 - last_valid_alpha),
            )
        } else {
            arc.alpha0 + ratio * (last_valid_alpha - arc.alpha0)
        };

        let (x_mid, y_mid) = arc.point_at(alpha_mid);
        let (x, y) = snap_intermediate(x_mid, y_mid, &p0, &final_point, &arc, scale);
        let (mut z, m) = interpolate_zm(&points[i..j + 2], &arc, last_valid_alpha, alpha_mid);
        if is_almost_integer(z) {
            z = z.round();
        }
        Some(Coord { x, y, z, m })
    } else {
        None
    };

    let arc = builder.arc.get_or_insert_with(|| vec![p0]);
    if p0.equals_2d(&final_point) && !is_linear_ring {
        // A full circle is split in two halves so that its winding is kept.
        let count = j + 2 - i;
        arc.push(points[i + count / 4]);
        arc.push(mid.unwrap_or(points[(i + j + 1) / 2]));
        arc.push(points[i + 3 * count / 4]);
    } else if let Some(mid) = mid {
        arc.push(mid);
    } else {
        match mid_point {
            Some(m) if m >= 1 && m < j => arc.push(points[m]),
            _ => arc.push(points[(i + j + 1) / 2]),
        }
    }
    arc.push(final_point);

    if j + 2 >= n {
        Detection::Finished
    } else {
        Detection::Continue(j + 1)
    }
}

/// Recover circular arcs from a stroked line.
///
/// Runs of at least four vertices lying on the same circle with a regular angular step become
/// CircularString pieces; the remaining vertices become LineString pieces. The pieces are joined
/// into a CompoundCurve, or returned alone when there is only one. Lines written by
/// [`curve_to_line_string`](super::curve_to_line_string) in stealth mode get their exact
/// intermediate points back.
///
/// `is_linear_ring` marks the input as a polygon ring, for which a closed arc needs no extra
/// split vertex.
pub fn curve_from_line_string(line: &SimpleCurve, is_linear_ring: bool) -> Geometry {
    let points = &line.coords;
    let n = points.len();
    let is_closed = n >= 4 && line.is_closed();
    let dim = line.dimension();
    let mut builder = CurveBuilder {
        dim,
        compound: vec![],
        arc: None,
        line: None,
    };

    let mut i = 0;
    while i < n {
        match detect_arc(points, i, is_linear_ring, &mut builder) {
            Detection::Finished => break,
            Detection::Continue(next) => {
                i = next;
                continue;
            }
            Detection::NoArc => {}
        }

        if let Some(arc) = builder.arc.take() {
            builder
                .compound
                .push(Geometry::CircularString(SimpleCurve::new(arc, builder.dim)));
        }

        let p = points[i];
        match builder.line.as_mut() {
            None => builder.line = Some(vec![p]),
            Some(line) => {
                let scale = if is_closed && i == n - 1 {
                    0.
                } else {
                    vertex_scale(&p)
                };
                if line.last().map_or(true, |last| differs(last, &p, scale)) {
                    line.push(p);
                }
            }
        }
        i += 1;
    }

    let curve = |coords: Vec<Coord>, geometry_type: GeometryType| {
        Geometry::new_curve(geometry_type, coords, dim)
    };
    let CurveBuilder {
        mut compound,
        dim: _,
        arc,
        line: new_line,
    } = builder;

    let out = match new_line {
        Some(coords) if coords.len() < 2 => match compound.len() {
            0 => Geometry::LineString(line.clone()),
            1 => compound.pop().unwrap_or_else(|| Geometry::LineString(line.clone())),
            _ => Geometry::new_collection(GeometryType::CompoundCurve, compound, dim),
        },
        new_line if !compound.is_empty() => {
            match (new_line, arc) {
                (Some(coords), _) => compound.push(curve(coords, GeometryType::LineString)),
                (None, Some(coords)) => {
                    compound.push(curve(coords, GeometryType::CircularString))
                }
                (None, None) => {}
            }
            Geometry::new_collection(GeometryType::CompoundCurve, compound, dim)
        }
        Some(coords) => curve(coords, GeometryType::LineString),
        None => match arc {
            Some(coords) => curve(coords, GeometryType::CircularString),
            None => Geometry::LineString(line.clone()),
        },
    };
    out.with_crs(line.crs.clone())
}
