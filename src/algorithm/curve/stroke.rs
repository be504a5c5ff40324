use std::f64::consts::PI;

use crate::algorithm::curve::hidden::{encode_alpha_ratio, stamp_interior};
use crate::algorithm::curve::parameters::{curve_parameters, ArcParameters};
use crate::geometry::{Coord, Dimension, SimpleCurve};
use crate::options::{IntermediatePoint, StrokeOptions, DEFAULT_ARC_STEP_SIZE};

/// Smallest angular step, in radians, accepted when stroking.
const MIN_STEP: f64 = 0.01 / 180. * PI;

/// A total order on arc end points; the arc is always stroked from the greater one so that an
/// arc and its reverse give mirrored vertices.
pub(crate) fn need_switch_arc_order(p0: &Coord, p2: &Coord) -> bool {
    p0.x < p2.x || (p0.x == p2.x && p0.y < p2.y)
}

/// Append the vertices strictly between `alpha_start` and `alpha_end`.
///
/// Z and M are interpolated linearly along the angle from `start` to `end`.
#[allow(clippy::too_many_arguments)]
fn stroke_arc(
    coords: &mut Vec<Coord>,
    arc: &ArcParameters,
    start: &Coord,
    end: &Coord,
    alpha_start: f64,
    alpha_end: f64,
    step: f64,
    stealth: bool,
) {
    let sign = if step > 0. { 1. } else { -1. };

    // A constant angle between all points, so the result does not depend on winding order.
    let num_steps = ((alpha_end - alpha_start) / step).abs() + 0.5;
    if num_steps.is_nan() || num_steps >= f64::from(i32::MAX) {
        log::warn!("Bogus arc steps: {alpha_start} {alpha_end} {step} {num_steps}");
        return;
    }
    let mut num_steps = num_steps as i32;
    if stealth {
        // At least 6 interior vertices, and an even number of them.
        num_steps = if num_steps < 7 {
            7
        } else {
            7 + 2 * ((num_steps - 7 + 1) / 2)
        };
    } else if num_steps < 4 {
        num_steps = 4;
    }

    let step = sign * ((alpha_end - alpha_start) / f64::from(num_steps)).abs();
    let mut alpha = alpha_start + step;
    while (alpha - alpha_end) * sign < -1e-8 {
        let (x, y) = arc.point_at(alpha);
        let t = (alpha - alpha_start) / (alpha_end - alpha_start);
        coords.push(Coord {
            x,
            y,
            z: start.z + (end.z - start.z) * t,
            m: start.m + (end.m - start.m) * t,
        });
        alpha += step;
    }
}

/// Approximate the arc through `p0`, `p1` and `p2` by a line string.
///
/// When the points do not define an arc, the result is `p0, p1, p2`. Otherwise the arc is
/// stroked with a constant angular step no larger than `options.max_angle_step_degrees`, and
/// `p1` is kept, dropped or hidden as selected by `options.add_intermediate_point`.
///
/// Stroking `p2, p1, p0` yields exactly the reverse vertices of stroking `p0, p1, p2`.
///
/// ```
/// use geofactory::algorithm::curve::curve_to_line_string;
/// use geofactory::geometry::{Coord, Dimension};
/// use geofactory::options::StrokeOptions;
///
/// let line = curve_to_line_string(
///     &Coord::new(0., 0.),
///     &Coord::new(1., 0.),
///     &Coord::new(2., 0.),
///     Dimension::XY,
///     &StrokeOptions::default(),
/// );
/// assert_eq!(line.coords, vec![Coord::new(0., 0.), Coord::new(1., 0.), Coord::new(2., 0.)]);
/// ```
pub fn curve_to_line_string(
    p0: &Coord,
    p1: &Coord,
    p2: &Coord,
    dim: Dimension,
    options: &StrokeOptions,
) -> SimpleCurve {
    if need_switch_arc_order(p0, p2) {
        let mut line = curve_to_line_string(p2, p1, p0, dim, options);
        line.reverse();
        return line;
    }

    let parameters = curve_parameters(p0, p1, p2);
    let is_arc = parameters.is_some();
    let arc = parameters.unwrap_or(ArcParameters {
        radius: 0.,
        cx: 0.,
        cy: 0.,
        alpha0: 0.,
        alpha1: 0.,
        alpha2: 0.,
    });
    let sign = if arc.alpha1 >= arc.alpha0 { 1. } else { -1. };

    let step_degrees = if options.max_angle_step_degrees < 1e-6 {
        DEFAULT_ARC_STEP_SIZE
    } else {
        options.max_angle_step_degrees
    };
    let mut step = step_degrees / 180. * PI;
    if step <= MIN_STEP {
        log::debug!("Too small arc step size: limiting to 0.01 degree.");
        step = MIN_STEP;
    }
    step *= sign;

    let mut coords = vec![*p0];
    if !is_arc || options.add_intermediate_point == IntermediatePoint::Yes {
        stroke_arc(&mut coords, &arc, p0, p1, arc.alpha0, arc.alpha1, step, false);
        coords.push(*p1);
        stroke_arc(&mut coords, &arc, p1, p2, arc.alpha1, arc.alpha2, step, false);
    } else {
        let stealth = options.add_intermediate_point == IntermediatePoint::Stealth;
        stroke_arc(&mut coords, &arc, p0, p2, arc.alpha0, arc.alpha2, step, stealth);
        let interior = &mut coords[1..];
        if stealth && interior.len() >= 6 && interior.len() % 2 == 0 {
            let ratio = (arc.alpha1 - arc.alpha0) / (arc.alpha2 - arc.alpha0);
            stamp_interior(encode_alpha_ratio(ratio), interior);
        }
    }
    coords.push(*p2);

    SimpleCurve::new(coords, dim)
}
