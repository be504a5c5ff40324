use std::f64::consts::PI;

use crate::geometry::{Coord, Dimension, Geometry};
use crate::options::DEFAULT_ARC_STEP_SIZE;

/// Stroke an arc of a (possibly rotated) ellipse into a 3D line string.
///
/// Angles are in degrees and are measured clockwise from the +X axis, as is usual in CAD
/// formats; `rotation` turns the primary axis the same way. A `max_angle_step_degrees` below
/// 1e-6 selects the default step. When `max_gap` is positive, extra vertices are inserted so
/// that no two consecutive vertices are further apart than it. An arc spanning exactly 360
/// degrees ends exactly on its start vertex.
///
/// Every vertex takes its Z from `center`.
///
/// ```
/// use geofactory::algorithm::curve::approximate_arc_angles;
/// use geofactory::geometry::Coord;
///
/// let line = approximate_arc_angles(&Coord::new(0., 0.), 1., 1., 0., 0., 90., 45., 0.);
/// let coords = &line.as_curve().unwrap().coords;
/// assert_eq!(coords.len(), 3);
/// assert!((coords[2].y + 1.).abs() < 1e-12);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn approximate_arc_angles(
    center: &Coord,
    primary_radius: f64,
    secondary_radius: f64,
    rotation: f64,
    start_angle: f64,
    end_angle: f64,
    max_angle_step_degrees: f64,
    max_gap: f64,
) -> Geometry {
    let rotation = rotation.to_radians();
    let max_step = if max_angle_step_degrees < 1e-6 {
        DEFAULT_ARC_STEP_SIZE
    } else {
        max_angle_step_degrees
    };

    let is_full_circle = (end_angle - start_angle).abs() == 360.;

    // Counter-clockwise from here on.
    let start_angle = -start_angle;
    let end_angle = -end_angle;

    let mut vertex_count =
        2usize.max(((end_angle - start_angle).abs() / max_step).ceil() as usize + 1);
    let slice = (end_angle - start_angle) / (vertex_count - 1) as f64;
    if is_full_circle {
        vertex_count -= 1;
    }

    let on_ellipse = |angle_degrees: f64| {
        let angle = angle_degrees * (PI / 180.);
        (angle.cos() * primary_radius, angle.sin() * secondary_radius)
    };

    let mut points: Vec<(f64, f64)> = Vec::with_capacity(vertex_count + 1);
    for i in 0..vertex_count {
        let (x, y) = on_ellipse(start_angle + i as f64 * slice);

        if max_gap > 0. {
            if let Some(&(last_x, last_y)) = points.last() {
                let dist = ((x - last_x).powi(2) + (y - last_y).powi(2)).sqrt();
                if dist > max_gap {
                    let add_count = (dist / max_gap) as usize;
                    let add_slice = slice / (add_count + 1) as f64;
                    for k in 0..add_count {
                        points.push(on_ellipse(
                            start_angle + (i - 1) as f64 * slice + (k + 1) as f64 * add_slice,
                        ));
                    }
                }
            }
        }
        points.push((x, y));
    }

    let (sin, cos) = rotation.sin_cos();
    let mut coords: Vec<Coord> = points
        .into_iter()
        .map(|(x, y)| Coord {
            x: center.x + x * cos + y * sin,
            y: center.y - x * sin + y * cos,
            z: center.z,
            m: 0.,
        })
        .collect();

    if is_full_circle {
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
    }

    Geometry::line_string(coords, Dimension::XYZ)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn full_circle_is_closed() {
        let line = approximate_arc_angles(&Coord::new_z(5., 5., 2.), 2., 1., 0., 0., 360., 10., 0.);
        let coords = &line.as_curve().unwrap().coords;
        assert_eq!(coords.len(), 37);
        assert_eq!(coords.first(), coords.last());
        assert!(coords.iter().all(|c| c.z == 2.));
        assert_abs_diff_eq!(coords[0].x, 7.);
    }

    #[test]
    fn angles_run_clockwise() {
        let line = approximate_arc_angles(&Coord::new(0., 0.), 1., 1., 0., 0., 90., 0., 0.);
        let coords = &line.as_curve().unwrap().coords;
        // Default 4 degree step.
        assert_eq!(coords.len(), 24);
        assert_abs_diff_eq!(coords[23].x, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(coords[23].y, -1., epsilon = 1e-12);
    }

    #[test]
    fn rotation() {
        let line = approximate_arc_angles(&Coord::new(0., 0.), 2., 1., 90., 0., 0., 4., 0.);
        let coords = &line.as_curve().unwrap().coords;
        assert_eq!(coords.len(), 2);
        assert_abs_diff_eq!(coords[0].x, 0., epsilon = 1e-12);
        assert_abs_diff_eq!(coords[0].y, -2., epsilon = 1e-12);
    }

    #[test]
    fn max_gap_inserts_vertices() {
        let line = approximate_arc_angles(&Coord::new(0., 0.), 100., 100., 0., 0., 90., 45., 10.);
        let coords = &line.as_curve().unwrap().coords;
        assert!(coords.len() > 3);
        for w in coords.windows(2) {
            let d = ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt();
            assert!(d <= 10. + 1e-9);
        }
    }
}
