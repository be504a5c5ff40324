//! Point/ring predicates shared by the ring organizer and the dateline corrector.

use crate::geometry::{Coord, SimpleCurve};

impl SimpleCurve {
    /// Whether `point` lies strictly inside this closed ring, by crossing count.
    ///
    /// Points exactly on the boundary may report either answer; test them with
    /// [`SimpleCurve::is_point_on_ring_boundary`] first.
    pub fn is_point_in_ring(&self, point: &Coord, test_envelope: bool) -> bool {
        if test_envelope && !self.envelope().contains_coord(point) {
            return false;
        }

        let mut num_crossings = 0usize;
        for window in self.coords.windows(2) {
            let x1 = window[1].x - point.x;
            let y1 = window[1].y - point.y;
            let x2 = window[0].x - point.x;
            let y2 = window[0].y - point.y;

            if (y1 > 0. && y2 <= 0.) || (y2 > 0. && y1 <= 0.) {
                // Intersection of the edge with the horizontal ray through the point
                let intersection = (x1 * y2 - x2 * y1) / (y2 - y1);
                if intersection > 0. {
                    num_crossings += 1;
                }
            }
        }
        num_crossings % 2 == 1
    }

    /// Whether `point` lies exactly on one of the edges of this ring.
    pub fn is_point_on_ring_boundary(&self, point: &Coord, test_envelope: bool) -> bool {
        if test_envelope && !self.envelope().contains_coord(point) {
            return false;
        }

        for window in self.coords.windows(2) {
            let x1 = window[1].x - point.x;
            let y1 = window[1].y - point.y;
            let x2 = window[0].x - point.x;
            let y2 = window[0].y - point.y;

            if x1 == x2 && y1 == y2 {
                continue;
            }

            if x1 * y2 - x2 * y1 == 0.
                && x1.min(x2) <= 0.
                && x1.max(x2) >= 0.
                && y1.min(y2) <= 0.
                && y1.max(y2) >= 0.
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Dimension;

    fn ring() -> SimpleCurve {
        SimpleCurve::new(
            vec![
                Coord::new(0., 0.),
                Coord::new(0., 10.),
                Coord::new(10., 10.),
                Coord::new(10., 0.),
                Coord::new(0., 0.),
            ],
            Dimension::XY,
        )
    }

    #[test]
    fn inside_and_outside() {
        assert!(ring().is_point_in_ring(&Coord::new(5., 5.), true));
        assert!(!ring().is_point_in_ring(&Coord::new(15., 5.), true));
        assert!(!ring().is_point_in_ring(&Coord::new(-1., 5.), false));
    }

    #[test]
    fn boundary() {
        assert!(ring().is_point_on_ring_boundary(&Coord::new(0., 5.), true));
        assert!(ring().is_point_on_ring_boundary(&Coord::new(10., 10.), true));
        assert!(!ring().is_point_on_ring_boundary(&Coord::new(5., 5.), true));
        assert!(!ring().is_point_on_ring_boundary(&Coord::new(0., 12.), false));
    }
}
