use std::sync::Arc;

use crate::geometry::{Coord, Dimension, Envelope, SpatialRef};

/// An ordered vertex sequence.
///
/// Backs LineString, LinearRing and CircularString. For a CircularString every consecutive
/// triple `(2k, 2k+1, 2k+2)` describes one arc.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleCurve {
    pub coords: Vec<Coord>,
    pub(crate) dim: Dimension,
    pub(crate) crs: Option<Arc<SpatialRef>>,
}

impl SimpleCurve {
    pub fn new(coords: Vec<Coord>, dim: Dimension) -> Self {
        Self {
            coords,
            dim,
            crs: None,
        }
    }

    pub fn empty(dim: Dimension) -> Self {
        Self::new(vec![], dim)
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn num_coords(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn start(&self) -> Option<Coord> {
        self.coords.first().copied()
    }

    pub fn end(&self) -> Option<Coord> {
        self.coords.last().copied()
    }

    /// Whether the first and last vertices are planar-equal.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => false,
        }
    }

    /// Append the first vertex if the sequence is not closed.
    pub fn close(&mut self) {
        if !self.is_empty() && !self.is_closed() {
            self.coords.push(self.coords[0]);
        }
    }

    pub fn reverse(&mut self) {
        self.coords.reverse();
    }

    pub fn push(&mut self, coord: Coord) {
        self.coords.push(coord);
    }

    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::new();
        self.coords.iter().for_each(|c| env.update(c));
        env
    }

    /// Twice the shoelace area; negative when the vertices run clockwise.
    ///
    /// Only meaningful for closed linear sequences.
    pub fn signed_area(&self) -> f64 {
        let n = self.coords.len();
        if n < 3 {
            return 0.;
        }
        // Offset by the first vertex to keep precision with large coordinates.
        let origin = self.coords[0];
        let mut sum = 0.;
        for window in self.coords.windows(2) {
            let (a, b) = (window[0], window[1]);
            sum += (a.x - origin.x) * (b.y - origin.y) - (b.x - origin.x) * (a.y - origin.y);
        }
        sum / 2.
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.
    }

    pub(crate) fn set_dimension(&mut self, dim: Dimension) {
        if !dim.has_z() {
            self.coords.iter_mut().for_each(|c| c.z = 0.);
        }
        if !dim.has_m() {
            self.coords.iter_mut().for_each(|c| c.m = 0.);
        }
        self.dim = dim;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn square(clockwise: bool) -> SimpleCurve {
        let mut coords = vec![
            Coord::new(0., 0.),
            Coord::new(0., 1.),
            Coord::new(1., 1.),
            Coord::new(1., 0.),
            Coord::new(0., 0.),
        ];
        if !clockwise {
            coords.reverse();
        }
        SimpleCurve::new(coords, Dimension::XY)
    }

    #[test]
    fn winding() {
        assert!(square(true).is_clockwise());
        assert!(!square(false).is_clockwise());
        assert_eq!(square(false).signed_area(), 1.);
    }

    #[test]
    fn close_open_sequence() {
        let mut curve = SimpleCurve::new(
            vec![Coord::new(0., 0.), Coord::new(1., 0.), Coord::new(1., 1.)],
            Dimension::XY,
        );
        assert!(!curve.is_closed());
        curve.close();
        assert!(curve.is_closed());
        assert_eq!(curve.num_coords(), 4);
    }
}
