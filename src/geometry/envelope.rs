use geo::{coord, Rect};

use crate::geometry::Coord;

/// An axis-aligned bounding box.
///
/// A fresh envelope is "inverted" (min at +inf, max at -inf) so that it is empty until it is
/// expanded by a first coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Envelope {
    pub fn new() -> Self {
        Envelope {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: -f64::INFINITY,
            maxy: -f64::INFINITY,
        }
    }

    pub fn from_bounds(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Envelope {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx || self.miny > self.maxy
    }

    pub fn update(&mut self, coord: &Coord) {
        if coord.x < self.minx {
            self.minx = coord.x;
        }
        if coord.y < self.miny {
            self.miny = coord.y;
        }
        if coord.x > self.maxx {
            self.maxx = coord.x;
        }
        if coord.y > self.maxy {
            self.maxy = coord.y;
        }
    }

    pub fn merge(&mut self, other: &Envelope) {
        if other.is_empty() {
            return;
        }
        self.minx = self.minx.min(other.minx);
        self.miny = self.miny.min(other.miny);
        self.maxx = self.maxx.max(other.maxx);
        self.maxy = self.maxy.max(other.maxy);
    }

    /// Whether `other` lies within this envelope, boundaries included.
    pub fn contains(&self, other: &Envelope) -> bool {
        self.minx <= other.minx
            && self.miny <= other.miny
            && self.maxx >= other.maxx
            && self.maxy >= other.maxy
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.minx <= other.maxx
            && self.maxx >= other.minx
            && self.miny <= other.maxy
            && self.maxy >= other.miny
    }

    pub fn contains_coord(&self, coord: &Coord) -> bool {
        coord.x >= self.minx && coord.x <= self.maxx && coord.y >= self.miny && coord.y <= self.maxy
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Envelope> for Rect {
    fn from(value: Envelope) -> Self {
        let min_coord = coord! { x: value.minx, y: value.miny };
        let max_coord = coord! { x: value.maxx, y: value.maxy };
        Rect::new(min_coord, max_coord)
    }
}

impl From<Envelope> for ([f64; 2], [f64; 2]) {
    fn from(value: Envelope) -> Self {
        ([value.minx, value.miny], [value.maxx, value.maxy])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_until_updated() {
        let mut env = Envelope::new();
        assert!(env.is_empty());
        env.update(&Coord::new(1., 2.));
        assert!(!env.is_empty());
        assert_eq!(env, Envelope::from_bounds(1., 2., 1., 2.));
    }

    #[test]
    fn containment() {
        let outer = Envelope::from_bounds(0., 0., 10., 10.);
        let inner = Envelope::from_bounds(2., 2., 4., 4.);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(inner.intersects(&outer));
        assert!(!inner.intersects(&Envelope::from_bounds(5., 5., 6., 6.)));
    }
}
