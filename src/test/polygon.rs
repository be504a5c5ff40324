use geo::polygon;

use crate::geometry::{Coord, Dimension, Geometry, SimpleCurve};

/// A closed ring through the given vertices.
pub(crate) fn ring(coords: &[(f64, f64)]) -> SimpleCurve {
    let mut ring = SimpleCurve::new(
        coords.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        Dimension::XY,
    );
    ring.close();
    ring
}

/// An axis-aligned square ring.
pub(crate) fn square_ring(minx: f64, miny: f64, size: f64, clockwise: bool) -> SimpleCurve {
    let (maxx, maxy) = (minx + size, miny + size);
    if clockwise {
        ring(&[(minx, miny), (minx, maxy), (maxx, maxy), (maxx, miny)])
    } else {
        ring(&[(minx, miny), (maxx, miny), (maxx, maxy), (minx, maxy)])
    }
}

/// A square polygon with a clockwise exterior.
pub(crate) fn square(minx: f64, miny: f64, size: f64) -> Geometry {
    Geometry::polygon(vec![square_ring(minx, miny, size, true)], Dimension::XY)
}

pub(crate) fn square_with_hole() -> Geometry {
    polygon!(
        exterior: [
            (x: 0., y: 0.),
            (x: 0., y: 10.),
            (x: 10., y: 10.),
            (x: 10., y: 0.),
        ],
        interiors: [
            [
                (x: 2., y: 2.),
                (x: 4., y: 2.),
                (x: 4., y: 4.),
                (x: 2., y: 4.),
            ],
        ],
    )
    .into()
}
