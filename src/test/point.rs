use geo::point;

use crate::geometry::Geometry;

pub(crate) fn p0() -> Geometry {
    point!(
        x: 0., y: 1.
    )
    .into()
}

pub(crate) fn p1() -> Geometry {
    point!(
        x: 1., y: 2.
    )
    .into()
}

pub(crate) fn p2() -> Geometry {
    point!(
        x: 2., y: 3.
    )
    .into()
}
