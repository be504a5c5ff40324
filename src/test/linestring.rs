use geo::line_string;

use crate::geometry::Geometry;

pub(crate) fn ls0() -> Geometry {
    line_string![
        (x: 0., y: 1.),
        (x: 1., y: 2.)
    ]
    .into()
}

pub(crate) fn ls1() -> Geometry {
    line_string![
        (x: 1., y: 2.),
        (x: 3., y: 4.)
    ]
    .into()
}

pub(crate) fn ls2() -> Geometry {
    line_string![
        (x: 5., y: 6.),
        (x: 3., y: 4.)
    ]
    .into()
}
