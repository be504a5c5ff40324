use criterion::{criterion_group, criterion_main, Criterion};
use geofactory::algorithm::organize_polygons;
use geofactory::algorithm::setops::GeoSetOperations;
use geofactory::geometry::{Coord, Dimension, Geometry, SimpleCurve};
use geofactory::options::OrganizeMethod;

fn square(minx: f64, miny: f64, size: f64, clockwise: bool) -> Geometry {
    let (maxx, maxy) = (minx + size, miny + size);
    let mut coords = vec![
        Coord::new(minx, miny),
        Coord::new(minx, maxy),
        Coord::new(maxx, maxy),
        Coord::new(maxx, miny),
        Coord::new(minx, miny),
    ];
    if !clockwise {
        coords.reverse();
    }
    Geometry::polygon(vec![SimpleCurve::new(coords, Dimension::XY)], Dimension::XY)
}

/// A grid of outer rings, each holding four holes.
fn rings(side: usize) -> Vec<Geometry> {
    let mut out = vec![];
    for i in 0..side {
        for j in 0..side {
            let (x, y) = (i as f64 * 20., j as f64 * 20.);
            out.push(square(x, y, 10., true));
            for (dx, dy) in [(1., 1.), (6., 1.), (1., 6.), (6., 6.)] {
                out.push(square(x + dx, y + dy, 2., false));
            }
        }
    }
    out
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let input = rings(10);

    c.bench_function("organize rings", |b| {
        b.iter(|| organize_polygons(input.clone(), OrganizeMethod::Default, None))
    });
    c.bench_function("organize rings only ccw", |b| {
        b.iter(|| organize_polygons(input.clone(), OrganizeMethod::OnlyCcw, None))
    });
    c.bench_function("organize rings with geo predicates", |b| {
        b.iter(|| organize_polygons(input.clone(), OrganizeMethod::Default, Some(&GeoSetOperations)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
