use criterion::{criterion_group, criterion_main, Criterion};
use geofactory::geometry::{Coord, Dimension, Geometry, GeometryType, SimpleCurve};
use geofactory::io::wkb::{parse_wkb, to_wkb};

/// A multipolygon of `count` squares, each a closed ring of 101 vertices.
fn multi_polygon(count: usize) -> Geometry {
    let polygons = (0..count)
        .map(|i| {
            let x0 = i as f64 * 20.;
            let mut coords: Vec<Coord> = (0..100)
                .map(|j| {
                    let t = j as f64 / 25.;
                    match j / 25 {
                        0 => Coord::new(x0, t * 10.),
                        1 => Coord::new(x0 + (t - 1.) * 10., 10.),
                        2 => Coord::new(x0 + 10., 10. - (t - 2.) * 10.),
                        _ => Coord::new(x0 + 10. - (t - 3.) * 10., 0.),
                    }
                })
                .collect();
            coords.push(coords[0]);
            Geometry::polygon(vec![SimpleCurve::new(coords, Dimension::XY)], Dimension::XY)
        })
        .collect();
    Geometry::new_collection(GeometryType::MultiPolygon, polygons, Dimension::XY)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let buf = to_wkb(&multi_polygon(1000)).unwrap();

    c.bench_function("parse WKB multipolygon", |b| {
        b.iter(|| {
            let (_geom, consumed) = parse_wkb(&buf, None).unwrap();
            assert_eq!(consumed, buf.len());
        })
    });

    let geom = parse_wkb(&buf, None).unwrap().0;
    c.bench_function("write WKB multipolygon", |b| {
        b.iter(|| {
            let _buf = to_wkb(&geom).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
