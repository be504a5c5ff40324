use criterion::{criterion_group, criterion_main, Criterion};
use geofactory::algorithm::curve::{curve_from_line_string, curve_to_line_string};
use geofactory::geometry::{Coord, Dimension};
use geofactory::options::{IntermediatePoint, StrokeOptions};

pub fn criterion_benchmark(c: &mut Criterion) {
    let (p0, p1, p2) = (Coord::new(0., 0.), Coord::new(50., 50.), Coord::new(100., 0.));
    let options = StrokeOptions {
        max_angle_step_degrees: 0.5,
        add_intermediate_point: IntermediatePoint::Stealth,
    };

    c.bench_function("stroke arc", |b| {
        b.iter(|| curve_to_line_string(&p0, &p1, &p2, Dimension::XY, &options))
    });

    let stealth = curve_to_line_string(&p0, &p1, &p2, Dimension::XY, &options);
    c.bench_function("detect arc with hidden intermediate point", |b| {
        b.iter(|| curve_from_line_string(&stealth, false))
    });

    let plain = curve_to_line_string(
        &p0,
        &p1,
        &p2,
        Dimension::XY,
        &StrokeOptions {
            add_intermediate_point: IntermediatePoint::No,
            ..options
        },
    );
    c.bench_function("detect arc", |b| {
        b.iter(|| curve_from_line_string(&plain, false))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
