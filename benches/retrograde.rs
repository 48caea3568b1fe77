use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hifitime::Epoch;

use ndastro::{
    bodies::Body,
    jpl_ephem::analytic::AnalyticEphemeris,
    retrograde::{retrograde_status, RetrogradeConfig},
};

fn bench_retrograde(c: &mut Criterion) {
    let ephem = AnalyticEphemeris::new();

    let mercury = Epoch::from_gregorian_utc_at_midnight(2024, 4, 12);
    let config = RetrogradeConfig::for_body(Body::Mercury);
    c.bench_function("retrograde/mercury_in_arc", |b| {
        b.iter(|| retrograde_status(&ephem, Body::Mercury, black_box(&mercury), &config))
    });

    let saturn = Epoch::from_gregorian_utc_at_midnight(2025, 1, 15);
    let nearest = RetrogradeConfig::for_body(Body::Saturn).with_nearest_arc(true);
    c.bench_function("retrograde/saturn_nearest_arc", |b| {
        b.iter(|| retrograde_status(&ephem, Body::Saturn, black_box(&saturn), &nearest))
    });
}

criterion_group!(benches, bench_retrograde);
criterion_main!(benches);
