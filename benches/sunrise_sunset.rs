use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hifitime::Epoch;

use ndastro::{
    jpl_ephem::analytic::AnalyticEphemeris,
    observers::GeoLocation,
    riseset::{sunrise_sunset, twilight, RiseSetConfig, TwilightKind},
};

fn bench_sunrise_sunset(c: &mut Criterion) {
    let ephem = AnalyticEphemeris::new();
    let bangalore = GeoLocation::with_elevation(12.97, 77.59, 914.0).unwrap();
    let date = Epoch::from_gregorian_utc_at_midnight(2026, 1, 5);

    let mut group = c.benchmark_group("sunrise_sunset");
    for step in [1.0, 5.0, 15.0] {
        let config = RiseSetConfig::default().with_scan_step_minutes(step);
        group.bench_function(format!("scan_{step}min"), |b| {
            b.iter(|| sunrise_sunset(&ephem, black_box(&bangalore), black_box(&date), &config))
        });
    }
    group.finish();

    let config = RiseSetConfig::default();
    c.bench_function("twilight/astronomical", |b| {
        b.iter(|| {
            twilight(
                &ephem,
                black_box(&bangalore),
                black_box(&date),
                TwilightKind::Astronomical,
                &config,
            )
        })
    });
}

criterion_group!(benches, bench_sunrise_sunset);
criterion_main!(benches);
