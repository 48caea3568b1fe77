use approx::assert_relative_eq;
use hifitime::{Epoch, TimeScale};
use ndastro::{
    bodies::Body,
    jpl_ephem::analytic::AnalyticEphemeris,
    ndastro_errors::NdastroError,
    position::{position_with_config, Correction, NodeMode, PositionConfig},
    spherical::angle_difference,
};

mod common;
use common::analytic;

fn instant() -> Epoch {
    Epoch::from_gregorian_utc_hms(2026, 1, 9, 12, 0, 0)
}

#[test]
fn test_all_positions_in_range() {
    let astro = analytic();
    let positions = astro.all_positions(&instant()).unwrap();
    assert_eq!(positions.keys().copied().collect::<Vec<_>>(), Body::ALL.to_vec());

    for (body, state) in &positions {
        assert!((0.0..360.0).contains(&state.longitude), "{body}");
        assert!(state.latitude.abs() < 10.0, "{body}");
        if body.is_node() {
            assert_eq!(state.distance, 0.0);
        } else {
            assert!(state.distance > 0.0);
        }
    }

    // the Sun moves about 1°/day, the Moon 12-15°/day
    assert_relative_eq!(positions[&Body::Sun].speed_longitude, 1.019, epsilon = 0.005);
    assert!((11.5..15.5).contains(&positions[&Body::Moon].speed_longitude));
}

#[test]
fn test_sun_in_capricorn_in_january() {
    let astro = analytic();
    // apparent solar longitude on 2026-01-09 12:00 UTC is about 289.2°
    let sun = astro.position(Body::Sun, &instant()).unwrap();
    assert!((sun.longitude - 289.2).abs() < 0.3, "{}", sun.longitude);
    assert!(sun.latitude.abs() < 0.01);
    assert_relative_eq!(sun.distance, 0.9834, epsilon = 2e-3);
}

#[test]
fn test_rahu_kethu_are_opposite() {
    let ephem = AnalyticEphemeris::new();
    for mode in [NodeMode::True, NodeMode::Mean] {
        let config = PositionConfig::default().with_node_mode(mode);
        for year in [1950, 2000, 2026, 2049] {
            let epoch = Epoch::from_gregorian_utc_at_midnight(year, 5, 17);
            let rahu = position_with_config(&ephem, Body::Rahu, &epoch, &config).unwrap();
            let kethu = position_with_config(&ephem, Body::Kethu, &epoch, &config).unwrap();
            assert_relative_eq!(
                angle_difference(kethu.longitude, rahu.longitude).abs(),
                180.0,
                epsilon = 1e-9
            );
            assert_eq!(rahu.latitude, 0.0);
            assert_eq!(kethu.latitude, 0.0);
            assert_relative_eq!(kethu.speed_longitude, rahu.speed_longitude, epsilon = 1e-9);
            // the nodes regress on average
            if mode == NodeMode::Mean {
                assert!(rahu.speed_longitude < 0.0);
            }
        }
    }
}

#[test]
fn test_instant_time_scale_is_irrelevant() {
    let astro = analytic();
    let utc = instant();
    let tai = utc.to_time_scale(TimeScale::TAI);
    let tdb = utc.to_time_scale(TimeScale::TDB);
    let reference = astro.position(Body::Mars, &utc).unwrap();
    for other in [tai, tdb] {
        let state = astro.position(Body::Mars, &other).unwrap();
        assert_relative_eq!(state.longitude, reference.longitude, epsilon = 1e-9);
    }
}

#[test]
fn test_geometric_and_apparent_speeds_match() {
    let ephem = AnalyticEphemeris::new();
    let geometric = PositionConfig::default().with_correction(Correction::Geometric);
    for body in [Body::Sun, Body::Venus, Body::Jupiter] {
        let apparent =
            position_with_config(&ephem, body, &instant(), &PositionConfig::default()).unwrap();
        let geo = position_with_config(&ephem, body, &instant(), &geometric).unwrap();
        assert_eq!(apparent.speed_longitude, geo.speed_longitude);
        assert!(angle_difference(apparent.longitude, geo.longitude).abs() < 0.02);
    }
}

#[test]
fn test_parsed_body_names() {
    let astro = analytic();
    let ketu: Body = "ketu".parse().unwrap();
    assert_eq!(ketu, Body::Kethu);
    assert!(astro.position(ketu, &instant()).is_ok());
    assert_eq!(
        "Uranus".parse::<Body>(),
        Err(NdastroError::UnsupportedBody("Uranus".to_string()))
    );
}

#[test]
fn test_outside_ephemeris_span() {
    let astro = analytic();
    let (start, end) = astro.valid_span().unwrap();
    assert!(start < instant() && instant() < end);

    let far = Epoch::from_gregorian_utc_at_midnight(1750, 1, 1);
    match astro.position(Body::Jupiter, &far) {
        Err(NdastroError::EphemerisRange { instant, .. }) => assert_eq!(instant, far),
        other => panic!("expected EphemerisRange, got {other:?}"),
    }
}
