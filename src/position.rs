//! Tropical ecliptic positions of the supported bodies.
//!
//! Every position is referred to the true ecliptic and equinox of date. The
//! sidereal correction is applied separately with
//! [`crate::ayanamsa::sidereal_longitude`].
//!
//! # Apparent place
//! With [`Correction::Apparent`] (the default) the geometric state is
//! corrected for:
//!
//! * **light-time**: the body is taken where it was `τ = r / c` ago, using its
//!   heliocentric motion. For the Moon its geocentric motion is used instead.
//! * **annual aberration**, in the simplified form
//!   `Δλ = −κ·cos(⊙ − λ) / cos β`, `Δβ = −κ·sin β·sin(⊙ − λ)`, with `⊙` the
//!   geometric longitude of the Sun and `κ` = 20.49552″. The Moon moves with
//!   the Earth and is not aberrated.
//!
//! Speeds stay geometric.
//!
//! # Lunar nodes
//! Rahu is the ascending node of the lunar orbit, either the osculating
//! ("true") node `n = ẑ × (r × v)` or the mean node polynomial. Kethu is
//! the opposite point, computed from `−n`.
use std::collections::BTreeMap;

use hifitime::Epoch;
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::Body,
    constants::{Degree, ABERRATION_CONSTANT, DAYS_PER_JULIAN_CENTURY, DPI, LIGHT_TIME_PER_AU, SIDEREAL_RATE},
    jpl_ephem::{Ephemeris, StateVector},
    ndastro_errors::NdastroError,
    observers::GeoLocation,
    ref_system::{rotpn, RefEpoch, RefSystem},
    spherical::{angle_difference, normalize_degree, EclipticState},
    time::{add_days, julian_centuries_tt, mjd_tt, to_utc},
};

/// Which definition of the lunar nodes to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeMode {
    /// Osculating node of the Moon's instantaneous orbit.
    #[default]
    True,
    /// Mean node polynomial.
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Correction {
    /// Light-time and annual aberration applied.
    #[default]
    Apparent,
    Geometric,
}

/// Knobs of the position engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    pub node_mode: NodeMode,
    pub correction: Correction,
    /// Half step of the central difference giving the true node speed, in days.
    pub node_step_days: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        PositionConfig {
            node_mode: NodeMode::True,
            correction: Correction::Apparent,
            node_step_days: 0.5,
        }
    }
}

impl PositionConfig {
    pub fn with_node_mode(mut self, node_mode: NodeMode) -> Self {
        self.node_mode = node_mode;
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_node_step_days(mut self, node_step_days: f64) -> Self {
        self.node_step_days = node_step_days;
        self
    }

    pub fn validate(&self) -> Result<(), NdastroError> {
        if !(self.node_step_days.is_finite() && self.node_step_days > 0.0) {
            return Err(NdastroError::InvalidConfiguration(format!(
                "node_step_days must be a positive number, got {}",
                self.node_step_days
            )));
        }
        Ok(())
    }
}

/// Tropical geocentric position of `body` at `instant`, with the default
/// configuration (apparent place, true nodes).
pub fn position(
    ephem: &dyn Ephemeris,
    body: Body,
    instant: &Epoch,
) -> Result<EclipticState, NdastroError> {
    position_with_config(ephem, body, instant, &PositionConfig::default())
}

/// Tropical geocentric position of `body` at `instant`.
///
/// Arguments
/// ---------
/// * `ephem`: source of geocentric states.
/// * `body`: any supported body, including the lunar nodes.
/// * `instant`: any epoch; it is pinned to UTC first.
/// * `config`: node definition and apparent-place switch.
///
/// Return
/// ------
/// * The ecliptic state with longitude in [0, 360) and speeds per day.
/// * [`NdastroError::EphemerisRange`] outside the ephemeris coverage.
pub fn position_with_config(
    ephem: &dyn Ephemeris,
    body: Body,
    instant: &Epoch,
    config: &PositionConfig,
) -> Result<EclipticState, NdastroError> {
    config.validate()?;
    let epoch = to_utc(instant);

    match body {
        Body::Rahu => lunar_node(ephem, &epoch, config, false),
        Body::Kethu => lunar_node(ephem, &epoch, config, true),
        _ => {
            let state = ephem.geocentric_state(body, &epoch)?;
            observed_state(ephem, body, &epoch, state, config)
        }
    }
}

/// Positions of every supported body at `instant`.
pub fn all_positions(
    ephem: &dyn Ephemeris,
    instant: &Epoch,
    config: &PositionConfig,
) -> Result<BTreeMap<Body, EclipticState>, NdastroError> {
    Body::ALL
        .iter()
        .map(|body| Ok((*body, position_with_config(ephem, *body, instant, config)?)))
        .collect()
}

/// Tropical position of `body` as seen from `location` rather than from the
/// geocenter.
///
/// The observer's position and rotational velocity are removed from the
/// geocentric state before the apparent-place corrections. The lunar nodes
/// are points of the geocentric lunar orbit: their position does not depend
/// on the observer.
pub fn topocentric_position(
    ephem: &dyn Ephemeris,
    body: Body,
    location: &GeoLocation,
    instant: &Epoch,
    config: &PositionConfig,
) -> Result<EclipticState, NdastroError> {
    if body.is_node() {
        return position_with_config(ephem, body, instant, config);
    }
    config.validate()?;
    let epoch = to_utc(instant);

    let geocentric = ephem.geocentric_state(body, &epoch)?;
    let observer = observer_state(location, &epoch);
    let topocentric = StateVector::new(
        geocentric.position - observer.position,
        geocentric.velocity - observer.velocity,
    );
    observed_state(ephem, body, &epoch, topocentric, config)
}

/// Observer position (AU) and velocity (AU/day) in the true ecliptic of date.
fn observer_state(location: &GeoLocation, epoch: &Epoch) -> StateVector {
    let date = RefEpoch::Epoch(mjd_tt(epoch));
    let to_ecliptic = rotpn(&RefSystem::Equt(date), &RefSystem::Eclt(date));

    let position = location.geocentric_position(epoch);
    let omega = DPI * SIDEREAL_RATE;
    let velocity = Vector3::new(-omega * position.y, omega * position.x, 0.0);

    StateVector::new(to_ecliptic * position, to_ecliptic * velocity)
}

/// Turn a geometric state into the requested place.
fn observed_state(
    ephem: &dyn Ephemeris,
    body: Body,
    epoch: &Epoch,
    state: StateVector,
    config: &PositionConfig,
) -> Result<EclipticState, NdastroError> {
    let geometric = EclipticState::from_cartesian(&state.position, &state.velocity);
    if config.correction == Correction::Geometric {
        return Ok(geometric);
    }

    let light_time = LIGHT_TIME_PER_AU * state.position.norm();

    if body == Body::Moon {
        let retarded = state.position - state.velocity * light_time;
        return Ok(relocate(geometric, &retarded));
    }

    let sun = if body == Body::Sun {
        state
    } else {
        ephem.geocentric_state(Body::Sun, epoch)?
    };
    // the Sun's geocentric velocity is minus the Earth's heliocentric one
    let heliocentric_velocity = state.velocity - sun.velocity;
    let retarded = state.position - heliocentric_velocity * light_time;

    let sun_longitude = sun.position.y.atan2(sun.position.x);
    Ok(aberrate(relocate(geometric, &retarded), sun_longitude))
}

/// Move `state` to the place of `position`, keeping its rates.
fn relocate(state: EclipticState, position: &Vector3<f64>) -> EclipticState {
    let place = EclipticState::from_cartesian(position, &Vector3::zeros());
    EclipticState {
        longitude: place.longitude,
        latitude: place.latitude,
        distance: place.distance,
        ..state
    }
}

/// Annual aberration in ecliptic coordinates.
fn aberrate(state: EclipticState, sun_longitude: f64) -> EclipticState {
    let kappa = ABERRATION_CONSTANT / 3600.0;
    let lambda = state.longitude.to_radians();
    let beta = state.latitude.to_radians();
    let elongation = sun_longitude - lambda;

    let d_lambda = -kappa * elongation.cos() / beta.cos();
    let d_beta = -kappa * beta.sin() * elongation.sin();

    EclipticState {
        longitude: normalize_degree(state.longitude + d_lambda),
        latitude: state.latitude + d_beta,
        ..state
    }
}

/// Ecliptic longitude of the ascending (or descending) node at `epoch`.
fn node_longitude(
    ephem: &dyn Ephemeris,
    epoch: &Epoch,
    mode: NodeMode,
    descending: bool,
) -> Result<Degree, NdastroError> {
    let ascending = match mode {
        NodeMode::Mean => {
            ephem.check_span(epoch)?;
            mean_node(julian_centuries_tt(epoch)).0
        }
        NodeMode::True => {
            let moon = ephem.geocentric_state(Body::Moon, epoch)?;
            let momentum = moon.position.cross(&moon.velocity);
            let node = Vector3::z().cross(&momentum);
            let node = if descending { -node } else { node };
            return Ok(normalize_degree(node.y.atan2(node.x).to_degrees()));
        }
    };
    Ok(if descending {
        normalize_degree(ascending + 180.0)
    } else {
        ascending
    })
}

/// Rahu or Kethu. A node lies on the ecliptic by definition, so its
/// latitude and latitude speed are zero; it has no distance either.
fn lunar_node(
    ephem: &dyn Ephemeris,
    epoch: &Epoch,
    config: &PositionConfig,
    descending: bool,
) -> Result<EclipticState, NdastroError> {
    let longitude = node_longitude(ephem, epoch, config.node_mode, descending)?;

    let speed_longitude = match config.node_mode {
        NodeMode::Mean => mean_node(julian_centuries_tt(epoch)).1,
        NodeMode::True => {
            let step = config.node_step_days;
            let ahead = node_longitude(ephem, &add_days(epoch, step), NodeMode::True, descending)?;
            let behind = node_longitude(ephem, &add_days(epoch, -step), NodeMode::True, descending)?;
            angle_difference(ahead, behind) / (2.0 * step)
        }
    };
    trace!("Lunar node at {epoch}: λ = {longitude:.6}°, dλ/dt = {speed_longitude:.6}°/d");

    Ok(EclipticState {
        longitude,
        latitude: 0.0,
        distance: 0.0,
        speed_longitude,
        speed_latitude: 0.0,
        speed_distance: 0.0,
    })
}

/// Mean longitude of the ascending node (degrees, [0, 360)) and its rate
/// (degrees/day), `t` in Julian centuries of TT since J2000.0.
pub fn mean_node(t: f64) -> (Degree, Degree) {
    let longitude = 125.044_547_9 - 1_934.136_289_1 * t + 0.002_075_4 * t.powi(2)
        + t.powi(3) / 467_441.0
        - t.powi(4) / 60_616_000.0;
    let rate = -1_934.136_289_1 + 2.0 * 0.002_075_4 * t + 3.0 * t.powi(2) / 467_441.0
        - 4.0 * t.powi(3) / 60_616_000.0;
    (normalize_degree(longitude), rate / DAYS_PER_JULIAN_CENTURY)
}

#[cfg(test)]
mod position_test {
    use super::*;
    use crate::jpl_ephem::analytic::AnalyticEphemeris;
    use approx::assert_relative_eq;

    fn epoch() -> Epoch {
        Epoch::from_gregorian_utc_hms(2026, 1, 9, 12, 0, 0)
    }

    #[test]
    fn test_longitude_range_all_bodies() {
        let ephem = AnalyticEphemeris::new();
        let positions = all_positions(&ephem, &epoch(), &PositionConfig::default()).unwrap();
        assert_eq!(positions.len(), 9);
        for (body, state) in positions {
            assert!((0.0..360.0).contains(&state.longitude), "{body}: {state}");
            assert!(state.latitude.abs() <= 90.0);
        }
    }

    #[test]
    fn test_nodes_are_opposite() {
        let ephem = AnalyticEphemeris::new();
        for mode in [NodeMode::True, NodeMode::Mean] {
            let config = PositionConfig::default().with_node_mode(mode);
            let rahu = position_with_config(&ephem, Body::Rahu, &epoch(), &config).unwrap();
            let kethu = position_with_config(&ephem, Body::Kethu, &epoch(), &config).unwrap();
            assert_relative_eq!(
                angle_difference(kethu.longitude, rahu.longitude).abs(),
                180.0,
                epsilon = 1e-9
            );
            for node in [rahu, kethu] {
                assert_eq!(node.latitude, 0.0);
                assert_eq!(node.speed_latitude, 0.0);
                assert_eq!(node.distance, 0.0);
            }
            assert_relative_eq!(kethu.speed_longitude, rahu.speed_longitude, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_true_node_follows_mean_node() {
        let ephem = AnalyticEphemeris::new();
        let true_node = position(&ephem, Body::Rahu, &epoch()).unwrap();
        let (mean, rate) = mean_node(julian_centuries_tt(&epoch()));
        // the osculating node swings less than 2° around the mean one
        assert!(angle_difference(true_node.longitude, mean).abs() < 2.0);
        assert_relative_eq!(rate, -0.0529538, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_node_at_j2000() {
        let (longitude, _) = mean_node(0.0);
        assert_relative_eq!(longitude, 125.0445479, epsilon = 1e-10);
    }

    #[test]
    fn test_apparent_sun_lags_geometric() {
        let ephem = AnalyticEphemeris::new();
        let geometric = PositionConfig::default().with_correction(Correction::Geometric);
        let apparent = position(&ephem, Body::Sun, &epoch()).unwrap();
        let geo = position_with_config(&ephem, Body::Sun, &epoch(), &geometric).unwrap();
        let lag = angle_difference(geo.longitude, apparent.longitude) * 3600.0;
        assert_relative_eq!(lag, 20.5, epsilon = 0.5);
        assert_eq!(apparent.speed_longitude, geo.speed_longitude);
    }

    #[test]
    fn test_apparent_correction_is_small() {
        let ephem = AnalyticEphemeris::new();
        let geometric = PositionConfig::default().with_correction(Correction::Geometric);
        for body in [Body::Moon, Body::Mercury, Body::Mars, Body::Saturn] {
            let apparent = position(&ephem, body, &epoch()).unwrap();
            let geo = position_with_config(&ephem, body, &epoch(), &geometric).unwrap();
            let shift = angle_difference(geo.longitude, apparent.longitude).abs() * 3600.0;
            assert!(shift < 120.0, "{body}: {shift}″");
        }
    }

    #[test]
    fn test_apparent_keeps_geometric_speeds() {
        let ephem = AnalyticEphemeris::new();
        let geometric = PositionConfig::default().with_correction(Correction::Geometric);
        for body in [Body::Moon, Body::Venus, Body::Mars, Body::Jupiter] {
            let apparent = position(&ephem, body, &epoch()).unwrap();
            let geo = position_with_config(&ephem, body, &epoch(), &geometric).unwrap();
            assert_eq!(apparent.speed_longitude, geo.speed_longitude, "{body}");
            assert_eq!(apparent.speed_latitude, geo.speed_latitude, "{body}");
            assert_eq!(apparent.speed_distance, geo.speed_distance, "{body}");
            assert_ne!(apparent.longitude, geo.longitude, "{body}");
        }
    }

    #[test]
    fn test_topocentric_moon_parallax() {
        let ephem = AnalyticEphemeris::new();
        let config = PositionConfig::default();
        let location = GeoLocation::with_elevation(12.97, 77.59, 914.0).unwrap();
        let geo = position(&ephem, Body::Moon, &epoch()).unwrap();
        let topo = topocentric_position(&ephem, Body::Moon, &location, &epoch(), &config).unwrap();

        let separation = angle_difference(geo.longitude, topo.longitude).abs()
            + (geo.latitude - topo.latitude).abs();
        // lunar horizontal parallax is at most ~1°
        assert!(separation < 1.1);
        assert!((topo.distance - geo.distance).abs() < 5e-5);

        let sun_geo = position(&ephem, Body::Sun, &epoch()).unwrap();
        let sun_topo = topocentric_position(&ephem, Body::Sun, &location, &epoch(), &config).unwrap();
        assert!(angle_difference(sun_geo.longitude, sun_topo.longitude).abs() < 0.004);

        let rahu = topocentric_position(&ephem, Body::Rahu, &location, &epoch(), &config).unwrap();
        assert_eq!(rahu, position(&ephem, Body::Rahu, &epoch()).unwrap());
    }

    #[test]
    fn test_invalid_config() {
        let ephem = AnalyticEphemeris::new();
        let config = PositionConfig::default().with_node_step_days(0.0);
        assert!(matches!(
            position_with_config(&ephem, Body::Rahu, &epoch(), &config),
            Err(NdastroError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_out_of_range() {
        let ephem = AnalyticEphemeris::new();
        let far = Epoch::from_gregorian_utc_at_midnight(2200, 1, 1);
        for body in Body::ALL {
            assert!(matches!(
                position(&ephem, body, &far),
                Err(NdastroError::EphemerisRange { .. })
            ));
        }
        let mean = PositionConfig::default().with_node_mode(NodeMode::Mean);
        assert!(matches!(
            position_with_config(&ephem, Body::Rahu, &far, &mean),
            Err(NdastroError::EphemerisRange { .. })
        ));
    }

    #[test]
    #[cfg(feature = "jpl-download")]
    fn test_analytic_agrees_with_de440s() {
        use crate::unit_test_global::NDASTRO_NAIF_TEST;

        let ephem = AnalyticEphemeris::new();
        for (body, tolerance) in [
            (Body::Sun, 0.02),
            (Body::Moon, 0.2),
            (Body::Mercury, 0.1),
            (Body::Mars, 0.1),
            (Body::Saturn, 0.3),
        ] {
            let reference = NDASTRO_NAIF_TEST.position(body, &epoch()).unwrap();
            let approx = position(&ephem, body, &epoch()).unwrap();
            let diff = angle_difference(reference.longitude, approx.longitude).abs();
            assert!(diff < tolerance, "{body}: {diff}°");
        }
    }
}
