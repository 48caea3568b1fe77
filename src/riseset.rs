//! Sunrise, sunset and twilight.
//!
//! The Sun's topocentric altitude is compared with a target horizon,
//! `alt(t) = h_sun(t) − h0`. For sunrise/sunset the target is
//! `h0 = −(refraction + semidiameter) − dip` (−0.8333° by default). For
//! twilight it is the depression of the Sun's center, −6°, −12° or −18°.
//!
//! The day is searched for roots of `alt` in two passes:
//!
//! ```text
//!  alt ▲        sunrise                         sunset
//!      │           ↓  ●───●───●───●───●───●───●  ↓
//!    0 ┼───●───●───●─/─────────────────────────\─●───●──▶ t
//!      │  coarse samples every `scan_step_minutes`, then bisection
//! ```
//!
//! 1. a coarse scan over the 24 h window, looking at consecutive samples for
//!    a sign change (− → + is a rising, + → − a setting);
//! 2. a bisection of each bracket down to `tolerance_seconds`.
//!
//! The scan never takes more than `max_scan_samples` samples and the
//! bisection never more than `max_iterations` steps.
//!
//! The window starts at 00:00 UTC of the requested date, or at local mean
//! midnight with [`DayStart::LocalMeanMidnight`].
use std::fmt;

use hifitime::Epoch;
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    bodies::Body,
    constants::{Degree, SECONDS_PER_DAY},
    jpl_ephem::Ephemeris,
    ndastro_errors::NdastroError,
    observers::GeoLocation,
    time::{add_days, to_utc, utc_midnight},
};

const MINUTES_PER_DAY: f64 = 1440.0;

/// Which of the two daily events is missing, carried by
/// [`NdastroError::NoEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiseSetEvent {
    Sunrise,
    Sunset,
    Both,
}

impl fmt::Display for RiseSetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiseSetEvent::Sunrise => f.write_str("sunrise"),
            RiseSetEvent::Sunset => f.write_str("sunset"),
            RiseSetEvent::Both => f.write_str("sunrise or sunset"),
        }
    }
}

/// Where the 24 h search window begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayStart {
    /// 00:00 UTC of the requested date.
    #[default]
    UtcMidnight,
    /// 00:00 UTC shifted by `−longitude / 15` hours.
    LocalMeanMidnight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwilightKind {
    Civil,
    Nautical,
    Astronomical,
}

impl TwilightKind {
    /// Depression of the Sun's center below the horizon, in degrees.
    pub fn depression(self) -> Degree {
        match self {
            TwilightKind::Civil => 6.0,
            TwilightKind::Nautical => 12.0,
            TwilightKind::Astronomical => 18.0,
        }
    }
}

/// Horizon model and root-finder settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiseSetConfig {
    /// Atmospheric refraction at the horizon, in arcminutes.
    pub refraction_arcmin: f64,
    /// Apparent solar semidiameter, in arcminutes.
    pub semidiameter_arcmin: f64,
    /// Extra horizon dip, in degrees (e.g. for an elevated observer).
    pub dip_deg: f64,
    /// Coarse scan step, in minutes.
    pub scan_step_minutes: f64,
    /// Upper bound on the number of altitude samples of the coarse scan;
    /// a step that would need more is rejected.
    pub max_scan_samples: usize,
    /// Bisection stops once the bracket is narrower than this, in seconds.
    pub tolerance_seconds: f64,
    /// Bisection iteration cap.
    pub max_iterations: u32,
    pub day_start: DayStart,
}

impl Default for RiseSetConfig {
    fn default() -> Self {
        RiseSetConfig {
            refraction_arcmin: 34.0,
            semidiameter_arcmin: 16.0,
            dip_deg: 0.0,
            scan_step_minutes: 5.0,
            max_scan_samples: 10_000,
            tolerance_seconds: 0.1,
            max_iterations: 64,
            day_start: DayStart::UtcMidnight,
        }
    }
}

impl RiseSetConfig {
    pub fn with_refraction_arcmin(mut self, refraction_arcmin: f64) -> Self {
        self.refraction_arcmin = refraction_arcmin;
        self
    }

    pub fn with_semidiameter_arcmin(mut self, semidiameter_arcmin: f64) -> Self {
        self.semidiameter_arcmin = semidiameter_arcmin;
        self
    }

    pub fn with_dip_deg(mut self, dip_deg: f64) -> Self {
        self.dip_deg = dip_deg;
        self
    }

    pub fn with_scan_step_minutes(mut self, scan_step_minutes: f64) -> Self {
        self.scan_step_minutes = scan_step_minutes;
        self
    }

    pub fn with_max_scan_samples(mut self, max_scan_samples: usize) -> Self {
        self.max_scan_samples = max_scan_samples;
        self
    }

    pub fn with_tolerance_seconds(mut self, tolerance_seconds: f64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    pub fn with_day_start(mut self, day_start: DayStart) -> Self {
        self.day_start = day_start;
        self
    }

    /// Geometric altitude of the Sun's center at rise and set, in degrees.
    pub fn horizon_altitude(&self) -> Degree {
        -(self.refraction_arcmin + self.semidiameter_arcmin) / 60.0 - self.dip_deg
    }

    pub fn validate(&self) -> Result<(), NdastroError> {
        let checks = [
            ("scan_step_minutes", self.scan_step_minutes, self.scan_step_minutes > 0.0),
            ("tolerance_seconds", self.tolerance_seconds, self.tolerance_seconds > 0.0),
            ("refraction_arcmin", self.refraction_arcmin, true),
            ("semidiameter_arcmin", self.semidiameter_arcmin, true),
            ("dip_deg", self.dip_deg, true),
        ];
        for (name, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(NdastroError::InvalidConfiguration(format!(
                    "{name} must be finite{}, got {value}",
                    if ok { "" } else { " and positive" }
                )));
            }
        }
        if self.scan_step_minutes > MINUTES_PER_DAY {
            return Err(NdastroError::InvalidConfiguration(format!(
                "scan_step_minutes must not exceed one day, got {}",
                self.scan_step_minutes
            )));
        }
        let samples = self.scan_samples();
        if samples > self.max_scan_samples as f64 {
            return Err(NdastroError::InvalidConfiguration(format!(
                "a scan step of {} minutes needs {samples} samples, more than max_scan_samples = {}",
                self.scan_step_minutes, self.max_scan_samples
            )));
        }
        if self.max_iterations == 0 {
            return Err(NdastroError::InvalidConfiguration(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Samples taken over one day, both ends included.
    fn scan_samples(&self) -> f64 {
        (MINUTES_PER_DAY / self.scan_step_minutes).ceil() + 1.0
    }
}

/// Signed distance of the Sun above a target altitude over one day.
struct AltitudeProbe<'a> {
    ephem: &'a dyn Ephemeris,
    location: &'a GeoLocation,
    window_start: Epoch,
    target_altitude: Degree,
}

impl AltitudeProbe<'_> {
    fn excess(&self, day_offset: f64) -> Result<f64, NdastroError> {
        let epoch = add_days(&self.window_start, day_offset);
        Ok(self
            .ephem
            .topocentric_altitude(Body::Sun, self.location, &epoch)?
            - self.target_altitude)
    }

    fn is_up(&self, day_offset: f64) -> Result<bool, NdastroError> {
        Ok(self.excess(day_offset)? >= 0.0)
    }
}

fn bisect_crossing(
    probe: &AltitudeProbe,
    mut t_a: f64,
    mut t_b: f64,
    config: &RiseSetConfig,
) -> Result<f64, NdastroError> {
    let tolerance = config.tolerance_seconds / SECONDS_PER_DAY;
    let up_a = probe.is_up(t_a)?;

    for iteration in 0..config.max_iterations {
        if t_b - t_a < tolerance {
            trace!("Horizon crossing converged after {iteration} iterations");
            break;
        }
        let t_mid = 0.5 * (t_a + t_b);
        if probe.is_up(t_mid)? == up_a {
            t_a = t_mid;
        } else {
            t_b = t_mid;
        }
    }
    Ok(0.5 * (t_a + t_b))
}

/// First rising and first setting across `target_altitude` within the day
/// of `date`.
fn crossings(
    ephem: &dyn Ephemeris,
    location: &GeoLocation,
    date: &Epoch,
    target_altitude: Degree,
    config: &RiseSetConfig,
) -> Result<(Epoch, Epoch), NdastroError> {
    config.validate()?;
    let midnight = utc_midnight(&to_utc(date));
    let window_start = match config.day_start {
        DayStart::UtcMidnight => midnight,
        DayStart::LocalMeanMidnight => add_days(&midnight, -location.longitude() / 360.0),
    };

    let probe = AltitudeProbe {
        ephem,
        location,
        window_start,
        target_altitude,
    };

    // validate() bounds the sample count by max_scan_samples
    let step = config.scan_step_minutes / MINUTES_PER_DAY;
    let n_steps = (1.0 / step).ceil() as usize;
    let samples = (0..=n_steps)
        .map(|i| (i as f64 * step).min(1.0))
        .map(|t| Ok((t, probe.excess(t)?)))
        .collect::<Result<Vec<(f64, f64)>, NdastroError>>()?;

    let mut rise = None;
    let mut set = None;
    for (&(t_a, alt_a), &(t_b, alt_b)) in samples.iter().tuple_windows() {
        match (alt_a >= 0.0, alt_b >= 0.0) {
            (false, true) if rise.is_none() => {
                trace!("Rising bracketed in [{t_a:.6}, {t_b:.6}] d");
                rise = Some(bisect_crossing(&probe, t_a, t_b, config)?);
            }
            (true, false) if set.is_none() => {
                trace!("Setting bracketed in [{t_a:.6}, {t_b:.6}] d");
                set = Some(bisect_crossing(&probe, t_a, t_b, config)?);
            }
            _ => {}
        }
        if rise.is_some() && set.is_some() {
            break;
        }
    }

    let no_event = |which| NdastroError::NoEvent {
        which,
        date: midnight,
        latitude: location.latitude(),
        longitude: location.longitude(),
    };
    match (rise, set) {
        (Some(rise), Some(set)) => Ok((add_days(&window_start, rise), add_days(&window_start, set))),
        (None, Some(_)) => Err(no_event(RiseSetEvent::Sunrise)),
        (Some(_), None) => Err(no_event(RiseSetEvent::Sunset)),
        (None, None) => Err(no_event(RiseSetEvent::Both)),
    }
}

/// Sunrise and sunset (UTC) at `location` on the civil date of `date`.
///
/// Only the calendar date of `date` (in UTC) matters: any time of day gives
/// the same result.
///
/// # Errors
/// * [`NdastroError::NoEvent`] during polar day or night, naming the missing
///   event(s).
/// * [`NdastroError::EphemerisRange`] when the day leaves the ephemeris span.
/// * [`NdastroError::InvalidConfiguration`] for a bad scan step or tolerance.
pub fn sunrise_sunset(
    ephem: &dyn Ephemeris,
    location: &GeoLocation,
    date: &Epoch,
    config: &RiseSetConfig,
) -> Result<(Epoch, Epoch), NdastroError> {
    let (sunrise, sunset) = crossings(ephem, location, date, config.horizon_altitude(), config)?;
    debug!(
        "Sunrise {sunrise}, sunset {sunset} at ({}, {})",
        location.latitude(),
        location.longitude()
    );
    Ok((sunrise, sunset))
}

/// Dawn and dusk (UTC) of the given twilight kind.
///
/// Same search as [`sunrise_sunset`], with the horizon replaced by the
/// twilight depression; the refraction, semidiameter and dip settings of
/// `config` are ignored. A missing dawn is reported as
/// [`RiseSetEvent::Sunrise`], a missing dusk as [`RiseSetEvent::Sunset`].
pub fn twilight(
    ephem: &dyn Ephemeris,
    location: &GeoLocation,
    date: &Epoch,
    kind: TwilightKind,
    config: &RiseSetConfig,
) -> Result<(Epoch, Epoch), NdastroError> {
    crossings(ephem, location, date, -kind.depression(), config)
}

#[cfg(test)]
mod riseset_test {
    use super::*;
    use crate::{jpl_ephem::analytic::AnalyticEphemeris, time::days_between};
    use approx::assert_relative_eq;

    fn hours(from: &Epoch, to: &Epoch) -> f64 {
        days_between(from, to) * 24.0
    }

    #[test]
    fn test_config() {
        let config = RiseSetConfig::default();
        assert_relative_eq!(config.horizon_altitude(), -50.0 / 60.0, epsilon = 1e-12);
        assert!(config.validate().is_ok());
        assert_relative_eq!(
            config.with_dip_deg(0.5).horizon_altitude(),
            -50.0 / 60.0 - 0.5,
            epsilon = 1e-12
        );

        assert!(config.with_scan_step_minutes(0.0).validate().is_err());
        assert!(config.with_scan_step_minutes(2000.0).validate().is_err());
        assert!(config.with_tolerance_seconds(-1.0).validate().is_err());
        assert!(config.with_refraction_arcmin(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_scan_is_bounded() {
        let config = RiseSetConfig::default();
        assert_eq!(config.scan_samples(), 289.0);

        let tiny_step = config.with_scan_step_minutes(1e-9);
        assert!(matches!(
            tiny_step.validate(),
            Err(NdastroError::InvalidConfiguration(_))
        ));
        let ephem = AnalyticEphemeris::new();
        let location = GeoLocation::new(48.85, 2.35).unwrap();
        let date = Epoch::from_gregorian_utc_at_midnight(2026, 3, 20);
        assert!(matches!(
            sunrise_sunset(&ephem, &location, &date, &tiny_step),
            Err(NdastroError::InvalidConfiguration(_))
        ));

        // one sample every 10 s fits the default bound, every second does not
        assert!(config.with_scan_step_minutes(10.0 / 60.0).validate().is_ok());
        assert!(config.with_scan_step_minutes(1.0 / 60.0).validate().is_err());
        assert!(config
            .with_scan_step_minutes(1.0 / 60.0)
            .with_max_scan_samples(100_000)
            .validate()
            .is_ok());
        assert!(config.with_max_scan_samples(100).validate().is_err());
    }

    #[test]
    fn test_bangalore() {
        let ephem = AnalyticEphemeris::new();
        let location = GeoLocation::with_elevation(12.97, 77.59, 914.0).unwrap();
        let date = Epoch::from_gregorian_utc_hms(2026, 1, 5, 15, 30, 0);
        let (sunrise, sunset) =
            sunrise_sunset(&ephem, &location, &date, &RiseSetConfig::default()).unwrap();

        let expected_rise = Epoch::from_gregorian_utc_hms(2026, 1, 5, 1, 13, 9);
        let expected_set = Epoch::from_gregorian_utc_hms(2026, 1, 5, 12, 36, 46);
        assert!(days_between(&expected_rise, &sunrise).abs() * MINUTES_PER_DAY < 2.0);
        assert!(days_between(&expected_set, &sunset).abs() * MINUTES_PER_DAY < 2.0);
    }

    #[test]
    fn test_twilight_ordering() {
        let ephem = AnalyticEphemeris::new();
        let location = GeoLocation::new(48.85, 2.35).unwrap();
        let date = Epoch::from_gregorian_utc_at_midnight(2025, 10, 1);
        let config = RiseSetConfig::default();

        let (sunrise, sunset) = sunrise_sunset(&ephem, &location, &date, &config).unwrap();
        let mut previous = (sunrise, sunset);
        for kind in [TwilightKind::Civil, TwilightKind::Nautical, TwilightKind::Astronomical] {
            let (dawn, dusk) = twilight(&ephem, &location, &date, kind, &config).unwrap();
            assert!(dawn < previous.0, "{kind:?} dawn");
            assert!(dusk > previous.1, "{kind:?} dusk");
            previous = (dawn, dusk);
        }
        // civil twilight lasts about half an hour at this latitude in autumn
        let (civil_dawn, _) = twilight(&ephem, &location, &date, TwilightKind::Civil, &config).unwrap();
        assert!((0.4..0.7).contains(&hours(&civil_dawn, &sunrise)));
    }

    #[test]
    fn test_astronomical_twilight_missing_in_summer() {
        // the Sun never goes 18° below the horizon at 55°N around the June solstice
        let ephem = AnalyticEphemeris::new();
        let location = GeoLocation::new(55.0, 10.0).unwrap();
        let date = Epoch::from_gregorian_utc_at_midnight(2025, 6, 21);
        let result = twilight(
            &ephem,
            &location,
            &date,
            TwilightKind::Astronomical,
            &RiseSetConfig::default(),
        );
        assert_eq!(
            result,
            Err(NdastroError::NoEvent {
                which: RiseSetEvent::Both,
                date,
                latitude: 55.0,
                longitude: 10.0,
            })
        );
    }

    #[test]
    fn test_local_mean_midnight_window() {
        // at 170°W the UTC day starts in the local afternoon: sunset falls
        // before sunrise within it, unlike the local-midnight window
        let ephem = AnalyticEphemeris::new();
        let location = GeoLocation::new(-14.3, -170.7).unwrap();
        let date = Epoch::from_gregorian_utc_at_midnight(2025, 3, 1);

        let utc = RiseSetConfig::default();
        let (rise_utc, set_utc) = sunrise_sunset(&ephem, &location, &date, &utc).unwrap();
        assert!(set_utc < rise_utc);

        let local = utc.with_day_start(DayStart::LocalMeanMidnight);
        let (rise_local, set_local) = sunrise_sunset(&ephem, &location, &date, &local).unwrap();
        assert!(rise_local < set_local);
        assert!((11.5..13.0).contains(&hours(&rise_local, &set_local)));
    }

    #[test]
    fn test_event_display() {
        assert_eq!(RiseSetEvent::Sunrise.to_string(), "sunrise");
        assert_eq!(RiseSetEvent::Both.to_string(), "sunrise or sunset");
    }
}
