//! Built-in low-precision ephemeris: no kernel file needed.
//!
//! Planets (and the Earth-Moon barycenter) follow mean Keplerian orbits
//! ([`planets`]), the Moon a truncated lunar series ([`moon`]). The Earth is
//! placed from the barycenter with the Earth/Moon mass ratio. Accuracy is at
//! the arcminute level, which is enough for rise/set instants to a few
//! seconds and retrograde stations to a fraction of a day.
use hifitime::Epoch;

use nalgebra::Vector3;

use crate::{
    bodies::Body,
    constants::{AU, DAYS_PER_JULIAN_CENTURY, EARTH_MOON_MASS_RATIO, T2000},
    ndastro_errors::NdastroError,
    ref_system::{rotpn, RefEpoch, RefSystem},
    time::mjd_tt,
};

use super::{to_ecliptic_of_date, Ephemeris, StateVector};

use planets::{heliocentric_state, Planet};

pub(crate) mod moon;
pub(crate) mod planets;

/// Half step, in days, of the central difference used for the lunar velocity.
const MOON_HALF_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

fn centuries(mjd_tt: f64) -> f64 {
    (mjd_tt - T2000) / DAYS_PER_JULIAN_CENTURY
}

impl AnalyticEphemeris {
    pub fn new() -> Self {
        AnalyticEphemeris
    }

    /// Geocentric Moon in AU and AU/day, expressed in `frame(date)`.
    fn moon_state(&self, mjd_tt: f64, frame: impl Fn(f64) -> RefSystem) -> StateVector {
        let at = |date: f64| -> Vector3<f64> {
            let mean_of_date = RefSystem::Eclm(RefEpoch::Epoch(date));
            rotpn(&mean_of_date, &frame(date)) * moon::geocentric_position(centuries(date)) / AU
        };

        StateVector {
            position: at(mjd_tt),
            velocity: (at(mjd_tt + MOON_HALF_STEP) - at(mjd_tt - MOON_HALF_STEP))
                / (2.0 * MOON_HALF_STEP),
        }
    }

    /// Heliocentric Earth in the mean ecliptic of J2000.
    fn earth_heliocentric(&self, mjd_tt: f64) -> StateVector {
        let (emb_position, emb_velocity) =
            heliocentric_state(Planet::EarthMoonBarycenter, centuries(mjd_tt));
        let moon = self.moon_state(mjd_tt, |_| RefSystem::Eclm(RefEpoch::J2000));
        let moon_share = 1.0 / (1.0 + EARTH_MOON_MASS_RATIO);

        StateVector {
            position: emb_position - moon.position * moon_share,
            velocity: emb_velocity - moon.velocity * moon_share,
        }
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn geocentric_state(&self, body: Body, epoch: &Epoch) -> Result<StateVector, NdastroError> {
        let planet = match body {
            Body::Sun => None,
            Body::Moon => {
                self.check_span(epoch)?;
                return Ok(self.moon_state(mjd_tt(epoch), |date| {
                    RefSystem::Eclt(RefEpoch::Epoch(date))
                }));
            }
            Body::Mercury => Some(Planet::Mercury),
            Body::Venus => Some(Planet::Venus),
            Body::Mars => Some(Planet::Mars),
            Body::Jupiter => Some(Planet::Jupiter),
            Body::Saturn => Some(Planet::Saturn),
            Body::Rahu | Body::Kethu => {
                return Err(NdastroError::UnsupportedBody(format!(
                    "{body} has no ephemeris of its own"
                )))
            }
        };
        self.check_span(epoch)?;

        let date = mjd_tt(epoch);
        let earth = self.earth_heliocentric(date);
        let (position, velocity) = match planet {
            None => (-earth.position, -earth.velocity),
            Some(planet) => {
                let (p, v) = heliocentric_state(planet, centuries(date));
                (p - earth.position, v - earth.velocity)
            }
        };

        Ok(to_ecliptic_of_date(
            &RefSystem::Eclm(RefEpoch::J2000),
            date,
            position,
            velocity,
        ))
    }

    /// 1800-01-01 to 2050-12-31, the fit interval of the planetary elements.
    fn valid_span(&self) -> (Epoch, Epoch) {
        (
            Epoch::from_gregorian_utc_at_midnight(1800, 1, 1),
            Epoch::from_gregorian_utc_at_midnight(2050, 12, 31),
        )
    }
}
