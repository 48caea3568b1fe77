//! Access to the geocentric states of the supported bodies.
//!
//! Two back-ends sit behind the [`Ephemeris`] trait:
//!
//! * [`NaifData`]: a JPL DE kernel in NAIF SPK format (`.bsp`),
//! * [`AnalyticEphemeris`]: Keplerian planets and a truncated lunar series,
//!   usable offline at the arcminute level.
//!
//! [`JPLEphem`] dispatches between them and is what the [`crate::ndastro::Ndastro`]
//! façade loads from an ephemeris source string such as `"naif:DE440"`.
//!
//! Every state handed out by this module is expressed in the **true ecliptic
//! and equinox of date**, in AU and AU/day.
use hifitime::Epoch;
use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::{
    bodies::Body,
    constants::Degree,
    ndastro_errors::NdastroError,
    observers::GeoLocation,
    ref_system::{rotpn, RefEpoch, RefSystem},
    time::{mjd_tt, to_utc},
};

use analytic::AnalyticEphemeris;
use download_jpl_file::{EphemFilePath, EphemFileSource};
use naif::naif_data::NaifData;

pub mod analytic;
pub mod download_jpl_file;
pub mod naif;

/// Half step, in days, of the central difference used to differentiate
/// frame rotations.
const ROTATION_HALF_STEP: f64 = 0.5;

/// Position (AU) and velocity (AU/day) of a body relative to the geocenter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }
}

pub trait Ephemeris: Send + Sync {
    /// Geocentric geometric state of `body` at `epoch`, in the true ecliptic
    /// and equinox of date (AU, AU/day).
    ///
    /// The lunar nodes have no ephemeris of their own and fail with
    /// [`NdastroError::UnsupportedBody`].
    fn geocentric_state(&self, body: Body, epoch: &Epoch) -> Result<StateVector, NdastroError>;

    /// First and last instant this ephemeris can be evaluated at.
    fn valid_span(&self) -> (Epoch, Epoch);

    /// Fail with [`NdastroError::EphemerisRange`] when `epoch` lies outside
    /// [`Ephemeris::valid_span`].
    fn check_span(&self, epoch: &Epoch) -> Result<(), NdastroError> {
        let (start, end) = self.valid_span();
        if *epoch < start || *epoch > end {
            return Err(NdastroError::EphemerisRange {
                instant: to_utc(epoch),
                start: to_utc(&start),
                end: to_utc(&end),
            });
        }
        Ok(())
    }

    /// Geometric altitude of `body` above the astronomical horizon of
    /// `location`, in degrees, without refraction.
    fn topocentric_altitude(
        &self,
        body: Body,
        location: &GeoLocation,
        epoch: &Epoch,
    ) -> Result<Degree, NdastroError> {
        let state = self.geocentric_state(body, epoch)?;
        let date = RefEpoch::Epoch(mjd_tt(epoch));
        let equatorial = rotpn(&RefSystem::Eclt(date), &RefSystem::Equt(date)) * state.position;
        Ok(location.altitude_of(&equatorial, epoch))
    }
}

/// Re-express a state given in a fixed frame into the true ecliptic and
/// equinox of date.
///
/// The target frame turns slowly with respect to `source`, so the velocity
/// picks up the `Ṙ·r` term: `v′ = R·v + Ṙ·r`. `Ṙ` comes from a central
/// difference of the rotation over ±[`ROTATION_HALF_STEP`] days.
pub(crate) fn to_ecliptic_of_date(
    source: &RefSystem,
    mjd_tt: f64,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
) -> StateVector {
    let rotation_at =
        |date: f64| -> Matrix3<f64> { rotpn(source, &RefSystem::Eclt(RefEpoch::Epoch(date))) };

    let rot = rotation_at(mjd_tt);
    let rot_dot = (rotation_at(mjd_tt + ROTATION_HALF_STEP)
        - rotation_at(mjd_tt - ROTATION_HALF_STEP))
        / (2.0 * ROTATION_HALF_STEP);

    StateVector {
        position: rot * position,
        velocity: rot * velocity + rot_dot * position,
    }
}

#[derive(Debug, Clone)]
pub enum JPLEphem {
    NaifFile(NaifData),
    Analytic(AnalyticEphemeris),
}

impl JPLEphem {
    pub fn new(file_source: &EphemFileSource) -> Result<Self, NdastroError> {
        match file_source {
            EphemFileSource::Analytic => {
                debug!("Using the analytic ephemeris");
                Ok(JPLEphem::Analytic(AnalyticEphemeris::new()))
            }
            _ => {
                let file_path = EphemFilePath::get_ephemeris_file(file_source)?;
                let naif_data = NaifData::read_naif_file(file_path.path())?;
                Ok(JPLEphem::NaifFile(naif_data))
            }
        }
    }
}

impl Ephemeris for JPLEphem {
    fn geocentric_state(&self, body: Body, epoch: &Epoch) -> Result<StateVector, NdastroError> {
        match self {
            JPLEphem::NaifFile(naif_data) => naif_data.geocentric_state(body, epoch),
            JPLEphem::Analytic(analytic) => analytic.geocentric_state(body, epoch),
        }
    }

    fn valid_span(&self) -> (Epoch, Epoch) {
        match self {
            JPLEphem::NaifFile(naif_data) => naif_data.valid_span(),
            JPLEphem::Analytic(analytic) => analytic.valid_span(),
        }
    }
}
