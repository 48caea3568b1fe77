//! # Observer site geometry
//!
//! A [`GeoLocation`] stores a WGS84 geodetic site (latitude, longitude,
//! elevation) together with its **geocentric parallax constants**
//! (ρ·cosφ′, ρ·sinφ′), computed once at construction.
//!
//! ## Frames & conventions
//!
//! ```text
//! Body-fixed  --R3(−GAST)-->  True equator of date  --rotpn-->  True ecliptic of date
//! ```
//!
//! * Longitudes are **degrees east** of Greenwich, normalised to [−180, 180].
//! * Parallax constants are in **Earth radii**; positions are in **AU**
//!   (scaled by [`ERAU`]).
//! * Sidereal time uses UTC as a stand-in for UT1.
//!
//! ## Horizontal altitude
//!
//! [`GeoLocation::altitude_of`] turns a geocentric vector in the true equator
//! of date into the geometric altitude above the observer's astronomical
//! horizon, after removing the observer's own offset from the geocentre
//! (diurnal parallax):
//!
//! ```text
//! sin h = sin φ · sin δ + cos φ · cos δ · cos H,      H = LST − α
//! ```
use hifitime::Epoch;
use nalgebra::Vector3;

use crate::constants::{Degree, Meter, Radian, DPI, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, ERAU};
use crate::earth_orientation::equequ;
use crate::ndastro_errors::NdastroError;
use crate::ref_system::{cartesian_to_radec, rotmt};
use crate::spherical::normalize_longitude_pm180;
use crate::time::{gmst, mjd_tt, mjd_utc, to_utc};

/// Geographic location of an observer on the WGS84 ellipsoid.
///
/// Immutable once built: use [`GeoLocation::new`] or
/// [`GeoLocation::with_elevation`], which validate the inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    latitude: Degree,
    longitude: Degree,
    elevation: Meter,
    rho_cos_phi: f64,
    rho_sin_phi: f64,
}

impl GeoLocation {
    /// Build a sea-level location.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: geodetic latitude in **degrees**, within [−90, 90].
    /// * `longitude`: geodetic longitude in **degrees** east; any finite value,
    ///   normalised to [−180, 180].
    ///
    /// Errors
    /// ----------
    /// * [`NdastroError::InvalidGeoLocation`] for a NaN/infinite input or a
    ///   latitude out of range.
    pub fn new(latitude: Degree, longitude: Degree) -> Result<Self, NdastroError> {
        Self::with_elevation(latitude, longitude, 0.0)
    }

    /// Build a location with an elevation above the ellipsoid, in **meters**.
    pub fn with_elevation(
        latitude: Degree,
        longitude: Degree,
        elevation: Meter,
    ) -> Result<Self, NdastroError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(NdastroError::InvalidGeoLocation(format!(
                "latitude must be a finite value in [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() {
            return Err(NdastroError::InvalidGeoLocation(format!(
                "longitude must be finite, got {longitude}"
            )));
        }
        if !elevation.is_finite() {
            return Err(NdastroError::InvalidGeoLocation(format!(
                "elevation must be finite, got {elevation}"
            )));
        }

        let (rho_cos_phi, rho_sin_phi) = geodetic_to_parallax(latitude, elevation);
        Ok(GeoLocation {
            latitude,
            longitude: normalize_longitude_pm180(longitude),
            elevation,
            rho_cos_phi,
            rho_sin_phi,
        })
    }

    pub fn latitude(&self) -> Degree {
        self.latitude
    }

    pub fn longitude(&self) -> Degree {
        self.longitude
    }

    pub fn elevation(&self) -> Meter {
        self.elevation
    }

    /// Geocentric parallax constants (ρ·cosφ′, ρ·sinφ′) in Earth radii.
    pub fn parallax(&self) -> (f64, f64) {
        (self.rho_cos_phi, self.rho_sin_phi)
    }

    /// Get the fixed position of the observer in the Earth-fixed frame, in **AU**.
    pub fn body_fixed_coord(&self) -> Vector3<f64> {
        let lon_radians = self.longitude.to_radians();

        Vector3::new(
            ERAU * self.rho_cos_phi * lon_radians.cos(),
            ERAU * self.rho_cos_phi * lon_radians.sin(),
            ERAU * self.rho_sin_phi,
        )
    }

    /// Local apparent sidereal time at `epoch`, in radians within [0, 2π).
    pub fn local_sidereal_time(&self, epoch: &Epoch) -> Radian {
        (greenwich_apparent_sidereal_time(epoch) + self.longitude.to_radians()).rem_euclid(DPI)
    }

    /// Geocentric position of the observer in the true equator and equinox
    /// of date, in **AU**.
    pub fn geocentric_position(&self, epoch: &Epoch) -> Vector3<f64> {
        let gast = greenwich_apparent_sidereal_time(epoch);
        rotmt(-gast, 2) * self.body_fixed_coord()
    }

    /// Geometric altitude of a target seen from this location.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: geocentric position of the target in the **true equator and
    ///   equinox of date**, in AU.
    /// * `epoch`: instant of the observation.
    ///
    /// Return
    /// ----------
    /// * Altitude above the astronomical horizon in **degrees**, without
    ///   refraction.
    pub fn altitude_of(&self, target: &Vector3<f64>, epoch: &Epoch) -> Degree {
        let topocentric = target - self.geocentric_position(epoch);
        let (ra, dec, _) = cartesian_to_radec(topocentric);

        let hour_angle = self.local_sidereal_time(epoch) - ra;
        let phi = self.latitude.to_radians();

        let sin_alt = phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos();
        sin_alt.clamp(-1.0, 1.0).asin().to_degrees()
    }
}

/// Greenwich apparent sidereal time (GMST + equation of the equinoxes), in radians.
pub fn greenwich_apparent_sidereal_time(epoch: &Epoch) -> Radian {
    let utc = to_utc(epoch);
    (gmst(mjd_utc(&utc)) + equequ(mjd_tt(&utc))).rem_euclid(DPI)
}

/// Convert geodetic latitude and height into normalized parallax coordinates
/// on the Earth.
///
/// Arguments
/// ---------
/// * `lat`: geodetic latitude of the observer in **radians**.
/// * `height`: height above the reference ellipsoid in **meters**.
///
/// Returns
/// --------
/// * `(rho_cos_phi, rho_sin_phi)`: the projections of the geocentric radius on
///   the equatorial plane and on the polar axis, normalized to the Earth's
///   equatorial radius.
///
/// The ellipsoid flattening is handled through the parametric latitude
/// `u = atan((b/a)·tan φ)`.
pub fn lat_alt_to_parallax(lat: Radian, height: Meter) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // parametric latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Same as [`lat_alt_to_parallax`] with the latitude in **degrees**.
pub fn geodetic_to_parallax(lat: Degree, height: Meter) -> (f64, f64) {
    lat_alt_to_parallax(lat.to_radians(), height)
}
