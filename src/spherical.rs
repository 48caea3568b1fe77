//! Spherical ecliptic coordinates and angle normalisation.
//!
//! [`EclipticState::from_cartesian`] turns a Cartesian state vector
//! (AU, AU/day) into longitude, latitude and distance together with their
//! time derivatives, using the chain rule on
//!
//! ```text
//! λ = atan2(y, x)         β = atan2(z, √(x² + y²))         r = |r⃗|
//! ```
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{AstronomicalUnit, Degree, DEGREE_MAX, RADEG};

/// Below this squared projected radius (AU²) a vector is treated as lying
/// on the ecliptic pole axis.
const POLE_AXIS_EPS: f64 = 1e-30;

/// Geocentric (or topocentric) ecliptic position of a body with its rates.
///
/// Angles are in degrees, distances in AU, speeds per day. A negative
/// `speed_longitude` means the body is retrograde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticState {
    pub longitude: Degree,
    pub latitude: Degree,
    pub distance: AstronomicalUnit,
    pub speed_longitude: Degree,
    pub speed_latitude: Degree,
    pub speed_distance: AstronomicalUnit,
}

impl EclipticState {
    /// Convert a Cartesian position/velocity pair to spherical ecliptic form.
    ///
    /// Arguments
    /// ---------
    /// * `position`: Cartesian position in AU.
    /// * `velocity`: Cartesian velocity in AU/day.
    ///
    /// Return
    /// ------
    /// * The state with `longitude` in [0, 360). A vector on the pole axis
    ///   (or the zero vector) reports longitude 0 and zero angular speeds.
    pub fn from_cartesian(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Self {
        let (x, y, z) = (position.x, position.y, position.z);
        let (vx, vy, vz) = (velocity.x, velocity.y, velocity.z);

        let rxy2 = x * x + y * y;
        let r2 = rxy2 + z * z;
        let r = r2.sqrt();
        let rxy = rxy2.sqrt();

        let speed_distance = if r > 0.0 { position.dot(velocity) / r } else { 0.0 };

        if rxy2 < POLE_AXIS_EPS {
            let latitude = if z > 0.0 {
                90.0
            } else if z < 0.0 {
                -90.0
            } else {
                0.0
            };
            return EclipticState {
                longitude: 0.0,
                latitude,
                distance: r,
                speed_longitude: 0.0,
                speed_latitude: 0.0,
                speed_distance,
            };
        }

        let longitude = normalize_degree(y.atan2(x) / RADEG);
        let latitude = z.atan2(rxy) / RADEG;

        let dlon = (x * vy - y * vx) / rxy2;
        let dlat = (vz * rxy2 - z * (x * vx + y * vy)) / (r2 * rxy);

        EclipticState {
            longitude,
            latitude,
            distance: r,
            speed_longitude: dlon / RADEG,
            speed_latitude: dlat / RADEG,
            speed_distance,
        }
    }

    /// Whether the body currently moves backward in longitude.
    pub fn is_retrograde(&self) -> bool {
        self.speed_longitude < 0.0
    }
}

impl fmt::Display for EclipticState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ecliptic state")?;
        writeln!(
            f,
            "  λ = {:>12.7}°   dλ/dt = {:>+12.7}°/d",
            self.longitude, self.speed_longitude
        )?;
        writeln!(
            f,
            "  β = {:>12.7}°   dβ/dt = {:>+12.7}°/d",
            self.latitude, self.speed_latitude
        )?;
        write!(
            f,
            "  r = {:>12.9} AU dr/dt = {:>+12.9} AU/d",
            self.distance, self.speed_distance
        )
    }
}

/// Normalise an angle in degrees to [0, 360).
pub fn normalize_degree(angle: Degree) -> Degree {
    let wrapped = angle.rem_euclid(DEGREE_MAX);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= DEGREE_MAX {
        0.0
    } else {
        wrapped
    }
}

/// Normalise an angle in degrees to [−180, 180].
///
/// Values already inside the closed interval are returned untouched, so
/// both −180 and +180 survive as given.
pub fn normalize_longitude_pm180(angle: Degree) -> Degree {
    if (-180.0..=180.0).contains(&angle) {
        return angle;
    }
    let wrapped = normalize_degree(angle);
    if wrapped > 180.0 {
        wrapped - DEGREE_MAX
    } else {
        wrapped
    }
}

/// Signed smallest difference `a − b` in degrees, in (−180, 180].
pub fn angle_difference(a: Degree, b: Degree) -> Degree {
    let d = normalize_degree(a - b);
    if d > 180.0 {
        d - DEGREE_MAX
    } else {
        d
    }
}
