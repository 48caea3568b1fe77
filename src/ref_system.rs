//! Celestial reference systems and the rotations between them.
//!
//! A [`RefSystem`] pairs a fundamental plane/origin (mean or true equator,
//! mean or true ecliptic) with a [`RefEpoch`]. [`rotpn`] builds the rotation
//! between any two of them by going through the mean equator and equinox of
//! J2000, which is the frame of the JPL ephemerides:
//!
//! ```text
//! Equm(J2000) --P--> Equm(date) --N--> Equt(date) --R1(ε+Δε)--> Eclt(date)
//!                         \--R1(ε)--> Eclm(date)
//! ```
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::{DPI, EPS, T2000},
    earth_orientation::{obleq, prec, rnut, true_obliquity},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefEpoch {
    J2000,
    /// Epoch of date, as a Modified Julian Date in TT.
    Epoch(f64),
}

impl RefEpoch {
    pub fn date(&self) -> f64 {
        match *self {
            RefEpoch::J2000 => T2000,
            RefEpoch::Epoch(d) => d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefSystem {
    /// Mean equator and mean equinox (precession only).
    Equm(RefEpoch),
    /// True equator and true equinox (precession and nutation).
    Equt(RefEpoch),
    /// Mean ecliptic and mean equinox.
    Eclm(RefEpoch),
    /// True ecliptic and true equinox: the frame of apparent ecliptic longitudes.
    Eclt(RefEpoch),
}

impl RefSystem {
    pub fn epoch(&self) -> RefEpoch {
        match *self {
            RefSystem::Equm(e) | RefSystem::Equt(e) | RefSystem::Eclm(e) | RefSystem::Eclt(e) => e,
        }
    }

    /// Rotation from the mean equator and equinox of J2000 into this system.
    fn from_equm_j2000(&self) -> Matrix3<f64> {
        let date = self.epoch().date();
        let precession = if (date - T2000).abs() < EPS {
            Matrix3::identity()
        } else {
            prec(date)
        };

        match self {
            RefSystem::Equm(_) => precession,
            RefSystem::Equt(_) => rnut(date) * precession,
            RefSystem::Eclm(_) => rotmt(obleq(date), 0) * precession,
            RefSystem::Eclt(_) => rotmt(true_obliquity(date), 0) * rnut(date) * precession,
        }
    }
}

/// Compute the rotation matrix between two celestial reference systems.
///
/// Arguments
/// ---------
/// * `ref_sys1`: source reference system and epoch.
/// * `ref_sys2`: target reference system and epoch.
///
/// Return
/// ------
/// * The rotation `rot` such that `x₂ = rot · x₁`, where `x₁` is a vector
///   expressed in `ref_sys1` and `x₂` the same vector in `ref_sys2`.
///
/// Remarks
/// -------
/// * Precession uses the IAU 1976 model ([`prec`]), nutation the truncated
///   IAU 1980 series ([`rnut`]) and obliquity [`obleq`].
/// * Both systems are first related to the mean equator of J2000, so the
///   result is exact for any pair of epochs.
pub fn rotpn(ref_sys1: &RefSystem, ref_sys2: &RefSystem) -> Matrix3<f64> {
    if ref_sys1 == ref_sys2 {
        return Matrix3::identity();
    }
    ref_sys2.from_equm_j2000() * ref_sys1.from_equm_j2000().transpose()
}

/// Elementary frame rotation about one of the principal axes.
///
/// The returned matrix is a **passive** rotation: it re-expresses a fixed
/// vector in a frame rotated by `alpha` (counter-clockwise, seen from the tip
/// of the axis). For the X axis:
///
/// ```text
/// R1(α) = | 1    0     0   |
///         | 0   cos α  sin α|
///         | 0  −sin α  cos α|
/// ```
///
/// # Arguments
/// * `alpha` - Rotation angle in **radians**.
/// * `k` - Axis index: `0` → X, `1` → Y, any other value → Z.
pub fn rotmt(alpha: f64, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        _ => Vector3::z_axis(),
    };

    // An active rotation by −α is the passive frame rotation by α
    Rotation3::from_axis_angle(&axis, -alpha).into_inner()
}

/// Convert a 3D Cartesian position vector to right ascension and declination.
///
/// Returns
/// --------
/// * Tuple `(α, δ, ρ)`:
///     - `α`: right ascension in radians, in the range [0, 2π).
///     - `δ`: declination in radians, in the range [−π/2, +π/2].
///     - `ρ`: Euclidean norm of the vector.
///
/// A zero vector yields `(0.0, 0.0, 0.0)`.
pub fn cartesian_to_radec(cartesian_position: Vector3<f64>) -> (f64, f64, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).clamp(-1.0, 1.0).asin();
    let alpha = cartesian_position
        .y
        .atan2(cartesian_position.x)
        .rem_euclid(DPI);
    (alpha, delta, pos_norm)
}
