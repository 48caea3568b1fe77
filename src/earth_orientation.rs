//! Earth orientation: obliquity, nutation, precession and the equation of the equinoxes.
//!
//! All routines take a Modified Julian Date in the **TT** scale and return
//! angles in radians (or arcseconds where stated). The rotation matrices are
//! *passive*: they re-express a fixed vector in a rotated frame, `x' = R · x`.
//!
//! * Mean obliquity: IAU 1976 polynomial.
//! * Precession: IAU 1976 (Lieske) angles ζ, z, θ.
//! * Nutation: IAU 1980 series truncated to its 18 largest terms, which keeps
//!   Δψ within ~0.3″ of the full 106-term theory.
use nalgebra::Matrix3;

use crate::{
    constants::{ArcSec, Radian, DAYS_PER_JULIAN_CENTURY, RADEG, RADSEC, T2000},
    ref_system::rotmt,
};

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * Mean obliquity of the ecliptic in radians.
///
/// The obliquity is a cubic polynomial in Julian centuries since J2000,
/// evaluated with Horner's scheme:
///
/// ```text
/// ε = ((ob3 * t + ob2) * t + ob1) * t + ob0
/// ```
pub fn obleq(tjm: f64) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = (tjm - T2000) / DAYS_PER_JULIAN_CENTURY;

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// One periodic term of the nutation series.
///
/// `args` multiplies (D, M, M′, F, Ω). Coefficients are in units of 0.0001″,
/// with their secular rates per Julian century.
struct NutationTerm {
    args: [f64; 5],
    sin_psi: f64,
    sin_psi_t: f64,
    cos_eps: f64,
    cos_eps_t: f64,
}

const fn term(args: [f64; 5], sin_psi: f64, sin_psi_t: f64, cos_eps: f64, cos_eps_t: f64) -> NutationTerm {
    NutationTerm {
        args,
        sin_psi,
        sin_psi_t,
        cos_eps,
        cos_eps_t,
    }
}

const NUTATION_TERMS: [NutationTerm; 18] = [
    term([0., 0., 0., 0., 1.], -171996.0, -174.2, 92025.0, 8.9),
    term([-2., 0., 0., 2., 2.], -13187.0, -1.6, 5736.0, -3.1),
    term([0., 0., 0., 2., 2.], -2274.0, -0.2, 977.0, -0.5),
    term([0., 0., 0., 0., 2.], 2062.0, 0.2, -895.0, 0.5),
    term([0., 1., 0., 0., 0.], 1426.0, -3.4, 54.0, -0.1),
    term([0., 0., 1., 0., 0.], 712.0, 0.1, -7.0, 0.0),
    term([-2., 1., 0., 2., 2.], -517.0, 1.2, 224.0, -0.6),
    term([0., 0., 0., 2., 1.], -386.0, -0.4, 200.0, 0.0),
    term([0., 0., 1., 2., 2.], -301.0, 0.0, 129.0, -0.1),
    term([-2., -1., 0., 2., 2.], 217.0, -0.5, -95.0, 0.3),
    term([-2., 0., 1., 0., 0.], -158.0, 0.0, 0.0, 0.0),
    term([-2., 0., 0., 2., 1.], 129.0, 0.1, -70.0, 0.0),
    term([0., 0., -1., 2., 2.], 123.0, 0.0, -53.0, 0.0),
    term([2., 0., 0., 0., 0.], 63.0, 0.0, 0.0, 0.0),
    term([0., 0., 1., 0., 1.], 63.0, 0.1, -33.0, 0.0),
    term([2., 0., -1., 2., 2.], -59.0, 0.0, 26.0, 0.0),
    term([0., 0., -1., 0., 1.], -58.0, -0.1, 32.0, 0.0),
    term([0., 0., 1., 2., 1.], -51.0, 0.0, 27.0, 0.0),
];

/// Fundamental lunisolar arguments (D, M, M′, F, Ω) in radians.
fn fundamental_arguments(t: f64) -> [f64; 5] {
    let t2 = t * t;
    let t3 = t2 * t;

    let d = 297.85036 + 445267.111480 * t - 0.0019142 * t2 + t3 / 189474.0;
    let m = 357.52772 + 35999.050340 * t - 0.0001603 * t2 - t3 / 300000.0;
    let mp = 134.96298 + 477198.867398 * t + 0.0086972 * t2 + t3 / 56250.0;
    let f = 93.27191 + 483202.017538 * t - 0.0036825 * t2 + t3 / 327270.0;
    let om = 125.04452 - 1934.136261 * t + 0.0020708 * t2 + t3 / 450000.0;

    [d, m, mp, f, om].map(|deg| (deg % 360.0) * RADEG)
}

/// Compute the nutation in longitude and obliquity (Δψ, Δε) in arcseconds.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `(Δψ, Δε)` in arcseconds.
pub fn nutation(tjm: f64) -> (ArcSec, ArcSec) {
    let t = (tjm - T2000) / DAYS_PER_JULIAN_CENTURY;
    let fundamentals = fundamental_arguments(t);

    let (dpsi, deps) = NUTATION_TERMS.iter().fold((0.0, 0.0), |(dpsi, deps), nt| {
        let arg: f64 = nt
            .args
            .iter()
            .zip(fundamentals.iter())
            .map(|(k, a)| k * a)
            .sum();
        (
            dpsi + (nt.sin_psi + nt.sin_psi_t * t) * arg.sin(),
            deps + (nt.cos_eps + nt.cos_eps_t * t) * arg.cos(),
        )
    });

    (dpsi * 1e-4, deps * 1e-4)
}

/// True obliquity of the ecliptic ε + Δε, in radians.
pub fn true_obliquity(tjm: f64) -> Radian {
    let (_, deps) = nutation(tjm);
    obleq(tjm) + deps * RADSEC
}

/// Nutation matrix from the mean equator and equinox of date to the true
/// equator and equinox of date.
///
/// ```text
/// N = R1(−(ε + Δε)) · R3(−Δψ) · R1(ε)
/// ```
pub fn rnut(tjm: f64) -> Matrix3<f64> {
    let epsm = obleq(tjm);
    let (dpsi, deps) = nutation(tjm);
    let epst = epsm + deps * RADSEC;

    rotmt(-epst, 0) * rotmt(-dpsi * RADSEC, 2) * rotmt(epsm, 0)
}

/// Compute the equation of the equinoxes in radians.
///
/// This is the difference between apparent and mean sidereal time:
///
/// ```text
/// Eq_eq = Δψ · cos(ε)
/// ```
pub fn equequ(tjm: f64) -> Radian {
    let (dpsi, _) = nutation(tjm);
    RADSEC * dpsi * obleq(tjm).cos()
}

/// Precession matrix from the J2000 mean equator to the mean equator of date (IAU 1976).
///
/// ```text
/// P = R3(−z) · R2(θ) · R3(−ζ)
/// ζ = (0.6406161 + 0.0000839·T + 0.0000050·T²) · T  [deg]
/// θ = (0.5567530 − 0.0001185·T − 0.0000116·T²) · T  [deg]
/// z = (0.6406161 + 0.0003041·T + 0.0000051·T²) · T  [deg]
/// ```
pub fn prec(tjm: f64) -> Matrix3<f64> {
    let t = (tjm - T2000) / DAYS_PER_JULIAN_CENTURY;

    let zeta = ((0.0000050 * t + 0.0000839) * t + 0.6406161) * t * RADEG;
    let z = ((0.0000051 * t + 0.0003041) * t + 0.6406161) * t * RADEG;
    let theta = ((-0.0000116 * t - 0.0001185) * t + 0.5567530) * t * RADEG;

    rotmt(-z, 2) * rotmt(theta, 1) * rotmt(-zeta, 2)
}
