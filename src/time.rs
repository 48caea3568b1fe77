//! Time-scale helpers built on [`hifitime::Epoch`].
//!
//! Every public operation of the crate takes an [`Epoch`] and first pins it to
//! UTC ([`to_utc`]). The physics underneath needs other scales:
//!
//! * **TT** (as MJD) for precession, nutation and obliquity,
//! * **TDB/ET seconds** for SPK lookups,
//! * **UT1** for sidereal time, approximated here by UTC (|UT1 − UTC| < 0.9 s).
//!
//! Searches (rise/set, stations) work on a plain `f64` day offset from a base
//! epoch; [`add_days`] and [`days_between`] convert back and forth.
use hifitime::{Duration, Epoch, TimeScale};

use crate::constants::{DAYS_PER_JULIAN_CENTURY, DPI, SECONDS_PER_DAY, SIDEREAL_RATE, T2000};

/// Re-express an epoch in the UTC time scale.
///
/// The instant itself does not move; only the scale used for calendar
/// breakdowns and Julian-date conversions changes.
pub fn to_utc(epoch: &Epoch) -> Epoch {
    epoch.to_time_scale(TimeScale::UTC)
}

/// The J2000.0 reference instant, 2000-01-01T12:00:00 UTC.
pub fn j2000_utc() -> Epoch {
    Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0)
}

/// Midnight (00:00:00 UTC) of the civil UTC date containing `epoch`.
pub fn utc_midnight(epoch: &Epoch) -> Epoch {
    let (year, month, day, _, _, _, _) = epoch.to_gregorian_utc();
    Epoch::from_gregorian_utc_at_midnight(year, month, day)
}

/// Shift an epoch by a (possibly fractional, possibly negative) number of days.
pub fn add_days(epoch: &Epoch, days: f64) -> Epoch {
    *epoch + Duration::from_seconds(days * SECONDS_PER_DAY)
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: &Epoch, to: &Epoch) -> f64 {
    (*to - *from).to_seconds() / SECONDS_PER_DAY
}

/// Modified Julian Date of the epoch in the TT scale.
pub fn mjd_tt(epoch: &Epoch) -> f64 {
    epoch.to_mjd_tt_days()
}

/// Modified Julian Date of the epoch in the UTC scale, used as a UT1 proxy.
pub fn mjd_utc(epoch: &Epoch) -> f64 {
    epoch.to_mjd_utc_days()
}

/// Julian centuries of TT elapsed since J2000.0.
pub fn julian_centuries_tt(epoch: &Epoch) -> f64 {
    (mjd_tt(epoch) - T2000) / DAYS_PER_JULIAN_CENTURY
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// This function implements the IAU 1982 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `tjm` - Modified Julian Date (MJD, UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # References
/// * IAU 1982, IERS Conventions 1996.
/// * Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: f64) -> f64 {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    let day_start = tjm.floor();
    let t = (day_start - T2000) / DAYS_PER_JULIAN_CENTURY;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    // Earth rotation since 0h UT1, scaled from solar to sidereal time
    let gmst = gmst0 + (tjm - day_start) * DPI * SIDEREAL_RATE;

    gmst.rem_euclid(DPI)
}
