//! Physical constants, unit conversions and the unit type aliases shared by
//! the crate.

/// 2π
pub const DPI: f64 = 2. * std::f64::consts::PI;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Astronomical unit in km (IAU 2012 B2).
pub const AU: f64 = 149_597_870.7;

/// Tolerance (days) under which two MJDs name the same reference epoch.
pub const EPS: f64 = 1e-6;

/// J2000.0 as a Modified Julian Date, TT.
pub const T2000: f64 = 51544.5;

pub const RADEG: f64 = std::f64::consts::PI / 180.0;
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

// WGS84 ellipsoid, meters
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Earth equatorial radius in AU.
pub const ERAU: f64 = (EARTH_MAJOR_AXIS / 1000.) / AU;

/// Light time for one astronomical unit, in days.
pub const LIGHT_TIME_PER_AU: f64 = AU / 299_792.458 / SECONDS_PER_DAY;

/// Constant of annual aberration, in arcseconds.
pub const ABERRATION_CONSTANT: f64 = 20.49552;

/// Earth/Moon mass ratio (DE440).
pub const EARTH_MOON_MASS_RATIO: f64 = 81.300_568_94;

/// Sidereal days per solar day.
pub const SIDEREAL_RATE: f64 = 1.00273790934;

pub const DEGREE_MAX: f64 = 360.0;

pub type Degree = f64;
pub type ArcSec = f64;
pub type Radian = f64;
pub type Kilometer = f64;
pub type Meter = f64;
pub type AstronomicalUnit = f64;
