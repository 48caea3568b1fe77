//! Heliocentric planets from mean Keplerian elements.
//!
//! Elements and rates are E. M. Standish, *Keplerian Elements for Approximate
//! Positions of the Major Planets* (JPL, Table 1), fitted to DE430 over
//! 1800–2050 in the mean ecliptic and equinox of J2000. Positions are good to
//! a few arcminutes (Saturn about ten) over that interval.
use nalgebra::{Rotation3, Vector3};

use crate::constants::{AstronomicalUnit, DAYS_PER_JULIAN_CENTURY, DPI};

const KEPLER_MAX_ITERATIONS: usize = 50;
const KEPLER_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Planet {
    Mercury,
    Venus,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
}

/// Mean elements at J2000 and their rates per Julian century.
///
/// `a` in AU, every angle in degrees: inclination `i`, mean longitude `l`,
/// longitude of perihelion `varpi` and longitude of the ascending node `node`.
#[derive(Debug, Clone, Copy)]
struct MeanElements {
    a: [f64; 2],
    e: [f64; 2],
    i: [f64; 2],
    l: [f64; 2],
    varpi: [f64; 2],
    node: [f64; 2],
}

impl Planet {
    fn mean_elements(self) -> MeanElements {
        match self {
            Planet::Mercury => MeanElements {
                a: [0.38709927, 0.00000037],
                e: [0.20563593, 0.00001906],
                i: [7.00497902, -0.00594749],
                l: [252.25032350, 149472.67411175],
                varpi: [77.45779628, 0.16047689],
                node: [48.33076593, -0.12534081],
            },
            Planet::Venus => MeanElements {
                a: [0.72333566, 0.00000390],
                e: [0.00677672, -0.00004107],
                i: [3.39467605, -0.00078890],
                l: [181.97909950, 58517.81538729],
                varpi: [131.60246718, 0.00268329],
                node: [76.67984255, -0.27769418],
            },
            Planet::EarthMoonBarycenter => MeanElements {
                a: [1.00000261, 0.00000562],
                e: [0.01671123, -0.00004392],
                i: [-0.00001531, -0.01294668],
                l: [100.46457166, 35999.37244981],
                varpi: [102.93768193, 0.32327364],
                node: [0.0, 0.0],
            },
            Planet::Mars => MeanElements {
                a: [1.52371034, 0.00001847],
                e: [0.09339410, 0.00007882],
                i: [1.84969142, -0.00813131],
                l: [-4.55343205, 19140.30268499],
                varpi: [-23.94362959, 0.44441088],
                node: [49.55953891, -0.29257343],
            },
            Planet::Jupiter => MeanElements {
                a: [5.20288700, -0.00011607],
                e: [0.04838624, -0.00013253],
                i: [1.30439695, -0.00183714],
                l: [34.39644051, 3034.74612775],
                varpi: [14.72847983, 0.21252668],
                node: [100.47390909, 0.20469106],
            },
            Planet::Saturn => MeanElements {
                a: [9.53667594, -0.00125060],
                e: [0.05386179, -0.00050991],
                i: [2.48599187, 0.00193609],
                l: [49.95424423, 1222.49362201],
                varpi: [92.59887831, -0.41897216],
                node: [113.66242448, -0.28867794],
            },
        }
    }
}

fn at(element: [f64; 2], t: f64) -> f64 {
    element[0] + element[1] * t
}

/// Solve Kepler's equation `M = E − e·sin E` for the eccentric anomaly.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly in radians, any range.
/// * `e`: eccentricity, `0 ≤ e < 1`.
///
/// Return
/// ------
/// * The eccentric anomaly in radians, in the same turn as `mean_anomaly`
///   reduced to (−π, π].
pub(crate) fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let m = (mean_anomaly + std::f64::consts::PI).rem_euclid(DPI) - std::f64::consts::PI;
    let mut ecc_anomaly = if e < 0.8 { m } else { std::f64::consts::PI.copysign(m) };

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (ecc_anomaly - e * ecc_anomaly.sin() - m) / (1.0 - e * ecc_anomaly.cos());
        ecc_anomaly -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ecc_anomaly
}

/// Heliocentric position (AU) and velocity (AU/day) of `planet` in the mean
/// ecliptic and equinox of J2000.
///
/// `t` is the time in Julian centuries of TDB since J2000.0. The velocity is
/// the two-body velocity of the osculating ellipse: the slow drift of the
/// elements themselves is left out.
pub(crate) fn heliocentric_state(
    planet: Planet,
    t: f64,
) -> (Vector3<AstronomicalUnit>, Vector3<f64>) {
    let el = planet.mean_elements();

    let a = at(el.a, t);
    let e = at(el.e, t);
    let incl = at(el.i, t).to_radians();
    let varpi = at(el.varpi, t);
    let node = at(el.node, t);
    let mean_anomaly = (at(el.l, t) - varpi).to_radians();
    let perihelion = (varpi - node).to_radians();

    // radians per day
    let mean_motion = (el.l[1] - el.varpi[1]).to_radians() / DAYS_PER_JULIAN_CENTURY;

    let ecc_anomaly = eccentric_anomaly(mean_anomaly, e);
    let (sin_e, cos_e) = ecc_anomaly.sin_cos();
    let sqrt_one_e2 = (1.0 - e * e).sqrt();
    let e_dot = mean_motion / (1.0 - e * cos_e);

    let orbital_position = Vector3::new(a * (cos_e - e), a * sqrt_one_e2 * sin_e, 0.0);
    let orbital_velocity = Vector3::new(-a * sin_e * e_dot, a * sqrt_one_e2 * cos_e * e_dot, 0.0);

    let to_ecliptic = Rotation3::from_axis_angle(&Vector3::z_axis(), node.to_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), incl)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), perihelion);

    (to_ecliptic * orbital_position, to_ecliptic * orbital_velocity)
}
