//! Geocentric Moon from the principal terms of the ELP-2000/82 series as
//! tabulated by Meeus (*Astronomical Algorithms*, ch. 47).
//!
//! The truncated series keeps the terms above ~0.03° in longitude; the
//! result is good to about 0.05° in longitude and 0.02° in latitude, and a
//! few hundred km in distance. Output is in the mean ecliptic and equinox of
//! date, in kilometers.
use nalgebra::Vector3;

use crate::constants::Kilometer;

/// `(D, M, M′, F, coefficient)`: multiples of the fundamental arguments and
/// the amplitude of the sine term, in 1e-6 degrees.
const LONGITUDE_TERMS: [(i8, i8, i8, i8, f64); 13] = [
    (0, 0, 1, 0, 6_288_774.0),
    (2, 0, -1, 0, 1_274_027.0),
    (2, 0, 0, 0, 658_314.0),
    (0, 0, 2, 0, 213_618.0),
    (0, 1, 0, 0, -185_116.0),
    (0, 0, 0, 2, -114_332.0),
    (2, 0, -2, 0, 58_793.0),
    (2, -1, -1, 0, 57_066.0),
    (2, 0, 1, 0, 53_322.0),
    (2, -1, 0, 0, 45_758.0),
    (0, 1, -1, 0, -40_923.0),
    (1, 0, 0, 0, -34_720.0),
    (0, 1, 1, 0, -30_383.0),
];

/// Same layout as [`LONGITUDE_TERMS`], cosine terms in meters.
const DISTANCE_TERMS: [(i8, i8, i8, i8, f64); 13] = [
    (0, 0, 1, 0, -20_905_355.0),
    (2, 0, -1, 0, -3_699_111.0),
    (2, 0, 0, 0, -2_955_968.0),
    (0, 0, 2, 0, -569_925.0),
    (0, 1, 0, 0, 48_888.0),
    (0, 0, 0, 2, -3_149.0),
    (2, 0, -2, 0, 246_158.0),
    (2, -1, -1, 0, -152_138.0),
    (2, 0, 1, 0, -170_733.0),
    (2, -1, 0, 0, -204_586.0),
    (0, 1, -1, 0, -129_620.0),
    (1, 0, 0, 0, 108_743.0),
    (0, 1, 1, 0, 104_755.0),
];

/// Sine terms of the latitude, in 1e-6 degrees.
const LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 7] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
];

/// Mean distance of the series, in km.
const MEAN_DISTANCE: Kilometer = 385_000.56;

fn polynomial(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

/// Fundamental arguments in radians: mean longitude L′, elongation D, solar
/// anomaly M, lunar anomaly M′ and argument of latitude F.
fn fundamental_arguments(t: f64) -> [f64; 5] {
    [
        polynomial(&[218.3164477, 481_267.88123421, -0.0015786, 1.0 / 538_841.0], t),
        polynomial(&[297.8501921, 445_267.1114034, -0.0018819, 1.0 / 545_868.0], t),
        polynomial(&[357.5291092, 35_999.0502909, -0.0001536], t),
        polynomial(&[134.9633964, 477_198.8675055, 0.0087414, 1.0 / 69_699.0], t),
        polynomial(&[93.2720950, 483_202.0175233, -0.0036539, -1.0 / 3_526_000.0], t),
    ]
    .map(|deg| deg.rem_euclid(360.0).to_radians())
}

fn periodic_sum(
    terms: &[(i8, i8, i8, i8, f64)],
    args: &[f64; 5],
    eccentricity_factor: f64,
    trig: fn(f64) -> f64,
) -> f64 {
    let [_, d, m, mp, f] = *args;
    terms
        .iter()
        .map(|&(cd, cm, cmp, cf, amplitude)| {
            let angle = cd as f64 * d + cm as f64 * m + cmp as f64 * mp + cf as f64 * f;
            // terms carrying the solar anomaly shrink with the Earth's eccentricity
            amplitude * eccentricity_factor.powi(cm.unsigned_abs() as i32) * trig(angle)
        })
        .sum()
}

/// Geocentric ecliptic longitude, latitude (degrees) and distance (km) of
/// the Moon, mean equinox of date.
///
/// `t` is the time in Julian centuries of TT since J2000.0.
pub(crate) fn spherical_position(t: f64) -> (f64, f64, Kilometer) {
    let args = fundamental_arguments(t);
    let [l_prime, _, _, mp, f] = args;
    let ecc = 1.0 - 0.002516 * t - 0.0000074 * t * t;

    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479_264.290 * t).to_radians();
    let a3 = (313.45 + 481_266.484 * t).to_radians();

    let sigma_l = periodic_sum(&LONGITUDE_TERMS, &args, ecc, f64::sin)
        + 3958.0 * a1.sin()
        + 1962.0 * (l_prime - f).sin()
        + 318.0 * a2.sin();
    let sigma_b = periodic_sum(&LATITUDE_TERMS, &args, ecc, f64::sin) - 2235.0 * l_prime.sin()
        + 382.0 * a3.sin()
        + 175.0 * (a1 - f).sin()
        + 175.0 * (a1 + f).sin()
        + 127.0 * (l_prime - mp).sin()
        - 115.0 * (l_prime + mp).sin();
    let sigma_r = periodic_sum(&DISTANCE_TERMS, &args, ecc, f64::cos);

    (
        (l_prime.to_degrees() + sigma_l * 1e-6).rem_euclid(360.0),
        sigma_b * 1e-6,
        MEAN_DISTANCE + sigma_r * 1e-3,
    )
}

/// Geocentric Cartesian position of the Moon in km, mean ecliptic and equinox
/// of date.
pub(crate) fn geocentric_position(t: f64) -> Vector3<Kilometer> {
    let (longitude, latitude, distance) = spherical_position(t);
    let (sin_l, cos_l) = longitude.to_radians().sin_cos();
    let (sin_b, cos_b) = latitude.to_radians().sin_cos();
    Vector3::new(
        distance * cos_b * cos_l,
        distance * cos_b * sin_l,
        distance * sin_b,
    )
}

#[cfg(test)]
mod test_moon {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_meeus_example_47a() {
        // 1992 April 12, 0h TD: λ = 133.162655 (mean equinox), β = −3.229126, Δ = 368409.7 km
        let t = -0.077221081451;
        let (longitude, latitude, distance) = spherical_position(t);
        assert_relative_eq!(longitude, 133.162655, epsilon = 0.05);
        assert_relative_eq!(latitude, -3.229126, epsilon = 0.02);
        assert_relative_eq!(distance, 368_409.7, epsilon = 300.0);
    }

    #[test]
    fn test_distance_bounds() {
        for i in 0..200 {
            let t = -1.0 + i as f64 * 0.01;
            let position = geocentric_position(t);
            assert!((355_000.0..407_500.0).contains(&position.norm()));
            assert!(position.z.abs() / position.norm() < 0.095);
        }
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(polynomial(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(polynomial(&[], 2.0), 0.0);
    }
}
