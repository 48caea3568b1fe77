//! Ayanamsa: the offset between the tropical and a sidereal zodiac.
//!
//! Each of the 17 supported systems is a quadratic in `B6`, the signed number
//! of Julian centuries between the instant and J2000.0
//! (2000-01-01T12:00:00 UTC):
//!
//! ```text
//! ayanamsa = c0 + c1·B6 + c2·B6²
//! ```
//!
//! The coefficients were historically given against 1900
//! (`B6 = (JD − 2415021) / 36525`). They are stored re-referenced to J2000
//! (`c0′ = c0 + c1·d + c2·d²`, `c1′ = c1 + 2·c2·d`, `d = 36524 / 36525`), so
//! that the value at J2000.0 is exactly `c0`.
use std::{fmt, str::FromStr};

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, DAYS_PER_JULIAN_CENTURY, SECONDS_PER_DAY},
    ndastro_errors::NdastroError,
    spherical::normalize_degree,
    time::{j2000_utc, to_utc},
};

/// Precession rate shared by every system, degrees per Julian century.
const C1: f64 = 1.396_657_976_9;
/// Quadratic term shared by every system, degrees per century².
const C2: f64 = 0.000_308;

/// Polynomial coefficients of one system, referenced to J2000.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AyanamsaCoefficients {
    pub c0: Degree,
    pub c1: f64,
    pub c2: f64,
}

const fn coefficients(c0: Degree) -> AyanamsaCoefficients {
    AyanamsaCoefficients { c0, c1: C1, c2: C2 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AyanamsaSystem {
    /// Chitrapaksha, the Indian national standard.
    Lahiri,
    Raman,
    KrishnamurtiNew,
    KrishnamurtiOld,
    FaganBradley,
    Kali,
    Janma,
    True,
    Madhava,
    Vishnu,
    Yukteshwar,
    Suryasiddhanta,
    Aryabhatta,
    Ushashasi,
    TrueCitra,
    TrueRevati,
    TruePusya,
}

/// `(system, coefficients)`, in [`AyanamsaSystem::ALL`] order.
static COEFFICIENTS: [(AyanamsaSystem, AyanamsaCoefficients); 17] = [
    (AyanamsaSystem::Lahiri, coefficients(23.856_440_670_8)),
    (AyanamsaSystem::Raman, coefficients(23.799_943_023_3)),
    (AyanamsaSystem::KrishnamurtiNew, coefficients(25.149_963_774_8)),
    (AyanamsaSystem::KrishnamurtiOld, coefficients(23.760_200_76)),
    (AyanamsaSystem::FaganBradley, coefficients(26.133_295_281_7)),
    (AyanamsaSystem::Kali, coefficients(28.538_263_262_6)),
    (AyanamsaSystem::Janma, coefficients(24.179_679_406_6)),
    (AyanamsaSystem::True, coefficients(25.440_252_598_5)),
    (AyanamsaSystem::Madhava, coefficients(25.450_456_173_7)),
    (AyanamsaSystem::Vishnu, coefficients(25.406_452_598_5)),
    (AyanamsaSystem::Yukteshwar, coefficients(23.866_632_353_0)),
    (AyanamsaSystem::Suryasiddhanta, coefficients(25.396_722_656_8)),
    (AyanamsaSystem::Aryabhatta, coefficients(25.200_138_412_4)),
    (AyanamsaSystem::Ushashasi, coefficients(21.449_961_663_1)),
    (AyanamsaSystem::TrueCitra, coefficients(25.233_295_199_6)),
    (AyanamsaSystem::TrueRevati, coefficients(21.433_295_603_3)),
    (AyanamsaSystem::TruePusya, coefficients(25.480_203_333_2)),
];

impl AyanamsaSystem {
    pub const ALL: [AyanamsaSystem; 17] = [
        AyanamsaSystem::Lahiri,
        AyanamsaSystem::Raman,
        AyanamsaSystem::KrishnamurtiNew,
        AyanamsaSystem::KrishnamurtiOld,
        AyanamsaSystem::FaganBradley,
        AyanamsaSystem::Kali,
        AyanamsaSystem::Janma,
        AyanamsaSystem::True,
        AyanamsaSystem::Madhava,
        AyanamsaSystem::Vishnu,
        AyanamsaSystem::Yukteshwar,
        AyanamsaSystem::Suryasiddhanta,
        AyanamsaSystem::Aryabhatta,
        AyanamsaSystem::Ushashasi,
        AyanamsaSystem::TrueCitra,
        AyanamsaSystem::TrueRevati,
        AyanamsaSystem::TruePusya,
    ];

    pub fn coefficients(self) -> AyanamsaCoefficients {
        COEFFICIENTS[self as usize].1
    }

    pub fn name(self) -> &'static str {
        match self {
            AyanamsaSystem::Lahiri => "Lahiri",
            AyanamsaSystem::Raman => "Raman",
            AyanamsaSystem::KrishnamurtiNew => "KrishnamurtiNew",
            AyanamsaSystem::KrishnamurtiOld => "KrishnamurtiOld",
            AyanamsaSystem::FaganBradley => "FaganBradley",
            AyanamsaSystem::Kali => "Kali",
            AyanamsaSystem::Janma => "Janma",
            AyanamsaSystem::True => "True",
            AyanamsaSystem::Madhava => "Madhava",
            AyanamsaSystem::Vishnu => "Vishnu",
            AyanamsaSystem::Yukteshwar => "Yukteshwar",
            AyanamsaSystem::Suryasiddhanta => "Suryasiddhanta",
            AyanamsaSystem::Aryabhatta => "Aryabhatta",
            AyanamsaSystem::Ushashasi => "Ushashasi",
            AyanamsaSystem::TrueCitra => "TrueCitra",
            AyanamsaSystem::TrueRevati => "TrueRevati",
            AyanamsaSystem::TruePusya => "TruePusya",
        }
    }
}

impl fmt::Display for AyanamsaSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AyanamsaSystem {
    type Err = NdastroError;

    /// Case-insensitive, ignoring `_`, `-` and spaces: `"fagan-bradley"`,
    /// `"KRISHNAMURTI_NEW"` and `"True Citra"` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        AyanamsaSystem::ALL
            .into_iter()
            .find(|system| system.name().to_ascii_lowercase() == key)
            .ok_or_else(|| NdastroError::UnknownAyanamsaSystem(s.to_string()))
    }
}

/// Signed Julian centuries from J2000.0 (UTC) to `instant`.
pub fn centuries_since_j2000(instant: &Epoch) -> f64 {
    (to_utc(instant) - j2000_utc()).to_seconds() / SECONDS_PER_DAY / DAYS_PER_JULIAN_CENTURY
}

/// Ayanamsa of `system` at `instant`, in degrees.
pub fn ayanamsa(system: AyanamsaSystem, instant: &Epoch) -> Degree {
    let AyanamsaCoefficients { c0, c1, c2 } = system.coefficients();
    let b6 = centuries_since_j2000(instant);
    c0 + c1 * b6 + c2 * b6 * b6
}

/// Sidereal longitude in [0, 360) from a tropical one.
pub fn sidereal_longitude(
    tropical_longitude: Degree,
    system: AyanamsaSystem,
    instant: &Epoch,
) -> Degree {
    normalize_degree(tropical_longitude - ayanamsa(system, instant))
}

#[cfg(test)]
mod ayanamsa_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_table_order() {
        for (i, system) in AyanamsaSystem::ALL.iter().enumerate() {
            assert_eq!(COEFFICIENTS[i].0, *system);
        }
    }

    #[test]
    fn test_exact_at_j2000() {
        let j2000 = j2000_utc();
        assert_eq!(centuries_since_j2000(&j2000), 0.0);
        for system in AyanamsaSystem::ALL {
            assert_eq!(ayanamsa(system, &j2000), system.coefficients().c0);
        }
    }

    #[test]
    fn test_lahiri_reference_values() {
        let cases = [
            (Epoch::from_gregorian_utc_hms(1900, 1, 1, 12, 0, 0), 22.4601289),
            (Epoch::from_gregorian_utc_hms(2026, 1, 9, 12, 0, 0), 24.2199176),
            (Epoch::from_gregorian_utc_hms(2100, 1, 1, 12, 0, 0), 25.2534066),
        ];
        for (epoch, expected) in cases {
            assert_abs_diff_eq!(ayanamsa(AyanamsaSystem::Lahiri, &epoch), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_time_scale_independent() {
        let utc = Epoch::from_gregorian_utc_hms(2024, 1, 1, 12, 0, 0);
        let tt = utc.to_time_scale(hifitime::TimeScale::TT);
        assert_abs_diff_eq!(
            ayanamsa(AyanamsaSystem::Raman, &utc),
            ayanamsa(AyanamsaSystem::Raman, &tt),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_parse_system() {
        assert_eq!("lahiri".parse::<AyanamsaSystem>().unwrap(), AyanamsaSystem::Lahiri);
        assert_eq!(
            "fagan-bradley".parse::<AyanamsaSystem>().unwrap(),
            AyanamsaSystem::FaganBradley
        );
        assert_eq!(
            "KRISHNAMURTI_NEW".parse::<AyanamsaSystem>().unwrap(),
            AyanamsaSystem::KrishnamurtiNew
        );
        assert_eq!("True Citra".parse::<AyanamsaSystem>().unwrap(), AyanamsaSystem::TrueCitra);
        assert_eq!(
            "galactic".parse::<AyanamsaSystem>(),
            Err(NdastroError::UnknownAyanamsaSystem("galactic".to_string()))
        );
        for system in AyanamsaSystem::ALL {
            assert_eq!(system.to_string().parse::<AyanamsaSystem>().unwrap(), system);
        }
    }

    #[test]
    fn test_sidereal_longitude() {
        let j2000 = j2000_utc();
        assert_abs_diff_eq!(
            sidereal_longitude(100.0, AyanamsaSystem::Lahiri, &j2000),
            100.0 - 23.8564406708,
            epsilon = 1e-12
        );
        // wraps below zero
        assert_abs_diff_eq!(
            sidereal_longitude(10.0, AyanamsaSystem::Lahiri, &j2000),
            360.0 + 10.0 - 23.8564406708,
            epsilon = 1e-12
        );
    }
}
