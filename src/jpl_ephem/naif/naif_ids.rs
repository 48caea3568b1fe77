//! NAIF integer codes of the objects read from a planetary SPK kernel, and
//! SPK segment data types.
use std::fmt;

use crate::{bodies::Body, ndastro_errors::NdastroError};

/// NAIF identifiers used to assemble geocentric states from a DE kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaifId {
    SolarSystemBarycenter,
    MercuryBarycenter,
    VenusBarycenter,
    EarthMoonBarycenter,
    MarsBarycenter,
    JupiterBarycenter,
    SaturnBarycenter,
    Sun,
    Moon,
    Earth,
}

impl NaifId {
    pub fn to_id(self) -> i32 {
        match self {
            NaifId::SolarSystemBarycenter => 0,
            NaifId::MercuryBarycenter => 1,
            NaifId::VenusBarycenter => 2,
            NaifId::EarthMoonBarycenter => 3,
            NaifId::MarsBarycenter => 4,
            NaifId::JupiterBarycenter => 5,
            NaifId::SaturnBarycenter => 6,
            NaifId::Sun => 10,
            NaifId::Moon => 301,
            NaifId::Earth => 399,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(NaifId::SolarSystemBarycenter),
            1 => Some(NaifId::MercuryBarycenter),
            2 => Some(NaifId::VenusBarycenter),
            3 => Some(NaifId::EarthMoonBarycenter),
            4 => Some(NaifId::MarsBarycenter),
            5 => Some(NaifId::JupiterBarycenter),
            6 => Some(NaifId::SaturnBarycenter),
            10 => Some(NaifId::Sun),
            301 => Some(NaifId::Moon),
            399 => Some(NaifId::Earth),
            _ => None,
        }
    }

    /// The object whose state the kernel gives for a physical body.
    ///
    /// Planets are taken at their system barycenter: the offset to the planet
    /// center is a few hundred km at most for Jupiter and Saturn, far below
    /// an arcsecond at their geocentric distance.
    pub fn for_body(body: Body) -> Result<Self, NdastroError> {
        match body {
            Body::Sun => Ok(NaifId::Sun),
            Body::Moon => Ok(NaifId::Moon),
            Body::Mercury => Ok(NaifId::MercuryBarycenter),
            Body::Venus => Ok(NaifId::VenusBarycenter),
            Body::Mars => Ok(NaifId::MarsBarycenter),
            Body::Jupiter => Ok(NaifId::JupiterBarycenter),
            Body::Saturn => Ok(NaifId::SaturnBarycenter),
            Body::Rahu | Body::Kethu => Err(NdastroError::UnsupportedBody(format!(
                "{body} has no ephemeris segment"
            ))),
        }
    }

    /// Center of the segment that holds this object in a DE kernel.
    pub fn segment_center(self) -> NaifId {
        match self {
            NaifId::Moon | NaifId::Earth => NaifId::EarthMoonBarycenter,
            _ => NaifId::SolarSystemBarycenter,
        }
    }
}

impl fmt::Display for NaifId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NaifId::SolarSystemBarycenter => "Solar System Barycenter",
            NaifId::MercuryBarycenter => "Mercury Barycenter",
            NaifId::VenusBarycenter => "Venus Barycenter",
            NaifId::EarthMoonBarycenter => "Earth-Moon Barycenter",
            NaifId::MarsBarycenter => "Mars Barycenter",
            NaifId::JupiterBarycenter => "Jupiter Barycenter",
            NaifId::SaturnBarycenter => "Saturn Barycenter",
            NaifId::Sun => "Sun",
            NaifId::Moon => "Moon",
            NaifId::Earth => "Earth",
        };
        write!(f, "{name} ({})", self.to_id())
    }
}

/// SPK segment representations. Only the position-only Chebyshev form used
/// by the DE planetary kernels is interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpkDataType {
    ModifiedDifferenceArray,
    ChebyshevPositionOnly,
    ChebyshevPositionVelocity,
    Other(i32),
}

impl SpkDataType {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => SpkDataType::ModifiedDifferenceArray,
            2 => SpkDataType::ChebyshevPositionOnly,
            3 => SpkDataType::ChebyshevPositionVelocity,
            other => SpkDataType::Other(other),
        }
    }

    /// Accept only the representations this reader can interpolate.
    pub fn ensure_supported(value: i32) -> Result<Self, NdastroError> {
        match Self::from_i32(value) {
            SpkDataType::ChebyshevPositionOnly => Ok(SpkDataType::ChebyshevPositionOnly),
            _ => Err(NdastroError::InvalidSpkDataType(value)),
        }
    }
}

impl fmt::Display for SpkDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpkDataType::ModifiedDifferenceArray => write!(f, "Type 1 (modified difference array)"),
            SpkDataType::ChebyshevPositionOnly => write!(f, "Type 2 (Chebyshev, position only)"),
            SpkDataType::ChebyshevPositionVelocity => {
                write!(f, "Type 3 (Chebyshev, position and velocity)")
            }
            SpkDataType::Other(value) => write!(f, "Type {value}"),
        }
    }
}
