use hifitime::Epoch;
use thiserror::Error;

use crate::{bodies::Body, riseset::RiseSetEvent};

#[derive(Error, Debug)]
pub enum NdastroError {
    #[error("Unsupported body: {0}")]
    UnsupportedBody(String),

    #[error("Unknown ayanamsa system: {0}")]
    UnknownAyanamsaSystem(String),

    #[error("Instant {instant} is outside the ephemeris coverage [{start}, {end}]")]
    EphemerisRange {
        instant: Epoch,
        start: Epoch,
        end: Epoch,
    },

    #[error("No {which} on {date} at latitude {latitude}°, longitude {longitude}°")]
    NoEvent {
        which: RiseSetEvent,
        date: Epoch,
        latitude: f64,
        longitude: f64,
    },

    #[error("No retrograde arc of {body} found within {window_days} days of {instant}")]
    NoRetrogradeArcFound {
        body: Body,
        instant: Epoch,
        window_days: f64,
    },

    #[error("Invalid geographic location: {0}")]
    InvalidGeoLocation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid JPL string format: {0}")]
    InvalidJPLStringFormat(String),

    #[error("Invalid JPL ephemeris file version: {0}")]
    InvalidJPLEphemFileVersion(String),

    #[error("JPL File not found at: {0}")]
    JPLFileNotFound(String),

    #[error("Base dir creation error for JPL ephemeris file: {0}")]
    UnableToCreateBaseDir(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "jpl-download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Invalid DAF/SPK file: {0}")]
    InvalidDafFile(String),

    #[error("Invalid SPK data type: {0}")]
    InvalidSpkDataType(i32),

    #[error("No ephemeris segment for target {target} relative to center {center}")]
    MissingSegment { target: i32, center: i32 },
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for NdastroError {
    fn from(err: nom::Err<E>) -> Self {
        NdastroError::NomParsingError(format!("{err:?}"))
    }
}

impl PartialEq for NdastroError {
    fn eq(&self, other: &Self) -> bool {
        use NdastroError::*;
        match (self, other) {
            (UnsupportedBody(a), UnsupportedBody(b)) => a == b,
            (UnknownAyanamsaSystem(a), UnknownAyanamsaSystem(b)) => a == b,
            (
                EphemerisRange {
                    instant: i1,
                    start: s1,
                    end: e1,
                },
                EphemerisRange {
                    instant: i2,
                    start: s2,
                    end: e2,
                },
            ) => i1 == i2 && s1 == s2 && e1 == e2,
            (
                NoEvent {
                    which: w1,
                    date: d1,
                    latitude: la1,
                    longitude: lo1,
                },
                NoEvent {
                    which: w2,
                    date: d2,
                    latitude: la2,
                    longitude: lo2,
                },
            ) => w1 == w2 && d1 == d2 && la1 == la2 && lo1 == lo2,
            (
                NoRetrogradeArcFound {
                    body: b1,
                    instant: i1,
                    window_days: w1,
                },
                NoRetrogradeArcFound {
                    body: b2,
                    instant: i2,
                    window_days: w2,
                },
            ) => b1 == b2 && i1 == i2 && w1 == w2,
            (InvalidGeoLocation(a), InvalidGeoLocation(b)) => a == b,
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (InvalidJPLStringFormat(a), InvalidJPLStringFormat(b)) => a == b,
            (InvalidJPLEphemFileVersion(a), InvalidJPLEphemFileVersion(b)) => a == b,
            (JPLFileNotFound(a), JPLFileNotFound(b)) => a == b,
            (UnableToCreateBaseDir(a), UnableToCreateBaseDir(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidDafFile(a), InvalidDafFile(b)) => a == b,
            (InvalidSpkDataType(a), InvalidSpkDataType(b)) => a == b,
            (
                MissingSegment {
                    target: t1,
                    center: c1,
                },
                MissingSegment {
                    target: t2,
                    center: c2,
                },
            ) => t1 == t2 && c1 == c2,

            // I/O and HTTP errors are not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "jpl-download")]
            (ReqwestError(_), ReqwestError(_)) => true,

            _ => false,
        }
    }
}
