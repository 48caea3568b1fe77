//! # ndastro
//!
//! Positional astronomy for astrological and calendrical work:
//!
//! * geocentric tropical ecliptic positions, with speeds, of the Sun, the
//!   Moon, Mercury to Saturn and the lunar nodes Rahu and Kethu
//!   ([`position`]);
//! * ayanamsa for 17 sidereal systems ([`ayanamsa`]);
//! * retrograde arcs ([`retrograde`]);
//! * sunrise, sunset and twilight for any WGS84 location ([`riseset`]).
//!
//! States come from a JPL DE kernel in NAIF SPK format or from a built-in
//! analytic ephemeris ([`jpl_ephem`]). The [`ndastro::Ndastro`] façade loads
//! the chosen source once and exposes every query.
//!
//! All instants are [`hifitime::Epoch`]s and are handled in UTC.
pub mod ayanamsa;
pub mod bodies;
pub mod constants;
pub mod earth_orientation;
pub mod jpl_ephem;
pub mod ndastro;
pub mod ndastro_errors;
pub mod observers;
pub mod position;
pub mod ref_system;
pub mod retrograde;
pub mod riseset;
pub mod spherical;
pub mod time;
