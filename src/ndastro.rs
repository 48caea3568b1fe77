//! # Ndastro: one handle over the ephemeris and every query
//!
//! [`Ndastro`] owns the ephemeris source and opens it lazily: the kernel file
//! is read (and, with the `jpl-download` feature, fetched) the first time a
//! query needs it, then reused. Concurrent first calls initialise it once.
//!
//! ```rust, no_run
//! use hifitime::Epoch;
//! use ndastro::{ayanamsa::AyanamsaSystem, bodies::Body, ndastro::Ndastro, observers::GeoLocation};
//!
//! let astro = Ndastro::new("naif:DE440").unwrap();
//! let now = Epoch::from_gregorian_utc_hms(2026, 1, 9, 12, 0, 0);
//!
//! let moon = astro.position(Body::Moon, &now).unwrap();
//! let sidereal = astro.sidereal_longitude(moon.longitude, AyanamsaSystem::Lahiri, &now);
//!
//! let bangalore = GeoLocation::with_elevation(12.97, 77.59, 914.0).unwrap();
//! let (sunrise, sunset) = astro.sunrise_sunset(&bangalore, &now).unwrap();
//! ```
//!
//! Every method is a thin wrapper over the free functions of
//! [`crate::position`], [`crate::ayanamsa`], [`crate::retrograde`] and
//! [`crate::riseset`], which take any [`Ephemeris`] directly.
use std::collections::BTreeMap;

use hifitime::Epoch;
use once_cell::sync::OnceCell;

use crate::{
    ayanamsa::{self, AyanamsaSystem},
    bodies::Body,
    constants::Degree,
    jpl_ephem::{download_jpl_file::EphemFileSource, Ephemeris, JPLEphem},
    ndastro_errors::NdastroError,
    observers::GeoLocation,
    position::{self, PositionConfig},
    retrograde::{self, RetrogradeConfig, RetrogradeInterval},
    riseset::{self, RiseSetConfig, TwilightKind},
    spherical::EclipticState,
};

#[derive(Debug, Clone)]
pub struct Ndastro {
    jpl_source: EphemFileSource,
    jpl_ephem: OnceCell<JPLEphem>,
    position_config: PositionConfig,
    riseset_config: RiseSetConfig,
}

impl Ndastro {
    /// Build a handle from an ephemeris source string.
    ///
    /// Arguments
    /// -----------------
    /// * `jpl_file`: `"naif:DE440"` (cached kernel), `"naif:/path/to/de440.bsp"`
    ///   (user file) or `"analytic"` (built-in low-precision ephemeris).
    ///
    /// Return
    /// ----------
    /// * The handle, with the ephemeris not yet opened, or
    ///   [`NdastroError::InvalidJPLStringFormat`] /
    ///   [`NdastroError::InvalidJPLEphemFileVersion`] for a malformed string.
    pub fn new(jpl_file: &str) -> Result<Self, NdastroError> {
        Ok(Ndastro {
            jpl_source: jpl_file.try_into()?,
            jpl_ephem: OnceCell::new(),
            position_config: PositionConfig::default(),
            riseset_config: RiseSetConfig::default(),
        })
    }

    pub fn with_position_config(mut self, config: PositionConfig) -> Result<Self, NdastroError> {
        config.validate()?;
        self.position_config = config;
        Ok(self)
    }

    pub fn with_riseset_config(mut self, config: RiseSetConfig) -> Result<Self, NdastroError> {
        config.validate()?;
        self.riseset_config = config;
        Ok(self)
    }

    pub fn jpl_source(&self) -> &EphemFileSource {
        &self.jpl_source
    }

    /// The ephemeris, opened on first access.
    pub fn get_jpl_ephem(&self) -> Result<&JPLEphem, NdastroError> {
        self.jpl_ephem
            .get_or_try_init(|| JPLEphem::new(&self.jpl_source))
    }

    /// First and last instant the ephemeris covers.
    pub fn valid_span(&self) -> Result<(Epoch, Epoch), NdastroError> {
        Ok(self.get_jpl_ephem()?.valid_span())
    }

    /// Tropical geocentric position of `body`, with the handle's
    /// [`PositionConfig`].
    pub fn position(&self, body: Body, instant: &Epoch) -> Result<EclipticState, NdastroError> {
        position::position_with_config(self.get_jpl_ephem()?, body, instant, &self.position_config)
    }

    pub fn all_positions(
        &self,
        instant: &Epoch,
    ) -> Result<BTreeMap<Body, EclipticState>, NdastroError> {
        position::all_positions(self.get_jpl_ephem()?, instant, &self.position_config)
    }

    pub fn topocentric_position(
        &self,
        body: Body,
        location: &GeoLocation,
        instant: &Epoch,
    ) -> Result<EclipticState, NdastroError> {
        position::topocentric_position(
            self.get_jpl_ephem()?,
            body,
            location,
            instant,
            &self.position_config,
        )
    }

    /// Ayanamsa in degrees. Needs no ephemeris.
    pub fn ayanamsa(&self, system: AyanamsaSystem, instant: &Epoch) -> Degree {
        ayanamsa::ayanamsa(system, instant)
    }

    pub fn sidereal_longitude(
        &self,
        tropical_longitude: Degree,
        system: AyanamsaSystem,
        instant: &Epoch,
    ) -> Degree {
        ayanamsa::sidereal_longitude(tropical_longitude, system, instant)
    }

    /// Retrograde status of `body`, with the default search of
    /// [`RetrogradeConfig::for_body`] and the handle's node definition.
    pub fn retrograde_status(
        &self,
        body: Body,
        instant: &Epoch,
    ) -> Result<RetrogradeInterval, NdastroError> {
        let config =
            RetrogradeConfig::for_body(body).with_node_mode(self.position_config.node_mode);
        self.retrograde_status_with_config(body, instant, &config)
    }

    pub fn retrograde_status_with_config(
        &self,
        body: Body,
        instant: &Epoch,
        config: &RetrogradeConfig,
    ) -> Result<RetrogradeInterval, NdastroError> {
        retrograde::retrograde_status(self.get_jpl_ephem()?, body, instant, config)
    }

    /// Sunrise and sunset (UTC) on the UTC date of `date`.
    pub fn sunrise_sunset(
        &self,
        location: &GeoLocation,
        date: &Epoch,
    ) -> Result<(Epoch, Epoch), NdastroError> {
        riseset::sunrise_sunset(self.get_jpl_ephem()?, location, date, &self.riseset_config)
    }

    /// Dawn and dusk (UTC) of the given twilight kind.
    pub fn twilight(
        &self,
        location: &GeoLocation,
        date: &Epoch,
        kind: TwilightKind,
    ) -> Result<(Epoch, Epoch), NdastroError> {
        riseset::twilight(self.get_jpl_ephem()?, location, date, kind, &self.riseset_config)
    }
}
