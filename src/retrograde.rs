//! Retrograde detection.
//!
//! A body is retrograde while its geocentric ecliptic longitude decreases,
//! i.e. while `speed_longitude < 0`. The boundaries of a retrograde arc are
//! the two stations where the speed crosses zero: direct → retrograde at the
//! start, retrograde → direct at the end.
//!
//! Stations are located with the usual two-stage search:
//!
//! 1. a coarse scan outward from the query instant with a fixed step, until
//!    two consecutive samples have opposite signs (zero counts as direct);
//! 2. a bisection of the bracket down to [`RetrogradeConfig::convergence_days`].
//!
//! Both stages are bounded: the scan by [`RetrogradeConfig::window_days`], the
//! bisection by [`RetrogradeConfig::max_iterations`].
//!
//! The lunar nodes follow the same rule. The true node regresses on average
//! but swings back and forth within days, so its arcs are found like a
//! planet's.
//! The mean node regresses at a steady rate and has no stations: it is
//! reported retrograde without bounds.
use hifitime::Epoch;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    bodies::Body,
    jpl_ephem::Ephemeris,
    ndastro_errors::NdastroError,
    position::{position_with_config, Correction, NodeMode, PositionConfig},
    time::{add_days, to_utc},
};

/// Search parameters of [`retrograde_status`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrogradeConfig {
    /// Coarse scan step, in days.
    pub step_days: f64,
    /// How far the scan may go on each side of the query instant, in days.
    pub window_days: f64,
    /// Bisection iteration cap.
    pub max_iterations: u32,
    /// Bisection stops once the bracket is narrower than this, in days.
    pub convergence_days: f64,
    /// When the body is direct, still report the closest retrograde arc
    /// (past or future) instead of an empty interval.
    pub nearest_arc: bool,
    /// Node definition used for Rahu and Kethu.
    pub node_mode: NodeMode,
}

impl Default for RetrogradeConfig {
    fn default() -> Self {
        RetrogradeConfig::outer_planet()
    }
}

impl RetrogradeConfig {
    /// Mercury and Venus: 1-day step.
    pub fn inner_planet() -> Self {
        RetrogradeConfig {
            step_days: 1.0,
            window_days: 300.0,
            max_iterations: 64,
            convergence_days: 1e-5,
            nearest_arc: false,
            node_mode: NodeMode::True,
        }
    }

    /// Mars to Saturn: 2-day step, and a window covering half of the
    /// longest synodic period (Mars, ~780 days).
    pub fn outer_planet() -> Self {
        RetrogradeConfig {
            step_days: 2.0,
            window_days: 400.0,
            max_iterations: 64,
            convergence_days: 1e-5,
            nearest_arc: false,
            node_mode: NodeMode::True,
        }
    }

    /// Rahu and Kethu: the osculating node changes direction every few days,
    /// with spells as short as a day, hence a half-day step.
    pub fn lunar_node() -> Self {
        RetrogradeConfig {
            step_days: 0.5,
            window_days: 90.0,
            max_iterations: 64,
            convergence_days: 1e-5,
            nearest_arc: false,
            node_mode: NodeMode::True,
        }
    }

    pub fn for_body(body: Body) -> Self {
        if body.is_inner_planet() {
            RetrogradeConfig::inner_planet()
        } else if body.is_node() {
            RetrogradeConfig::lunar_node()
        } else {
            RetrogradeConfig::outer_planet()
        }
    }

    pub fn with_window_days(mut self, window_days: f64) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn with_step_days(mut self, step_days: f64) -> Self {
        self.step_days = step_days;
        self
    }

    pub fn with_nearest_arc(mut self, nearest_arc: bool) -> Self {
        self.nearest_arc = nearest_arc;
        self
    }

    pub fn with_node_mode(mut self, node_mode: NodeMode) -> Self {
        self.node_mode = node_mode;
        self
    }

    pub fn validate(&self) -> Result<(), NdastroError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(NdastroError::InvalidConfiguration(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        };
        positive("step_days", self.step_days)?;
        positive("window_days", self.window_days)?;
        positive("convergence_days", self.convergence_days)?;
        if self.max_iterations == 0 {
            return Err(NdastroError::InvalidConfiguration(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Retrograde state of a body around an instant.
///
/// `start` and `end` are the stations bounding the reported arc; both are
/// `None` when the body is direct and no arc was requested, and for the mean
/// lunar nodes, which never station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrogradeInterval {
    pub is_retrograde: bool,
    pub start: Option<Epoch>,
    pub end: Option<Epoch>,
}

impl RetrogradeInterval {
    fn direct() -> Self {
        RetrogradeInterval {
            is_retrograde: false,
            start: None,
            end: None,
        }
    }
}

/// Longitude speed sampler on a day offset from a base instant.
struct SpeedProbe<'a> {
    ephem: &'a dyn Ephemeris,
    body: Body,
    base: Epoch,
    config: PositionConfig,
}

impl SpeedProbe<'_> {
    fn speed(&self, day_offset: f64) -> Result<f64, NdastroError> {
        let epoch = add_days(&self.base, day_offset);
        Ok(position_with_config(self.ephem, self.body, &epoch, &self.config)?.speed_longitude)
    }
}

fn is_retrograde(speed: f64) -> bool {
    speed < 0.0
}

/// Bisect a bracket `[t_a, t_b]` whose ends differ in motion, returning the
/// station as a day offset.
fn bisect_station(
    probe: &SpeedProbe,
    mut t_a: f64,
    mut t_b: f64,
    config: &RetrogradeConfig,
) -> Result<f64, NdastroError> {
    let retro_a = is_retrograde(probe.speed(t_a)?);

    for iteration in 0..config.max_iterations {
        let t_mid = 0.5 * (t_a + t_b);
        if is_retrograde(probe.speed(t_mid)?) == retro_a {
            t_a = t_mid;
        } else {
            t_b = t_mid;
        }
        if (t_b - t_a).abs() < config.convergence_days {
            trace!("Station bracket converged after {} iterations", iteration + 1);
            break;
        }
    }
    Ok(0.5 * (t_a + t_b))
}

/// Walk from `from` in `direction` (±1) until the motion changes, at most
/// until `limit` days away from the base instant. Returns the refined
/// station, or `None` when the window is exhausted.
fn scan_for_station(
    probe: &SpeedProbe,
    from: f64,
    direction: f64,
    config: &RetrogradeConfig,
) -> Result<Option<f64>, NdastroError> {
    let limit = direction * config.window_days;
    let mut t_prev = from;
    let mut retro_prev = is_retrograde(probe.speed(t_prev)?);

    while (limit - t_prev) * direction > 0.0 {
        let t_next = if ((limit - t_prev) * direction) < config.step_days {
            limit
        } else {
            t_prev + direction * config.step_days
        };
        let retro_next = is_retrograde(probe.speed(t_next)?);

        if retro_next != retro_prev {
            trace!(
                "{} station bracketed between day offsets {t_prev:.3} and {t_next:.3}",
                probe.body
            );
            return bisect_station(probe, t_prev, t_next, config).map(Some);
        }
        t_prev = t_next;
        retro_prev = retro_next;
    }
    Ok(None)
}

/// First full arc after the base instant, as (start, end) day offsets.
fn next_arc(
    probe: &SpeedProbe,
    config: &RetrogradeConfig,
) -> Result<Option<(f64, f64)>, NdastroError> {
    Ok(match scan_for_station(probe, 0.0, 1.0, config)? {
        Some(start) => scan_for_station(probe, start + config.convergence_days, 1.0, config)?
            .map(|end| (start, end)),
        None => None,
    })
}

/// Last full arc before the base instant.
fn previous_arc(
    probe: &SpeedProbe,
    config: &RetrogradeConfig,
) -> Result<Option<(f64, f64)>, NdastroError> {
    Ok(match scan_for_station(probe, 0.0, -1.0, config)? {
        Some(end) => scan_for_station(probe, end - config.convergence_days, -1.0, config)?
            .map(|start| (start, end)),
        None => None,
    })
}

/// A range error only means this direction ran off the ephemeris.
fn within_span<T>(result: Result<Option<T>, NdastroError>) -> Result<Option<T>, NdastroError> {
    match result {
        Err(NdastroError::EphemerisRange { .. }) => Ok(None),
        other => other,
    }
}

/// Retrograde status of `body` around `instant`.
///
/// Arguments
/// ---------
/// * `ephem`: source of geocentric states.
/// * `body`: any supported body. The Sun and the Moon never retrograde.
/// * `instant`: the query instant, pinned to UTC.
/// * `config`: scan and bisection parameters (see [`RetrogradeConfig::for_body`]).
///
/// Return
/// ------
/// * Retrograde at `instant`: `is_retrograde = true` with both stations.
/// * Direct: `is_retrograde = false` without bounds, or, with
///   `nearest_arc`, the bounds of the closest arc in either direction.
/// * Mean lunar nodes: `is_retrograde` from the sign of the mean rate,
///   without bounds.
/// * [`NdastroError::NoRetrogradeArcFound`] when a needed station lies
///   outside the window (and, with `nearest_arc`, for bodies that never
///   retrograde).
/// * [`NdastroError::EphemerisRange`] when the instant, or a station of the
///   current arc, lies outside the ephemeris. With `nearest_arc`, a direction
///   that runs off the ephemeris is dropped in favour of the other one.
pub fn retrograde_status(
    ephem: &dyn Ephemeris,
    body: Body,
    instant: &Epoch,
    config: &RetrogradeConfig,
) -> Result<RetrogradeInterval, NdastroError> {
    config.validate()?;
    let base = to_utc(instant);

    let not_found = || NdastroError::NoRetrogradeArcFound {
        body,
        instant: base,
        window_days: config.window_days,
    };

    if !body.can_retrograde() {
        return if config.nearest_arc {
            Err(not_found())
        } else {
            ephem.check_span(&base)?;
            Ok(RetrogradeInterval::direct())
        };
    }

    let probe = SpeedProbe {
        ephem,
        body,
        base,
        config: PositionConfig::default()
            .with_correction(Correction::Geometric)
            .with_node_mode(config.node_mode),
    };
    let to_epoch = |offset: f64| add_days(&base, offset);
    let retrograde_now = is_retrograde(probe.speed(0.0)?);

    if body.is_node() && config.node_mode == NodeMode::Mean {
        return Ok(RetrogradeInterval {
            is_retrograde: retrograde_now,
            start: None,
            end: None,
        });
    }

    if retrograde_now {
        let start = scan_for_station(&probe, 0.0, -1.0, config)?.ok_or_else(not_found)?;
        let end = scan_for_station(&probe, 0.0, 1.0, config)?.ok_or_else(not_found)?;
        debug!("{body} retrograde from {} to {}", to_epoch(start), to_epoch(end));
        return Ok(RetrogradeInterval {
            is_retrograde: true,
            start: Some(to_epoch(start)),
            end: Some(to_epoch(end)),
        });
    }

    if !config.nearest_arc {
        return Ok(RetrogradeInterval::direct());
    }

    let next = within_span(next_arc(&probe, config))?;
    let previous = within_span(previous_arc(&probe, config))?;

    let (start, end) = match (next, previous) {
        (Some(next), Some(previous)) => {
            if next.0.abs() <= previous.1.abs() {
                next
            } else {
                previous
            }
        }
        (Some(arc), None) | (None, Some(arc)) => arc,
        (None, None) => return Err(not_found()),
    };
    debug!(
        "{body} direct, nearest retrograde arc from {} to {}",
        to_epoch(start),
        to_epoch(end)
    );

    Ok(RetrogradeInterval {
        is_retrograde: false,
        start: Some(to_epoch(start)),
        end: Some(to_epoch(end)),
    })
}
