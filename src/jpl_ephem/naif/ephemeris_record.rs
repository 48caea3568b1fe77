//! Type 2 SPK records and their Chebyshev interpolation.
//!
//! A record is `rsize` little-endian doubles:
//!
//! ```text
//! MID  RADIUS  X[0..n]  Y[0..n]  Z[0..n]        n = (rsize − 2) / 3
//! ```
//!
//! With the normalised time `τ = (et − MID) / RADIUS ∈ [−1, 1]`, the position
//! (km) is `Σ cₖ Tₖ(τ)` and the velocity (km/s) is `Σ cₖ T′ₖ(τ) / RADIUS`.
use nalgebra::Vector3;
use nom::{multi::count, number::complete::le_f64, IResult, Parser};

use crate::ndastro_errors::NdastroError;

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    pub mid: f64,
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl EphemerisRecord {
    fn parse_record(input: &[u8], ncoeff: usize) -> IResult<&[u8], Self> {
        let (input, (mid, radius)) = (le_f64, le_f64).parse(input)?;
        let (input, (x, y, z)) = (
            count(le_f64, ncoeff),
            count(le_f64, ncoeff),
            count(le_f64, ncoeff),
        )
            .parse(input)?;
        Ok((
            input,
            EphemerisRecord {
                mid,
                radius,
                x,
                y,
                z,
            },
        ))
    }

    /// Decode the `index`-th record of a segment.
    ///
    /// Arguments
    /// ---------
    /// * `file`: the whole kernel.
    /// * `initial_addr`: 1-based DAF word address of the first segment word.
    /// * `rsize`: record size in words, from the segment directory.
    /// * `index`: 0-based record index.
    pub fn read(
        file: &[u8],
        initial_addr: usize,
        rsize: usize,
        index: usize,
    ) -> Result<Self, NdastroError> {
        let ncoeff = rsize
            .checked_sub(2)
            .map(|words| words / 3)
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                NdastroError::InvalidDafFile(format!("record size of {rsize} words is too small"))
            })?;

        let record_bytes = rsize.checked_mul(8);
        let bytes = record_bytes
            .and_then(|size| {
                let start = initial_addr
                    .checked_sub(1)?
                    .checked_mul(8)?
                    .checked_add(index.checked_mul(size)?)?;
                file.get(start..start.checked_add(size)?)
            })
            .ok_or_else(|| {
                NdastroError::InvalidDafFile(format!(
                    "record {index} of the segment at word {initial_addr} lies past the end of the file"
                ))
            })?;

        let (_, record) = Self::parse_record(bytes, ncoeff)?;
        if !(record.radius > 0.0) {
            return Err(NdastroError::InvalidDafFile(format!(
                "record {index} has a non-positive radius {}",
                record.radius
            )));
        }
        Ok(record)
    }

    /// Position (km) and velocity (km/s) at `ephem_time`, TDB seconds past J2000.
    pub fn interpolate(&self, ephem_time: f64) -> (Vector3<f64>, Vector3<f64>) {
        let tau = ((ephem_time - self.mid) / self.radius).clamp(-1.0, 1.0);

        let (px, vx) = chebyshev_series(&self.x, tau);
        let (py, vy) = chebyshev_series(&self.y, tau);
        let (pz, vz) = chebyshev_series(&self.z, tau);

        (
            Vector3::new(px, py, pz),
            Vector3::new(vx, vy, vz) / self.radius,
        )
    }
}

/// Evaluate `Σ cₖ Tₖ(τ)` and its derivative with respect to `τ`.
///
/// Uses the recurrences
///
/// ```text
/// Tₖ  = 2τ·Tₖ₋₁ − Tₖ₋₂
/// T′ₖ = 2τ·T′ₖ₋₁ + 2·Tₖ₋₁ − T′ₖ₋₂
/// ```
fn chebyshev_series(coefficients: &[f64], tau: f64) -> (f64, f64) {
    let (mut t_prev, mut t_curr) = (1.0, tau);
    let (mut d_prev, mut d_curr) = (0.0, 1.0);

    let mut value = 0.0;
    let mut derivative = 0.0;

    for (k, c) in coefficients.iter().enumerate() {
        match k {
            0 => value += c,
            1 => {
                value += c * tau;
                derivative += c;
            }
            _ => {
                let t_next = 2.0 * tau * t_curr - t_prev;
                let d_next = 2.0 * tau * d_curr + 2.0 * t_curr - d_prev;
                value += c * t_next;
                derivative += c * d_next;
                (t_prev, t_curr) = (t_curr, t_next);
                (d_prev, d_curr) = (d_curr, d_next);
            }
        }
    }

    (value, derivative)
}
