use hifitime::{Duration, Epoch};
use nom::{number::complete::le_f64, IResult, Parser};

use crate::ndastro_errors::NdastroError;

/// Trailer of a type 2 SPK segment: the four words stored at its end.
#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    /// Start of the first record, TDB seconds past J2000.
    pub init: f64,
    /// Length of the interval covered by each record, in seconds.
    pub intlen: f64,
    /// Size of one record in 8-byte words.
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    fn parse_words(input: &[u8]) -> IResult<&[u8], (f64, f64, f64, f64)> {
        (le_f64, le_f64, le_f64, le_f64).parse(input)
    }

    /// Read the trailer of the segment whose last word is `final_addr`.
    ///
    /// Arguments
    /// ---------
    /// * `file`: the whole kernel.
    /// * `final_addr`: 1-based DAF word address of the last segment word.
    ///
    /// Return
    /// ------
    /// * The directory, or [`NdastroError::InvalidDafFile`] when it lies
    ///   outside the file or holds counts that cannot describe type 2
    ///   records stored in this file.
    pub fn from_segment_end(file: &[u8], final_addr: usize) -> Result<Self, NdastroError> {
        let start = final_addr
            .checked_sub(4)
            .and_then(|addr| addr.checked_mul(8))
            .ok_or_else(|| {
                NdastroError::InvalidDafFile(format!("segment end address {final_addr} out of range"))
            })?;
        let bytes = start
            .checked_add(32)
            .and_then(|end| file.get(start..end))
            .ok_or_else(|| {
                NdastroError::InvalidDafFile(format!(
                    "segment directory at word {final_addr} lies past the end of the file"
                ))
            })?;

        let (_, (init, intlen, rsize, n_records)) = Self::parse_words(bytes)?;

        // NaN fails every comparison and is rejected here
        let max_words = (file.len() / 8) as f64;
        let is_count = |value: f64, min: f64| {
            value >= min && value <= max_words && value.fract() == 0.0
        };
        if !(init.is_finite() && intlen.is_finite() && intlen > 0.0)
            || !is_count(rsize, 5.0)
            || !is_count(n_records, 1.0)
            || (rsize as usize - 2) % 3 != 0
        {
            return Err(NdastroError::InvalidDafFile(format!(
                "invalid type 2 directory: init={init}, intlen={intlen}, rsize={rsize}, n={n_records}"
            )));
        }

        Ok(DirectoryData {
            init,
            intlen,
            rsize: rsize as usize,
            n_records: n_records as usize,
        })
    }

    /// Index of the record covering `et_seconds`, clamped to the table.
    pub fn record_index(&self, et_seconds: f64) -> usize {
        let idx = ((et_seconds - self.init) / self.intlen).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.n_records - 1)
        }
    }
}

impl std::fmt::Display for DirectoryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records of {} words every {} from {}",
            self.n_records,
            self.rsize,
            Duration::from_seconds(self.intlen),
            Epoch::from_et_seconds(self.init)
        )
    }
}
