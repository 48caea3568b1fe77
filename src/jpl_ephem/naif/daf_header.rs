//! DAF file record: the first 1024 bytes of an SPK kernel.
//!
//! Layout (little-endian, offsets in bytes):
//!
//! ```text
//!   0  idword     8 ascii    "DAF/SPK "
//!   8  nd         i32        doubles per segment summary
//!  12  ni         i32        integers per segment summary
//!  16  ifname    60 ascii    internal file name
//!  76  fward      i32        record number of the first summary record
//!  80  bward      i32        record number of the last summary record
//!  84  free       i32        first free DAF address
//!  88  locfmt     8 ascii    "LTL-IEEE" / "BIG-IEEE"
//!  96  prenul   603          zero padding
//! 699  ftpstr    28          FTP corruption sentinel
//! 727  pstnul   297          zero padding
//! ```
//!
//! Only `LTL-IEEE` kernels with the SPK summary shape (ND = 2, NI = 6) are
//! accepted, which covers every DE kernel distributed by NAIF.
use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult, Parser};

use crate::ndastro_errors::NdastroError;

/// Size in bytes of one DAF physical record.
pub const DAF_RECORD_BYTES: usize = 1024;

#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    pub idword: String,
    pub internal_filename: String,
    pub nd: i32,
    pub ni: i32,
    pub fward: i32,
    pub bward: i32,
    pub free: i32,
    pub locfmt: String,
}

fn ascii(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', ' '])
        .trim()
        .to_string()
}

impl DAFHeader {
    /// Decode the file record. The remaining input starts at record 2.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, (idword, nd, ni, ifname)) =
            (take(8usize), le_i32, le_i32, take(60usize)).parse(input)?;
        let (input, (fward, bward, free, locfmt)) =
            (le_i32, le_i32, le_i32, take(8usize)).parse(input)?;
        // prenul, ftpstr and pstnul carry no information we use
        let (input, _) = take(DAF_RECORD_BYTES - 96).parse(input)?;

        Ok((
            input,
            DAFHeader {
                idword: ascii(idword),
                internal_filename: ascii(ifname),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: ascii(locfmt),
            },
        ))
    }

    /// Check that the kernel is a little-endian SPK file this reader understands.
    pub fn validate(&self) -> Result<(), NdastroError> {
        if self.idword != "DAF/SPK" {
            return Err(NdastroError::InvalidDafFile(format!(
                "expected a DAF/SPK kernel, found id word '{}'",
                self.idword
            )));
        }
        if self.locfmt != "LTL-IEEE" {
            return Err(NdastroError::InvalidDafFile(format!(
                "only little-endian kernels are supported, found '{}'",
                self.locfmt
            )));
        }
        if self.nd != 2 || self.ni != 6 {
            return Err(NdastroError::InvalidDafFile(format!(
                "unexpected summary shape ND={}, NI={}",
                self.nd, self.ni
            )));
        }
        if self.fward < 2 {
            return Err(NdastroError::InvalidDafFile(format!(
                "invalid first summary record {}",
                self.fward
            )));
        }
        Ok(())
    }

    /// Size of one segment summary, in 8-byte words: ND + ⌈NI / 2⌉.
    pub fn summary_words(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

impl fmt::Display for DAFHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DAF header")?;
        writeln!(f, "  id word        : {}", self.idword)?;
        writeln!(f, "  internal name  : {}", self.internal_filename)?;
        writeln!(f, "  summary shape  : ND={} NI={}", self.nd, self.ni)?;
        writeln!(f, "  summary records: {} -> {}", self.fward, self.bward)?;
        writeln!(f, "  free address   : {}", self.free)?;
        write!(f, "  binary format  : {}", self.locfmt)
    }
}
