use std::fmt;

use hifitime::Epoch;
use nom::{
    multi::count,
    number::complete::{le_f64, le_i32},
    IResult, Parser,
};

use super::naif_ids::{NaifId, SpkDataType};

/// Segment descriptor of an SPK file (ND = 2 doubles, NI = 6 integers).
///
/// Epochs are TDB seconds past J2000. Addresses are 1-based DAF word
/// addresses of the first and last word of the segment.
#[derive(Debug, PartialEq, Clone)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: i32,
    pub center: i32,
    pub frame_id: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, (start_epoch, end_epoch)) = (le_f64, le_f64).parse(input)?;
        let (input, ints) = count(le_i32, 6).parse(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target: ints[0],
                center: ints[1],
                frame_id: ints[2],
                data_type: ints[3],
                initial_addr: ints[4],
                final_addr: ints[5],
            },
        ))
    }

    pub fn covers(&self, et_seconds: f64) -> bool {
        (self.start_epoch..=self.end_epoch).contains(&et_seconds)
    }
}

/// Control words at the head of every summary record.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SummaryRecordControl {
    /// Record number of the next summary record, 0 for the last one.
    pub next: usize,
    pub previous: usize,
    /// Number of summaries stored in this record.
    pub n_summaries: usize,
}

impl SummaryRecordControl {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, (next, previous, n_summaries)) = (le_f64, le_f64, le_f64).parse(input)?;
        Ok((
            input,
            SummaryRecordControl {
                next: next as usize,
                previous: previous as usize,
                n_summaries: n_summaries as usize,
            },
        ))
    }
}

fn body_label(id: i32) -> String {
    NaifId::from_id(id)
        .map(|naif| naif.to_string())
        .unwrap_or_else(|| format!("NAIF {id}"))
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} relative to {}",
            body_label(self.target),
            body_label(self.center)
        )?;
        writeln!(
            f,
            "  span : {} -> {}",
            Epoch::from_et_seconds(self.start_epoch),
            Epoch::from_et_seconds(self.end_epoch)
        )?;
        writeln!(
            f,
            "  frame: {}   data: {}",
            self.frame_id,
            SpkDataType::from_i32(self.data_type)
        )?;
        write!(f, "  words: {} -> {}", self.initial_addr, self.final_addr)
    }
}
