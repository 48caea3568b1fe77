//! High-level loader for NAIF/JPL SPK ephemerides.
//!
//! This module ties together the low-level DAF header, the ASCII JPL header,
//! the summary records, the segment directories and the Chebyshev records to
//! expose state lookups for the bodies of a DE kernel.
//!
//! # What this module does
//! 1. Reads the **DAF header** to validate the binary layout.
//! 2. Parses the **ASCII JPL header** from the comment area, when present.
//! 3. Walks the linked list of **summary records** to discover the segments
//!    (`target`, `center`, addresses, time span).
//! 4. Uses each segment **directory** to decode all of its records.
//!
//! Segments for objects outside [`NaifId`] are skipped. A needed segment with
//! a representation other than type 2 fails with
//! [`NdastroError::InvalidSpkDataType`].
//!
//! # Units & time scales
//! * Times are **TDB seconds past J2000** (what hifitime calls ET).
//! * States come out in **kilometers** and **km/s**, in the ICRF.
use std::{collections::HashMap, fmt};

use camino::Utf8Path;
use hifitime::Epoch;
use log::{debug, warn};
use nalgebra::Vector3;

use crate::{
    bodies::Body,
    constants::{AU, SECONDS_PER_DAY},
    jpl_ephem::{to_ecliptic_of_date, Ephemeris, StateVector},
    ndastro_errors::NdastroError,
    ref_system::{RefEpoch, RefSystem},
    time::mjd_tt,
};

use super::{
    daf_header::{DAFHeader, DAF_RECORD_BYTES},
    directory::DirectoryData,
    ephemeris_record::EphemerisRecord,
    jpl_ephem_header::JPLEphemHeader,
    naif_ids::{NaifId, SpkDataType},
    summary_record::{Summary, SummaryRecordControl},
};

/// Objects needed to build geocentric states of the supported bodies.
const REQUIRED: [NaifId; 9] = [
    NaifId::Sun,
    NaifId::MercuryBarycenter,
    NaifId::VenusBarycenter,
    NaifId::EarthMoonBarycenter,
    NaifId::MarsBarycenter,
    NaifId::JupiterBarycenter,
    NaifId::SaturnBarycenter,
    NaifId::Moon,
    NaifId::Earth,
];

/// DAF word addresses are 1-based and stored as i32.
fn word_address(addr: i32) -> Result<usize, NdastroError> {
    usize::try_from(addr)
        .ok()
        .filter(|addr| *addr >= 1)
        .ok_or_else(|| NdastroError::InvalidDafFile(format!("invalid word address {addr}")))
}

#[derive(Debug, Clone)]
struct Segment {
    summary: Summary,
    directory: DirectoryData,
    records: Vec<EphemerisRecord>,
}

impl Segment {
    fn state(&self, et_seconds: f64) -> (Vector3<f64>, Vector3<f64>) {
        let idx = self.directory.record_index(et_seconds);
        // record_index clamps into the table, and the table is never empty
        self.records[idx].interpolate(et_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct NaifData {
    pub(crate) daf_header: DAFHeader,
    pub(crate) header: Option<JPLEphemHeader>,
    segments: HashMap<(i32, i32), Segment>,
}

impl NaifData {
    /// Load a kernel from disk.
    pub fn read_naif_file(path: &Utf8Path) -> Result<Self, NdastroError> {
        if !path.exists() {
            return Err(NdastroError::JPLFileNotFound(path.to_string()));
        }
        debug!("Reading NAIF kernel {path}");
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a kernel held in memory.
    pub fn from_bytes(file: &[u8]) -> Result<Self, NdastroError> {
        let (_, daf_header) = DAFHeader::parse(file)?;
        daf_header.validate()?;

        let header = Self::read_comment_header(file, &daf_header);
        if header.is_none() {
            warn!("No JPL text header in the comment area of the kernel");
        }

        let mut segments = HashMap::new();
        for summary in Self::read_summaries(file, &daf_header)? {
            let (Some(target), Some(center)) =
                (NaifId::from_id(summary.target), NaifId::from_id(summary.center))
            else {
                continue;
            };
            SpkDataType::ensure_supported(summary.data_type)?;
            if summary.frame_id != 1 {
                return Err(NdastroError::InvalidDafFile(format!(
                    "segment {target} wrt {center} uses frame {} instead of J2000",
                    summary.frame_id
                )));
            }

            let initial_addr = word_address(summary.initial_addr)?;
            let final_addr = word_address(summary.final_addr)?;
            let directory = DirectoryData::from_segment_end(file, final_addr)?;

            // records then the four directory words, inside [initial_addr, final_addr]
            let needed = directory
                .n_records
                .checked_mul(directory.rsize)
                .and_then(|words| words.checked_add(4));
            let available = (final_addr + 1).checked_sub(initial_addr);
            if !matches!((needed, available), (Some(n), Some(a)) if n <= a) {
                return Err(NdastroError::InvalidDafFile(format!(
                    "segment {target} wrt {center} at words {initial_addr}..{final_addr} cannot hold {} records of {} words",
                    directory.n_records, directory.rsize
                )));
            }

            let records = (0..directory.n_records)
                .map(|i| EphemerisRecord::read(file, initial_addr, directory.rsize, i))
                .collect::<Result<Vec<_>, _>>()?;

            debug!(
                "Loaded segment {target} wrt {center}: {} records",
                records.len()
            );
            segments.insert(
                (summary.target, summary.center),
                Segment {
                    summary,
                    directory,
                    records,
                },
            );
        }

        Ok(NaifData {
            daf_header,
            header,
            segments,
        })
    }

    fn read_comment_header(file: &[u8], daf_header: &DAFHeader) -> Option<JPLEphemHeader> {
        let end = (daf_header.fward as usize - 1) * DAF_RECORD_BYTES;
        let comments = file.get(DAF_RECORD_BYTES..end)?;
        // DAF ends comment lines with NUL and the comment area with EOT
        let text = String::from_utf8_lossy(comments).replace(['\0', '\u{4}'], "\n");
        JPLEphemHeader::parse(&text).ok().map(|(_, header)| header)
    }

    fn read_summaries(file: &[u8], daf_header: &DAFHeader) -> Result<Vec<Summary>, NdastroError> {
        let summary_bytes = daf_header.summary_words() * 8;
        let max_records = file.len() / DAF_RECORD_BYTES;

        let mut summaries = Vec::new();
        let mut record = daf_header.fward as usize;
        let mut visited = 0;

        while record != 0 {
            visited += 1;
            if visited > max_records {
                return Err(NdastroError::InvalidDafFile(
                    "summary record chain does not terminate".into(),
                ));
            }

            let bytes = (record - 1)
                .checked_mul(DAF_RECORD_BYTES)
                .and_then(|start| file.get(start..start.checked_add(DAF_RECORD_BYTES)?))
                .ok_or_else(|| {
                    NdastroError::InvalidDafFile(format!(
                        "summary record {record} lies past the end of the file"
                    ))
                })?;

            let (mut input, control) = SummaryRecordControl::parse(bytes)?;
            let used = control
                .n_summaries
                .checked_mul(summary_bytes)
                .and_then(|b| b.checked_add(24));
            if !matches!(used, Some(used) if used <= DAF_RECORD_BYTES) {
                return Err(NdastroError::InvalidDafFile(format!(
                    "summary record {record} claims {} summaries",
                    control.n_summaries
                )));
            }
            for _ in 0..control.n_summaries {
                let (_, summary) = Summary::parse(input)?;
                summaries.push(summary);
                input = &input[summary_bytes..];
            }

            record = control.next;
        }

        Ok(summaries)
    }

    fn segment(&self, target: NaifId, center: NaifId) -> Result<&Segment, NdastroError> {
        self.segments
            .get(&(target.to_id(), center.to_id()))
            .ok_or(NdastroError::MissingSegment {
                target: target.to_id(),
                center: center.to_id(),
            })
    }

    /// State of `target` relative to the center of its segment.
    fn relative_state(
        &self,
        target: NaifId,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), NdastroError> {
        let segment = self.segment(target, target.segment_center())?;
        if !segment.summary.covers(et_seconds) {
            return Err(NdastroError::EphemerisRange {
                instant: Epoch::from_et_seconds(et_seconds),
                start: Epoch::from_et_seconds(segment.summary.start_epoch),
                end: Epoch::from_et_seconds(segment.summary.end_epoch),
            });
        }
        Ok(segment.state(et_seconds))
    }

    /// Barycentric (ICRF) state of an object in km and km/s.
    pub fn barycentric_state(
        &self,
        target: NaifId,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), NdastroError> {
        let (mut position, mut velocity) = self.relative_state(target, et_seconds)?;
        let center = target.segment_center();
        if center != NaifId::SolarSystemBarycenter {
            let (p, v) = self.relative_state(center, et_seconds)?;
            position += p;
            velocity += v;
        }
        Ok((position, velocity))
    }

    /// Geocentric (ICRF) state of an object in km and km/s.
    pub fn geocentric_state_icrf(
        &self,
        target: NaifId,
        et_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), NdastroError> {
        if target == NaifId::Moon {
            // both segments are relative to the Earth-Moon barycenter
            let (pm, vm) = self.relative_state(NaifId::Moon, et_seconds)?;
            let (pe, ve) = self.relative_state(NaifId::Earth, et_seconds)?;
            return Ok((pm - pe, vm - ve));
        }
        let (pt, vt) = self.barycentric_state(target, et_seconds)?;
        let (pe, ve) = self.barycentric_state(NaifId::Earth, et_seconds)?;
        Ok((pt - pe, vt - ve))
    }

    /// Common coverage of the segments needed for geocentric states.
    pub fn valid_span(&self) -> (Epoch, Epoch) {
        let (start, end) = REQUIRED
            .iter()
            .filter_map(|id| self.segment(*id, id.segment_center()).ok())
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(s, e), seg| {
                (s.max(seg.summary.start_epoch), e.min(seg.summary.end_epoch))
            });
        if start > end || !start.is_finite() || !end.is_finite() {
            // nothing usable: an empty span at J2000
            return (Epoch::from_et_seconds(0.0), Epoch::from_et_seconds(0.0));
        }
        (Epoch::from_et_seconds(start), Epoch::from_et_seconds(end))
    }

    /// Version string of the kernel, from its text header.
    pub fn version(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.version.as_str())
    }
}

impl Ephemeris for NaifData {
    fn geocentric_state(&self, body: Body, epoch: &Epoch) -> Result<StateVector, NdastroError> {
        let target = NaifId::for_body(body)?;
        self.check_span(epoch)?;

        let (position, velocity) = self.geocentric_state_icrf(target, epoch.to_et_seconds())?;
        Ok(to_ecliptic_of_date(
            &RefSystem::Equm(RefEpoch::J2000),
            mjd_tt(epoch),
            position / AU,
            velocity * SECONDS_PER_DAY / AU,
        ))
    }

    fn valid_span(&self) -> (Epoch, Epoch) {
        NaifData::valid_span(self)
    }
}

impl fmt::Display for NaifData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.daf_header)?;
        if let Some(header) = &self.header {
            writeln!(f, "{header}")?;
        }
        let mut keys: Vec<_> = self.segments.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(segment) = self.segments.get(key) {
                writeln!(f, "{}", segment.summary)?;
                writeln!(f, "  {}", segment.directory)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_naif_file {
    use super::*;
    use crate::jpl_ephem::naif::{
        daf_header::test_daf_header::file_record,
        ephemeris_record::test_ephemeris_record::record_bytes,
        summary_record::test_summary::summary_bytes,
    };
    use approx::assert_relative_eq;

    /// One linear-motion segment: `center + offset + rate·(t − mid)` on x.
    pub(crate) struct SyntheticSegment {
        pub target: i32,
        pub center: i32,
        pub offset: Vector3<f64>,
        pub rate: Vector3<f64>,
    }

    /// Build an in-memory SPK kernel covering ±`half_span` seconds around J2000,
    /// one record per segment.
    pub(crate) fn synthetic_kernel(segments: &[SyntheticSegment], half_span: f64) -> Vec<u8> {
        let n_coeff = 3;
        let rsize = 2 + 3 * n_coeff;
        let segment_words = rsize + 4;

        // record 1: file record, record 2: comments, record 3: summaries
        let data_start_word = 3 * DAF_RECORD_BYTES / 8 + 1;
        let free = data_start_word + segments.len() * segment_words;
        let mut file = file_record(3, free as i32, "LTL-IEEE");

        let mut comments = b"JPL planetary and lunar ephemeris DE000\0Integrated 1 January 2000\0\0Time span covered by ephemeris:\0\01-JAN-2000 00:00 to   2-JAN-2000 00:00\0JD   2451544.5   to   JD   2451545.5\0\x04".to_vec();
        comments.resize(DAF_RECORD_BYTES, 0);
        file.extend(comments);

        let mut summary_record = Vec::new();
        for v in [0.0f64, 0.0, segments.len() as f64] {
            summary_record.extend_from_slice(&v.to_le_bytes());
        }
        let mut data = Vec::new();
        for (i, seg) in segments.iter().enumerate() {
            let initial_addr = data_start_word + i * segment_words;
            let final_addr = initial_addr + segment_words - 1;
            summary_record.extend(summary_bytes(&Summary {
                start_epoch: -half_span,
                end_epoch: half_span,
                target: seg.target,
                center: seg.center,
                frame_id: 1,
                data_type: 2,
                initial_addr: initial_addr as i32,
                final_addr: final_addr as i32,
            }));

            let record = EphemerisRecord {
                mid: 0.0,
                radius: half_span,
                x: vec![seg.offset.x, seg.rate.x * half_span, 0.0],
                y: vec![seg.offset.y, seg.rate.y * half_span, 0.0],
                z: vec![seg.offset.z, seg.rate.z * half_span, 0.0],
            };
            data.extend(record_bytes(&record));
            for v in [-half_span, 2.0 * half_span, rsize as f64, 1.0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        summary_record.resize(DAF_RECORD_BYTES, 0);
        file.extend(summary_record);
        file.extend(data);
        file
    }

    fn simple_kernel() -> Vec<u8> {
        synthetic_kernel(
            &[
                SyntheticSegment {
                    target: 3,
                    center: 0,
                    offset: Vector3::new(1.0e8, 0.0, 0.0),
                    rate: Vector3::new(0.0, 30.0, 0.0),
                },
                SyntheticSegment {
                    target: 399,
                    center: 3,
                    offset: Vector3::new(-4000.0, 0.0, 0.0),
                    rate: Vector3::new(0.0, -0.01, 0.0),
                },
                SyntheticSegment {
                    target: 301,
                    center: 3,
                    offset: Vector3::new(380000.0, 0.0, 0.0),
                    rate: Vector3::new(0.0, 1.0, 0.0),
                },
                SyntheticSegment {
                    target: 10,
                    center: 0,
                    offset: Vector3::new(0.0, 0.0, 0.0),
                    rate: Vector3::new(0.0, 0.0, 0.0),
                },
                // not a supported object: skipped
                SyntheticSegment {
                    target: 499,
                    center: 4,
                    offset: Vector3::new(1.0, 0.0, 0.0),
                    rate: Vector3::new(0.0, 0.0, 0.0),
                },
            ],
            86400.0,
        )
    }

    #[test]
    fn test_read_synthetic_kernel() {
        let naif = NaifData::from_bytes(&simple_kernel()).unwrap();
        assert_eq!(naif.daf_header.fward, 3);
        assert_eq!(naif.version(), Some("DE000"));
        assert_eq!(naif.segments.len(), 4);
        assert!(!naif.segments.contains_key(&(499, 4)));
    }

    #[test]
    fn test_geocentric_states() {
        let naif = NaifData::from_bytes(&simple_kernel()).unwrap();
        let et = 3600.0;

        let (moon_p, moon_v) = naif.geocentric_state_icrf(NaifId::Moon, et).unwrap();
        assert_relative_eq!(moon_p, Vector3::new(384000.0, 3636.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(moon_v, Vector3::new(0.0, 1.01, 0.0), epsilon = 1e-9);

        let (sun_p, sun_v) = naif.geocentric_state_icrf(NaifId::Sun, et).unwrap();
        assert_relative_eq!(
            sun_p,
            -Vector3::new(1.0e8 - 4000.0, 30.0 * 3600.0 - 0.01 * 3600.0, 0.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(sun_v, Vector3::new(0.0, -29.99, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_errors() {
        let naif = NaifData::from_bytes(&simple_kernel()).unwrap();
        assert_eq!(
            naif.geocentric_state_icrf(NaifId::MarsBarycenter, 0.0),
            Err(NdastroError::MissingSegment { target: 4, center: 0 })
        );
        assert!(matches!(
            naif.geocentric_state_icrf(NaifId::Moon, 1.0e6),
            Err(NdastroError::EphemerisRange { .. })
        ));

        let (start, end) = naif.valid_span();
        assert_relative_eq!(start.to_et_seconds(), -86400.0, epsilon = 1e-6);
        assert_relative_eq!(end.to_et_seconds(), 86400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reject_unsupported_type() {
        let mut bytes = simple_kernel();
        // data_type of the first summary: record 3, after 3 control words and 2 doubles + 3 ints
        let offset = 2 * DAF_RECORD_BYTES + 24 + 16 + 12;
        bytes[offset..offset + 4].copy_from_slice(&3i32.to_le_bytes());
        assert_eq!(
            NaifData::from_bytes(&bytes).unwrap_err(),
            NdastroError::InvalidSpkDataType(3)
        );
    }

    #[test]
    fn test_truncated_kernel() {
        let bytes = simple_kernel();
        // drops the skipped segment and the directory of the Sun segment
        assert!(NaifData::from_bytes(&bytes[..bytes.len() - 200]).is_err());
        assert!(NaifData::from_bytes(&bytes[..512]).is_err());
    }

    #[test]
    fn test_reject_corrupt_directory() {
        // words of the first segment directory: init, intlen, rsize, n
        let directory = 3 * DAF_RECORD_BYTES + 11 * 8;
        for (word, value) in [(2, f64::NAN), (3, f64::NAN), (3, 0.0), (2, 1e300), (1, -1.0)] {
            let mut bytes = simple_kernel();
            let offset = directory + 8 * word;
            bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
            assert!(
                matches!(
                    NaifData::from_bytes(&bytes),
                    Err(NdastroError::InvalidDafFile(_))
                ),
                "word {word} = {value}"
            );
        }

        // two records declared in a segment sized for one
        let mut bytes = simple_kernel();
        let offset = directory + 8 * 3;
        bytes[offset..offset + 8].copy_from_slice(&2.0f64.to_le_bytes());
        assert!(matches!(
            NaifData::from_bytes(&bytes),
            Err(NdastroError::InvalidDafFile(_))
        ));
    }

    #[test]
    fn test_reject_corrupt_summary_record() {
        let control = 2 * DAF_RECORD_BYTES;
        // next record pointer, then summary count
        for (word, value) in [(0, 1e300_f64), (2, 1e300), (2, 40.0)] {
            let mut bytes = simple_kernel();
            let offset = control + 8 * word;
            bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
            assert!(
                matches!(
                    NaifData::from_bytes(&bytes),
                    Err(NdastroError::InvalidDafFile(_))
                ),
                "word {word} = {value}"
            );
        }

        // negative segment address
        let mut bytes = simple_kernel();
        let offset = control + 24 + 16 + 16;
        bytes[offset..offset + 4].copy_from_slice(&(-5i32).to_le_bytes());
        assert!(matches!(
            NaifData::from_bytes(&bytes),
            Err(NdastroError::InvalidDafFile(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert_eq!(
            NaifData::read_naif_file(Utf8Path::new("/nonexistent/de440.bsp")).unwrap_err(),
            NdastroError::JPLFileNotFound("/nonexistent/de440.bsp".to_string())
        );
    }

    #[test]
    fn test_display() {
        let naif = NaifData::from_bytes(&simple_kernel()).unwrap();
        let output = naif.to_string();
        assert!(output.contains("JPL ephemeris DE000"));
        assert!(output.contains("Moon (301) relative to Earth-Moon Barycenter (3)"));
    }
}
