//! Parser for the text header JPL writes in the comment area of DE kernels.
//!
//! The relevant lines look like:
//!
//! ```text
//! JPL planetary and lunar ephemeris DE440
//! Integrated 25 June 2020
//! ...
//! Time span covered by ephemeris:
//!
//! 31-DEC-1549 00:00 to   25-JAN-2650 00:00
//! JD   2287184.5   to   JD   2688976.5
//! ```
//!
//! Kernels without this block (small custom extracts, for instance) are
//! still readable: the header is then simply absent.
use std::fmt;

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::{multispace0, not_line_ending, space0, space1},
    number::complete::double,
    IResult, Parser,
};

#[derive(Debug, PartialEq, Clone)]
pub struct JPLEphemHeader {
    pub version: String,
    pub creation_date: String,
    pub start_ephem: String,
    pub end_ephem: String,
    pub start_jd: f64,
    pub end_jd: f64,
}

/// Skip ahead to `marker`, consume it and return the rest of its line.
fn line_after<'a>(
    marker: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    (take_until(marker), tag(marker), not_line_ending)
        .map(|(_, _, line): (&'a str, &'a str, &'a str)| line.trim())
}

fn parse_date_range(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = (
        take_until("Time span covered by ephemeris:"),
        tag("Time span covered by ephemeris:"),
        multispace0,
    )
        .parse(input)?;
    let (input, (start, _, _, end)) =
        (take_until(" to "), space0, tag("to"), not_line_ending).parse(input)?;
    Ok((input, (start.trim(), end.trim())))
}

fn parse_jd_range(input: &str) -> IResult<&str, (f64, f64)> {
    let (input, (_, _, _, start_jd, _, _, _, _, _, end_jd)) = (
        multispace0,
        tag("JD"),
        space1,
        double,
        space1,
        tag("to"),
        space1,
        tag("JD"),
        space1,
        double,
    )
        .parse(input)?;
    Ok((input, (start_jd, end_jd)))
}

impl JPLEphemHeader {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (input, version) = line_after("JPL planetary and lunar ephemeris").parse(input)?;
        let (input, creation_date) = line_after("Integrated").parse(input)?;
        let (input, (start_ephem, end_ephem)) = parse_date_range(input)?;
        let (input, (start_jd, end_jd)) = parse_jd_range(input)?;

        Ok((
            input,
            JPLEphemHeader {
                version: version.to_string(),
                creation_date: creation_date.to_string(),
                start_ephem: start_ephem.to_string(),
                end_ephem: end_ephem.to_string(),
                start_jd,
                end_jd,
            },
        ))
    }
}

impl fmt::Display for JPLEphemHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "JPL ephemeris {} (integrated {})", self.version, self.creation_date)?;
        write!(
            f,
            "  coverage: {} -> {} (JD {:.1} -> {:.1})",
            self.start_ephem, self.end_ephem, self.start_jd, self.end_jd
        )
    }
}

#[cfg(test)]
mod test_jpl_header {
    use super::*;

    const DE440_COMMENT: &str = "; de440.bsp comments\n\
JPL planetary and lunar ephemeris DE440\n\
Integrated 25 June 2020\n\
\n\
Time span covered by ephemeris:\n\
\n\
31-DEC-1549 00:00 to   25-JAN-2650 00:00\n\
JD   2287184.5   to   JD   2688976.5\n\
\n\
Bodies on the file: ...\n";

    fn de440_header() -> JPLEphemHeader {
        JPLEphemHeader {
            version: "DE440".to_string(),
            creation_date: "25 June 2020".to_string(),
            start_ephem: "31-DEC-1549 00:00".to_string(),
            end_ephem: "25-JAN-2650 00:00".to_string(),
            start_jd: 2287184.5,
            end_jd: 2688976.5,
        }
    }

    #[test]
    fn test_parse_jpl_header() {
        let (_, header) = JPLEphemHeader::parse(DE440_COMMENT).unwrap();
        assert_eq!(header, de440_header());
    }

    #[test]
    fn test_missing_header() {
        assert!(JPLEphemHeader::parse("custom kernel without the usual block").is_err());
    }

    #[test]
    fn test_jpl_header_display() {
        let expected = "JPL ephemeris DE440 (integrated 25 June 2020)
  coverage: 31-DEC-1549 00:00 -> 25-JAN-2650 00:00 (JD 2287184.5 -> 2688976.5)";
        assert_eq!(de440_header().to_string(), expected);
    }
}
