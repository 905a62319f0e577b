//! Labelled base64 sections (RFC 7468 textual encoding).
//!
//! ```
//! use pem::{Label, Pem};
//!
//! let pem = Pem::from_bytes(Label::new("model"), &[0x30, 0x00]);
//! assert_eq!("-----BEGIN MODEL-----\nMAA=\n-----END MODEL-----", pem.to_string());
//! ```

pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use error::Error;
use kumiki::decoder::{DecodableFrom, Decoder};
use regex::Regex;

const LINE_WIDTH: usize = 64;
const BOUNDARY_PATTERN: &str = r"^-----(BEGIN|END) ([^-]+)-----$";

/// Section label, always held upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl AsRef<str>) -> Self {
        Label(label.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = Label::new(s);
        if label.0.is_empty() || label.0.contains('-') {
            return Err(Error::InvalidLabel(s.to_string()));
        }
        Ok(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Begin,
    End,
}

/// Matches one boundary line, returning its kind and label.
struct BoundaryMatcher {
    re: Regex,
}

impl BoundaryMatcher {
    fn new() -> Result<Self, Error> {
        let re = Regex::new(BOUNDARY_PATTERN).map_err(|_| Error::InvalidEncapsulationBoundary)?;
        Ok(BoundaryMatcher { re })
    }

    fn matches(&self, line: &str) -> Option<(Boundary, Label)> {
        let captured = self.re.captures(line.trim_end())?;
        let boundary = match captured.get(1)?.as_str() {
            "BEGIN" => Boundary::Begin,
            _ => Boundary::End,
        };
        Some((boundary, Label::new(captured.get(2)?.as_str())))
    }
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: Label,
    base64_data: String, // base64 encoded data
}

impl Pem {
    pub fn new(label: Label, base64_data: String) -> Self {
        Pem { label, base64_data }
    }

    pub fn from_bytes(label: Label, data: &[u8]) -> Self {
        let base64_data = STANDARD.encode(data);
        Pem { label, base64_data }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }

    /// Extracts the first section labelled `label` from `text`.
    ///
    /// Boundary lines with other labels are skipped, so the wanted section may
    /// sit among unrelated ones. The first matching BEGIN opens the section and
    /// the next matching END closes it; a matching END before the BEGIN, or a
    /// second matching BEGIN before the END, ends the search.
    pub fn find(text: &str, label: &Label) -> Result<Pem, Error> {
        let matcher = BoundaryMatcher::new()?;
        let lines: Vec<&str> = text.split(['\r', '\n']).collect();

        let mut start = None;
        let mut end = None;
        for (i, line) in lines.iter().enumerate() {
            let Some((boundary, found)) = matcher.matches(line) else {
                continue;
            };
            if found != *label {
                continue;
            }
            match (start, boundary) {
                (None, Boundary::Begin) => start = Some(i),
                (Some(_), Boundary::End) => {
                    end = Some(i);
                    break;
                }
                _ => break,
            }
        }

        let (Some(start), Some(end)) = (start, end) else {
            return Err(Error::SectionNotFound(label.to_string()));
        };
        let body = lines
            .get(start + 1..end)
            .unwrap_or_default()
            .concat()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
            .collect();
        Ok(Pem::new(label.clone(), body))
    }
}

impl Display for Pem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-----BEGIN {}-----", self.label)?;
        // RFC 7468: base64 text should be wrapped at 64 characters
        for chunk in self.base64_data.as_bytes().chunks(LINE_WIDTH) {
            let line = std::str::from_utf8(chunk).map_err(|_| std::fmt::Error)?;
            writeln!(f, "{}", line)?;
        }
        write!(f, "-----END {}-----", self.label)
    }
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>, Self::Error> {
        // This discards label information from Pem format.
        let decoded = STANDARD.decode(self.data()).map_err(Error::Base64Decode)?;
        Ok(decoded)
    }
}

/// Parse every PEM section in a string, whatever its label.
///
/// # Example
/// ```
/// use pem::parse_many;
///
/// let pem_data = "-----BEGIN CERTIFICATE-----\nAAA=\n-----END CERTIFICATE-----\n-----BEGIN MODEL-----\nBBB=\n-----END MODEL-----";
/// let pems = parse_many(pem_data).unwrap();
/// assert_eq!(pems.len(), 2);
/// assert_eq!("MODEL", pems[1].label().as_str());
/// ```
pub fn parse_many(s: &str) -> Result<Vec<Pem>, Error> {
    let matcher = BoundaryMatcher::new()?;
    let mut pems = Vec::new();
    let mut current: Option<(Label, String)> = None;

    for line in s.lines() {
        match (matcher.matches(line), current.take()) {
            (Some((Boundary::Begin, label)), None) => current = Some((label, String::new())),
            (Some((Boundary::Begin, _)), Some(_)) => {
                return Err(Error::MissingPostEncapsulationBoundary);
            }
            (Some((Boundary::End, _)), None) => return Err(Error::MissingPreEncapsulationBoundary),
            (Some((Boundary::End, end)), Some((begin, data))) => {
                if begin != end {
                    return Err(Error::LabelMismatch {
                        begin: begin.to_string(),
                        end: end.to_string(),
                    });
                }
                if data.is_empty() {
                    return Err(Error::MissingData);
                }
                pems.push(Pem::new(begin, data));
            }
            (None, Some((label, mut data))) => {
                data.push_str(line.trim());
                current = Some((label, data));
            }
            // explanatory text outside of a section
            (None, None) => {}
        }
    }

    if current.is_some() {
        return Err(Error::MissingPostEncapsulationBoundary);
    }
    if pems.is_empty() {
        return Err(Error::MissingPreEncapsulationBoundary);
    }
    Ok(pems)
}

impl FromStr for Pem {
    type Err = Error;

    /// Parses the first section of any label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_many(s)?
            .into_iter()
            .next()
            .ok_or(Error::MissingPreEncapsulationBoundary)
    }
}
