//! DER back end.
//!
//! Implements [`kumiki::Backend`] for the Distinguished Encoding Rules:
//! identifier and length octets are read with `nom`, primitive contents are
//! converted in [`primitive`].

use kumiki::backend::{Args, Backend};
use kumiki::decoder::{DecodableFrom, Decoder};
use kumiki::encoder::{EncodableTo, Encoder};
use kumiki::kind::{Class, Kind, TagSpec};
use kumiki::tree::Tree;
use kumiki::value::Value;
use kumiki::window::Window;
use nom::{IResult, Parser};

pub mod error;
mod primitive;

use error::Error;

pub const TAG_CONSTRUCTED: u8 = 0x20;
const TAG_HIGH_FORM: u8 = 0x1f;

/// The DER format back end.
#[derive(Debug, Clone, Copy, Default)]
pub struct Der;

impl Backend for Der {
    fn name(&self) -> &'static str {
        "der"
    }

    fn peek_tag(&self, window: &Window<'_>, tag: TagSpec, allow_any: bool) -> kumiki::Result<bool> {
        if window.is_empty() {
            return Ok(false);
        }
        let (_, identifier) = parse_identifier(window.rest()).map_err(Error::from)?;
        Ok(allow_any || identifier.matches(tag))
    }

    fn consume_tag<'a>(
        &self,
        window: &mut Window<'a>,
        tag: TagSpec,
        allow_any: bool,
    ) -> kumiki::Result<Window<'a>> {
        let header: Header = window.rest().decode()?;
        if !allow_any && !header.identifier.matches(tag) {
            return Err(Error::TagMismatch {
                expected: tag,
                found: header.identifier.to_string(),
            }
            .into());
        }
        let length = header.length.ok_or(Error::IndefiniteLength)?;
        window.skip(header.header_len)?;
        window.skip(length)
    }

    fn decode_primitive(
        &self,
        kind: Kind,
        window: &mut Window<'_>,
        args: &Args,
    ) -> kumiki::Result<Value> {
        primitive::decode(kind, window.read_all(), args).map_err(Into::into)
    }

    fn encode_composite(
        &self,
        tag: u32,
        primitive: bool,
        class: Class,
        content: Tree,
    ) -> kumiki::Result<Tree> {
        let header = Header {
            identifier: Identifier {
                class,
                constructed: !primitive,
                number: tag,
            },
            length: Some(content.len()),
            header_len: 0,
        };
        let header: Vec<u8> = header.encode()?;
        Ok(Tree::concat(vec![Tree::Bytes(header), content]))
    }

    fn encode_primitive(&self, kind: Kind, value: &Value, args: &Args) -> kumiki::Result<Tree> {
        primitive::encode(kind, value, args).map(Tree::Bytes)
    }
}

/// Identifier octets: class, constructed flag and tag number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    pub class: Class,
    pub constructed: bool,
    pub number: u32,
}

impl Identifier {
    pub fn matches(&self, tag: TagSpec) -> bool {
        match tag {
            TagSpec::Any => true,
            _ => tag.class() == Some(self.class) && tag.number() == Some(self.number),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.class {
            Class::Universal => write!(f, "universal {}", self.number),
            class => write!(f, "{} [{}]", class, self.number),
        }
    }
}

/// A complete TLV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub identifier: Identifier,
    /// Content length, `None` for the (rejected) indefinite form.
    pub length: Option<usize>,
    /// Number of octets the identifier and length occupied on the wire.
    pub header_len: usize,
}

impl DecodableFrom<&[u8]> for Header {}

impl Decoder<&[u8], Header> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Header, Self::Error> {
        let (_, header) = parse_header(self)?;
        Ok(header)
    }
}

impl EncodableTo<Header> for Vec<u8> {}

impl Encoder<Header, Vec<u8>> for Header {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let Identifier {
            class,
            constructed,
            number,
        } = self.identifier;
        let mut out = Vec::with_capacity(8);
        let mut first = (class as u8) << 6;
        if constructed {
            first |= TAG_CONSTRUCTED;
        }
        if number < TAG_HIGH_FORM as u32 {
            out.push(first | number as u8);
        } else {
            out.push(first | TAG_HIGH_FORM);
            out.extend(base128(number as u64));
        }

        let length = self.length.ok_or(Error::IndefiniteLength)?;
        if length < 0x80 {
            out.push(length as u8);
        } else {
            let bytes = length.to_be_bytes();
            let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
            let significant = bytes.get(start..).unwrap_or_default();
            out.push(0x80 | significant.len() as u8);
            out.extend_from_slice(significant);
        }
        Ok(out)
    }
}

/// Big-endian base-128 with continuation bits, as used by high tag numbers and OID arcs.
pub(crate) fn base128(mut value: u64) -> Vec<u8> {
    let mut encoded = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        encoded.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    encoded.reverse();
    encoded
}

fn parse_header(input: &[u8]) -> IResult<&[u8], Header> {
    let total = input.len();
    let (input, identifier) = parse_identifier(input)?;
    let (input, length) = parse_length(input)?;
    Ok((
        input,
        Header {
            identifier,
            length,
            header_len: total - input.len(),
        },
    ))
}

fn parse_identifier(input: &[u8]) -> IResult<&[u8], Identifier> {
    let (mut input, n) = nom::number::complete::be_u8(input)?;
    let class = Class::from(n >> 6);
    let constructed = n & TAG_CONSTRUCTED == TAG_CONSTRUCTED;
    let mut number = (n & TAG_HIGH_FORM) as u32;
    if number == TAG_HIGH_FORM as u32 {
        // high tag number form: base-128 continuation octets follow
        number = 0;
        loop {
            let (rest, oct) = nom::number::complete::be_u8(input)?;
            input = rest;
            if number > (u32::MAX >> 7) {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::TooLarge,
                )));
            }
            number = (number << 7) | (oct & 0x7f) as u32;
            if oct & 0x80 == 0 {
                break;
            }
        }
    }
    Ok((
        input,
        Identifier {
            class,
            constructed,
            number,
        },
    ))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], Option<usize>> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let length = n & 0x7f;
        if length == 0 {
            return Ok((input, None));
        }
        if length > 4 {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::TooLarge,
            )));
        }
        let (input, bs) = nom::bytes::complete::take(length).parse(input)?;
        let n = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
        return Ok((input, Some(n)));
    }
    // short form: 0-127
    Ok((input, Some(n as usize)))
}
