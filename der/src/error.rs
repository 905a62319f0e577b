use kumiki::kind::{Kind, TagSpec};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("parser error {0:?}")]
    Parser(nom::error::ErrorKind),
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),

    // Header errors
    #[error("failed to match tag: expected {expected}, found {found}")]
    TagMismatch { expected: TagSpec, found: String },
    #[error("indefinite length is not allowed in DER")]
    IndefiniteLength,

    #[error("{0} is not a primitive kind")]
    NotPrimitive(Kind),

    // Boolean / Null
    #[error("invalid boolean")]
    InvalidBoolean,
    #[error("NULL: unexpected content of {0} byte(s)")]
    NullWithContent(usize),

    // Integer / Enumerated
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("failed to find enum value: {0}")]
    EnumValueNotFound(String),

    // ObjectIdentifier
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: arc overflows 64 bits")]
    ObjectIdentifierArcOverflow,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: invalid first arcs {0}.{1}")]
    ObjectIdentifierInvalidFirstArcs(u64, u64),
    #[error("OBJECT IDENTIFIER: invalid component in '{0}'")]
    ObjectIdentifierInvalidString(String),

    // BitString
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),

    // Strings
    #[error("{0}: invalid UTF-8")]
    InvalidUtf8(Kind),
    #[error("numstr: unsupported characters")]
    NumericStringInvalidCharacters,
    #[error("printstr: unsupported characters")]
    PrintableStringInvalidCharacters,
    #[error("bmpstr: odd byte length {0}")]
    BmpStringOddLength(usize),
    #[error("bmpstr: invalid UTF-16 sequence")]
    BmpStringInvalidUtf16,

    // Time
    #[error("{kind}: invalid format '{input}'")]
    InvalidTime { kind: Kind, input: String },
    #[error("utctime: year {0} cannot be represented")]
    UtcTimeYearOutOfRange(i32),
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parser(e.code),
        }
    }
}

impl From<Error> for kumiki::Error {
    fn from(err: Error) -> Self {
        kumiki::Error::format("der", err)
    }
}
