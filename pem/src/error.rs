use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when locating or decoding PEM sections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No BEGIN/END pair carries the requested label.
    #[error("section not found for: {0}")]
    SectionNotFound(String),

    /// An END boundary appeared before any BEGIN
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// A BEGIN boundary was never closed
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// No data found between boundary markers
    #[error("missing PEM data")]
    MissingData,

    #[error("invalid label: {0:?}")]
    InvalidLabel(String),

    /// The BEGIN and END labels do not match (e.g., BEGIN CERTIFICATE, END PRIVATE KEY)
    #[error("label doesn't match: BEGIN {begin}, END {end}")]
    LabelMismatch { begin: String, end: String },

    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
