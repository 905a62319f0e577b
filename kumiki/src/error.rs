//! Error types shared by the input window and the format back ends.

use thiserror::Error;

use crate::kind::Kind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while moving through input bytes or converting primitives.
///
/// Back ends report their own wire-level failures through [`Error::Format`],
/// keeping the concrete error available as the source.
#[derive(Debug, Error)]
pub enum Error {
    #[error("window overrun at offset {offset}: {needed} byte(s) requested, {available} available")]
    Overrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{kind}: expected {expected} value")]
    TypeMismatch { kind: Kind, expected: &'static str },

    #[error("{format}: {source}")]
    Format {
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn format<E>(format: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Format {
            format,
            source: Box::new(source),
        }
    }
}
