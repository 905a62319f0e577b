//! Error types for schema authoring, decoding and encoding.

use std::fmt::{Display, Formatter};

use kumiki::kind::Kind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`crate::define`] and the decode/encode entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("{cause} at: {path}")]
    Decode { path: Path, cause: Cause },

    #[error("{cause} at: {path}")]
    Encode { path: Path, cause: Cause },

    #[error("pem: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("not supported format: {0}")]
    UnsupportedFormat(String),

    #[error("label option is required for pem")]
    MissingLabel,
}

impl Error {
    /// Field path of a decode or encode failure.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Decode { path, .. } | Error::Encode { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Error::Decode { cause, .. } | Error::Encode { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// What went wrong at a given field path.
#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Codec(#[from] kumiki::Error),

    #[error("no choice matched")]
    NoChoiceMatched,

    #[error("unknown choice: {0}")]
    UnknownChoice(String),

    #[error("choice expected, but input is {0}")]
    NotAChoice(&'static str),

    #[error("child expected, but input is not an object")]
    NotAnObject,

    #[error("required field is missing")]
    MissingField,

    #[error("raw bytes expected, but input is {0}")]
    NotRaw(&'static str),

    #[error("seqof/setof, but input is {0}")]
    NotAList(&'static str),

    #[error("schema {0} is declared but never defined")]
    Undefined(String),

    #[error("tag could be omitted only for indirection nodes")]
    TagOmitted,

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Field path joined with `/`; empty at the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(pub Vec<String>);

impl Path {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "(shallow)")
        } else {
            write!(f, "{}", self.0.join("/"))
        }
    }
}

/// Programmer errors detected while a schema is being authored.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("tag already set to {current}, cannot set {requested}")]
    TagAlreadySet { current: Kind, requested: Kind },
    #[error("key already set to {0:?}")]
    KeyAlreadySet(String),
    #[error("use already set")]
    UseAlreadySet,
    #[error("contains already set")]
    ContainsAlreadySet,
    #[error("default already set")]
    DefaultAlreadySet,
    #[error("explicit tag already set")]
    ExplicitAlreadySet,
    #[error("implicit tag already set")]
    ImplicitAlreadySet,
    #[error("explicit and implicit tagging are mutually exclusive")]
    ExplicitImplicitConflict,
    #[error("children already set")]
    ChildrenAlreadySet,
    #[error("choice already set")]
    ChoiceAlreadySet,
    #[error("use cannot be combined with tag {0}")]
    UseWithTag(Kind),
    #[error("contains requires octstr or bitstr, found {0}")]
    ContainsOnNonString(String),
    #[error("child should have a key")]
    ChildWithoutKey,
    #[error("duplicate child key {0:?}")]
    DuplicateKey(String),
    #[error("duplicate choice branch {0:?}")]
    DuplicateBranch(String),
    #[error("choice needs at least one branch")]
    EmptyChoice,
    #[error("{0} needs an element schema")]
    MissingElement(Kind),
    #[error("tag could be omitted only for indirection nodes")]
    TagOmitted,
    #[error("schema {0} is already defined")]
    AlreadyDefined(String),
}
