//! # asn1
//!
//! Declarative ASN.1 schemas driving both decoding and encoding.
//!
//! A schema is written once with the [`Dsl`] vocabulary and then used in both
//! directions through a format back end:
//!
//! ```
//! use asn1::{DecodeOptions, Dsl, EncodeOptions, Format, Value, define};
//!
//! let model = define("Model", |s| {
//!     s.seq().obj([s.key("a").int(), s.key("c").int().optional()])
//! })
//! .unwrap();
//!
//! let value = Value::object([("a", Value::from(123i64))]);
//! let der = model.encode(&value, Format::Der, &EncodeOptions::default()).unwrap();
//! assert_eq!(vec![0x30, 0x03, 0x02, 0x01, 0x7b], der);
//!
//! let decoded = model.decode(&der, Format::Der, DecodeOptions::default()).unwrap();
//! assert_eq!(Some(&value), decoded.value());
//! ```

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use der::Der;
use kumiki::backend::Backend;
use kumiki::decoder::Decoder;
use kumiki::window::Window;
use pem::{Label, Pem};
use tracing::debug;

mod builder;
mod decode;
mod encode;
pub mod error;
mod node;
mod reporter;

pub use builder::{Dsl, NodeBuilder, Scope};
pub use error::{Cause, Error, Path, Result, SchemaError};
pub use kumiki::{BitString, Kind, Names, Oid, Value};
pub use node::{Node, Schema};

use decode::DecodeEngine;
use encode::EncodeEngine;
use reporter::Reporter;

/// Defines a schema named `name` whose root is built by `body`.
///
/// Every authoring mistake in the body is reported here, never later during
/// decoding or encoding.
pub fn define<F>(name: impl Into<String>, body: F) -> Result<Schema>
where
    F: FnOnce(Scope) -> NodeBuilder,
{
    let schema = Schema::declare(name);
    schema.define_body(body)?;
    Ok(schema)
}

/// Nesting limit used when the options leave it unset.
///
/// Every schema node entered counts as one level, so a `seq_of` element
/// reached through a `choice` costs two.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Wire format of a decode or encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Der,
    /// DER wrapped in a labelled base64 section.
    Pem,
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Der => write!(f, "der"),
            Format::Pem => write!(f, "pem"),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "der" => Ok(Format::Der),
            "pem" => Ok(Format::Pem),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Which boundary an offset-tracking event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// From the first identifier octet to the end of the content.
    Tagged,
    /// The content octets only.
    Content,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Tagged => write!(f, "tagged"),
            Phase::Content => write!(f, "content"),
        }
    }
}

/// Receiver of offset-tracking events, in input order.
pub trait Track {
    fn track(&mut self, path: &str, start: usize, end: usize, phase: Phase);
}

impl<F> Track for F
where
    F: FnMut(&str, usize, usize, Phase),
{
    fn track(&mut self, path: &str, start: usize, end: usize, phase: Phase) {
        self(path, start, end, phase)
    }
}

#[derive(Default)]
pub struct DecodeOptions<'t> {
    /// Collect errors and return a best-effort result instead of failing.
    pub partial: bool,
    /// Section label, required for [`Format::Pem`].
    pub label: Option<String>,
    pub track: Option<&'t mut dyn Track>,
    /// Nesting limit; [`DEFAULT_MAX_DEPTH`] when `None`.
    pub max_depth: Option<usize>,
}

impl<'t> DecodeOptions<'t> {
    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn track(mut self, track: &'t mut dyn Track) -> Self {
        self.track = Some(track);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl Debug for DecodeOptions<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("partial", &self.partial)
            .field("label", &self.label)
            .field("track", &self.track.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Section label, required for [`Format::Pem`].
    pub label: Option<String>,
    /// Nesting limit; [`DEFAULT_MAX_DEPTH`] when `None`.
    pub max_depth: Option<usize>,
}

impl EncodeOptions {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Outcome of [`Schema::decode`].
#[derive(Debug)]
pub enum Decoded {
    Value(Value),
    /// Partial mode: whatever was decoded plus every recorded error.
    /// `result` is `None` when the top-level construct itself failed.
    Partial {
        result: Option<Value>,
        errors: Vec<Error>,
    },
}

impl Decoded {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Decoded::Value(v) => Some(v),
            Decoded::Partial { result, .. } => result.as_ref(),
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Decoded::Value(v) => Some(v),
            Decoded::Partial { result, .. } => result,
        }
    }

    pub fn errors(&self) -> &[Error] {
        match self {
            Decoded::Value(_) => &[],
            Decoded::Partial { errors, .. } => errors,
        }
    }
}

impl Schema {
    /// Supplies the body of a schema created with [`Schema::declare`].
    pub fn define_body<F>(&self, body: F) -> Result<()>
    where
        F: FnOnce(Scope) -> NodeBuilder,
    {
        let (node, errors) = body(Scope).finish();
        if let Some(err) = errors.into_iter().next() {
            return Err(err.into());
        }
        let root = self.set_root(Arc::new(node))?;
        root.finalize();
        debug!(schema = self.name(), "schema defined");
        Ok(())
    }

    pub fn decode(&self, data: &[u8], format: Format, options: DecodeOptions<'_>) -> Result<Decoded> {
        let der = match format {
            Format::Der => Cow::Borrowed(data),
            Format::Pem => {
                let label = options.label.as_deref().ok_or(Error::MissingLabel)?;
                let text = String::from_utf8_lossy(data);
                let pem = Pem::find(&text, &Label::new(label))?;
                let bytes: Vec<u8> = pem.decode()?;
                Cow::Owned(bytes)
            }
        };
        self.decode_with(&Der, &der, options)
    }

    /// Decodes `data` with an arbitrary back end.
    pub fn decode_with<B: Backend>(
        &self,
        backend: &B,
        data: &[u8],
        options: DecodeOptions<'_>,
    ) -> Result<Decoded> {
        let root = self.defined_root().map_err(|cause| Error::Decode {
            path: Path::default(),
            cause,
        })?;
        let mut rep = Reporter::new(options.partial, options.track.is_some())
            .with_max_depth(options.max_depth.unwrap_or(DEFAULT_MAX_DEPTH));
        let mut input = Window::new(data);
        debug!(schema = self.name(), backend = backend.name(), len = data.len(), "decoding");
        let result = DecodeEngine::new(backend).decode_node(root, &mut input, &mut rep);

        if let Some(track) = options.track {
            for event in rep.take_events() {
                track.track(&event.path, event.start, event.end, event.phase);
            }
        }

        if !options.partial {
            return result.map(|v| Decoded::Value(v.unwrap_or(Value::Null)));
        }
        let result = match result {
            Ok(v) => Some(v.unwrap_or(Value::Null)),
            Err(err) => {
                rep.record(err)?;
                None
            }
        };
        Ok(Decoded::Partial {
            result,
            errors: rep.take_errors(),
        })
    }

    pub fn encode(&self, value: &Value, format: Format, options: &EncodeOptions) -> Result<Vec<u8>> {
        let der = self.encode_with(&Der, value, options)?;
        match format {
            Format::Der => Ok(der),
            Format::Pem => {
                let label = options.label.as_deref().ok_or(Error::MissingLabel)?;
                Ok(Pem::from_bytes(Label::new(label), &der)
                    .to_string()
                    .into_bytes())
            }
        }
    }

    /// Encodes `value` with an arbitrary back end.
    pub fn encode_with<B: Backend>(
        &self,
        backend: &B,
        value: &Value,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>> {
        let root = self.defined_root().map_err(|cause| Error::Encode {
            path: Path::default(),
            cause,
        })?;
        let mut rep = Reporter::new(false, false)
            .with_max_depth(options.max_depth.unwrap_or(DEFAULT_MAX_DEPTH));
        let tree = EncodeEngine::new(backend).encode_node(root, Some(value), &mut rep)?;
        Ok(tree.map(|t| t.join()).unwrap_or_default())
    }
}
