//! # kumiki
//!
//! Foundation of the kumiki codec toolkit.
//!
//! A schema written once with the `asn1` crate drives both directions of a
//! binary format:
//! ```text
//! bytes ──Window──▶ decode engine ──▶ Value
//! Value ──▶ encode engine ──Tree──▶ bytes
//! ```
//! This crate holds the pieces both engines and every wire format share:
//!
//! - [`window::Window`]: bounds-checked cursor over decoder input
//! - [`tree::Tree`]: length-summing tree of encoder output
//! - [`value::Value`]: the structured value exchanged with callers
//! - [`kind::Kind`]: primitive and structural kinds a schema node can declare
//! - [`backend::Backend`]: capability interface a wire format implements
//! - [`decoder::Decoder`] / [`encoder::Encoder`]: type-safe conversion traits

#![forbid(unsafe_code)]

pub mod backend;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod kind;
pub mod tree;
pub mod value;
pub mod window;

pub use backend::{Args, Backend, Names};
pub use error::{Error, Result};
pub use kind::{Class, Kind, TagSpec};
pub use tree::Tree;
pub use value::{BitString, Oid, Value};
pub use window::Window;
