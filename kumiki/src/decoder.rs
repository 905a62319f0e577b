//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source `T` into a destination `D`. The marker
//! trait `DecodableFrom<T>` has to be implemented on `D` first, so only the
//! conversions a crate declares explicitly are available:
//!
//! ```no_run
//! use kumiki::decoder::{DecodableFrom, Decoder};
//!
//! struct Text(String);
//! struct Upper(String);
//!
//! #[derive(Debug)]
//! struct MyError;
//!
//! impl DecodableFrom<Text> for Upper {}
//!
//! impl Decoder<Text, Upper> for Text {
//!     type Error = MyError;
//!
//!     fn decode(&self) -> Result<Upper, Self::Error> {
//!         Ok(Upper(self.0.to_uppercase()))
//!     }
//! }
//! ```
//!
//! The `pem` crate uses it to turn a section into its decoded
//! bytes; the `der` crate uses it to read identifier and length octets.

/// Decoder trait for converting from type `T` to type `D`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
pub trait DecodableFrom<T> {}
