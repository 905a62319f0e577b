//! Encoder trait, the mirror of [`crate::decoder::Decoder`].

/// Encoder trait for converting from type `T` to type `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    type Error;

    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T> {}
