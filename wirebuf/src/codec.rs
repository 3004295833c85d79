//! Entry points for the structural codec.
use crate::{
    buffer::Buffer,
    error::Result,
    schema::{Decode, Encode},
};

/// Encode `src` into a new byte vector.
///
/// The vector is sized up front from [`Encode::size_of`].
pub fn marshal<T>(src: &T) -> Result<Vec<u8>>
where
    T: Encode<Src = T> + ?Sized,
{
    T::marshal(src)
}

/// Encode `src` at the write cursor of `buf`.
#[inline]
pub fn marshal_into<T>(buf: &mut Buffer<'_>, src: &T) -> Result<()>
where
    T: Encode<Src = T> + ?Sized,
{
    T::encode(buf, src)
}

/// Exact number of bytes [`marshal`] would produce for `src`.
#[inline]
pub fn encoded_size<T>(src: &T) -> Result<usize>
where
    T: Encode<Src = T> + ?Sized,
{
    T::size_of(src)
}

/// Decode a `T` from the front of `bytes`.
///
/// Trailing bytes are ignored.
pub fn unmarshal<T>(bytes: &[u8]) -> Result<T>
where
    T: Decode<Dst = T>,
{
    T::unmarshal(bytes)
}

/// Decode a `T` at the read cursor of `buf`.
#[inline]
pub fn unmarshal_from<T>(buf: &mut Buffer<'_>) -> Result<T>
where
    T: Decode<Dst = T>,
{
    T::decode(buf)
}

/// Decode from `bytes` over an existing `dst`.
///
/// `dst` is left as it was when decoding fails.
pub fn unmarshal_into<T>(bytes: &[u8], dst: &mut T) -> Result<()>
where
    T: Decode<Dst = T>,
{
    T::decode_into(&mut Buffer::from_slice(bytes), dst)
}

/// Helper over [`Encode`] for serializing directly to a vector.
///
/// Blanket implemented for every schema, which makes it the natural way to
/// encode through an adapter: `Fixed::<u32>::marshal(&7)`.
pub trait Marshal: Encode {
    fn marshal(src: &Self::Src) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(Self::size_of(src)?);
        Self::encode(&mut Buffer::from_writer(&mut out), src)?;
        Ok(out)
    }
}

impl<T: Encode + ?Sized> Marshal for T {}

/// Helper over [`Decode`] for deserializing directly from a byte slice.
pub trait Unmarshal: Decode {
    fn unmarshal(bytes: &[u8]) -> Result<Self::Dst> {
        Self::decode(&mut Buffer::from_slice(bytes))
    }
}

impl<T: Decode + ?Sized> Unmarshal for T {}
