//! zlib transforms applied around an encoded message.
//!
//! Compression is not part of the wire format. Generated code for schemas
//! with `use zlib-compress` wraps its marshalled bytes with [`compress`] and
//! unwraps them with [`decompress`] before decoding.
use {
    crate::error::Result,
    flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression},
    std::io::{Read, Write},
};

pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(input.len() / 2), Compression::default());
    encoder.write_all(input)?;
    Ok(encoder.finish()?)
}

pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len().saturating_mul(2));
    ZlibDecoder::new(input).read_to_end(&mut out)?;
    Ok(out)
}
