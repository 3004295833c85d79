//! Error types and helpers.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{backend} backend does not support {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
    #[error("{0} backend is read-only")]
    ReadOnly(&'static str),
    #[error("{0} backend is closed")]
    Closed(&'static str),
    #[error("Seek to {pos} is out of bounds (size {size})")]
    SeekOutOfBounds { pos: u64, size: u64 },
    #[error("Unexpected end of data: needed {needed} bytes, got {got}")]
    EndOfData { needed: usize, got: usize },
    #[error("Encoded length {len} exceeds remaining input of {available} bytes")]
    LengthExceedsInput { len: u64, available: u64 },
    #[error("Varint exceeds {0} bits")]
    VarintOverflow(u32),
    #[error("Encoded value {value} does not fit in {target}")]
    IntegerOverflow { value: i128, target: &'static str },
    #[error("Invalid enum discriminant {0}")]
    InvalidTagEncoding(u64),
    #[error("Invalid UUID: {0:?}")]
    InvalidUuid(String),
    #[error("Invalid char encoding")]
    InvalidCharEncoding,
    #[error(transparent)]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i128),
    #[error("Cannot encode a null reference of {0}")]
    NullReference(&'static str),
    #[error("Unable to encode type {0}")]
    UnsupportedKind(&'static str),
    #[error("Computing size of type would overflow usize::MAX")]
    SizeOfOverflow,
}

pub type Result<T> = core::result::Result<T, Error>;

#[cold]
pub const fn unsupported(backend: &'static str, operation: &'static str) -> Error {
    Error::Unsupported { backend, operation }
}

#[cold]
pub const fn read_only(backend: &'static str) -> Error {
    Error::ReadOnly(backend)
}

#[cold]
pub const fn closed(backend: &'static str) -> Error {
    Error::Closed(backend)
}

#[cold]
pub const fn seek_out_of_bounds(pos: u64, size: u64) -> Error {
    Error::SeekOutOfBounds { pos, size }
}

#[cold]
pub const fn end_of_data(needed: usize, got: usize) -> Error {
    Error::EndOfData { needed, got }
}

#[cold]
pub const fn length_exceeds_input(len: u64, available: u64) -> Error {
    Error::LengthExceedsInput { len, available }
}

#[cold]
pub const fn varint_overflow(bits: u32) -> Error {
    Error::VarintOverflow(bits)
}

#[cold]
pub const fn integer_overflow(value: i128, target: &'static str) -> Error {
    Error::IntegerOverflow { value, target }
}

#[cold]
pub const fn invalid_tag_encoding(tag: u64) -> Error {
    Error::InvalidTagEncoding(tag)
}

#[cold]
pub fn invalid_uuid(text: &str) -> Error {
    Error::InvalidUuid(text.to_owned())
}

#[cold]
pub const fn invalid_char_encoding() -> Error {
    Error::InvalidCharEncoding
}

#[cold]
pub const fn timestamp_out_of_range(value: i128) -> Error {
    Error::TimestampOutOfRange(value)
}

#[cold]
pub const fn null_reference(type_name: &'static str) -> Error {
    Error::NullReference(type_name)
}

#[cold]
pub const fn unsupported_kind(type_name: &'static str) -> Error {
    Error::UnsupportedKind(type_name)
}

#[cold]
pub const fn size_of_overflow() -> Error {
    Error::SizeOfOverflow
}
