//! Adapter schemas that change the wire shape of a Rust type.
//!
//! Each adapter is a zero-sized marker whose [`Encode::Src`] / [`Decode::Dst`]
//! is the plain Rust type. Use them with `#[wirebuf(with = "...")]` on
//! derived fields, or directly through [`Marshal`](crate::Marshal) and
//! [`Unmarshal`](crate::Unmarshal).
//!
//! Fixed-width numbers instead of varints:
//!
//! ```
//! # #[cfg(feature = "derive")] {
//! use wirebuf::{containers::{Fixed, FixedBe}, Decode, Encode};
//!
//! #[derive(Encode, Decode)]
//! struct Header {
//!     #[wirebuf(with = "FixedBe<u32>")]
//!     magic: u32,
//!     #[wirebuf(with = "Vec<Fixed<u16>>")]
//!     offsets: Vec<u16>,
//! }
//!
//! let header = Header { magic: 0xcafe_babe, offsets: vec![1, 2] };
//! assert_eq!(
//!     wirebuf::marshal(&header).unwrap(),
//!     [0xca, 0xfe, 0xba, 0xbe, 2, 1, 0, 2, 0]
//! );
//! # }
//! ```
//!
//! Adapters compose with every generic schema, so `Vec<Fixed<u32>>`,
//! `Option<Date>` and `BTreeMap<FixedString<8>, Bytes>` all work.
use {
    crate::{
        buffer::Buffer,
        error::{timestamp_out_of_range, unsupported_kind, Result},
        schema::{Decode, Encode},
        varint,
    },
    chrono::{DateTime, Utc},
    core::{any::type_name, marker::PhantomData},
};

/// Little-endian fixed-width number.
pub struct Fixed<T>(PhantomData<T>);

/// Big-endian fixed-width number.
pub struct FixedBe<T>(PhantomData<T>);

macro_rules! impl_fixed {
    ($adapter:ident, $type:ty, $write:ident, $read:ident) => {
        impl Encode for $adapter<$type> {
            type Src = $type;

            #[inline]
            fn size_of(_src: &$type) -> Result<usize> {
                Ok(size_of::<$type>())
            }

            #[inline]
            fn encode(buf: &mut Buffer<'_>, src: &$type) -> Result<()> {
                buf.$write(*src)
            }
        }

        impl Decode for $adapter<$type> {
            type Dst = $type;
            const MIN_SIZE: usize = size_of::<$type>();

            #[inline]
            fn decode(buf: &mut Buffer<'_>) -> Result<$type> {
                buf.$read()
            }
        }
    };
}

impl_fixed!(Fixed, u16, write_u16, read_u16);
impl_fixed!(Fixed, u32, write_u32, read_u32);
impl_fixed!(Fixed, u64, write_u64, read_u64);
impl_fixed!(Fixed, i16, write_i16, read_i16);
impl_fixed!(Fixed, i32, write_i32, read_i32);
impl_fixed!(Fixed, i64, write_i64, read_i64);
impl_fixed!(Fixed, f32, write_f32, read_f32);
impl_fixed!(Fixed, f64, write_f64, read_f64);
impl_fixed!(FixedBe, u16, write_u16_be, read_u16_be);
impl_fixed!(FixedBe, u32, write_u32_be, read_u32_be);
impl_fixed!(FixedBe, u64, write_u64_be, read_u64_be);
impl_fixed!(FixedBe, i16, write_i16_be, read_i16_be);
impl_fixed!(FixedBe, i32, write_i32_be, read_i32_be);
impl_fixed!(FixedBe, i64, write_i64_be, read_i64_be);
impl_fixed!(FixedBe, f32, write_f32_be, read_f32_be);
impl_fixed!(FixedBe, f64, write_f64_be, read_f64_be);

/// Length-prefixed byte blob.
///
/// Same bytes as the default `Vec<u8>` schema, spelled out for fields whose
/// intent should be explicit.
pub struct Bytes;

impl Encode for Bytes {
    type Src = Vec<u8>;

    #[inline]
    fn size_of(src: &Vec<u8>) -> Result<usize> {
        Ok(varint::unsigned_len(src.len() as u64) + src.len())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Vec<u8>) -> Result<()> {
        buf.write_limited_bytes(src)
    }
}

impl Decode for Bytes {
    type Dst = Vec<u8>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Vec<u8>> {
        buf.read_limited_bytes()
    }
}

/// String stored in exactly `N` bytes, NUL padded.
///
/// Longer strings are cut at the last char boundary that fits. Trailing NULs
/// are trimmed on decode.
pub struct FixedString<const N: usize>;

impl<const N: usize> Encode for FixedString<N> {
    type Src = String;

    #[inline]
    fn size_of(_src: &String) -> Result<usize> {
        Ok(N)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &String) -> Result<()> {
        buf.write_fixed_string(src, N)
    }
}

impl<const N: usize> Decode for FixedString<N> {
    type Dst = String;
    const MIN_SIZE: usize = N;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<String> {
        buf.read_fixed_string(N)
    }
}

/// NUL-terminated string.
pub struct CString;

impl Encode for CString {
    type Src = String;

    #[inline]
    fn size_of(src: &String) -> Result<usize> {
        Ok(src.len() + 1)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &String) -> Result<()> {
        buf.write_cstring(src)
    }
}

impl Decode for CString {
    type Dst = String;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<String> {
        buf.read_cstring()
    }
}

/// Millisecond precision timestamp, as an unsigned varint.
///
/// The default `DateTime<Utc>` schema keeps nanoseconds and allows instants
/// before the epoch; this one does neither.
pub struct Date;

impl Encode for Date {
    type Src = DateTime<Utc>;

    fn size_of(src: &DateTime<Utc>) -> Result<usize> {
        let millis = src.timestamp_millis();
        let millis = u64::try_from(millis).map_err(|_| timestamp_out_of_range(millis.into()))?;
        Ok(varint::unsigned_len(millis))
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &DateTime<Utc>) -> Result<()> {
        buf.write_date(src)
    }
}

impl Decode for Date {
    type Dst = DateTime<Utc>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<DateTime<Utc>> {
        buf.read_date()
    }
}

/// Schema for a type that has no wire representation.
///
/// Every operation fails with
/// [`Error::UnsupportedKind`](crate::Error::UnsupportedKind) naming `T`.
/// Useful to keep a field such as a callback or a channel in a record whose
/// other fields are still (de)serializable through a hand-written impl.
pub struct Unsupported<T: ?Sized>(PhantomData<T>);

impl<T: ?Sized> Encode for Unsupported<T> {
    type Src = T;

    #[cold]
    fn size_of(_src: &T) -> Result<usize> {
        Err(unsupported_kind(type_name::<T>()))
    }

    #[cold]
    fn encode(_buf: &mut Buffer<'_>, _src: &T) -> Result<()> {
        Err(unsupported_kind(type_name::<T>()))
    }
}

impl<T> Decode for Unsupported<T> {
    type Dst = T;

    #[cold]
    fn decode(_buf: &mut Buffer<'_>) -> Result<T> {
        Err(unsupported_kind(type_name::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{proptest_config::proptest_cfg, Error, Marshal, Unmarshal},
        chrono::TimeZone,
        proptest::prelude::*,
        std::collections::BTreeMap,
    };

    #[test]
    fn fixed_string_truncates_on_char_boundary() {
        // "é" is two bytes and does not fit in the last slot.
        let bytes = FixedString::<3>::marshal(&"aaé".to_string()).unwrap();
        assert_eq!(bytes, [b'a', b'a', 0]);
        assert_eq!(FixedString::<3>::unmarshal(&bytes).unwrap(), "aa");
    }

    #[test]
    fn cstring_stops_at_nul() {
        let bytes = CString::marshal(&"hi".to_string()).unwrap();
        assert_eq!(bytes, [b'h', b'i', 0]);
        assert_eq!(<(CString, u8)>::unmarshal(&[b'h', b'i', 0, 9]).unwrap(), ("hi".into(), 9));
    }

    #[test]
    fn date_is_millisecond_varint() {
        let date = Utc.timestamp_millis_opt(5000).unwrap();
        assert_eq!(Date::marshal(&date).unwrap(), [0x88, 0x27]);
        assert_eq!(Date::unmarshal(&[0x88, 0x27]).unwrap(), date);
        let before_epoch = Utc.timestamp_millis_opt(-1).unwrap();
        assert!(matches!(
            Date::marshal(&before_epoch),
            Err(Error::TimestampOutOfRange(-1))
        ));
    }

    #[test]
    fn adapters_compose() {
        let map: BTreeMap<String, Vec<u8>> = [("k".to_string(), vec![1, 2])].into();
        type Schema = BTreeMap<FixedString<2>, Bytes>;
        let bytes = Schema::marshal(&map).unwrap();
        assert_eq!(bytes, [1, b'k', 0, 2, 1, 2]);
        assert_eq!(Schema::unmarshal(&bytes).unwrap(), map);
    }

    #[test]
    fn big_endian_floats() {
        assert_eq!(FixedBe::<f64>::marshal(&1.0).unwrap(), 1.0f64.to_be_bytes());
        assert_eq!(FixedBe::<i16>::unmarshal(&[0xff, 0xfe]).unwrap(), -2);
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn fixed_roundtrip(a in any::<u64>(), b in any::<i32>(), c in any::<u16>()) {
            type Schema = (Fixed<u64>, FixedBe<i32>, Fixed<u16>);
            let bytes = Schema::marshal(&(a, b, c)).unwrap();
            prop_assert_eq!(bytes.len(), 14);
            prop_assert_eq!(Schema::unmarshal(&bytes).unwrap(), (a, b, c));
        }
    }
}
