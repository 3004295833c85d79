//! Schema traits for the structural codec.
//!
//! An [`Encode`] implementation describes how a value of [`Encode::Src`] is
//! laid out on the wire, and a [`Decode`] implementation describes how to
//! rebuild a [`Decode::Dst`] from those bytes. For most types the schema is
//! the type itself (`u64: Encode<Src = u64>`). Adapter types in
//! [`containers`] decouple the two, so the same Rust value can be written
//! with a different wire shape:
//!
//! ```
//! use wirebuf::{containers::Fixed, Marshal, Unmarshal};
//!
//! // Default integers are varints...
//! assert_eq!(wirebuf::marshal(&7u32).unwrap(), [7]);
//! // ...unless the schema says otherwise.
//! let bytes = Fixed::<u32>::marshal(&7).unwrap();
//! assert_eq!(bytes, [7, 0, 0, 0]);
//! assert_eq!(Fixed::<u32>::unmarshal(&bytes).unwrap(), 7);
//! ```
//!
//! Records get their schema from `#[derive(Encode, Decode)]`:
//!
//! ```
//! use wirebuf::{Decode, Encode};
//!
//! #[derive(Encode, Decode, Debug, PartialEq)]
//! struct Point {
//!     #[wirebuf(with = "wirebuf::containers::Fixed<f32>")]
//!     x: f32,
//!     y: f32,
//!     tags: Vec<String>,
//! }
//!
//! let point = Point { x: 1.0, y: -2.0, tags: vec!["a".into()] };
//! let bytes = wirebuf::marshal(&point).unwrap();
//! assert_eq!(wirebuf::unmarshal::<Point>(&bytes).unwrap(), point);
//! ```
use crate::{
    buffer::Buffer,
    error::{size_of_overflow, Result},
};

pub mod containers;
mod impls;

mod external {
    #[cfg(feature = "indexmap")]
    mod indexmap;
}

/// Types that can be written to a [`Buffer`].
pub trait Encode {
    type Src: ?Sized;

    /// Exact number of bytes [`Encode::encode`] will produce for `src`.
    fn size_of(src: &Self::Src) -> Result<usize>;

    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()>;

    /// Write `items` back to back, without a length prefix.
    #[doc(hidden)]
    #[inline]
    fn encode_seq(buf: &mut Buffer<'_>, items: &[Self::Src]) -> Result<()>
    where
        Self::Src: Sized,
    {
        for item in items {
            Self::encode(buf, item)?;
        }
        Ok(())
    }
}

/// Types that can be read from a [`Buffer`].
pub trait Decode {
    type Dst;

    /// Lower bound on the encoded size of any `Self::Dst`.
    ///
    /// Used to reject length prefixes that cannot possibly fit in the
    /// remaining input before anything is allocated.
    const MIN_SIZE: usize = 0;

    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst>;

    /// Decode over an existing value.
    ///
    /// On error `dst` is left untouched.
    #[inline]
    fn decode_into(buf: &mut Buffer<'_>, dst: &mut Self::Dst) -> Result<()> {
        *dst = Self::decode(buf)?;
        Ok(())
    }

    /// Read `len` items back to back.
    #[doc(hidden)]
    #[inline]
    fn decode_seq(buf: &mut Buffer<'_>, len: usize) -> Result<Vec<Self::Dst>> {
        let mut out = Vec::with_capacity(buf.limits().capacity_for::<Self::Dst>(len));
        for _ in 0..len {
            out.push(Self::decode(buf)?);
        }
        Ok(out)
    }
}

/// Encoded size of a length prefix followed by every item of `items`.
#[inline]
pub(crate) fn size_of_elem_iter<'a, T>(
    items: impl ExactSizeIterator<Item = &'a T::Src>,
) -> Result<usize>
where
    T: Encode + 'a,
    T::Src: 'a,
{
    let prefix = crate::varint::unsigned_len(items.len() as u64);
    items.map(T::size_of).try_fold(prefix, |acc, size| {
        acc.checked_add(size?).ok_or_else(size_of_overflow)
    })
}

/// Write a length prefix followed by every item of `items`.
#[inline]
pub(crate) fn encode_elem_iter<'a, T>(
    buf: &mut Buffer<'_>,
    items: impl ExactSizeIterator<Item = &'a T::Src>,
) -> Result<()>
where
    T: Encode + 'a,
    T::Src: 'a,
{
    buf.write_uvarint(items.len() as u64)?;
    for item in items {
        T::encode(buf, item)?;
    }
    Ok(())
}

/// Read a length prefix checked against `T::MIN_SIZE`.
#[inline]
pub(crate) fn decode_len<T: Decode>(buf: &mut Buffer<'_>) -> Result<usize> {
    buf.read_length(T::MIN_SIZE)
}

#[cfg(all(test, feature = "derive"))]
mod tests {
    use {
        crate::{
            containers::{Bytes, Fixed, FixedBe, FixedString, Unsupported},
            error::invalid_tag_encoding,
            marshal, proptest_config::proptest_cfg, unmarshal, unmarshal_into, Buffer, Decode,
            Encode, Error, Marshal, Unmarshal,
        },
        std::{
            collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
            rc::Rc,
            sync::Arc,
        },
        proptest::prelude::*,
    };

    #[derive(Debug, Clone, PartialEq, Encode, Decode)]
    #[wirebuf(internal)]
    struct Inner {
        name: String,
        weight: i32,
    }

    #[derive(Debug, Clone, PartialEq, Encode, Decode)]
    #[wirebuf(internal)]
    struct Record {
        label: String,
        #[wirebuf(with = "[Fixed<f64>; 2]")]
        coords: [f64; 2],
        aliases: Vec<String>,
        inner: Box<Inner>,
        counts: BTreeMap<String, i64>,
    }

    #[derive(Debug, Clone, PartialEq, Encode, Decode, proptest_derive::Arbitrary)]
    #[wirebuf(internal)]
    enum Reading {
        Idle,
        Level(i32),
        Span { lo: u8, hi: u8 },
    }

    #[derive(Debug, Clone, PartialEq, Encode, Decode, proptest_derive::Arbitrary)]
    #[wirebuf(internal)]
    struct Sensor {
        id: u64,
        label: String,
        #[wirebuf(with = "Vec<Fixed<u16>>")]
        ports: Vec<u16>,
        armed: bool,
        last: Reading,
    }

    fn sample_record() -> Record {
        Record {
            label: "Albuquerque".into(),
            coords: [33.677216, -106.476059],
            aliases: vec!["ABQ".into(), "Duke City".into()],
            inner: Box::new(Inner {
                name: "inner".into(),
                weight: -3,
            }),
            counts: [("a".to_string(), 1), ("b".to_string(), -2)].into(),
        }
    }

    /// Hand-rolled schema standing in for a type with a custom tag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Signal {
        Low,
        High,
    }

    impl Encode for Signal {
        type Src = Self;

        fn size_of(_src: &Self) -> crate::Result<usize> {
            Ok(1)
        }

        fn encode(buf: &mut Buffer<'_>, src: &Self) -> crate::Result<()> {
            buf.write_u8(match src {
                Signal::Low => 0x10,
                Signal::High => 0x20,
            })
        }
    }

    impl Decode for Signal {
        type Dst = Self;
        const MIN_SIZE: usize = 1;

        fn decode(buf: &mut Buffer<'_>) -> crate::Result<Self> {
            match buf.read_u8()? {
                0x10 => Ok(Signal::Low),
                0x20 => Ok(Signal::High),
                tag => Err(invalid_tag_encoding(tag.into())),
            }
        }
    }

    #[test]
    fn nested_record_roundtrip() {
        let record = sample_record();
        let bytes = marshal(&record).unwrap();
        assert_eq!(bytes.len(), crate::encoded_size(&record).unwrap());
        assert_eq!(unmarshal::<Record>(&bytes).unwrap(), record);
    }

    #[test]
    fn record_layout_is_fields_in_order() {
        let inner = Inner {
            name: "ab".into(),
            weight: -1,
        };
        assert_eq!(marshal(&inner).unwrap(), [2, b'a', b'b', 0x7f]);
    }

    #[test]
    fn map_is_count_then_keys_then_values() {
        let map: BTreeMap<u8, String> = [(1, "x".to_string()), (2, "yz".to_string())].into();
        let bytes = marshal(&map).unwrap();
        assert_eq!(bytes, [2, 1, 2, 1, b'x', 2, b'y', b'z']);
        assert_eq!(unmarshal::<BTreeMap<u8, String>>(&bytes).unwrap(), map);
    }

    #[test]
    fn hash_map_roundtrip() {
        let map: HashMap<String, i64> = [("one".to_string(), 1), ("minus".to_string(), -1)].into();
        let bytes = marshal(&map).unwrap();
        assert_eq!(unmarshal::<HashMap<String, i64>>(&bytes).unwrap(), map);
    }

    #[test]
    fn sequences_are_count_prefixed() {
        assert_eq!(marshal(&vec![300u16, 1]).unwrap(), [2, 0xac, 0x02, 1]);
        assert_eq!(marshal(&[1u8, 2, 3]).unwrap(), [1, 2, 3]);
        assert_eq!(marshal(&b"abc".to_vec()).unwrap(), [3, b'a', b'b', b'c']);
        let deque: VecDeque<i8> = [-1, 1].into();
        assert_eq!(marshal(&deque).unwrap(), [2, 0xff, 1]);
        let set: BTreeSet<u32> = [3, 1].into();
        assert_eq!(marshal(&set).unwrap(), [2, 1, 3]);
    }

    #[test]
    fn pointers_are_transparent() {
        let boxed = Box::new(5u64);
        let shared = Rc::new(5u64);
        let atomic = Arc::new(5u64);
        assert_eq!(marshal(&boxed).unwrap(), [5]);
        assert_eq!(marshal(&shared).unwrap(), [5]);
        assert_eq!(marshal(&atomic).unwrap(), [5]);
        assert_eq!(*unmarshal::<Arc<u64>>(&[5]).unwrap(), 5);
    }

    #[test]
    fn option_none_is_a_null_reference() {
        assert_eq!(marshal(&Some(9u8)).unwrap(), [9]);
        assert_eq!(unmarshal::<Option<u8>>(&[9]).unwrap(), Some(9));
        assert!(matches!(
            marshal(&None::<u8>),
            Err(Error::NullReference(name)) if name.contains("Option")
        ));
    }

    #[test]
    fn unsupported_kind_fails_both_ways() {
        fn noop() {}
        assert!(matches!(
            Unsupported::<fn()>::marshal(&(noop as fn())),
            Err(Error::UnsupportedKind(_))
        ));
        assert!(matches!(
            Unsupported::<fn()>::unmarshal(&[]),
            Err(Error::UnsupportedKind(_))
        ));
    }

    #[test]
    fn fixed_adapters() {
        assert_eq!(Fixed::<u32>::marshal(&1).unwrap(), [1, 0, 0, 0]);
        assert_eq!(FixedBe::<u32>::marshal(&1).unwrap(), [0, 0, 0, 1]);
        assert_eq!(Fixed::<f32>::marshal(&1.5).unwrap(), 1.5f32.to_le_bytes());
        assert_eq!(<Vec<Fixed<u16>>>::marshal(&vec![1, 2]).unwrap(), [2, 1, 0, 2, 0]);
        assert_eq!(Bytes::marshal(&b"hi".to_vec()).unwrap(), [2, b'h', b'i']);
        assert_eq!(FixedString::<4>::marshal(&"ab".to_string()).unwrap(), [b'a', b'b', 0, 0]);
        assert_eq!(FixedString::<4>::unmarshal(b"ab\0\0").unwrap(), "ab");
    }

    #[test]
    fn custom_schema_composes() {
        let signals = vec![Signal::High, Signal::Low];
        let bytes = marshal(&signals).unwrap();
        assert_eq!(bytes, [2, 0x20, 0x10]);
        assert_eq!(unmarshal::<Vec<Signal>>(&bytes).unwrap(), signals);
        assert!(matches!(
            unmarshal::<Signal>(&[0x30]),
            Err(Error::InvalidTagEncoding(0x30))
        ));
    }

    #[test]
    fn overlong_sequence_length_is_rejected() {
        // Claims 1000 strings; each needs at least its length byte.
        assert!(matches!(
            unmarshal::<Vec<String>>(&[0xe8, 0x07, 0]),
            Err(Error::LengthExceedsInput { len: 1000, available: 1 })
        ));
        assert!(matches!(
            unmarshal::<BTreeMap<u32, u32>>(&[3, 1, 2]),
            Err(Error::LengthExceedsInput { len: 3, available: 2 })
        ));
    }

    #[test]
    fn narrow_integers_reject_wide_values() {
        let wide = marshal(&70_000u32).unwrap();
        assert!(matches!(
            unmarshal::<u16>(&wide),
            Err(Error::IntegerOverflow { value: 70_000, target: "u16" })
        ));
        let negative = marshal(&-40_000i32).unwrap();
        assert!(matches!(
            unmarshal::<i16>(&negative),
            Err(Error::IntegerOverflow { value: -40_000, target: "i16" })
        ));
    }

    #[test]
    fn decode_into_overwrites_target() {
        let mut target = sample_record();
        let other = Inner {
            name: "replacement".into(),
            weight: 7,
        };
        let bytes = marshal(&other).unwrap();
        let mut inner = *target.inner.clone();
        unmarshal_into(&bytes, &mut inner).unwrap();
        assert_eq!(inner, other);

        // A failed decode leaves the target as it was.
        assert!(unmarshal_into(&bytes[..3], &mut target).is_err());
        assert_eq!(target, sample_record());
    }

    #[test]
    fn every_truncation_fails() {
        let bytes = marshal(&sample_record()).unwrap();
        for cut in 0..bytes.len() {
            assert!(unmarshal::<Record>(&bytes[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn invalid_utf8_string_is_empty() {
        assert_eq!(unmarshal::<String>(&[2, 0xff, 0xfe]).unwrap(), "");
    }

    #[test]
    fn char_is_length_prefixed_utf8() {
        assert_eq!(marshal(&'é').unwrap(), [2, 0xc3, 0xa9]);
        assert_eq!(unmarshal::<char>(&[2, 0xc3, 0xa9]).unwrap(), 'é');
        assert!(matches!(
            unmarshal::<char>(&[2, b'a', b'b']),
            Err(Error::InvalidCharEncoding)
        ));
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn integers_roundtrip(
            val in (
                any::<u8>(),
                any::<i8>(),
                any::<u16>(),
                any::<i16>(),
                any::<u32>(),
                any::<i32>(),
                any::<usize>(),
                any::<isize>(),
                any::<u64>(),
                any::<i64>(),
                any::<u128>(),
                any::<i128>()
            )
        ) {
            type Target = (u8, i8, u16, i16, u32, i32, usize, isize, u64, i64, u128, i128);
            let bytes = marshal(&val).unwrap();
            prop_assert_eq!(bytes.len(), crate::encoded_size(&val).unwrap());
            prop_assert_eq!(unmarshal::<Target>(&bytes).unwrap(), val);
        }

        #[test]
        fn collections_roundtrip(
            strings in proptest::collection::vec(any::<String>(), 0..=20),
            map in proptest::collection::btree_map(any::<i32>(), any::<bool>(), 0..=20),
            bytes in proptest::collection::vec(any::<u8>(), 0..=100),
            floats in proptest::collection::vec_deque(any::<f64>().prop_filter("nan", |f| !f.is_nan()), 0..=20),
        ) {
            let value = (strings, map, bytes, floats);
            let encoded = marshal(&value).unwrap();
            prop_assert_eq!(encoded.len(), crate::encoded_size(&value).unwrap());
            prop_assert_eq!(unmarshal::<(Vec<String>, BTreeMap<i32, bool>, Vec<u8>, VecDeque<f64>)>(&encoded).unwrap(), value);
        }

        #[test]
        fn derived_schema_roundtrip(sensor in any::<Sensor>()) {
            let bytes = marshal(&sensor).unwrap();
            prop_assert_eq!(bytes.len(), crate::encoded_size(&sensor).unwrap());
            prop_assert_eq!(unmarshal::<Sensor>(&bytes).unwrap(), sensor);
        }
    }
}
