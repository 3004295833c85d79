//! Default schemas for std and ecosystem types.
//!
//! The default mapping favors compactness: every integer wider than a byte is
//! a LEB128 varint and every sequence or map carries a varint count. Fixed
//! width layouts are available through [`containers`](crate::containers).
//!
//! Maps are written as the count, then every key, then every value, in the
//! map's iteration order.
use {
    crate::{
        buffer::Buffer,
        error::{
            end_of_data, integer_overflow, invalid_char_encoding, null_reference, size_of_overflow,
            timestamp_out_of_range, Result,
        },
        id::Uuid,
        schema::{decode_len, encode_elem_iter, size_of_elem_iter, Decode, Encode},
        varint,
    },
    chrono::{DateTime, Utc},
    core::{any::type_name, hash::Hash, marker::PhantomData},
    std::{
        collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
        hash::BuildHasher,
        rc::Rc,
        sync::Arc,
    },
};

impl Encode for u8 {
    type Src = u8;

    #[inline]
    fn size_of(_src: &u8) -> Result<usize> {
        Ok(1)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &u8) -> Result<()> {
        buf.write_u8(*src)
    }

    #[inline]
    fn encode_seq(buf: &mut Buffer<'_>, items: &[u8]) -> Result<()> {
        buf.write_bytes(items)
    }
}

impl Decode for u8 {
    type Dst = u8;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<u8> {
        buf.read_u8()
    }

    #[inline]
    fn decode_seq(buf: &mut Buffer<'_>, len: usize) -> Result<Vec<u8>> {
        buf.read_bytes(len)
    }
}

impl Encode for i8 {
    type Src = i8;

    #[inline]
    fn size_of(_src: &i8) -> Result<usize> {
        Ok(1)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &i8) -> Result<()> {
        buf.write_i8(*src)
    }
}

impl Decode for i8 {
    type Dst = i8;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<i8> {
        buf.read_i8()
    }
}

impl Encode for bool {
    type Src = bool;

    #[inline]
    fn size_of(_src: &bool) -> Result<usize> {
        Ok(1)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &bool) -> Result<()> {
        buf.write_bool(*src)
    }
}

impl Decode for bool {
    type Dst = bool;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<bool> {
        buf.read_bool()
    }
}

macro_rules! impl_uvarint {
    ($($type:ty),*) => {$(
        impl Encode for $type {
            type Src = $type;

            #[inline]
            fn size_of(src: &$type) -> Result<usize> {
                Ok(varint::unsigned_len(*src as u64))
            }

            #[inline]
            fn encode(buf: &mut Buffer<'_>, src: &$type) -> Result<()> {
                buf.write_uvarint(*src as u64)
            }
        }

        impl Decode for $type {
            type Dst = $type;
            const MIN_SIZE: usize = 1;

            #[inline]
            fn decode(buf: &mut Buffer<'_>) -> Result<$type> {
                let value = buf.read_uvarint()?;
                <$type>::try_from(value)
                    .map_err(|_| integer_overflow(value.into(), stringify!($type)))
            }
        }
    )*};
}

impl_uvarint!(u16, u32, u64, usize);

macro_rules! impl_varint {
    ($($type:ty),*) => {$(
        impl Encode for $type {
            type Src = $type;

            #[inline]
            fn size_of(src: &$type) -> Result<usize> {
                Ok(varint::signed_len(*src as i64))
            }

            #[inline]
            fn encode(buf: &mut Buffer<'_>, src: &$type) -> Result<()> {
                buf.write_varint(*src as i64)
            }
        }

        impl Decode for $type {
            type Dst = $type;
            const MIN_SIZE: usize = 1;

            #[inline]
            fn decode(buf: &mut Buffer<'_>) -> Result<$type> {
                let value = buf.read_varint()?;
                <$type>::try_from(value)
                    .map_err(|_| integer_overflow(value.into(), stringify!($type)))
            }
        }
    )*};
}

impl_varint!(i16, i32, i64, isize);

impl Encode for u128 {
    type Src = u128;

    #[inline]
    fn size_of(src: &u128) -> Result<usize> {
        Ok(varint::unsigned_len(*src))
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &u128) -> Result<()> {
        buf.write_uvarint128(*src)
    }
}

impl Decode for u128 {
    type Dst = u128;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<u128> {
        buf.read_uvarint128()
    }
}

impl Encode for i128 {
    type Src = i128;

    #[inline]
    fn size_of(src: &i128) -> Result<usize> {
        Ok(varint::signed_len(*src))
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &i128) -> Result<()> {
        buf.write_varint128(*src)
    }
}

impl Decode for i128 {
    type Dst = i128;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<i128> {
        buf.read_varint128()
    }
}

macro_rules! impl_float {
    ($type:ty, $write:ident, $read:ident) => {
        impl Encode for $type {
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

        impl Decode for $type {
            type Dst = $type;
            const MIN_SIZE: usize = size_of::<$type>();

            #[inline]
            fn decode(buf: &mut Buffer<'_>) -> Result<$type> {
                buf.$read()
            }
        }
    };
}

impl_float!(f32, write_f32, read_f32);
impl_float!(f64, write_f64, read_f64);

impl Encode for char {
    type Src = char;

    #[inline]
    fn size_of(src: &char) -> Result<usize> {
        Ok(1 + src.len_utf8())
    }

    fn encode(buf: &mut Buffer<'_>, src: &char) -> Result<()> {
        let mut scratch = [0u8; 4];
        buf.write_string(src.encode_utf8(&mut scratch))
    }
}

impl Decode for char {
    type Dst = char;
    const MIN_SIZE: usize = 2;

    fn decode(buf: &mut Buffer<'_>) -> Result<char> {
        let bytes = buf.read_limited_bytes()?;
        let mut chars = core::str::from_utf8(&bytes)
            .map_err(|_| invalid_char_encoding())?
            .chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(invalid_char_encoding()),
        }
    }
}

impl Encode for str {
    type Src = str;

    #[inline]
    fn size_of(src: &str) -> Result<usize> {
        Ok(varint::unsigned_len(src.len() as u64) + src.len())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &str) -> Result<()> {
        buf.write_string(src)
    }
}

impl Encode for String {
    type Src = String;

    #[inline]
    fn size_of(src: &String) -> Result<usize> {
        <str as Encode>::size_of(src)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &String) -> Result<()> {
        buf.write_string(src)
    }
}

impl Decode for String {
    type Dst = String;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<String> {
        buf.read_string()
    }
}

impl<T> Encode for [T]
where
    T: Encode,
    T::Src: Sized,
{
    type Src = [T::Src];

    #[inline]
    fn size_of(src: &[T::Src]) -> Result<usize> {
        size_of_elem_iter::<T>(src.iter())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &[T::Src]) -> Result<()> {
        buf.write_uvarint(src.len() as u64)?;
        T::encode_seq(buf, src)
    }
}

impl<T> Encode for Vec<T>
where
    T: Encode,
    T::Src: Sized,
{
    type Src = Vec<T::Src>;

    #[inline]
    fn size_of(src: &Vec<T::Src>) -> Result<usize> {
        <[T] as Encode>::size_of(src)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Vec<T::Src>) -> Result<()> {
        <[T] as Encode>::encode(buf, src)
    }
}

impl<T: Decode> Decode for Vec<T> {
    type Dst = Vec<T::Dst>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        let len = decode_len::<T>(buf)?;
        T::decode_seq(buf, len)
    }
}

impl<T: Decode> Decode for Box<[T]> {
    type Dst = Box<[T::Dst]>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(<Vec<T>>::decode(buf)?.into_boxed_slice())
    }
}

impl<T> Encode for VecDeque<T>
where
    T: Encode,
    T::Src: Sized,
{
    type Src = VecDeque<T::Src>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_elem_iter::<T>(src.iter())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        let (front, back) = src.as_slices();
        buf.write_uvarint(src.len() as u64)?;
        T::encode_seq(buf, front)?;
        T::encode_seq(buf, back)
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    type Dst = VecDeque<T::Dst>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(<Vec<T>>::decode(buf)?.into())
    }
}

impl<T, const N: usize> Encode for [T; N]
where
    T: Encode,
    T::Src: Sized,
{
    type Src = [T::Src; N];

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        src.iter().map(T::size_of).try_fold(0usize, |acc, size| {
            acc.checked_add(size?).ok_or_else(size_of_overflow)
        })
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        T::encode_seq(buf, src)
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    type Dst = [T::Dst; N];
    const MIN_SIZE: usize = T::MIN_SIZE * N;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        T::decode_seq(buf, N)?
            .try_into()
            .map_err(|items: Vec<T::Dst>| end_of_data(N, items.len()))
    }
}

impl<T, S> Encode for HashSet<T, S>
where
    T: Encode,
    T::Src: Sized,
{
    type Src = HashSet<T::Src, S>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_elem_iter::<T>(src.iter())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        encode_elem_iter::<T>(buf, src.iter())
    }
}

impl<T, S> Decode for HashSet<T, S>
where
    T: Decode,
    T::Dst: Hash + Eq,
    S: BuildHasher + Default,
{
    type Dst = HashSet<T::Dst, S>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(<Vec<T>>::decode(buf)?.into_iter().collect())
    }
}

impl<T> Encode for BTreeSet<T>
where
    T: Encode,
    T::Src: Sized,
{
    type Src = BTreeSet<T::Src>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_elem_iter::<T>(src.iter())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        encode_elem_iter::<T>(buf, src.iter())
    }
}

impl<T> Decode for BTreeSet<T>
where
    T: Decode,
    T::Dst: Ord,
{
    type Dst = BTreeSet<T::Dst>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(<Vec<T>>::decode(buf)?.into_iter().collect())
    }
}

/// Encoded size of a map laid out as count, keys, values.
#[inline]
pub(crate) fn size_of_map<'a, K, V>(
    len: usize,
    keys: impl Iterator<Item = &'a K::Src>,
    values: impl Iterator<Item = &'a V::Src>,
) -> Result<usize>
where
    K: Encode + 'a,
    V: Encode + 'a,
    K::Src: 'a,
    V::Src: 'a,
{
    let prefix = varint::unsigned_len(len as u64);
    let keys = keys.map(K::size_of);
    let values = values.map(V::size_of);
    keys.chain(values).try_fold(prefix, |acc, size| {
        acc.checked_add(size?).ok_or_else(size_of_overflow)
    })
}

/// Write a map as count, keys, values.
///
/// `keys` and `values` must come from the same map so that they pair up.
#[inline]
pub(crate) fn encode_map<'a, K, V>(
    buf: &mut Buffer<'_>,
    len: usize,
    keys: impl Iterator<Item = &'a K::Src>,
    values: impl Iterator<Item = &'a V::Src>,
) -> Result<()>
where
    K: Encode + 'a,
    V: Encode + 'a,
    K::Src: 'a,
    V::Src: 'a,
{
    buf.write_uvarint(len as u64)?;
    for key in keys {
        K::encode(buf, key)?;
    }
    for value in values {
        V::encode(buf, value)?;
    }
    Ok(())
}

/// Read a map laid out as count, keys, values, yielding pairs in wire order.
#[inline]
pub(crate) fn decode_map<K: Decode, V: Decode>(
    buf: &mut Buffer<'_>,
) -> Result<impl Iterator<Item = (K::Dst, V::Dst)>> {
    let len = buf.read_length(K::MIN_SIZE + V::MIN_SIZE)?;
    let keys = K::decode_seq(buf, len)?;
    let values = V::decode_seq(buf, len)?;
    Ok(keys.into_iter().zip(values))
}

impl<K, V, S> Encode for HashMap<K, V, S>
where
    K: Encode,
    K::Src: Sized,
    V: Encode,
    V::Src: Sized,
{
    type Src = HashMap<K::Src, V::Src, S>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_map::<K, V>(src.len(), src.keys(), src.values())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        encode_map::<K, V>(buf, src.len(), src.keys(), src.values())
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode,
    K::Dst: Hash + Eq,
    V: Decode,
    S: BuildHasher + Default,
{
    type Dst = HashMap<K::Dst, V::Dst, S>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(decode_map::<K, V>(buf)?.collect())
    }
}

impl<K, V> Encode for BTreeMap<K, V>
where
    K: Encode,
    K::Src: Sized,
    V: Encode,
    V::Src: Sized,
{
    type Src = BTreeMap<K::Src, V::Src>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_map::<K, V>(src.len(), src.keys(), src.values())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        encode_map::<K, V>(buf, src.len(), src.keys(), src.values())
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode,
    K::Dst: Ord,
    V: Decode,
{
    type Dst = BTreeMap<K::Dst, V::Dst>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(decode_map::<K, V>(buf)?.collect())
    }
}

macro_rules! impl_pointer {
    ($($ptr:ident),*) => {$(
        impl<T: Encode + ?Sized> Encode for $ptr<T> {
            type Src = $ptr<T::Src>;

            #[inline]
            fn size_of(src: &Self::Src) -> Result<usize> {
                T::size_of(src)
            }

            #[inline]
            fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
                T::encode(buf, src)
            }
        }

        impl<T: Decode> Decode for $ptr<T> {
            type Dst = $ptr<T::Dst>;
            const MIN_SIZE: usize = T::MIN_SIZE;

            #[inline]
            fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
                Ok($ptr::new(T::decode(buf)?))
            }
        }
    )*};
}

impl_pointer!(Box, Rc, Arc);

/// `Some` is written as the inner value. `None` cannot be written.
impl<T> Encode for Option<T>
where
    T: Encode,
    T::Src: Sized,
{
    type Src = Option<T::Src>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        match src {
            Some(value) => T::size_of(value),
            None => Err(null_reference(type_name::<Self::Src>())),
        }
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        match src {
            Some(value) => T::encode(buf, value),
            None => Err(null_reference(type_name::<Self::Src>())),
        }
    }
}

/// Always decodes to `Some`.
impl<T: Decode> Decode for Option<T> {
    type Dst = Option<T::Dst>;
    const MIN_SIZE: usize = T::MIN_SIZE;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        T::decode(buf).map(Some)
    }
}

impl<T: ?Sized> Encode for PhantomData<T> {
    type Src = PhantomData<T>;

    #[inline]
    fn size_of(_src: &Self::Src) -> Result<usize> {
        Ok(0)
    }

    #[inline]
    fn encode(_buf: &mut Buffer<'_>, _src: &Self::Src) -> Result<()> {
        Ok(())
    }
}

impl<T: ?Sized> Decode for PhantomData<T> {
    type Dst = PhantomData<T>;

    #[inline]
    fn decode(_buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(PhantomData)
    }
}

impl Encode for () {
    type Src = ();

    #[inline]
    fn size_of(_src: &()) -> Result<usize> {
        Ok(0)
    }

    #[inline]
    fn encode(_buf: &mut Buffer<'_>, _src: &()) -> Result<()> {
        Ok(())
    }
}

impl Decode for () {
    type Dst = ();

    #[inline]
    fn decode(_buf: &mut Buffer<'_>) -> Result<()> {
        Ok(())
    }
}

macro_rules! impl_tuple {
    ($($name:ident $index:tt),+) => {
        impl<$($name),+> Encode for ($($name,)+)
        where
            $($name: Encode, $name::Src: Sized,)+
        {
            type Src = ($($name::Src,)+);

            #[inline]
            fn size_of(src: &Self::Src) -> Result<usize> {
                let mut total = 0usize;
                $(
                    total = total
                        .checked_add($name::size_of(&src.$index)?)
                        .ok_or_else(size_of_overflow)?;
                )+
                Ok(total)
            }

            #[inline]
            fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
                $($name::encode(buf, &src.$index)?;)+
                Ok(())
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            type Dst = ($($name::Dst,)+);
            const MIN_SIZE: usize = 0 $(+ $name::MIN_SIZE)+;

            #[inline]
            fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
                Ok(($($name::decode(buf)?,)+))
            }
        }
    };
}

impl_tuple!(A 0);
impl_tuple!(A 0, B 1);
impl_tuple!(A 0, B 1, C 2);
impl_tuple!(A 0, B 1, C 2, D 3);
impl_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

impl Encode for Uuid {
    type Src = Uuid;

    #[inline]
    fn size_of(_src: &Uuid) -> Result<usize> {
        Ok(16)
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Uuid) -> Result<()> {
        buf.write_uuid(src)
    }
}

impl Decode for Uuid {
    type Dst = Uuid;
    const MIN_SIZE: usize = 16;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Uuid> {
        buf.read_uuid()
    }
}

/// Nanoseconds since the Unix epoch as a signed varint.
impl Encode for DateTime<Utc> {
    type Src = DateTime<Utc>;

    fn size_of(src: &Self::Src) -> Result<usize> {
        let nanos = src
            .timestamp_nanos_opt()
            .ok_or_else(|| timestamp_out_of_range(src.timestamp().into()))?;
        Ok(varint::signed_len(nanos))
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        buf.write_time(src)
    }
}

impl Decode for DateTime<Utc> {
    type Dst = DateTime<Utc>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        buf.read_time()
    }
}
