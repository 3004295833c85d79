use {
    crate::{
        buffer::Buffer,
        error::Result,
        schema::{
            encode_elem_iter,
            impls::{decode_map, encode_map, size_of_map},
            size_of_elem_iter, Decode, Encode,
        },
    },
    core::hash::{BuildHasher, Hash},
    indexmap::{IndexMap, IndexSet},
};

impl<K, V, S> Encode for IndexMap<K, V, S>
where
    K: Encode,
    K::Src: Sized,
    V: Encode,
    V::Src: Sized,
{
    type Src = IndexMap<K::Src, V::Src, S>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_map::<K, V>(src.len(), src.keys(), src.values())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        encode_map::<K, V>(buf, src.len(), src.keys(), src.values())
    }
}

/// Entries are inserted in wire order, so insertion order survives a
/// round trip.
impl<K, V, S> Decode for IndexMap<K, V, S>
where
    K: Decode,
    K::Dst: Hash + Eq,
    V: Decode,
    S: BuildHasher + Default,
{
    type Dst = IndexMap<K::Dst, V::Dst, S>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(decode_map::<K, V>(buf)?.collect())
    }
}

impl<T, S> Encode for IndexSet<T, S>
where
    T: Encode,
    T::Src: Sized,
{
    type Src = IndexSet<T::Src, S>;

    #[inline]
    fn size_of(src: &Self::Src) -> Result<usize> {
        size_of_elem_iter::<T>(src.iter())
    }

    #[inline]
    fn encode(buf: &mut Buffer<'_>, src: &Self::Src) -> Result<()> {
        encode_elem_iter::<T>(buf, src.iter())
    }
}

impl<T, S> Decode for IndexSet<T, S>
where
    T: Decode,
    T::Dst: Hash + Eq,
    S: BuildHasher + Default,
{
    type Dst = IndexSet<T::Dst, S>;
    const MIN_SIZE: usize = 1;

    #[inline]
    fn decode(buf: &mut Buffer<'_>) -> Result<Self::Dst> {
        Ok(<Vec<T>>::decode(buf)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{marshal, proptest_config::proptest_cfg, unmarshal},
        proptest::prelude::*,
    };

    #[test]
    fn keys_then_values_in_insertion_order() {
        let mut map = IndexMap::<u8, u8>::new();
        map.insert(9, 90);
        map.insert(1, 10);
        let bytes = marshal(&map).unwrap();
        assert_eq!(bytes, [2, 9, 1, 90, 10]);
        let decoded = unmarshal::<IndexMap<u8, u8>>(&bytes).unwrap();
        assert_eq!(decoded.keys().copied().collect::<Vec<_>>(), [9, 1]);
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn index_map_roundtrip(entries in proptest::collection::vec((any::<String>(), any::<i64>()), 0..=32)) {
            let map: IndexMap<String, i64> = entries.into_iter().collect();
            let bytes = marshal(&map).unwrap();
            let decoded = unmarshal::<IndexMap<String, i64>>(&bytes).unwrap();
            prop_assert!(map.iter().eq(decoded.iter()));
        }

        #[test]
        fn index_set_roundtrip(items in proptest::collection::vec(any::<u32>(), 0..=32)) {
            let set: IndexSet<u32> = items.into_iter().collect();
            let bytes = marshal(&set).unwrap();
            prop_assert_eq!(unmarshal::<IndexSet<u32>>(&bytes).unwrap(), set);
        }
    }
}
