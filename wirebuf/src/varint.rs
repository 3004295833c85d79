//! LEB128 variable-length integers.
//!
//! Unsigned values are split into 7-bit groups, least significant first, with
//! the continuation bit (`0x80`) set on every byte but the last.
//!
//! Signed values use the same grouping over the two's-complement
//! representation. Encoding stops once the remaining value is pure sign
//! extension of the last emitted group: all zeros with bit `0x40` clear, or
//! all ones with bit `0x40` set. Decoding sign-extends from bit `0x40` of the
//! final group.
//!
//! Decoders enforce an upper bound on the number of groups: 10 for 64-bit
//! targets and 19 for 128-bit targets. Longer input, or input whose value does
//! not fit the target width, is rejected with
//! [`Error::VarintOverflow`](crate::Error::VarintOverflow).
use crate::error::{end_of_data, varint_overflow, Result};

/// Maximum encoded length of a 64-bit value.
pub const MAX_LEN_64: usize = max_groups(64);
/// Maximum encoded length of a 128-bit value.
pub const MAX_LEN_128: usize = max_groups(128);

const CONTINUE: u8 = 0x80;
const SIGN: u8 = 0x40;
const PAYLOAD: u8 = 0x7f;

#[inline]
const fn max_groups(bits: u32) -> usize {
    bits.div_ceil(7) as usize
}

/// Append the unsigned encoding of `value` to `out`.
#[inline]
pub fn encode_unsigned(value: impl Into<u128>, out: &mut Vec<u8>) {
    let mut value = value.into();
    loop {
        let byte = (value as u8) & PAYLOAD;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | CONTINUE);
    }
}

/// Append the signed encoding of `value` to `out`.
#[inline]
pub fn encode_signed(value: impl Into<i128>, out: &mut Vec<u8>) {
    let mut value = value.into();
    loop {
        let byte = (value as u8) & PAYLOAD;
        value >>= 7;
        let done = (value == 0 && byte & SIGN == 0) || (value == -1 && byte & SIGN != 0);
        if done {
            out.push(byte);
            return;
        }
        out.push(byte | CONTINUE);
    }
}

/// Number of bytes [`encode_unsigned`] produces for `value`.
#[inline]
pub fn unsigned_len(value: impl Into<u128>) -> usize {
    let significant = 128 - value.into().leading_zeros();
    max_groups(significant).max(1)
}

/// Number of bytes [`encode_signed`] produces for `value`.
#[inline]
pub fn signed_len(value: impl Into<i128>) -> usize {
    let value = value.into();
    // One extra bit carries the sign in the final group.
    let magnitude = if value < 0 { !value } else { value };
    let significant = 128 - magnitude.leading_zeros() + 1;
    max_groups(significant).max(1)
}

/// Pull an unsigned varint of at most `bits` bits from `next`.
pub(crate) fn read_unsigned(mut next: impl FnMut() -> Result<u8>, bits: u32) -> Result<u128> {
    let mut value = 0u128;
    for group in 0..max_groups(bits) {
        let byte = next()?;
        let shift = 7 * group as u32;
        let payload = u128::from(byte & PAYLOAD);
        if shift + 7 > bits && payload >> (bits - shift) != 0 {
            return Err(varint_overflow(bits));
        }
        value |= payload << shift;
        if byte & CONTINUE == 0 {
            return Ok(value);
        }
    }
    Err(varint_overflow(bits))
}

/// Pull a signed varint of at most `bits` bits from `next`.
pub(crate) fn read_signed(mut next: impl FnMut() -> Result<u8>, bits: u32) -> Result<i128> {
    let mut value = 0i128;
    let mut shift = 0u32;
    for _ in 0..max_groups(bits) {
        let byte = next()?;
        let payload = byte & PAYLOAD;
        if shift + 7 > 128 {
            // Bits above the 128th must replicate the sign bit.
            let spill = payload >> (128 - shift - 1);
            if spill != 0 && spill != PAYLOAD >> (128 - shift - 1) {
                return Err(varint_overflow(bits));
            }
        }
        value |= i128::from(payload) << shift;
        shift += 7;
        if byte & CONTINUE == 0 {
            if shift < 128 && byte & SIGN != 0 {
                value |= -1i128 << shift;
            }
            if bits < 128 {
                let max = (1i128 << (bits - 1)) - 1;
                if value > max || value < -max - 1 {
                    return Err(varint_overflow(bits));
                }
            }
            return Ok(value);
        }
    }
    Err(varint_overflow(bits))
}

/// Decode one unsigned 64-bit varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let (value, used) = decode_with(bytes, |next| read_unsigned(next, 64))?;
    Ok((value as u64, used))
}

/// Decode one signed 64-bit varint from the front of `bytes`.
pub fn decode_i64(bytes: &[u8]) -> Result<(i64, usize)> {
    let (value, used) = decode_with(bytes, |next| read_signed(next, 64))?;
    Ok((value as i64, used))
}

/// Decode one unsigned 128-bit varint from the front of `bytes`.
pub fn decode_u128(bytes: &[u8]) -> Result<(u128, usize)> {
    decode_with(bytes, |next| read_unsigned(next, 128))
}

/// Decode one signed 128-bit varint from the front of `bytes`.
pub fn decode_i128(bytes: &[u8]) -> Result<(i128, usize)> {
    decode_with(bytes, |next| read_signed(next, 128))
}

fn decode_with<T>(
    bytes: &[u8],
    decode: impl FnOnce(&mut dyn FnMut() -> Result<u8>) -> Result<T>,
) -> Result<(T, usize)> {
    let mut used = 0;
    let mut next = || {
        let byte = *bytes.get(used).ok_or_else(|| end_of_data(used + 1, used))?;
        used += 1;
        Ok(byte)
    };
    let value = decode(&mut next)?;
    Ok((value, used))
}

/// Encode a run of unsigned values back to back.
pub fn encode_all(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len());
    for &value in values {
        encode_unsigned(value, &mut out);
    }
    out
}

/// Decode `count` unsigned values from the front of `bytes`.
///
/// Returns the number of bytes consumed alongside the values.
pub fn decode_all(count: usize, bytes: &[u8]) -> Result<(usize, Vec<u64>)> {
    let mut offset = 0;
    let mut out = Vec::with_capacity(count.min(bytes.len()));
    for _ in 0..count {
        let (value, used) = decode_u64(&bytes[offset..])?;
        offset += used;
        out.push(value);
    }
    Ok((offset, out))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{proptest_config::proptest_cfg, Error},
        proptest::prelude::*,
    };

    fn unsigned(value: impl Into<u128>) -> Vec<u8> {
        let mut out = Vec::new();
        encode_unsigned(value, &mut out);
        out
    }

    fn signed(value: impl Into<i128>) -> Vec<u8> {
        let mut out = Vec::new();
        encode_signed(value, &mut out);
        out
    }

    #[test]
    fn reference_vectors() {
        assert_eq!(unsigned(0u64), [0x00]);
        assert_eq!(unsigned(127u64), [0x7f]);
        assert_eq!(unsigned(128u64), [0x80, 0x01]);
        assert_eq!(unsigned(5000u64), [0x88, 0x27]);
        assert_eq!(unsigned(624_485u64), [0xe5, 0x8e, 0x26]);
        assert_eq!(
            unsigned(u64::MAX),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );

        assert_eq!(signed(0i64), [0x00]);
        assert_eq!(signed(63i64), [0x3f]);
        assert_eq!(signed(64i64), [0xc0, 0x00]);
        assert_eq!(signed(-1i64), [0x7f]);
        assert_eq!(signed(-64i64), [0x40]);
        assert_eq!(signed(-65i64), [0xbf, 0x7f]);
        assert_eq!(signed(-123_456i64), [0xc0, 0xbb, 0x78]);
        assert_eq!(signed(i64::MIN).len(), MAX_LEN_64);
        assert_eq!(signed(i64::MAX).len(), MAX_LEN_64);
    }

    #[test]
    fn sequential_values() {
        let bytes = encode_all(&[5000, 69]);
        let (used, values) = decode_all(2, &bytes).unwrap();
        assert_eq!(values, [5000, 69]);
        assert_eq!(used, bytes.len());
    }

    #[test]
    fn rejects_too_many_groups() {
        let bytes = [0xff; 11];
        assert!(matches!(decode_u64(&bytes), Err(Error::VarintOverflow(64))));
        assert!(matches!(decode_i64(&bytes), Err(Error::VarintOverflow(64))));
    }

    #[test]
    fn rejects_values_wider_than_target() {
        // 2^64 needs a tenth group with payload 2.
        let bytes = unsigned(1u128 << 64);
        assert!(matches!(decode_u64(&bytes), Err(Error::VarintOverflow(64))));
        assert_eq!(decode_u128(&bytes).unwrap(), (1u128 << 64, bytes.len()));

        let bytes = signed(i128::from(i64::MIN) - 1);
        assert!(matches!(decode_i64(&bytes), Err(Error::VarintOverflow(64))));
    }

    #[test]
    fn truncated_input_is_end_of_data() {
        assert!(matches!(
            decode_u64(&[0x80, 0x80]),
            Err(Error::EndOfData { needed: 3, got: 2 })
        ));
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn unsigned_roundtrip(value in any::<u64>()) {
            let bytes = unsigned(value);
            prop_assert_eq!(bytes.len(), unsigned_len(value));
            prop_assert_eq!(decode_u64(&bytes).unwrap(), (value, bytes.len()));
        }

        #[test]
        fn signed_roundtrip(value in any::<i64>()) {
            let bytes = signed(value);
            prop_assert_eq!(bytes.len(), signed_len(value));
            prop_assert_eq!(decode_i64(&bytes).unwrap(), (value, bytes.len()));
        }

        #[test]
        fn wide_roundtrip(u in any::<u128>(), i in any::<i128>()) {
            let bytes = unsigned(u);
            prop_assert!(bytes.len() <= MAX_LEN_128);
            prop_assert_eq!(decode_u128(&bytes).unwrap(), (u, bytes.len()));
            let bytes = signed(i);
            prop_assert!(bytes.len() <= MAX_LEN_128);
            prop_assert_eq!(decode_i128(&bytes).unwrap(), (i, bytes.len()));
        }
    }

    #[test]
    fn signed_extremes() {
        for value in [i64::MIN, i64::MAX, -1, 0, 1] {
            let bytes = signed(value);
            assert_eq!(decode_i64(&bytes).unwrap().0, value);
        }
        for value in [i128::MIN, i128::MAX] {
            let bytes = signed(value);
            assert_eq!(decode_i128(&bytes).unwrap().0, value);
        }
    }
}
