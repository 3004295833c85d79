use {super::Buffer, crate::error::Result};

macro_rules! impl_fixed {
    ($type:ty, $write:ident, $read:ident, $write_be:ident, $read_be:ident) => {
        impl Buffer<'_> {
            #[doc = concat!("Write a little-endian `", stringify!($type), "`.")]
            #[inline]
            pub fn $write(&mut self, value: $type) -> Result<()> {
                self.write_bytes(&value.to_le_bytes())
            }

            #[doc = concat!("Read a little-endian `", stringify!($type), "`.")]
            #[inline]
            pub fn $read(&mut self) -> Result<$type> {
                Ok(<$type>::from_le_bytes(self.read_array()?))
            }

            #[doc = concat!("Write a big-endian `", stringify!($type), "`.")]
            #[inline]
            pub fn $write_be(&mut self, value: $type) -> Result<()> {
                self.write_bytes(&value.to_be_bytes())
            }

            #[doc = concat!("Read a big-endian `", stringify!($type), "`.")]
            #[inline]
            pub fn $read_be(&mut self) -> Result<$type> {
                Ok(<$type>::from_be_bytes(self.read_array()?))
            }
        }
    };
}

impl_fixed!(u16, write_u16, read_u16, write_u16_be, read_u16_be);
impl_fixed!(u32, write_u32, read_u32, write_u32_be, read_u32_be);
impl_fixed!(u64, write_u64, read_u64, write_u64_be, read_u64_be);
impl_fixed!(i16, write_i16, read_i16, write_i16_be, read_i16_be);
impl_fixed!(i32, write_i32, read_i32, write_i32_be, read_i32_be);
impl_fixed!(i64, write_i64, read_i64, write_i64_be, read_i64_be);

// Floats travel as the bit pattern of the matching unsigned integer.
impl Buffer<'_> {
    #[inline]
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_u32(value.to_bits())
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    #[inline]
    pub fn write_f32_be(&mut self, value: f32) -> Result<()> {
        self.write_u32_be(value.to_bits())
    }

    #[inline]
    pub fn read_f32_be(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32_be()?))
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write_u64(value.to_bits())
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    #[inline]
    pub fn write_f64_be(&mut self, value: f64) -> Result<()> {
        self.write_u64_be(value.to_bits())
    }

    #[inline]
    pub fn read_f64_be(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64_be()?))
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{proptest_config::proptest_cfg, Buffer},
        proptest::prelude::*,
    };

    #[test]
    fn byte_order() {
        let mut buf = Buffer::new();
        buf.write_u32(0x0102_0304).unwrap();
        buf.write_u32_be(0x0102_0304).unwrap();
        buf.write_i16(-2).unwrap();
        assert_eq!(buf.contents().unwrap(), [4, 3, 2, 1, 1, 2, 3, 4, 0xfe, 0xff]);
    }

    #[test]
    fn floats_use_bit_patterns() {
        let mut buf = Buffer::new();
        buf.write_f32(1.5).unwrap();
        buf.write_f64_be(-0.0).unwrap();
        assert_eq!(
            buf.contents().unwrap(),
            [0, 0, 0xc0, 0x3f, 0x80, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(buf.read_f32().unwrap(), 1.5);
        let negative_zero = buf.read_f64_be().unwrap();
        assert_eq!(negative_zero, 0.0);
        assert!(negative_zero.is_sign_negative());
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn fixed_roundtrip(
            a in any::<u16>(), b in any::<u32>(), c in any::<u64>(),
            d in any::<i16>(), e in any::<i32>(), f in any::<i64>(),
            g in any::<f32>(), h in any::<f64>(),
        ) {
            let mut buf = Buffer::new();
            buf.write_u16(a).unwrap();
            buf.write_u16_be(a).unwrap();
            buf.write_u32(b).unwrap();
            buf.write_u32_be(b).unwrap();
            buf.write_u64(c).unwrap();
            buf.write_u64_be(c).unwrap();
            buf.write_i16(d).unwrap();
            buf.write_i16_be(d).unwrap();
            buf.write_i32(e).unwrap();
            buf.write_i32_be(e).unwrap();
            buf.write_i64(f).unwrap();
            buf.write_i64_be(f).unwrap();
            buf.write_f32(g).unwrap();
            buf.write_f32_be(g).unwrap();
            buf.write_f64(h).unwrap();
            buf.write_f64_be(h).unwrap();

            prop_assert_eq!(buf.read_u16().unwrap(), a);
            prop_assert_eq!(buf.read_u16_be().unwrap(), a);
            prop_assert_eq!(buf.read_u32().unwrap(), b);
            prop_assert_eq!(buf.read_u32_be().unwrap(), b);
            prop_assert_eq!(buf.read_u64().unwrap(), c);
            prop_assert_eq!(buf.read_u64_be().unwrap(), c);
            prop_assert_eq!(buf.read_i16().unwrap(), d);
            prop_assert_eq!(buf.read_i16_be().unwrap(), d);
            prop_assert_eq!(buf.read_i32().unwrap(), e);
            prop_assert_eq!(buf.read_i32_be().unwrap(), e);
            prop_assert_eq!(buf.read_i64().unwrap(), f);
            prop_assert_eq!(buf.read_i64_be().unwrap(), f);
            prop_assert_eq!(buf.read_f32().unwrap().to_bits(), g.to_bits());
            prop_assert_eq!(buf.read_f32_be().unwrap().to_bits(), g.to_bits());
            prop_assert_eq!(buf.read_f64().unwrap().to_bits(), h.to_bits());
            prop_assert_eq!(buf.read_f64_be().unwrap().to_bits(), h.to_bits());
        }
    }
}
