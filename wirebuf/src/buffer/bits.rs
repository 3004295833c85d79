//! Bit-packed booleans.
//!
//! Bits accumulate into a single pending byte. A partially filled byte is
//! only written by [`Buffer::flush_bits`], which must be called before any
//! byte-aligned operation follows a run of bit writes.
use {super::Buffer, crate::error::Result};

const EMPTY: u8 = 8;

#[derive(Debug, Clone, Copy)]
pub(super) struct BitState {
    write_byte: u8,
    /// Free bit slots left in `write_byte`.
    write_free: u8,
    read_byte: u8,
    /// Bits of `read_byte` already consumed.
    read_used: u8,
}

impl Default for BitState {
    fn default() -> Self {
        Self {
            write_byte: 0,
            write_free: EMPTY,
            read_byte: 0,
            read_used: EMPTY,
        }
    }
}

impl Buffer<'_> {
    /// Append a bit, most significant bit first.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        let slot = self.bits.write_free - 1;
        self.push_bit(bit, slot)
    }

    /// Append a bit, least significant bit first.
    pub fn write_bit_lsb(&mut self, bit: bool) -> Result<()> {
        let slot = EMPTY - self.bits.write_free;
        self.push_bit(bit, slot)
    }

    fn push_bit(&mut self, bit: bool, slot: u8) -> Result<()> {
        if bit {
            self.bits.write_byte |= 1 << slot;
        }
        self.bits.write_free -= 1;
        if self.bits.write_free == 0 {
            let byte = self.bits.write_byte;
            self.bits.write_byte = 0;
            self.bits.write_free = EMPTY;
            self.write_u8(byte)?;
        }
        Ok(())
    }

    /// Read the next bit, most significant bit first.
    pub fn read_bit(&mut self) -> Result<bool> {
        let used = self.pull_bit()?;
        Ok((self.bits.read_byte >> (7 - used)) & 1 == 1)
    }

    /// Read the next bit, least significant bit first.
    pub fn read_bit_lsb(&mut self) -> Result<bool> {
        let used = self.pull_bit()?;
        Ok((self.bits.read_byte >> used) & 1 == 1)
    }

    fn pull_bit(&mut self) -> Result<u8> {
        if self.bits.read_used >= EMPTY {
            self.bits.read_byte = self.read_u8()?;
            self.bits.read_used = 0;
        }
        let used = self.bits.read_used;
        self.bits.read_used += 1;
        Ok(used)
    }

    /// Write any partial byte (zero padded) and reset both bit cursors.
    pub fn flush_bits(&mut self) -> Result<()> {
        let pending = self.bits.write_free < EMPTY;
        let byte = self.bits.write_byte;
        self.bits = BitState::default();
        if pending {
            self.write_u8(byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{proptest_config::proptest_cfg, Buffer},
        proptest::prelude::*,
    };

    #[test]
    fn eight_bits_make_one_byte() {
        let mut buf = Buffer::new();
        for bit in [true, false, true, true, false, false, true, false] {
            buf.write_bit(bit).unwrap();
        }
        buf.flush_bits().unwrap();
        assert_eq!(buf.contents().unwrap(), [0b1011_0010]);
    }

    #[test]
    fn lsb_mirrors_msb() {
        let mut buf = Buffer::new();
        for bit in [true, false, true, true, false, false, true, false] {
            buf.write_bit_lsb(bit).unwrap();
        }
        assert_eq!(buf.contents().unwrap(), [0b0100_1101]);
    }

    #[test]
    fn flush_pads_partial_byte() {
        let mut buf = Buffer::new();
        buf.write_bit(true).unwrap();
        buf.write_bit(true).unwrap();
        buf.write_bit(false).unwrap();
        assert!(buf.contents().unwrap().is_empty());
        buf.flush_bits().unwrap();
        buf.write_u8(0xaa).unwrap();
        assert_eq!(buf.contents().unwrap(), [0b1100_0000, 0xaa]);

        assert!(buf.read_bit().unwrap());
        assert!(buf.read_bit().unwrap());
        assert!(!buf.read_bit().unwrap());
        buf.flush_bits().unwrap();
        assert_eq!(buf.read_u8().unwrap(), 0xaa);
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn bit_sequence_roundtrip(bits in proptest::collection::vec(any::<bool>(), 0..64), lsb in any::<bool>()) {
            let mut buf = Buffer::new();
            for &bit in &bits {
                if lsb { buf.write_bit_lsb(bit).unwrap() } else { buf.write_bit(bit).unwrap() }
            }
            buf.flush_bits().unwrap();
            prop_assert_eq!(buf.len().unwrap() as usize, bits.len().div_ceil(8));
            for &bit in &bits {
                let read = if lsb { buf.read_bit_lsb().unwrap() } else { buf.read_bit().unwrap() };
                prop_assert_eq!(read, bit);
            }
        }
    }
}
