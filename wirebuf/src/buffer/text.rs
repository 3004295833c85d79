use {
    super::Buffer,
    crate::error::{end_of_data, invalid_char_encoding, Result},
};

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

impl Buffer<'_> {
    /// Varint byte length followed by the UTF-8 bytes of `s`.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_limited_bytes(s.as_bytes())
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// Malformed UTF-8 yields an empty string. A length prefix that runs past
    /// the end of the input is an error.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_limited_bytes()?;
        Ok(String::from_utf8(bytes).unwrap_or_default())
    }

    /// Write exactly `width` bytes: `s` truncated at a char boundary, padded
    /// with NULs.
    pub fn write_fixed_string(&mut self, s: &str, width: usize) -> Result<()> {
        let s = truncate_to_boundary(s, width);
        let mut field = vec![0u8; width];
        field[..s.len()].copy_from_slice(s.as_bytes());
        self.write_bytes(&field)
    }

    /// Read a `width` byte field and trim trailing NULs.
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let mut bytes = self.read_bytes(width)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        bytes.truncate(end);
        Ok(String::from_utf8(bytes).unwrap_or_default())
    }

    /// Fixed-width string stored with its chars in reverse order.
    pub fn write_inverted_string(&mut self, s: &str, width: usize) -> Result<()> {
        self.write_fixed_string(&reversed(s), width)
    }

    pub fn read_inverted_string(&mut self, width: usize) -> Result<String> {
        Ok(reversed(&self.read_fixed_string(width)?))
    }

    /// `s` followed by a NUL byte.
    ///
    /// Interior NULs are written verbatim and will cut the string short on read.
    pub fn write_cstring(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())?;
        self.write_u8(0)
    }

    /// Read up to a NUL byte or the end of the input.
    pub fn read_cstring(&mut self) -> Result<String> {
        self.read_delimited(0)
    }

    /// Read up to `delimiter`, a NUL byte, or the end of the input.
    ///
    /// The terminator is consumed but not returned.
    pub fn read_delimited(&mut self, delimiter: u8) -> Result<String> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        while self.read_into(&mut byte)? == 1 && byte[0] != 0 && byte[0] != delimiter {
            out.push(byte[0]);
        }
        Ok(String::from_utf8(out).unwrap_or_default())
    }

    pub fn write_char(&mut self, c: char) -> Result<()> {
        let mut scratch = [0u8; 4];
        self.write_bytes(c.encode_utf8(&mut scratch).as_bytes())
    }

    /// Read one UTF-8 encoded scalar value.
    pub fn read_char(&mut self) -> Result<char> {
        let lead = self.read_u8()?;
        let width = match lead {
            0x00..=0x7f => 1,
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Err(invalid_char_encoding()),
        };
        let mut scratch = [lead, 0, 0, 0];
        self.read_exact_into(&mut scratch[1..width])?;
        core::str::from_utf8(&scratch[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(invalid_char_encoding)
    }

    /// Read chars up to `delimiter` or the end of the input.
    pub fn read_until_char(&mut self, delimiter: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.read_char() {
                Ok(c) if c == delimiter => return Ok(out),
                Ok(c) => out.push(c),
                Err(crate::Error::EndOfData { .. }) => return Ok(out),
                Err(e) => return Err(e),
            }
        }
    }

    /// Read `units` little-endian UTF-16 code units.
    ///
    /// Unpaired surrogates become U+FFFD.
    pub fn read_utf16(&mut self, units: usize) -> Result<String> {
        let mut code_units = Vec::with_capacity(units.min(self.limits.max_preallocation / 2));
        for _ in 0..units {
            code_units.push(self.read_u16()?);
        }
        Ok(String::from_utf16_lossy(&code_units))
    }

    pub fn write_utf16(&mut self, s: &str) -> Result<()> {
        for unit in s.encode_utf16() {
            self.write_u16(unit)?;
        }
        Ok(())
    }

    /// Read until `token` and return everything before it.
    ///
    /// The token itself is consumed. Running out of input before the token
    /// appears is an error.
    pub fn read_until_token(&mut self, token: &[u8]) -> Result<String> {
        let mut out = Vec::new();
        if token.is_empty() {
            return Ok(String::new());
        }
        let mut byte = [0u8; 1];
        while !out.ends_with(token) {
            if self.read_into(&mut byte)? == 0 {
                return Err(end_of_data(out.len() + 1, out.len()));
            }
            out.push(byte[0]);
        }
        out.truncate(out.len() - token.len());
        Ok(String::from_utf8(out).unwrap_or_default())
    }
}
