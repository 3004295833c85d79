use {
    super::{Buffer, CHUNK},
    crate::{
        error::{timestamp_out_of_range, Result},
        id::Uuid,
        varint,
    },
    base64::{engine::general_purpose::URL_SAFE, Engine as _},
    chrono::{DateTime, Utc},
    rand::RngCore,
    sha2::{Digest, Sha512},
};

impl Buffer<'_> {
    #[inline]
    pub fn write_uvarint(&mut self, value: u64) -> Result<()> {
        self.write_uvarint128(value.into())
    }

    #[inline]
    pub fn read_uvarint(&mut self) -> Result<u64> {
        // Range checked by the 64-bit decoder.
        Ok(varint::read_unsigned(|| self.read_u8(), 64)? as u64)
    }

    #[inline]
    pub fn write_varint(&mut self, value: i64) -> Result<()> {
        self.write_varint128(value.into())
    }

    #[inline]
    pub fn read_varint(&mut self) -> Result<i64> {
        Ok(varint::read_signed(|| self.read_u8(), 64)? as i64)
    }

    pub fn write_uvarint128(&mut self, value: u128) -> Result<()> {
        let mut out = Vec::with_capacity(varint::unsigned_len(value));
        varint::encode_unsigned(value, &mut out);
        self.write_bytes(&out)
    }

    pub fn read_uvarint128(&mut self) -> Result<u128> {
        varint::read_unsigned(|| self.read_u8(), 128)
    }

    pub fn write_varint128(&mut self, value: i128) -> Result<()> {
        let mut out = Vec::with_capacity(varint::signed_len(value));
        varint::encode_signed(value, &mut out);
        self.write_bytes(&out)
    }

    pub fn read_varint128(&mut self) -> Result<i128> {
        varint::read_signed(|| self.read_u8(), 128)
    }

    #[inline]
    pub fn write_uuid(&mut self, id: &Uuid) -> Result<()> {
        self.write_bytes(id.as_bytes())
    }

    #[inline]
    pub fn read_uuid(&mut self) -> Result<Uuid> {
        Ok(Uuid::from_bytes(self.read_array()?))
    }

    /// Milliseconds since the Unix epoch as an unsigned varint.
    ///
    /// Instants before the epoch cannot be represented.
    pub fn write_date(&mut self, date: &DateTime<Utc>) -> Result<()> {
        let millis = date.timestamp_millis();
        let millis = u64::try_from(millis).map_err(|_| timestamp_out_of_range(millis.into()))?;
        self.write_uvarint(millis)
    }

    pub fn read_date(&mut self) -> Result<DateTime<Utc>> {
        let millis = self.read_uvarint()?;
        i64::try_from(millis)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| timestamp_out_of_range(millis.into()))
    }

    /// Nanoseconds since the Unix epoch as a signed varint.
    ///
    /// Covers roughly the years 1677 to 2262.
    pub fn write_time(&mut self, time: &DateTime<Utc>) -> Result<()> {
        let nanos = time
            .timestamp_nanos_opt()
            .ok_or_else(|| timestamp_out_of_range(time.timestamp().into()))?;
        self.write_varint(nanos)
    }

    pub fn read_time(&mut self) -> Result<DateTime<Utc>> {
        Ok(DateTime::from_timestamp_nanos(self.read_varint()?))
    }

    /// Append `n` random bytes.
    pub fn write_random(&mut self, n: usize) -> Result<()> {
        let mut bytes = vec![0u8; n];
        rand::rng().fill_bytes(&mut bytes);
        self.write_bytes(&bytes)
    }

    /// SHA-512 of the full contents.
    pub fn sha512_digest(&mut self) -> Result<[u8; 64]> {
        let digest = Sha512::digest(self.contents()?);
        let mut out = [0u8; 64];
        out.copy_from_slice(&digest);
        Ok(out)
    }

    /// URL-safe, padded base64 of the full contents.
    pub fn to_base64(&mut self) -> Result<String> {
        Ok(URL_SAFE.encode(self.contents()?))
    }

    /// Absolute position of the first occurrence of `needle` at or after the
    /// read cursor.
    ///
    /// The read cursor is left where it was, so the backend must be seekable.
    pub fn find(&mut self, needle: &[u8]) -> Result<Option<u64>> {
        let start = self.read_pos()?;
        if needle.is_empty() {
            return Ok(Some(start));
        }

        let mut window = Vec::with_capacity(CHUNK + needle.len());
        let mut window_start = start;
        let mut chunk = [0u8; CHUNK];
        let found = loop {
            let got = self.read_into(&mut chunk)?;
            if got == 0 {
                break None;
            }
            window.extend_from_slice(&chunk[..got]);
            if let Some(i) = window.windows(needle.len()).position(|w| w == needle) {
                break Some(window_start + i as u64);
            }
            // Retain a tail long enough to catch a match straddling chunks.
            let keep = (needle.len() - 1).min(window.len());
            let discard = window.len() - keep;
            window.drain(..discard);
            window_start += discard as u64;
        };

        self.seek_read(start)?;
        Ok(found)
    }
}

impl Buffer<'static> {
    /// In-memory buffer holding the decoded URL-safe base64 `text`.
    pub fn from_base64(text: &str) -> Result<Self> {
        Ok(Self::from_vec(URL_SAFE.decode(text)?))
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{id, proptest_config::proptest_cfg, Buffer, Error},
        chrono::{DateTime, TimeZone, Utc},
        proptest::prelude::*,
    };

    #[test]
    fn sequential_varints() {
        let mut buf = Buffer::new();
        buf.write_uvarint(5000).unwrap();
        buf.write_uvarint(69).unwrap();
        assert_eq!(buf.contents().unwrap(), [0x88, 0x27, 69]);
        assert_eq!(
            [buf.read_uvarint().unwrap(), buf.read_uvarint().unwrap()],
            [5000, 69]
        );
    }

    #[test]
    fn varint_extremes() {
        let mut buf = Buffer::new();
        for value in [0, u64::MAX] {
            buf.write_uvarint(value).unwrap();
        }
        for value in [i64::MIN, i64::MAX, -1] {
            buf.write_varint(value).unwrap();
        }
        buf.write_varint128(i128::MIN).unwrap();
        assert_eq!(buf.read_uvarint().unwrap(), 0);
        assert_eq!(buf.read_uvarint().unwrap(), u64::MAX);
        assert_eq!(buf.read_varint().unwrap(), i64::MIN);
        assert_eq!(buf.read_varint().unwrap(), i64::MAX);
        assert_eq!(buf.read_varint().unwrap(), -1);
        assert_eq!(buf.read_varint128().unwrap(), i128::MIN);
    }

    #[test]
    fn uuid_is_raw_bytes() {
        let id = id::parse("123e4567-e89b-12d3-a456-426655440000").unwrap();
        let mut buf = Buffer::new();
        buf.write_uuid(&id).unwrap();
        assert_eq!(buf.contents().unwrap(), id.as_bytes());
        assert_eq!(
            buf.read_uuid().unwrap().to_string(),
            "123e4567-e89b-12d3-a456-426655440000"
        );
    }

    #[test]
    fn date_and_time_encodings() {
        let date = Utc.with_ymd_and_hms(2021, 3, 14, 15, 9, 26).unwrap();
        let mut buf = Buffer::new();
        buf.write_date(&date).unwrap();
        buf.write_time(&date).unwrap();
        assert_eq!(buf.read_date().unwrap(), date);
        assert_eq!(buf.read_time().unwrap(), date);

        let before_epoch = Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 0).unwrap();
        assert!(matches!(
            buf.write_date(&before_epoch),
            Err(Error::TimestampOutOfRange(_))
        ));
        buf.write_time(&before_epoch).unwrap();
        assert_eq!(buf.read_time().unwrap(), before_epoch);
        assert!(DateTime::<Utc>::MAX_UTC.timestamp_nanos_opt().is_none());
        assert!(buf.write_time(&DateTime::<Utc>::MAX_UTC).is_err());
    }

    #[test]
    fn digests_and_base64() {
        let mut buf = Buffer::from_bytes(b"abc");
        let digest = buf.sha512_digest().unwrap();
        assert_eq!(&digest[..4], &[0xdd, 0xaf, 0x35, 0xa1]);

        let mut buf = Buffer::from_bytes(&[0xfb, 0xff]);
        let text = buf.to_base64().unwrap();
        assert_eq!(text, "-_8=");
        assert_eq!(Buffer::from_base64(&text).unwrap().contents().unwrap(), [0xfb, 0xff]);
        assert!(matches!(Buffer::from_base64("***"), Err(Error::InvalidBase64(_))));
    }

    #[test]
    fn random_bytes_are_appended() {
        let mut buf = Buffer::new();
        buf.write_random(32).unwrap();
        assert_eq!(buf.len().unwrap(), 32);
    }

    #[test]
    fn find_leaves_cursor_in_place() {
        let mut haystack = vec![b'.'; 5000];
        haystack.extend_from_slice(b"needle");
        let mut buf = Buffer::from_vec(haystack);
        buf.jump(10).unwrap();
        assert_eq!(buf.find(b"needle").unwrap(), Some(5000));
        assert_eq!(buf.read_pos().unwrap(), 10);
        assert_eq!(buf.find(b"absent").unwrap(), None);
        assert_eq!(buf.read_pos().unwrap(), 10);
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn varint_roundtrip(u in any::<u64>(), i in any::<i64>(), wide in any::<i128>()) {
            let mut buf = Buffer::new();
            buf.write_uvarint(u).unwrap();
            buf.write_varint(i).unwrap();
            buf.write_varint128(wide).unwrap();
            prop_assert_eq!(buf.read_uvarint().unwrap(), u);
            prop_assert_eq!(buf.read_varint().unwrap(), i);
            prop_assert_eq!(buf.read_varint128().unwrap(), wide);
        }
    }
}
