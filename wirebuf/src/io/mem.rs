use {
    super::Backend,
    crate::error::{read_only, seek_out_of_bounds, Result},
};

/// Behavior of [`MemBackend::read`] when the request runs past the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Return fewer bytes than requested; `0` signals end of data.
    #[default]
    Short,
    /// Pad the missing tail of a read that starts inside the store with zero
    /// bytes and report a full read.
    ///
    /// A read that starts at the end still returns `0`, and the read cursor
    /// never advances past the end of the store.
    ZeroFill,
}

/// Growable in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemBackend {
    buf: Vec<u8>,
    rpos: usize,
    wpos: usize,
    mode: ReadMode,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `bytes` into a new store. The write cursor is placed at the end.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Adopt `buf` as the backing store without copying.
    pub fn from_vec(buf: Vec<u8>) -> Self {
        let wpos = buf.len();
        Self {
            buf,
            rpos: 0,
            wpos,
            mode: ReadMode::Short,
        }
    }

    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn read_mode(&self) -> ReadMode {
        self.mode
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the backend and return the backing store.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Backend for MemBackend {
    #[inline]
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let remaining = self.buf.len().saturating_sub(self.rpos);
        let n = remaining.min(dst.len());
        dst[..n].copy_from_slice(&self.buf[self.rpos..self.rpos + n]);
        self.rpos += n;

        match self.mode {
            ReadMode::Short => Ok(n),
            ReadMode::ZeroFill if n == 0 => Ok(0),
            ReadMode::ZeroFill => {
                dst[n..].fill(0);
                Ok(dst.len())
            }
        }
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        let overlap = self.buf.len().saturating_sub(self.wpos).min(src.len());
        let (inside, outside) = src.split_at(overlap);
        self.buf[self.wpos..self.wpos + overlap].copy_from_slice(inside);
        self.buf.extend_from_slice(outside);
        self.wpos += src.len();
        Ok(())
    }

    fn seek_read(&mut self, pos: u64) -> Result<()> {
        self.rpos = checked_pos(pos, self.buf.len())?;
        Ok(())
    }

    fn seek_write(&mut self, pos: u64) -> Result<()> {
        self.wpos = checked_pos(pos, self.buf.len())?;
        Ok(())
    }

    #[inline]
    fn read_pos(&self) -> Result<u64> {
        Ok(self.rpos as u64)
    }

    #[inline]
    fn write_pos(&self) -> Result<u64> {
        Ok(self.wpos as u64)
    }

    #[inline]
    fn size(&self) -> Result<u64> {
        Ok(self.buf.len() as u64)
    }

    fn contents(&mut self) -> Result<Vec<u8>> {
        Ok(self.buf.clone())
    }

    fn erase(&mut self) -> Result<()> {
        self.buf.clear();
        self.rpos = 0;
        self.wpos = 0;
        Ok(())
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn available(&self) -> Option<u64> {
        Some(self.buf.len().saturating_sub(self.rpos) as u64)
    }
}

/// Read-only view over a borrowed byte slice. Nothing is copied.
#[derive(Debug, Clone, Copy)]
pub struct SliceBackend<'a> {
    bytes: &'a [u8],
    rpos: usize,
}

impl<'a> SliceBackend<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, rpos: 0 }
    }

    /// The unread tail of the slice.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.rpos..]
    }
}

impl Backend for SliceBackend<'_> {
    #[inline]
    fn name(&self) -> &'static str {
        "slice"
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let src = self.remaining();
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        self.rpos += n;
        Ok(n)
    }

    fn write(&mut self, _src: &[u8]) -> Result<()> {
        Err(read_only(self.name()))
    }

    fn seek_read(&mut self, pos: u64) -> Result<()> {
        self.rpos = checked_pos(pos, self.bytes.len())?;
        Ok(())
    }

    fn seek_write(&mut self, _pos: u64) -> Result<()> {
        Err(read_only(self.name()))
    }

    #[inline]
    fn read_pos(&self) -> Result<u64> {
        Ok(self.rpos as u64)
    }

    #[inline]
    fn write_pos(&self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    #[inline]
    fn size(&self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn contents(&mut self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }

    fn erase(&mut self) -> Result<()> {
        Err(read_only(self.name()))
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn available(&self) -> Option<u64> {
        Some((self.bytes.len() - self.rpos) as u64)
    }
}

#[inline]
fn checked_pos(pos: u64, size: usize) -> Result<usize> {
    match usize::try_from(pos) {
        Ok(p) if p <= size => Ok(p),
        _ => Err(seek_out_of_bounds(pos, size as u64)),
    }
}
