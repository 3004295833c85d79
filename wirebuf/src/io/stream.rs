//! Restricted adapters over externally owned streams.
//!
//! Each adapter serves one direction only. Calls in the other direction fail
//! with [`Error::Unsupported`](crate::Error::Unsupported) rather than being
//! silently ignored.
use {
    super::Backend,
    crate::error::{seek_out_of_bounds, unsupported, Result},
    std::io::{Read, Seek, SeekFrom, Write},
};

/// Read-only, forward-only adapter over any [`Read`].
#[derive(Debug)]
pub struct ReaderBackend<R> {
    inner: R,
    rpos: u64,
}

impl<R: Read> ReaderBackend<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, rpos: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Backend for ReaderBackend<R> {
    #[inline]
    fn name(&self) -> &'static str {
        "reader"
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let n = self.inner.read(dst)?;
        self.rpos += n as u64;
        Ok(n)
    }

    fn write(&mut self, _src: &[u8]) -> Result<()> {
        Err(unsupported(self.name(), "write"))
    }

    fn seek_read(&mut self, _pos: u64) -> Result<()> {
        Err(unsupported(self.name(), "seek"))
    }

    fn seek_write(&mut self, _pos: u64) -> Result<()> {
        Err(unsupported(self.name(), "seek"))
    }

    #[inline]
    fn read_pos(&self) -> Result<u64> {
        Ok(self.rpos)
    }

    fn write_pos(&self) -> Result<u64> {
        Err(unsupported(self.name(), "write position"))
    }

    fn size(&self) -> Result<u64> {
        Err(unsupported(self.name(), "size"))
    }

    fn contents(&mut self) -> Result<Vec<u8>> {
        Err(unsupported(self.name(), "bytes"))
    }

    fn erase(&mut self) -> Result<()> {
        Err(unsupported(self.name(), "erase"))
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn available(&self) -> Option<u64> {
        None
    }
}

/// Read-only adapter over a [`Read`] + [`Seek`] stream.
///
/// The stream length is measured once, at construction.
#[derive(Debug)]
pub struct SeekableReaderBackend<R> {
    inner: R,
    rpos: u64,
    len: u64,
}

impl<R: Read + Seek> SeekableReaderBackend<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let rpos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(rpos))?;
        Ok(Self { inner, rpos, len })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Backend for SeekableReaderBackend<R> {
    #[inline]
    fn name(&self) -> &'static str {
        "seekable reader"
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let n = self.inner.read(dst)?;
        self.rpos += n as u64;
        Ok(n)
    }

    fn write(&mut self, _src: &[u8]) -> Result<()> {
        Err(unsupported(self.name(), "write"))
    }

    fn seek_read(&mut self, pos: u64) -> Result<()> {
        if pos > self.len {
            return Err(seek_out_of_bounds(pos, self.len));
        }
        self.inner.seek(SeekFrom::Start(pos))?;
        self.rpos = pos;
        Ok(())
    }

    fn seek_write(&mut self, _pos: u64) -> Result<()> {
        Err(unsupported(self.name(), "seek write"))
    }

    #[inline]
    fn read_pos(&self) -> Result<u64> {
        Ok(self.rpos)
    }

    fn write_pos(&self) -> Result<u64> {
        Err(unsupported(self.name(), "write position"))
    }

    #[inline]
    fn size(&self) -> Result<u64> {
        Ok(self.len)
    }

    fn contents(&mut self) -> Result<Vec<u8>> {
        self.inner.seek(SeekFrom::Start(0))?;
        let mut out = Vec::with_capacity(self.len as usize);
        self.inner.read_to_end(&mut out)?;
        self.inner.seek(SeekFrom::Start(self.rpos))?;
        Ok(out)
    }

    fn erase(&mut self) -> Result<()> {
        Err(unsupported(self.name(), "erase"))
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Write-only adapter over any [`Write`].
#[derive(Debug)]
pub struct WriterBackend<W> {
    inner: W,
    written: u64,
}

impl<W: Write> WriterBackend<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Backend for WriterBackend<W> {
    #[inline]
    fn name(&self) -> &'static str {
        "writer"
    }

    fn read(&mut self, _dst: &mut [u8]) -> Result<usize> {
        Err(unsupported(self.name(), "read"))
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        self.inner.write_all(src)?;
        self.written += src.len() as u64;
        Ok(())
    }

    fn seek_read(&mut self, _pos: u64) -> Result<()> {
        Err(unsupported(self.name(), "seek"))
    }

    fn seek_write(&mut self, _pos: u64) -> Result<()> {
        Err(unsupported(self.name(), "seek"))
    }

    fn read_pos(&self) -> Result<u64> {
        Err(unsupported(self.name(), "read position"))
    }

    #[inline]
    fn write_pos(&self) -> Result<u64> {
        Ok(self.written)
    }

    #[inline]
    fn size(&self) -> Result<u64> {
        Ok(self.written)
    }

    fn contents(&mut self) -> Result<Vec<u8>> {
        Err(unsupported(self.name(), "bytes"))
    }

    fn erase(&mut self) -> Result<()> {
        Err(unsupported(self.name(), "erase"))
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush()
    }

    #[inline]
    fn available(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::Error, std::io::Cursor};

    #[test]
    fn reader_rejects_write_side() {
        let mut backend = ReaderBackend::new(&[1u8, 2, 3][..]);
        assert!(matches!(
            backend.write(&[0]),
            Err(Error::Unsupported { backend: "reader", operation: "write" })
        ));
        assert!(matches!(backend.seek_read(0), Err(Error::Unsupported { .. })));
        let mut out = [0; 2];
        assert_eq!(backend.read(&mut out).unwrap(), 2);
        assert_eq!(backend.read_pos().unwrap(), 2);
        assert_eq!(backend.available(), None);
    }

    #[test]
    fn seekable_reader_seeks_within_bounds() {
        let mut backend = SeekableReaderBackend::new(Cursor::new(vec![1u8, 2, 3, 4])).unwrap();
        assert_eq!(backend.size().unwrap(), 4);
        backend.seek_read(2).unwrap();
        let mut out = [0; 2];
        assert_eq!(backend.read(&mut out).unwrap(), 2);
        assert_eq!(out, [3, 4]);
        assert_eq!(backend.contents().unwrap(), [1, 2, 3, 4]);
        assert_eq!(backend.read_pos().unwrap(), 4);
        assert!(matches!(backend.seek_read(5), Err(Error::SeekOutOfBounds { .. })));
        assert!(matches!(backend.write(&[0]), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn writer_rejects_read_side() {
        let mut sink = Vec::new();
        {
            let mut backend = WriterBackend::new(&mut sink);
            backend.write(b"abc").unwrap();
            assert_eq!(backend.write_pos().unwrap(), 3);
            assert!(matches!(
                backend.read(&mut [0; 1]),
                Err(Error::Unsupported { backend: "writer", operation: "read" })
            ));
            assert!(matches!(backend.seek_write(0), Err(Error::Unsupported { .. })));
            assert!(matches!(backend.contents(), Err(Error::Unsupported { .. })));
            backend.close().unwrap();
        }
        assert_eq!(sink, b"abc");
    }
}
