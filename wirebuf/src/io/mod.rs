//! Storage backends for [`Buffer`](crate::Buffer).
//!
//! A [`Backend`] owns a byte sequence and two independent cursors, one for
//! reads and one for writes. The following implementations are provided:
//!
//! - [`MemBackend`]: a growable in-memory store.
//! - [`SliceBackend`]: a zero-copy, read-only view over borrowed bytes.
//! - [`FileBackend`]: a store backed by a file handle, optionally read-only.
//! - [`ReaderBackend`], [`SeekableReaderBackend`] and [`WriterBackend`]:
//!   restricted adapters over externally owned streams. Operations in the
//!   direction the stream cannot serve fail with
//!   [`Error::Unsupported`](crate::Error::Unsupported).
//!
//! Invariant for all implementations: `write_pos <= size`. Writes are always
//! contiguous, overwriting in place up to the current end and appending past it.
use crate::error::Result;

mod file;
mod mem;
mod stream;

pub use {
    file::FileBackend,
    mem::{MemBackend, ReadMode, SliceBackend},
    stream::{ReaderBackend, SeekableReaderBackend, WriterBackend},
};

/// A byte store with independent read and write cursors.
///
/// Implementations are not internally synchronized.
pub trait Backend {
    /// Static label used in errors and log events.
    fn name(&self) -> &'static str;

    /// Copy up to `dst.len()` bytes from the read cursor into `dst` and
    /// advance the cursor by the number of bytes produced.
    ///
    /// Returns `Ok(0)` at end of data.
    fn read(&mut self, dst: &mut [u8]) -> Result<usize>;

    /// Write all of `src` at the write cursor and advance it.
    fn write(&mut self, src: &[u8]) -> Result<()>;

    fn seek_read(&mut self, pos: u64) -> Result<()>;

    fn seek_write(&mut self, pos: u64) -> Result<()>;

    fn read_pos(&self) -> Result<u64>;

    fn write_pos(&self) -> Result<u64>;

    /// Current length of the store in bytes.
    fn size(&self) -> Result<u64>;

    /// Materialize the full contents without moving either cursor.
    fn contents(&mut self) -> Result<Vec<u8>>;

    /// Discard all content and reset both cursors to zero.
    fn erase(&mut self) -> Result<()>;

    /// Push any buffered output to the underlying sink.
    #[inline]
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the underlying resource. Subsequent operations may fail.
    fn close(&mut self) -> Result<()>;

    /// Bytes left between the read cursor and the end of the store, when known.
    #[inline]
    fn available(&self) -> Option<u64> {
        let size = self.size().ok()?;
        let pos = self.read_pos().ok()?;
        Some(size.saturating_sub(pos))
    }
}

impl<B: Backend + ?Sized> Backend for &mut B {
    #[inline]
    fn name(&self) -> &'static str {
        (**self).name()
    }

    #[inline]
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        (**self).read(dst)
    }

    #[inline]
    fn write(&mut self, src: &[u8]) -> Result<()> {
        (**self).write(src)
    }

    #[inline]
    fn seek_read(&mut self, pos: u64) -> Result<()> {
        (**self).seek_read(pos)
    }

    #[inline]
    fn seek_write(&mut self, pos: u64) -> Result<()> {
        (**self).seek_write(pos)
    }

    #[inline]
    fn read_pos(&self) -> Result<u64> {
        (**self).read_pos()
    }

    #[inline]
    fn write_pos(&self) -> Result<u64> {
        (**self).write_pos()
    }

    #[inline]
    fn size(&self) -> Result<u64> {
        (**self).size()
    }

    #[inline]
    fn contents(&mut self) -> Result<Vec<u8>> {
        (**self).contents()
    }

    #[inline]
    fn erase(&mut self) -> Result<()> {
        (**self).erase()
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    #[inline]
    fn available(&self) -> Option<u64> {
        (**self).available()
    }
}
