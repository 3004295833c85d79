//! [`Buffer`], the facade over a [`Backend`].
//!
//! The primitive codec is implemented as inherent methods spread over the
//! submodules of this module:
//!
//! - [`fixed`]: fixed-width integers and floats, little- and big-endian.
//! - [`text`]: length-prefixed, fixed-width and NUL-terminated strings.
//! - [`bits`]: bit-packed booleans.
//! - [`extra`]: varints, UUIDs, timestamps, hashing and search helpers.
use {
    crate::{
        config::DecodeLimits,
        error::{end_of_data, length_exceeds_input, Result},
        io::{
            Backend, FileBackend, MemBackend, ReaderBackend, SeekableReaderBackend, SliceBackend,
            WriterBackend,
        },
    },
    core::fmt,
    std::{
        io::{Read, Seek, Write},
        path::Path,
    },
    tracing::debug,
};

mod bits;
mod extra;
mod fixed;
mod text;

const CHUNK: usize = 4096;

/// A byte buffer with independent read and write cursors over a pluggable
/// [`Backend`].
///
/// A `Buffer` exclusively owns its backend. The lifetime parameter allows the
/// backend to borrow external state, such as a `&mut Vec<u8>` sink.
///
/// ```
/// use wirebuf::Buffer;
///
/// let mut buf = Buffer::new();
/// buf.write_uvarint(5000).unwrap();
/// buf.write_string("hello").unwrap();
/// assert_eq!(buf.read_uvarint().unwrap(), 5000);
/// assert_eq!(buf.read_string().unwrap(), "hello");
/// ```
pub struct Buffer<'a> {
    backend: Box<dyn Backend + 'a>,
    bits: bits::BitState,
    limits: DecodeLimits,
}

impl Default for Buffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("backend", &self.backend.name())
            .field("read_pos", &self.backend.read_pos().ok())
            .field("write_pos", &self.backend.write_pos().ok())
            .finish_non_exhaustive()
    }
}

impl Buffer<'static> {
    /// Empty in-memory buffer.
    pub fn new() -> Self {
        Self::with_backend(MemBackend::new())
    }

    /// In-memory buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::with_backend(MemBackend::from_slice(bytes))
    }

    /// In-memory buffer that adopts `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::with_backend(MemBackend::from_vec(bytes))
    }

    /// File-backed buffer, creating `path` when it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_backend(FileBackend::open(path)?))
    }

    /// Read-only file-backed buffer. `path` must exist.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_backend(FileBackend::open_read_only(path)?))
    }
}

impl<'a> Buffer<'a> {
    pub fn with_backend(backend: impl Backend + 'a) -> Self {
        Self {
            backend: Box::new(backend),
            bits: bits::BitState::default(),
            limits: DecodeLimits::default(),
        }
    }

    /// Read-only buffer that decodes straight out of `bytes` without copying.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::with_backend(SliceBackend::new(bytes))
    }

    /// Read-only buffer over an external stream.
    pub fn from_reader(reader: impl Read + 'a) -> Self {
        Self::with_backend(ReaderBackend::new(reader))
    }

    /// Read-only buffer over an external seekable stream.
    pub fn from_seekable_reader(reader: impl Read + Seek + 'a) -> Result<Self> {
        Ok(Self::with_backend(SeekableReaderBackend::new(reader)?))
    }

    /// Write-only buffer over an external sink.
    pub fn from_writer(writer: impl Write + 'a) -> Self {
        Self::with_backend(WriterBackend::new(writer))
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Replace the backend, dropping the previous one.
    ///
    /// Pending bit state is discarded along with it.
    pub fn attach(&mut self, backend: impl Backend + 'a) {
        debug!(
            from = self.backend.name(),
            to = backend.name(),
            "attaching buffer backend"
        );
        self.backend = Box::new(backend);
        self.bits = bits::BitState::default();
    }

    #[inline]
    pub fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut (dyn Backend + 'a) {
        &mut *self.backend
    }

    #[inline]
    pub fn read_pos(&self) -> Result<u64> {
        self.backend.read_pos()
    }

    #[inline]
    pub fn write_pos(&self) -> Result<u64> {
        self.backend.write_pos()
    }

    #[inline]
    pub fn seek_read(&mut self, pos: u64) -> Result<()> {
        self.backend.seek_read(pos)
    }

    #[inline]
    pub fn seek_write(&mut self, pos: u64) -> Result<()> {
        self.backend.seek_write(pos)
    }

    /// Advance the read cursor by `n` bytes.
    pub fn jump(&mut self, n: u64) -> Result<()> {
        let pos = self.read_pos()?;
        self.seek_read(pos.saturating_add(n))
    }

    /// Move the read cursor back by `n` bytes, stopping at zero.
    pub fn reverse(&mut self, n: u64) -> Result<()> {
        let pos = self.read_pos()?;
        self.seek_read(pos.saturating_sub(n))
    }

    /// Total size of the backend in bytes.
    #[inline]
    pub fn len(&self) -> Result<u64> {
        self.backend.size()
    }

    #[inline]
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Bytes left to read, when the backend knows its size.
    #[inline]
    pub fn available(&self) -> Option<u64> {
        self.backend.available()
    }

    /// Full contents of the backend. Neither cursor moves.
    #[inline]
    pub fn contents(&mut self) -> Result<Vec<u8>> {
        self.backend.contents()
    }

    /// Flush pending bits, then return the full contents.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.flush_bits()?;
        self.contents()
    }

    /// Discard all content and reset both cursors.
    pub fn erase(&mut self) -> Result<()> {
        self.bits = bits::BitState::default();
        self.backend.erase()
    }

    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        self.backend.flush()
    }

    pub fn close(&mut self) -> Result<()> {
        self.backend.close()
    }

    #[inline]
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.backend.write(src)
    }

    /// Read into `dst` until it is full or the backend is exhausted.
    ///
    /// Returns the number of bytes read. A short count is not an error.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < dst.len() {
            let n = self.backend.read(&mut dst[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Fill `dst` completely, or fail with [`Error::EndOfData`](crate::Error::EndOfData).
    #[inline]
    pub fn read_exact_into(&mut self, dst: &mut [u8]) -> Result<()> {
        let got = self.read_into(dst)?;
        if got < dst.len() {
            return Err(end_of_data(dst.len(), got));
        }
        Ok(())
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        self.read_exact_into(&mut out)?;
        Ok(out)
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n.min(self.limits.max_preallocation));
        let mut chunk = [0u8; CHUNK];
        while out.len() < n {
            let want = (n - out.len()).min(CHUNK);
            let got = self.backend.read(&mut chunk[..want])?;
            if got == 0 {
                return Err(end_of_data(n, out.len()));
            }
            out.extend_from_slice(&chunk[..got]);
        }
        Ok(out)
    }

    /// Read everything up to the end of the backend.
    pub fn read_remainder(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; CHUNK];
        loop {
            let got = self.backend.read(&mut chunk)?;
            if got == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..got]);
        }
    }

    /// Write a varint byte count followed by `src`.
    pub fn write_limited_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.write_uvarint(src.len() as u64)?;
        self.write_bytes(src)
    }

    /// Read a varint byte count followed by that many bytes.
    pub fn read_limited_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length(1)?;
        self.read_bytes(len)
    }

    /// Read a varint length prefix for `len` items of at least `min_item_size`
    /// bytes each.
    ///
    /// Fails with [`Error::LengthExceedsInput`](crate::Error::LengthExceedsInput)
    /// when the backend knows it cannot hold that many bytes.
    pub fn read_length(&mut self, min_item_size: usize) -> Result<usize> {
        let len = self.read_uvarint()?;
        if let Some(available) = self.available() {
            let needed = len.saturating_mul(min_item_size as u64);
            if needed > available {
                return Err(length_exceeds_input(len, available));
            }
        }
        usize::try_from(len).map_err(|_| length_exceeds_input(len, usize::MAX as u64))
    }

    /// Read `dst.len()` bytes at `pos` without moving the read cursor.
    pub fn read_at(&mut self, pos: u64, dst: &mut [u8]) -> Result<usize> {
        let saved = self.read_pos()?;
        self.seek_read(pos)?;
        let read = self.read_into(dst);
        self.seek_read(saved)?;
        read
    }

    /// Write `src` at `pos` without moving the write cursor.
    ///
    /// If the write extends the store, the cursor still returns to where it was.
    pub fn write_at(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        let saved = self.write_pos()?;
        self.seek_write(pos)?;
        let written = self.write_bytes(src);
        self.seek_write(saved)?;
        written
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// One byte, `0` or `1`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Any non-zero byte reads as `true`.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }
}

impl Read for Buffer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.backend.read(buf).map_err(into_io)
    }
}

impl Write for Buffer<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_bytes(buf).map_err(into_io)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.backend.flush().map_err(into_io)
    }
}

fn into_io(error: crate::Error) -> std::io::Error {
    match error {
        crate::Error::Io(e) => e,
        other => std::io::Error::other(other),
    }
}
