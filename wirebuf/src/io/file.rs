use {
    super::Backend,
    crate::error::{closed, read_only, seek_out_of_bounds, Result},
    std::{
        fs::{File, OpenOptions},
        io::{Read, Seek, SeekFrom, Write},
        path::{Path, PathBuf},
    },
    tracing::debug,
};

/// Store backed by a file handle.
///
/// Both cursors are tracked here, and the handle is repositioned before every
/// read and write, so the read and write cursors never interfere.
#[derive(Debug)]
pub struct FileBackend {
    file: Option<File>,
    path: PathBuf,
    read_only: bool,
    rpos: u64,
    wpos: u64,
}

impl FileBackend {
    /// Open `path` for reading and writing, creating it when missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        debug!(path = %path.display(), "opened file backend");
        Ok(Self::from_parts(file, path, false))
    }

    /// Open an existing `path` without write access.
    ///
    /// Every mutating operation on the returned backend fails with
    /// [`Error::ReadOnly`](crate::Error::ReadOnly).
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened read-only file backend");
        Ok(Self::from_parts(file, path, true))
    }

    fn from_parts(file: File, path: &Path, read_only: bool) -> Self {
        Self {
            file: Some(file),
            path: path.to_path_buf(),
            read_only,
            rpos: 0,
            wpos: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    fn handle(&self) -> Result<&File> {
        self.file.as_ref().ok_or_else(|| closed(self.name()))
    }

    #[inline]
    fn handle_mut(&mut self) -> Result<&mut File> {
        let name = self.name();
        self.file.as_mut().ok_or_else(|| closed(name))
    }

    #[inline]
    fn writable(&mut self) -> Result<&mut File> {
        if self.read_only {
            return Err(read_only(self.name()));
        }
        self.handle_mut()
    }
}

impl Backend for FileBackend {
    #[inline]
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let pos = self.rpos;
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(pos))?;
        let n = file.read(dst)?;
        self.rpos += n as u64;
        Ok(n)
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        let pos = self.wpos;
        let file = self.writable()?;
        file.seek(SeekFrom::Start(pos))?;
        file.write_all(src)?;
        self.wpos += src.len() as u64;
        Ok(())
    }

    fn seek_read(&mut self, pos: u64) -> Result<()> {
        let size = self.size()?;
        if pos > size {
            return Err(seek_out_of_bounds(pos, size));
        }
        self.rpos = pos;
        Ok(())
    }

    fn seek_write(&mut self, pos: u64) -> Result<()> {
        if self.read_only {
            return Err(read_only(self.name()));
        }
        let size = self.size()?;
        if pos > size {
            return Err(seek_out_of_bounds(pos, size));
        }
        self.wpos = pos;
        Ok(())
    }

    #[inline]
    fn read_pos(&self) -> Result<u64> {
        Ok(self.rpos)
    }

    #[inline]
    fn write_pos(&self) -> Result<u64> {
        Ok(self.wpos)
    }

    fn size(&self) -> Result<u64> {
        Ok(self.handle()?.metadata()?.len())
    }

    fn contents(&mut self) -> Result<Vec<u8>> {
        // The logical cursors live in `self`, so only the OS handle moves.
        let file = self.handle_mut()?;
        file.seek(SeekFrom::Start(0))?;
        let mut out = Vec::new();
        file.read_to_end(&mut out)?;
        Ok(out)
    }

    fn erase(&mut self) -> Result<()> {
        let file = self.writable()?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        self.rpos = 0;
        self.wpos = 0;
        debug!(path = %self.path.display(), "erased file backend");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.read_only {
            return Ok(());
        }
        self.handle_mut()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            if !self.read_only {
                file.sync_all()?;
            }
            debug!(path = %self.path.display(), "closed file backend");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::Error};

    #[test]
    fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.bin");
        let mut backend = FileBackend::open(&path).unwrap();
        backend.write(b"abc").unwrap();
        assert!(path.exists());
        assert_eq!(backend.size().unwrap(), 3);
    }

    #[test]
    fn read_only_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileBackend::open_read_only(dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn read_only_rejects_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.bin");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let mut backend = FileBackend::open_read_only(&path).unwrap();
        assert!(matches!(backend.write(&[4]), Err(Error::ReadOnly("file"))));
        assert!(matches!(backend.erase(), Err(Error::ReadOnly("file"))));
        assert!(matches!(backend.seek_write(0), Err(Error::ReadOnly("file"))));

        let mut out = [0; 3];
        assert_eq!(backend.read(&mut out).unwrap(), 3);
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(std::fs::read(&path).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn contents_preserves_both_cursors() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("cursors.bin")).unwrap();
        backend.write(b"0123456789").unwrap();
        backend.seek_write(4).unwrap();
        backend.seek_read(7).unwrap();

        assert_eq!(backend.contents().unwrap(), b"0123456789");
        assert_eq!(backend.read_pos().unwrap(), 7);
        assert_eq!(backend.write_pos().unwrap(), 4);

        let mut out = [0; 3];
        assert_eq!(backend.read(&mut out).unwrap(), 3);
        assert_eq!(&out, b"789");
        backend.write(b"xy").unwrap();
        assert_eq!(backend.contents().unwrap(), b"0123xy6789");
    }

    #[test]
    fn closed_backend_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("closed.bin")).unwrap();
        backend.close().unwrap();
        assert!(matches!(backend.write(&[1]), Err(Error::Closed("file"))));
        // Closing twice is harmless.
        backend.close().unwrap();
    }
}
