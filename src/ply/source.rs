//! Input sources a [`PlyReader`](crate::ply::reader::PlyReader) can read from.
//!
//! The reader needs exactly two capabilities: reading one header line and
//! reading everything that remains after the header. Two providers exist:
//!
//! - [`FileSource`]: opens a path and owns the file until dropped
//! - [`BorrowedSource`]: wraps a caller's buffered handle without taking it

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use log::debug;

use super::types::error::{PlyError, Result};

/// Byte-oriented input consumed by the header parser and payload decoder.
pub trait ByteSource {
    /// Appends the next line, including its `\n` terminator if present, to
    /// `buf`. Returns the number of bytes read; `0` means end of input.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize>;

    /// Appends all remaining bytes to `buf`, returning how many were read.
    fn read_remaining(&mut self, buf: &mut Vec<u8>) -> Result<usize>;
}

/// A file opened from a path, owned by the source and closed on drop.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    inner: BufReader<File>,
}

impl FileSource {
    /// Opens `path` for binary reading.
    ///
    /// # Errors
    /// - [`PlyError::InvalidArgument`] if the path exists but is not a
    ///   regular file
    /// - [`PlyError::Io`] if the file cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() && !path.is_file() {
            return Err(PlyError::InvalidArgument(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let file = File::open(path)?;
        debug!("Opened {} for reading", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            inner: BufReader::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        Ok(self.inner.read_until(b'\n', buf)?)
    }

    fn read_remaining(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        Ok(self.inner.read_to_end(buf)?)
    }
}

/// A caller-owned handle. The caller keeps responsibility for closing it;
/// after reading, the handle is positioned past everything consumed.
#[derive(Debug)]
pub struct BorrowedSource<'a, R: BufRead + ?Sized> {
    inner: &'a mut R,
}

impl<'a, R: BufRead + ?Sized> BorrowedSource<'a, R> {
    pub fn new(inner: &'a mut R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead + ?Sized> ByteSource for BorrowedSource<'_, R> {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        Ok(self.inner.read_until(b'\n', buf)?)
    }

    fn read_remaining(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        Ok(self.inner.read_to_end(buf)?)
    }
}
