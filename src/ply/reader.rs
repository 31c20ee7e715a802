use std::io::BufRead;
use std::path::Path;

use log::info;

use super::format::{decoder::DocumentDecoder, header};
use super::source::{BorrowedSource, ByteSource, FileSource};
use super::types::error::Result;
use super::types::models::{PlyData, PlyHeader};

/// The main reader for PLY files.
///
/// The header is parsed when the reader is created; the payload is decoded
/// by [`read_data`](Self::read_data), which consumes the reader. A reader
/// opened from a path owns its file and closes it when dropped, on success
/// and on every error path alike.
#[derive(Debug)]
pub struct PlyReader<S: ByteSource> {
    source: S,
    header: PlyHeader,
}

impl PlyReader<FileSource> {
    /// Open a PLY file from the given path and parse its header.
    ///
    /// # Arguments
    /// * `path` - File path to the .ply file
    /// * `verbose` - Report comments, the format line and every element
    ///   declaration through the `log` facade at `info` level
    ///
    /// # Errors
    /// Returns an error if:
    /// - The path is not a regular file
    /// - The file cannot be opened or read
    /// - The header is malformed
    pub fn open(path: impl AsRef<Path>, verbose: bool) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening PLY file: {}", path.display());
        Self::from_source(FileSource::open(path)?, verbose)
    }
}

impl<'a, R: BufRead + ?Sized> PlyReader<BorrowedSource<'a, R>> {
    /// Parse a header from an already-open handle.
    ///
    /// The handle stays owned by the caller. On success it is positioned at
    /// the first payload byte.
    pub fn from_reader(reader: &'a mut R, verbose: bool) -> Result<Self> {
        Self::from_source(BorrowedSource::new(reader), verbose)
    }
}

impl<S: ByteSource> PlyReader<S> {
    /// Parse a header from any [`ByteSource`].
    pub fn from_source(mut source: S, verbose: bool) -> Result<Self> {
        let header = header::parse(&mut source)?;
        if verbose {
            report_header(&header);
        }
        Ok(Self { source, header })
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    /// Read the remaining bytes and decode every element.
    ///
    /// # Errors
    /// - [`PlyError::UnsupportedMode`](crate::PlyError::UnsupportedMode)
    ///   for ASCII payloads, before any payload byte is read
    /// - [`PlyError::Truncated`](crate::PlyError::Truncated) if the payload
    ///   ends before every declared record is complete
    pub fn read_data(mut self) -> Result<PlyData> {
        let decoder = DocumentDecoder::new(&self.header)?;

        let mut payload = Vec::new();
        self.source.read_remaining(&mut payload)?;
        info!("Decoding {} payload bytes", payload.len());

        let data = decoder.decode(&payload)?;
        info!(
            "PLY data decoded: {} elements, {} of {} payload bytes used",
            data.len(),
            data.bytes_consumed(),
            payload.len()
        );
        Ok(data)
    }

    /// Split the reader into its parsed header and the decoded payload.
    pub fn into_parts(self) -> Result<(PlyHeader, PlyData)> {
        let header = self.header.clone();
        let data = self.read_data()?;
        Ok((header, data))
    }
}

/// Parse and decode a complete PLY document held in memory.
pub fn read_bytes(data: &[u8]) -> Result<(PlyHeader, PlyData)> {
    let (header, offset) = header::parse_bytes(data)?;
    let decoded = DocumentDecoder::new(&header)?.decode(&data[offset..])?;
    Ok((header, decoded))
}

fn report_header(header: &PlyHeader) {
    for comment in &header.comments {
        info!("comment:   {}", comment);
    }
    info!("format:    {} {}", header.format, header.version);
    for element in &header.elements {
        info!("{}", element);
    }
}
