//! Byte sinks for the pcapng writer.
//!
//! [`CaptureWrite`] abstracts where serialized blocks go, so the same writer
//! produces files on disk ([`FileWriter`]) or captures in memory
//! ([`VecWriter`]).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::Result;

/// Default `BufWriter` capacity for file output.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1_048_576;

/// Append-only byte sink used by [`PcapngWriter`](super::PcapngWriter).
pub trait CaptureWrite {
    /// Write all bytes to the destination.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Number of bytes written so far.
    fn position(&self) -> u64;

    /// Flush any buffered data.
    fn flush(&mut self) -> Result<()>;
}

/// A writer that collects the capture in memory.
#[derive(Debug, Default)]
pub struct VecWriter {
    buffer: Vec<u8>,
}

impl VecWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Consume the writer and return the underlying buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl CaptureWrite for VecWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Buffered file output.
pub struct FileWriter {
    inner: BufWriter<File>,
    position: u64,
}

impl FileWriter {
    /// Create (or truncate) the file at `path` with a 1 MB buffer.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_capacity(path, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create the file with the given `BufWriter` capacity.
    pub fn with_capacity<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self> {
        let file = File::create(path)?;
        let inner = BufWriter::with_capacity(capacity, file);
        Ok(Self { inner, position: 0 })
    }

    /// Flush and return the underlying file.
    pub fn into_inner(self) -> Result<File> {
        self.inner.into_inner().map_err(|e| e.into_error().into())
    }
}

impl CaptureWrite for FileWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
