//! Error types for trace conversion.
//!
//! This module defines the [`Error`] enum which represents all possible failures
//! that can occur when reading an ASC trace or writing a pcapng capture.
//!
//! # Example
//!
//! ```no_run
//! use asc2pcapng::{AscReader, Error, Result};
//!
//! fn open_trace(path: &str) -> Result<AscReader<std::io::BufReader<std::fs::File>>> {
//!     match AscReader::open(path) {
//!         Ok(reader) => Ok(reader),
//!         Err(Error::IOError(e)) => {
//!             eprintln!("File I/O error: {}", e);
//!             Err(Error::IOError(e))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use core::fmt;

/// Errors that can occur while converting a trace.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred while reading the trace or writing the capture.
    IOError(std::io::Error),

    /// A trace line matched a known record layout but one of its fields
    /// could not be decoded.
    ///
    /// The dispatch loop treats this as the end of the stream.
    DecodeError {
        /// 1-based line number in the trace
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A `date` header could not be parsed as a calendar time.
    InvalidDate(String),

    /// Failed to serialize a pcapng block (e.g. an option value too long).
    BlockSerializationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            Error::DecodeError { line, reason } => {
                write!(f, "Decode error at line {line}: {reason}")
            }
            Error::InvalidDate(s) => write!(f, "Invalid date header: {s:?}"),
            Error::BlockSerializationError(s) => write!(f, "Block serialization error: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

/// A specialized Result type for conversion operations.
pub type Result<T> = core::result::Result<T, Error>;
