use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::trace;

use super::event::Event;
use super::line::{LineContext, parse_line};
use crate::{Error, Result};

/// Streaming decoder for ASC trace files.
///
/// Events are produced in file order. Lines that carry no event (headers,
/// comments, blank lines) are consumed silently; the `base` header updates
/// how later lines are read.
///
/// Lines are decoded as Windows-1252, the code page CANoe writes on
/// Windows; plain ASCII traces read the same either way.
///
/// After the first error the reader is exhausted: [`AscReader::has_more`]
/// returns `false` and iteration ends.
pub struct AscReader<R> {
    reader: R,
    ctx: LineContext,
    line: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl AscReader<BufReader<File>> {
    /// Open an ASC file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> AscReader<R> {
    /// Wrap any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            ctx: LineContext::default(),
            line: Vec::new(),
            line_number: 0,
            done: false,
        }
    }

    /// `false` once the end of input or an error has been reached.
    pub fn has_more(&self) -> bool {
        !self.done
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Decode the next event, or `Ok(None)` at end of input.
    pub fn read_event(&mut self) -> Result<Option<Event>> {
        while !self.done {
            self.line.clear();
            let read = match self.reader.read_until(b'\n', &mut self.line) {
                Ok(n) => n,
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            };
            if read == 0 {
                self.done = true;
                break;
            }
            self.line_number += 1;

            let (text, _, _) = WINDOWS_1252.decode(&self.line);
            match parse_line(&text, &mut self.ctx) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => {
                    trace!(line = self.line_number, "no event on line");
                }
                Err(reason) => {
                    self.done = true;
                    return Err(Error::DecodeError {
                        line: self.line_number,
                        reason,
                    });
                }
            }
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for AscReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

impl<R: BufRead> core::iter::FusedIterator for AscReader<R> {}
