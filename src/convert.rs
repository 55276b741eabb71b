//! The dispatch loop: trace events in, capture packets out.
//!
//! [`Converter`] pulls events one at a time, keeps the current file-date
//! offset, encodes every event that has a capture representation and hands
//! the result to a [`PacketSink`].
//!
//! ```
//! use asc2pcapng::{AscReader, Converter, capture::CapturePacket};
//!
//! let trace = "\
//! base hex  timestamps absolute
//! 0.5 1 123 Rx d 2 AA BB
//! 0.6 2 ErrorFrame
//! ";
//! let mut packets: Vec<CapturePacket> = Vec::new();
//! let stats = Converter::new().run(AscReader::new(trace.as_bytes()), &mut packets)?;
//!
//! assert_eq!(stats.packets_written, 2);
//! assert_eq!(packets[1].interface.name, "2");
//! # Ok::<(), asc2pcapng::Error>(())
//! ```

use tracing::{debug, error, trace};

use crate::asc::Event;
use crate::capture::{InterfaceDescriptor, LinkType, PacketDirection, PacketHeader, PacketSink};
use crate::encode::encode;
use crate::timestamp::{date_offset, resolve};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Running,
    /// End of input or a decode fault was reached; no further events are
    /// processed.
    Stopped,
}

/// Counters collected during a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConversionStats {
    /// Events pulled from the reader.
    pub events_read: usize,
    pub packets_written: usize,
    pub can_frames: usize,
    pub ethernet_frames: usize,
    /// CAN packets with the error flag set.
    pub error_frames: usize,
    pub rx_frames: usize,
    pub tx_frames: usize,
    /// Events with no capture representation.
    pub skipped: usize,
    /// `date` headers applied.
    pub file_dates: usize,
    /// Line of the decode fault that ended the conversion, if any.
    pub fault_line: Option<usize>,
}

/// Event-to-packet dispatcher.
#[derive(Debug, Clone)]
pub struct Converter {
    file_date_offset: i64,
    state: DispatchState,
    stats: ConversionStats,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn new() -> Self {
        Self {
            file_date_offset: 0,
            state: DispatchState::Running,
            stats: ConversionStats::default(),
        }
    }

    /// Seconds added to every event time; set by the latest `date` header.
    pub fn file_date_offset(&self) -> i64 {
        self.file_date_offset
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Handle a single event.
    ///
    /// Only a failure of the sink is an error.
    pub fn process<S: PacketSink>(&mut self, event: &Event, sink: &mut S) -> Result<()> {
        self.stats.events_read += 1;

        let Some(frame) = encode(event) else {
            match event {
                Event::FileDate(date) => {
                    self.file_date_offset = date_offset(&date.date);
                    self.stats.file_dates += 1;
                    debug!(
                        date = %date.date,
                        offset = self.file_date_offset,
                        "file date updated"
                    );
                }
                Event::Unsupported(unsupported) => {
                    self.stats.skipped += 1;
                    trace!(
                        keyword = %unsupported.keyword,
                        time = unsupported.time,
                        "skipping unsupported event"
                    );
                }
                other => {
                    self.stats.skipped += 1;
                    trace!(kind = other.kind(), "event has no capture mapping");
                }
            }
            return Ok(());
        };

        let data = frame.as_bytes();
        let length = data.len() as u32;
        let interface = InterfaceDescriptor::for_channel(frame.link_type, event.channel());
        let header = PacketHeader {
            timestamp: resolve(event.time(), self.file_date_offset),
            captured_length: length,
            original_length: length,
            direction: frame.direction,
        };
        sink.append(&interface, &header, data)?;

        self.stats.packets_written += 1;
        match frame.link_type {
            LinkType::CanSocketcan => self.stats.can_frames += 1,
            LinkType::Ethernet => self.stats.ethernet_frames += 1,
        }
        if frame.can_frame().is_some_and(|f| f.is_error()) {
            self.stats.error_frames += 1;
        }
        match frame.direction {
            PacketDirection::Inbound => self.stats.rx_frames += 1,
            PacketDirection::Outbound => self.stats.tx_frames += 1,
        }
        Ok(())
    }

    /// Drain `events` into `sink` until the input ends or a decode fault
    /// stops the loop.
    ///
    /// A decode fault is logged and ends the conversion normally; I/O
    /// failures from the reader or the sink are returned.
    pub fn run<I, S>(&mut self, events: I, mut sink: S) -> Result<ConversionStats>
    where
        I: IntoIterator<Item = Result<Event>>,
        S: PacketSink,
    {
        let mut events = events.into_iter();
        while self.state == DispatchState::Running {
            match events.next() {
                None => self.state = DispatchState::Stopped,
                Some(Ok(event)) => self.process(&event, &mut sink)?,
                Some(Err(Error::DecodeError { line, reason })) => {
                    error!(line, %reason, "decode fault, stopping");
                    self.stats.fault_line = Some(line);
                    self.state = DispatchState::Stopped;
                }
                Some(Err(e)) => {
                    self.state = DispatchState::Stopped;
                    return Err(e);
                }
            }
        }
        Ok(self.stats.clone())
    }
}
