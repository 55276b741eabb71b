#![forbid(unsafe_code)]

//! # asc2pcapng
//!
//! Convert Vector ASC bus traces into pcapng captures that Wireshark and
//! other packet tools can open.
//!
//! ASC is the text trace format written by Vector CANalyzer and CANoe. Each
//! line records one bus event with a time relative to the start of the
//! measurement. This crate decodes those lines into typed events, encodes
//! the CAN family as SocketCAN frames and Ethernet as raw frames, and writes
//! them as Enhanced Packet Blocks with nanosecond timestamps.
//!
//! ## Supported Events
//!
//! - CAN data frames (standard and extended ids), remote frames, error and
//!   overload frames, controller status changes
//! - CAN FD data frames and error frames
//! - Ethernet frames and Ethernet receive errors
//! - The `date` header, which anchors later timestamps to calendar time
//!
//! Other trace lines (LIN, FlexRay, statistics, system variables, ...) are
//! decoded as [`asc::Event::Unsupported`] and skipped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use asc2pcapng::{AscReader, Converter, PcapngWriter, Result};
//!
//! fn main() -> Result<()> {
//!     let reader = AscReader::open("trace.asc")?;
//!     let mut writer = PcapngWriter::create("trace.pcapng")?;
//!
//!     let stats = Converter::new().run(reader, &mut writer)?;
//!     writer.finish()?;
//!
//!     println!("{} packets written", stats.packets_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`asc`] | ASC trace decoding with [`AscReader`] |
//! | [`can`] | SocketCAN frame layout and CAN FD helpers |
//! | [`encode`] | Event to link-layer frame encoding |
//! | [`timestamp`] | Absolute capture timestamps |
//! | [`capture`] | Packet model and the [`PacketSink`] trait |
//! | [`pcapng`] | pcapng output with [`PcapngWriter`] |
//! | [`convert`] | The dispatch loop, [`Converter`] |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.

pub mod asc;
pub mod can;
pub mod capture;
pub mod convert;
pub mod encode;
pub mod error;
pub mod pcapng;
pub mod timestamp;

// Re-export commonly used types at the crate root
pub use asc::{AscReader, Event};
pub use can::CanFrame;
pub use capture::{CapturePacket, PacketSink};
pub use convert::{ConversionStats, Converter, DispatchState};
pub use error::{Error, Result};
pub use pcapng::{PcapngConfig, PcapngWriter};
