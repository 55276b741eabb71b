//! pcapng capture output.
//!
//! [`PcapngWriter`] serializes packets as a single pcapng section:
//!
//! ```text
//! Section Header Block
//! ├── Interface Description Block   (one per link type and channel)
//! ├── Enhanced Packet Block         (one per packet)
//! └── ...
//! ```
//!
//! Interface description blocks are written just before the first packet
//! that needs them, so a capture only declares interfaces that carry
//! traffic. Every interface uses nanosecond timestamps.
//!
//! # Example
//!
//! ```
//! use asc2pcapng::capture::{InterfaceDescriptor, LinkType, PacketDirection, PacketHeader};
//! use asc2pcapng::pcapng::{PcapngWriter, VecWriter};
//! use asc2pcapng::timestamp::CaptureTimestamp;
//!
//! let mut writer = PcapngWriter::from_writer(VecWriter::new())?;
//! let iface = InterfaceDescriptor::for_channel(LinkType::Ethernet, 1);
//! let header = PacketHeader {
//!     timestamp: CaptureTimestamp::from_nanos(1_500_000_000),
//!     captured_length: 4,
//!     original_length: 4,
//!     direction: PacketDirection::Outbound,
//! };
//! writer.write_packet(&iface, &header, &[0xDE, 0xAD, 0xBE, 0xEF])?;
//!
//! let bytes = writer.finish()?.into_inner();
//! assert_eq!(&bytes[..4], &[0x0A, 0x0D, 0x0D, 0x0A]);
//! # Ok::<(), asc2pcapng::Error>(())
//! ```

pub mod block;
mod io;
mod writer;

pub use io::{CaptureWrite, DEFAULT_BUFFER_CAPACITY, FileWriter, VecWriter};
pub use writer::{PcapngConfig, PcapngWriter};
