//! Capture packet model shared by the encoders and the pcapng writer.
//!
//! A packet is described by the interface it was seen on
//! ([`InterfaceDescriptor`]), its [`PacketHeader`] and the raw link-layer
//! bytes. Anything that can store packets implements [`PacketSink`].

use crate::Result;
use crate::timestamp::CaptureTimestamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Link-layer header types used by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum LinkType {
    /// `LINKTYPE_ETHERNET`: IEEE 802.3 frames without FCS.
    Ethernet = 1,
    /// `LINKTYPE_CAN_SOCKETCAN`: 72-byte SocketCAN frame layout.
    CanSocketcan = 227,
}

impl LinkType {
    /// Numeric value written to interface description blocks.
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// Packet direction relative to the capturing interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PacketDirection {
    Inbound,
    Outbound,
}

impl PacketDirection {
    /// Value of the direction bits (0-1) in `epb_flags`.
    pub const fn epb_flags(self) -> u32 {
        match self {
            PacketDirection::Inbound => 1,
            PacketDirection::Outbound => 2,
        }
    }
}

impl From<crate::asc::Direction> for PacketDirection {
    fn from(dir: crate::asc::Direction) -> Self {
        match dir {
            crate::asc::Direction::Rx => PacketDirection::Inbound,
            crate::asc::Direction::Tx => PacketDirection::Outbound,
        }
    }
}

/// Timestamp resolution exponent for nanoseconds (`if_tsresol` = 10^-9).
pub const TSRESOL_NANOS: u8 = 9;

/// The interface a packet was captured on.
///
/// Every interface is declared with [`TSRESOL_NANOS`]; packet timestamps
/// are always written in nanoseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterfaceDescriptor {
    pub link_type: LinkType,
    /// Interface name, the decimal channel number.
    pub name: String,
}

impl InterfaceDescriptor {
    /// Descriptor for a trace channel.
    pub fn for_channel(link_type: LinkType, channel: u16) -> Self {
        Self {
            link_type,
            name: channel.to_string(),
        }
    }
}

/// Per-packet metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PacketHeader {
    pub timestamp: CaptureTimestamp,
    pub captured_length: u32,
    pub original_length: u32,
    pub direction: PacketDirection,
}

/// A fully owned packet, as collected by the in-memory sink.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapturePacket {
    pub interface: InterfaceDescriptor,
    pub header: PacketHeader,
    pub data: Vec<u8>,
}

/// Destination for capture packets.
///
/// Implemented by [`PcapngWriter`](crate::PcapngWriter) for files and by
/// `Vec<CapturePacket>` for in-memory collection.
pub trait PacketSink {
    /// Append one packet.
    fn append(
        &mut self,
        interface: &InterfaceDescriptor,
        header: &PacketHeader,
        data: &[u8],
    ) -> Result<()>;
}

impl PacketSink for Vec<CapturePacket> {
    fn append(
        &mut self,
        interface: &InterfaceDescriptor,
        header: &PacketHeader,
        data: &[u8],
    ) -> Result<()> {
        self.push(CapturePacket {
            interface: interface.clone(),
            header: *header,
            data: data.to_vec(),
        });
        Ok(())
    }
}

impl<S: PacketSink + ?Sized> PacketSink for &mut S {
    fn append(
        &mut self,
        interface: &InterfaceDescriptor,
        header: &PacketHeader,
        data: &[u8],
    ) -> Result<()> {
        (**self).append(interface, header, data)
    }
}
