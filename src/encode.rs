//! Encoding of trace events into link-layer frames.
//!
//! Every event that has a capture representation maps to an
//! [`EncodedFrame`]: a SocketCAN frame for the CAN family, raw bytes for
//! Ethernet. The functions here are pure; timestamps and interfaces are
//! attached by the dispatch loop.

use crate::asc::{
    CanBusError, CanErrorFrame, CanFdErrorFrame, CanFdMessage, CanMessage, CanOverloadFrame,
    CanRemoteFrame, EthernetPacket, EthernetRxError, Event,
};
use crate::can::{CanFrame, dlc_to_len};
use crate::capture::{LinkType, PacketDirection};

/// Bit of `CanFdMessage::flags` marking a remote request.
const FD_MESSAGE_RTR_BIT: u32 = 1 << 7;
/// Bit of `CanFdErrorFrame::flags1` marking a remote request.
const FD_ERROR_RTR_BIT: u16 = 1 << 7;
/// Data length written for error frames.
const ERROR_FRAME_LEN: u8 = 8;

/// Link-layer payload of an encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameData {
    Can(CanFrame),
    Ethernet(Vec<u8>),
}

/// A frame ready to be written, minus its timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub link_type: LinkType,
    pub direction: PacketDirection,
    pub data: FrameData,
}

impl EncodedFrame {
    fn can(frame: CanFrame, direction: PacketDirection) -> Self {
        Self {
            link_type: LinkType::CanSocketcan,
            direction,
            data: FrameData::Can(frame),
        }
    }

    fn ethernet(data: Vec<u8>, direction: PacketDirection) -> Self {
        Self {
            link_type: LinkType::Ethernet,
            direction,
            data: FrameData::Ethernet(data),
        }
    }

    /// Bytes to write as the packet payload.
    ///
    /// For CAN this is the header plus `data_length` payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            FrameData::Can(frame) => frame.frame_bytes(),
            FrameData::Ethernet(data) => data,
        }
    }

    /// The SocketCAN frame, if this is a CAN packet.
    pub fn can_frame(&self) -> Option<&CanFrame> {
        match &self.data {
            FrameData::Can(frame) => Some(frame),
            FrameData::Ethernet(_) => None,
        }
    }
}

/// Encode an event, or `None` for events with no capture representation
/// (file date, unsupported lines).
pub fn encode(event: &Event) -> Option<EncodedFrame> {
    let frame = match event {
        Event::CanMessage(msg) => can_message(msg, false),
        Event::CanExtendedMessage(msg) => can_message(msg, true),
        Event::CanRemoteFrame(frame) => can_remote_frame(frame),
        Event::CanErrorFrame(frame) => can_error_frame(frame),
        Event::CanBusError(err) => can_bus_error(err),
        Event::CanOverloadFrame(frame) => can_overload_frame(frame),
        Event::CanFdMessage(msg) => canfd_message(msg, false),
        Event::CanFdExtendedMessage(msg) => canfd_message(msg, true),
        Event::CanFdErrorFrame(frame) => canfd_error_frame(frame),
        Event::EthernetPacket(pkt) => ethernet_packet(pkt),
        Event::EthernetRxError(err) => ethernet_rx_error(err),
        Event::FileDate(_) | Event::Unsupported(_) => return None,
    };
    Some(frame)
}

/// Classic data frame; the data length is the logged DLC.
pub fn can_message(msg: &CanMessage, extended: bool) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_id(msg.id);
    frame.set_extended(extended);
    frame.set_data_length(msg.dlc);
    frame.set_data(&msg.data);
    EncodedFrame::can(frame, msg.dir.into())
}

pub fn can_remote_frame(rtr: &CanRemoteFrame) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_id(rtr.id);
    frame.set_extended(rtr.extended);
    frame.set_remote(true);
    EncodedFrame::can(frame, rtr.dir.into())
}

pub fn can_error_frame(err: &CanErrorFrame) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_id(err.id);
    frame.set_error(true);
    frame.set_data_length(ERROR_FRAME_LEN);
    EncodedFrame::can(frame, PacketDirection::Inbound)
}

/// Bus status change, written as an error frame. Counted receive errors
/// make it inbound, otherwise it is attributed to the transmitter.
pub fn can_bus_error(err: &CanBusError) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_error(true);
    frame.set_data_length(ERROR_FRAME_LEN);
    let direction = if err.rx_errors != 0 {
        PacketDirection::Inbound
    } else {
        PacketDirection::Outbound
    };
    EncodedFrame::can(frame, direction)
}

pub fn can_overload_frame(_overload: &CanOverloadFrame) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_error(true);
    EncodedFrame::can(frame, PacketDirection::Inbound)
}

/// CAN FD data frame; the data length comes from the DLC table.
pub fn canfd_message(msg: &CanFdMessage, extended: bool) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_id(msg.id);
    frame.set_extended(extended);
    frame.set_remote(msg.flags & FD_MESSAGE_RTR_BIT != 0);
    frame.set_brs(msg.brs);
    frame.set_esi(msg.esi);
    frame.set_data_length(dlc_to_len(msg.dlc) as u8);
    frame.set_data(&msg.data);
    EncodedFrame::can(frame, msg.dir.into())
}

pub fn canfd_error_frame(err: &CanFdErrorFrame) -> EncodedFrame {
    let mut frame = CanFrame::new();
    frame.set_id(err.id);
    frame.set_remote(err.flags1 & FD_ERROR_RTR_BIT != 0);
    frame.set_error(true);
    frame.set_brs(err.brs);
    frame.set_esi(err.esi);
    frame.set_data_length(ERROR_FRAME_LEN);
    EncodedFrame::can(frame, err.dir.into())
}

pub fn ethernet_packet(pkt: &EthernetPacket) -> EncodedFrame {
    EncodedFrame::ethernet(pkt.data.clone(), pkt.dir.into())
}

/// Received frame with a bad checksum; the logged FCS is appended
/// little-endian after the frame bytes.
pub fn ethernet_rx_error(err: &EthernetRxError) -> EncodedFrame {
    let mut data = Vec::with_capacity(err.data.len() + 4);
    data.extend_from_slice(&err.data);
    data.extend_from_slice(&err.frame_checksum.to_le_bytes());
    EncodedFrame::ethernet(data, PacketDirection::Inbound)
}
