//! Typed event records decoded from an ASC trace.

use chrono::NaiveDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a frame as seen by the logging interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Received by the logger.
    Rx,
    /// Transmitted by the logger.
    Tx,
}

impl Direction {
    /// Parse an ASC direction token (`Rx`, `Tx`, any case).
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("rx") {
            Some(Direction::Rx)
        } else if token.eq_ignore_ascii_case("tx") || token.eq_ignore_ascii_case("txrq") {
            Some(Direction::Tx)
        } else {
            None
        }
    }
}

/// A classic CAN data frame (`d` lines). Used for both standard and extended ids.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanMessage {
    pub time: f64,
    pub channel: u16,
    pub id: u32,
    pub dir: Direction,
    pub dlc: u8,
    pub data: Vec<u8>,
}

/// A classic CAN remote transmission request (`r` lines).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanRemoteFrame {
    pub time: f64,
    pub channel: u16,
    pub id: u32,
    pub extended: bool,
    pub dir: Direction,
    /// Requested DLC, as logged.
    pub dlc: u8,
}

/// A classic CAN error frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanErrorFrame {
    pub time: f64,
    pub channel: u16,
    pub id: u32,
    /// Length field as logged. Not used for encoding.
    pub dlc: u8,
}

/// A CAN controller status change with its error counters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanBusError {
    pub time: f64,
    pub channel: u16,
    /// Controller status text, e.g. `chip status error active`.
    pub status: String,
    pub tx_errors: u32,
    pub rx_errors: u32,
}

/// A CAN overload frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanOverloadFrame {
    pub time: f64,
    pub channel: u16,
}

/// A CAN FD data frame. Used for both standard and extended ids.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanFdMessage {
    pub time: f64,
    pub channel: u16,
    pub id: u32,
    pub dir: Direction,
    pub brs: bool,
    pub esi: bool,
    /// Raw CAN FD DLC (0-15).
    pub dlc: u8,
    pub data: Vec<u8>,
    /// Extended message flags. Bit 7 marks a remote request.
    pub flags: u32,
}

/// A CAN FD error frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanFdErrorFrame {
    pub time: f64,
    pub channel: u16,
    /// Identifier, 0 when the trace does not name one.
    pub id: u32,
    pub dir: Direction,
    pub brs: bool,
    pub esi: bool,
    pub dlc: u8,
    pub data: Vec<u8>,
    /// First error flag word. Bit 7 marks a remote request.
    pub flags1: u16,
    pub flags2: u16,
}

/// A complete Ethernet frame (destination MAC onwards, no FCS).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EthernetPacket {
    pub time: f64,
    pub channel: u16,
    pub dir: Direction,
    pub data: Vec<u8>,
}

/// An Ethernet frame received with an error, with its frame check sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EthernetRxError {
    pub time: f64,
    pub channel: u16,
    pub data: Vec<u8>,
    pub frame_checksum: u32,
}

/// The calendar time at which the measurement started.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileDate {
    pub date: NaiveDateTime,
}

/// A well-formed trace line with no capture mapping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnsupportedEvent {
    pub time: f64,
    /// The keyword that identifies the line, e.g. `LIN` or `Statistic:`.
    pub keyword: String,
}

/// One decoded trace event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    CanMessage(CanMessage),
    CanExtendedMessage(CanMessage),
    CanRemoteFrame(CanRemoteFrame),
    CanErrorFrame(CanErrorFrame),
    CanBusError(CanBusError),
    CanOverloadFrame(CanOverloadFrame),
    CanFdMessage(CanFdMessage),
    CanFdExtendedMessage(CanFdMessage),
    CanFdErrorFrame(CanFdErrorFrame),
    EthernetPacket(EthernetPacket),
    EthernetRxError(EthernetRxError),
    FileDate(FileDate),
    Unsupported(UnsupportedEvent),
}

impl Event {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::CanMessage(_) => "CanMessage",
            Event::CanExtendedMessage(_) => "CanExtendedMessage",
            Event::CanRemoteFrame(_) => "CanRemoteFrame",
            Event::CanErrorFrame(_) => "CanErrorFrame",
            Event::CanBusError(_) => "CanBusError",
            Event::CanOverloadFrame(_) => "CanOverloadFrame",
            Event::CanFdMessage(_) => "CanFdMessage",
            Event::CanFdExtendedMessage(_) => "CanFdExtendedMessage",
            Event::CanFdErrorFrame(_) => "CanFdErrorFrame",
            Event::EthernetPacket(_) => "EthernetPacket",
            Event::EthernetRxError(_) => "EthernetRxError",
            Event::FileDate(_) => "FileDate",
            Event::Unsupported(_) => "Unsupported",
        }
    }

    /// Channel number, 0 for events not bound to a channel.
    pub fn channel(&self) -> u16 {
        match self {
            Event::CanMessage(e) | Event::CanExtendedMessage(e) => e.channel,
            Event::CanRemoteFrame(e) => e.channel,
            Event::CanErrorFrame(e) => e.channel,
            Event::CanBusError(e) => e.channel,
            Event::CanOverloadFrame(e) => e.channel,
            Event::CanFdMessage(e) | Event::CanFdExtendedMessage(e) => e.channel,
            Event::CanFdErrorFrame(e) => e.channel,
            Event::EthernetPacket(e) => e.channel,
            Event::EthernetRxError(e) => e.channel,
            Event::FileDate(_) | Event::Unsupported(_) => 0,
        }
    }

    /// Trace-relative time in seconds, 0 for the file date.
    pub fn time(&self) -> f64 {
        match self {
            Event::CanMessage(e) | Event::CanExtendedMessage(e) => e.time,
            Event::CanRemoteFrame(e) => e.time,
            Event::CanErrorFrame(e) => e.time,
            Event::CanBusError(e) => e.time,
            Event::CanOverloadFrame(e) => e.time,
            Event::CanFdMessage(e) | Event::CanFdExtendedMessage(e) => e.time,
            Event::CanFdErrorFrame(e) => e.time,
            Event::EthernetPacket(e) => e.time,
            Event::EthernetRxError(e) => e.time,
            Event::Unsupported(e) => e.time,
            Event::FileDate(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::from_token("Rx"), Some(Direction::Rx));
        assert_eq!(Direction::from_token("TX"), Some(Direction::Tx));
        assert_eq!(Direction::from_token("TxRq"), Some(Direction::Tx));
        assert_eq!(Direction::from_token("d"), None);
    }

    #[test]
    fn accessors_cover_shared_variants() {
        let msg = CanMessage {
            time: 1.25,
            channel: 3,
            id: 0x100,
            dir: Direction::Rx,
            dlc: 0,
            data: Vec::new(),
        };
        let event = Event::CanExtendedMessage(msg);
        assert_eq!(event.kind(), "CanExtendedMessage");
        assert_eq!(event.channel(), 3);
        assert_eq!(event.time(), 1.25);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn events_serialize_as_tagged_variants() {
        let event = Event::CanOverloadFrame(CanOverloadFrame {
            time: 0.5,
            channel: 2,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"CanOverloadFrame":{"time":0.5,"channel":2}}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
