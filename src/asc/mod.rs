//! Vector ASC trace decoding.
//!
//! [`AscReader`] turns the text of an ASC file into a stream of typed
//! [`Event`]s. Each event carries its trace-relative time in seconds; the
//! `date` header is delivered as an [`Event::FileDate`] so the consumer can
//! anchor later events to calendar time.
//!
//! ```
//! use asc2pcapng::asc::{AscReader, Event};
//!
//! let trace = "base hex  timestamps absolute\n0.5 1 123 Rx d 2 AA BB\n";
//! let mut reader = AscReader::new(trace.as_bytes());
//!
//! match reader.read_event()? {
//!     Some(Event::CanMessage(msg)) => {
//!         assert_eq!(msg.id, 0x123);
//!         assert_eq!(msg.data, [0xAA, 0xBB]);
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(reader.read_event()?.is_none());
//! # Ok::<(), asc2pcapng::Error>(())
//! ```

mod date;
mod event;
mod line;
mod reader;

pub use event::{
    CanBusError, CanErrorFrame, CanFdErrorFrame, CanFdMessage, CanMessage, CanOverloadFrame,
    CanRemoteFrame, Direction, EthernetPacket, EthernetRxError, Event, FileDate, UnsupportedEvent,
};
pub use reader::AscReader;
