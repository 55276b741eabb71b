//! CAN bus frame encoding for `LINKTYPE_CAN_SOCKETCAN` captures.
//!
//! This module provides the byte-exact SocketCAN frame layout used for every
//! CAN and CAN FD packet written to a capture. It integrates with
//! [`embedded-can`](https://crates.io/crates/embedded-can) (with the `can`
//! feature) for hardware-agnostic CAN frames.
//!
//! # Example
//!
//! ```
//! use asc2pcapng::can::CanFrame;
//!
//! let mut frame = CanFrame::new();
//! frame.set_id(0x18DA_F110);
//! frame.set_extended(true);
//! frame.set_data_length(2);
//! frame.set_data(&[0x02, 0x10]);
//!
//! assert_eq!(frame.size(), 10);
//! assert_eq!(&frame.frame_bytes()[..5], &[0x98, 0xDA, 0xF1, 0x10, 0x02]);
//! ```

pub mod fd;
mod frame;

pub use fd::{FdFlags, MAX_CLASSIC_DATA_LEN, MAX_FD_DATA_LEN, dlc_to_len, len_to_dlc};
pub use frame::{CAN_FRAME_SIZE, CAN_HEADER_SIZE, CAN_ID_MASK, CanFrame};
