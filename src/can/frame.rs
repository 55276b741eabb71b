//! SocketCAN frame buffer.
//!
//! [`CanFrame`] is the on-wire layout used by `LINKTYPE_CAN_SOCKETCAN` captures.
//! It covers both classic CAN and CAN FD frames with one fixed 72-byte buffer:
//!
//! ```text
//! byte 0      bit 7: EFF (extended id)  bit 6: RTR  bit 5: ERR  bits 4-0: id[28:24]
//! bytes 1-3   id[23:0], big-endian
//! byte 4      data length in bytes (0-64)
//! byte 5      bit 0: BRS  bit 1: ESI
//! bytes 6-7   reserved (zero)
//! bytes 8-71  payload
//! ```
//!
//! The flags share bytes with unrelated bits, so every setter is a masked
//! read-modify-write through `bit` and `with_bit`.

use super::fd::{FdFlags, MAX_FD_DATA_LEN};

/// Size of the SocketCAN header preceding the payload.
pub const CAN_HEADER_SIZE: usize = 8;

/// Total size of the frame buffer.
pub const CAN_FRAME_SIZE: usize = CAN_HEADER_SIZE + MAX_FD_DATA_LEN;

/// Mask of the 29 identifier bits in the first header word.
pub const CAN_ID_MASK: u32 = 0x1FFF_FFFF;

/// Byte holding the identifier flags (top 3 bits).
const ID_FLAGS_BYTE: usize = 0;
/// Mask of the identifier flag bits within [`ID_FLAGS_BYTE`].
const ID_FLAGS_MASK: u8 = 0xE0;
/// Byte 0, bit 7: extended frame format.
const EFF_BIT: u8 = 7;
/// Byte 0, bit 6: remote transmission request.
const RTR_BIT: u8 = 6;
/// Byte 0, bit 5: error frame.
const ERR_BIT: u8 = 5;

/// Byte holding the payload length.
const LEN_BYTE: usize = 4;
/// Byte holding the CAN FD flags.
const FD_FLAGS_BYTE: usize = 5;

#[inline]
const fn bit(byte: u8, pos: u8) -> bool {
    byte & (1 << pos) != 0
}

#[inline]
const fn with_bit(byte: u8, pos: u8, value: bool) -> u8 {
    (byte & !(1 << pos)) | ((value as u8) << pos)
}

/// A classic or FD CAN frame in SocketCAN layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanFrame {
    raw: [u8; CAN_FRAME_SIZE],
}

impl Default for CanFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl CanFrame {
    /// Create a zeroed frame: identifier 0, no flags, no payload.
    pub const fn new() -> Self {
        Self {
            raw: [0u8; CAN_FRAME_SIZE],
        }
    }

    /// Returns the 29-bit identifier, without flag bits.
    pub fn id(&self) -> u32 {
        let word = u32::from_be_bytes([self.raw[0], self.raw[1], self.raw[2], self.raw[3]]);
        word & CAN_ID_MASK
    }

    /// Set the identifier. Bits above 28 are discarded; the EFF/RTR/ERR
    /// flags already set on the frame are kept.
    pub fn set_id(&mut self, id: u32) {
        let flags = self.raw[ID_FLAGS_BYTE] & ID_FLAGS_MASK;
        let mut word = (id & CAN_ID_MASK).to_be_bytes();
        word[0] |= flags;
        self.raw[..4].copy_from_slice(&word);
    }

    fn id_flag(&self, pos: u8) -> bool {
        bit(self.raw[ID_FLAGS_BYTE], pos)
    }

    fn set_id_flag(&mut self, pos: u8, value: bool) {
        self.raw[ID_FLAGS_BYTE] = with_bit(self.raw[ID_FLAGS_BYTE], pos, value);
    }

    fn fd_flag(&self, pos: u8) -> bool {
        bit(self.raw[FD_FLAGS_BYTE], pos)
    }

    fn set_fd_flag(&mut self, pos: u8, value: bool) {
        self.raw[FD_FLAGS_BYTE] = with_bit(self.raw[FD_FLAGS_BYTE], pos, value);
    }

    /// Returns true if the frame uses a 29-bit (extended) identifier.
    pub fn is_extended(&self) -> bool {
        self.id_flag(EFF_BIT)
    }

    pub fn set_extended(&mut self, value: bool) {
        self.set_id_flag(EFF_BIT, value);
    }

    /// Returns true if this is a remote transmission request.
    pub fn is_remote(&self) -> bool {
        self.id_flag(RTR_BIT)
    }

    pub fn set_remote(&mut self, value: bool) {
        self.set_id_flag(RTR_BIT, value);
    }

    /// Returns true if this is an error frame.
    pub fn is_error(&self) -> bool {
        self.id_flag(ERR_BIT)
    }

    pub fn set_error(&mut self, value: bool) {
        self.set_id_flag(ERR_BIT, value);
    }

    /// Returns true if the Bit Rate Switch flag is set.
    pub fn brs(&self) -> bool {
        self.fd_flag(FdFlags::BRS_BIT)
    }

    pub fn set_brs(&mut self, value: bool) {
        self.set_fd_flag(FdFlags::BRS_BIT, value);
    }

    /// Returns true if the Error State Indicator flag is set.
    pub fn esi(&self) -> bool {
        self.fd_flag(FdFlags::ESI_BIT)
    }

    pub fn set_esi(&mut self, value: bool) {
        self.set_fd_flag(FdFlags::ESI_BIT, value);
    }

    /// Returns the CAN FD flag byte as [`FdFlags`].
    pub fn fd_flags(&self) -> FdFlags {
        FdFlags::from_byte(self.raw[FD_FLAGS_BYTE])
    }

    /// Payload length in bytes.
    pub fn data_length(&self) -> u8 {
        self.raw[LEN_BYTE]
    }

    /// Set the payload length. Values above 64 are clamped.
    pub fn set_data_length(&mut self, len: u8) {
        self.raw[LEN_BYTE] = len.min(MAX_FD_DATA_LEN as u8);
    }

    /// The payload, `data_length()` bytes long.
    pub fn data(&self) -> &[u8] {
        let len = self.data_length() as usize;
        &self.raw[CAN_HEADER_SIZE..CAN_HEADER_SIZE + len]
    }

    /// Copy `data` into the payload.
    ///
    /// At most `data_length()` bytes are copied, so the data length must be
    /// set first. Shorter input leaves the remaining payload bytes untouched.
    pub fn set_data(&mut self, data: &[u8]) {
        let len = data.len().min(self.data_length() as usize);
        self.raw[CAN_HEADER_SIZE..CAN_HEADER_SIZE + len].copy_from_slice(&data[..len]);
    }

    /// The whole 72-byte buffer.
    pub fn as_bytes(&self) -> &[u8; CAN_FRAME_SIZE] {
        &self.raw
    }

    /// Header plus payload: `data_length() + 8`.
    pub fn size(&self) -> usize {
        self.data_length() as usize + CAN_HEADER_SIZE
    }

    /// The bytes that go on the wire, `size()` bytes long.
    pub fn frame_bytes(&self) -> &[u8] {
        &self.raw[..self.size()]
    }
}

// ============================================================================
// embedded_can integration (requires `can` feature)
// ============================================================================

#[cfg(feature = "can")]
mod embedded {
    use super::CanFrame;
    use crate::can::fd::MAX_CLASSIC_DATA_LEN;
    use embedded_can::{ExtendedId, Id, StandardId};

    impl CanFrame {
        /// Build a SocketCAN frame from any `embedded_can::Frame`.
        pub fn from_frame<F: embedded_can::Frame>(frame: &F) -> Self {
            let mut can = CanFrame::new();
            can.set_embedded_id(frame.id());
            can.set_remote(frame.is_remote_frame());
            can.set_data_length(frame.dlc() as u8);
            can.set_data(frame.data());
            can
        }

        fn set_embedded_id(&mut self, id: Id) {
            match id {
                Id::Standard(id) => {
                    self.set_id(id.as_raw() as u32);
                    self.set_extended(false);
                }
                Id::Extended(id) => {
                    self.set_id(id.as_raw());
                    self.set_extended(true);
                }
            }
        }
    }

    impl embedded_can::Frame for CanFrame {
        fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
            if data.len() > MAX_CLASSIC_DATA_LEN {
                return None;
            }
            let mut can = CanFrame::new();
            can.set_embedded_id(id.into());
            can.set_data_length(data.len() as u8);
            can.set_data(data);
            Some(can)
        }

        fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
            if dlc > MAX_CLASSIC_DATA_LEN {
                return None;
            }
            let mut can = CanFrame::new();
            can.set_embedded_id(id.into());
            can.set_remote(true);
            can.set_data_length(dlc as u8);
            Some(can)
        }

        fn is_extended(&self) -> bool {
            CanFrame::is_extended(self)
        }

        fn is_remote_frame(&self) -> bool {
            self.is_remote()
        }

        fn id(&self) -> Id {
            let raw = CanFrame::id(self);
            if !CanFrame::is_extended(self) {
                if let Some(id) = u16::try_from(raw).ok().and_then(StandardId::new) {
                    return Id::Standard(id);
                }
            }
            ExtendedId::new(raw)
                .map(Id::Extended)
                .unwrap_or(Id::Extended(ExtendedId::ZERO))
        }

        fn dlc(&self) -> usize {
            self.data_length() as usize
        }

        fn data(&self) -> &[u8] {
            CanFrame::data(self)
        }
    }
}
