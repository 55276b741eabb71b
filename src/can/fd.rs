//! CAN FD length coding and flag bits.
//!
//! A CAN FD frame carries up to 64 payload bytes and two extra status bits,
//! BRS (data phase sent at the faster bit rate) and ESI (transmitter is
//! error passive). Both live in byte 5 of a SocketCAN frame.
//!
//! # DLC to Data Length Mapping
//!
//! ASC traces log the raw 4-bit DLC; the SocketCAN frame stores the byte
//! count. Above 8 the mapping is non-linear:
//!
//! | DLC | 0-8 | 9  | 10 | 11 | 12 | 13 | 14 | 15 |
//! |-----|-----|----|----|----|----|----|----|----|
//! | len | DLC | 12 | 16 | 20 | 24 | 32 | 48 | 64 |

/// Maximum CAN FD data length in bytes.
pub const MAX_FD_DATA_LEN: usize = 64;

/// Maximum classic CAN data length in bytes.
pub const MAX_CLASSIC_DATA_LEN: usize = 8;

/// CAN FD DLC to data length mapping.
///
/// Returns the actual data length for a given DLC value.
#[inline]
pub const fn dlc_to_len(dlc: u8) -> usize {
    match dlc {
        0..=8 => dlc as usize,
        9 => 12,
        10 => 16,
        11 => 20,
        12 => 24,
        13 => 32,
        14 => 48,
        _ => 64,
    }
}

/// Data length to CAN FD DLC mapping.
///
/// Returns the minimum DLC that can hold the given data length.
#[inline]
pub const fn len_to_dlc(len: usize) -> u8 {
    match len {
        0..=8 => len as u8,
        9..=12 => 9,
        13..=16 => 10,
        17..=20 => 11,
        21..=24 => 12,
        25..=32 => 13,
        33..=48 => 14,
        _ => 15, // 49-64 bytes
    }
}

/// CAN FD frame flags, as stored in byte 5 of a SocketCAN frame.
///
/// Bit 0: BRS
/// Bit 1: ESI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FdFlags {
    brs: bool,
    esi: bool,
}

impl FdFlags {
    /// Bit position of the Bit Rate Switch flag.
    pub const BRS_BIT: u8 = 0;
    /// Bit position of the Error State Indicator flag.
    pub const ESI_BIT: u8 = 1;

    /// Create new FD flags.
    #[inline]
    pub const fn new(brs: bool, esi: bool) -> Self {
        Self { brs, esi }
    }

    /// Create flags from a raw byte. Bits other than BRS and ESI are ignored.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            brs: byte & (1 << Self::BRS_BIT) != 0,
            esi: byte & (1 << Self::ESI_BIT) != 0,
        }
    }

    /// Convert flags to a raw byte.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        ((self.brs as u8) << Self::BRS_BIT) | ((self.esi as u8) << Self::ESI_BIT)
    }

    /// Returns true if Bit Rate Switch is enabled.
    #[inline]
    pub const fn brs(&self) -> bool {
        self.brs
    }

    /// Returns true if Error State Indicator is set.
    #[inline]
    pub const fn esi(&self) -> bool {
        self.esi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dlc_to_len() {
        assert_eq!(dlc_to_len(0), 0);
        assert_eq!(dlc_to_len(8), 8);
        assert_eq!(dlc_to_len(9), 12);
        assert_eq!(dlc_to_len(10), 16);
        assert_eq!(dlc_to_len(11), 20);
        assert_eq!(dlc_to_len(12), 24);
        assert_eq!(dlc_to_len(13), 32);
        assert_eq!(dlc_to_len(14), 48);
        assert_eq!(dlc_to_len(15), 64);
        // Out of range DLC saturates
        assert_eq!(dlc_to_len(0xFF), 64);
    }

    #[test]
    fn test_len_to_dlc() {
        assert_eq!(len_to_dlc(0), 0);
        assert_eq!(len_to_dlc(8), 8);
        assert_eq!(len_to_dlc(12), 9);
        assert_eq!(len_to_dlc(64), 15);
        // In-between values round up
        assert_eq!(len_to_dlc(10), 9);
        assert_eq!(len_to_dlc(50), 15);
    }

    #[test]
    fn test_fd_flags() {
        let flags = FdFlags::new(true, false);
        assert!(flags.brs());
        assert!(!flags.esi());
        assert_eq!(flags.to_byte(), 0x01);

        let flags = FdFlags::new(false, true);
        assert_eq!(flags.to_byte(), 0x02);

        let flags = FdFlags::from_byte(0xFF);
        assert!(flags.brs());
        assert!(flags.esi());
        assert_eq!(flags.to_byte(), 0x03);
    }
}
