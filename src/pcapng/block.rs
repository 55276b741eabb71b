//! pcapng block serialization.
//!
//! Every block shares the same frame:
//!
//! ```text
//! +---------------------------------------------+
//! | block type (u32)                            |
//! | block total length (u32)                    |
//! | body, zero-padded to a multiple of 4 bytes  |
//! | options (code u16, length u16, value, pad)  |
//! | block total length (u32)                    |
//! +---------------------------------------------+
//! ```
//!
//! All fields are written little-endian; the byte-order magic in the section
//! header tells readers which order was used.

use crate::capture::{InterfaceDescriptor, PacketHeader, TSRESOL_NANOS};
use crate::{Error, Result};

pub const SHB_MAGIC: u32 = 0x0A0D_0D0A;
pub const IDB_MAGIC: u32 = 0x0000_0001;
pub const EPB_MAGIC: u32 = 0x0000_0006;
pub const BOM_MAGIC: u32 = 0x1A2B_3C4D;

const OPT_ENDOFOPT: u16 = 0;
const OPT_SHB_USERAPPL: u16 = 4;
const OPT_IF_NAME: u16 = 2;
const OPT_IF_TSRESOL: u16 = 9;
const OPT_EPB_FLAGS: u16 = 2;

/// Type and both length fields.
const BLOCK_OVERHEAD: usize = 12;

/// Bytes needed to pad `len` to a 32-bit boundary.
pub const fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_padded(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(bytes);
    buf.resize(buf.len() + padding(bytes.len()), 0);
}

/// Append one option (code, length, value, padding).
fn put_option(buf: &mut Vec<u8>, code: u16, value: &[u8]) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        Error::BlockSerializationError(format!(
            "option {code} value of {} bytes exceeds 65535",
            value.len()
        ))
    })?;
    put_u16(buf, code);
    put_u16(buf, len);
    put_padded(buf, value);
    Ok(())
}

fn put_end_of_options(buf: &mut Vec<u8>) {
    put_u16(buf, OPT_ENDOFOPT);
    put_u16(buf, 0);
}

/// Wrap a block body with its type and length fields.
fn finish_block(block_type: u32, body: Vec<u8>) -> Result<Vec<u8>> {
    let total = body.len() + BLOCK_OVERHEAD;
    debug_assert_eq!(total % 4, 0, "block body is not 32-bit aligned");
    let total_len = u32::try_from(total).map_err(|_| {
        Error::BlockSerializationError(format!("block of {total} bytes exceeds u32 length"))
    })?;

    let mut buffer = Vec::with_capacity(total);
    put_u32(&mut buffer, block_type);
    put_u32(&mut buffer, total_len);
    buffer.extend_from_slice(&body);
    put_u32(&mut buffer, total_len);
    Ok(buffer)
}

/// Section Header Block, written once at the start of a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionHeaderBlock {
    /// Value of `shb_userappl`, omitted when `None`.
    pub user_application: Option<String>,
}

impl SectionHeaderBlock {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut body = Vec::with_capacity(32);
        put_u32(&mut body, BOM_MAGIC);
        put_u16(&mut body, 1); // major
        put_u16(&mut body, 0); // minor
        // section length not specified
        body.extend_from_slice(&(-1i64).to_le_bytes());

        if let Some(app) = &self.user_application {
            put_option(&mut body, OPT_SHB_USERAPPL, app.as_bytes())?;
            put_end_of_options(&mut body);
        }
        finish_block(SHB_MAGIC, body)
    }
}

/// Interface Description Block for one (link type, channel) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptionBlock<'a> {
    pub interface: &'a InterfaceDescriptor,
    /// Maximum captured length; 0 for unlimited.
    pub snaplen: u32,
}

impl InterfaceDescriptionBlock<'_> {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut body = Vec::with_capacity(32);
        put_u16(&mut body, self.interface.link_type.code());
        put_u16(&mut body, 0); // reserved
        put_u32(&mut body, self.snaplen);

        put_option(&mut body, OPT_IF_NAME, self.interface.name.as_bytes())?;
        put_option(&mut body, OPT_IF_TSRESOL, &[TSRESOL_NANOS])?;
        put_end_of_options(&mut body);
        finish_block(IDB_MAGIC, body)
    }
}

/// Enhanced Packet Block carrying one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedPacketBlock<'a> {
    /// Index of the interface in the order its IDB was written.
    pub interface_id: u32,
    pub header: &'a PacketHeader,
    /// Captured bytes; `header.captured_length` of them are written.
    pub data: &'a [u8],
}

impl EnhancedPacketBlock<'_> {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let captured = self.header.captured_length as usize;
        if captured > self.data.len() {
            return Err(Error::BlockSerializationError(format!(
                "captured length {captured} exceeds packet data of {} bytes",
                self.data.len()
            )));
        }

        // if_tsresol is 9, so the timestamp counts nanoseconds
        let ts = self.header.timestamp.as_nanos();
        let mut body = Vec::with_capacity(20 + captured + padding(captured) + 12);
        put_u32(&mut body, self.interface_id);
        put_u32(&mut body, (ts >> 32) as u32);
        put_u32(&mut body, ts as u32);
        put_u32(&mut body, self.header.captured_length);
        put_u32(&mut body, self.header.original_length);
        put_padded(&mut body, &self.data[..captured]);

        put_option(
            &mut body,
            OPT_EPB_FLAGS,
            &self.header.direction.epb_flags().to_le_bytes(),
        )?;
        put_end_of_options(&mut body);
        finish_block(EPB_MAGIC, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{LinkType, PacketDirection};
    use crate::timestamp::CaptureTimestamp;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    fn assert_framed(bytes: &[u8], block_type: u32) {
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(u32_at(bytes, 0), block_type);
        assert_eq!(u32_at(bytes, 4) as usize, bytes.len());
        assert_eq!(u32_at(bytes, bytes.len() - 4) as usize, bytes.len());
    }

    #[test]
    fn padding_to_32_bits() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(4), 0);
        assert_eq!(padding(10), 2);
    }

    #[test]
    fn section_header_without_options() {
        let bytes = SectionHeaderBlock::default().to_bytes().unwrap();
        assert_eq!(bytes.len(), 28);
        assert_framed(&bytes, SHB_MAGIC);
        assert_eq!(u32_at(&bytes, 8), BOM_MAGIC);
        assert_eq!(u16_at(&bytes, 12), 1);
        assert_eq!(u16_at(&bytes, 14), 0);
        assert_eq!(&bytes[16..24], &[0xFF; 8]);
    }

    #[test]
    fn section_header_with_user_application() {
        let shb = SectionHeaderBlock {
            user_application: Some(String::from("asc2pcapng")),
        };
        let bytes = shb.to_bytes().unwrap();
        assert_framed(&bytes, SHB_MAGIC);
        // option header, 10 bytes padded to 12, end of options
        assert_eq!(bytes.len(), 28 + 4 + 12 + 4);
        assert_eq!(u16_at(&bytes, 24), OPT_SHB_USERAPPL);
        assert_eq!(u16_at(&bytes, 26), 10);
        assert_eq!(&bytes[28..38], b"asc2pcapng");
        assert_eq!(&bytes[38..40], &[0, 0]);
    }

    #[test]
    fn interface_description_layout() {
        let iface = InterfaceDescriptor::for_channel(LinkType::CanSocketcan, 1);
        let bytes = InterfaceDescriptionBlock {
            interface: &iface,
            snaplen: 0,
        }
        .to_bytes()
        .unwrap();
        assert_framed(&bytes, IDB_MAGIC);
        assert_eq!(u16_at(&bytes, 8), 227);
        assert_eq!(u16_at(&bytes, 10), 0);
        assert_eq!(u32_at(&bytes, 12), 0);
        // if_name "1"
        assert_eq!(u16_at(&bytes, 16), OPT_IF_NAME);
        assert_eq!(u16_at(&bytes, 18), 1);
        assert_eq!(bytes[20], b'1');
        // if_tsresol 9
        assert_eq!(u16_at(&bytes, 24), OPT_IF_TSRESOL);
        assert_eq!(u16_at(&bytes, 26), 1);
        assert_eq!(bytes[28], 9);
        // end of options
        assert_eq!(u32_at(&bytes, 32), 0);
        assert_eq!(bytes.len(), 40);
    }

    #[test]
    fn enhanced_packet_layout() {
        let header = PacketHeader {
            timestamp: CaptureTimestamp {
                seconds: 1_741_610_096,
                nanoseconds: 16_728_000,
            },
            captured_length: 10,
            original_length: 10,
            direction: PacketDirection::Outbound,
        };
        let data = [0u8, 0, 1, 0x23, 2, 0, 0, 0, 0xAA, 0xBB];
        let bytes = EnhancedPacketBlock {
            interface_id: 3,
            header: &header,
            data: &data,
        }
        .to_bytes()
        .unwrap();

        assert_framed(&bytes, EPB_MAGIC);
        assert_eq!(u32_at(&bytes, 8), 3);
        let ts = ((u32_at(&bytes, 12) as u64) << 32) | u32_at(&bytes, 16) as u64;
        assert_eq!(ts, 1_741_610_096_016_728_000);
        assert_eq!(u32_at(&bytes, 20), 10);
        assert_eq!(u32_at(&bytes, 24), 10);
        assert_eq!(&bytes[28..38], &data);
        assert_eq!(&bytes[38..40], &[0, 0]);
        // epb_flags
        assert_eq!(u16_at(&bytes, 40), OPT_EPB_FLAGS);
        assert_eq!(u16_at(&bytes, 42), 4);
        assert_eq!(u32_at(&bytes, 44), 2);
        assert_eq!(u32_at(&bytes, 48), 0);
        assert_eq!(bytes.len(), 56);
    }

    #[test]
    fn every_interface_declares_nanosecond_resolution() {
        let header = PacketHeader {
            timestamp: CaptureTimestamp {
                seconds: 2,
                nanoseconds: 1,
            },
            captured_length: 0,
            original_length: 0,
            direction: PacketDirection::Inbound,
        };
        for link_type in [LinkType::CanSocketcan, LinkType::Ethernet] {
            let iface = InterfaceDescriptor::for_channel(link_type, 4);
            let idb = InterfaceDescriptionBlock {
                interface: &iface,
                snaplen: 0,
            }
            .to_bytes()
            .unwrap();
            assert_eq!(u16_at(&idb, 24), OPT_IF_TSRESOL);
            assert_eq!(idb[28], TSRESOL_NANOS);
        }

        let epb = EnhancedPacketBlock {
            interface_id: 0,
            header: &header,
            data: &[],
        }
        .to_bytes()
        .unwrap();
        let ts = ((u32_at(&epb, 12) as u64) << 32) | u32_at(&epb, 16) as u64;
        assert_eq!(ts, 2_000_000_001);
    }

    #[test]
    fn captured_length_beyond_data_is_rejected() {
        let header = PacketHeader {
            timestamp: CaptureTimestamp::default(),
            captured_length: 8,
            original_length: 8,
            direction: PacketDirection::Inbound,
        };
        let result = EnhancedPacketBlock {
            interface_id: 0,
            header: &header,
            data: &[1, 2, 3],
        }
        .to_bytes();
        assert!(matches!(result, Err(Error::BlockSerializationError(_))));
    }

    #[test]
    fn oversized_option_is_rejected() {
        let shb = SectionHeaderBlock {
            user_application: Some("x".repeat(70_000)),
        };
        assert!(matches!(
            shb.to_bytes(),
            Err(Error::BlockSerializationError(_))
        ));
    }
}
