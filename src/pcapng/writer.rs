use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::block::{EnhancedPacketBlock, InterfaceDescriptionBlock, SectionHeaderBlock};
use super::io::{CaptureWrite, DEFAULT_BUFFER_CAPACITY, FileWriter};
use crate::Result;
use crate::capture::{InterfaceDescriptor, LinkType, PacketHeader, PacketSink};

/// Output settings for [`PcapngWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcapngConfig {
    /// Snapshot length declared for every interface; 0 means unlimited.
    pub snaplen: u32,
    /// Written as `shb_userappl`, omitted when `None`.
    pub user_application: Option<String>,
    /// `BufWriter` capacity used by [`PcapngWriter::create_with_config`].
    pub buffer_capacity: usize,
}

impl Default for PcapngConfig {
    fn default() -> Self {
        Self {
            snaplen: 0,
            user_application: Some(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// pcapng capture writer.
///
/// The section header is written on construction. Interfaces are declared
/// lazily: the first packet for a given (link type, name) pair writes its
/// Interface Description Block, and later packets reuse its index.
pub struct PcapngWriter<W: CaptureWrite> {
    writer: W,
    config: PcapngConfig,
    interfaces: HashMap<(LinkType, String), u32>,
    packets_written: u64,
}

impl PcapngWriter<FileWriter> {
    /// Create a capture file at `path` with default settings.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_config(path, PcapngConfig::default())
    }

    pub fn create_with_config<P: AsRef<Path>>(path: P, config: PcapngConfig) -> Result<Self> {
        let file = FileWriter::with_capacity(path, config.buffer_capacity)?;
        Self::with_config(file, config)
    }
}

impl<W: CaptureWrite> PcapngWriter<W> {
    /// Start a capture on an arbitrary byte sink with default settings.
    pub fn from_writer(writer: W) -> Result<Self> {
        Self::with_config(writer, PcapngConfig::default())
    }

    pub fn with_config(writer: W, config: PcapngConfig) -> Result<Self> {
        let mut this = Self {
            writer,
            config,
            interfaces: HashMap::new(),
            packets_written: 0,
        };
        let shb = SectionHeaderBlock {
            user_application: this.config.user_application.clone(),
        };
        this.writer.write_all(&shb.to_bytes()?)?;
        Ok(this)
    }

    /// Number of interfaces declared so far.
    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Bytes written to the underlying sink.
    pub fn bytes_written(&self) -> u64 {
        self.writer.position()
    }

    /// Index of the interface, writing its description block on first use.
    fn interface_id(&mut self, interface: &InterfaceDescriptor) -> Result<u32> {
        let key = (interface.link_type, interface.name.clone());
        if let Some(&id) = self.interfaces.get(&key) {
            return Ok(id);
        }

        let id = self.interfaces.len() as u32;
        let idb = InterfaceDescriptionBlock {
            interface,
            snaplen: self.config.snaplen,
        };
        self.writer.write_all(&idb.to_bytes()?)?;
        self.interfaces.insert(key, id);
        debug!(
            interface_id = id,
            link_type = interface.link_type.code(),
            name = %interface.name,
            "registered interface"
        );
        Ok(id)
    }

    /// Write one packet.
    pub fn write_packet(
        &mut self,
        interface: &InterfaceDescriptor,
        header: &PacketHeader,
        data: &[u8],
    ) -> Result<()> {
        let interface_id = self.interface_id(interface)?;

        let mut header = *header;
        if self.config.snaplen != 0 && header.captured_length > self.config.snaplen {
            header.captured_length = self.config.snaplen;
        }
        let epb = EnhancedPacketBlock {
            interface_id,
            header: &header,
            data,
        };
        self.writer.write_all(&epb.to_bytes()?)?;
        self.packets_written += 1;
        Ok(())
    }

    /// Flush and return the byte sink.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: CaptureWrite> PacketSink for PcapngWriter<W> {
    fn append(
        &mut self,
        interface: &InterfaceDescriptor,
        header: &PacketHeader,
        data: &[u8],
    ) -> Result<()> {
        self.write_packet(interface, header, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PacketDirection;
    use crate::pcapng::VecWriter;
    use crate::pcapng::block::{EPB_MAGIC, IDB_MAGIC, SHB_MAGIC};
    use crate::timestamp::CaptureTimestamp;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    /// (block type, offset) of every block in a capture.
    fn blocks(bytes: &[u8]) -> Vec<(u32, usize)> {
        let mut out = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let len = u32_at(bytes, offset + 4) as usize;
            assert_eq!(len % 4, 0);
            assert_eq!(u32_at(bytes, offset + len - 4) as usize, len);
            out.push((u32_at(bytes, offset), offset));
            offset += len;
        }
        assert_eq!(offset, bytes.len());
        out
    }

    fn header(len: u32) -> PacketHeader {
        PacketHeader {
            timestamp: CaptureTimestamp::from_nanos(1_000),
            captured_length: len,
            original_length: len,
            direction: PacketDirection::Inbound,
        }
    }

    #[test]
    fn new_capture_holds_only_section_header() {
        let writer = PcapngWriter::from_writer(VecWriter::new()).unwrap();
        assert_eq!(writer.interface_count(), 0);
        let bytes = writer.finish().unwrap().into_inner();
        assert_eq!(blocks(&bytes), vec![(SHB_MAGIC, 0)]);
    }

    #[test]
    fn default_config_names_application() {
        let config = PcapngConfig::default();
        assert_eq!(config.snaplen, 0);
        assert_eq!(config.buffer_capacity, 1_048_576);
        assert!(config.user_application.unwrap().starts_with("asc2pcapng "));
    }

    #[test]
    fn interfaces_are_declared_once_per_link_type_and_name() {
        let mut writer = PcapngWriter::from_writer(VecWriter::new()).unwrap();
        let can1 = InterfaceDescriptor::for_channel(LinkType::CanSocketcan, 1);
        let can2 = InterfaceDescriptor::for_channel(LinkType::CanSocketcan, 2);
        let eth1 = InterfaceDescriptor::for_channel(LinkType::Ethernet, 1);

        writer.append(&can1, &header(8), &[0; 8]).unwrap();
        writer.append(&can1, &header(8), &[0; 8]).unwrap();
        writer.append(&eth1, &header(4), &[1, 2, 3, 4]).unwrap();
        writer.append(&can2, &header(8), &[0; 8]).unwrap();
        writer.append(&eth1, &header(4), &[1, 2, 3, 4]).unwrap();
        assert_eq!(writer.interface_count(), 3);
        assert_eq!(writer.packets_written(), 5);

        let bytes = writer.finish().unwrap().into_inner();
        let types: Vec<u32> = blocks(&bytes).iter().map(|(t, _)| *t).collect();
        assert_eq!(
            types,
            [
                SHB_MAGIC, IDB_MAGIC, EPB_MAGIC, EPB_MAGIC, IDB_MAGIC, EPB_MAGIC, IDB_MAGIC,
                EPB_MAGIC, EPB_MAGIC
            ]
        );

        // interface ids follow declaration order
        let epb_ids: Vec<u32> = blocks(&bytes)
            .iter()
            .filter(|(t, _)| *t == EPB_MAGIC)
            .map(|(_, offset)| u32_at(&bytes, offset + 8))
            .collect();
        assert_eq!(epb_ids, [0, 0, 1, 2, 1]);
    }

    #[test]
    fn snaplen_truncates_captured_bytes() {
        let config = PcapngConfig {
            snaplen: 4,
            user_application: None,
            ..PcapngConfig::default()
        };
        let mut writer = PcapngWriter::with_config(VecWriter::new(), config).unwrap();
        let iface = InterfaceDescriptor::for_channel(LinkType::Ethernet, 1);
        writer.append(&iface, &header(6), &[1, 2, 3, 4, 5, 6]).unwrap();

        let bytes = writer.finish().unwrap().into_inner();
        let (_, epb) = blocks(&bytes)[2];
        assert_eq!(u32_at(&bytes, epb + 20), 4);
        assert_eq!(u32_at(&bytes, epb + 24), 6);
        assert_eq!(&bytes[epb + 28..epb + 32], &[1, 2, 3, 4]);
    }

    #[test]
    fn create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pcapng");
        let mut writer = PcapngWriter::create(&path).unwrap();
        let iface = InterfaceDescriptor::for_channel(LinkType::CanSocketcan, 1);
        writer.append(&iface, &header(8), &[0; 8]).unwrap();
        assert!(writer.bytes_written() > 0);
        drop(writer.finish().unwrap());

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(blocks(&bytes).len(), 3);
    }
}
