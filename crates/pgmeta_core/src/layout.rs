//! Byte offsets shared by every `pg_control` and WAL page header layout.
//!
//! All fields are read little-endian at explicit offsets through [`ByteView`],
//! which is only constructed once the buffer is known to cover the whole
//! struct being read.

use serde::Serialize;

/// Bytes reserved for `pg_control` on disk (`PG_CONTROL_FILE_SIZE`).
pub const PG_CONTROL_FILE_SIZE: usize = 8192;

/// WAL page size (`XLOG_BLCKSZ`) read when decoding the first page of a segment.
pub const XLOG_BLCKSZ: usize = 8192;

/// `system_identifier` offset, identical in every version.
pub const CONTROL_SYSTEM_ID_OFFSET: usize = 0;

/// `pg_control_version` offset, identical in every version.
pub const CONTROL_VERSION_OFFSET: usize = 8;

/// `catalog_version_no` offset, identical in every version.
pub const CATALOG_VERSION_OFFSET: usize = 12;

/// Bytes needed to evaluate the control detection fields.
pub const CONTROL_MAGIC_SIZE: usize = 16;

/// `xlp_magic` offset.
pub const XLP_MAGIC_OFFSET: usize = 0;

/// `xlp_info` offset.
pub const XLP_INFO_OFFSET: usize = 2;

/// Bytes needed to evaluate the WAL detection field.
pub const WAL_MAGIC_SIZE: usize = 2;

/// `xlp_info` flag set on pages carrying `XLogLongPageHeaderData`.
pub const XLP_LONG_HEADER: u16 = 0x0002;

/// How the checkpoint location is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointEncoding {
    /// Two `uint32` halves, `xlogid` then `xrecoff` (before 9.3).
    Split,
    /// One `uint64` (9.3 onwards).
    Linear,
}

/// Where a version keeps the fields of `ControlFileData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlLayout {
    /// Size of the struct up to and including the CRC.
    pub size: usize,
    /// `checkPoint` offset.
    pub checkpoint: usize,
    /// Encoding of `checkPoint`.
    pub checkpoint_encoding: CheckpointEncoding,
    /// `checkPointCopy.ThisTimeLineID` offset.
    pub timeline: usize,
    /// `blcksz` offset.
    pub page_size: usize,
    /// `xlog_seg_size` offset.
    pub wal_segment_size: usize,
    /// `data_checksum_version` offset, absent before 9.3.
    pub page_checksum: Option<usize>,
}

/// Where a version keeps the fields of `XLogLongPageHeaderData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalLayout {
    /// Size of the long page header.
    pub header_size: usize,
    /// `xlp_sysid` offset.
    pub system_id: usize,
    /// `xlp_seg_size` offset.
    pub segment_size: usize,
}

/// A buffer known to be at least as long as the struct being read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteView<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteView<'a> {
    /// Returns a view if `bytes` covers `size` bytes.
    pub(crate) fn covering(bytes: &'a [u8], size: usize) -> Option<Self> {
        (bytes.len() >= size).then_some(Self { bytes })
    }

    fn array<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.bytes[offset..offset + N]);
        buf
    }

    pub(crate) fn u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.array(offset))
    }

    pub(crate) fn u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.array(offset))
    }

    pub(crate) fn u64(&self, offset: usize) -> u64 {
        u64::from_le_bytes(self.array(offset))
    }
}

/// Reads `(pg_control_version, catalog_version_no)` if the buffer holds them.
#[must_use]
pub fn control_magic(bytes: &[u8]) -> Option<(u32, u32)> {
    ByteView::covering(bytes, CONTROL_MAGIC_SIZE)
        .map(|view| (view.u32(CONTROL_VERSION_OFFSET), view.u32(CATALOG_VERSION_OFFSET)))
}

/// Reads `xlp_magic` if the buffer holds it.
#[must_use]
pub fn wal_magic(bytes: &[u8]) -> Option<u16> {
    ByteView::covering(bytes, WAL_MAGIC_SIZE).map(|view| view.u16(XLP_MAGIC_OFFSET))
}

/// Reads `xlp_info` if the buffer holds it.
#[must_use]
pub fn wal_info(bytes: &[u8]) -> Option<u16> {
    ByteView::covering(bytes, XLP_INFO_OFFSET + 2).map(|view| view.u16(XLP_INFO_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_requires_cover() {
        assert!(ByteView::covering(&[0u8; 7], 8).is_none());
        assert!(ByteView::covering(&[0u8; 8], 8).is_some());
        assert!(ByteView::covering(&[], 0).is_some());
    }

    #[test]
    fn view_reads_little_endian() {
        let bytes = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C,
        ];
        let view = ByteView::covering(&bytes, bytes.len()).unwrap();
        assert_eq!(view.u16(0), 0x0201);
        assert_eq!(view.u32(2), 0x0605_0403);
        assert_eq!(view.u64(4), 0x0C0B_0A09_0807_0605);
    }

    #[test]
    fn control_magic_needs_sixteen_bytes() {
        let mut bytes = vec![0u8; CONTROL_MAGIC_SIZE];
        bytes[8..12].copy_from_slice(&1300u32.to_le_bytes());
        bytes[12..16].copy_from_slice(&202_307_071u32.to_le_bytes());

        assert_eq!(control_magic(&bytes), Some((1300, 202_307_071)));
        assert_eq!(control_magic(&bytes[..15]), None);
        assert_eq!(control_magic(&[]), None);
    }

    #[test]
    fn wal_magic_and_info() {
        let bytes = [0x16, 0xD1, 0x07, 0x00];
        assert_eq!(wal_magic(&bytes), Some(0xD116));
        assert_eq!(wal_info(&bytes), Some(0x0007));
        assert_eq!(wal_magic(&bytes[..1]), None);
        assert_eq!(wal_info(&bytes[..3]), None);
    }
}
