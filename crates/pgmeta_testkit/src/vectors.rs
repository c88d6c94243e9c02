//! Hand-computed test vectors.
//!
//! Bytes are written at literal offsets taken from the PostgreSQL headers of
//! each release, independently of the decoder layouts, so a wrong offset in a
//! decoder shows up as a mismatch here.

use pgmeta_core::{ControlInfo, Lsn, PgVersion, WalInfo};
use serde::Serialize;

/// A control file with its expected decode.
#[derive(Debug, Clone, Serialize)]
pub struct ControlVector {
    /// Unique identifier for this vector.
    pub id: &'static str,
    /// Release that wrote the bytes.
    pub version: PgVersion,
    /// Raw `pg_control` bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Expected decode.
    pub expected: ControlInfo,
}

/// A WAL page with its expected decode.
#[derive(Debug, Clone, Serialize)]
pub struct WalVector {
    /// Unique identifier for this vector.
    pub id: &'static str,
    /// Release that wrote the bytes.
    pub version: PgVersion,
    /// Raw first page of the segment.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Expected decode.
    pub expected: WalInfo,
}

/// Little-endian writer over a zeroed page.
struct Page(Vec<u8>);

impl Page {
    fn new() -> Self {
        Self(vec![0u8; 8192])
    }

    fn u16(mut self, offset: usize, value: u16) -> Self {
        self.0[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    fn u32(mut self, offset: usize, value: u32) -> Self {
        self.0[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    fn u64(mut self, offset: usize, value: u64) -> Self {
        self.0[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        self
    }
}

/// Control file vectors.
pub fn control_vectors() -> Vec<ControlVector> {
    vec![
        ControlVector {
            id: "pg90_split_checkpoint",
            version: PgVersion::V90,
            bytes: Page::new()
                .u64(0, 5_512_345_678_901_234_567)
                .u32(8, 903)
                .u32(12, 201_008_051)
                .u32(32, 1)
                .u32(36, 0x20)
                .u32(56, 1)
                .u32(152, 8192)
                .u32(164, 16 * 1024 * 1024)
                .0,
            expected: ControlInfo {
                system_id: 5_512_345_678_901_234_567,
                catalog_version: 201_008_051,
                checkpoint: Lsn::new(0x0000_0001_0000_0020),
                timeline: 1,
                page_size: 8192,
                wal_segment_size: 16 * 1024 * 1024,
                page_checksum: false,
            },
        },
        ControlVector {
            id: "pg92_stray_checksum_bytes",
            version: PgVersion::V92,
            bytes: Page::new()
                .u64(0, 5_812_345_678_901_234_567)
                .u32(8, 922)
                .u32(12, 201_204_301)
                .u32(32, 0)
                .u32(36, 0x0300_0020)
                .u32(56, 2)
                .u32(168, 16384)
                .u32(180, 64 * 1024 * 1024)
                // where 9.3+ would keep data_checksum_version
                .u32(224, 1)
                .u32(236, 1)
                .u32(252, 1)
                .0,
            expected: ControlInfo {
                system_id: 5_812_345_678_901_234_567,
                catalog_version: 201_204_301,
                checkpoint: Lsn::new(0x0300_0020),
                timeline: 2,
                page_size: 16384,
                wal_segment_size: 64 * 1024 * 1024,
                page_checksum: false,
            },
        },
        ControlVector {
            id: "pg93_linear_checkpoint",
            version: PgVersion::V93,
            bytes: Page::new()
                .u64(0, 5_912_345_678_901_234_567)
                .u32(8, 937)
                .u32(12, 201_306_121)
                .u64(32, 0x0000_0002_3000_0028)
                .u32(56, 1)
                .u32(192, 8192)
                .u32(204, 16 * 1024 * 1024)
                .u32(224, 1)
                .0,
            expected: ControlInfo {
                system_id: 5_912_345_678_901_234_567,
                catalog_version: 201_306_121,
                checkpoint: Lsn::new(0x0000_0002_3000_0028),
                timeline: 1,
                page_size: 8192,
                wal_segment_size: 16 * 1024 * 1024,
                page_checksum: true,
            },
        },
        ControlVector {
            id: "pg11_timeline_moved",
            version: PgVersion::V11,
            bytes: Page::new()
                .u64(0, 6_612_345_678_901_234_567)
                .u32(8, 1100)
                .u32(12, 201_809_051)
                .u64(32, 0x0000_0000_0160_0028)
                .u32(48, 3)
                .u32(208, 8192)
                .u32(220, 32 * 1024 * 1024)
                .u32(244, 0)
                .0,
            expected: ControlInfo {
                system_id: 6_612_345_678_901_234_567,
                catalog_version: 201_809_051,
                checkpoint: Lsn::new(0x0160_0028),
                timeline: 3,
                page_size: 8192,
                wal_segment_size: 32 * 1024 * 1024,
                page_checksum: false,
            },
        },
        ControlVector {
            id: "pg17_checksums",
            version: PgVersion::V17,
            bytes: Page::new()
                .u64(0, 7_412_345_678_901_234_567)
                .u32(8, 1700)
                .u32(12, 202_406_281)
                .u64(32, 0x0000_0010_0A00_0060)
                .u32(48, 5)
                .u32(216, 8192)
                .u32(228, 16 * 1024 * 1024)
                .u32(252, 1)
                .0,
            expected: ControlInfo {
                system_id: 7_412_345_678_901_234_567,
                catalog_version: 202_406_281,
                checkpoint: Lsn::new(0x0000_0010_0A00_0060),
                timeline: 5,
                page_size: 8192,
                wal_segment_size: 16 * 1024 * 1024,
                page_checksum: true,
            },
        },
        ControlVector {
            id: "pg18_later_catalog",
            version: PgVersion::V18,
            bytes: Page::new()
                .u64(0, 7_512_345_678_901_234_567)
                .u32(8, 1800)
                .u32(12, 202_510_021)
                .u64(32, 0x0000_0000_0200_0028)
                .u32(48, 1)
                .u32(216, 8192)
                .u32(228, 16 * 1024 * 1024)
                .u32(252, 1)
                .0,
            expected: ControlInfo {
                system_id: 7_512_345_678_901_234_567,
                catalog_version: 202_510_021,
                checkpoint: Lsn::new(0x0200_0028),
                timeline: 1,
                page_size: 8192,
                wal_segment_size: 16 * 1024 * 1024,
                page_checksum: true,
            },
        },
    ]
}

/// WAL page vectors.
pub fn wal_vectors() -> Vec<WalVector> {
    vec![
        WalVector {
            id: "pg91_short_struct",
            version: PgVersion::V91,
            bytes: Page::new()
                .u16(0, 0xD066)
                .u16(2, 0x0002)
                .u32(4, 1)
                .u64(16, 5_712_345_678_901_234_567)
                .u32(24, 16 * 1024 * 1024)
                .u32(28, 8192)
                .0,
            expected: WalInfo {
                system_id: 5_712_345_678_901_234_567,
                segment_size: 16 * 1024 * 1024,
            },
        },
        WalVector {
            id: "pg10_rem_len",
            version: PgVersion::V10,
            bytes: Page::new()
                .u16(0, 0xD097)
                .u16(2, 0x0002)
                .u32(4, 1)
                .u32(16, 0)
                .u64(24, 6_412_345_678_901_234_567)
                .u32(32, 128 * 1024 * 1024)
                .u32(36, 8192)
                .0,
            expected: WalInfo {
                system_id: 6_412_345_678_901_234_567,
                segment_size: 128 * 1024 * 1024,
            },
        },
        WalVector {
            id: "pg16_continuation_flag",
            version: PgVersion::V16,
            bytes: Page::new()
                .u16(0, 0xD113)
                // XLP_FIRST_IS_CONTRECORD | XLP_LONG_HEADER
                .u16(2, 0x0003)
                .u32(4, 2)
                .u64(24, 7_312_345_678_901_234_567)
                .u32(32, 16 * 1024 * 1024)
                .u32(36, 8192)
                .0,
            expected: WalInfo {
                system_id: 7_312_345_678_901_234_567,
                segment_size: 16 * 1024 * 1024,
            },
        },
    ]
}
