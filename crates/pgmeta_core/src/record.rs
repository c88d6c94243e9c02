//! Version-independent records produced by every decoder.

use crate::error::{PgError, PgResult};
use crate::lsn::Lsn;
use serde::Serialize;

/// Smallest page size PostgreSQL can be built with.
pub const PAGE_SIZE_MIN: u32 = 1024;

/// Largest page size PostgreSQL can be built with.
pub const PAGE_SIZE_MAX: u32 = 32 * 1024;

/// Smallest WAL segment size.
pub const WAL_SEGMENT_SIZE_MIN: u32 = 1024 * 1024;

/// Largest WAL segment size.
pub const WAL_SEGMENT_SIZE_MAX: u32 = 1024 * 1024 * 1024;

/// Default WAL segment size.
pub const WAL_SEGMENT_SIZE_DEFAULT: u32 = 16 * 1024 * 1024;

/// Canonical decode of `pg_control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ControlInfo {
    /// Identifier assigned at `initdb`.
    pub system_id: u64,
    /// Catalog version (`YYYYMMDDN`).
    pub catalog_version: u32,
    /// Location of the latest checkpoint.
    pub checkpoint: Lsn,
    /// Timeline of the latest checkpoint.
    pub timeline: u32,
    /// Data page size in bytes.
    pub page_size: u32,
    /// WAL segment size in bytes.
    pub wal_segment_size: u32,
    /// Whether data pages carry checksums.
    pub page_checksum: bool,
}

impl ControlInfo {
    /// Checks that the decoded sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::InvalidPageSize`] or [`PgError::InvalidWalSegmentSize`].
    pub fn validate(&self) -> PgResult<()> {
        check_page_size(self.page_size)?;
        check_wal_segment_size(self.wal_segment_size)
    }

    /// Returns the name of the WAL segment holding the latest checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::InvalidWalSegmentSize`] if the segment size is unusable.
    pub fn checkpoint_segment(&self) -> PgResult<String> {
        self.checkpoint
            .wal_segment_name(self.timeline, self.wal_segment_size)
    }
}

/// Canonical decode of the long page header at the start of a WAL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WalInfo {
    /// Identifier of the cluster that wrote the segment.
    pub system_id: u64,
    /// Segment size in bytes.
    pub segment_size: u32,
}

impl WalInfo {
    /// Checks that the decoded segment size is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::InvalidWalSegmentSize`].
    pub fn validate(&self) -> PgResult<()> {
        check_wal_segment_size(self.segment_size)
    }

    /// Checks that this segment was written by the cluster described by `control`.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::SystemIdMismatch`] or [`PgError::WalSegmentSizeMismatch`].
    pub fn check_cluster(&self, control: &ControlInfo) -> PgResult<()> {
        if self.system_id != control.system_id {
            return Err(PgError::SystemIdMismatch {
                control: control.system_id,
                wal: self.system_id,
            });
        }

        if self.segment_size != control.wal_segment_size {
            return Err(PgError::WalSegmentSizeMismatch {
                control: control.wal_segment_size,
                wal: self.segment_size,
            });
        }

        Ok(())
    }
}

/// Checks a data page size.
///
/// # Errors
///
/// Returns [`PgError::InvalidPageSize`] unless the size is a power of two in
/// `1024..=32768`.
pub fn check_page_size(page_size: u32) -> PgResult<()> {
    if page_size.is_power_of_two() && (PAGE_SIZE_MIN..=PAGE_SIZE_MAX).contains(&page_size) {
        Ok(())
    } else {
        Err(PgError::InvalidPageSize { page_size })
    }
}

/// Checks a WAL segment size.
///
/// # Errors
///
/// Returns [`PgError::InvalidWalSegmentSize`] unless the size is a power of
/// two between 1MB and 1GB.
pub fn check_wal_segment_size(size: u32) -> PgResult<()> {
    if size.is_power_of_two() && (WAL_SEGMENT_SIZE_MIN..=WAL_SEGMENT_SIZE_MAX).contains(&size) {
        Ok(())
    } else {
        Err(PgError::InvalidWalSegmentSize { size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> ControlInfo {
        ControlInfo {
            system_id: 7_012_345_678_901_234_567,
            catalog_version: 202_307_071,
            checkpoint: Lsn::new(0x3_2C00_0060),
            timeline: 2,
            page_size: 8192,
            wal_segment_size: WAL_SEGMENT_SIZE_DEFAULT,
            page_checksum: true,
        }
    }

    #[test]
    fn page_size_bounds() {
        for ok in [1024, 2048, 4096, 8192, 16384, 32768] {
            assert!(check_page_size(ok).is_ok(), "{ok}");
        }
        for bad in [0, 512, 8000, 65536] {
            assert!(
                matches!(check_page_size(bad), Err(PgError::InvalidPageSize { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn wal_segment_size_bounds() {
        assert!(check_wal_segment_size(WAL_SEGMENT_SIZE_MIN).is_ok());
        assert!(check_wal_segment_size(WAL_SEGMENT_SIZE_DEFAULT).is_ok());
        assert!(check_wal_segment_size(WAL_SEGMENT_SIZE_MAX).is_ok());
        assert!(check_wal_segment_size(512 * 1024).is_err());
        assert!(check_wal_segment_size(2 * 1024 * 1024 * 1024).is_err());
        assert!(check_wal_segment_size(24 * 1024 * 1024).is_err());
    }

    #[test]
    fn control_validate() {
        assert!(control().validate().is_ok());

        let bad_page = ControlInfo {
            page_size: 8000,
            ..control()
        };
        assert!(matches!(
            bad_page.validate(),
            Err(PgError::InvalidPageSize { page_size: 8000 })
        ));
    }

    #[test]
    fn checkpoint_segment_name() {
        assert_eq!(
            control().checkpoint_segment().unwrap(),
            "00000002000000030000002C"
        );
    }

    #[test]
    fn check_cluster_accepts_matching_wal() {
        let wal = WalInfo {
            system_id: control().system_id,
            segment_size: WAL_SEGMENT_SIZE_DEFAULT,
        };
        assert!(wal.check_cluster(&control()).is_ok());
    }

    #[test]
    fn check_cluster_rejects_foreign_wal() {
        let wal = WalInfo {
            system_id: 1,
            segment_size: WAL_SEGMENT_SIZE_DEFAULT,
        };
        assert!(matches!(
            wal.check_cluster(&control()),
            Err(PgError::SystemIdMismatch { wal: 1, .. })
        ));
    }

    #[test]
    fn check_cluster_rejects_other_segment_size() {
        let wal = WalInfo {
            system_id: control().system_id,
            segment_size: 64 * 1024 * 1024,
        };
        assert!(matches!(
            wal.check_cluster(&control()),
            Err(PgError::WalSegmentSizeMismatch { .. })
        ));
    }

    #[test]
    fn serializes_lsn_as_text() {
        let json = serde_json::to_value(control()).unwrap();
        assert_eq!(json["checkpoint"], "3/2C000060");
        assert_eq!(json["page_checksum"], true);
    }
}
