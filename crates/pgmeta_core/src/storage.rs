//! Reading headers through a storage backend.

use crate::error::PgResult;
use crate::layout::{PG_CONTROL_FILE_SIZE, XLOG_BLCKSZ};
use crate::record::{ControlInfo, WalInfo};
use crate::registry::Registry;
use crate::version::PgVersion;
use pgmeta_storage::StorageBackend;
use std::path::{Path, PathBuf};

/// Location of `pg_control` relative to the data directory.
pub const PG_CONTROL_RELATIVE_PATH: &str = "global/pg_control";

/// Reads and decodes `pg_control` from `backend`.
///
/// At most [`PG_CONTROL_FILE_SIZE`] bytes are read. With `version` set, the
/// bytes are decoded as that release instead of being detected.
///
/// # Errors
///
/// Returns [`crate::PgError::Storage`] if the read fails, otherwise as
/// [`Registry::read_control`] or [`Registry::read_control_as`].
pub fn control_from_storage(
    backend: &dyn StorageBackend,
    version: Option<PgVersion>,
) -> PgResult<ControlInfo> {
    let bytes = backend.read_prefix(PG_CONTROL_FILE_SIZE)?;
    tracing::debug!(len = bytes.len(), "read pg_control");

    let registry = Registry::builtin();
    match version {
        Some(version) => registry.read_control_as(&bytes, version),
        None => registry.read_control(&bytes),
    }
}

/// Reads and decodes the first page header of a WAL segment from `backend`.
///
/// At most one WAL page ([`XLOG_BLCKSZ`] bytes) is read.
///
/// # Errors
///
/// Returns [`crate::PgError::Storage`] if the read fails, otherwise as
/// [`Registry::read_wal`] or [`Registry::read_wal_as`].
pub fn wal_from_storage(
    backend: &dyn StorageBackend,
    version: Option<PgVersion>,
) -> PgResult<WalInfo> {
    let bytes = backend.read_prefix(XLOG_BLCKSZ)?;
    tracing::debug!(len = bytes.len(), "read WAL page");

    let registry = Registry::builtin();
    match version {
        Some(version) => registry.read_wal_as(&bytes, version),
        None => registry.read_wal(&bytes),
    }
}

/// Returns the path of `pg_control` inside `pgdata`.
#[must_use]
pub fn pg_control_path(pgdata: &Path) -> PathBuf {
    pgdata.join(PG_CONTROL_RELATIVE_PATH)
}

/// Returns the path of WAL segment `name` inside `pgdata`.
///
/// The directory is `pg_xlog` before PostgreSQL 10 and `pg_wal` after.
#[must_use]
pub fn wal_segment_path(pgdata: &Path, version: PgVersion, name: &str) -> PathBuf {
    pgdata.join(version.wal_dir_name()).join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HeaderKind, PgError};
    use pgmeta_storage::{FileBackend, InMemoryBackend, StorageError};
    use std::fs;
    use tempfile::tempdir;

    fn pg10_control() -> Vec<u8> {
        let mut buf = vec![0u8; PG_CONTROL_FILE_SIZE];
        buf[0..8].copy_from_slice(&6_501_234_567_890_123_456u64.to_le_bytes());
        buf[8..12].copy_from_slice(&1002u32.to_le_bytes());
        buf[12..16].copy_from_slice(&201_707_211u32.to_le_bytes());
        buf[32..40].copy_from_slice(&0x0000_0000_0300_0060u64.to_le_bytes());
        buf[56..60].copy_from_slice(&1u32.to_le_bytes());
        buf[216..220].copy_from_slice(&8192u32.to_le_bytes());
        buf[228..232].copy_from_slice(&(16u32 * 1024 * 1024).to_le_bytes());
        buf
    }

    #[test]
    fn control_from_memory() {
        let backend = InMemoryBackend::new(pg10_control());
        let control = control_from_storage(&backend, None).unwrap();
        assert_eq!(control.system_id, 6_501_234_567_890_123_456);
        assert_eq!(control.checkpoint.to_string(), "0/3000060");
        assert!(!control.page_checksum);
    }

    #[test]
    fn control_from_memory_as_declared_version() {
        let backend = InMemoryBackend::new(pg10_control());
        assert!(control_from_storage(&backend, Some(PgVersion::V10)).is_ok());
        assert!(matches!(
            control_from_storage(&backend, Some(PgVersion::V11)),
            Err(PgError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn short_file_is_truncated_not_io_error() {
        let backend = InMemoryBackend::new(pg10_control()[..100].to_vec());
        assert!(matches!(
            control_from_storage(&backend, None),
            Err(PgError::TruncatedInput {
                header: HeaderKind::Control,
                needed: 296,
                actual: 100,
            })
        ));
    }

    #[test]
    fn empty_wal_is_truncated() {
        let backend = InMemoryBackend::default();
        assert!(matches!(
            wal_from_storage(&backend, None),
            Err(PgError::TruncatedInput { actual: 0, .. })
        ));
    }

    #[test]
    fn wal_reads_only_first_page() {
        let mut segment = vec![0u8; 3 * XLOG_BLCKSZ];
        segment[0..2].copy_from_slice(&0xD116u16.to_le_bytes());
        segment[2..4].copy_from_slice(&0x0002u16.to_le_bytes());
        segment[24..32].copy_from_slice(&42u64.to_le_bytes());
        segment[32..36].copy_from_slice(&(64u32 * 1024 * 1024).to_le_bytes());

        let wal = wal_from_storage(&InMemoryBackend::new(segment), None).unwrap();
        assert_eq!(wal.system_id, 42);
        assert_eq!(wal.segment_size, 64 * 1024 * 1024);
    }

    #[test]
    fn control_from_file() {
        let dir = tempdir().unwrap();
        let path = pg_control_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, pg10_control()).unwrap();

        let backend = FileBackend::open(&path).unwrap();
        let control = control_from_storage(&backend, None).unwrap();
        assert_eq!(control.timeline, 1);
    }

    #[test]
    fn missing_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let err = FileBackend::open(&pg_control_path(dir.path())).unwrap_err();
        assert!(matches!(err, StorageError::Open { .. }));

        let err: PgError = err.into();
        assert!(err.to_string().contains("pg_control"));
    }

    #[test]
    fn paths() {
        let pgdata = Path::new("/var/lib/postgresql/data");
        assert_eq!(
            pg_control_path(pgdata),
            Path::new("/var/lib/postgresql/data/global/pg_control")
        );
        assert_eq!(
            wal_segment_path(pgdata, PgVersion::V96, "000000010000000000000001"),
            Path::new("/var/lib/postgresql/data/pg_xlog/000000010000000000000001")
        );
        assert_eq!(
            wal_segment_path(pgdata, PgVersion::V17, "000000010000000000000001"),
            Path::new("/var/lib/postgresql/data/pg_wal/000000010000000000000001")
        );
    }
}
