//! WAL command implementation.

use super::{emit, format_size, CliError};
use pgmeta_core::{layout::XLOG_BLCKSZ, PgVersion, Registry, WalInfo};
use pgmeta_storage::{FileBackend, StorageBackend};
use serde::Serialize;
use std::path::Path;

/// Decoded first page header of a WAL segment.
#[derive(Debug, Serialize)]
pub struct WalReport {
    /// Path of the segment that was read.
    pub path: String,
    /// Detected or declared PostgreSQL release.
    pub version: PgVersion,
    /// Decoded fields.
    #[serde(flatten)]
    pub wal: WalInfo,
}

/// Reads the first page header of the WAL segment at `path`.
pub fn report(
    path: &Path,
    version: Option<PgVersion>,
) -> Result<WalReport, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(CliError::MissingPath(path.to_path_buf()).into());
    }

    let backend = FileBackend::open(path)?;
    let bytes = backend.read_prefix(XLOG_BLCKSZ)?;

    let registry = Registry::builtin();
    let (wal, version) = match version {
        Some(version) => (registry.read_wal_as(&bytes, version)?, version.major()),
        None => {
            let wal = registry.read_wal(&bytes)?;
            let version = registry
                .find_by_wal(&bytes)
                .map(|interface| interface.version())
                .ok_or("decoded WAL header has no matching release")?;
            (wal, version)
        }
    };

    Ok(WalReport {
        path: path.display().to_string(),
        version,
        wal,
    })
}

/// Runs the WAL command.
pub fn run(
    path: &Path,
    version: Option<PgVersion>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = report(path, version)?;
    emit(&report, format, |report| {
        println!("WAL segment: {}", report.path);
        println!();
        println!("  PostgreSQL version:         {}", report.version);
        println!("  Database system identifier: {}", report.wal.system_id);
        println!(
            "  WAL segment size:           {}",
            format_size(report.wal.segment_size)
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgmeta_core::PgError;
    use pgmeta_testkit::prelude::*;

    #[test]
    fn report_detects_release() {
        let page = WalPageBuilder::for_version(PgVersion::V96)
            .system_id(99)
            .segment_size(64 * 1024 * 1024);
        let cluster = TempCluster::new(&ControlFileBuilder::for_version(PgVersion::V96).build())
            .unwrap();
        let path = cluster
            .write_wal(PgVersion::V96, "000000010000000000000001", &page.build())
            .unwrap();

        let report = report(&path, None).unwrap();
        assert_eq!(report.version, PgVersion::V96);
        assert_eq!(report.wal, page.expected());
        assert!(path.ends_with("pg_xlog/000000010000000000000001"));
    }

    #[test]
    fn short_page_header_is_rejected() {
        let page = WalPageBuilder::for_version(PgVersion::V13).info(0);
        let cluster =
            TempCluster::new(&ControlFileBuilder::for_version(PgVersion::V13).build()).unwrap();
        let path = cluster
            .write_wal(PgVersion::V13, "000000010000000000000002", &page.build())
            .unwrap();

        let err = report(&path, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PgError>(),
            Some(PgError::NotLongPageHeader)
        ));
    }

    #[test]
    fn directory_is_not_a_segment() {
        let dir = tempfile::tempdir().unwrap();
        let err = report(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("no such file"));
    }
}
