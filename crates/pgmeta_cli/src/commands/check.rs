//! Check command implementation.

use super::{control, emit, CliError};
use pgmeta_core::{wal_from_storage, PgVersion};
use pgmeta_storage::FileBackend;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of checking a WAL segment against a cluster.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Path of the control file.
    pub control_path: String,
    /// Path of the WAL segment.
    pub segment_path: String,
    /// Release of the cluster.
    pub version: PgVersion,
    /// Cluster system identifier.
    pub system_id: u64,
    /// Why the segment does not belong to the cluster, if it does not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<String>,
}

/// Resolves `segment` to a file, looking in the cluster's WAL directory for bare names.
fn resolve_segment(pgdata: &Path, version: PgVersion, segment: &Path) -> Result<PathBuf, CliError> {
    if segment.is_file() {
        return Ok(segment.to_path_buf());
    }

    let in_wal_dir = segment
        .file_name()
        .filter(|name| Path::new(name) == segment)
        .and_then(|name| name.to_str())
        .map(|name| pgmeta_core::wal_segment_path(pgdata, version, name));

    match in_wal_dir {
        Some(path) if path.is_file() => Ok(path),
        Some(path) => Err(CliError::MissingPath(path)),
        None => Err(CliError::MissingPath(segment.to_path_buf())),
    }
}

/// Decodes the cluster's control file and the segment, and compares them.
pub fn report(
    pgdata: &Path,
    segment: &Path,
    version: Option<PgVersion>,
) -> Result<CheckReport, Box<dyn std::error::Error>> {
    let control = control::report(pgdata, version)?;
    let segment_path = resolve_segment(pgdata, control.version, segment)?;

    let backend = FileBackend::open(&segment_path)?;
    let wal = wal_from_storage(&backend, version)?;
    tracing::debug!(segment = %segment_path.display(), "checking WAL segment against cluster");

    Ok(CheckReport {
        control_path: control.path,
        segment_path: segment_path.display().to_string(),
        version: control.version,
        system_id: control.control.system_id,
        mismatch: wal
            .check_cluster(&control.control)
            .err()
            .map(|err| err.to_string()),
    })
}

/// Runs the check command.
pub fn run(
    pgdata: &Path,
    segment: &Path,
    version: Option<PgVersion>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = report(pgdata, segment, version)?;
    emit(&report, format, |report| {
        println!("Checking {} against {}", report.segment_path, report.control_path);
        println!();
        println!("  PostgreSQL version:         {}", report.version);
        println!("  Database system identifier: {}", report.system_id);
        println!();
        match &report.mismatch {
            None => println!("✓ WAL segment belongs to the cluster"),
            Some(mismatch) => println!("✗ {mismatch}"),
        }
    })?;

    match report.mismatch {
        None => Ok(()),
        Some(mismatch) => Err(CliError::ClusterMismatch(mismatch).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgmeta_testkit::prelude::*;

    const SEGMENT: &str = "000000010000000000000003";

    fn cluster(version: PgVersion, control_sysid: u64, wal_sysid: u64) -> TempCluster {
        let control = ControlFileBuilder::for_version(version).system_id(control_sysid);
        let page = WalPageBuilder::for_version(version).system_id(wal_sysid);
        let cluster = TempCluster::new(&control.build()).unwrap();
        cluster.write_wal(version, SEGMENT, &page.build()).unwrap();
        cluster
    }

    #[test]
    fn matching_segment_by_bare_name() {
        let cluster = cluster(PgVersion::V16, 42, 42);
        let report = report(cluster.pgdata(), Path::new(SEGMENT), None).unwrap();
        assert!(report.mismatch.is_none());
        assert_eq!(report.version, PgVersion::V16);
        assert!(report.segment_path.ends_with(&format!("pg_wal/{SEGMENT}")));
    }

    #[test]
    fn foreign_segment_is_reported() {
        let cluster = cluster(PgVersion::V92, 42, 43);
        let segment = cluster.pgdata().join("pg_xlog").join(SEGMENT);

        let report = report(cluster.pgdata(), &segment, None).unwrap();
        assert!(report.mismatch.unwrap().contains("system identifier 43"));
    }

    #[test]
    fn missing_segment() {
        let cluster = cluster(PgVersion::V12, 1, 1);
        let err = report(cluster.pgdata(), Path::new("000000010000000000000009"), None)
            .unwrap_err();
        assert!(err.to_string().contains("pg_wal/000000010000000000000009"));
    }

    #[test]
    fn run_fails_on_mismatch() {
        let cluster = cluster(PgVersion::V18, 5, 6);
        let err = run(cluster.pgdata(), Path::new(SEGMENT), None, "json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ClusterMismatch(_))
        ));
    }
}
