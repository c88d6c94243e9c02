//! Control command implementation.

use super::{emit, format_size, CliError};
use pgmeta_core::{layout::PG_CONTROL_FILE_SIZE, ControlInfo, PgVersion, Registry};
use pgmeta_storage::{FileBackend, StorageBackend};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Decoded `pg_control` with the release that wrote it.
#[derive(Debug, Serialize)]
pub struct ControlReport {
    /// Path of the control file that was read.
    pub path: String,
    /// Detected or declared PostgreSQL release.
    pub version: PgVersion,
    /// Decoded fields.
    #[serde(flatten)]
    pub control: ControlInfo,
    /// WAL segment holding the latest checkpoint.
    pub checkpoint_segment: String,
}

/// Resolves a data directory to its control file; other paths are used as-is.
pub fn resolve(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_dir() {
        let control = pgmeta_core::pg_control_path(path);
        if !control.exists() {
            return Err(CliError::MissingPath(control));
        }
        Ok(control)
    } else if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(CliError::MissingPath(path.to_path_buf()))
    }
}

/// Reads `pg_control` at `path` (a file or data directory).
pub fn report(
    path: &Path,
    version: Option<PgVersion>,
) -> Result<ControlReport, Box<dyn std::error::Error>> {
    let path = resolve(path)?;
    let backend = FileBackend::open(&path)?;
    let bytes = backend.read_prefix(PG_CONTROL_FILE_SIZE)?;

    let registry = Registry::builtin();
    let (control, version) = match version {
        Some(version) => (registry.read_control_as(&bytes, version)?, version.major()),
        None => {
            let control = registry.read_control(&bytes)?;
            let version = registry
                .find_by_control(&bytes)
                .map(|interface| interface.version())
                .ok_or("decoded control file has no matching release")?;
            (control, version)
        }
    };

    Ok(ControlReport {
        path: path.display().to_string(),
        version,
        checkpoint_segment: control.checkpoint_segment()?,
        control,
    })
}

/// Runs the control command.
pub fn run(
    path: &Path,
    version: Option<PgVersion>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = report(path, version)?;
    emit(&report, format, print_text_output)
}

fn print_text_output(report: &ControlReport) {
    let control = &report.control;
    println!("pg_control: {}", report.path);
    println!();
    println!("  PostgreSQL version:         {}", report.version);
    println!("  Database system identifier: {}", control.system_id);
    println!("  Catalog version number:     {}", control.catalog_version);
    println!("  Latest checkpoint location: {}", control.checkpoint);
    println!("  Latest checkpoint timeline: {}", control.timeline);
    println!("  Checkpoint WAL segment:     {}", report.checkpoint_segment);
    println!("  Database block size:        {}", format_size(control.page_size));
    println!(
        "  WAL segment size:           {}",
        format_size(control.wal_segment_size)
    );
    println!(
        "  Data page checksums:        {}",
        if control.page_checksum { "on" } else { "off" }
    );
}
