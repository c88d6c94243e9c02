//! Versions command implementation.

use super::emit;
use pgmeta_core::{CatalogMatch, PgVersion, Registry};
use serde::Serialize;

/// One supported release and its on-disk constants.
#[derive(Debug, Serialize)]
pub struct VersionRow {
    /// PostgreSQL release.
    pub version: PgVersion,
    /// `pg_control_version`.
    pub control_version: u32,
    /// Recorded `catalog_version_no`.
    pub catalog_version: u32,
    /// Catalog matching policy.
    pub catalog_match: CatalogMatch,
    /// `XLOG_PAGE_MAGIC`, as hex.
    pub wal_magic: String,
    /// Size of `ControlFileData` in bytes.
    pub control_size: usize,
    /// Size of `XLogLongPageHeaderData` in bytes.
    pub wal_header_size: usize,
}

/// Lists every release in `registry`, newest first.
pub fn rows(registry: &Registry) -> Vec<VersionRow> {
    registry
        .interfaces()
        .map(|interface| VersionRow {
            version: interface.version(),
            control_version: interface.control_version(),
            catalog_version: interface.catalog_version(),
            catalog_match: interface.catalog_match(),
            wal_magic: format!("{:#06X}", interface.wal_magic()),
            control_size: interface.control_layout().size,
            wal_header_size: interface.wal_layout().header_size,
        })
        .collect()
}

/// Runs the versions command.
pub fn run(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let rows = rows(Registry::builtin());
    emit(&rows, format, |rows| {
        println!(
            "{:<8} {:>8} {:>10} {:<12} {:>7} {:>8} {:>8}",
            "version", "control", "catalog", "match", "magic", "control", "wal hdr"
        );
        for row in rows {
            let policy = match row.catalog_match {
                CatalogMatch::Exact => "exact",
                CatalogMatch::YearBucket => "year bucket",
            };
            println!(
                "{:<8} {:>8} {:>10} {:<12} {:>7} {:>8} {:>8}",
                row.version.to_string(),
                row.control_version,
                row.catalog_version,
                policy,
                row.wal_magic,
                row.control_size,
                row.wal_header_size
            );
        }
    })
}
