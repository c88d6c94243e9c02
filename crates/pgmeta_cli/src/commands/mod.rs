//! CLI command implementations.

pub mod check;
pub mod control;
pub mod lsn;
pub mod versions;
pub mod wal;

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the CLI itself, as opposed to decoding errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The given path does not exist.
    #[error("no such file or directory: {}", .0.display())]
    MissingPath(PathBuf),

    /// The WAL segment does not belong to the cluster.
    #[error("WAL segment does not belong to the cluster: {0}")]
    ClusterMismatch(String),
}

/// Prints `report` as pretty JSON when `format` is `json`, otherwise with `text`.
pub fn emit<T: Serialize>(
    report: &T,
    format: &str,
    text: impl FnOnce(&T),
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => text(report),
    }
    Ok(())
}

fn format_size(bytes: u32) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{} kB", bytes / 1024)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{} MB", bytes / (1024 * 1024))
    } else {
        format!("{} GB", bytes / (1024 * 1024 * 1024))
    }
}
