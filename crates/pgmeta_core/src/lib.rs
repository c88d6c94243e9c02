//! # pgmeta Core
//!
//! Version detection and decoding of PostgreSQL `pg_control` files and WAL
//! page headers.
//!
//! This crate provides:
//! - A registry of supported PostgreSQL releases (9.0 through 18)
//! - Detection of the release that wrote a control file or WAL segment
//! - Byte-exact decoding into one version-independent record
//! - LSN and version helpers
//!
//! ## Detection
//!
//! - `pg_control` is identified by `pg_control_version` and
//!   `catalog_version_no`; several releases share a control version and are
//!   told apart by catalog version
//! - WAL segments are identified by `XLOG_PAGE_MAGIC` in the first page header
//! - Releases still in development accept any catalog version up to the end
//!   of their year (see [`CatalogMatch`])
//!
//! Decoding never reads past the detected release's struct, never writes, and
//! checks neither the `pg_control` CRC nor WAL page contents.
//!
//! ## Usage
//!
//! ```
//! use pgmeta_core::{read_control, PgError};
//!
//! let mut bytes = vec![0u8; 8192];
//! bytes[8..12].copy_from_slice(&1700u32.to_le_bytes());
//! bytes[12..16].copy_from_slice(&202_406_281u32.to_le_bytes());
//! bytes[216..220].copy_from_slice(&8192u32.to_le_bytes());
//! bytes[228..232].copy_from_slice(&(16u32 << 20).to_le_bytes());
//!
//! let control = read_control(&bytes).unwrap();
//! assert_eq!(control.page_size, 8192);
//!
//! bytes[8..12].copy_from_slice(&1234u32.to_le_bytes());
//! assert!(matches!(read_control(&bytes), Err(PgError::UnrecognizedFormat { .. })));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod error;
pub mod interface;
pub mod layout;
mod lsn;
mod record;
mod registry;
mod storage;
mod version;

pub use catalog::CatalogMatch;
pub use error::{HeaderKind, PgError, PgResult};
pub use interface::PgInterface;
pub use lsn::Lsn;
pub use record::{
    check_page_size, check_wal_segment_size, ControlInfo, WalInfo, PAGE_SIZE_MAX, PAGE_SIZE_MIN,
    WAL_SEGMENT_SIZE_DEFAULT, WAL_SEGMENT_SIZE_MAX, WAL_SEGMENT_SIZE_MIN,
};
pub use registry::Registry;
pub use storage::{
    control_from_storage, pg_control_path, wal_from_storage, wal_segment_path,
    PG_CONTROL_RELATIVE_PATH,
};
pub use version::PgVersion;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Detects the release that wrote `bytes` and decodes `pg_control`.
///
/// Uses the built-in registry; see [`Registry::read_control`].
///
/// # Errors
///
/// As [`Registry::read_control`].
pub fn read_control(bytes: &[u8]) -> PgResult<ControlInfo> {
    Registry::builtin().read_control(bytes)
}

/// Detects the release that wrote `bytes` and decodes the first WAL page header.
///
/// # Errors
///
/// As [`Registry::read_wal`].
pub fn read_wal(bytes: &[u8]) -> PgResult<WalInfo> {
    Registry::builtin().read_wal(bytes)
}

/// Decodes `pg_control` as a declared release.
///
/// # Errors
///
/// As [`Registry::read_control_as`].
pub fn read_control_as(bytes: &[u8], version: PgVersion) -> PgResult<ControlInfo> {
    Registry::builtin().read_control_as(bytes, version)
}

/// Decodes the first WAL page header as a declared release.
///
/// # Errors
///
/// As [`Registry::read_wal_as`].
pub fn read_wal_as(bytes: &[u8], version: PgVersion) -> PgResult<WalInfo> {
    Registry::builtin().read_wal_as(bytes, version)
}

/// Returns the built-in decoder for `version`, if supported.
#[must_use]
pub fn find_by_version(version: PgVersion) -> Option<&'static dyn PgInterface> {
    Registry::builtin().find_by_version(version)
}
