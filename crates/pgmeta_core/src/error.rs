//! Error types for pgmeta core.

use crate::version::PgVersion;
use std::fmt;
use thiserror::Error;

/// Result type for core operations.
pub type PgResult<T> = Result<T, PgError>;

/// The kind of header being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    /// `pg_control`.
    Control,
    /// First page header of a WAL segment.
    Wal,
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => f.write_str("pg_control"),
            Self::Wal => f.write_str("WAL header"),
        }
    }
}

/// Errors that can occur while detecting or decoding headers.
#[derive(Debug, Error)]
pub enum PgError {
    /// Buffer is too short to hold the fields needed for detection or decode.
    #[error("{header} is truncated: need at least {needed} bytes, got {actual}")]
    TruncatedInput {
        /// Which header was being read.
        header: HeaderKind,
        /// Minimum number of bytes required.
        needed: usize,
        /// Number of bytes supplied.
        actual: usize,
    },

    /// No registered version recognised the header.
    #[error(
        "unexpected {header} {}\nHINT: is this version of PostgreSQL supported?",
        unrecognized_detail(.magic, .catalog_version)
    )]
    UnrecognizedFormat {
        /// Which header was being read.
        header: HeaderKind,
        /// Control version or WAL page magic found in the buffer.
        magic: u32,
        /// Catalog version, for control files.
        catalog_version: Option<u32>,
    },

    /// A declared version is not in the registry.
    #[error("PostgreSQL version {version} is not supported")]
    UnsupportedVersion {
        /// The version asked for.
        version: PgVersion,
    },

    /// Bytes do not match the declared version's layout.
    #[error("{header} does not match PostgreSQL {version}")]
    VersionMismatch {
        /// The declared version.
        version: PgVersion,
        /// Which header was being read.
        header: HeaderKind,
    },

    /// Decoded page size is not usable.
    #[error("page size {page_size} is invalid: must be a power of two between 1024 and 32768")]
    InvalidPageSize {
        /// The decoded page size.
        page_size: u32,
    },

    /// Decoded WAL segment size is not usable.
    #[error("WAL segment size {size} is invalid: must be a power of two between 1MB and 1GB")]
    InvalidWalSegmentSize {
        /// The decoded segment size.
        size: u32,
    },

    /// The first page of a WAL segment must carry the long header.
    #[error("first page header in WAL segment is expected to be in long format")]
    NotLongPageHeader,

    /// WAL belongs to a different cluster.
    #[error("WAL system identifier {wal} does not match cluster system identifier {control}")]
    SystemIdMismatch {
        /// System identifier from `pg_control`.
        control: u64,
        /// System identifier from the WAL header.
        wal: u64,
    },

    /// WAL segment size differs from the cluster's.
    #[error("WAL segment size {wal} does not match cluster WAL segment size {control}")]
    WalSegmentSizeMismatch {
        /// Segment size from `pg_control`.
        control: u32,
        /// Segment size from the WAL header.
        wal: u32,
    },

    /// Text could not be parsed as a PostgreSQL version.
    #[error("invalid PostgreSQL version '{text}'")]
    InvalidVersion {
        /// The rejected text.
        text: String,
    },

    /// Text could not be parsed as an LSN.
    #[error("invalid LSN '{text}'")]
    InvalidLsn {
        /// The rejected text.
        text: String,
    },

    /// Registry construction invariant does not hold.
    #[error("invalid registry: {message}")]
    InvalidRegistry {
        /// Which invariant failed.
        message: String,
    },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] pgmeta_storage::StorageError),
}

impl PgError {
    /// Creates an invalid registry error.
    pub fn invalid_registry(message: impl Into<String>) -> Self {
        Self::InvalidRegistry {
            message: message.into(),
        }
    }

    /// Creates an invalid version error.
    pub fn invalid_version(text: impl Into<String>) -> Self {
        Self::InvalidVersion { text: text.into() }
    }

    /// Creates an invalid LSN error.
    pub fn invalid_lsn(text: impl Into<String>) -> Self {
        Self::InvalidLsn { text: text.into() }
    }

    /// Returns true for errors caused by an unknown or unsupported format.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedFormat { .. }
                | Self::UnsupportedVersion { .. }
                | Self::VersionMismatch { .. }
        )
    }
}

fn unrecognized_detail(magic: &u32, catalog_version: &Option<u32>) -> String {
    match catalog_version {
        Some(catalog_version) => {
            format!("control version = {magic} and catalog version = {catalog_version}")
        }
        None => format!("magic = {magic:#06X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_control_message_names_both_versions() {
        let err = PgError::UnrecognizedFormat {
            header: HeaderKind::Control,
            magic: 1501,
            catalog_version: Some(202_211_111),
        };
        let message = err.to_string();
        assert!(message.starts_with(
            "unexpected pg_control control version = 1501 and catalog version = 202211111"
        ));
        assert!(message.contains("HINT"));
    }

    #[test]
    fn unrecognized_wal_message_prints_hex_magic() {
        let err = PgError::UnrecognizedFormat {
            header: HeaderKind::Wal,
            magic: 0xD0FF,
            catalog_version: None,
        };
        assert!(err.to_string().starts_with("unexpected WAL header magic = 0xD0FF"));
    }

    #[test]
    fn truncated_message() {
        let err = PgError::TruncatedInput {
            header: HeaderKind::Control,
            needed: 16,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "pg_control is truncated: need at least 16 bytes, got 3"
        );
    }

    #[test]
    fn unrecognized_classification() {
        assert!(PgError::UnsupportedVersion {
            version: PgVersion::V90
        }
        .is_unrecognized());
        assert!(!PgError::NotLongPageHeader.is_unrecognized());
    }
}
