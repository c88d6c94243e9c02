//! PostgreSQL server version numbers.

use crate::error::{PgError, PgResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A PostgreSQL server version in `server_version_num` form (`90600`, `170000`).
///
/// Only the major version is significant here: minor releases never change
/// the on-disk layouts this crate decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PgVersion(u32);

impl PgVersion {
    /// PostgreSQL 9.0.
    pub const V90: Self = Self(90_000);
    /// PostgreSQL 9.1.
    pub const V91: Self = Self(90_100);
    /// PostgreSQL 9.2.
    pub const V92: Self = Self(90_200);
    /// PostgreSQL 9.3.
    pub const V93: Self = Self(90_300);
    /// PostgreSQL 9.4.
    pub const V94: Self = Self(90_400);
    /// PostgreSQL 9.5.
    pub const V95: Self = Self(90_500);
    /// PostgreSQL 9.6.
    pub const V96: Self = Self(90_600);
    /// PostgreSQL 10.
    pub const V10: Self = Self(100_000);
    /// PostgreSQL 11.
    pub const V11: Self = Self(110_000);
    /// PostgreSQL 12.
    pub const V12: Self = Self(120_000);
    /// PostgreSQL 13.
    pub const V13: Self = Self(130_000);
    /// PostgreSQL 14.
    pub const V14: Self = Self(140_000);
    /// PostgreSQL 15.
    pub const V15: Self = Self(150_000);
    /// PostgreSQL 16.
    pub const V16: Self = Self(160_000);
    /// PostgreSQL 17.
    pub const V17: Self = Self(170_000);
    /// PostgreSQL 18.
    pub const V18: Self = Self(180_000);

    /// Creates a version from its numeric form.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// Returns the numeric form.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the version with the minor release stripped.
    #[must_use]
    pub const fn major(self) -> Self {
        if self.0 >= Self::V10.0 {
            Self(self.0 / 10_000 * 10_000)
        } else {
            Self(self.0 / 100 * 100)
        }
    }

    /// Returns the WAL name used in directory and function names, `xlog` before 10.
    #[must_use]
    pub const fn wal_name(self) -> &'static str {
        if self.0 >= Self::V10.0 {
            "wal"
        } else {
            "xlog"
        }
    }

    /// Returns the WAL directory relative to the data directory.
    #[must_use]
    pub const fn wal_dir_name(self) -> &'static str {
        if self.0 >= Self::V10.0 {
            "pg_wal"
        } else {
            "pg_xlog"
        }
    }
}

impl fmt::Display for PgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= Self::V10.0 {
            write!(f, "{}", self.0 / 10_000)
        } else {
            write!(f, "{}.{}", self.0 / 10_000, self.0 % 10_000 / 100)
        }
    }
}

impl FromStr for PgVersion {
    type Err = PgError;

    /// Parses `9.6` style versions before 10 and `17` style versions after.
    fn from_str(text: &str) -> PgResult<Self> {
        let invalid = || PgError::invalid_version(text);
        let (major, minor) = match text.trim().split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (text.trim(), None),
        };

        let major: u32 = major.parse().map_err(|_| invalid())?;
        match minor {
            Some(minor) if major < 10 => {
                let minor: u32 = minor.parse().map_err(|_| invalid())?;
                if minor > 99 {
                    return Err(invalid());
                }
                Ok(Self(major * 10_000 + minor * 100))
            }
            None if (10..=99).contains(&major) => Ok(Self(major * 10_000)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for PgVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(PgVersion::V90.to_string(), "9.0");
        assert_eq!(PgVersion::V96.to_string(), "9.6");
        assert_eq!(PgVersion::V10.to_string(), "10");
        assert_eq!(PgVersion::V17.to_string(), "17");
        assert_eq!(PgVersion::new(170_004).to_string(), "17");
    }

    #[test]
    fn parse() {
        assert_eq!("9.4".parse::<PgVersion>().unwrap(), PgVersion::V94);
        assert_eq!("10".parse::<PgVersion>().unwrap(), PgVersion::V10);
        assert_eq!(" 16 ".parse::<PgVersion>().unwrap(), PgVersion::V16);
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in ["", "9", "10.1", "nine", "9.x", "9.100", "100", "-1"] {
            let err = text.parse::<PgVersion>().unwrap_err();
            assert!(matches!(err, PgError::InvalidVersion { .. }), "{text}");
        }
    }

    #[test]
    fn display_parse_roundtrip() {
        for version in [PgVersion::V91, PgVersion::V96, PgVersion::V11, PgVersion::V18] {
            assert_eq!(version.to_string().parse::<PgVersion>().unwrap(), version);
        }
    }

    #[test]
    fn major_strips_minor() {
        assert_eq!(PgVersion::new(90_624).major(), PgVersion::V96);
        assert_eq!(PgVersion::new(150_007).major(), PgVersion::V15);
    }

    #[test]
    fn wal_names_switch_at_ten() {
        assert_eq!(PgVersion::V96.wal_name(), "xlog");
        assert_eq!(PgVersion::V96.wal_dir_name(), "pg_xlog");
        assert_eq!(PgVersion::V10.wal_name(), "wal");
        assert_eq!(PgVersion::V10.wal_dir_name(), "pg_wal");
    }

    #[test]
    fn ordering() {
        assert!(PgVersion::V96 < PgVersion::V10);
        assert!(PgVersion::V18 > PgVersion::V17);
    }

    #[test]
    fn serializes_as_text() {
        assert_eq!(serde_json::to_string(&PgVersion::V95).unwrap(), "\"9.5\"");
    }
}
