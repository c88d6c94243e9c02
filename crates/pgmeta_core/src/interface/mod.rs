//! Per-version decoders.
//!
//! Every supported PostgreSQL release has its own module with the constants
//! and byte offsets of its `ControlFileData` and `XLogLongPageHeaderData`.
//! Layouts are 64-bit little-endian with 8-byte `MAXALIGN`. Adding a release
//! means adding one module here and one entry to [`BUILTIN`]; the dispatcher
//! never changes.

use crate::catalog::CatalogMatch;
use crate::error::HeaderKind;
use crate::layout::{ControlLayout, WalLayout};
use crate::record::{ControlInfo, WalInfo};
use crate::version::PgVersion;
use std::fmt;

mod v10;
mod v11;
mod v12;
mod v13;
mod v14;
mod v15;
mod v16;
mod v17;
mod v18;
mod v90;
mod v91;
mod v92;
mod v93;
mod v94;
mod v95;
mod v96;

pub use v10::Pg10;
pub use v11::Pg11;
pub use v12::Pg12;
pub use v13::Pg13;
pub use v14::Pg14;
pub use v15::Pg15;
pub use v16::Pg16;
pub use v17::Pg17;
pub use v18::Pg18;
pub use v90::Pg90;
pub use v91::Pg91;
pub use v92::Pg92;
pub use v93::Pg93;
pub use v94::Pg94;
pub use v95::Pg95;
pub use v96::Pg96;

/// Detection and decoding for one PostgreSQL release.
///
/// # Contract
///
/// - `is_control`/`is_wal` never panic and never read past the version's
///   struct; a short buffer is simply not a match
/// - `control`/`wal` may only be called when the matching predicate holds;
///   calling them otherwise is a bug in the caller and panics
/// - Decoders are stateless and keep no reference to the input
pub trait PgInterface: Send + Sync {
    /// Release this decoder handles.
    fn version(&self) -> PgVersion;

    /// Recorded `catalog_version_no`.
    fn catalog_version(&self) -> u32;

    /// Policy used to accept catalog versions.
    fn catalog_match(&self) -> CatalogMatch;

    /// Raw `pg_control_version`.
    fn control_version(&self) -> u32;

    /// `XLOG_PAGE_MAGIC`.
    fn wal_magic(&self) -> u16;

    /// Offsets of the decoded `ControlFileData` fields.
    fn control_layout(&self) -> ControlLayout;

    /// Offsets of the decoded `XLogLongPageHeaderData` fields.
    fn wal_layout(&self) -> WalLayout;

    /// Returns true if `bytes` is a `pg_control` written by this release.
    fn is_control(&self, bytes: &[u8]) -> bool;

    /// Decodes `pg_control`.
    ///
    /// # Panics
    ///
    /// Panics if [`PgInterface::is_control`] is false for `bytes`.
    fn control(&self, bytes: &[u8]) -> ControlInfo;

    /// Returns true if `bytes` starts with a WAL page header of this release.
    fn is_wal(&self, bytes: &[u8]) -> bool;

    /// Decodes the long WAL page header.
    ///
    /// # Panics
    ///
    /// Panics if [`PgInterface::is_wal`] is false for `bytes`.
    fn wal(&self, bytes: &[u8]) -> WalInfo;
}

impl fmt::Debug for dyn PgInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgInterface")
            .field("version", &self.version())
            .field("control_version", &self.control_version())
            .field("catalog_version", &self.catalog_version())
            .field("wal_magic", &format_args!("{:#06X}", self.wal_magic()))
            .finish()
    }
}

/// Every supported release, newest first.
pub static BUILTIN: [&dyn PgInterface; 16] = [
    &Pg18, &Pg17, &Pg16, &Pg15, &Pg14, &Pg13, &Pg12, &Pg11, &Pg10, &Pg96, &Pg95, &Pg94, &Pg93,
    &Pg92, &Pg91, &Pg90,
];

#[cold]
#[track_caller]
pub(crate) fn contract_violation(version: PgVersion, header: HeaderKind) -> ! {
    panic!("{header} decode called for PostgreSQL {version} on bytes that do not match")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CheckpointEncoding, CONTROL_MAGIC_SIZE};

    fn control_fields(layout: &ControlLayout) -> Vec<(usize, usize)> {
        // Both checkpoint encodings span eight bytes.
        let mut fields = vec![
            (0, 8),
            (8, 4),
            (12, 4),
            (layout.checkpoint, 8),
            (layout.timeline, 4),
            (layout.page_size, 4),
            (layout.wal_segment_size, 4),
        ];
        fields.extend(layout.page_checksum.map(|offset| (offset, 4)));
        fields
    }

    #[test]
    fn control_fields_fit_inside_struct() {
        for interface in BUILTIN {
            let layout = interface.control_layout();
            assert!(layout.size >= CONTROL_MAGIC_SIZE);
            assert_eq!(layout.size % 8, 0, "{:?}", interface);
            for (offset, width) in control_fields(&layout) {
                assert!(offset + width <= layout.size, "{:?}", interface);
                assert_eq!(offset % 4, 0, "{:?} misaligned {offset}", interface);
            }
        }
    }

    #[test]
    fn wal_fields_fit_inside_header() {
        for interface in BUILTIN {
            let layout = interface.wal_layout();
            assert!(layout.system_id + 8 <= layout.header_size);
            assert!(layout.segment_size + 4 <= layout.header_size);
            assert_eq!(layout.system_id % 8, 0);
        }
    }

    #[test]
    fn split_checkpoint_only_before_93() {
        for interface in BUILTIN {
            let layout = interface.control_layout();
            let split = layout.checkpoint_encoding == CheckpointEncoding::Split;
            assert_eq!(split, interface.version() < PgVersion::V93, "{:?}", interface);
            assert_eq!(
                layout.page_checksum.is_none(),
                interface.version() < PgVersion::V93,
                "{:?}",
                interface
            );
        }
    }

    #[test]
    fn empty_and_short_buffers_never_match() {
        for interface in BUILTIN {
            assert!(!interface.is_control(&[]));
            assert!(!interface.is_wal(&[]));
            assert!(!interface.is_control(&[0xFF; 15]));
            assert!(!interface.is_wal(&[0xFF; 1]));
        }
    }

    #[test]
    fn one_byte_short_never_matches() {
        for interface in BUILTIN {
            let layout = interface.control_layout();
            let mut control = vec![0u8; layout.size];
            control[8..12].copy_from_slice(&interface.control_version().to_le_bytes());
            control[12..16].copy_from_slice(&interface.catalog_version().to_le_bytes());
            assert!(interface.is_control(&control), "{:?}", interface);
            assert!(!interface.is_control(&control[..layout.size - 1]), "{:?}", interface);

            let header_size = interface.wal_layout().header_size;
            let mut wal = vec![0u8; header_size];
            wal[0..2].copy_from_slice(&interface.wal_magic().to_le_bytes());
            assert!(interface.is_wal(&wal), "{:?}", interface);
            assert!(!interface.is_wal(&wal[..header_size - 1]), "{:?}", interface);
        }
    }

    #[test]
    #[should_panic(expected = "do not match")]
    fn control_decode_without_match_panics() {
        let _ = Pg96.control(&[0u8; 8192]);
    }

    #[test]
    #[should_panic(expected = "do not match")]
    fn wal_decode_without_match_panics() {
        let _ = Pg12.wal(&[0u8; 8192]);
    }

    #[test]
    fn debug_names_version() {
        let debug = format!("{:?}", BUILTIN[0]);
        assert!(debug.contains("PgInterface"));
        assert!(debug.contains("0xD118"));
    }
}
