//! Detection across every registered release.

use pgmeta_core::interface::BUILTIN;
use pgmeta_core::{read_control, read_wal, HeaderKind, PgError, PgVersion, Registry};
use pgmeta_testkit::prelude::*;

#[test]
fn control_detection_is_exclusive() {
    for owner in BUILTIN {
        let bytes = ControlFileBuilder::new(owner).build();
        let matching: Vec<_> = BUILTIN
            .iter()
            .filter(|interface| interface.is_control(&bytes))
            .map(|interface| interface.version())
            .collect();
        assert_eq!(matching, vec![owner.version()]);
    }
}

#[test]
fn wal_detection_is_exclusive() {
    for owner in BUILTIN {
        let bytes = WalPageBuilder::new(owner).build();
        let matching: Vec<_> = BUILTIN
            .iter()
            .filter(|interface| interface.is_wal(&bytes))
            .map(|interface| interface.version())
            .collect();
        assert_eq!(matching, vec![owner.version()]);
    }
}

#[test]
fn exact_struct_size_is_enough() {
    for interface in BUILTIN {
        let control = ControlFileBuilder::new(interface);
        assert_eq!(read_control(&control.build_exact()).unwrap(), control.expected());

        let wal = WalPageBuilder::new(interface);
        assert_eq!(read_wal(&wal.build_exact()).unwrap(), wal.expected());
    }
}

#[test]
fn one_byte_short_is_truncated() {
    for interface in BUILTIN {
        let control = ControlFileBuilder::new(interface).build_exact();
        let size = control.len();
        let err = read_control(&control[..size - 1]).unwrap_err();
        assert!(
            matches!(
                err,
                PgError::TruncatedInput { header: HeaderKind::Control, needed, actual }
                    if needed == size && actual == size - 1
            ),
            "{:?}: {err}",
            interface
        );

        let wal = WalPageBuilder::new(interface).build_exact();
        let size = wal.len();
        assert!(matches!(
            read_wal(&wal[..size - 1]),
            Err(PgError::TruncatedInput { header: HeaderKind::Wal, needed, .. }) if needed == size
        ));
    }
}

#[test]
fn detected_release_is_the_writer() {
    let registry = Registry::builtin();
    for interface in BUILTIN {
        let control = ControlFileBuilder::new(interface).build();
        let found = registry.find_by_control(&control).unwrap();
        assert_eq!(found.version(), interface.version());

        let wal = WalPageBuilder::new(interface).build();
        let found = registry.find_by_wal(&wal).unwrap();
        assert_eq!(found.version(), interface.version());
    }
}

#[test]
fn year_bucket_accepts_later_development_catalogs() {
    for catalog in [202_506_291, 202_507_011, 202_512_319, 202_599_999] {
        let bytes = ControlFileBuilder::for_version(PgVersion::V18)
            .catalog_version(catalog)
            .build();
        assert_eq!(read_control(&bytes).unwrap().catalog_version, catalog);
    }
}

#[test]
fn year_bucket_stops_at_next_year() {
    for catalog in [202_506_290, 202_600_000, 202_601_011] {
        let bytes = ControlFileBuilder::for_version(PgVersion::V18)
            .catalog_version(catalog)
            .build();
        assert!(
            matches!(
                read_control(&bytes),
                Err(PgError::UnrecognizedFormat { catalog_version: Some(c), .. }) if c == catalog
            ),
            "{catalog}"
        );
    }
}

#[test]
fn released_versions_reject_other_catalogs() {
    for version in [PgVersion::V13, PgVersion::V14, PgVersion::V15, PgVersion::V16] {
        let builder = ControlFileBuilder::for_version(version);
        let bytes = builder
            .catalog_version(builder.interface().catalog_version() + 1)
            .build();
        assert!(read_control(&bytes).unwrap_err().is_unrecognized(), "{version}");
    }
}

#[test]
fn unknown_magic_message_carries_hint() {
    let mut bytes = WalPageBuilder::for_version(PgVersion::V17).build();
    bytes[0..2].copy_from_slice(&0xD200u16.to_le_bytes());

    let message = read_wal(&bytes).unwrap_err().to_string();
    assert!(message.contains("is this version of PostgreSQL supported?"));
}

#[test]
fn checkpoint_segment_from_detected_control() {
    let bytes = ControlFileBuilder::for_version(PgVersion::V90)
        .checkpoint("1/20".parse().unwrap())
        .build();
    let control = read_control(&bytes).unwrap();
    assert_eq!(control.checkpoint.as_u64(), 0x0000_0001_0000_0020);
    assert_eq!(control.checkpoint_segment().unwrap(), "000000010000000100000000");
}
