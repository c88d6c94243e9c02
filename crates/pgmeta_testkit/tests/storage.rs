//! Reading headers from files through the storage backends.

use pgmeta_core::{
    control_from_storage, wal_from_storage, wal_segment_path, PgError, PgVersion,
};
use pgmeta_storage::{FileBackend, InMemoryBackend, StorageBackend};
use pgmeta_testkit::prelude::*;
use std::sync::Arc;
use std::thread;

#[test]
fn cluster_files_decode_and_agree() {
    let control = ControlFileBuilder::for_version(PgVersion::V14)
        .system_id(7_100_000_000_000_000_014)
        .wal_segment_size(32 * 1024 * 1024);
    let wal = WalPageBuilder::for_version(PgVersion::V14)
        .system_id(7_100_000_000_000_000_014)
        .segment_size(32 * 1024 * 1024);

    let cluster = TempCluster::new(&control.build()).unwrap();
    let mut segment = wal.build();
    segment.resize(2 * 8192, 0xAB);
    let segment_path = cluster
        .write_wal(PgVersion::V14, "000000010000000000000001", &segment)
        .unwrap();
    assert_eq!(
        segment_path,
        wal_segment_path(cluster.pgdata(), PgVersion::V14, "000000010000000000000001")
    );

    let control_info =
        control_from_storage(&FileBackend::open(&cluster.control_path()).unwrap(), None).unwrap();
    let wal_info = wal_from_storage(&FileBackend::open(&segment_path).unwrap(), None).unwrap();

    assert_eq!(control_info, control.expected());
    assert_eq!(wal_info, wal.expected());
    wal_info.check_cluster(&control_info).unwrap();
}

#[test]
fn segment_from_another_cluster() {
    let control = ControlFileBuilder::for_version(PgVersion::V10).system_id(1);
    let wal = WalPageBuilder::for_version(PgVersion::V10).system_id(2);

    let control_info = control_from_storage(&InMemoryBackend::new(control.build()), None).unwrap();
    let wal_info = wal_from_storage(&InMemoryBackend::new(wal.build()), None).unwrap();

    assert!(matches!(
        wal_info.check_cluster(&control_info),
        Err(PgError::SystemIdMismatch { control: 1, wal: 2 })
    ));
}

#[test]
fn declared_version_skips_detection() {
    let bytes = ControlFileBuilder::for_version(PgVersion::V13).build();
    let backend = InMemoryBackend::new(bytes);

    assert!(control_from_storage(&backend, Some(PgVersion::V13)).is_ok());
    assert!(matches!(
        control_from_storage(&backend, Some(PgVersion::V12)),
        Err(PgError::VersionMismatch { version: PgVersion::V12, .. })
    ));
    assert!(matches!(
        control_from_storage(&backend, Some(PgVersion::new(80_400))),
        Err(PgError::UnsupportedVersion { .. })
    ));
}

#[test]
fn shared_backend_across_threads() {
    let control = ControlFileBuilder::for_version(PgVersion::V17);
    let cluster = TempCluster::new(&control.build()).unwrap();
    let backend: Arc<dyn StorageBackend> =
        Arc::new(FileBackend::open(&cluster.control_path()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let backend = Arc::clone(&backend);
            thread::spawn(move || control_from_storage(backend.as_ref(), None).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), control.expected());
    }
}
