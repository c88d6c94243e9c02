//! Hand-computed vectors decode to their expected records.

use pgmeta_core::{read_control, read_control_as, read_wal, read_wal_as, Registry};
use pgmeta_testkit::vectors::{control_vectors, wal_vectors};

#[test]
fn control_vectors_decode() {
    for vector in control_vectors() {
        let detected = Registry::builtin()
            .find_by_control(&vector.bytes)
            .unwrap_or_else(|| panic!("{} not detected", vector.id));
        assert_eq!(detected.version(), vector.version, "{}", vector.id);
        assert_eq!(read_control(&vector.bytes).unwrap(), vector.expected, "{}", vector.id);
        assert_eq!(
            read_control_as(&vector.bytes, vector.version).unwrap(),
            vector.expected,
            "{}",
            vector.id
        );
    }
}

#[test]
fn wal_vectors_decode() {
    for vector in wal_vectors() {
        let detected = Registry::builtin()
            .find_by_wal(&vector.bytes)
            .unwrap_or_else(|| panic!("{} not detected", vector.id));
        assert_eq!(detected.version(), vector.version, "{}", vector.id);
        assert_eq!(read_wal(&vector.bytes).unwrap(), vector.expected, "{}", vector.id);
        assert_eq!(
            read_wal_as(&vector.bytes, vector.version).unwrap(),
            vector.expected,
            "{}",
            vector.id
        );
    }
}
