//! Property tests over random headers of every release.

use pgmeta_core::{read_control, read_control_as, read_wal, PgError};
use pgmeta_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn control_decodes_to_built_fields(builder in control_builder_strategy()) {
        let bytes = builder.build();
        prop_assert_eq!(read_control(&bytes).unwrap(), builder.expected());
        prop_assert_eq!(
            read_control_as(&bytes, builder.interface().version()).unwrap(),
            builder.expected()
        );
    }

    #[test]
    fn decoded_catalog_satisfies_policy(builder in control_builder_strategy()) {
        let interface = builder.interface();
        let control = read_control(&builder.build()).unwrap();
        prop_assert!(interface
            .catalog_match()
            .accepts(interface.catalog_version(), control.catalog_version));
    }

    #[test]
    fn wal_decodes_to_built_fields(builder in wal_builder_strategy()) {
        prop_assert_eq!(read_wal(&builder.build()).unwrap(), builder.expected());
    }

    #[test]
    fn control_prefixes_never_panic(builder in control_builder_strategy(), cut in 0usize..400) {
        let bytes = builder.build_exact();
        let len = cut.min(bytes.len());
        let result = read_control(&bytes[..len]);
        if len < bytes.len() {
            let is_truncated = matches!(result, Err(PgError::TruncatedInput { .. }));
            prop_assert!(is_truncated);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn random_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = read_control(&bytes);
        let _ = read_wal(&bytes);
    }
}
