//! Property-based test generators using proptest.
//!
//! Provides strategies for generating header bytes that a real cluster could
//! have written, for any supported release.

use crate::fixtures::{ControlFileBuilder, WalPageBuilder};
use pgmeta_core::interface::BUILTIN;
use pgmeta_core::{CatalogMatch, Lsn, PgInterface};
use proptest::prelude::*;

/// Strategy picking one of the built-in decoders.
pub fn interface_strategy() -> impl Strategy<Value = &'static dyn PgInterface> {
    prop::sample::select(BUILTIN.to_vec())
}

/// Strategy for valid data page sizes (1kB to 32kB).
pub fn page_size_strategy() -> impl Strategy<Value = u32> {
    (10u32..=15).prop_map(|shift| 1 << shift)
}

/// Strategy for valid WAL segment sizes (1MB to 1GB).
pub fn wal_segment_size_strategy() -> impl Strategy<Value = u32> {
    (20u32..=30).prop_map(|shift| 1 << shift)
}

/// Strategy for catalog versions `interface` accepts.
pub fn accepted_catalog_strategy(interface: &'static dyn PgInterface) -> BoxedStrategy<u32> {
    let base = interface.catalog_version();
    match interface.catalog_match() {
        CatalogMatch::Exact => Just(base).boxed(),
        CatalogMatch::YearBucket => {
            let end = u32::try_from(interface.catalog_match().upper_bound(base)).unwrap_or(u32::MAX);
            (base..end).boxed()
        }
    }
}

/// Strategy for control files of any release with random field values.
pub fn control_builder_strategy() -> impl Strategy<Value = ControlFileBuilder> {
    interface_strategy().prop_flat_map(|interface| {
        (
            any::<u64>(),
            accepted_catalog_strategy(interface),
            any::<u64>(),
            any::<u32>(),
            page_size_strategy(),
            wal_segment_size_strategy(),
            any::<bool>(),
        )
            .prop_map(
                move |(system_id, catalog, checkpoint, timeline, page_size, segment_size, checksum)| {
                    ControlFileBuilder::new(interface)
                        .system_id(system_id)
                        .catalog_version(catalog)
                        .checkpoint(Lsn::new(checkpoint))
                        .timeline(timeline)
                        .page_size(page_size)
                        .wal_segment_size(segment_size)
                        .page_checksum(checksum)
                },
            )
    })
}

/// Strategy for first WAL pages of any release with random field values.
pub fn wal_builder_strategy() -> impl Strategy<Value = WalPageBuilder> {
    (
        interface_strategy(),
        any::<u64>(),
        wal_segment_size_strategy(),
        any::<u32>(),
    )
        .prop_map(|(interface, system_id, segment_size, timeline)| {
            WalPageBuilder::new(interface)
                .system_id(system_id)
                .segment_size(segment_size)
                .timeline(timeline)
        })
}
