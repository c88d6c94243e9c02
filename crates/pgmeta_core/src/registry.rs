//! Version registry and dispatcher.
//!
//! The registry is an immutable, ordered list of decoders (newest first).
//! Detection walks it and takes the first match. Construction guarantees at
//! most one decoder accepts any buffer, so order only matters when that
//! guarantee is broken: a bad registry then picks the wrong version
//! deterministically instead of depending on iteration order.

use crate::error::{HeaderKind, PgError, PgResult};
use crate::interface::{PgInterface, BUILTIN};
use crate::layout::{self, CONTROL_MAGIC_SIZE, WAL_MAGIC_SIZE, XLP_LONG_HEADER};
use crate::record::{ControlInfo, WalInfo};
use crate::version::PgVersion;

static BUILTIN_REGISTRY: Registry = Registry::new(&BUILTIN);

/// An ordered catalog of decoders.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    interfaces: &'static [&'static dyn PgInterface],
}

impl Registry {
    /// Creates a registry over `interfaces`, which must be ordered newest first.
    #[must_use]
    pub const fn new(interfaces: &'static [&'static dyn PgInterface]) -> Self {
        Self { interfaces }
    }

    /// Returns the registry of every supported release.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN_REGISTRY
    }

    /// Iterates decoders, newest first.
    pub fn interfaces(&self) -> impl Iterator<Item = &'static dyn PgInterface> {
        let interfaces: &'static [&'static dyn PgInterface] = self.interfaces;
        interfaces.iter().copied()
    }

    /// Returns the newest registered release.
    #[must_use]
    pub fn latest(&self) -> Option<PgVersion> {
        self.interfaces.first().map(|interface| interface.version())
    }

    /// Returns the oldest registered release.
    #[must_use]
    pub fn oldest(&self) -> Option<PgVersion> {
        self.interfaces.last().map(|interface| interface.version())
    }

    /// Returns the decoder that recognises `bytes` as `pg_control`.
    #[must_use]
    pub fn find_by_control(&self, bytes: &[u8]) -> Option<&'static dyn PgInterface> {
        self.interfaces().find(|interface| interface.is_control(bytes))
    }

    /// Returns the decoder that recognises `bytes` as a WAL page header.
    #[must_use]
    pub fn find_by_wal(&self, bytes: &[u8]) -> Option<&'static dyn PgInterface> {
        self.interfaces().find(|interface| interface.is_wal(bytes))
    }

    /// Returns the decoder for a declared release.
    ///
    /// Minor releases resolve to their major version.
    #[must_use]
    pub fn find_by_version(&self, version: PgVersion) -> Option<&'static dyn PgInterface> {
        let major = version.major();
        self.interfaces().find(|interface| interface.version() == major)
    }

    fn require_version(&self, version: PgVersion) -> PgResult<&'static dyn PgInterface> {
        self.find_by_version(version)
            .ok_or(PgError::UnsupportedVersion { version })
    }

    /// Detects the release that wrote `bytes` and decodes `pg_control`.
    ///
    /// # Errors
    ///
    /// - [`PgError::TruncatedInput`] if the buffer cannot hold the detection
    ///   fields, or holds a recognised header but not the whole struct
    /// - [`PgError::UnrecognizedFormat`] if no release matches
    /// - [`PgError::InvalidPageSize`]/[`PgError::InvalidWalSegmentSize`] if the
    ///   decoded sizes are unusable
    pub fn read_control(&self, bytes: &[u8]) -> PgResult<ControlInfo> {
        let (control_version, catalog_version) =
            layout::control_magic(bytes).ok_or(PgError::TruncatedInput {
                header: HeaderKind::Control,
                needed: CONTROL_MAGIC_SIZE,
                actual: bytes.len(),
            })?;

        let Some(interface) = self.find_by_control(bytes) else {
            return Err(self.control_miss(bytes.len(), control_version, catalog_version));
        };

        let control = interface.control(bytes);
        control.validate()?;
        tracing::debug!(
            version = %interface.version(),
            system_id = control.system_id,
            catalog_version = control.catalog_version,
            "detected pg_control"
        );

        Ok(control)
    }

    /// Decodes `pg_control` as a declared release, without detection.
    ///
    /// # Errors
    ///
    /// - [`PgError::UnsupportedVersion`] if the release is not registered
    /// - [`PgError::TruncatedInput`] if the buffer is shorter than the struct
    /// - [`PgError::VersionMismatch`] if the bytes are not from that release
    /// - [`PgError::InvalidPageSize`]/[`PgError::InvalidWalSegmentSize`]
    pub fn read_control_as(&self, bytes: &[u8], version: PgVersion) -> PgResult<ControlInfo> {
        let interface = self.require_version(version)?;
        tracing::trace!(version = %interface.version(), "decoding pg_control as declared version");

        let needed = interface.control_layout().size;
        if bytes.len() < needed {
            return Err(PgError::TruncatedInput {
                header: HeaderKind::Control,
                needed,
                actual: bytes.len(),
            });
        }

        if !interface.is_control(bytes) {
            return Err(PgError::VersionMismatch {
                version: interface.version(),
                header: HeaderKind::Control,
            });
        }

        let control = interface.control(bytes);
        control.validate()?;
        Ok(control)
    }

    /// Detects the release that wrote `bytes` and decodes the first WAL page header.
    ///
    /// # Errors
    ///
    /// - [`PgError::TruncatedInput`] if the buffer cannot hold the magic, or
    ///   holds a recognised magic but not the whole long header
    /// - [`PgError::UnrecognizedFormat`] if no release matches
    /// - [`PgError::NotLongPageHeader`] if the page lacks the long header
    /// - [`PgError::InvalidWalSegmentSize`] if the segment size is unusable
    pub fn read_wal(&self, bytes: &[u8]) -> PgResult<WalInfo> {
        let magic = layout::wal_magic(bytes).ok_or(PgError::TruncatedInput {
            header: HeaderKind::Wal,
            needed: WAL_MAGIC_SIZE,
            actual: bytes.len(),
        })?;

        let Some(interface) = self.find_by_wal(bytes) else {
            return Err(self.wal_miss(bytes.len(), magic));
        };

        let wal = decode_wal(interface, bytes)?;
        tracing::debug!(
            version = %interface.version(),
            system_id = wal.system_id,
            "detected WAL header"
        );

        Ok(wal)
    }

    /// Decodes the first WAL page header as a declared release, without detection.
    ///
    /// # Errors
    ///
    /// As [`Registry::read_wal`], with [`PgError::UnsupportedVersion`] and
    /// [`PgError::VersionMismatch`] in place of detection failures.
    pub fn read_wal_as(&self, bytes: &[u8], version: PgVersion) -> PgResult<WalInfo> {
        let interface = self.require_version(version)?;
        tracing::trace!(version = %interface.version(), "decoding WAL header as declared version");

        let needed = interface.wal_layout().header_size;
        if bytes.len() < needed {
            return Err(PgError::TruncatedInput {
                header: HeaderKind::Wal,
                needed,
                actual: bytes.len(),
            });
        }

        if !interface.is_wal(bytes) {
            return Err(PgError::VersionMismatch {
                version: interface.version(),
                header: HeaderKind::Wal,
            });
        }

        decode_wal(interface, bytes)
    }

    /// Checks the construction invariants.
    ///
    /// - decoders are ordered by strictly descending version
    /// - no two decoders accept the same `(control version, catalog version)`
    /// - no two decoders share a WAL magic
    ///
    /// # Errors
    ///
    /// Returns [`PgError::InvalidRegistry`] naming the first broken invariant.
    pub fn validate(&self) -> PgResult<()> {
        for pair in self.interfaces.windows(2) {
            if pair[0].version() <= pair[1].version() {
                return Err(PgError::invalid_registry(format!(
                    "PostgreSQL {} is listed before {}",
                    pair[0].version(),
                    pair[1].version()
                )));
            }
        }

        for (i, a) in self.interfaces.iter().enumerate() {
            for b in &self.interfaces[i + 1..] {
                if a.wal_magic() == b.wal_magic() {
                    return Err(PgError::invalid_registry(format!(
                        "PostgreSQL {} and {} share WAL magic {:#06X}",
                        a.version(),
                        b.version(),
                        a.wal_magic()
                    )));
                }

                if a.control_version() == b.control_version() && catalog_ranges_overlap(*a, *b) {
                    return Err(PgError::invalid_registry(format!(
                        "PostgreSQL {} and {} accept the same control and catalog versions",
                        a.version(),
                        b.version()
                    )));
                }
            }
        }

        Ok(())
    }

    fn control_miss(&self, actual: usize, control_version: u32, catalog_version: u32) -> PgError {
        // A recognised header on a short buffer is a truncation, not an unknown format.
        let short = self.interfaces().find(|interface| {
            interface.control_version() == control_version
                && interface
                    .catalog_match()
                    .accepts(interface.catalog_version(), catalog_version)
        });

        match short {
            Some(interface) => PgError::TruncatedInput {
                header: HeaderKind::Control,
                needed: interface.control_layout().size,
                actual,
            },
            None => PgError::UnrecognizedFormat {
                header: HeaderKind::Control,
                magic: control_version,
                catalog_version: Some(catalog_version),
            },
        }
    }

    fn wal_miss(&self, actual: usize, magic: u16) -> PgError {
        match self.interfaces().find(|interface| interface.wal_magic() == magic) {
            Some(interface) => PgError::TruncatedInput {
                header: HeaderKind::Wal,
                needed: interface.wal_layout().header_size,
                actual,
            },
            None => PgError::UnrecognizedFormat {
                header: HeaderKind::Wal,
                magic: u32::from(magic),
                catalog_version: None,
            },
        }
    }
}

fn decode_wal(interface: &dyn PgInterface, bytes: &[u8]) -> PgResult<WalInfo> {
    let info = layout::wal_info(bytes).unwrap_or_default();
    if info & XLP_LONG_HEADER == 0 {
        return Err(PgError::NotLongPageHeader);
    }

    let wal = interface.wal(bytes);
    wal.validate()?;
    Ok(wal)
}

fn catalog_ranges_overlap(a: &dyn PgInterface, b: &dyn PgInterface) -> bool {
    let (a_start, a_end) = (
        u64::from(a.catalog_version()),
        a.catalog_match().upper_bound(a.catalog_version()),
    );
    let (b_start, b_end) = (
        u64::from(b.catalog_version()),
        b.catalog_match().upper_bound(b.catalog_version()),
    );
    a_start < b_end && b_start < a_end
}
