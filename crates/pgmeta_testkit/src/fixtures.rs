//! Byte builders and temporary clusters.
//!
//! Builders take their offsets from the decoder's own layout, so every
//! registered release gets correct bytes without a table here. Hand-computed
//! offsets live in [`crate::vectors`] instead.

use pgmeta_core::layout::{
    CheckpointEncoding, CATALOG_VERSION_OFFSET, CONTROL_SYSTEM_ID_OFFSET, CONTROL_VERSION_OFFSET,
    PG_CONTROL_FILE_SIZE, XLOG_BLCKSZ, XLP_INFO_OFFSET, XLP_LONG_HEADER, XLP_MAGIC_OFFSET,
};
use pgmeta_core::{ControlInfo, Lsn, PgInterface, PgVersion, WalInfo, WAL_SEGMENT_SIZE_DEFAULT};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Offset of `xlp_tli`, the same in every release.
const XLP_TLI_OFFSET: usize = 4;

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Returns the built-in decoder for `version`.
///
/// # Panics
///
/// Panics if the release is not supported.
pub fn interface(version: PgVersion) -> &'static dyn PgInterface {
    pgmeta_core::find_by_version(version)
        .unwrap_or_else(|| panic!("PostgreSQL {version} is not supported"))
}

/// Builds `pg_control` bytes for one release.
#[derive(Debug, Clone, Copy)]
pub struct ControlFileBuilder {
    interface: &'static dyn PgInterface,
    system_id: u64,
    catalog_version: u32,
    checkpoint: Lsn,
    timeline: u32,
    page_size: u32,
    wal_segment_size: u32,
    page_checksum: bool,
}

impl ControlFileBuilder {
    /// Creates a builder with the defaults `initdb` would pick.
    pub fn new(interface: &'static dyn PgInterface) -> Self {
        Self {
            interface,
            system_id: 7_000_000_000_000_000_001,
            catalog_version: interface.catalog_version(),
            checkpoint: Lsn::new(0x0100_0028),
            timeline: 1,
            page_size: 8192,
            wal_segment_size: WAL_SEGMENT_SIZE_DEFAULT,
            page_checksum: false,
        }
    }

    /// Creates a builder for a supported release.
    ///
    /// # Panics
    ///
    /// Panics if the release is not supported.
    pub fn for_version(version: PgVersion) -> Self {
        Self::new(interface(version))
    }

    /// Returns the decoder the bytes are laid out for.
    pub fn interface(&self) -> &'static dyn PgInterface {
        self.interface
    }

    /// Sets the system identifier.
    #[must_use]
    pub fn system_id(mut self, system_id: u64) -> Self {
        self.system_id = system_id;
        self
    }

    /// Sets the catalog version; defaults to the release's recorded one.
    #[must_use]
    pub fn catalog_version(mut self, catalog_version: u32) -> Self {
        self.catalog_version = catalog_version;
        self
    }

    /// Sets the latest checkpoint location.
    #[must_use]
    pub fn checkpoint(mut self, checkpoint: Lsn) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    /// Sets the checkpoint timeline.
    #[must_use]
    pub fn timeline(mut self, timeline: u32) -> Self {
        self.timeline = timeline;
        self
    }

    /// Sets the data page size.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the WAL segment size.
    #[must_use]
    pub fn wal_segment_size(mut self, wal_segment_size: u32) -> Self {
        self.wal_segment_size = wal_segment_size;
        self
    }

    /// Sets the data checksum flag. Ignored by releases before 9.3.
    #[must_use]
    pub fn page_checksum(mut self, page_checksum: bool) -> Self {
        self.page_checksum = page_checksum;
        self
    }

    /// Returns exactly `sizeof(ControlFileData)` bytes.
    pub fn build_exact(&self) -> Vec<u8> {
        let layout = self.interface.control_layout();
        let mut buf = vec![0u8; layout.size];

        put_u64(&mut buf, CONTROL_SYSTEM_ID_OFFSET, self.system_id);
        put_u32(&mut buf, CONTROL_VERSION_OFFSET, self.interface.control_version());
        put_u32(&mut buf, CATALOG_VERSION_OFFSET, self.catalog_version);

        match layout.checkpoint_encoding {
            CheckpointEncoding::Split => {
                put_u32(&mut buf, layout.checkpoint, self.checkpoint.xlogid());
                put_u32(&mut buf, layout.checkpoint + 4, self.checkpoint.xrecoff());
            }
            CheckpointEncoding::Linear => {
                put_u64(&mut buf, layout.checkpoint, self.checkpoint.as_u64());
            }
        }

        put_u32(&mut buf, layout.timeline, self.timeline);
        put_u32(&mut buf, layout.page_size, self.page_size);
        put_u32(&mut buf, layout.wal_segment_size, self.wal_segment_size);
        if let Some(offset) = layout.page_checksum {
            put_u32(&mut buf, offset, u32::from(self.page_checksum));
        }

        buf
    }

    /// Returns a whole control file, zero padded to [`PG_CONTROL_FILE_SIZE`].
    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.build_exact();
        buf.resize(PG_CONTROL_FILE_SIZE, 0);
        buf
    }

    /// Returns the record the built bytes decode to.
    pub fn expected(&self) -> ControlInfo {
        ControlInfo {
            system_id: self.system_id,
            catalog_version: self.catalog_version,
            checkpoint: self.checkpoint,
            timeline: self.timeline,
            page_size: self.page_size,
            wal_segment_size: self.wal_segment_size,
            page_checksum: self.page_checksum
                && self.interface.control_layout().page_checksum.is_some(),
        }
    }
}

/// Builds the first page of a WAL segment for one release.
#[derive(Debug, Clone, Copy)]
pub struct WalPageBuilder {
    interface: &'static dyn PgInterface,
    info: u16,
    timeline: u32,
    system_id: u64,
    segment_size: u32,
}

impl WalPageBuilder {
    /// Creates a builder for a long page header with default sizes.
    pub fn new(interface: &'static dyn PgInterface) -> Self {
        Self {
            interface,
            info: XLP_LONG_HEADER,
            timeline: 1,
            system_id: 7_000_000_000_000_000_001,
            segment_size: WAL_SEGMENT_SIZE_DEFAULT,
        }
    }

    /// Creates a builder for a supported release.
    ///
    /// # Panics
    ///
    /// Panics if the release is not supported.
    pub fn for_version(version: PgVersion) -> Self {
        Self::new(interface(version))
    }

    /// Returns the decoder the bytes are laid out for.
    pub fn interface(&self) -> &'static dyn PgInterface {
        self.interface
    }

    /// Sets `xlp_info`; clear [`XLP_LONG_HEADER`] for a short header.
    #[must_use]
    pub fn info(mut self, info: u16) -> Self {
        self.info = info;
        self
    }

    /// Sets `xlp_tli`.
    #[must_use]
    pub fn timeline(mut self, timeline: u32) -> Self {
        self.timeline = timeline;
        self
    }

    /// Sets `xlp_sysid`.
    #[must_use]
    pub fn system_id(mut self, system_id: u64) -> Self {
        self.system_id = system_id;
        self
    }

    /// Sets `xlp_seg_size`.
    #[must_use]
    pub fn segment_size(mut self, segment_size: u32) -> Self {
        self.segment_size = segment_size;
        self
    }

    /// Returns exactly `sizeof(XLogLongPageHeaderData)` bytes.
    pub fn build_exact(&self) -> Vec<u8> {
        let layout = self.interface.wal_layout();
        let mut buf = vec![0u8; layout.header_size];

        put_u16(&mut buf, XLP_MAGIC_OFFSET, self.interface.wal_magic());
        put_u16(&mut buf, XLP_INFO_OFFSET, self.info);
        put_u32(&mut buf, XLP_TLI_OFFSET, self.timeline);
        put_u64(&mut buf, layout.system_id, self.system_id);
        put_u32(&mut buf, layout.segment_size, self.segment_size);
        // xlp_xlog_blcksz follows xlp_seg_size
        put_u32(&mut buf, layout.segment_size + 4, XLOG_BLCKSZ as u32);

        buf
    }

    /// Returns a whole WAL page, zero padded to [`XLOG_BLCKSZ`].
    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.build_exact();
        buf.resize(XLOG_BLCKSZ, 0);
        buf
    }

    /// Returns the record the built bytes decode to.
    pub fn expected(&self) -> WalInfo {
        WalInfo {
            system_id: self.system_id,
            segment_size: self.segment_size,
        }
    }
}

/// A temporary data directory with automatic cleanup.
pub struct TempCluster {
    dir: TempDir,
}

impl TempCluster {
    /// Creates a data directory holding `global/pg_control`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn new(control: &[u8]) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let path = pgmeta_core::pg_control_path(dir.path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, control)?;
        Ok(Self { dir })
    }

    /// Returns the data directory.
    pub fn pgdata(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the path of `pg_control`.
    pub fn control_path(&self) -> PathBuf {
        pgmeta_core::pg_control_path(self.pgdata())
    }

    /// Writes a WAL segment into the release's WAL directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_wal(&self, version: PgVersion, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = pgmeta_core::wal_segment_path(self.pgdata(), version, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgmeta_core::interface::BUILTIN;
    use pgmeta_core::{read_control, read_wal};

    #[test]
    fn control_builder_roundtrips_every_release() {
        for interface in BUILTIN {
            let builder = ControlFileBuilder::new(interface)
                .system_id(123_456)
                .checkpoint(Lsn::new(0x5_0000_0060))
                .timeline(9)
                .page_checksum(true);
            let control = read_control(&builder.build()).unwrap();
            assert_eq!(control, builder.expected(), "{:?}", interface);
        }
    }

    #[test]
    fn wal_builder_roundtrips_every_release() {
        for interface in BUILTIN {
            let builder = WalPageBuilder::new(interface).system_id(77);
            assert_eq!(read_wal(&builder.build()).unwrap(), builder.expected());
        }
    }

    #[test]
    fn build_exact_sizes() {
        let control = ControlFileBuilder::for_version(PgVersion::V95);
        assert_eq!(control.build_exact().len(), 264);
        assert_eq!(control.build().len(), PG_CONTROL_FILE_SIZE);

        let wal = WalPageBuilder::for_version(PgVersion::V91);
        assert_eq!(wal.build_exact().len(), 32);
        assert_eq!(wal.build().len(), XLOG_BLCKSZ);
    }

    #[test]
    fn checksum_ignored_before_93() {
        let builder = ControlFileBuilder::for_version(PgVersion::V92).page_checksum(true);
        assert!(!builder.expected().page_checksum);
        assert!(!read_control(&builder.build()).unwrap().page_checksum);
    }

    #[test]
    fn temp_cluster_layout() {
        let cluster = TempCluster::new(&ControlFileBuilder::for_version(PgVersion::V96).build())
            .unwrap();
        assert!(cluster.control_path().is_file());

        let path = cluster
            .write_wal(PgVersion::V96, "000000010000000000000001", &[0u8; 16])
            .unwrap();
        assert!(path.starts_with(cluster.pgdata().join("pg_xlog")));
    }
}
