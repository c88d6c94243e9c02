//! PostgreSQL 11
//!
//! `prevCheckPoint` is gone, so `checkPointCopy` and everything after it move
//! up eight bytes.

use super::{contract_violation, PgInterface};
use crate::catalog::CatalogMatch;
use crate::error::HeaderKind;
use crate::layout::{
    ByteView, CheckpointEncoding, ControlLayout, WalLayout, CATALOG_VERSION_OFFSET,
    CONTROL_SYSTEM_ID_OFFSET, CONTROL_VERSION_OFFSET, XLP_MAGIC_OFFSET,
};
use crate::lsn::Lsn;
use crate::record::{ControlInfo, WalInfo};
use crate::version::PgVersion;

const CONTROL_VERSION: u32 = 1100;
const CATALOG_VERSION: u32 = 201_809_051;
const CATALOG_MATCH: CatalogMatch = CatalogMatch::Exact;
const WAL_MAGIC: u16 = 0xD098;

// ControlFileData
const CHECKPOINT: usize = 32;
const THIS_TIMELINE_ID: usize = 48;
const BLCKSZ: usize = 208;
const XLOG_SEG_SIZE: usize = 220;
const DATA_CHECKSUM_VERSION: usize = 244;
const CONTROL_SIZE: usize = 288;

// XLogLongPageHeaderData
const XLP_SYSID: usize = 24;
const XLP_SEG_SIZE: usize = 32;
const LONG_HEADER_SIZE: usize = 40;

/// PostgreSQL 11.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pg11;

impl PgInterface for Pg11 {
    fn version(&self) -> PgVersion {
        PgVersion::V11
    }

    fn catalog_version(&self) -> u32 {
        CATALOG_VERSION
    }

    fn catalog_match(&self) -> CatalogMatch {
        CATALOG_MATCH
    }

    fn control_version(&self) -> u32 {
        CONTROL_VERSION
    }

    fn wal_magic(&self) -> u16 {
        WAL_MAGIC
    }

    fn control_layout(&self) -> ControlLayout {
        ControlLayout {
            size: CONTROL_SIZE,
            checkpoint: CHECKPOINT,
            checkpoint_encoding: CheckpointEncoding::Linear,
            timeline: THIS_TIMELINE_ID,
            page_size: BLCKSZ,
            wal_segment_size: XLOG_SEG_SIZE,
            page_checksum: Some(DATA_CHECKSUM_VERSION),
        }
    }

    fn wal_layout(&self) -> WalLayout {
        WalLayout {
            header_size: LONG_HEADER_SIZE,
            system_id: XLP_SYSID,
            segment_size: XLP_SEG_SIZE,
        }
    }

    fn is_control(&self, bytes: &[u8]) -> bool {
        ByteView::covering(bytes, CONTROL_SIZE).is_some_and(|view| {
            view.u32(CONTROL_VERSION_OFFSET) == CONTROL_VERSION
                && CATALOG_MATCH.accepts(CATALOG_VERSION, view.u32(CATALOG_VERSION_OFFSET))
        })
    }

    fn control(&self, bytes: &[u8]) -> ControlInfo {
        let Some(view) = ByteView::covering(bytes, CONTROL_SIZE).filter(|_| self.is_control(bytes))
        else {
            contract_violation(self.version(), HeaderKind::Control)
        };

        ControlInfo {
            system_id: view.u64(CONTROL_SYSTEM_ID_OFFSET),
            catalog_version: view.u32(CATALOG_VERSION_OFFSET),
            checkpoint: Lsn::new(view.u64(CHECKPOINT)),
            timeline: view.u32(THIS_TIMELINE_ID),
            page_size: view.u32(BLCKSZ),
            wal_segment_size: view.u32(XLOG_SEG_SIZE),
            page_checksum: view.u32(DATA_CHECKSUM_VERSION) != 0,
        }
    }

    fn is_wal(&self, bytes: &[u8]) -> bool {
        ByteView::covering(bytes, LONG_HEADER_SIZE)
            .is_some_and(|view| view.u16(XLP_MAGIC_OFFSET) == WAL_MAGIC)
    }

    fn wal(&self, bytes: &[u8]) -> WalInfo {
        let Some(view) = ByteView::covering(bytes, LONG_HEADER_SIZE).filter(|_| self.is_wal(bytes))
        else {
            contract_violation(self.version(), HeaderKind::Wal)
        };

        WalInfo {
            system_id: view.u64(XLP_SYSID),
            segment_size: view.u32(XLP_SEG_SIZE),
        }
    }
}
