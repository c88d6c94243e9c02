//! LSN command implementation.

use super::emit;
use pgmeta_core::{Lsn, PgResult};
use serde::Serialize;

/// WAL segment holding an LSN.
#[derive(Debug, Serialize)]
pub struct LsnReport {
    /// The LSN.
    pub lsn: Lsn,
    /// Timeline the segment belongs to.
    pub timeline: u32,
    /// WAL segment size in bytes.
    pub segment_size: u32,
    /// Segment file name.
    pub segment: String,
}

/// Computes the segment name for `lsn`.
pub fn report(lsn: Lsn, timeline: u32, segment_size: u32) -> PgResult<LsnReport> {
    Ok(LsnReport {
        lsn,
        timeline,
        segment_size,
        segment: lsn.wal_segment_name(timeline, segment_size)?,
    })
}

/// Runs the LSN command.
pub fn run(
    lsn: Lsn,
    timeline: u32,
    segment_size: u32,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = report(lsn, timeline, segment_size)?;
    emit(&report, format, |report| println!("{}", report.segment))
}
