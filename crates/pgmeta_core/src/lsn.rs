//! Log sequence numbers.

use crate::error::{PgError, PgResult};
use crate::record::check_wal_segment_size;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A position in the write-ahead log.
///
/// Always a single linear 64-bit offset, whether the source stored it as one
/// `uint64` or as the older `xlogid`/`xrecoff` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lsn(u64);

impl Lsn {
    /// Creates an LSN from its linear value.
    #[must_use]
    pub const fn new(lsn: u64) -> Self {
        Self(lsn)
    }

    /// Creates an LSN from the pre-9.3 `xlogid`/`xrecoff` pair.
    #[must_use]
    pub const fn from_parts(xlogid: u32, xrecoff: u32) -> Self {
        Self(((xlogid as u64) << 32) | xrecoff as u64)
    }

    /// Returns the linear value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the high 32 bits (`xlogid`).
    #[must_use]
    pub const fn xlogid(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the low 32 bits (`xrecoff`).
    #[must_use]
    pub const fn xrecoff(self) -> u32 {
        self.0 as u32
    }

    /// Returns the name of the WAL segment holding this LSN.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::InvalidWalSegmentSize`] if `segment_size` is not a
    /// valid WAL segment size.
    pub fn wal_segment_name(self, timeline: u32, segment_size: u32) -> PgResult<String> {
        check_wal_segment_size(segment_size)?;
        Ok(format!(
            "{timeline:08X}{:08X}{:08X}",
            self.xlogid(),
            self.xrecoff() / segment_size
        ))
    }
}

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}/{:X}", self.xlogid(), self.xrecoff())
    }
}

impl FromStr for Lsn {
    type Err = PgError;

    fn from_str(text: &str) -> PgResult<Self> {
        let (high, low) = text
            .trim()
            .split_once('/')
            .ok_or_else(|| PgError::invalid_lsn(text))?;
        let high = u32::from_str_radix(high, 16).map_err(|_| PgError::invalid_lsn(text))?;
        let low = u32::from_str_radix(low, 16).map_err(|_| PgError::invalid_lsn(text))?;
        Ok(Self::from_parts(high, low))
    }
}

impl Serialize for Lsn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_parts_combines_halves() {
        let lsn = Lsn::from_parts(0x0000_0001, 0x0000_0020);
        assert_eq!(lsn.as_u64(), 0x0000_0001_0000_0020);
        assert_eq!(lsn.xlogid(), 1);
        assert_eq!(lsn.xrecoff(), 0x20);
    }

    #[test]
    fn display() {
        assert_eq!(Lsn::new(0).to_string(), "0/0");
        assert_eq!(Lsn::new(0x1_0000_0020).to_string(), "1/20");
        assert_eq!(Lsn::new(0xFFFF_FFFF_ABCD_EF01).to_string(), "FFFFFFFF/ABCDEF01");
    }

    #[test]
    fn parse() {
        assert_eq!("1/20".parse::<Lsn>().unwrap(), Lsn::new(0x1_0000_0020));
        assert_eq!("a/ff".parse::<Lsn>().unwrap(), Lsn::from_parts(0xA, 0xFF));
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in ["", "1", "1/", "/1", "g/1", "1/100000000", "1/2/3"] {
            assert!(
                matches!(text.parse::<Lsn>(), Err(PgError::InvalidLsn { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn segment_name_default_size() {
        let lsn: Lsn = "1/2A000028".parse().unwrap();
        assert_eq!(
            lsn.wal_segment_name(1, 16 * 1024 * 1024).unwrap(),
            "00000001000000010000002A"
        );
    }

    #[test]
    fn segment_name_large_segments() {
        let lsn: Lsn = "5/C0000000".parse().unwrap();
        assert_eq!(
            lsn.wal_segment_name(3, 1024 * 1024 * 1024).unwrap(),
            "000000030000000500000003"
        );
    }

    #[test]
    fn segment_name_rejects_bad_size() {
        let lsn = Lsn::new(0);
        assert!(matches!(
            lsn.wal_segment_name(1, 0),
            Err(PgError::InvalidWalSegmentSize { size: 0 })
        ));
        assert!(lsn.wal_segment_name(1, 3 * 1024 * 1024).is_err());
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(value in any::<u64>()) {
            let lsn = Lsn::new(value);
            prop_assert_eq!(lsn.to_string().parse::<Lsn>().unwrap(), lsn);
        }
    }
}
