//! Catalog version matching.
//!
//! `catalog_version_no` is a date-like counter, `YYYYMMDDN`. Released versions
//! match their recorded value exactly. A version still in development matches
//! any catalog from its recorded value up to the end of that year, so betas and
//! release candidates keep working without an update until the year rolls over.

use serde::Serialize;

/// Divisor that strips `MMDDN` from a catalog version.
const YEAR_DIVISOR: u64 = 100_000;

/// Policy a version uses to accept catalog versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMatch {
    /// Only the recorded catalog version.
    Exact,
    /// The recorded catalog version up to the start of the next year bucket.
    YearBucket,
}

impl CatalogMatch {
    /// Returns true if `catalog` is accepted for a version recorded as `base`.
    #[must_use]
    pub const fn accepts(self, base: u32, catalog: u32) -> bool {
        match self {
            Self::Exact => catalog == base,
            Self::YearBucket => {
                catalog >= base && (catalog as u64) < Self::year_bucket_end(base)
            }
        }
    }

    /// Returns the exclusive upper bound of accepted catalogs for `base`.
    #[must_use]
    pub const fn upper_bound(self, base: u32) -> u64 {
        match self {
            Self::Exact => base as u64 + 1,
            Self::YearBucket => Self::year_bucket_end(base),
        }
    }

    const fn year_bucket_end(base: u32) -> u64 {
        (base as u64 / YEAR_DIVISOR + 1) * YEAR_DIVISOR
    }
}
