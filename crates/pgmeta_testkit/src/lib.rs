//! # pgmeta Testkit
//!
//! Test utilities for pgmeta.
//!
//! This crate provides:
//! - Builders producing version-exact `pg_control` and WAL page bytes
//! - Temporary data directories laid out like a real cluster
//! - Property-based test generators using proptest
//! - Hand-computed test vectors written at literal offsets
//!
//! ## Usage
//!
//! ```rust
//! use pgmeta_core::{read_control, PgVersion};
//! use pgmeta_testkit::prelude::*;
//!
//! let builder = ControlFileBuilder::for_version(PgVersion::V16).timeline(4);
//! let control = read_control(&builder.build()).unwrap();
//! assert_eq!(control, builder.expected());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
