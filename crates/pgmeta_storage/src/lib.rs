//! # pgmeta Storage
//!
//! Read-only byte sources for pgmeta.
//!
//! Backends hand out **opaque bytes**: they know nothing about `pg_control`,
//! WAL page headers or PostgreSQL versions. All format interpretation lives in
//! `pgmeta_core`.
//!
//! ## Design Principles
//!
//! - Backends are read-only (`read_at`, `size`)
//! - No knowledge of PostgreSQL file formats
//! - Must be `Send + Sync` so one source can serve concurrent readers
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and buffers fetched elsewhere
//! - [`FileBackend`] - For files on the local file system
//!
//! ## Example
//!
//! ```rust
//! use pgmeta_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new(b"hello world".to_vec());
//! let data = backend.read_at(6, 5).unwrap();
//! assert_eq!(&data, b"world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
