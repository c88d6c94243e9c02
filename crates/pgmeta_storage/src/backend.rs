//! Storage backend trait definition.

use crate::error::StorageResult;

/// A read-only byte source.
///
/// Backends supply the raw bytes of a `pg_control` file or a WAL segment.
/// They do not fetch more than asked, cache, or retry; a failed read is
/// reported to the caller as-is.
///
/// # Invariants
///
/// - `read_at` returns exactly `len` bytes or an error
/// - `size` is stable for the lifetime of the backend
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For local files
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Returns the size of the source in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Reads from the start of the source, at most `max_len` bytes.
    ///
    /// Shorter sources return everything they hold. Control files and WAL
    /// pages are read this way so that a short file surfaces as a truncated
    /// header rather than an I/O error.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined or the read fails.
    fn read_prefix(&self, max_len: usize) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        let len = usize::try_from(size).map_or(max_len, |size| size.min(max_len));
        self.read_at(0, len)
    }
}
