//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use bytes::Bytes;

/// An in-memory byte source.
///
/// Useful for:
/// - Unit and integration tests
/// - Buffers already fetched by another layer (remote or object storage)
///
/// Cloning is cheap; clones share the same buffer.
///
/// # Example
///
/// ```rust
/// use pgmeta_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new(b"test data".to_vec());
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    data: Bytes,
}

impl InMemoryBackend {
    /// Creates a backend over the given bytes.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the underlying buffer.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.data.len() as u64;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start.saturating_add(len);

        if offset > size || end > self.data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(self.data[start..end].to_vec())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_empty() {
        let backend = InMemoryBackend::default();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.data().is_empty());
    }

    #[test]
    fn memory_read_at_returns_correct_data() {
        let backend = InMemoryBackend::new(b"hello world".to_vec());

        assert_eq!(backend.read_at(0, 5).unwrap(), b"hello");
        assert_eq!(backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn memory_read_at_past_end_fails() {
        let backend = InMemoryBackend::new(b"hello".to_vec());

        let result = backend.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn memory_read_at_extending_past_end_fails() {
        let backend = InMemoryBackend::new(b"hello".to_vec());

        let result = backend.read_at(3, 10);
        assert!(matches!(
            result,
            Err(StorageError::ReadPastEnd {
                offset: 3,
                len: 10,
                size: 5
            })
        ));
    }

    #[test]
    fn memory_empty_read() {
        let backend = InMemoryBackend::new(b"hello".to_vec());
        assert!(backend.read_at(2, 0).unwrap().is_empty());
    }

    #[test]
    fn memory_read_prefix_caps_at_size() {
        let backend = InMemoryBackend::new(b"short".to_vec());
        assert_eq!(backend.read_prefix(8192).unwrap(), b"short");
        assert_eq!(backend.read_prefix(3).unwrap(), b"sho");
    }

    proptest::proptest! {
        #[test]
        fn memory_read_at_matches_slice(
            data in proptest::collection::vec(proptest::num::u8::ANY, 0..256),
            offset in 0usize..300,
            len in 0usize..300,
        ) {
            let backend = InMemoryBackend::new(data.clone());
            let result = backend.read_at(offset as u64, len);
            if offset + len <= data.len() {
                proptest::prop_assert_eq!(result.unwrap(), data[offset..offset + len].to_vec());
            } else {
                proptest::prop_assert!(result.is_err());
            }
        }
    }

    #[test]
    fn memory_clones_share_buffer() {
        let backend = InMemoryBackend::new(vec![7u8; 64]);
        let clone = backend.clone();
        assert_eq!(clone.data().as_ptr(), backend.data().as_ptr());
    }
}
