//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A read-only file backend.
///
/// The file is opened once; reads seek and read under an internal lock so the
/// backend can be shared across threads. The size is captured at open time.
///
/// # Example
///
/// ```no_run
/// use pgmeta_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("global/pg_control")).unwrap();
/// let header = backend.read_prefix(8192).unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: Mutex<File>,
    size: u64,
}

impl FileBackend {
    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the file cannot be opened and
    /// [`StorageError::Io`] if its metadata cannot be read.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let size = file.metadata()?.len();
        tracing::debug!(path = %path.display(), size, "opened file backend");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            size,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.size;
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.size)
    }
}
