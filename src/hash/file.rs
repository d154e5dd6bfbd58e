//! File-resident bucket store
//!
//! The table is one binary file of exactly `map_size` records and no
//! header. Bucket `i` lives at byte `i * record_size`. Every access is a
//! positional seek followed by a read or write, so the file is the only
//! copy of the data.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SlotError};
use crate::record::{BucketStatus, RecordLayout};

use super::store::check_index;
use super::BucketStore;

/// Bucket store backed by a record file
#[derive(Debug)]
pub struct FileStore {
    layout: RecordLayout,
    map_size: usize,
    path: PathBuf,
    file: File,
}

impl FileStore {
    /// Create (or truncate) the file at `path` and pre-write `map_size`
    /// empty records.
    ///
    /// If pre-writing fails the handle is closed and the partial file
    /// removed before the error is returned.
    pub fn create(path: &Path, layout: RecordLayout, map_size: usize) -> Result<Self> {
        Self::create_with(path, layout, map_size, Self::initialize)
    }

    /// `create` with the pre-write step supplied by the caller
    fn create_with<F>(
        path: &Path,
        layout: RecordLayout,
        map_size: usize,
        initialize: F,
    ) -> Result<Self>
    where
        F: FnOnce(&File, RecordLayout, usize) -> Result<()>,
    {
        if map_size == 0 {
            return Err(SlotError::InvalidInitialSize(map_size));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| SlotError::FileOpen {
                path: path.to_path_buf(),
                source,
            })?;

        if let Err(e) = initialize(&file, layout, map_size) {
            drop(file);
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::warn!("Failed to remove partial table {}: {}", path.display(), remove_err);
            }
            return Err(e);
        }

        tracing::debug!(
            path = %path.display(),
            map_size,
            record_size = layout.record_size(),
            "Created file store"
        );

        Ok(Self {
            layout,
            map_size,
            path: path.to_path_buf(),
            file,
        })
    }

    /// Reattach to an existing table file without re-initializing it.
    ///
    /// The file must hold exactly `map_size` records of `layout`.
    pub fn open(path: &Path, layout: RecordLayout, map_size: usize) -> Result<Self> {
        if map_size == 0 {
            return Err(SlotError::InvalidInitialSize(map_size));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| SlotError::FileOpen {
                path: path.to_path_buf(),
                source,
            })?;

        let actual = file.metadata().map_err(SlotError::FileRead)?.len();
        let expected = layout.table_size(map_size);
        if actual != expected {
            tracing::warn!(
                path = %path.display(),
                expected,
                actual,
                "Table file does not match dictionary geometry"
            );
            return Err(SlotError::FileSizeMismatch { expected, actual });
        }

        tracing::debug!(path = %path.display(), map_size, "Opened file store");

        Ok(Self {
            layout,
            map_size,
            path: path.to_path_buf(),
            file,
        })
    }

    /// Delete a table file that is not currently open.
    ///
    /// A missing file is not an error.
    pub fn remove(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed table file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SlotError::FileDelete {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write `map_size` empty records from the start of the file
    fn initialize(file: &File, layout: RecordLayout, map_size: usize) -> Result<()> {
        let mut record = layout.scratch()?;
        layout.encode_empty(&mut record);

        let mut writer = BufWriter::new(file);
        for _ in 0..map_size {
            writer.write_all(&record).map_err(SlotError::FileWrite)?;
        }
        writer.flush().map_err(SlotError::FileWrite)?;
        file.sync_all().map_err(SlotError::FileWrite)?;

        Ok(())
    }

    /// Position the shared handle at `offset` bytes into bucket `index`
    fn seek_to(&self, index: usize, offset: usize) -> Result<()> {
        check_index(index, self.map_size)?;
        let position = self.layout.bucket_offset(index) + offset as u64;
        (&self.file)
            .seek(SeekFrom::Start(position))
            .map_err(SlotError::FileSeek)?;
        Ok(())
    }

    fn write_at(&mut self, index: usize, offset: usize, bytes: &[u8]) -> Result<()> {
        self.seek_to(index, offset)?;
        self.file.write_all(bytes).map_err(SlotError::FileWrite)
    }
}

impl BucketStore for FileStore {
    fn layout(&self) -> RecordLayout {
        self.layout
    }

    fn map_size(&self) -> usize {
        self.map_size
    }

    fn read_bucket(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        self.seek_to(index, 0)?;
        (&self.file).read_exact(buf).map_err(SlotError::FileRead)
    }

    fn write_bucket(&mut self, index: usize, buf: &[u8]) -> Result<()> {
        self.write_at(index, 0, buf)
    }

    fn write_status(&mut self, index: usize, status: BucketStatus) -> Result<()> {
        self.write_at(index, 0, &[status.as_byte()])
    }

    fn write_value(&mut self, index: usize, value: &[u8]) -> Result<()> {
        let offset = self.layout.value_offset();
        self.write_at(index, offset, value)
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all().map_err(SlotError::FileWrite)
    }

    fn close(self) -> Result<()> {
        self.file.sync_all().map_err(SlotError::FileClose)?;
        tracing::debug!(path = %self.path.display(), "Closed file store");
        Ok(())
    }

    fn destroy(self) -> Result<()> {
        let path = self.path.clone();
        self.close()?;
        fs::remove_file(&path).map_err(|source| SlotError::FileDelete {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Destroyed file store");
        Ok(())
    }
}
