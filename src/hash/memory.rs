//! In-memory bucket store
//!
//! All buckets packed into one contiguous `Vec<u8>`.

use crate::error::{Result, SlotError};
use crate::record::{zeroed, BucketStatus, RecordLayout};

use super::store::check_index;
use super::BucketStore;

/// Bucket store backed by a single heap buffer
#[derive(Debug)]
pub struct MemoryStore {
    layout: RecordLayout,
    map_size: usize,
    entries: Vec<u8>,
}

impl MemoryStore {
    /// Allocate `map_size` buckets, all `Empty`
    pub fn new(layout: RecordLayout, map_size: usize) -> Result<Self> {
        if map_size == 0 {
            return Err(SlotError::InvalidInitialSize(map_size));
        }

        let total = usize::try_from(layout.table_size(map_size))
            .map_err(|_| SlotError::OutOfMemory(format!("{} buckets", map_size)))?;
        let mut entries = zeroed(total)?;

        for record in entries.chunks_exact_mut(layout.record_size()) {
            layout.encode_empty(record);
        }

        tracing::debug!(map_size, record_size = layout.record_size(), "Allocated memory store");

        Ok(Self {
            layout,
            map_size,
            entries,
        })
    }

    /// Byte range of bucket `index`
    fn span(&self, index: usize) -> Result<std::ops::Range<usize>> {
        check_index(index, self.map_size)?;
        let start = index * self.layout.record_size();
        Ok(start..start + self.layout.record_size())
    }
}

impl BucketStore for MemoryStore {
    fn layout(&self) -> RecordLayout {
        self.layout
    }

    fn map_size(&self) -> usize {
        self.map_size
    }

    fn read_bucket(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(&self.entries[self.span(index)?]);
        Ok(())
    }

    fn write_bucket(&mut self, index: usize, buf: &[u8]) -> Result<()> {
        let span = self.span(index)?;
        self.entries[span].copy_from_slice(buf);
        Ok(())
    }

    fn write_status(&mut self, index: usize, status: BucketStatus) -> Result<()> {
        let start = self.span(index)?.start;
        self.entries[start] = status.as_byte();
        Ok(())
    }

    fn write_value(&mut self, index: usize, value: &[u8]) -> Result<()> {
        let start = self.span(index)?.start + self.layout.value_offset();
        self.entries[start..start + self.layout.value_size].copy_from_slice(value);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }

    fn destroy(self) -> Result<()> {
        tracing::debug!(map_size = self.map_size, "Released memory store");
        Ok(())
    }
}
