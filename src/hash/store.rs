//! Bucket storage abstraction
//!
//! The medium a hash table lives on. Buckets are addressed by index; every
//! transfer is a whole record or a fixed slice of one.

use crate::error::{Result, SlotError};
use crate::record::{BucketStatus, RecordLayout};

/// Fixed-capacity array of records
pub trait BucketStore {
    /// Key/value widths of every record
    fn layout(&self) -> RecordLayout;

    /// Number of buckets (fixed for the lifetime of the store)
    fn map_size(&self) -> usize;

    /// Copy bucket `index` into `buf` (one record long)
    fn read_bucket(&self, index: usize, buf: &mut [u8]) -> Result<()>;

    /// Overwrite bucket `index` with `buf` (one record long)
    fn write_bucket(&mut self, index: usize, buf: &[u8]) -> Result<()>;

    /// Overwrite only the status byte of bucket `index`
    fn write_status(&mut self, index: usize, status: BucketStatus) -> Result<()>;

    /// Overwrite only the value bytes of bucket `index`
    fn write_value(&mut self, index: usize, value: &[u8]) -> Result<()>;

    /// Push buffered writes down to the medium
    fn sync(&mut self) -> Result<()>;

    /// Release the store, keeping any persistent data
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Release the store and delete any persistent data
    fn destroy(self) -> Result<()>
    where
        Self: Sized;
}

/// `BucketOutOfRange` unless `index < map_size`
pub(crate) fn check_index(index: usize, map_size: usize) -> Result<()> {
    if index >= map_size {
        return Err(SlotError::BucketOutOfRange { index, map_size });
    }
    Ok(())
}
