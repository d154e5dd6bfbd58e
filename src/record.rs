//! Record slot layout
//!
//! One bucket of the hash table, in memory or on disk, is a fixed-size
//! record:
//!
//! ```text
//! ┌───────────┬────────────────────┬──────────────────────┐
//! │Status (1) │ Key (key_size)     │ Value (value_size)   │
//! └───────────┴────────────────────┴──────────────────────┘
//! ```
//!
//! The same encode/decode pair is used for the memory buffer and for file
//! reads and writes, so the probing code never sees the medium.

use crate::error::{Result, SlotError};

/// Size of the status byte that prefixes every record
pub const STATUS_SIZE: usize = 1;

/// Occupancy state of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BucketStatus {
    /// Never written since creation; terminates a probe chain
    Empty = 0xFF,

    /// Tombstone: reusable by inserts, skipped by lookups
    Deleted = 0xFE,

    /// Holds a live key/value pair
    InUse = 0xFD,
}

impl BucketStatus {
    /// Decode a status byte read from bucket `index`
    pub fn from_byte(index: usize, status: u8) -> Result<Self> {
        match status {
            0xFF => Ok(BucketStatus::Empty),
            0xFE => Ok(BucketStatus::Deleted),
            0xFD => Ok(BucketStatus::InUse),
            other => Err(SlotError::CorruptBucket {
                index,
                status: other,
            }),
        }
    }

    /// The on-disk sentinel for this status
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Key and value widths shared by every record of one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub key_size: usize,
    pub value_size: usize,
}

impl RecordLayout {
    pub fn new(key_size: usize, value_size: usize) -> Self {
        Self {
            key_size,
            value_size,
        }
    }

    /// Bytes per bucket: status + key + value
    pub fn record_size(&self) -> usize {
        STATUS_SIZE + self.key_size + self.value_size
    }

    /// Offset of the key inside a record
    pub fn key_offset(&self) -> usize {
        STATUS_SIZE
    }

    /// Offset of the value inside a record
    pub fn value_offset(&self) -> usize {
        STATUS_SIZE + self.key_size
    }

    /// Byte offset of bucket `index` from the start of the table
    pub fn bucket_offset(&self, index: usize) -> u64 {
        index as u64 * self.record_size() as u64
    }

    /// Total bytes needed for `map_size` buckets
    pub fn table_size(&self, map_size: usize) -> u64 {
        self.bucket_offset(map_size)
    }

    pub fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.key_size {
            return Err(SlotError::KeySizeMismatch {
                expected: self.key_size,
                actual: key.len(),
            });
        }
        Ok(())
    }

    pub fn check_value(&self, value: &[u8]) -> Result<()> {
        if value.len() != self.value_size {
            return Err(SlotError::ValueSizeMismatch {
                expected: self.value_size,
                actual: value.len(),
            });
        }
        Ok(())
    }

    /// Allocate a zeroed buffer of one record
    pub fn scratch(&self) -> Result<Vec<u8>> {
        zeroed(self.record_size())
    }

    /// Serialize a bucket into `out` (exactly one record long)
    pub fn encode(&self, status: BucketStatus, key: &[u8], value: &[u8], out: &mut [u8]) {
        out[0] = status.as_byte();
        out[self.key_offset()..self.value_offset()].copy_from_slice(key);
        out[self.value_offset()..self.record_size()].copy_from_slice(value);
    }

    /// Serialize an empty bucket into `out`
    pub fn encode_empty(&self, out: &mut [u8]) {
        out.fill(0);
        out[0] = BucketStatus::Empty.as_byte();
    }

    /// Borrowing view over a raw record read from bucket `index`
    pub fn decode<'a>(&self, index: usize, raw: &'a [u8]) -> Result<BucketView<'a>> {
        let status = BucketStatus::from_byte(index, raw[0])?;
        Ok(BucketView {
            status,
            key: &raw[self.key_offset()..self.value_offset()],
            value: &raw[self.value_offset()..self.record_size()],
        })
    }
}

/// A decoded bucket borrowing its bytes from a scratch buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketView<'a> {
    pub status: BucketStatus,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl BucketView<'_> {
    pub fn is_in_use(&self) -> bool {
        self.status == BucketStatus::InUse
    }
}

/// An owned key/value pair handed out by queries and cursors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Record {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A zero-filled record sized for `layout`
    pub fn with_layout(layout: RecordLayout) -> Self {
        Self {
            key: vec![0; layout.key_size],
            value: vec![0; layout.value_size],
        }
    }

    /// Overwrite this record from a bucket view, reusing the allocations
    pub(crate) fn fill_from(&mut self, bucket: &BucketView<'_>) {
        self.key.clear();
        self.key.extend_from_slice(bucket.key);
        self.value.clear();
        self.value.extend_from_slice(bucket.value);
    }
}

/// Fallible zeroed allocation; reports `OutOfMemory` instead of aborting
pub(crate) fn zeroed(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(buf)
}
