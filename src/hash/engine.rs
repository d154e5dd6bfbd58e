//! Open-addressing engine
//!
//! Linear probing with wraparound over any [`BucketStore`].

use std::cmp::Ordering;
use std::path::Path;

use crate::error::{Result, SlotError};
use crate::key::{CompareFn, KeyType};
use crate::query::ScanSource;
use crate::record::{BucketStatus, RecordLayout};

use super::{default_hasher, BucketStore, FileStore, KeyHasher, MemoryStore, WriteConcern};

/// Hash table held entirely in memory
pub type MemoryHashMap = OpenHashMap<MemoryStore>;

/// Hash table held in a record file
pub type FileHashMap = OpenHashMap<FileStore>;

/// Open-addressing hash table
///
/// ## Probe Rules
/// - Home bucket: `hasher.bucket_for(key, map_size) mod map_size`
/// - Step: `loc = (loc + 1) mod map_size`, at most `map_size` buckets
/// - `Empty` ends a lookup; `Deleted` is skipped by lookups and reused by
///   inserts
/// - Deletes only flip the status byte, never move other records
pub struct OpenHashMap<S: BucketStore> {
    /// Medium holding the buckets
    store: S,

    /// Declared key type (selects `compare`)
    key_type: KeyType,

    /// Bound once at construction
    compare: CompareFn,

    /// Bound once at construction
    hasher: Box<dyn KeyHasher>,

    /// Behaviour of `insert` on an existing key
    write_concern: WriteConcern,
}

impl<S: BucketStore> OpenHashMap<S> {
    /// Wrap a store with the default hasher for `key_type`
    pub fn new(store: S, key_type: KeyType) -> Self {
        Self::with_hasher(store, key_type, default_hasher(key_type))
    }

    /// Wrap a store with a caller-supplied hasher
    pub fn with_hasher(store: S, key_type: KeyType, hasher: Box<dyn KeyHasher>) -> Self {
        Self {
            store,
            key_type,
            compare: key_type.comparator(),
            hasher,
            write_concern: WriteConcern::default(),
        }
    }

    /// Set the write concern (builder style)
    pub fn with_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = write_concern;
        self
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Insert a record under the current write concern.
    ///
    /// Returns the number of records written (1).
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<usize> {
        self.insert_with(key, value, self.write_concern)
    }

    /// Upsert: overwrite the value if the key exists, insert it otherwise
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<usize> {
        self.insert_with(key, value, WriteConcern::Update)
    }

    /// Index of the bucket holding `key`, or `ItemNotFound`
    pub fn find_location(&self, key: &[u8]) -> Result<usize> {
        let layout = self.layout();
        layout.check_key(key)?;

        let map_size = self.map_size();
        let mut loc = self.location(key);
        let mut buf = layout.scratch()?;

        for _ in 0..map_size {
            self.store.read_bucket(loc, &mut buf)?;
            let bucket = layout.decode(loc, &buf)?;
            tracing::trace!(loc, status = ?bucket.status, "Lookup probe");

            match bucket.status {
                // An empty bucket proves the key was never placed on this chain
                BucketStatus::Empty => return Err(SlotError::ItemNotFound),
                BucketStatus::InUse if (self.compare)(bucket.key, key).is_eq() => {
                    return Ok(loc);
                }
                _ => {}
            }

            loc = (loc + 1) % map_size;
        }

        Err(SlotError::ItemNotFound)
    }

    /// Tombstone the bucket holding `key`
    pub fn delete(&mut self, key: &[u8]) -> Result<usize> {
        let loc = self.find_location(key)?;
        self.store.write_status(loc, BucketStatus::Deleted)?;
        tracing::trace!(loc, "Deleted bucket");
        Ok(1)
    }

    /// Copy the value stored under `key` into `value_out`
    pub fn query(&self, key: &[u8], value_out: &mut [u8]) -> Result<usize> {
        let layout = self.layout();
        layout.check_value(value_out)?;

        let loc = self.find_location(key)?;
        let mut buf = layout.scratch()?;
        self.store.read_bucket(loc, &mut buf)?;
        value_out.copy_from_slice(layout.decode(loc, &buf)?.value);

        Ok(1)
    }

    /// Owned copy of the value stored under `key`
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut value = vec![0u8; self.layout().value_size];
        self.query(key, &mut value)?;
        Ok(value)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Home bucket of `key`, always in `[0, map_size)` whatever the hasher
    /// returns
    pub fn location(&self, key: &[u8]) -> usize {
        let map_size = self.map_size();
        self.hasher.bucket_for(key, map_size) % map_size
    }

    /// Status of bucket `index`; `BucketOutOfRange` past the end
    pub fn bucket_status(&self, index: usize) -> Result<BucketStatus> {
        let layout = self.layout();
        let mut buf = layout.scratch()?;
        self.store.read_bucket(index, &mut buf)?;
        Ok(layout.decode(index, &buf)?.status)
    }

    /// Number of live records (full scan)
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for index in 0..self.map_size() {
            if self.bucket_status(index)? == BucketStatus::InUse {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn map_size(&self) -> usize {
        self.store.map_size()
    }

    pub fn layout(&self) -> RecordLayout {
        self.store.layout()
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn write_concern(&self) -> WriteConcern {
        self.write_concern
    }

    pub fn set_write_concern(&mut self, write_concern: WriteConcern) {
        self.write_concern = write_concern;
    }

    /// The underlying bucket store
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }

    /// Release the table, keeping persistent storage
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    /// Release the table and delete persistent storage
    pub fn destroy(self) -> Result<()> {
        self.store.destroy()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Probe for `key` and write it under `concern`.
    ///
    /// The first tombstone on the chain is remembered but only claimed once
    /// the probe reaches an `Empty` bucket or completes a lap, so a key that
    /// lives past a tombstone is found rather than stored twice.
    fn insert_with(&mut self, key: &[u8], value: &[u8], concern: WriteConcern) -> Result<usize> {
        let layout = self.layout();
        layout.check_key(key)?;
        layout.check_value(value)?;

        let map_size = self.map_size();
        let mut loc = self.location(key);
        let mut buf = layout.scratch()?;
        let mut target: Option<usize> = None;

        for _ in 0..map_size {
            self.store.read_bucket(loc, &mut buf)?;
            let bucket = layout.decode(loc, &buf)?;
            tracing::trace!(loc, status = ?bucket.status, "Insert probe");

            match bucket.status {
                BucketStatus::InUse => {
                    if (self.compare)(bucket.key, key).is_eq() {
                        return match concern {
                            WriteConcern::InsertUnique => Err(SlotError::DuplicateKey),
                            WriteConcern::Update => {
                                self.store.write_value(loc, value)?;
                                Ok(1)
                            }
                        };
                    }
                }
                BucketStatus::Deleted => {
                    if target.is_none() {
                        target = Some(loc);
                    }
                }
                BucketStatus::Empty => {
                    if target.is_none() {
                        target = Some(loc);
                    }
                    break;
                }
            }

            loc = (loc + 1) % map_size;
        }

        let Some(target) = target else {
            tracing::warn!(map_size, "Hash table full, insert not done");
            return Err(SlotError::MaxCapacity);
        };

        layout.encode(BucketStatus::InUse, key, value, &mut buf);
        self.store.write_bucket(target, &buf)?;
        tracing::trace!(loc = target, "Inserted bucket");

        Ok(1)
    }
}

impl MemoryHashMap {
    /// Allocate an in-memory table of `map_size` empty buckets
    pub fn in_memory(key_type: KeyType, layout: RecordLayout, map_size: usize) -> Result<Self> {
        Ok(Self::new(MemoryStore::new(layout, map_size)?, key_type))
    }
}

impl FileHashMap {
    /// Create (or truncate) a table file of `map_size` empty buckets
    pub fn create_file(
        path: &Path,
        key_type: KeyType,
        layout: RecordLayout,
        map_size: usize,
    ) -> Result<Self> {
        Ok(Self::new(FileStore::create(path, layout, map_size)?, key_type))
    }

    /// Reattach to an existing table file
    pub fn open_file(
        path: &Path,
        key_type: KeyType,
        layout: RecordLayout,
        map_size: usize,
    ) -> Result<Self> {
        Ok(Self::new(FileStore::open(path, layout, map_size)?, key_type))
    }
}

impl<S: BucketStore> ScanSource for OpenHashMap<S> {
    fn layout(&self) -> RecordLayout {
        self.store.layout()
    }

    fn map_size(&self) -> usize {
        self.store.map_size()
    }

    fn compare(&self, first: &[u8], second: &[u8]) -> Ordering {
        (self.compare)(first, second)
    }

    fn find_location(&self, key: &[u8]) -> Result<usize> {
        OpenHashMap::find_location(self, key)
    }

    fn read_bucket(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        self.store.read_bucket(index, buf)
    }
}

impl<S: BucketStore + std::fmt::Debug> std::fmt::Debug for OpenHashMap<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenHashMap")
            .field("store", &self.store)
            .field("key_type", &self.key_type)
            .field("hasher", &self.hasher)
            .field("write_concern", &self.write_concern)
            .finish()
    }
}
