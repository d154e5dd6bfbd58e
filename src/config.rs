//! Configuration for slotkv dictionaries
//!
//! Everything `Dictionary::create` needs, with sensible defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::hash::WriteConcern;
use crate::key::KeyType;
use crate::record::RecordLayout;

/// Extension of table files written by the file backend
pub const TABLE_FILE_EXTENSION: &str = "oaf";

/// Where a dictionary keeps its buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Backend {
    /// One heap buffer; gone when the dictionary is dropped
    Memory = 0,

    /// One record file per dictionary: `{data_dir}/{id}.oaf`
    File = 1,
}

impl TryFrom<u8> for Backend {
    type Error = SlotError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Backend::Memory),
            1 => Ok(Backend::File),
            other => Err(SlotError::Config(format!("Unknown backend tag: {}", other))),
        }
    }
}

impl From<Backend> for u8 {
    fn from(backend: Backend) -> Self {
        backend as u8
    }
}

/// Creation parameters of one dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------
    /// Dictionary id; names the table file of the file backend
    pub id: u32,

    // -------------------------------------------------------------------------
    // Record Shape
    // -------------------------------------------------------------------------
    /// Selects the comparator and default hash
    pub key_type: KeyType,

    /// Key width in bytes (fixed for the instance)
    pub key_size: usize,

    /// Value width in bytes (fixed for the instance)
    pub value_size: usize,

    // -------------------------------------------------------------------------
    // Table Configuration
    // -------------------------------------------------------------------------
    /// Bucket count (fixed for the instance)
    pub capacity: usize,

    /// Memory or file
    pub backend: Backend,

    /// Behaviour of insert on an existing key
    pub write_concern: WriteConcern,

    /// Directory holding table files (file backend only)
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {id}.oaf         (one per file dictionary)
    ///     └── slotkv_mt.tbl    (master table, when used)
    pub data_dir: PathBuf,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            id: 0,
            key_type: KeyType::SignedNumeric,
            key_size: 4,
            value_size: 4,
            capacity: 64,
            backend: Backend::Memory,
            write_concern: WriteConcern::InsertUnique,
            data_dir: PathBuf::from("./slotkv_data"),
        }
    }
}

impl DictionaryConfig {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations no backend can honour
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SlotError::InvalidInitialSize(self.capacity));
        }
        if self.key_size == 0 {
            return Err(SlotError::Config("key_size must be at least 1 byte".to_string()));
        }
        Ok(())
    }

    /// Record shape derived from the key and value widths
    pub fn layout(&self) -> RecordLayout {
        RecordLayout::new(self.key_size, self.value_size)
    }

    /// Table file of the file backend: `{data_dir}/{id}.oaf`
    pub fn file_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", self.id, TABLE_FILE_EXTENSION))
    }
}

/// Builder for DictionaryConfig
#[derive(Default)]
pub struct ConfigBuilder {
    config: DictionaryConfig,
}

impl ConfigBuilder {
    /// Set the dictionary id
    pub fn id(mut self, id: u32) -> Self {
        self.config.id = id;
        self
    }

    /// Set the key type
    pub fn key_type(mut self, key_type: KeyType) -> Self {
        self.config.key_type = key_type;
        self
    }

    /// Set the key width (in bytes)
    pub fn key_size(mut self, size: usize) -> Self {
        self.config.key_size = size;
        self
    }

    /// Set the value width (in bytes)
    pub fn value_size(mut self, size: usize) -> Self {
        self.config.value_size = size;
        self
    }

    /// Set the bucket count
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the backend
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the write concern
    pub fn write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.config.write_concern = write_concern;
        self
    }

    /// Set the data directory (file backend)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn build(self) -> DictionaryConfig {
        self.config
    }
}
