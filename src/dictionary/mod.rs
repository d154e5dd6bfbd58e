//! Dictionary Module
//!
//! The uniform façade callers use regardless of backend.
//!
//! ## Responsibilities
//! - Validate the config and bind the comparator for the key type
//! - Instantiate the chosen backend (memory or file hash table)
//! - Forward record operations unchanged to the backend
//! - Hand out cursors over the backend
//! - Release (close) or delete storage, after which every operation fails
//!   with `Uninitialized`
//!
//! ## Lifecycle
//! ```text
//!   create / open ──▶ Open ──close──▶ Closed ──delete_dictionary──▶ Deleted
//!                      │                                              ▲
//!                      └──────────── delete_dictionary ───────────────┘
//! ```

mod handler;

use std::fs;

use crate::config::{Backend, DictionaryConfig};
use crate::error::{Result, SlotError};
use crate::hash::{FileHashMap, FileStore, MemoryHashMap};
use crate::key::KeyType;
use crate::query::{Cursor, Predicate};
use crate::record::RecordLayout;

pub use handler::DictionaryHandler;

/// Lifecycle state of a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryStatus {
    /// Backend bound, ready for operations
    Open,

    /// Backend released, storage kept
    Closed,

    /// Backend released, storage deleted
    Deleted,
}

/// A key-value dictionary over one backend instance
///
/// The façade holds no records itself, only the config and the handler.
pub struct Dictionary {
    config: DictionaryConfig,
    status: DictionaryStatus,
    handler: Option<Box<dyn DictionaryHandler>>,
}

impl Dictionary {
    /// Create a fresh, empty dictionary.
    ///
    /// For the file backend this creates `data_dir` if needed and truncates
    /// any existing table file with the same id.
    pub fn create(config: DictionaryConfig) -> Result<Self> {
        config.validate()?;

        let layout = config.layout();
        let handler: Box<dyn DictionaryHandler> = match config.backend {
            Backend::Memory => Box::new(
                MemoryHashMap::in_memory(config.key_type, layout, config.capacity)?
                    .with_write_concern(config.write_concern),
            ),
            Backend::File => {
                fs::create_dir_all(&config.data_dir).map_err(|source| SlotError::FileOpen {
                    path: config.data_dir.clone(),
                    source,
                })?;
                Box::new(
                    FileHashMap::create_file(
                        &config.file_path(),
                        config.key_type,
                        layout,
                        config.capacity,
                    )?
                    .with_write_concern(config.write_concern),
                )
            }
        };

        tracing::debug!(
            id = config.id,
            backend = ?config.backend,
            key_type = ?config.key_type,
            capacity = config.capacity,
            "Created dictionary"
        );

        Ok(Self {
            config,
            status: DictionaryStatus::Open,
            handler: Some(handler),
        })
    }

    /// Reopen a file dictionary created earlier with the same config.
    ///
    /// Memory dictionaries keep nothing to reopen and fail with
    /// `Unsupported`.
    pub fn open(config: DictionaryConfig) -> Result<Self> {
        config.validate()?;

        let handler: Box<dyn DictionaryHandler> = match config.backend {
            Backend::Memory => {
                return Err(SlotError::Unsupported(
                    "memory dictionaries cannot be reopened".to_string(),
                ))
            }
            Backend::File => Box::new(
                FileHashMap::open_file(
                    &config.file_path(),
                    config.key_type,
                    config.layout(),
                    config.capacity,
                )?
                .with_write_concern(config.write_concern),
            ),
        };

        tracing::debug!(id = config.id, "Opened dictionary");

        Ok(Self {
            config,
            status: DictionaryStatus::Open,
            handler: Some(handler),
        })
    }

    /// Delete the storage of a dictionary that is not open.
    ///
    /// A missing table file is not an error.
    pub fn destroy_by_id(config: &DictionaryConfig) -> Result<()> {
        match config.backend {
            Backend::Memory => Ok(()),
            Backend::File => FileStore::remove(&config.file_path()),
        }
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Insert a record under the configured write concern
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<usize> {
        self.handler_mut()?.insert(key, value)
    }

    /// Copy the value stored under `key` into `value_out`
    pub fn get(&self, key: &[u8], value_out: &mut [u8]) -> Result<usize> {
        self.handler()?.get(key, value_out)
    }

    /// Owned copy of the value stored under `key`
    pub fn fetch(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut value = vec![0u8; self.config.value_size];
        self.get(key, &mut value)?;
        Ok(value)
    }

    /// Upsert a record
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<usize> {
        self.handler_mut()?.update(key, value)
    }

    /// Delete the record stored under `key`
    pub fn delete(&mut self, key: &[u8]) -> Result<usize> {
        self.handler_mut()?.remove(key)
    }

    /// Open a cursor over the records matching `predicate`
    pub fn find(&self, predicate: &Predicate) -> Result<Cursor<'_>> {
        self.handler()?.find(predicate)
    }

    /// Flush pending writes of the backend
    pub fn sync(&mut self) -> Result<()> {
        self.handler_mut()?.sync()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the backend and keep its storage. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(handler) = self.handler.take() else {
            return Ok(());
        };

        self.status = DictionaryStatus::Closed;
        tracing::debug!(id = self.config.id, "Closing dictionary");
        handler.close()
    }

    /// Release the backend and delete its storage
    pub fn delete_dictionary(&mut self) -> Result<()> {
        let result = match (self.handler.take(), self.status) {
            (Some(handler), _) => handler.destroy(),
            (None, DictionaryStatus::Closed) => Self::destroy_by_id(&self.config),
            (None, _) => return Err(SlotError::Uninitialized),
        };

        self.status = DictionaryStatus::Deleted;
        tracing::debug!(id = self.config.id, "Deleted dictionary");
        result
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> u32 {
        self.config.id
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    pub fn key_type(&self) -> KeyType {
        self.config.key_type
    }

    pub fn layout(&self) -> RecordLayout {
        self.config.layout()
    }

    pub fn status(&self) -> DictionaryStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.handler.is_some()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn handler(&self) -> Result<&dyn DictionaryHandler> {
        self.handler.as_deref().ok_or(SlotError::Uninitialized)
    }

    fn handler_mut(&mut self) -> Result<&mut (dyn DictionaryHandler + 'static)> {
        self.handler.as_deref_mut().ok_or(SlotError::Uninitialized)
    }
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("config", &self.config)
            .field("status", &self.status)
            .finish()
    }
}
