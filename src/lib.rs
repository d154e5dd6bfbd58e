//! # slotkv
//!
//! An embedded key-value dictionary built on open-addressing hash tables:
//! - Fixed-width keys and values, one record per bucket
//! - Linear probing with tombstone deletes
//! - Interchangeable memory and file backends behind one façade
//! - Predicate cursors (equality, inclusive range, all records)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dictionary                             │
//! │         (create / insert / get / update / delete / find)     │
//! └─────────────────────┬────────────────────────┬──────────────┘
//!                       │                        │
//!                       ▼                        ▼
//!          ┌───────────────────────┐    ┌─────────────────┐
//!          │   OpenHashMap<S>      │◀───│  Cursor         │
//!          │  (probe / tombstone)  │    │  (Predicate)    │
//!          └───────────┬───────────┘    └─────────────────┘
//!                      │ BucketStore
//!          ┌───────────┴────────────┐
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryStore │          │  FileStore  │
//!   │  (Vec<u8>)  │          │  ({id}.oaf) │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! A [`MasterTable`] records the config of every dictionary created through
//! it, so file dictionaries can be reopened by id.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod record;
pub mod hash;
pub mod query;
pub mod dictionary;
pub mod master_table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SlotError};
pub use config::{Backend, ConfigBuilder, DictionaryConfig};
pub use key::{CompareFn, KeyType};
pub use record::{BucketStatus, Record, RecordLayout};
pub use hash::{FileHashMap, MemoryHashMap, OpenHashMap, WriteConcern};
pub use query::{Cursor, CursorStatus, Predicate};
pub use dictionary::{Dictionary, DictionaryStatus};
pub use master_table::MasterTable;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slotkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
