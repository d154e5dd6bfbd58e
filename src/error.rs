//! Error types for slotkv
//!
//! Provides a unified error type for all dictionary, engine and cursor
//! operations. Expected outcomes (`ItemNotFound`, `DuplicateKey`,
//! `MaxCapacity`) share the enum with genuine failures; use
//! [`SlotError::is_recoverable`] to tell them apart.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using SlotError
pub type Result<T> = std::result::Result<T, SlotError>;

/// Unified error type for slotkv operations
#[derive(Debug, Error)]
pub enum SlotError {
    // -------------------------------------------------------------------------
    // Creation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid initial size: capacity must be greater than zero (got {0})")]
    InvalidInitialSize(usize),

    #[error("Invalid key type tag: {0}")]
    InvalidKeyType(u8),

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Record Outcomes
    // -------------------------------------------------------------------------
    #[error("Duplicate key")]
    DuplicateKey,

    #[error("Write concern violation")]
    WriteConcernViolation,

    #[error("Item not found")]
    ItemNotFound,

    #[error("Hash table is at maximum capacity")]
    MaxCapacity,

    #[error("Key size mismatch: expected {expected} bytes, got {actual}")]
    KeySizeMismatch { expected: usize, actual: usize },

    #[error("Value size mismatch: expected {expected} bytes, got {actual}")]
    ValueSizeMismatch { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Resource Errors
    // -------------------------------------------------------------------------
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File seek failed: {0}")]
    FileSeek(#[source] io::Error),

    #[error("File read failed: {0}")]
    FileRead(#[source] io::Error),

    #[error("File write failed: {0}")]
    FileWrite(#[source] io::Error),

    #[error("File close failed: {0}")]
    FileClose(#[source] io::Error),

    #[error("Failed to delete {path}: {source}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File size mismatch: expected {expected} bytes, found {actual}")]
    FileSizeMismatch { expected: u64, actual: u64 },

    #[error("Bucket {index} out of range for a table of {map_size} buckets")]
    BucketOutOfRange { index: usize, map_size: usize },

    #[error("Corrupt bucket {index}: unknown status byte {status:#04x}")]
    CorruptBucket { index: usize, status: u8 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Dictionary is not initialized")]
    Uninitialized,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl SlotError {
    /// True for the outcomes callers are expected to branch on rather than
    /// treat as failures.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SlotError::ItemNotFound | SlotError::DuplicateKey | SlotError::MaxCapacity
        )
    }
}

impl From<std::collections::TryReserveError> for SlotError {
    fn from(err: std::collections::TryReserveError) -> Self {
        SlotError::OutOfMemory(err.to_string())
    }
}

impl From<bincode::Error> for SlotError {
    fn from(err: bincode::Error) -> Self {
        SlotError::Serialization(err.to_string())
    }
}
