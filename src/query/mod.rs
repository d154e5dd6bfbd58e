//! Query Module
//!
//! Predicates and pull-based cursors over a hash table.
//!
//! ## Cursor Protocol
//! ```text
//!   Uninitialized ──open──▶ Initialized ──next──▶ Active ──next──▶ ... ──▶ EndOfResults
//!        │                                                                       ▲
//!        └──────────── open (no match) ──────────────────────────────────────────┘
//!
//!   any state ── I/O failure ──▶ Invalid
//! ```
//!
//! A scan walks buckets in index order from the cursor's position and wraps
//! around once. `Empty` and `Deleted` buckets are skipped; `InUse` buckets
//! are tested against the predicate.
//!
//! ## Mutation
//! A [`Cursor`] holds a shared borrow of the table it scans, so the table
//! cannot be modified, closed or deleted while the cursor is alive.

mod cursor;
mod predicate;

use std::cmp::Ordering;

use crate::error::Result;
use crate::record::RecordLayout;

pub use cursor::{Cursor, CursorStatus, Records};
pub use predicate::Predicate;

/// Read-only bucket access a cursor needs from a backend
pub trait ScanSource {
    fn layout(&self) -> RecordLayout;

    fn map_size(&self) -> usize;

    /// The comparator bound to the backend's key type
    fn compare(&self, first: &[u8], second: &[u8]) -> Ordering;

    /// Bucket holding `key`, or `ItemNotFound`
    fn find_location(&self, key: &[u8]) -> Result<usize>;

    /// Copy raw bucket `index` into `buf`
    fn read_bucket(&self, index: usize, buf: &mut [u8]) -> Result<()>;
}
