//! Cursor implementation
//!
//! Walks the bucket array of one [`ScanSource`] and hands out the records
//! whose keys satisfy an owned [`Predicate`].

use crate::error::{Result, SlotError};
use crate::record::Record;

use super::{Predicate, ScanSource};

/// State of a cursor after its last call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorStatus {
    /// Not yet positioned
    Uninitialized,

    /// Positioned on the first match, nothing handed out yet
    Initialized,

    /// The last `next` produced a record
    Active,

    /// No further matches; `next` keeps returning this
    EndOfResults,

    /// A read failed mid-scan; the cursor cannot continue
    Invalid,
}

/// Pull-based iteration over the records matching a predicate
///
/// ## Scan Window
/// - `first`: bucket the lap started from; reaching it again ends the scan
/// - `current`: bucket of the record most recently found
///
/// Equality cursors start at the key's own bucket (found by probing), so
/// the lap covers the rest of the table once. Range and all-records cursors
/// start at bucket 0 with no current bucket, so the lap covers every bucket.
pub struct Cursor<'a> {
    source: &'a dyn ScanSource,
    predicate: Predicate,
    first: usize,
    current: Option<usize>,
    status: CursorStatus,
    scratch: Vec<u8>,
}

impl<'a> Cursor<'a> {
    /// Bind a cursor to `source`, taking its own copy of `predicate`
    pub fn open(source: &'a dyn ScanSource, predicate: &Predicate) -> Result<Self> {
        let layout = source.layout();
        predicate.validate(layout.key_size)?;

        let mut cursor = Self {
            source,
            predicate: predicate.try_clone()?,
            first: 0,
            current: None,
            status: CursorStatus::Uninitialized,
            scratch: layout.scratch()?,
        };

        if let Predicate::Equality { key } = &cursor.predicate {
            match source.find_location(key) {
                Ok(location) => {
                    cursor.first = location;
                    cursor.current = Some(location);
                    cursor.status = CursorStatus::Initialized;
                }
                // An empty result set is not an error
                Err(SlotError::ItemNotFound) => cursor.status = CursorStatus::EndOfResults,
                Err(e) => return Err(e),
            }
        } else {
            cursor.status = if cursor.scan()? {
                CursorStatus::Initialized
            } else {
                CursorStatus::EndOfResults
            };
        }

        tracing::trace!(status = ?cursor.status, first = cursor.first, "Opened cursor");

        Ok(cursor)
    }

    /// Advance and copy the next matching record into `record`.
    ///
    /// Returns `Active` when `record` was filled. `Uninitialized`,
    /// `EndOfResults` and `Invalid` are returned unchanged on every further
    /// call. A read failure moves the cursor to `Invalid` and is returned as
    /// the error.
    pub fn next(&mut self, record: &mut Record) -> Result<CursorStatus> {
        match self.status {
            CursorStatus::Uninitialized | CursorStatus::EndOfResults | CursorStatus::Invalid => {
                return Ok(self.status);
            }
            CursorStatus::Initialized => {
                self.status = CursorStatus::Active;
            }
            CursorStatus::Active => match self.scan() {
                Ok(true) => {}
                Ok(false) => {
                    self.status = CursorStatus::EndOfResults;
                    return Ok(self.status);
                }
                Err(e) => {
                    self.status = CursorStatus::Invalid;
                    return Err(e);
                }
            },
        }

        if let Err(e) = self.materialize(record) {
            self.status = CursorStatus::Invalid;
            return Err(e);
        }

        Ok(self.status)
    }

    /// Status after the last call
    pub fn status(&self) -> CursorStatus {
        self.status
    }

    /// The cursor's own copy of its predicate
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Iterate the remaining matches as owned records
    pub fn records(&mut self) -> Records<'_, 'a> {
        Records { cursor: self }
    }

    /// Release the cursor and its predicate copy
    pub fn destroy(self) {}

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Move `current` to the next matching bucket of this lap.
    ///
    /// Returns `false` once the lap is back at `first`.
    fn scan(&mut self) -> Result<bool> {
        let map_size = self.source.map_size();
        let layout = self.source.layout();

        let mut loc = match self.current {
            None => self.first,
            Some(current) => {
                let next = (current + 1) % map_size;
                if next == self.first {
                    return Ok(false);
                }
                next
            }
        };

        loop {
            self.source.read_bucket(loc, &mut self.scratch)?;
            let bucket = layout.decode(loc, &self.scratch)?;

            if bucket.is_in_use()
                && self
                    .predicate
                    .matches(bucket.key, |a, b| self.source.compare(a, b))
            {
                self.current = Some(loc);
                return Ok(true);
            }

            loc = (loc + 1) % map_size;
            if loc == self.first {
                return Ok(false);
            }
        }
    }

    /// Copy the bucket at `current` into `record`
    fn materialize(&mut self, record: &mut Record) -> Result<()> {
        let loc = self.current.ok_or(SlotError::Uninitialized)?;
        let layout = self.source.layout();

        self.source.read_bucket(loc, &mut self.scratch)?;
        record.fill_from(&layout.decode(loc, &self.scratch)?);

        Ok(())
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("predicate", &self.predicate)
            .field("first", &self.first)
            .field("current", &self.current)
            .field("status", &self.status)
            .finish()
    }
}

/// Iterator over the remaining matches of a cursor
pub struct Records<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
}

impl Iterator for Records<'_, '_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = Record::with_layout(self.cursor.source.layout());
        match self.cursor.next(&mut record) {
            Ok(CursorStatus::Active) => Some(Ok(record)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
