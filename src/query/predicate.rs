//! Predicate definitions

use std::cmp::Ordering;

use crate::error::{Result, SlotError};

/// Matching criterion for a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Keys equal to `key`
    Equality { key: Vec<u8> },

    /// Keys with `lower <= key <= upper` (inclusive on both ends)
    Range { lower: Vec<u8>, upper: Vec<u8> },

    /// Every live record
    AllRecords,
}

impl Predicate {
    pub fn equality(key: impl Into<Vec<u8>>) -> Self {
        Predicate::Equality { key: key.into() }
    }

    pub fn range(lower: impl Into<Vec<u8>>, upper: impl Into<Vec<u8>>) -> Self {
        Predicate::Range {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn all_records() -> Self {
        Predicate::AllRecords
    }

    /// Check every bound has the dictionary's key width
    pub fn validate(&self, key_size: usize) -> Result<()> {
        let check = |name: &str, key: &[u8]| {
            if key.len() == key_size {
                Ok(())
            } else {
                Err(SlotError::InvalidPredicate(format!(
                    "{} is {} bytes, dictionary keys are {}",
                    name,
                    key.len(),
                    key_size
                )))
            }
        };

        match self {
            Predicate::Equality { key } => check("equality key", key),
            Predicate::Range { lower, upper } => {
                check("lower bound", lower)?;
                check("upper bound", upper)
            }
            Predicate::AllRecords => Ok(()),
        }
    }

    /// Test a stored key against this predicate
    pub fn matches<F>(&self, key: &[u8], compare: F) -> bool
    where
        F: Fn(&[u8], &[u8]) -> Ordering,
    {
        match self {
            Predicate::Equality { key: target } => compare(target, key).is_eq(),
            Predicate::Range { lower, upper } => {
                compare(lower, key).is_le() && compare(key, upper).is_le()
            }
            Predicate::AllRecords => true,
        }
    }

    /// Deep copy that reports allocation failure instead of aborting
    pub(crate) fn try_clone(&self) -> Result<Self> {
        fn copy(bytes: &[u8]) -> Result<Vec<u8>> {
            let mut out = Vec::new();
            out.try_reserve_exact(bytes.len())?;
            out.extend_from_slice(bytes);
            Ok(out)
        }

        Ok(match self {
            Predicate::Equality { key } => Predicate::Equality { key: copy(key)? },
            Predicate::Range { lower, upper } => Predicate::Range {
                lower: copy(lower)?,
                upper: copy(upper)?,
            },
            Predicate::AllRecords => Predicate::AllRecords,
        })
    }
}
