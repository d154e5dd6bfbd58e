//! Backend dispatch
//!
//! The capability set every backend exposes to the façade. A dictionary
//! holds exactly one handler as a trait object, chosen at creation.

use crate::error::Result;
use crate::hash::{BucketStore, OpenHashMap};
use crate::query::{Cursor, Predicate, ScanSource};

/// Record operations and lifecycle of one backend instance
pub trait DictionaryHandler {
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<usize>;

    fn get(&self, key: &[u8], value_out: &mut [u8]) -> Result<usize>;

    fn update(&mut self, key: &[u8], value: &[u8]) -> Result<usize>;

    fn remove(&mut self, key: &[u8]) -> Result<usize>;

    /// Bucket access for cursors
    fn source(&self) -> &dyn ScanSource;

    fn find(&self, predicate: &Predicate) -> Result<Cursor<'_>> {
        Cursor::open(self.source(), predicate)
    }

    fn sync(&mut self) -> Result<()>;

    /// Release the backend, keeping persistent storage
    fn close(self: Box<Self>) -> Result<()>;

    /// Release the backend and delete persistent storage
    fn destroy(self: Box<Self>) -> Result<()>;
}

impl<S: BucketStore> DictionaryHandler for OpenHashMap<S> {
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<usize> {
        OpenHashMap::insert(self, key, value)
    }

    fn get(&self, key: &[u8], value_out: &mut [u8]) -> Result<usize> {
        self.query(key, value_out)
    }

    fn update(&mut self, key: &[u8], value: &[u8]) -> Result<usize> {
        OpenHashMap::update(self, key, value)
    }

    fn remove(&mut self, key: &[u8]) -> Result<usize> {
        self.delete(key)
    }

    fn source(&self) -> &dyn ScanSource {
        self
    }

    fn sync(&mut self) -> Result<()> {
        OpenHashMap::sync(self)
    }

    fn close(self: Box<Self>) -> Result<()> {
        OpenHashMap::close(*self)
    }

    fn destroy(self: Box<Self>) -> Result<()> {
        OpenHashMap::destroy(*self)
    }
}
