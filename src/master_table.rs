//! Master table
//!
//! A persisted registry of dictionaries, so a file dictionary can be
//! reopened by its id alone.
//!
//! ## File Format
//! ```text
//! {dir}/slotkv_mt.tbl
//! ┌──────────────┬──────────────┬──────────────┬─────┐
//! │ row 0        │ row 1        │ row 2        │ ... │
//! │ (next id)    │ (dict id 1)  │ (dict id 2)  │     │
//! └──────────────┴──────────────┴──────────────┴─────┘
//!
//! Row (bincode, fixed width):
//! ┌────────┬──────────┬─────────┬──────────┬──────────┬────────────┬──────────┬─────────┐
//! │ id (4) │ ktype(1) │ back(1) │ wconc(1) │ ksize(4) │ vsize(4)   │ cap(4)   │ crc (4) │
//! └────────┴──────────┴─────────┴──────────┴──────────┴────────────┴──────────┴─────────┘
//! ```
//!
//! Row `i` describes dictionary `i`. Row 0 is the master row; its `id`
//! holds the next id to hand out. A row of zeros is a deleted dictionary.
//!
//! Rows are read and written only through [`MasterTable`]; the row type is
//! not exported.
//!
//! ```compile_fail
//! use slotkv::master_table::MasterRow;
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{Backend, DictionaryConfig};
use crate::dictionary::Dictionary;
use crate::error::{Result, SlotError};
use crate::hash::WriteConcern;
use crate::key::KeyType;

/// File name of the registry inside its directory
pub const MASTER_TABLE_FILENAME: &str = "slotkv_mt.tbl";

/// First id handed out to a dictionary
const FIRST_DICTIONARY_ID: u32 = 1;

/// One registry row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MasterRow {
    id: u32,
    key_type: u8,
    backend: u8,
    write_concern: u8,
    key_size: u32,
    value_size: u32,
    capacity: u32,
    checksum: u32,
}

impl MasterRow {
    /// The master row carrying the id counter
    fn master(next_id: u32) -> Self {
        Self {
            id: next_id,
            ..Self::default()
        }
        .sealed()
    }

    /// Row describing `config`
    fn from_config(config: &DictionaryConfig) -> Result<Self> {
        let narrow = |name: &str, v: usize| {
            u32::try_from(v).map_err(|_| SlotError::Config(format!("{} too large: {}", name, v)))
        };

        Ok(Self {
            id: config.id,
            key_type: config.key_type.into(),
            backend: config.backend.into(),
            write_concern: config.write_concern.into(),
            key_size: narrow("key_size", config.key_size)?,
            value_size: narrow("value_size", config.value_size)?,
            capacity: narrow("capacity", config.capacity)?,
            checksum: 0,
        }
        .sealed())
    }

    /// Rebuild the config of this row, rooted at `dir`
    fn to_config(self, dir: &Path) -> Result<DictionaryConfig> {
        Ok(DictionaryConfig {
            id: self.id,
            key_type: KeyType::try_from(self.key_type)?,
            key_size: self.key_size as usize,
            value_size: self.value_size as usize,
            capacity: self.capacity as usize,
            backend: Backend::try_from(self.backend)?,
            write_concern: WriteConcern::try_from(self.write_concern)?,
            data_dir: dir.to_path_buf(),
        })
    }

    /// CRC-32 over every field but the checksum itself
    fn compute_checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.id.to_le_bytes());
        hasher.update(&[self.key_type, self.backend, self.write_concern]);
        hasher.update(&self.key_size.to_le_bytes());
        hasher.update(&self.value_size.to_le_bytes());
        hasher.update(&self.capacity.to_le_bytes());
        hasher.finalize()
    }

    fn sealed(mut self) -> Self {
        self.checksum = self.compute_checksum();
        self
    }

    fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Registry of the dictionaries living in one directory
#[derive(Debug)]
pub struct MasterTable {
    /// Directory holding the registry and every table file
    dir: PathBuf,

    /// Path of the registry file
    path: PathBuf,

    file: File,

    /// Bytes per row
    row_size: u64,

    /// Id the next `create_dictionary` hands out
    next_id: u32,
}

impl MasterTable {
    /// Open the registry in `dir`, creating it (and `dir`) if absent
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(MASTER_TABLE_FILENAME);

        fs::create_dir_all(&dir).map_err(|source| SlotError::FileOpen {
            path: dir.clone(),
            source,
        })?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| SlotError::FileOpen {
                path: path.clone(),
                source,
            })?;

        let row_size = bincode::serialized_size(&MasterRow::default())?;
        let mut table = Self {
            dir,
            path,
            file,
            row_size,
            next_id: FIRST_DICTIONARY_ID,
        };

        match table.read_row(0)? {
            Some(master) => table.next_id = master.id,
            None => table.write_row(0, &MasterRow::master(FIRST_DICTIONARY_ID))?,
        }

        tracing::debug!(
            path = %table.path.display(),
            next_id = table.next_id,
            "Opened master table"
        );

        Ok(table)
    }

    /// Id the next created dictionary will get
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Directory holding the registry
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a dictionary shaped like `template` under a fresh id.
    ///
    /// The template's `id` and `data_dir` are replaced. The bumped counter is
    /// persisted before the dictionary is created, so a failed creation only
    /// burns an id.
    pub fn create_dictionary(&mut self, template: &DictionaryConfig) -> Result<Dictionary> {
        template.validate()?;

        let mut config = template.clone();
        config.id = self.next_id;
        config.data_dir = self.dir.clone();
        let row = MasterRow::from_config(&config)?;

        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| SlotError::Config("dictionary ids exhausted".to_string()))?;
        self.write_row(0, &MasterRow::master(next_id))?;
        self.next_id = next_id;

        let dictionary = Dictionary::create(config)?;
        self.write_row(row.id as u64, &row)?;
        self.file.sync_data().map_err(SlotError::FileWrite)?;

        tracing::debug!(id = row.id, "Registered dictionary");
        Ok(dictionary)
    }

    /// Config of the live dictionary `id`
    pub fn lookup(&mut self, id: u32) -> Result<DictionaryConfig> {
        if id < FIRST_DICTIONARY_ID || id >= self.next_id {
            return Err(SlotError::ItemNotFound);
        }

        match self.read_row(id as u64)? {
            Some(row) if row.id == id => row.to_config(&self.dir),
            _ => Err(SlotError::ItemNotFound),
        }
    }

    /// Reopen the file dictionary registered under `id`
    pub fn open_dictionary(&mut self, id: u32) -> Result<Dictionary> {
        let config = self.lookup(id)?;
        Dictionary::open(config)
    }

    /// Delete `dictionary`'s storage and forget it
    pub fn delete_dictionary(&mut self, dictionary: &mut Dictionary) -> Result<()> {
        let id = dictionary.id();
        self.lookup(id)?;

        dictionary.delete_dictionary()?;
        self.blank_row(id)
    }

    /// Delete the storage of the closed dictionary `id` and forget it
    pub fn drop_dictionary(&mut self, id: u32) -> Result<()> {
        let config = self.lookup(id)?;

        Dictionary::destroy_by_id(&config)?;
        self.blank_row(id)
    }

    /// Every live dictionary id in ascending order
    pub fn ids(&mut self) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        for id in FIRST_DICTIONARY_ID..self.next_id {
            if let Some(row) = self.read_row(id as u64)? {
                if row.id == id {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// Flush and release the registry file
    pub fn close(self) -> Result<()> {
        self.file.sync_all().map_err(SlotError::FileClose)?;
        tracing::debug!(path = %self.path.display(), "Closed master table");
        Ok(())
    }

    /// Release and delete the registry file; table files are left alone
    pub fn delete(self) -> Result<()> {
        let path = self.path.clone();
        self.close()?;
        fs::remove_file(&path).map_err(|source| SlotError::FileDelete { path, source })
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Read row `index`; `None` when the file ends before it or it is blank
    fn read_row(&mut self, index: u64) -> Result<Option<MasterRow>> {
        let offset = index * self.row_size;
        let len = self.file.metadata().map_err(SlotError::FileRead)?.len();
        if offset + self.row_size > len {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.row_size as usize];
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(SlotError::FileSeek)?;
        self.file.read_exact(&mut buf).map_err(SlotError::FileRead)?;

        let row: MasterRow = bincode::deserialize(&buf)?;
        if row.is_blank() {
            return Ok(None);
        }
        if row.checksum != row.compute_checksum() {
            return Err(SlotError::Serialization(format!(
                "master table row {} checksum mismatch",
                index
            )));
        }

        Ok(Some(row))
    }

    fn write_row(&mut self, index: u64, row: &MasterRow) -> Result<()> {
        let bytes = bincode::serialize(row)?;
        self.file
            .seek(SeekFrom::Start(index * self.row_size))
            .map_err(SlotError::FileSeek)?;
        self.file.write_all(&bytes).map_err(SlotError::FileWrite)
    }

    fn blank_row(&mut self, id: u32) -> Result<()> {
        self.write_row(id as u64, &MasterRow::default())?;
        self.file.sync_data().map_err(SlotError::FileWrite)?;
        tracing::debug!(id, "Unregistered dictionary");
        Ok(())
    }
}
