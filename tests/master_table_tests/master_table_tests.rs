//! Tests for the master table
//!
//! These tests verify:
//! - Id assignment and persistence of the id counter
//! - Lookup and reopen by id
//! - Deleting dictionaries through the registry
//! - Checksum validation of rows

use std::fs;

use slotkv::master_table::MASTER_TABLE_FILENAME;
use slotkv::{
    Backend, DictionaryConfig, DictionaryStatus, KeyType, MasterTable, SlotError, WriteConcern,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn template(key_type: KeyType) -> DictionaryConfig {
    DictionaryConfig::builder()
        .key_type(key_type)
        .key_size(8)
        .value_size(16)
        .capacity(32)
        .backend(Backend::File)
        .build()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_table() {
    let temp = TempDir::new().unwrap();

    let master = MasterTable::open(temp.path()).unwrap();

    assert_eq!(master.next_id(), 1);
    assert!(temp.path().join(MASTER_TABLE_FILENAME).exists());
}

#[test]
fn test_open_creates_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("a").join("b");

    let master = MasterTable::open(&dir).unwrap();

    assert_eq!(master.dir(), dir.as_path());
    assert!(dir.join(MASTER_TABLE_FILENAME).exists());
}

// =============================================================================
// Registration Tests
// =============================================================================

#[test]
fn test_ids_assigned_in_order() {
    let temp = TempDir::new().unwrap();
    let mut master = MasterTable::open(temp.path()).unwrap();

    let first = master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();
    let second = master.create_dictionary(&template(KeyType::FixedByteArray)).unwrap();

    assert_eq!(first.id(), 1);
    assert_eq!(second.id(), 2);
    assert_eq!(master.next_id(), 3);
    assert_eq!(master.ids().unwrap(), vec![1, 2]);
    assert!(temp.path().join("1.oaf").exists());
    assert!(temp.path().join("2.oaf").exists());
}

#[test]
fn test_lookup_round_trips_config() {
    let temp = TempDir::new().unwrap();
    let mut master = MasterTable::open(temp.path()).unwrap();
    let mut tpl = template(KeyType::UnsignedNumeric);
    tpl.write_concern = WriteConcern::Update;
    master.create_dictionary(&tpl).unwrap();

    let cfg = master.lookup(1).unwrap();

    assert_eq!(cfg.id, 1);
    assert_eq!(cfg.key_type, KeyType::UnsignedNumeric);
    assert_eq!(cfg.key_size, 8);
    assert_eq!(cfg.value_size, 16);
    assert_eq!(cfg.capacity, 32);
    assert_eq!(cfg.backend, Backend::File);
    assert_eq!(cfg.write_concern, WriteConcern::Update);
    assert_eq!(cfg.data_dir, temp.path());
}

#[test]
fn test_lookup_unknown_id() {
    let temp = TempDir::new().unwrap();
    let mut master = MasterTable::open(temp.path()).unwrap();
    master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();

    assert!(matches!(master.lookup(0), Err(SlotError::ItemNotFound)));
    assert!(matches!(master.lookup(2), Err(SlotError::ItemNotFound)));
    assert!(matches!(master.lookup(99), Err(SlotError::ItemNotFound)));
}

#[test]
fn test_invalid_template_does_not_burn_id() {
    let temp = TempDir::new().unwrap();
    let mut master = MasterTable::open(temp.path()).unwrap();
    let mut tpl = template(KeyType::SignedNumeric);
    tpl.capacity = 0;

    assert!(matches!(
        master.create_dictionary(&tpl),
        Err(SlotError::InvalidInitialSize(0))
    ));
    assert_eq!(master.next_id(), 1);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_by_id() {
    let temp = TempDir::new().unwrap();
    {
        let mut master = MasterTable::open(temp.path()).unwrap();
        let mut dictionary = master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();
        dictionary.insert(&42i64.to_le_bytes(), &[9u8; 16]).unwrap();
        dictionary.close().unwrap();
        master.close().unwrap();
    }

    let mut master = MasterTable::open(temp.path()).unwrap();
    assert_eq!(master.next_id(), 2);

    let dictionary = master.open_dictionary(1).unwrap();
    assert_eq!(dictionary.fetch(&42i64.to_le_bytes()).unwrap(), vec![9u8; 16]);
}

#[test]
fn test_counter_survives_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let mut master = MasterTable::open(temp.path()).unwrap();
        for _ in 0..3 {
            master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();
        }
        master.close().unwrap();
    }

    let mut master = MasterTable::open(temp.path()).unwrap();
    let dictionary = master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();

    assert_eq!(dictionary.id(), 4);
    assert_eq!(master.ids().unwrap(), vec![1, 2, 3, 4]);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_dictionary_forgets_row() {
    let temp = TempDir::new().unwrap();
    let mut master = MasterTable::open(temp.path()).unwrap();
    master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();
    let mut second = master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();

    master.delete_dictionary(&mut second).unwrap();

    assert_eq!(second.status(), DictionaryStatus::Deleted);
    assert!(!temp.path().join("2.oaf").exists());
    assert_eq!(master.ids().unwrap(), vec![1]);
    assert!(matches!(master.lookup(2), Err(SlotError::ItemNotFound)));
    assert!(matches!(master.open_dictionary(2), Err(SlotError::ItemNotFound)));
}

#[test]
fn test_drop_dictionary_by_id() {
    let temp = TempDir::new().unwrap();
    let mut master = MasterTable::open(temp.path()).unwrap();
    master
        .create_dictionary(&template(KeyType::SignedNumeric))
        .unwrap()
        .close()
        .unwrap();

    master.drop_dictionary(1).unwrap();

    assert!(!temp.path().join("1.oaf").exists());
    assert!(master.ids().unwrap().is_empty());
    assert!(matches!(master.drop_dictionary(1), Err(SlotError::ItemNotFound)));
}

#[test]
fn test_delete_table() {
    let temp = TempDir::new().unwrap();
    let master = MasterTable::open(temp.path()).unwrap();

    master.delete().unwrap();

    assert!(!temp.path().join(MASTER_TABLE_FILENAME).exists());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupt_row_detected() {
    let temp = TempDir::new().unwrap();
    {
        let mut master = MasterTable::open(temp.path()).unwrap();
        master.create_dictionary(&template(KeyType::SignedNumeric)).unwrap();
        master.close().unwrap();
    }

    // Flip a byte inside row 1's key_size field
    let path = temp.path().join(MASTER_TABLE_FILENAME);
    let mut bytes = fs::read(&path).unwrap();
    let row_size = bytes.len() / 2;
    bytes[row_size + 7] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    let mut master = MasterTable::open(temp.path()).unwrap();
    assert!(matches!(master.lookup(1), Err(SlotError::Serialization(_))));
}
