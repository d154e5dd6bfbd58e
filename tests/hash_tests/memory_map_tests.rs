//! Tests for the in-memory hash table
//!
//! These tests verify:
//! - Insert/query round-trips
//! - Write concern handling (InsertUnique, Update)
//! - Tombstone probing across deletes
//! - Capacity exhaustion
//! - Home bucket placement, including negative keys
//! - Caller-supplied hashers and out-of-range bucket indexes

use slotkv::hash::{
    Crc32Hash, KeyHasher, MemoryHashMap, MemoryStore, NumericHash, WriteConcern,
};
use slotkv::{BucketStatus, KeyType, RecordLayout, SlotError};

// =============================================================================
// Helper Functions
// =============================================================================

fn key(k: i32) -> [u8; 4] {
    k.to_le_bytes()
}

fn value(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

fn new_map(capacity: usize) -> MemoryHashMap {
    MemoryHashMap::in_memory(KeyType::SignedNumeric, RecordLayout::new(4, 4), capacity).unwrap()
}

/// Hasher returning the key's raw value, unreduced
#[derive(Debug)]
struct RawHash;

impl KeyHasher for RawHash {
    fn bucket_for(&self, key: &[u8], _map_size: usize) -> usize {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&key[..4]);
        u32::from_le_bytes(raw) as usize
    }
}

fn raw_hash_map(capacity: usize) -> MemoryHashMap {
    let store = MemoryStore::new(RecordLayout::new(4, 4), capacity).unwrap();
    MemoryHashMap::with_hasher(store, KeyType::SignedNumeric, Box::new(RawHash))
}

fn read(map: &MemoryHashMap, k: i32) -> Result<u32, SlotError> {
    let mut out = [0u8; 4];
    map.query(&key(k), &mut out)?;
    Ok(u32::from_le_bytes(out))
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_zero_capacity_rejected() {
    let result = MemoryHashMap::in_memory(KeyType::SignedNumeric, RecordLayout::new(4, 4), 0);
    assert!(matches!(result, Err(SlotError::InvalidInitialSize(0))));
}

#[test]
fn test_new_map_is_empty() {
    let map = new_map(16);

    assert_eq!(map.map_size(), 16);
    assert!(map.is_empty().unwrap());
    for i in 0..16 {
        assert_eq!(map.bucket_status(i).unwrap(), BucketStatus::Empty);
    }
}

// =============================================================================
// Record Operation Tests
// =============================================================================

#[test]
fn test_insert_and_query() {
    let mut map = new_map(32);

    for k in 0..20 {
        assert_eq!(map.insert(&key(k), &value(k as u32 * 10)).unwrap(), 1);
    }

    for k in 0..20 {
        assert_eq!(read(&map, k).unwrap(), k as u32 * 10);
    }
    assert_eq!(map.len().unwrap(), 20);
}

#[test]
fn test_query_missing_key() {
    let mut map = new_map(8);
    map.insert(&key(1), &value(1)).unwrap();

    assert!(matches!(read(&map, 2), Err(SlotError::ItemNotFound)));
    assert!(matches!(map.find_location(&key(9)), Err(SlotError::ItemNotFound)));
}

#[test]
fn test_duplicate_rejected() {
    let mut map = new_map(8);
    map.insert(&key(5), &value(100)).unwrap();

    let err = map.insert(&key(5), &value(200)).unwrap_err();
    assert!(matches!(err, SlotError::DuplicateKey));
    assert!(err.is_recoverable());
    assert_eq!(read(&map, 5).unwrap(), 100);
}

#[test]
fn test_update_overwrites() {
    let mut map = new_map(8);
    map.insert(&key(5), &value(100)).unwrap();

    assert_eq!(map.update(&key(5), &value(200)).unwrap(), 1);
    assert_eq!(read(&map, 5).unwrap(), 200);
    assert_eq!(map.len().unwrap(), 1);
}

#[test]
fn test_update_inserts_absent_key() {
    let mut map = new_map(8);

    map.update(&key(3), &value(33)).unwrap();

    assert_eq!(read(&map, 3).unwrap(), 33);
}

#[test]
fn test_update_write_concern_on_insert() {
    let mut map = new_map(8).with_write_concern(WriteConcern::Update);
    map.insert(&key(1), &value(1)).unwrap();
    map.insert(&key(1), &value(2)).unwrap();

    assert_eq!(read(&map, 1).unwrap(), 2);
    assert_eq!(map.write_concern(), WriteConcern::Update);
}

#[test]
fn test_get_owned() {
    let mut map = new_map(8);
    map.insert(&key(4), &value(44)).unwrap();

    assert_eq!(map.get(&key(4)).unwrap(), value(44).to_vec());
}

#[test]
fn test_delete() {
    let mut map = new_map(8);
    map.insert(&key(4), &value(44)).unwrap();

    assert_eq!(map.delete(&key(4)).unwrap(), 1);
    assert!(matches!(read(&map, 4), Err(SlotError::ItemNotFound)));
    assert!(matches!(map.delete(&key(4)), Err(SlotError::ItemNotFound)));
    assert_eq!(map.bucket_status(4).unwrap(), BucketStatus::Deleted);
}

#[test]
fn test_wrong_width_rejected() {
    let mut map = new_map(8);

    assert!(matches!(
        map.insert(&[1, 2], &value(1)),
        Err(SlotError::KeySizeMismatch { expected: 4, actual: 2 })
    ));
    assert!(matches!(
        map.insert(&key(1), &[1, 2, 3]),
        Err(SlotError::ValueSizeMismatch { expected: 4, actual: 3 })
    ));

    let mut short = [0u8; 2];
    map.insert(&key(1), &value(1)).unwrap();
    assert!(matches!(
        map.query(&key(1), &mut short),
        Err(SlotError::ValueSizeMismatch { .. })
    ));
}

// =============================================================================
// Probing Tests
// =============================================================================

#[test]
fn test_collisions_probe_forward() {
    let mut map = new_map(10);

    // 1, 11 and 21 share home bucket 1
    map.insert(&key(1), &value(1)).unwrap();
    map.insert(&key(11), &value(11)).unwrap();
    map.insert(&key(21), &value(21)).unwrap();

    assert_eq!(map.find_location(&key(1)).unwrap(), 1);
    assert_eq!(map.find_location(&key(11)).unwrap(), 2);
    assert_eq!(map.find_location(&key(21)).unwrap(), 3);
}

#[test]
fn test_probe_wraps_around() {
    let mut map = new_map(10);

    map.insert(&key(9), &value(9)).unwrap();
    map.insert(&key(19), &value(19)).unwrap();

    assert_eq!(map.find_location(&key(9)).unwrap(), 9);
    assert_eq!(map.find_location(&key(19)).unwrap(), 0);
}

#[test]
fn test_tombstone_keeps_chain() {
    let mut map = new_map(10);
    map.insert(&key(1), &value(1)).unwrap();
    map.insert(&key(11), &value(11)).unwrap();

    map.delete(&key(1)).unwrap();

    assert_eq!(read(&map, 11).unwrap(), 11);
}

#[test]
fn test_reinsert_after_delete_no_duplicate() {
    let mut map = new_map(10);
    map.insert(&key(1), &value(1)).unwrap();
    map.insert(&key(11), &value(11)).unwrap();
    map.delete(&key(1)).unwrap();

    // 11 lives past the tombstone; it must be found, not stored again
    assert!(matches!(
        map.insert(&key(11), &value(99)),
        Err(SlotError::DuplicateKey)
    ));
    map.update(&key(11), &value(12)).unwrap();

    assert_eq!(map.len().unwrap(), 1);
    assert_eq!(read(&map, 11).unwrap(), 12);
    assert_eq!(map.bucket_status(1).unwrap(), BucketStatus::Deleted);
}

#[test]
fn test_insert_reuses_tombstone() {
    let mut map = new_map(10);
    map.insert(&key(1), &value(1)).unwrap();
    map.insert(&key(11), &value(11)).unwrap();
    map.delete(&key(1)).unwrap();

    map.insert(&key(21), &value(21)).unwrap();

    assert_eq!(map.find_location(&key(21)).unwrap(), 1);
    assert_eq!(map.bucket_status(1).unwrap(), BucketStatus::InUse);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_capacity_exhaustion() {
    let mut map = new_map(4);

    for k in 0..4 {
        map.insert(&key(k), &value(0)).unwrap();
    }

    let err = map.insert(&key(4), &value(0)).unwrap_err();
    assert!(matches!(err, SlotError::MaxCapacity));
    assert!(err.is_recoverable());
    assert_eq!(map.len().unwrap(), 4);
}

#[test]
fn test_full_table_still_updates() {
    let mut map = new_map(4);
    for k in 0..4 {
        map.insert(&key(k), &value(0)).unwrap();
    }

    map.update(&key(2), &value(7)).unwrap();
    assert_eq!(read(&map, 2).unwrap(), 7);
    assert!(matches!(read(&map, 10), Err(SlotError::ItemNotFound)));
}

#[test]
fn test_full_table_accepts_after_delete() {
    let mut map = new_map(4);
    for k in 0..4 {
        map.insert(&key(k), &value(0)).unwrap();
    }

    map.delete(&key(0)).unwrap();
    map.insert(&key(8), &value(8)).unwrap();

    assert_eq!(read(&map, 8).unwrap(), 8);
}

// =============================================================================
// Hash Tests
// =============================================================================

#[test]
fn test_negative_key_home_bucket() {
    let map = new_map(10);

    assert_eq!(map.location(&key(-1)), 9);
    assert_eq!(map.location(&key(-10)), 0);
    assert_eq!(map.location(&key(-13)), 7);
}

#[test]
fn test_negative_keys_round_trip() {
    let mut map = new_map(10);
    for k in -5..5 {
        map.insert(&key(k), &value((k + 100) as u32)).unwrap();
    }

    for k in -5..5 {
        assert_eq!(read(&map, k).unwrap(), (k + 100) as u32);
    }
}

#[test]
fn test_numeric_hash_unsigned() {
    let hash = NumericHash { signed: false };

    assert_eq!(hash.bucket_for(&u32::MAX.to_le_bytes(), 10), (u32::MAX % 10) as usize);
    assert_eq!(hash.bucket_for(&[7], 5), 2);
}

#[test]
fn test_crc32_hash_nul_terminated() {
    let hash = Crc32Hash { nul_terminated: true };
    let raw = Crc32Hash { nul_terminated: false };

    assert_eq!(hash.bucket_for(b"ab\0x", 97), hash.bucket_for(b"ab\0y", 97));
    assert!(raw.bucket_for(b"abcd", 97) < 97);
}

#[test]
fn test_byte_array_keys() {
    let mut map =
        MemoryHashMap::in_memory(KeyType::FixedByteArray, RecordLayout::new(4, 2), 16).unwrap();

    map.insert(b"aaaa", b"01").unwrap();
    map.insert(b"bbbb", b"02").unwrap();

    assert_eq!(map.get(b"bbbb").unwrap(), b"02".to_vec());
    assert!(matches!(map.get(b"cccc"), Err(SlotError::ItemNotFound)));
}

#[test]
fn test_string_keys_ignore_bytes_after_nul() {
    let mut map =
        MemoryHashMap::in_memory(KeyType::NullTerminatedString, RecordLayout::new(4, 1), 16)
            .unwrap();

    map.insert(b"ab\0x", b"1").unwrap();

    assert_eq!(map.get(b"ab\0y").unwrap(), b"1".to_vec());
    assert!(matches!(map.insert(b"ab\0z", b"2"), Err(SlotError::DuplicateKey)));
}

// =============================================================================
// Custom Hasher Tests
// =============================================================================

#[test]
fn test_custom_hasher_reduced_to_table() {
    let mut map = raw_hash_map(10);

    assert_eq!(map.location(&key(42)), 2);
    map.insert(&key(42), &value(42)).unwrap();
    map.insert(&key(32), &value(32)).unwrap();

    assert_eq!(map.find_location(&key(42)).unwrap(), 2);
    assert_eq!(map.find_location(&key(32)).unwrap(), 3);
    assert_eq!(read(&map, 42).unwrap(), 42);
    assert_eq!(map.delete(&key(32)).unwrap(), 1);
}

#[test]
fn test_bucket_status_out_of_range() {
    let map = new_map(4);

    assert!(matches!(
        map.bucket_status(4),
        Err(SlotError::BucketOutOfRange {
            index: 4,
            map_size: 4
        })
    ));
    assert_eq!(map.bucket_status(3).unwrap(), BucketStatus::Empty);
}
