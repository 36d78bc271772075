/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The record of per-application hashes, and the composite hash derived from it.
//!
//! # Composite hash
//!
//! The composite hash is the SHA256 digest of the concatenation of every recorded application hash,
//! taken in ascending order of application name:
//!
//! ```text
//! composite_hash = SHA256(app_hashes[name_0] || app_hashes[name_1] || ... || app_hashes[name_n])
//!     where name_0 < name_1 < ... < name_n
//! ```
//!
//! `app_hashes` is a hash map, whose iteration order depends on its insertion history and on the
//! process' random hasher seed. [`MultiplexState::composite_hash`] therefore sorts the names explicitly
//! right before hashing, which makes two replicas with the same `app_hashes` agree on the composite hash
//! no matter in which order their applications reported.
//!
//! # Persisted format
//!
//! A `MultiplexState` is stored Borsh-serialized under the [`MULTIPLEX_STATE`](super::variables::MULTIPLEX_STATE)
//! key. Its fields are, in order: the reserved `size` (an `i64`, currently always 0), the `height` (a
//! `u64`), and the `app_hashes` map (length-prefixed, entries sorted by name, each hash a
//! length-prefixed byte string).

use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::{
    crypto_primitives::hash_concatenation,
    data_types::{AppHash, AppName, BlockHeight, CryptoHash},
};

use super::{
    pluggables::{KVStore, MultiplexWriteBatch},
    StateError,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MultiplexState {
    // Reserved for recording the size of the state. Persisted but not interpreted.
    size: i64,
    height: BlockHeight,
    app_hashes: HashMap<AppName, AppHash>,
}

impl MultiplexState {
    /// Load the multiplex state from `kv_store`.
    ///
    /// If no state has ever been saved, returns a state at height 0 with no recorded hashes. Fails with
    /// [`StateError::CorruptState`] if the stored record cannot be read.
    pub fn load<K: KVStore>(kv_store: &K) -> Result<MultiplexState, StateError> {
        Ok(kv_store.multiplex_state()?.unwrap_or_default())
    }

    /// Durably write this state into `kv_store`, in a single atomic write.
    pub fn save<K: KVStore>(&self, kv_store: &mut K) -> Result<(), StateError> {
        let mut wb = MultiplexWriteBatch::<K::WriteBatch>::new();
        wb.set_multiplex_state(self)?;
        kv_store.write(wb.into_inner())?;
        Ok(())
    }

    /// Compute the composite hash of all recorded application hashes. See the
    /// [module-level docs](self#composite-hash).
    pub fn composite_hash(&self) -> CryptoHash {
        let mut names: Vec<&AppName> = self.app_hashes.keys().collect();
        names.sort();
        hash_concatenation(names.into_iter().map(|name| self.app_hashes[name].bytes()))
    }

    /// Height of the last block finalized through the multiplexer.
    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn app_hash(&self, app: &AppName) -> Option<&AppHash> {
        self.app_hashes.get(app)
    }

    /// All recorded application hashes. Iteration order carries no meaning.
    pub fn app_hashes(&self) -> &HashMap<AppName, AppHash> {
        &self.app_hashes
    }

    /// Record `app_hash` as the latest hash reported by `app`, replacing any earlier one.
    pub fn record_app_hash(&mut self, app: AppName, app_hash: AppHash) {
        self.app_hashes.insert(app, app_hash);
    }

    /// Check that the state could move to `height` without moving backwards.
    pub fn check_height(&self, height: BlockHeight) -> Result<(), StateError> {
        if height < self.height {
            Err(StateError::HeightRegression {
                current: self.height,
                requested: height,
            })
        } else {
            Ok(())
        }
    }

    /// Move the state to `height`. Heights never decrease: a lower `height` is rejected and the state is
    /// left unchanged.
    pub fn advance_height(&mut self, height: BlockHeight) -> Result<(), StateError> {
        self.check_height(height)?;
        self.height = height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, io};

    use super::*;
    use crate::{
        state::{
            pluggables::{KVGet, KVStoreError, WriteBatch},
            variables,
        },
        types::crypto_primitives::{CryptoHasher, Digest},
    };

    #[derive(Default)]
    struct MapStore {
        map: HashMap<Vec<u8>, Vec<u8>>,
        fail_writes: bool,
    }

    struct MapWriteBatch(Vec<(Vec<u8>, Option<Vec<u8>>)>);

    impl WriteBatch for MapWriteBatch {
        fn new() -> Self {
            MapWriteBatch(Vec::new())
        }

        fn set(&mut self, key: &[u8], value: &[u8]) {
            self.0.push((key.to_vec(), Some(value.to_vec())));
        }

        fn delete(&mut self, key: &[u8]) {
            self.0.push((key.to_vec(), None));
        }
    }

    impl KVGet for MapStore {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
            Ok(self.map.get(key).cloned())
        }
    }

    impl KVStore for MapStore {
        type WriteBatch = MapWriteBatch;

        fn write(&mut self, wb: MapWriteBatch) -> Result<(), KVStoreError> {
            if self.fail_writes {
                return Err(KVStoreError::new(io::Error::new(
                    io::ErrorKind::Other,
                    "disk full",
                )));
            }
            for (key, value) in wb.0 {
                match value {
                    Some(value) => self.map.insert(key, value),
                    None => self.map.remove(&key),
                };
            }
            Ok(())
        }
    }

    fn sha256(bytes: &[u8]) -> CryptoHash {
        CryptoHash::new(CryptoHasher::digest(bytes).into())
    }

    #[test]
    fn composite_hash_of_two_apps_concatenates_in_name_order() {
        let mut state = MultiplexState::default();
        state.record_app_hash("b".into(), vec![0x02].into());
        state.record_app_hash("a".into(), vec![0x01].into());

        assert_eq!(state.composite_hash(), sha256(&[0x01, 0x02]));
    }

    #[test]
    fn composite_hash_is_independent_of_insertion_order() {
        let entries: Vec<(AppName, AppHash)> = (0..16u8)
            .map(|i| (AppName::new(format!("app-{:02}", i)), AppHash::new(vec![i; i as usize])))
            .collect();

        let mut forwards = MultiplexState::default();
        entries
            .iter()
            .cloned()
            .for_each(|(name, hash)| forwards.record_app_hash(name, hash));

        let mut backwards = MultiplexState::default();
        entries
            .iter()
            .rev()
            .cloned()
            .for_each(|(name, hash)| backwards.record_app_hash(name, hash));

        let expected: Vec<u8> = entries
            .iter()
            .flat_map(|(_, hash)| hash.bytes().to_vec())
            .collect();
        assert_eq!(forwards.composite_hash(), backwards.composite_hash());
        assert_eq!(forwards.composite_hash(), sha256(&expected));
    }

    #[test]
    fn composite_hash_reflects_latest_update() {
        let mut state = MultiplexState::default();
        state.record_app_hash("a".into(), vec![0x01].into());
        state.record_app_hash("a".into(), vec![0x09].into());

        assert_eq!(state.composite_hash(), sha256(&[0x09]));
    }

    #[test]
    fn composite_hash_of_empty_state_is_hash_of_nothing() {
        assert_eq!(MultiplexState::default().composite_hash(), sha256(&[]));
    }

    #[test]
    fn load_from_empty_store_yields_zero_state() {
        let store = MapStore::default();
        let state = MultiplexState::load(&store).unwrap();

        assert_eq!(state.height(), BlockHeight::new(0));
        assert!(state.app_hashes().is_empty());
    }

    #[test]
    fn load_treats_empty_value_as_missing() {
        let mut store = MapStore::default();
        store.map.insert(variables::MULTIPLEX_STATE.to_vec(), Vec::new());

        assert_eq!(MultiplexState::load(&store).unwrap(), MultiplexState::default());
    }

    #[test]
    fn save_then_load_reproduces_record() {
        let mut state = MultiplexState::default();
        state.advance_height(BlockHeight::new(42)).unwrap();
        state.record_app_hash("empty".into(), AppHash::new(Vec::new()));
        state.record_app_hash("long".into(), AppHash::new((0..=255u8).cycle().take(4096).collect()));
        state.record_app_hash("sha".into(), sha256(b"sha").into());

        let mut store = MapStore::default();
        state.save(&mut store).unwrap();
        let loaded = MultiplexState::load(&store).unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.app_hash(&"empty".into()).unwrap().len(), 0);
        assert_eq!(loaded.app_hash(&"long".into()).unwrap().len(), 4096);
        assert_eq!(loaded.composite_hash(), state.composite_hash());
    }

    #[test]
    fn load_rejects_garbage() {
        let mut store = MapStore::default();
        store
            .map
            .insert(variables::MULTIPLEX_STATE.to_vec(), vec![0xff; 5]);

        assert!(matches!(
            MultiplexState::load(&store),
            Err(StateError::CorruptState { .. })
        ));
    }

    #[test]
    fn save_propagates_store_failure() {
        let mut store = MapStore {
            fail_writes: true,
            ..Default::default()
        };

        assert!(matches!(
            MultiplexState::default().save(&mut store),
            Err(StateError::Io(_))
        ));
        assert!(store.map.is_empty());
    }

    #[test]
    fn height_never_decreases() {
        let mut state = MultiplexState::default();
        state.advance_height(BlockHeight::new(5)).unwrap();
        state.advance_height(BlockHeight::new(5)).unwrap();

        let result = state.advance_height(BlockHeight::new(4));
        assert!(matches!(result, Err(StateError::HeightRegression { .. })));
        assert_eq!(state.height(), BlockHeight::new(5));
    }

    // Keeps a record of each read, to check that loading touches only the multiplex state key.
    struct RecordingStore {
        inner: MapStore,
        reads: RefCell<Vec<Vec<u8>>>,
    }

    impl KVGet for RecordingStore {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
            self.reads.borrow_mut().push(key.to_vec());
            self.inner.get(key)
        }
    }

    #[test]
    fn load_reads_only_the_fixed_key() {
        let store = RecordingStore {
            inner: MapStore::default(),
            reads: RefCell::new(Vec::new()),
        };
        store.multiplex_state().unwrap();

        assert_eq!(*store.reads.borrow(), vec![variables::MULTIPLEX_STATE.to_vec()]);
    }
}
