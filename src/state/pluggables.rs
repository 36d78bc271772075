/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Traits for pluggable persistence of the multiplexer's state.
//!
//! The multiplexer merely requires that whatever the user provides as a persistence mechanism implements
//! the abstract functionality of a key-value store with atomic, batched writes. Unlike an in-memory map,
//! a real store can fail on both reads and writes, so both [`KVGet::get`] and [`KVStore::write`] return
//! a [`KVStoreError`] that the multiplexer propagates to the caller of the operation that triggered the
//! access.

use std::error::Error;

use borsh::{BorshDeserialize, BorshSerialize};

use super::{multiplex_state::MultiplexState, variables, StateError};

pub trait KVStore: KVGet + Send + 'static {
    type WriteBatch: WriteBatch;

    /// Atomically apply every insertion and deletion in `wb`.
    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), KVStoreError>;
}

pub trait KVGet {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /* ↓↓↓ Multiplex State ↓↓↓ */

    /// Get the persisted [`MultiplexState`], or `None` if no state has ever been saved.
    ///
    /// A stored value of length zero is treated the same as a missing one.
    fn multiplex_state(&self) -> Result<Option<MultiplexState>, StateError> {
        match self.get(variables::MULTIPLEX_STATE)? {
            None => Ok(None),
            Some(bytes) if bytes.is_empty() => Ok(None),
            Some(bytes) => MultiplexState::try_from_slice(&bytes)
                .map(Some)
                .map_err(|source| StateError::CorruptState { source }),
        }
    }
}

pub trait WriteBatch {
    fn new() -> Self;
    fn set(&mut self, key: &[u8], value: &[u8]);
    fn delete(&mut self, key: &[u8]);
}

/// [`WriteBatch`] wrapper that knows where each multiplexer variable lives in the key-value store.
pub struct MultiplexWriteBatch<W: WriteBatch>(pub(super) W);

impl<W: WriteBatch> MultiplexWriteBatch<W> {
    pub(crate) fn new() -> MultiplexWriteBatch<W> {
        MultiplexWriteBatch(W::new())
    }

    /* ↓↓↓ Multiplex State ↓↓↓ */

    pub fn set_multiplex_state(&mut self, state: &MultiplexState) -> Result<(), StateError> {
        self.0.set(
            variables::MULTIPLEX_STATE,
            &state
                .try_to_vec()
                .map_err(|source| StateError::SerializeState { source })?,
        );
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

/// Failure reported by the user-provided [key-value store](KVStore).
#[derive(Debug, thiserror::Error)]
#[error("key-value store failure: {source}")]
pub struct KVStoreError {
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl KVStoreError {
    /// Wrap the store's own error.
    pub fn new(source: impl Into<Box<dyn Error + Send + Sync>>) -> KVStoreError {
        KVStoreError {
            source: source.into(),
        }
    }
}
