//! The persistent state of the multiplexer.
//!
//! # Multiplex state
//!
//! Consensus expects a single application hash at every height. The multiplexer produces it by
//! remembering the latest hash reported by every application it routes to, together with the height of
//! the last finalized block, in a [`MultiplexState`](multiplex_state::MultiplexState). The single hash
//! reported to consensus, the "composite hash", is derived from this record on demand and is never
//! stored.
//!
//! # Pluggable persistence
//!
//! - The multiplex state is kept in persistent storage, most probably in the host's filesystem.
//! - Library users get to choose how exactly this is done, by implementing the traits in [`pluggables`].
//! - The state is loaded once when the [router](crate::router::Router) starts, and durably saved every
//!   time consensus commits a block.

pub mod multiplex_state;

pub mod pluggables;

pub mod variables;

use crate::types::data_types::BlockHeight;

use pluggables::KVStoreError;

/// Errors that may be encountered when loading, updating, or saving the multiplex state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The persisted record exists but could not be deserialized. The multiplexer must not start from
    /// a state it cannot read.
    #[error("persisted multiplex state is corrupt: {source}")]
    CorruptState { source: std::io::Error },

    /// The record could not be serialized before being written.
    #[error("failed to serialize multiplex state: {source}")]
    SerializeState { source: std::io::Error },

    /// The key-value store failed to read or write.
    #[error(transparent)]
    Io(#[from] KVStoreError),

    /// A block was about to be recorded at a height lower than the last recorded one.
    #[error("block height regressed from {current} to {requested}")]
    HeightRegression {
        current: BlockHeight,
        requested: BlockHeight,
    },
}
