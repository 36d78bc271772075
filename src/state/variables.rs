/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Keys that specify where each multiplexer variable is stored in the user-provided key-value store.
//!
//! # List of State Variables
//!
//! |Variable|Type|Description|
//! |---|---|---|
//! |Multiplex State|[`MultiplexState`](super::multiplex_state::MultiplexState)|The last committed block height and the latest app hash reported by every application.|
//!
//! # Persistence of state variables
//!
//! Each variable is stored as a **Borsh-serialized value** under a single, constant key. The key of the
//! multiplex state is the ASCII string `multiplex_state`, so that it does not collide with the one-byte
//! prefixes that stores shared with a consensus engine commonly use.

pub const MULTIPLEX_STATE: &[u8] = b"multiplex_state";
