/*
    Copyright © 2024, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Cryptographic primitives.
//!
//! The only cryptographic primitive the multiplexer needs is a cryptographic hash function, provided by
//! the [`sha2`] crate.

use super::data_types::CryptoHash;

// re-exports below.
pub use sha2::Digest;
pub use sha2::Sha256 as CryptoHasher;

/// Hash the concatenation of `chunks`, in the order given, into a [`CryptoHash`].
pub(crate) fn hash_concatenation<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> CryptoHash {
    let mut hasher = CryptoHasher::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    CryptoHash::new(hasher.finalize().into())
}
