//! Types and traits that are used across multiple components of the multiplexer.
//!
//! The request and response types of the protocol surface itself live in [`crate::messages`].

pub mod crypto_primitives;

pub mod data_types;
