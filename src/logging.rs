/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the router's
//! [configuration](crate::router::Configuration::log_events).
//!
//! The multiplexer logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how a [FinalizeBlock](crate::events::FinalizeBlockEvent) is printed:
//!
//! ```text
//! FinalizeBlock, 1701329264, payments, 17, 3, q1Zxw8e
//! ```
//!
//! In the snippet:
//! - The third value is the name of the application the block was routed to.
//! - The fourth value is the height of the block.
//! - The fifth value is the number of transactions in the block.
//! - The sixth value is the first seven characters of the Base64 encoding of the app hash the
//!   application reported after executing the block.

use crate::events::*;
use crate::types::data_types::BlockHeight;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

// Names of each event in PascalCase for printing:
pub const UPDATE_APP_HASH: &str = "UpdateAppHash";
pub const INIT_CHAIN: &str = "InitChain";
pub const FINALIZE_BLOCK: &str = "FinalizeBlock";
pub const COMMIT: &str = "Commit";
pub const SAVE_STATE: &str = "SaveState";
pub const SKIP_EMPTY_BLOCK: &str = "SkipEmptyBlock";
pub const CHECK_TX_ASYNC: &str = "CheckTxAsync";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for UpdateAppHashEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |update_app_hash_event: &UpdateAppHashEvent| {
            log::info!(
                "{}, {}, {}, {}",
                UPDATE_APP_HASH,
                secs_since_unix_epoch(update_app_hash_event.timestamp),
                update_app_hash_event.app,
                first_seven_base64_chars(update_app_hash_event.app_hash.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for InitChainEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |init_chain_event: &InitChainEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                INIT_CHAIN,
                secs_since_unix_epoch(init_chain_event.timestamp),
                init_chain_event.chain_id,
                init_chain_event.apps,
                first_seven_base64_chars(&init_chain_event.composite_hash.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for FinalizeBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |finalize_block_event: &FinalizeBlockEvent| {
            log::info!(
                "{}, {}, {}, {}, {}, {}",
                FINALIZE_BLOCK,
                secs_since_unix_epoch(finalize_block_event.timestamp),
                finalize_block_event.app,
                finalize_block_event.height,
                finalize_block_event.txs,
                first_seven_base64_chars(finalize_block_event.app_hash.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for CommitEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |commit_event: &CommitEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                COMMIT,
                secs_since_unix_epoch(commit_event.timestamp),
                commit_event.height,
                first_seven_base64_chars(&commit_event.composite_hash.bytes()),
                retain_height_info(commit_event.retain_height)
            )
        };
        Box::new(logger)
    }
}

impl Logger for SaveStateEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |save_state_event: &SaveStateEvent| {
            log::info!(
                "{}, {}, {}, {}",
                SAVE_STATE,
                secs_since_unix_epoch(save_state_event.timestamp),
                save_state_event.height,
                save_state_event.apps
            )
        };
        Box::new(logger)
    }
}

impl Logger for SkipEmptyBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |skip_empty_block_event: &SkipEmptyBlockEvent| {
            log::debug!(
                "{}, {}, {}, {}",
                SKIP_EMPTY_BLOCK,
                secs_since_unix_epoch(skip_empty_block_event.timestamp),
                skip_empty_block_event.height,
                first_seven_base64_chars(&skip_empty_block_event.composite_hash.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for CheckTxAsyncEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |check_tx_async_event: &CheckTxAsyncEvent| {
            log::debug!(
                "{}, {}, {}, {}",
                CHECK_TX_ASYNC,
                secs_since_unix_epoch(check_tx_async_event.timestamp),
                check_tx_async_event.app,
                check_tx_async_event.code
            )
        };
        Box::new(logger)
    }
}

// Get a more readable representation of a bytesequence by base64-encoding it and taking the first 7 characters.
fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

// Timestamps from before the Unix Epoch are printed as 0.
fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

fn retain_height_info(retain_height: Option<BlockHeight>) -> String {
    match retain_height {
        Some(height) => height.to_string(),
        None => String::from("all"),
    }
}
