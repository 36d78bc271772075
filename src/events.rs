/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of the events emitted by the [router](crate::router::Router), for event handling and
//! logging.
//!
//! An event for a given action indicates that the action has been completed. Events are published by the
//! router while it holds its lock, but handlers run later on the event bus thread, so a slow handler
//! never delays a protocol call.
//!
//! Users register handlers for these events through the optional setters of
//! [`RouterSpec`](crate::router::RouterSpec). If [`log_events`](crate::router::Configuration::log_events)
//! is set, each event is additionally printed by the default handlers defined in
//! [`logging`](crate::logging).

use std::sync::mpsc::Sender;
use std::time::SystemTime;

use crate::types::data_types::{AppHash, AppName, BlockHeight, CryptoHash};

pub enum Event {
    // Events that change the multiplex state.
    UpdateAppHash(UpdateAppHashEvent),
    InitChain(InitChainEvent),
    FinalizeBlock(FinalizeBlockEvent),
    Commit(CommitEvent),
    SaveState(SaveStateEvent),
    // Events that leave the multiplex state untouched.
    SkipEmptyBlock(SkipEmptyBlockEvent),
    CheckTxAsync(CheckTxAsyncEvent),
}

impl Event {
    pub(crate) fn publish(event_publisher: &Option<Sender<Event>>, event: Event) {
        if let Some(event_publisher) = event_publisher {
            if event_publisher.send(event).is_err() {
                log::warn!("Event bus stopped receiving events, dropping event");
            }
        }
    }
}

/// An application reported a new app hash, which replaced its previous entry in the multiplex state.
pub struct UpdateAppHashEvent {
    pub timestamp: SystemTime,
    pub app: AppName,
    pub app_hash: AppHash,
}

/// Every registered application was initialized with the genesis state.
pub struct InitChainEvent {
    pub timestamp: SystemTime,
    pub chain_id: String,
    pub apps: usize,
    pub composite_hash: CryptoHash,
}

/// A non-empty block was executed by the application it was routed to.
pub struct FinalizeBlockEvent {
    pub timestamp: SystemTime,
    pub app: AppName,
    pub height: BlockHeight,
    pub txs: usize,
    pub app_hash: AppHash,
}

/// An empty block was finalized. No application was consulted.
pub struct SkipEmptyBlockEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub composite_hash: CryptoHash,
}

/// Every registered application committed its state.
pub struct CommitEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub composite_hash: CryptoHash,
    pub retain_height: Option<BlockHeight>,
}

/// The multiplex state was durably written into the key-value store.
pub struct SaveStateEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub apps: usize,
}

/// An asynchronous transaction check completed and its response callback was invoked.
pub struct CheckTxAsyncEvent {
    pub timestamp: SystemTime,
    pub app: AppName,
    pub code: u32,
}
