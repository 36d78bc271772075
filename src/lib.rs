/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A multiplexer that lets one consensus engine drive several independent applications.
//!
//! Consensus talks to a single [`Router`](router::Router). Every request names the application it is
//! meant for, and the router forwards it there. Operations that concern every application, such as
//! `InitChain` and `Commit`, are fanned out to all of them. The hashes the applications report are
//! combined into a single composite hash, which is what consensus commits to, and the record they are
//! combined from is persisted in a pluggable [key-value store](state::pluggables::KVStore).
//!
//! ## Getting started
//!
//! 1. Implement [`App`](app::App) for each application.
//! 2. Register them under unique names in an [`AppRegistry`](registry::AppRegistry).
//! 3. Implement [`KVStore`](state::pluggables::KVStore) on top of the storage of your choice.
//! 4. Build and start a router with [`RouterSpec`](router::RouterSpec).
//! 5. Optionally, hand a [`QueryEnvironment`](rpc::QueryEnvironment) to your RPC server.

pub mod app;

pub mod messages;

pub mod registry;

pub mod router;

pub mod rpc;

pub mod state;

pub mod types;

pub mod events;

pub(crate) mod event_bus;

pub mod logging;

pub mod version;
