/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Builder-pattern interface to configure and start a [`Router`].
//!
//! Here is an example that demonstrates how to build and start a router:
//!
//! ```ignore
//! let router =
//!     RouterSpec::builder()
//!     .apps(AppRegistry::new().with_app("payments", payments).with_app("names", names))
//!     .kv_store(kv_store)
//!     .configuration(configuration)
//!     .on_commit(commit_handler)
//!     .build()
//!     .start()?;
//! ```
//!
//! ### Required setters
//!
//! - `.apps(...)`
//! - `.kv_store(...)`
//! - `.configuration(...)`
//!
//! ### Optional setters
//!
//! The optional setters are for registering user-defined event handlers for events from [crate::events]:
//! - `.on_update_app_hash(...)`
//! - `.on_init_chain(...)`
//! - `.on_finalize_block(...)`
//! - `.on_commit(...)`
//! - `.on_save_state(...)`
//! - `.on_skip_empty_block(...)`
//! - `.on_check_tx_async(...)`
//!
//! The router's [configuration](Configuration) can also be defined using the builder pattern, for
//! example:
//!
//! ```ignore
//! let configuration =
//!     Configuration::builder()
//!     .retain_blocks(100)
//!     .log_events(true)
//!     .build()
//! ```

use std::sync::mpsc;

use typed_builder::TypedBuilder;

use crate::event_bus::*;
use crate::events::*;
use crate::registry::AppRegistry;
use crate::state::{multiplex_state::MultiplexState, pluggables::KVStore};
use crate::types::data_types::BlockHeight;
use crate::version::ABCI_VERSION;

use super::{implementation::Router, types::RouterError};

/// Stores the user-defined parameters of a router, that is:
/// 1. The number of recent blocks consensus should retain, which determines the retain height returned
///    by `Commit`.
/// 2. The "Log Events" flag, if set to "true" then logs should be printed.
/// 3. The protocol version reported in `Info` responses.
///
/// ## Retain blocks
///
/// If `retain_blocks` is `n > 0`, then after committing a block at height `h >= n`, the router asks
/// consensus to retain blocks from height `h - n + 1` onwards, i.e., the last `n` blocks. If `n` is 0,
/// consensus is asked to retain every block.
///
/// ## Log Events
///
/// The multiplexer logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, Debug, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Optional:
    - `.retain_blocks(...)`
    - `.log_events(...)`
    - `.engine_version(...)`
"))]
pub struct Configuration {
    #[builder(
        default = 0,
        setter(doc = "Set how many recent blocks consensus should retain. 0 retains every block. Optional.")
    )]
    pub retain_blocks: u64,
    #[builder(default = false, setter(doc = "Enable logging? Optional."))]
    pub log_events: bool,
    #[builder(
        default = String::from(ABCI_VERSION),
        setter(into, doc = "Set the protocol version reported in `Info` responses. Optional.")
    )]
    pub engine_version: String,
}

impl Configuration {
    /// The lowest height consensus should retain blocks from after committing a block at `height`, or
    /// `None` to retain every block.
    pub fn retain_height(&self, height: BlockHeight) -> Option<BlockHeight> {
        if self.retain_blocks > 0 && height.int() >= self.retain_blocks {
            Some(BlockHeight::new(height.int() - self.retain_blocks + 1))
        } else {
            None
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::builder().build()
    }
}

/// Stores all necessary parameters and trait implementations required to run a [`Router`].
#[derive(TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [RouterSpec]. On the builder call the following methods to construct a valid [RouterSpec].

    Required:
    - `.apps(...)`
    - `.kv_store(...)`
    - `.configuration(...)`

    Optional:
    - `.on_update_app_hash(...)`
    - `.on_init_chain(...)`
    - `.on_finalize_block(...)`
    - `.on_commit(...)`
    - `.on_save_state(...)`
    - `.on_skip_empty_block(...)`
    - `.on_check_tx_async(...)`
"))]
pub struct RouterSpec<K: KVStore> {
    // Required parameters
    #[builder(setter(doc = "Set the applications the router routes to. Required."))]
    apps: AppRegistry,
    #[builder(setter(doc = "Set the key-value store the multiplex state is persisted in. The argument must implement the [KVStore](crate::state::pluggables::KVStore) trait. Required."))]
    kv_store: K,
    #[builder(setter(doc = "Set the [configuration](Configuration) of the router. Required."))]
    configuration: Configuration,
    // Optional parameters
    #[builder(default, setter(transform = |handler: impl Fn(&UpdateAppHashEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<UpdateAppHashEvent>),
    doc = "Register a handler closure to be invoked after an application's hash is recorded in the multiplex state. Optional."))]
    on_update_app_hash: Option<HandlerPtr<UpdateAppHashEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&InitChainEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<InitChainEvent>),
    doc = "Register a handler closure to be invoked after every application has been initialized. Optional."))]
    on_init_chain: Option<HandlerPtr<InitChainEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&FinalizeBlockEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<FinalizeBlockEvent>),
    doc = "Register a handler closure to be invoked after a non-empty block is executed by its application. Optional."))]
    on_finalize_block: Option<HandlerPtr<FinalizeBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CommitEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CommitEvent>),
    doc = "Register a handler closure to be invoked after every application committed and the multiplex state was saved. Optional."))]
    on_commit: Option<HandlerPtr<CommitEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&SaveStateEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<SaveStateEvent>),
    doc = "Register a handler closure to be invoked after the multiplex state is written to the key-value store. Optional."))]
    on_save_state: Option<HandlerPtr<SaveStateEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&SkipEmptyBlockEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<SkipEmptyBlockEvent>),
    doc = "Register a handler closure to be invoked after an empty block is finalized without consulting any application. Optional."))]
    on_skip_empty_block: Option<HandlerPtr<SkipEmptyBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CheckTxAsyncEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CheckTxAsyncEvent>),
    doc = "Register a handler closure to be invoked after an asynchronous check completed and its callback was invoked. Optional."))]
    on_check_tx_async: Option<HandlerPtr<CheckTxAsyncEvent>>,
}

impl<K: KVStore> RouterSpec<K> {
    /// Load the persisted multiplex state, start the event bus if any handler needs it, and return the
    /// running [`Router`].
    ///
    /// Fails if the persisted state cannot be read. In particular, a
    /// [corrupt](crate::state::StateError::CorruptState) record is fatal: no router is started on top of
    /// a state it cannot interpret.
    pub fn start(self) -> Result<Router<K>, RouterError> {
        let state = MultiplexState::load(&self.kv_store)?;
        log::debug!(
            "Loaded multiplex state at height {} with {} app hashes",
            state.height(),
            state.app_hashes().len()
        );

        let event_handlers = EventHandlers::new(
            self.configuration.log_events,
            self.on_update_app_hash,
            self.on_init_chain,
            self.on_finalize_block,
            self.on_commit,
            self.on_save_state,
            self.on_skip_empty_block,
            self.on_check_tx_async,
        );

        let (event_publisher, event_bus) = if !event_handlers.is_empty() {
            let (event_publisher, event_subscriber) = mpsc::channel();
            (
                Some(event_publisher),
                Some(start_event_bus(event_handlers, event_subscriber)),
            )
        } else {
            (None, None)
        };

        Ok(Router::new(
            self.apps,
            state,
            self.kv_store,
            self.configuration,
            event_publisher,
            event_bus,
        ))
    }
}
