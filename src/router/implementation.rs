/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [`Router`] and its implementation of the protocol surface.

use std::{
    sync::{mpsc::Sender, Mutex, MutexGuard},
    thread::JoinHandle,
    time::SystemTime,
};

use crate::{
    app::{App, AppError},
    events::*,
    messages::*,
    registry::AppRegistry,
    state::{multiplex_state::MultiplexState, pluggables::KVStore},
    types::data_types::{AppHash, AppName},
};

use super::{
    spec::Configuration,
    types::{ReqRes, ResponseCallback, RouterError, DISCOVERY_APP_VERSION},
};

/// A single application, as far as consensus can tell, that routes every protocol call to one or all of
/// the applications in its [registry](AppRegistry).
///
/// ## Routing
///
/// |Operation|Routed to|
/// |---|---|
/// |`info`|The named app, or nobody in discovery mode if the name is unknown.|
/// |`query`, `check_tx`, `check_tx_async`, snapshot operations|The named app.|
/// |`init_chain`, `commit`|Every app, in ascending name order.|
/// |`finalize_block`|The named app, or nobody if the block is empty.|
/// |`prepare_proposal`, `process_proposal`, `extend_vote`, `verify_vote_extension`, `echo`, `flush`, `error`|Nobody.|
///
/// ## Concurrency
///
/// A `Router` can be shared between threads (for example in an `Arc`). Every operation holds a single
/// lock for its whole duration, including the calls it makes into applications, so operations are
/// executed one at a time in the order they acquire the lock, and each observes all the state changes
/// of the ones before it.
///
/// ## Shutdown
///
/// Dropping the `Router` stops its event bus after every event already published has been handled.
pub struct Router<K: KVStore> {
    inner: Mutex<RouterInner<K>>,
    configuration: Configuration,
    event_bus: Option<JoinHandle<()>>,
}

// Everything the router's lock protects.
struct RouterInner<K: KVStore> {
    registry: AppRegistry,
    state: MultiplexState,
    kv_store: K,
    callback: Option<ResponseCallback>,
    event_publisher: Option<Sender<Event>>,
}

impl<K: KVStore> RouterInner<K> {
    fn app_mut(&mut self, app: &AppName) -> Result<&mut Box<dyn App>, RouterError> {
        self.registry
            .get_mut(app)
            .ok_or_else(|| RouterError::unknown_application(app))
    }

    // Call into the application named `app`, failing if it is not registered.
    fn delegate<R>(
        &mut self,
        app: &AppName,
        call: impl FnOnce(&mut dyn App) -> Result<R, AppError>,
    ) -> Result<R, RouterError> {
        let delegate = self.app_mut(app)?;
        call(&mut **delegate).map_err(|source| RouterError::delegate_failure(app, source))
    }
}

// Record `app_hash` for `app` and publish the update.
fn record_app_hash(
    state: &mut MultiplexState,
    event_publisher: &Option<Sender<Event>>,
    app: &AppName,
    app_hash: AppHash,
) {
    Event::publish(
        event_publisher,
        Event::UpdateAppHash(UpdateAppHashEvent {
            timestamp: SystemTime::now(),
            app: app.clone(),
            app_hash: app_hash.clone(),
        }),
    );
    state.record_app_hash(app.clone(), app_hash);
}

impl<K: KVStore> Router<K> {
    pub(super) fn new(
        registry: AppRegistry,
        state: MultiplexState,
        kv_store: K,
        configuration: Configuration,
        event_publisher: Option<Sender<Event>>,
        event_bus: Option<JoinHandle<()>>,
    ) -> Router<K> {
        Router {
            inner: Mutex::new(RouterInner {
                registry,
                state,
                kv_store,
                callback: None,
                event_publisher,
            }),
            configuration,
            event_bus,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RouterInner<K>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("An application panicked while the router was locked, continuing with the state it left behind");
            poisoned.into_inner()
        })
    }

    /// Get a copy of the current multiplex state.
    pub fn multiplex_state(&self) -> MultiplexState {
        self.lock().state.clone()
    }

    /// Names of every registered application, in ascending order.
    pub fn app_names(&self) -> Vec<AppName> {
        self.lock().registry.names()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /* ↓↓↓ Info and queries ↓↓↓ */

    /// Describe the named application, or list every registered application.
    ///
    /// If `request.app` is registered, the application's `info` is called and the hash it reports is
    /// recorded as its latest hash. The response carries the application's `data` and `app_version`, but
    /// the multiplexer's height and composite hash.
    ///
    /// Otherwise, the router answers in "discovery mode": `data` is a JSON array of the sorted names of
    /// every registered application, and `app_version` is [`DISCOVERY_APP_VERSION`]. Discovery mode does
    /// not change the multiplex state.
    pub fn info(&self, request: RequestInfo) -> Result<ResponseInfo, RouterError> {
        self.info_with(request, true)
    }

    /// Same as [`info`](Self::info), except that the hash the application reports is not recorded, so
    /// the multiplex state is never changed. This is the `Info` served to
    /// [query connections](crate::rpc::QueryConnection).
    pub fn read_info(&self, request: RequestInfo) -> Result<ResponseInfo, RouterError> {
        self.info_with(request, false)
    }

    fn info_with(&self, request: RequestInfo, record_hash: bool) -> Result<ResponseInfo, RouterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let (data, app_version) = match inner.registry.get_mut(&request.app) {
            Some(app) => {
                let response = app
                    .info(&request)
                    .map_err(|source| RouterError::delegate_failure(&request.app, source))?;
                if record_hash {
                    record_app_hash(
                        &mut inner.state,
                        &inner.event_publisher,
                        &request.app,
                        response.last_block_app_hash,
                    );
                }
                (response.data, response.app_version)
            }
            None => {
                let names = inner.registry.names();
                let data =
                    serde_json::to_string(&names.iter().map(AppName::as_str).collect::<Vec<_>>())?;
                (data, DISCOVERY_APP_VERSION)
            }
        };

        Ok(ResponseInfo {
            data,
            version: self.configuration.engine_version.clone(),
            app_version,
            last_block_height: inner.state.height(),
            last_block_app_hash: inner.state.composite_hash().into(),
        })
    }

    pub fn query(&self, request: RequestQuery) -> Result<ResponseQuery, RouterError> {
        self.lock()
            .delegate(&request.app, |app| app.query(&request))
    }

    /* ↓↓↓ Mempool ↓↓↓ */

    pub fn check_tx(&self, request: RequestCheckTx) -> Result<ResponseCheckTx, RouterError> {
        self.lock()
            .delegate(&request.app, |app| app.check_tx(&request))
    }

    /// Replace the callback invoked by [`check_tx_async`](Self::check_tx_async).
    pub fn set_response_callback(&self, callback: impl Fn(&Request, &Response) + Send + 'static) {
        self.lock().callback = Some(Box::new(callback));
    }

    /// Check a transaction with the named application, then hand the request and response to the
    /// [response callback](ResponseCallback).
    ///
    /// The check itself runs synchronously. Fails with [`RouterError::NoCallbackRegistered`] if no
    /// callback has been set, after the application has already checked the transaction.
    pub fn check_tx_async(&self, request: RequestCheckTx) -> Result<ReqRes, RouterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let response = inner.delegate(&request.app, |app| app.check_tx(&request))?;

        let callback = inner
            .callback
            .as_ref()
            .ok_or_else(|| RouterError::NoCallbackRegistered {
                app: request.app.clone(),
            })?;

        let app = request.app.clone();
        let code = response.code;
        let request = Request::from(request);
        let response = Response::from(response);
        callback(&request, &response);

        Event::publish(
            &inner.event_publisher,
            Event::CheckTxAsync(CheckTxAsyncEvent {
                timestamp: SystemTime::now(),
                app,
                code,
            }),
        );

        Ok(ReqRes::completed(request, response))
    }

    /* ↓↓↓ Consensus ↓↓↓ */

    /// Initialize every registered application, in ascending name order, and record the hash each one
    /// reports.
    ///
    /// Stops at the first application that fails. Applications initialized before it stay initialized
    /// and keep their recorded hashes; applications after it are never called.
    pub fn init_chain(&self, request: RequestInitChain) -> Result<ResponseInitChain, RouterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        for (name, app) in inner.registry.iter_sorted_mut() {
            let response = app
                .init_chain(&request)
                .map_err(|source| RouterError::delegate_failure(name, source))?;
            record_app_hash(&mut inner.state, &inner.event_publisher, name, response.app_hash);
        }

        let composite_hash = inner.state.composite_hash();
        Event::publish(
            &inner.event_publisher,
            Event::InitChain(InitChainEvent {
                timestamp: SystemTime::now(),
                chain_id: request.chain_id.clone(),
                apps: inner.registry.len(),
                composite_hash,
            }),
        );

        Ok(ResponseInitChain {
            validators: Vec::new(),
            app_hash: composite_hash.into(),
        })
    }

    /// Return the proposed transactions unchanged.
    pub fn prepare_proposal(
        &self,
        request: RequestPrepareProposal,
    ) -> Result<ResponsePrepareProposal, RouterError> {
        let _guard = self.lock();
        Ok(ResponsePrepareProposal { txs: request.txs })
    }

    /// Accept every proposal.
    pub fn process_proposal(
        &self,
        _request: RequestProcessProposal,
    ) -> Result<ResponseProcessProposal, RouterError> {
        let _guard = self.lock();
        Ok(ResponseProcessProposal {
            status: ProposalStatus::Accept,
        })
    }

    /// Execute a decided block with the application it is addressed to.
    ///
    /// An empty block is not routed anywhere: the multiplex state is left as is and the response reports
    /// the current composite hash. A non-empty block must be addressed to a registered application, and
    /// must not be lower than the last finalized height. After the application executes it, the block's
    /// height becomes the multiplexer's height and the application's new hash is recorded. The
    /// application's response is returned as is.
    pub fn finalize_block(
        &self,
        request: RequestFinalizeBlock,
    ) -> Result<ResponseFinalizeBlock, RouterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        if request.txs.is_empty() {
            let composite_hash = inner.state.composite_hash();
            Event::publish(
                &inner.event_publisher,
                Event::SkipEmptyBlock(SkipEmptyBlockEvent {
                    timestamp: SystemTime::now(),
                    height: request.height,
                    composite_hash,
                }),
            );
            return Ok(ResponseFinalizeBlock::empty(composite_hash));
        }

        let app = inner
            .registry
            .get_mut(&request.app)
            .ok_or_else(|| RouterError::unknown_application(&request.app))?;
        inner.state.check_height(request.height)?;

        let response = app
            .finalize_block(&request)
            .map_err(|source| RouterError::delegate_failure(&request.app, source))?;

        inner.state.advance_height(request.height)?;
        record_app_hash(
            &mut inner.state,
            &inner.event_publisher,
            &request.app,
            response.app_hash.clone(),
        );
        Event::publish(
            &inner.event_publisher,
            Event::FinalizeBlock(FinalizeBlockEvent {
                timestamp: SystemTime::now(),
                app: request.app.clone(),
                height: request.height,
                txs: request.txs.len(),
                app_hash: response.app_hash.clone(),
            }),
        );

        Ok(response)
    }

    /// Vote extensions are not used: return an empty extension.
    pub fn extend_vote(&self, _request: RequestExtendVote) -> Result<ResponseExtendVote, RouterError> {
        let _guard = self.lock();
        Ok(ResponseExtendVote::default())
    }

    /// Vote extensions are not used: accept every extension.
    pub fn verify_vote_extension(
        &self,
        _request: RequestVerifyVoteExtension,
    ) -> Result<ResponseVerifyVoteExtension, RouterError> {
        let _guard = self.lock();
        Ok(ResponseVerifyVoteExtension::default())
    }

    /// Commit every registered application, in ascending name order, then durably save the multiplex
    /// state.
    ///
    /// Stops at the first application that fails, in which case the multiplex state is not saved.
    /// Applications committed before it stay committed. On success, the response carries the retain height
    /// computed from [`Configuration::retain_blocks`].
    pub fn commit(&self, request: RequestCommit) -> Result<ResponseCommit, RouterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        for (name, app) in inner.registry.iter_sorted_mut() {
            app.commit(&request)
                .map_err(|source| RouterError::delegate_failure(name, source))?;
        }

        inner.state.save(&mut inner.kv_store)?;
        let height = inner.state.height();
        Event::publish(
            &inner.event_publisher,
            Event::SaveState(SaveStateEvent {
                timestamp: SystemTime::now(),
                height,
                apps: inner.state.app_hashes().len(),
            }),
        );

        let retain_height = self.configuration.retain_height(height);
        Event::publish(
            &inner.event_publisher,
            Event::Commit(CommitEvent {
                timestamp: SystemTime::now(),
                height,
                composite_hash: inner.state.composite_hash(),
                retain_height,
            }),
        );

        Ok(ResponseCommit { retain_height })
    }

    /* ↓↓↓ State sync ↓↓↓ */

    pub fn list_snapshots(
        &self,
        request: RequestListSnapshots,
    ) -> Result<ResponseListSnapshots, RouterError> {
        self.lock()
            .delegate(&request.app, |app| app.list_snapshots(&request))
    }

    pub fn offer_snapshot(
        &self,
        request: RequestOfferSnapshot,
    ) -> Result<ResponseOfferSnapshot, RouterError> {
        self.lock()
            .delegate(&request.app, |app| app.offer_snapshot(&request))
    }

    pub fn load_snapshot_chunk(
        &self,
        request: RequestLoadSnapshotChunk,
    ) -> Result<ResponseLoadSnapshotChunk, RouterError> {
        self.lock()
            .delegate(&request.app, |app| app.load_snapshot_chunk(&request))
    }

    pub fn apply_snapshot_chunk(
        &self,
        request: RequestApplySnapshotChunk,
    ) -> Result<ResponseApplySnapshotChunk, RouterError> {
        self.lock()
            .delegate(&request.app, |app| app.apply_snapshot_chunk(&request))
    }

    /* ↓↓↓ Connection ↓↓↓ */

    pub fn echo(&self, message: String) -> Result<ResponseEcho, RouterError> {
        let _guard = self.lock();
        Ok(ResponseEcho { message })
    }

    /// Every call completes before it returns, so there is never anything to flush.
    pub fn flush(&self) -> Result<(), RouterError> {
        let _guard = self.lock();
        Ok(())
    }

    /// The router has no connection that could fail.
    pub fn error(&self) -> Result<(), RouterError> {
        Ok(())
    }
}

impl<K: KVStore> Drop for Router<K> {
    fn drop(&mut self) {
        // The event bus exits once its only publisher is gone and it has drained the channel.
        let inner = match self.inner.get_mut() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        drop(inner.event_publisher.take());

        if let Some(event_bus) = self.event_bus.take() {
            if event_bus.join().is_err() {
                log::warn!("An event handler panicked, some events may not have been handled");
            }
        }
    }
}
