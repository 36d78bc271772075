/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Trait definition for pluggable application state machines.
//!
//! An "application" is a deterministic state machine that a consensus engine drives through the
//! protocol surface defined in [`messages`](crate::messages). Normally, a consensus engine talks to
//! exactly one application. The [router](crate::router::Router) lets it talk to many: each application
//! implements [`App`], is registered under a unique [name](crate::types::data_types::AppName) in an
//! [`AppRegistry`](crate::registry::AppRegistry), and receives only the calls routed to it.
//!
//! # Required and provided methods
//!
//! The methods that the router actually delegates to an application on the normal block lifecycle
//! (`info`, `query`, `check_tx`, `init_chain`, `finalize_block`, `commit`) are required. The router
//! never consults applications on proposal preparation and vote extensions, and applications that do
//! not take part in state sync can ignore its four methods, so these have default implementations
//! that accept everything and offer nothing.
//!
//! # Determinism requirements
//!
//! Every replica runs the same set of applications behind its own router. For the
//! [composite hash](crate::state::multiplex_state::MultiplexState::composite_hash) to agree across
//! replicas, the `app_hash` values an application reports must be a deterministic function of the
//! requests it has been given.

use std::error::Error;

use crate::messages::*;

/// Error returned by an application's own method. The router propagates it unchanged inside
/// [`RouterError::DelegateFailure`](crate::router::RouterError::DelegateFailure).
pub type AppError = Box<dyn Error + Send + Sync>;

pub trait App: Send {
    /// Describe the application, including the hash of its current state.
    fn info(&mut self, request: &RequestInfo) -> Result<ResponseInfo, AppError>;

    /// Answer a read-only query against the application's state.
    fn query(&mut self, request: &RequestQuery) -> Result<ResponseQuery, AppError>;

    /// Decide whether a transaction should be admitted into the mempool.
    fn check_tx(&mut self, request: &RequestCheckTx) -> Result<ResponseCheckTx, AppError>;

    /// Set up the genesis state. The returned `app_hash` becomes the application's first reported hash.
    fn init_chain(&mut self, request: &RequestInitChain) -> Result<ResponseInitChain, AppError>;

    /// Execute a decided block. The returned `app_hash` is the application's hash after execution.
    fn finalize_block(
        &mut self,
        request: &RequestFinalizeBlock,
    ) -> Result<ResponseFinalizeBlock, AppError>;

    /// Durably persist the state produced by the last `finalize_block`.
    fn commit(&mut self, request: &RequestCommit) -> Result<ResponseCommit, AppError>;

    fn prepare_proposal(
        &mut self,
        request: &RequestPrepareProposal,
    ) -> Result<ResponsePrepareProposal, AppError> {
        Ok(ResponsePrepareProposal {
            txs: request.txs.clone(),
        })
    }

    fn process_proposal(
        &mut self,
        _request: &RequestProcessProposal,
    ) -> Result<ResponseProcessProposal, AppError> {
        Ok(ResponseProcessProposal {
            status: ProposalStatus::Accept,
        })
    }

    fn extend_vote(&mut self, _request: &RequestExtendVote) -> Result<ResponseExtendVote, AppError> {
        Ok(ResponseExtendVote::default())
    }

    fn verify_vote_extension(
        &mut self,
        _request: &RequestVerifyVoteExtension,
    ) -> Result<ResponseVerifyVoteExtension, AppError> {
        Ok(ResponseVerifyVoteExtension::default())
    }

    fn list_snapshots(
        &mut self,
        _request: &RequestListSnapshots,
    ) -> Result<ResponseListSnapshots, AppError> {
        Ok(ResponseListSnapshots::default())
    }

    fn offer_snapshot(
        &mut self,
        _request: &RequestOfferSnapshot,
    ) -> Result<ResponseOfferSnapshot, AppError> {
        Ok(ResponseOfferSnapshot::default())
    }

    fn load_snapshot_chunk(
        &mut self,
        _request: &RequestLoadSnapshotChunk,
    ) -> Result<ResponseLoadSnapshotChunk, AppError> {
        Ok(ResponseLoadSnapshotChunk::default())
    }

    fn apply_snapshot_chunk(
        &mut self,
        _request: &RequestApplySnapshotChunk,
    ) -> Result<ResponseApplySnapshotChunk, AppError> {
        Ok(ResponseApplySnapshotChunk::default())
    }
}
