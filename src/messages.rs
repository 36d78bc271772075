/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Requests and responses of the consensus-application protocol surface.
//!
//! The surface is the one a consensus engine uses to drive a single application, extended in one way:
//! every request that the [router](crate::router::Router) may forward to one application carries an
//! explicit `app` field of type [`AppName`] that selects the routing target.
//!
//! Besides the typed request/response pairs, this module defines the generic [`Request`] and
//! [`Response`] envelopes, which wrap any typed request or response. The envelopes are what the
//! [response callback](crate::router::ResponseCallback) receives.

use crate::types::data_types::{AppHash, AppName, AppVersion, BlockHeight, CryptoHash, Tx};

/* ↓↓↓ Info ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// Application to ask. If no application is registered under this name, the router answers in
    /// discovery mode.
    pub app: AppName,
    pub version: String,
    pub block_version: u64,
    pub p2p_version: u64,
    pub abci_version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseInfo {
    pub data: String,
    pub version: String,
    pub app_version: AppVersion,
    pub last_block_height: BlockHeight,
    pub last_block_app_hash: AppHash,
}

/* ↓↓↓ Query ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub app: AppName,
    pub data: Vec<u8>,
    pub path: String,
    pub height: BlockHeight,
    pub prove: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseQuery {
    pub code: u32,
    pub log: String,
    pub info: String,
    pub index: i64,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub height: BlockHeight,
    pub codespace: String,
}

/* ↓↓↓ CheckTx ↓↓↓ */

/// Whether a transaction is checked for the first time, or re-checked after a block was committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckTxKind {
    #[default]
    New,
    Recheck,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestCheckTx {
    pub app: AppName,
    pub tx: Tx,
    pub kind: CheckTxKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseCheckTx {
    pub code: u32,
    pub data: Vec<u8>,
    pub log: String,
    pub info: String,
    pub gas_wanted: i64,
    pub gas_used: i64,
    pub codespace: String,
}

/* ↓↓↓ InitChain ↓↓↓ */

/// A change to the power of one validator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorUpdate {
    pub pub_key: Vec<u8>,
    pub power: i64,
}

/// `InitChain` is delivered to every registered application, so it carries no `app` field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestInitChain {
    pub chain_id: String,
    pub initial_height: BlockHeight,
    pub validators: Vec<ValidatorUpdate>,
    pub app_state_bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseInitChain {
    pub validators: Vec<ValidatorUpdate>,
    pub app_hash: AppHash,
}

/* ↓↓↓ PrepareProposal ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestPrepareProposal {
    pub app: AppName,
    pub max_tx_bytes: i64,
    pub txs: Vec<Tx>,
    pub height: BlockHeight,
    pub proposer_address: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponsePrepareProposal {
    pub txs: Vec<Tx>,
}

/* ↓↓↓ ProcessProposal ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestProcessProposal {
    pub app: AppName,
    pub txs: Vec<Tx>,
    pub hash: Vec<u8>,
    pub height: BlockHeight,
    pub proposer_address: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProposalStatus {
    #[default]
    Unknown,
    Accept,
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseProcessProposal {
    pub status: ProposalStatus,
}

/* ↓↓↓ FinalizeBlock ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestFinalizeBlock {
    pub app: AppName,
    pub txs: Vec<Tx>,
    pub hash: Vec<u8>,
    pub height: BlockHeight,
    pub proposer_address: Vec<u8>,
}

/// Result of executing one transaction of a finalized block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecTxResult {
    pub code: u32,
    pub data: Vec<u8>,
    pub log: String,
    pub info: String,
    pub gas_wanted: i64,
    pub gas_used: i64,
    pub codespace: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseFinalizeBlock {
    pub tx_results: Vec<ExecTxResult>,
    pub validator_updates: Vec<ValidatorUpdate>,
    pub app_hash: AppHash,
}

/* ↓↓↓ Vote extensions ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestExtendVote {
    pub app: AppName,
    pub hash: Vec<u8>,
    pub height: BlockHeight,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseExtendVote {
    pub vote_extension: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestVerifyVoteExtension {
    pub app: AppName,
    pub hash: Vec<u8>,
    pub validator_address: Vec<u8>,
    pub height: BlockHeight,
    pub vote_extension: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerifyStatus {
    #[default]
    Accept,
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseVerifyVoteExtension {
    pub status: VerifyStatus,
}

/* ↓↓↓ Commit ↓↓↓ */

/// `Commit` is delivered to every registered application, so it carries no `app` field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestCommit {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseCommit {
    /// Blocks below this height may be pruned by consensus. `None` keeps every block.
    pub retain_height: Option<BlockHeight>,
}

/* ↓↓↓ State sync ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub height: BlockHeight,
    pub format: u32,
    pub chunks: u32,
    pub hash: Vec<u8>,
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestListSnapshots {
    pub app: AppName,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseListSnapshots {
    pub snapshots: Vec<Snapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOfferSnapshot {
    pub app: AppName,
    pub snapshot: Option<Snapshot>,
    pub app_hash: AppHash,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OfferSnapshotResult {
    #[default]
    Unknown,
    Accept,
    Abort,
    Reject,
    RejectFormat,
    RejectSender,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseOfferSnapshot {
    pub result: OfferSnapshotResult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestLoadSnapshotChunk {
    pub app: AppName,
    pub height: BlockHeight,
    pub format: u32,
    pub chunk: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseLoadSnapshotChunk {
    pub chunk: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestApplySnapshotChunk {
    pub app: AppName,
    pub index: u32,
    pub chunk: Vec<u8>,
    pub sender: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApplySnapshotChunkResult {
    #[default]
    Unknown,
    Accept,
    Abort,
    Retry,
    RetrySnapshot,
    RejectSnapshot,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseApplySnapshotChunk {
    pub result: ApplySnapshotChunkResult,
    pub refetch_chunks: Vec<u32>,
    pub reject_senders: Vec<String>,
}

/* ↓↓↓ Echo ↓↓↓ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseEcho {
    pub message: String,
}

/* ↓↓↓ Generic envelopes ↓↓↓ */

/// Any request of the protocol surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Echo(String),
    Flush,
    Info(RequestInfo),
    Query(RequestQuery),
    CheckTx(RequestCheckTx),
    InitChain(RequestInitChain),
    PrepareProposal(RequestPrepareProposal),
    ProcessProposal(RequestProcessProposal),
    FinalizeBlock(RequestFinalizeBlock),
    ExtendVote(RequestExtendVote),
    VerifyVoteExtension(RequestVerifyVoteExtension),
    Commit(RequestCommit),
    ListSnapshots(RequestListSnapshots),
    OfferSnapshot(RequestOfferSnapshot),
    LoadSnapshotChunk(RequestLoadSnapshotChunk),
    ApplySnapshotChunk(RequestApplySnapshotChunk),
}

/// Any response of the protocol surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Echo(ResponseEcho),
    Flush,
    Info(ResponseInfo),
    Query(ResponseQuery),
    CheckTx(ResponseCheckTx),
    InitChain(ResponseInitChain),
    PrepareProposal(ResponsePrepareProposal),
    ProcessProposal(ResponseProcessProposal),
    FinalizeBlock(ResponseFinalizeBlock),
    ExtendVote(ResponseExtendVote),
    VerifyVoteExtension(ResponseVerifyVoteExtension),
    Commit(ResponseCommit),
    ListSnapshots(ResponseListSnapshots),
    OfferSnapshot(ResponseOfferSnapshot),
    LoadSnapshotChunk(ResponseLoadSnapshotChunk),
    ApplySnapshotChunk(ResponseApplySnapshotChunk),
}

macro_rules! impl_envelope {
    ($envelope:ident { $($variant:ident($inner:ty)),* $(,)? }) => {
        $(
            impl From<$inner> for $envelope {
                fn from(inner: $inner) -> Self {
                    $envelope::$variant(inner)
                }
            }
        )*
    };
}

impl_envelope!(Request {
    Info(RequestInfo),
    Query(RequestQuery),
    CheckTx(RequestCheckTx),
    InitChain(RequestInitChain),
    PrepareProposal(RequestPrepareProposal),
    ProcessProposal(RequestProcessProposal),
    FinalizeBlock(RequestFinalizeBlock),
    ExtendVote(RequestExtendVote),
    VerifyVoteExtension(RequestVerifyVoteExtension),
    Commit(RequestCommit),
    ListSnapshots(RequestListSnapshots),
    OfferSnapshot(RequestOfferSnapshot),
    LoadSnapshotChunk(RequestLoadSnapshotChunk),
    ApplySnapshotChunk(RequestApplySnapshotChunk),
});

impl_envelope!(Response {
    Echo(ResponseEcho),
    Info(ResponseInfo),
    Query(ResponseQuery),
    CheckTx(ResponseCheckTx),
    InitChain(ResponseInitChain),
    PrepareProposal(ResponsePrepareProposal),
    ProcessProposal(ResponseProcessProposal),
    FinalizeBlock(ResponseFinalizeBlock),
    ExtendVote(ResponseExtendVote),
    VerifyVoteExtension(ResponseVerifyVoteExtension),
    Commit(ResponseCommit),
    ListSnapshots(ResponseListSnapshots),
    OfferSnapshot(ResponseOfferSnapshot),
    LoadSnapshotChunk(ResponseLoadSnapshotChunk),
    ApplySnapshotChunk(ResponseApplySnapshotChunk),
});

impl ResponseFinalizeBlock {
    /// A response that executed nothing and reports `app_hash`.
    pub(crate) fn empty(app_hash: CryptoHash) -> Self {
        ResponseFinalizeBlock {
            tx_results: Vec::new(),
            validator_updates: Vec::new(),
            app_hash: app_hash.into(),
        }
    }
}
