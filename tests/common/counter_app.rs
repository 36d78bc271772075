//! [`CounterApp`], a simple implementation of [`App`] used in all of the integration tests.

use std::{
    io,
    sync::{Arc, Mutex},
};

use app_multiplexer::{
    app::{App, AppError},
    messages::*,
    types::{
        crypto_primitives::{CryptoHasher, Digest},
        data_types::{AppHash, AppName, AppVersion, BlockHeight},
    },
};

/// Every call made into any `CounterApp` sharing the journal, as `"<app>.<method>"`, in call order.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

/// A simple implementation of [`App`] for use in integration tests.
///
/// The counter app's state is a single number, which every transaction of a finalized block increments
/// by 1. Its app hash is the SHA256 hash of its name followed by the little-endian bytes of the number.
///
/// Every call is recorded in a shared [`Journal`], and the app can be told to fail one of its methods.
pub(crate) struct CounterApp {
    name: AppName,
    number: u32,
    journal: Journal,
    fail_on: Option<&'static str>,
}

impl CounterApp {
    pub(crate) fn new(name: &str, journal: Journal) -> CounterApp {
        CounterApp {
            name: AppName::from(name),
            number: 0,
            journal,
            fail_on: None,
        }
    }

    /// Make the method called `method` (for example `"commit"`) return an error.
    pub(crate) fn failing_on(mut self, method: &'static str) -> CounterApp {
        self.fail_on = Some(method);
        self
    }

    /// The app hash a counter app named `name` reports when its number is `number`.
    pub(crate) fn app_hash(name: &str, number: u32) -> AppHash {
        let mut hasher = CryptoHasher::new();
        hasher.update(name.as_bytes());
        hasher.update(number.to_le_bytes());
        AppHash::new(hasher.finalize().to_vec())
    }

    fn call(&self, method: &'static str) -> Result<(), AppError> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}.{}", self.name, method));
        if self.fail_on == Some(method) {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::Other,
                format!("{} failed on purpose", method),
            )));
        }
        Ok(())
    }

    fn current_app_hash(&self) -> AppHash {
        Self::app_hash(self.name.as_str(), self.number)
    }
}

impl App for CounterApp {
    fn info(&mut self, _request: &RequestInfo) -> Result<ResponseInfo, AppError> {
        self.call("info")?;
        Ok(ResponseInfo {
            data: format!("counter {}", self.name),
            version: String::from("counter-1"),
            app_version: AppVersion::new(7),
            last_block_height: BlockHeight::new(self.number as u64),
            last_block_app_hash: self.current_app_hash(),
        })
    }

    fn query(&mut self, request: &RequestQuery) -> Result<ResponseQuery, AppError> {
        self.call("query")?;
        Ok(ResponseQuery {
            key: request.data.clone(),
            value: self.number.to_le_bytes().to_vec(),
            height: request.height,
            ..Default::default()
        })
    }

    fn check_tx(&mut self, request: &RequestCheckTx) -> Result<ResponseCheckTx, AppError> {
        self.call("check_tx")?;
        let code = if request.tx.bytes().is_empty() { 1 } else { 0 };
        Ok(ResponseCheckTx {
            code,
            ..Default::default()
        })
    }

    fn init_chain(&mut self, _request: &RequestInitChain) -> Result<ResponseInitChain, AppError> {
        self.call("init_chain")?;
        Ok(ResponseInitChain {
            validators: Vec::new(),
            app_hash: self.current_app_hash(),
        })
    }

    fn finalize_block(
        &mut self,
        request: &RequestFinalizeBlock,
    ) -> Result<ResponseFinalizeBlock, AppError> {
        self.call("finalize_block")?;
        self.number += request.txs.len() as u32;
        Ok(ResponseFinalizeBlock {
            tx_results: request
                .txs
                .iter()
                .map(|_| ExecTxResult::default())
                .collect(),
            validator_updates: Vec::new(),
            app_hash: self.current_app_hash(),
        })
    }

    fn commit(&mut self, _request: &RequestCommit) -> Result<ResponseCommit, AppError> {
        self.call("commit")?;
        Ok(ResponseCommit::default())
    }

    fn list_snapshots(
        &mut self,
        _request: &RequestListSnapshots,
    ) -> Result<ResponseListSnapshots, AppError> {
        self.call("list_snapshots")?;
        Ok(ResponseListSnapshots {
            snapshots: vec![Snapshot {
                height: BlockHeight::new(self.number as u64),
                format: 1,
                chunks: 1,
                hash: self.current_app_hash().bytes().to_vec(),
                metadata: Vec::new(),
            }],
        })
    }

    fn offer_snapshot(
        &mut self,
        _request: &RequestOfferSnapshot,
    ) -> Result<ResponseOfferSnapshot, AppError> {
        self.call("offer_snapshot")?;
        Ok(ResponseOfferSnapshot {
            result: OfferSnapshotResult::Accept,
        })
    }

    fn load_snapshot_chunk(
        &mut self,
        _request: &RequestLoadSnapshotChunk,
    ) -> Result<ResponseLoadSnapshotChunk, AppError> {
        self.call("load_snapshot_chunk")?;
        Ok(ResponseLoadSnapshotChunk {
            chunk: self.number.to_le_bytes().to_vec(),
        })
    }

    fn apply_snapshot_chunk(
        &mut self,
        request: &RequestApplySnapshotChunk,
    ) -> Result<ResponseApplySnapshotChunk, AppError> {
        self.call("apply_snapshot_chunk")?;
        let mut bytes = [0u8; 4];
        let len = request.chunk.len().min(4);
        bytes[..len].copy_from_slice(&request.chunk[..len]);
        self.number = u32::from_le_bytes(bytes);
        Ok(ResponseApplySnapshotChunk {
            result: ApplySnapshotChunkResult::Accept,
            ..Default::default()
        })
    }
}
