//! Shorthands for starting routers over [`CounterApp`]s and for building the requests tests send them.

use app_multiplexer::{
    messages::{RequestCommit, RequestFinalizeBlock},
    registry::AppRegistry,
    router::{Configuration, Router, RouterSpec},
    types::{
        crypto_primitives::{CryptoHasher, Digest},
        data_types::{AppHash, BlockHeight, Tx},
    },
};

use crate::common::{
    counter_app::{CounterApp, Journal},
    mem_db::MemDB,
};

/// Register one fresh [`CounterApp`] under each of `names`, all sharing `journal`.
pub(crate) fn counter_apps(names: &[&str], journal: &Journal) -> AppRegistry {
    names.iter().fold(AppRegistry::new(), |registry, name| {
        registry.with_app(*name, CounterApp::new(name, journal.clone()))
    })
}

/// Start a router with no event handlers over `apps` and `kv_store`.
pub(crate) fn start_router(
    apps: AppRegistry,
    kv_store: MemDB,
    configuration: Configuration,
) -> Router<MemDB> {
    RouterSpec::builder()
        .apps(apps)
        .kv_store(kv_store)
        .configuration(configuration)
        .build()
        .start()
        .unwrap()
}

/// A block at `height` addressed to `app` with `num_txs` non-empty transactions.
pub(crate) fn block(app: &str, height: u64, num_txs: u8) -> RequestFinalizeBlock {
    RequestFinalizeBlock {
        app: app.into(),
        txs: (0..num_txs).map(|i| Tx::new(vec![i + 1])).collect(),
        hash: vec![height as u8; 32],
        height: BlockHeight::new(height),
        proposer_address: Vec::new(),
    }
}

/// Finalize a block for `app`, then commit.
pub(crate) fn finalize_and_commit(router: &Router<MemDB>, app: &str, height: u64, num_txs: u8) {
    router.finalize_block(block(app, height, num_txs)).unwrap();
    router.commit(RequestCommit {}).unwrap();
}

/// SHA256 of the concatenation of `app_hashes`, which must already be in ascending order of app name, as
/// reported to consensus.
pub(crate) fn expected_composite_hash(app_hashes: &[AppHash]) -> AppHash {
    let mut hasher = CryptoHasher::new();
    for app_hash in app_hashes {
        hasher.update(app_hash.bytes());
    }
    AppHash::new(hasher.finalize().to_vec())
}
