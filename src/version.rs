//! Protocol versions the multiplexer speaks and reports.
//!
//! These are the versions of the consensus-application protocol surface, not of any individual
//! application. Applications declare their own [`AppVersion`](crate::types::data_types::AppVersion)
//! in `Info`.

/// Version of the consensus-application protocol implemented by the router. Reported as `version` in
/// every `Info` response unless [configured](crate::router::Configuration::engine_version) otherwise.
pub const ABCI_VERSION: &str = "2.0.0";

/// Semantic version of the consensus engine the query layer announces in `Info` requests.
pub const ENGINE_SEMVER: &str = "0.38.0";

/// Version of the block format.
pub const BLOCK_PROTOCOL: u64 = 11;

/// Version of the peer-to-peer protocol.
pub const P2P_PROTOCOL: u64 = 8;
