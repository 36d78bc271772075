/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Read-only query layer placed in front of a [router](crate::router::Router).
//!
//! An RPC server answering `abci_query` and `abci_info` only needs to read from applications, so it is
//! handed a [`QueryConnection`] rather than the router itself. [`QueryEnvironment`] turns the
//! parameters of those two RPC methods into protocol requests and wraps the responses for the caller.

use std::sync::Arc;

use crate::{
    messages::{RequestInfo, RequestQuery, ResponseInfo, ResponseQuery},
    router::{Router, RouterError},
    state::pluggables::KVStore,
    types::data_types::{AppName, BlockHeight},
    version::{ABCI_VERSION, BLOCK_PROTOCOL, ENGINE_SEMVER, P2P_PROTOCOL},
};

/// Read-only access to a router: neither call changes the multiplex state.
pub trait QueryConnection {
    fn info(&self, request: RequestInfo) -> Result<ResponseInfo, RouterError>;

    fn query(&self, request: RequestQuery) -> Result<ResponseQuery, RouterError>;
}

impl<K: KVStore> QueryConnection for Router<K> {
    fn info(&self, request: RequestInfo) -> Result<ResponseInfo, RouterError> {
        Router::read_info(self, request)
    }

    fn query(&self, request: RequestQuery) -> Result<ResponseQuery, RouterError> {
        Router::query(self, request)
    }
}

impl<T: QueryConnection + ?Sized> QueryConnection for Arc<T> {
    fn info(&self, request: RequestInfo) -> Result<ResponseInfo, RouterError> {
        (**self).info(request)
    }

    fn query(&self, request: RequestQuery) -> Result<ResponseQuery, RouterError> {
        (**self).query(request)
    }
}

/// Result of the `abci_query` RPC method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultAbciQuery {
    pub response: ResponseQuery,
}

/// Result of the `abci_info` RPC method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultAbciInfo {
    pub response: ResponseInfo,
}

/// Handlers for the query RPC methods, bound to a [`QueryConnection`].
pub struct QueryEnvironment<Q: QueryConnection> {
    connection: Q,
}

impl<Q: QueryConnection> QueryEnvironment<Q> {
    pub fn new(connection: Q) -> QueryEnvironment<Q> {
        QueryEnvironment { connection }
    }

    /// Query the application named `app`. Errors from the router are returned unchanged.
    pub fn abci_query(
        &self,
        app: impl Into<AppName>,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
        height: BlockHeight,
        prove: bool,
    ) -> Result<ResultAbciQuery, RouterError> {
        let response = self.connection.query(RequestQuery {
            app: app.into(),
            data: data.into(),
            path: path.into(),
            height,
            prove,
        })?;

        Ok(ResultAbciQuery { response })
    }

    /// Ask for information about the application named `app`, announcing the versions this node runs.
    ///
    /// If `app` is not registered, the response lists every registered application instead.
    pub fn abci_info(&self, app: impl Into<AppName>) -> Result<ResultAbciInfo, RouterError> {
        let response = self.connection.info(RequestInfo {
            app: app.into(),
            version: String::from(ENGINE_SEMVER),
            block_version: BLOCK_PROTOCOL,
            p2p_version: P2P_PROTOCOL,
            abci_version: String::from(ABCI_VERSION),
        })?;

        Ok(ResultAbciInfo { response })
    }
}
