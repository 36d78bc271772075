/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types specific to the router: its error type, the response callback, and the handle returned by
//! asynchronous calls.

use crate::{
    app::AppError,
    messages::{Request, Response},
    state::StateError,
    types::data_types::{AppName, AppVersion},
};

/// App version declared in `Info` responses answered in discovery mode.
pub const DISCOVERY_APP_VERSION: AppVersion = AppVersion::new(1);

/// Function invoked with the request and response of every completed asynchronous call.
///
/// At most one callback is bound to a router at a time. It is invoked while the router holds its lock, so
/// it is never invoked concurrently with itself, and must not call back into the router.
pub type ResponseCallback = Box<dyn Fn(&Request, &Response) + Send>;

/// Handle to a completed asynchronous request and its response.
///
/// The router executes "asynchronous" calls synchronously, so every `ReqRes` it returns is already
/// complete: its response is set and the response callback has already been invoked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReqRes {
    request: Request,
    response: Response,
    callback_invoked: bool,
}

impl ReqRes {
    pub(crate) fn completed(request: Request, response: Response) -> ReqRes {
        ReqRes {
            request,
            response,
            callback_invoked: true,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Whether the response callback has been invoked with this request and response.
    pub fn callback_invoked(&self) -> bool {
        self.callback_invoked
    }
}

/// Errors returned by the router's protocol operations.
///
/// No error is retried or swallowed inside the router. When an operation that fans out to every
/// application fails, the applications invoked before the failing one keep whatever changes the
/// operation made to them.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// No application is registered under the requested name. Returned before any application or state
    /// is touched.
    #[error("unknown app: {app}")]
    UnknownApplication { app: AppName },

    /// An application's own method returned an error.
    #[error("app {app} failed: {source}")]
    DelegateFailure {
        app: AppName,
        #[source]
        source: AppError,
    },

    /// An asynchronous check was requested before any response callback was registered.
    #[error("no response callback registered for asynchronous check on app {app}")]
    NoCallbackRegistered { app: AppName },

    /// Loading, updating, or saving the multiplex state failed.
    #[error(transparent)]
    State(#[from] StateError),

    /// The directory of registered applications could not be encoded for a discovery-mode `Info`.
    #[error("failed to encode application directory: {0}")]
    Discovery(#[from] serde_json::Error),
}

impl RouterError {
    pub(crate) fn unknown_application(app: &AppName) -> RouterError {
        RouterError::UnknownApplication { app: app.clone() }
    }

    pub(crate) fn delegate_failure(app: &AppName, source: AppError) -> RouterError {
        RouterError::DelegateFailure {
            app: app.clone(),
            source,
        }
    }
}
