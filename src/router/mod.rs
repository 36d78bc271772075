/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The multiplexer itself: a single application, as far as consensus can tell, that routes each call to
//! the application named in the request.
//!
//! A router is configured and started using the builder in [`spec`]:
//!
//! ```ignore
//! let router = RouterSpec::builder()
//!     .apps(apps)
//!     .kv_store(kv_store)
//!     .configuration(Configuration::default())
//!     .build()
//!     .start()?;
//! ```
//!
//! The router's operations are listed in [`implementation`].

pub mod implementation;

pub mod spec;

pub mod types;

pub use implementation::Router;
pub use spec::{Configuration, RouterSpec};
pub use types::{ReqRes, ResponseCallback, RouterError, DISCOVERY_APP_VERSION};
