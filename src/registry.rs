//! The fixed mapping from application name to application.

use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
};

use crate::{app::App, types::data_types::AppName};

/// Applications a [router](crate::router::Router) can route to, keyed by their unique names.
///
/// An `AppRegistry` is assembled by the caller before the router starts, and is read-only after it is
/// handed to [`RouterSpec`](crate::router::RouterSpec). Registering two applications under the same
/// name keeps the later one.
#[derive(Default)]
pub struct AppRegistry(HashMap<AppName, Box<dyn App>>);

impl AppRegistry {
    /// Create an empty `AppRegistry`.
    pub fn new() -> AppRegistry {
        AppRegistry(HashMap::new())
    }

    /// Register `app` under `name`, returning the registry for chaining.
    pub fn with_app(mut self, name: impl Into<AppName>, app: impl App + 'static) -> AppRegistry {
        self.insert(name, Box::new(app));
        self
    }

    /// Register `app` under `name`.
    pub fn insert(&mut self, name: impl Into<AppName>, app: Box<dyn App>) {
        let name = name.into();
        if self.0.insert(name.clone(), app).is_some() {
            log::warn!("Application {} registered twice, keeping the later registration", name);
        }
    }

    /// Whether an application is registered under `name`.
    pub fn contains(&self, name: &AppName) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of every registered application, in ascending order.
    pub fn names(&self) -> Vec<AppName> {
        let mut names: Vec<AppName> = self.0.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn get_mut(&mut self, name: &AppName) -> Option<&mut Box<dyn App>> {
        self.0.get_mut(name)
    }

    /// Iterate mutably through every registered application in ascending name order.
    ///
    /// Fan-out operations visit applications in this order so that a failure always stops the fan-out
    /// at the same application, whatever the hash map's internal layout.
    pub(crate) fn iter_sorted_mut(&mut self) -> impl Iterator<Item = (&AppName, &mut Box<dyn App>)> {
        let mut entries: Vec<(&AppName, &mut Box<dyn App>)> = self.0.iter_mut().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter()
    }
}

impl FromIterator<(AppName, Box<dyn App>)> for AppRegistry {
    fn from_iter<T: IntoIterator<Item = (AppName, Box<dyn App>)>>(iter: T) -> Self {
        let mut registry = AppRegistry::new();
        for (name, app) in iter {
            registry.insert(name, app);
        }
        registry
    }
}

impl Debug for AppRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AppRegistry").field(&self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::AppError, messages::*};

    struct NoopApp;

    impl App for NoopApp {
        fn info(&mut self, _: &RequestInfo) -> Result<ResponseInfo, AppError> {
            Ok(ResponseInfo::default())
        }

        fn query(&mut self, _: &RequestQuery) -> Result<ResponseQuery, AppError> {
            Ok(ResponseQuery::default())
        }

        fn check_tx(&mut self, _: &RequestCheckTx) -> Result<ResponseCheckTx, AppError> {
            Ok(ResponseCheckTx::default())
        }

        fn init_chain(&mut self, _: &RequestInitChain) -> Result<ResponseInitChain, AppError> {
            Ok(ResponseInitChain::default())
        }

        fn finalize_block(
            &mut self,
            _: &RequestFinalizeBlock,
        ) -> Result<ResponseFinalizeBlock, AppError> {
            Ok(ResponseFinalizeBlock::default())
        }

        fn commit(&mut self, _: &RequestCommit) -> Result<ResponseCommit, AppError> {
            Ok(ResponseCommit::default())
        }
    }

    #[test]
    fn names_are_sorted() {
        let registry = AppRegistry::new()
            .with_app("zeta", NoopApp)
            .with_app("alpha", NoopApp)
            .with_app("mu", NoopApp);

        assert_eq!(
            registry.names(),
            vec![AppName::from("alpha"), AppName::from("mu"), AppName::from("zeta")]
        );
    }

    #[test]
    fn fan_out_order_is_ascending() {
        let mut registry = AppRegistry::new()
            .with_app("c", NoopApp)
            .with_app("a", NoopApp)
            .with_app("b", NoopApp);

        let visited: Vec<String> = registry
            .iter_sorted_mut()
            .map(|(name, _)| name.to_string())
            .collect();
        assert_eq!(visited, vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_name_keeps_one_entry() {
        let registry = AppRegistry::new()
            .with_app("a", NoopApp)
            .with_app("a", NoopApp);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&AppName::from("a")));
    }

    #[test]
    fn collect_from_named_apps() {
        let registry: AppRegistry = ["b", "a"]
            .into_iter()
            .map(|name| (AppName::from(name), Box::new(NoopApp) as Box<dyn App>))
            .collect();

        assert_eq!(registry.names(), vec![AppName::from("a"), AppName::from("b")]);
        assert!(!registry.is_empty());
    }
}
