use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use autospec_core::error::{ConfigError, StoreError};
use autospec_core::{
    AutospecConfig, ObservedRequest, ObservedResponse, PredefinedSpec, RouteDefinition,
    RouteMatch, SpecStore,
};
use serde_json::Value;

/// Shared handle to the synthesized document of one server.
///
/// Startup is two-phase: create the observer and [`attach`](crate::attach) it
/// to the router, then call [`SpecObserver::finalize_routes`] once every route
/// is registered. Until then no request is matched and nothing is recorded.
#[derive(Debug)]
pub struct SpecObserver {
    config: AutospecConfig,
    store: Mutex<SpecStore>,
}

impl SpecObserver {
    pub fn new(config: AutospecConfig, predefined: PredefinedSpec) -> Arc<Self> {
        let store = SpecStore::from_config(&config, predefined);
        Arc::new(Self {
            config,
            store: Mutex::new(store),
        })
    }

    /// Create an observer whose predefined fragment is loaded from
    /// `config.predefined`.
    pub fn from_config(config: AutospecConfig) -> Result<Arc<Self>, ConfigError> {
        let predefined = config.load_predefined()?;
        Ok(Self::new(config, predefined))
    }

    pub fn config(&self) -> &AutospecConfig {
        &self.config
    }

    /// Seed the document from the application's routes and start observing.
    pub fn finalize_routes(&self, routes: &[RouteDefinition]) {
        self.store().finalize_routes(routes);
    }

    pub fn is_finalized(&self) -> bool {
        self.store().is_finalized()
    }

    /// The published document, as served by the spec endpoint.
    pub fn spec(&self) -> Value {
        self.store().current_spec()
    }

    pub(crate) fn resolve(&self, method: &str, url: &str) -> Option<RouteMatch> {
        self.store().resolve(method, url)
    }

    pub(crate) fn record_request(&self, request: &ObservedRequest) {
        if self.store().apply_request(request).is_none() {
            log::debug!("{} {} is not a documented operation", request.method, request.url);
        }
    }

    /// Record the response of a matched request (if any) and write the
    /// document, under a single lock.
    pub(crate) fn finish(
        &self,
        observed: Option<(&RouteMatch, &str, &ObservedResponse)>,
    ) -> Result<(), StoreError> {
        let mut store = self.store();
        if let Some((route, method, response)) = observed {
            store.apply_response(route, method, response);
        }
        store.persist()
    }

    fn store(&self) -> MutexGuard<'_, SpecStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
