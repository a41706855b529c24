use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::AutospecConfig;
use crate::document::{Info, SpecDocument};
use crate::error::StoreError;
use crate::matcher::{PathMatcher, RouteDefinition, RouteMatch, RouteTemplate, strip_query};
use crate::merge::PredefinedSpec;
use crate::observe::{self, ObservedRequest, ObservedResponse};
use crate::project::project_info_or_default;

/// Owns the synthesized document, the route templates it was seeded from,
/// and the predefined spec applied on every read.
#[derive(Debug)]
pub struct SpecStore {
    document: SpecDocument,
    matcher: PathMatcher,
    predefined: PredefinedSpec,
    persist_path: Option<PathBuf>,
    excluded: Vec<String>,
    finalized: bool,
}

impl SpecStore {
    pub fn new(info: Info, predefined: PredefinedSpec) -> Self {
        Self {
            document: SpecDocument::new(info),
            matcher: PathMatcher::new(),
            predefined,
            persist_path: None,
            excluded: Vec::new(),
            finalized: false,
        }
    }

    /// Build a store from configuration: `info` from the project file,
    /// persistence from `save`/`path`, own endpoints excluded from matching.
    pub fn from_config(config: &AutospecConfig, predefined: PredefinedSpec) -> Self {
        let info = project_info_or_default(&config.project_file).to_info(&config.spec_endpoint);
        let mut store = Self::new(info, predefined);
        store.persist_path = config.persist_path().map(Path::to_path_buf);
        store.exclude(&config.spec_endpoint);
        store.exclude(&config.docs_endpoint);
        store
    }

    pub fn with_persistence(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    /// Never match requests to `path`.
    pub fn exclude(&mut self, path: &str) {
        if !self.excluded.iter().any(|p| p == path) {
            self.excluded.push(path.to_string());
        }
    }

    /// Seed the document from the host's route table and enable request
    /// observation. May be called again to add routes registered later.
    pub fn finalize_routes(&mut self, routes: &[RouteDefinition]) {
        for route in routes {
            let template = RouteTemplate::parse(&route.path);
            let params = template.param_names();
            self.document.seed_route(
                template.as_str(),
                &params,
                route.methods.iter().map(String::as_str),
            );
            self.matcher.insert(template);
        }
        self.finalized = true;
        log::debug!(
            "seeded {} route templates from {} routes",
            self.matcher.len(),
            routes.len()
        );
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn document(&self) -> &SpecDocument {
        &self.document
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    /// Resolve a request to a known operation. `OPTIONS`, methods without an
    /// operation, and the observer's own endpoints are unmatched.
    pub fn resolve(&self, method: &str, url: &str) -> Option<RouteMatch> {
        let path = strip_query(url);
        if self.excluded.iter().any(|p| p == path) {
            return None;
        }
        let method = method.to_lowercase();
        if method == "options" {
            return None;
        }
        let route = self.matcher.resolve(path)?;
        self.document.operation(&route.template, &method)?;
        Some(route)
    }

    /// Fold a request into its operation. Returns the match, if any.
    pub fn apply_request(&mut self, request: &ObservedRequest) -> Option<RouteMatch> {
        let route = self.resolve(&request.method, &request.url)?;
        observe::record_request(&mut self.document, &route, request);
        Some(route)
    }

    /// Fold a response into the operation of an already resolved request.
    pub fn apply_response(&mut self, route: &RouteMatch, method: &str, response: &ObservedResponse) {
        observe::record_response(&mut self.document, route, method, response);
    }

    /// The synthesized document before the predefined spec is applied.
    pub fn synthesized(&self) -> Value {
        serde_json::to_value(&self.document).unwrap_or_else(|e| {
            log::error!("failed to serialize spec document: {e}");
            Value::Object(Map::new())
        })
    }

    /// The published document: synthesized content with the predefined spec
    /// applied. Computed fresh on every call.
    pub fn current_spec(&self) -> Value {
        self.predefined.apply(self.synthesized())
    }

    /// Overwrite the persistence file with the current document. A no-op when
    /// persistence is disabled.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(ref path) = self.persist_path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&self.current_spec())?;
        fs::write(path, content).map_err(|source| StoreError::Persist {
            path: path.clone(),
            source,
        })
    }
}
