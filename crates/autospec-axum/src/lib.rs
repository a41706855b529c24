//! axum integration for autospec.
//!
//! ```no_run
//! use autospec_axum::{RouteDefinition, SpecObserver, attach};
//! use autospec_core::{AutospecConfig, PredefinedSpec};
//! use axum::{Router, routing::get};
//!
//! # async fn run() {
//! let observer = SpecObserver::new(AutospecConfig::default(), PredefinedSpec::default());
//! let app = attach(
//!     Router::new().route("/users/{id}", get(|| async { "ok" })),
//!     observer.clone(),
//! );
//! observer.finalize_routes(&[RouteDefinition::new("/users/{id}", ["GET"])]);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod docs;
pub mod endpoints;
pub mod middleware;
pub mod observer;

use std::sync::Arc;

use axum::Router;

pub use autospec_core::RouteDefinition;
pub use observer::SpecObserver;

/// Add the spec and docs endpoints to `router` and wrap everything in the
/// observation middleware.
pub fn attach(router: Router, observer: Arc<SpecObserver>) -> Router {
    router
        .merge(endpoints::spec_routes(Arc::clone(&observer)))
        .layer(axum::middleware::from_fn_with_state(
            observer,
            middleware::observe,
        ))
}
