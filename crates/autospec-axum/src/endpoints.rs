use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};

use crate::docs::render_docs;
use crate::observer::SpecObserver;

/// Routes serving the raw document and the documentation page, at the
/// endpoints named in the observer's config.
pub fn spec_routes(observer: Arc<SpecObserver>) -> Router {
    let config = observer.config();
    Router::new()
        .route(&config.spec_endpoint, get(spec_json))
        .route(&config.docs_endpoint, any(docs_page))
        .with_state(Arc::clone(&observer))
}

async fn spec_json(State(observer): State<Arc<SpecObserver>>) -> Response {
    match serde_json::to_string_pretty(&observer.spec()) {
        Ok(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            log::error!("failed to serialize spec: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn docs_page(State(observer): State<Arc<SpecObserver>>) -> Response {
    let spec = observer.spec();
    match render_docs(&spec, &observer.config().spec_endpoint) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("failed to render docs page: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
