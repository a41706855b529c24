//! Observation middleware.
//!
//! The request phase runs before the inner service and records the matched
//! operation's parameters and body; the response phase runs after it,
//! records the response and writes the document when persistence is on.
//! Neither phase can stop a request: anything that goes wrong is logged and
//! the original (or re-assembled) message is passed on.

use std::sync::Arc;

use autospec_core::observe::is_json_media_type;
use autospec_core::{ObservedRequest, ObservedResponse};
use axum::body::{Body, Bytes, HttpBody};
use axum::extract::{Query, Request, State};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Uri};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use crate::observer::SpecObserver;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Middleware entry point, installed with
/// `axum::middleware::from_fn_with_state(observer, observe)`.
pub async fn observe(
    State(observer): State<Arc<SpecObserver>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let route = observer.resolve(&method, &url);
    let request = match route {
        Some(_) => observe_request(&observer, method.clone(), url, request).await,
        None => request,
    };

    let response = next.run(request).await;

    let (response, observed) = match route {
        Some(ref route) => {
            let (response, observed) = observe_response(&observer, response).await;
            (response, Some((route, observed)))
        }
        None => (response, None),
    };

    let finished = observer.finish(
        observed
            .as_ref()
            .map(|(route, resp)| (*route, method.as_str(), resp)),
    );
    if let Err(e) = finished {
        log::error!("failed to persist spec: {e}");
    }

    response
}

async fn observe_request(
    observer: &SpecObserver,
    method: String,
    url: String,
    request: Request,
) -> Request {
    let (parts, body) = request.into_parts();
    let limit = observer.config().max_body_bytes;

    let (body, json) = if declares_json(&parts.headers) {
        capture_json(body, limit).await
    } else {
        (body, None)
    };

    let observed = ObservedRequest {
        method,
        url,
        scheme: Some(scheme_of(&parts)),
        host: host_of(&parts),
        headers: header_pairs(&parts.headers),
        query: query_pairs(&parts.uri),
        body: json,
    };
    observer.record_request(&observed);

    Request::from_parts(parts, body)
}

async fn observe_response(
    observer: &SpecObserver,
    response: Response,
) -> (Response, ObservedResponse) {
    let (parts, body) = response.into_parts();
    let limit = observer.config().max_body_bytes;

    let (body, json) = if declares_json(&parts.headers) {
        capture_json(body, limit).await
    } else {
        (body, None)
    };

    let observed = ObservedResponse {
        status: parts.status.as_u16(),
        description: parts
            .status
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
        content_type: header_str(&parts.headers, CONTENT_TYPE.as_str()).map(str::to_string),
        headers: header_pairs(&parts.headers),
        body: json,
    };

    (Response::from_parts(parts, body), observed)
}

fn declares_json(headers: &HeaderMap) -> bool {
    header_str(headers, CONTENT_TYPE.as_str()).is_some_and(is_json_media_type)
}

/// Buffer a body of known size and parse it as JSON, returning a body that
/// replays the same bytes. Bodies without a size bound, or larger than
/// `limit`, are passed through untouched.
async fn capture_json(body: Body, limit: usize) -> (Body, Option<Value>) {
    let within_limit = body
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= limit as u64);
    if !within_limit {
        return (body, None);
    }

    let bytes: Bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("failed to buffer body for inspection: {e}");
            return (failed_body(e), None);
        }
    };

    let json = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("body is not valid JSON, skipping schema: {e}");
            None
        }
    };
    (Body::from(bytes), json)
}

/// A body whose first read yields `error`, so the inner service sees the
/// broken transfer instead of an empty payload.
fn failed_body(error: axum::Error) -> Body {
    Body::from_stream(futures_util::stream::once(async move {
        Err::<Bytes, _>(error)
    }))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    match Query::<Vec<(String, String)>>::try_from_uri(uri) {
        Ok(Query(pairs)) => pairs,
        Err(e) => {
            log::debug!("unparsable query string in {uri}: {e}");
            Vec::new()
        }
    }
}

fn scheme_of(parts: &Parts) -> String {
    let forwarded = header_str(&parts.headers, FORWARDED_PROTO)
        .and_then(|proto| proto.split(',').next())
        .map(str::trim)
        .filter(|proto| !proto.is_empty());
    match forwarded {
        Some(proto) => proto.to_ascii_lowercase(),
        None => parts.uri.scheme_str().unwrap_or("http").to_string(),
    }
}

fn host_of(parts: &Parts) -> Option<String> {
    header_str(&parts.headers, HOST.as_str())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_scheme_prefers_forwarded_proto() {
        let p = parts(HttpRequest::builder().uri("/x").header(FORWARDED_PROTO, "HTTPS, http"));
        assert_eq!(scheme_of(&p), "https");

        let p = parts(HttpRequest::builder().uri("/x"));
        assert_eq!(scheme_of(&p), "http");

        let p = parts(HttpRequest::builder().uri("https://api.example.com/x"));
        assert_eq!(scheme_of(&p), "https");
    }

    #[test]
    fn test_host_from_header_or_authority() {
        let p = parts(HttpRequest::builder().uri("/x").header("host", "localhost:3000"));
        assert_eq!(host_of(&p).as_deref(), Some("localhost:3000"));

        let p = parts(HttpRequest::builder().uri("http://example.com:8080/x"));
        assert_eq!(host_of(&p).as_deref(), Some("example.com:8080"));

        let p = parts(HttpRequest::builder().uri("/x"));
        assert_eq!(host_of(&p), None);
    }

    #[test]
    fn test_query_pairs_are_decoded() {
        let uri: Uri = "/search?q=hello%20world&page=2".parse().unwrap();
        assert_eq!(
            query_pairs(&uri),
            vec![
                ("q".to_string(), "hello world".to_string()),
                ("page".to_string(), "2".to_string())
            ]
        );
        let uri: Uri = "/search".parse().unwrap();
        assert!(query_pairs(&uri).is_empty());
    }

    #[tokio::test]
    async fn test_capture_json_replays_body() {
        let (body, json) = capture_json(Body::from(r#"{"a":1}"#), 1024).await;
        assert_eq!(json, Some(serde_json::json!({"a": 1})));
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_capture_json_skips_oversized_bodies() {
        let (body, json) = capture_json(Body::from(vec![b'1'; 64]), 16).await;
        assert_eq!(json, None);
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(bytes.len(), 64);
    }

    #[tokio::test]
    async fn test_failed_body_reports_the_error() {
        let error = axum::Error::new(std::io::Error::other("connection reset"));
        let result = axum::body::to_bytes(failed_body(error), usize::MAX).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_capture_json_keeps_invalid_json_bytes() {
        let (body, json) = capture_json(Body::from("not json"), 1024).await;
        assert_eq!(json, None);
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"not json");
    }
}
