//! Folding observed traffic into operation entries.
//!
//! Framework adapters translate their request/response types into
//! [`ObservedRequest`] and [`ObservedResponse`]; everything here works on
//! plain strings and JSON values.

use serde_json::Value;

use crate::document::{Parameter, ParameterLocation, SecurityScheme, SpecDocument};
use crate::infer::{REDACTED, infer_schema, infer_text_type, typed_example};
use crate::matcher::RouteMatch;

/// Request headers that describe the transport or the client rather than the
/// API, and are not documented as parameters.
const IGNORED_REQUEST_HEADERS: &[&str] = &[
    "accept",
    "accept-encoding",
    "accept-language",
    "cache-control",
    "connection",
    "content-length",
    "content-type",
    "cookie",
    "dnt",
    "host",
    "if-modified-since",
    "if-none-match",
    "keep-alive",
    "origin",
    "pragma",
    "referer",
    "te",
    "transfer-encoding",
    "upgrade",
    "upgrade-insecure-requests",
    "user-agent",
];

const IGNORED_HEADER_PREFIXES: &[&str] = &["sec-", "x-forwarded-"];

const IGNORED_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "content-length",
    "content-type",
    "date",
    "keep-alive",
    "server",
    "transfer-encoding",
    "vary",
];

const AUTHORIZATION: &str = "authorization";

/// Security definition names registered from `Authorization` headers.
pub const BASIC_AUTH: &str = "basicAuth";
pub const BEARER_AUTH: &str = "bearerAuth";

/// What the engine needs to know about an incoming request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedRequest {
    pub method: String,
    /// Request target: path plus optional query string.
    pub url: String,
    pub scheme: Option<String>,
    pub host: Option<String>,
    /// Header pairs with lowercase names.
    pub headers: Vec<(String, String)>,
    /// Decoded query pairs.
    pub query: Vec<(String, String)>,
    /// Parsed JSON body, when the request carried one.
    pub body: Option<Value>,
}

impl ObservedRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the engine needs to know about the response to a matched request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedResponse {
    pub status: u16,
    /// Reason phrase used as the response description.
    pub description: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Record scheme/host metadata and fold path parameters, headers, query
/// parameters and body into the matched operation.
pub fn record_request(doc: &mut SpecDocument, route: &RouteMatch, request: &ObservedRequest) {
    let method = request.method.to_lowercase();
    if doc.operation(&route.template, &method).is_none() {
        return;
    }

    if let Some(ref scheme) = request.scheme {
        doc.record_scheme(scheme);
    }
    if let Some(ref host) = request.host {
        doc.record_host(host);
    }

    let security = request.header(AUTHORIZATION).map(security_scheme_for);
    if let Some((name, ref scheme)) = security {
        doc.register_security(name, scheme.clone());
    }

    let Some(op) = doc.operation_mut(&route.template, &method) else {
        return;
    };

    for (name, value) in &route.params {
        op.upsert_parameter(simple_parameter(name, ParameterLocation::Path, value));
    }

    for (name, value) in &request.headers {
        let name = name.to_lowercase();
        if is_ignored_request_header(&name) {
            continue;
        }
        let mut param = simple_parameter(&name, ParameterLocation::Header, value);
        if name == AUTHORIZATION {
            param.example = Some(Value::String(REDACTED.to_string()));
        }
        op.upsert_parameter(param);
    }

    for (name, value) in &request.query {
        op.upsert_parameter(simple_parameter(name, ParameterLocation::Query, value));
    }

    if let Some(ref body) = request.body {
        op.upsert_parameter(Parameter::body(infer_schema(body)));
    }

    if let Some((name, _)) = security {
        op.add_security(name);
    }
}

/// Fold a response into `responses[status]` of the matched operation.
pub fn record_response(
    doc: &mut SpecDocument,
    route: &RouteMatch,
    method: &str,
    response: &ObservedResponse,
) {
    let Some(op) = doc.operation_mut(&route.template, &method.to_lowercase()) else {
        return;
    };

    let entry = op.response_mut(response.status, &response.description);
    if let Some(ref body) = response.body {
        entry.absorb_schema(infer_schema(body));
    }
    for (name, value) in &response.headers {
        let name = name.to_lowercase();
        if IGNORED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        entry.record_header(&name, infer_text_type(value), typed_example(value));
    }

    if let Some(ref content_type) = response.content_type {
        let essence = media_type_essence(content_type);
        if !essence.is_empty() {
            op.add_produces(essence);
        }
    }
}

fn simple_parameter(name: &str, location: ParameterLocation, raw: &str) -> Parameter {
    Parameter::simple(name, location, infer_text_type(raw), typed_example(raw))
}

fn is_ignored_request_header(name: &str) -> bool {
    IGNORED_REQUEST_HEADERS.contains(&name)
        || IGNORED_HEADER_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

fn security_scheme_for(authorization: &str) -> (&'static str, SecurityScheme) {
    let is_basic = authorization
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("basic "));
    if is_basic {
        (BASIC_AUTH, SecurityScheme::basic())
    } else {
        (BEARER_AUTH, SecurityScheme::api_key_header("Authorization"))
    }
}

/// `application/json; charset=utf-8` → `application/json`.
pub fn media_type_essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}

/// Whether a content type carries JSON (`application/json`, `*+json`).
pub fn is_json_media_type(content_type: &str) -> bool {
    let essence = media_type_essence(content_type).to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Info, SchemaType};
    use serde_json::json;

    fn users_doc() -> (SpecDocument, RouteMatch) {
        let mut doc = SpecDocument::new(Info::default());
        doc.seed_route("/users/{id}", &["id".into()], ["GET", "POST"]);
        let route = RouteMatch {
            template: "/users/{id}".into(),
            params: vec![("id".into(), "42".into())],
        };
        (doc, route)
    }

    #[test]
    fn test_path_and_query_parameters() {
        let (mut doc, route) = users_doc();
        let mut req = ObservedRequest::new("GET", "/users/42?verbose=true");
        req.query = vec![("verbose".into(), "true".into())];
        record_request(&mut doc, &route, &req);

        let op = doc.operation("/users/{id}", "get").unwrap();
        let id = op.parameter(ParameterLocation::Path, "id").unwrap();
        assert_eq!(id.param_type, Some(SchemaType::Integer));
        assert_eq!(id.example, Some(json!(42)));
        assert!(id.required);

        let verbose = op.parameter(ParameterLocation::Query, "verbose").unwrap();
        assert_eq!(verbose.param_type, Some(SchemaType::Boolean));
        assert_eq!(verbose.example, Some(json!(true)));
        assert!(!verbose.required);
        assert_eq!(op.parameters[0].name, "id");
    }

    #[test]
    fn test_headers_skip_transport_and_redact_authorization() {
        let (mut doc, route) = users_doc();
        let mut req = ObservedRequest::new("GET", "/users/42");
        req.headers = vec![
            ("host".into(), "localhost".into()),
            ("user-agent".into(), "curl".into()),
            ("sec-fetch-mode".into(), "cors".into()),
            ("x-request-id".into(), "abc".into()),
            ("authorization".into(), "Bearer secret-token".into()),
        ];
        record_request(&mut doc, &route, &req);

        let op = doc.operation("/users/{id}", "get").unwrap();
        let headers: Vec<_> = op
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Header)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(headers, vec!["x-request-id", "authorization"]);

        let auth = op
            .parameter(ParameterLocation::Header, "authorization")
            .unwrap();
        assert_eq!(auth.example, Some(json!(REDACTED)));
        assert!(doc.security_definitions.contains_key(BEARER_AUTH));
        let op = doc.operation("/users/{id}", "get").unwrap();
        assert!(op.security[0].contains_key(BEARER_AUTH));
    }

    #[test]
    fn test_basic_auth_scheme() {
        let (mut doc, route) = users_doc();
        let mut req = ObservedRequest::new("GET", "/users/42");
        req.headers = vec![("authorization".into(), "basic dXNlcjpwdw==".into())];
        record_request(&mut doc, &route, &req);
        assert_eq!(
            doc.security_definitions[BASIC_AUTH],
            SecurityScheme::basic()
        );
    }

    #[test]
    fn test_unknown_method_is_ignored() {
        let (mut doc, route) = users_doc();
        let mut req = ObservedRequest::new("DELETE", "/users/42");
        req.scheme = Some("http".into());
        record_request(&mut doc, &route, &req);
        assert!(doc.schemes.is_empty());
    }

    #[test]
    fn test_body_parameter() {
        let (mut doc, route) = users_doc();
        let mut req = ObservedRequest::new("POST", "/users/42");
        req.body = Some(json!({"name": "Ada", "password": "pw"}));
        record_request(&mut doc, &route, &req);

        let op = doc.operation("/users/{id}", "post").unwrap();
        let body = op.parameter(ParameterLocation::Body, "body").unwrap();
        let schema = body.schema.as_ref().unwrap();
        assert_eq!(schema.properties["name"].example, Some(json!("Ada")));
        assert_eq!(schema.properties["password"].example, Some(json!(REDACTED)));
    }

    #[test]
    fn test_response_recorded_by_status() {
        let (mut doc, route) = users_doc();
        let resp = ObservedResponse {
            status: 200,
            description: "OK".into(),
            content_type: Some("application/json; charset=utf-8".into()),
            headers: vec![
                ("content-length".into(), "12".into()),
                ("x-rate-limit".into(), "99".into()),
            ],
            body: Some(json!({"id": 42})),
        };
        record_response(&mut doc, &route, "GET", &resp);

        let op = doc.operation("/users/{id}", "get").unwrap();
        assert_eq!(op.produces, vec!["application/json"]);
        let ok = &op.responses["200"];
        assert_eq!(ok.description, "OK");
        let schema = ok.schema.as_ref().unwrap();
        assert_eq!(
            schema.properties["id"].schema_type,
            Some(SchemaType::Integer)
        );
        assert_eq!(ok.headers.len(), 1);
        assert_eq!(ok.headers["x-rate-limit"].example, Some(json!(99)));
    }

    #[test]
    fn test_json_media_types() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(is_json_media_type("application/problem+json"));
        assert!(!is_json_media_type("text/html"));
    }
}
