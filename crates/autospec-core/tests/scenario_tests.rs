use autospec_core::config::AutospecConfig;
use autospec_core::document::{Info, ParameterLocation, SchemaType};
use autospec_core::{
    ObservedRequest, ObservedResponse, PredefinedSpec, RouteDefinition, SpecStore,
};
use serde_json::json;

fn store_with(routes: &[RouteDefinition]) -> SpecStore {
    let mut store = SpecStore::new(Info::default(), PredefinedSpec::default());
    store.finalize_routes(routes);
    store
}

#[test]
fn get_with_path_and_query_parameters() {
    let mut store = store_with(&[RouteDefinition::new("/users/:id", ["GET"])]);

    let mut req = ObservedRequest::new("GET", "/users/42?verbose=true");
    req.query = vec![("verbose".into(), "true".into())];
    let route = store.apply_request(&req).expect("should match");
    assert_eq!(route.template, "/users/{id}");
    assert_eq!(route.params, vec![("id".to_string(), "42".to_string())]);

    let op = store.document().operation("/users/{id}", "get").unwrap();
    let verbose = op.parameter(ParameterLocation::Query, "verbose").unwrap();
    assert_eq!(verbose.param_type, Some(SchemaType::Boolean));
    assert_eq!(verbose.example, Some(json!(true)));

    let paths = serde_json::to_string_pretty(&store.current_spec()["paths"]).unwrap();
    insta::assert_snapshot!(paths, @r#"
    {
      "/users/{id}": {
        "get": {
          "consumes": [
            "application/json"
          ],
          "parameters": [
            {
              "example": 42,
              "in": "path",
              "name": "id",
              "required": true,
              "type": "integer"
            },
            {
              "example": true,
              "in": "query",
              "name": "verbose",
              "required": false,
              "type": "boolean"
            }
          ],
          "summary": "/users/{id}"
        }
      }
    }
    "#);
}

#[test]
fn body_schema_accumulates_across_requests() {
    let mut store = store_with(&[RouteDefinition::new("/orders", ["POST"])]);

    let mut first = ObservedRequest::new("POST", "/orders");
    first.body = Some(json!({"total": 9.5}));
    store.apply_request(&first).unwrap();

    let mut second = ObservedRequest::new("POST", "/orders");
    second.body = Some(json!({"total": 10, "note": "x"}));
    store.apply_request(&second).unwrap();

    let spec = store.current_spec();
    let params = &spec["paths"]["/orders"]["post"]["parameters"];
    assert_eq!(params.as_array().unwrap().len(), 1);
    let props = &params[0]["schema"]["properties"];
    assert_eq!(props["total"]["type"], "float");
    assert_eq!(props["total"]["example"], 10);
    assert_eq!(props["note"]["type"], "string");
    assert_eq!(props["note"]["example"], "x");
}

#[test]
fn responses_accumulate_per_status() {
    let mut store = store_with(&[RouteDefinition::new("/orders/:id", ["GET"])]);
    let req = ObservedRequest::new("GET", "/orders/5");
    let route = store.apply_request(&req).unwrap();

    store.apply_response(
        &route,
        "GET",
        &ObservedResponse {
            status: 200,
            description: "OK".into(),
            content_type: Some("application/json".into()),
            body: Some(json!({"id": 5, "items": [{"sku": "a"}]})),
            ..ObservedResponse::default()
        },
    );
    store.apply_response(
        &route,
        "GET",
        &ObservedResponse {
            status: 404,
            description: "Not Found".into(),
            content_type: Some("application/json".into()),
            body: Some(json!({"error": "no such order"})),
            ..ObservedResponse::default()
        },
    );

    let spec = store.current_spec();
    let responses = &spec["paths"]["/orders/{id}"]["get"]["responses"];
    assert_eq!(responses["200"]["schema"]["properties"]["id"]["type"], "integer");
    assert_eq!(
        responses["200"]["schema"]["properties"]["items"]["items"]["properties"]["sku"]["type"],
        "string"
    );
    assert_eq!(responses["404"]["description"], "Not Found");
    assert_eq!(
        spec["paths"]["/orders/{id}"]["get"]["produces"],
        json!(["application/json"])
    );
}

#[test]
fn schemes_and_host_are_tracked() {
    let mut store = store_with(&[RouteDefinition::new("/ping", ["GET"])]);
    for (scheme, host) in [
        ("http", "localhost:3000"),
        ("https", "api.example.com"),
        ("http", "other"),
    ] {
        let mut req = ObservedRequest::new("GET", "/ping");
        req.scheme = Some(scheme.into());
        req.host = Some(host.into());
        store.apply_request(&req).unwrap();
    }
    let spec = store.current_spec();
    assert_eq!(spec["schemes"], json!(["http", "https"]));
    assert_eq!(spec["host"], "localhost:3000");
}

#[test]
fn missing_project_file_omits_title_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let config = AutospecConfig {
        project_file: dir.path().join("Cargo.toml"),
        ..AutospecConfig::default()
    };
    let store = SpecStore::from_config(&config, PredefinedSpec::default());
    let spec = store.current_spec();
    assert!(spec["info"].get("title").is_none());
    assert!(spec["info"].get("version").is_none());
    assert_eq!(spec["info"]["description"], "[Specification JSON](/api/spec)");
}

#[test]
fn project_file_seeds_info() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("Cargo.toml");
    std::fs::write(
        &manifest,
        "[package]\nname = \"orders\"\nversion = \"0.3.0\"\nlicense = \"MIT\"\n",
    )
    .unwrap();
    let config = AutospecConfig {
        project_file: manifest,
        ..AutospecConfig::default()
    };
    let spec = SpecStore::from_config(&config, PredefinedSpec::default()).current_spec();
    assert_eq!(spec["info"]["title"], "orders");
    assert_eq!(spec["info"]["version"], "0.3.0");
    assert_eq!(spec["info"]["license"]["name"], "MIT");
}

#[test]
fn predefined_override_survives_new_observations() {
    let predefined = PredefinedSpec::fragment(json!({
        "paths": {"/ping": {"get": {"summary": "Liveness probe"}}}
    }));
    let mut store = SpecStore::new(Info::default(), predefined);
    store.finalize_routes(&[RouteDefinition::new("/ping", ["GET"])]);

    let mut req = ObservedRequest::new("GET", "/ping");
    req.query = vec![("probe".into(), "1".into())];
    store.apply_request(&req).unwrap();

    let spec = store.current_spec();
    assert_eq!(spec["paths"]["/ping"]["get"]["summary"], "Liveness probe");
    assert_eq!(
        spec["paths"]["/ping"]["get"]["parameters"][0]["name"],
        "probe"
    );
    // the synthesized document itself is never rewritten by the override
    assert_eq!(store.synthesized()["paths"]["/ping"]["get"]["summary"], "/ping");
}
