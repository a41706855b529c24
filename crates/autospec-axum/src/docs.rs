use minijinja::{Environment, context};
use serde_json::Value;

const DOCS_TEMPLATE: &str = include_str!("../templates/docs.html.j2");

const DEFAULT_TITLE: &str = "API documentation";

/// Render the Swagger UI page with `spec` embedded.
pub fn render_docs(spec: &Value, spec_url: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("docs.html", DOCS_TEMPLATE)?;
    let tmpl = env.get_template("docs.html")?;

    let title = spec
        .pointer("/info/title")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TITLE);

    tmpl.render(context! {
        title => title,
        spec_url => spec_url,
        spec_json => minijinja::Value::from_safe_string(embeddable_json(spec)),
    })
}

/// JSON that can sit inside a `<script>` element: `</` is escaped so a
/// string value can never close the tag.
fn embeddable_json(spec: &Value) -> String {
    serde_json::to_string(spec)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_falls_back() {
        let html = render_docs(&json!({"info": {}}), "/api/spec").unwrap();
        assert!(html.contains("<title>API documentation</title>"));
        assert!(html.contains("SwaggerUIBundle({"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = render_docs(&json!({"info": {"title": "a<b>"}}), "/api/spec").unwrap();
        assert!(html.contains("<title>a&lt;b&gt;</title>"));
    }

    #[test]
    fn test_embedded_spec_cannot_close_script() {
        let spec = json!({"info": {"description": "</script><script>alert(1)</script>"}});
        let html = render_docs(&spec, "/api/spec").unwrap();
        assert!(!html.contains("</script><script>alert"));
        insta::assert_snapshot!(embeddable_json(&spec), @r#"{"info":{"description":"<\/script><script>alert(1)<\/script>"}}"#);
    }
}
