//! Route templates and request-path resolution.
//!
//! Host frameworks register routes in their own syntax (`/users/:id` for
//! express-style routers, `/users/{id}` for axum). Both are tokenized into
//! literal and placeholder segments and rendered back in the `{name}` form
//! used as the document's path keys. Resolution walks template segments and
//! URL segments side by side; no patterns are compiled per request.

use indexmap::IndexMap;

/// A route as enumerated from the host framework at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub path: String,
    pub methods: Vec<String>,
}

impl RouteDefinition {
    pub fn new<M, I>(path: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        Self {
            path: path.into(),
            methods: methods
                .into_iter()
                .map(|m| m.as_ref().to_string())
                .collect(),
        }
    }
}

/// One `/`-separated piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A normalized route template such as `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    template: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Tokenize a route in either `:name` or `{name}` syntax.
    ///
    /// Empty segments are dropped, so `/users/` and `/users` normalize to the
    /// same template. An axum catch-all `{*rest}` is kept as the single-segment
    /// placeholder `{rest}`.
    pub fn parse(raw: &str) -> Self {
        let segments: Vec<Segment> = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(parse_segment)
            .collect();

        let template = if segments.is_empty() {
            "/".to_string()
        } else {
            segments
                .iter()
                .map(|seg| match seg {
                    Segment::Literal(text) => format!("/{text}"),
                    Segment::Param(name) => format!("/{{{name}}}"),
                })
                .collect()
        };

        Self { template, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in left-to-right order.
    pub fn param_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Param(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Match a query-free request path, returning the captured parameters.
    ///
    /// Placeholders consume exactly one non-empty segment. A single trailing
    /// `/` on the path is accepted.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let rest = path.strip_prefix('/')?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(text) if text == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => params.push((name.clone(), part.to_string())),
            }
        }
        Some(params)
    }
}

impl std::fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

fn parse_segment(raw: &str) -> Segment {
    if let Some(name) = raw.strip_prefix(':').filter(|n| !n.is_empty()) {
        return Segment::Param(name.to_string());
    }
    if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        let name = inner.strip_prefix('*').unwrap_or(inner);
        if !name.is_empty() {
            return Segment::Param(name.to_string());
        }
    }
    Segment::Literal(raw.to_string())
}

/// Result of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub template: String,
    pub params: Vec<(String, String)>,
}

/// The set of known templates, in registration order.
///
/// Overlapping templates are not an error: the first registered template
/// that matches wins. Register `/users/me` before `/users/{id}` if both exist.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    templates: IndexMap<String, RouteTemplate>,
}

impl PathMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template. Re-registering an equivalent template keeps its
    /// original position.
    pub fn insert(&mut self, template: RouteTemplate) -> &RouteTemplate {
        self.templates
            .entry(template.as_str().to_string())
            .or_insert(template)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Resolve a raw request URL (query string allowed) to a template.
    pub fn resolve(&self, url: &str) -> Option<RouteMatch> {
        let path = strip_query(url);

        if let Some(template) = self.templates.get(path) {
            if let Some(params) = template.matches(path) {
                return Some(RouteMatch {
                    template: template.as_str().to_string(),
                    params,
                });
            }
        }

        self.templates.values().find_map(|template| {
            template.matches(path).map(|params| RouteMatch {
                template: template.as_str().to_string(),
                params,
            })
        })
    }
}

impl<'a> FromIterator<&'a str> for PathMatcher {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut matcher = PathMatcher::new();
        for raw in iter {
            matcher.insert(RouteTemplate::parse(raw));
        }
        matcher
    }
}

/// Drop the query string and fragment from a request target.
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
