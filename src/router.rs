//! Named-route registry.
//!
//! An ordered table of route descriptors. Dispatch is one linear pass, first
//! match wins; reversal goes through a name index. No reflection, no regex
//! engine: placeholders are either `{name}` (any non-empty segment) or
//! `{name:[0-9]+}` (digits only).
//!
//! ```rust
//! # use std::sync::Arc;
//! # use leaflet::{Method, Request, Response, Router};
//! # async fn show(_: Request, _: Arc<()>) -> Response { Response::html("") }
//! let router: Router<()> = Router::new()
//!     .on(Method::Get, "/articles/{id:[0-9]+}", "articles.show", show);
//!
//! assert_eq!(router.url_for("articles.show", &[("id", "42")]).as_deref(), Some("/articles/42"));
//! assert_eq!(router.url_for("articles.nope", &[]), None);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The only placeholder constraint the registry understands.
const NUMERIC: &str = "[0-9]+";

// ── Pattern ───────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Segment {
    Literal(String),
    Param { name: String, numeric: bool },
}

/// A parsed path pattern such as `/articles/{id:[0-9]+}/edit`.
#[derive(Debug)]
struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(raw: &str) -> Result<Self, String> {
        let rest = raw.strip_prefix('/').ok_or("pattern must start with `/`")?;
        if rest.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }

        let mut segments = Vec::new();
        for part in rest.split('/') {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(inner) => {
                    let (name, numeric) = match inner.split_once(':') {
                        Some((name, NUMERIC)) => (name, true),
                        Some((_, other)) => return Err(format!("unsupported constraint `{other}`")),
                        None => (inner, false),
                    };
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(format!("invalid placeholder name `{name}`"));
                    }
                    if segments.iter().any(|s| matches!(s, Segment::Param { name: n, .. } if n == name)) {
                        return Err(format!("duplicate placeholder `{name}`"));
                    }
                    Segment::Param { name: name.to_owned(), numeric }
                }
                None if part.is_empty() || part.contains(['{', '}']) => {
                    return Err(format!("invalid segment `{part}`"));
                }
                None => Segment::Literal(part.to_owned()),
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Matches a request path, returning the placeholder values on success.
    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() { Vec::new() } else { rest.split('/').collect() };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param { name, numeric } => {
                    if !segment_allows(part, *numeric) {
                        return None;
                    }
                    params.insert(name.clone(), part.to_owned());
                }
            }
        }
        Some(params)
    }

    /// Rebuilds a concrete path. `None` when a placeholder is missing or its
    /// value violates the constraint.
    fn reverse(&self, params: &[(&str, &str)]) -> Option<String> {
        if self.segments.is_empty() {
            return Some("/".to_owned());
        }

        let mut url = String::new();
        for segment in &self.segments {
            url.push('/');
            match segment {
                Segment::Literal(lit) => url.push_str(lit),
                Segment::Param { name, numeric } => {
                    let (_, value) = params.iter().find(|(k, _)| k == name)?;
                    if !segment_allows(value, *numeric) || value.contains('/') {
                        return None;
                    }
                    url.push_str(value);
                }
            }
        }
        Some(url)
    }
}

fn segment_allows(value: &str, numeric: bool) -> bool {
    !value.is_empty() && (!numeric || value.bytes().all(|b| b.is_ascii_digit()))
}

// ── Router ────────────────────────────────────────────────────────────────────

struct Route<S> {
    method: Method,
    name: &'static str,
    pattern: Pattern,
    handler: BoxedHandler<S>,
}

/// A successful dispatch: which route matched and what it captured.
pub struct RouteMatch<S> {
    pub name: &'static str,
    pub(crate) handler: BoxedHandler<S>,
    pub params: HashMap<String, String>,
}

/// The application route registry.
///
/// Build it once at startup. Each [`Router::on`] call returns `self` so
/// registrations chain naturally; registration order is dispatch order.
pub struct Router<S> {
    routes: Vec<Route<S>>,
    names: HashMap<&'static str, usize>,
}

impl<S> Router<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new(), names: HashMap::new() }
    }

    /// Register a named handler for a method + pattern pair.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is malformed or `name` is already registered. Both
    /// are programming errors in the fixed route table.
    pub fn on(mut self, method: Method, pattern: &str, name: &'static str, handler: impl Handler<S>) -> Self {
        let parsed = Pattern::parse(pattern)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        if self.names.insert(name, self.routes.len()).is_some() {
            panic!("duplicate route name `{name}`");
        }
        self.routes.push(Route {
            method,
            name,
            pattern: parsed,
            handler: handler.into_boxed_handler(),
        });
        self
    }

    /// Finds the first route whose method and pattern both match.
    pub fn dispatch(&self, method: Method, path: &str) -> Option<RouteMatch<S>> {
        self.routes.iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                let params = route.pattern.matches(path)?;
                Some(RouteMatch {
                    name: route.name,
                    handler: Arc::clone(&route.handler),
                    params,
                })
            })
    }

    /// Reverse lookup: the relative URL of route `name` with `params` filled in.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let idx = self.names.get(name)?;
        self.routes[*idx].pattern.reverse(params)
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self { Self::new() }
}
