//! Incoming HTTP request type.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::de::value::MapDeserializer;

use crate::method::Method;

/// An incoming HTTP request with its body fully read.
///
/// The server builds one per hyper request; tests build them directly:
///
/// ```rust
/// use leaflet::{Method, Request};
///
/// let req = Request::new(Method::Post, "/articles")
///     .with_header("content-type", "application/x-www-form-urlencoded")
///     .with_body("title=Hello&body=Hello%2C+world%21");
/// assert_eq!(req.path(), "/articles");
/// ```
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/articles/{id:[0-9]+}`, `req.param("id")` on `/articles/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes an `application/x-www-form-urlencoded` body into `T`.
    ///
    /// A body of any other content type contributes no fields. When a field
    /// repeats, its first value wins. Values reach `T` as strings.
    pub fn form<T: DeserializeOwned>(&self) -> Result<T, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = if self.is_urlencoded() {
            serde_urlencoded::from_bytes(&self.body)?
        } else {
            Vec::new()
        };
        let mut seen = HashSet::new();
        let first = pairs.into_iter().filter(|(key, _)| seen.insert(key.clone()));
        T::deserialize(MapDeserializer::new(first))
    }

    fn is_urlencoded(&self) -> bool {
        self.header("content-type")
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
    }
}
