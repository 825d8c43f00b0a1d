//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! Headers are stored in an ordered map to preserve insertion order.
//! Lookups are case-insensitive on the name: the map is keyed by the
//! lowercased name while the original spelling is kept for serialization.
//! Values are stored verbatim, without trimming beyond what the parser
//! already did, so that comparisons against expected values stay exact.
//!
//! This abstraction does not enforce any HTTP semantics.
//! Request-level checks live in the [`validator`](crate::http::validator)
//! module and in the [`gate`](crate::gate).

use indexmap::IndexMap;
use indexmap::map::Entry;

#[derive(Debug, Clone, Default)]
pub struct HttpHeaders {
    headers: IndexMap<String, (String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Sets a header, replacing any previous value under the same name.
    pub fn set_raw(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), (name.to_string(), value.to_string()));
    }

    /// Adds a header unless one with the same name is already present.
    ///
    /// Used by the parser: for repeated request headers the first
    /// occurrence wins.
    pub fn append_raw(&mut self, name: &str, value: &str) {
        if let Entry::Vacant(slot) = self.headers.entry(name.to_ascii_lowercase()) {
            slot.insert((name.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in self.headers.values() {
            result.push_str(&format!("{}: {}\r\n", name, value));
        }
        result
    }
}
