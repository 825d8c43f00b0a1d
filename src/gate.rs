//! Static header gate.
//!
//! Every document route is guarded by a fixed set of headers that must be
//! present with an exact, case-sensitive value. The set is taken from the
//! configuration at startup and never changes afterwards.

use indexmap::IndexMap;
use thiserror::Error;

use crate::http::headers::HttpHeaders;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing or invalid header: {header}")]
pub struct GateError {
    /// Name of the first required header that did not match.
    pub header: String,
}

#[derive(Debug, Clone)]
pub struct HeaderGate {
    requirements: IndexMap<String, String>,
}

impl HeaderGate {
    pub fn new(requirements: IndexMap<String, String>) -> Self {
        Self { requirements }
    }

    /// Checks the requirements in declaration order and reports the first
    /// header that is missing or carries a different value.
    pub fn check(&self, headers: &HttpHeaders) -> Result<(), GateError> {
        for (name, expected) in &self.requirements {
            if headers.get(name) != Some(expected.as_str()) {
                return Err(GateError {
                    header: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn gate() -> HeaderGate {
        HeaderGate::new(ServerConfig::default().required_headers)
    }

    fn headers(pairs: &[(&str, &str)]) -> HttpHeaders {
        let mut headers = HttpHeaders::new();
        for (name, value) in pairs {
            headers.set_raw(name, value);
        }
        headers
    }

    #[test]
    fn passes_with_exact_values() {
        let h = headers(&[
            ("x-requested-with", "XMLHttpRequest"),
            ("authorization", "Bearer your_token"),
        ]);
        assert!(gate().check(&h).is_ok());
    }

    #[test]
    fn reports_first_failing_header_only() {
        let err = gate().check(&HttpHeaders::new()).unwrap_err();
        assert_eq!(err.header, "X-Requested-With");
        assert_eq!(err.to_string(), "Missing or invalid header: X-Requested-With");
    }

    #[test]
    fn mismatch_is_reported_like_missing() {
        let h = headers(&[
            ("X-Requested-With", "XMLHttpRequest"),
            ("Authorization", "Bearer wrong_token"),
        ]);
        assert_eq!(gate().check(&h).unwrap_err().header, "Authorization");
    }

    #[test]
    fn values_are_case_sensitive() {
        let h = headers(&[
            ("X-Requested-With", "xmlhttprequest"),
            ("Authorization", "Bearer your_token"),
        ]);
        assert_eq!(gate().check(&h).unwrap_err().header, "X-Requested-With");
    }

    #[test]
    fn empty_requirement_set_accepts_everything() {
        let gate = HeaderGate::new(IndexMap::new());
        assert!(gate.check(&HttpHeaders::new()).is_ok());
    }
}
