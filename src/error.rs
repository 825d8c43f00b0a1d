use serde_json::{Value, json};
use thiserror::Error;

use crate::gate::GateError;
use crate::http::status::HttpStatus;
use crate::store::StoreError;

/// Request-local failures, each rendered as a status code and a JSON body
/// of the form `{"error": ..., "description": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Missing or invalid header: {0}")]
    HeaderRejected(String),

    #[error("Invalid Content-Type")]
    UnsupportedContentType(Option<String>),

    #[error("Invalid JSON")]
    InvalidPayload(String),

    #[error("Not found")]
    NotFound(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },

    /// Failures raised while reading the request off the wire.
    #[error("{}", .0.reason())]
    Transport(HttpStatus),
}

impl ApiError {
    pub fn status(&self) -> HttpStatus {
        match self {
            ApiError::HeaderRejected(_) => HttpStatus::BadRequest,
            ApiError::UnsupportedContentType(_) => HttpStatus::BadRequest,
            ApiError::InvalidPayload(_) => HttpStatus::BadRequest,
            ApiError::NotFound(_) => HttpStatus::NotFound,
            ApiError::MethodNotAllowed { .. } => HttpStatus::MethodNotAllowed,
            ApiError::Transport(status) => *status,
        }
    }

    pub fn body(&self) -> Value {
        let (error, description) = match self {
            ApiError::HeaderRejected(_) => (HttpStatus::BadRequest.reason().to_string(), self.to_string()),
            ApiError::UnsupportedContentType(got) => (
                self.to_string(),
                match got {
                    Some(got) => format!("expected application/json, got {got}"),
                    None => "expected application/json, got no Content-Type".to_string(),
                },
            ),
            ApiError::InvalidPayload(reason) => (self.to_string(), reason.clone()),
            ApiError::NotFound(reason) => (self.to_string(), reason.clone()),
            ApiError::MethodNotAllowed { .. } => (
                self.to_string(),
                "The method is not allowed for the requested URL.".to_string(),
            ),
            ApiError::Transport(status) => (status.reason().to_string(), status.reason().to_string()),
        };

        json!({ "error": error, "description": description })
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::HeaderRejected(err.header)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::InvalidPayload(reason) => ApiError::InvalidPayload(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_rejection_body_names_the_header() {
        let err = ApiError::from(GateError {
            header: "Authorization".to_string(),
        });

        assert_eq!(err.status(), HttpStatus::BadRequest);
        assert_eq!(
            err.body(),
            json!({
                "error": "Bad Request",
                "description": "Missing or invalid header: Authorization",
            })
        );
    }

    #[test]
    fn store_errors_map_to_status() {
        let not_found = ApiError::from(StoreError::NotFound { index: 3, len: 1 });
        assert_eq!(not_found.status(), HttpStatus::NotFound);
        assert_eq!(not_found.body()["error"], "Not found");

        let invalid = ApiError::from(StoreError::InvalidPayload("EOF while parsing".to_string()));
        assert_eq!(invalid.status(), HttpStatus::BadRequest);
        assert_eq!(invalid.body()["error"], "Invalid JSON");
        assert_eq!(invalid.body()["description"], "EOF while parsing");
    }

    #[test]
    fn transport_errors_use_reason_phrase() {
        let err = ApiError::Transport(HttpStatus::PayloadTooLarge);
        assert_eq!(err.status(), HttpStatus::PayloadTooLarge);
        assert_eq!(err.body()["error"], "Payload Too Large");
    }
}
