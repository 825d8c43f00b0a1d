use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpVersion;
use crate::http::request::{HttpRequest, RequestHeader};
use crate::http::status::HttpStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("HTTP version not supported")]
    HttpVersionNotSupported,

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("malformed header field")]
    MalformedHeaderField,

    #[error("Content-Length is required")]
    MissingContentLength,

    #[error("both Transfer-Encoding and Content-Length are present")]
    ConflictingFraming,
}

impl ValidatorError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ValidatorError::HttpVersionNotSupported => HttpStatus::HttpVersionNotSupported,
            ValidatorError::PayloadTooLarge => HttpStatus::PayloadTooLarge,
            ValidatorError::MalformedHeaderField => HttpStatus::BadRequest,
            ValidatorError::MissingContentLength => HttpStatus::LengthRequired,
            ValidatorError::ConflictingFraming => HttpStatus::BadRequest,
        }
    }
}

/// Transport-level checks run once the headers are parsed.
///
/// Nothing here looks at the gate headers or the body: those belong to
/// the handlers.
pub struct Validator;

impl Validator {
    fn validate_http_version(v: (u8, u8), max: HttpVersion) -> Result<(), ValidatorError> {
        match HttpVersion::from_pair(v) {
            Some(http_v) if http_v <= max => Ok(()),
            _ => Err(ValidatorError::HttpVersionNotSupported),
        }
    }

    pub fn validate_request(req: &HttpRequest, config: &ServerConfig) -> Result<(), ValidatorError> {
        Self::validate_http_version(req.http_version, config.http_version)?;

        let content_length = req
            .header(RequestHeader::ContentLength)
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|_| ValidatorError::MalformedHeaderField)?;

        // Chunked bodies are not supported
        if req.header(RequestHeader::TransferEncoding).is_some() {
            return Err(match content_length {
                Some(_) => ValidatorError::ConflictingFraming,
                None => ValidatorError::MissingContentLength,
            });
        }

        if content_length.is_some_and(|n| n > config.max_body_size) {
            return Err(ValidatorError::PayloadTooLarge);
        }

        Ok(())
    }
}
