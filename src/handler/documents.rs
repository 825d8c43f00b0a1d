//! Handlers for the document routes.
//!
//! Each handler runs after routing and the header gate. Payloads are parsed
//! lazily inside the store operation so that index errors take precedence.

use serde_json::json;

use crate::error::ApiError;
use crate::handler::responses;
use crate::http::request::{HttpRequest, RequestHeader};
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;
use crate::store::{Document, DocumentStore, StoreError};

const JSON_CONTENT_TYPE: &str = "application/json";

pub fn list(store: &DocumentStore) -> HttpResponse {
    responses::json(HttpStatus::Ok, &json!({ "data": store.list() }))
}

pub fn create(store: &DocumentStore, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    let content_type = req.header(RequestHeader::ContentType);
    if content_type != Some(JSON_CONTENT_TYPE) {
        return Err(ApiError::UnsupportedContentType(content_type.map(str::to_string)));
    }

    let (index, doc) = store.append(|| parse_payload(&req.body))?;
    tracing::debug!(index, "document appended");

    Ok(responses::message(HttpStatus::Created, "Data received", doc))
}

pub fn replace(store: &DocumentStore, req: &HttpRequest, index: usize) -> Result<HttpResponse, ApiError> {
    let doc = store.replace_at(index, || parse_payload(&req.body))?;
    Ok(responses::message(HttpStatus::Ok, "Data updated", doc))
}

pub fn merge(store: &DocumentStore, req: &HttpRequest, index: usize) -> Result<HttpResponse, ApiError> {
    let doc = store.merge_at(index, || parse_payload(&req.body))?;
    Ok(responses::message(HttpStatus::Ok, "Data patched/partially updated", doc))
}

pub fn remove(store: &DocumentStore, index: usize) -> Result<HttpResponse, ApiError> {
    let doc = store.remove_at(index)?;
    Ok(responses::message(HttpStatus::Ok, "Data deleted", doc))
}

fn parse_payload(body: &[u8]) -> Result<Document, StoreError> {
    if body.is_empty() {
        return Err(StoreError::InvalidPayload("request body is empty".to_string()));
    }
    serde_json::from_slice(body).map_err(|err| StoreError::InvalidPayload(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn truncated_json_is_invalid() {
        assert!(matches!(
            parse_payload(br#"{"key": "value""#),
            Err(StoreError::InvalidPayload(_))
        ));
    }

    #[test]
    fn empty_body_is_invalid() {
        assert!(matches!(parse_payload(b""), Err(StoreError::InvalidPayload(_))));
    }

    #[test]
    fn scalars_are_documents() {
        assert_eq!(parse_payload(b"42"), Ok(json!(42)));
        assert_eq!(parse_payload(b" \"text\" "), Ok(json!("text")));
    }

    #[test]
    fn create_requires_exact_content_type() {
        let store = DocumentStore::new();
        let mut req = HttpRequest::with_target(HttpMethod::Post, "/post");
        req.headers.set_raw("Content-Type", "application/json; charset=utf-8");
        req.body = b"{}".to_vec();

        assert_eq!(
            create(&store, &req).unwrap_err(),
            ApiError::UnsupportedContentType(Some("application/json; charset=utf-8".to_string()))
        );
        assert!(store.is_empty());
    }
}
