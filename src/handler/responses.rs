use serde_json::{Value, json};

use crate::error::ApiError;
use crate::http::response::{HttpResponse, ResponseHeader};
use crate::http::status::HttpStatus;

pub fn json(status: HttpStatus, body: &Value) -> HttpResponse {
    let mut res = HttpResponse::new();
    res.status = status;
    let body = body.to_string().into_bytes();

    res.set_header(ResponseHeader::ContentType, "application/json");
    res.set_header(ResponseHeader::ContentLength, &body.len().to_string());

    res.body = body;
    res
}

/// `{"message": ..., "data": ...}` envelope used by every write route.
pub fn message(status: HttpStatus, message: &str, data: Value) -> HttpResponse {
    json(status, &json!({ "message": message, "data": data }))
}

pub fn options(allow: &str) -> HttpResponse {
    let mut res = HttpResponse::new();
    res.set_header(ResponseHeader::Allow, allow);
    res.set_header(ResponseHeader::ContentLength, "0");
    res
}

pub fn error(err: &ApiError) -> HttpResponse {
    let mut res = json(err.status(), &err.body());
    if let ApiError::MethodNotAllowed { allow } = err {
        res.set_header(ResponseHeader::Allow, allow);
    }
    res
}
