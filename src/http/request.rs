use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;

/// Request headers the server itself interprets.
///
/// Every other header is kept verbatim in [`HttpRequest::headers`] and is
/// only looked at by the gate or the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestHeader {
    Host,
    ContentLength,
    ContentType,
    TransferEncoding,
    AcceptEncoding,
}

impl RequestHeader {
    pub fn name(self) -> &'static str {
        match self {
            RequestHeader::Host => "Host",
            RequestHeader::ContentLength => "Content-Length",
            RequestHeader::ContentType => "Content-Type",
            RequestHeader::TransferEncoding => "Transfer-Encoding",
            RequestHeader::AcceptEncoding => "Accept-Encoding",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Request target without the query string.
    pub path: String,
    pub query: Option<String>,
    pub http_version: (u8, u8),

    // headers
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self {
            method: HttpMethod::Unknown,
            path: String::new(),
            query: None,
            http_version: (0, 0),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    /// Builds an HTTP/1.1 request for `method` on `target`, splitting off the
    /// query string the same way the parser does.
    pub fn with_target(method: HttpMethod, target: &str) -> Self {
        let mut req = Self::new();
        req.method = method;
        req.http_version = (1, 1);
        req.set_target(target);
        req
    }

    pub fn set_target(&mut self, target: &str) {
        match target.split_once('?') {
            Some((path, query)) => {
                self.path = path.to_string();
                self.query = Some(query.to_string());
            }
            None => {
                self.path = target.to_string();
                self.query = None;
            }
        }
    }

    pub fn header(&self, h: RequestHeader) -> Option<&str> {
        self.headers.get(h.name())
    }
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new()
    }
}
