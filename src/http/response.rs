use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

pub enum ResponseHeader {
    Allow,
    Connection,
    ContentEncoding,
    ContentLength,
    ContentType,
    Date,
    Server,
    Vary,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: HttpStatus::Ok,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        let name = match h {
            ResponseHeader::Allow => "Allow",
            ResponseHeader::Connection => "Connection",
            ResponseHeader::ContentEncoding => "Content-Encoding",
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::Date => "Date",
            ResponseHeader::Server => "Server",
            ResponseHeader::Vary => "Vary",
        };

        self.headers.set_raw(name, value);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Serializes the status line and headers, including the blank line
    /// that separates them from the body.
    pub fn build_headers(&self) -> String {
        // HTTP/1.1 <status> <reason>\r\n
        // <header_name>: <header_value>\r\n
        // ...
        // \r\n
        format!(
            "HTTP/1.1 {} {}\r\n{}\r\n",
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
