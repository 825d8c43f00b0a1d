//! Incremental HTTP/1.x request parser.
//!
//! The parser is fed raw bytes as they arrive from the network and walks
//! through three states: request line, headers, body. It reports
//! [`ParserOk::HeadersDone`] exactly once, as soon as the header section has
//! been consumed, so that the caller can validate the request before
//! spending any effort on the body. The `Content-Length` syntax and limit
//! are checked by the [`validator`](crate::http::validator) at that point;
//! the parser only frames the body with the value that passed.

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::request::*;
use crate::http::status::HttpStatus;
use crate::http::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserOk {
    /// More bytes are needed to make progress.
    Incomplete,
    /// The request line and all headers have been parsed.
    HeadersDone,
    /// The request, body included, is complete.
    Done,
}

// To keep parser logic separate from HTTP status codes,
// direct http error codes are not used here but mapped later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("malformed request")]
    Malformed,

    #[error("request target exceeds the configured limit")]
    UriTooLong,

    #[error("HTTP version not supported")]
    HttpVersionNotSupported,
}

impl ParserError {
    pub fn into_http_status(self) -> HttpStatus {
        match self {
            ParserError::Malformed => HttpStatus::BadRequest,
            ParserError::UriTooLong => HttpStatus::UriTooLong,
            ParserError::HttpVersionNotSupported => HttpStatus::HttpVersionNotSupported,
        }
    }
}

#[derive(PartialEq, PartialOrd, Debug)]
enum ParserState {
    RequestLine,
    Headers,
    Body,
    Done,
}

pub struct Parser {
    buf: Vec<u8>,
    state: ParserState,
    content_length: Option<usize>,

    max_path_size: usize,
    max_header_size: usize,
}

impl Parser {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            buf: Vec::with_capacity(config.buffer_size),
            state: ParserState::RequestLine,
            content_length: None,
            max_path_size: config.max_path_size,
            max_header_size: config.max_header_size,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Appends `data` to the internal buffer and parses as far as possible.
    ///
    /// Feeding an empty slice lets the parser progress on bytes it already
    /// buffered, which the server does right after [`ParserOk::HeadersDone`].
    pub fn feed(&mut self, data: &[u8], req: &mut HttpRequest) -> Result<ParserOk, ParserError> {
        self.buf.extend_from_slice(data);

        loop {
            match self.state {
                ParserState::RequestLine => {
                    // Tolerate empty lines before the request line
                    while self.buf.starts_with(b"\r\n") {
                        self.buf.drain(..2);
                    }

                    let Some(end) = find(&self.buf, b"\r\n") else {
                        if self.buf.len() > self.max_path_size + REQUEST_LINE_OVERHEAD {
                            return Err(ParserError::UriTooLong);
                        }
                        return Ok(ParserOk::Incomplete);
                    };

                    self.parse_request_line(end, req)?;
                    self.buf.drain(..end + 2);
                    self.state = ParserState::Headers;
                }
                ParserState::Headers => {
                    let (end, consumed) = if self.buf.starts_with(b"\r\n") {
                        (0, 2)
                    } else {
                        match find(&self.buf, b"\r\n\r\n") {
                            Some(end) => (end, end + 4),
                            None => {
                                if self.buf.len() > self.max_header_size {
                                    return Err(ParserError::Malformed);
                                }
                                return Ok(ParserOk::Incomplete);
                            }
                        }
                    };

                    if end > self.max_header_size {
                        return Err(ParserError::Malformed);
                    }

                    self.parse_headers(end, req)?;
                    self.buf.drain(..consumed);

                    if req.http_version == (1, 1) && !req.headers.contains(RequestHeader::Host.name()) {
                        return Err(ParserError::Malformed);
                    }

                    self.state = ParserState::Body;
                    return Ok(ParserOk::HeadersDone);
                }
                ParserState::Body => return Ok(self.parse_body(req)),
                ParserState::Done => return Ok(ParserOk::Done),
            }
        }
    }

    fn parse_request_line(&self, end: usize, req: &mut HttpRequest) -> Result<(), ParserError> {
        // Request line: METHOD TARGET HTTP/VERSION
        let request_line = &self.buf[..end];
        let parts: Vec<&[u8]> = request_line.split(|&b| b == b' ').collect();
        if parts.len() != 3 {
            return Err(ParserError::Malformed);
        }

        if parts[0].len() > HTTP_METHOD_MAX_LEN {
            return Err(ParserError::Malformed);
        }

        let method = std::str::from_utf8(parts[0])
            .map_err(|_| ParserError::Malformed)?
            .to_uppercase();
        let method = match http_method_from_str(&method) {
            HttpMethod::Unknown => return Err(ParserError::Malformed),
            m => m,
        };

        let target = std::str::from_utf8(parts[1]).map_err(|_| ParserError::Malformed)?;
        if target.len() > self.max_path_size {
            return Err(ParserError::UriTooLong);
        }
        if !target.starts_with('/') {
            return Err(ParserError::Malformed);
        }

        let version = std::str::from_utf8(parts[2]).map_err(|_| ParserError::Malformed)?;
        let (maj, min) = version
            .strip_prefix("HTTP/")
            .and_then(|v| v.split_once('.'))
            .and_then(|(maj, min)| Some((maj.parse::<u8>().ok()?, min.parse::<u8>().ok()?)))
            .ok_or(ParserError::Malformed)?;

        if !(maj == 1 && (min == 0 || min == 1)) {
            return Err(ParserError::HttpVersionNotSupported);
        }

        req.method = method;
        req.set_target(target);
        req.http_version = (maj, min);
        Ok(())
    }

    fn parse_headers(&self, end: usize, req: &mut HttpRequest) -> Result<(), ParserError> {
        for line in self.buf[..end].split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            let mut it = line.splitn(2, |&b| b == b':');
            let name = it.next().unwrap_or_default();
            let value = it.next().ok_or(ParserError::Malformed)?;

            let name = std::str::from_utf8(name).map_err(|_| ParserError::Malformed)?;
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(ParserError::Malformed);
            }
            let value = std::str::from_utf8(value)
                .map_err(|_| ParserError::Malformed)?
                .trim();

            // Repeats must agree, or the body would end in two places
            if name.eq_ignore_ascii_case(RequestHeader::ContentLength.name())
                && req.header(RequestHeader::ContentLength).is_some_and(|first| first != value)
            {
                return Err(ParserError::Malformed);
            }

            req.headers.append_raw(name, value);
        }

        Ok(())
    }

    fn parse_body(&mut self, req: &mut HttpRequest) -> ParserOk {
        // Framed on first entry, once the validator has seen the headers
        let content_length = *self.content_length.get_or_insert_with(|| {
            req.header(RequestHeader::ContentLength)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0)
        });

        let missing = content_length - req.body.len();
        let to_copy = missing.min(self.buf.len());

        req.body.extend(self.buf.drain(..to_copy));

        if req.body.len() == content_length {
            self.state = ParserState::Done;
            return ParserOk::Done;
        }

        ParserOk::Incomplete
    }
}

/// Room for the method, the version and separators around the target.
const REQUEST_LINE_OVERHEAD: usize = 32;

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
