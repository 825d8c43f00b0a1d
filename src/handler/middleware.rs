use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;
use std::time::SystemTime;

use crate::config::ServerConfig;
use crate::http::HttpMethod;
use crate::http::request::{HttpRequest, RequestHeader};
use crate::http::response::{HttpResponse, ResponseHeader};

// Content codings the server can produce, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Gzip,
    Deflate,
}

impl CompressionAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Deflate => "deflate",
        }
    }
}

/// Post-processing applied to every response produced for a parsed request.
pub fn apply(req: &HttpRequest, res: &mut HttpResponse, config: &ServerConfig) {
    if res.body.len() >= config.compression_min_size {
        if let Some(algo) = negotiate(req.header(RequestHeader::AcceptEncoding)) {
            if let Err(err) = compress_body(res, algo) {
                tracing::error!("Compression IO error: {}", err);
            }
        }
    }

    finalize(res, config);

    // HEAD keeps the headers a GET would have sent, Content-Length included
    if req.method == HttpMethod::Head {
        res.body.clear();
    }
}

/// Headers common to every response, including the ones written for
/// requests that could not be parsed.
pub fn finalize(res: &mut HttpResponse, config: &ServerConfig) {
    res.set_header(ResponseHeader::Server, &config.server_name);
    res.set_header(ResponseHeader::Date, &httpdate::fmt_http_date(SystemTime::now()));
    res.set_header(ResponseHeader::Connection, "close");
    if res.header("Content-Length").is_none() {
        res.set_header(ResponseHeader::ContentLength, &res.body.len().to_string());
    }
}

/// Picks a coding from an `Accept-Encoding` value. Codings listed with
/// `q=0` are refused; gzip wins over deflate. `*` stands for any coding the
/// client did not name explicitly.
pub fn negotiate(accept_encoding: Option<&str>) -> Option<CompressionAlgorithm> {
    let accept_encoding = accept_encoding?;

    // None: not named, Some(false): refused
    let mut gzip: Option<bool> = None;
    let mut deflate: Option<bool> = None;
    let mut wildcard = false;
    for item in accept_encoding.split(',') {
        let mut parts = item.split(';');
        let coding = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let refused = parts.any(|p| {
            p.trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        });

        match coding.as_str() {
            "gzip" | "x-gzip" => gzip = Some(!refused),
            "deflate" => deflate = Some(!refused),
            "*" => wildcard = !refused,
            _ => {}
        }
    }

    if gzip.unwrap_or(wildcard) {
        Some(CompressionAlgorithm::Gzip)
    } else if deflate.unwrap_or(wildcard) {
        Some(CompressionAlgorithm::Deflate)
    } else {
        None
    }
}

fn compress_body(res: &mut HttpResponse, algo: CompressionAlgorithm) -> std::io::Result<()> {
    res.body = match algo {
        CompressionAlgorithm::Gzip => {
            let mut e = GzEncoder::new(Vec::new(), Compression::default());
            e.write_all(&res.body)?;
            e.finish()?
        }
        CompressionAlgorithm::Deflate => {
            let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
            e.write_all(&res.body)?;
            e.finish()?
        }
    };

    res.set_header(ResponseHeader::ContentEncoding, algo.as_str());
    res.set_header(ResponseHeader::ContentLength, &res.body.len().to_string());
    res.set_header(ResponseHeader::Vary, "Accept-Encoding");
    Ok(())
}
