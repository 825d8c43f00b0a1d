use serde::Deserialize;

pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod validator;

/// Longest method token accepted on the request line.
pub const HTTP_METHOD_MAX_LEN: usize = 7;

/// All existing HTTP versions
/// Use to validate HTTP version from request in [`validator`]
/// The max supported version is given in the server config (see [`http_version`](crate::config::ServerConfig::http_version))
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy, Deserialize)]
pub enum HttpVersion {
    V0_9,
    V1_0,
    V1_1,
    V2_0,
    V3_0,
}

impl HttpVersion {
    /// Maps a `(major, minor)` pair onto a known HTTP version.
    pub fn from_pair(v: (u8, u8)) -> Option<HttpVersion> {
        match v {
            (0, 9) => Some(HttpVersion::V0_9),
            (1, 0) => Some(HttpVersion::V1_0),
            (1, 1) => Some(HttpVersion::V1_1),
            (2, 0) => Some(HttpVersion::V2_0),
            (3, 0) => Some(HttpVersion::V3_0),
            _ => None,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Unknown,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Unknown => "UNKNOWN",
        }
    }
}

pub fn http_method_from_str(method: &str) -> HttpMethod {
    match method {
        "GET" => HttpMethod::Get,
        "HEAD" => HttpMethod::Head,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        "OPTIONS" => HttpMethod::Options,
        _ => HttpMethod::Unknown,
    }
}
