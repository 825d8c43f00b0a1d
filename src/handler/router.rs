use crate::error::ApiError;
use crate::http::HttpMethod;

/// The document endpoints, one per path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Create,
    Replace(usize),
    Merge(usize),
    Remove(usize),
}

impl Route {
    /// Value of the `Allow` header for the route's path.
    pub fn allow(&self) -> &'static str {
        match self {
            Route::List => "GET, HEAD, OPTIONS",
            Route::Create => "OPTIONS, POST",
            Route::Replace(_) => "OPTIONS, PUT",
            Route::Merge(_) => "OPTIONS, PATCH",
            Route::Remove(_) => "DELETE, OPTIONS",
        }
    }

    fn accepts(&self, method: HttpMethod) -> bool {
        matches!(
            (self, method),
            (Route::List, HttpMethod::Get | HttpMethod::Head)
                | (Route::Create, HttpMethod::Post)
                | (Route::Replace(_), HttpMethod::Put)
                | (Route::Merge(_), HttpMethod::Patch)
                | (Route::Remove(_), HttpMethod::Delete)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Route(Route),
    /// `OPTIONS` never reaches a route: it only advertises the allowed methods.
    Options { allow: &'static str },
}

pub fn route(method: HttpMethod, path: &str) -> Result<Dispatch, ApiError> {
    let route = match_path(path).ok_or_else(|| {
        ApiError::NotFound("The requested URL was not found on the server.".to_string())
    })?;

    if method == HttpMethod::Options {
        return Ok(Dispatch::Options {
            allow: route.allow(),
        });
    }

    if !route.accepts(method) {
        return Err(ApiError::MethodNotAllowed {
            allow: route.allow(),
        });
    }

    Ok(Dispatch::Route(route))
}

fn match_path(path: &str) -> Option<Route> {
    let rest = path.strip_prefix('/')?;

    match rest.split_once('/') {
        None => match rest {
            "get" => Some(Route::List),
            "post" => Some(Route::Create),
            _ => None,
        },
        Some((prefix, index)) => {
            let index = parse_index(index)?;
            match prefix {
                "put" => Some(Route::Replace(index)),
                "patch" => Some(Route::Merge(index)),
                "delete" => Some(Route::Remove(index)),
                _ => None,
            }
        }
    }
}

/// Only plain decimal digits are an index; signs, spaces or overflow make
/// the path unknown.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
