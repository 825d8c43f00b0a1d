mod documents;
pub mod middleware;
mod responses;
pub mod router;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::gate::HeaderGate;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::store::DocumentStore;
use router::{Dispatch, Route};

/// Process-wide state shared by every connection.
pub struct AppState {
    config: Arc<ServerConfig>,
    gate: HeaderGate,
    store: DocumentStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let gate = HeaderGate::new(config.required_headers.clone());
        Self {
            config: Arc::new(config),
            gate,
            store: DocumentStore::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

pub fn handle_request(state: &AppState, req: &HttpRequest) -> HttpResponse {
    let mut res = match dispatch(state, req) {
        Ok(res) => res,
        Err(err) => {
            tracing::debug!(method = req.method.as_str(), path = %req.path, "rejected: {err}");
            responses::error(&err)
        }
    };
    middleware::apply(req, &mut res, &state.config);

    tracing::info!(
        method = req.method.as_str(),
        path = %req.path,
        status = res.status.code(),
        "request served"
    );
    res
}

/// Builds the response for a request that failed before it could be routed.
pub fn handle_error(state: &AppState, err: ApiError) -> HttpResponse {
    tracing::warn!(status = err.status().code(), "bad request: {err}");
    let mut res = responses::error(&err);
    middleware::finalize(&mut res, &state.config);
    res
}

// Routing, then the gate, then the route itself
fn dispatch(state: &AppState, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    let route = match router::route(req.method, &req.path)? {
        Dispatch::Options { allow } => return Ok(responses::options(allow)),
        Dispatch::Route(route) => route,
    };

    state.gate.check(&req.headers)?;

    match route {
        Route::List => Ok(documents::list(&state.store)),
        Route::Create => documents::create(&state.store, req),
        Route::Replace(index) => documents::replace(&state.store, req, index),
        Route::Merge(index) => documents::merge(&state.store, req, index),
        Route::Remove(index) => documents::remove(&state.store, index),
    }
}
