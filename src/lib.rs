//! In-memory mock HTTP resource store.
//!
//! Clients create, list, replace, merge and delete JSON documents addressed
//! by their position in a single ordered collection. Every route is guarded
//! by a static header gate.

pub mod config;
pub mod error;
pub mod gate;
pub mod handler;
pub mod http;
pub mod logging;
pub mod net;
pub mod store;

pub use config::ServerConfig;
pub use handler::{AppState, handle_request};
pub use net::server::Server;
