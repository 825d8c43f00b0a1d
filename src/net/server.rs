//! Core HTTP server implementation.
//!
//! This module implements the low-level HTTP server runtime.
//! It is responsible only for networking concerns such as:
//! - accepting TCP connections,
//! - reading raw bytes from the network,
//! - writing raw bytes back to the client.
//!
//! Request parsing, validation and response generation are delegated to
//! the `http` and `handler` modules.
//!
//! The server is fully asynchronous and leverages the `async-std` crate
//! to provide non-blocking I/O and concurrent client handling. All
//! connections share one [`AppState`], and with it one document store.
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection
//! 2. Read raw data from the stream, bounded by `read_timeout`
//! 3. Incrementally parse the data into an [`HttpRequest`]
//!    (delegated to [`http::parser::Parser`](crate::http::parser::Parser))
//! 4. Validate the request once its headers are known
//!    (delegated to [`http::validator::Validator`](crate::http::validator::Validator))
//! 5. Generate an [`HttpResponse`]
//!    (delegated to [`handler::handle_request`](crate::handler::handle_request))
//! 6. Serialize and write the response back to the client, bounded by
//!    `write_timeout`, then close the connection
//!
//! Parse and validation failures are answered with the matching HTTP
//! error status; I/O failures just drop the connection.

use async_std::io;
use async_std::net::{SocketAddr, TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handler::{self, AppState};
use crate::http::parser::*;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::validator::{Validator, ValidatorError};

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

/// Errors that can occur while reading and parsing an HTTP request from the stream
/// used to interrupt the flow and return appropriate responses.
#[derive(Debug)]
enum ReadError {
    Io(std::io::Error),
    ConnectionClosed,
    Parser(ParserError),
    Validator(ValidatorError),
}

impl Server {
    /// Binds the listener on the configured address and port.
    ///
    /// Port `0` picks a free port; see [`Server::local_addr`].
    pub async fn bind(config: ServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.address, config.port)).await?;
        Ok(Self {
            listener,
            state: Arc::new(AppState::new(config)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, spawning one task per client.
    pub async fn run(self) -> std::io::Result<()> {
        tracing::info!("Server listening on {}", self.local_addr()?);

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let state = self.state.clone();
            task::spawn(async move {
                if let Err(e) = Self::handle_client(stream, state).await {
                    tracing::debug!("Connection from {} failed: {}", addr, e);
                }
            });
        }
    }

    /// Reads and incrementally parses an HTTP request from the TCP stream.
    ///
    /// Once all headers are read the request is validated, before any body
    /// byte is read.
    async fn read_request(stream: &mut TcpStream, config: &ServerConfig) -> Result<HttpRequest, ReadError> {
        let mut parser = Parser::new(config);
        let mut req = HttpRequest::new();
        let mut buffer = vec![0; config.buffer_size];
        let mut outcome = ParserOk::Incomplete;

        loop {
            match outcome {
                ParserOk::Incomplete => {
                    let n = match io::timeout(config.read_timeout, stream.read(&mut buffer)).await {
                        Ok(0) => return Err(ReadError::ConnectionClosed),
                        Ok(n) => n,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(ReadError::Io(e)),
                    };

                    outcome = parser
                        .feed(&buffer[..n], &mut req)
                        .map_err(ReadError::Parser)?;
                }
                ParserOk::HeadersDone => {
                    Validator::validate_request(&req, config).map_err(ReadError::Validator)?;

                    // Continue with whatever body bytes are already buffered
                    outcome = parser.feed(&[], &mut req).map_err(ReadError::Parser)?;
                }
                ParserOk::Done => break,
            }
        }

        Ok(req)
    }

    /// Writes the given `HttpResponse` back to the TCP stream.
    async fn write_response(stream: &mut TcpStream, response: &HttpResponse) -> std::io::Result<()> {
        let headers = response.build_headers();
        stream.write_all(headers.as_bytes()).await?;
        stream.write_all(&response.body).await?;
        stream.flush().await
    }

    /// Handles a single client connection.
    async fn handle_client(mut stream: TcpStream, state: Arc<AppState>) -> std::io::Result<()> {
        let config = state.config();

        let response = match Self::read_request(&mut stream, config).await {
            Ok(r) => handler::handle_request(&state, &r),
            Err(ReadError::Io(err)) => {
                tracing::debug!("I/O error while reading request: {:?}", err);
                return Ok(());
            }
            Err(ReadError::ConnectionClosed) => return Ok(()),
            Err(ReadError::Parser(err)) => {
                handler::handle_error(&state, ApiError::Transport(err.into_http_status()))
            }
            Err(ReadError::Validator(err)) => {
                handler::handle_error(&state, ApiError::Transport(err.into_http_status()))
            }
        };

        io::timeout(config.write_timeout, Self::write_response(&mut stream, &response)).await
    }
}
