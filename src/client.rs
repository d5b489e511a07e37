//! Client-side boundary for the codespaces API.

use std::future::Future;
use std::pin::Pin;

use crate::codespace::Codespace;

/// Future returned by client operations.
pub type ClientFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// HTTP transport reused by the tunnel constructor for its own calls (token
/// refresh, relay negotiation).
///
/// Opaque to the orchestrator; only produced by a client and consumed by a
/// [`TunnelBuilder`](crate::tunnel::TunnelBuilder).
#[derive(Clone, Debug)]
pub struct TransportHandle {
    http: reqwest::Client,
}

impl TransportHandle {
    /// Wraps an HTTP client for handoff to the tunnel constructor.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Returns the wrapped HTTP client.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Minimal interface the orchestrator requires from an API client.
pub trait CodespaceClient {
    /// Client specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches a fresh snapshot of the named codespace.
    ///
    /// When `include_connection` is set the snapshot carries the tunnel
    /// credential bundle, which the service omits by default.
    fn fetch_codespace<'a>(
        &'a self,
        name: &'a str,
        include_connection: bool,
    ) -> ClientFuture<'a, Codespace, Self::Error>;

    /// Requests that the named codespace be started.
    fn start_codespace<'a>(&'a self, name: &'a str) -> ClientFuture<'a, (), Self::Error>;

    /// Returns the transport handle passed to the tunnel constructor.
    ///
    /// Only called after readiness; never from inside the poll loop.
    ///
    /// # Errors
    ///
    /// Returns the client's error type when no transport is available.
    fn transport_handle(&self) -> Result<TransportHandle, Self::Error>;
}
