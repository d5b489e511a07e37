//! Tunnel construction boundary.
//!
//! The transport protocol itself lives outside this crate; what ships here is
//! the constructor seam the orchestrator hands off to, plus a builder that
//! validates the credential bundle and packages it for tunnel consumers.

use thiserror::Error;

use crate::client::{ClientFuture, TransportHandle};
use crate::codespace::{Codespace, TunnelProperties};

/// Builds an active connection from a ready codespace and a transport handle.
pub trait TunnelBuilder {
    /// Connection type produced on success.
    type Connection;
    /// Constructor specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Constructs the connection.
    ///
    /// Called only with snapshots that passed the readiness predicate.
    fn build<'a>(
        &'a self,
        codespace: &'a Codespace,
        transport: TransportHandle,
    ) -> ClientFuture<'a, Self::Connection, Self::Error>;
}

/// Errors raised while assembling a [`CodespaceConnection`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TunnelError {
    /// Raised when the codespace is missing part of its credential bundle.
    #[error("codespace {name} is missing tunnel connection details")]
    IncompleteProperties {
        /// Name of the offending codespace.
        name: String,
    },
}

/// Connection bundle handed to tunnel consumers (port forwarders, SSH).
#[derive(Clone, Debug)]
pub struct CodespaceConnection {
    tunnel: TunnelProperties,
    transport: TransportHandle,
}

impl CodespaceConnection {
    /// Returns the tunnel credential bundle.
    #[must_use]
    pub const fn tunnel(&self) -> &TunnelProperties {
        &self.tunnel
    }

    /// Returns the transport handle reused for tunnel-side HTTP calls.
    #[must_use]
    pub const fn transport(&self) -> &TransportHandle {
        &self.transport
    }
}

/// Default constructor that validates and packages the credential bundle.
#[derive(Clone, Copy, Debug, Default)]
pub struct CodespaceConnectionBuilder;

impl TunnelBuilder for CodespaceConnectionBuilder {
    type Connection = CodespaceConnection;
    type Error = TunnelError;

    fn build<'a>(
        &'a self,
        codespace: &'a Codespace,
        transport: TransportHandle,
    ) -> ClientFuture<'a, CodespaceConnection, TunnelError> {
        Box::pin(async move {
            if !codespace.connection.is_complete() {
                return Err(TunnelError::IncompleteProperties {
                    name: codespace.name.clone(),
                });
            }
            Ok(CodespaceConnection {
                tunnel: codespace.connection.clone(),
                transport,
            })
        })
    }
}
