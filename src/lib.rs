//! Core library for the Gangway codespace connection tool.
//!
//! The crate exposes a client abstraction over the codespaces API, a
//! backoff-driven poll loop, and the readiness orchestration that powers the
//! connect flow (observe state → start if shut down → wait for credentials →
//! hand off to the tunnel constructor).

pub mod client;
pub mod codespace;
pub mod config;
pub mod connect;
pub mod poll;
pub mod progress;
pub mod rest;
pub mod tunnel;

pub use client::{ClientFuture, CodespaceClient, TransportHandle};
pub use codespace::{Codespace, CodespaceState, TunnelProperties};
pub use config::{ConfigError, ConnectConfig};
pub use connect::{ConnectError, ConnectOrchestrator};
pub use poll::{Attempt, BackoffPolicy, PollError, retry_with_backoff};
pub use progress::{ProgressGuard, ProgressIndicator, SilentProgress, StderrProgress};
pub use rest::{RestClient, RestError};
pub use tunnel::{
    CodespaceConnection, CodespaceConnectionBuilder, TunnelBuilder, TunnelError,
};
