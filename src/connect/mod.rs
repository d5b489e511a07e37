//! Orchestrates bringing a codespace to a connectable state and handing off
//! to the tunnel constructor.
//!
//! The readiness wait is a polling loop over [`CodespaceClient`]: each
//! attempt observes the lifecycle state, issues at most one start action per
//! shutdown episode, and re-checks the readiness predicate until the
//! credential bundle is fully populated or the backoff budget runs out.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::CodespaceClient;
use crate::codespace::{Codespace, CodespaceState};
use crate::poll::{Attempt, BackoffPolicy, PollError, retry_with_backoff};
use crate::progress::{ProgressGuard, ProgressIndicator};
use crate::tunnel::TunnelBuilder;

/// Errors surfaced while waiting for or connecting to a codespace.
#[derive(Debug, Error)]
pub enum ConnectError<E>
where
    E: std::error::Error + 'static,
{
    /// Raised when a state fetch fails; fetch failures are never retried.
    #[error("failed to fetch codespace: {0}")]
    Fetch(#[source] E),
    /// Raised when the start action fails; start failures are never retried.
    #[error("failed to start codespace: {0}")]
    Start(#[source] E),
    /// Raised when the transport handle cannot be acquired after readiness.
    #[error("failed to acquire transport handle: {0}")]
    Transport(#[source] E),
    /// Raised when the tunnel constructor rejects the ready codespace.
    #[error("failed to connect to tunnel: {message}")]
    Tunnel {
        /// Message reported by the tunnel constructor.
        message: String,
    },
    /// Raised when the backoff budget runs out while still not ready.
    #[error("timed out while waiting for the remote resource to start")]
    Timeout,
    /// Raised when the governing cancellation token fires mid-wait.
    #[error("connection attempt canceled")]
    Canceled,
}

/// Drives a codespace to readiness and composes the tunnel handoff.
#[derive(Debug)]
pub struct ConnectOrchestrator<C, P> {
    client: C,
    progress: P,
    policy: BackoffPolicy,
}

impl<C, P> ConnectOrchestrator<C, P>
where
    C: CodespaceClient,
    P: ProgressIndicator,
{
    /// Creates an orchestrator with the default backoff policy.
    #[must_use]
    pub fn new(client: C, progress: P) -> Self {
        Self {
            client,
            progress,
            policy: BackoffPolicy::default(),
        }
    }

    /// Overrides the backoff policy.
    ///
    /// This is primarily used by tests to keep wait scenarios fast.
    #[must_use]
    pub const fn with_backoff_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Waits until the codespace satisfies the readiness predicate, starting
    /// it if it is observed transitioning into `Shutdown`.
    ///
    /// A snapshot that is already ready returns immediately with zero network
    /// calls. Otherwise the loop reuses the caller's snapshot for its first
    /// attempt (a deliberate fast path that assumes the caller fetched
    /// recently) and fetches fresh snapshots afterwards. The start action is
    /// edge-triggered on the transition into `Shutdown`, so repeated polls of
    /// a codespace that stays `Shutdown` while its start takes effect issue
    /// exactly one start.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Fetch`] or [`ConnectError::Start`] on
    /// permanent client failures, [`ConnectError::Timeout`] when the backoff
    /// budget is exhausted, and [`ConnectError::Canceled`] when `cancel`
    /// fires.
    pub async fn ensure_ready(
        &self,
        cancel: &CancellationToken,
        codespace: Codespace,
    ) -> Result<Codespace, ConnectError<C::Error>> {
        if codespace.connection_ready() {
            return Ok(codespace);
        }

        let _phase = ProgressGuard::begin(&self.progress, "Starting codespace");

        let name = codespace.name.clone();
        let mut snapshot = codespace;
        let mut previous: Option<CodespaceState> = None;
        let mut reused_initial = false;

        let outcome = retry_with_backoff(&self.policy, cancel, async || {
            if reused_initial {
                match self.client.fetch_codespace(&name, true).await {
                    Ok(fresh) => snapshot = fresh,
                    Err(err) => return Attempt::Fatal(ConnectError::Fetch(err)),
                }
            }
            reused_initial = true;

            if snapshot.connection_ready() {
                return Attempt::Ready(());
            }

            let observed = snapshot.state;
            debug!(codespace = %name, state = ?observed, "codespace not ready");
            if previous != Some(observed) && observed == CodespaceState::Shutdown {
                info!(codespace = %name, "starting codespace out of shutdown");
                if let Err(err) = self.client.start_codespace(&name).await {
                    return Attempt::Fatal(ConnectError::Start(err));
                }
            }
            previous = Some(observed);
            Attempt::NotYet
        })
        .await;

        match outcome {
            Ok(()) => Ok(snapshot),
            Err(PollError::Fatal(err)) => Err(err),
            Err(PollError::TimedOut) => Err(ConnectError::Timeout),
            Err(PollError::Canceled) => Err(ConnectError::Canceled),
        }
    }

    /// Brings the codespace to readiness, acquires a transport handle, and
    /// hands both to the tunnel constructor.
    ///
    /// The constructor call is bracketed by a progress phase whose end is
    /// guaranteed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns any [`ConnectError`] raised by [`Self::ensure_ready`], plus
    /// [`ConnectError::Transport`] and [`ConnectError::Tunnel`] for handoff
    /// failures.
    pub async fn connect<B>(
        &self,
        cancel: &CancellationToken,
        codespace: Codespace,
        builder: &B,
    ) -> Result<B::Connection, ConnectError<C::Error>>
    where
        B: TunnelBuilder,
    {
        let ready = self.ensure_ready(cancel, codespace).await?;
        let transport = self
            .client
            .transport_handle()
            .map_err(ConnectError::Transport)?;

        let _phase = ProgressGuard::begin(&self.progress, "Connecting to codespace");
        builder
            .build(&ready, transport)
            .await
            .map_err(|err| ConnectError::Tunnel {
                message: err.to_string(),
            })
    }
}
