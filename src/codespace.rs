//! Codespace data model and the readiness predicate.

use serde::Deserialize;

/// Lifecycle states reported by the codespaces API.
///
/// Only [`Available`](Self::Available), [`Shutdown`](Self::Shutdown),
/// [`ShuttingDown`](Self::ShuttingDown), and [`Starting`](Self::Starting)
/// influence orchestration; every other state means "not ready, do not
/// start". States the API adds later deserialize as
/// [`Unknown`](Self::Unknown).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(from = "String")]
pub enum CodespaceState {
    /// State string not recognised by this client.
    #[default]
    Unknown,
    /// Resource record exists but provisioning has not begun.
    Created,
    /// Queued for provisioning.
    Queued,
    /// Backing compute is being provisioned.
    Provisioning,
    /// Provisioned, awaiting finalisation by the service.
    Awaiting,
    /// Powering on.
    Starting,
    /// Running and able to accept connections once credentials are populated.
    Available,
    /// Powering off.
    ShuttingDown,
    /// Powered off; a start action can bring it back.
    Shutdown,
    /// Provisioning or a lifecycle transition failed.
    Failed,
    /// Moved to cold storage.
    Archived,
    /// Deleted on the service side.
    Deleted,
}

impl From<&str> for CodespaceState {
    fn from(value: &str) -> Self {
        match value {
            "Created" => Self::Created,
            "Queued" => Self::Queued,
            "Provisioning" => Self::Provisioning,
            "Awaiting" => Self::Awaiting,
            "Starting" => Self::Starting,
            "Available" => Self::Available,
            "ShuttingDown" => Self::ShuttingDown,
            "Shutdown" => Self::Shutdown,
            "Failed" => Self::Failed,
            "Archived" => Self::Archived,
            "Deleted" => Self::Deleted,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for CodespaceState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// Connection credentials and identifiers required to reach a codespace's
/// tunnel.
///
/// The API can report a codespace as `Available` before these are populated,
/// so completeness is checked separately from the lifecycle state.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TunnelProperties {
    /// Access token scoped to the data tunnel.
    pub connect_access_token: String,
    /// Access token scoped to port management.
    pub manage_ports_access_token: String,
    /// Service endpoint URI for the tunnel relay.
    pub service_uri: String,
    /// Identifier of the tunnel itself.
    pub tunnel_id: String,
    /// Identifier of the cluster hosting the tunnel.
    pub cluster_id: String,
    /// Domain the tunnel endpoints are served under.
    pub domain: String,
}

impl TunnelProperties {
    /// Reports whether every credential field is populated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !(self.connect_access_token.is_empty()
            || self.manage_ports_access_token.is_empty()
            || self.service_uri.is_empty()
            || self.tunnel_id.is_empty()
            || self.cluster_id.is_empty()
            || self.domain.is_empty())
    }
}

/// Snapshot of a codespace as returned by the API.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Codespace {
    /// Stable name used as the key for all API calls.
    pub name: String,
    /// Lifecycle state at the time of the snapshot.
    pub state: CodespaceState,
    /// Connection credential bundle; empty until the service publishes it.
    pub connection: TunnelProperties,
}

impl Codespace {
    /// Reports whether the codespace can accept a tunnel connection.
    ///
    /// True only when the lifecycle state is `Available` and the full
    /// credential bundle is present.
    #[must_use]
    pub fn connection_ready(&self) -> bool {
        self.state == CodespaceState::Available && self.connection.is_complete()
    }
}
