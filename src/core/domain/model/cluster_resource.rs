//! Wire models for the `/cluster/resources` endpoint.
//!
//! The response is a heterogeneous list tagged by `type`. Only guests and nodes
//! matter to the dispatcher; storage, pools, SDN zones and future types are
//! folded into [`ClusterResource::Other`].

use serde::{Deserialize, Serialize};

/// One entry of the cluster resource list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClusterResource {
    /// A QEMU virtual machine.
    Qemu(GuestResource),
    /// An LXC container.
    Lxc(GuestResource),
    /// A cluster node.
    Node(NodeResource),
    /// Any resource type the dispatcher does not act on.
    #[serde(other)]
    Other,
}

/// Fields shared by VM and container entries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GuestResource {
    /// The guest identifier, unique across the cluster.
    pub vmid: u32,
    /// The node currently hosting the guest.
    pub node: String,
    /// Human-readable name (may be absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw status string (`running`, `stopped`, `unknown`, ...). Absent when the
    /// hosting node is offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Set to 1 for templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<u8>,
}

/// A node entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeResource {
    /// The node name.
    pub node: String,
    /// `online`, `offline` or `unknown`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
