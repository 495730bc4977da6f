//! Storage replication jobs (`/cluster/replication`).

use serde::{Deserialize, Serialize};

/// A replication job as configured cluster-wide.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReplicationJob {
    /// Job id, `<vmid>-<n>`.
    pub id: String,
    /// The replicated guest.
    pub guest: u32,
    /// Node the storage is replicated to.
    pub target: String,
    /// Node the job runs on. Older clusters omit it; it then follows the guest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<u8>,
}

impl ReplicationJob {
    pub fn is_enabled(&self) -> bool {
        self.disable.unwrap_or(0) == 0
    }
}
