use serde::{Deserialize, Serialize};

/// Name of the pseudo snapshot that represents the running state.
pub const CURRENT_SNAPSHOT: &str = "current";

/// A snapshot of a guest, from `/nodes/{node}/{type}/{vmid}/snapshot`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SnapshotInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Creation time, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snaptime: Option<u64>,
    /// Set to 1 when RAM state was saved with the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmstate: Option<u8>,
}
