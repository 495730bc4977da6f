//! Normalised view of one guest, built at the directory-fetch boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two guest kinds Proxmox VE hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestType {
    /// QEMU/KVM virtual machine.
    Qemu,
    /// LXC container.
    Lxc,
}

impl GuestType {
    /// The path segment used by `/nodes/{node}/{type}/...` endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestType::Qemu => "qemu",
            GuestType::Lxc => "lxc",
        }
    }

    /// The prefix of an HA service id (`vm:100`, `ct:200`).
    pub fn ha_prefix(&self) -> &'static str {
        match self {
            GuestType::Qemu => "vm",
            GuestType::Lxc => "ct",
        }
    }
}

impl fmt::Display for GuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run state of a guest, reduced to the closed set the guard reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestStatus {
    Running,
    Stopped,
    Unknown,
}

impl GuestStatus {
    /// Maps a raw API status string. Anything other than `running` or `stopped`
    /// (including a missing field) becomes `Unknown`.
    pub fn from_api(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("running") => GuestStatus::Running,
            Some(s) if s.eq_ignore_ascii_case("stopped") => GuestStatus::Stopped,
            _ => GuestStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Running => "running",
            GuestStatus::Stopped => "stopped",
            GuestStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guest as seen at fetch time. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub vmid: u32,
    pub node: String,
    pub guest_type: GuestType,
    pub status: GuestStatus,
    pub name: Option<String>,
    pub uptime: Option<u64>,
}

impl ResourceRecord {
    /// `type/vmid`, the label used in every report line.
    pub fn label(&self) -> String {
        format!("{}/{}", self.guest_type, self.vmid)
    }

    /// HA service id for this guest.
    pub fn ha_sid(&self) -> String {
        format!("{}:{}", self.guest_type.ha_prefix(), self.vmid)
    }
}
