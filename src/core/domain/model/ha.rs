//! High-availability resource models (`/cluster/ha/resources`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested HA state of a managed guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HaState {
    Started,
    Stopped,
    Disabled,
    Ignored,
}

impl HaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HaState::Started => "started",
            HaState::Stopped => "stopped",
            HaState::Disabled => "disabled",
            HaState::Ignored => "ignored",
        }
    }
}

impl fmt::Display for HaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HaState {
    type Err = String;

    /// `enabled` is accepted as the legacy alias of `started`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" | "enabled" => Ok(HaState::Started),
            "stopped" => Ok(HaState::Stopped),
            "disabled" => Ok(HaState::Disabled),
            "ignored" => Ok(HaState::Ignored),
            other => Err(format!(
                "invalid HA state '{other}' (expected started, stopped, disabled or ignored)"
            )),
        }
    }
}

/// An HA-managed resource as listed by the cluster.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HaResource {
    /// Service id, e.g. `vm:100`.
    pub sid: String,
    /// Configured state as a raw string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_restart: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_relocate: Option<u32>,
}

impl HaResource {
    /// The configured state, if it is one of the known values.
    pub fn ha_state(&self) -> Option<HaState> {
        self.state.as_deref().and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ha_state_parsing() {
        assert_eq!("started".parse::<HaState>(), Ok(HaState::Started));
        assert_eq!("enabled".parse::<HaState>(), Ok(HaState::Started));
        assert_eq!("ignored".parse::<HaState>(), Ok(HaState::Ignored));
        assert!("frozen".parse::<HaState>().is_err());
    }

    #[test]
    fn test_ha_resource_state() {
        let resource: HaResource = serde_json::from_value(serde_json::json!({
            "sid": "vm:100", "state": "started", "group": "prod", "type": "vm", "digest": "x"
        }))
        .unwrap();
        assert_eq!(resource.ha_state(), Some(HaState::Started));
        assert_eq!(resource.group.as_deref(), Some("prod"));
    }
}
