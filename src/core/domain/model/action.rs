//! The closed set of commands the dispatcher understands, each carrying the
//! parameters it needs.

use crate::core::domain::model::ha::HaState;
use std::fmt;
use std::str::FromStr;

/// Actions that change a guest's run state through `/status/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Start,
    Stop,
    Shutdown,
    Reboot,
    Suspend,
    Resume,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
            PowerAction::Suspend => "suspend",
            PowerAction::Resume => "resume",
        }
    }
}

/// Flags forwarded verbatim to the destroy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Remove the guest from replication, backup and HA job configurations.
    pub purge_jobs: bool,
    /// Destroy disks on enabled storages that are not referenced in the config.
    pub destroy_unreferenced_disks: bool,
}

impl Default for DestroyOptions {
    fn default() -> Self {
        Self {
            purge_jobs: true,
            destroy_unreferenced_disks: true,
        }
    }
}

/// Backup mode passed to vzdump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VzdumpMode {
    Snapshot,
    Suspend,
    Stop,
}

impl VzdumpMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VzdumpMode::Snapshot => "snapshot",
            VzdumpMode::Suspend => "suspend",
            VzdumpMode::Stop => "stop",
        }
    }
}

impl FromStr for VzdumpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snapshot" => Ok(VzdumpMode::Snapshot),
            "suspend" => Ok(VzdumpMode::Suspend),
            "stop" => Ok(VzdumpMode::Stop),
            other => Err(format!(
                "invalid vzdump mode '{other}' (expected snapshot, suspend or stop)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VzdumpOptions {
    pub compress: String,
    pub storage: Option<String>,
    pub mode: Option<VzdumpMode>,
}

impl Default for VzdumpOptions {
    fn default() -> Self {
        Self {
            compress: "zstd".to_string(),
            storage: None,
            mode: None,
        }
    }
}

/// What the guard has to know about an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Changes run state; guarded against the observed status.
    Power,
    /// Changes configuration or schedules work; independent of run state.
    Configuration,
    /// Reads only.
    Query,
}

/// A requested command and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Status,
    Power(PowerAction),
    Destroy(DestroyOptions),
    Snapshot {
        name: String,
        description: Option<String>,
    },
    DeleteSnapshot {
        name: String,
        force: bool,
    },
    ListSnapshots,
    Vzdump(VzdumpOptions),
    HaStatus,
    HaSet(HaState),
    HaRemove,
    ReplicationList,
    ReplicationScheduleNow,
}

impl Action {
    /// The command-line token for this action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Status => "status",
            Action::Power(power) => power.as_str(),
            Action::Destroy(_) => "destroy",
            Action::Snapshot { .. } => "snapshot",
            Action::DeleteSnapshot { .. } => "delsnapshot",
            Action::ListSnapshots => "listsnapshot",
            Action::Vzdump(_) => "vzdump",
            Action::HaStatus => "ha-status",
            Action::HaSet(_) => "ha-set",
            Action::HaRemove => "ha-remove",
            Action::ReplicationList => "replication-list",
            Action::ReplicationScheduleNow => "replication-schedule-now",
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Power(_) | Action::Destroy(_) => ActionKind::Power,
            Action::Snapshot { .. }
            | Action::DeleteSnapshot { .. }
            | Action::Vzdump(_)
            | Action::HaSet(_)
            | Action::HaRemove
            | Action::ReplicationScheduleNow => ActionKind::Configuration,
            Action::Status | Action::ListSnapshots | Action::HaStatus | Action::ReplicationList => {
                ActionKind::Query
            }
        }
    }

    /// Read-only actions default to every guest when no target is given.
    pub fn is_read_only(&self) -> bool {
        self.kind() == ActionKind::Query
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the dispatcher waits for each cluster task to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Report once the cluster has accepted the task.
    #[default]
    Async,
    /// Wait for each task to finish before moving to the next target.
    Sync,
}

/// One positional target as typed by the operator, or a node filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRequest {
    /// A literal identifier, not yet known to be a valid VMID.
    Guest(String),
    /// Every guest hosted on the named node.
    Node(String),
}

/// Everything needed to run one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Action,
    pub targets: Vec<TargetRequest>,
    pub mode: DispatchMode,
    pub skip_confirm: bool,
}
