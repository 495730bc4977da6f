//! Per-target results and the report they are collected into.

use crate::core::domain::{
    error::ProxmoxError,
    model::{
        ha::HaResource, replication::ReplicationJob, resource_record::GuestStatus,
        resource_record::ResourceRecord, snapshot::SnapshotInfo,
    },
};

/// What an executed action produced.
#[derive(Debug)]
pub enum Execution {
    /// The cluster accepted the task; completion was not awaited.
    Submitted { upid: String },
    /// The task finished successfully. `observed` is the guest status read back
    /// afterwards, when it could be read.
    Completed {
        upid: String,
        observed: Option<GuestStatus>,
    },
    /// A call without a cluster task completed.
    Done,
    Status(ResourceRecord),
    Snapshots(Vec<SnapshotInfo>),
    Ha(Option<HaResource>),
    Replications(Vec<ReplicationJob>),
    /// Replication jobs that were scheduled to run now.
    Scheduled(Vec<String>),
}

/// Terminal result for one target. Never mutated after creation.
#[derive(Debug)]
pub enum Outcome {
    Executed(Execution),
    Rejected(String),
    AlreadyInState(String),
    /// Unresolvable target, failed dispatch, or cancelled by an interrupt.
    Failed(ProxmoxError),
}

impl Outcome {
    /// Rejections and failures make the invocation unsuccessful.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Rejected(_) | Outcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct TargetOutcome {
    /// `type/vmid` for resolved guests, the raw token otherwise.
    pub target: String,
    pub outcome: Outcome,
}

impl TargetOutcome {
    pub fn new(target: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            target: target.into(),
            outcome,
        }
    }
}

/// Process exit status derived from a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Interrupted,
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Interrupted => 130,
        }
    }
}

/// Everything one invocation produced, in target order.
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<TargetOutcome>,
    /// Informational lines that belong to no single target.
    pub notes: Vec<String>,
    pub interrupted: bool,
}

impl Report {
    pub fn push(&mut self, outcome: TargetOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_failure())
            .count()
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.interrupted {
            ExitStatus::Interrupted
        } else if self.failures() > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
