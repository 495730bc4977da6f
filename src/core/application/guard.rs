//! Decides, per target, whether an action may be issued given the guest's
//! observed status.
//!
//! | status  | start    | stop / shutdown | reboot / suspend / resume / destroy |
//! |---------|----------|-----------------|-------------------------------------|
//! | stopped | allow    | already stopped | reject                              |
//! | running | already  | allow           | allow                               |
//! | unknown | reject   | reject          | reject                              |
//!
//! Configuration actions are allowed in any state unless the policy is strict,
//! which rejects them on unknown status. Queries are never guarded. The policy
//! can also allow destroy on stopped guests. An allowed destroy needs a
//! confirmation unless the operator skipped it.

use crate::core::domain::model::{
    action::{Action, PowerAction},
    resource_record::{GuestStatus, ResourceRecord},
};
use tracing::debug;

/// The guard's decision for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Reject(String),
    AlreadyInState(String),
    /// Allowed once the operator confirms.
    NeedsConfirmation,
    /// The operator interrupted the confirmation prompt.
    Interrupted,
}

/// The operator's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    Interrupted,
}

/// Asks the operator to confirm a destructive action on a batch of guests.
pub trait Confirm {
    fn confirm(&self, action: &Action, targets: &[ResourceRecord]) -> Confirmation;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Reject configuration actions on guests whose status is unknown.
    pub strict_configuration: bool,
    /// Allow destroy on stopped guests as well as running ones.
    pub destroy_stopped: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionGuard {
    policy: GuardPolicy,
    skip_confirm: bool,
}

impl TransitionGuard {
    pub fn new(policy: GuardPolicy, skip_confirm: bool) -> Self {
        Self {
            policy,
            skip_confirm,
        }
    }

    pub fn evaluate(&self, action: &Action, record: &ResourceRecord) -> Verdict {
        let verdict = match action {
            Action::Status
            | Action::ListSnapshots
            | Action::HaStatus
            | Action::ReplicationList => Verdict::Allow,
            Action::Snapshot { .. }
            | Action::DeleteSnapshot { .. }
            | Action::Vzdump(_)
            | Action::HaSet(_)
            | Action::HaRemove
            | Action::ReplicationScheduleNow => self.configuration(action, record),
            Action::Power(power) => power_transition(*power, action, record),
            Action::Destroy(_) => match self.destroy_transition(action, record) {
                Verdict::Allow if !self.skip_confirm => Verdict::NeedsConfirmation,
                verdict => verdict,
            },
        };
        debug!(guest = %record.label(), status = %record.status, %action, ?verdict, "guard");
        verdict
    }

    fn configuration(&self, action: &Action, record: &ResourceRecord) -> Verdict {
        if self.policy.strict_configuration && record.status == GuestStatus::Unknown {
            Verdict::Reject(unknown_status(action))
        } else {
            Verdict::Allow
        }
    }

    fn destroy_transition(&self, action: &Action, record: &ResourceRecord) -> Verdict {
        match record.status {
            GuestStatus::Running => Verdict::Allow,
            GuestStatus::Stopped if self.policy.destroy_stopped => Verdict::Allow,
            GuestStatus::Stopped => Verdict::Reject(format!("stopped, cannot {action}")),
            GuestStatus::Unknown => Verdict::Reject(unknown_status(action)),
        }
    }

    /// Evaluates every target, then asks once for all targets that need a
    /// confirmation. Declined targets are rejected.
    pub fn evaluate_all(
        &self,
        action: &Action,
        records: Vec<ResourceRecord>,
        confirmer: &dyn Confirm,
    ) -> Vec<(ResourceRecord, Verdict)> {
        let mut verdicts: Vec<(ResourceRecord, Verdict)> = records
            .into_iter()
            .map(|record| {
                let verdict = self.evaluate(action, &record);
                (record, verdict)
            })
            .collect();

        let pending: Vec<ResourceRecord> = verdicts
            .iter()
            .filter(|(_, v)| *v == Verdict::NeedsConfirmation)
            .map(|(r, _)| r.clone())
            .collect();
        if pending.is_empty() {
            return verdicts;
        }

        let answer = confirmer.confirm(action, &pending);
        debug!(count = pending.len(), ?answer, "confirmation answered");
        for (_, verdict) in verdicts.iter_mut() {
            if *verdict == Verdict::NeedsConfirmation {
                *verdict = match answer {
                    Confirmation::Confirmed => Verdict::Allow,
                    Confirmation::Declined => Verdict::Reject(format!("{action} not confirmed")),
                    Confirmation::Interrupted => Verdict::Interrupted,
                };
            }
        }
        verdicts
    }
}

fn unknown_status(action: &Action) -> String {
    format!("status cannot be determined, refusing to {action}")
}

fn power_transition(power: PowerAction, action: &Action, record: &ResourceRecord) -> Verdict {
    match (record.status, power) {
        (GuestStatus::Unknown, _) => Verdict::Reject(unknown_status(action)),
        (GuestStatus::Stopped, PowerAction::Start) => Verdict::Allow,
        (GuestStatus::Stopped, PowerAction::Stop | PowerAction::Shutdown) => {
            Verdict::AlreadyInState("already stopped".to_string())
        }
        (GuestStatus::Stopped, _) => Verdict::Reject(format!("stopped, cannot {action}")),
        (GuestStatus::Running, PowerAction::Start) => {
            Verdict::AlreadyInState("already running".to_string())
        }
        (GuestStatus::Running, _) => Verdict::Allow,
    }
}
