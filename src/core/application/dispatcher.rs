//! Issues allowed actions against the cluster, one target at a time.

use crate::core::{
    application::interrupt::Interrupt,
    domain::{
        cluster_api::ClusterApi,
        error::{ProxmoxError, ProxmoxResult},
        model::{
            action::{Action, DispatchMode},
            ha::HaResource,
            outcome::{Execution, Outcome, TargetOutcome},
            replication::ReplicationJob,
            resource_record::ResourceRecord,
            task::TaskStatus,
        },
    },
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often a task is polled in sync mode.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct ActionDispatcher<'a> {
    api: &'a dyn ClusterApi,
    mode: DispatchMode,
    interrupt: Interrupt,
    poll_interval: Duration,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(api: &'a dyn ClusterApi, mode: DispatchMode, interrupt: Interrupt) -> Self {
        Self {
            api,
            mode,
            interrupt,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Dispatches `action` to every target in order and returns one outcome per
    /// target, in the same order.
    pub async fn dispatch(
        &self,
        action: &Action,
        targets: &[ResourceRecord],
    ) -> Vec<TargetOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        self.dispatch_each(action, targets, &mut |outcome| outcomes.push(outcome))
            .await;
        outcomes
    }

    /// Dispatches `action` to every target in order, handing each outcome to
    /// `on_outcome` as soon as it is final and before the next target starts.
    ///
    /// The interrupt is checked before each target. Once it has fired, targets
    /// not yet invoked are reported as cancelled. In sync mode a wait that is
    /// interrupted reports its task as submitted.
    pub async fn dispatch_each(
        &self,
        action: &Action,
        targets: &[ResourceRecord],
        on_outcome: &mut dyn FnMut(TargetOutcome),
    ) {
        let replications = if !targets.is_empty()
            && matches!(
                action,
                Action::ReplicationList | Action::ReplicationScheduleNow
            ) {
            self.api
                .list_replications()
                .await
                .map_err(|e| e.to_string())
        } else {
            Ok(Vec::new())
        };

        for record in targets {
            if self.interrupt.is_triggered() {
                debug!(guest = %record.label(), "cancelled before dispatch");
                on_outcome(TargetOutcome::new(
                    record.label(),
                    Outcome::Failed(ProxmoxError::Interrupted),
                ));
                continue;
            }

            let outcome = match self.execute(action, record, &replications).await {
                Ok(outcome) => outcome,
                Err(e @ ProxmoxError::ActionDispatch { .. }) => Outcome::Failed(e),
                Err(e) => Outcome::Failed(dispatch_error(action, record, e.to_string())),
            };
            if let Outcome::Failed(e) = &outcome {
                warn!(guest = %record.label(), %action, error = %e, "action failed");
            }
            on_outcome(TargetOutcome::new(record.label(), outcome));
        }
    }

    async fn execute(
        &self,
        action: &Action,
        record: &ResourceRecord,
        replications: &Result<Vec<ReplicationJob>, String>,
    ) -> ProxmoxResult<Outcome> {
        let api = self.api;
        let (node, guest_type, vmid) = (record.node.as_str(), record.guest_type, record.vmid);
        info!(guest = %record.label(), node, %action, "dispatching");

        match action {
            Action::Status => Ok(Outcome::Executed(Execution::Status(record.clone()))),
            Action::Power(power) => {
                let upid = api.power(node, guest_type, vmid, *power).await?;
                self.track(action, record, upid).await
            }
            Action::Destroy(options) => {
                let upid = api.destroy(node, guest_type, vmid, *options).await?;
                self.track(action, record, upid).await
            }
            Action::Snapshot { name, description } => {
                let upid = api
                    .create_snapshot(node, guest_type, vmid, name, description.clone())
                    .await?;
                self.track(action, record, upid).await
            }
            Action::DeleteSnapshot { name, force } => {
                let upid = api
                    .delete_snapshot(node, guest_type, vmid, name, *force)
                    .await?;
                self.track(action, record, upid).await
            }
            Action::ListSnapshots => {
                let snapshots = api.list_snapshots(node, guest_type, vmid).await?;
                Ok(Outcome::Executed(Execution::Snapshots(snapshots)))
            }
            Action::Vzdump(options) => {
                let upid = api.vzdump(node, vmid, options.clone()).await?;
                self.track(action, record, upid).await
            }
            Action::HaStatus => {
                let resource = api.ha_state(&record.ha_sid()).await?;
                Ok(Outcome::Executed(Execution::Ha(resource)))
            }
            Action::HaSet(state) => {
                let sid = record.ha_sid();
                let current = api.ha_state(&sid).await?;
                if current.as_ref().and_then(HaResource::ha_state) == Some(*state) {
                    return Ok(Outcome::AlreadyInState(format!(
                        "already in HA state {state}"
                    )));
                }
                api.set_ha_state(&sid, *state, current.is_some()).await?;
                Ok(Outcome::Executed(Execution::Done))
            }
            Action::HaRemove => {
                let sid = record.ha_sid();
                if api.ha_state(&sid).await?.is_none() {
                    return Ok(Outcome::AlreadyInState("not HA-managed".to_string()));
                }
                api.remove_ha(&sid).await?;
                Ok(Outcome::Executed(Execution::Done))
            }
            Action::ReplicationList => {
                let jobs = replications
                    .as_ref()
                    .map_err(|m| dispatch_error(action, record, m.clone()))?;
                let jobs = jobs
                    .iter()
                    .filter(|j| j.guest == vmid && j.is_enabled())
                    .cloned()
                    .collect();
                Ok(Outcome::Executed(Execution::Replications(jobs)))
            }
            Action::ReplicationScheduleNow => {
                let jobs = replications
                    .as_ref()
                    .map_err(|m| dispatch_error(action, record, m.clone()))?;
                let enabled: Vec<&ReplicationJob> = jobs
                    .iter()
                    .filter(|j| j.guest == vmid && j.is_enabled())
                    .collect();
                if enabled.is_empty() {
                    return Ok(Outcome::Rejected(
                        "no enabled replication jobs".to_string(),
                    ));
                }
                let mut scheduled = Vec::with_capacity(enabled.len());
                for job in enabled {
                    let source = job.source.as_deref().unwrap_or(node);
                    if let Err(e) = api.schedule_replication_now(source, &job.id).await {
                        let message = if scheduled.is_empty() {
                            format!("job {}: {e}", job.id)
                        } else {
                            format!(
                                "job {}: {e} (already scheduled: {})",
                                job.id,
                                scheduled.join(", ")
                            )
                        };
                        return Err(dispatch_error(action, record, message));
                    }
                    scheduled.push(job.id.clone());
                }
                Ok(Outcome::Executed(Execution::Scheduled(scheduled)))
            }
        }
    }

    /// Reports a submitted task, waiting for it first in sync mode.
    async fn track(
        &self,
        action: &Action,
        record: &ResourceRecord,
        upid: String,
    ) -> ProxmoxResult<Outcome> {
        debug!(guest = %record.label(), %upid, "task accepted");
        if self.mode == DispatchMode::Async {
            return Ok(Outcome::Executed(Execution::Submitted { upid }));
        }

        let status = tokio::select! {
            status = self.wait_for_task(&record.node, &upid) => status?,
            _ = self.interrupt.triggered() => {
                warn!(
                    guest = %record.label(),
                    %upid,
                    "interrupted while waiting, task keeps running"
                );
                return Ok(Outcome::Executed(Execution::Submitted { upid }));
            }
        };

        if !status.succeeded() {
            let exit = status.exitstatus.as_deref().unwrap_or("unknown");
            return Err(dispatch_error(
                action,
                record,
                format!("task {upid} ended with '{exit}'"),
            ));
        }

        let observed = if matches!(action, Action::Power(_)) {
            match self
                .api
                .get_status(&record.node, record.guest_type, record.vmid)
                .await
            {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(guest = %record.label(), error = %e, "could not read back status");
                    None
                }
            }
        } else {
            None
        };
        Ok(Outcome::Executed(Execution::Completed { upid, observed }))
    }

    async fn wait_for_task(&self, node: &str, upid: &str) -> ProxmoxResult<TaskStatus> {
        loop {
            let status = self.api.task_status(node, upid).await?;
            if !status.is_running() {
                return Ok(status);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn dispatch_error(action: &Action, record: &ResourceRecord, message: String) -> ProxmoxError {
    ProxmoxError::ActionDispatch {
        action: action.name().to_string(),
        target: record.label(),
        message,
    }
}
