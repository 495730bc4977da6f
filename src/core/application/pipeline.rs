//! One invocation end to end: fetch, resolve, guard, dispatch, report.

use crate::core::{
    application::{
        directory::ResourceDirectory,
        dispatcher::{ActionDispatcher, DEFAULT_POLL_INTERVAL},
        guard::{Confirm, TransitionGuard, Verdict},
        interrupt::Interrupt,
        resolver::TargetResolver,
    },
    domain::{
        cluster_api::ClusterApi,
        error::{ProxmoxError, ProxmoxResult},
        model::{
            action::{Action, ActionRequest},
            outcome::{Outcome, Report, TargetOutcome},
        },
    },
};
use std::{collections::VecDeque, time::Duration};
use tracing::{debug, info};

/// Receives notes and per-target outcomes as soon as they are final, in
/// target order.
pub trait Progress {
    fn note(&self, _note: &str) {}
    fn outcome(&self, action: &Action, outcome: &TargetOutcome);
}

/// Ignores progress. The report still carries every outcome.
pub struct Quiet;

impl Progress for Quiet {
    fn outcome(&self, _action: &Action, _outcome: &TargetOutcome) {}
}

/// Collaborators shared by every invocation.
pub struct Invocation<'a> {
    pub api: &'a dyn ClusterApi,
    pub guard: TransitionGuard,
    pub confirmer: &'a dyn Confirm,
    pub interrupt: Interrupt,
    pub progress: &'a dyn Progress,
    pub poll_interval: Duration,
}

impl<'a> Invocation<'a> {
    pub fn new(
        api: &'a dyn ClusterApi,
        guard: TransitionGuard,
        confirmer: &'a dyn Confirm,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            api,
            guard,
            confirmer,
            interrupt,
            progress: &Quiet,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }
}

/// Publishes outcomes in target order. `None` slots wait for the dispatcher.
struct Publisher<'p> {
    action: &'p Action,
    progress: &'p dyn Progress,
    slots: VecDeque<Option<TargetOutcome>>,
    report: Report,
}

impl Publisher<'_> {
    /// Publishes settled outcomes up to the next target still to be dispatched.
    fn flush(&mut self) {
        while matches!(self.slots.front(), Some(Some(_))) {
            if let Some(Some(outcome)) = self.slots.pop_front() {
                self.publish(outcome);
            }
        }
    }

    fn dispatched(&mut self, outcome: TargetOutcome) {
        self.slots.pop_front();
        self.publish(outcome);
        self.flush();
    }

    fn publish(&mut self, outcome: TargetOutcome) {
        self.progress.outcome(self.action, &outcome);
        self.report.push(outcome);
    }
}

/// Runs `request` and collects one outcome per target, in the order the
/// targets were given. Each outcome is handed to the invocation's
/// [`Progress`] as soon as it is final.
///
/// Unresolvable targets, rejections and failed dispatches are recorded in the
/// report and never stop the batch.
///
/// # Errors
///
/// - `ProxmoxError::Usage` when a mutating action is given no target; nothing
///   is fetched in that case
/// - `ProxmoxError::DirectoryFetch` or `ProxmoxError::Authentication` when the
///   cluster resource list cannot be obtained
/// - `ProxmoxError::Interrupted` when the operator interrupts before dispatch
pub async fn run(invocation: &Invocation<'_>, request: &ActionRequest) -> ProxmoxResult<Report> {
    let action = &request.action;
    if request.targets.is_empty() && !action.is_read_only() {
        return Err(ProxmoxError::Usage(format!(
            "{action} needs at least one VMID or --node"
        )));
    }

    let directory = tokio::select! {
        directory = ResourceDirectory::fetch(invocation.api) => directory?,
        _ = invocation.interrupt.triggered() => return Err(ProxmoxError::Interrupted),
    };

    let resolution =
        TargetResolver::new(&directory).resolve(&request.targets, action.is_read_only());

    let mut report = Report::default();
    if directory.is_empty() {
        report.notes.push("cluster has no guests".to_string());
    }
    for node in &resolution.empty_nodes {
        report.notes.push(format!("node {node} hosts no guests"));
    }
    for note in &report.notes {
        invocation.progress.note(note);
    }

    let verdicts = invocation
        .guard
        .evaluate_all(action, resolution.records, invocation.confirmer);
    let prompt_interrupted = verdicts
        .iter()
        .any(|(_, verdict)| *verdict == Verdict::Interrupted);

    let mut unresolved = resolution.unresolved.into_iter().peekable();
    let mut slots = VecDeque::with_capacity(verdicts.len() + unresolved.len());
    let mut allowed = Vec::new();
    for (index, (record, verdict)) in verdicts.into_iter().enumerate() {
        while let Some(u) = unresolved.next_if(|u| u.position <= index) {
            slots.push_back(Some(TargetOutcome::new(u.target, Outcome::Failed(u.error))));
        }
        let outcome = match verdict {
            Verdict::Allow => {
                allowed.push(record);
                slots.push_back(None);
                continue;
            }
            Verdict::Reject(reason) => Outcome::Rejected(reason),
            Verdict::AlreadyInState(reason) => Outcome::AlreadyInState(reason),
            Verdict::NeedsConfirmation => Outcome::Rejected(format!("{action} not confirmed")),
            Verdict::Interrupted => Outcome::Failed(ProxmoxError::Interrupted),
        };
        slots.push_back(Some(TargetOutcome::new(record.label(), outcome)));
    }
    slots.extend(unresolved.map(|u| Some(TargetOutcome::new(u.target, Outcome::Failed(u.error)))));
    debug!(
        allowed = allowed.len(),
        settled = slots.len() - allowed.len(),
        "guard applied"
    );

    let mut publisher = Publisher {
        action,
        progress: invocation.progress,
        slots,
        report,
    };
    publisher.flush();

    let dispatcher =
        ActionDispatcher::new(invocation.api, request.mode, invocation.interrupt.clone())
            .with_poll_interval(invocation.poll_interval);
    dispatcher
        .dispatch_each(action, &allowed, &mut |outcome| publisher.dispatched(outcome))
        .await;
    publisher.flush();

    let mut report = publisher.report;
    report.interrupted = prompt_interrupted || invocation.interrupt.is_triggered();
    info!(
        targets = report.outcomes.len(),
        failures = report.failures(),
        interrupted = report.interrupted,
        "invocation finished"
    );
    Ok(report)
}
