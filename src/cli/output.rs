//! Report rendering. One or more lines per target, printed as each target
//! settles.

use crate::{Action, Execution, GuestStatus, Outcome, Progress, ResourceRecord, TargetOutcome};

/// `1d 2h 3m`, `4h 5m`, `6m 7s` or `8s`.
pub fn humanize_seconds(seconds: u64) -> String {
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours >= 24 {
        let (days, hours) = (hours / 24, hours % 24);
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// `type/vmid: name status uptime`. Uptime only for running guests.
pub fn format_status(record: &ResourceRecord) -> String {
    let name = record.name.as_deref().unwrap_or("-");
    let line = format!("{}: {name} {}", record.label(), record.status);
    match record.uptime {
        Some(uptime) if record.status == GuestStatus::Running && uptime > 0 => {
            format!("{line} {}", humanize_seconds(uptime))
        }
        _ => line,
    }
}

pub fn outcome_lines(outcome: &TargetOutcome, action: &Action) -> Vec<String> {
    let mut lines = Vec::new();
    let target = &outcome.target;
    match &outcome.outcome {
        Outcome::Executed(execution) => match execution {
            Execution::Submitted { upid } => {
                lines.push(format!("{target}: {action} submitted ({upid})"))
            }
            Execution::Completed { observed, .. } => match observed {
                Some(status) => lines.push(format!("{target}: {action} completed, now {status}")),
                None => lines.push(format!("{target}: {action} completed")),
            },
            Execution::Done => lines.push(format!("{target}: {action} done")),
            Execution::Status(record) => lines.push(format_status(record)),
            Execution::Snapshots(snapshots) if snapshots.is_empty() => {
                lines.push(format!("{target}: no snapshots"))
            }
            Execution::Snapshots(snapshots) => {
                for snapshot in snapshots {
                    match &snapshot.description {
                        Some(description) if !description.trim().is_empty() => lines.push(
                            format!("{target}: {} ({})", snapshot.name, description.trim()),
                        ),
                        _ => lines.push(format!("{target}: {}", snapshot.name)),
                    }
                }
            }
            Execution::Ha(Some(resource)) => lines.push(format!(
                "{target}: {} {}",
                resource.sid,
                resource.state.as_deref().unwrap_or("started")
            )),
            Execution::Ha(None) => lines.push(format!("{target}: not HA-managed")),
            Execution::Replications(jobs) if jobs.is_empty() => {
                lines.push(format!("{target}: no replication jobs"))
            }
            Execution::Replications(jobs) => {
                for job in jobs {
                    lines.push(format!(
                        "{target}: {} {} -> {} ({})",
                        job.id,
                        job.source.as_deref().unwrap_or("?"),
                        job.target,
                        job.schedule.as_deref().unwrap_or("*/15")
                    ));
                }
            }
            Execution::Scheduled(ids) => {
                lines.push(format!("{target}: replication {} scheduled", ids.join(", ")))
            }
        },
        Outcome::Rejected(reason) => lines.push(format!("{target}: rejected, {reason}")),
        Outcome::AlreadyInState(reason) => lines.push(format!("{target}: {reason}")),
        Outcome::Failed(error) => lines.push(format!("{target}: error: {error}")),
    }
    lines
}

/// Prints notes and outcome lines to stdout as they arrive.
pub struct StdoutProgress;

impl Progress for StdoutProgress {
    fn note(&self, note: &str) {
        println!("{note}");
    }

    fn outcome(&self, action: &Action, outcome: &TargetOutcome) {
        for line in outcome_lines(outcome, action) {
            println!("{line}");
        }
    }
}
