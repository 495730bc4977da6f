use serde::Deserialize;

/// State of a cluster task, from `/nodes/{node}/tasks/{upid}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskStatus {
    /// `running` or `stopped`.
    pub status: String,
    /// Present once stopped: `OK`, `WARNINGS: n`, or an error message.
    #[serde(default)]
    pub exitstatus: Option<String>,
}

impl TaskStatus {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    /// Finished tasks that ended in `OK` or with warnings only.
    pub fn succeeded(&self) -> bool {
        !self.is_running()
            && self
                .exitstatus
                .as_deref()
                .is_some_and(|s| s == "OK" || s.starts_with("WARNINGS"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: &str, exit: Option<&str>) -> TaskStatus {
        TaskStatus {
            status: status.to_string(),
            exitstatus: exit.map(str::to_string),
        }
    }

    #[test]
    fn test_task_outcomes() {
        assert!(status("running", None).is_running());
        assert!(!status("running", None).succeeded());
        assert!(status("stopped", Some("OK")).succeeded());
        assert!(status("stopped", Some("WARNINGS: 2")).succeeded());
        assert!(!status("stopped", Some("command 'qm start' failed")).succeeded());
        assert!(!status("stopped", None).succeeded());
    }
}
