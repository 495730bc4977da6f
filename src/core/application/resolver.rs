//! Turns operator targets into an ordered, duplicate-free list of guests.

use crate::core::{
    application::directory::ResourceDirectory,
    domain::{
        error::{ProxmoxError, ValidationError},
        model::{action::TargetRequest, resource_record::ResourceRecord},
    },
};
use std::collections::HashSet;
use tracing::debug;

/// A target that could not be mapped to a guest. Reported, never fatal.
#[derive(Debug)]
pub struct Unresolved {
    /// The token as the operator typed it.
    pub target: String,
    pub error: ProxmoxError,
    /// Index in [`Resolution::records`] of the first guest requested after
    /// this target, so reports can keep command-line order.
    pub position: usize,
}

#[derive(Debug, Default)]
pub struct Resolution {
    /// Resolved guests: explicit requests in the order given, node expansions
    /// in VMID order, each guest at most once.
    pub records: Vec<ResourceRecord>,
    pub unresolved: Vec<Unresolved>,
    /// Known nodes that host no guests.
    pub empty_nodes: Vec<String>,
}

pub struct TargetResolver<'a> {
    directory: &'a ResourceDirectory,
}

impl<'a> TargetResolver<'a> {
    pub fn new(directory: &'a ResourceDirectory) -> Self {
        Self { directory }
    }

    /// Resolves `requests` against the directory. An empty request list resolves
    /// to every guest when `all_when_empty` is set, and to nothing otherwise.
    pub fn resolve(&self, requests: &[TargetRequest], all_when_empty: bool) -> Resolution {
        let mut resolution = Resolution::default();
        let mut seen = HashSet::new();

        if requests.is_empty() && all_when_empty {
            resolution.records = self.directory.records().cloned().collect();
            return resolution;
        }

        for request in requests {
            match request {
                TargetRequest::Guest(raw) => match self.lookup(raw) {
                    Ok(record) => {
                        if seen.insert(record.vmid) {
                            resolution.records.push(record.clone());
                        }
                    }
                    Err(error) => resolution.unresolved.push(Unresolved {
                        target: raw.clone(),
                        error,
                        position: resolution.records.len(),
                    }),
                },
                TargetRequest::Node(node) => match self.directory.guests_on(node) {
                    Some(guests) if guests.is_empty() => {
                        resolution.empty_nodes.push(node.clone());
                    }
                    Some(guests) => {
                        for record in guests {
                            if seen.insert(record.vmid) {
                                resolution.records.push(record.clone());
                            }
                        }
                    }
                    None => resolution.unresolved.push(Unresolved {
                        target: node.clone(),
                        error: ProxmoxError::UnknownIdentifier(format!("node '{node}'")),
                        position: resolution.records.len(),
                    }),
                },
            }
        }

        debug!(
            resolved = resolution.records.len(),
            unresolved = resolution.unresolved.len(),
            "targets resolved"
        );
        resolution
    }

    fn lookup(&self, raw: &str) -> Result<&'a ResourceRecord, ProxmoxError> {
        let vmid: u32 = raw.trim().parse().map_err(|_| {
            ProxmoxError::from(ValidationError::Format(format!(
                "'{raw}' is not a valid VMID"
            )))
        })?;
        self.directory
            .get(vmid)
            .ok_or_else(|| ProxmoxError::UnknownIdentifier(vmid.to_string()))
    }
}
