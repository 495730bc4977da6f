//! In-memory lookup of every guest in the cluster, built once per invocation.

use crate::core::domain::{
    cluster_api::ClusterApi,
    error::{ProxmoxError, ProxmoxResult},
    model::{
        cluster_resource::{ClusterResource, GuestResource},
        resource_record::{GuestStatus, GuestType, ResourceRecord},
    },
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// VMID → guest and node → hosted VMIDs. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDirectory {
    guests: BTreeMap<u32, ResourceRecord>,
    nodes: BTreeMap<String, BTreeSet<u32>>,
}

impl ResourceDirectory {
    /// Queries the cluster once and builds the directory.
    ///
    /// # Errors
    ///
    /// `ProxmoxError::DirectoryFetch` when the cluster cannot be reached or returns
    /// malformed data. Authentication failures are passed through unchanged.
    pub async fn fetch(api: &dyn ClusterApi) -> ProxmoxResult<Self> {
        let resources = api.list_resources().await.map_err(|e| match e {
            ProxmoxError::Authentication(_) => e,
            other => ProxmoxError::DirectoryFetch(other.to_string()),
        })?;
        let directory = Self::from_resources(resources)?;
        debug!(
            guests = directory.guests.len(),
            nodes = directory.nodes.len(),
            "resource directory built"
        );
        Ok(directory)
    }

    /// Builds the directory from an already fetched resource list.
    ///
    /// # Errors
    ///
    /// `ProxmoxError::DirectoryFetch` when a VMID is listed twice.
    pub fn from_resources(
        resources: impl IntoIterator<Item = ClusterResource>,
    ) -> ProxmoxResult<Self> {
        let mut directory = Self::default();
        for resource in resources {
            match resource {
                ClusterResource::Qemu(guest) => directory.insert(guest, GuestType::Qemu)?,
                ClusterResource::Lxc(guest) => directory.insert(guest, GuestType::Lxc)?,
                ClusterResource::Node(node) => {
                    directory.nodes.entry(node.node).or_default();
                }
                ClusterResource::Other => {}
            }
        }
        Ok(directory)
    }

    fn insert(&mut self, guest: GuestResource, guest_type: GuestType) -> ProxmoxResult<()> {
        if let Some(existing) = self.guests.get(&guest.vmid) {
            return Err(ProxmoxError::DirectoryFetch(format!(
                "VMID {} is listed twice ({} on {}, {} on {})",
                guest.vmid, existing.guest_type, existing.node, guest_type, guest.node
            )));
        }
        let record = ResourceRecord {
            vmid: guest.vmid,
            node: guest.node,
            guest_type,
            status: GuestStatus::from_api(guest.status.as_deref()),
            name: guest.name,
            uptime: guest.uptime,
        };
        self.nodes
            .entry(record.node.clone())
            .or_default()
            .insert(record.vmid);
        self.guests.insert(record.vmid, record);
        Ok(())
    }

    pub fn get(&self, vmid: u32) -> Option<&ResourceRecord> {
        self.guests.get(&vmid)
    }

    /// Guests hosted on `node` in VMID order, or `None` for a node the cluster
    /// does not know.
    pub fn guests_on(&self, node: &str) -> Option<Vec<&ResourceRecord>> {
        self.nodes
            .get(node)
            .map(|vmids| vmids.iter().filter_map(|id| self.guests.get(id)).collect())
    }

    /// All guests in VMID order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.guests.values()
    }

    pub fn len(&self) -> usize {
        self.guests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }
}
