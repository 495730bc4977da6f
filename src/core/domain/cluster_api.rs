//! The cluster collaborator the dispatcher core depends on.
//!
//! [`crate::ProxmoxClient`] implements it over the Proxmox VE HTTP API; tests use the
//! generated `MockClusterApi`.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{
        action::{DestroyOptions, PowerAction, VzdumpOptions},
        cluster_resource::ClusterResource,
        ha::{HaResource, HaState},
        replication::ReplicationJob,
        resource_record::{GuestStatus, GuestType},
        snapshot::SnapshotInfo,
        task::TaskStatus,
    },
};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Operations the dispatcher needs from the cluster. Calls that start a cluster
/// task return its UPID.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Every resource in the cluster, across all nodes.
    async fn list_resources(&self) -> ProxmoxResult<Vec<ClusterResource>>;

    /// Current run state of one guest.
    async fn get_status(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
    ) -> ProxmoxResult<GuestStatus>;

    async fn power(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        action: PowerAction,
    ) -> ProxmoxResult<String>;

    async fn destroy(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        options: DestroyOptions,
    ) -> ProxmoxResult<String>;

    async fn create_snapshot(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        name: &str,
        description: Option<String>,
    ) -> ProxmoxResult<String>;

    async fn delete_snapshot(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        name: &str,
        force: bool,
    ) -> ProxmoxResult<String>;

    async fn list_snapshots(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
    ) -> ProxmoxResult<Vec<SnapshotInfo>>;

    async fn vzdump(&self, node: &str, vmid: u32, options: VzdumpOptions)
    -> ProxmoxResult<String>;

    /// The HA configuration for a service id, `None` when it is not HA-managed.
    async fn ha_state(&self, sid: &str) -> ProxmoxResult<Option<HaResource>>;

    /// Sets the HA state, adding the resource to HA when `managed` is false.
    async fn set_ha_state(&self, sid: &str, state: HaState, managed: bool) -> ProxmoxResult<()>;

    async fn remove_ha(&self, sid: &str) -> ProxmoxResult<()>;

    /// Every replication job in the cluster, including disabled ones.
    async fn list_replications(&self) -> ProxmoxResult<Vec<ReplicationJob>>;

    async fn schedule_replication_now(&self, source_node: &str, job_id: &str)
    -> ProxmoxResult<()>;

    async fn task_status(&self, node: &str, upid: &str) -> ProxmoxResult<TaskStatus>;
}
