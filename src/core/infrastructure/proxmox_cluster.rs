//! [`ClusterApi`] over the Proxmox VE REST API.

use crate::{
    ProxmoxClient,
    core::domain::{
        cluster_api::ClusterApi,
        error::ProxmoxResult,
        model::{
            action::{DestroyOptions, PowerAction, VzdumpOptions},
            cluster_resource::ClusterResource,
            ha::{HaResource, HaState},
            replication::ReplicationJob,
            resource_record::{GuestStatus, GuestType},
            snapshot::{CURRENT_SNAPSHOT, SnapshotInfo},
            task::TaskStatus,
        },
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Deserialize)]
struct CurrentStatus {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
struct SnapshotBody<'a> {
    snapname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct VzdumpBody {
    vmid: String,
    compress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'static str>,
}

#[derive(Serialize)]
struct HaBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<&'a str>,
    state: &'static str,
}

fn guest_path(node: &str, guest_type: GuestType, vmid: u32) -> String {
    format!("nodes/{node}/{guest_type}/{vmid}")
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

#[async_trait]
impl ClusterApi for ProxmoxClient {
    async fn list_resources(&self) -> ProxmoxResult<Vec<ClusterResource>> {
        self.api_client.get("cluster/resources").await
    }

    async fn get_status(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
    ) -> ProxmoxResult<GuestStatus> {
        let current: CurrentStatus = self
            .api_client
            .get(&format!(
                "{}/status/current",
                guest_path(node, guest_type, vmid)
            ))
            .await?;
        Ok(GuestStatus::from_api(current.status.as_deref()))
    }

    async fn power(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        action: PowerAction,
    ) -> ProxmoxResult<String> {
        let path = format!(
            "{}/status/{}",
            guest_path(node, guest_type, vmid),
            action.as_str()
        );
        self.api_client.post(&path, &serde_json::json!({})).await
    }

    async fn destroy(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        options: DestroyOptions,
    ) -> ProxmoxResult<String> {
        let params = [
            ("purge", flag(options.purge_jobs)),
            (
                "destroy-unreferenced-disks",
                flag(options.destroy_unreferenced_disks),
            ),
        ];
        self.api_client
            .delete(&guest_path(node, guest_type, vmid), &params)
            .await
    }

    async fn create_snapshot(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        name: &str,
        description: Option<String>,
    ) -> ProxmoxResult<String> {
        let body = SnapshotBody {
            snapname: name,
            description,
        };
        self.api_client
            .post(
                &format!("{}/snapshot", guest_path(node, guest_type, vmid)),
                &body,
            )
            .await
    }

    async fn delete_snapshot(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
        name: &str,
        force: bool,
    ) -> ProxmoxResult<String> {
        let params = if force {
            vec![("force", flag(true))]
        } else {
            Vec::new()
        };
        self.api_client
            .delete(
                &format!("{}/snapshot/{name}", guest_path(node, guest_type, vmid)),
                &params,
            )
            .await
    }

    async fn list_snapshots(
        &self,
        node: &str,
        guest_type: GuestType,
        vmid: u32,
    ) -> ProxmoxResult<Vec<SnapshotInfo>> {
        let snapshots: Vec<SnapshotInfo> = self
            .api_client
            .get(&format!("{}/snapshot", guest_path(node, guest_type, vmid)))
            .await?;
        Ok(snapshots
            .into_iter()
            .filter(|s| s.name != CURRENT_SNAPSHOT)
            .collect())
    }

    async fn vzdump(
        &self,
        node: &str,
        vmid: u32,
        options: VzdumpOptions,
    ) -> ProxmoxResult<String> {
        let body = VzdumpBody {
            vmid: vmid.to_string(),
            compress: options.compress,
            storage: options.storage,
            mode: options.mode.map(|m| m.as_str()),
        };
        self.api_client
            .post(&format!("nodes/{node}/vzdump"), &body)
            .await
    }

    async fn ha_state(&self, sid: &str) -> ProxmoxResult<Option<HaResource>> {
        let resources: Vec<HaResource> = self.api_client.get("cluster/ha/resources").await?;
        debug!(count = resources.len(), sid, "ha resources listed");
        Ok(resources.into_iter().find(|r| r.sid == sid))
    }

    async fn set_ha_state(&self, sid: &str, state: HaState, managed: bool) -> ProxmoxResult<()> {
        if managed {
            let body = HaBody {
                sid: None,
                state: state.as_str(),
            };
            self.api_client
                .put(&format!("cluster/ha/resources/{sid}"), &body)
                .await
        } else {
            let body = HaBody {
                sid: Some(sid),
                state: state.as_str(),
            };
            self.api_client.post("cluster/ha/resources", &body).await
        }
    }

    async fn remove_ha(&self, sid: &str) -> ProxmoxResult<()> {
        self.api_client
            .delete(&format!("cluster/ha/resources/{sid}"), &[])
            .await
    }

    async fn list_replications(&self) -> ProxmoxResult<Vec<ReplicationJob>> {
        self.api_client.get("cluster/replication").await
    }

    async fn schedule_replication_now(
        &self,
        source_node: &str,
        job_id: &str,
    ) -> ProxmoxResult<()> {
        let _: serde_json::Value = self
            .api_client
            .post(
                &format!("nodes/{source_node}/replication/{job_id}/schedule_now"),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    async fn task_status(&self, node: &str, upid: &str) -> ProxmoxResult<TaskStatus> {
        self.api_client
            .get(&format!("nodes/{node}/tasks/{upid}/status"))
            .await
    }
}
