use crate::core::domain::model::{
    cluster_resource::{ClusterResource, GuestResource, NodeResource},
    resource_record::{GuestStatus, GuestType, ResourceRecord},
};

pub(crate) fn record(
    vmid: u32,
    node: &str,
    guest_type: GuestType,
    status: GuestStatus,
) -> ResourceRecord {
    ResourceRecord {
        vmid,
        node: node.to_string(),
        guest_type,
        status,
        name: Some(format!("guest-{vmid}")),
        uptime: None,
    }
}

pub(crate) fn resource(
    vmid: u32,
    node: &str,
    guest_type: GuestType,
    status: &str,
) -> ClusterResource {
    let guest = GuestResource {
        vmid,
        node: node.to_string(),
        name: Some(format!("guest-{vmid}")),
        status: Some(status.to_string()),
        uptime: (status == "running").then_some(3600),
        template: None,
    };
    match guest_type {
        GuestType::Qemu => ClusterResource::Qemu(guest),
        GuestType::Lxc => ClusterResource::Lxc(guest),
    }
}

pub(crate) fn node(name: &str) -> ClusterResource {
    ClusterResource::Node(NodeResource {
        node: name.to_string(),
        status: Some("online".to_string()),
    })
}

/// node1: lxc/100 running, lxc/101 stopped. node2: qemu/300 running.
/// node3: no guests.
pub(crate) fn cluster() -> Vec<ClusterResource> {
    vec![
        node("node1"),
        node("node2"),
        node("node3"),
        resource(100, "node1", GuestType::Lxc, "running"),
        resource(101, "node1", GuestType::Lxc, "stopped"),
        resource(300, "node2", GuestType::Qemu, "running"),
    ]
}
