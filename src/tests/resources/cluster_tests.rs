use crate::{
    ClusterApi, ClusterResource, DestroyOptions, GuestStatus, GuestType, HaState, PowerAction,
    ProxmoxClient, ProxmoxError, ValidationConfig, VzdumpMode, VzdumpOptions,
    core::domain::{
        model::{proxmox_auth::ProxmoxAuth, proxmox_connection::ProxmoxConnection},
        value_object::{
            ProxmoxCSRFToken, ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm,
            ProxmoxTicket, ProxmoxUrl, ProxmoxUsername,
        },
    },
    core::infrastructure::api_client::ApiClient,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

fn create_test_connection(server_url: &str) -> ProxmoxConnection {
    let host = ProxmoxHost::new_unchecked("127.0.0.1".to_string());
    let port = ProxmoxPort::new_unchecked(8006);
    let username = ProxmoxUsername::new_unchecked("testuser".to_string());
    let password = ProxmoxPassword::new_unchecked("testpass".to_string());
    let realm = ProxmoxRealm::new_unchecked("pam".to_string());
    let url = ProxmoxUrl::new_unchecked(server_url.to_string() + "/");
    ProxmoxConnection::new(host, port, username, password, realm, false, true, url)
}

async fn create_authenticated_client(mock_server: &MockServer) -> ProxmoxClient {
    let connection = create_test_connection(&mock_server.uri());
    let config = ValidationConfig::default();
    let api_client = ApiClient::new(connection, config.clone()).unwrap();

    let ticket = ProxmoxTicket::new_unchecked("PVE:testuser@pam:4EEC61E2::sig".to_string());
    let csrf = ProxmoxCSRFToken::new_unchecked("4EEC61E2:token".to_string());
    api_client.set_auth(ProxmoxAuth::new(ticket, Some(csrf))).await;
    ProxmoxClient { api_client, config }
}

fn data(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": value }))
}

const UPID: &str = "UPID:pve1:0001A2B3:0C4D5E6F:65A1B2C3:vzstart:100:root@pam:";

#[tokio::test]
async fn test_list_resources_keeps_guests_and_nodes() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/resources"))
        .respond_with(data(serde_json::json!([
            {
                "type": "qemu",
                "vmid": 100,
                "node": "pve1",
                "id": "qemu/100",
                "name": "ubuntu-vm",
                "status": "running",
                "maxcpu": 4,
                "maxmem": 8589934592_i64,
                "uptime": 123456
            },
            {
                "type": "lxc",
                "vmid": 200,
                "node": "pve2",
                "id": "lxc/200",
                "name": "debian-ct",
                "status": "stopped",
                "uptime": 0
            },
            {
                "type": "node",
                "node": "pve1",
                "id": "node/pve1",
                "status": "online"
            },
            {
                "type": "storage",
                "storage": "local",
                "node": "pve1",
                "id": "storage/pve1/local"
            }
        ])))
        .mount(&mock_server)
        .await;

    let resources = client.list_resources().await.unwrap();
    assert_eq!(resources.len(), 4);
    match &resources[0] {
        ClusterResource::Qemu(guest) => {
            assert_eq!(guest.vmid, 100);
            assert_eq!(guest.node, "pve1");
            assert_eq!(guest.uptime, Some(123456));
        }
        other => panic!("unexpected resource: {other:?}"),
    }
    assert!(matches!(resources[1], ClusterResource::Lxc(_)));
    assert!(matches!(resources[2], ClusterResource::Node(_)));
    assert!(matches!(resources[3], ClusterResource::Other));
}

#[tokio::test]
async fn test_list_resources_server_error() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/resources"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let result = client.list_resources().await;
    assert!(matches!(result, Err(ProxmoxError::Connection(_))));
}

#[tokio::test]
async fn test_get_status() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve2/lxc/200/status/current"))
        .respond_with(data(serde_json::json!({
            "vmid": 200,
            "status": "stopped",
            "name": "debian-ct"
        })))
        .mount(&mock_server)
        .await;

    let status = client.get_status("pve2", GuestType::Lxc, 200).await.unwrap();
    assert_eq!(status, GuestStatus::Stopped);
}

#[tokio::test]
async fn test_power_action_returns_upid() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/shutdown"))
        .respond_with(data(serde_json::json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let upid = client
        .power("pve1", GuestType::Qemu, 100, PowerAction::Shutdown)
        .await
        .unwrap();
    assert_eq!(upid, UPID);
}

#[tokio::test]
async fn test_destroy_forwards_flags() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve2/lxc/200"))
        .and(query_param("purge", "0"))
        .and(query_param("destroy-unreferenced-disks", "1"))
        .respond_with(data(serde_json::json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = DestroyOptions {
        purge_jobs: false,
        destroy_unreferenced_disks: true,
    };
    let upid = client
        .destroy("pve2", GuestType::Lxc, 200, options)
        .await
        .unwrap();
    assert_eq!(upid, UPID);
}

#[tokio::test]
async fn test_snapshot_create_and_delete() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot"))
        .and(body_json(serde_json::json!({
            "snapname": "pre-upgrade",
            "description": "before 8.2"
        })))
        .respond_with(data(serde_json::json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot/pre-upgrade"))
        .and(query_param("force", "1"))
        .respond_with(data(serde_json::json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;

    client
        .create_snapshot(
            "pve1",
            GuestType::Qemu,
            100,
            "pre-upgrade",
            Some("before 8.2".to_string()),
        )
        .await
        .unwrap();
    client
        .delete_snapshot("pve1", GuestType::Qemu, 100, "pre-upgrade", true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_snapshots_drops_current() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve2/lxc/200/snapshot"))
        .respond_with(data(serde_json::json!([
            { "name": "pre-upgrade", "description": "", "snaptime": 1700000000 },
            { "name": "current", "description": "You are here!", "parent": "pre-upgrade" }
        ])))
        .mount(&mock_server)
        .await;

    let snapshots = client
        .list_snapshots("pve2", GuestType::Lxc, 200)
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].name, "pre-upgrade");
    assert_eq!(snapshots[0].snaptime, Some(1700000000));
}

#[tokio::test]
async fn test_vzdump_body() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/vzdump"))
        .and(body_json(serde_json::json!({
            "vmid": "100",
            "compress": "zstd",
            "storage": "backup",
            "mode": "snapshot"
        })))
        .respond_with(data(serde_json::json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = VzdumpOptions {
        storage: Some("backup".to_string()),
        mode: Some(VzdumpMode::Snapshot),
        ..VzdumpOptions::default()
    };
    client.vzdump("pve1", 100, options).await.unwrap();
}

#[tokio::test]
async fn test_ha_state_lookup_and_update() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/ha/resources"))
        .respond_with(data(serde_json::json!([
            { "sid": "vm:100", "state": "started", "type": "vm" },
            { "sid": "ct:200", "state": "disabled", "type": "ct" }
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api2/json/cluster/ha/resources/ct:200"))
        .and(body_json(serde_json::json!({ "state": "started" })))
        .respond_with(data(serde_json::Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/cluster/ha/resources"))
        .and(body_json(serde_json::json!({ "sid": "vm:300", "state": "stopped" })))
        .respond_with(data(serde_json::Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resource = client.ha_state("ct:200").await.unwrap().unwrap();
    assert_eq!(resource.ha_state(), Some(HaState::Disabled));
    assert!(client.ha_state("vm:300").await.unwrap().is_none());

    client
        .set_ha_state("ct:200", HaState::Started, true)
        .await
        .unwrap();
    client
        .set_ha_state("vm:300", HaState::Stopped, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remove_ha() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("DELETE"))
        .and(path("/api2/json/cluster/ha/resources/vm:100"))
        .respond_with(data(serde_json::Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;

    client.remove_ha("vm:100").await.unwrap();
}

#[tokio::test]
async fn test_replication_list_and_schedule() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/replication"))
        .respond_with(data(serde_json::json!([
            {
                "id": "100-0", "guest": 100, "target": "pve2", "source": "pve1",
                "type": "local", "jobnum": 0, "schedule": "*/15"
            },
            {
                "id": "200-0", "guest": 200, "target": "pve1",
                "type": "local", "jobnum": 0, "disable": 1
            }
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/replication/100-0/schedule_now"))
        .respond_with(data(serde_json::Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;

    let jobs = client.list_replications().await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs[0].is_enabled());
    assert!(!jobs[1].is_enabled());

    client
        .schedule_replication_now("pve1", "100-0")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_task_status() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!("/api2/json/nodes/pve1/tasks/{UPID}/status")))
        .respond_with(data(serde_json::json!({
            "status": "stopped",
            "exitstatus": "OK",
            "upid": UPID,
            "type": "vzstart"
        })))
        .mount(&mock_server)
        .await;

    let status = client.task_status("pve1", UPID).await.unwrap();
    assert!(status.succeeded());
}
