pub mod action;
pub mod api_response;
pub mod cluster_resource;
pub mod ha;
pub mod outcome;
pub mod proxmox_auth;
pub mod proxmox_connection;
pub mod replication;
pub mod resource_record;
pub mod snapshot;
pub mod task;
