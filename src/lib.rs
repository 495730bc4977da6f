//! Lifecycle command dispatcher for Proxmox VE guests.
//!
//! Given VMIDs and/or node names, `pvectl` looks every guest up in the cluster
//! resource list, checks the requested action against the guest's current state,
//! and issues the allowed actions through the Proxmox VE API.

mod auth;
pub mod cli;
mod core;

pub use crate::core::application::{
    directory::ResourceDirectory,
    dispatcher::ActionDispatcher,
    guard::{Confirm, Confirmation, GuardPolicy, TransitionGuard, Verdict},
    interrupt::{Interrupt, InterruptHandle},
    pipeline::{Invocation, Progress, Quiet, run},
    resolver::{Resolution, TargetResolver, Unresolved},
};
pub use crate::core::domain::{
    cluster_api::ClusterApi,
    config::{RateLimitConfig, ValidationConfig},
    error::{ProxmoxError, ProxmoxResult, ValidationError},
    model::{
        action::{
            Action, ActionKind, ActionRequest, DestroyOptions, DispatchMode, PowerAction,
            TargetRequest, VzdumpMode, VzdumpOptions,
        },
        cluster_resource::{ClusterResource, GuestResource, NodeResource},
        ha::{HaResource, HaState},
        outcome::{Execution, ExitStatus, Outcome, Report, TargetOutcome},
        replication::ReplicationJob,
        resource_record::{GuestStatus, GuestType, ResourceRecord},
        snapshot::SnapshotInfo,
        task::TaskStatus,
    },
};
use crate::core::{
    domain::{
        model::proxmox_connection::ProxmoxConnection,
        value_object::{
            ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm, ProxmoxUrl, ProxmoxUsername,
            validate_host, validate_password, validate_port, validate_realm, validate_username,
        },
    },
    infrastructure::api_client::ApiClient,
};

/// A client for the Proxmox VE API.
///
/// Implements [`ClusterApi`], so it can be handed straight to [`run`].
///
/// # Examples
///
/// ```no_run
/// use pvectl::{ProxmoxClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ProxmoxClient::builder()
///         .host("proxmox.example.com")
///         .port(8006)
///         .credentials("ops", "password", "pve")
///         .secure(true)
///         .build()?;
///
///     client.login().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ProxmoxClient {
    pub(crate) api_client: ApiClient,
    pub(crate) config: ValidationConfig,
}

/// Builder for ProxmoxClient configuration
#[derive(Debug, Default)]
pub struct ProxmoxClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    realm: Option<String>,
    secure: bool,
    accept_invalid_certs: bool,
    config: ValidationConfig,
}

impl ProxmoxClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self.realm = Some(realm.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accept self-signed certificates, the default on a fresh Proxmox VE install.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn rate_limit(mut self, rate_limit: Option<RateLimitConfig>) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    pub fn validation_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates every field and builds an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns `ProxmoxError::Validation` for a missing or malformed field.
    pub fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let host = required("host", self.host)?;
        validate_host(&host)?;
        let port = self.port.unwrap_or(8006);
        validate_port(port)?;
        let username = required("username", self.username)?;
        validate_username(&username, self.config.block_reserved_usernames)?;
        let password = required("password", self.password)?;
        validate_password(&password, self.config.password_min_score)?;
        let realm = required("realm", self.realm)?;
        validate_realm(&realm)?;

        let host = ProxmoxHost::new_unchecked(host);
        let port = ProxmoxPort::new_unchecked(port);
        let url = ProxmoxUrl::from_parts(&host, &port, self.secure)?;
        let connection = ProxmoxConnection::new(
            host,
            port,
            ProxmoxUsername::new_unchecked(username),
            ProxmoxPassword::new_unchecked(password),
            ProxmoxRealm::new_unchecked(realm),
            self.secure,
            self.accept_invalid_certs,
            url,
        );

        let api_client = ApiClient::new(connection, self.config.clone())?;
        Ok(ProxmoxClient {
            api_client,
            config: self.config,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    value.ok_or_else(|| ValidationError::field(field, format!("{field} is required")))
}

impl ProxmoxClient {
    /// Creates a new builder for ProxmoxClient configuration
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    /// Authenticates with the Proxmox server and stores the session.
    ///
    /// Requests made without calling this first log in on demand.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - The credentials are invalid
    /// - The server is unreachable
    /// - The response format is invalid
    pub async fn login(&self) -> ProxmoxResult<()> {
        self.api_client.login().await
    }

    /// Returns true if the client holds a non-expired ticket
    pub async fn is_authenticated(&self) -> bool {
        self.api_client.is_authenticated().await
    }

    /// The validation and session settings in effect.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.api_client.connection().url().as_str()
    }
}

#[cfg(test)]
mod tests;
