//! Internal HTTP client that handles authentication and automatic ticket refresh.

use crate::{
    auth::application::service::login_service::LoginService,
    core::domain::{
        config::ValidationConfig,
        error::{ProxmoxError, ProxmoxResult, ValidationError},
        model::{
            api_response::ApiResponse, proxmox_auth::ProxmoxAuth,
            proxmox_connection::ProxmoxConnection,
        },
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Internal HTTP client that manages authentication and calls the Proxmox API.
///
/// Every request carries `PVEAuthCookie` and `CSRFPreventionToken`. A `401 Unauthorized`
/// triggers one re-login with the stored credentials and a single retry. Responses are
/// unwrapped from the `{"data": ...}` envelope.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<ProxmoxConnection>,
    auth: Arc<RwLock<Option<ProxmoxAuth>>>,
    config: Arc<ValidationConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Connection` if the HTTP client cannot be built and
    /// `ProxmoxError::Validation` if the rate limit has a zero component.
    pub fn new(connection: ProxmoxConnection, config: ValidationConfig) -> ProxmoxResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accept_invalid_certs())
            .build()
            .map_err(|e| ProxmoxError::Connection(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    ValidationError::field("rate_limit", "requests per second must be positive")
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    ValidationError::field("rate_limit", "burst size must be positive")
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            auth: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    /// Sets the authentication state (used after a successful login).
    pub async fn set_auth(&self, auth: ProxmoxAuth) {
        *self.auth.write().await = Some(auth);
    }

    /// Returns the current authentication state, if any.
    #[cfg(test)]
    pub async fn auth(&self) -> Option<ProxmoxAuth> {
        self.auth.read().await.clone()
    }

    /// Returns `true` if there is a non-expired ticket.
    pub async fn is_authenticated(&self) -> bool {
        self.auth
            .read()
            .await
            .as_ref()
            .is_some_and(|a| !a.ticket().is_expired(self.config.ticket_lifetime))
    }

    /// Performs a fresh login using the stored credentials.
    pub async fn login(&self) -> ProxmoxResult<()> {
        let auth = LoginService::new()
            .execute(&self.http_client, &self.connection)
            .await?;
        self.set_auth(auth).await;
        Ok(())
    }

    /// Performs an authenticated GET request and returns the `data` payload.
    pub async fn get<T>(&self, path: &str) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::GET, path, None::<&()>).await
    }

    /// Performs an authenticated POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::POST, path, Some(body)).await
    }

    /// Performs an authenticated PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::PUT, path, Some(body)).await
    }

    /// Performs an authenticated DELETE request. Proxmox takes DELETE parameters
    /// from the query string, so `params` are URL-encoded onto the path.
    pub async fn delete<T>(&self, path: &str, params: &[(&str, String)]) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        let path = with_query(path, params);
        self.execute_request(Method::DELETE, &path, None::<&()>)
            .await
    }

    /// Ensures authentication, sends the request, refreshes once on 401, and
    /// unwraps the response envelope.
    async fn execute_request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.ensure_authenticated().await?;

        let mut response = self.send_once(method.clone(), path, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path, "ticket rejected, logging in again");
            self.login().await?;
            response = self.send_once(method, path, body).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ProxmoxError::Connection(format!(
                "API error ({status}): {}",
                error_text.trim()
            )));
        }

        response
            .json::<ApiResponse<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| ProxmoxError::Connection(format!("Failed to parse response: {e}")))
    }

    async fn send_once<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ProxmoxResult<reqwest::Response>
    where
        B: Serialize,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.url().api_endpoint(path);
        debug!(%method, %url, "api request");
        let mut req_builder = self.http_client.request(method, &url);

        if let Some(auth) = self.auth.read().await.as_ref() {
            req_builder = req_builder.header("Cookie", auth.ticket().as_cookie_header());
            if let Some(csrf) = auth.csrf_token() {
                req_builder = req_builder.header("CSRFPreventionToken", csrf.as_str());
            }
        }

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        req_builder
            .send()
            .await
            .map_err(|e| ProxmoxError::Connection(format!("HTTP request failed: {e}")))
    }

    /// Logs in when there is no ticket or the current one is too old.
    async fn ensure_authenticated(&self) -> ProxmoxResult<()> {
        if !self.is_authenticated().await {
            self.login().await?;
        }
        Ok(())
    }
}

fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{
        config::RateLimitConfig,
        value_object::{
            ProxmoxCSRFToken, ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm,
            ProxmoxTicket, ProxmoxUrl, ProxmoxUsername,
        },
    };
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
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

    fn create_test_auth() -> ProxmoxAuth {
        let ticket = ProxmoxTicket::new_unchecked("PVE:testuser@pam:4EEC61E2::sig".to_string());
        let csrf = ProxmoxCSRFToken::new_unchecked("4EEC61E2:token".to_string());
        ProxmoxAuth::new(ticket, Some(csrf))
    }

    #[test]
    fn test_with_query_encodes_params() {
        assert_eq!(with_query("nodes/pve1/lxc/100", &[]), "nodes/pve1/lxc/100");
        assert_eq!(
            with_query(
                "nodes/pve1/lxc/100",
                &[("purge", "1".to_string()), ("note", "a b".to_string())]
            ),
            "nodes/pve1/lxc/100?purge=1&note=a+b"
        );
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let config = ValidationConfig {
            rate_limit: Some(RateLimitConfig {
                requests_per_second: 0,
                burst_size: 1,
            }),
            ..Default::default()
        };
        let result = ApiClient::new(create_test_connection("http://127.0.0.1:1"), config);
        assert!(matches!(result, Err(ProxmoxError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_success_sends_auth_headers() {
        let mock_server = MockServer::start().await;
        let client =
            ApiClient::new(create_test_connection(&mock_server.uri()), ValidationConfig::default())
                .unwrap();
        client.set_auth(create_test_auth()).await;

        Mock::given(method("GET"))
            .and(path("/api2/json/version"))
            .and(header("Cookie", "PVEAuthCookie=PVE:testuser@pam:4EEC61E2::sig"))
            .and(header("CSRFPreventionToken", "4EEC61E2:token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": "ok"})),
            )
            .mount(&mock_server)
            .await;

        let result: String = client.get("version").await.unwrap();
        assert_eq!(result, "ok");
    }

    #[tokio::test]
    async fn test_delete_sends_query() {
        let mock_server = MockServer::start().await;
        let client =
            ApiClient::new(create_test_connection(&mock_server.uri()), ValidationConfig::default())
                .unwrap();
        client.set_auth(create_test_auth()).await;

        Mock::given(method("DELETE"))
            .and(path("/api2/json/nodes/pve1/qemu/100"))
            .and(query_param("purge", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"data": "UPID:pve1:1:2:3:qmdestroy:100:root@pam:"}),
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let upid: String = client
            .delete("nodes/pve1/qemu/100", &[("purge", "1".to_string())])
            .await
            .unwrap();
        assert!(upid.starts_with("UPID:pve1"));
    }

    #[tokio::test]
    async fn test_unauthorized_triggers_refresh() {
        let mock_server = MockServer::start().await;
        let client =
            ApiClient::new(create_test_connection(&mock_server.uri()), ValidationConfig::default())
                .unwrap();
        client.set_auth(create_test_auth()).await;

        Mock::given(method("GET"))
            .and(path("/api2/json/version"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "ticket": "PVE:testuser@pam:4EEC61E2::new_sig",
                    "CSRFPreventionToken": "4EEC61E2:abc123"
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api2/json/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": "ok"})),
            )
            .mount(&mock_server)
            .await;

        let result: String = client.get("version").await.unwrap();
        assert_eq!(result, "ok");

        let auth = client.auth().await.unwrap();
        assert_eq!(auth.ticket().as_str(), "PVE:testuser@pam:4EEC61E2::new_sig");
        assert_eq!(auth.csrf_token().unwrap().as_str(), "4EEC61E2:abc123");
    }

    #[tokio::test]
    async fn test_unauthenticated_client_logs_in_first() {
        let mock_server = MockServer::start().await;
        let client =
            ApiClient::new(create_test_connection(&mock_server.uri()), ValidationConfig::default())
                .unwrap();
        assert!(!client.is_authenticated().await);

        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "ticket": "PVE:testuser@pam:4EEC61E2::sig",
                    "CSRFPreventionToken": "4EEC61E2:abc123"
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api2/json/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": "ok"})),
            )
            .mount(&mock_server)
            .await;

        let _: String = client.get("version").await.unwrap();
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_failure_returns_error() {
        let mock_server = MockServer::start().await;
        let client =
            ApiClient::new(create_test_connection(&mock_server.uri()), ValidationConfig::default())
                .unwrap();

        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result: ProxmoxResult<String> = client.get("version").await;
        assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mock_server = MockServer::start().await;
        let client =
            ApiClient::new(create_test_connection(&mock_server.uri()), ValidationConfig::default())
                .unwrap();
        client.set_auth(create_test_auth()).await;

        Mock::given(method("POST"))
            .and(path("/api2/json/nodes/pve1/qemu/100/status/start"))
            .respond_with(ResponseTemplate::new(500).set_body_string("VM 100 already running"))
            .mount(&mock_server)
            .await;

        let result: ProxmoxResult<String> = client
            .post("nodes/pve1/qemu/100/status/start", &serde_json::json!({}))
            .await;
        match result {
            Err(ProxmoxError::Connection(message)) => {
                assert!(message.contains("500"));
                assert!(message.contains("VM 100 already running"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limiting_delays_requests() {
        use std::time::{Duration, Instant};

        let mock_server = MockServer::start().await;
        let config = ValidationConfig {
            rate_limit: Some(RateLimitConfig {
                requests_per_second: 2,
                burst_size: 2,
            }),
            ..Default::default()
        };
        let client = ApiClient::new(create_test_connection(&mock_server.uri()), config).unwrap();
        client.set_auth(create_test_auth()).await;

        Mock::given(method("GET"))
            .and(path("/api2/json/version"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": "ok"})),
            )
            .expect(4)
            .mount(&mock_server)
            .await;

        let start = Instant::now();
        let (res1, res2) = tokio::join!(
            client.get::<String>("version"),
            client.get::<String>("version")
        );
        res1.unwrap();
        res2.unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));

        let start = Instant::now();
        let (res3, res4) = tokio::join!(
            client.get::<String>("version"),
            client.get::<String>("version")
        );
        res3.unwrap();
        res4.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(900));
    }
}
