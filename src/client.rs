// User Management API caller
// Dispatches authenticated requests and interprets the response envelope

use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthFlow, TokenManager};
use crate::config::{EndpointConfig, ServiceIdentity};
use crate::error::{ApiFailure, Error, Result};

/// Raw downstream response: HTTP status plus the decoded JSON body, with the
/// API's success/failure envelope left uninterpreted
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

/// Outcome of a user lookup
#[derive(Debug)]
pub enum UserLookup {
    /// The envelope reported success; the `user` payload
    Found(Value),
    /// The API answered but declined (user not found, malformed request).
    /// A recoverable outcome, not an error.
    Refused(ApiFailure),
}

/// Success/failure envelope wrapped around User Management API responses
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    result: Option<String>,
    message: Option<String>,
    user: Option<Value>,
}

/// Client for the User Management API
///
/// Every call first asks the token manager for a valid bearer token, reusing
/// the cache when possible, then issues the request with the API key and
/// Authorization headers set.
pub struct UmapiClient {
    manager: Arc<TokenManager>,
    client: Client,
}

impl UmapiClient {
    pub fn new(identity: ServiceIdentity, endpoints: EndpointConfig) -> Result<Self> {
        let manager = Arc::new(TokenManager::new(identity, endpoints)?);
        Self::with_manager(manager)
    }

    /// Build a client around an existing manager, sharing its token cache
    /// with other callers of the same service identity
    pub fn with_manager(manager: Arc<TokenManager>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { manager, client })
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.manager
    }

    /// Issue one authenticated request. POST with a JSON body when `payload`
    /// is given, GET otherwise. Returns the raw response; interpreting the
    /// envelope is layered on top (see [`get_user_information`]).
    ///
    /// [`get_user_information`]: UmapiClient::get_user_information
    pub async fn call(
        &self,
        path: &str,
        payload: Option<&Value>,
        flow: AuthFlow,
    ) -> Result<ApiResponse> {
        self.manager.ensure_valid(flow, false).await?;
        let token = self.manager.bearer_token().await?;

        let url = self.manager.endpoints().api_url(path);
        let method = if payload.is_some() {
            Method::POST
        } else {
            Method::GET
        };
        tracing::debug!(method = %method, url = %url, "dispatching API request");

        let mut request = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("x-api-key", self.manager.client_id())
            .bearer_auth(&token);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.ok();
        tracing::debug!(status, has_body = body.is_some(), "API response received");

        Ok(ApiResponse { status, body })
    }

    /// Look up one user in the organization. The API signals "not found" and
    /// validation problems through its envelope rather than HTTP status, so
    /// those come back as [`UserLookup::Refused`] values.
    pub async fn get_user_information(&self, user_id: &str, flow: AuthFlow) -> Result<UserLookup> {
        let path = format!(
            "/organizations/{}/users/{}",
            self.manager.org_id(),
            user_id
        );
        let response = self.call(&path, None, flow).await?;

        let body = response
            .body
            .ok_or_else(|| Error::Protocol("response body is missing or not JSON".to_string()))?;
        let envelope: ApiEnvelope = serde_json::from_value(body)
            .map_err(|e| Error::Protocol(format!("malformed response envelope: {}", e)))?;

        if envelope.result.as_deref() != Some("success") {
            return Ok(UserLookup::Refused(ApiFailure {
                result: envelope.result.unwrap_or_default(),
                message: envelope.message,
            }));
        }

        Ok(UserLookup::Found(envelope.user.unwrap_or(Value::Null)))
    }
}
