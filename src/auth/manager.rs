// Token manager
// Owns the cached bearer token and decides when a renewal round-trip is needed

use chrono::Utc;
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};

use crate::config::{EndpointConfig, ServiceIdentity};
use crate::error::{Error, Result};

use super::claims;
use super::types::{
    client_credentials_expiry, jwt_exchange_expiry, AuthFlow, CachedToken,
    ClientCredentialsResponse, TokenExchangeResponse, CLIENT_CREDENTIALS_SCOPES,
};

/// Token manager for one service identity
///
/// Holds at most one bearer token at a time. `ensure_valid` is the only
/// operation that performs network I/O; with a live cached token it returns
/// without touching IMS. Construct one instance per identity and share it
/// (behind an `Arc`) between callers.
pub struct TokenManager {
    identity: ServiceIdentity,
    endpoints: EndpointConfig,

    /// HTTP client for IMS round-trips
    client: Client,

    /// Cached bearer token, absent until the first successful flow
    cached: RwLock<Option<CachedToken>>,

    /// Serializes renewals so concurrent cold-cache callers share one
    /// round-trip instead of issuing duplicates
    renewal: Mutex<()>,
}

impl TokenManager {
    /// Create a manager for the given identity. Rejects an unparseable
    /// private key here rather than on the first authentication attempt.
    pub fn new(identity: ServiceIdentity, endpoints: EndpointConfig) -> Result<Self> {
        claims::validate_rsa_key(&identity.private_key)?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            identity,
            endpoints,
            client,
            cached: RwLock::new(None),
            renewal: Mutex::new(()),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.identity.client_id
    }

    pub fn org_id(&self) -> &str {
        &self.identity.org_id
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Discard the cached token. The next `ensure_valid` call always performs
    /// an authentication round-trip.
    pub async fn reset(&self) {
        let mut cached = self.cached.write().await;
        *cached = None;
    }

    /// Value of the cached bearer token
    pub async fn bearer_token(&self) -> Result<String> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .map(|token| token.value.clone())
            .ok_or_else(|| Error::Authentication("no bearer token cached".to_string()))
    }

    /// Make sure a usable bearer token is cached, authenticating via `flow`
    /// when the cache is empty, expired, or `force_renew` is set
    pub async fn ensure_valid(&self, flow: AuthFlow, force_renew: bool) -> Result<()> {
        if !force_renew && self.has_valid_token().await {
            tracing::debug!(flow = ?flow, "cached bearer token still valid");
            return Ok(());
        }

        // One renewal in flight per manager; queued callers re-check the
        // cache after the holder has replaced it
        let _guard = self.renewal.lock().await;
        if !force_renew && self.has_valid_token().await {
            return Ok(());
        }

        let token = match flow {
            AuthFlow::ServiceAccountJwt => self.exchange_signed_assertion().await?,
            AuthFlow::OAuthClientCredentials => self.client_credentials_grant().await?,
        };

        tracing::info!(
            flow = ?flow,
            expires_at = %token.expires_at.to_rfc3339(),
            "bearer token renewed"
        );

        let mut cached = self.cached.write().await;
        *cached = Some(token);
        Ok(())
    }

    async fn has_valid_token(&self) -> bool {
        let cached = self.cached.read().await;
        cached.as_ref().is_some_and(|token| token.is_valid(Utc::now()))
    }

    /// Service-account flow: sign an assertion and swap it for a bearer token
    async fn exchange_signed_assertion(&self) -> Result<CachedToken> {
        tracing::debug!("exchanging signed assertion at IMS");

        let assertion = claims::sign_assertion(&self.identity, &self.endpoints)?;
        let url = self.endpoints.ims_url(&self.endpoints.jwt_exchange_path);

        let form = [
            ("client_id", self.identity.client_id.as_str()),
            ("client_secret", self.identity.client_secret.as_str()),
            ("jwt_token", assertion.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .header("Cache-Control", "no-cache")
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("JWT exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "JWT exchange rejected");
            return Err(Error::Authentication(format!(
                "JWT exchange failed: {} - {}",
                status, body
            )));
        }

        let data: TokenExchangeResponse = response.json().await.map_err(|e| {
            Error::Authentication(format!("unexpected JWT exchange response: {}", e))
        })?;

        if data.access_token.is_empty() {
            return Err(Error::Authentication(
                "JWT exchange response does not contain access_token".to_string(),
            ));
        }

        Ok(CachedToken {
            value: data.access_token,
            expires_at: jwt_exchange_expiry(Utc::now(), data.expires),
        })
    }

    /// Client-credentials flow. Uses the fixed scope set IMS mandates for
    /// this grant type; the configured JWT metascopes are left untouched.
    async fn client_credentials_grant(&self) -> Result<CachedToken> {
        tracing::debug!("requesting client-credentials token from IMS");

        let url = self.endpoints.ims_url(&self.endpoints.oauth_token_path);
        let scope = CLIENT_CREDENTIALS_SCOPES.join(",");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.identity.client_id.as_str()),
            ("client_secret", self.identity.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .header("Cache-Control", "no-cache")
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "token request rejected");
            return Err(Error::Authentication(format!(
                "token request failed: {} - {}",
                status, body
            )));
        }

        let data: ClientCredentialsResponse = response
            .json()
            .await
            .map_err(|e| Error::Authentication(format!("unexpected token response: {}", e)))?;

        if data.access_token.is_empty() {
            return Err(Error::Authentication(
                "token response does not contain access_token".to_string(),
            ));
        }

        Ok(CachedToken {
            value: data.access_token,
            expires_at: client_credentials_expiry(Utc::now(), data.expires_in),
        })
    }
}
