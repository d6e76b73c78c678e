// Authentication types
// Flow selection, the cached token, and IMS wire shapes

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Which authentication flow to run against IMS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    /// Sign a service-account assertion and exchange it for a bearer token
    ServiceAccountJwt,

    /// OAuth2 client-credentials grant. Always requests the provider-mandated
    /// scope set for this grant type, never the configured JWT metascopes.
    OAuthClientCredentials,
}

/// Scopes IMS requires for the client-credentials grant
pub(crate) const CLIENT_CREDENTIALS_SCOPES: &[&str] =
    &["openid", "AdobeID", "user_management_sdk"];

/// Safety margin subtracted from the server-declared expiry of a JWT-exchange
/// token, so renewal happens before IMS invalidates it even with clock skew
pub(crate) const RENEWAL_MARGIN_MS: i64 = 60 * 60 * 1000;

/// Bearer token obtained from IMS, held in memory for the process lifetime
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Expiry of a JWT-exchange token: `expires` is a duration in milliseconds,
/// and the renewal margin is subtracted up front
pub(crate) fn jwt_exchange_expiry(now: DateTime<Utc>, expires_ms: i64) -> DateTime<Utc> {
    now + Duration::milliseconds(expires_ms - RENEWAL_MARGIN_MS)
}

/// Expiry of a client-credentials token: `expires_in` is in seconds and IMS
/// issues short-lived tokens for this grant, so no margin is applied
pub(crate) fn client_credentials_expiry(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    now + Duration::seconds(expires_in)
}

/// JWT exchange response (`expires` in milliseconds)
#[derive(Debug, Deserialize)]
pub(crate) struct TokenExchangeResponse {
    pub access_token: String,
    pub expires: i64,
}

/// Client-credentials response (`expires_in` in seconds)
#[derive(Debug, Deserialize)]
pub(crate) struct ClientCredentialsResponse {
    pub access_token: String,
    pub expires_in: i64,
}
