// Construction-time configuration
// A service identity plus the IMS/UMAPI endpoints it authenticates against

use serde::Deserialize;

fn default_scopes() -> Vec<String> {
    vec!["ent_user_sdk".to_string()]
}

/// Credentials of one service integration, as issued in the Adobe developer
/// console. Owned by a single [`TokenManager`](crate::auth::TokenManager)
/// instance for the lifetime of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceIdentity {
    /// API key of the integration, also sent as the `x-api-key` header
    pub client_id: String,
    pub client_secret: String,
    /// Organization ID (`...@AdobeOrg`), used as the JWT issuer
    pub org_id: String,
    /// Technical account ID (`...@techacct.adobe.com`), used as the JWT subject
    pub tech_account_id: String,
    /// RSA private key in PEM format, paired with the public key uploaded
    /// to the integration
    pub private_key: String,
    /// Metascopes requested by the service-account JWT flow. The OAuth
    /// client-credentials flow ignores these and uses its own fixed set.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

/// Hosts and paths for IMS and the User Management API. Every field has a
/// production default; override the hosts to point at a staging stack or a
/// mock server in tests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub api_host: String,
    pub api_base_path: String,
    pub ims_host: String,
    pub jwt_exchange_path: String,
    pub oauth_token_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_host: "usermanagement.adobe.io".to_string(),
            api_base_path: "/v2/usermanagement".to_string(),
            ims_host: "ims-na1.adobelogin.com".to_string(),
            jwt_exchange_path: "/ims/exchange/jwt".to_string(),
            oauth_token_path: "/ims/token/v2".to_string(),
        }
    }
}

impl EndpointConfig {
    /// URL of an IMS endpoint (JWT exchange or OAuth token)
    pub fn ims_url(&self, path: &str) -> String {
        format!("{}{}", origin(&self.ims_host), path)
    }

    /// URL of a User Management API endpoint, under the configured base path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", origin(&self.api_host), self.api_base_path, path)
    }
}

/// Hosts are bare (`usermanagement.adobe.io`) and get `https://` prepended;
/// a host carrying an explicit scheme is used as-is so tests can target a
/// plain-HTTP mock server.
fn origin(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let endpoints = EndpointConfig::default();
        assert_eq!(endpoints.api_host, "usermanagement.adobe.io");
        assert_eq!(endpoints.api_base_path, "/v2/usermanagement");
        assert_eq!(endpoints.ims_host, "ims-na1.adobelogin.com");
        assert_eq!(endpoints.jwt_exchange_path, "/ims/exchange/jwt");
        assert_eq!(endpoints.oauth_token_path, "/ims/token/v2");
    }

    #[test]
    fn test_url_building() {
        let endpoints = EndpointConfig::default();
        assert_eq!(
            endpoints.ims_url("/ims/exchange/jwt"),
            "https://ims-na1.adobelogin.com/ims/exchange/jwt"
        );
        assert_eq!(
            endpoints.api_url("/organizations/org/users/u1"),
            "https://usermanagement.adobe.io/v2/usermanagement/organizations/org/users/u1"
        );
    }

    #[test]
    fn test_explicit_scheme_passthrough() {
        let endpoints = EndpointConfig {
            ims_host: "http://127.0.0.1:1234".to_string(),
            ..Default::default()
        };
        assert_eq!(
            endpoints.ims_url("/ims/token/v2"),
            "http://127.0.0.1:1234/ims/token/v2"
        );
    }

    #[test]
    fn test_identity_deserialization_defaults_scopes() {
        let identity: ServiceIdentity = serde_json::from_str(
            r#"{
                "client_id": "cid",
                "client_secret": "secret",
                "org_id": "org@AdobeOrg",
                "tech_account_id": "ta@techacct.adobe.com",
                "private_key": "---"
            }"#,
        )
        .unwrap();
        assert_eq!(identity.scopes, vec!["ent_user_sdk".to_string()]);
    }

    #[test]
    fn test_endpoint_deserialization_partial_override() {
        let endpoints: EndpointConfig =
            serde_json::from_str(r#"{"api_host": "usermanagement-stage.adobe.io"}"#).unwrap();
        assert_eq!(endpoints.api_host, "usermanagement-stage.adobe.io");
        assert_eq!(endpoints.ims_host, "ims-na1.adobelogin.com");
    }
}
