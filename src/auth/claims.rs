// Service-account claim sets and RS256 signing

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

use crate::config::{EndpointConfig, ServiceIdentity};
use crate::error::{Error, Result};

/// Lifetime of a signed assertion; IMS rejects assertions dated further out
const ASSERTION_TTL_HOURS: i64 = 24;

/// Build the claim set for a service-account assertion: standard `exp`,
/// `iss`, `sub`, `aud` claims plus one boolean metascope claim per configured
/// scope, keyed `https://{ims_host}/s/{scope}`.
pub(crate) fn build_claims(
    identity: &ServiceIdentity,
    endpoints: &EndpointConfig,
) -> Map<String, Value> {
    let exp = (Utc::now() + Duration::hours(ASSERTION_TTL_HOURS)).timestamp();

    let mut claims = Map::new();
    claims.insert("exp".to_string(), json!(exp));
    claims.insert("iss".to_string(), json!(identity.org_id));
    claims.insert("sub".to_string(), json!(identity.tech_account_id));
    claims.insert(
        "aud".to_string(),
        json!(format!(
            "https://{}/c/{}",
            endpoints.ims_host, identity.client_id
        )),
    );
    for scope in &identity.scopes {
        claims.insert(
            format!("https://{}/s/{}", endpoints.ims_host, scope),
            json!(true),
        );
    }
    claims
}

/// Validate that the key parses as an RSA private key in PEM format
pub(crate) fn validate_rsa_key(private_key: &str) -> Result<()> {
    EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| Error::Config(format!("invalid RSA private key: {}", e)))?;
    Ok(())
}

/// Sign the claim set with the identity's private key (RS256), producing the
/// assertion submitted to the JWT exchange endpoint
pub(crate) fn sign_assertion(
    identity: &ServiceIdentity,
    endpoints: &EndpointConfig,
) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(identity.private_key.as_bytes())
        .map_err(|e| Error::Config(format!("invalid RSA private key: {}", e)))?;
    let claims = build_claims(identity, endpoints);
    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| Error::Authentication(format!("failed to sign assertion: {}", e)))
}
