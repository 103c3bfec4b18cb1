//! Configuration Types
//!
//! Serializable description of a direct authentication client.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DirectAuthenticationIntent, GrantType};

/// Default configuration values.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SCOPES: [&str; 4] = ["openid", "email", "profile", "offline_access"];
/// Scopes requested by default for [`DirectAuthenticationIntent::Recovery`].
pub const RECOVERY_SCOPES: [&str; 2] = ["openid", "okta.myAccount.password.manage"];
pub const DEFAULT_GRANT_TYPES: [GrantType; 7] = [
    GrantType::Password,
    GrantType::Oob,
    GrantType::Otp,
    GrantType::OobMfa,
    GrantType::OtpMfa,
    GrantType::WebAuthn,
    GrantType::WebAuthnMfa,
];

/// Static client configuration, loadable from JSON or any serde format.
#[derive(Clone, Deserialize)]
pub struct DirectAuthConfig {
    /// Issuer URL.
    pub issuer: String,
    /// Client identifier.
    pub client_id: String,
    /// Client secret (for confidential clients).
    #[serde(default)]
    pub client_secret: Option<SecretString>,
    /// Scopes to request.
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    /// Custom authorization server; empty selects the default one.
    #[serde(default)]
    pub authorization_server_id: String,
    /// Grant types the client declares support for.
    #[serde(default)]
    pub grant_types: Option<Vec<GrantType>>,
    /// ACR values.
    #[serde(default)]
    pub acr_values: Vec<String>,
    #[serde(default)]
    pub intent: DirectAuthenticationIntent,
    /// Extra query parameters sent with every request.
    #[serde(default)]
    pub additional_parameters: HashMap<String, String>,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Mirror of [`DirectAuthConfig`] with the secret omitted.
#[derive(Serialize)]
struct RedactedConfig<'a> {
    issuer: &'a str,
    client_id: &'a str,
    scopes: &'a Option<Vec<String>>,
    authorization_server_id: &'a str,
    grant_types: &'a Option<Vec<GrantType>>,
    acr_values: &'a [String],
    intent: DirectAuthenticationIntent,
    additional_parameters: &'a HashMap<String, String>,
    timeout_secs: u64,
}

impl Serialize for DirectAuthConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RedactedConfig {
            issuer: &self.issuer,
            client_id: &self.client_id,
            scopes: &self.scopes,
            authorization_server_id: &self.authorization_server_id,
            grant_types: &self.grant_types,
            acr_values: &self.acr_values,
            intent: self.intent,
            additional_parameters: &self.additional_parameters,
            timeout_secs: self.timeout_secs,
        }
        .serialize(serializer)
    }
}

impl std::fmt::Debug for DirectAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectAuthConfig")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("authorization_server_id", &self.authorization_server_id)
            .field("grant_types", &self.grant_types)
            .field("acr_values", &self.acr_values)
            .field("intent", &self.intent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
