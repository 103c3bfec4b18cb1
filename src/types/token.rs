//! Token Types
//!
//! Token endpoint success payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Tokens issued at the end of a successful attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Space-separated granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Any other members of the payload, e.g. `device_secret`.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn bearer() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Granted scopes, in server order.
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// `Authorization` header value for resource requests.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Absolute access token expiry, given the issue time in clock seconds.
    pub fn expires_at(&self, issued_at: u64) -> Option<u64> {
        self.expires_in.map(|ttl| issued_at.saturating_add(ttl))
    }
}
