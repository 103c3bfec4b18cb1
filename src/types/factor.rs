//! Authentication Factors

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use secrecy::SecretString;

use super::OobChannel;

/// Factor used to start an authentication attempt.
#[derive(Clone, Debug)]
pub enum PrimaryFactor {
    Password(SecretString),
    Otp { passcode: String },
    Oob { channel: OobChannel },
    WebAuthn,
}

impl PrimaryFactor {
    pub fn password(password: impl Into<String>) -> Self {
        Self::Password(SecretString::new(password.into()))
    }
}

/// Factor used to satisfy an MFA challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecondaryFactor {
    Otp { passcode: String },
    Oob { channel: OobChannel },
    WebAuthn,
}

/// Signed WebAuthn assertion, fields base64url encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebAuthnAssertion {
    pub authenticator_data: String,
    pub client_data_json: String,
    pub signature: String,
}

impl WebAuthnAssertion {
    pub fn new(
        authenticator_data: impl Into<String>,
        client_data_json: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            authenticator_data: authenticator_data.into(),
            client_data_json: client_data_json.into(),
            signature: signature.into(),
        }
    }

    /// Build from raw authenticator output.
    pub fn from_bytes(authenticator_data: &[u8], client_data_json: &[u8], signature: &[u8]) -> Self {
        Self {
            authenticator_data: URL_SAFE_NO_PAD.encode(authenticator_data),
            client_data_json: URL_SAFE_NO_PAD.encode(client_data_json),
            signature: URL_SAFE_NO_PAD.encode(signature),
        }
    }
}
