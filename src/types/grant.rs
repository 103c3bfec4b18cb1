//! Grant Types
//!
//! Grant type catalogue and the OOB channel/binding enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grant type a client may declare and use on the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "otp")]
    Otp,
    #[serde(rename = "oob")]
    Oob,
    #[serde(rename = "webauthn")]
    WebAuthn,
    #[serde(rename = "http://auth0.com/oauth/grant-type/mfa-otp")]
    OtpMfa,
    #[serde(rename = "http://auth0.com/oauth/grant-type/mfa-oob")]
    OobMfa,
    #[serde(rename = "urn:okta:params:oauth:grant-type:mfa-webauthn")]
    WebAuthnMfa,
}

impl GrantType {
    pub const ALL: [GrantType; 7] = [
        Self::Password,
        Self::Otp,
        Self::Oob,
        Self::WebAuthn,
        Self::OtpMfa,
        Self::OobMfa,
        Self::WebAuthnMfa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Otp => "otp",
            Self::Oob => "oob",
            Self::WebAuthn => "webauthn",
            Self::OtpMfa => "http://auth0.com/oauth/grant-type/mfa-otp",
            Self::OobMfa => "http://auth0.com/oauth/grant-type/mfa-oob",
            Self::WebAuthnMfa => "urn:okta:params:oauth:grant-type:mfa-webauthn",
        }
    }

    /// The challenge grant type, if this grant finalizes an MFA challenge.
    pub fn as_challenge(&self) -> Option<ChallengeGrantType> {
        match self {
            Self::OtpMfa => Some(ChallengeGrantType::OtpMfa),
            Self::OobMfa => Some(ChallengeGrantType::OobMfa),
            Self::WebAuthnMfa => Some(ChallengeGrantType::WebAuthnMfa),
            _ => None,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == value)
            .ok_or_else(|| format!("Unknown grant type: {}", value))
    }
}

/// Grant types usable against the MFA challenge endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChallengeGrantType {
    OtpMfa,
    OobMfa,
    WebAuthnMfa,
}

impl ChallengeGrantType {
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::OtpMfa => GrantType::OtpMfa,
            Self::OobMfa => GrantType::OobMfa,
            Self::WebAuthnMfa => GrantType::WebAuthnMfa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.grant_type().as_str()
    }
}

impl FromStr for ChallengeGrantType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        GrantType::from_str(value)?
            .as_challenge()
            .ok_or_else(|| format!("Unsupported challenge type: {}", value))
    }
}

/// Out-of-band delivery channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OobChannel {
    Push,
    Sms,
    Voice,
    Email,
}

impl OobChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Sms => "sms",
            Self::Voice => "voice",
            Self::Email => "email",
        }
    }
}

impl FromStr for OobChannel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "push" => Ok(Self::Push),
            "sms" => Ok(Self::Sms),
            "voice" => Ok(Self::Voice),
            "email" => Ok(Self::Email),
            other => Err(format!("Unknown OOB channel: {}", other)),
        }
    }
}

/// How the user binds the OOB transaction to this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingMethod {
    None,
    Prompt,
    Transfer,
}

impl BindingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Prompt => "prompt",
            Self::Transfer => "transfer",
        }
    }
}

impl FromStr for BindingMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "prompt" => Ok(Self::Prompt),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!("Unknown binding method: {}", other)),
        }
    }
}

/// Purpose of the authentication attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectAuthenticationIntent {
    #[default]
    SignIn,
    /// Password recovery. Password requests add `prompt=recover_authenticator`,
    /// and the default scopes become [`RECOVERY_SCOPES`](crate::types::RECOVERY_SCOPES)
    /// unless scopes are set explicitly.
    Recovery,
}
