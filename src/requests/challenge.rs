//! Challenge Requests
//!
//! MFA challenge initiation and primary WebAuthn challenge.

use super::{push_acr_values, DirectAuthRequest, CHALLENGE_ENDPOINT, PRIMARY_AUTHENTICATE_ENDPOINT};
use crate::core::DirectAuthenticationContext;
use crate::types::{ChallengeGrantType, GrantType, MfaContext, OobChannel};

/// Initiates a secondary factor for a pending MFA transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeRequest {
    pub mfa_token: String,
    pub challenge_types_supported: Vec<ChallengeGrantType>,
    pub channel_hint: Option<OobChannel>,
}

impl ChallengeRequest {
    pub fn new(
        mfa_context: &MfaContext,
        challenge_types_supported: Vec<ChallengeGrantType>,
        channel_hint: Option<OobChannel>,
    ) -> Self {
        Self {
            mfa_token: mfa_context.mfa_token.clone(),
            challenge_types_supported,
            channel_hint,
        }
    }
}

impl DirectAuthRequest for ChallengeRequest {
    fn endpoint(&self) -> &'static str {
        CHALLENGE_ENDPOINT
    }

    fn form_parameters(&self, _context: &DirectAuthenticationContext) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("mfa_token", self.mfa_token.clone()),
            (
                "challenge_types_supported",
                self.challenge_types_supported
                    .iter()
                    .map(ChallengeGrantType::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        ];
        if let Some(channel) = self.channel_hint {
            params.push(("channel_hint", channel.as_str().to_string()));
        }
        params
    }
}

/// Requests WebAuthn assertion options for a primary WebAuthn sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebAuthnChallengeRequest {
    pub login_hint: String,
}

impl WebAuthnChallengeRequest {
    pub fn new(login_hint: impl Into<String>) -> Self {
        Self {
            login_hint: login_hint.into(),
        }
    }
}

impl DirectAuthRequest for WebAuthnChallengeRequest {
    fn endpoint(&self) -> &'static str {
        PRIMARY_AUTHENTICATE_ENDPOINT
    }

    fn form_parameters(&self, context: &DirectAuthenticationContext) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("login_hint", self.login_hint.clone()),
            ("challenge_hint", GrantType::WebAuthn.as_str().to_string()),
        ];
        push_acr_values(&mut params, context);
        params
    }
}
