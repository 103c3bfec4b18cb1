//! Token Requests
//!
//! Grant-type dispatched requests against the token endpoint.

use secrecy::{ExposeSecret, SecretString};

use super::{push_acr_values, DirectAuthRequest, TOKEN_ENDPOINT};
use crate::core::DirectAuthenticationContext;
use crate::types::{DirectAuthenticationIntent, GrantType, WebAuthnAssertion};

/// `prompt` value sent by password requests in recovery mode.
pub const RECOVERY_PROMPT: &str = "recover_authenticator";

/// Token endpoint request, one variant per grant.
#[derive(Clone, Debug)]
pub enum TokenRequest {
    Password {
        username: String,
        password: SecretString,
    },
    Otp {
        login_hint: String,
        otp: String,
    },
    MfaOtp {
        mfa_token: String,
        otp: String,
    },
    Oob {
        oob_code: String,
        binding_code: Option<String>,
    },
    OobMfa {
        mfa_token: String,
        oob_code: String,
        binding_code: Option<String>,
    },
    WebAuthn {
        assertion: WebAuthnAssertion,
    },
    WebAuthnMfa {
        mfa_token: String,
        assertion: WebAuthnAssertion,
    },
}

impl TokenRequest {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::Password { .. } => GrantType::Password,
            Self::Otp { .. } => GrantType::Otp,
            Self::MfaOtp { .. } => GrantType::OtpMfa,
            Self::Oob { .. } => GrantType::Oob,
            Self::OobMfa { .. } => GrantType::OobMfa,
            Self::WebAuthn { .. } => GrantType::WebAuthn,
            Self::WebAuthnMfa { .. } => GrantType::WebAuthnMfa,
        }
    }

    /// Primary-factor grants request scopes; MFA grants inherit them.
    fn is_primary(&self) -> bool {
        matches!(
            self,
            Self::Password { .. } | Self::Otp { .. } | Self::Oob { .. } | Self::WebAuthn { .. }
        )
    }
}

impl DirectAuthRequest for TokenRequest {
    fn endpoint(&self) -> &'static str {
        TOKEN_ENDPOINT
    }

    fn form_parameters(&self, context: &DirectAuthenticationContext) -> Vec<(&'static str, String)> {
        let mut params = vec![("grant_type", self.grant_type().as_str().to_string())];

        match self {
            Self::Password { username, password } => {
                params.push(("username", username.clone()));
                params.push(("password", password.expose_secret().clone()));
            }
            Self::Otp { login_hint, otp } => {
                params.push(("login_hint", login_hint.clone()));
                params.push(("otp", otp.clone()));
            }
            Self::MfaOtp { mfa_token, otp } => {
                params.push(("mfa_token", mfa_token.clone()));
                params.push(("otp", otp.clone()));
            }
            Self::Oob {
                oob_code,
                binding_code,
            } => {
                params.push(("oob_code", oob_code.clone()));
                if let Some(code) = binding_code {
                    params.push(("binding_code", code.clone()));
                }
            }
            Self::OobMfa {
                mfa_token,
                oob_code,
                binding_code,
            } => {
                params.push(("mfa_token", mfa_token.clone()));
                params.push(("oob_code", oob_code.clone()));
                if let Some(code) = binding_code {
                    params.push(("binding_code", code.clone()));
                }
            }
            Self::WebAuthn { assertion } => push_assertion(&mut params, assertion),
            Self::WebAuthnMfa {
                mfa_token,
                assertion,
            } => {
                params.push(("mfa_token", mfa_token.clone()));
                push_assertion(&mut params, assertion);
            }
        }

        if self.is_primary() {
            params.push(("scope", context.scopes.join(" ")));
            params.push((
                "grant_types_supported",
                context
                    .grant_types
                    .iter()
                    .map(GrantType::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ));
            push_acr_values(&mut params, context);
        }

        if matches!(self, Self::Password { .. })
            && context.intent == DirectAuthenticationIntent::Recovery
        {
            params.push(("prompt", RECOVERY_PROMPT.to_string()));
        }

        params
    }
}

fn push_assertion(params: &mut Vec<(&'static str, String)>, assertion: &WebAuthnAssertion) {
    params.push(("authenticatorData", assertion.authenticator_data.clone()));
    params.push(("clientDataJSON", assertion.client_data_json.clone()));
    params.push(("signature", assertion.signature.clone()));
}
