//! Challenge Handlers
//!
//! MFA challenge initiation, and the primary WebAuthn challenge.

use async_trait::async_trait;
use serde_json::Value;

use super::{oob::oob_body_as_state, response::decode_success_body, StepHandler};
use crate::core::{DirectAuthenticationContext, HttpRequest, RawResponse};
use crate::error::{InternalError, InternalErrorCode};
use crate::requests::{ChallengeRequest, DirectAuthRequest, WebAuthnChallengeRequest};
use crate::state::{DirectAuthContinuation, DirectAuthenticationState, OtpPrompt, WebAuthnChallenge};
use crate::types::{GrantType, MfaContext};

/// Initiates a secondary factor for a pending MFA transaction.
pub struct ChallengeStepHandler {
    context: DirectAuthenticationContext,
    request: ChallengeRequest,
    mfa_context: MfaContext,
}

impl ChallengeStepHandler {
    pub fn new(
        context: DirectAuthenticationContext,
        request: ChallengeRequest,
        mfa_context: MfaContext,
    ) -> Self {
        Self {
            context,
            request,
            mfa_context,
        }
    }
}

#[async_trait]
impl StepHandler for ChallengeStepHandler {
    fn context(&self) -> &DirectAuthenticationContext {
        &self.context
    }

    fn build_request(&self) -> HttpRequest {
        self.request.build(&self.context)
    }

    fn interpret(&self, response: &RawResponse) -> DirectAuthenticationState {
        match decode_success_body(&self.context, response) {
            Ok(body) => {
                challenge_body_as_state(&self.context, response.status, body, Some(&self.mfa_context))
            }
            Err(state) => state,
        }
    }
}

/// Fetches WebAuthn assertion options for a primary sign-in.
pub struct WebAuthnChallengeStepHandler {
    context: DirectAuthenticationContext,
    request: WebAuthnChallengeRequest,
}

impl WebAuthnChallengeStepHandler {
    pub fn new(context: DirectAuthenticationContext, request: WebAuthnChallengeRequest) -> Self {
        Self { context, request }
    }
}

#[async_trait]
impl StepHandler for WebAuthnChallengeStepHandler {
    fn context(&self) -> &DirectAuthenticationContext {
        &self.context
    }

    fn build_request(&self) -> HttpRequest {
        self.request.build(&self.context)
    }

    fn interpret(&self, response: &RawResponse) -> DirectAuthenticationState {
        match decode_success_body(&self.context, response) {
            Ok(body) => challenge_body_as_state(&self.context, response.status, body, None),
            Err(state) => state,
        }
    }
}

/// Dispatch a successful challenge body.
///
/// An `oob_code` starts an OOB transaction; an `mfa-otp` `challenge_type`
/// asks for a passcode; `publicKey` options or a WebAuthn `challenge_type`
/// yield a WebAuthn continuation. Anything else is a challenge this client
/// cannot answer.
fn challenge_body_as_state(
    context: &DirectAuthenticationContext,
    status: u16,
    body: Value,
    mfa_context: Option<&MfaContext>,
) -> DirectAuthenticationState {
    if body.get("oob_code").is_some() {
        let challenge_type = if mfa_context.is_some() {
            GrantType::OobMfa
        } else {
            GrantType::Oob
        };
        return oob_body_as_state(context, body, challenge_type, mfa_context.cloned());
    }

    let challenge_type = body.get("challenge_type").and_then(Value::as_str);

    if let (Some(t), Some(mfa)) = (challenge_type, mfa_context) {
        if t == GrantType::OtpMfa.as_str() {
            return DirectAuthenticationState::Continuation(DirectAuthContinuation::OtpPrompt(
                OtpPrompt::new(context.clone(), mfa.clone()),
            ));
        }
    }

    let is_webauthn = matches!(
        challenge_type,
        Some(t) if t == GrantType::WebAuthn.as_str() || t == GrantType::WebAuthnMfa.as_str()
    );

    if is_webauthn || (challenge_type.is_none() && body.get("publicKey").is_some()) {
        return DirectAuthenticationState::Continuation(DirectAuthContinuation::WebAuthn(
            WebAuthnChallenge::new(body, context.clone(), mfa_context.cloned()),
        ));
    }

    match challenge_type {
        Some(other) => InternalError::from_message(format!("Unsupported challenge type: {}", other))
            .into(),
        None => InternalError::new(
            InternalErrorCode::InvalidResponse,
            format!("No challenge found in body: HTTP {}", status),
        )
        .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::direct_auth_context;
    use crate::core::MockApiExecutor;
    use crate::error::DirectAuthenticationError;
    use crate::types::{ChallengeGrantType, OobChannel};
    use std::sync::Arc;

    fn context() -> DirectAuthenticationContext {
        direct_auth_context()
            .issuer("https://example.okta.com")
            .client_id("test_client_id")
            .executor(Arc::new(MockApiExecutor::new()))
            .build()
            .unwrap()
    }

    fn mfa_handler() -> ChallengeStepHandler {
        let mfa_context = MfaContext::new("mfa-123", vec![ChallengeGrantType::OobMfa]);
        ChallengeStepHandler::new(
            context(),
            ChallengeRequest::new(
                &mfa_context,
                vec![ChallengeGrantType::OobMfa],
                Some(OobChannel::Push),
            ),
            mfa_context,
        )
    }

    #[test]
    fn test_request_fields() {
        let request = mfa_handler().build_request();
        assert_eq!(request.url, "https://example.okta.com/oauth2/v1/challenge");
        assert_eq!(request.form_parameter("mfa_token").as_deref(), Some("mfa-123"));
        assert_eq!(
            request.form_parameter("challenge_types_supported").as_deref(),
            Some("http://auth0.com/oauth/grant-type/mfa-oob")
        );
        assert_eq!(request.form_parameter("channel_hint").as_deref(), Some("push"));
        assert_eq!(request.form_parameter("scope"), None);
    }

    #[test]
    fn test_oob_challenge_carries_mfa_context() {
        let response = RawResponse::json(
            200,
            r#"{"challenge_type":"http://auth0.com/oauth/grant-type/mfa-oob","oob_code":"c9","expires_in":300,"interval":5,"channel":"push","binding_method":"none"}"#,
        );

        match mfa_handler().interpret(&response) {
            DirectAuthenticationState::Continuation(DirectAuthContinuation::OobPending(p)) => {
                assert_eq!(p.binding_context.challenge_type, GrantType::OobMfa);
                assert_eq!(p.mfa_context.as_ref().map(|m| m.mfa_token.as_str()), Some("mfa-123"));
            }
            other => panic!("expected OobPending, got {:?}", other),
        }
    }

    #[test]
    fn test_webauthn_challenge() {
        let response = RawResponse::json(
            200,
            r#"{"challenge_type":"urn:okta:params:oauth:grant-type:mfa-webauthn","publicKey":{"challenge":"abc","rpId":"example.okta.com"}}"#,
        );

        match mfa_handler().interpret(&response) {
            DirectAuthenticationState::Continuation(DirectAuthContinuation::WebAuthn(w)) => {
                assert_eq!(w.public_key_options().unwrap()["challenge"], "abc");
                assert!(w.mfa_context.is_some());
            }
            other => panic!("expected WebAuthn continuation, got {:?}", other),
        }
    }

    #[test]
    fn test_otp_challenge_yields_otp_prompt() {
        let response = RawResponse::json(
            200,
            r#"{"challenge_type":"http://auth0.com/oauth/grant-type/mfa-otp"}"#,
        );

        match mfa_handler().interpret(&response) {
            DirectAuthenticationState::Continuation(DirectAuthContinuation::OtpPrompt(p)) => {
                assert_eq!(p.mfa_context.mfa_token, "mfa-123");
            }
            other => panic!("expected OtpPrompt, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_challenge_type() {
        let response = RawResponse::json(
            200,
            r#"{"challenge_type":"urn:example:grant-type:mfa-carrier-pigeon"}"#,
        );

        match mfa_handler().interpret(&response) {
            DirectAuthenticationState::Error(DirectAuthenticationError::Internal(e)) => {
                assert_eq!(e.code, InternalErrorCode::Exception);
                assert_eq!(
                    e.description,
                    "Unsupported challenge type: urn:example:grant-type:mfa-carrier-pigeon"
                );
            }
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[test]
    fn test_primary_webauthn_challenge() {
        let handler = WebAuthnChallengeStepHandler::new(
            context(),
            WebAuthnChallengeRequest::new("user@example.com"),
        );
        let request = handler.build_request();
        assert_eq!(
            request.url,
            "https://example.okta.com/oauth2/v1/primary-authenticate"
        );
        assert_eq!(request.form_parameter("challenge_hint").as_deref(), Some("webauthn"));

        let response = RawResponse::json(200, r#"{"publicKey":{"challenge":"xyz"}}"#);
        match handler.interpret(&response) {
            DirectAuthenticationState::Continuation(DirectAuthContinuation::WebAuthn(w)) => {
                assert!(w.mfa_context.is_none());
            }
            other => panic!("expected WebAuthn continuation, got {:?}", other),
        }
    }
}
