//! MFA Required State

use tokio_util::sync::CancellationToken;

use super::DirectAuthenticationState;
use crate::core::DirectAuthenticationContext;
use crate::handlers::{ChallengeStepHandler, StepHandler, TokenStepHandler};
use crate::requests::{ChallengeRequest, TokenRequest};
use crate::types::{ChallengeGrantType, MfaContext, SecondaryFactor};

/// The server requires a secondary factor before issuing tokens.
#[derive(Clone, Debug)]
pub struct MfaRequired {
    pub context: DirectAuthenticationContext,
    pub mfa_context: MfaContext,
}

impl MfaRequired {
    pub fn new(context: DirectAuthenticationContext, mfa_context: MfaContext) -> Self {
        Self {
            context,
            mfa_context,
        }
    }

    /// Start a secondary factor that has not been initiated yet.
    ///
    /// Every factor goes through the challenge endpoint. OTP comes back as
    /// an [`OtpPrompt`](crate::state::OtpPrompt), OOB as an OOB
    /// continuation and WebAuthn as assertion options.
    pub async fn challenge(&self, factor: SecondaryFactor) -> DirectAuthenticationState {
        self.challenge_with_cancellation(factor, &CancellationToken::new())
            .await
    }

    pub async fn challenge_with_cancellation(
        &self,
        factor: SecondaryFactor,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        self.context
            .logger
            .debug(&format!("MFA challenge: {}", factor_name(&factor)));

        match factor {
            SecondaryFactor::Otp { .. } => {
                let request = ChallengeRequest::new(
                    &self.mfa_context,
                    vec![ChallengeGrantType::OtpMfa],
                    None,
                );
                self.send_challenge(request, cancel).await
            }
            SecondaryFactor::Oob { channel } => {
                let request = ChallengeRequest::new(
                    &self.mfa_context,
                    vec![ChallengeGrantType::OobMfa],
                    Some(channel),
                );
                self.send_challenge(request, cancel).await
            }
            SecondaryFactor::WebAuthn => {
                let request = ChallengeRequest::new(
                    &self.mfa_context,
                    vec![ChallengeGrantType::WebAuthnMfa],
                    None,
                );
                self.send_challenge(request, cancel).await
            }
        }
    }

    /// Continue the MFA transaction with a secondary factor.
    ///
    /// A passcode the user already holds is exchanged at the token endpoint;
    /// OOB and WebAuthn have no finalize material yet and are initiated
    /// through [`challenge`](Self::challenge).
    pub async fn resume(&self, factor: SecondaryFactor) -> DirectAuthenticationState {
        self.resume_with_cancellation(factor, &CancellationToken::new())
            .await
    }

    pub async fn resume_with_cancellation(
        &self,
        factor: SecondaryFactor,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        match factor {
            SecondaryFactor::Otp { passcode } => self.exchange_otp(passcode, cancel).await,
            other => self.challenge_with_cancellation(other, cancel).await,
        }
    }

    async fn exchange_otp(
        &self,
        passcode: String,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        let request = TokenRequest::MfaOtp {
            mfa_token: self.mfa_context.mfa_token.clone(),
            otp: passcode,
        };
        TokenStepHandler::new(self.context.clone(), request)
            .process_with_cancellation(cancel)
            .await
    }

    async fn send_challenge(
        &self,
        request: ChallengeRequest,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        ChallengeStepHandler::new(self.context.clone(), request, self.mfa_context.clone())
            .process_with_cancellation(cancel)
            .await
    }
}

// The context is configuration plus a shared cell; the MFA transaction is the value.
impl PartialEq for MfaRequired {
    fn eq(&self, other: &Self) -> bool {
        self.mfa_context == other.mfa_context
    }
}

fn factor_name(factor: &SecondaryFactor) -> &'static str {
    match factor {
        SecondaryFactor::Otp { .. } => "otp",
        SecondaryFactor::Oob { .. } => "oob",
        SecondaryFactor::WebAuthn => "webauthn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::direct_auth_context;
    use crate::core::{MockApiExecutor, RawResponse};
    use crate::state::DirectAuthContinuation;
    use crate::types::OobChannel;
    use std::sync::Arc;

    fn mfa_required(executor: Arc<MockApiExecutor>) -> MfaRequired {
        let context = direct_auth_context()
            .issuer("https://example.okta.com")
            .client_id("test_client_id")
            .executor(executor)
            .build()
            .unwrap();
        let mfa_context = MfaContext::new("mfa-123", context.supported_challenge_types());
        MfaRequired::new(context, mfa_context)
    }

    #[tokio::test]
    async fn test_resume_otp_exchanges_at_token_endpoint() {
        let executor = Arc::new(MockApiExecutor::new());
        executor.queue_response(RawResponse::json(
            200,
            r#"{"access_token":"at","token_type":"Bearer","expires_in":3600}"#,
        ));
        let mfa = mfa_required(executor.clone());

        let state = mfa
            .resume(SecondaryFactor::Otp {
                passcode: "123456".to_string(),
            })
            .await;

        assert!(matches!(state, DirectAuthenticationState::Authenticated { .. }));
        let request = executor.get_last_request().unwrap();
        assert!(request.url.ends_with("/v1/token"));
        assert_eq!(
            request.form_parameter("grant_type").as_deref(),
            Some("http://auth0.com/oauth/grant-type/mfa-otp")
        );
        assert_eq!(request.form_parameter("mfa_token").as_deref(), Some("mfa-123"));
        assert_eq!(request.form_parameter("otp").as_deref(), Some("123456"));
        assert_eq!(request.form_parameter("scope"), None);
    }

    #[tokio::test]
    async fn test_resume_oob_goes_through_challenge() {
        let executor = Arc::new(MockApiExecutor::new());
        executor.queue_response(RawResponse::json(
            200,
            r#"{"challenge_type":"http://auth0.com/oauth/grant-type/mfa-oob","oob_code":"c1","expires_in":120,"interval":5,"channel":"sms","binding_method":"prompt"}"#,
        ));
        let mfa = mfa_required(executor.clone());

        let state = mfa
            .resume(SecondaryFactor::Oob {
                channel: OobChannel::Sms,
            })
            .await;

        match &state {
            DirectAuthenticationState::Continuation(DirectAuthContinuation::Prompt(prompt)) => {
                assert_eq!(prompt.mfa_context.as_ref(), Some(&mfa.mfa_context));
            }
            other => panic!("expected Prompt, got {:?}", other),
        }
        assert_eq!(mfa.context.current_state(), state);

        let request = executor.get_last_request().unwrap();
        assert!(request.url.ends_with("/v1/challenge"));
        assert_eq!(request.form_parameter("channel_hint").as_deref(), Some("sms"));
    }

    #[tokio::test]
    async fn test_challenge_otp_goes_through_challenge_endpoint() {
        let executor = Arc::new(MockApiExecutor::new());
        executor.queue_response(RawResponse::json(
            200,
            r#"{"challenge_type":"http://auth0.com/oauth/grant-type/mfa-otp"}"#,
        ));
        executor.queue_response(RawResponse::json(
            200,
            r#"{"access_token":"at","token_type":"Bearer","expires_in":3600}"#,
        ));
        let mfa = mfa_required(executor.clone());

        let state = mfa
            .challenge(SecondaryFactor::Otp {
                passcode: String::new(),
            })
            .await;

        let request = executor.get_last_request().unwrap();
        assert!(request.url.ends_with("/v1/challenge"));
        assert_eq!(
            request.form_parameter("challenge_types_supported").as_deref(),
            Some("http://auth0.com/oauth/grant-type/mfa-otp")
        );
        assert_eq!(request.form_parameter("otp"), None);

        let DirectAuthenticationState::Continuation(DirectAuthContinuation::OtpPrompt(prompt)) =
            state
        else {
            panic!("expected OtpPrompt");
        };
        let state = prompt.proceed("123456").await;

        assert!(matches!(state, DirectAuthenticationState::Authenticated { .. }));
        let request = executor.get_last_request().unwrap();
        assert!(request.url.ends_with("/v1/token"));
        assert_eq!(request.form_parameter("otp").as_deref(), Some("123456"));
        assert_eq!(executor.get_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_canceled_before_request() {
        let executor = Arc::new(MockApiExecutor::new());
        let mfa = mfa_required(executor.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let state = mfa
            .challenge_with_cancellation(SecondaryFactor::WebAuthn, &cancel)
            .await;

        assert_eq!(state, DirectAuthenticationState::Canceled);
        assert!(executor.get_requests().is_empty());
    }
}
