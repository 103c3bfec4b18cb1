//! Continuations
//!
//! Intermediate states that need another client step: waiting on an
//! out-of-band approval, entering an OOB or OTP code, confirming a
//! transferred code, or signing a WebAuthn challenge.
//!
//! Polling continuations send the first request immediately and then wait
//! the server's fixed `interval` between attempts, never past the
//! transaction deadline. Only `authorization_pending` is retried.

use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::DirectAuthenticationState;
use crate::core::DirectAuthenticationContext;
use crate::error::{InternalError, PollingTimeoutError};
use crate::handlers::{publish_state, StepHandler, TokenStepHandler};
use crate::requests::TokenRequest;
use crate::types::{BindingContext, MfaContext, WebAuthnAssertion};

/// A continuation returned by an OOB or challenge step.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectAuthContinuation {
    /// Poll until the user approves out of band.
    OobPending(OobPending),
    /// The user types the code they received.
    Prompt(Prompt),
    /// Show the binding code, then poll.
    Transfer(Transfer),
    /// The user types a code from their OTP authenticator.
    OtpPrompt(OtpPrompt),
    /// Sign the challenge with an authenticator.
    WebAuthn(WebAuthnChallenge),
}

impl DirectAuthContinuation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OobPending(_) => "OobPending",
            Self::Prompt(_) => "Prompt",
            Self::Transfer(_) => "Transfer",
            Self::OtpPrompt(_) => "OtpPrompt",
            Self::WebAuthn(_) => "WebAuthn",
        }
    }

    /// Absolute expiry in clock seconds, for OOB continuations.
    pub fn expiration_in_seconds(&self) -> Option<u64> {
        match self {
            Self::OobPending(c) => Some(c.expiration_in_seconds),
            Self::Prompt(c) => Some(c.expiration_in_seconds),
            Self::Transfer(c) => Some(c.expiration_in_seconds),
            Self::OtpPrompt(_) | Self::WebAuthn(_) => None,
        }
    }
}

/// Waiting on an out-of-band approval with no code to bind.
#[derive(Clone, Debug)]
pub struct OobPending {
    pub binding_context: BindingContext,
    pub context: DirectAuthenticationContext,
    pub mfa_context: Option<MfaContext>,
    /// Absolute deadline in clock seconds, fixed at creation.
    pub expiration_in_seconds: u64,
}

impl OobPending {
    pub fn new(
        binding_context: BindingContext,
        context: DirectAuthenticationContext,
        mfa_context: Option<MfaContext>,
    ) -> Self {
        let expiration_in_seconds = deadline(&context, &binding_context);
        Self {
            binding_context,
            context,
            mfa_context,
            expiration_in_seconds,
        }
    }

    /// Seconds left before the transaction expires.
    pub fn remaining_seconds(&self) -> u64 {
        self.expiration_in_seconds
            .saturating_sub(self.context.now_seconds())
    }

    /// Poll the token endpoint until a terminal or MFA state.
    pub async fn proceed(&self) -> DirectAuthenticationState {
        self.proceed_with_cancellation(&CancellationToken::new())
            .await
    }

    pub async fn proceed_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        poll_until_complete(
            &self.context,
            &self.binding_context,
            self.mfa_context.as_ref(),
            self.expiration_in_seconds,
            cancel,
        )
        .await
    }
}

/// The user must type the code delivered out of band.
#[derive(Clone, Debug)]
pub struct Prompt {
    pub binding_context: BindingContext,
    pub context: DirectAuthenticationContext,
    pub mfa_context: Option<MfaContext>,
    pub expiration_in_seconds: u64,
}

impl Prompt {
    pub fn new(
        binding_context: BindingContext,
        context: DirectAuthenticationContext,
        mfa_context: Option<MfaContext>,
    ) -> Self {
        let expiration_in_seconds = deadline(&context, &binding_context);
        Self {
            binding_context,
            context,
            mfa_context,
            expiration_in_seconds,
        }
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.expiration_in_seconds
            .saturating_sub(self.context.now_seconds())
    }

    /// Exchange the user-entered code. Single request, no polling.
    pub async fn proceed(&self, code: impl Into<String>) -> DirectAuthenticationState {
        self.proceed_with_cancellation(code, &CancellationToken::new())
            .await
    }

    pub async fn proceed_with_cancellation(
        &self,
        code: impl Into<String>,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        let request = finalize_request(
            &self.binding_context,
            self.mfa_context.as_ref(),
            Some(code.into()),
        );
        TokenStepHandler::new(self.context.clone(), request)
            .process_with_cancellation(cancel)
            .await
    }
}

/// The user confirms `binding_context.binding_code` on another device.
#[derive(Clone, Debug)]
pub struct Transfer {
    pub binding_context: BindingContext,
    pub context: DirectAuthenticationContext,
    pub mfa_context: Option<MfaContext>,
    pub expiration_in_seconds: u64,
}

impl Transfer {
    pub fn new(
        binding_context: BindingContext,
        context: DirectAuthenticationContext,
        mfa_context: Option<MfaContext>,
    ) -> Self {
        let expiration_in_seconds = deadline(&context, &binding_context);
        Self {
            binding_context,
            context,
            mfa_context,
            expiration_in_seconds,
        }
    }

    /// Code to display to the user.
    pub fn binding_code(&self) -> &str {
        self.binding_context.binding_code.as_deref().unwrap_or_default()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.expiration_in_seconds
            .saturating_sub(self.context.now_seconds())
    }

    /// Poll until approval; same mechanics as [`OobPending::proceed`].
    pub async fn proceed(&self) -> DirectAuthenticationState {
        self.proceed_with_cancellation(&CancellationToken::new())
            .await
    }

    pub async fn proceed_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        poll_until_complete(
            &self.context,
            &self.binding_context,
            self.mfa_context.as_ref(),
            self.expiration_in_seconds,
            cancel,
        )
        .await
    }
}

/// An OTP challenge was accepted; the passcode is still to be entered.
#[derive(Clone, Debug)]
pub struct OtpPrompt {
    pub context: DirectAuthenticationContext,
    pub mfa_context: MfaContext,
}

impl OtpPrompt {
    pub fn new(context: DirectAuthenticationContext, mfa_context: MfaContext) -> Self {
        Self {
            context,
            mfa_context,
        }
    }

    /// Exchange the passcode on the `mfa-otp` grant.
    pub async fn proceed(&self, passcode: impl Into<String>) -> DirectAuthenticationState {
        self.proceed_with_cancellation(passcode, &CancellationToken::new())
            .await
    }

    pub async fn proceed_with_cancellation(
        &self,
        passcode: impl Into<String>,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        let request = TokenRequest::MfaOtp {
            mfa_token: self.mfa_context.mfa_token.clone(),
            otp: passcode.into(),
        };
        TokenStepHandler::new(self.context.clone(), request)
            .process_with_cancellation(cancel)
            .await
    }
}

/// WebAuthn assertion options awaiting a signature.
#[derive(Clone, Debug)]
pub struct WebAuthnChallenge {
    /// Challenge body as returned by the server.
    pub challenge_data: Value,
    pub context: DirectAuthenticationContext,
    pub mfa_context: Option<MfaContext>,
}

impl WebAuthnChallenge {
    pub fn new(
        challenge_data: Value,
        context: DirectAuthenticationContext,
        mfa_context: Option<MfaContext>,
    ) -> Self {
        Self {
            challenge_data,
            context,
            mfa_context,
        }
    }

    /// `PublicKeyCredentialRequestOptions` for the authenticator.
    pub fn public_key_options(&self) -> Option<&Value> {
        self.challenge_data.get("publicKey")
    }

    /// Exchange the signed assertion for tokens.
    pub async fn proceed(&self, assertion: WebAuthnAssertion) -> DirectAuthenticationState {
        self.proceed_with_cancellation(assertion, &CancellationToken::new())
            .await
    }

    pub async fn proceed_with_cancellation(
        &self,
        assertion: WebAuthnAssertion,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        let request = match &self.mfa_context {
            Some(mfa) => TokenRequest::WebAuthnMfa {
                mfa_token: mfa.mfa_token.clone(),
                assertion,
            },
            None => TokenRequest::WebAuthn { assertion },
        };
        TokenStepHandler::new(self.context.clone(), request)
            .process_with_cancellation(cancel)
            .await
    }
}

impl PartialEq for OobPending {
    fn eq(&self, other: &Self) -> bool {
        self.binding_context == other.binding_context
            && self.mfa_context == other.mfa_context
            && self.expiration_in_seconds == other.expiration_in_seconds
    }
}

impl PartialEq for Prompt {
    fn eq(&self, other: &Self) -> bool {
        self.binding_context == other.binding_context
            && self.mfa_context == other.mfa_context
            && self.expiration_in_seconds == other.expiration_in_seconds
    }
}

impl PartialEq for Transfer {
    fn eq(&self, other: &Self) -> bool {
        self.binding_context == other.binding_context
            && self.mfa_context == other.mfa_context
            && self.expiration_in_seconds == other.expiration_in_seconds
    }
}

impl PartialEq for OtpPrompt {
    fn eq(&self, other: &Self) -> bool {
        self.mfa_context == other.mfa_context
    }
}

impl PartialEq for WebAuthnChallenge {
    fn eq(&self, other: &Self) -> bool {
        self.challenge_data == other.challenge_data && self.mfa_context == other.mfa_context
    }
}

fn deadline(context: &DirectAuthenticationContext, binding_context: &BindingContext) -> u64 {
    context
        .now_seconds()
        .saturating_add(binding_context.expires_in)
}

/// Token request that finalizes an OOB transaction.
fn finalize_request(
    binding_context: &BindingContext,
    mfa_context: Option<&MfaContext>,
    binding_code: Option<String>,
) -> TokenRequest {
    match mfa_context {
        Some(mfa) => TokenRequest::OobMfa {
            mfa_token: mfa.mfa_token.clone(),
            oob_code: binding_context.oob_code.clone(),
            binding_code,
        },
        None => TokenRequest::Oob {
            oob_code: binding_context.oob_code.clone(),
            binding_code,
        },
    }
}

async fn poll_until_complete(
    context: &DirectAuthenticationContext,
    binding_context: &BindingContext,
    mfa_context: Option<&MfaContext>,
    expiration_in_seconds: u64,
    cancel: &CancellationToken,
) -> DirectAuthenticationState {
    let interval = Duration::from_secs(binding_context.polling_interval());
    let handler = TokenStepHandler::new(
        context.clone(),
        finalize_request(
            binding_context,
            mfa_context,
            binding_context.binding_code.clone(),
        ),
    );
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return publish_state(context, DirectAuthenticationState::Canceled);
        }

        let now = context.now_seconds();
        if now >= expiration_in_seconds {
            let seconds = binding_context.expires_in;
            context
                .logger
                .warn(&format!("OOB polling expired after {} seconds", seconds));
            let error = InternalError::exception(
                format!("Polling timed out after {} seconds.", seconds),
                PollingTimeoutError { seconds },
            );
            return publish_state(context, error.into());
        }

        attempt += 1;
        context.logger.trace(&format!(
            "Polling token endpoint (attempt {}, {}s remaining)",
            attempt,
            expiration_in_seconds - now
        ));

        let state = tokio::select! {
            biased;
            state = handler.process() => state,
            _ = cancel.cancelled() => {
                return publish_state(context, DirectAuthenticationState::Canceled);
            }
        };

        if state != DirectAuthenticationState::AuthorizationPending {
            return state;
        }

        let remaining = expiration_in_seconds.saturating_sub(context.now_seconds());
        let delay = interval.min(Duration::from_secs(remaining));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return publish_state(context, DirectAuthenticationState::Canceled);
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
