//! Direct Authentication Client
//!
//! High-level entry point that starts an attempt with a primary factor and
//! exposes the observable state of the attempt.

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::builders::direct_auth_context;
use crate::core::DirectAuthenticationContext;
use crate::error::ConfigurationResult;
use crate::handlers::{OobStepHandler, StepHandler, TokenStepHandler, WebAuthnChallengeStepHandler};
use crate::requests::{OobAuthenticateRequest, TokenRequest, WebAuthnChallengeRequest};
use crate::state::DirectAuthenticationState;
use crate::types::{DirectAuthConfig, PrimaryFactor};

/// Client driving direct authentication attempts against one issuer.
#[derive(Clone, Debug)]
pub struct DirectAuthClient {
    context: DirectAuthenticationContext,
}

impl DirectAuthClient {
    /// Create a client from configuration with default collaborators.
    pub fn new(config: DirectAuthConfig) -> ConfigurationResult<Self> {
        let context = direct_auth_context().from_config(config).build()?;
        Ok(Self { context })
    }

    /// Create a client around an already built context.
    pub fn with_context(context: DirectAuthenticationContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &DirectAuthenticationContext {
        &self.context
    }

    /// Start an attempt for `login_hint` with a primary factor.
    pub async fn start(
        &self,
        login_hint: &str,
        factor: PrimaryFactor,
    ) -> DirectAuthenticationState {
        self.start_with_cancellation(login_hint, factor, &CancellationToken::new())
            .await
    }

    pub async fn start_with_cancellation(
        &self,
        login_hint: &str,
        factor: PrimaryFactor,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        let context = self.context.clone();

        match factor {
            PrimaryFactor::Password(password) => {
                context.logger.info("Starting password authentication");
                let request = TokenRequest::Password {
                    username: login_hint.to_string(),
                    password,
                };
                TokenStepHandler::new(context, request)
                    .process_with_cancellation(cancel)
                    .await
            }
            PrimaryFactor::Otp { passcode } => {
                context.logger.info("Starting OTP authentication");
                let request = TokenRequest::Otp {
                    login_hint: login_hint.to_string(),
                    otp: passcode,
                };
                TokenStepHandler::new(context, request)
                    .process_with_cancellation(cancel)
                    .await
            }
            PrimaryFactor::Oob { channel } => {
                context
                    .logger
                    .info(&format!("Starting OOB authentication via {}", channel.as_str()));
                let request = OobAuthenticateRequest::new(login_hint, channel);
                OobStepHandler::new(context, request)
                    .process_with_cancellation(cancel)
                    .await
            }
            PrimaryFactor::WebAuthn => {
                context.logger.info("Starting WebAuthn authentication");
                let request = WebAuthnChallengeRequest::new(login_hint);
                WebAuthnChallengeStepHandler::new(context, request)
                    .process_with_cancellation(cancel)
                    .await
            }
        }
    }

    /// Snapshot of the last published state.
    pub fn current_state(&self) -> DirectAuthenticationState {
        self.context.current_state()
    }

    /// Receiver of the latest state.
    pub fn watch(&self) -> watch::Receiver<DirectAuthenticationState> {
        self.context.watch()
    }

    /// Receiver of every subsequent transition.
    pub fn subscribe(&self) -> broadcast::Receiver<DirectAuthenticationState> {
        self.context.subscribe()
    }

    /// Return the observable state to `Idle`.
    pub fn reset(&self) {
        self.context.reset();
    }
}

/// Create a new direct authentication client.
pub fn direct_auth_client(config: DirectAuthConfig) -> ConfigurationResult<DirectAuthClient> {
    DirectAuthClient::new(config)
}
