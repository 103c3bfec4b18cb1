//! Step Handlers
//!
//! Each handler owns one request, executes it, interprets the response into
//! a [`DirectAuthenticationState`], and publishes that state to the context.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::{DirectAuthenticationContext, HttpRequest, RawResponse};
use crate::error::{DirectAuthenticationError, InternalError, NetworkError};
use crate::state::DirectAuthenticationState;

pub mod challenge;
pub mod oob;
pub mod response;
pub mod token;

pub use challenge::{ChallengeStepHandler, WebAuthnChallengeStepHandler};
pub use oob::OobStepHandler;
pub use response::{decode_success_body, interpret_error_body, token_response_as_state};
pub use token::TokenStepHandler;

/// One request/response step of an authentication attempt.
#[async_trait]
pub trait StepHandler: Send + Sync {
    fn context(&self) -> &DirectAuthenticationContext;

    /// Build the request this step sends.
    fn build_request(&self) -> HttpRequest;

    /// Interpret a response. Pure; calling it twice yields equal states.
    fn interpret(&self, response: &RawResponse) -> DirectAuthenticationState;

    /// Execute the request and publish the resulting state.
    async fn process(&self) -> DirectAuthenticationState {
        let context = self.context();
        let request = self.build_request();
        context.logger.debug(&format!(
            "{} {}",
            request.method.as_str(),
            request.path_url()
        ));

        let state = match context.executor.execute(request).await {
            Ok(response) => self.interpret(&response),
            Err(NetworkError::Canceled) => DirectAuthenticationState::Canceled,
            Err(e) => InternalError::exception(e.to_string(), e).into(),
        };

        publish_state(context, state)
    }

    /// [`process`](StepHandler::process), abandoned with `Canceled` once
    /// `cancel` fires.
    async fn process_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> DirectAuthenticationState {
        if cancel.is_cancelled() {
            return publish_state(self.context(), DirectAuthenticationState::Canceled);
        }

        tokio::select! {
            biased;
            state = self.process() => state,
            _ = cancel.cancelled() => {
                publish_state(self.context(), DirectAuthenticationState::Canceled)
            }
        }
    }
}

/// Log a state at the level it warrants and publish it.
pub(crate) fn publish_state(
    context: &DirectAuthenticationContext,
    state: DirectAuthenticationState,
) -> DirectAuthenticationState {
    match &state {
        DirectAuthenticationState::Error(error) => log_error(context, error),
        DirectAuthenticationState::Canceled => context.logger.info("Authentication canceled"),
        DirectAuthenticationState::AuthorizationPending => {
            context.logger.trace("Authorization pending")
        }
        other => context.logger.debug(&format!("State: {}", other.name())),
    }
    context.publish(state)
}

fn log_error(context: &DirectAuthenticationContext, error: &DirectAuthenticationError) {
    match error {
        DirectAuthenticationError::Internal(_) => {
            context.logger.error(
                &error.to_string(),
                Some(error as &(dyn std::error::Error + 'static)),
            )
        }
        DirectAuthenticationError::Http(_) => context.logger.warn(&error.to_string()),
    }
}
