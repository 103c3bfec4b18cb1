//! Token Endpoint Handler

use async_trait::async_trait;

use super::{response::token_response_as_state, StepHandler};
use crate::core::{DirectAuthenticationContext, HttpRequest, RawResponse};
use crate::requests::{DirectAuthRequest, TokenRequest};
use crate::state::DirectAuthenticationState;

/// Exchanges a factor at the token endpoint.
pub struct TokenStepHandler {
    context: DirectAuthenticationContext,
    request: TokenRequest,
}

impl TokenStepHandler {
    pub fn new(context: DirectAuthenticationContext, request: TokenRequest) -> Self {
        Self { context, request }
    }

    pub fn request(&self) -> &TokenRequest {
        &self.request
    }
}

#[async_trait]
impl StepHandler for TokenStepHandler {
    fn context(&self) -> &DirectAuthenticationContext {
        &self.context
    }

    fn build_request(&self) -> HttpRequest {
        self.request.build(&self.context)
    }

    fn interpret(&self, response: &RawResponse) -> DirectAuthenticationState {
        token_response_as_state(&self.context, response)
    }
}
