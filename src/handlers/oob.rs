//! OOB Authenticate Handler

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{response::decode_success_body, StepHandler};
use crate::core::{DirectAuthenticationContext, HttpRequest, RawResponse};
use crate::error::InternalError;
use crate::requests::{DirectAuthRequest, OobAuthenticateRequest};
use crate::state::{DirectAuthContinuation, DirectAuthenticationState, OobPending, Prompt, Transfer};
use crate::types::{BindingContext, BindingMethod, GrantType, MfaContext, OobChannel};

/// Wire shape of an OOB transaction.
#[derive(Debug, Deserialize)]
struct OobResponseBody {
    oob_code: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
    channel: String,
    binding_method: String,
    #[serde(default)]
    binding_code: Option<String>,
}

/// Starts an out-of-band primary authentication.
pub struct OobStepHandler {
    context: DirectAuthenticationContext,
    request: OobAuthenticateRequest,
}

impl OobStepHandler {
    pub fn new(context: DirectAuthenticationContext, request: OobAuthenticateRequest) -> Self {
        Self { context, request }
    }
}

#[async_trait]
impl StepHandler for OobStepHandler {
    fn context(&self) -> &DirectAuthenticationContext {
        &self.context
    }

    fn build_request(&self) -> HttpRequest {
        self.request.build(&self.context)
    }

    fn interpret(&self, response: &RawResponse) -> DirectAuthenticationState {
        match decode_success_body(&self.context, response) {
            Ok(body) => oob_body_as_state(&self.context, body, GrantType::Oob, None),
            Err(state) => state,
        }
    }
}

/// Turn an OOB transaction body into the matching continuation.
///
/// Shared by primary OOB sign-in and MFA OOB challenges; `challenge_type`
/// selects the grant that later finalizes the transaction.
pub(crate) fn oob_body_as_state(
    context: &DirectAuthenticationContext,
    body: Value,
    challenge_type: GrantType,
    mfa_context: Option<MfaContext>,
) -> DirectAuthenticationState {
    match binding_context_from_body(body, challenge_type) {
        Ok(binding_context) => {
            let continuation = match binding_context.binding_method {
                BindingMethod::None => DirectAuthContinuation::OobPending(OobPending::new(
                    binding_context,
                    context.clone(),
                    mfa_context,
                )),
                BindingMethod::Prompt => DirectAuthContinuation::Prompt(Prompt::new(
                    binding_context,
                    context.clone(),
                    mfa_context,
                )),
                BindingMethod::Transfer => DirectAuthContinuation::Transfer(Transfer::new(
                    binding_context,
                    context.clone(),
                    mfa_context,
                )),
            };
            DirectAuthenticationState::Continuation(continuation)
        }
        Err(e) => e.into(),
    }
}

fn binding_context_from_body(
    body: Value,
    challenge_type: GrantType,
) -> Result<BindingContext, InternalError> {
    let body = OobResponseBody::deserialize(body)
        .map_err(|e| InternalError::exception(e.to_string(), e))?;

    let channel: OobChannel = body.channel.parse().map_err(InternalError::from_message)?;
    let binding_method: BindingMethod = body
        .binding_method
        .parse()
        .map_err(InternalError::from_message)?;

    BindingContext::new(
        body.oob_code,
        body.expires_in,
        body.interval,
        channel,
        binding_method,
        body.binding_code,
        challenge_type,
    )
    .map_err(InternalError::from_message)
}
