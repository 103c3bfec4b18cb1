//! Response Interpretation
//!
//! Shared decode pipeline turning a raw response into either a success
//! payload or a finished state.

use serde::Deserialize;
use serde_json::Value;

use crate::core::{DirectAuthenticationContext, RawResponse};
use crate::error::{
    ApiError, ApiErrorCause, DirectAuthenticationError, HttpError, InternalError,
    InternalErrorCode, OAuth2Error,
};
use crate::state::{DirectAuthenticationState, MfaRequired};
use crate::types::{MfaContext, TokenResponse};

pub const MFA_REQUIRED: &str = "mfa_required";
pub const AUTHORIZATION_PENDING: &str = "authorization_pending";

/// API error envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    error_code: String,
    #[serde(default)]
    error_summary: String,
    #[serde(default)]
    error_id: Option<String>,
    #[serde(default)]
    error_link: Option<String>,
    #[serde(default)]
    error_causes: Vec<ApiErrorCause>,
}

/// OAuth2 error body, with the MFA token an `mfa_required` error carries.
#[derive(Debug, Deserialize)]
struct OAuth2ErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    mfa_token: Option<String>,
}

/// Decode a response down to its 2xx JSON payload.
///
/// Every other outcome (errors, `mfa_required`, `authorization_pending`)
/// comes back as the finished state in `Err`.
pub fn decode_success_body(
    context: &DirectAuthenticationContext,
    response: &RawResponse,
) -> Result<Value, DirectAuthenticationState> {
    if !response.is_json() {
        return Err(InternalError::new(
            InternalErrorCode::UnsupportedContentType,
            format!(
                "Unsupported content type: {}",
                response.content_type().unwrap_or("none")
            ),
        )
        .into());
    }

    if response.body.trim().is_empty() {
        let (code, description) = if response.is_success() {
            (
                InternalErrorCode::InvalidResponse,
                format!("Empty response body: HTTP {}", response.status),
            )
        } else if response.is_error() {
            (
                InternalErrorCode::InvalidResponse,
                format!("No parsable error response body: HTTP {}", response.status),
            )
        } else {
            unexpected_status(response.status)
        };
        return Err(InternalError::new(code, description).into());
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|e| InternalError::exception(e.to_string(), e))?;

    if response.is_success() {
        return Ok(body);
    }

    if response.is_error() {
        return Err(interpret_error_body(context, response.status, body));
    }

    let (code, description) = unexpected_status(response.status);
    Err(InternalError::new(code, description).into())
}

fn unexpected_status(status: u16) -> (InternalErrorCode, String) {
    (
        InternalErrorCode::UnexpectedHttpStatus,
        format!("Unexpected HTTP status: {}", status),
    )
}

/// Interpret a 4xx/5xx JSON body.
pub fn interpret_error_body(
    context: &DirectAuthenticationContext,
    status: u16,
    body: Value,
) -> DirectAuthenticationState {
    if let Ok(api) = ApiErrorBody::deserialize(&body) {
        return DirectAuthenticationError::Http(HttpError::Api(ApiError {
            error_code: api.error_code,
            error_summary: api.error_summary,
            error_id: api.error_id,
            error_link: api.error_link,
            error_causes: api.error_causes,
            http_status_code: status,
        }))
        .into();
    }

    let Ok(oauth) = OAuth2ErrorBody::deserialize(&body) else {
        return InternalError::new(
            InternalErrorCode::InvalidResponse,
            format!("No parsable error response body: HTTP {}", status),
        )
        .into();
    };

    match oauth.error.as_str() {
        MFA_REQUIRED => match oauth.mfa_token {
            Some(mfa_token) => DirectAuthenticationState::MfaRequired(MfaRequired::new(
                context.clone(),
                MfaContext::new(mfa_token, context.supported_challenge_types()),
            )),
            None => InternalError::new(
                InternalErrorCode::InvalidResponse,
                format!("No mfa_token found in body: HTTP {}", status),
            )
            .into(),
        },
        AUTHORIZATION_PENDING => DirectAuthenticationState::AuthorizationPending,
        _ => DirectAuthenticationError::Http(HttpError::OAuth2(OAuth2Error {
            error: oauth.error,
            error_description: oauth.error_description,
            http_status_code: status,
        }))
        .into(),
    }
}

/// Interpret a token endpoint response.
pub fn token_response_as_state(
    context: &DirectAuthenticationContext,
    response: &RawResponse,
) -> DirectAuthenticationState {
    let body = match decode_success_body(context, response) {
        Ok(body) => body,
        Err(state) => return state,
    };

    match TokenResponse::deserialize(&body) {
        Ok(token) => DirectAuthenticationState::Authenticated { token },
        Err(e) => InternalError::exception(e.to_string(), e).into(),
    }
}
