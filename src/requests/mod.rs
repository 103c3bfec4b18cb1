//! Request Builders
//!
//! Canonical form-encoded requests for every direct authentication endpoint.
//!
//! All requests are `POST`, `application/x-www-form-urlencoded`, accept JSON,
//! and target `{issuer}/oauth2[/{authorizationServerId}]/v1/{endpoint}` with the
//! context's additional parameters as the query string.

use std::collections::HashMap;

use crate::core::{DirectAuthenticationContext, HttpMethod, HttpRequest};

pub mod challenge;
pub mod oob;
pub mod token;

pub use challenge::{ChallengeRequest, WebAuthnChallengeRequest};
pub use oob::OobAuthenticateRequest;
pub use token::TokenRequest;

pub const TOKEN_ENDPOINT: &str = "token";
pub const OOB_AUTHENTICATE_ENDPOINT: &str = "oob-authenticate";
pub const CHALLENGE_ENDPOINT: &str = "challenge";
pub const PRIMARY_AUTHENTICATE_ENDPOINT: &str = "primary-authenticate";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A request against one direct authentication endpoint.
pub trait DirectAuthRequest {
    /// Endpoint name under `/v1/`.
    fn endpoint(&self) -> &'static str;

    /// Variant-specific form fields, in wire order.
    fn form_parameters(&self, context: &DirectAuthenticationContext) -> Vec<(&'static str, String)>;

    /// Build the HTTP request.
    fn build(&self, context: &DirectAuthenticationContext) -> HttpRequest {
        let mut parameters = client_parameters(context);
        parameters.extend(self.form_parameters(context));

        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(parameters.iter())
            .finish();

        HttpRequest {
            method: HttpMethod::Post,
            url: context.endpoint_url(self.endpoint()),
            headers: build_request_headers(),
            body: Some(body),
            timeout: Some(context.timeout),
        }
    }
}

/// `client_id`, plus `client_secret` when it is non-blank.
fn client_parameters(context: &DirectAuthenticationContext) -> Vec<(&'static str, String)> {
    let mut params = vec![("client_id", context.client_id.clone())];
    if let Some(secret) = context.client_secret_value() {
        params.push(("client_secret", secret.to_string()));
    }
    params
}

fn build_request_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), FORM_CONTENT_TYPE.to_string());
    headers.insert("accept".to_string(), JSON_CONTENT_TYPE.to_string());
    headers
}

/// Append `acr_values` when the context carries any.
pub(crate) fn push_acr_values(
    params: &mut Vec<(&'static str, String)>,
    context: &DirectAuthenticationContext,
) {
    if !context.acr_values.is_empty() {
        params.push(("acr_values", context.acr_values.join(" ")));
    }
}
