//! OOB Authenticate Request

use super::{push_acr_values, DirectAuthRequest, OOB_AUTHENTICATE_ENDPOINT};
use crate::core::DirectAuthenticationContext;
use crate::types::OobChannel;

/// Starts an out-of-band primary authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OobAuthenticateRequest {
    pub login_hint: String,
    pub channel_hint: OobChannel,
}

impl OobAuthenticateRequest {
    pub fn new(login_hint: impl Into<String>, channel_hint: OobChannel) -> Self {
        Self {
            login_hint: login_hint.into(),
            channel_hint,
        }
    }
}

impl DirectAuthRequest for OobAuthenticateRequest {
    fn endpoint(&self) -> &'static str {
        OOB_AUTHENTICATE_ENDPOINT
    }

    fn form_parameters(&self, context: &DirectAuthenticationContext) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("login_hint", self.login_hint.clone()),
            ("channel_hint", self.channel_hint.as_str().to_string()),
        ];
        push_acr_values(&mut params, context);
        params
    }
}
