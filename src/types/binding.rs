//! Binding and MFA Context Types
//!
//! Data carried between the steps of a multi-factor attempt.

use super::{BindingMethod, ChallengeGrantType, GrantType, OobChannel};

/// Polling interval used when the server omits one (RFC 8628 default).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Floor applied to server-sent polling intervals.
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// MFA transaction handle returned with an `mfa_required` error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MfaContext {
    /// Token identifying the MFA transaction.
    pub mfa_token: String,
    /// Challenge types this client declared support for.
    pub supported_challenge_types: Vec<ChallengeGrantType>,
}

impl MfaContext {
    pub fn new(mfa_token: impl Into<String>, supported_challenge_types: Vec<ChallengeGrantType>) -> Self {
        Self {
            mfa_token: mfa_token.into(),
            supported_challenge_types,
        }
    }
}

/// A pending out-of-band transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingContext {
    pub oob_code: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Polling interval in seconds; absent for prompt-only channels.
    pub interval: Option<u64>,
    pub channel: OobChannel,
    pub binding_method: BindingMethod,
    /// Code the user confirms visually; only present for `Transfer`.
    pub binding_code: Option<String>,
    /// Grant used to finalize the transaction.
    pub challenge_type: GrantType,
}

impl BindingContext {
    /// Create a binding context. A binding code is required for `Transfer`
    /// and rejected for every other method.
    pub fn new(
        oob_code: impl Into<String>,
        expires_in: u64,
        interval: Option<u64>,
        channel: OobChannel,
        binding_method: BindingMethod,
        binding_code: Option<String>,
        challenge_type: GrantType,
    ) -> Result<Self, String> {
        if binding_method == BindingMethod::Transfer && binding_code.is_none() {
            return Err("binding_method: transfer without binding_code".to_string());
        }
        if binding_method != BindingMethod::Transfer && binding_code.is_some() {
            return Err(format!(
                "binding_code not allowed with binding_method: {}",
                binding_method.as_str()
            ));
        }

        Ok(Self {
            oob_code: oob_code.into(),
            expires_in,
            interval,
            channel,
            binding_method,
            binding_code,
            challenge_type,
        })
    }

    /// Get polling interval, falling back to the default. Never below
    /// [`MIN_POLL_INTERVAL_SECS`].
    pub fn polling_interval(&self) -> u64 {
        self.interval
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(MIN_POLL_INTERVAL_SECS)
    }
}
