//! Authentication States
//!
//! The state machine values produced by every step of a direct
//! authentication attempt. `Authenticated`, `Canceled` and `Error` are
//! terminal; `MfaRequired` and `Continuation` carry the operations that
//! advance the attempt.

use crate::error::{DirectAuthenticationError, InternalError};
use crate::types::TokenResponse;

pub mod continuation;
pub mod mfa;

pub use continuation::{
    DirectAuthContinuation, OobPending, OtpPrompt, Prompt, Transfer, WebAuthnChallenge,
};
pub use mfa::MfaRequired;

/// Result of a direct authentication step.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectAuthenticationState {
    /// Nothing has happened yet, or the attempt was reset.
    Idle,
    /// Tokens were issued.
    Authenticated { token: TokenResponse },
    /// A secondary factor is required.
    MfaRequired(MfaRequired),
    /// The user has not approved the OOB transaction yet.
    AuthorizationPending,
    /// The caller canceled the attempt.
    Canceled,
    /// The attempt needs another client step.
    Continuation(DirectAuthContinuation),
    Error(DirectAuthenticationError),
}

impl DirectAuthenticationState {
    /// Short name for logs; never includes tokens or codes.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Authenticated { .. } => "Authenticated",
            Self::MfaRequired(_) => "MfaRequired",
            Self::AuthorizationPending => "AuthorizationPending",
            Self::Canceled => "Canceled",
            Self::Continuation(c) => c.name(),
            Self::Error(_) => "Error",
        }
    }

    /// Check if no further step can follow this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Authenticated { .. } | Self::Canceled | Self::Error(_)
        )
    }

    pub fn token(&self) -> Option<&TokenResponse> {
        match self {
            Self::Authenticated { token } => Some(token),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DirectAuthenticationError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl Default for DirectAuthenticationState {
    fn default() -> Self {
        Self::Idle
    }
}

impl From<DirectAuthenticationError> for DirectAuthenticationState {
    fn from(error: DirectAuthenticationError) -> Self {
        Self::Error(error)
    }
}

impl From<InternalError> for DirectAuthenticationState {
    fn from(error: InternalError) -> Self {
        Self::Error(DirectAuthenticationError::Internal(error))
    }
}
