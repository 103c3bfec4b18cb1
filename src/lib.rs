//! Direct Authentication Integration Module
//!
//! Client-side engine for OAuth2/OIDC direct authentication: a user signs
//! in with a primary factor and, depending on server policy, satisfies
//! further challenges before tokens are issued.
//!
//! # Features
//!
//! - Password, OTP, out-of-band and WebAuthn primary factors
//! - MFA with OTP, out-of-band and WebAuthn secondary factors
//! - Out-of-band polling with deadline and cancellation
//! - Prompt (enter a code) and transfer (confirm a code) bindings
//! - Observable state via `tokio::sync::watch` and `broadcast`
//!
//! # Example
//!
//! ```rust,ignore
//! use direct_auth_integration::{
//!     direct_auth_context, DirectAuthClient, DirectAuthContinuation,
//!     DirectAuthenticationState, PrimaryFactor, SecondaryFactor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = direct_auth_context()
//!         .issuer("https://example.okta.com")
//!         .client_id("my-client-id")
//!         .authorization_server_id("default")
//!         .build()?;
//!
//!     let client = DirectAuthClient::with_context(context);
//!     let mut state = client
//!         .start("user@example.com", PrimaryFactor::password("secret"))
//!         .await;
//!
//!     if let DirectAuthenticationState::MfaRequired(mfa) = &state {
//!         state = mfa
//!             .resume(SecondaryFactor::Otp { passcode: "123456".into() })
//!             .await;
//!     }
//!
//!     if let Some(token) = state.token() {
//!         println!("Signed in: {}", token.token_type);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: grant types, binding context, factors, tokens and configuration
//! - `error`: protocol, API and internal error hierarchy
//! - `core`: context, API executor, clock and the observable state cell
//! - `requests`: form-encoded request builders per endpoint
//! - `handlers`: execute a request and interpret its response into a state
//! - `state`: authentication states, MFA and continuation operations
//! - `builders`: fluent context builder
//! - `client`: high-level client combining all steps

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod handlers;
pub mod requests;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export main client
pub use client::{direct_auth_client, DirectAuthClient};

// Re-export builders
pub use builders::{direct_auth_context, DirectAuthenticationContextBuilder};

// Re-export errors
pub use error::{
    get_user_message, ApiError, ApiErrorCause, ConfigurationError, ConfigurationResult,
    DirectAuthenticationError, HttpError, InternalError, InternalErrorCode, NetworkError,
    OAuth2Error, PollingTimeoutError,
};

// Re-export types
pub use types::{
    // Grants
    BindingMethod, ChallengeGrantType, DirectAuthenticationIntent, GrantType, OobChannel,
    // Binding
    BindingContext, MfaContext, DEFAULT_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS,
    // Factors
    PrimaryFactor, SecondaryFactor, WebAuthnAssertion,
    // Token
    TokenResponse,
    // Config
    DirectAuthConfig, DEFAULT_GRANT_TYPES, DEFAULT_SCOPES, DEFAULT_TIMEOUT_SECS, RECOVERY_SCOPES,
};

// Re-export core components
pub use core::{
    // Context
    DirectAuthenticationContext, StateCell,
    // Transport
    create_mock_executor, ApiExecutor, HttpMethod, HttpRequest, MockApiExecutor, RawResponse,
    ReqwestApiExecutor,
    // Clock
    Clock, MockClock, SystemClock, TokioClock,
};

// Re-export requests
pub use requests::{
    ChallengeRequest, DirectAuthRequest, OobAuthenticateRequest, TokenRequest,
    WebAuthnChallengeRequest,
};

// Re-export handlers
pub use handlers::{
    ChallengeStepHandler, OobStepHandler, StepHandler, TokenStepHandler,
    WebAuthnChallengeStepHandler,
};

// Re-export states
pub use state::{
    DirectAuthContinuation, DirectAuthenticationState, MfaRequired, OobPending, OtpPrompt, Prompt,
    Transfer, WebAuthnChallenge,
};

// Re-export telemetry
pub use telemetry::{
    create_in_memory_logger, create_tracing_logger, InMemoryLogger, LogEntry, LogLevel, Logger,
    NoOpLogger, TracingLogger,
};
