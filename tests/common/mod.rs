//! Shared helpers for direct authentication integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use direct_auth_integration::{
    direct_auth_context, ApiExecutor, BindingContext, BindingMethod, Clock,
    DirectAuthenticationContext, GrantType, HttpRequest, MockApiExecutor, NetworkError,
    OobChannel, RawResponse,
};

pub use direct_auth_integration::TokioClock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const ISSUER: &str = "https://example.okta.com";
pub const CLIENT_ID: &str = "test_client_id";

/// Executor that records when each request was sent.
pub struct TimedExecutor {
    inner: MockApiExecutor,
    sent_at: Mutex<Vec<Instant>>,
}

impl TimedExecutor {
    pub fn new(inner: MockApiExecutor) -> Self {
        Self {
            inner,
            sent_at: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_at(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.get_requests()
    }
}

#[async_trait]
impl ApiExecutor for TimedExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, NetworkError> {
        self.sent_at.lock().unwrap().push(Instant::now());
        self.inner.execute(request).await
    }
}

/// Executor whose responses take `delay` of tokio time to arrive.
pub struct SlowExecutor {
    inner: MockApiExecutor,
    delay: Duration,
}

impl SlowExecutor {
    pub fn new(inner: MockApiExecutor, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.get_requests()
    }
}

#[async_trait]
impl ApiExecutor for SlowExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, NetworkError> {
        tokio::time::sleep(self.delay).await;
        self.inner.execute(request).await
    }
}

/// Executor that fires `cancel` while answering, in the same turn.
pub struct CancelOnSendExecutor {
    inner: MockApiExecutor,
    cancel: CancellationToken,
}

impl CancelOnSendExecutor {
    pub fn new(inner: MockApiExecutor, cancel: CancellationToken) -> Self {
        Self { inner, cancel }
    }
}

#[async_trait]
impl ApiExecutor for CancelOnSendExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, NetworkError> {
        self.cancel.cancel();
        self.inner.execute(request).await
    }
}

pub fn context_with(
    executor: Arc<dyn ApiExecutor>,
    clock: Arc<dyn Clock>,
) -> DirectAuthenticationContext {
    direct_auth_context()
        .issuer(ISSUER)
        .client_id(CLIENT_ID)
        .authorization_server_id("default")
        .executor(executor)
        .clock(clock)
        .build()
        .unwrap()
}

pub fn binding(method: BindingMethod, binding_code: Option<&str>, expires_in: u64) -> BindingContext {
    BindingContext::new(
        "c1",
        expires_in,
        Some(5),
        OobChannel::Push,
        method,
        binding_code.map(str::to_string),
        GrantType::Oob,
    )
    .unwrap()
}

pub fn token_response() -> RawResponse {
    RawResponse::json(
        200,
        r#"{"access_token":"access-123","token_type":"Bearer","expires_in":3600,"scope":"openid email","refresh_token":"refresh-123","id_token":"id-123"}"#,
    )
}

pub fn pending_response() -> RawResponse {
    RawResponse::json(400, r#"{"error":"authorization_pending"}"#)
}

pub fn mfa_required_response() -> RawResponse {
    RawResponse::json(
        403,
        r#"{"error":"mfa_required","error_description":"Multi-factor authentication required.","mfa_token":"mfa-123"}"#,
    )
}
