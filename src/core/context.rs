//! Direct Authentication Context
//!
//! Configuration snapshot shared by every request of one authentication
//! attempt, plus the observable "current state" cell.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use super::{ApiExecutor, Clock};
use crate::state::DirectAuthenticationState;
use crate::telemetry::Logger;
use crate::types::{ChallengeGrantType, DirectAuthenticationIntent, GrantType};

/// Capacity of the transition broadcast channel.
const STATE_EVENT_CAPACITY: usize = 64;

/// Single-writer, multi-reader holder of the latest authentication state.
///
/// The `watch` side always holds the most recent state; the `broadcast` side
/// delivers every transition, so a subscriber sees each intermediate
/// `AuthorizationPending` as long as it keeps up with the channel capacity.
pub struct StateCell {
    latest: watch::Sender<DirectAuthenticationState>,
    events: broadcast::Sender<DirectAuthenticationState>,
}

impl StateCell {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(DirectAuthenticationState::Idle);
        let (events, _) = broadcast::channel(STATE_EVENT_CAPACITY);
        Self { latest, events }
    }

    /// Replace the current state and notify subscribers.
    pub fn publish(&self, state: DirectAuthenticationState) {
        // No subscribers is not an error.
        let _ = self.events.send(state.clone());
        self.latest.send_replace(state);
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> DirectAuthenticationState {
        self.latest.borrow().clone()
    }

    /// Receiver of the latest state.
    pub fn watch(&self) -> watch::Receiver<DirectAuthenticationState> {
        self.latest.subscribe()
    }

    /// Receiver of every subsequent transition.
    pub fn subscribe(&self) -> broadcast::Receiver<DirectAuthenticationState> {
        self.events.subscribe()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration and collaborators for one direct authentication attempt.
#[derive(Clone)]
pub struct DirectAuthenticationContext {
    /// Issuer URL without trailing slash.
    pub issuer: String,
    /// Client identifier.
    pub client_id: String,
    /// Client secret (for confidential clients).
    pub client_secret: Option<SecretString>,
    /// Requested scopes, space-joined on the wire.
    pub scopes: Vec<String>,
    /// Custom authorization server; empty selects the default one.
    pub authorization_server_id: String,
    /// Grant types the client declares support for.
    pub grant_types: Vec<GrantType>,
    pub acr_values: Vec<String>,
    pub intent: DirectAuthenticationIntent,
    /// Extra query parameters sent with every request.
    pub additional_parameters: HashMap<String, String>,
    /// HTTP timeout.
    pub timeout: Duration,
    pub logger: Arc<dyn Logger>,
    pub clock: Arc<dyn Clock>,
    pub executor: Arc<dyn ApiExecutor>,
    state: Arc<StateCell>,
}

impl DirectAuthenticationContext {
    pub(crate) fn from_parts(parts: ContextParts) -> Self {
        Self {
            issuer: parts.issuer,
            client_id: parts.client_id,
            client_secret: parts.client_secret,
            scopes: parts.scopes,
            authorization_server_id: parts.authorization_server_id,
            grant_types: parts.grant_types,
            acr_values: parts.acr_values,
            intent: parts.intent,
            additional_parameters: parts.additional_parameters,
            timeout: parts.timeout,
            logger: parts.logger,
            clock: parts.clock,
            executor: parts.executor,
            state: Arc::new(StateCell::new()),
        }
    }

    /// Full URL of an endpoint under this issuer, additional parameters included.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let mut url = format!("{}/oauth2", self.issuer);
        if !self.authorization_server_id.is_empty() {
            url.push('/');
            url.push_str(&self.authorization_server_id);
        }
        url.push_str("/v1/");
        url.push_str(endpoint);

        if !self.additional_parameters.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.additional_parameters.iter())
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        url
    }

    /// Client secret, if configured and non-blank.
    pub fn client_secret_value(&self) -> Option<&str> {
        self.client_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Declared grant types that can answer an MFA challenge, in declared order.
    pub fn supported_challenge_types(&self) -> Vec<ChallengeGrantType> {
        self.grant_types
            .iter()
            .filter_map(GrantType::as_challenge)
            .collect()
    }

    /// Current time from the context clock.
    pub fn now_seconds(&self) -> u64 {
        self.clock.now_seconds()
    }

    /// Publish a state to observers and hand it back.
    pub fn publish(&self, state: DirectAuthenticationState) -> DirectAuthenticationState {
        self.state.publish(state.clone());
        state
    }

    /// Snapshot of the last published state.
    pub fn current_state(&self) -> DirectAuthenticationState {
        self.state.current()
    }

    /// Receiver of the latest state.
    pub fn watch(&self) -> watch::Receiver<DirectAuthenticationState> {
        self.state.watch()
    }

    /// Receiver of every subsequent state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<DirectAuthenticationState> {
        self.state.subscribe()
    }

    /// Publish `Idle`.
    pub fn reset(&self) {
        self.state.publish(DirectAuthenticationState::Idle);
    }
}

impl std::fmt::Debug for DirectAuthenticationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectAuthenticationContext")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("authorization_server_id", &self.authorization_server_id)
            .field("grant_types", &self.grant_types)
            .field("acr_values", &self.acr_values)
            .field("intent", &self.intent)
            .field("additional_parameters", &self.additional_parameters)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validated fields handed from the builder to the context.
pub(crate) struct ContextParts {
    pub issuer: String,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub scopes: Vec<String>,
    pub authorization_server_id: String,
    pub grant_types: Vec<GrantType>,
    pub acr_values: Vec<String>,
    pub intent: DirectAuthenticationIntent,
    pub additional_parameters: HashMap<String, String>,
    pub timeout: Duration,
    pub logger: Arc<dyn Logger>,
    pub clock: Arc<dyn Clock>,
    pub executor: Arc<dyn ApiExecutor>,
}
