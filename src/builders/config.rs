//! Context Builder
//!
//! Fluent builder for the direct authentication context.

use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::core::context::ContextParts;
use crate::core::{
    ApiExecutor, Clock, DirectAuthenticationContext, ReqwestApiExecutor, SystemClock,
    DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::telemetry::{Logger, TracingLogger};
use crate::types::{
    DirectAuthConfig, DirectAuthenticationIntent, GrantType, DEFAULT_GRANT_TYPES, DEFAULT_SCOPES,
    DEFAULT_TIMEOUT_SECS, RECOVERY_SCOPES,
};

/// Direct authentication context builder.
#[derive(Default)]
pub struct DirectAuthenticationContextBuilder {
    issuer: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    scopes: Option<Vec<String>>,
    authorization_server_id: String,
    grant_types: Option<Vec<GrantType>>,
    acr_values: Vec<String>,
    intent: DirectAuthenticationIntent,
    additional_parameters: HashMap<String, String>,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn Logger>>,
    clock: Option<Arc<dyn Clock>>,
    executor: Option<Arc<dyn ApiExecutor>>,
}

impl DirectAuthenticationContextBuilder {
    /// Create new context builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set issuer URL.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set scopes.
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Add a scope.
    pub fn add_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.get_or_insert_with(Vec::new).push(scope.into());
        self
    }

    /// Set custom authorization server ID.
    pub fn authorization_server_id(mut self, id: impl Into<String>) -> Self {
        self.authorization_server_id = id.into();
        self
    }

    /// Set declared grant types.
    pub fn grant_types(mut self, grant_types: Vec<GrantType>) -> Self {
        self.grant_types = Some(grant_types);
        self
    }

    /// Set ACR values.
    pub fn acr_values(mut self, acr_values: Vec<String>) -> Self {
        self.acr_values = acr_values;
        self
    }

    /// Set intent.
    pub fn intent(mut self, intent: DirectAuthenticationIntent) -> Self {
        self.intent = intent;
        self
    }

    /// Add an extra query parameter.
    pub fn additional_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_parameters.insert(key.into(), value.into());
        self
    }

    /// Replace all extra query parameters.
    pub fn additional_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.additional_parameters = parameters;
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set API executor.
    pub fn executor(mut self, executor: Arc<dyn ApiExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Apply a loaded configuration.
    pub fn from_config(mut self, config: DirectAuthConfig) -> Self {
        self.issuer = Some(config.issuer);
        self.client_id = Some(config.client_id);
        self.client_secret = config.client_secret;
        self.scopes = config.scopes;
        self.authorization_server_id = config.authorization_server_id;
        self.grant_types = config.grant_types;
        self.acr_values = config.acr_values;
        self.intent = config.intent;
        self.additional_parameters = config.additional_parameters;
        self.timeout = Some(Duration::from_secs(config.timeout_secs));
        self
    }

    /// Build context.
    pub fn build(self) -> ConfigurationResult<DirectAuthenticationContext> {
        let issuer = self.issuer.ok_or_else(|| ConfigurationError::MissingRequired {
            field: "issuer".to_string(),
        })?;
        let issuer = normalize_issuer(&issuer)?;

        let client_id = self
            .client_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingRequired {
                field: "client_id".to_string(),
            })?;

        let grant_types = self.grant_types.unwrap_or_else(|| DEFAULT_GRANT_TYPES.to_vec());
        if grant_types.is_empty() {
            return Err(ConfigurationError::InvalidConfig {
                message: "at least one grant type must be declared".to_string(),
            });
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let executor: Arc<dyn ApiExecutor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(
                ReqwestApiExecutor::with_options(timeout, DEFAULT_MAX_RESPONSE_SIZE).map_err(
                    |e| ConfigurationError::InvalidConfig {
                        message: e.to_string(),
                    },
                )?,
            ),
        };

        Ok(DirectAuthenticationContext::from_parts(ContextParts {
            issuer,
            client_id,
            client_secret: self.client_secret,
            scopes: self.scopes.unwrap_or_else(|| default_scopes(self.intent)),
            authorization_server_id: self.authorization_server_id,
            grant_types,
            acr_values: self.acr_values,
            intent: self.intent,
            additional_parameters: self.additional_parameters,
            timeout,
            logger: self
                .logger
                .unwrap_or_else(|| Arc::new(TracingLogger) as Arc<dyn Logger>),
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            executor,
        }))
    }
}

impl DirectAuthenticationContext {
    /// Builder preloaded with this context's fields and collaborators.
    ///
    /// The built context gets its own state cell.
    pub fn to_builder(&self) -> DirectAuthenticationContextBuilder {
        DirectAuthenticationContextBuilder {
            issuer: Some(self.issuer.clone()),
            client_id: Some(self.client_id.clone()),
            client_secret: self.client_secret.clone(),
            scopes: Some(self.scopes.clone()),
            authorization_server_id: self.authorization_server_id.clone(),
            grant_types: Some(self.grant_types.clone()),
            acr_values: self.acr_values.clone(),
            intent: self.intent,
            additional_parameters: self.additional_parameters.clone(),
            timeout: Some(self.timeout),
            logger: Some(self.logger.clone()),
            clock: Some(self.clock.clone()),
            executor: Some(self.executor.clone()),
        }
    }
}

fn default_scopes(intent: DirectAuthenticationIntent) -> Vec<String> {
    let scopes: &[&str] = match intent {
        DirectAuthenticationIntent::SignIn => &DEFAULT_SCOPES,
        DirectAuthenticationIntent::Recovery => &RECOVERY_SCOPES,
    };
    scopes.iter().map(|s| s.to_string()).collect()
}

fn normalize_issuer(issuer: &str) -> ConfigurationResult<String> {
    let trimmed = issuer.trim().trim_end_matches('/');
    let invalid = || ConfigurationError::InvalidIssuer {
        url: issuer.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}

/// Create a new direct authentication context builder.
pub fn direct_auth_context() -> DirectAuthenticationContextBuilder {
    DirectAuthenticationContextBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockApiExecutor;

    fn builder() -> DirectAuthenticationContextBuilder {
        direct_auth_context()
            .issuer("https://example.okta.com/")
            .client_id("test-client")
            .executor(Arc::new(MockApiExecutor::new()))
    }

    #[test]
    fn test_builder_defaults() {
        let context = builder().build().unwrap();

        assert_eq!(context.issuer, "https://example.okta.com");
        assert_eq!(
            context.scopes,
            vec!["openid", "email", "profile", "offline_access"]
        );
        assert_eq!(context.grant_types, DEFAULT_GRANT_TYPES.to_vec());
        assert_eq!(context.intent, DirectAuthenticationIntent::SignIn);
        assert_eq!(context.timeout, Duration::from_secs(30));
        assert!(context.client_secret_value().is_none());
    }

    #[test]
    fn test_recovery_intent_default_scopes() {
        let context = builder()
            .intent(DirectAuthenticationIntent::Recovery)
            .build()
            .unwrap();
        assert_eq!(context.scopes, vec!["openid", "okta.myAccount.password.manage"]);

        let context = builder()
            .intent(DirectAuthenticationIntent::Recovery)
            .scopes(vec!["openid".to_string()])
            .build()
            .unwrap();
        assert_eq!(context.scopes, vec!["openid"]);
    }

    #[test]
    fn test_builder_missing_client_id() {
        let result = direct_auth_context()
            .issuer("https://example.com")
            .client_id("  ")
            .build();

        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::MissingRequired {
                field: "client_id".to_string()
            }
        );
    }

    #[test]
    fn test_builder_rejects_invalid_issuer() {
        for issuer in ["not a url", "ftp://example.com", "https://example.com?x=1"] {
            let result = direct_auth_context()
                .issuer(issuer)
                .client_id("test-client")
                .build();
            assert!(
                matches!(result, Err(ConfigurationError::InvalidIssuer { .. })),
                "{issuer}"
            );
        }
    }

    #[test]
    fn test_blank_secret_is_ignored() {
        let context = builder().client_secret("   ").build().unwrap();
        assert!(context.client_secret_value().is_none());

        let context = builder().client_secret("shh").build().unwrap();
        assert_eq!(context.client_secret_value(), Some("shh"));
        assert!(!format!("{:?}", context).contains("shh"));
    }

    #[test]
    fn test_endpoint_url() {
        let context = builder().build().unwrap();
        assert_eq!(
            context.endpoint_url("token"),
            "https://example.okta.com/oauth2/v1/token"
        );

        let context = builder()
            .authorization_server_id("default")
            .additional_parameter("device", "cli")
            .build()
            .unwrap();
        assert_eq!(
            context.endpoint_url("oob-authenticate"),
            "https://example.okta.com/oauth2/default/v1/oob-authenticate?device=cli"
        );
    }

    #[test]
    fn test_supported_challenge_types_follow_declared_order() {
        use crate::types::ChallengeGrantType;

        let context = builder()
            .grant_types(vec![
                GrantType::Password,
                GrantType::WebAuthnMfa,
                GrantType::OobMfa,
            ])
            .build()
            .unwrap();
        assert_eq!(
            context.supported_challenge_types(),
            vec![ChallengeGrantType::WebAuthnMfa, ChallengeGrantType::OobMfa]
        );
    }

    #[test]
    fn test_to_builder_overrides_fields_with_fresh_state() {
        use crate::state::DirectAuthenticationState;

        let context = builder().build().unwrap();
        context.publish(DirectAuthenticationState::Canceled);

        let copy = context
            .to_builder()
            .authorization_server_id("custom")
            .build()
            .unwrap();
        assert_eq!(copy.client_id, "test-client");
        assert_eq!(copy.authorization_server_id, "custom");
        assert!(matches!(copy.current_state(), DirectAuthenticationState::Idle));
        assert!(matches!(
            context.current_state(),
            DirectAuthenticationState::Canceled
        ));
    }

    #[test]
    fn test_from_config() {
        let config: DirectAuthConfig = serde_json::from_str(
            r#"{"issuer":"https://example.com","client_id":"abc","scopes":["openid"],"timeout_secs":5}"#,
        )
        .unwrap();

        let context = direct_auth_context()
            .from_config(config)
            .executor(Arc::new(MockApiExecutor::new()))
            .build()
            .unwrap();
        assert_eq!(context.scopes, vec!["openid"]);
        assert_eq!(context.timeout, Duration::from_secs(5));
    }
}
