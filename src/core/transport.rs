//! HTTP Transport
//!
//! API executor interface and implementations for direct authentication requests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::error::NetworkError;

/// Maximum accepted response body size.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1048576; // 1MB

/// HTTP request definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL, query string included.
    pub url: String,
    /// Request headers (lower-case names).
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Decoded form body parameters, in wire order.
    pub fn form_parameters(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|body| {
                url::form_urlencoded::parse(body.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value of a single form parameter.
    pub fn form_parameter(&self, name: &str) -> Option<String> {
        self.form_parameters()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Decoded query parameters.
    pub fn query_parameters(&self) -> HashMap<String, String> {
        match self.url.split_once('?') {
            Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => HashMap::new(),
        }
    }

    /// URL without the query string.
    pub fn path_url(&self) -> &str {
        self.url.split_once('?').map(|(base, _)| base).unwrap_or(&self.url)
    }
}

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Raw HTTP response handed to the response interpreters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lower-case names).
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Create a response with a JSON content type.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: [("content-type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: body.into(),
        }
    }

    /// Value of the `content-type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }

    /// Check if the content type is `application/json` or `application/*+json`.
    pub fn is_json(&self) -> bool {
        let Some(content_type) = self.content_type() else {
            return false;
        };
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        media_type == "application/json"
            || (media_type.starts_with("application/") && media_type.ends_with("+json"))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status)
    }
}

/// API executor interface (for dependency injection).
#[async_trait]
pub trait ApiExecutor: Send + Sync {
    /// Execute an HTTP request.
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, NetworkError>;
}

/// Default reqwest-based API executor.
pub struct ReqwestApiExecutor {
    client: reqwest::Client,
    default_timeout: Duration,
    max_response_size: usize,
}

impl ReqwestApiExecutor {
    /// Create new executor with default settings.
    pub fn new() -> Result<Self, NetworkError> {
        Self::with_options(Duration::from_secs(30), DEFAULT_MAX_RESPONSE_SIZE)
    }

    /// Create executor with custom options.
    pub fn with_options(timeout: Duration, max_response_size: usize) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| NetworkError::ConnectionFailed {
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client, timeout, max_response_size))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client, timeout: Duration, max_response_size: usize) -> Self {
        Self {
            client,
            default_timeout: timeout,
            max_response_size,
        }
    }
}

#[async_trait]
impl ApiExecutor for ReqwestApiExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, NetworkError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout { timeout }
            } else {
                NetworkError::ConnectionFailed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_lowercase(), v.to_string());
            }
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(NetworkError::InvalidBody {
                    message: format!("Response too large: {} bytes", len),
                });
            }
        }

        let body = response.text().await.map_err(|e| NetworkError::InvalidBody {
            message: e.to_string(),
        })?;

        if body.len() > self.max_response_size {
            return Err(NetworkError::InvalidBody {
                message: format!("Response too large: {} bytes", body.len()),
            });
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Mock API executor for testing.
#[derive(Default)]
pub struct MockApiExecutor {
    responses: std::sync::Mutex<VecDeque<Result<RawResponse, NetworkError>>>,
    request_history: std::sync::Mutex<Vec<HttpRequest>>,
    default_response: std::sync::Mutex<Option<RawResponse>>,
}

impl MockApiExecutor {
    /// Create new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response; responses are returned in queue order.
    pub fn queue_response(&self, response: RawResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response<T: serde::Serialize>(&self, status: u16, body: &T) -> &Self {
        self.queue_response(RawResponse::json(status, serde_json::to_string(body).unwrap()))
    }

    /// Queue a transport failure.
    pub fn queue_error(&self, error: NetworkError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Set default response when queue is empty.
    pub fn set_default_response(&self, response: RawResponse) -> &Self {
        *self.default_response.lock().unwrap() = Some(response);
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().unwrap().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        self.request_history.lock().unwrap().last().cloned()
    }

    /// Clear request history.
    pub fn clear_history(&self) {
        self.request_history.lock().unwrap().clear();
    }
}

#[async_trait]
impl ApiExecutor for MockApiExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, NetworkError> {
        self.request_history.lock().unwrap().push(request);

        let queued = self.responses.lock().unwrap().pop_front();
        match queued {
            Some(result) => result,
            None => self.default_response.lock().unwrap().clone().ok_or_else(|| {
                NetworkError::ConnectionFailed {
                    message: "No mock response available".to_string(),
                }
            }),
        }
    }
}

/// Create mock API executor for testing.
pub fn create_mock_executor() -> MockApiExecutor {
    MockApiExecutor::new()
}
