use std::time::Duration;

use async_trait::async_trait;
use atlassian_mcp_core::error::{SearchError, Service};
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::config::Credentials;
use crate::error::Error;

/// Failure of a single HTTP call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HttpError {
    /// Non-2xx response. `body` is the parsed JSON error body, or the raw text
    /// as a JSON string when it was not JSON.
    #[error("HTTP {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        body: Value,
    },

    /// The request never produced a response (DNS, TLS, timeout...).
    #[error("{0}")]
    Transport(String),
}

impl HttpError {
    pub fn into_search_error(self, service: Service) -> SearchError {
        match self {
            HttpError::Status {
                status,
                reason,
                body,
            } => SearchError::upstream(service, status, &body, &reason),
            HttpError::Transport(message) => SearchError::Transport { service, message },
        }
    }
}

/// Authenticated JSON-over-HTTP access to one Atlassian site. Paths are
/// relative to the site root, e.g. `/rest/api/3/search`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HttpError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, HttpError>;
}

/// [`HttpClient`] backed by `reqwest` with Basic Auth.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestClient {
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, Error> {
        let auth_string = format!("{}:{}", credentials.email, credentials.api_token);
        let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {auth_encoded}"))
                .map_err(|e| Error::HttpClient(format!("invalid header value: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: credentials.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, HttpError> {
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(HttpError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| HttpError::Transport(format!("response is not valid JSON: {e}")))
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HttpError> {
        log::debug!("GET {path} {params:?}");
        self.send(self.client.get(self.url(path)).query(params)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        log::debug!("POST {path}");
        self.send(self.client.post(self.url(path)).json(&body)).await
    }
}

#[cfg(test)]
pub mod mock {
    //! In-memory [`HttpClient`] that records requests and replays canned
    //! responses in order.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Request {
        Get {
            path: String,
            params: Vec<(String, String)>,
        },
        Post {
            path: String,
            body: Value,
        },
    }

    impl Request {
        pub fn path(&self) -> &str {
            match self {
                Request::Get { path, .. } | Request::Post { path, .. } => path,
            }
        }

        pub fn param(&self, name: &str) -> Option<&str> {
            match self {
                Request::Get { params, .. } => params
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.as_str()),
                Request::Post { .. } => None,
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct MockClient {
        responses: Mutex<VecDeque<Result<Value, HttpError>>>,
        requests: Mutex<Vec<Request>>,
    }

    impl MockClient {
        pub fn new(responses: Vec<Result<Value, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        fn next(&self, request: Request) -> Result<Value, HttpError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::Transport("no canned response".to_string())))
        }
    }

    #[async_trait]
    impl HttpClient for MockClient {
        async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HttpError> {
            self.next(Request::Get {
                path: path.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            })
        }

        async fn post(&self, path: &str, body: Value) -> Result<Value, HttpError> {
            self.next(Request::Post {
                path: path.to_string(),
                body,
            })
        }
    }
}
