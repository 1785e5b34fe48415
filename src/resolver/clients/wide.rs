// General-purpose resolver client
//
// One endpoint for every platform, backed by an extractor farm
// upstream. Broadest coverage, but slower and less reliable per
// platform than the routed endpoints.

use async_trait::async_trait;
use serde_json::Value;

use crate::resolver::errors::ResolveError;
use crate::resolver::models::{Backend, ResolverConfig};
use crate::resolver::traits::ResolverClient;

pub struct WideClient {
    base: String,
    http: reqwest::Client,
}

impl WideClient {
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_http(config, crate::resolver::traits::http_client(config))
    }

    pub(crate) fn with_http(config: &ResolverConfig, http: reqwest::Client) -> Self {
        Self {
            base: config.wide_base.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/resolve", self.base)
    }

    fn fail(&self, reason: impl Into<String>) -> ResolveError {
        ResolveError::BackendFailed {
            backend: self.name(),
            reason: reason.into(),
        }
    }
}

/// Truthy check matching the upstream convention: an `error` field that
/// is absent, null, false, or an empty string means no error.
fn has_error(payload: &Value) -> bool {
    match &payload["error"] {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(message) => !message.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

#[async_trait]
impl ResolverClient for WideClient {
    fn name(&self) -> &'static str {
        "wide"
    }

    fn backend(&self) -> Backend {
        Backend::Wide
    }

    async fn fetch(&self, url: &str) -> Result<Value, ResolveError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| self.fail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fail(format!("HTTP {}", status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| self.fail(format!("invalid JSON: {}", e)))?;

        if has_error(&payload) {
            let message = payload["error"].as_str().unwrap_or("upstream error");
            return Err(self.fail(message.to_string()));
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> WideClient {
        let config = ResolverConfig::default().with_wide_base(server.uri());
        WideClient::with_http(&config, reqwest::Client::new())
    }

    #[test]
    fn test_error_field_truthiness() {
        assert!(!has_error(&json!({"title": "t"})));
        assert!(!has_error(&json!({"error": null})));
        assert!(!has_error(&json!({"error": ""})));
        assert!(!has_error(&json!({"error": false})));
        assert!(has_error(&json!({"error": "boom"})));
        assert!(has_error(&json!({"error": true})));
    }

    #[tokio::test]
    async fn test_fetch_passes_payload_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resolve"))
            .and(query_param("url", "https://example.com/v"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "clip",
                "url": "https://cdn.example.com/v.mp4"
            })))
            .mount(&server)
            .await;

        let payload = client_for(&server)
            .await
            .fetch("https://example.com/v")
            .await
            .unwrap();
        assert_eq!(payload["title"].as_str(), Some("clip"));
    }

    #[tokio::test]
    async fn test_error_field_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resolve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "unsupported"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch("https://example.com/v")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::BackendFailed { backend: "wide", .. }));
    }

    #[tokio::test]
    async fn test_non_2xx_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resolve"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch("https://example.com/v")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::BackendFailed { .. }));
    }
}
