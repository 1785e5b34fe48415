// Platform-routed resolver client
//
// Dedicated endpoint per platform, selected by hostname. Faster and
// more reliable than the wide resolver where a route exists; unmatched
// hosts fall through to the generic meta endpoint, which may itself
// fail.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::resolver::errors::ResolveError;
use crate::resolver::models::{Backend, ResolverConfig};
use crate::resolver::traits::ResolverClient;

/// Host-suffix to endpoint-path routing, tried in order. First match
/// wins.
const ROUTES: &[(&[&str], &str)] = &[
    (&["instagram.com", "facebook.com"], "meta"),
    (&["tiktok.com"], "tiktok"),
    (&["youtube.com", "youtu.be"], "youtube"),
    (&["twitter.com", "x.com"], "twitter"),
    (&["pinterest.com", "pin.it"], "pinterest"),
    (&["reddit.com"], "reddit"),
    (&["soundcloud.com"], "soundcloud"),
    (&["spotify.com"], "spotify"),
    (&["threads.net"], "threads"),
    (&["tumblr.com"], "tumblr"),
    (&["linkedin.com"], "linkedin"),
    (&["douyin.com"], "douyin"),
    (&["kuaishou.com"], "kuaishou"),
    (&["bsky.app"], "bluesky"),
    (&["capcut.com"], "capcut"),
    (&["dailymotion.com"], "dailymotion"),
    (&["snapchat.com"], "snapchat"),
    (&["terabox.com"], "terabox"),
];

/// Generic endpoint used when no route matches
const FALLBACK_ROUTE: &str = "meta";

/// Pick the endpoint path for a target URL by hostname suffix
pub fn route_for(target: &str) -> &'static str {
    let host = match Url::parse(target).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
        Some(host) => host,
        None => return FALLBACK_ROUTE,
    };

    for (hosts, path) in ROUTES {
        let matched = hosts
            .iter()
            .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)));
        if matched {
            return path;
        }
    }
    FALLBACK_ROUTE
}

pub struct PlatformClient {
    base: String,
    http: reqwest::Client,
}

impl PlatformClient {
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_http(config, crate::resolver::traits::http_client(config))
    }

    pub(crate) fn with_http(config: &ResolverConfig, http: reqwest::Client) -> Self {
        Self {
            base: config.platform_base.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn endpoint(&self, target: &str) -> String {
        format!("{}/api/{}/download", self.base, route_for(target))
    }

    fn fail(&self, reason: impl Into<String>) -> ResolveError {
        ResolveError::BackendFailed {
            backend: self.name(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ResolverClient for PlatformClient {
    fn name(&self) -> &'static str {
        "platform"
    }

    fn backend(&self) -> Backend {
        Backend::Platform
    }

    async fn fetch(&self, url: &str) -> Result<Value, ResolveError> {
        let response = self
            .http
            .get(self.endpoint(url))
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

        if payload["success"].as_bool() != Some(true) {
            return Err(self.fail("success flag not set"));
        }
        match payload.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(self.fail("response has no data")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_routing_by_hostname() {
        assert_eq!(route_for("https://www.tiktok.com/@u/video/1"), "tiktok");
        assert_eq!(route_for("https://youtu.be/abc123"), "youtube");
        assert_eq!(route_for("https://x.com/u/status/1"), "twitter");
        assert_eq!(route_for("https://www.instagram.com/reel/xyz/"), "meta");
        assert_eq!(route_for("https://bsky.app/profile/u/post/1"), "bluesky");
    }

    #[test]
    fn test_unmatched_host_uses_generic_route() {
        assert_eq!(route_for("https://example.org/video/1"), FALLBACK_ROUTE);
        assert_eq!(route_for("not a url"), FALLBACK_ROUTE);
    }

    #[test]
    fn test_routing_matches_suffix_not_substring() {
        // evil-tiktok.com.example.com must not hit the tiktok route
        assert_eq!(route_for("https://tiktok.com.evil.example/v"), FALLBACK_ROUTE);
        assert_eq!(route_for("https://sub.reddit.com/r/x"), "reddit");
    }

    #[tokio::test]
    async fn test_fetch_unwraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tiktok/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"links": [{"url": "https://cdn.example.com/v.mp4"}]}
            })))
            .mount(&server)
            .await;

        let config = ResolverConfig::default().with_platform_base(server.uri());
        let client = PlatformClient::with_http(&config, reqwest::Client::new());
        let data = client
            .fetch("https://www.tiktok.com/@u/video/1")
            .await
            .unwrap();
        assert!(data["links"].is_array());
    }

    #[tokio::test]
    async fn test_success_false_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/meta/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let config = ResolverConfig::default().with_platform_base(server.uri());
        let client = PlatformClient::with_http(&config, reqwest::Client::new());
        let err = client.fetch("https://example.org/v").await.unwrap_err();
        assert!(matches!(err, ResolveError::BackendFailed { backend: "platform", .. }));
    }
}
