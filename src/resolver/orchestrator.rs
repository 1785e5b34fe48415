// Resolution orchestrator - mode dispatch and backend fallback
//
// Auto mode tries the wide resolver first (broadest coverage), then
// the platform-routed endpoints. Strictly sequential: a platform call
// is never spent when the wide resolver already answered, and history
// is recorded at most once per resolution.

use tracing::{debug, warn};

use super::clients::{PlatformClient, WideClient};
use super::errors::ResolveError;
use super::models::{ResolveMode, ResolvedMedia, ResolverConfig};
use super::normalize::normalize;
use super::traits::{http_client, ResolverClient};
use crate::history::History;

/// Extract the first http(s) URL embedded in free text.
///
/// Share sheets routinely wrap the link in extra words; the matched
/// substring is used byte-for-byte.
pub fn extract_url(input: &str) -> Option<&str> {
    lazy_static::lazy_static! {
        static ref URL_RE: regex::Regex = regex::Regex::new(r"https?://\S+").unwrap();
    }
    URL_RE.find(input).map(|m| m.as_str())
}

pub struct Resolver {
    wide: WideClient,
    platform: PlatformClient,
    history: History,
}

impl Resolver {
    pub fn new(config: ResolverConfig, history: History) -> Self {
        let http = http_client(&config);
        Self {
            wide: WideClient::with_http(&config, http.clone()),
            platform: PlatformClient::with_http(&config, http),
            history,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Resolve `raw_input` into canonical media per `mode`.
    ///
    /// Pinned modes make exactly one upstream call. Auto falls back to
    /// the platform endpoints when the wide resolver fails or comes
    /// back empty. Successful resolutions are appended to history;
    /// failed ones leave it untouched.
    pub async fn resolve(
        &mut self,
        raw_input: &str,
        mode: ResolveMode,
    ) -> Result<ResolvedMedia, ResolveError> {
        let url = extract_url(raw_input)
            .ok_or(ResolveError::NoUrlFound)?
            .to_string();
        debug!(%mode, %url, "resolving");

        let result = match mode {
            ResolveMode::Wide => self.attempt(&self.wide, &url).await,
            ResolveMode::Platform => self.attempt(&self.platform, &url).await,
            ResolveMode::Auto => match self.attempt(&self.wide, &url).await {
                Ok(media) => Ok(media),
                Err(e) => {
                    warn!(error = %e, "wide resolver failed, trying platform endpoints");
                    self.attempt(&self.platform, &url).await
                }
            },
        };

        match result {
            Ok(media) => {
                // Resolution already succeeded; a persistence hiccup
                // must not fail it.
                if let Err(e) = self.history.record_resolution(&media) {
                    warn!(error = %e, "failed to persist history entry");
                }
                Ok(media)
            }
            Err(e) => Err(e.into_terminal()),
        }
    }

    async fn attempt(
        &self,
        client: &dyn ResolverClient,
        url: &str,
    ) -> Result<ResolvedMedia, ResolveError> {
        debug!(backend = client.name(), "querying backend");
        let payload = client.fetch(url).await?;
        let media = normalize(&payload, client.backend(), url)?;
        debug!(
            backend = client.name(),
            formats = media.formats.len(),
            "backend produced a result"
        );
        Ok(media)
    }
}
