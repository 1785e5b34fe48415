// Canonical media model shared across backends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions treated as still images (no audio/video track expected)
pub const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A single downloadable rendition of resolved media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFormat {
    /// Human-readable quality label (e.g. "1080p", "720p (No Audio)")
    pub label: String,
    /// Direct media URL
    pub url: String,
    /// File extension without the dot (mp4, mp3, jpg)
    pub ext: String,
    pub has_audio: bool,
    pub has_video: bool,
    /// Size in bytes when the backend reports one
    pub filesize: Option<u64>,
}

impl MediaFormat {
    pub fn is_image(&self) -> bool {
        IMAGE_EXTS.contains(&self.ext.as_str())
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    pub fn is_video_only(&self) -> bool {
        self.has_video && !self.has_audio
    }

    /// Size formatted for a selector list ("12.3 MB"), if known
    pub fn size_display(&self) -> Option<String> {
        self.filesize
            .map(|bytes| format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0))
    }
}

/// Canonical resolution result, independent of which backend produced it.
///
/// `formats` preserves backend order; the first element is the default
/// selection (backends are assumed to list their best option first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub title: String,
    pub thumbnail: Option<String>,
    pub source_url: String,
    pub formats: Vec<MediaFormat>,
}

impl ResolvedMedia {
    /// Default selection: first format in backend order
    pub fn default_format(&self) -> Option<&MediaFormat> {
        self.formats.first()
    }
}

/// Tag identifying which upstream resolver produced a raw payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// General-purpose single-endpoint resolver
    Wide,
    /// Per-platform routed endpoints
    Platform,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wide => write!(f, "wide"),
            Self::Platform => write!(f, "platform"),
        }
    }
}

/// Orchestration mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// General-purpose resolver only, no fallback
    Wide,
    /// Platform-routed endpoints only, no fallback
    Platform,
    /// Wide first, platform endpoints as fallback
    #[default]
    Auto,
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wide => write!(f, "wide"),
            Self::Platform => write!(f, "platform"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Configuration for the resolver clients
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the general-purpose resolver
    pub wide_base: String,
    /// Base URL of the platform-routed endpoint set
    pub platform_base: String,
    /// Request timeout in seconds. None means no deadline; callers
    /// needing bounded latency set one here.
    pub timeout_seconds: Option<u64>,
    /// User agent sent with every upstream request
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            wide_base: "https://server2.luonghiii.id.vn".to_string(),
            platform_base: "https://api1.luonghiii.id.vn".to_string(),
            timeout_seconds: None,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/121.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn with_wide_base(mut self, base: impl Into<String>) -> Self {
        self.wide_base = base.into();
        self
    }

    pub fn with_platform_base(mut self, base: impl Into<String>) -> Self {
        self.platform_base = base.into();
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_format(ext: &str) -> MediaFormat {
        MediaFormat {
            label: "720p".to_string(),
            url: "https://cdn.example.com/v.mp4".to_string(),
            ext: ext.to_string(),
            has_audio: true,
            has_video: true,
            filesize: None,
        }
    }

    #[test]
    fn test_image_detection_by_extension() {
        assert!(video_format("jpg").is_image());
        assert!(video_format("webp").is_image());
        assert!(!video_format("mp4").is_image());
    }

    #[test]
    fn test_size_display_in_megabytes() {
        let mut f = video_format("mp4");
        f.filesize = Some(12_900_000);
        assert_eq!(f.size_display().as_deref(), Some("12.3 MB"));
        f.filesize = None;
        assert_eq!(f.size_display(), None);
    }

    #[test]
    fn test_default_format_is_first() {
        let media = ResolvedMedia {
            title: "clip".to_string(),
            thumbnail: None,
            source_url: "https://example.com/watch".to_string(),
            formats: vec![video_format("mp4"), video_format("webm")],
        };
        assert_eq!(media.default_format().map(|f| f.ext.as_str()), Some("mp4"));
    }

    #[test]
    fn test_mode_display_and_default() {
        assert_eq!(ResolveMode::default(), ResolveMode::Auto);
        assert_eq!(ResolveMode::Wide.to_string(), "wide");
        assert_eq!(ResolveMode::Auto.to_string(), "auto");
    }
}
