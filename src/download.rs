// Download execution - direct save with an open-externally fallback
//
// Strategy 1 fetches the media into memory and writes it to disk under
// the suggested name. When the fetch is blocked (network error,
// non-2xx), strategy 2 hands the raw URL to the system handler and
// lets the OS deal with saving. Strategy 2 is best-effort; its own
// failure is not detected.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::resolver::models::MediaFormat;

/// How long a transient status message stays on screen
pub const STATUS_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Fetched and written to disk
    Saved(PathBuf),
    /// Direct fetch failed; the URL was handed to the system handler
    OpenedExternally,
    /// A download is already pending; nothing was fetched
    AlreadyInFlight,
    /// Neither strategy could start
    Failed(String),
}

impl DownloadOutcome {
    /// Transient status line for this outcome
    pub fn status(&self) -> StatusMessage {
        let text = match self {
            Self::Saved(path) => format!("Saved {}", path.display()),
            Self::OpenedExternally => "Opened in your browser to finish saving.".to_string(),
            Self::AlreadyInFlight => "A download is already in progress.".to_string(),
            Self::Failed(reason) => format!("Download failed: {}", reason),
        };
        StatusMessage::new(text)
    }
}

/// Status line with a fixed display window. UX affordance, not a
/// correctness mechanism.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    shown_at: Instant,
}

impl StatusMessage {
    fn new(text: String) -> Self {
        Self {
            text,
            shown_at: Instant::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < STATUS_WINDOW
    }
}

#[derive(Debug, Error)]
enum FetchError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Fetch(e.to_string())
    }
}

pub struct DownloadExecutor {
    http: reqwest::Client,
    output_dir: PathBuf,
    in_flight: AtomicBool,
}

impl DownloadExecutor {
    /// Executor saving into the user's download directory
    pub fn new() -> Self {
        let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_output_dir(dir)
    }

    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            http: reqwest::Client::new(),
            output_dir: dir.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Download a chosen format under `suggested_title`.
    ///
    /// One download at a time: a call made while another is pending is
    /// a no-op, not a queue.
    pub async fn download(&self, format: &MediaFormat, suggested_title: &str) -> DownloadOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return DownloadOutcome::AlreadyInFlight;
        }

        let outcome = self.run(format, suggested_title).await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run(&self, format: &MediaFormat, suggested_title: &str) -> DownloadOutcome {
        // The extension comes from backend payloads, so the whole
        // composed name goes through the filter, not just the title.
        let filename = sanitize_filename(&format!("{}.{}", suggested_title, format.ext));
        match self.fetch_and_save(&format.url, &filename).await {
            Ok(path) => {
                debug!(path = %path.display(), "saved directly");
                DownloadOutcome::Saved(path)
            }
            Err(e) => {
                warn!(error = %e, "direct save failed, opening externally");
                match open_external(&format.url) {
                    Ok(()) => DownloadOutcome::OpenedExternally,
                    Err(open_err) => DownloadOutcome::Failed(open_err.to_string()),
                }
            }
        }
    }

    /// Strategy 1: whole body into memory, then temp file + atomic
    /// rename under the final name.
    async fn fetch_and_save(&self, url: &str, filename: &str) -> Result<PathBuf, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Fetch(format!("HTTP {}", status)));
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(filename);
        let temp = self.output_dir.join(format!("{}.part", filename));
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &path).await?;
        Ok(path)
    }
}

impl Default for DownloadExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy 2: hand the URL to the OS handler
fn open_external(url: &str) -> std::io::Result<()> {
    use std::process::Command;

    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    command.spawn().map(|_| ())
}

/// Strip path separators and control characters so the name cannot
/// leave the output directory
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}
