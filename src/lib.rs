//! linkgrab - resolve social share links into directly downloadable media
//!
//! The resolver orchestrates two heterogeneous upstream services (a
//! general-purpose extractor and a set of per-platform endpoints),
//! normalizes their divergent JSON shapes into one canonical format
//! list, keeps a bounded deduplicated history of successful
//! resolutions, and executes downloads with a direct-save strategy
//! plus an open-externally fallback.

pub mod download;
pub mod history;
pub mod resolver;
pub mod storage;

pub use download::{DownloadExecutor, DownloadOutcome, StatusMessage, STATUS_WINDOW};
pub use history::{History, HistoryEntry, HISTORY_LIMIT};
pub use resolver::{
    Backend, MediaFormat, ResolveError, ResolveMode, ResolvedMedia, Resolver, ResolverClient,
    ResolverConfig,
};
pub use storage::{BlobStore, FileStore, MemoryStore};
