// Bounded, deduplicated history of successful resolutions
//
// The cache exclusively owns its persisted representation: one JSON
// array blob under a single key, always read and rewritten whole.

use serde::{Deserialize, Serialize};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::warn;

use crate::resolver::models::ResolvedMedia;
use crate::storage::BlobStore;

/// Most recent entries kept after every insertion
pub const HISTORY_LIMIT: usize = 20;

const HISTORY_KEY: &str = "history";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, time-derived id
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub source_url: String,
    /// Unix milliseconds
    pub created_at: i64,
}

/// Tiebreaker for ids minted in the same instant
static ID_SEQ: AtomicU64 = AtomicU64::new(0);

impl HistoryEntry {
    fn from_media(media: &ResolvedMedia) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: format!(
                "{}-{}",
                now.unix_timestamp_nanos(),
                ID_SEQ.fetch_add(1, Ordering::Relaxed)
            ),
            title: media.title.clone(),
            thumbnail: media.thumbnail.clone(),
            source_url: media.source_url.clone(),
            created_at: (now.unix_timestamp_nanos() / 1_000_000) as i64,
        }
    }
}

pub struct History {
    store: Box<dyn BlobStore>,
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Open the history backed by `store`. A corrupt blob is treated
    /// as an empty history, never an error.
    pub fn new(store: Box<dyn BlobStore>) -> Self {
        let entries = match store.load(HISTORY_KEY) {
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "history blob corrupt, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self { store, entries }
    }

    /// Append one successful resolution: dedup by source URL, prepend,
    /// truncate to the most recent `HISTORY_LIMIT`.
    pub fn record(&mut self, entry: HistoryEntry) -> io::Result<()> {
        self.entries
            .retain(|existing| existing.source_url != entry.source_url);
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
        self.persist()
    }

    pub fn record_resolution(&mut self, media: &ResolvedMedia) -> io::Result<()> {
        self.record(HistoryEntry::from_media(media))
    }

    /// Most recent first
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn remove(&mut self, id: &str) -> io::Result<()> {
        self.entries.retain(|entry| entry.id != id);
        self.persist()
    }

    /// Unconditional. Confirmation is the caller's concern.
    pub fn clear(&mut self) -> io::Result<()> {
        self.entries.clear();
        self.store.delete(HISTORY_KEY)
    }

    fn persist(&mut self) -> io::Result<()> {
        let blob = serde_json::to_string(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.store.save(HISTORY_KEY, &blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn entry(id: &str, source_url: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            title: format!("clip {}", id),
            thumbnail: None,
            source_url: source_url.to_string(),
            created_at: 1_700_000_000_000,
        }
    }

    fn empty_history() -> History {
        History::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_record_prepends() {
        let mut history = empty_history();
        history.record(entry("1", "https://a.example.com")).unwrap();
        history.record(entry("2", "https://b.example.com")).unwrap();
        let ids: Vec<_> = history.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn test_dedup_by_source_moves_to_front() {
        let mut history = empty_history();
        history.record(entry("1", "https://a.example.com")).unwrap();
        history.record(entry("2", "https://b.example.com")).unwrap();
        history.record(entry("3", "https://a.example.com")).unwrap();

        assert_eq!(history.list().len(), 2);
        assert_eq!(history.list()[0].id, "3");
        let sources: Vec<_> = history.list().iter().map(|e| &e.source_url).collect();
        assert_eq!(sources.len(), 2);
        assert_ne!(sources[0], sources[1]);
    }

    #[test]
    fn test_truncated_to_limit() {
        let mut history = empty_history();
        for i in 0..(HISTORY_LIMIT + 5) {
            history
                .record(entry(&i.to_string(), &format!("https://example.com/{}", i)))
                .unwrap();
        }
        assert_eq!(history.list().len(), HISTORY_LIMIT);
        // Most recent survived
        assert_eq!(history.list()[0].id, (HISTORY_LIMIT + 4).to_string());
    }

    #[test]
    fn test_remove_by_id() {
        let mut history = empty_history();
        history.record(entry("1", "https://a.example.com")).unwrap();
        history.record(entry("2", "https://b.example.com")).unwrap();
        history.remove("1").unwrap();
        assert_eq!(history.list().len(), 1);
        assert_eq!(history.list()[0].id, "2");
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut history = empty_history();
        history.record(entry("1", "https://a.example.com")).unwrap();
        history.clear().unwrap();
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let mut store = MemoryStore::new();
        {
            let mut history = History::new(Box::new(MemoryStore::new()));
            history.record(entry("1", "https://a.example.com")).unwrap();
            // Copy the blob into the outer store to simulate reopening
            // the same backing file.
            store
                .save(HISTORY_KEY, &history.store.load(HISTORY_KEY).unwrap())
                .unwrap();
        }
        let reopened = History::new(Box::new(store));
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.list()[0].source_url, "https://a.example.com");
    }

    #[test]
    fn test_corrupt_blob_resets_to_empty() {
        let mut store = MemoryStore::new();
        store.save(HISTORY_KEY, "{not json").unwrap();
        let history = History::new(Box::new(store));
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_entry_from_media_copies_fields() {
        let media = ResolvedMedia {
            title: "clip".to_string(),
            thumbnail: Some("https://cdn.example.com/t.jpg".to_string()),
            source_url: "https://a.example.com".to_string(),
            formats: Vec::new(),
        };
        let entry = HistoryEntry::from_media(&media);
        assert_eq!(entry.title, "clip");
        assert_eq!(entry.source_url, media.source_url);
        assert!(!entry.id.is_empty());
        assert!(entry.created_at > 0);
    }

    #[test]
    fn test_ids_distinct_even_in_the_same_instant() {
        let media = ResolvedMedia {
            title: "clip".to_string(),
            thumbnail: None,
            source_url: "https://a.example.com".to_string(),
            formats: Vec::new(),
        };
        // Minted back to back; a shared clock reading must not yield
        // colliding ids.
        let a = HistoryEntry::from_media(&media);
        let b = HistoryEntry::from_media(&media);
        assert_ne!(a.id, b.id);
    }
}
