//! The in-memory data model for persisted output feeds.
//!
//! An [`Entry`] is one syndication item, normalised from whatever format the
//! source used. A [`FeedDocument`] is the merged, ordered view that gets
//! serialized to one RSS output file per source.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::SourceConfig;

/// A single syndication entry.
///
/// Identity is `id` (the RSS guid, falling back to the item link). Two
/// entries with the same id are the same logical item regardless of drift in
/// the other fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    /// Publication timestamp, used for sorting. `None` sorts after all dated
    /// entries.
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// The persisted output document for one source.
///
/// Entry ids within a document are unique; `merge` maintains that invariant.
/// `lastBuildDate` is deliberately not part of this struct: it is stamped at
/// write time and must not participate in change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: Option<String>,
    pub entries: Vec<Entry>,
}

impl FeedDocument {
    /// An output document with no entries, carrying the channel metadata
    /// configured for `source`. Used for first-run bootstrap.
    pub fn empty(source: &SourceConfig) -> Self {
        Self {
            title: source.channel_title().to_string(),
            link: source.channel_link().to_string(),
            description: source.channel_description(),
            language: source.language.clone(),
            entries: Vec::new(),
        }
    }

    /// Merge freshly fetched entries into this document.
    ///
    /// Set union by entry id: an already-known id keeps the existing entry,
    /// unseen ids are appended. The result is re-sorted newest first (undated
    /// entries last, stable among themselves) and truncated to `max_entries`.
    /// Channel metadata is taken from the current configuration so config
    /// edits propagate to the output.
    pub fn merge(
        &self,
        source: &SourceConfig,
        fetched: Vec<Entry>,
        max_entries: usize,
    ) -> FeedDocument {
        let mut entries = self.entries.clone();
        let mut seen: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();

        for entry in fetched {
            if seen.insert(entry.id.clone()) {
                entries.push(entry);
            }
        }

        // `None < Some(_)`, so comparing b-to-a sorts newest first with
        // undated entries sinking to the bottom. sort_by is stable.
        entries.sort_by(|a, b| b.published.cmp(&a.published));
        entries.truncate(max_entries);

        FeedDocument {
            title: source.channel_title().to_string(),
            link: source.channel_link().to_string(),
            description: source.channel_description(),
            language: source.language.clone(),
            entries,
        }
    }

    /// Structural change check against a merged document.
    ///
    /// The caller persists only when this returns true, which is what keeps
    /// repeated runs from rewriting (and the surrounding automation from
    /// committing) unchanged files.
    pub fn changed(&self, merged: &FeedDocument) -> bool {
        self != merged
    }
}
