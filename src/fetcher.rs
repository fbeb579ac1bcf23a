use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::feed::Entry;

/// Errors that can occur while fetching and parsing one source feed.
///
/// All of these are recovered at the per-source boundary: the source is
/// skipped for the run, never fatal to the whole process.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Body could not be parsed as RSS or Atom
    #[error("parse error: {0}")]
    Parse(String),
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        // Several sites return 403 to default library user agents, so
        // identify as a plain feed builder with a product token.
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Feedforge/1.0 (RSS Feed Builder)")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Retrieve and parse one remote feed into normalised entries.
    ///
    /// Handles both RSS 2.0 and Atom; feed-rs selects the format by
    /// inspecting the content.
    pub async fn fetch(&self, url: &str) -> Result<Vec<Entry>, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Network(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        let parsed = parser::parse(&bytes[..]).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(Self::convert_entries(parsed.entries))
    }

    /// Normalise feed-rs entries into [`Entry`] values.
    ///
    /// Pure function (no I/O) so tests can exercise the conversion rules
    /// without hitting the network.
    pub fn convert_entries(entries: Vec<feed_rs::model::Entry>) -> Vec<Entry> {
        entries
            .into_iter()
            .filter_map(|entry| {
                let link = entry.links.first().map(|l| l.href.clone());

                // Identity: guid first, link as fallback. An entry with
                // neither cannot be deduplicated and is dropped.
                let id = if entry.id.trim().is_empty() {
                    match &link {
                        Some(l) => l.clone(),
                        None => {
                            warn!("Skipping entry with no guid and no link");
                            return None;
                        }
                    }
                } else {
                    entry.id.trim().to_string()
                };

                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string());

                let published = entry.published.or(entry.updated);

                let summary = entry
                    .summary
                    .map(|s| s.content)
                    .or_else(|| entry.content.and_then(|c| c.body));

                Some(Entry {
                    id,
                    title,
                    link,
                    published,
                    summary,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use feed_rs::model::{Entry as RawEntry, Link};

    fn raw_entry(id: &str, links: Vec<&str>) -> RawEntry {
        RawEntry {
            id: id.to_string(),
            links: links
                .into_iter()
                .map(|href| Link {
                    href: href.to_string(),
                    rel: None,
                    media_type: None,
                    href_lang: None,
                    title: None,
                    length: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_convert_uses_guid_as_id() {
        let entries = Fetcher::convert_entries(vec![raw_entry(
            "guid-1",
            vec!["https://example.com/post"],
        )]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "guid-1");
        assert_eq!(entries[0].link.as_deref(), Some("https://example.com/post"));
    }

    #[test]
    fn test_convert_falls_back_to_link_when_no_guid() {
        let entries =
            Fetcher::convert_entries(vec![raw_entry("", vec!["https://example.com/post"])]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "https://example.com/post");
    }

    #[test]
    fn test_convert_skips_entry_with_no_identity() {
        let entries = Fetcher::convert_entries(vec![
            raw_entry("", vec![]),
            raw_entry("guid-2", vec![]),
        ]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "guid-2");
        assert!(entries[0].link.is_none());
    }

    #[test]
    fn test_convert_trims_guid_whitespace() {
        let entries = Fetcher::convert_entries(vec![raw_entry("  guid-3  ", vec![])]);
        assert_eq!(entries[0].id, "guid-3");
    }

    #[test]
    fn test_convert_defaults_missing_title() {
        let entries = Fetcher::convert_entries(vec![raw_entry("guid-1", vec![])]);
        assert_eq!(entries[0].title, "Untitled");
    }

    #[test]
    fn test_convert_published_falls_back_to_updated() {
        let updated = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut raw = raw_entry("guid-1", vec![]);
        raw.updated = Some(updated);

        let entries = Fetcher::convert_entries(vec![raw]);
        assert_eq!(entries[0].published, Some(updated));
    }

    #[test]
    fn test_convert_prefers_published_over_updated() {
        let published = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let mut raw = raw_entry("guid-1", vec![]);
        raw.published = Some(published);
        raw.updated = Some(updated);

        let entries = Fetcher::convert_entries(vec![raw]);
        assert_eq!(entries[0].published, Some(published));
    }
}
