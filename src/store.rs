//! Reading and writing the per-source RSS output files.
//!
//! Output files are the long-term memory of the engine: each run loads the
//! prior document, merges fresh entries into it, and writes the result back
//! atomically. A file that does not exist yet simply means first run.

use std::fs;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use rss::{Channel, Guid, Item};
use thiserror::Error;
use tracing::warn;

use crate::config::SourceConfig;
use crate::feed::{Entry, FeedDocument};

/// Errors writing one source's output file. Recovered at the per-source
/// boundary like fetch errors.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] rss::Error),
}

/// Load the previously written output for a source.
///
/// A missing file yields an empty document (first-run bootstrap). A file
/// that exists but is not valid RSS is logged and treated as empty, so a
/// corrupted output heals itself on the next successful run.
pub fn load_existing(path: &Path, source: &SourceConfig) -> FeedDocument {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return FeedDocument::empty(source),
    };

    let channel = match Channel::read_from(BufReader::new(file)) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                "Existing output at {} is not valid RSS, starting fresh: {}",
                path.display(),
                e
            );
            return FeedDocument::empty(source);
        }
    };

    document_from_channel(&channel)
}

/// Serialize the document to RSS 2.0 and write it atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the destination, so a crash mid-write never corrupts the previous file.
pub fn persist(path: &Path, doc: &FeedDocument) -> Result<(), WriteError> {
    let channel = channel_from_document(doc);

    // The rss crate does not emit the XML declaration itself.
    let buf = b"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n".to_vec();
    let mut buf = channel.pretty_write_to(buf, b' ', 2)?;
    buf.push(b'\n');

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &buf)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn document_from_channel(channel: &Channel) -> FeedDocument {
    let entries = channel
        .items()
        .iter()
        .filter_map(|item| {
            let link = item.link().map(String::from);
            let id = item
                .guid()
                .map(|g| g.value().to_string())
                .or_else(|| link.clone())?;

            Some(Entry {
                id,
                title: item.title().unwrap_or("Untitled").to_string(),
                link,
                published: item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
                summary: item.description().map(String::from),
            })
        })
        .collect();

    FeedDocument {
        title: channel.title().to_string(),
        link: channel.link().to_string(),
        description: channel.description().to_string(),
        language: channel.language().map(String::from),
        entries,
    }
}

fn channel_from_document(doc: &FeedDocument) -> Channel {
    let items: Vec<Item> = doc
        .entries
        .iter()
        .map(|entry| {
            let mut guid = Guid::default();
            guid.set_value(entry.id.clone());
            guid.set_permalink(false);

            let mut item = Item::default();
            item.set_guid(guid);
            item.set_title(entry.title.clone());
            item.set_link(entry.link.clone());
            item.set_pub_date(entry.published.map(|dt| dt.to_rfc2822()));
            item.set_description(entry.summary.clone());
            item
        })
        .collect();

    let mut channel = Channel::default();
    channel.set_title(doc.title.clone());
    channel.set_link(doc.link.clone());
    channel.set_description(doc.description.clone());
    channel.set_language(doc.language.clone());
    channel.set_last_build_date(Some(Utc::now().to_rfc2822()));
    channel.set_items(items);
    channel
}
