use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Maximum number of entries retained per output feed
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Per-request timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Maximum number of sources fetched in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    pub sources: Vec<SourceConfig>,
}

fn default_max_entries() -> usize {
    50
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_concurrency() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub id: String,
    pub url: String,
    pub output: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl SourceConfig {
    /// Channel title for the output feed; falls back to the source id.
    pub fn channel_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Channel link for the output feed; falls back to the source URL.
    pub fn channel_link(&self) -> &str {
        self.link.as_deref().unwrap_or(&self.url)
    }

    pub fn channel_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Latest entries from {}", self.channel_title()))
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
