//! Filter list sources
//!
//! A feed turns a source identifier from the configuration into list text.
//! Retrieval over the network is out of scope; the embedder supplies its
//! own feed if it needs one.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("unknown filter source '{0}'")]
    UnknownSource(String),
    #[error("failed to read '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait FilterFeed: Send + Sync + 'static {
    /// Fetch the full text of one list.
    fn fetch(&self, id: &str) -> impl Future<Output = Result<String, FeedError>> + Send;
}

/// Reads lists from the local filesystem. Identifiers are paths or
/// `file://` URIs, optionally resolved against a base directory.
#[derive(Debug, Clone, Default)]
pub struct FileFeed {
    base: Option<PathBuf>,
}

impl FileFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = PathBuf::from(id.strip_prefix("file://").unwrap_or(id));
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl FilterFeed for FileFeed {
    async fn fetch(&self, id: &str) -> Result<String, FeedError> {
        let path = self.resolve(id);
        let bytes = tokio::fs::read(&path).await.map_err(|source| FeedError::Io {
            id: id.to_string(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// In-memory lists keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    lists: HashMap<String, String>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, id: &str, text: &str) -> Self {
        self.insert(id, text);
        self
    }

    pub fn insert(&mut self, id: &str, text: &str) {
        self.lists.insert(id.to_string(), text.to_string());
    }
}

impl FilterFeed for MemoryFeed {
    async fn fetch(&self, id: &str) -> Result<String, FeedError> {
        self.lists
            .get(id)
            .cloned()
            .ok_or_else(|| FeedError::UnknownSource(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_feed() {
        let feed = MemoryFeed::new().with_list("easylist", "||ads.com^\n");
        assert_eq!(feed.fetch("easylist").await.unwrap(), "||ads.com^\n");
        assert!(matches!(
            feed.fetch("missing").await,
            Err(FeedError::UnknownSource(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_file_feed() {
        let dir = std::env::temp_dir().join(format!("sigblock-feed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("list.txt"), "##.ad\n").unwrap();

        let feed = FileFeed::with_base(&dir);
        assert_eq!(feed.fetch("list.txt").await.unwrap(), "##.ad\n");

        let uri = format!("file://{}", dir.join("list.txt").display());
        assert_eq!(FileFeed::new().fetch(&uri).await.unwrap(), "##.ad\n");

        assert!(matches!(feed.fetch("nope.txt").await, Err(FeedError::Io { .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
