//! Filesystem sink
//!
//! Writes each item to `<dir>/<id>.json` via a temp file and rename, so a
//! crash mid-write never leaves a half-written record file that a later
//! run would mistake for a complete one.

use crate::catalog::CrawlItem;
use crate::sink::traits::{Sink, SinkResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Sink that writes one pretty-printed JSON file per item
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Creates the sink, making the target directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(FileSink { dir })
    }

    /// Final path an item is written to
    pub fn item_path(&self, item: &CrawlItem) -> PathBuf {
        self.dir.join(format!("{}.json", item.file_stem()))
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn persist(&mut self, item: &CrawlItem) -> SinkResult<()> {
        let serialized = serde_json::to_vec_pretty(&item.payload)?;
        let path = self.item_path(item);
        let temp = path.with_extension("json.tmp");

        tokio::fs::write(&temp, &serialized).await?;
        tokio::fs::rename(&temp, &path).await?;

        tracing::trace!(id = %item.id, path = %path.display(), "persisted item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PageLocator;
    use tempfile::TempDir;

    fn item(id: &str) -> CrawlItem {
        CrawlItem {
            id: id.to_string(),
            payload: serde_json::json!({"id": id, "title": "A Work"}),
            source: PageLocator::first_page(),
        }
    }

    #[tokio::test]
    async fn test_persist_writes_payload_file() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path()).unwrap();

        sink.persist(&item("W42")).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("W42.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["id"], "W42");
    }

    #[tokio::test]
    async fn test_persist_same_id_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path()).unwrap();

        sink.persist(&item("W42")).await.unwrap();
        sink.persist(&item("W42")).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path()).unwrap();

        sink.persist(&item("W1")).await.unwrap();
        sink.persist(&item("W2")).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| n.ends_with(".json")), "{:?}", names);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        assert!(FileSink::new(&nested).is_ok());
        assert!(nested.is_dir());
    }
}
