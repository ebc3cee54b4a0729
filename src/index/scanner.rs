use crate::config::SnippetsConfig;
use crate::error::{Error, Result};
use crate::path_utils::snippet_id;
use crate::types::SnippetRecord;
use ignore::WalkBuilder;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Directory-listing collaborator of the indexer.
pub trait SnippetSource: Send + Sync + 'static {
    /// Snippet entries as `(id, path)` in listing order.
    fn list(&self) -> Result<Vec<(String, PathBuf)>>;

    fn load(&self, id: String, path: PathBuf) -> SnippetRecord;
}

#[derive(Debug, Clone)]
pub struct DirectorySource {
    directory: PathBuf,
    extension: String,
    preview_max_chars: usize,
}

impl DirectorySource {
    pub fn new(config: &SnippetsConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            extension: config.extension.clone(),
            preview_max_chars: config.preview_max_chars,
        }
    }
}

impl SnippetSource for DirectorySource {
    fn list(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.directory.is_dir() {
            return Err(Error::InvalidPath(self.directory.display().to_string()));
        }

        let walker = WalkBuilder::new(&self.directory)
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .follow_links(true)
            .sort_by_file_name(std::cmp::Ord::cmp)
            .build();

        let mut entries = Vec::with_capacity(64);
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("SCAN_WALK: skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            if let Some(id) = snippet_id(entry.path(), &self.extension) {
                entries.push((id, entry.into_path()));
            }
        }

        Ok(entries)
    }

    fn load(&self, id: String, path: PathBuf) -> SnippetRecord {
        SnippetRecord::load(id, path, self.preview_max_chars)
    }
}

#[derive(Debug)]
pub enum ScanOutcome {
    Completed(Vec<SnippetRecord>),
    Cancelled { processed: usize },
}

/// Builds every record `source` lists. `cancel` is polled before each file;
/// once it is set the partial result is dropped.
pub fn scan_snippets(source: &dyn SnippetSource, cancel: &AtomicBool) -> ScanOutcome {
    let scan_start = std::time::Instant::now();

    let entries = match source.list() {
        Ok(entries) => entries,
        Err(e) => {
            warn!("SCAN_LIST: listing failed, indexing nothing: {}", e);
            return ScanOutcome::Completed(Vec::new());
        }
    };
    debug!("SCAN_LIST: {} snippet files listed", entries.len());

    let mut records = Vec::with_capacity(entries.len());
    for (id, path) in entries {
        if cancel.load(Ordering::Acquire) {
            info!(
                "SCAN_CANCEL: abandoning scan after {} files ({:?})",
                records.len(),
                scan_start.elapsed()
            );
            return ScanOutcome::Cancelled {
                processed: records.len(),
            };
        }
        records.push(source.load(id, path));
    }

    if cancel.load(Ordering::Acquire) {
        return ScanOutcome::Cancelled {
            processed: records.len(),
        };
    }

    debug!(
        "SCAN_TIMING: built {} records in {:?}",
        records.len(),
        scan_start.elapsed()
    );
    ScanOutcome::Completed(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn source_for(dir: &std::path::Path) -> DirectorySource {
        DirectorySource::new(&SnippetsConfig::new(dir))
    }

    fn completed(outcome: ScanOutcome) -> Vec<SnippetRecord> {
        match outcome {
            ScanOutcome::Completed(records) => records,
            ScanOutcome::Cancelled { processed } => panic!("cancelled after {processed}"),
        }
    }

    #[test]
    fn test_list_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("notes.md"), "md").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "h").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("nested.txt"), "n").unwrap();
        fs::create_dir(dir.path().join("dir.txt")).unwrap();

        let ids: Vec<_> = source_for(dir.path())
            .list()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let source = source_for(&dir.path().join("gone"));
        assert!(matches!(source.list(), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_scan_builds_previews() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello world").unwrap();
        let long = "z".repeat(140);
        fs::write(dir.path().join("b.txt"), &long).unwrap();

        let records = completed(scan_snippets(&source_for(dir.path()), &AtomicBool::new(false)));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "a");
        assert_eq!(records[0].preview(), "hello world");
        assert_eq!(records[1].id(), "b");
        assert_eq!(records[1].preview(), format!("{} …", "z".repeat(100)));
        assert_eq!(records[1].indexed_path(), dir.path().join("b.txt").as_path());
    }

    #[test]
    fn test_scan_missing_directory_yields_empty_result() {
        let dir = tempdir().unwrap();
        let source = source_for(&dir.path().join("gone"));
        let records = completed(scan_snippets(&source, &AtomicBool::new(false)));
        assert!(records.is_empty());
    }

    /// Raises the cancel flag right after the first file has been read.
    struct CancelAfterFirst {
        inner: DirectorySource,
        cancel: Arc<AtomicBool>,
    }

    impl SnippetSource for CancelAfterFirst {
        fn list(&self) -> Result<Vec<(String, PathBuf)>> {
            self.inner.list()
        }

        fn load(&self, id: String, path: PathBuf) -> SnippetRecord {
            let record = self.inner.load(id, path);
            self.cancel.store(true, Ordering::Release);
            record
        }
    }

    #[test]
    fn test_scan_cancelled_between_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let cancel = Arc::new(AtomicBool::new(false));
        let source = CancelAfterFirst {
            inner: source_for(dir.path()),
            cancel: Arc::clone(&cancel),
        };

        match scan_snippets(&source, &cancel) {
            ScanOutcome::Cancelled { processed } => assert_eq!(processed, 1),
            ScanOutcome::Completed(records) => panic!("expected cancel, got {records:?}"),
        }
    }
}
