use crate::actions::{actions_for, create_snippet, remove_snippet, Action, ActionHost};
use crate::config::SnippetsConfig;
use crate::error::{Error, Result};
use crate::index::{
    BackgroundIndexer, ChangeWatcher, DirectorySource, IndexSnapshot, IndexStore, ScanProgress,
};
use crate::query::QueryEngine;
use crate::store::SnippetStore;
use crate::types::{SearchItem, SearchResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Owns the whole index core for one snippet directory: live store, published
/// index, background indexer, change watcher and query engine.
pub struct SnippetManager {
    config: SnippetsConfig,
    store: SnippetStore,
    index: Arc<IndexStore>,
    indexer: BackgroundIndexer,
    engine: QueryEngine,
    watcher: Option<ChangeWatcher>,
}

impl std::fmt::Debug for SnippetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnippetManager")
            .field("directory", &self.config.directory)
            .field("watching", &self.watcher.is_some())
            .finish_non_exhaustive()
    }
}

impl SnippetManager {
    /// Creates the directory if needed, starts watching it and kicks off the
    /// first indexing run. Returns before that run finishes.
    pub fn new(config: SnippetsConfig) -> Result<Self> {
        // Watch first so changes made during the initial scan still restart it.
        let manager = Self::build(config)?.start_watching()?;
        manager.indexer.restart();
        Ok(manager)
    }

    /// Like [`SnippetManager::new`] but reindexing only happens on explicit
    /// [`SnippetManager::trigger_rescan`] calls.
    pub fn without_watcher(config: SnippetsConfig) -> Result<Self> {
        let manager = Self::build(config)?;
        manager.indexer.restart();
        Ok(manager)
    }

    fn build(config: SnippetsConfig) -> Result<Self> {
        info!(
            "Initializing SnippetManager with directory: {}",
            config.directory.display()
        );

        let store = SnippetStore::new(&config);
        store.ensure_directory()?;
        if !store.directory().is_dir() {
            return Err(Error::InvalidPath(store.directory().display().to_string()));
        }

        let index = Arc::new(IndexStore::new());
        let source = Arc::new(DirectorySource::new(&config));
        let indexer = BackgroundIndexer::spawn(source, Arc::clone(&index))?;
        let engine = QueryEngine::new(&config);

        Ok(Self {
            config,
            store,
            index,
            indexer,
            engine,
            watcher: None,
        })
    }

    fn start_watching(mut self) -> Result<Self> {
        let watcher = ChangeWatcher::start(
            self.store.directory(),
            self.config.debounce,
            self.indexer.restart_handle(),
        )?;
        self.watcher = Some(watcher);
        Ok(self)
    }

    #[inline]
    pub fn config(&self) -> &SnippetsConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.index.current()
    }

    pub fn search(&self, text: &str) -> SearchResult {
        self.engine.query(text, &self.index.current())
    }

    /// Raw launcher input, including the configured trigger.
    pub fn handle_trigger_query(&self, raw: &str) -> SearchResult {
        self.engine
            .handle_trigger_query(raw, &self.config.trigger, &self.index.current())
    }

    pub fn synopsis(&self, text: &str) -> &'static str {
        self.engine.synopsis(text)
    }

    pub fn actions(&self, item: &SearchItem, host: &dyn ActionHost) -> Vec<Action> {
        actions_for(item, host)
    }

    pub fn invoke(&self, action: &Action, host: &dyn ActionHost) {
        action.invoke(&self.store, host);
    }

    /// Creates a snippet from outside a query, e.g. a settings page button.
    /// Empty `text` opens the new file for editing instead of filling it.
    pub fn add_snippet(&self, name: &str, text: &str, host: &dyn ActionHost) {
        create_snippet(&self.store, name, text, host);
    }

    pub fn remove_snippet(&self, file_name: &str, host: &dyn ActionHost) {
        remove_snippet(&self.store, file_name, host);
    }

    /// Same effect as a change notification from the watcher.
    pub fn trigger_rescan(&self) {
        info!("Manual rescan triggered");
        self.indexer.restart();
    }

    #[inline]
    pub fn is_scan_active(&self) -> bool {
        self.indexer.is_scanning()
    }

    pub fn scan_progress(&self) -> ScanProgress {
        self.indexer.scan_progress()
    }

    pub fn wait_for_idle(&self, timeout: Duration) -> bool {
        self.indexer.wait_for_idle(timeout)
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stops watching and joins the indexer thread.
    pub fn shutdown(&mut self) {
        if self.watcher.take().is_some() {
            info!("Stopped watching {}", self.config.directory.display());
        }
        self.indexer.shutdown();
    }
}

impl Drop for SnippetManager {
    fn drop(&mut self) {
        self.shutdown();
        if self.indexer.is_scanning() {
            error!("Indexer still reports a running scan after shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::thread;
    use std::time::Instant;
    use tempfile::tempdir;

    const WAIT: Duration = Duration::from_secs(10);

    #[derive(Default)]
    struct QuietHost {
        warnings: RefCell<Vec<String>>,
    }

    impl ActionHost for QuietHost {
        fn have_paste_support(&self) -> bool {
            false
        }
        fn set_clipboard_text(&self, _text: &str) {}
        fn set_clipboard_text_and_paste(&self, _text: &str) {}
        fn open(&self, _path: &Path) -> std::io::Result<()> {
            Ok(())
        }
        fn question(&self, _text: &str) -> bool {
            true
        }
        fn move_to_trash(&self, path: &Path) -> std::io::Result<()> {
            fs::remove_file(path)
        }
        fn warning(&self, text: &str) {
            self.warnings.borrow_mut().push(text.to_string());
        }
    }

    fn ids(manager: &SnippetManager) -> Vec<String> {
        manager.snapshot().ids().map(str::to_string).collect()
    }

    #[test]
    fn test_creates_directory_and_indexes() {
        let dir = tempdir().unwrap();
        let snippets = dir.path().join("snippets");
        fs::create_dir(&snippets).unwrap();
        fs::write(snippets.join("a.txt"), "hello world").unwrap();
        fs::write(snippets.join("b.txt"), "q".repeat(101)).unwrap();

        let manager = SnippetManager::without_watcher(SnippetsConfig::new(&snippets)).unwrap();
        assert!(manager.wait_for_idle(WAIT));
        assert_eq!(ids(&manager), vec!["a", "b"]);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.get("a").unwrap().preview(), "hello world");
        assert_eq!(
            snapshot.get("b").unwrap().preview(),
            format!("{} …", "q".repeat(100))
        );

        let fresh = dir.path().join("fresh").join("snippets");
        let manager = SnippetManager::without_watcher(SnippetsConfig::new(&fresh)).unwrap();
        assert!(fresh.is_dir());
        assert!(manager.wait_for_idle(WAIT));
        assert!(manager.snapshot().is_empty());
    }

    #[test]
    fn test_removed_snippet_action_fails_gracefully() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "k").unwrap();
        fs::write(dir.path().join("gone.txt"), "g").unwrap();

        let manager = SnippetManager::without_watcher(SnippetsConfig::new(dir.path())).unwrap();
        assert!(manager.wait_for_idle(WAIT));

        let result = manager.search("gone");
        let item = result.items[0].clone();
        assert_eq!(item.as_snippet().map(|r| r.id()), Some("gone"));

        fs::remove_file(dir.path().join("gone.txt")).unwrap();
        manager.trigger_rescan();
        assert!(manager.wait_for_idle(WAIT));
        assert_eq!(ids(&manager), vec!["keep"]);

        let host = QuietHost::default();
        for action in manager.actions(&item, &host) {
            manager.invoke(&action, &host);
        }
        assert_eq!(host.warnings.borrow().len(), 3);
    }

    #[test]
    fn test_trigger_query_and_create() {
        let dir = tempdir().unwrap();
        let manager = SnippetManager::without_watcher(SnippetsConfig::new(dir.path())).unwrap();
        assert!(manager.wait_for_idle(WAIT));

        let result = manager.handle_trigger_query("snip +todo");
        assert_eq!(result.len(), 1);
        assert!(result.items[0].is_create());
        assert_eq!(manager.synopsis("+todo"), "[snippet text]");

        let host = QuietHost::default();
        let actions = manager.actions(&result.items[0], &host);
        manager.invoke(&actions[0], &host);
        assert!(host.warnings.borrow().is_empty());

        manager.trigger_rescan();
        assert!(manager.wait_for_idle(WAIT));
        assert_eq!(ids(&manager), vec!["todo"]);

        manager.remove_snippet("todo.txt", &host);
        manager.trigger_rescan();
        assert!(manager.wait_for_idle(WAIT));
        assert!(manager.snapshot().is_empty());
    }

    fn wait_for_ids(manager: &SnippetManager, expected: &[&str]) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if manager.wait_for_idle(Duration::from_millis(100)) && ids(manager) == expected {
                return true;
            }
            thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    fn test_watcher_picks_up_directory_changes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();

        let config = SnippetsConfig::new(dir.path()).with_debounce(Duration::from_millis(50));
        let manager = SnippetManager::new(config).unwrap();
        assert!(manager.is_watching());
        assert!(wait_for_ids(&manager, &["a"]));

        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        assert!(wait_for_ids(&manager, &["a", "b"]));

        fs::remove_file(dir.path().join("a.txt")).unwrap();
        assert!(wait_for_ids(&manager, &["b"]));
    }

    #[test]
    fn test_add_snippet_with_text() {
        let dir = tempdir().unwrap();
        let manager = SnippetManager::without_watcher(SnippetsConfig::new(dir.path())).unwrap();
        assert!(manager.wait_for_idle(WAIT));

        let host = QuietHost::default();
        manager.add_snippet("greeting", "hello there", &host);
        assert!(host.warnings.borrow().is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("greeting.txt")).unwrap(),
            "hello there"
        );

        manager.add_snippet("greeting", "again", &host);
        assert_eq!(host.warnings.borrow().len(), 1);

        manager.trigger_rescan();
        assert!(manager.wait_for_idle(WAIT));
        assert_eq!(
            manager.snapshot().get("greeting").unwrap().preview(),
            "hello there"
        );
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut manager = SnippetManager::without_watcher(SnippetsConfig::new(dir.path())).unwrap();
        manager.shutdown();
        manager.shutdown();
        assert!(!manager.is_watching());
        assert!(!manager.is_scan_active());
    }
}
