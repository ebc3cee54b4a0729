// Index modules: snapshot store, directory scan, worker and change watcher.

pub mod core;
pub mod indexer;
pub mod scanner;
pub mod watcher;

pub use self::core::{IndexSnapshot, IndexStore};
pub use indexer::{BackgroundIndexer, IndexerState, RestartHandle, ScanProgress};
pub use scanner::{scan_snippets, DirectorySource, ScanOutcome, SnippetSource};
pub use watcher::ChangeWatcher;
