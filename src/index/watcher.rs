use crate::error::Result;
use crate::path_utils::is_hidden;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use super::indexer::RestartHandle;

/// Turns debounced "directory changed" notifications into indexer restarts.
/// Watching stops when this value is dropped.
pub struct ChangeWatcher {
    directory: PathBuf,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl ChangeWatcher {
    pub fn start(directory: &Path, debounce: Duration, indexer: RestartHandle) -> Result<Self> {
        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| match result {
            Ok(events) => {
                if should_reindex(events.iter().map(|event| event.path.as_path())) {
                    debug!("WATCH: {} change events, restarting indexer", events.len());
                    indexer.restart();
                }
            }
            Err(e) => {
                error!("File watcher error: {:?}", e);
            }
        })?;

        debouncer
            .watcher()
            .watch(directory, RecursiveMode::NonRecursive)?;
        info!("WATCH: watching {}", directory.display());

        Ok(Self {
            directory: directory.to_path_buf(),
            _debouncer: debouncer,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Editor swap files and the trash folder are hidden entries; changes that
/// only touch those do not change the index.
pub fn should_reindex<'a>(mut paths: impl Iterator<Item = &'a Path>) -> bool {
    paths.any(|path| !is_hidden(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_change_triggers_reindex() {
        let paths = [Path::new("/s/.a.txt.swp"), Path::new("/s/a.txt")];
        assert!(should_reindex(paths.into_iter()));
    }

    #[test]
    fn test_hidden_only_changes_are_ignored() {
        let paths = [Path::new("/s/.a.txt.swp"), Path::new("/s/.trash")];
        assert!(!should_reindex(paths.into_iter()));
        assert!(!should_reindex(std::iter::empty()));
    }

    #[test]
    fn test_directory_itself_counts_as_change() {
        assert!(should_reindex([Path::new("/home/u/.config/snippets")].into_iter()));
    }
}
