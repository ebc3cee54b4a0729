use crate::config::SnippetsConfig;
use crate::error::{Error, Result};
use crate::path_utils::snippet_path;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Live view of the snippet directory. Every call goes to disk, nothing here is
/// cached, so it stays correct when the index lags behind.
#[derive(Debug, Clone)]
pub struct SnippetStore {
    directory: PathBuf,
    extension: String,
}

impl SnippetStore {
    pub fn new(config: &SnippetsConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            extension: config.extension.clone(),
        }
    }

    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.directory).map_err(|e| Error::io(&self.directory, e))
    }

    #[inline]
    pub fn path_for(&self, id: &str) -> PathBuf {
        snippet_path(&self.directory, id, &self.extension)
    }

    pub fn file_name_for(&self, id: &str) -> String {
        format!("{}.{}", id, self.extension)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }

    pub fn read(&self, id: &str) -> Result<String> {
        let path = self.path_for(id);
        let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Same rules the naming dialog enforces before it lets a name through.
    pub fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        if name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(Error::InvalidName(name.to_string()));
        }

        if self.exists(name) {
            return Err(Error::NameTaken(name.to_string()));
        }

        Ok(())
    }

    /// Creates `<name>.<ext>` holding `content`. Fails instead of overwriting.
    pub fn create(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.validate_name(name)?;

        let path = self.path_for(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => Error::NameTaken(name.to_string()),
                _ => Error::io(&path, e),
            })?;

        if !content.is_empty() {
            file.write_all(content.as_bytes())
                .map_err(|e| Error::io(&path, e))?;
        }

        info!("Created snippet file {}", path.display());
        Ok(path)
    }

    /// Resolves a file name relative to the snippet directory, for removal.
    pub fn existing_file(&self, file_name: &str) -> Option<PathBuf> {
        let path = self.directory.join(file_name);
        if path.exists() {
            Some(path)
        } else {
            debug!("Path does not exist: {}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> SnippetStore {
        SnippetStore::new(&SnippetsConfig::new(dir))
    }

    #[test]
    fn test_paths_are_resolved_from_id() {
        let store = store_in(Path::new("/snips"));
        assert_eq!(store.path_for("mail"), PathBuf::from("/snips/mail.txt"));
        assert_eq!(store.file_name_for("mail"), "mail.txt");
    }

    #[test]
    fn test_ensure_directory_creates_nested() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir.path().join("a").join("b"));
        store.ensure_directory().unwrap();
        assert!(store.directory().is_dir());
        // Idempotent.
        store.ensure_directory().unwrap();
    }

    #[test]
    fn test_validate_name() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(dir.path().join("taken.txt"), "").unwrap();

        assert!(matches!(store.validate_name(""), Err(Error::EmptyName)));
        assert!(matches!(store.validate_name("taken"), Err(Error::NameTaken(_))));
        assert!(matches!(store.validate_name("a/b"), Err(Error::InvalidName(_))));
        assert!(matches!(store.validate_name(".hidden"), Err(Error::InvalidName(_))));
        assert!(store.validate_name("fresh").is_ok());
    }

    #[test]
    fn test_create_and_read() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let path = store.create("greeting", "Hello there").unwrap();
        assert_eq!(path, dir.path().join("greeting.txt"));
        assert_eq!(store.read("greeting").unwrap(), "Hello there");

        assert!(matches!(store.create("greeting", "again"), Err(Error::NameTaken(_))));
        assert_eq!(store.read("greeting").unwrap(), "Hello there");

        store.create("empty", "").unwrap();
        assert_eq!(store.read("empty").unwrap(), "");
    }

    #[test]
    fn test_read_missing_snippet_fails() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(store.read("nope"), Err(Error::Io { .. })));
        assert!(store.existing_file("nope.txt").is_none());
    }
}
