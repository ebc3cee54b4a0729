use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EXTENSION: &str = "txt";
pub const DEFAULT_PREVIEW_MAX_CHARS: usize = 100;
pub const DEFAULT_CREATE_PREFIX: &str = "+";
pub const DEFAULT_TRIGGER: &str = "snip ";

/// Everything the index core needs to know about where snippets live and how
/// queries are interpreted. Passed explicitly into every component.
#[derive(Debug, Clone)]
pub struct SnippetsConfig {
    pub directory: PathBuf,
    /// Extension without the leading dot.
    pub extension: String,
    pub preview_max_chars: usize,
    pub create_prefix: String,
    pub trigger: String,
    pub debounce: Duration,
    pub max_results: usize,
    pub max_threads: usize,
    /// Upper bound for the typo allowance handed to the matcher.
    pub max_typos: u16,
}

impl Default for SnippetsConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            extension: DEFAULT_EXTENSION.to_string(),
            preview_max_chars: DEFAULT_PREVIEW_MAX_CHARS,
            create_prefix: DEFAULT_CREATE_PREFIX.to_string(),
            trigger: DEFAULT_TRIGGER.to_string(),
            debounce: Duration::from_millis(500),
            max_results: 50,
            max_threads: 1,
            max_typos: 2,
        }
    }
}

impl SnippetsConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::default().with_directory(directory)
    }

    /// `<config dir>/snippets`, falling back to a relative `snippets` directory
    /// on platforms without a config location.
    pub fn default_directory() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("snippets"))
            .unwrap_or_else(|| PathBuf::from("snippets"))
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
