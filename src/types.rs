use std::path::{Path, PathBuf};
use tracing::warn;

use crate::path_utils::make_preview;

pub const SNIPPET_SUBTEXT: &str = "Text snippet";
pub const CREATE_ITEM_TEXT: &str = "Create new snippet";
pub const CREATE_ITEM_SUBTEXT: &str = "Create snippet file and open it in default editor.";

/// One snippet file as seen by the last indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRecord {
    id: String,
    preview: String,
    path: PathBuf,
}

impl SnippetRecord {
    pub fn new(id: impl Into<String>, preview: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id: id.into(),
            preview: preview.into(),
            path,
        }
    }

    /// Reads `path` and builds its record. An unreadable file still yields a
    /// record, just without a preview.
    pub fn load(id: String, path: PathBuf, preview_max_chars: usize) -> Self {
        let preview = match std::fs::read(&path) {
            Ok(bytes) => make_preview(&String::from_utf8_lossy(&bytes), preview_max_chars),
            Err(e) => {
                warn!("Failed to read from snippet file {}: {}", path.display(), e);
                String::new()
            }
        };

        Self { id, preview, path }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Path at index time. Actions resolve the live path from the id instead.
    #[inline]
    pub fn indexed_path(&self) -> &Path {
        &self.path
    }

    pub fn subtext(&self) -> String {
        format!("{} – {}", SNIPPET_SUBTEXT, self.preview)
    }
}

/// Query-time pseudo record asking for a new snippet called `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchItem {
    Snippet(SnippetRecord),
    Create(CreateRequest),
}

impl SearchItem {
    pub fn text(&self) -> &str {
        match self {
            SearchItem::Snippet(record) => record.name(),
            SearchItem::Create(_) => CREATE_ITEM_TEXT,
        }
    }

    pub fn subtext(&self) -> String {
        match self {
            SearchItem::Snippet(record) => record.subtext(),
            SearchItem::Create(_) => CREATE_ITEM_SUBTEXT.to_string(),
        }
    }

    #[inline]
    pub fn is_create(&self) -> bool {
        matches!(self, SearchItem::Create(_))
    }

    pub fn as_snippet(&self) -> Option<&SnippetRecord> {
        match self {
            SearchItem::Snippet(record) => Some(record),
            SearchItem::Create(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub total: i32,
    pub base_score: i32,
    pub name_bonus: i32,
    pub match_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub query: &'a str,
    pub max_typos: u16,
    pub max_threads: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub items: Vec<SearchItem>,
    pub scores: Vec<Score>,
    pub total_matched: usize,
    pub total_snippets: usize,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SearchItem, &Score)> {
        self.items.iter().zip(self.scores.iter())
    }
}
