//! Incremental index over a directory of plain-text snippets.
//!
//! A [`SnippetManager`] keeps a background indexer in sync with the snippet
//! directory and answers launcher queries against the last completed index.
//! Queries starting with `+` produce a single "create new snippet" item instead
//! of searching.

pub mod actions;
pub mod config;
mod error;
pub mod index;
pub mod log;
pub mod path_utils;
pub mod query;
pub mod score;
mod snippet_manager;
pub mod store;
pub mod types;

pub use actions::{actions_for, Action, ActionCommand, ActionHost};
pub use config::SnippetsConfig;
pub use error::{Error, Result};
pub use index::{BackgroundIndexer, IndexSnapshot, IndexStore, IndexerState, ScanProgress};
pub use query::QueryEngine;
pub use snippet_manager::SnippetManager;
pub use store::SnippetStore;
pub use types::{CreateRequest, Score, SearchItem, SearchResult, SnippetRecord};
