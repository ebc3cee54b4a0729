use crate::config::SnippetsConfig;
use crate::index::IndexSnapshot;
use crate::score::match_and_score_records;
use crate::types::{CreateRequest, Score, ScoringContext, SearchItem, SearchResult};
use tracing::debug;

/// Sorts above anything the matcher can produce.
pub const CREATE_ITEM_SCORE: i32 = i32::MAX;

const SYNOPSIS_FILTER: &str = "<filter>|+";
const SYNOPSIS_CREATE: &str = "[snippet text]";

/// Stateless query handling over a published snapshot.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    create_prefix: String,
    max_results: usize,
    max_threads: usize,
    max_typos: u16,
}

impl QueryEngine {
    pub fn new(config: &SnippetsConfig) -> Self {
        Self {
            create_prefix: config.create_prefix.clone(),
            max_results: config.max_results,
            max_threads: config.max_threads.max(1),
            max_typos: config.max_typos,
        }
    }

    pub fn query(&self, text: &str, snapshot: &IndexSnapshot) -> SearchResult {
        if let Some(name) = text.strip_prefix(self.create_prefix.as_str()) {
            return SearchResult {
                items: vec![SearchItem::Create(CreateRequest {
                    name: name.to_string(),
                })],
                scores: vec![Score {
                    total: CREATE_ITEM_SCORE,
                    base_score: CREATE_ITEM_SCORE,
                    name_bonus: 0,
                    match_type: "create",
                }],
                total_matched: 0,
                total_snippets: snapshot.len(),
            };
        }

        let time = std::time::Instant::now();
        let records = snapshot.records();

        // Short queries tolerate no typos, otherwise a couple of letters match everything.
        let max_typos = u16::try_from(text.len() / 4)
            .unwrap_or(u16::MAX)
            .min(self.max_typos);
        let context = ScoringContext {
            query: text,
            max_typos,
            max_threads: self.max_threads,
        };

        let mut scored = match_and_score_records(records, &context);
        let total_matched = scored.len();
        scored.truncate(self.max_results);

        let (items, scores): (Vec<SearchItem>, Vec<Score>) = scored
            .into_iter()
            .map(|(idx, score)| (SearchItem::Snippet(records[idx].clone()), score))
            .unzip();

        debug!(
            "Query '{}' matched {} of {} snippets (generation {}) in {:?}",
            text,
            total_matched,
            records.len(),
            snapshot.generation(),
            time.elapsed()
        );

        SearchResult {
            items,
            scores,
            total_matched,
            total_snippets: records.len(),
        }
    }

    /// Entry point for raw launcher input: drops the trigger when present and
    /// answers the remainder.
    pub fn handle_trigger_query(
        &self,
        raw: &str,
        trigger: &str,
        snapshot: &IndexSnapshot,
    ) -> SearchResult {
        let text = raw.strip_prefix(trigger).unwrap_or(raw);
        self.query(text, snapshot)
    }

    pub fn synopsis(&self, text: &str) -> &'static str {
        if text.starts_with(self.create_prefix.as_str()) {
            SYNOPSIS_CREATE
        } else {
            SYNOPSIS_FILTER
        }
    }
}
