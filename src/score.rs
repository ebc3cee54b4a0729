use crate::types::{Score, ScoringContext, SnippetRecord};
use rayon::prelude::*;

const EXACT_NAME_BONUS_DIVISOR: i32 = 5;
const EXACT_NAME_BONUS_MULTIPLIER: i32 = 2;
const SUBSTRING_NAME_BONUS_DIVISOR: i32 = 5;

#[inline]
pub fn match_and_score_records(
    records: &[SnippetRecord],
    context: &ScoringContext,
) -> Vec<(usize, Score)> {
    if context.query.is_empty() {
        return score_all_by_name(records);
    }

    if records.is_empty() {
        return Vec::new();
    }

    let options = neo_frizbee::Options {
        prefilter: true,
        max_typos: Some(context.max_typos),
        sort: false,
    };

    let mut haystack = Vec::with_capacity(records.len());
    haystack.extend(records.iter().map(SnippetRecord::name));
    let name_matches =
        neo_frizbee::match_list_parallel(context.query, &haystack, options, context.max_threads);

    let mut results = Vec::with_capacity(name_matches.len());

    for neo_frizbee_match in name_matches {
        let record_idx = neo_frizbee_match.index_in_haystack as usize;
        let record = &records[record_idx];

        let base_score = neo_frizbee_match.score as i32;
        let (name_bonus, match_type) = calculate_name_bonus(context.query, record.name(), base_score);

        let score = Score {
            total: base_score.saturating_add(name_bonus),
            base_score,
            name_bonus,
            match_type,
        };

        results.push((record_idx, score));
    }

    results.par_sort_unstable_by(|a, b| {
        b.1.total
            .cmp(&a.1.total)
            .then_with(|| records[a.0].id().cmp(records[b.0].id()))
    });

    results
}

#[inline]
fn calculate_name_bonus(query: &str, name: &str, base_score: i32) -> (i32, &'static str) {
    if name.eq_ignore_ascii_case(query) {
        return (
            base_score / EXACT_NAME_BONUS_DIVISOR * EXACT_NAME_BONUS_MULTIPLIER,
            "exact_name",
        );
    }

    if name.to_lowercase().contains(&query.to_lowercase()) {
        return (base_score / SUBSTRING_NAME_BONUS_DIVISOR, "substring");
    }

    (0, "fuzzy")
}

/// Empty queries list everything in snapshot order.
fn score_all_by_name(records: &[SnippetRecord]) -> Vec<(usize, Score)> {
    (0..records.len())
        .map(|idx| {
            let score = Score {
                total: 0,
                base_score: 0,
                name_bonus: 0,
                match_type: "all",
            };
            (idx, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn records(ids: &[&str]) -> Vec<SnippetRecord> {
        ids.iter()
            .map(|id| SnippetRecord::new(*id, "", PathBuf::from(format!("/s/{id}.txt"))))
            .collect()
    }

    fn context(query: &str) -> ScoringContext<'_> {
        ScoringContext {
            query,
            max_typos: 0,
            max_threads: 1,
        }
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let records = records(&["alpha", "beta", "gamma"]);
        let results = match_and_score_records(&records, &context(""));
        let order: Vec<_> = results.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(results.iter().all(|(_, score)| score.match_type == "all"));
    }

    #[test]
    fn test_non_matching_names_are_dropped() {
        let records = records(&["hello", "world"]);
        let results = match_and_score_records(&records, &context("hel"));
        let ids: Vec<_> = results.iter().map(|(idx, _)| records[*idx].id()).collect();
        assert_eq!(ids, vec!["hello"]);
        assert_eq!(results[0].1.match_type, "substring");
    }

    #[test]
    fn test_exact_name_gets_largest_bonus() {
        assert_eq!(calculate_name_bonus("Mail", "mail", 100), (40, "exact_name"));
        assert_eq!(calculate_name_bonus("ai", "mail", 100), (20, "substring"));
        assert_eq!(calculate_name_bonus("ml", "mail", 100), (0, "fuzzy"));
    }

    #[test]
    fn test_no_records_no_matches() {
        assert!(match_and_score_records(&[], &context("abc")).is_empty());
    }
}
