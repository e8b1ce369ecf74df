use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

use crate::data::models::{Item, SearchHit};

lazy_static! {
    static ref NORMALIZE_RE: Regex = Regex::new(r"[^a-z0-9 ]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Scores below this are dropped from results.
const SCORE_THRESHOLD: f32 = 0.6;

pub struct SearchEngine;

impl SearchEngine {
    /// Fuzzy search over a user's items, matching against prompt and
    /// answer. Queries and content are accent-folded and normalized before
    /// scoring, so "café" finds "cafe".
    pub fn search_items(query: &str, items: &[Item], limit: usize) -> Vec<SearchHit> {
        let needle = SearchEngine::normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<SearchHit> = Vec::new();
        for item in items {
            let score = SearchEngine::max_similarity(
                &needle,
                &[
                    &SearchEngine::normalize(&item.prompt),
                    &SearchEngine::normalize(&item.answer),
                ],
            );

            if score > SCORE_THRESHOLD {
                results.push(SearchHit {
                    item_id: item.item_id,
                    lesson_id: item.lesson_id,
                    kind: item.kind.clone(),
                    prompt: item.prompt.clone(),
                    score,
                });
            }
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        results.truncate(limit);
        results
    }

    fn normalize(text: &str) -> String {
        let folded = unidecode(text).to_lowercase();
        let stripped = NORMALIZE_RE.replace_all(&folded, "");
        WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
    }

    fn max_similarity(a: &str, candidates: &[&str]) -> f32 {
        candidates
            .iter()
            .map(|b| SearchEngine::similarity(a, b))
            .fold(0.0, f32::max)
    }

    fn similarity(a: &str, b: &str) -> f32 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        if a == b {
            return 1.0;
        }

        // Substring hits outrank fuzzy ones, weighted by how much of the
        // candidate the query covers.
        if b.contains(a) {
            let ratio = a.len() as f32 / b.len() as f32;
            return 0.65 + (ratio * 0.35);
        }

        if a.contains(b) {
            let ratio = b.len() as f32 / a.len() as f32;
            return 0.55 + (ratio * 0.3);
        }

        let jaro_winkler = strsim::jaro_winkler(a, b) as f32;
        if jaro_winkler > 0.85 {
            return jaro_winkler;
        }

        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(id: i32, prompt: &str, answer: &str) -> Item {
        Item {
            item_id: id,
            lesson_id: 1,
            kind: "flashcard".to_string(),
            prompt: prompt.to_string(),
            options: None,
            answer: answer.to_string(),
            added_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn exact_prompt_match_ranks_first() {
        let items = vec![
            item(1, "mitochondria", "the powerhouse of the cell"),
            item(2, "mitosis", "cell division"),
        ];
        let hits = SearchEngine::search_items("mitochondria", &items, 10);
        assert!(!hits.is_empty());
        assert_eq!(hits[0].item_id, 1);
    }

    #[test]
    fn accents_are_folded() {
        let items = vec![item(1, "café au lait", "coffee with milk")];
        let hits = SearchEngine::search_items("cafe", &items, 10);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn matches_answers_too() {
        let items = vec![item(1, "capital of France", "Paris")];
        let hits = SearchEngine::search_items("paris", &items, 10);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn respects_limit_and_orders_by_score() {
        let items = vec![
            item(1, "photosynthesis", "light to sugar"),
            item(2, "photosynthesis overview and details", "light to sugar"),
            item(3, "unrelated", "nothing"),
        ];
        let hits = SearchEngine::search_items("photosynthesis", &items, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item_id, 1);
    }

    #[test]
    fn blank_query_returns_nothing() {
        let items = vec![item(1, "anything", "at all")];
        assert!(SearchEngine::search_items("   ", &items, 10).is_empty());
    }
}
