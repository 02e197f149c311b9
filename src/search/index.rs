//! Fuzzy index over document names.
//!
//! Each name is scored as a whole string against the query; lower scores are
//! better and `0.0` is an exact substring at the start of the name. Two
//! signals are combined and the better one wins:
//!
//! - approximate substring edit distance (errors per query character), and
//! - subsequence coverage from the `nucleo` matcher (gap characters inside the
//!   matched window per window character).
//!
//! Both add a small proximity penalty for matches that start late. Hits above
//! the threshold are dropped, and ties keep insertion order.
//!
//! An empty (or all-whitespace) query returns no hits.

use nucleo::{Config, Matcher, Utf32Str};

/// Default cutoff; a hit must score at or below this.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Default cap on returned hits.
pub const DEFAULT_LIMIT: usize = 5;

/// Characters of offset that cost a full point of proximity penalty.
const PROXIMITY_DISTANCE: f64 = 100.0;

/// A scored document name.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub score: f64,
}

/// Searchable set of document names.
pub struct SearchIndex {
    names: Vec<String>,
    threshold: f64,
    matcher: Matcher,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("names", &self.names)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SearchIndex {
    /// Empty index with the given threshold (clamped to `0.0..=1.0`).
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            names: Vec::new(),
            threshold: threshold.clamp(0.0, 1.0),
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Replace the indexed names. Iteration order becomes insertion order.
    pub fn rebuild<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.clear();
        for name in names {
            self.insert(name);
        }
    }

    /// Append a name if not already indexed.
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// Best-effort removal by name.
    ///
    /// Returns whether a name was removed. Mutation paths in the session
    /// rebuild from the registry's known names instead of relying on this.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|indexed| indexed != name);
        self.names.len() != before
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|indexed| indexed == name)
    }

    /// Indexed names in insertion order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Ranked hits for `query`, best first, at most `limit` of them.
    pub fn search(&mut self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let needle: Vec<char> = query.chars().collect();

        let mut hits: Vec<SearchHit> = Vec::new();
        for name in &self.names {
            let haystack: Vec<char> = name.to_lowercase().chars().collect();
            let edit = edit_score(&needle, &haystack);
            let subsequence = subsequence_score(&mut self.matcher, &query, name);
            let score = subsequence.map_or(edit, |s| s.min(edit));

            if score <= self.threshold {
                hits.push(SearchHit {
                    name: name.clone(),
                    score,
                });
            }
        }

        // stable sort keeps insertion order for equal scores
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits.truncate(limit);
        hits
    }
}

/// Approximate substring match: the fewest edits turning `needle` into any
/// substring of `haystack`, divided by the needle length.
fn edit_score(needle: &[char], haystack: &[char]) -> f64 {
    let m = needle.len();
    // previous row; row 0 is all zeros since a match may start anywhere
    let mut prev: Vec<usize> = vec![0; haystack.len() + 1];
    let mut curr: Vec<usize> = vec![0; haystack.len() + 1];

    for (i, nc) in needle.iter().enumerate() {
        curr[0] = i + 1;
        for (j, hc) in haystack.iter().enumerate() {
            let substitution = prev[j] + usize::from(nc != hc);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let (end, errors) = prev
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|&(_, errors)| errors)
        .unwrap_or((0, m));
    let start = end.saturating_sub(m);

    #[allow(clippy::cast_precision_loss)]
    let score = errors as f64 / m as f64 + start as f64 / PROXIMITY_DISTANCE;
    score.min(1.0)
}

/// Subsequence match through nucleo: share of unmatched characters inside the
/// matched window. `None` when the query is not a subsequence of the name.
fn subsequence_score(matcher: &mut Matcher, needle: &str, name: &str) -> Option<f64> {
    let mut haystack_buf = Vec::new();
    let mut needle_buf = Vec::new();
    let mut indices = Vec::new();

    matcher.fuzzy_indices(
        Utf32Str::new(name, &mut haystack_buf),
        Utf32Str::new(needle, &mut needle_buf),
        &mut indices,
    )?;

    let first = *indices.iter().min()?;
    let last = *indices.iter().max()?;
    let span = last - first + 1;
    let gaps = span.saturating_sub(u32::try_from(indices.len()).unwrap_or(span));

    let score = f64::from(gaps) / f64::from(span) + f64::from(first) / PROXIMITY_DISTANCE;
    Some(score.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|hit| hit.name.as_str()).collect()
    }

    #[test]
    fn test_prefix_query_ranks_first() {
        let mut index = SearchIndex::default();
        index.rebuild(["ideas", "todo"]);

        let hits = index.search("tod", DEFAULT_LIMIT);
        assert_eq!(names(&hits), vec!["todo"]);
        assert!(hits[0].score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_one_typo_is_tolerated() {
        let mut index = SearchIndex::default();
        index.rebuild(["groceries", "meeting notes"]);

        let hits = index.search("grocaries", DEFAULT_LIMIT);
        assert_eq!(names(&hits), vec!["groceries"]);
    }

    #[test]
    fn test_case_insensitive() {
        let mut index = SearchIndex::default();
        index.rebuild(["Rust Notes"]);

        assert_eq!(names(&index.search("rust", DEFAULT_LIMIT)), vec!["Rust Notes"]);
        assert_eq!(names(&index.search("NOTES", DEFAULT_LIMIT)), vec!["Rust Notes"]);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let mut index = SearchIndex::default();
        index.rebuild(["todo", "ideas"]);

        assert!(index.search("", DEFAULT_LIMIT).is_empty());
        assert!(index.search("   ", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn test_threshold_discards_weak_matches() {
        let mut index = SearchIndex::default();
        index.rebuild(["todo", "ideas"]);

        assert!(index.search("xyz", DEFAULT_LIMIT).is_empty());

        let mut strict = SearchIndex::new(0.0);
        strict.rebuild(["todo"]);
        assert!(strict.search("tdo", DEFAULT_LIMIT).is_empty());
        assert_eq!(names(&strict.search("todo", DEFAULT_LIMIT)), vec!["todo"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = SearchIndex::default();
        index.rebuild(["note b", "note a", "note c"]);

        let hits = index.search("note", DEFAULT_LIMIT);
        assert_eq!(names(&hits), vec!["note b", "note a", "note c"]);
    }

    #[test]
    fn test_better_scores_first() {
        let mut index = SearchIndex::default();
        index.rebuild(["my journal", "journal"]);

        let hits = index.search("journal", DEFAULT_LIMIT);
        assert_eq!(names(&hits), vec!["journal", "my journal"]);
        assert!(hits[0].score < hits[1].score);
    }

    #[test]
    fn test_limit_caps_results() {
        let mut index = SearchIndex::default();
        index.rebuild((0..10).map(|i| format!("doc {i}")));

        assert_eq!(index.search("doc", DEFAULT_LIMIT).len(), 5);
        assert_eq!(index.search("doc", 2).len(), 2);
        assert!(index.search("doc", 0).is_empty());
    }

    #[test]
    fn test_rebuild_replaces_names() {
        let mut index = SearchIndex::default();
        index.rebuild(["todo"]);
        index.rebuild(["ideas"]);

        assert!(!index.contains("todo"));
        assert!(index.search("todo", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut index = SearchIndex::default();
        index.insert("todo");
        index.insert("todo");
        assert_eq!(index.len(), 1);

        assert!(index.remove("todo"));
        assert!(!index.remove("todo"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_subsequence_with_gap() {
        let mut index = SearchIndex::default();
        index.rebuild(["todo"]);

        let hits = index.search("tdo", DEFAULT_LIMIT);
        assert_eq!(names(&hits), vec!["todo"]);
        assert!(hits[0].score > 0.0);
    }
}
