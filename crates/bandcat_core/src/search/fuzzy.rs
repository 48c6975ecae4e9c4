//! Approximate title matching.
//!
//! # Responsibility
//! - Compute a similarity score in `[0, 1]` between a query and a title.
//! - Rank songs by descending score with an optional minimum score.
//!
//! # Invariants
//! - Scoring is case-insensitive and symmetric.
//! - Without `min_score`, every candidate is returned (rank-and-return-all).
//! - Equal scores keep the incoming storage order.

use crate::model::song::Song;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid token regex"));

/// Ranking options for title search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchOptions {
    /// Candidates scoring below this value are dropped. `None` keeps all.
    pub min_score: Option<f64>,
}

impl SearchOptions {
    pub fn with_min_score(min_score: f64) -> Self {
        Self {
            min_score: Some(min_score),
        }
    }
}

/// Scores how closely `title` matches `query`.
///
/// The score is the larger of a character-level indel ratio
/// (`2 * lcs / (len_a + len_b)`) and a word-token overlap ratio.
pub fn title_similarity(query: &str, title: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let title = title.trim().to_lowercase();
    if query.is_empty() || title.is_empty() {
        return 0.0;
    }
    if query == title {
        return 1.0;
    }

    char_ratio(&query, &title).max(token_ratio(&query, &title))
}

/// Ranks `songs` by title similarity to `query`.
///
/// A blank query returns the input unchanged.
pub fn rank_by_title(songs: Vec<Song>, query: &str, options: &SearchOptions) -> Vec<Song> {
    if query.trim().is_empty() {
        return songs;
    }

    let mut scored = songs
        .into_iter()
        .map(|song| (title_similarity(query, &song.title), song))
        .filter(|(score, _)| options.min_score.map_or(true, |min| *score >= min))
        .collect::<Vec<_>>();
    scored.sort_by(|left, right| right.0.total_cmp(&left.0));
    scored.into_iter().map(|(_, song)| song).collect()
}

fn char_ratio(left: &str, right: &str) -> f64 {
    let left = left.chars().collect::<Vec<_>>();
    let right = right.chars().collect::<Vec<_>>();
    let total = left.len() + right.len();
    if total == 0 {
        return 0.0;
    }
    (2 * lcs_len(&left, &right)) as f64 / total as f64
}

fn lcs_len(left: &[char], right: &[char]) -> usize {
    let mut previous = vec![0usize; right.len() + 1];
    let mut current = vec![0usize; right.len() + 1];
    for &lc in left {
        for (j, &rc) in right.iter().enumerate() {
            current[j + 1] = if lc == rc {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}

fn token_ratio(left: &str, right: &str) -> f64 {
    let left = tokens(left);
    let right = tokens(right);
    let total = left.len() + right.len();
    if total == 0 {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    (2 * shared) as f64 / total as f64
}

fn tokens(value: &str) -> HashSet<&str> {
    TOKEN_RE.find_iter(value).map(|m| m.as_str()).collect()
}
