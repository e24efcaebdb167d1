//! Fuzzymatch is a high-throughput fuzzy string matcher for interactive search
//! over large catalogs of short strings (tickers, identifiers, product names,
//! file paths). A query is prepared once, then each candidate is scored through
//! a cheap prefilter cascade followed by one of two alignment engines: a bounded
//! prefix edit distance with Damerau transpositions, or Smith-Waterman local
//! alignment with affine gaps and positional bonuses. Scores are normalized to
//! `[0, 1]` and classified so that ranking stays intuitive:
//! exact > prefix > substring > acronym > alignment > fuzzy.
//!
//! The per-candidate hot path is allocation-free: all scratch lives in a
//! [`ScoringBuffer`] owned by the caller, which grows once and is reused across
//! calls. Candidates are matched as UTF-8 bytes with ASCII-only case folding;
//! multi-byte sequences are compared byte-for-byte.
//!
//! # Example: scoring one candidate at a time
//!
//! ```rust
//! use fuzzymatch::{prepare, make_buffer, score, MatchKind};
//!
//! let query = prepare("getUser");
//! let mut buffer = make_buffer();
//!
//! let m = score("getUserById", &query, &mut buffer).unwrap();
//! assert_eq!(m.kind, MatchKind::Prefix);
//! assert!(m.score > 0.99);
//!
//! assert!(score("fetchData", &query, &mut buffer).is_none());
//! ```
//!
//! # Example: ranking a list
//!
//! ```rust
//! use fuzzymatch::{matches, prepare, top_matches};
//!
//! let query = prepare("usr");
//! let candidates = ["getUserById", "user_name", "prelude", "println!"];
//!
//! let ranked = matches(&candidates, &query);
//! let best3 = top_matches(&candidates, &query, 3);
//! assert!(best3.len() <= 3);
//! assert_eq!(ranked.first().map(|m| m.index), best3.first().map(|m| m.index));
//! ```
//!
//! # Example: Smith-Waterman with space splitting
//!
//! ```rust
//! use fuzzymatch::{
//!     make_buffer, score, Algorithm, MatchConfig, MatchKind, PreparedQuery,
//!     SmithWatermanConfig,
//! };
//!
//! let config = MatchConfig {
//!     algorithm: Algorithm::SmithWaterman(SmithWatermanConfig::default()),
//!     ..MatchConfig::default()
//! };
//! let query = PreparedQuery::with_config("get user", config);
//! let mut buffer = make_buffer();
//!
//! let m = score("getUserById", &query, &mut buffer).unwrap();
//! assert_eq!(m.kind, MatchKind::Alignment);
//! ```

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod buffer;
mod byteview;
mod edit_distance;
mod matcher;
mod prefilter;
mod query;
mod score;
mod smith_waterman;
mod words;

pub use buffer::{ScoringBuffer, make_buffer};
pub use byteview::ByteView;
pub use matcher::{matches, score, top_matches};
pub use query::{PreparedQuery, prepare};

/// Classification of a match, ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchKind {
    /// Folded bytes of query and candidate are identical.
    Exact,
    /// Candidate starts with the query.
    Prefix,
    /// Query appears inside the candidate, but not at the start.
    Substring,
    /// Query equals the word-initial characters of the candidate.
    Acronym,
    /// Smith-Waterman local alignment (SW engine only).
    Alignment,
    /// Bounded edit distance to the best candidate prefix (ED engine only).
    Fuzzy,
}

/// A scored decision for a single candidate.
///
/// Only emitted when `score >= MatchConfig::min_score`; callers never see
/// sub-threshold matches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoredMatch {
    /// Normalized score in `[0, 1]`.
    pub score: f64,
    pub kind: MatchKind,
}

/// A match from the bulk wrappers, tagged with the candidate's position in the
/// input sequence.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankedMatch {
    /// Index of the candidate in the original list.
    pub index: u32,
    /// Normalized score in `[0, 1]`.
    pub score: f64,
    pub kind: MatchKind,
}

impl PartialOrd for RankedMatch {
    fn partial_cmp(&self, other: &RankedMatch) -> Option<Ordering> {
        Some(std::cmp::Ord::cmp(self, other))
    }
}
impl Ord for RankedMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.index.cmp(&other.index))
    }
}
impl PartialEq for RankedMatch {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.index == other.index
    }
}
impl Eq for RankedMatch {}

/// Tuning for the bounded edit-distance engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EditDistanceConfig {
    /// Maximum number of edits (insert, delete, substitute, adjacent
    /// transpose) tolerated against the best candidate prefix.
    pub max_edit_distance: u16,
    /// Scales the `q/c` coverage term of the prefix score.
    pub prefix_weight: f64,
    /// Scales the `q/c` coverage term of the substring score.
    pub substring_weight: f64,
}

impl Default for EditDistanceConfig {
    fn default() -> Self {
        EditDistanceConfig {
            max_edit_distance: 2,
            prefix_weight: 1.0,
            substring_weight: 1.0,
        }
    }
}

/// Tuning for the Smith-Waterman engine. Raw cell values are unsigned, so all
/// penalties are non-negative by construction.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmithWatermanConfig {
    /// Score for a folded-equal character pair.
    pub match_score: u32,
    /// Penalty for a substitution on the diagonal step.
    pub mismatch_penalty: u32,
    /// Penalty for opening a gap in either sequence.
    pub gap_start_penalty: u32,
    /// Penalty for extending an open gap.
    pub gap_extend_penalty: u32,
    /// Split the query on runs of spaces and align each sub-query
    /// independently; the candidate must score on every sub-query.
    pub split_spaces: bool,
    /// Bonus when the previous diagonal step was also a match.
    pub bonus_consecutive: u32,
    /// Bonus when the candidate position is a word start.
    pub bonus_word_start: u32,
    /// Bonus when the original (pre-fold) bytes agree in case.
    pub bonus_case_match: u32,
}

impl Default for SmithWatermanConfig {
    fn default() -> Self {
        SmithWatermanConfig {
            match_score: 16,
            mismatch_penalty: 4,
            gap_start_penalty: 3,
            gap_extend_penalty: 1,
            split_spaces: true,
            bonus_consecutive: 4,
            bonus_word_start: 8,
            bonus_case_match: 2,
        }
    }
}

impl SmithWatermanConfig {
    /// Largest value a single aligned character can contribute. Used as the
    /// per-character normalization ceiling.
    pub(crate) fn max_cell_gain(&self) -> u32 {
        self.match_score + self.bonus_consecutive + self.bonus_word_start + self.bonus_case_match
    }
}

/// Which alignment engine scores the candidates that survive the prefilter.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Algorithm {
    EditDistance(EditDistanceConfig),
    SmithWaterman(SmithWatermanConfig),
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::EditDistance(EditDistanceConfig::default())
    }
}

/// Top-level matching configuration, embedded in a [`PreparedQuery`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchConfig {
    /// Matches scoring below this threshold are dropped. Must be in `[0, 1]`.
    pub min_score: f64,
    pub algorithm: Algorithm,
}

impl MatchConfig {
    /// Invariants are enforced when a query is prepared, not per call.
    /// Violations are programmer errors.
    pub(crate) fn validate(&self) {
        assert!(
            (0.0..=1.0).contains(&self.min_score),
            "min_score must be in [0, 1], got {}",
            self.min_score
        );
        if let Algorithm::EditDistance(ed) = &self.algorithm {
            assert!(
                ed.prefix_weight.is_finite() && ed.prefix_weight >= 0.0,
                "prefix_weight must be finite and non-negative"
            );
            assert!(
                ed.substring_weight.is_finite() && ed.substring_weight >= 0.0,
                "substring_weight must be finite and non-negative"
            );
        }
    }
}
