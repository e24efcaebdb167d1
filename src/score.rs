//! Maps raw prefilter/engine output into the normalized `[0, 1]` bands that
//! keep the ranking intuitive: exact (1.0) > prefix ([0.9, 1)) > substring
//! (< 0.9) > acronym (0.85) > alignment (<= 0.95, SW only) > fuzzy (<= 0.85).

use crate::SmithWatermanConfig;

/// Score of a full acronym match, below any prefix and above the fuzzy band.
pub(crate) const FULL_ACRONYM_SCORE: f64 = 0.85;
/// Ceiling of the edit-distance fuzzy band.
pub(crate) const FUZZY_CEILING: f64 = 0.85;
/// Ceiling of the Smith-Waterman alignment band.
const ALIGNMENT_CEILING: f64 = 0.95;

const PREFIX_EPSILON: f64 = 0.0012;
const PREFIX_FLOOR: f64 = 0.9;
/// A weighted prefix must stay distinguishable from an exact match.
const PREFIX_CEILING: f64 = 0.9999;
const SUBSTRING_CEILING: f64 = 0.8999;

/// Per-position bonuses for the edit-distance fuzzy score. The values mirror
/// the Smith-Waterman defaults so both engines prefer the same positions.
pub(crate) const ED_WORD_START_BONUS: f64 = 8.0;
pub(crate) const ED_CONSECUTIVE_BONUS: f64 = 4.0;
const ED_MAX_POSITION_BONUS: f64 = ED_WORD_START_BONUS + ED_CONSECUTIVE_BONUS;

/// `1 - eps + eps*w` with the coverage term `w = min(1, weight*q/c)`, so a
/// shorter remainder after the prefix scores higher.
pub(crate) fn prefix_score(query_len: usize, candidate_len: usize, prefix_weight: f64) -> f64 {
    let coverage = (prefix_weight * query_len as f64 / candidate_len as f64).min(1.0);
    (1.0 - PREFIX_EPSILON + PREFIX_EPSILON * coverage).clamp(PREFIX_FLOOR, PREFIX_CEILING)
}

/// Coverage base, a positional penalty for late hits, and a small word-start
/// bonus for hits that open a word.
pub(crate) fn substring_score(
    query_len: usize,
    candidate_len: usize,
    position: usize,
    at_word_start: bool,
    substring_weight: f64,
) -> f64 {
    let c = candidate_len as f64;
    let coverage = (substring_weight * query_len as f64 / c).min(1.0);
    let mut score = 0.7 + 0.2 * coverage - 0.1 * (position as f64 / c);
    if at_word_start {
        score += 0.05;
    }
    score.clamp(0.0, SUBSTRING_CEILING)
}

/// Edit-distance fallback score: distance relative to the longer string, a
/// penalty per run of unmatched candidate bytes, and normalized position
/// bonuses accumulated over the matched set.
pub(crate) fn fuzzy_score(
    distance: u16,
    query_len: usize,
    candidate_len: usize,
    gap_runs: usize,
    bonus_sum: f64,
) -> f64 {
    let longest = query_len.max(candidate_len).max(1) as f64;
    let base = 1.0 - distance as f64 / longest;
    let bonus = bonus_sum / (query_len as f64 * ED_MAX_POSITION_BONUS);
    (base - 0.05 * gap_runs as f64 + bonus).clamp(0.0, FUZZY_CEILING)
}

/// Partial acronym: the fuzzy score plus credit for in-order word initials,
/// never above a full acronym.
pub(crate) fn partial_acronym_score(fuzzy: f64, matched_initials: usize, query_len: usize) -> f64 {
    (fuzzy + 0.1 * matched_initials as f64 / query_len as f64).clamp(0.0, FULL_ACRONYM_SCORE)
}

/// Raw Smith-Waterman score over the theoretical per-character maximum.
/// `aligned_len` is the query length, or the summed sub-query lengths when
/// space splitting is active.
pub(crate) fn alignment_score(raw: u32, aligned_len: usize, config: &SmithWatermanConfig) -> f64 {
    let ceiling = (aligned_len as f64 * config.max_cell_gain() as f64).max(1.0);
    (raw as f64 / ceiling).clamp(0.0, ALIGNMENT_CEILING)
}

/// One-character fast path: earlier hits win, word-initial hits win more.
pub(crate) fn one_char_score(position: usize, candidate_len: usize, at_word_start: bool) -> f64 {
    let mut score = 0.75 - 0.15 * (position as f64 / candidate_len.max(1) as f64);
    if at_word_start {
        score += 0.1;
    }
    score.clamp(0.0, FUZZY_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_of_longer_candidate_is_just_under_one() {
        // "getUser" against "getUserById".
        let score = prefix_score(7, 11, 1.0);
        assert!((score - 0.999).abs() < 0.001, "got {score}");
        assert!(score < 1.0);
        assert!(score >= 0.9);
    }

    #[test]
    fn prefix_score_grows_with_coverage() {
        assert!(prefix_score(7, 8, 1.0) > prefix_score(7, 9, 1.0));
        assert!(prefix_score(7, 9, 1.0) > prefix_score(7, 100, 1.0));
    }

    #[test]
    fn weighted_prefix_never_reaches_exact() {
        let score = prefix_score(5, 6, 10.0);
        assert!(score < 1.0);
    }

    #[test]
    fn substring_prefers_early_and_word_start_hits() {
        let early = substring_score(4, 20, 2, false, 1.0);
        let late = substring_score(4, 20, 15, false, 1.0);
        assert!(early > late);

        let boundary = substring_score(4, 20, 2, true, 1.0);
        assert!(boundary > early);
        assert!(boundary < 0.9);
    }

    #[test]
    fn fuzzy_band_is_capped_below_acronym_and_prefix() {
        let score = fuzzy_score(0, 7, 7, 0, 1_000.0);
        assert_eq!(score, FUZZY_CEILING);
        assert!(FULL_ACRONYM_SCORE <= score);
        assert!(score < prefix_score(7, 11, 1.0));
    }

    #[test]
    fn fuzzy_penalizes_distance_and_gap_runs() {
        let close = fuzzy_score(1, 7, 7, 1, 0.0);
        let far = fuzzy_score(2, 7, 7, 1, 0.0);
        assert!(close > far);

        let gappy = fuzzy_score(1, 7, 7, 3, 0.0);
        assert!(close > gappy);
    }

    #[test]
    fn partial_acronym_never_beats_full() {
        assert!(partial_acronym_score(0.85, 3, 3) <= FULL_ACRONYM_SCORE);
        let partial = partial_acronym_score(0.5, 2, 4);
        assert!((partial - 0.55).abs() < 1e-9);
    }

    #[test]
    fn alignment_is_normalized_and_capped() {
        let config = SmithWatermanConfig::default();
        // A perfect single-character alignment cannot earn the consecutive
        // bonus, so it lands below the ceiling.
        let one = alignment_score(26, 1, &config);
        assert!(one > 0.8 && one < ALIGNMENT_CEILING);

        assert_eq!(alignment_score(u32::MAX, 1, &config), ALIGNMENT_CEILING);
        assert_eq!(alignment_score(0, 4, &config), 0.0);
    }

    #[test]
    fn one_char_prefers_early_word_starts() {
        assert!(one_char_score(0, 10, true) > one_char_score(0, 10, false));
        assert!(one_char_score(0, 10, false) > one_char_score(9, 10, false));
        assert!(one_char_score(0, 10, true) <= FUZZY_CEILING);
    }
}
