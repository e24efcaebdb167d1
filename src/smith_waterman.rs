//! Smith-Waterman local alignment with affine gaps and positional bonuses.
//!
//! Unlike the edit-distance engine this is bonus-driven: long runs of
//! consecutive or word-aligned matches outscore alignments that merely avoid
//! gaps. Two rolling H rows plus one gap row keep the storage linear in the
//! candidate; the consecutive-run rows record whether a cell's best path
//! arrived on a diagonal match, which is what arms the consecutive bonus.

use crate::buffer::ScoringBuffer;
use crate::byteview::ByteView;
use crate::query::PreparedQuery;
use crate::score;
use crate::{MatchKind, ScoredMatch, SmithWatermanConfig};

pub(crate) fn run(
    query: &PreparedQuery,
    candidate: ByteView<'_>,
    buffer: &mut ScoringBuffer,
    config: &SmithWatermanConfig,
) -> Option<ScoredMatch> {
    let query_folded = query.folded();
    let query_original = query.original();

    let mut raw = 0u32;
    let mut aligned_len = 0usize;

    if config.split_spaces && query_folded.contains(&b' ') {
        // Align every space-separated sub-query independently; summing the raw
        // scores lets sub-queries land anywhere in the candidate without
        // paying gap penalties for the distance between them.
        let mut start = 0;
        while start < query_folded.len() {
            while start < query_folded.len() && query_folded[start] == b' ' {
                start += 1;
            }
            if start == query_folded.len() {
                break;
            }
            let mut end = start;
            while end < query_folded.len() && query_folded[end] != b' ' {
                end += 1;
            }

            let sub_raw = align(
                &query_folded[start..end],
                &query_original[start..end],
                candidate,
                buffer,
                config,
            );
            // A sub-query that fails to align disqualifies the candidate.
            if sub_raw == 0 {
                return None;
            }
            raw += sub_raw;
            aligned_len += end - start;
            start = end;
        }
    } else {
        raw = align(query_folded, query_original, candidate, buffer, config);
        aligned_len = query_folded.len();
    }

    if raw == 0 || aligned_len == 0 {
        return None;
    }

    Some(ScoredMatch {
        score: score::alignment_score(raw, aligned_len, config),
        kind: MatchKind::Alignment,
    })
}

/// One alignment pass; returns the best cell value. The best cell's location
/// is left in `buffer.sw_max_cell`.
fn align(
    sub_folded: &[u8],
    sub_original: &[u8],
    candidate: ByteView<'_>,
    buffer: &mut ScoringBuffer,
    config: &SmithWatermanConfig,
) -> u32 {
    let candidate_original = candidate.as_bytes();
    let candidate_len = buffer.candidate_folded.len();
    buffer.reset_sw_rows(candidate_len);

    let ScoringBuffer {
        candidate_folded,
        word_initials,
        sw_row_prev: h_prev,
        sw_row_curr: h_curr,
        sw_gap_row: f_row,
        sw_run_prev: run_prev,
        sw_run_curr: run_curr,
        sw_max_cell,
        ..
    } = buffer;
    let folded = candidate_folded.as_slice();
    let word_initials = word_initials.as_slice();

    let mut best = (0u32, 0usize, 0usize);

    for (i, &query_byte) in sub_folded.iter().enumerate() {
        let query_original_byte = sub_original[i];
        // E: best score ending in a gap over candidate bytes; propagates
        // left-to-right within the row.
        let mut e = 0u32;
        // `word_initials` is sorted and `j` visits every index, so a cursor
        // tracks word starts without re-deriving the boundary rule per cell.
        let mut next_word = 0usize;

        for j in 0..candidate_len {
            let diag = if j == 0 { 0 } else { h_prev[j - 1] };
            let prev_run = if j == 0 { 0 } else { run_prev[j - 1] };

            let at_word_start =
                next_word < word_initials.len() && word_initials[next_word] as usize == j;
            if at_word_start {
                next_word += 1;
            }

            // F: best score ending in a gap over query bytes.
            let f = h_prev[j]
                .saturating_sub(config.gap_start_penalty)
                .max(f_row[j].saturating_sub(config.gap_extend_penalty));
            f_row[j] = f;

            let is_match = query_byte == folded[j];
            let diag_score = if is_match {
                let mut bonus = 0;
                if prev_run > 0 {
                    bonus += config.bonus_consecutive;
                }
                if at_word_start {
                    bonus += config.bonus_word_start;
                }
                if candidate_original[j] == query_original_byte {
                    bonus += config.bonus_case_match;
                }
                diag + config.match_score + bonus
            } else {
                diag.saturating_sub(config.mismatch_penalty)
            };

            let h = diag_score.max(e).max(f);
            run_curr[j] = if is_match && h > 0 && h == diag_score {
                prev_run + 1
            } else {
                0
            };

            if h > best.0 {
                best = (h, i, j);
            }
            h_curr[j] = h;

            e = h
                .saturating_sub(config.gap_start_penalty)
                .max(e.saturating_sub(config.gap_extend_penalty));
        }

        std::mem::swap(h_prev, h_curr);
        std::mem::swap(run_prev, run_curr);
    }

    *sw_max_cell = best;
    sw_max_cell.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, MatchConfig, make_buffer};

    const MATCH: u32 = 16;
    const CASE: u32 = 2;
    const CONSECUTIVE: u32 = 4;
    const WORD_START: u32 = 8;

    fn raw(needle: &str, haystack: &str) -> u32 {
        let config = SmithWatermanConfig::default();
        let mut buffer = make_buffer();
        buffer.fold_candidate(haystack.as_bytes());
        buffer.fill_word_initials(haystack.as_bytes());
        let folded: Vec<u8> = needle.bytes().map(|b| b.to_ascii_lowercase()).collect();
        align(
            &folded,
            needle.as_bytes(),
            ByteView::from(haystack),
            &mut buffer,
            &config,
        )
    }

    fn run_engine(query_text: &str, candidate: &str, split_spaces: bool) -> Option<ScoredMatch> {
        let query = PreparedQuery::with_config(
            query_text,
            MatchConfig {
                algorithm: Algorithm::SmithWaterman(SmithWatermanConfig {
                    split_spaces,
                    ..SmithWatermanConfig::default()
                }),
                ..MatchConfig::default()
            },
        );
        let config = match &query.config.algorithm {
            Algorithm::SmithWaterman(sw) => sw.clone(),
            Algorithm::EditDistance(_) => unreachable!(),
        };
        let mut buffer = make_buffer();
        buffer.fold_candidate(candidate.as_bytes());
        buffer.fill_word_initials(candidate.as_bytes());
        run(&query, ByteView::from(candidate), &mut buffer, &config)
    }

    #[test]
    fn single_match_scores_match_plus_case() {
        assert_eq!(raw("b", "abc"), MATCH + CASE);
        assert_eq!(raw("c", "abc"), MATCH + CASE);
        assert_eq!(raw("z", "abc"), 0);
    }

    #[test]
    fn word_start_bonus_applies_at_the_front_and_after_separators() {
        assert_eq!(raw("a", "abc"), MATCH + CASE + WORD_START);
        assert_eq!(raw("b", "a_b"), MATCH + CASE + WORD_START);
        // Camel transition is a word start; the folded match loses the case
        // bonus against the uppercase original.
        assert_eq!(raw("u", "getUser"), MATCH + WORD_START);
    }

    #[test]
    fn consecutive_matches_earn_the_run_bonus() {
        assert_eq!(
            raw("ab", "xaby"),
            (MATCH + CASE) + (MATCH + CASE + CONSECUTIVE)
        );
        assert_eq!(
            raw("abc", "abc"),
            (MATCH + CASE + WORD_START)
                + (MATCH + CASE + CONSECUTIVE)
                + (MATCH + CASE + CONSECUTIVE)
        );
    }

    #[test]
    fn scattered_matches_score_below_contiguous_ones() {
        assert!(raw("abc", "abc") > raw("abc", "aXbXc"));
        // Both candidates contain "getuser" as a subsequence; only the first
        // holds it in one run.
        assert!(raw("getuser", "getUserById") > raw("getuser", "gradleSetupUserRow"));
    }

    #[test]
    fn affine_gaps_charge_open_once_then_extend() {
        let contiguous = raw("ab", "ab");
        let one_gap = raw("ab", "aXb");
        let two_gap = raw("ab", "aXXb");
        // Opening costs gap_start, widening costs gap_extend.
        assert_eq!(contiguous - one_gap, 3 + CONSECUTIVE);
        assert_eq!(one_gap - two_gap, 1);
    }

    #[test]
    fn max_cell_records_the_alignment_anchor() {
        let config = SmithWatermanConfig::default();
        let mut buffer = make_buffer();
        buffer.fold_candidate(b"xaby");
        buffer.fill_word_initials(b"xaby");
        let raw = align(b"ab", b"ab", ByteView::from("xaby"), &mut buffer, &config);
        assert_eq!(buffer.sw_max_cell, (raw, 1, 2));
    }

    #[test]
    fn case_match_bonus_requires_original_byte_equality() {
        let same_case = raw("User", "xUser");
        let folded_only = raw("user", "xUser");
        assert!(same_case > folded_only);
    }

    #[test]
    fn engine_reports_normalized_alignment() {
        let m = run_engine("gtusr", "getUserById", false).unwrap();
        assert_eq!(m.kind, MatchKind::Alignment);
        assert!(m.score > 0.0 && m.score <= 0.95);
    }

    #[test]
    fn split_spaces_outscores_whole_query_alignment() {
        let split = run_engine("get user", "getUserById", true).unwrap();
        let whole = run_engine("get user", "getUserById", false).unwrap();
        assert_eq!(split.kind, MatchKind::Alignment);
        assert!(split.score > whole.score, "{} vs {}", split.score, whole.score);
    }

    #[test]
    fn failing_sub_query_disqualifies_the_candidate() {
        assert!(run_engine("get zzz", "getUserById", true).is_none());
        // The same bytes score when splitting is off, via a local alignment
        // of the matching half.
        assert!(run_engine("get zzz", "getUserById", false).is_some());
    }

    #[test]
    fn all_space_query_never_matches_in_split_mode() {
        assert!(run_engine("   ", "a b c", true).is_none());
    }
}
