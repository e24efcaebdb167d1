//! The entry point wiring a candidate through the prefilter, the configured
//! engine, and the score gate, plus the bulk convenience wrappers.

use std::collections::BinaryHeap;

#[cfg(feature = "parallel_sort")]
use rayon::prelude::*;

use crate::buffer::{ScoringBuffer, make_buffer};
use crate::byteview::ByteView;
use crate::prefilter::{self, Prefiltered};
use crate::query::PreparedQuery;
use crate::{Algorithm, RankedMatch, ScoredMatch, edit_distance, smith_waterman};

/// Score one candidate against a prepared query.
///
/// Returns `None` when the candidate does not match or scores below
/// `min_score`. The candidate and query are never mutated; the buffer is
/// scratch, and reusing it across calls yields the same results as a fresh
/// one. After the buffer has grown to working size, calls do not allocate.
pub fn score(
    candidate: &str,
    query: &PreparedQuery,
    buffer: &mut ScoringBuffer,
) -> Option<ScoredMatch> {
    let candidate = ByteView::from(candidate);
    buffer.fold_candidate(candidate.as_bytes());

    let gate = |m: ScoredMatch| (m.score >= query.config.min_score).then_some(m);

    match prefilter::run(query, candidate, ByteView::new(&buffer.candidate_folded)) {
        Prefiltered::Hit(hit) => return gate(hit),
        Prefiltered::Reject => return None,
        Prefiltered::SubstringHit(substring) => {
            // Smith-Waterman may find a stronger alignment than the literal
            // substring; report whichever kind scores higher.
            buffer.fill_word_initials(candidate.as_bytes());
            let best = match &query.config.algorithm {
                Algorithm::SmithWaterman(sw) => {
                    match smith_waterman::run(query, candidate, buffer, sw) {
                        Some(aligned) if aligned.score > substring.score => aligned,
                        _ => substring,
                    }
                }
                Algorithm::EditDistance(_) => substring,
            };
            return gate(best);
        }
        Prefiltered::Continue => {}
    }

    buffer.fill_word_initials(candidate.as_bytes());
    let matched = match &query.config.algorithm {
        Algorithm::EditDistance(ed) => edit_distance::run(query, candidate, buffer, ed),
        Algorithm::SmithWaterman(sw) => smith_waterman::run(query, candidate, buffer, sw),
    }?;
    gate(matched)
}

/// Score every candidate and return all matches, best first (score descending,
/// input order on ties).
pub fn matches<I, S>(candidates: I, query: &PreparedQuery) -> Vec<RankedMatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buffer = make_buffer();
    let mut results = Vec::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        assert!(index < u32::MAX as usize, "candidate index overflows u32");
        if let Some(m) = score(candidate.as_ref(), query, &mut buffer) {
            results.push(RankedMatch {
                index: index as u32,
                score: m.score,
                kind: m.kind,
            });
        }
    }

    #[cfg(feature = "parallel_sort")]
    results.par_sort_unstable();
    #[cfg(not(feature = "parallel_sort"))]
    results.sort_unstable();

    results
}

/// Score every candidate but keep only the best `limit` matches, returned
/// best first. Uses a bounded heap, so memory stays O(limit) no matter how
/// many candidates stream through.
pub fn top_matches<I, S>(candidates: I, query: &PreparedQuery, limit: usize) -> Vec<RankedMatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut buffer = make_buffer();
    // `RankedMatch` orders best-first, so the heap's max element is the worst
    // match currently retained.
    let mut heap: BinaryHeap<RankedMatch> = BinaryHeap::with_capacity(limit + 1);
    for (index, candidate) in candidates.into_iter().enumerate() {
        assert!(index < u32::MAX as usize, "candidate index overflows u32");
        if let Some(m) = score(candidate.as_ref(), query, &mut buffer) {
            heap.push(RankedMatch {
                index: index as u32,
                score: m.score,
                kind: m.kind,
            });
            if heap.len() > limit {
                heap.pop();
            }
        }
    }
    heap.into_sorted_vec()
}
