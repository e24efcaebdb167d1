//! Cheap reject-or-classify pass that runs before either alignment engine.
//! In the typical interactive workload most candidates die here, so every
//! check is O(|candidate|) with small constants and the only non-trivial one
//! (the character bitmap) runs last.

use crate::byteview::ByteView;
use crate::query::{CharBitmap, PreparedQuery};
use crate::score;
use crate::words;
use crate::{Algorithm, MatchKind, ScoredMatch};

#[derive(Debug)]
pub(crate) enum Prefiltered {
    /// Terminal decision from a fast path.
    Hit(ScoredMatch),
    /// Substring hit under Smith-Waterman; the engine may still score higher
    /// and take over the reported kind.
    SubstringHit(ScoredMatch),
    Reject,
    /// Survived every gate; run the configured engine.
    Continue,
}

pub(crate) fn run(
    query: &PreparedQuery,
    candidate: ByteView<'_>,
    folded: ByteView<'_>,
) -> Prefiltered {
    let q = query.len();
    let c = folded.len();

    // The empty query matches everything exactly.
    if q == 0 {
        return Prefiltered::Hit(ScoredMatch {
            score: 1.0,
            kind: MatchKind::Exact,
        });
    }

    // Length gate. Prefix edit distance tolerates any candidate length >= q-k,
    // so only a too-short candidate can be ruled out up front.
    match &query.config.algorithm {
        Algorithm::EditDistance(ed) => {
            if q > c + ed.max_edit_distance as usize {
                return Prefiltered::Reject;
            }
        }
        Algorithm::SmithWaterman(_) => {
            if c == 0 {
                return Prefiltered::Reject;
            }
        }
    }

    let (prefix_weight, substring_weight) = match &query.config.algorithm {
        Algorithm::EditDistance(ed) => (ed.prefix_weight, ed.substring_weight),
        Algorithm::SmithWaterman(_) => (1.0, 1.0),
    };

    let query_folded = query.folded();
    if q == c && folded.as_bytes() == query_folded {
        return Prefiltered::Hit(ScoredMatch {
            score: 1.0,
            kind: MatchKind::Exact,
        });
    }

    if q <= c && &folded.as_bytes()[..q] == query_folded {
        return Prefiltered::Hit(ScoredMatch {
            score: score::prefix_score(q, c, prefix_weight),
            kind: MatchKind::Prefix,
        });
    }

    // Plain byte search for the folded query. The prefix check above already
    // returned, so a hit here always starts past position zero.
    if let Some(position) = query
        .finder
        .as_ref()
        .and_then(|finder| finder.find(folded.as_bytes()))
    {
        let at_word_start = words::is_word_start(candidate.as_bytes(), folded.as_bytes(), position);
        let hit = ScoredMatch {
            score: score::substring_score(q, c, position, at_word_start, substring_weight),
            kind: MatchKind::Substring,
        };
        return match &query.config.algorithm {
            Algorithm::EditDistance(_) => Prefiltered::Hit(hit),
            Algorithm::SmithWaterman(_) => Prefiltered::SubstringHit(hit),
        };
    }

    // Character-set gate, edit-distance only: more distinct query bytes
    // missing from the candidate than the edit bound can repair.
    if let Algorithm::EditDistance(ed) = &query.config.algorithm {
        let candidate_bitmap = CharBitmap::from_bytes(folded.as_bytes());
        if query.char_bitmap.missing_from(&candidate_bitmap) > ed.max_edit_distance as u32 {
            return Prefiltered::Reject;
        }
    }

    Prefiltered::Continue
}
