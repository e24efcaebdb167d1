//! Bounded prefix edit distance with Damerau transpositions.
//!
//! The query is aligned against the best-matching *prefix* of the candidate,
//! so `getUser` is one edit away from `getUsrGroupById`. The cost pass runs on
//! three rolling rows with band pruning and early termination; candidates that
//! survive get a second bounded pass into a flat trace matrix so matched
//! positions can be recovered for bonus scoring.

use crate::buffer::ScoringBuffer;
use crate::byteview::ByteView;
use crate::query::PreparedQuery;
use crate::score;
use crate::words;
use crate::{EditDistanceConfig, MatchKind, ScoredMatch};

/// Sentinel for cells outside the band. Large enough to never win a `min`,
/// small enough that `+ 1` cannot wrap.
const INF: u16 = u16::MAX / 2;

enum Acronym {
    Full,
    /// Number of query characters matched, in order, against word initials.
    Partial(usize),
    None,
}

pub(crate) fn run(
    query: &PreparedQuery,
    candidate: ByteView<'_>,
    buffer: &mut ScoringBuffer,
    config: &EditDistanceConfig,
) -> Option<ScoredMatch> {
    let q = query.len();

    if q == 1 {
        return one_char(query, candidate, buffer);
    }

    let acronym = acronym_path(
        query.folded(),
        &buffer.candidate_folded,
        &buffer.word_initials,
    );
    if let Acronym::Full = acronym {
        return Some(ScoredMatch {
            score: score::FULL_ACRONYM_SCORE,
            kind: MatchKind::Acronym,
        });
    }

    let (distance, end) = bounded_distance(query, buffer, config)?;
    fill_trace(query, buffer, config, end);
    recover_positions(query, buffer, end);

    let candidate_len = buffer.candidate_folded.len();
    let (gap_runs, bonus_sum) = fuzzy_bonuses(
        candidate.as_bytes(),
        &buffer.candidate_folded,
        &buffer.match_positions,
        end,
    );
    let fuzzy = score::fuzzy_score(distance, q, candidate_len, gap_runs, bonus_sum);

    if let Acronym::Partial(matched) = acronym {
        let acr = score::partial_acronym_score(fuzzy, matched, q);
        // On equal scores the stronger classification wins.
        if acr >= fuzzy {
            return Some(ScoredMatch {
                score: acr,
                kind: MatchKind::Acronym,
            });
        }
    }

    Some(ScoredMatch {
        score: fuzzy,
        kind: MatchKind::Fuzzy,
    })
}

/// The DP is near-useless for single-byte queries: any candidate containing
/// the byte matches with distance zero, and very short queries dominate
/// interactive benchmarks. Locate the first occurrence and score by position.
fn one_char(
    query: &PreparedQuery,
    candidate: ByteView<'_>,
    buffer: &mut ScoringBuffer,
) -> Option<ScoredMatch> {
    let folded = &buffer.candidate_folded;
    let position = memchr::memchr(query.folded()[0], folded)?;
    let at_word_start = words::is_word_start(candidate.as_bytes(), folded, position);
    Some(ScoredMatch {
        score: score::one_char_score(position, folded.len(), at_word_start),
        kind: MatchKind::Fuzzy,
    })
}

/// Acronym recognition over candidate word initials. Full: the first `q`
/// initials spell the query. Partial: at least half the query matches the
/// initials in order; the DP result then earns an acronym bonus.
fn acronym_path(query_folded: &[u8], candidate_folded: &[u8], initials: &[u32]) -> Acronym {
    let q = query_folded.len();
    if q > initials.len() {
        return Acronym::None;
    }

    if initials[..q]
        .iter()
        .zip(query_folded)
        .all(|(&p, &b)| candidate_folded[p as usize] == b)
    {
        return Acronym::Full;
    }

    let mut matched = 0;
    for &p in initials {
        if matched < q && candidate_folded[p as usize] == query_folded[matched] {
            matched += 1;
        }
    }
    if matched >= q.div_ceil(2) {
        Acronym::Partial(matched)
    } else {
        Acronym::None
    }
}

/// Cost pass: minimum over `j` of the distance between the query and
/// `candidate[..j]`, bounded by `max_edit_distance`. Returns the distance and
/// the end position `j*` of the best prefix, ties toward smaller `j`.
pub(crate) fn bounded_distance(
    query: &PreparedQuery,
    buffer: &mut ScoringBuffer,
    config: &EditDistanceConfig,
) -> Option<(u16, usize)> {
    let query_folded = query.folded();
    let q = query_folded.len();
    let k = config.max_edit_distance as usize;
    let bound = k as u16;

    buffer.reset_ed_rows(q + 1);
    let ScoringBuffer {
        candidate_folded,
        ed_row_prev: prev,
        ed_row_curr: curr,
        ed_row_prev2: prev2,
        ..
    } = buffer;
    let candidate = candidate_folded.as_slice();
    let last_row = candidate.len().min(q + k);

    // Row 0: transforming the query into the empty prefix costs one deletion
    // per byte; cells past the band are unreachable.
    for (i, cell) in prev.iter_mut().enumerate() {
        *cell = if i <= k { i as u16 } else { INF };
    }
    prev2.fill(INF);

    // Candidate shorter than the bound: the empty prefix may already be best.
    let mut best = if q <= k {
        (q as u16, 0usize)
    } else {
        (INF, 0)
    };

    for j in 1..=last_row {
        let lo = j.saturating_sub(k);
        let hi = (j + k).min(q);
        curr.fill(INF);

        let candidate_byte = candidate[j - 1];
        let mut row_min = INF;
        if lo == 0 {
            curr[0] = j as u16;
            row_min = curr[0];
        }

        for i in lo.max(1)..=hi {
            let query_byte = query_folded[i - 1];
            let substitution = u16::from(query_byte != candidate_byte);

            let mut cell = prev[i - 1].saturating_add(substitution);
            cell = cell.min(prev[i].saturating_add(1));
            cell = cell.min(curr[i - 1].saturating_add(1));
            if i >= 2
                && j >= 2
                && query_byte == candidate[j - 2]
                && query_folded[i - 2] == candidate_byte
            {
                cell = cell.min(prev2[i - 2].saturating_add(1));
            }

            curr[i] = cell;
            row_min = row_min.min(cell);
        }

        if hi == q && curr[q] < best.0 {
            best = (curr[q], j);
        }

        // Row minima never decrease; once the whole row exceeds the bound no
        // later prefix can come back under it.
        if row_min > bound {
            break;
        }

        std::mem::swap(prev2, prev);
        std::mem::swap(prev, curr);
    }

    let (distance, end) = best;
    (distance <= bound).then_some((distance, end))
}

/// Re-run the banded DP into the flat trace matrix, rows `0..=end`. Only
/// executed for candidates the cost pass accepted.
fn fill_trace(
    query: &PreparedQuery,
    buffer: &mut ScoringBuffer,
    config: &EditDistanceConfig,
    end: usize,
) {
    let query_folded = query.folded();
    let q = query_folded.len();
    let k = config.max_edit_distance as usize;
    let stride = q + 1;

    let ScoringBuffer {
        candidate_folded,
        ed_trace: trace,
        ..
    } = buffer;
    let candidate = candidate_folded.as_slice();

    trace.clear();
    trace.resize((end + 1) * stride, INF);
    for i in 0..=q.min(k) {
        trace[i] = i as u16;
    }

    for j in 1..=end {
        let lo = j.saturating_sub(k);
        let hi = (j + k).min(q);
        let candidate_byte = candidate[j - 1];
        let row = j * stride;

        if lo == 0 {
            trace[row] = j as u16;
        }
        for i in lo.max(1)..=hi {
            let query_byte = query_folded[i - 1];
            let substitution = u16::from(query_byte != candidate_byte);

            let mut cell = trace[row - stride + i - 1].saturating_add(substitution);
            cell = cell.min(trace[row - stride + i].saturating_add(1));
            cell = cell.min(trace[row + i - 1].saturating_add(1));
            if i >= 2
                && j >= 2
                && query_byte == candidate[j - 2]
                && query_folded[i - 2] == candidate_byte
            {
                cell = cell.min(trace[row - 2 * stride + i - 2].saturating_add(1));
            }
            trace[row + i] = cell;
        }
    }
}

/// Walk back from `(end, q)` picking the minimum-cost predecessor, diagonal
/// first, collecting the candidate positions matched to a query byte.
fn recover_positions(query: &PreparedQuery, buffer: &mut ScoringBuffer, end: usize) {
    let query_folded = query.folded();
    let q = query_folded.len();
    let stride = q + 1;

    let ScoringBuffer {
        candidate_folded,
        ed_trace: trace,
        match_positions: positions,
        ..
    } = buffer;
    let candidate = candidate_folded.as_slice();
    let at = |j: usize, i: usize| trace[j * stride + i];

    positions.clear();
    let mut i = q;
    let mut j = end;
    while i > 0 && j > 0 {
        let cur = at(j, i);
        let diag = at(j - 1, i - 1);

        if query_folded[i - 1] == candidate[j - 1] && cur == diag {
            positions.push((j - 1) as u32);
            i -= 1;
            j -= 1;
            continue;
        }
        if i >= 2
            && j >= 2
            && query_folded[i - 1] == candidate[j - 2]
            && query_folded[i - 2] == candidate[j - 1]
            && cur == at(j - 2, i - 2).saturating_add(1)
        {
            // Both bytes of a transposition are present, merely swapped.
            positions.push((j - 1) as u32);
            positions.push((j - 2) as u32);
            i -= 2;
            j -= 2;
            continue;
        }
        if cur == diag.saturating_add(1) {
            i -= 1;
            j -= 1;
            continue;
        }
        if cur == at(j - 1, i).saturating_add(1) {
            j -= 1;
            continue;
        }
        if cur == at(j, i - 1).saturating_add(1) {
            i -= 1;
            continue;
        }
        // In-band cells always have a valid predecessor; keep the diagonal.
        i -= 1;
        j -= 1;
    }
    positions.reverse();
}

/// Gap runs and bonus mass over the matched positions. `positions` is
/// ascending; the scanned window is `[0, end)`.
fn fuzzy_bonuses(
    candidate: &[u8],
    folded: &[u8],
    positions: &[u32],
    end: usize,
) -> (usize, f64) {
    let mut gap_runs = 0;
    let mut next_expected = 0u32;
    for &p in positions {
        if p > next_expected {
            gap_runs += 1;
        }
        next_expected = p + 1;
    }
    if (next_expected as usize) < end {
        gap_runs += 1;
    }

    let mut bonus_sum = 0.0;
    let mut previous = None;
    for &p in positions {
        if words::is_word_start(candidate, folded, p as usize) {
            bonus_sum += score::ED_WORD_START_BONUS;
        }
        if p > 0 && previous == Some(p - 1) {
            bonus_sum += score::ED_CONSECUTIVE_BONUS;
        }
        previous = Some(p);
    }

    (gap_runs, bonus_sum)
}
