use crate::words;

/// Reusable scratch owned by the caller, one per working thread.
///
/// Capacity only ever grows; contents are logically invalidated between calls,
/// so reusing a buffer is observationally identical to passing a fresh one.
/// Sharing a buffer across concurrent callers is ruled out by the `&mut`
/// contract on [`crate::score`].
#[derive(Debug, Default)]
pub struct ScoringBuffer {
    /// ASCII-lowercased candidate bytes for the current call.
    pub(crate) candidate_folded: Vec<u8>,
    /// Word-start positions of the current candidate.
    pub(crate) word_initials: Vec<u32>,

    // Rolling rows for the edit-distance DP; the third row feeds the
    // Damerau transposition term.
    pub(crate) ed_row_prev: Vec<u16>,
    pub(crate) ed_row_curr: Vec<u16>,
    pub(crate) ed_row_prev2: Vec<u16>,
    /// Banded DP matrix, filled only when a candidate survives the cost pass
    /// and match positions must be recovered.
    pub(crate) ed_trace: Vec<u16>,
    /// Candidate positions matched to a query character, ascending.
    pub(crate) match_positions: Vec<u32>,

    // Smith-Waterman state: H rows, the candidate-gap (F) row, and the
    // consecutive-run rows that drive the consecutive-match bonus.
    pub(crate) sw_row_prev: Vec<u32>,
    pub(crate) sw_row_curr: Vec<u32>,
    pub(crate) sw_gap_row: Vec<u32>,
    pub(crate) sw_run_prev: Vec<u32>,
    pub(crate) sw_run_curr: Vec<u32>,
    /// Best cell of the last alignment: `(score, query_index, candidate_index)`.
    pub(crate) sw_max_cell: (u32, usize, usize),
}

/// Create an empty [`ScoringBuffer`]. The first scored candidate grows it to
/// working size; later calls reuse that capacity.
pub fn make_buffer() -> ScoringBuffer {
    ScoringBuffer::default()
}

impl ScoringBuffer {
    /// Fold the candidate into the buffer for this call.
    pub(crate) fn fold_candidate(&mut self, candidate: &[u8]) {
        self.candidate_folded.clear();
        self.candidate_folded
            .extend(candidate.iter().map(|b| b.to_ascii_lowercase()));
    }

    /// Fill `word_initials` for the current candidate. `fold_candidate` must
    /// have run first.
    pub(crate) fn fill_word_initials(&mut self, candidate: &[u8]) {
        words::word_starts_into(candidate, &self.candidate_folded, &mut self.word_initials);
    }

    /// Size the three edit-distance rows to `width` entries, zeroed.
    pub(crate) fn reset_ed_rows(&mut self, width: usize) {
        for row in [
            &mut self.ed_row_prev,
            &mut self.ed_row_curr,
            &mut self.ed_row_prev2,
        ] {
            row.clear();
            row.resize(width, 0);
        }
    }

    /// Size the Smith-Waterman rows to `width` entries, zeroed.
    pub(crate) fn reset_sw_rows(&mut self, width: usize) {
        for row in [
            &mut self.sw_row_prev,
            &mut self.sw_row_curr,
            &mut self.sw_gap_row,
            &mut self.sw_run_prev,
            &mut self.sw_run_curr,
        ] {
            row.clear();
            row.resize(width, 0);
        }
        self.sw_max_cell = (0, 0, 0);
    }
}
