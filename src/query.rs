use memchr::memmem;

use crate::MatchConfig;
use crate::words;

/// 256-bit presence set over folded bytes.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CharBitmap([u64; 4]);

impl CharBitmap {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        let mut bitmap = CharBitmap::default();
        for &b in bytes {
            bitmap.0[(b >> 6) as usize] |= 1 << (b & 63);
        }
        bitmap
    }

    /// Number of distinct bytes present in `self` but absent from `other`.
    #[inline]
    pub(crate) fn missing_from(&self, other: &CharBitmap) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a & !b).count_ones())
            .sum()
    }
}

/// Immutable, case-folded representation of a query plus the metadata the
/// scoring pipeline needs on every candidate: original and folded bytes, a
/// character-presence bitmap, word-start positions, a prebuilt substring
/// finder, and the match configuration.
///
/// Built once, then shared across candidates and threads by reference.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    original: Box<[u8]>,
    folded: Box<[u8]>,
    pub(crate) char_bitmap: CharBitmap,
    pub(crate) word_starts: Vec<u32>,
    pub(crate) finder: Option<memmem::Finder<'static>>,
    pub(crate) config: MatchConfig,
}

/// Prepare `query` for matching under the default configuration
/// (edit distance, `min_score = 0`).
pub fn prepare(query: &str) -> PreparedQuery {
    PreparedQuery::with_config(query, MatchConfig::default())
}

impl PreparedQuery {
    /// Prepare `query` under `config`. Panics on out-of-range config values;
    /// those are programmer errors, not runtime conditions.
    pub fn with_config(query: &str, config: MatchConfig) -> Self {
        config.validate();

        let original: Box<[u8]> = query.as_bytes().into();
        let folded: Box<[u8]> = original
            .iter()
            .map(|b| b.to_ascii_lowercase())
            .collect::<Vec<u8>>()
            .into();

        let mut word_starts = Vec::new();
        words::word_starts_into(&original, &folded, &mut word_starts);

        let finder = if folded.is_empty() {
            None
        } else {
            Some(memmem::Finder::new(&folded[..]).into_owned())
        };

        PreparedQuery {
            char_bitmap: CharBitmap::from_bytes(&folded),
            original,
            folded,
            word_starts,
            finder,
            config,
        }
    }

    /// Byte length. Queries are byte strings, not grapheme sequences.
    #[inline]
    pub fn len(&self) -> usize {
        self.folded.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    #[inline]
    pub(crate) fn folded(&self) -> &[u8] {
        &self.folded
    }

    #[inline]
    pub(crate) fn original(&self) -> &[u8] {
        &self.original
    }
}
