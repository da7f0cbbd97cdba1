// Word counting helpers for sizing melodies to lyrics.
//
// Real syllable counting belongs to the lyric editor. The melody generator
// only needs a rough size, so syllables are estimated from the word count at
// an average of 1.3 syllables per word.

/// Average syllables per English word used for estimates.
pub const SYLLABLES_PER_WORD: f64 = 1.3;

/// Words per bar below which a lyric forces extra bars.
pub const WORDS_PER_BAR: usize = 8;

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn count_words_per_line<S: AsRef<str>>(lines: &[S]) -> Vec<usize> {
    lines.iter().map(|l| count_words(l.as_ref())).collect()
}

/// Estimated syllables for `words` words, rounded up.
pub fn estimate_syllables(words: usize) -> u32 {
    (words as f64 * SYLLABLES_PER_WORD).ceil() as u32
}

/// Bars needed so that no bar carries more than `WORDS_PER_BAR` words.
pub fn bars_for_words(words: usize) -> usize {
    words.div_ceil(WORDS_PER_BAR)
}

/// How a lyric sizes a melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LyricFit {
    pub words: usize,
    /// Estimated syllables across all lines.
    pub syllables: u32,
    /// Requested bars, raised to fit the words.
    pub bars: i32,
}

/// Size a melody for `lines`, starting from `bars` requested bars.
pub fn fit_lyrics<S: AsRef<str>>(lines: &[S], bars: i32) -> LyricFit {
    let words: usize = lines.iter().map(|l| count_words(l.as_ref())).sum();
    LyricFit {
        words,
        syllables: estimate_syllables(words),
        bars: bars.max(bars_for_words(words) as i32),
    }
}
