//! Hebrew normalization passes.
//!
//! Each pass is a pure transform over a sequence of [`Glyph`]s. A glyph
//! remembers the byte range of the source string it was produced from, so a
//! match found in normalized text can be mapped back onto the canonical
//! string it came from.
//!
//! Passes are order-sensitive and are composed left to right:
//!
//! | Level            | Passes                                                          |
//! |------------------|-----------------------------------------------------------------|
//! | [`ACCENT_PASSES`] | cantillation, punctuation                                       |
//! | [`VOWEL_PASSES`]  | cantillation, punctuation, vowels, dagesh, sin/shin fold, dots  |

use std::ops::Range;

const SHIN: char = '\u{05E9}';
const DAGESH: char = '\u{05BC}';
const METEG: char = '\u{05BD}';
const MAQAF: char = '\u{05BE}';
const PASEQ: char = '\u{05C0}';
const SHIN_DOT: char = '\u{05C1}';
const SIN_DOT: char = '\u{05C2}';
const SOF_PASUQ: char = '\u{05C3}';

/// One character of normalized text and the source bytes it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub start: usize,
    pub end: usize,
}

/// A normalization pass
pub type Pass = fn(Vec<Glyph>) -> Vec<Glyph>;

/// Cantillation and punctuation variants
pub const ACCENT_PASSES: &[Pass] = &[remove_cantillation, remove_punctuation];

/// Accents plus vowel points, dagesh and sin/shin letter forms
pub const VOWEL_PASSES: &[Pass] = &[
    remove_cantillation,
    remove_punctuation,
    remove_vowel_points,
    remove_dagesh,
    fold_sin_shin,
    remove_sin_shin_dots,
];

#[inline]
fn is_cantillation(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05AF}') || c == METEG || c == PASEQ
}

#[inline]
fn is_vowel_point(c: char) -> bool {
    matches!(c, '\u{05B0}'..='\u{05BB}')
}

#[inline]
fn is_sin_shin_dot(c: char) -> bool {
    c == SHIN_DOT || c == SIN_DOT
}

/// Hebrew combining marks: points and accents that attach to the preceding letter.
///
/// Maqaf, paseq and sof pasuq are punctuation and are not included.
#[inline]
pub fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}' | '\u{05C2}' | '\u{05C4}' | '\u{05C5}' | '\u{05C7}'
    )
}

/// Split text into glyphs, one per char
pub fn glyphs(text: &str) -> Vec<Glyph> {
    text.char_indices()
        .map(|(start, ch)| Glyph {
            ch,
            start,
            end: start + ch.len_utf8(),
        })
        .collect()
}

fn retain(mut glyphs: Vec<Glyph>, keep: impl Fn(char) -> bool) -> Vec<Glyph> {
    glyphs.retain(|g| keep(g.ch));
    glyphs
}

/// Remove cantillation marks (U+0590..U+05AF), meteg and paseq
pub fn remove_cantillation(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    retain(glyphs, |c| !is_cantillation(c))
}

/// Remove sof pasuq and maqaf
pub fn remove_punctuation(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    retain(glyphs, |c| c != SOF_PASUQ && c != MAQAF)
}

/// Remove vowel points (U+05B0..U+05BB)
pub fn remove_vowel_points(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    retain(glyphs, |c| !is_vowel_point(c))
}

pub fn remove_dagesh(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    retain(glyphs, |c| c != DAGESH)
}

/// Fold shin + shin dot and shin + sin dot into the bare letter.
///
/// The folded glyph spans both source characters.
pub fn fold_sin_shin(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    let mut out = Vec::with_capacity(glyphs.len());
    let mut iter = glyphs.into_iter().peekable();

    while let Some(glyph) = iter.next() {
        if glyph.ch == SHIN {
            if let Some(dot) = iter.next_if(|next| is_sin_shin_dot(next.ch)) {
                out.push(Glyph {
                    ch: SHIN,
                    start: glyph.start,
                    end: dot.end,
                });
                continue;
            }
        }
        out.push(glyph);
    }

    out
}

/// Remove sin/shin dots left over after folding (e.g. a dot separated from its letter)
pub fn remove_sin_shin_dots(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    retain(glyphs, |c| !is_sin_shin_dot(c))
}

/// Run passes left to right
pub fn apply(passes: &[Pass], glyphs: Vec<Glyph>) -> Vec<Glyph> {
    passes.iter().fold(glyphs, |acc, pass| pass(acc))
}

/// Normalize a string with the given passes
pub fn normalize(text: &str, passes: &[Pass]) -> String {
    apply(passes, glyphs(text)).iter().map(|g| g.ch).collect()
}

/// Strip cantillation marks and punctuation variants
pub fn strip_accents(text: &str) -> String {
    normalize(text, ACCENT_PASSES)
}

/// Strip accents, vowel points, dagesh and sin/shin distinctions
pub fn strip_vowels(text: &str) -> String {
    normalize(text, VOWEL_PASSES)
}

/// Move `end` forward over combining marks that follow it in `source`
pub fn extend_over_marks(source: &str, end: usize) -> usize {
    let trailing: usize = source[end..]
        .chars()
        .take_while(|&c| is_combining_mark(c))
        .map(char::len_utf8)
        .sum();
    end + trailing
}

/// Normalized text that can map matches back to its source
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    glyphs: Vec<Glyph>,
    offsets: Vec<usize>, // byte offset of each glyph in `text`
}

impl NormalizedText {
    pub fn new(source: &str, passes: &[Pass]) -> Self {
        let glyphs = apply(passes, glyphs(source));
        let mut text = String::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(glyphs.len());

        for glyph in &glyphs {
            offsets.push(text.len());
            text.push(glyph.ch);
        }

        Self {
            text,
            glyphs,
            offsets,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Find the first occurrence of an already-normalized needle.
    ///
    /// Returns the byte range of the source text covered by the matched glyphs.
    /// An empty needle never matches.
    pub fn find_source_range(&self, needle: &str) -> Option<Range<usize>> {
        if needle.is_empty() {
            return None;
        }

        let start = self.text.find(needle)?;
        let end = start + needle.len();

        let first = self.offsets.binary_search(&start).ok()?;
        let last = self.offsets.partition_point(|&offset| offset < end).checked_sub(1)?;

        Some(self.glyphs[first].start..self.glyphs[last].end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // דָּבָר: dalet, dagesh, qamats, bet, qamats, resh
    const DAVAR_POINTED: &str = "\u{05D3}\u{05BC}\u{05B8}\u{05D1}\u{05B8}\u{05E8}";
    const DAVAR_BARE: &str = "\u{05D3}\u{05D1}\u{05E8}";

    #[test]
    fn test_glyphs_track_byte_ranges() {
        let g = glyphs("a\u{05D0}b");
        assert_eq!(g.len(), 3);
        assert_eq!((g[0].start, g[0].end), (0, 1));
        assert_eq!((g[1].start, g[1].end), (1, 3));
        assert_eq!((g[2].start, g[2].end), (3, 4));
    }

    #[test]
    fn test_remove_cantillation() {
        // vav + tipcha (U+0596) + meteg + paseq
        let text = "\u{05D5}\u{0596}\u{05BD} \u{05C0}";
        assert_eq!(normalize(text, &[remove_cantillation]), "\u{05D5} ");
    }

    #[test]
    fn test_remove_punctuation() {
        let text = "\u{05E2}\u{05D3}\u{05BE}\u{05DB}\u{05D5}\u{05E9}\u{05C3}";
        assert_eq!(
            normalize(text, &[remove_punctuation]),
            "\u{05E2}\u{05D3}\u{05DB}\u{05D5}\u{05E9}"
        );
    }

    #[test]
    fn test_strip_accents_keeps_vowels() {
        // bet + hiriq + merkha (U+05A5)
        let text = "\u{05D1}\u{05B4}\u{05A5}";
        assert_eq!(strip_accents(text), "\u{05D1}\u{05B4}");
    }

    #[test]
    fn test_strip_vowels() {
        assert_eq!(strip_vowels(DAVAR_POINTED), DAVAR_BARE);
        assert_eq!(strip_accents(DAVAR_POINTED), DAVAR_POINTED);
    }

    #[test]
    fn test_fold_sin_shin() {
        let shin = "\u{05E9}\u{05C1}";
        let sin = "\u{05E9}\u{05C2}";
        assert_eq!(normalize(shin, &[fold_sin_shin]), "\u{05E9}");
        assert_eq!(normalize(sin, &[fold_sin_shin]), "\u{05E9}");

        let folded = fold_sin_shin(glyphs(shin));
        assert_eq!(folded.len(), 1);
        assert_eq!((folded[0].start, folded[0].end), (0, 4));
    }

    #[test]
    fn test_fold_needs_adjacent_dot() {
        // shin, qamats, shin dot: the dot is not adjacent until the vowel is gone
        let text = "\u{05E9}\u{05B8}\u{05C1}";
        assert_eq!(normalize(text, &[fold_sin_shin]), text);
        assert_eq!(strip_vowels(text), "\u{05E9}");
    }

    #[test]
    fn test_stray_dots_removed() {
        assert_eq!(normalize("\u{05C1}\u{05D0}\u{05C2}", &[remove_sin_shin_dots]), "\u{05D0}");
    }

    #[test]
    fn test_vowel_stripping_subsumes_accent_stripping() {
        // shin + shin dot + qamats + zaqef qatan (U+0594), maqaf, lamed + patah
        let text = "\u{05E9}\u{05C1}\u{05B8}\u{0594}\u{05BE}\u{05DC}\u{05B7}";
        assert_eq!(strip_vowels(&strip_accents(text)), strip_vowels(text));
        assert_eq!(strip_vowels(text), "\u{05E9}\u{05DC}");
    }

    #[test]
    fn test_is_combining_mark() {
        assert!(is_combining_mark('\u{05B8}'));
        assert!(is_combining_mark('\u{0591}'));
        assert!(is_combining_mark('\u{05C1}'));
        assert!(!is_combining_mark(MAQAF));
        assert!(!is_combining_mark(SOF_PASUQ));
        assert!(!is_combining_mark(PASEQ));
        assert!(!is_combining_mark('\u{05D0}'));
    }

    #[test]
    fn test_extend_over_marks() {
        let text = "\u{05D3}\u{05BC}\u{05B8} x";
        assert_eq!(extend_over_marks(text, 2), 6);
        assert_eq!(extend_over_marks(text, 6), 6);
        assert_eq!(extend_over_marks(text, text.len()), text.len());
    }

    #[test]
    fn test_find_source_range_maps_back() {
        let source = format!("\u{05D5} {}\u{05C3}", DAVAR_POINTED);
        let normalized = NormalizedText::new(&source, VOWEL_PASSES);
        assert_eq!(normalized.as_str(), format!("\u{05D5} {}", DAVAR_BARE));

        let range = normalized.find_source_range(DAVAR_BARE).unwrap();
        // starts at the dalet, ends after the resh (before sof pasuq)
        assert_eq!(range.start, 3);
        assert_eq!(&source[range.clone()], DAVAR_POINTED);
        assert_eq!(&source[range.end..], "\u{05C3}");
    }

    #[test]
    fn test_find_source_range_identity() {
        let normalized = NormalizedText::new("the king gave a feast", &[]);
        assert_eq!(normalized.find_source_range("a feast"), Some(14..21));
        assert_eq!(normalized.find_source_range("queen"), None);
        assert_eq!(normalized.find_source_range(""), None);
    }
}
