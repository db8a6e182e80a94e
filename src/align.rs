//! Original-text alignment for note excerpts.
//!
//! A note stores its own copy of the Hebrew it comments on, which often
//! differs from the canonical verse in accents, vowel points or sin/shin
//! letter forms. The excerpt is located with a cascade of strategies, each
//! applying the same normalization to both strings; the first that finds the
//! excerpt wins. Matches are mapped back to byte offsets of the canonical
//! text and the excerpt itself, untransformed, becomes the highlighted span.

use std::ops::Range;

use tracing::{debug, warn};

use crate::models::{MarkupParams, MatchStrategy};
use crate::normalize::{
    extend_over_marks, normalize, strip_vowels, NormalizedText, Pass, ACCENT_PASSES, VOWEL_PASSES,
};

/// Strategies in the order they are tried
pub const CASCADE: &[MatchStrategy] = &[
    MatchStrategy::Exact,
    MatchStrategy::AccentStripped,
    MatchStrategy::VowelStripped,
];

/// Normalization passes behind a strategy
pub fn strategy_passes(strategy: MatchStrategy) -> &'static [Pass] {
    match strategy {
        MatchStrategy::Exact => &[],
        MatchStrategy::AccentStripped => ACCENT_PASSES,
        MatchStrategy::VowelStripped => VOWEL_PASSES,
    }
}

/// Where an excerpt was found in the canonical text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptMatch {
    pub strategy: MatchStrategy,
    /// Byte range of the canonical text replaced by the highlight
    pub span: Range<usize>,
}

/// Try a single strategy.
///
/// For normalizing strategies the span is extended over combining marks that
/// follow the last matched letter, so no orphaned points are left outside the
/// highlight.
pub fn find_with_strategy(
    canonical: &str,
    excerpt: &str,
    strategy: MatchStrategy,
) -> Option<ExcerptMatch> {
    let passes = strategy_passes(strategy);
    let text = NormalizedText::new(canonical, passes);
    let needle = normalize(excerpt, passes);

    let span = text.find_source_range(&needle)?;
    let end = if passes.is_empty() {
        span.end
    } else {
        extend_over_marks(canonical, span.end)
    };

    Some(ExcerptMatch {
        strategy,
        span: span.start..end,
    })
}

/// Locate an excerpt in the canonical text, trying each strategy in turn.
///
/// Returns None when no strategy matches; the normalized forms are logged.
pub fn align_excerpt(canonical: &str, excerpt: &str) -> Option<ExcerptMatch> {
    if excerpt.is_empty() {
        debug!("empty excerpt, nothing to align");
        return None;
    }

    let found = CASCADE
        .iter()
        .find_map(|&strategy| find_with_strategy(canonical, excerpt, strategy));

    match &found {
        Some(m) => debug!(strategy = %m.strategy, span = ?m.span, "excerpt aligned"),
        None => warn!(
            normalized_text = %strip_vowels(canonical),
            normalized_excerpt = %strip_vowels(excerpt),
            "excerpt not found in original text"
        ),
    }

    found
}

/// Highlight span wrapping an excerpt
pub fn wrap_highlight(excerpt: &str, markup: &MarkupParams) -> String {
    format!(r#"<span class="{}">{}</span>"#, markup.highlight_class, excerpt)
}

/// Canonical text with the given span replaced by a highlighted excerpt
pub fn splice_highlight(
    canonical: &str,
    span: Range<usize>,
    excerpt: &str,
    markup: &MarkupParams,
) -> String {
    let highlight = wrap_highlight(excerpt, markup);
    let mut out = String::with_capacity(canonical.len() + highlight.len());
    out.push_str(&canonical[..span.start]);
    out.push_str(&highlight);
    out.push_str(&canonical[span.end..]);
    out
}

/// Canonical text with the first match of `excerpt` highlighted.
///
/// The result is always the canonical text: a match found by a normalizing
/// strategy is spliced back at canonical offsets, so the verse outside the
/// highlight keeps its points and accents. The normalized verse is never
/// returned. When nothing matches the canonical text is returned unchanged.
pub fn highlight_excerpt(canonical: &str, excerpt: &str, markup: &MarkupParams) -> String {
    match align_excerpt(canonical, excerpt) {
        Some(m) => splice_highlight(canonical, m.span, excerpt, markup),
        None => canonical.to_string(),
    }
}
