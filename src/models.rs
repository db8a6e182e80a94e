//! Data structures for the annotated Esther reader.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Attribute carrying a note's identity on an inline marker span
pub const NOTE_INDEX_ATTR: &str = "data-note-index";

/// Attribute carrying a note's verse address on a note list entry
pub const NOTE_LIST_REF_ATTR: &str = "data-notelist-ref";

/// Rendered (English) text of each verse, keyed by address, in document order
pub type VerseText = IndexMap<String, String>;

/// Canonical Hebrew text of each verse, keyed by address
pub type OriginalText = IndexMap<String, String>;

/// A scholarly note attached to one verse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Verse address the note annotates ("EST 1:1")
    #[serde(rename = "ref")]
    pub reference: String,
    /// The note author's excerpt of the Hebrew text
    pub original: String,
    pub literal_rendering: String,
    pub explanation: String,
    #[serde(default)]
    pub exegetical_significance: f32,
    #[serde(default)]
    pub literalness: f32,
    /// Exact substring of the rendered verse this note annotates (empty = no inline anchor)
    #[serde(default)]
    pub target_words: String,
}

impl Note {
    /// Whether this note can be placed inline in the rendered verse
    pub fn has_anchor(&self) -> bool {
        !self.target_words.is_empty()
    }
}

/// Stable identity of a note: its absolute index in the notes sequence.
///
/// The same value is written into [`NOTE_INDEX_ATTR`] as a decimal integer and
/// parsed back with [`FromStr`], so selection, hover and list scrolling all
/// agree on one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub usize);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<usize>().map(NoteId)
    }
}

/// Which note (if any) is selected and which is hovered, for marker classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteMarks {
    pub active: Option<NoteId>,
    pub hovered: Option<NoteId>,
}

impl NoteMarks {
    pub fn is_active(&self, id: NoteId) -> bool {
        self.active == Some(id)
    }

    pub fn is_hovered(&self, id: NoteId) -> bool {
        self.hovered == Some(id)
    }
}

/// Side panel view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// List of every note
    List,
    /// Detail of the selected note
    #[default]
    Note,
}

/// Class names written into generated markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupParams {
    pub note_class: String,
    pub active_class: String,
    pub hover_class: String,
    pub highlight_class: String,
}

impl Default for MarkupParams {
    fn default() -> Self {
        Self {
            note_class: "note".to_string(),
            active_class: "active".to_string(),
            hover_class: "hover".to_string(),
            highlight_class: "bg-yellow-200".to_string(),
        }
    }
}

/// What happened when a note's anchor was looked up in its verse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorOutcome {
    /// Exactly one occurrence, wrapped in a marker span
    Placed,
    /// Several occurrences; the note was skipped
    Ambiguous { occurrences: usize },
    /// No occurrence in the verse text
    Missing,
    /// The note has no target words
    Unanchored,
    /// The note's address has no rendered verse
    NoVerse,
}

impl AnchorOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, AnchorOutcome::Placed)
    }
}

/// Normalization strategy that aligned an excerpt with the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Literal substring
    Exact,
    /// Cantillation and punctuation removed from both strings
    AccentStripped,
    /// Accents, vowel points, dagesh and sin/shin dots removed from both strings
    VowelStripped,
}

impl MatchStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::AccentStripped => "accent-stripped",
            MatchStrategy::VowelStripped => "vowel-stripped",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serialization of an audit report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Summary and per-note rows
    #[default]
    Json,
    /// Per-note rows only
    Csv,
}

/// Audit record for one note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteAudit {
    pub id: NoteId,
    #[serde(rename = "ref")]
    pub reference: String,
    pub target_words: String,
    pub anchor: AnchorOutcome,
    /// None when no strategy aligned the excerpt, or the address has no original text
    pub strategy: Option<MatchStrategy>,
    pub has_original: bool,
    /// Earlier notes of the same verse whose markers this anchor was placed inside
    pub overlaps_with: Vec<NoteId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    pub note_count: usize,
    pub verse_count: usize,
    pub anchors_placed: usize,
    pub anchors_ambiguous: usize,
    pub anchors_missing: usize,
    pub unanchored: usize,
    pub exact_matches: usize,
    pub accent_stripped_matches: usize,
    pub vowel_stripped_matches: usize,
    pub unaligned: usize,
    pub overlapping_anchors: usize,
}

/// Full audit of a corpus
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditReport {
    pub version: String,
    pub summary: AuditSummary,
    pub notes: Vec<NoteAudit>,
}

/// Book code of an address ("EST 1:3" -> "EST")
pub fn book_code(address: &str) -> &str {
    address
        .split_once(' ')
        .map(|(book, _)| book)
        .unwrap_or(address)
}

/// Verse label of an address ("EST 1:3" -> "3")
pub fn verse_label(address: &str) -> &str {
    address
        .split_once(':')
        .map(|(_, verse)| verse)
        .unwrap_or(address)
}

/// Human-readable reference ("EST 1:3" -> "Esther 1:3")
pub fn display_reference(address: &str) -> String {
    match address.split_once(' ') {
        Some((_, rest)) => format!("{} {}", book_name(book_code(address)), rest),
        None => book_name(address).to_string(),
    }
}

fn book_name(code: &str) -> &str {
    match code {
        "EST" => "Esther",
        other => other,
    }
}
