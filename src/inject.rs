//! Inline note markers for rendered verse text.
//!
//! Notes are applied in sequence order to the progressively decorated string.
//! A note's anchor is placed only when its target words occur exactly once in
//! the verse text; ambiguous and missing anchors leave the text untouched.
//! Marker tags inserted by earlier notes are not verse text and are never
//! searched. Target words inside an earlier marker's content are, and such a
//! note is placed nested in that marker.
//!
//! Marker format:
//!
//! ```text
//! <span class="note active hover" data-note-index="12">target words</span>
//! ```
//!
//! The `active`/`hover` classes are present only for the selected and hovered
//! notes. The target words are inserted verbatim, without escaping.

use std::ops::Range;

use tracing::debug;

use crate::models::{AnchorOutcome, MarkupParams, Note, NoteId, NoteMarks, NOTE_INDEX_ATTR};

const MARKER_CLOSE: &str = "</span>";

/// Count non-overlapping occurrences of `needle` in `text`.
///
/// An empty needle has no occurrences.
pub fn count_occurrences(text: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    text.matches(needle).count()
}

fn classify(note: &Note, occurrences: usize) -> AnchorOutcome {
    if !note.has_anchor() {
        return AnchorOutcome::Unanchored;
    }
    match occurrences {
        0 => AnchorOutcome::Missing,
        1 => AnchorOutcome::Placed,
        occurrences => AnchorOutcome::Ambiguous { occurrences },
    }
}

/// Classify a note's anchor against undecorated text
pub fn anchor_outcome(text: &str, note: &Note) -> AnchorOutcome {
    classify(note, count_occurrences(text, &note.target_words))
}

/// Class attribute value for a note's marker
pub fn marker_classes(id: NoteId, marks: NoteMarks, markup: &MarkupParams) -> String {
    let mut classes = markup.note_class.clone();
    if marks.is_active(id) {
        classes.push(' ');
        classes.push_str(&markup.active_class);
    }
    if marks.is_hovered(id) {
        classes.push(' ');
        classes.push_str(&markup.hover_class);
    }
    classes
}

fn marker_open(id: NoteId, marks: NoteMarks, markup: &MarkupParams) -> String {
    format!(
        r#"<span class="{}" {}="{}">"#,
        marker_classes(id, marks, markup),
        NOTE_INDEX_ATTR,
        id
    )
}

/// Marker span wrapping a note's target words
pub fn note_span(id: NoteId, note: &Note, marks: NoteMarks, markup: &MarkupParams) -> String {
    format!(
        "{}{}{}",
        marker_open(id, marks, markup),
        note.target_words,
        MARKER_CLOSE
    )
}

/// What happened to one note's anchor during injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRecord {
    pub id: NoteId,
    pub outcome: AnchorOutcome,
    /// Earlier markers whose content this note's marker was placed inside
    pub nested_in: Vec<NoteId>,
}

#[derive(Debug)]
struct Marker {
    id: NoteId,
    open: Range<usize>,
    close: Range<usize>,
}

/// Verse text being decorated, with the byte ranges of every marker tag inserted so far
#[derive(Debug)]
struct DecoratedVerse {
    text: String,
    markers: Vec<Marker>,
}

impl DecoratedVerse {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            markers: Vec::new(),
        }
    }

    /// Verse text between marker tags, with the byte offset of each segment
    fn segments(&self) -> Vec<(usize, &str)> {
        let mut tags: Vec<&Range<usize>> = self
            .markers
            .iter()
            .flat_map(|m| [&m.open, &m.close])
            .collect();
        tags.sort_unstable_by_key(|tag| tag.start);

        let mut segments = Vec::with_capacity(tags.len() + 1);
        let mut pos = 0;
        for tag in tags {
            segments.push((pos, &self.text[pos..tag.start]));
            pos = tag.end;
        }
        segments.push((pos, &self.text[pos..]));
        segments
    }

    fn count(&self, needle: &str) -> usize {
        self.segments()
            .iter()
            .map(|(_, segment)| count_occurrences(segment, needle))
            .sum()
    }

    fn find(&self, needle: &str) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.segments()
            .iter()
            .find_map(|(offset, segment)| segment.find(needle).map(|i| offset + i))
    }

    fn enclosing(&self, span: &Range<usize>) -> Vec<NoteId> {
        self.markers
            .iter()
            .filter(|m| m.open.end <= span.start && span.end <= m.close.start)
            .map(|m| m.id)
            .collect()
    }

    /// Wrap `span` (verse text, never inside a tag) in marker tags
    fn wrap(&mut self, id: NoteId, span: Range<usize>, open: &str) {
        let inserted = open.len() + MARKER_CLOSE.len();
        for marker in &mut self.markers {
            for tag in [&mut marker.open, &mut marker.close] {
                if tag.start >= span.end {
                    *tag = tag.start + inserted..tag.end + inserted;
                }
            }
        }

        self.text.insert_str(span.end, MARKER_CLOSE);
        self.text.insert_str(span.start, open);

        let close_start = span.end + open.len();
        self.markers.push(Marker {
            id,
            open: span.start..span.start + open.len(),
            close: close_start..close_start + MARKER_CLOSE.len(),
        });
    }
}

/// Decorate a verse with marker spans for its notes.
///
/// `notes` must be the notes of this verse, in sequence order.
pub fn inject_note_spans<'a, I>(
    text: &str,
    notes: I,
    marks: NoteMarks,
    markup: &MarkupParams,
) -> String
where
    I: IntoIterator<Item = (NoteId, &'a Note)>,
{
    inject_with_outcomes(text, notes, marks, markup).0
}

/// Decorate a verse and report what happened to each note's anchor
pub fn inject_with_outcomes<'a, I>(
    text: &str,
    notes: I,
    marks: NoteMarks,
    markup: &MarkupParams,
) -> (String, Vec<AnchorRecord>)
where
    I: IntoIterator<Item = (NoteId, &'a Note)>,
{
    let mut verse = DecoratedVerse::new(text);
    let mut records = Vec::new();

    for (id, note) in notes {
        // Count before touching the text
        let outcome = classify(note, verse.count(&note.target_words));
        let mut nested_in = Vec::new();

        if outcome.is_placed() {
            if let Some(start) = verse.find(&note.target_words) {
                let span = start..start + note.target_words.len();
                nested_in = verse.enclosing(&span);
                verse.wrap(id, span, &marker_open(id, marks, markup));
            }
        } else {
            debug!(note = %id, reference = %note.reference, ?outcome, "note anchor not placed");
        }

        records.push(AnchorRecord {
            id,
            outcome,
            nested_in,
        });
    }

    (verse.text, records)
}
