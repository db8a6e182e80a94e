//! Integration tests for esther-notes.
//!
//! These tests run the reader end to end over the bundled Esther 1:1-5 data:
//! anchor placement, excerpt alignment, selection and page rendering.

use esther_notes::align::{align_excerpt, highlight_excerpt};
use esther_notes::audit::audit_corpus;
use esther_notes::corpus::Corpus;
use esther_notes::inject::{count_occurrences, inject_note_spans};
use esther_notes::models::{AnchorOutcome, MarkupParams, MatchStrategy, Note, NoteId, NoteMarks, View};
use esther_notes::output::{generate_page_html, write_csv, write_json};
use esther_notes::selection::Selection;

fn bundled() -> Corpus {
    Corpus::bundled().expect("bundled data parses")
}

/// Helper to build a note for ad-hoc corpora.
fn note(reference: &str, original: &str, target_words: &str) -> Note {
    Note {
        reference: reference.to_string(),
        original: original.to_string(),
        literal_rendering: String::new(),
        explanation: String::new(),
        exegetical_significance: 0.0,
        literalness: 0.0,
        target_words: target_words.to_string(),
    }
}

fn marker(id: usize, words: &str) -> String {
    format!(r#"<span class="note" data-note-index="{}">{}</span>"#, id, words)
}

#[test]
fn test_bundled_alignment_strategies() {
    use MatchStrategy::*;

    let corpus = bundled();
    let expected = [
        Some(Exact),
        Some(Exact),
        Some(AccentStripped),
        Some(VowelStripped),
        Some(VowelStripped),
        Some(VowelStripped),
        Some(Exact),
        Some(Exact),
        Some(VowelStripped),
        Some(Exact),
        Some(VowelStripped),
        Some(VowelStripped),
        Some(VowelStripped),
        Some(VowelStripped),
        Some(VowelStripped),
        // maqaf joins עד־קטן, the excerpt separates the words
        None,
        Some(VowelStripped),
    ];
    assert_eq!(corpus.notes().len(), expected.len());

    for (i, note) in corpus.notes().iter().enumerate() {
        let canonical = corpus.original_text(&note.reference).unwrap();
        let strategy = align_excerpt(canonical, &note.original).map(|m| m.strategy);
        assert_eq!(strategy, expected[i], "note {}", i);
    }
}

#[test]
fn test_bundled_anchor_outcomes() {
    let corpus = bundled();
    let report = audit_corpus(&corpus, false);

    let ambiguous: Vec<(NoteId, AnchorOutcome)> = report
        .notes
        .iter()
        .filter(|n| !n.anchor.is_placed())
        .map(|n| (n.id, n.anchor))
        .collect();

    assert_eq!(
        ambiguous,
        vec![
            (NoteId(1), AnchorOutcome::Ambiguous { occurrences: 2 }),
            (NoteId(9), AnchorOutcome::Unanchored),
            (NoteId(14), AnchorOutcome::Ambiguous { occurrences: 2 }),
        ]
    );

    // "a feast" lands inside the marker for "he made a feast"
    assert_eq!(report.notes[7].overlaps_with, vec![NoteId(6)]);

    let s = &report.summary;
    assert_eq!(s.note_count, 17);
    assert_eq!(s.verse_count, 5);
    assert_eq!(s.anchors_placed, 14);
    assert_eq!(s.anchors_ambiguous, 2);
    assert_eq!(s.unanchored, 1);
    assert_eq!(s.exact_matches, 5);
    assert_eq!(s.accent_stripped_matches, 1);
    assert_eq!(s.vowel_stripped_matches, 10);
    assert_eq!(s.unaligned, 1);
    assert_eq!(s.overlapping_anchors, 1);
}

#[test]
fn test_decorated_verse_one() {
    let corpus = bundled();
    let html = corpus
        .verse_with_note_spans("EST 1:1", NoteMarks::default(), &MarkupParams::default())
        .unwrap();

    assert!(html.starts_with(&marker(0, "Now it came to pass")));
    assert!(html.contains(&marker(2, "which reigned")));
    assert!(html.contains(&marker(3, "an hundred and seven and twenty provinces")));
    // Ahasuerus appears twice: no marker
    assert_eq!(count_occurrences(&html, "data-note-index=\"1\""), 0);
    assert_eq!(count_occurrences(&html, "Ahasuerus"), 2);
}

#[test]
fn test_decorated_verse_marks_selection() {
    let corpus = bundled();
    let mut selection = Selection::starting_at(&corpus);
    selection.enter_verse("EST 1:5");
    selection.select(NoteId(13));
    selection.hover(NoteId(16));

    let html = corpus
        .verse_with_note_spans("EST 1:5", selection.marks(), &MarkupParams::default())
        .unwrap();
    assert!(html.contains(r#"<span class="note active" data-note-index="13">Shushan the palace</span>"#));
    assert!(html.contains(r#"<span class="note hover" data-note-index="16">the garden</span>"#));
    assert!(html.contains(&marker(12, "the king made a feast")));
}

#[test]
fn test_highlight_keeps_verse_punctuation() {
    let corpus = bundled();
    let markup = MarkupParams::default();

    // bare excerpt ending at the last word: sof pasuq stays outside
    let html = corpus.note_original_with_highlight(NoteId(3), &markup).unwrap();
    assert!(html.ends_with("</span>\u{05C3}"));
    assert!(html.contains(r#"<span class="bg-yellow-200">"#));

    // no match: canonical text unchanged
    let unaligned = corpus.note_original_with_highlight(NoteId(15), &markup).unwrap();
    assert_eq!(unaligned, corpus.original_text("EST 1:5").unwrap());
}

#[test]
fn test_accent_stripped_highlight_uses_excerpt() {
    let corpus = bundled();
    let note = corpus.note(NoteId(2)).unwrap();
    let canonical = corpus.original_text("EST 1:1").unwrap();

    let html = highlight_excerpt(canonical, &note.original, &MarkupParams::default());
    let wrapped = format!(r#"<span class="bg-yellow-200">{}</span>"#, note.original);
    assert!(html.contains(&wrapped));
    // the zaqef of the canonical word is replaced with the excerpt
    assert!(!html.contains('\u{0594}'));
}

#[test]
fn test_scenario_single_occurrence() {
    let notes = [note("EST 1:1", "", "a feast")];
    let html = inject_note_spans(
        "the king gave a feast",
        notes.iter().enumerate().map(|(i, n)| (NoteId(i), n)),
        NoteMarks::default(),
        &MarkupParams::default(),
    );
    assert_eq!(html, format!("the king gave {}", marker(0, "a feast")));
}

#[test]
fn test_scenario_repeated_word_unchanged() {
    let notes = [note("EST 1:1", "", "word")];
    let html = inject_note_spans(
        "the word word appears",
        notes.iter().enumerate().map(|(i, n)| (NoteId(i), n)),
        NoteMarks::default(),
        &MarkupParams::default(),
    );
    assert_eq!(html, "the word word appears");
}

#[test]
fn test_scenario_address_without_notes() {
    let corpus = Corpus::new(
        [("EST 2:1".to_string(), "After these things".to_string())]
            .into_iter()
            .collect(),
        Default::default(),
        vec![note("EST 1:1", "", "things")],
    );
    let html = corpus
        .verse_with_note_spans("EST 2:1", NoteMarks::default(), &MarkupParams::default())
        .unwrap();
    assert_eq!(html, "After these things");
}

#[test]
fn test_scenario_vowel_stripped_davar() {
    let canonical = "\u{05D3}\u{05BC}\u{05B8}\u{05D1}\u{05B8}\u{05E8}";
    let excerpt = "\u{05D3}\u{05D1}\u{05E8}";

    let m = align_excerpt(canonical, excerpt).unwrap();
    assert_eq!(m.strategy, MatchStrategy::VowelStripped);
    assert_eq!(
        highlight_excerpt(canonical, excerpt, &MarkupParams::default()),
        format!(r#"<span class="bg-yellow-200">{}</span>"#, excerpt)
    );
}

#[test]
fn test_marker_attribute_selects_note() {
    let corpus = bundled();
    let html = corpus
        .verse_with_note_spans("EST 1:4", NoteMarks::default(), &MarkupParams::default())
        .unwrap();

    // pull the id back out of the first marker, as a click handler would
    let attr = "data-note-index=\"";
    let start = html.find(attr).unwrap() + attr.len();
    let end = start + html[start..].find('"').unwrap();

    let mut selection = Selection::starting_at(&corpus);
    selection.show(View::List);
    let id = selection.select_from_attr(&html[start..end]).unwrap();

    assert_eq!(id, NoteId(10));
    assert_eq!(selection.view, View::Note);
    assert_eq!(selection.current(&corpus).unwrap().1.target_words, "the riches");
}

#[test]
fn test_page_contains_every_placed_marker() {
    let corpus = bundled();
    let selection = Selection::starting_at(&corpus);
    let html = generate_page_html(&corpus, &selection, &MarkupParams::default());

    let report = audit_corpus(&corpus, false);
    for audit in &report.notes {
        let attr = format!("data-note-index=\"{}\"", audit.id);
        assert_eq!(
            html.contains(&attr),
            audit.anchor.is_placed(),
            "note {}",
            audit.id
        );
        assert!(html.contains(&format!("data-note-detail=\"{}\"", audit.id)));
    }

    assert!(html.contains(r#"<h2 id="current-verse">Esther 1:1</h2>"#));
    assert!(html.contains(r#"dir="rtl""#));
}

#[test]
fn test_audit_reports_serialize() {
    let report = audit_corpus(&bundled(), false);

    let mut json = Vec::new();
    write_json(&report, &mut json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["summary"]["note_count"], 17);
    assert_eq!(value["notes"][15]["strategy"], serde_json::Value::Null);

    let mut csv = Vec::new();
    write_csv(&report.notes, &mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().count(), 18);
    assert!(csv.contains(r#"14,"EST 1:5","days",ambiguous(2),vowel-stripped,true,"""#));
}
