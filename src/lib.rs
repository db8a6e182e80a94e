//! Esther Notes Alignment Library
//!
//! Attaches scholarly notes to the text of Esther. Notes are anchored inline
//! in the rendered verse by their target words, and each note's Hebrew excerpt
//! is located in the canonical pointed text through a cascade of
//! normalizations (exact, accent-stripped, vowel-stripped).
//!
//! # Example
//!
//! ```no_run
//! use esther_notes::prelude::*;
//!
//! let corpus = Corpus::bundled().unwrap();
//! let markup = MarkupParams::default();
//! let selection = Selection::starting_at(&corpus);
//!
//! // Rendered verse with inline note markers
//! let verse = corpus
//!     .verse_with_note_spans("EST 1:1", selection.marks(), &markup)
//!     .unwrap();
//! println!("{}", verse);
//!
//! // Canonical Hebrew with the selected note's excerpt highlighted
//! if let Some(html) = corpus.note_original_with_highlight(NoteId(0), &markup) {
//!     println!("{}", html);
//! }
//! ```
//!
//! # Audit Example
//!
//! ```no_run
//! use esther_notes::prelude::*;
//!
//! let corpus = Corpus::bundled().unwrap();
//! let report = audit_corpus(&corpus, false);
//!
//! for note in &report.notes {
//!     if note.strategy.is_none() {
//!         println!("{}", format_note_audit(note));
//!     }
//! }
//! ```

pub mod align;
pub mod audit;
pub mod corpus;
pub mod inject;
pub mod models;
pub mod normalize;
pub mod output;
pub mod selection;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::align::{
        align_excerpt, find_with_strategy, highlight_excerpt, splice_highlight, wrap_highlight,
        ExcerptMatch, CASCADE,
    };
    pub use crate::audit::audit_corpus;
    pub use crate::corpus::{Corpus, DataError};
    pub use crate::inject::{
        anchor_outcome, count_occurrences, inject_note_spans, inject_with_outcomes, note_span,
        AnchorRecord,
    };
    pub use crate::models::{
        book_code, display_reference, verse_label, AnchorOutcome, AuditReport, AuditSummary, MarkupParams,
        MatchStrategy, Note, NoteAudit, NoteId, NoteMarks, OriginalText, ReportFormat, VerseText, View,
        NOTE_INDEX_ATTR, NOTE_LIST_REF_ATTR,
    };
    pub use crate::normalize::{strip_accents, strip_vowels, NormalizedText};
    pub use crate::output::{
        format_note_audit, format_note_detail, generate_page_html, print_problem_notes,
        print_summary, render_note_detail, render_note_list, render_tab_bar, render_verse_list,
        write_csv, write_csv_file, write_json, write_json_file, write_page_html_file, write_report,
        write_report_file,
        OutputError,
    };
    pub use crate::selection::Selection;
}

// Re-export commonly used types at the crate root
pub use corpus::Corpus;
pub use models::{MarkupParams, MatchStrategy, Note, NoteId};
