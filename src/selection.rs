//! Reader selection state.
//!
//! The presentation layer owns one [`Selection`] and mutates it from pointer
//! events; the core functions only read it. Every transition identifies notes
//! by [`NoteId`], the same value carried by the inline markers.

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::models::{Note, NoteId, NoteMarks, View};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Verse under the pointer
    pub current_verse: String,
    pub current_note: Option<NoteId>,
    pub hovered_note: Option<NoteId>,
    pub view: View,
}

impl Selection {
    pub fn new(current_verse: impl Into<String>) -> Self {
        Self {
            current_verse: current_verse.into(),
            current_note: None,
            hovered_note: None,
            view: View::Note,
        }
    }

    /// Initial state: first verse, first note, detail view
    pub fn starting_at(corpus: &Corpus) -> Self {
        let first_verse = corpus.addresses().next().unwrap_or_default();
        Self {
            current_note: (!corpus.notes().is_empty()).then_some(NoteId(0)),
            ..Self::new(first_verse)
        }
    }

    pub fn marks(&self) -> NoteMarks {
        NoteMarks {
            active: self.current_note,
            hovered: self.hovered_note,
        }
    }

    /// Click on an inline marker: show the note's detail
    pub fn select(&mut self, id: NoteId) {
        self.current_note = Some(id);
        self.view = View::Note;
    }

    /// Click on a note list entry: show the detail and drop the list hover
    pub fn select_from_list(&mut self, id: NoteId) {
        self.select(id);
        self.hovered_note = None;
    }

    /// Select from a raw marker attribute value.
    ///
    /// A value that does not parse clears the selection, so the detail panel
    /// shows nothing. Returns the parsed id.
    pub fn select_from_attr(&mut self, raw: &str) -> Option<NoteId> {
        match raw.parse::<NoteId>() {
            Ok(id) => {
                self.select(id);
                Some(id)
            }
            Err(_) => {
                self.current_note = None;
                self.view = View::Note;
                None
            }
        }
    }

    pub fn hover(&mut self, id: NoteId) {
        self.hovered_note = Some(id);
    }

    /// Pointer left the note list
    pub fn clear_hover(&mut self) {
        self.hovered_note = None;
    }

    /// Pointer entered a verse
    pub fn enter_verse(&mut self, address: impl Into<String>) {
        self.current_verse = address.into();
    }

    /// Tab switch
    pub fn show(&mut self, view: View) {
        self.view = view;
    }

    /// The selected note, if it exists in the corpus
    pub fn current<'a>(&self, corpus: &'a Corpus) -> Option<(NoteId, &'a Note)> {
        let id = self.current_note?;
        corpus.note(id).map(|note| (id, note))
    }

    /// Note the list scrolls to: the first note of the current verse
    pub fn list_scroll_target(&self, corpus: &Corpus) -> Option<NoteId> {
        corpus.first_note_for(&self.current_verse)
    }
}
