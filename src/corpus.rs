//! Dataset loading and note addressing.
//!
//! The three datasets (rendered verses, canonical Hebrew, notes) are loaded
//! once and never mutated. A bundled copy of Esther 1:1-5 ships with the crate.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::align::highlight_excerpt;
use crate::inject::inject_note_spans;
use crate::models::{MarkupParams, Note, NoteId, NoteMarks, OriginalText, VerseText};

const BUNDLED_VERSES: &str = include_str!("../data/est1.json");
const BUNDLED_ORIGINALS: &str = include_str!("../data/est1_orig.json");
const BUNDLED_NOTES: &str = include_str!("../data/notes.json");

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {dataset}: {source}")]
    Json {
        dataset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown verse address: {0}")]
    UnknownAddress(String),
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),
}

fn parse<T: serde::de::DeserializeOwned>(dataset: &'static str, json: &str) -> Result<T, DataError> {
    serde_json::from_str(json).map_err(|source| DataError::Json { dataset, source })
}

fn read_or_bundled(path: Option<&Path>, bundled: &'static str) -> Result<String, DataError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(bundled.to_string()),
    }
}

/// The three static datasets
#[derive(Debug, Clone)]
pub struct Corpus {
    verses: VerseText,
    originals: OriginalText,
    notes: Vec<Note>,
}

impl Corpus {
    pub fn new(verses: VerseText, originals: OriginalText, notes: Vec<Note>) -> Self {
        let corpus = Self {
            verses,
            originals,
            notes,
        };
        corpus.report_inconsistencies();
        corpus
    }

    /// Parse the datasets from JSON strings
    pub fn from_json_strs(verses: &str, originals: &str, notes: &str) -> Result<Self, DataError> {
        Ok(Self::new(
            parse("verses", verses)?,
            parse("originals", originals)?,
            parse("notes", notes)?,
        ))
    }

    /// Load the datasets from JSON files
    pub fn load(verses: &Path, originals: &Path, notes: &Path) -> Result<Self, DataError> {
        Self::from_sources(Some(verses), Some(originals), Some(notes))
    }

    /// Load each dataset from a file when a path is given, otherwise use the bundled copy
    pub fn from_sources(
        verses: Option<&Path>,
        originals: Option<&Path>,
        notes: Option<&Path>,
    ) -> Result<Self, DataError> {
        let verses = read_or_bundled(verses, BUNDLED_VERSES)?;
        let originals = read_or_bundled(originals, BUNDLED_ORIGINALS)?;
        let notes = read_or_bundled(notes, BUNDLED_NOTES)?;
        Self::from_json_strs(&verses, &originals, &notes)
    }

    /// Bundled Esther 1:1-5
    pub fn bundled() -> Result<Self, DataError> {
        Self::from_json_strs(BUNDLED_VERSES, BUNDLED_ORIGINALS, BUNDLED_NOTES)
    }

    pub fn verses(&self) -> &VerseText {
        &self.verses
    }

    pub fn originals(&self) -> &OriginalText {
        &self.originals
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Verse addresses in document order
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.verses.keys().map(String::as_str)
    }

    pub fn verse_text(&self, address: &str) -> Option<&str> {
        self.verses.get(address).map(String::as_str)
    }

    pub fn original_text(&self, address: &str) -> Option<&str> {
        self.originals.get(address).map(String::as_str)
    }

    /// Look up a note by identity; unknown ids yield None
    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id.0)
    }

    /// Notes of one verse, in sequence order, with their identities
    pub fn notes_for<'a>(&'a self, address: &'a str) -> impl Iterator<Item = (NoteId, &'a Note)> + 'a {
        self.notes
            .iter()
            .enumerate()
            .filter(move |(_, note)| note.reference == address)
            .map(|(i, note)| (NoteId(i), note))
    }

    /// First note of a verse (the note list scrolls here when the verse changes)
    pub fn first_note_for(&self, address: &str) -> Option<NoteId> {
        self.notes_for(address).next().map(|(id, _)| id)
    }

    /// Rendered verse decorated with marker spans for its notes
    pub fn verse_with_note_spans(
        &self,
        address: &str,
        marks: NoteMarks,
        markup: &MarkupParams,
    ) -> Option<String> {
        let text = self.verse_text(address)?;
        Some(inject_note_spans(text, self.notes_for(address), marks, markup))
    }

    /// Canonical Hebrew of a verse with `excerpt` highlighted
    pub fn original_with_highlight(
        &self,
        address: &str,
        excerpt: &str,
        markup: &MarkupParams,
    ) -> Option<String> {
        match self.original_text(address) {
            Some(canonical) => Some(highlight_excerpt(canonical, excerpt, markup)),
            None => {
                warn!(address, "no original text for address");
                None
            }
        }
    }

    /// Canonical Hebrew of a note's verse with the note's excerpt highlighted
    pub fn note_original_with_highlight(&self, id: NoteId, markup: &MarkupParams) -> Option<String> {
        let note = self.note(id)?;
        self.original_with_highlight(&note.reference, &note.original, markup)
    }

    /// Addresses referenced by notes that have no canonical Hebrew text
    pub fn missing_originals(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = self
            .notes
            .iter()
            .map(|note| note.reference.as_str())
            .filter(|address| !self.originals.contains_key(*address))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// Addresses referenced by notes that have no rendered verse
    pub fn missing_verses(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = self
            .notes
            .iter()
            .map(|note| note.reference.as_str())
            .filter(|address| !self.verses.contains_key(*address))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    fn report_inconsistencies(&self) {
        debug!(
            verses = self.verses.len(),
            originals = self.originals.len(),
            notes = self.notes.len(),
            "corpus loaded"
        );
        for address in self.missing_originals() {
            warn!(address, "notes reference an address with no original text");
        }
        for address in self.missing_verses() {
            warn!(address, "notes reference an address with no rendered verse");
        }
    }
}
