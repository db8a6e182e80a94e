//! Batch alignment report over every note in a corpus.
//!
//! Runs both components the way the reader would: anchors are placed verse by
//! verse on the progressively decorated text, excerpts are aligned against
//! the canonical Hebrew. Verses are independent, so both passes fan out over
//! rayon.

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::align::align_excerpt;
use crate::corpus::Corpus;
use crate::inject::inject_with_outcomes;
use crate::models::{
    AnchorOutcome, AuditReport, AuditSummary, MarkupParams, MatchStrategy, Note, NoteAudit,
    NoteId, NoteMarks,
};

/// Audit every note of the corpus
pub fn audit_corpus(corpus: &Corpus, show_progress: bool) -> AuditReport {
    let markup = MarkupParams::default();

    let mut addresses: Vec<&str> = corpus
        .notes()
        .iter()
        .map(|note| note.reference.as_str())
        .collect();
    addresses.sort_unstable();
    addresses.dedup();

    if show_progress {
        eprintln!(
            "Placing anchors for {} notes across {} verses...",
            corpus.notes().len(),
            addresses.len()
        );
    }

    // Anchor outcomes and overlaps, verse by verse
    let per_verse: Vec<Vec<(NoteId, AnchorOutcome, Vec<NoteId>)>> = addresses
        .par_iter()
        .map(|&address| audit_verse_anchors(corpus, address, &markup))
        .collect();

    let anchors: HashMap<NoteId, (AnchorOutcome, Vec<NoteId>)> = per_verse
        .into_iter()
        .flatten()
        .map(|(id, outcome, overlaps)| (id, (outcome, overlaps)))
        .collect();

    if show_progress {
        eprintln!("Aligning excerpts with the original text...");
    }

    let progress = if show_progress {
        let pb = ProgressBar::new(corpus.notes().len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let notes: Vec<NoteAudit> = corpus
        .notes()
        .par_iter()
        .enumerate()
        .map(|(i, note)| {
            let id = NoteId(i);
            let (anchor, overlaps_with) = anchors
                .get(&id)
                .cloned()
                .unwrap_or((AnchorOutcome::NoVerse, Vec::new()));
            let audit = audit_note(corpus, id, note, anchor, overlaps_with);

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            audit
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    AuditReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        summary: summarize(&notes, addresses.len()),
        notes,
    }
}

fn audit_note(
    corpus: &Corpus,
    id: NoteId,
    note: &Note,
    anchor: AnchorOutcome,
    overlaps_with: Vec<NoteId>,
) -> NoteAudit {
    let original = corpus.original_text(&note.reference);
    let strategy = original
        .and_then(|canonical| align_excerpt(canonical, &note.original))
        .map(|m| m.strategy);

    NoteAudit {
        id,
        reference: note.reference.clone(),
        target_words: note.target_words.clone(),
        anchor,
        strategy,
        has_original: original.is_some(),
        overlaps_with,
    }
}

/// Anchor outcome of each note of one verse, plus earlier markers its anchor was nested in
fn audit_verse_anchors(
    corpus: &Corpus,
    address: &str,
    markup: &MarkupParams,
) -> Vec<(NoteId, AnchorOutcome, Vec<NoteId>)> {
    let Some(text) = corpus.verse_text(address) else {
        return corpus
            .notes_for(address)
            .map(|(id, _)| (id, AnchorOutcome::NoVerse, Vec::new()))
            .collect();
    };

    let (_, records) = inject_with_outcomes(
        text,
        corpus.notes_for(address),
        NoteMarks::default(),
        markup,
    );

    records
        .into_iter()
        .map(|record| (record.id, record.outcome, record.nested_in))
        .collect()
}

fn summarize(notes: &[NoteAudit], verse_count: usize) -> AuditSummary {
    let mut summary = AuditSummary {
        note_count: notes.len(),
        verse_count,
        ..Default::default()
    };

    for note in notes {
        match note.anchor {
            AnchorOutcome::Placed => summary.anchors_placed += 1,
            AnchorOutcome::Ambiguous { .. } => summary.anchors_ambiguous += 1,
            AnchorOutcome::Missing | AnchorOutcome::NoVerse => summary.anchors_missing += 1,
            AnchorOutcome::Unanchored => summary.unanchored += 1,
        }
        match note.strategy {
            Some(MatchStrategy::Exact) => summary.exact_matches += 1,
            Some(MatchStrategy::AccentStripped) => summary.accent_stripped_matches += 1,
            Some(MatchStrategy::VowelStripped) => summary.vowel_stripped_matches += 1,
            None => summary.unaligned += 1,
        }
        if !note.overlaps_with.is_empty() {
            summary.overlapping_anchors += 1;
        }
    }

    summary
}
