//! Output for the reader: HTML fragments, the static page, audit reports (JSON, CSV).
//!
//! Decorated verse and original-text fragments come from the core unescaped.
//! Everything else taken from the notes (references, glosses, explanations)
//! is escaped here.

use std::io::{self, Write};
use std::path::Path;

use html_escape::{encode_double_quoted_attribute, encode_text};
use thiserror::Error;

use crate::corpus::Corpus;
use crate::models::{
    book_code, display_reference, verse_label, AuditReport, MarkupParams, NoteAudit, NoteId,
    ReportFormat, View,
    NOTE_INDEX_ATTR, NOTE_LIST_REF_ATTR,
};
use crate::selection::Selection;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// HTML fragments
// ============================================================================

/// Every verse with its number and note markers
pub fn render_verse_list(corpus: &Corpus, selection: &Selection, markup: &MarkupParams) -> String {
    let marks = selection.marks();
    let mut html = String::new();

    for address in corpus.addresses() {
        let decorated = corpus
            .verse_with_note_spans(address, marks, markup)
            .unwrap_or_default();
        html.push_str(&format!(
            r#"<span class="verse" data-verse-ref="{}"><span class="verse-number">{}</span><span>{}</span></span>"#,
            encode_double_quoted_attribute(address),
            encode_text(verse_label(address)),
            decorated
        ));
        html.push('\n');
    }

    html
}

fn note_entry(title: &str, body: &str) -> String {
    format!(
        r#"<div class="note-entry"><div class="note-entry-title">{}</div><div class="note-entry-body">{}</div></div>"#,
        title, body
    )
}

/// Detail panel for one note; unknown or absent ids render an empty panel
pub fn render_note_detail(corpus: &Corpus, id: Option<NoteId>, markup: &MarkupParams) -> String {
    let Some((id, note)) = id.and_then(|id| corpus.note(id).map(|note| (id, note))) else {
        return "<div></div>".to_string();
    };

    let original = corpus
        .original_with_highlight(&note.reference, &note.original, markup)
        .unwrap_or_default();

    let mut html = format!(r#"<div class="note-detail" data-note-detail="{}">"#, id);
    html.push_str(&note_entry(
        "Reference",
        &encode_text(&display_reference(&note.reference)),
    ));
    html.push_str(&note_entry(
        "Literal Rendering",
        &encode_text(&note.literal_rendering),
    ));
    html.push_str(&note_entry(
        "Original",
        &format!(r#"<div class="original" dir="rtl">{}</div>"#, original),
    ));
    html.push_str(&note_entry("Note Text", &encode_text(&note.explanation)));
    html.push_str("</div>");
    html
}

/// Every note as a clickable list entry
pub fn render_note_list(corpus: &Corpus, selection: &Selection) -> String {
    let mut html = String::from(r#"<div class="note-list">"#);

    for (i, note) in corpus.notes().iter().enumerate() {
        let id = NoteId(i);
        let mut classes = String::from("note-list-entry");
        if selection.hovered_note == Some(id) {
            classes.push_str(" hover");
        }
        html.push_str(&format!(
            r#"<div class="{}" {}="{}" data-note-entry="{}"><div class="note-entry-title">{}</div><div class="note-entry-body">{}</div></div>"#,
            classes,
            NOTE_LIST_REF_ATTR,
            encode_double_quoted_attribute(&note.reference),
            id,
            encode_text(&display_reference(&note.reference)),
            encode_text(&note.target_words),
        ));
    }

    html.push_str("</div>");
    html
}

/// List/Note tab switcher
pub fn render_tab_bar(view: View) -> String {
    let tab = |label: &str, value: View| {
        let class = if view == value { "tab tab-active" } else { "tab" };
        format!(
            r#"<a class="{}" data-view="{}">{}</a>"#,
            class,
            label.to_lowercase(),
            label
        )
    };
    format!(
        r#"<div class="tab-bar">{}{}</div>"#,
        tab("List", View::List),
        tab("Note", View::Note)
    )
}

// ============================================================================
// Static page
// ============================================================================

/// Self-contained HTML page for reading the corpus.
///
/// Every note's detail panel is rendered up front; the embedded script only
/// toggles visibility and marker classes, using the `data-note-index`
/// attribute on each marker.
pub fn generate_page_html(corpus: &Corpus, selection: &Selection, markup: &MarkupParams) -> String {
    let details: String = (0..corpus.notes().len())
        .map(|i| {
            let id = NoteId(i);
            let hidden = if selection.current_note == Some(id) { "" } else { " hidden" };
            format!(
                "<div class=\"detail-slot\"{}>{}</div>\n",
                hidden,
                render_note_detail(corpus, Some(id), markup)
            )
        })
        .collect();

    let config = serde_json::json!({
        "activeClass": markup.active_class,
        "hoverClass": markup.hover_class,
        "noteClass": markup.note_class,
        "noteIndexAttr": NOTE_INDEX_ATTR,
    });
    // keep the JSON from closing the script element
    let config_json = config.to_string().replace("</", "<\\/");

    let list_hidden = if selection.view == View::List { "" } else { " hidden" };
    let detail_hidden = if selection.view == View::Note { "" } else { " hidden" };

    format!(
        r##"<!DOCTYPE html>
<html lang="en" dir="ltr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Notes on {book}</title>
    <style>{style}</style>
</head>
<body>
    <header><h1>Notes on {book}</h1></header>
    <main>
        <section class="reader">
            <h2 id="current-verse">{heading}</h2>
            <div class="verses">
{verses}            </div>
        </section>
        <aside class="panel">
            {tabs}
            <div id="list-panel"{list_hidden}>{list}</div>
            <div id="detail-panel"{detail_hidden}>
{details}            </div>
        </aside>
    </main>
    <script>
        window.__READER_CONFIG__ = {config};
    </script>
    <script>
{script}
    </script>
</body>
</html>"##,
        book = encode_text(&display_reference(
            corpus.addresses().next().map(book_code).unwrap_or("")
        )),
        style = PAGE_STYLE,
        heading = encode_text(&display_reference(&selection.current_verse)),
        verses = render_verse_list(corpus, selection, markup),
        tabs = render_tab_bar(selection.view),
        list_hidden = list_hidden,
        list = render_note_list(corpus, selection),
        detail_hidden = detail_hidden,
        details = details,
        config = config_json,
        script = PAGE_SCRIPT,
    )
}

/// Write the static page to a file.
pub fn write_page_html_file(
    corpus: &Corpus,
    selection: &Selection,
    markup: &MarkupParams,
    path: &Path,
) -> Result<(), OutputError> {
    let html = generate_page_html(corpus, selection, markup);
    std::fs::write(path, html)?;
    Ok(())
}

const PAGE_STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #1e293b; }
header { background: #fff; padding: 0.5rem 1rem; box-shadow: 0 1px 2px rgba(0,0,0,0.05); }
header h1 { margin: 0; font-size: 1.5rem; }
main { display: flex; height: calc(100vh - 3rem); }
.reader { flex-grow: 1; overflow-y: auto; padding: 2rem 4rem; font-size: 1.125rem; line-height: 1.8; }
.verse-number { color: #2563eb; font-size: 0.8rem; font-weight: bold; padding: 0 0.25rem; position: relative; top: -5px; }
.note { border-bottom: 2px solid #fb923c; cursor: pointer; }
.note.hover { background: #ffedd5; }
.note.active { background: #fed7aa; }
.panel { background: #f1f5f9; min-width: 300px; max-width: 450px; overflow-y: auto; }
.tab-bar { position: sticky; top: 0; display: flex; background: #e2e8f0; font-weight: bold; text-transform: uppercase; }
.tab { flex-grow: 1; padding: 0.5rem; text-align: center; cursor: pointer; border-bottom: 2px solid #e2e8f0; }
.tab-active { color: #f97316; border-color: #f97316; }
.note-list-entry { background: #fff; padding: 0.5rem 1rem; border-bottom: 1px solid #f1f5f9; cursor: pointer; scroll-margin-top: 60px; }
.note-list-entry:hover, .note-list-entry.hover { background: #f1f5f9; }
.note-detail { background: #fff; margin: 1rem; padding: 2rem; }
.note-entry { margin-bottom: 1.5rem; }
.note-entry-title { color: #94a3b8; font-size: 0.875rem; font-weight: bold; }
.original { font-family: "SBL Biblit", "SBL Hebrew", serif; font-size: 1.5rem; background: #f1f5f9; padding: 1rem; border-radius: 4px; }
.bg-yellow-200 { background: #fef08a; }
[hidden] { display: none !important; }
"#;

const PAGE_SCRIPT: &str = r#"
(function () {
    const config = window.__READER_CONFIG__;
    const attr = config.noteIndexAttr;
    const markers = Array.from(document.querySelectorAll('.' + config.noteClass + '[' + attr + ']'));
    const entries = Array.from(document.querySelectorAll('[data-note-entry]'));
    const slots = Array.from(document.querySelectorAll('.detail-slot'));
    const listPanel = document.getElementById('list-panel');
    const detailPanel = document.getElementById('detail-panel');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    function showView(view) {
        listPanel.hidden = view !== 'list';
        detailPanel.hidden = view !== 'note';
        tabs.forEach(tab => tab.classList.toggle('tab-active', tab.dataset.view === view));
    }

    function markNotes(className, id) {
        markers.forEach(m => m.classList.toggle(className, m.getAttribute(attr) === String(id)));
    }

    function selectNote(id) {
        slots.forEach(slot => {
            const detail = slot.querySelector('[data-note-detail]');
            slot.hidden = !detail || detail.dataset.noteDetail !== String(id);
        });
        markNotes(config.activeClass, id);
        showView('note');
    }

    function hoverNote(id) {
        markNotes(config.hoverClass, id);
        entries.forEach(e => e.classList.toggle('hover', id !== null && e.dataset.noteEntry === String(id)));
    }

    markers.forEach(marker => {
        const id = marker.getAttribute(attr);
        marker.addEventListener('click', event => {
            event.stopPropagation();
            selectNote(id);
        });
    });

    entries.forEach(entry => {
        const id = entry.dataset.noteEntry;
        entry.addEventListener('click', () => {
            selectNote(id);
            hoverNote(null);
        });
        entry.addEventListener('mouseenter', () => hoverNote(id));
    });
    listPanel.addEventListener('mouseleave', () => hoverNote(null));

    document.querySelectorAll('.verse').forEach(verse => {
        verse.addEventListener('mouseenter', () => {
            const ref = verse.dataset.verseRef;
            document.getElementById('current-verse').textContent = ref.replace('EST', 'Esther');
            const target = listPanel.querySelector('[data-notelist-ref="' + CSS.escape(ref) + '"]');
            if (target && !listPanel.hidden) {
                target.scrollIntoView({ behavior: 'smooth' });
            }
        });
    });

    tabs.forEach(tab => tab.addEventListener('click', () => showView(tab.dataset.view)));
})();
"#;

// ============================================================================
// Note detail (plain text)
// ============================================================================

/// Format a note's detail for the terminal.
///
/// The original text keeps its highlight markup so the matched span is visible.
pub fn format_note_detail(corpus: &Corpus, id: NoteId, markup: &MarkupParams) -> Option<String> {
    let note = corpus.note(id)?;
    let original = corpus
        .original_with_highlight(&note.reference, &note.original, markup)
        .unwrap_or_else(|| "(no original text)".to_string());

    Some(format!(
        "Note {}\n\
         Reference: {}\n\
         Target words: {}\n\
         Literal rendering: {}\n\
         Original: {}\n\
         Note text: {}\n\
         Significance: {:.2}  Literalness: {:.2}",
        id,
        display_reference(&note.reference),
        if note.target_words.is_empty() {
            "(none)"
        } else {
            note.target_words.as_str()
        },
        note.literal_rendering,
        original,
        note.explanation,
        note.exegetical_significance,
        note.literalness,
    ))
}

// ============================================================================
// Audit reports
// ============================================================================

/// Write an audit report as JSON.
pub fn write_json<W: Write>(report: &AuditReport, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(report)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

/// Write an audit report as JSON to a file.
pub fn write_json_file(report: &AuditReport, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(report, &mut file)
}

fn anchor_label(audit: &NoteAudit) -> String {
    use crate::models::AnchorOutcome::*;
    match audit.anchor {
        Placed => "placed".to_string(),
        Ambiguous { occurrences } => format!("ambiguous({})", occurrences),
        Missing => "missing".to_string(),
        Unanchored => "unanchored".to_string(),
        NoVerse => "no_verse".to_string(),
    }
}

/// Write per-note audit rows as CSV.
pub fn write_csv<W: Write>(notes: &[NoteAudit], writer: &mut W) -> Result<(), OutputError> {
    writeln!(
        writer,
        "id,ref,target_words,anchor,strategy,has_original,overlaps_with"
    )?;

    for note in notes {
        let overlaps: Vec<String> = note.overlaps_with.iter().map(NoteId::to_string).collect();
        writeln!(
            writer,
            "{},{:?},{:?},{},{},{},{:?}",
            note.id,
            note.reference,
            note.target_words,
            anchor_label(note),
            note.strategy.map(|s| s.label()).unwrap_or("none"),
            note.has_original,
            overlaps.join(" "),
        )?;
    }

    Ok(())
}

/// Write per-note audit rows as CSV to a file.
pub fn write_csv_file(notes: &[NoteAudit], path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_csv(notes, &mut file)
}

/// Write an audit report in the requested format.
pub fn write_report<W: Write>(
    report: &AuditReport,
    format: ReportFormat,
    writer: &mut W,
) -> Result<(), OutputError> {
    match format {
        ReportFormat::Json => {
            write_json(report, writer)?;
            writeln!(writer)?;
            Ok(())
        }
        ReportFormat::Csv => write_csv(&report.notes, writer),
    }
}

/// Write an audit report in the requested format to a file.
pub fn write_report_file(
    report: &AuditReport,
    format: ReportFormat,
    path: &Path,
) -> Result<(), OutputError> {
    match format {
        ReportFormat::Json => write_json_file(report, path),
        ReportFormat::Csv => write_csv_file(&report.notes, path),
    }
}

/// Format one audit row as a human-readable line.
pub fn format_note_audit(audit: &NoteAudit) -> String {
    let mut line = format!(
        "Note {} [{}] anchor={} original={}",
        audit.id,
        audit.reference,
        anchor_label(audit),
        match (audit.has_original, audit.strategy) {
            (false, _) => "missing-text",
            (true, Some(strategy)) => strategy.label(),
            (true, None) => "unaligned",
        }
    );
    if !audit.overlaps_with.is_empty() {
        let ids: Vec<String> = audit.overlaps_with.iter().map(NoteId::to_string).collect();
        line.push_str(&format!(" overlaps={}", ids.join(",")));
    }
    line
}

/// Print audit rows that need attention (unplaced anchors, unaligned excerpts, overlaps).
pub fn print_problem_notes(report: &AuditReport, limit: Option<usize>) {
    let problems: Vec<&NoteAudit> = report
        .notes
        .iter()
        .filter(|n| {
            !matches!(
                n.anchor,
                crate::models::AnchorOutcome::Placed | crate::models::AnchorOutcome::Unanchored
            ) || n.strategy.is_none()
                || !n.overlaps_with.is_empty()
        })
        .collect();

    let to_print = match limit {
        Some(n) => &problems[..n.min(problems.len())],
        None => &problems[..],
    };

    for audit in to_print {
        println!("{}", format_note_audit(audit));
    }

    if let Some(n) = limit {
        if problems.len() > n {
            println!("... and {} more notes", problems.len() - n);
        }
    }
}

/// Write a summary report to stdout.
pub fn print_summary(report: &AuditReport) {
    let s = &report.summary;
    println!("\n=== Alignment Audit ===");
    println!("Version: {}", report.version);
    println!();
    println!("Notes: {} across {} verses", s.note_count, s.verse_count);
    println!();
    println!("Anchors:");
    println!("  Placed: {}", s.anchors_placed);
    println!("  Ambiguous (skipped): {}", s.anchors_ambiguous);
    println!("  Missing: {}", s.anchors_missing);
    println!("  No target words: {}", s.unanchored);
    println!("  Overlapping another anchor: {}", s.overlapping_anchors);
    println!();
    println!("Original text:");
    println!("  Exact: {}", s.exact_matches);
    println!("  Accent-stripped: {}", s.accent_stripped_matches);
    println!("  Vowel-stripped: {}", s.vowel_stripped_matches);
    println!("  Unaligned: {}", s.unaligned);
}
