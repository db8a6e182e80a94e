//! Esther Notes Reader
//!
//! Decorates verses of Esther with inline note markers, highlights each
//! note's Hebrew excerpt in the canonical text, and audits alignment quality.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use esther_notes::audit::audit_corpus;
use esther_notes::corpus::{Corpus, DataError};
use esther_notes::models::{MarkupParams, NoteId, ReportFormat, View};
use esther_notes::output::{
    format_note_detail, print_problem_notes, print_summary, write_page_html_file, write_report,
    write_report_file,
};
use esther_notes::selection::Selection;

#[derive(Parser)]
#[command(name = "esther-notes")]
#[command(about = "Note alignment for an annotated reading of Esther")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rendered verse dataset (JSON object address -> text) [default: bundled]
    #[arg(long, global = true)]
    verses: Option<PathBuf>,

    /// Canonical Hebrew dataset (JSON object address -> text) [default: bundled]
    #[arg(long, global = true)]
    originals: Option<PathBuf>,

    /// Notes dataset (JSON array) [default: bundled]
    #[arg(long, global = true)]
    notes: Option<PathBuf>,

    // === Markup classes, overlaid onto MarkupParams::default() ===

    /// Class of the original-text highlight [default: bg-yellow-200]
    #[arg(long, global = true)]
    highlight_class: Option<String>,

    /// Class of inline note markers [default: note]
    #[arg(long, global = true)]
    note_class: Option<String>,

    /// Class added to the selected note's marker [default: active]
    #[arg(long, global = true)]
    active_class: Option<String>,

    /// Class added to the hovered note's marker [default: hover]
    #[arg(long, global = true)]
    hover_class: Option<String>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format for audit reports (CLI version, mirrors models::ReportFormat)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// JSON report with summary and per-note rows
    Json,
    /// CSV with one row per note
    Csv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Csv => ReportFormat::Csv,
        }
    }
}

/// Side panel view (CLI version, mirrors models::View)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliView {
    /// Note list
    List,
    /// Selected note detail
    Note,
}

impl From<CliView> for View {
    fn from(view: CliView) -> Self {
        match view {
            CliView::List => View::List,
            CliView::Note => View::Note,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a verse decorated with its note markers
    Verse {
        /// Verse address, e.g. "EST 1:1"
        #[arg(long)]
        address: String,

        /// Selected note id (marker gets the active class)
        #[arg(long)]
        note: Option<NoteId>,

        /// Hovered note id (marker gets the hover class)
        #[arg(long)]
        hover: Option<NoteId>,
    },

    /// Show a note with its excerpt highlighted in the original text
    Note {
        /// Note id (index in the notes dataset)
        #[arg(long)]
        id: NoteId,

        /// Print the note and its highlighted original as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a self-contained HTML reader page
    Render {
        /// Output HTML path
        #[arg(long)]
        output: PathBuf,

        /// Verse shown as current [default: first verse]
        #[arg(long)]
        verse: Option<String>,

        /// Selected note [default: first note]
        #[arg(long)]
        note: Option<NoteId>,

        /// Hovered note
        #[arg(long)]
        hover: Option<NoteId>,

        /// Side panel view [default: note]
        #[arg(long, value_enum)]
        view: Option<CliView>,
    },

    /// Report anchor placement and excerpt alignment for every note
    Audit {
        /// Output file path (with --quiet and no path, the report goes to stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Print first N problem notes to console
        #[arg(long)]
        show_problems: Option<usize>,

        /// Suppress progress output
        #[arg(long)]
        quiet: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Start with library defaults, overlay user-specified classes
    let defaults = MarkupParams::default();
    let markup = MarkupParams {
        note_class: cli.note_class.unwrap_or(defaults.note_class),
        active_class: cli.active_class.unwrap_or(defaults.active_class),
        hover_class: cli.hover_class.unwrap_or(defaults.hover_class),
        highlight_class: cli.highlight_class.unwrap_or(defaults.highlight_class),
    };

    let corpus = Corpus::from_sources(
        cli.verses.as_deref(),
        cli.originals.as_deref(),
        cli.notes.as_deref(),
    )?;
    info!(
        verses = corpus.verses().len(),
        notes = corpus.notes().len(),
        "corpus ready"
    );

    match cli.command {
        Commands::Verse {
            address,
            note,
            hover,
        } => {
            let mut selection = Selection::new(address.as_str());
            if let Some(id) = note {
                selection.select(id);
            }
            if let Some(id) = hover {
                selection.hover(id);
            }

            let html = corpus
                .verse_with_note_spans(&address, selection.marks(), &markup)
                .ok_or_else(|| DataError::UnknownAddress(address.clone()))?;
            println!("{}", html);
        }

        Commands::Note { id, json } => {
            let note = corpus.note(id).ok_or(DataError::NoteNotFound(id))?;

            if json {
                let value = serde_json::json!({
                    "id": id,
                    "note": note,
                    "original_html": corpus.note_original_with_highlight(id, &markup),
                });
                let mut stdout = std::io::stdout();
                serde_json::to_writer_pretty(&mut stdout, &value)?;
                println!();
            } else if let Some(text) = format_note_detail(&corpus, id, &markup) {
                println!("{}", text);
            }
        }

        Commands::Render {
            output,
            verse,
            note,
            hover,
            view,
        } => {
            let mut selection = Selection::starting_at(&corpus);
            if let Some(address) = verse {
                if corpus.verse_text(&address).is_none() {
                    return Err(DataError::UnknownAddress(address).into());
                }
                selection.enter_verse(address);
            }
            if let Some(id) = note {
                selection.select(id);
            }
            if let Some(id) = hover {
                selection.hover(id);
            }
            if let Some(view) = view {
                selection.show(view.into());
            }

            write_page_html_file(&corpus, &selection, &markup, &output)?;
            eprintln!("Page output: {}", output.display());
        }

        Commands::Audit {
            output,
            format,
            show_problems,
            quiet,
        } => {
            let report = audit_corpus(&corpus, !quiet);

            let format = ReportFormat::from(format);
            match &output {
                Some(path) => write_report_file(&report, format, path)?,
                None if quiet => write_report(&report, format, &mut std::io::stdout())?,
                None => {}
            }

            // Print summary
            if !quiet {
                print_summary(&report);
                if let Some(path) = &output {
                    eprintln!("\nOutput: {}", path.display());
                }
            }

            if let Some(limit) = show_problems {
                println!("\n=== Problem Notes ===");
                print_problem_notes(&report, Some(limit));
            }
        }
    }

    Ok(())
}
