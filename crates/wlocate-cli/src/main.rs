//! Command-line front end resolving a locator against a document snapshot.
//!
//! The document is a JSON snapshot of a rendered page; the locator is given
//! as already separated fragments.
//!
//! # Usage
//!
//! ```bash
//! # The text field labeled "Username"
//! wlocate page.json settable Username
//!
//! # The "Street" field below the "Shipping" heading
//! wlocate page.json settable Shipping Street
//!
//! # The input in row "Total", column "Qty"
//! wlocate page.json settable '[Total;Qty]'
//!
//! # Only the best candidate, as JSON
//! wlocate page.json clickable Submit --best --format json
//!
//! # Elements reacting to a right click
//! wlocate page.json right-click Options
//! ```
//!
//! Exit codes: 0 found, 1 nothing found, 2 invalid input, 3 internal fault.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wlocate_core::config::FinderConfig;
use wlocate_core::element::{Document, MouseAction};
use wlocate_core::finder::{ControlFinder, FindError};
use wlocate_core::ranking::{Entry, WeightedControlList};
use wlocate_core::wpath::WPath;

/// Resolve a locator against a JSON document snapshot.
#[derive(Parser)]
#[command(name = "wlocate")]
#[command(about = "Find the page element a human-readable locator refers to")]
#[command(version)]
struct Cli {
    /// Document snapshot (JSON)
    document: PathBuf,

    /// Which kind of control to look for
    finder: FinderKind,

    /// Locator fragments: path nodes, then the target; `[row;column]` selects a table cell
    nodes: Vec<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Configuration file (default: ~/.wlocate/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads for the finder pool
    #[arg(short, long, env = "WLOCATE_THREADS")]
    threads: Option<usize>,

    /// Priority override such as BY_TEXT=100 (repeatable)
    #[arg(short, long = "priority", value_name = "KIND=VALUE")]
    priorities: Vec<String>,

    /// Only print the best candidate
    #[arg(short, long)]
    best: bool,

    /// Log finder activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FinderKind {
    /// Text fields, password fields, text areas and file inputs
    Settable,
    /// Buttons, links, images, checkboxes, radio buttons and anything with a click listener
    Clickable,
    /// Checkboxes, radio buttons and options
    Selectable,
    /// Checkboxes and options
    Deselectable,
    /// Select boxes
    Other,
    /// Plain page content no control claims
    Text,
    /// Elements reacting to the mouse moving over them
    MouseOver,
    /// Elements reacting to a double click
    DoubleClick,
    /// Elements reacting to a right click
    RightClick,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    NotFound(String),
    InvalidInput(String),
    Internal(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::NotFound(_) => ExitCode::from(1),
            CliError::InvalidInput(_) => ExitCode::from(2),
            CliError::Internal(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NotFound(locator) => write!(f, "No element found for '{}'", locator),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<FindError> for CliError {
    fn from(e: FindError) -> Self {
        CliError::Internal(e.to_string())
    }
}

fn load_config(cli: &Cli) -> Result<FinderConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => FinderConfig::load_from(path)
            .map_err(|e| CliError::InvalidInput(format!("{}: {}", path.display(), e)))?,
        None => FinderConfig::load(),
    };
    if let Some(threads) = cli.threads {
        config.worker_threads = Some(threads);
    }
    for assignment in &cli.priorities {
        config
            .set_priority(assignment)
            .map_err(|e| CliError::InvalidInput(format!("--priority {}: {}", assignment, e)))?;
    }
    Ok(config)
}

fn find(finder: &ControlFinder, kind: FinderKind, wpath: &WPath) -> Result<WeightedControlList, FindError> {
    match kind {
        FinderKind::Settable => finder.all_settables(wpath),
        FinderKind::Clickable => finder.all_clickables(wpath),
        FinderKind::Selectable => finder.all_selectables(wpath),
        FinderKind::Deselectable => finder.all_deselectables(wpath),
        FinderKind::Other => finder.all_other_controls(wpath),
        FinderKind::Text => finder.all_controls_for_text(wpath),
        FinderKind::MouseOver => finder.all_for_mouse_action(wpath, MouseAction::MouseOver),
        FinderKind::DoubleClick => finder.all_for_mouse_action(wpath, MouseAction::DoubleClick),
        FinderKind::RightClick => finder.all_for_mouse_action(wpath, MouseAction::RightClick),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let document = Document::load(&cli.document)
        .map_err(|e| CliError::InvalidInput(format!("{}: {}", cli.document.display(), e)))?;
    let wpath = WPath::new(cli.nodes.iter().cloned()).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    debug!(document = %cli.document.display(), locator = %wpath, finder = ?cli.finder, "resolving");

    let finder = ControlFinder::new(&document, config)?;
    let found = find(&finder, cli.finder, &wpath)?;

    let locator = wpath.to_string();
    if cli.best {
        let resolution = found
            .resolve(&locator)
            .ok_or_else(|| CliError::NotFound(locator.clone()))?;
        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolution).map_err(json_error)?),
            OutputFormat::Text => {
                println!("{}", format_entry(&resolution.best));
                if resolution.is_ambiguous() {
                    eprintln!(
                        "{} elements found for '{}', using the first one",
                        resolution.ties.len() + 1,
                        locator
                    );
                }
            }
        }
        return Ok(());
    }

    let entries = found.sorted_distinct();
    if entries.is_empty() {
        return Err(CliError::NotFound(locator));
    }
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries).map_err(json_error)?),
        OutputFormat::Text => {
            for (rank, entry) in entries.iter().enumerate() {
                println!("{:>3}. {}", rank + 1, format_entry(entry));
            }
        }
    }
    Ok(())
}

fn format_entry(entry: &Entry) -> String {
    format!("{:?}: {}", entry.control.kind, entry)
}

fn json_error(e: serde_json::Error) -> CliError {
    CliError::Internal(e.to_string())
}
