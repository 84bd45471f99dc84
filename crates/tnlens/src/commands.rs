use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

const LONG_ABOUT: &str = r#"tnlens extracts a semantic model from captured 5250 terminal screens.

A capture is one JSON file per frame: text rows, color/attribute/graphic
planes, and the editable-field list reported by the session. tnlens turns
that raw grid into titles, labeled fields, free text, and tables.

MATCH MODES:
    Field and cell lookups accept a prefixed pattern:
    REGEX:, CONTAIN:, CONTAIN_ANY_CASE:, START:, START_ANY_CASE:,
    END:, END_ANY_CASE:, EXACT:, LENGTH:, EMPTY:, BLANK:
    No prefix means exact match.

EXAMPLES:
    # Full model of one screen
    tnlens scan order-entry.json
    tnlens scan order-entry.json --json

    # Field lookups
    tnlens fields order-entry.json
    tnlens fields order-entry.json "START:Cust"
    tnlens fields order-entry.json "CONTAIN_ANY_CASE:total" --display

    # Table extraction; several captures act as consecutive pages
    tnlens table orders-p1.json orders-p2.json orders-p3.json"#;

#[derive(Parser)]
#[command(name = "tnlens")]
#[command(author, version)]
#[command(about = "Semantic screen extraction for 5250 terminal captures")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Scan configuration file (JSON); missing keys use the stock palette
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract the full semantic model from one captured screen
    #[command(long_about = r#"Extract the full semantic model from one captured screen.

Prints titles, display fields, input fields, free text, and the table (if
one is present). With --json the model is emitted as a single JSON
document suitable for assertions in test harnesses."#)]
    Scan {
        /// Capture file to scan
        capture: PathBuf,
    },

    /// List labeled fields, or look one up by pattern
    Fields {
        /// Capture file to scan
        capture: PathBuf,

        /// Label pattern to look up (match modes allowed); omit to list all
        pattern: Option<String>,

        /// Only consider input (editable) fields
        #[arg(long)]
        input: bool,

        /// Only consider display (read-only) fields
        #[arg(long)]
        display: bool,
    },

    /// Parse the screen's table and emit CSV
    #[command(long_about = r#"Parse the screen's table and emit CSV.

Multiple capture files are treated as consecutive pages of the same list,
in argument order; page turns walk through them the way a live session
would, honoring More.../Bottom sentinels on the last visible line."#)]
    Table {
        /// Capture files, one per page
        #[arg(required = true)]
        captures: Vec<PathBuf>,

        /// Page budget override; negative pages backwards
        #[arg(long, allow_negative_numbers = true)]
        max_pages: Option<i32>,
    },
}
