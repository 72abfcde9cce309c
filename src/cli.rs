//! Command-line interface
//!
//! The vocabulary has one quirk clap cannot express on its own: any
//! unrecognized `--<word>` token is the log type (`--dns`, `--ssl`, ...).
//! Parsing therefore runs in two phases. A pre-scan splits off the `--`
//! passthrough remainder, the log-type token, and the tool-override flags
//! (all with last-one-wins overwrite semantics); clap then parses the
//! remaining fixed vocabulary and the positional search terms.

use crate::pattern::{MatchMode, SearchTerm, TermOptions};
use crate::tool::SearchTool;
use clap::Parser;

/// Environment variable forcing file-search mode even when stdin is a pipe
pub const NO_STDIN_ENV: &str = "ZEEKGREP_NO_STDIN";

/// Log type searched when none is named
pub const DEFAULT_LOG_TYPE: &str = "conn";

/// Search Zeek logs through the fastest installed grep
#[derive(Parser, Debug, Clone)]
#[command(
    name = "zeekgrep",
    version,
    about = "Search Zeek logs through the fastest installed grep",
    long_about = "\
Search Zeek logs by composing a pipeline for an external search tool
(ripgrep, ugrep, zgrep or grepcidr) and running it.

Terms are matched literally at word boundaries, with dots escaped so IP
addresses and domains behave as expected. Multiple terms must all match;
-o/--or makes any one of them sufficient.

Any other --<word> option names the log type to search for on disk
(--dns, --ssl, ...; default: conn). Without a log type, piped input is
filtered instead of files.

EXAMPLES:
    # connection records touching one host
    zeekgrep 10.0.0.1

    # DNS answers for either resolver
    zeekgrep --dns -o 8.8.8.8 1.1.1.1

    # everything inside a network range
    zeekgrep --cidr 10.0.0.0/8

    # filter piped input instead of files
    zcat conn.log.gz | zeekgrep 10.0.0.1",
    after_help = "\
TOOL OVERRIDES (last one wins):
    --rg, --ripgrep      force ripgrep
    --ug, --ugrep        force ugrep
    --zgrep, --grep      force zgrep
    --cat, --zcat        force plain concatenation
    --cidr, --grepcidr   force grepcidr (implies --regex)

Everything after `--` is forwarded verbatim to the backend tool.
Set ZEEKGREP_NO_STDIN to force file-search mode even for piped input."
)]
pub struct Args {
    /// Match any term instead of all terms
    #[arg(short = 'o', long)]
    pub or: bool,

    /// Anchor terms to the start of a field
    #[arg(short = 's', long)]
    pub starts_with: bool,

    /// Anchor terms to the end of a field
    #[arg(short = 'e', long)]
    pub ends_with: bool,

    /// Treat terms as regular expressions (no escaping, no anchoring)
    #[arg(short = 'r', long)]
    pub regex: bool,

    /// Keep only lines no term matches
    #[arg(short = 'v', long)]
    pub invert_match: bool,

    /// Print the composed pipeline instead of running it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Search terms
    pub terms: Vec<String>,
}

/// Tool-override flags, handled by the pre-scan so repeats overwrite
const TOOL_FLAGS: &[(&str, SearchTool)] = &[
    ("--rg", SearchTool::Ripgrep),
    ("--ripgrep", SearchTool::Ripgrep),
    ("--ug", SearchTool::Ugrep),
    ("--ugrep", SearchTool::Ugrep),
    ("--zgrep", SearchTool::Zgrep),
    ("--grep", SearchTool::Zgrep),
    ("--cat", SearchTool::Cat),
    ("--zcat", SearchTool::Cat),
    ("--cidr", SearchTool::GrepCidr),
    ("--grepcidr", SearchTool::GrepCidr),
];

/// Long options clap owns; any other `--<word>` is a log type
const KNOWN_LONG: &[&str] = &[
    "--or",
    "--starts-with",
    "--ends-with",
    "--regex",
    "--invert-match",
    "--dry-run",
    "--help",
    "--version",
];

/// One fully parsed invocation, immutable after construction
#[derive(Debug, Clone)]
pub struct Invocation {
    pub log_type: Option<String>,
    pub mode: MatchMode,
    pub invert: bool,
    pub dry_run: bool,
    pub forced_tool: Option<SearchTool>,
    pub terms: Vec<SearchTerm>,
    pub passthrough: Vec<String>,
    pub read_from_stream: bool,
}

impl Invocation {
    /// The log type to search for on disk
    pub fn effective_log_type(&self) -> &str {
        self.log_type.as_deref().unwrap_or(DEFAULT_LOG_TYPE)
    }
}

/// Whether the environment disables stream-reading
pub fn force_files_from_env() -> bool {
    std::env::var(NO_STDIN_ENV)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

/// Parse argv (including the program name) into an [`Invocation`]
pub fn parse_invocation<I>(
    argv: I,
    stdin_is_terminal: bool,
    force_files: bool,
) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = argv.into_iter();
    let mut rest: Vec<String> = vec![iter.next().unwrap_or_else(|| "zeekgrep".to_string())];

    let mut passthrough: Vec<String> = Vec::new();
    let mut log_type: Option<String> = None;
    let mut forced_tool: Option<SearchTool> = None;
    let mut after_separator = false;

    for arg in iter {
        if after_separator {
            passthrough.push(arg);
            continue;
        }
        if arg == "--" {
            after_separator = true;
            continue;
        }
        if let Some((_, tool)) = TOOL_FLAGS.iter().find(|(flag, _)| *flag == arg) {
            forced_tool = Some(*tool);
            continue;
        }
        if arg.starts_with("--") && !KNOWN_LONG.contains(&arg.as_str()) {
            log_type = Some(arg.trim_start_matches('-').to_string());
            continue;
        }
        rest.push(arg);
    }

    let args = Args::try_parse_from(&rest)?;

    // CIDR blocks are not literal terms; grepcidr gets them untouched
    let regex = args.regex || forced_tool == Some(SearchTool::GrepCidr);
    let opts = TermOptions {
        regex,
        starts_with: args.starts_with,
        ends_with: args.ends_with,
    };
    let terms = args
        .terms
        .iter()
        .map(|raw| SearchTerm::new(raw, opts))
        .collect();

    let read_from_stream = log_type.is_none() && !stdin_is_terminal && !force_files;

    Ok(Invocation {
        log_type,
        mode: if args.or { MatchMode::Or } else { MatchMode::And },
        invert: args.invert_match,
        dry_run: args.dry_run,
        forced_tool,
        terms,
        passthrough,
        read_from_stream,
    })
}
