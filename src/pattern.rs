//! Search term normalization
//!
//! Turns raw command-line terms into the patterns handed to the backend
//! search tool: literal dots are escaped and the term is wrapped in
//! boundary anchors so `10.0.0.1` matches the address and nothing else.

/// Word-boundary anchor used when no field anchoring is requested
pub const WORD_BOUNDARY: &str = r"\b";

/// Start-of-field class: preceded by a quote, a tab, or the start of line
pub const FIELD_START: &str = "(\"|\\t|^)";

/// End-of-field class: followed by a quote, a tab, or the end of line
pub const FIELD_END: &str = "(\"|\\t|$)";

/// How multiple search terms combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Every term must match (the default)
    #[default]
    And,
    /// Any term may match
    Or,
}

/// Anchoring and escaping options shared by all terms of one invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct TermOptions {
    /// Pass terms through untouched as regular expressions
    pub regex: bool,
    /// Anchor to the start of a field instead of a word boundary
    pub starts_with: bool,
    /// Anchor to the end of a field instead of a word boundary
    pub ends_with: bool,
}

/// A raw search term plus the pattern derived from it
#[derive(Debug, Clone)]
pub struct SearchTerm {
    pub raw: String,
    pub pattern: String,
}

impl SearchTerm {
    pub fn new(raw: &str, opts: TermOptions) -> Self {
        Self {
            raw: raw.to_string(),
            pattern: normalize(raw, opts),
        }
    }
}

/// Derive the backend pattern for a single term
///
/// Regex terms are returned unchanged; the caller owns their syntax. For
/// literal terms only `.` is escaped - other metacharacters in a literal
/// term reach the backend engine as-is, which matches the behavior users
/// of the underlying tools expect.
pub fn normalize(raw: &str, opts: TermOptions) -> String {
    if opts.regex {
        return raw.to_string();
    }

    let escaped = raw.replace('.', "\\.");

    let prefix = if opts.starts_with {
        FIELD_START
    } else {
        WORD_BOUNDARY
    };
    let suffix = if opts.ends_with { FIELD_END } else { WORD_BOUNDARY };

    format!("{}{}{}", prefix, escaped, suffix)
}
