//! Backend tool selection
//!
//! Picks the external search tool an invocation delegates to. An explicit
//! override always wins; with nothing to filter the plan degenerates to a
//! plain concatenation; otherwise the fastest installed tool is taken.

use crate::error::PlanError;
use log::debug;
use which::which;

/// The external tools a pipeline can be composed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTool {
    /// ripgrep (`rg`), searches plain and gzip files in one pass
    Ripgrep,
    /// ugrep (`ug`), boolean query expressions
    Ugrep,
    /// `zgrep`, per-file fan-out over a parallel dispatcher
    Zgrep,
    /// `cat`/`zcat` passthrough, no filtering
    Cat,
    /// `grepcidr`, CIDR block matching; never auto-selected
    GrepCidr,
}

impl SearchTool {
    /// Auto-selection order, fastest first
    pub const RANKED: [SearchTool; 3] = [SearchTool::Ripgrep, SearchTool::Ugrep, SearchTool::Zgrep];

    /// Name of the binary invoked for this tool
    pub fn binary(&self) -> &'static str {
        match self {
            SearchTool::Ripgrep => "rg",
            SearchTool::Ugrep => "ug",
            SearchTool::Zgrep => "zgrep",
            SearchTool::Cat => "cat",
            SearchTool::GrepCidr => "grepcidr",
        }
    }

    /// Whether the tool's binary is on the PATH
    pub fn is_available(&self) -> bool {
        which(self.binary()).is_ok()
    }
}

/// Probe the PATH for the auto-selectable tools
pub fn detect_available() -> Vec<SearchTool> {
    let available: Vec<SearchTool> = SearchTool::RANKED
        .iter()
        .copied()
        .filter(SearchTool::is_available)
        .collect();
    debug!("available tools: {:?}", available);
    available
}

/// Choose the tool for this invocation
///
/// A forced tool is returned without an availability check - a missing
/// binary surfaces later as the shell's own "command not found". With no
/// terms and no passthrough args there is nothing to filter, so the plan
/// is a plain concatenation.
pub fn select(
    forced: Option<SearchTool>,
    have_terms: bool,
    have_passthrough: bool,
    available: &[SearchTool],
) -> Result<SearchTool, PlanError> {
    if let Some(tool) = forced {
        return Ok(tool);
    }

    if !have_terms && !have_passthrough {
        return Ok(SearchTool::Cat);
    }

    SearchTool::RANKED
        .iter()
        .copied()
        .find(|tool| available.contains(tool))
        .ok_or(PlanError::NoToolAvailable)
}
